// ── Device domain types ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};
use thiserror::Error;

use super::entity_id::EntityId;
use crate::geometry::{self, Point};

/// Field of view assigned to freshly placed devices, in degrees.
pub const DEFAULT_FOV: f64 = 90.0;

// ── Category ────────────────────────────────────────────────────────

/// What kind of hardware a marker stands for.
///
/// Serde uses the labels stored by existing project files; [`slug`](Self::slug)
/// is the stable identifier used on command lines.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
)]
pub enum DeviceCategory {
    #[default]
    #[serde(rename = "Camera Dome")]
    DomeCamera,
    #[serde(rename = "Camera Bullet")]
    BulletCamera,
    #[serde(rename = "Camera PTZ")]
    PtzCamera,
    #[serde(rename = "Bộ phát WiFi")]
    WifiEmitter,
    #[serde(rename = "Bắn sóng PTP")]
    PtpRadio,
    #[serde(rename = "Đầu ghi NVR")]
    Nvr,
    #[serde(rename = "Switch")]
    Switch,
    #[serde(rename = "Router")]
    Router,
}

/// Rendering traits a category opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Draws a directional field-of-view wedge and exposes the fov/rotation fields.
    pub field_of_view: bool,
    /// Draws an omnidirectional coverage circle.
    pub broadcast_radius: bool,
}

impl DeviceCategory {
    pub fn slug(self) -> &'static str {
        match self {
            Self::DomeCamera => "dome-camera",
            Self::BulletCamera => "bullet-camera",
            Self::PtzCamera => "ptz-camera",
            Self::WifiEmitter => "wifi-emitter",
            Self::PtpRadio => "ptp-radio",
            Self::Nvr => "nvr",
            Self::Switch => "switch",
            Self::Router => "router",
        }
    }

    /// Human label, identical to the stored wire label.
    pub fn label(self) -> &'static str {
        match self {
            Self::DomeCamera => "Camera Dome",
            Self::BulletCamera => "Camera Bullet",
            Self::PtzCamera => "Camera PTZ",
            Self::WifiEmitter => "Bộ phát WiFi",
            Self::PtpRadio => "Bắn sóng PTP",
            Self::Nvr => "Đầu ghi NVR",
            Self::Switch => "Switch",
            Self::Router => "Router",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Self::DomeCamera | Self::BulletCamera | Self::PtzCamera => Capabilities {
                field_of_view: true,
                broadcast_radius: false,
            },
            Self::WifiEmitter | Self::Switch | Self::Router => Capabilities {
                field_of_view: false,
                broadcast_radius: true,
            },
            Self::PtpRadio | Self::Nvr => Capabilities {
                field_of_view: false,
                broadcast_radius: false,
            },
        }
    }

    pub fn has_field_of_view(self) -> bool {
        self.capabilities().field_of_view
    }

    pub fn has_broadcast_radius(self) -> bool {
        self.capabilities().broadcast_radius
    }
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Unrecognised category or status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
    pub expected: String,
}

impl FromStr for DeviceCategory {
    type Err = ParseVariantError;

    /// Accepts the slug or the label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::iter()
            .find(|c| c.slug().eq_ignore_ascii_case(needle) || c.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseVariantError {
                kind: "device type",
                value: s.to_owned(),
                expected: Self::iter().map(Self::slug).collect::<Vec<_>>().join(", "),
            })
    }
}

// ── Status ──────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter,
)]
pub enum DeviceStatus {
    #[default]
    #[serde(rename = "Hoạt động")]
    Active,
    #[serde(rename = "Bảo trì")]
    Maintenance,
}

impl DeviceStatus {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Hoạt động",
            Self::Maintenance => "Bảo trì",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeviceStatus {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::iter()
            .find(|v| v.slug().eq_ignore_ascii_case(needle) || v.label() == needle)
            .ok_or_else(|| ParseVariantError {
                kind: "status",
                value: s.to_owned(),
                expected: Self::iter().map(Self::slug).collect::<Vec<_>>().join(", "),
            })
    }
}

// ── Range policy ────────────────────────────────────────────────────

/// How rotation and field-of-view values are treated when an edit commits.
///
/// Decoding never goes through the policy, so stored out-of-range values
/// survive a load/save cycle untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Rotation wraps into [0, 360), fov clamps into [15, 180].
    #[default]
    Strict,
    /// Values are stored exactly as entered.
    Permissive,
}

impl RangePolicy {
    pub fn apply(self, mut device: Device) -> Device {
        if self == Self::Strict {
            device.rotation = geometry::normalize_rotation(device.rotation);
            device.fov = geometry::clamp_fov(device.fov);
        }
        device
    }
}

impl FromStr for RangePolicy {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            _ => Err(ParseVariantError {
                kind: "range policy",
                value: s.to_owned(),
                expected: "strict, permissive".into(),
            }),
        }
    }
}

// ── Device ──────────────────────────────────────────────────────────

/// A marker placed on the floor plan.
///
/// `x`/`y` are in floor-plan image pixels. `rotation` is a compass-style
/// heading in degrees (0 = up, clockwise).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub mac: String,
    #[serde(rename = "type", default)]
    pub category: DeviceCategory,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub notes: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_fov")]
    pub fov: f64,
}

fn default_fov() -> f64 {
    DEFAULT_FOV
}

impl Device {
    /// A freshly placed device with every attribute at its default.
    ///
    /// `sequence_hint` is the number of devices already in the project and
    /// only feeds the display name.
    pub fn create(id: EntityId, position: Point, sequence_hint: usize) -> Self {
        Self {
            id,
            name: default_device_name(sequence_hint),
            ip: String::new(),
            mac: String::new(),
            category: DeviceCategory::default(),
            status: DeviceStatus::default(),
            notes: String::new(),
            x: position.x,
            y: position.y,
            rotation: 0.0,
            fov: DEFAULT_FOV,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn moved_to(mut self, position: Point) -> Self {
        self.x = position.x;
        self.y = position.y;
        self
    }
}

/// `Thiết bị <n>` where n is one past the current device count.
pub fn default_device_name(sequence_hint: usize) -> String {
    format!("Thiết bị {}", sequence_hint + 1)
}
