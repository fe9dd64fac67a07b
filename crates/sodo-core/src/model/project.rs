// ── Project document ──
//
// A Project is an immutable value: every operation below borrows the
// current snapshot and hands back a new one.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::connection::Connection;
use super::device::Device;
use super::entity_id::{CONNECTION_ID_PREFIX, DEVICE_ID_PREFIX, EntityId, IdGenerator};
use crate::geometry::Point;

pub const DEFAULT_PROJECT_NAME: &str = "Dự án mặc định";

/// Placeholder for a connection endpoint that no longer resolves.
pub const UNKNOWN_ENDPOINT: &str = "Unknown";

/// The whole diagram: name, background raster, devices and links.
///
/// Field names on the wire match the files written by earlier releases
/// (`cameras` holds every device, not only cameras).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(rename = "projectName", default = "default_name")]
    pub name: String,
    /// Floor plan as a `data:` URL.
    #[serde(rename = "floorPlanImage", default)]
    pub floor_plan: Option<String>,
    #[serde(rename = "cameras", default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(rename = "lastUpdated", default = "epoch")]
    pub last_updated: DateTime<Utc>,
}

fn default_name() -> String {
    DEFAULT_PROJECT_NAME.into()
}

fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Current time at millisecond precision, matching stored timestamps.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl Default for Project {
    fn default() -> Self {
        Self {
            name: default_name(),
            floor_plan: None,
            devices: Vec::new(),
            connections: Vec::new(),
            last_updated: now(),
        }
    }
}

impl Project {
    // ── Lookup ───────────────────────────────────────────────────────

    pub fn device(&self, id: &EntityId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == *id)
    }

    pub fn connection(&self, id: &EntityId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == *id)
    }

    fn id_taken(&self, id: &EntityId) -> bool {
        self.device(id).is_some() || self.connection(id).is_some()
    }

    /// `"<from> → <to>"` using device names, `Unknown` for dangling ends.
    pub fn connection_label(&self, connection: &Connection) -> String {
        let name = |id: &EntityId| {
            self.device(id)
                .map_or(UNKNOWN_ENDPOINT, |d| d.name.as_str())
                .to_owned()
        };
        format!("{} → {}", name(&connection.from_id), name(&connection.to_id))
    }

    // ── Construction ─────────────────────────────────────────────────

    /// Build a default device at `position` with an id unused in this project.
    pub fn create_device(&self, ids: &IdGenerator, position: Point) -> Device {
        let id = ids.mint(DEVICE_ID_PREFIX, |id| self.id_taken(id));
        Device::create(id, position, self.devices.len())
    }

    /// Build a wired link, or `None` when both ends are the same device.
    pub fn create_connection(
        &self,
        ids: &IdGenerator,
        from_id: EntityId,
        to_id: EntityId,
    ) -> Option<Connection> {
        if from_id == to_id {
            return None;
        }
        let id = ids.mint(CONNECTION_ID_PREFIX, |id| self.id_taken(id));
        Connection::create(id, from_id, to_id)
    }

    // ── Snapshot operations ──────────────────────────────────────────

    #[must_use]
    pub fn add_device(&self, device: Device) -> Self {
        let mut next = self.clone();
        next.devices.push(device);
        next
    }

    /// Replace the device with the same id. Unknown ids leave the project as is.
    #[must_use]
    pub fn update_device(&self, device: Device) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.devices.iter_mut().find(|d| d.id == device.id) {
            *slot = device;
        }
        next
    }

    /// Remove a device and every connection touching it.
    #[must_use]
    pub fn delete_device(&self, id: &EntityId) -> Self {
        Self {
            name: self.name.clone(),
            floor_plan: self.floor_plan.clone(),
            devices: self.devices.iter().filter(|d| d.id != *id).cloned().collect(),
            connections: self
                .connections
                .iter()
                .filter(|c| !c.touches(id))
                .cloned()
                .collect(),
            last_updated: self.last_updated,
        }
    }

    #[must_use]
    pub fn add_connection(&self, connection: Connection) -> Self {
        let mut next = self.clone();
        next.connections.push(connection);
        next
    }

    #[must_use]
    pub fn update_connection(&self, connection: Connection) -> Self {
        let mut next = self.clone();
        if let Some(slot) = next.connections.iter_mut().find(|c| c.id == connection.id) {
            *slot = connection;
        }
        next
    }

    #[must_use]
    pub fn delete_connection(&self, id: &EntityId) -> Self {
        let mut next = self.clone();
        next.connections.retain(|c| c.id != *id);
        next
    }

    #[must_use]
    pub fn rename(&self, name: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.name = name.into();
        next
    }

    #[must_use]
    pub fn with_floor_plan(&self, image: Option<String>) -> Self {
        let mut next = self.clone();
        next.floor_plan = image;
        next
    }

    /// Drop devices, connections and the floor plan. The name survives.
    #[must_use]
    pub fn cleared(&self) -> Self {
        Self {
            name: self.name.clone(),
            floor_plan: None,
            devices: Vec::new(),
            connections: Vec::new(),
            last_updated: self.last_updated,
        }
    }

    #[must_use]
    pub fn touched(mut self, at: DateTime<Utc>) -> Self {
        self.last_updated = at;
        self
    }
}
