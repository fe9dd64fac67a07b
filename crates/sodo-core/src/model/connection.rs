// ── Connection domain types ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

use super::device::ParseVariantError;
use super::entity_id::EntityId;

/// Physical medium of a link.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum LinkMedium {
    #[default]
    Wired,
    Wireless,
}

impl LinkMedium {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Wired => "wired",
            Self::Wireless => "wireless",
        }
    }
}

impl fmt::Display for LinkMedium {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for LinkMedium {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|m| m.slug().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseVariantError {
                kind: "link medium",
                value: s.to_owned(),
                expected: "wired, wireless".into(),
            })
    }
}

/// A directed edge from one device to another.
///
/// Endpoints are plain ids; nothing here guarantees they resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: EntityId,
    #[serde(rename = "fromId")]
    pub from_id: EntityId,
    #[serde(rename = "toId")]
    pub to_id: EntityId,
    #[serde(rename = "type", default)]
    pub medium: LinkMedium,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Connection {
    /// A wired link from `from_id` to `to_id`, or `None` for a self-loop.
    pub fn create(id: EntityId, from_id: EntityId, to_id: EntityId) -> Option<Self> {
        if from_id == to_id {
            return None;
        }
        Some(Self {
            id,
            from_id,
            to_id,
            medium: LinkMedium::default(),
            label: None,
        })
    }

    pub fn touches(&self, device: &EntityId) -> bool {
        self.from_id == *device || self.to_id == *device
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn self_loop_is_rejected() {
        let a = EntityId::new("cam_1");
        assert!(Connection::create(EntityId::new("conn_1"), a.clone(), a).is_none());
    }

    #[test]
    fn create_defaults_to_wired_without_label() {
        let c = Connection::create(
            EntityId::new("conn_1"),
            EntityId::new("cam_1"),
            EntityId::new("cam_2"),
        )
        .unwrap();
        assert_eq!(c.medium, LinkMedium::Wired);
        assert!(c.label.is_none());
        assert!(c.touches(&EntityId::new("cam_2")));
        assert!(!c.touches(&EntityId::new("cam_3")));
    }

    #[test]
    fn wire_shape_uses_camel_case_endpoints() {
        let c = Connection::create(
            EntityId::new("conn_1"),
            EntityId::new("cam_1"),
            EntityId::new("cam_2"),
        )
        .unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["fromId"], "cam_1");
        assert_eq!(json["toId"], "cam_2");
        assert_eq!(json["type"], "wired");
        assert!(json.get("label").is_none());
    }

    #[test]
    fn medium_parses_case_insensitively() {
        assert_eq!("Wireless".parse::<LinkMedium>().unwrap(), LinkMedium::Wireless);
        assert!("fiber".parse::<LinkMedium>().is_err());
    }
}
