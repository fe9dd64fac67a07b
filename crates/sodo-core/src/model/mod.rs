//! Canonical domain types for a floor-plan diagram.

mod connection;
mod device;
mod entity_id;
mod project;

pub use connection::{Connection, LinkMedium};
pub use device::{
    Capabilities, DEFAULT_FOV, Device, DeviceCategory, DeviceStatus, ParseVariantError,
    RangePolicy, default_device_name,
};
pub use entity_id::{CONNECTION_ID_PREFIX, DEVICE_ID_PREFIX, EntityId, IdGenerator};
pub use project::{DEFAULT_PROJECT_NAME, Project, UNKNOWN_ENDPOINT, now};
