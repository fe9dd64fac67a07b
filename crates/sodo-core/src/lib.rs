//! Diagram core for sodo floor-plan surveys.
//!
//! This crate owns everything about a floor-plan diagram that is not
//! drawing pixels:
//!
//! - **Domain model** ([`model`]): [`Device`], [`Connection`] and the
//!   single-document [`Project`], with pure snapshot operations that never
//!   mutate in place.
//!
//! - **[`ProjectStore`]**: the live snapshot behind a `tokio::sync::watch`
//!   channel, written through to a [`KeyValueSlot`] on every commit.
//!
//! - **Diagram state machine** ([`diagram`]): add/connect modes,
//!   selection and live drag/rotate gestures, expressed as a pure
//!   [`reduce`](diagram::reduce) function.
//!
//! - **[`Editor`]**: facade that runs actions through the reducer and
//!   commits the results. CLI and TUI both drive this.
//!
//! - **[`codec`]**: persistence JSON, `#share=` links and export names.
//!
//! - **[`geometry`]**: field-of-view wedges, rotation handles, arrows.
//!
//! - **[`report`]**: bill of materials.
//!
//! - **[`floorplan`]**: image/PDF import with a single-flight guard.

pub mod codec;
pub mod diagram;
pub mod editor;
pub mod error;
pub mod floorplan;
pub mod geometry;
pub mod model;
pub mod report;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use codec::CodecError;
pub use diagram::{DiagramAction, DiagramState, Effect, InteractionMode};
pub use editor::{Editor, Outcome};
pub use error::CoreError;
pub use floorplan::{FloorPlan, FloorPlanImporter, ImportError, PdfRasterizer, PdftoppmRasterizer};
pub use geometry::Point;
pub use model::{
    Connection, Device, DeviceCategory, DeviceStatus, EntityId, IdGenerator, LinkMedium, Project,
    RangePolicy,
};
pub use report::{BomLine, compute_bom};
pub use store::{FileSlot, KeyValueSlot, MemorySlot, ProjectOrigin, ProjectStore};
