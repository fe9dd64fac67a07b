// ── Project snapshot store ──
//
// Holds the single live Project as an immutable `Arc` snapshot behind a
// `watch` channel. Commits replace the snapshot first, then write the
// encoded project through to the durable slot.

mod slot;

use std::io;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

pub use slot::{FileSlot, KeyValueSlot, MemorySlot};

use crate::codec::{self, PERSIST_KEY};
use crate::error::CoreError;
use crate::model::{self, Project};

/// Where the live snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectOrigin {
    /// Decoded from the durable slot.
    Persisted,
    /// Nothing usable was stored.
    Default,
    /// Decoded from a share link; the session is read-only.
    Shared,
}

pub struct ProjectStore {
    slot: Arc<dyn KeyValueSlot>,
    snapshot: watch::Sender<Arc<Project>>,
    origin: ProjectOrigin,
    read_only: bool,
    write_error: Option<io::Error>,
}

impl ProjectStore {
    /// Open the store, preferring a decodable share link over the slot.
    ///
    /// A share link that fails to decode is logged and ignored; the
    /// session then loads the persisted or default project, writable.
    pub fn open(slot: Arc<dyn KeyValueSlot>, share: Option<&str>) -> Self {
        if let Some(link) = share {
            match codec::decode_share_link(link) {
                Ok(project) => {
                    info!(name = %project.name, devices = project.devices.len(), "opened shared project read-only");
                    return Self::with_snapshot(slot, project, ProjectOrigin::Shared, true);
                }
                Err(e) => warn!(error = %e, "ignoring malformed share link"),
            }
        }
        let (project, origin) = load_persisted(slot.as_ref());
        Self::with_snapshot(slot, project, origin, false)
    }

    fn with_snapshot(
        slot: Arc<dyn KeyValueSlot>,
        project: Project,
        origin: ProjectOrigin,
        read_only: bool,
    ) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(project));
        Self {
            slot,
            snapshot,
            origin,
            read_only,
            write_error: None,
        }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Project> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Project>> {
        self.snapshot.subscribe()
    }

    pub fn origin(&self) -> ProjectOrigin {
        self.origin
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Accept a new project: refresh `lastUpdated`, publish the snapshot,
    /// then write it through to the slot.
    ///
    /// Slot failures do not undo the in-memory commit. They are logged and
    /// kept for [`take_write_error`](Self::take_write_error).
    pub fn commit(&mut self, project: Project) -> Result<Arc<Project>, CoreError> {
        if self.read_only {
            return Err(CoreError::ReadOnly);
        }
        let next = Arc::new(project.touched(model::now()));
        self.snapshot.send_replace(Arc::clone(&next));
        debug!(devices = next.devices.len(), connections = next.connections.len(), "snapshot replaced");
        self.write_through(&next);
        Ok(next)
    }

    fn write_through(&mut self, project: &Project) {
        let result = codec::encode(project)
            .map_err(io::Error::other)
            .and_then(|text| self.slot.write(PERSIST_KEY, &text));
        if let Err(e) = result {
            warn!(error = %e, "failed to persist project");
            self.write_error = Some(e);
        }
    }

    /// Most recent slot write failure since the last call.
    pub fn take_write_error(&mut self) -> Option<io::Error> {
        self.write_error.take()
    }

    /// Leave a shared session and reload whatever the slot holds.
    pub fn exit_read_only(&mut self) {
        if !self.read_only {
            return;
        }
        let (project, origin) = load_persisted(self.slot.as_ref());
        self.read_only = false;
        self.origin = origin;
        self.snapshot.send_replace(Arc::new(project));
        info!("left read-only session");
    }
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("origin", &self.origin)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

/// Read the slot, falling back to a default project on any failure.
pub fn load_persisted(slot: &dyn KeyValueSlot) -> (Project, ProjectOrigin) {
    let text = match slot.read(PERSIST_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return (Project::default(), ProjectOrigin::Default),
        Err(e) => {
            warn!(error = %e, "could not read saved project");
            return (Project::default(), ProjectOrigin::Default);
        }
    };
    match codec::decode(&text) {
        Ok(project) => (project, ProjectOrigin::Persisted),
        Err(e) => {
            warn!(error = %e, "saved project is corrupt, starting fresh");
            (Project::default(), ProjectOrigin::Default)
        }
    }
}
