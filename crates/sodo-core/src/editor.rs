// ── Editor facade ──
//
// Glue between the pure reducer and the snapshot store. Surfaces (CLI,
// TUI) talk to the Editor; nothing else mutates the live project.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::diagram::{self, DiagramAction, DiagramState, Effect, ReduceContext};
use crate::error::CoreError;
use crate::model::{IdGenerator, Project, RangePolicy};
use crate::store::{ProjectOrigin, ProjectStore};

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Outcome {
    /// A new snapshot was committed.
    pub committed: bool,
    pub effect: Option<Effect>,
}

pub struct Editor {
    store: ProjectStore,
    state: DiagramState,
    ids: &'static IdGenerator,
    policy: RangePolicy,
}

impl Editor {
    pub fn new(store: ProjectStore, policy: RangePolicy) -> Self {
        let state = if store.is_read_only() {
            DiagramState::read_only()
        } else {
            DiagramState::default()
        };
        Self {
            store,
            state,
            ids: IdGenerator::global(),
            policy,
        }
    }

    pub fn project(&self) -> Arc<Project> {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Project>> {
        self.store.subscribe()
    }

    pub fn state(&self) -> &DiagramState {
        &self.state
    }

    pub fn policy(&self) -> RangePolicy {
        self.policy
    }

    pub fn is_read_only(&self) -> bool {
        self.store.is_read_only()
    }

    pub fn origin(&self) -> ProjectOrigin {
        self.store.origin()
    }

    pub fn store_mut(&mut self) -> &mut ProjectStore {
        &mut self.store
    }

    /// Run one action through the reducer and commit any resulting snapshot.
    pub fn dispatch(&mut self, action: DiagramAction) -> Result<Outcome, CoreError> {
        let project = self.store.snapshot();
        let ctx = ReduceContext {
            ids: self.ids,
            policy: self.policy,
        };
        let reduction = diagram::reduce(&project, &self.state, action, &ctx);
        self.state = reduction.state;
        let committed = match reduction.project {
            Some(next) => {
                self.store.commit(next)?;
                true
            }
            None => false,
        };
        Ok(Outcome {
            committed,
            effect: reduction.effect,
        })
    }

    /// Dispatch a sequence, stopping at the first error.
    pub fn dispatch_all(
        &mut self,
        actions: impl IntoIterator<Item = DiagramAction>,
    ) -> Result<Vec<Outcome>, CoreError> {
        actions.into_iter().map(|a| self.dispatch(a)).collect()
    }

    /// Drop the shared project and continue with the persisted one.
    pub fn exit_read_only(&mut self) {
        if self.store.is_read_only() {
            self.store.exit_read_only();
            self.state = DiagramState::default();
            info!(origin = ?self.store.origin(), "editing enabled");
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("store", &self.store)
            .field("state", &self.state)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::geometry::Point;
    use crate::store::{KeyValueSlot, MemorySlot};

    fn editor_with(slot: Arc<MemorySlot>, share: Option<&str>) -> Editor {
        Editor::new(ProjectStore::open(slot, share), RangePolicy::Strict)
    }

    #[test]
    fn dispatch_commits_and_persists() {
        let slot = Arc::new(MemorySlot::new());
        let mut editor = editor_with(slot.clone(), None);
        editor.dispatch(DiagramAction::ToggleAddMode).unwrap();
        let outcome = editor
            .dispatch(DiagramAction::CanvasClick(Point::new(5.0, 6.0)))
            .unwrap();
        assert!(outcome.committed);
        assert!(matches!(outcome.effect, Some(Effect::OpenEditor(_))));

        let saved = slot.read(codec::PERSIST_KEY).unwrap().unwrap();
        assert_eq!(codec::decode(&saved).unwrap().devices.len(), 1);
    }

    #[test]
    fn state_only_actions_do_not_commit() {
        let mut editor = editor_with(Arc::new(MemorySlot::new()), None);
        let before = editor.project();
        let outcome = editor.dispatch(DiagramAction::ToggleConnectMode).unwrap();
        assert!(!outcome.committed);
        assert!(Arc::ptr_eq(&before, &editor.project()));
    }

    #[test]
    fn shared_session_starts_read_only_and_can_leave() {
        let slot = Arc::new(MemorySlot::new());
        let link = codec::share_fragment(&Project::default().rename("Chia sẻ")).unwrap();
        let mut editor = editor_with(slot, Some(&link));
        assert!(editor.is_read_only());
        assert!(editor.state().read_only);

        let outcome = editor.dispatch(DiagramAction::RenameProject("x".into())).unwrap();
        assert!(!outcome.committed);
        assert_eq!(editor.project().name, "Chia sẻ");

        editor.exit_read_only();
        assert!(!editor.is_read_only());
        assert!(!editor.state().read_only);
        assert!(editor.dispatch(DiagramAction::RenameProject("x".into())).unwrap().committed);
    }
}
