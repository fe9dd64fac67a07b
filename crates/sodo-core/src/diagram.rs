//! Interaction state machine for the diagram canvas.
//!
//! [`reduce`] is a pure function: given the current project snapshot, the
//! interaction state and one [`DiagramAction`], it returns the next state,
//! optionally a new project snapshot to commit, and optionally an
//! [`Effect`] for the surface to perform. It never touches storage.
//!
//! Modes:
//!
//! ```text
//! Idle ──toggle add──▶ PlacingDevice ──canvas click──▶ Idle (device placed)
//! Idle ──toggle connect──▶ Connecting(None) ──device A──▶ Connecting(A)
//! Connecting(A) ──device B≠A──▶ Idle (A→B created)
//! ```
//!
//! Selection and live gestures (drag, rotate) are orthogonal to the mode.

use strum::IntoStaticStr;
use tracing::debug;

use crate::geometry::{self, Point};
use crate::model::{Connection, Device, EntityId, IdGenerator, Project, RangePolicy};

// ── State ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Idle,
    PlacingDevice,
    Connecting {
        source: Option<EntityId>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Rotate,
}

/// An in-flight drag. `preview` is what renderers draw; the project is
/// only updated when the gesture ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub preview: Device,
    origin: Device,
}

impl Gesture {
    fn begin(kind: GestureKind, device: &Device) -> Self {
        Self {
            kind,
            preview: device.clone(),
            origin: device.clone(),
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.preview != self.origin
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramState {
    pub mode: InteractionMode,
    pub selected: Option<EntityId>,
    pub gesture: Option<Gesture>,
    pub read_only: bool,
}

impl DiagramState {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn is_placing(&self) -> bool {
        self.mode == InteractionMode::PlacingDevice
    }

    pub fn is_connecting(&self) -> bool {
        matches!(self.mode, InteractionMode::Connecting { .. })
    }

    pub fn pending_source(&self) -> Option<&EntityId> {
        match &self.mode {
            InteractionMode::Connecting { source } => source.as_ref(),
            _ => None,
        }
    }

    /// The device as it should be drawn right now: the gesture preview if
    /// one is in flight, otherwise the committed value.
    pub fn view_device<'a>(&'a self, project: &'a Project, id: &EntityId) -> Option<&'a Device> {
        match &self.gesture {
            Some(g) if g.preview.id == *id => Some(&g.preview),
            _ => project.device(id),
        }
    }

    /// Every device with any in-flight preview substituted.
    pub fn view_devices<'a>(&'a self, project: &'a Project) -> impl Iterator<Item = &'a Device> + 'a {
        project.devices.iter().map(move |d| match &self.gesture {
            Some(g) if g.preview.id == d.id => &g.preview,
            _ => d,
        })
    }
}

// ── Actions & effects ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, IntoStaticStr)]
pub enum DiagramAction {
    ToggleAddMode,
    ToggleConnectMode,
    /// Leave add/connect mode and abandon any live gesture.
    Cancel,
    /// Pointer click on empty canvas, in image coordinates.
    CanvasClick(Point),
    DeviceClick(EntityId),
    Select(Option<EntityId>),
    DragStart(EntityId),
    /// New device centre.
    DragMove(Point),
    DragEnd,
    RotateStart(EntityId),
    /// Pointer position; rotation follows the pointer around the device.
    RotateMove(Point),
    RotateEnd,
    EditDevice(Device),
    DeleteDevice(EntityId),
    AddConnection { from: EntityId, to: EntityId },
    EditConnection(Connection),
    DeleteConnection(EntityId),
    RenameProject(String),
    /// Floor plan `data:` URL, or `None` to remove it.
    SetFloorPlan(Option<String>),
    ResetProject,
    /// Swap in a whole imported project.
    LoadProject(Box<Project>),
}

impl DiagramAction {
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Actions that change the project or start a change. Read-only
    /// sessions drop these.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Self::Cancel | Self::CanvasClick(_) | Self::DeviceClick(_) | Self::Select(_)
        )
    }
}

/// Follow-up the surface should perform after a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the edit form for a freshly placed device.
    OpenEditor(EntityId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    pub state: DiagramState,
    /// New snapshot to commit, if the action was accepted as a mutation.
    pub project: Option<Project>,
    pub effect: Option<Effect>,
}

impl Reduction {
    fn state(state: DiagramState) -> Self {
        Self {
            state,
            project: None,
            effect: None,
        }
    }

    fn commit(state: DiagramState, project: Project) -> Self {
        Self {
            state,
            project: Some(project),
            effect: None,
        }
    }
}

pub struct ReduceContext<'a> {
    pub ids: &'a IdGenerator,
    pub policy: RangePolicy,
}

// ── Reducer ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn reduce(
    project: &Project,
    state: &DiagramState,
    action: DiagramAction,
    ctx: &ReduceContext<'_>,
) -> Reduction {
    if state.read_only && action.is_mutating() {
        debug!(action = action.name(), "suppressed in read-only session");
        return Reduction::state(state.clone());
    }

    let mut next = state.clone();
    match action {
        DiagramAction::ToggleAddMode => {
            next.mode = if state.is_placing() {
                InteractionMode::Idle
            } else {
                InteractionMode::PlacingDevice
            };
            debug!(mode = ?next.mode, "mode changed");
            Reduction::state(next)
        }

        DiagramAction::ToggleConnectMode => {
            next.mode = if state.is_connecting() {
                InteractionMode::Idle
            } else {
                InteractionMode::Connecting { source: None }
            };
            debug!(mode = ?next.mode, "mode changed");
            Reduction::state(next)
        }

        DiagramAction::Cancel => {
            next.mode = InteractionMode::Idle;
            next.gesture = None;
            Reduction::state(next)
        }

        DiagramAction::CanvasClick(point) => match state.mode {
            InteractionMode::PlacingDevice => {
                let device = project.create_device(ctx.ids, point);
                let id = device.id.clone();
                debug!(%id, x = point.x, y = point.y, "device placed");
                next.mode = InteractionMode::Idle;
                next.selected = Some(id.clone());
                Reduction {
                    state: next,
                    project: Some(project.add_device(device)),
                    effect: Some(Effect::OpenEditor(id)),
                }
            }
            InteractionMode::Idle => {
                next.selected = None;
                Reduction::state(next)
            }
            InteractionMode::Connecting { .. } => Reduction::state(next),
        },

        DiagramAction::DeviceClick(id) => {
            if project.device(&id).is_none() {
                return Reduction::state(next);
            }
            match &state.mode {
                InteractionMode::Connecting { source: None } => {
                    debug!(%id, "connection source chosen");
                    next.mode = InteractionMode::Connecting { source: Some(id) };
                    Reduction::state(next)
                }
                InteractionMode::Connecting {
                    source: Some(source),
                } => match project.create_connection(ctx.ids, source.clone(), id) {
                    Some(connection) => {
                        debug!(from = %connection.from_id, to = %connection.to_id, "connection created");
                        next.mode = InteractionMode::Idle;
                        Reduction::commit(next, project.add_connection(connection))
                    }
                    None => Reduction::state(next),
                },
                InteractionMode::Idle | InteractionMode::PlacingDevice => {
                    next.selected = Some(id);
                    Reduction::state(next)
                }
            }
        }

        DiagramAction::Select(id) => {
            next.selected = id.filter(|id| project.device(id).is_some());
            Reduction::state(next)
        }

        DiagramAction::DragStart(id) => begin_gesture(project, next, &id, GestureKind::Move),
        DiagramAction::RotateStart(id) => begin_gesture(project, next, &id, GestureKind::Rotate),

        DiagramAction::DragMove(point) => {
            if let Some(g) = next.gesture.as_mut().filter(|g| g.kind == GestureKind::Move) {
                g.preview.x = point.x;
                g.preview.y = point.y;
            }
            Reduction::state(next)
        }

        DiagramAction::RotateMove(pointer) => {
            if let Some(g) = next.gesture.as_mut().filter(|g| g.kind == GestureKind::Rotate) {
                g.preview.rotation = geometry::compute_rotation(g.preview.position(), pointer);
            }
            Reduction::state(next)
        }

        DiagramAction::DragEnd => end_gesture(project, next, GestureKind::Move, ctx.policy),
        DiagramAction::RotateEnd => end_gesture(project, next, GestureKind::Rotate, ctx.policy),

        DiagramAction::EditDevice(device) => {
            if project.device(&device.id).is_none() {
                return Reduction::state(next);
            }
            let device = ctx.policy.apply(device);
            Reduction::commit(next, project.update_device(device))
        }

        DiagramAction::DeleteDevice(id) => {
            if project.device(&id).is_none() {
                return Reduction::state(next);
            }
            if next.selected.as_ref() == Some(&id) {
                next.selected = None;
            }
            if next.pending_source() == Some(&id) {
                next.mode = InteractionMode::Connecting { source: None };
            }
            if next.gesture.as_ref().is_some_and(|g| g.preview.id == id) {
                next.gesture = None;
            }
            debug!(%id, "device deleted");
            Reduction::commit(next, project.delete_device(&id))
        }

        DiagramAction::AddConnection { from, to } => {
            if project.device(&from).is_none() || project.device(&to).is_none() {
                return Reduction::state(next);
            }
            match project.create_connection(ctx.ids, from, to) {
                Some(connection) => Reduction::commit(next, project.add_connection(connection)),
                None => Reduction::state(next),
            }
        }

        DiagramAction::EditConnection(connection) => {
            if connection.from_id == connection.to_id || project.connection(&connection.id).is_none() {
                return Reduction::state(next);
            }
            Reduction::commit(next, project.update_connection(connection))
        }

        DiagramAction::DeleteConnection(id) => {
            if project.connection(&id).is_none() {
                return Reduction::state(next);
            }
            Reduction::commit(next, project.delete_connection(&id))
        }

        DiagramAction::RenameProject(name) => {
            if name == project.name {
                return Reduction::state(next);
            }
            Reduction::commit(next, project.rename(name))
        }

        DiagramAction::SetFloorPlan(image) => Reduction::commit(next, project.with_floor_plan(image)),

        DiagramAction::ResetProject => {
            let next = DiagramState {
                read_only: state.read_only,
                ..DiagramState::default()
            };
            Reduction::commit(next, project.cleared())
        }

        DiagramAction::LoadProject(loaded) => {
            let next = DiagramState {
                read_only: state.read_only,
                ..DiagramState::default()
            };
            debug!(name = %loaded.name, devices = loaded.devices.len(), "project loaded");
            Reduction::commit(next, *loaded)
        }
    }
}

fn begin_gesture(
    project: &Project,
    mut next: DiagramState,
    id: &EntityId,
    kind: GestureKind,
) -> Reduction {
    if next.mode != InteractionMode::Idle {
        return Reduction::state(next);
    }
    if let Some(device) = project.device(id) {
        next.selected = Some(id.clone());
        next.gesture = Some(Gesture::begin(kind, device));
    }
    Reduction::state(next)
}

fn end_gesture(
    project: &Project,
    mut next: DiagramState,
    kind: GestureKind,
    policy: RangePolicy,
) -> Reduction {
    let Some(gesture) = next.gesture.take_if(|g| g.kind == kind) else {
        return Reduction::state(next);
    };
    if !gesture.is_dirty() || project.device(&gesture.preview.id).is_none() {
        return Reduction::state(next);
    }
    let device = match kind {
        GestureKind::Move => gesture.preview,
        GestureKind::Rotate => policy.apply(gesture.preview),
    };
    debug!(id = %device.id, ?kind, "gesture committed");
    Reduction::commit(next, project.update_device(device))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Harness {
        ids: IdGenerator,
        policy: RangePolicy,
        project: Project,
        state: DiagramState,
        effects: Vec<Effect>,
        commits: usize,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                ids: IdGenerator::new(),
                policy: RangePolicy::Strict,
                project: Project::default(),
                state: DiagramState::default(),
                effects: Vec::new(),
                commits: 0,
            }
        }

        fn apply(&mut self, action: DiagramAction) {
            let ctx = ReduceContext {
                ids: &self.ids,
                policy: self.policy,
            };
            let r = reduce(&self.project, &self.state, action, &ctx);
            self.state = r.state;
            if let Some(p) = r.project {
                self.project = p;
                self.commits += 1;
            }
            self.effects.extend(r.effect);
        }

        fn place(&mut self, x: f64, y: f64) -> EntityId {
            self.apply(DiagramAction::ToggleAddMode);
            self.apply(DiagramAction::CanvasClick(Point::new(x, y)));
            self.project.devices.last().unwrap().id.clone()
        }
    }

    #[test]
    fn placing_creates_selects_and_opens_editor() {
        let mut h = Harness::new();
        let id = h.place(100.0, 100.0);
        assert_eq!(h.project.devices.len(), 1);
        let d = &h.project.devices[0];
        assert_eq!((d.x, d.y), (100.0, 100.0));
        assert_eq!(d.name, "Thiết bị 1");
        assert_eq!(h.state.mode, InteractionMode::Idle);
        assert_eq!(h.state.selected, Some(id.clone()));
        assert_eq!(h.effects, vec![Effect::OpenEditor(id)]);
    }

    #[test]
    fn add_and_connect_modes_are_exclusive() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        h.apply(DiagramAction::ToggleConnectMode);
        h.apply(DiagramAction::DeviceClick(a));
        assert!(h.state.pending_source().is_some());
        h.apply(DiagramAction::ToggleAddMode);
        assert_eq!(h.state.mode, InteractionMode::PlacingDevice);
        assert!(h.state.pending_source().is_none());
        h.apply(DiagramAction::ToggleConnectMode);
        assert_eq!(h.state.mode, InteractionMode::Connecting { source: None });
        h.apply(DiagramAction::ToggleConnectMode);
        assert_eq!(h.state.mode, InteractionMode::Idle);
    }

    #[test]
    fn connect_two_devices_then_exit() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        let b = h.place(50.0, 0.0);
        h.apply(DiagramAction::ToggleConnectMode);
        h.apply(DiagramAction::CanvasClick(Point::new(500.0, 500.0)));
        assert_eq!(h.state.mode, InteractionMode::Connecting { source: None });
        h.apply(DiagramAction::DeviceClick(a.clone()));
        h.apply(DiagramAction::DeviceClick(b.clone()));
        assert_eq!(h.project.connections.len(), 1);
        assert_eq!(h.project.connections[0].from_id, a);
        assert_eq!(h.project.connections[0].to_id, b);
        assert_eq!(h.state.mode, InteractionMode::Idle);
    }

    #[test]
    fn clicking_source_twice_is_noop() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        h.place(50.0, 0.0);
        h.apply(DiagramAction::ToggleConnectMode);
        h.apply(DiagramAction::DeviceClick(a.clone()));
        let before = h.commits;
        h.apply(DiagramAction::DeviceClick(a.clone()));
        assert_eq!(h.commits, before);
        assert!(h.project.connections.is_empty());
        assert_eq!(h.state.mode, InteractionMode::Connecting { source: Some(a) });
    }

    #[test]
    fn canvas_click_when_idle_clears_selection() {
        let mut h = Harness::new();
        h.place(0.0, 0.0);
        assert!(h.state.selected.is_some());
        h.apply(DiagramAction::CanvasClick(Point::new(300.0, 300.0)));
        assert!(h.state.selected.is_none());
        assert_eq!(h.project.devices.len(), 1);
    }

    #[test]
    fn drag_commits_once_on_release() {
        let mut h = Harness::new();
        let a = h.place(10.0, 10.0);
        let before = h.commits;
        h.apply(DiagramAction::DragStart(a.clone()));
        for step in 1..=20 {
            h.apply(DiagramAction::DragMove(Point::new(10.0 + f64::from(step), 10.0)));
        }
        assert_eq!(h.commits, before);
        assert_eq!(h.state.view_device(&h.project, &a).unwrap().x, 30.0);
        assert_eq!(h.project.device(&a).unwrap().x, 10.0);
        h.apply(DiagramAction::DragEnd);
        assert_eq!(h.commits, before + 1);
        assert_eq!(h.project.device(&a).unwrap().position(), Point::new(30.0, 10.0));
        assert!(h.state.gesture.is_none());
    }

    #[test]
    fn rotate_follows_pointer_and_normalizes() {
        let mut h = Harness::new();
        let a = h.place(100.0, 100.0);
        h.apply(DiagramAction::RotateStart(a.clone()));
        h.apply(DiagramAction::RotateMove(Point::new(100.0, 200.0)));
        assert_eq!(h.state.view_device(&h.project, &a).unwrap().rotation, 180.0);
        h.apply(DiagramAction::RotateMove(Point::new(0.0, 0.0)));
        h.apply(DiagramAction::RotateEnd);
        let r = h.project.device(&a).unwrap().rotation;
        assert!((r - 315.0).abs() < 1e-9, "{r}");
    }

    #[test]
    fn untouched_gesture_does_not_commit() {
        let mut h = Harness::new();
        let a = h.place(10.0, 10.0);
        let before = h.commits;
        h.apply(DiagramAction::DragStart(a));
        h.apply(DiagramAction::DragEnd);
        assert_eq!(h.commits, before);
    }

    #[test]
    fn cancel_abandons_gesture() {
        let mut h = Harness::new();
        let a = h.place(10.0, 10.0);
        h.apply(DiagramAction::DragStart(a.clone()));
        h.apply(DiagramAction::DragMove(Point::new(99.0, 99.0)));
        h.apply(DiagramAction::Cancel);
        h.apply(DiagramAction::DragEnd);
        assert_eq!(h.project.device(&a).unwrap().x, 10.0);
    }

    #[test]
    fn delete_device_clears_selection_and_links() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        let b = h.place(10.0, 0.0);
        h.apply(DiagramAction::AddConnection { from: a.clone(), to: b.clone() });
        h.apply(DiagramAction::Select(Some(a.clone())));
        h.apply(DiagramAction::DeleteDevice(a));
        assert!(h.state.selected.is_none());
        assert!(h.project.connections.is_empty());
        assert_eq!(h.project.devices.len(), 1);
    }

    #[test]
    fn delete_missing_device_is_silent() {
        let mut h = Harness::new();
        h.place(0.0, 0.0);
        let before = h.commits;
        h.apply(DiagramAction::DeleteDevice(EntityId::new("cam_nope")));
        assert_eq!(h.commits, before);
    }

    #[test]
    fn edit_device_applies_range_policy() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        let mut edited = h.project.device(&a).unwrap().clone();
        edited.rotation = 725.0;
        edited.fov = 2.0;
        edited.name = "Cổng chính".into();
        h.apply(DiagramAction::EditDevice(edited.clone()));
        let stored = h.project.device(&a).unwrap();
        assert_eq!(stored.rotation, 5.0);
        assert_eq!(stored.fov, 15.0);
        assert_eq!(stored.name, "Cổng chính");

        h.policy = RangePolicy::Permissive;
        h.apply(DiagramAction::EditDevice(edited.clone()));
        assert_eq!(h.project.device(&a).unwrap(), &edited);
    }

    #[test]
    fn read_only_suppresses_mutations_but_allows_selection() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        h.state = DiagramState::read_only();
        let before = h.commits;
        h.apply(DiagramAction::ToggleAddMode);
        h.apply(DiagramAction::CanvasClick(Point::new(5.0, 5.0)));
        h.apply(DiagramAction::DragStart(a.clone()));
        h.apply(DiagramAction::DeleteDevice(a.clone()));
        h.apply(DiagramAction::ResetProject);
        assert_eq!(h.commits, before);
        assert_eq!(h.state.mode, InteractionMode::Idle);
        h.apply(DiagramAction::DeviceClick(a.clone()));
        assert_eq!(h.state.selected, Some(a));
    }

    #[test]
    fn reset_clears_everything_but_name() {
        let mut h = Harness::new();
        h.apply(DiagramAction::RenameProject("Kho".into()));
        h.apply(DiagramAction::SetFloorPlan(Some("data:image/png;base64,AA==".into())));
        h.place(0.0, 0.0);
        h.apply(DiagramAction::ResetProject);
        assert_eq!(h.project.name, "Kho");
        assert!(h.project.floor_plan.is_none());
        assert!(h.project.devices.is_empty());
        assert_eq!(h.state, DiagramState::default());
    }

    #[test]
    fn load_replaces_project_and_drops_selection() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        h.apply(DiagramAction::DeviceClick(a));
        let imported = Project::default().rename("Nhập");
        h.apply(DiagramAction::LoadProject(Box::new(imported.clone())));
        assert_eq!(h.project, imported);
        assert_eq!(h.state.selected, None);
    }

    #[test]
    fn delete_connection_by_id() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        let b = h.place(10.0, 0.0);
        h.apply(DiagramAction::AddConnection { from: a, to: b });
        let id = h.project.connections[0].id.clone();
        h.apply(DiagramAction::DeleteConnection(id));
        assert!(h.project.connections.is_empty());
    }

    #[test]
    fn placing_mode_device_click_selects_and_stays() {
        let mut h = Harness::new();
        let a = h.place(0.0, 0.0);
        h.apply(DiagramAction::Select(None));
        h.apply(DiagramAction::ToggleAddMode);
        h.apply(DiagramAction::DeviceClick(a.clone()));
        assert_eq!(h.state.selected, Some(a));
        assert!(h.state.is_placing());
    }
}
