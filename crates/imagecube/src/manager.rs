//! Image cube manager
//!
//! [`ImageCube`] owns the state of every container it is attached to, keyed
//! by container id, along with the scheduler driving their pause timers and
//! rotation tweens. The host calls [`ImageCube::tick`] once per frame.
//!
//! Every operation on a container that is not attached is a no-op.

use imagecube_animation::{AnimationScheduler, Frame, SchedulerEvent, TimerId, Tween, TweenId};
use imagecube_surface::{Property, Style, StyleSystem, SurfaceId, Value};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::command::Command;
use crate::plan::{plan_transition, RotateRequest, TransitionPlan, SYNTHETIC_CLASS};
use crate::render;
use crate::selection;
use crate::settings::{RotateEvent, Settings, SettingsPatch};

/// Class marking an attached container
pub const MARKER_CLASS: &str = "hasImageCube";

/// Called once when a particular rotation completes
pub type RotateCallback = Box<dyn FnOnce(&RotateEvent)>;

/// Scheduling state of one image cube
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// No timer pending and nothing animating
    Idle,
    /// Pause timer armed
    Waiting,
    /// A rotation is in flight
    Animating,
}

#[derive(Clone, Debug)]
struct SavedSurface {
    id: SurfaceId,
    style: Style,
    visible: bool,
}

impl SavedSurface {
    fn capture<S: StyleSystem>(stage: &S, id: SurfaceId) -> Self {
        Self {
            id,
            style: stage.style(id).cloned().unwrap_or_default(),
            visible: stage.is_visible(id),
        }
    }

    fn restore<S: StyleSystem>(&self, stage: &mut S) {
        stage.replace_style(self.id, self.style.clone());
        stage.set_visible(self.id, self.visible);
    }
}

struct Rotation {
    tween: TweenId,
    plan: TransitionPlan,
    event: RotateEvent,
    callback: Option<RotateCallback>,
}

struct Instance {
    settings: Settings,
    current: Option<SurfaceId>,
    next: Option<SurfaceId>,
    timer: Option<TimerId>,
    container: SavedSurface,
    panels: Vec<SavedSurface>,
    rotation: Option<Rotation>,
}

impl Instance {
    fn phase(&self) -> Phase {
        if self.rotation.is_some() {
            Phase::Animating
        } else if self.timer.is_some() {
            Phase::Waiting
        } else {
            Phase::Idle
        }
    }
}

/// Per-container image cube state and scheduling
pub struct ImageCube {
    defaults: Settings,
    instances: FxHashMap<SurfaceId, Instance>,
    scheduler: AnimationScheduler<SurfaceId>,
    rng: SmallRng,
}

impl ImageCube {
    pub fn new() -> Self {
        Self::with_rng(SmallRng::from_os_rng())
    }

    /// A manager whose random choices are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            defaults: Settings::default(),
            instances: FxHashMap::default(),
            scheduler: AnimationScheduler::new(),
            rng,
        }
    }

    /// Settings new attachments start from
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    /// Override the defaults for subsequent attachments
    pub fn set_defaults(&mut self, patch: SettingsPatch) -> &mut Self {
        self.defaults.apply(patch, &Settings::default());
        self
    }

    pub fn is_attached(&self, container: SurfaceId) -> bool {
        self.instances.contains_key(&container)
    }

    pub fn settings(&self, container: SurfaceId) -> Option<&Settings> {
        self.instances.get(&container).map(|i| &i.settings)
    }

    /// Panel on display
    pub fn current(&self, container: SurfaceId) -> Option<SurfaceId> {
        self.instances.get(&container).and_then(|i| i.current)
    }

    /// Panel the next rotation will bring in
    pub fn next(&self, container: SurfaceId) -> Option<SurfaceId> {
        self.instances.get(&container).and_then(|i| i.next)
    }

    pub fn phase(&self, container: SurfaceId) -> Option<Phase> {
        self.instances.get(&container).map(Instance::phase)
    }

    pub fn has_active_animations(&self) -> bool {
        self.scheduler.has_active_animations()
    }

    /// Run a command against a container
    pub fn execute<S: StyleSystem>(
        &mut self,
        stage: &mut S,
        container: SurfaceId,
        command: Command,
    ) -> &mut Self {
        match command {
            Command::Attach(patch) => self.attach(stage, container, patch),
            Command::Reconfigure(patch) => self.reconfigure(stage, container, patch),
            Command::Rotate { next } => self.rotate(stage, container, next),
            Command::Start => self.start(stage, container),
            Command::Stop { temporary } => self.stop(container, temporary),
            Command::Detach => self.detach(stage, container),
        }
    }

    /// Attach to a container, merging `patch` over the defaults.
    ///
    /// Every panel is sized to the container and positioned absolutely; all
    /// but the first are hidden. Attaching twice is a no-op.
    pub fn attach<S: StyleSystem>(
        &mut self,
        stage: &mut S,
        container: SurfaceId,
        patch: SettingsPatch,
    ) -> &mut Self {
        if self.instances.contains_key(&container) || stage.has_class(container, MARKER_CLASS) {
            debug!(?container, "already attached");
            return self;
        }

        let mut settings = self.defaults.clone();
        settings.apply(patch, &self.defaults);

        let saved_container = SavedSurface::capture(stage, container);
        stage.add_class(container, MARKER_CLASS);

        let size = stage.size(container);
        let panels = selection::panels(stage, container);
        let mut saved = Vec::with_capacity(panels.len());
        for (i, panel) in panels.into_iter().enumerate() {
            saved.push(SavedSurface::capture(stage, panel));
            stage.apply(
                panel,
                &[
                    (Property::Width, Value::px(size.width)),
                    (Property::Height, Value::px(size.height)),
                    (Property::Position, Value::keyword("absolute")),
                    (Property::LineHeight, Value::em(settings.line_height.1)),
                    (Property::LetterSpacing, Value::em(settings.letter_spacing.1)),
                ],
            );
            if i > 0 {
                stage.hide(panel);
            }
        }

        debug!(?container, panels = saved.len(), "attached");
        self.instances.insert(
            container,
            Instance {
                settings,
                current: None,
                next: None,
                timer: None,
                container: saved_container,
                panels: saved,
                rotation: None,
            },
        );
        self.prepare(stage, container);
        self
    }

    /// Merge a partial settings update and recompute current/next
    pub fn reconfigure<S: StyleSystem>(
        &mut self,
        stage: &mut S,
        container: SurfaceId,
        patch: SettingsPatch,
    ) -> &mut Self {
        let Some(instance) = self.instances.get_mut(&container) else {
            debug!(?container, "reconfigure on unattached container");
            return self;
        };
        instance.settings.apply(patch, &self.defaults);
        self.prepare(stage, container);
        self
    }

    /// Resume automatic rotation
    pub fn start<S: StyleSystem>(&mut self, stage: &mut S, container: SurfaceId) -> &mut Self {
        self.reconfigure(stage, container, SettingsPatch::new().repeat(true))
    }

    /// Cancel the pending timer; unless `temporary`, also turn repeat off.
    ///
    /// A rotation already in flight still completes.
    pub fn stop(&mut self, container: SurfaceId, temporary: bool) -> &mut Self {
        let Some(instance) = self.instances.get_mut(&container) else {
            return self;
        };
        if let Some(timer) = instance.timer.take() {
            self.scheduler.cancel(timer);
        }
        if !temporary {
            instance.settings.repeat = false;
        }
        trace!(?container, temporary, "stopped");
        self
    }

    /// Rotate to the next panel, or to `next` if it is another panel of
    /// this container
    pub fn rotate<S: StyleSystem>(
        &mut self,
        stage: &mut S,
        container: SurfaceId,
        next: Option<SurfaceId>,
    ) -> &mut Self {
        self.begin_rotation(stage, container, next, None);
        self
    }

    /// Like [`rotate`](Self::rotate), calling `callback` once this
    /// rotation completes
    pub fn rotate_with<S: StyleSystem>(
        &mut self,
        stage: &mut S,
        container: SurfaceId,
        next: Option<SurfaceId>,
        callback: impl FnOnce(&RotateEvent) + 'static,
    ) -> &mut Self {
        self.begin_rotation(stage, container, next, Some(Box::new(callback)));
        self
    }

    /// Detach from a container, restoring every panel exactly as it was
    pub fn detach<S: StyleSystem>(&mut self, stage: &mut S, container: SurfaceId) -> &mut Self {
        let Some(instance) = self.instances.remove(&container) else {
            debug!(?container, "detach on unattached container");
            return self;
        };
        if let Some(timer) = instance.timer {
            self.scheduler.cancel(timer);
        }
        if let Some(rotation) = instance.rotation {
            self.scheduler.cancel_tween(rotation.tween);
            render::discard(stage, &rotation.plan);
        }
        for panel in &instance.panels {
            panel.restore(stage);
        }
        instance.container.restore(stage);
        stage.remove_class(container, MARKER_CLASS);
        debug!(?container, "detached");
        self
    }

    /// Advance timers and rotations by `dt_ms` milliseconds
    pub fn tick<S: StyleSystem>(&mut self, stage: &mut S, dt_ms: f32) {
        for event in self.scheduler.tick(dt_ms) {
            match event {
                SchedulerEvent::TimerFired { owner, id } => {
                    let Some(instance) = self.instances.get_mut(&owner) else {
                        continue;
                    };
                    if instance.timer != Some(id) {
                        continue;
                    }
                    instance.timer = None;
                    trace!(container = ?owner, "pause elapsed");
                    self.begin_rotation(stage, owner, None, None);
                }
                SchedulerEvent::Frame { owner, id, frame } => {
                    let Some(rotation) = self
                        .instances
                        .get(&owner)
                        .and_then(|i| i.rotation.as_ref())
                        .filter(|r| r.tween == id)
                    else {
                        continue;
                    };
                    if frame.is_last {
                        self.complete_rotation(stage, owner);
                    } else {
                        render::render_frame(stage, &rotation.plan, frame.progress);
                    }
                }
            }
        }
    }

    /// Note the panel on display, pick the next one and arm the pause timer
    fn prepare<S: StyleSystem>(&mut self, stage: &S, container: SurfaceId) {
        let Self {
            instances,
            scheduler,
            rng,
            ..
        } = self;
        let Some(instance) = instances.get_mut(&container) else {
            return;
        };

        // Mid-rotation both panels may be hidden behind strips
        if instance.rotation.is_none() {
            instance.current = selection::first_visible_panel(stage, container);
        }
        instance.next = instance.current.map(|current| {
            selection::select_next(stage, container, current, instance.settings.selection, rng)
        });

        if instance.settings.repeat && instance.timer.is_none() {
            instance.timer = Some(scheduler.schedule(container, instance.settings.pause));
        }
        trace!(?container, current = ?instance.current, next = ?instance.next, "prepared");
    }

    fn begin_rotation<S: StyleSystem>(
        &mut self,
        stage: &mut S,
        container: SurfaceId,
        next: Option<SurfaceId>,
        callback: Option<RotateCallback>,
    ) {
        if !self.instances.contains_key(&container) {
            debug!(?container, "rotate on unattached container");
            return;
        }

        // At most one rotation per container
        let in_flight = self
            .instances
            .get(&container)
            .is_some_and(|i| i.rotation.is_some());
        if in_flight {
            self.complete_rotation(stage, container);
        }
        self.stop(container, true);

        let Self {
            instances,
            scheduler,
            rng,
            ..
        } = self;
        let Some(instance) = instances.get_mut(&container) else {
            return;
        };

        if let Some(target) = next {
            let is_panel = stage.contains_child(container, target)
                && !stage.has_class(target, SYNTHETIC_CLASS);
            if is_panel && Some(target) != instance.current {
                instance.next = Some(target);
            } else {
                debug!(?container, ?target, "ignoring rotation target");
            }
        }

        let (Some(current), Some(incoming)) = (instance.current, instance.next) else {
            debug!(?container, "nothing to rotate");
            return;
        };
        if current == incoming {
            debug!(?container, "single panel, nothing to rotate");
            return;
        }

        let settings = &instance.settings;
        let direction = settings
            .direction
            .resolve(&settings.random_selection, rng);
        let event = RotateEvent {
            container,
            current,
            next: incoming,
            direction,
        };
        if let Some(hook) = settings.before_rotate.clone() {
            hook.call(&event);
        }

        let request = RotateRequest {
            container,
            outgoing: current,
            incoming,
            direction,
        };
        let plan = plan_transition(stage, &request, settings);
        let (tween, frame) =
            scheduler.add_tween(container, Tween::new(settings.speed, settings.easing));
        render::render_frame(stage, &plan, frame.progress);
        debug!(?container, ?direction, speed = settings.speed, "rotation started");

        instance.rotation = Some(Rotation {
            tween,
            plan,
            event,
            callback,
        });
        if frame.is_last {
            self.complete_rotation(stage, container);
        }
    }

    fn complete_rotation<S: StyleSystem>(&mut self, stage: &mut S, container: SurfaceId) {
        let Some(instance) = self.instances.get_mut(&container) else {
            return;
        };
        let Some(rotation) = instance.rotation.take() else {
            return;
        };
        let last = self
            .scheduler
            .finish_tween(rotation.tween)
            .unwrap_or(Frame::LAST);

        render::render_frame(stage, &rotation.plan, last.progress);
        render::finish(stage, &rotation.plan);
        debug!(?container, "rotation finished");

        if let Some(hook) = instance.settings.after_rotate.clone() {
            hook.call(&rotation.event);
        }
        if let Some(callback) = rotation.callback {
            callback(&rotation.event);
        }
        self.prepare(stage, container);
    }
}

impl Default for ImageCube {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Direction, Selection};
    use imagecube_surface::SurfaceTree;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn stage(panels: usize) -> (SurfaceTree, SurfaceId, Vec<SurfaceId>) {
        let mut tree = SurfaceTree::new();
        let container = tree.insert(Style::parse(
            "position: absolute; left: 10px; top: 20px; width: 200px; height: 100px",
        ));
        let ids = (0..panels)
            .map(|i| {
                tree.insert_child(container, Style::parse(&format!("z-index: {i}")))
                    .unwrap()
            })
            .collect();
        (tree, container, ids)
    }

    fn flat() -> SettingsPatch {
        SettingsPatch::new()
            .full_3d(false)
            .direction(Direction::Down)
            .speed(100)
            .pause(1000)
    }

    #[test]
    fn attach_prepares_first_panel() {
        let (mut tree, container, p) = stage(3);
        let mut cube = ImageCube::with_seed(1);
        cube.attach(&mut tree, container, flat());

        assert_eq!(cube.current(container), Some(p[0]));
        assert_eq!(cube.next(container), Some(p[1]));
        assert_eq!(cube.phase(container), Some(Phase::Waiting));
        assert!(tree.is_visible(p[0]));
        assert!(!tree.is_visible(p[1]));
        assert_eq!(tree.style(p[2]).unwrap().px(Property::Width), Some(200.0));
    }

    #[test]
    fn pause_timer_starts_rotation() {
        let (mut tree, container, p) = stage(2);
        let mut cube = ImageCube::with_seed(1);
        cube.attach(&mut tree, container, flat());

        cube.tick(&mut tree, 999.0);
        assert_eq!(cube.phase(container), Some(Phase::Waiting));
        cube.tick(&mut tree, 1.0);
        assert_eq!(cube.phase(container), Some(Phase::Animating));

        cube.tick(&mut tree, 100.0);
        assert_eq!(cube.current(container), Some(p[1]));
        assert_eq!(cube.next(container), Some(p[0]));
        assert_eq!(cube.phase(container), Some(Phase::Waiting));
    }

    #[test]
    fn negative_pause_rotates_on_next_tick() {
        let (mut tree, container, p) = stage(2);
        let mut cube = ImageCube::with_seed(1);
        let patch = SettingsPatch::single("pause", serde_json::json!(-500)).unwrap();
        cube.attach(&mut tree, container, flat().repeat(true));
        cube.reconfigure(&mut tree, container, patch);
        cube.stop(container, false).start(&mut tree, container);
        assert_eq!(cube.phase(container), Some(Phase::Waiting));

        cube.tick(&mut tree, 0.0);
        assert_eq!(cube.phase(container), Some(Phase::Animating));
        cube.tick(&mut tree, 100.0);
        assert_eq!(cube.current(container), Some(p[1]));
    }

    #[test]
    fn hooks_and_callback_fire_in_order() {
        let (mut tree, container, p) = stage(2);
        let log = Rc::new(RefCell::new(Vec::new()));
        let (before, after, done) = (log.clone(), log.clone(), log.clone());
        let patch = flat()
            .repeat(false)
            .before_rotate(move |e| before.borrow_mut().push(("before", e.next)))
            .after_rotate(move |e| after.borrow_mut().push(("after", e.next)));

        let mut cube = ImageCube::with_seed(1);
        cube.attach(&mut tree, container, patch);
        cube.rotate_with(&mut tree, container, None, move |e| {
            done.borrow_mut().push(("done", e.next))
        });
        assert_eq!(*log.borrow(), vec![("before", p[1])]);

        cube.tick(&mut tree, 100.0);
        assert_eq!(
            *log.borrow(),
            vec![("before", p[1]), ("after", p[1]), ("done", p[1])]
        );
    }

    #[test]
    fn second_rotate_fast_forwards_the_first() {
        let (mut tree, container, p) = stage(3);
        let mut cube = ImageCube::with_seed(1);
        cube.attach(&mut tree, container, flat().repeat(false));
        cube.rotate(&mut tree, container, None);
        cube.tick(&mut tree, 50.0);
        cube.rotate(&mut tree, container, None);

        assert_eq!(cube.current(container), Some(p[1]));
        assert!(!tree.is_visible(p[0]));
        cube.tick(&mut tree, 100.0);
        assert_eq!(cube.current(container), Some(p[2]));
        assert_eq!(tree.children(container), p);
    }

    #[test]
    fn explicit_target_must_be_another_panel() {
        let (mut tree, container, p) = stage(3);
        let stranger = tree.insert(Style::new());
        let mut cube = ImageCube::with_seed(1);
        cube.attach(&mut tree, container, flat().repeat(false));

        cube.rotate(&mut tree, container, Some(stranger));
        cube.tick(&mut tree, 100.0);
        assert_eq!(cube.current(container), Some(p[1]));

        cube.rotate(&mut tree, container, Some(p[0]));
        cube.tick(&mut tree, 100.0);
        assert_eq!(cube.current(container), Some(p[0]));
    }

    #[test]
    fn zero_speed_completes_immediately() {
        let (mut tree, container, p) = stage(2);
        let mut cube = ImageCube::with_seed(1);
        cube.attach(&mut tree, container, flat().speed(0).repeat(false));
        cube.rotate(&mut tree, container, None);
        assert_eq!(cube.current(container), Some(p[1]));
        assert_eq!(cube.phase(container), Some(Phase::Idle));
    }

    #[test]
    fn single_panel_never_animates() {
        let (mut tree, container, p) = stage(1);
        let mut cube = ImageCube::with_seed(1);
        cube.attach(&mut tree, container, flat().repeat(false));
        cube.rotate(&mut tree, container, None);
        assert_eq!(cube.phase(container), Some(Phase::Idle));
        assert_eq!(cube.current(container), Some(p[0]));
    }

    #[test]
    fn unattached_operations_are_noops() {
        let (mut tree, container, _) = stage(2);
        let mut cube = ImageCube::with_seed(1);
        cube.rotate(&mut tree, container, None)
            .stop(container, false)
            .start(&mut tree, container)
            .detach(&mut tree, container);
        assert_eq!(cube.current(container), None);
        assert_eq!(cube.phase(container), None);
        assert!(!tree.has_class(container, MARKER_CLASS));
    }

    #[test]
    fn set_defaults_applies_to_new_attachments() {
        let (mut tree, container, _) = stage(2);
        let mut cube = ImageCube::with_seed(1);
        cube.set_defaults(SettingsPatch::new().selection(Selection::Backward));
        cube.attach(&mut tree, container, SettingsPatch::new());
        assert_eq!(
            cube.settings(container).map(|s| s.selection),
            Some(Selection::Backward)
        );
    }

    #[test]
    fn execute_dispatches_commands() {
        let (mut tree, container, p) = stage(2);
        let mut cube = ImageCube::with_seed(1);
        cube.execute(&mut tree, container, Command::Attach(flat()))
            .execute(&mut tree, container, Command::Stop { temporary: false });
        assert_eq!(cube.phase(container), Some(Phase::Idle));
        assert_eq!(cube.settings(container).map(|s| s.repeat), Some(false));

        cube.execute(&mut tree, container, Command::Rotate { next: None });
        cube.tick(&mut tree, 100.0);
        assert_eq!(cube.current(container), Some(p[1]));
    }
}
