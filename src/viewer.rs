//! Viewer instances: state, notifications and event dispatch.

use crate::config::{Orientation, ViewerConfig};
use crate::error::Result;
use crate::input::{ContainerBox, InputState, PointerEvent, WheelEvent};
use crate::layout::{solve_layout, FillMode, Layout, Size, SizeHints};
use crate::mappers::InteractionMapper;
use crate::metrics::{measure, total_sprites, MeasureOptions, PixelProbe, SheetSpec, SourceImage};
use crate::progress::LoadProgress;
use crate::render::{draw_command, DrawCommand};
use crate::scheduler::{Scheduler, TimerId};
use crate::state::StateStore;

/// Lifecycle notifications delivered to listeners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// The viewer was initialized and waits for images
    Init,
    /// The host reported image loading progress
    Progress,
    /// Images were measured and the viewer is ready
    Load,
    /// Frame or lane changed
    FrameChanged,
    /// A frame update happened, changed or not
    Frame,
    /// The current frame should be painted
    Draw,
    /// Loading finished and the first frame was drawn
    Complete,
    /// The viewer is being torn down
    Destroy,
}

/// Receiver of lifecycle notifications.
///
/// Notifications are dispatched synchronously, inside the call that caused
/// them.
pub trait Listener {
    /// Handle `event` with the viewer state after the change.
    fn on_event(&mut self, event: Event, state: &ViewerState);
}

impl<F> Listener for F
where
    F: FnMut(Event, &ViewerState),
{
    fn on_event(&mut self, event: Event, state: &ViewerState) {
        self(event, state)
    }
}

/// Live configuration and state of one viewer.
#[derive(Clone, Debug)]
pub struct ViewerState {
    pub(crate) frame: usize,
    pub(crate) lane: usize,
    pub(crate) frames: usize,
    pub(crate) configured_frames: Option<usize>,
    pub(crate) lanes: usize,
    pub(crate) frames_x: Option<usize>,
    pub(crate) frames_y: Option<usize>,
    pub(crate) wrap: bool,
    pub(crate) wrap_lane: bool,
    pub(crate) looping: bool,
    pub(crate) stop_frame: usize,
    pub(crate) reverse: bool,
    pub(crate) animate: bool,
    pub(crate) frame_time: u32,
    pub(crate) sense: f64,
    pub(crate) sense_lane: Option<f64>,
    pub(crate) orientation: Orientation,
    pub(crate) fill_mode: FillMode,
    pub(crate) width: Option<u32>,
    pub(crate) height: Option<u32>,
    pub(crate) responsive: bool,
    pub(crate) detect_subsampling: bool,
    pub(crate) loading: bool,
    pub(crate) dragging: bool,
    pub(crate) container: ContainerBox,
    pub(crate) metrics: Vec<SheetSpec>,
    pub(crate) progress: LoadProgress,
}

impl ViewerState {
    fn from_config(config: &ViewerConfig) -> Self {
        Self {
            frame: config.frame,
            lane: config.lane,
            frames: config.frames.unwrap_or(1).max(1),
            configured_frames: config.frames,
            lanes: config.lanes.max(1),
            frames_x: config.frames_x,
            frames_y: config.frames_y,
            wrap: config.wrap,
            wrap_lane: config.wrap_lane,
            looping: config.looping,
            stop_frame: config.stop_frame,
            reverse: config.reverse,
            animate: config.animate,
            frame_time: config.frame_time,
            sense: config.sense,
            sense_lane: config.sense_lane,
            orientation: config.orientation,
            fill_mode: config.fill_mode,
            width: config.width,
            height: config.height,
            responsive: config.responsive,
            detect_subsampling: config.detect_subsampling,
            loading: false,
            dragging: false,
            container: ContainerBox::default(),
            metrics: Vec::new(),
            progress: LoadProgress::default(),
        }
    }

    /// Current frame index.
    #[inline]
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Current lane index.
    #[inline]
    pub fn lane(&self) -> usize {
        self.lane
    }

    /// Frames per lane.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Number of lanes.
    #[inline]
    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Whether frames wrap past either end.
    #[inline]
    pub fn wrap(&self) -> bool {
        self.wrap
    }

    /// Whether lanes wrap past either end.
    #[inline]
    pub fn wrap_lane(&self) -> bool {
        self.wrap_lane
    }

    /// Whether the animation loops past `stop_frame`.
    #[inline]
    pub fn looping(&self) -> bool {
        self.looping
    }

    /// Frame on which a non-looping animation stops.
    #[inline]
    pub fn stop_frame(&self) -> usize {
        self.stop_frame
    }

    /// Whether the animation runs backwards.
    #[inline]
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// Whether the viewer wants to animate.
    #[inline]
    pub fn animate(&self) -> bool {
        self.animate
    }

    /// Milliseconds per animation tick.
    #[inline]
    pub fn frame_time(&self) -> u32 {
        self.frame_time
    }

    /// Frames advanced per container extent of drag.
    #[inline]
    pub fn sense(&self) -> f64 {
        self.sense
    }

    /// Lanes advanced per container extent of drag.
    #[inline]
    pub fn sense_lane(&self) -> f64 {
        self.sense_lane.unwrap_or(self.sense)
    }

    /// Drag axis.
    #[inline]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// How frames fit into the container.
    #[inline]
    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    /// Whether images are still loading.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a pointer gesture is in progress.
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Inner box of the host container.
    #[inline]
    pub fn container(&self) -> ContainerBox {
        self.container
    }

    /// Measured sheets, empty until loaded.
    #[inline]
    pub fn metrics(&self) -> &[SheetSpec] {
        &self.metrics
    }

    /// Latest loading progress.
    #[inline]
    pub fn progress(&self) -> LoadProgress {
        self.progress
    }

    /// Natural size of one frame, once measured.
    pub fn frame_size(&self) -> Option<Size> {
        let sprite = self.metrics.first()?.sprites.first()?;
        Some(Size::new(sprite.width, sprite.height))
    }

    /// Size sources for layout.
    pub fn size_hints(&self) -> SizeHints {
        SizeHints {
            width: self.width,
            height: self.height,
            frame: self.frame_size(),
            host: Size::new(
                self.container.width.max(0.0).floor() as u32,
                self.container.height.max(0.0).floor() as u32,
            ),
        }
    }

    /// Layout of the paint surface inside the container.
    pub fn layout(&self) -> Layout {
        let hints = self.size_hints();
        let outer = if self.responsive {
            hints.responsive_outer_size()
        } else {
            hints.outer_size()
        };
        solve_layout(hints.inner_size(), outer, self.fill_mode)
    }
}

/// Everything a viewer owns except its mappers.
///
/// Mappers receive a `&mut ViewerCore` and act through its entry points.
pub struct ViewerCore {
    pub(crate) state: ViewerState,
    pub(crate) store: StateStore,
    pub(crate) scheduler: Box<dyn Scheduler>,
    listeners: Vec<Box<dyn Listener>>,
}

impl ViewerCore {
    /// Create a core from a configuration and a timer source.
    pub fn new(config: &ViewerConfig, scheduler: Box<dyn Scheduler>) -> Self {
        Self {
            state: ViewerState::from_config(config),
            store: StateStore::new(),
            scheduler,
            listeners: Vec::new(),
        }
    }

    /// Register a listener for lifecycle notifications.
    pub fn add_listener(&mut self, listener: impl Listener + 'static) {
        self.add_boxed_listener(Box::new(listener));
    }

    /// Register an already boxed listener.
    pub fn add_boxed_listener(&mut self, listener: Box<dyn Listener>) {
        self.listeners.push(listener);
    }

    /// Live viewer state.
    #[inline]
    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    /// Typed per-instance state.
    #[inline]
    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Typed per-instance state.
    #[inline]
    pub fn store_mut(&mut self) -> &mut StateStore {
        &mut self.store
    }

    /// Current time of the scheduler.
    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.scheduler.now_ms()
    }

    /// Arm a repeating timer. Fired ids arrive through [`Viewer::on_timer`].
    pub fn arm_timer(&mut self, interval_ms: u32) -> TimerId {
        self.scheduler.arm(interval_ms)
    }

    /// Cancel a timer armed with [`arm_timer`](Self::arm_timer).
    pub fn cancel_timer(&mut self, id: TimerId) {
        self.scheduler.cancel(id);
    }

    /// Whether images are still loading.
    #[inline]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Whether a pointer gesture is in progress.
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.state.dragging
    }

    /// Mark the start or end of a pointer gesture.
    #[inline]
    pub fn set_dragging(&mut self, dragging: bool) {
        self.state.dragging = dragging;
    }

    /// Pointer state of the current gesture.
    pub fn input(&mut self) -> InputState {
        *self.store.get_or_default::<InputState>()
    }

    /// Record a pointer sample against the current frame and container.
    pub fn update_input(&mut self, event: &PointerEvent) -> InputState {
        let (frame, lane, container) = (self.state.frame, self.state.lane, self.state.container);
        let input = self.store.get_or_default::<InputState>();
        input.update(event, frame, lane, &container);
        *input
    }

    /// Forget the current gesture.
    pub fn reset_input(&mut self) {
        self.store.get_or_default::<InputState>().reset();
    }

    pub(crate) fn emit(&mut self, event: Event) {
        for listener in &mut self.listeners {
            listener.on_event(event, &self.state);
        }
    }
}

impl std::fmt::Debug for ViewerCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerCore")
            .field("state", &self.state)
            .field("store", &self.store)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// A viewer instance: its core plus the interaction mappers feeding it.
///
/// ## Example
///
/// ```rust
/// use spinview_core::{ContainerBox, ImageSize, NoProbe, PointerEvent, VirtualClock, Viewer, ViewerConfig};
///
/// let config = ViewerConfig { frames: Some(36), animate: false, ..Default::default() };
/// let mut viewer = Viewer::from_config(&config, Box::new(VirtualClock::new())).unwrap();
/// viewer.init();
/// viewer.resize(ContainerBox::new(0.0, 0.0, 360.0, 200.0));
/// viewer.load(&[ImageSize::new(3600, 200)], &mut NoProbe);
///
/// viewer.pointer_down(&mut PointerEvent::mouse(100.0, 100.0));
/// viewer.pointer_move(&mut PointerEvent::mouse(150.0, 100.0));
/// viewer.pointer_up(&mut PointerEvent::mouse(150.0, 100.0));
///
/// assert_eq!(viewer.state().frame(), 5);
/// ```
pub struct Viewer {
    core: ViewerCore,
    mappers: Vec<Box<dyn InteractionMapper>>,
}

impl Viewer {
    /// Create a viewer with explicit mappers.
    pub fn new(config: &ViewerConfig, mappers: Vec<Box<dyn InteractionMapper>>, scheduler: Box<dyn Scheduler>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            core: ViewerCore::new(config, scheduler),
            mappers,
        })
    }

    /// Create a viewer with the built-in mappers named in `config.mappers`.
    pub fn from_config(config: &ViewerConfig, scheduler: Box<dyn Scheduler>) -> Result<Self> {
        let mappers = crate::registry::MapperRegistry::with_defaults().create_all(config)?;
        Self::new(config, mappers, scheduler)
    }

    /// Register a listener for lifecycle notifications.
    pub fn add_listener(&mut self, listener: impl Listener + 'static) {
        self.core.add_listener(listener);
    }

    /// Live viewer state.
    #[inline]
    pub fn state(&self) -> &ViewerState {
        self.core.state()
    }

    /// The core, for playback calls.
    #[inline]
    pub fn core(&self) -> &ViewerCore {
        &self.core
    }

    /// The core, for playback calls.
    #[inline]
    pub fn core_mut(&mut self) -> &mut ViewerCore {
        &mut self.core
    }

    /// Names of the active mappers in dispatch order.
    pub fn mapper_names(&self) -> Vec<&'static str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    /// Start the lifecycle: mark loading and notify `Init`.
    pub fn init(&mut self) {
        self.core.state.loading = true;
        for mapper in &mut self.mappers {
            mapper.on_init(&mut self.core);
        }
        self.core.emit(Event::Init);
    }

    /// Record image loading progress and notify `Progress`.
    pub fn report_progress(&mut self, loaded: usize, total: usize) {
        self.core.state.progress = LoadProgress::new(loaded, total);
        self.core.emit(Event::Progress);
    }

    /// Measure the decoded `images`, replacing previous metrics, then notify
    /// `Load`, `Frame`, `Draw` and `Complete` and apply the animation.
    pub fn load<I, P>(&mut self, images: &[I], probe: &mut P)
    where
        I: SourceImage,
        P: PixelProbe<I> + ?Sized,
    {
        let state = &mut self.core.state;
        let options = MeasureOptions {
            frames: state.configured_frames,
            frames_x: state.frames_x,
            frames_y: state.frames_y,
            detect_subsampling: state.detect_subsampling,
        };
        state.metrics = measure(images, &options, probe);
        if state.configured_frames.is_none() {
            state.frames = (total_sprites(&state.metrics) / state.lanes).max(1);
        }
        state.loading = false;
        state.progress = LoadProgress::new(images.len(), images.len());
        log::debug!(
            "loaded {} sheet(s), {} frame(s) x {} lane(s)",
            state.metrics.len(),
            state.frames,
            state.lanes
        );

        self.core.restrict_frame();
        self.core.emit(Event::Load);
        self.core.emit(Event::Frame);
        self.core.emit(Event::Draw);
        self.core.emit(Event::Complete);
        self.core.apply_animation();
    }

    /// Update the host container box used for input normalization and layout.
    pub fn resize(&mut self, container: ContainerBox) {
        self.core.state.container = container;
    }

    /// Layout of the paint surface inside the container.
    pub fn layout(&self) -> Layout {
        self.core.state.layout()
    }

    /// Sprite and target rectangle for painting the current frame.
    pub fn draw_command(&self) -> Option<DrawCommand> {
        draw_command(&self.core.state, self.layout())
    }

    /// Dispatch a pointer press.
    pub fn pointer_down(&mut self, event: &mut PointerEvent) {
        for mapper in &mut self.mappers {
            mapper.pointer_down(&mut self.core, event);
        }
    }

    /// Dispatch a pointer move.
    pub fn pointer_move(&mut self, event: &mut PointerEvent) {
        for mapper in &mut self.mappers {
            mapper.pointer_move(&mut self.core, event);
        }
    }

    /// Dispatch a pointer release.
    pub fn pointer_up(&mut self, event: &mut PointerEvent) {
        for mapper in &mut self.mappers {
            mapper.pointer_up(&mut self.core, event);
        }
    }

    /// Dispatch the pointer leaving the container.
    pub fn pointer_leave(&mut self, event: &mut PointerEvent) {
        for mapper in &mut self.mappers {
            mapper.pointer_leave(&mut self.core, event);
        }
    }

    /// Dispatch a wheel event.
    pub fn wheel(&mut self, event: &mut WheelEvent) {
        for mapper in &mut self.mappers {
            mapper.wheel(&mut self.core, event);
        }
    }

    /// Handle a fired timer. Ids no longer armed are ignored.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.core.is_playing() && self.core.playback().handler == Some(id) {
            self.core.tick_animation();
            return;
        }
        for mapper in &mut self.mappers {
            if mapper.on_timer(&mut self.core, id) {
                return;
            }
        }
        log::trace!("ignoring stale timer {id:?}");
    }

    /// Stop everything, notify `Destroy` and drop all per-instance state.
    pub fn destroy(&mut self) {
        self.core.stop_animation();
        for mapper in &mut self.mappers {
            mapper.on_destroy(&mut self.core);
        }
        self.core.emit(Event::Destroy);
        self.core.store.clear();
        self.core.state.dragging = false;
    }
}

impl std::fmt::Debug for Viewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewer")
            .field("core", &self.core)
            .field("mappers", &self.mapper_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{ImageSize, NoProbe};
    use crate::scheduler::VirtualClock;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn viewer_with(config: ViewerConfig) -> (Viewer, VirtualClock, Rc<RefCell<Vec<Event>>>) {
        let clock = VirtualClock::new();
        let mut viewer = Viewer::from_config(&config, Box::new(clock.clone())).unwrap();
        let events: Rc<RefCell<Vec<Event>>> = Rc::default();
        let sink = Rc::clone(&events);
        viewer.add_listener(move |event: Event, _: &ViewerState| sink.borrow_mut().push(event));
        viewer.resize(ContainerBox::new(0.0, 0.0, 400.0, 300.0));
        (viewer, clock, events)
    }

    fn run(viewer: &mut Viewer, clock: &VirtualClock, ms: u64) {
        for _ in 0..ms {
            for id in clock.advance(1) {
                viewer.on_timer(id);
            }
        }
    }

    #[test_log::test]
    fn test_lifecycle_events() {
        let (mut viewer, _, events) = viewer_with(ViewerConfig {
            frames: Some(4),
            animate: false,
            ..Default::default()
        });
        viewer.init();
        assert!(viewer.state().is_loading());

        viewer.report_progress(1, 1);
        viewer.load(&[ImageSize::new(400, 100)], &mut NoProbe);
        assert!(!viewer.state().is_loading());
        assert_eq!(viewer.state().metrics()[0].sprites.len(), 4);

        viewer.destroy();
        assert_eq!(
            *events.borrow(),
            vec![
                Event::Init,
                Event::Progress,
                Event::Load,
                Event::Frame,
                Event::Draw,
                Event::Complete,
                Event::Destroy
            ]
        );
        assert!(viewer.core().store().is_empty());
    }

    #[test]
    fn test_frames_default_to_image_count() {
        let (mut viewer, _, _) = viewer_with(ViewerConfig {
            animate: false,
            lanes: 2,
            ..Default::default()
        });
        viewer.init();
        viewer.load(&vec![ImageSize::new(64, 64); 12], &mut NoProbe);
        assert_eq!(viewer.state().frames(), 6);
        assert_eq!(viewer.state().metrics().len(), 12);
    }

    #[test]
    fn test_reload_replaces_metrics() {
        let (mut viewer, _, _) = viewer_with(ViewerConfig {
            frame: 7,
            animate: false,
            ..Default::default()
        });
        viewer.init();
        viewer.load(&vec![ImageSize::new(10, 10); 10], &mut NoProbe);
        assert_eq!(viewer.state().frame(), 7);

        viewer.load(&vec![ImageSize::new(20, 20); 5], &mut NoProbe);
        assert_eq!(viewer.state().metrics().len(), 5);
        assert_eq!(viewer.state().frames(), 5);
        assert_eq!(viewer.state().frame(), 2);
    }

    #[test]
    fn test_load_starts_animation() {
        let (mut viewer, clock, _) = viewer_with(ViewerConfig {
            frames: Some(8),
            ..Default::default()
        });
        viewer.init();
        viewer.load(&[ImageSize::new(800, 100)], &mut NoProbe);
        assert!(viewer.core().is_playing());

        run(&mut viewer, &clock, 200);
        assert_eq!(viewer.state().frame(), 5);
    }

    #[test]
    fn test_drag_returns_to_start_frame() {
        let (mut viewer, _, _) = viewer_with(ViewerConfig {
            frames: Some(36),
            frame: 5,
            ..Default::default()
        });
        viewer.init();
        viewer.load(&[ImageSize::new(3600, 100)], &mut NoProbe);
        assert!(viewer.core().is_playing());

        viewer.pointer_down(&mut PointerEvent::mouse(200.0, 150.0));
        for x in [230.0, 287.0, 333.3, 120.7, 199.9, 200.0] {
            viewer.pointer_move(&mut PointerEvent::mouse(x, 150.0));
        }
        assert_eq!(viewer.state().frame(), 5);
        assert!(!viewer.core().is_playing());
        viewer.pointer_up(&mut PointerEvent::mouse(200.0, 150.0));
        assert!(!viewer.state().is_dragging());
    }

    #[test]
    fn test_layout_and_draw_command() {
        let (mut viewer, _, _) = viewer_with(ViewerConfig {
            frames: Some(4),
            frames_x: Some(2),
            animate: false,
            fill_mode: FillMode::Contain,
            ..Default::default()
        });
        assert!(viewer.draw_command().is_none());

        viewer.init();
        viewer.load(&[ImageSize::new(400, 400)], &mut NoProbe);
        viewer.core_mut().update_frame(Some(3), None);

        let command = viewer.draw_command().unwrap();
        assert_eq!((command.sheet, command.sprite), (0, 3));
        assert_eq!((command.source.x, command.source.y), (200.0, 200.0));
        assert_eq!(command.target, Layout { width: 300, height: 300, offset_x: 50, offset_y: 0 });
    }

    #[test]
    fn test_responsive_layout() {
        let (mut viewer, _, _) = viewer_with(ViewerConfig {
            frames: Some(1),
            animate: false,
            responsive: true,
            ..Default::default()
        });
        viewer.init();
        viewer.load(&[ImageSize::new(800, 400)], &mut NoProbe);
        assert_eq!(viewer.layout(), Layout { width: 400, height: 200, offset_x: 0, offset_y: 0 });
    }

    #[test]
    fn test_stale_timer_ids_are_ignored() {
        let (mut viewer, _, events) = viewer_with(ViewerConfig {
            frames: Some(4),
            animate: false,
            ..Default::default()
        });
        viewer.on_timer(TimerId(999));
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_instances_are_isolated() {
        let clock = VirtualClock::new();
        let config = ViewerConfig {
            frames: Some(10),
            animate: false,
            ..Default::default()
        };
        let mut a = Viewer::from_config(&config, Box::new(clock.clone())).unwrap();
        let mut b = Viewer::from_config(&config, Box::new(clock.clone())).unwrap();
        a.core_mut().start_animation();

        for id in clock.advance(40) {
            a.on_timer(id);
            b.on_timer(id);
        }
        assert_eq!(a.state().frame(), 1);
        assert_eq!(b.state().frame(), 0);
    }
}
