use std::collections::VecDeque;

use crate::config::EaseOptions;
use crate::input::PointerEvent;
use crate::scheduler::TimerId;
use crate::viewer::ViewerCore;

use super::{DragState, InteractionMapper};

const MIN_INTERVAL: u32 = 16;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Sample {
    time: f64,
    frame: f64,
    lane: f64,
}

/// Drag samples and the running inertia loop.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EaseState {
    samples: VecDeque<Sample>,
    handler: Option<TimerId>,
    origin_frame: f64,
    origin_lane: f64,
    frames: f64,
    lanes: f64,
    frame_step: f64,
    lane_step: f64,
}

impl EaseState {
    /// Whether the inertia loop is running.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.handler.is_some()
    }

    /// Number of buffered drag samples.
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }
}

/// Keeps a released drag spinning with decaying velocity.
///
/// Place after `drag` so samples see the drag result of the same move.
#[derive(Clone, Copy, Debug, Default)]
pub struct EaseMapper {
    options: EaseOptions,
}

impl EaseMapper {
    /// Create an ease mapper with the given tuning.
    pub fn new(options: EaseOptions) -> Self {
        Self { options }
    }

    fn damping(&self) -> f64 {
        self.options.damping.clamp(0.0, 0.999)
    }

    fn abort_time(&self) -> f64 {
        self.options.abort_time.max(MIN_INTERVAL) as f64
    }

    fn update_time(&self, core: &ViewerCore) -> u32 {
        self.options
            .update_time
            .unwrap_or(core.state().frame_time())
            .max(MIN_INTERVAL)
    }

    fn kill_loop(core: &mut ViewerCore) {
        let handler = core.store_mut().get_or_default::<EaseState>().handler.take();
        if let Some(id) = handler {
            core.cancel_timer(id);
            log::debug!("cancelled ease timer {id:?}");
        }
    }

    fn sample(&self, core: &mut ViewerCore) {
        let time = core.now_ms();
        let (frame, lane) = match core.store().get::<DragState>() {
            Some(drag) => (drag.frame, drag.lane),
            None => (core.state().frame() as f64, core.state().lane() as f64),
        };
        let max_samples = self.options.max_samples.max(2);
        let samples = &mut core.store_mut().get_or_default::<EaseState>().samples;
        samples.push_back(Sample { time, frame, lane });
        while samples.len() > max_samples {
            samples.pop_front();
        }
    }

    fn release(&self, core: &mut ViewerCore) {
        let now = core.now_ms();
        let samples = std::mem::take(&mut core.store_mut().get_or_default::<EaseState>().samples);
        let Some(last) = samples.back().copied() else {
            return;
        };
        if now - last.time > self.abort_time() {
            return;
        }

        let (mut frames, mut lanes, mut time) = (0.0, 0.0, 0.0);
        for (prev, next) in samples.iter().zip(samples.iter().skip(1)) {
            let dt = next.time - prev.time;
            if dt > self.abort_time() {
                return;
            }
            frames += next.frame - prev.frame;
            lanes += next.lane - prev.lane;
            time += dt;
        }
        if time <= 0.0 {
            return;
        }

        let update_time = self.update_time(core);
        let (frame, lane) = (core.state().frame() as f64, core.state().lane() as f64);
        let id = core.arm_timer(update_time);
        let ease = core.store_mut().get_or_default::<EaseState>();
        ease.origin_frame = frame;
        ease.origin_lane = lane;
        ease.frames = 0.0;
        ease.lanes = 0.0;
        ease.frame_step = frames / time * update_time as f64;
        ease.lane_step = lanes / time * update_time as f64;
        ease.handler = Some(id);
        log::debug!(
            "armed ease timer {id:?}, step {:.3} frame(s) {:.3} lane(s)",
            ease.frame_step,
            ease.lane_step
        );
    }

    fn tick(&self, core: &mut ViewerCore) {
        let damping = self.damping();
        let ease = core.store_mut().get_or_default::<EaseState>();
        ease.frames += ease.frame_step;
        ease.lanes += ease.lane_step;
        ease.frame_step *= damping;
        ease.lane_step *= damping;

        let frame = (ease.origin_frame + ease.frames).floor() as i64;
        let lane = (ease.origin_lane + ease.lanes).floor() as i64;
        let settled = ease.frame_step.abs() < self.options.epsilon && ease.lane_step.abs() < self.options.epsilon;

        core.update_frame(Some(frame), Some(lane));
        if core.is_dragging() || settled {
            Self::kill_loop(core);
        }
    }
}

impl InteractionMapper for EaseMapper {
    fn name(&self) -> &'static str {
        "ease"
    }

    fn pointer_down(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        Self::kill_loop(core);
        core.store_mut().get_or_default::<EaseState>().samples.clear();
    }

    fn pointer_move(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        if !core.is_dragging() {
            return;
        }
        Self::kill_loop(core);
        self.sample(core);
    }

    fn pointer_up(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        self.release(core);
    }

    fn pointer_leave(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        self.release(core);
    }

    fn on_timer(&mut self, core: &mut ViewerCore, id: TimerId) -> bool {
        if core.store().get::<EaseState>().and_then(|e| e.handler) != Some(id) {
            return false;
        }
        self.tick(core);
        true
    }

    fn on_destroy(&mut self, core: &mut ViewerCore) {
        Self::kill_loop(core);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::mappers::testing::{loaded_viewer, run};
    use crate::mappers::{DragMapper, InteractionMapper};
    use crate::scheduler::VirtualClock;
    use crate::viewer::Viewer;

    fn ease_viewer() -> (Viewer, VirtualClock) {
        let config = ViewerConfig {
            frames: Some(100),
            animate: false,
            ..Default::default()
        };
        let mappers: Vec<Box<dyn InteractionMapper>> =
            vec![Box::new(DragMapper::default()), Box::new(EaseMapper::default())];
        loaded_viewer(config, mappers)
    }

    fn ease_state(viewer: &Viewer) -> EaseState {
        viewer.core().store().get::<EaseState>().cloned().unwrap_or_default()
    }

    /// Drag right by 40px every 16ms, three times.
    fn fling(viewer: &mut Viewer, clock: &VirtualClock) {
        viewer.pointer_down(&mut PointerEvent::mouse(0.0, 0.0));
        for i in 1..=3 {
            clock.advance(16);
            viewer.pointer_move(&mut PointerEvent::mouse(40.0 * i as f64, 0.0));
        }
        viewer.pointer_up(&mut PointerEvent::mouse(120.0, 0.0));
    }

    #[test_log::test]
    fn test_release_keeps_spinning() {
        let (mut viewer, clock) = ease_viewer();
        fling(&mut viewer, &clock);
        assert_eq!(viewer.state().frame(), 30);
        assert!(ease_state(&viewer).is_running());
        assert_eq!(ease_state(&viewer).sample_count(), 0);

        run(&mut viewer, &clock, 40);
        assert_eq!(viewer.state().frame(), 55);
        run(&mut viewer, &clock, 40);
        assert_eq!(viewer.state().frame(), 77);

        run(&mut viewer, &clock, 4000);
        assert_eq!(viewer.state().frame(), 79);
        assert!(!ease_state(&viewer).is_running());
        assert_eq!(clock.armed(), 0);
    }

    #[test]
    fn test_sample_window() {
        let (mut viewer, clock) = ease_viewer();
        viewer.pointer_down(&mut PointerEvent::mouse(0.0, 0.0));
        for i in 1..=8 {
            clock.advance(10);
            viewer.pointer_move(&mut PointerEvent::mouse(i as f64, 0.0));
        }
        assert_eq!(ease_state(&viewer).sample_count(), 5);
    }

    #[test]
    fn test_long_sample_gap_aborts() {
        let (mut viewer, clock) = ease_viewer();
        viewer.pointer_down(&mut PointerEvent::mouse(0.0, 0.0));
        clock.advance(16);
        viewer.pointer_move(&mut PointerEvent::mouse(40.0, 0.0));
        clock.advance(300);
        viewer.pointer_move(&mut PointerEvent::mouse(80.0, 0.0));
        viewer.pointer_up(&mut PointerEvent::mouse(80.0, 0.0));

        assert!(!ease_state(&viewer).is_running());
        assert_eq!(clock.armed(), 0);
    }

    #[test]
    fn test_resting_before_release_aborts() {
        let (mut viewer, clock) = ease_viewer();
        viewer.pointer_down(&mut PointerEvent::mouse(0.0, 0.0));
        for i in 1..=3 {
            clock.advance(16);
            viewer.pointer_move(&mut PointerEvent::mouse(40.0 * i as f64, 0.0));
        }
        clock.advance(500);
        viewer.pointer_up(&mut PointerEvent::mouse(120.0, 0.0));
        assert!(!ease_state(&viewer).is_running());
    }

    #[test]
    fn test_new_drag_stops_inertia() {
        let (mut viewer, clock) = ease_viewer();
        fling(&mut viewer, &clock);
        run(&mut viewer, &clock, 40);

        viewer.pointer_down(&mut PointerEvent::mouse(0.0, 0.0));
        assert!(!ease_state(&viewer).is_running());
        assert_eq!(clock.armed(), 0);

        run(&mut viewer, &clock, 200);
        assert_eq!(viewer.state().frame(), 55);
    }

    #[test]
    fn test_destroy_stops_inertia() {
        let (mut viewer, clock) = ease_viewer();
        fling(&mut viewer, &clock);
        viewer.destroy();
        assert_eq!(clock.armed(), 0);
    }

    #[test]
    fn test_option_bounds() {
        let ease = EaseMapper::new(EaseOptions {
            damping: 1.5,
            abort_time: 2,
            ..Default::default()
        });
        assert_eq!(ease.damping(), 0.999);
        assert_eq!(ease.abort_time(), 16.0);
    }
}
