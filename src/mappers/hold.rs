use crate::config::HoldOptions;
use crate::input::PointerEvent;
use crate::viewer::ViewerCore;

use super::InteractionMapper;

/// Playback settings saved on press and restored on release.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoldState {
    /// Settings from before the press, `None` while not holding
    pub saved: Option<SavedPlayback>,
}

/// The playback options a hold overrides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SavedPlayback {
    /// Whether the viewer was animating
    pub animate: bool,
    /// Tick interval in milliseconds
    pub frame_time: u32,
    /// Whether playback ran backwards
    pub reverse: bool,
}

/// Spins while the pointer is held. The farther the pointer sits from the
/// container center along the orientation axis, the faster the spin; the
/// side of the center picks the direction.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoldMapper {
    options: HoldOptions,
}

impl HoldMapper {
    /// Create a hold mapper with the given tick interval band.
    pub fn new(options: HoldOptions) -> Self {
        Self { options }
    }

    /// Tick interval for a normalized distance from the center in `[0, 1]`.
    fn frame_time(&self, distance: f64) -> u32 {
        let min = self.options.min_frame_time as f64;
        let max = self.options.max_frame_time as f64;
        (max - (max - min) * distance).round() as u32
    }

    fn end(&self, core: &mut ViewerCore) {
        let Some(saved) = core.store_mut().get_or_default::<HoldState>().saved.take() else {
            return;
        };
        core.set_dragging(false);
        core.reset_input();
        core.stop_animation();
        core.set_animate(saved.animate);
        core.set_frame_time(saved.frame_time);
        core.set_reverse(saved.reverse);
        core.apply_animation();
    }
}

impl InteractionMapper for HoldMapper {
    fn name(&self) -> &'static str {
        "hold"
    }

    fn pointer_down(&mut self, core: &mut ViewerCore, event: &mut PointerEvent) {
        if core.is_loading() || core.is_dragging() {
            return;
        }
        let state = core.state();
        let saved = SavedPlayback {
            animate: state.animate(),
            frame_time: state.frame_time(),
            reverse: state.reverse(),
        };
        core.store_mut().get_or_default::<HoldState>().saved = Some(saved);

        core.update_input(event);
        core.set_dragging(true);
        core.set_animate(true);
        core.apply_animation();
    }

    fn pointer_move(&mut self, core: &mut ViewerCore, event: &mut PointerEvent) {
        if !core.is_dragging() {
            return;
        }
        core.update_input(event);

        let pos = event.position();
        let state = core.state();
        let container = state.container();
        let center = container.center();
        let orientation = state.orientation();
        let (cos, sin) = orientation.axis();

        // Half extent of the container along the axis
        let reach = container.width / 2.0 * cos.abs() + container.height / 2.0 * sin.abs();
        let offset = orientation.project(pos.x - center.x, pos.y - center.y);
        let distance = if reach > 0.0 { offset / reach } else { 0.0 };

        core.set_reverse(distance < 0.0);
        core.set_frame_time(self.frame_time(distance.abs().min(1.0)));
        core.set_animate(true);
        core.apply_animation();
    }

    fn pointer_up(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        self.end(core);
    }

    fn pointer_leave(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        self.end(core);
    }
}
