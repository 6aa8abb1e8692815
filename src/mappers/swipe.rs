use crate::config::SwipeOptions;
use crate::input::PointerEvent;
use crate::viewer::ViewerCore;

use super::InteractionMapper;

/// Commits a single frame step when a gesture travels far enough or ends
/// with a fast last move.
#[derive(Clone, Copy, Debug, Default)]
pub struct SwipeMapper {
    options: SwipeOptions,
}

impl SwipeMapper {
    /// Create a swipe mapper with the given thresholds.
    pub fn new(options: SwipeOptions) -> Self {
        Self { options }
    }

    fn end(&self, core: &mut ViewerCore) {
        if !core.is_dragging() {
            return;
        }
        core.set_dragging(false);

        let input = core.input();
        let orientation = core.state().orientation();
        let distance = orientation.project(input.nd_x, input.nd_y);
        let fling = orientation.project(input.dd_x, input.dd_y);
        let frame = core.state().frame() as i64;

        if distance >= self.options.snap || fling >= self.options.fling {
            core.stop_animation();
            core.update_frame(Some(frame - 1), None);
        } else if distance <= -self.options.snap || fling <= -self.options.fling {
            core.stop_animation();
            core.update_frame(Some(frame + 1), None);
        }
        core.reset_input();
    }
}

impl InteractionMapper for SwipeMapper {
    fn name(&self) -> &'static str {
        "swipe"
    }

    fn pointer_down(&mut self, core: &mut ViewerCore, event: &mut PointerEvent) {
        if core.is_loading() || core.is_dragging() {
            return;
        }
        core.update_input(event);
        core.set_dragging(true);
    }

    fn pointer_move(&mut self, core: &mut ViewerCore, event: &mut PointerEvent) {
        if !core.is_dragging() {
            return;
        }
        core.update_input(event);
        let (frame, lane) = (core.state().frame(), core.state().lane());
        core.update_frame(Some(frame as i64), Some(lane as i64));
    }

    fn pointer_up(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        self.end(core);
    }

    fn pointer_leave(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        self.end(core);
    }
}
