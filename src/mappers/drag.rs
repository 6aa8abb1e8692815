use crate::input::PointerEvent;
use crate::math::finite_or_zero;
use crate::viewer::ViewerCore;

use super::InteractionMapper;

/// Fractional frame and lane reached by the current drag.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    /// Frame position, before flooring
    pub frame: f64,
    /// Lane position, before flooring
    pub lane: f64,
}

/// When a drag starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragMode {
    /// Drag while the pointer is pressed
    #[default]
    Press,
    /// Drag on plain pointer movement, end when the pointer leaves
    Hover,
}

/// Rotates the pointer displacement onto the orientation axis and moves
/// `frames * sense` frames per container extent.
#[derive(Clone, Copy, Debug, Default)]
pub struct DragMapper {
    mode: DragMode,
}

impl DragMapper {
    /// Create a drag mapper for `mode`.
    pub fn new(mode: DragMode) -> Self {
        Self { mode }
    }

    fn start(core: &mut ViewerCore, event: &PointerEvent) {
        if core.is_loading() || core.is_dragging() {
            return;
        }
        let (frame, lane) = (core.state().frame(), core.state().lane());
        *core.store_mut().get_or_default::<DragState>() = DragState {
            frame: frame as f64,
            lane: lane as f64,
        };
        core.set_dragging(true);
        core.update_input(event);
    }

    fn drag(core: &mut ViewerCore, event: &mut PointerEvent) {
        if !core.is_dragging() {
            return;
        }
        let input = core.update_input(event);
        let state = core.state();
        let (cos, sin) = state.orientation().axis();
        let x = finite_or_zero((input.nd_x * cos - input.nd_y * sin) * state.sense());
        let y = finite_or_zero((input.nd_x * sin + input.nd_y * cos) * state.sense_lane());

        // Measured from the gesture start, so returning to the start point
        // lands on the start frame.
        let drag = DragState {
            frame: finite_or_zero(input.click_frame as f64 + state.frames() as f64 * x),
            lane: finite_or_zero(input.click_lane as f64 + state.lanes() as f64 * y),
        };
        *core.store_mut().get_or_default::<DragState>() = drag;

        core.stop_animation();
        core.update_frame(Some(drag.frame.floor() as i64), Some(drag.lane.floor() as i64));
        event.prevent_default();
    }

    fn end(core: &mut ViewerCore) {
        if core.is_dragging() {
            core.set_dragging(false);
            core.reset_input();
        }
    }
}

impl InteractionMapper for DragMapper {
    fn name(&self) -> &'static str {
        match self.mode {
            DragMode::Press => "drag",
            DragMode::Hover => "move",
        }
    }

    fn pointer_down(&mut self, core: &mut ViewerCore, event: &mut PointerEvent) {
        if self.mode == DragMode::Press {
            Self::start(core, event);
        }
    }

    fn pointer_move(&mut self, core: &mut ViewerCore, event: &mut PointerEvent) {
        if self.mode == DragMode::Hover {
            Self::start(core, event);
        }
        Self::drag(core, event);
    }

    fn pointer_up(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        if self.mode == DragMode::Press {
            Self::end(core);
        }
    }

    fn pointer_leave(&mut self, core: &mut ViewerCore, _event: &mut PointerEvent) {
        Self::end(core);
    }
}
