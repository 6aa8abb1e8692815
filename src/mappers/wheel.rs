use crate::input::WheelEvent;
use crate::viewer::ViewerCore;

use super::InteractionMapper;

/// Steps frames with vertical scrolling and lanes with horizontal scrolling.
#[derive(Clone, Copy, Debug, Default)]
pub struct WheelMapper;

fn sign(delta: f64) -> i64 {
    if delta > 0.0 {
        1
    } else if delta < 0.0 {
        -1
    } else {
        0
    }
}

impl InteractionMapper for WheelMapper {
    fn name(&self) -> &'static str {
        "wheel"
    }

    fn wheel(&mut self, core: &mut ViewerCore, event: &mut WheelEvent) {
        if core.is_loading() {
            return;
        }
        event.prevent_default();
        let (frame, lane) = (core.state().frame() as i64, core.state().lane() as i64);
        core.update_frame(Some(frame + sign(event.delta_y)), Some(lane + sign(event.delta_x)));
    }
}
