//! Interaction mappers: strategies translating pointer input into playback
//! calls.
//!
//! Every mapper reads [`InputState`](crate::input::InputState) through the
//! [`ViewerCore`] and acts only through its playback entry points
//! (`update_frame`, `stop_animation`, `apply_animation` and the config
//! setters). None of them writes frame or lane directly.

mod click;
mod drag;
mod ease;
mod hold;
mod swipe;
mod wheel;

pub use click::ClickMapper;
pub use drag::{DragMapper, DragMode, DragState};
pub use ease::{EaseMapper, EaseState};
pub use hold::{HoldMapper, HoldState, SavedPlayback};
pub use swipe::SwipeMapper;
pub use wheel::WheelMapper;

use crate::input::{PointerEvent, WheelEvent};
use crate::scheduler::TimerId;
use crate::viewer::ViewerCore;

/// A pluggable strategy reacting to pointer, wheel and timer events.
///
/// All handlers default to no-ops so a mapper only implements the events it
/// cares about.
pub trait InteractionMapper {
    /// Registry name of the mapper.
    fn name(&self) -> &'static str;

    /// Called once when the viewer initializes.
    fn on_init(&mut self, _core: &mut ViewerCore) {}

    /// Pointer pressed inside the container.
    fn pointer_down(&mut self, _core: &mut ViewerCore, _event: &mut PointerEvent) {}

    /// Pointer moved.
    fn pointer_move(&mut self, _core: &mut ViewerCore, _event: &mut PointerEvent) {}

    /// Pointer released.
    fn pointer_up(&mut self, _core: &mut ViewerCore, _event: &mut PointerEvent) {}

    /// Pointer left the container.
    fn pointer_leave(&mut self, _core: &mut ViewerCore, _event: &mut PointerEvent) {}

    /// Wheel or trackpad scroll.
    fn wheel(&mut self, _core: &mut ViewerCore, _event: &mut WheelEvent) {}

    /// A timer fired. Returns `true` when the id belonged to this mapper.
    fn on_timer(&mut self, _core: &mut ViewerCore, _id: TimerId) -> bool {
        false
    }

    /// Called once when the viewer is destroyed.
    fn on_destroy(&mut self, _core: &mut ViewerCore) {}
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::ViewerConfig;
    use crate::input::ContainerBox;
    use crate::metrics::{ImageSize, NoProbe};
    use crate::scheduler::VirtualClock;
    use crate::viewer::Viewer;

    use super::InteractionMapper;

    /// A loaded, idle viewer with a 400x300 container at the origin.
    pub fn loaded_viewer(config: ViewerConfig, mappers: Vec<Box<dyn InteractionMapper>>) -> (Viewer, VirtualClock) {
        let clock = VirtualClock::new();
        let mut viewer = Viewer::new(&config, mappers, Box::new(clock.clone())).unwrap();
        viewer.resize(ContainerBox::new(0.0, 0.0, 400.0, 300.0));
        viewer.init();
        let frames = config.frames.unwrap_or(1) * config.lanes;
        viewer.load(&vec![ImageSize::new(40, 30); frames], &mut NoProbe);
        (viewer, clock)
    }

    /// Advance `clock` one millisecond at a time, dispatching fired timers.
    pub fn run(viewer: &mut Viewer, clock: &VirtualClock, ms: u64) {
        for _ in 0..ms {
            for id in clock.advance(1) {
                viewer.on_timer(id);
            }
        }
    }
}
