use crate::input::PointerEvent;
use crate::viewer::ViewerCore;

use super::InteractionMapper;

/// Steps one frame forward when the release lands past the container
/// midpoint along the orientation axis, one frame back otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClickMapper;

impl InteractionMapper for ClickMapper {
    fn name(&self) -> &'static str {
        "click"
    }

    fn pointer_up(&mut self, core: &mut ViewerCore, event: &mut PointerEvent) {
        if core.is_loading() {
            return;
        }
        core.update_input(event);

        let pos = event.position();
        let center = core.state().container().center();
        let offset = core.state().orientation().project(pos.x - center.x, pos.y - center.y);
        let frame = core.state().frame() as i64;
        if offset > 0.0 {
            core.update_frame(Some(frame + 1), None);
        } else {
            core.update_frame(Some(frame - 1), None);
        }
        core.reset_input();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Orientation, ViewerConfig};
    use crate::mappers::testing::loaded_viewer;

    fn click(viewer: &mut crate::viewer::Viewer, x: f64, y: f64) {
        viewer.pointer_down(&mut PointerEvent::mouse(x, y));
        viewer.pointer_up(&mut PointerEvent::mouse(x, y));
    }

    #[test]
    fn test_click_halves() {
        let config = ViewerConfig {
            frames: Some(10),
            animate: false,
            ..Default::default()
        };
        let (mut viewer, _) = loaded_viewer(config, vec![Box::new(ClickMapper)]);

        click(&mut viewer, 300.0, 150.0);
        assert_eq!(viewer.state().frame(), 1);
        click(&mut viewer, 100.0, 150.0);
        click(&mut viewer, 100.0, 150.0);
        assert_eq!(viewer.state().frame(), 9);
        // The midpoint itself counts as the back half
        click(&mut viewer, 200.0, 10.0);
        assert_eq!(viewer.state().frame(), 8);
        assert!(!viewer.core_mut().input().is_tracking());
    }

    #[test]
    fn test_vertical_click() {
        let config = ViewerConfig {
            frames: Some(10),
            animate: false,
            orientation: Orientation::Vertical,
            ..Default::default()
        };
        let (mut viewer, _) = loaded_viewer(config, vec![Box::new(ClickMapper)]);

        click(&mut viewer, 10.0, 250.0);
        assert_eq!(viewer.state().frame(), 1);
        click(&mut viewer, 390.0, 50.0);
        assert_eq!(viewer.state().frame(), 0);
    }

    #[test]
    fn test_numeric_orientation() {
        let config = ViewerConfig {
            frames: Some(10),
            animate: false,
            orientation: Orientation::Degrees(180.0),
            ..Default::default()
        };
        let (mut viewer, _) = loaded_viewer(config, vec![Box::new(ClickMapper)]);

        // The right half is the back half on a reversed axis
        click(&mut viewer, 300.0, 150.0);
        assert_eq!(viewer.state().frame(), 9);
        click(&mut viewer, 100.0, 150.0);
        click(&mut viewer, 100.0, 150.0);
        assert_eq!(viewer.state().frame(), 1);

        let config = ViewerConfig {
            frames: Some(10),
            animate: false,
            orientation: Orientation::Degrees(270.0),
            ..Default::default()
        };
        let (mut viewer, _) = loaded_viewer(config, vec![Box::new(ClickMapper)]);

        click(&mut viewer, 200.0, 50.0);
        assert_eq!(viewer.state().frame(), 1);
        click(&mut viewer, 200.0, 250.0);
        assert_eq!(viewer.state().frame(), 0);
    }
}
