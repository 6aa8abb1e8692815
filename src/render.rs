//! Draw commands for painting the current frame.

use crate::layout::Layout;
use crate::locator::find_specs;
use crate::viewer::ViewerState;

/// Rectangle in the decoded pixel space of a sheet.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRect {
    /// Left edge
    pub x: f64,
    /// Top edge
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

/// What to paint for the current frame.
///
/// This is a platform-agnostic representation of a single blit: copy
/// `source` out of image `sheet` into the `target` rectangle. Each consumer
/// can interpret it for its rendering backend (canvas `drawImage`, CSS
/// background position, image visibility).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawCommand {
    /// Index of the source image
    pub sheet: usize,
    /// Index of the sprite within the sheet
    pub sprite: usize,
    /// Sprite rectangle, already corrected for subsampling
    pub source: SourceRect,
    /// Destination rectangle inside the container
    pub target: Layout,
}

/// Resolve the current frame and lane of `state` into a draw command.
///
/// Returns `None` while nothing is measured or the frame lies beyond the
/// measured sprites.
pub fn draw_command(state: &ViewerState, target: Layout) -> Option<DrawCommand> {
    let (sheet, sprite) = find_specs(state.metrics(), state.frames(), state.frame(), state.lane()).resolved()?;
    Some(DrawCommand {
        sheet: sheet.id,
        sprite: sprite.id,
        source: SourceRect {
            x: sprite.sampled_x,
            y: sprite.sampled_y,
            width: sprite.sampled_width,
            height: sprite.sampled_height,
        },
        target,
    })
}

/// Web-specific painting of draw commands.
#[cfg(feature = "web")]
pub mod web {
    use super::*;
    use wasm_bindgen::JsCast;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

    /// Paint `command` onto `canvas`, resizing the canvas to the target.
    ///
    /// ## Example
    ///
    /// ```rust,ignore
    /// use spinview_core::render::web::draw_to_canvas;
    ///
    /// if let Some(command) = viewer.draw_command() {
    ///     draw_to_canvas(&command, &images, &canvas)?;
    /// }
    /// ```
    pub fn draw_to_canvas(command: &DrawCommand, images: &[HtmlImageElement], canvas: &HtmlCanvasElement) -> Result<(), String> {
        let image = images.get(command.sheet).ok_or("No image for sheet")?;
        let target = command.target;
        if canvas.width() != target.width || canvas.height() != target.height {
            canvas.set_width(target.width);
            canvas.set_height(target.height);
        }

        let ctx = canvas
            .get_context("2d")
            .map_err(|_| "Failed to get 2d context")?
            .ok_or("No 2d context available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        ctx.clear_rect(0.0, 0.0, target.width as f64, target.height as f64);
        let source = command.source;
        ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
            image,
            source.x,
            source.y,
            source.width,
            source.height,
            0.0,
            0.0,
            target.width as f64,
            target.height as f64,
        )
        .map_err(|_| "Failed to draw sprite")?;
        Ok(())
    }
}
