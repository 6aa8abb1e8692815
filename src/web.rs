//! Browser collaborators: image sizes, the canvas subsampling probe and
//! window timers.

use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::metrics::{PixelProbe, ProbeError, SourceImage, PROBE_BACKGROUND};
use crate::scheduler::{Scheduler, TimerId};

impl SourceImage for HtmlImageElement {
    #[inline]
    fn natural_width(&self) -> u32 {
        HtmlImageElement::natural_width(self)
    }

    #[inline]
    fn natural_height(&self) -> u32 {
        HtmlImageElement::natural_height(self)
    }
}

/// Reads back the top-right pixel of an image through a 1x1 canvas.
#[derive(Debug, Default)]
pub struct CanvasProbe {
    surface: Option<(HtmlCanvasElement, CanvasRenderingContext2d)>,
}

impl CanvasProbe {
    /// Create a probe. The canvas is created on first use.
    pub fn new() -> Self {
        Self::default()
    }

    fn surface(&mut self) -> Result<&CanvasRenderingContext2d, ProbeError> {
        if self.surface.is_none() {
            let document = web_sys::window()
                .and_then(|w| w.document())
                .ok_or(ProbeError::Unavailable)?;
            let canvas = document
                .create_element("canvas")
                .map_err(|err| ProbeError::Readback(format!("{err:?}")))?
                .dyn_into::<HtmlCanvasElement>()
                .map_err(|_| ProbeError::Readback("not a canvas element".into()))?;
            canvas.set_width(1);
            canvas.set_height(1);
            let ctx = canvas
                .get_context("2d")
                .map_err(|err| ProbeError::Readback(format!("{err:?}")))?
                .ok_or(ProbeError::Unavailable)?
                .dyn_into::<CanvasRenderingContext2d>()
                .map_err(|_| ProbeError::Unavailable)?;
            self.surface = Some((canvas, ctx));
        }
        self.surface.as_ref().map(|(_, ctx)| ctx).ok_or(ProbeError::Unavailable)
    }
}

impl PixelProbe<HtmlImageElement> for CanvasProbe {
    fn read_top_right(&mut self, image: &HtmlImageElement) -> Result<[u8; 4], ProbeError> {
        let ctx = self.surface()?;
        let [r, g, b] = PROBE_BACKGROUND;
        ctx.set_fill_style_str(&format!("rgb({r},{g},{b})"));
        ctx.fill_rect(0.0, 0.0, 1.0, 1.0);

        // Only the rightmost natural column lands on the surface
        let dx = 1.0 - image.natural_width() as f64;
        ctx.draw_image_with_html_image_element(image, dx, 0.0)
            .map_err(|err| ProbeError::Readback(format!("{err:?}")))?;

        let data = ctx
            .get_image_data(0.0, 0.0, 1.0, 1.0)
            .map_err(|err| ProbeError::Security(format!("{err:?}")))?
            .data();
        match data.0.as_slice() {
            [r, g, b, a, ..] => Ok([*r, *g, *b, *a]),
            _ => Err(ProbeError::Readback("empty image data".into())),
        }
    }
}

/// [`Scheduler`] backed by `window.setInterval`.
///
/// Fired ids are passed to the callback given at construction, which should
/// forward them to [`Viewer::on_timer`](crate::Viewer::on_timer).
pub struct WindowScheduler {
    on_fire: Rc<dyn Fn(TimerId)>,
    next_id: u64,
    timers: HashMap<TimerId, (i32, Closure<dyn FnMut()>)>,
    // The cancelling call may run inside one of these callbacks, so they are
    // dropped on the next `arm` instead.
    retired: Vec<Closure<dyn FnMut()>>,
}

impl WindowScheduler {
    /// Create a scheduler forwarding fired ids to `on_fire`.
    pub fn new(on_fire: impl Fn(TimerId) + 'static) -> Self {
        Self {
            on_fire: Rc::new(on_fire),
            next_id: 0,
            timers: HashMap::new(),
            retired: Vec::new(),
        }
    }
}

impl Scheduler for WindowScheduler {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }

    fn arm(&mut self, interval_ms: u32) -> TimerId {
        self.retired.clear();
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let on_fire = Rc::clone(&self.on_fire);
        let callback = Closure::wrap(Box::new(move || on_fire(id)) as Box<dyn FnMut()>);
        let handle = web_sys::window().map(|window| {
            window.set_interval_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                interval_ms.max(1) as i32,
            )
        });
        match handle {
            Some(Ok(handle)) => {
                self.timers.insert(id, (handle, callback));
            }
            Some(Err(err)) => log::warn!("failed to arm timer {id:?}: {err:?}"),
            None => log::warn!("failed to arm timer {id:?}: no window"),
        }
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some((handle, callback)) = self.timers.remove(&id) {
            if let Some(window) = web_sys::window() {
                window.clear_interval_with_handle(handle);
            }
            self.retired.push(callback);
        }
    }
}

impl std::fmt::Debug for WindowScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowScheduler")
            .field("next_id", &self.next_id)
            .field("timers", &self.timers.len())
            .finish()
    }
}
