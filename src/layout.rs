//! Layout calculations for fitting frames into a host container.

/// Integer pixel size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Aspect ratio `width / height`. A zero height yields `1.0`.
    #[inline]
    pub fn aspect(&self) -> f64 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f64 / self.height as f64
        }
    }

    /// Whether both dimensions fit inside `other`.
    #[inline]
    pub fn fits_in(&self, other: Size) -> bool {
        self.width <= other.width && self.height <= other.height
    }
}

/// Strategy for fitting inner content into an outer box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum FillMode {
    /// Scale to fit inside, keep aspect, no crop
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "fit"))]
    Contain,
    /// Scale to fill, keep aspect, crop overflow
    Cover,
    /// Match the outer box exactly, ignore aspect
    #[cfg_attr(feature = "serde", serde(alias = "stretch"))]
    Fill,
    /// Like `Contain`, but never upscale past the native size
    ScaleDown,
    /// No scaling, centered
    #[cfg_attr(feature = "serde", serde(alias = "original"))]
    None,
}

/// Target rectangle for the paint surface, relative to the outer box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Horizontal centering offset, negative when the content overflows
    pub offset_x: i32,
    /// Vertical centering offset, negative when the content overflows
    pub offset_y: i32,
}

/// Fit `inner` content into the `outer` box using `mode`.
///
/// All sizes are floored to whole pixels and the result is centered with
/// `floor((outer - inner) / 2)` on each axis.
///
/// ## Example
///
/// ```rust
/// use spinview_core::{solve_layout, FillMode, Size};
///
/// let inner = Size::new(300, 400);
/// let outer = Size::new(100, 200);
///
/// let contain = solve_layout(inner, outer, FillMode::Contain);
/// assert_eq!((contain.width, contain.height), (100, 133));
///
/// let cover = solve_layout(inner, outer, FillMode::Cover);
/// assert_eq!((cover.width, cover.height), (150, 200));
/// assert_eq!(cover.offset_x, -25);
/// ```
pub fn solve_layout(inner: Size, outer: Size, mode: FillMode) -> Layout {
    let size = match mode {
        FillMode::Contain => contain(inner, outer),
        FillMode::Cover => cover(inner, outer),
        FillMode::Fill => outer,
        FillMode::ScaleDown if inner.fits_in(outer) => inner,
        FillMode::ScaleDown => contain(inner, outer),
        FillMode::None => inner,
    };
    Layout {
        width: size.width,
        height: size.height,
        offset_x: center(outer.width, size.width),
        offset_y: center(outer.height, size.height),
    }
}

fn contain(inner: Size, outer: Size) -> Size {
    let aspect = inner.aspect();
    if aspect >= outer.aspect() {
        Size::new(outer.width, (outer.width as f64 / aspect).floor() as u32)
    } else {
        Size::new((outer.height as f64 * aspect).floor() as u32, outer.height)
    }
}

fn cover(inner: Size, outer: Size) -> Size {
    let aspect = inner.aspect();
    if aspect >= outer.aspect() {
        Size::new((outer.height as f64 * aspect).floor() as u32, outer.height)
    } else {
        Size::new(outer.width, (outer.width as f64 / aspect).floor() as u32)
    }
}

#[inline]
fn center(outer: u32, inner: u32) -> i32 {
    ((outer as f64 - inner as f64) / 2.0).floor() as i32
}

/// Candidate sources for the viewer's inner and outer size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SizeHints {
    /// Explicitly configured width
    pub width: Option<u32>,
    /// Explicitly configured height
    pub height: Option<u32>,
    /// Natural size of one frame, once measured
    pub frame: Option<Size>,
    /// Current inner box of the host container
    pub host: Size,
}

impl SizeHints {
    /// Content size: explicit size, else frame size, else host box.
    pub fn inner_size(&self) -> Size {
        let frame = self.frame.unwrap_or_default();
        Size::new(
            pick(&[self.width, Some(frame.width)], self.host.width),
            pick(&[self.height, Some(frame.height)], self.host.height),
        )
    }

    /// Available box: the host box, else the content size while the host
    /// has no extent yet.
    pub fn outer_size(&self) -> Size {
        if self.host.width > 0 && self.host.height > 0 {
            self.host
        } else {
            self.inner_size()
        }
    }

    /// Available box when the viewer follows the host width and derives its
    /// height from the content aspect.
    pub fn responsive_outer_size(&self) -> Size {
        responsive_size(self.inner_size(), self.host.width)
    }
}

fn pick(candidates: &[Option<u32>], fallback: u32) -> u32 {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|&v| v > 0)
        .unwrap_or(fallback)
}

/// Resize `outer` to `available_width`, keeping its aspect ratio.
///
/// A zero `available_width` keeps `outer` unchanged.
pub fn responsive_size(outer: Size, available_width: u32) -> Size {
    if available_width == 0 {
        return outer;
    }
    let height = (available_width as f64 / outer.aspect()).floor() as u32;
    Size::new(available_width, height)
}
