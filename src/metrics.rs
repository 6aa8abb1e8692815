//! Sprite metrics: measuring source images into addressable frame grids.

use thiserror::Error;

/// Natural area above which browsers may decode an image at half resolution.
pub const SUBSAMPLING_AREA: u64 = 1024 * 1024;

/// Fill colour painted under the probe pixel. Reading it back means the
/// image did not cover the pixel.
pub const PROBE_BACKGROUND: [u8; 3] = [0xFF, 0x00, 0xFF];

/// One addressable frame rectangle inside a sheet.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpriteSpec {
    /// Position within the sheet (0-based, row-major)
    pub id: usize,
    /// Left edge in natural pixel space
    pub x: u32,
    /// Top edge in natural pixel space
    pub y: u32,
    /// Width in natural pixel space
    pub width: u32,
    /// Height in natural pixel space
    pub height: u32,
    /// Left edge in decoded pixel space
    pub sampled_x: f64,
    /// Top edge in decoded pixel space
    pub sampled_y: f64,
    /// Width in decoded pixel space
    pub sampled_width: f64,
    /// Height in decoded pixel space
    pub sampled_height: f64,
}

/// One measured source image and the sprites packed into it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SheetSpec {
    /// Index into the source image array
    pub id: usize,
    /// Natural image width
    pub width: u32,
    /// Natural image height
    pub height: u32,
    /// Width as decoded by the renderer
    pub sampled_width: f64,
    /// Height as decoded by the renderer
    pub sampled_height: f64,
    /// Whether the renderer decoded this image at half resolution
    pub is_subsampled: bool,
    /// Sprites in row-major order, `sprites[i].id == i`
    pub sprites: Vec<SpriteSpec>,
}

impl SheetSpec {
    /// Number of sprites addressable in this sheet.
    #[inline]
    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    /// Divisor between natural and decoded pixel space.
    #[inline]
    pub fn sample_divisor(&self) -> f64 {
        if self.is_subsampled {
            2.0
        } else {
            1.0
        }
    }
}

/// Total number of sprites across all sheets.
pub fn total_sprites(sheets: &[SheetSpec]) -> usize {
    sheets.iter().map(SheetSpec::sprite_count).sum()
}

/// A decoded image whose natural pixel size is known.
pub trait SourceImage {
    /// Natural width in pixels
    fn natural_width(&self) -> u32;
    /// Natural height in pixels
    fn natural_height(&self) -> u32;
}

/// Plain image dimensions, for hosts that only track sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageSize {
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
}

impl ImageSize {
    /// Create a new image size.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl SourceImage for ImageSize {
    #[inline]
    fn natural_width(&self) -> u32 {
        self.width
    }

    #[inline]
    fn natural_height(&self) -> u32 {
        self.height
    }
}

/// Failure while reading back a probe pixel.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProbeError {
    /// No pixel surface is available on this platform
    #[error("Pixel readback is unavailable")]
    Unavailable,
    /// The surface was tainted, e.g. by a cross-origin image
    #[error("Pixel readback blocked: {0}")]
    Security(String),
    /// Any other readback failure
    #[error("Pixel readback failed: {0}")]
    Readback(String),
}

/// Pixel readback used to detect renderer-side subsampling.
///
/// Implementations fill a 1x1 surface with [`PROBE_BACKGROUND`], draw the
/// image offset so only its top-right natural pixel can land on the surface,
/// and return the RGBA value read back.
pub trait PixelProbe<I: ?Sized> {
    /// Read back the probe pixel for `image`.
    fn read_top_right(&mut self, image: &I) -> Result<[u8; 4], ProbeError>;
}

/// Probe for hosts without pixel access. Every image reads as not subsampled.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProbe;

impl<I: ?Sized> PixelProbe<I> for NoProbe {
    fn read_top_right(&mut self, _image: &I) -> Result<[u8; 4], ProbeError> {
        Err(ProbeError::Unavailable)
    }
}

/// Options controlling how images are cut into sprites.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MeasureOptions {
    /// Frames packed into a single sheet
    pub frames: Option<usize>,
    /// Columns of the sprite grid
    pub frames_x: Option<usize>,
    /// Rows of the sprite grid
    pub frames_y: Option<usize>,
    /// Probe large images for half-resolution decoding
    pub detect_subsampling: bool,
}

/// Measure decoded images into sheets of addressable sprites.
///
/// - One image: a packed sheet of `frames` sprites in a `frames_x` column grid.
/// - Several images with both `frames_x` and `frames_y`: each image is a
///   packed `frames_x * frames_y` grid.
/// - Otherwise: each image is a sheet holding a single full-image sprite.
///
/// ## Example
///
/// ```rust
/// use spinview_core::{measure, ImageSize, MeasureOptions, NoProbe};
///
/// let options = MeasureOptions {
///     frames: Some(95),
///     frames_x: Some(10),
///     ..Default::default()
/// };
/// let sheets = measure(&[ImageSize::new(1000, 500)], &options, &mut NoProbe);
///
/// assert_eq!(sheets[0].sprites.len(), 95);
/// assert_eq!(sheets[0].sprites[94].x, 400);
/// assert_eq!(sheets[0].sprites[94].y, 450);
/// ```
pub fn measure<I, P>(images: &[I], options: &MeasureOptions, probe: &mut P) -> Vec<SheetSpec>
where
    I: SourceImage,
    P: PixelProbe<I> + ?Sized,
{
    let detect = options.detect_subsampling;
    let sheets: Vec<SheetSpec> = match images {
        [] => Vec::new(),
        [image] => {
            let frames = options
                .frames
                .or_else(|| options.frames_x?.checked_mul(options.frames_y?))
                .unwrap_or(1);
            let grid = Grid::new(frames, options.frames_x, options.frames_y);
            vec![measure_sheet(0, image, grid, detect, &mut *probe)]
        }
        _ => match (options.frames_x, options.frames_y) {
            (Some(x), Some(y)) if x > 0 && y > 0 => images
                .iter()
                .enumerate()
                .map(|(id, image)| measure_sheet(id, image, Grid::new(x.saturating_mul(y), Some(x), Some(y)), detect, &mut *probe))
                .collect(),
            _ => images
                .iter()
                .enumerate()
                .map(|(id, image)| measure_sheet(id, image, Grid::new(1, Some(1), Some(1)), detect, &mut *probe))
                .collect(),
        },
    };

    log::debug!(
        "measured {} image(s) into {} sheet(s), {} sprite(s)",
        images.len(),
        sheets.len(),
        total_sprites(&sheets)
    );
    sheets
}

/// Sprite grid of a single sheet.
#[derive(Clone, Copy, Debug)]
struct Grid {
    frames: usize,
    columns: u32,
    rows: u32,
}

impl Grid {
    /// Columns and rows saturate at `u32::MAX`, leaving zero-sized sprites
    /// instead of a zero divisor.
    fn new(frames: usize, frames_x: Option<usize>, frames_y: Option<usize>) -> Self {
        let columns = frames_x.filter(|&x| x > 0).unwrap_or(frames).max(1);
        let rows = frames_y
            .filter(|&y| y > 0)
            .unwrap_or_else(|| frames.div_ceil(columns))
            .max(1);
        let columns = u32::try_from(columns).unwrap_or(u32::MAX);
        let rows = u32::try_from(rows).unwrap_or(u32::MAX);
        Self {
            frames,
            columns,
            rows,
        }
    }
}

fn measure_sheet<I, P>(id: usize, image: &I, grid: Grid, detect: bool, probe: &mut P) -> SheetSpec
where
    I: SourceImage,
    P: PixelProbe<I> + ?Sized,
{
    let width = image.natural_width();
    let height = image.natural_height();
    let is_subsampled = detect && detect_subsampling(image, probe);
    let divisor = if is_subsampled { 2.0 } else { 1.0 };

    let frame_width = width / grid.columns;
    let frame_height = height / grid.rows;

    let columns = grid.columns as usize;
    let sprites = (0..grid.frames)
        .map(|i| {
            let x = (i % columns) as u32 * frame_width;
            let row = u32::try_from(i / columns).unwrap_or(u32::MAX);
            let y = row.saturating_mul(frame_height);
            SpriteSpec {
                id: i,
                x,
                y,
                width: frame_width,
                height: frame_height,
                sampled_x: x as f64 / divisor,
                sampled_y: y as f64 / divisor,
                sampled_width: frame_width as f64 / divisor,
                sampled_height: frame_height as f64 / divisor,
            }
        })
        .collect();

    SheetSpec {
        id,
        width,
        height,
        sampled_width: width as f64 / divisor,
        sampled_height: height as f64 / divisor,
        is_subsampled,
        sprites,
    }
}

/// Check whether the renderer decoded `image` at half resolution.
///
/// Only images larger than [`SUBSAMPLING_AREA`] are probed. Probe failures
/// read as "not subsampled".
pub fn detect_subsampling<I, P>(image: &I, probe: &mut P) -> bool
where
    I: SourceImage,
    P: PixelProbe<I> + ?Sized,
{
    let area = image.natural_width() as u64 * image.natural_height() as u64;
    if area <= SUBSAMPLING_AREA {
        return false;
    }
    match probe.read_top_right(image) {
        Ok([r, g, b, _]) => [r, g, b] == PROBE_BACKGROUND,
        Err(err) => {
            log::debug!("subsampling probe failed, assuming full resolution: {err}");
            false
        }
    }
}
