//! Viewer configuration.
//!
//! All fields have defaults so partial configuration files stay valid.

use std::f64::consts::FRAC_PI_2;

use crate::error::{Error, Result};
use crate::layout::FillMode;

/// Axis along which pointer movement advances frames.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "OrientationRepr", into = "OrientationRepr"))]
pub enum Orientation {
    /// Left/right movement
    #[default]
    Horizontal,
    /// Up/down movement
    Vertical,
    /// Movement along an axis rotated by the given degrees
    Degrees(f64),
}

impl Orientation {
    /// Rotation of the drag axis in radians.
    #[inline]
    pub fn radians(&self) -> f64 {
        match *self {
            Orientation::Horizontal => 0.0,
            Orientation::Vertical => FRAC_PI_2,
            Orientation::Degrees(deg) => deg.to_radians(),
        }
    }

    /// Unit vector of the drag axis as `(cos, sin)`.
    #[inline]
    pub fn axis(&self) -> (f64, f64) {
        match *self {
            Orientation::Horizontal => (1.0, 0.0),
            Orientation::Vertical => (0.0, 1.0),
            Orientation::Degrees(_) => {
                let (sin, cos) = self.radians().sin_cos();
                (cos, sin)
            }
        }
    }

    /// Project a vector onto the drag axis.
    #[inline]
    pub fn project(&self, x: f64, y: f64) -> f64 {
        let (cos, sin) = self.axis();
        x * cos + y * sin
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
enum OrientationRepr {
    Named(String),
    Degrees(f64),
}

#[cfg(feature = "serde")]
impl TryFrom<OrientationRepr> for Orientation {
    type Error = String;

    fn try_from(repr: OrientationRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            OrientationRepr::Named(name) => match name.trim().to_lowercase().as_str() {
                "horizontal" => Ok(Orientation::Horizontal),
                "vertical" => Ok(Orientation::Vertical),
                other => other
                    .parse::<f64>()
                    .map(Orientation::Degrees)
                    .map_err(|_| format!("unknown orientation `{name}`")),
            },
            OrientationRepr::Degrees(deg) => Ok(Orientation::Degrees(deg)),
        }
    }
}

#[cfg(feature = "serde")]
impl From<Orientation> for OrientationRepr {
    fn from(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Horizontal => OrientationRepr::Named("horizontal".into()),
            Orientation::Vertical => OrientationRepr::Named("vertical".into()),
            Orientation::Degrees(deg) => OrientationRepr::Degrees(deg),
        }
    }
}

/// Tuning for the `swipe` mapper.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SwipeOptions {
    /// Normalized distance that commits a swipe
    pub snap: f64,
    /// Last-sample pixel delta that commits a swipe regardless of distance
    pub fling: f64,
}

impl Default for SwipeOptions {
    fn default() -> Self {
        Self { snap: 0.5, fling: 10.0 }
    }
}

/// Tuning for the `hold` mapper.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HoldOptions {
    /// Tick interval with the pointer at the container edge
    pub min_frame_time: u32,
    /// Tick interval with the pointer at the container center
    pub max_frame_time: u32,
}

impl Default for HoldOptions {
    fn default() -> Self {
        Self {
            min_frame_time: 20,
            max_frame_time: 100,
        }
    }
}

/// Tuning for the `ease` mapper.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EaseOptions {
    /// Number of recent drag samples used to estimate velocity
    pub max_samples: usize,
    /// Velocity multiplier applied on each tick, in `[0, 0.999]`
    pub damping: f64,
    /// Sample gap in ms after which no inertia is applied
    pub abort_time: u32,
    /// Tick interval in ms, defaults to the viewer frame time
    pub update_time: Option<u32>,
    /// Velocity below which the ease loop stops
    pub epsilon: f64,
}

impl Default for EaseOptions {
    fn default() -> Self {
        Self {
            max_samples: 5,
            damping: 0.9,
            abort_time: 250,
            update_time: None,
            epsilon: 0.005,
        }
    }
}

/// Options of one viewer instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewerConfig {
    /// Initial frame
    pub frame: usize,
    /// Initial lane
    pub lane: usize,
    /// Frames per lane, taken from the image count when unset
    pub frames: Option<usize>,
    /// Number of lanes
    pub lanes: usize,
    /// Columns of a packed sheet
    pub frames_x: Option<usize>,
    /// Rows of a packed sheet
    pub frames_y: Option<usize>,
    /// Wrap frames past either end instead of clamping
    pub wrap: bool,
    /// Wrap lanes past either end instead of clamping
    pub wrap_lane: bool,
    /// Keep animating past `stop_frame`
    #[cfg_attr(feature = "serde", serde(rename = "loop"))]
    pub looping: bool,
    /// Frame on which a non-looping animation stops
    pub stop_frame: usize,
    /// Animate backwards
    pub reverse: bool,
    /// Start animating once loaded
    pub animate: bool,
    /// Milliseconds per animation tick
    pub frame_time: u32,
    /// Frames advanced per container width of drag
    pub sense: f64,
    /// Lanes advanced per container height of drag, defaults to `sense`
    pub sense_lane: Option<f64>,
    /// Drag axis
    pub orientation: Orientation,
    /// How frames fit into the container
    pub fill_mode: FillMode,
    /// Explicit viewer width
    pub width: Option<u32>,
    /// Explicit viewer height
    pub height: Option<u32>,
    /// Follow the host width, keeping the content aspect
    pub responsive: bool,
    /// Probe large images for half-resolution decoding
    pub detect_subsampling: bool,
    /// Interaction mappers by name, in dispatch order
    pub mappers: Vec<String>,
    /// `swipe` mapper tuning
    pub swipe: SwipeOptions,
    /// `hold` mapper tuning
    pub hold: HoldOptions,
    /// `ease` mapper tuning
    pub ease: EaseOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            frame: 0,
            lane: 0,
            frames: None,
            lanes: 1,
            frames_x: None,
            frames_y: None,
            wrap: true,
            wrap_lane: false,
            looping: true,
            stop_frame: 0,
            reverse: false,
            animate: true,
            frame_time: 40,
            sense: 1.0,
            sense_lane: None,
            orientation: Orientation::Horizontal,
            fill_mode: FillMode::Contain,
            width: None,
            height: None,
            responsive: false,
            detect_subsampling: true,
            mappers: vec!["drag".to_string()],
            swipe: SwipeOptions::default(),
            hold: HoldOptions::default(),
            ease: EaseOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Parse a TOML document into a `ViewerConfig`.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Check that every option lies in its valid domain.
    pub fn validate(&self) -> Result<()> {
        if self.frames == Some(0) {
            return Err(invalid("frames", "must be at least 1"));
        }
        if self.lanes == 0 {
            return Err(invalid("lanes", "must be at least 1"));
        }
        if self.frames_x == Some(0) {
            return Err(invalid("frames_x", "must be at least 1"));
        }
        if self.frames_x.is_some_and(|x| u32::try_from(x).is_err()) {
            return Err(invalid("frames_x", "must fit in 32 bits"));
        }
        if self.frames_y == Some(0) {
            return Err(invalid("frames_y", "must be at least 1"));
        }
        if self.frames_y.is_some_and(|y| u32::try_from(y).is_err()) {
            return Err(invalid("frames_y", "must fit in 32 bits"));
        }
        if !self.sense.is_finite() {
            return Err(invalid("sense", "must be finite"));
        }
        if self.sense_lane.is_some_and(|s| !s.is_finite()) {
            return Err(invalid("sense_lane", "must be finite"));
        }
        if let Orientation::Degrees(deg) = self.orientation {
            if !deg.is_finite() {
                return Err(invalid("orientation", "must be finite"));
            }
        }
        if self.hold.min_frame_time > self.hold.max_frame_time {
            return Err(invalid("hold", "min_frame_time exceeds max_frame_time"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> Error {
    Error::InvalidConfig {
        field,
        reason: reason.to_string(),
    }
}
