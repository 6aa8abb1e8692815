//! # spinview-core
//!
//! Frame addressing and playback engine for sprite-sheet 360 degree viewers.
//!
//! This crate provides platform-agnostic data structures and logic for:
//! - Measuring images into grids of addressable sprite rectangles
//! - Mapping a (lane, frame) pair to a sheet and sprite
//! - Playing frames over time with wrap, clamp, loop and stop-frame rules
//! - Turning pointer input into frame changes (drag, click, swipe, hold, ease, wheel)
//! - Fitting frames into a host container (contain, cover, fill, scale-down, none)
//!
//! Painting, DOM events and image loading stay with the host. The host feeds
//! events in, forwards fired timers and paints [`DrawCommand`]s.
//!
//! ## Features
//!
//! - `serde` - Enable serialization/deserialization for config, metrics and layout
//! - `toml` - Enable `ViewerConfig::from_toml_str`
//! - `web` - Enable browser collaborators (canvas probe, window timers, canvas painting)
//!
//! ## Example
//!
//! ```rust
//! use spinview_core::{ContainerBox, Event, ImageSize, NoProbe, PointerEvent, Viewer, ViewerConfig, VirtualClock};
//!
//! let config = ViewerConfig {
//!     frames: Some(24),
//!     frames_x: Some(6),
//!     mappers: vec!["drag".into(), "ease".into()],
//!     ..Default::default()
//! };
//! let clock = VirtualClock::new();
//! let mut viewer = Viewer::from_config(&config, Box::new(clock.clone())).unwrap();
//! viewer.add_listener(|event: Event, state: &spinview_core::ViewerState| {
//!     if event == Event::FrameChanged {
//!         println!("frame {}", state.frame());
//!     }
//! });
//!
//! viewer.init();
//! viewer.resize(ContainerBox::new(0.0, 0.0, 600.0, 400.0));
//! viewer.load(&[ImageSize::new(1200, 800)], &mut NoProbe);
//!
//! // Drive the animation timer
//! for id in clock.advance(120) {
//!     viewer.on_timer(id);
//! }
//! assert_eq!(viewer.state().frame(), 3);
//!
//! let command = viewer.draw_command().unwrap();
//! assert_eq!((command.source.x, command.source.y), (600.0, 0.0));
//! ```

mod config;
mod error;
mod input;
mod layout;
mod locator;
pub mod mappers;
mod math;
mod metrics;
mod playback;
mod progress;
pub mod registry;
pub mod render;
mod scheduler;
mod state;
mod viewer;
#[cfg(feature = "web")]
pub mod web;

pub use config::{EaseOptions, HoldOptions, Orientation, SwipeOptions, ViewerConfig};
pub use error::{Error, Result};
pub use input::{reset_input, update_input, ContainerBox, InputState, Point, PointerEvent, WheelEvent};
pub use layout::{responsive_size, solve_layout, FillMode, Layout, Size, SizeHints};
pub use locator::{find_specs, SpriteLocation};
pub use mappers::InteractionMapper;
pub use math::{clamp, wrap};
pub use metrics::{
    detect_subsampling, measure, total_sprites, ImageSize, MeasureOptions, NoProbe, PixelProbe, ProbeError,
    SheetSpec, SourceImage, SpriteSpec, PROBE_BACKGROUND, SUBSAMPLING_AREA,
};
pub use playback::{PlayToOptions, PlaybackState};
pub use progress::LoadProgress;
pub use registry::{MapperFactory, MapperRegistry, Registry, ViewerHandle};
pub use render::{draw_command, DrawCommand, SourceRect};
pub use scheduler::{Scheduler, TimerId, VirtualClock};
pub use state::StateStore;
pub use viewer::{Event, Listener, Viewer, ViewerCore, ViewerState};

#[cfg(feature = "web")]
pub use web::{CanvasProbe, WindowScheduler};
