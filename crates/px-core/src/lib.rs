//! Shared types, configuration, and traits for pixscii.
//!
//! This crate holds everything the rest of the workspace agrees on: the
//! alphabet and its glyph mapping, pixel/glyph frame types, the resolution
//! policy, the error taxonomy, and the source/sink seams.

pub mod alphabet;
pub mod config;
pub mod error;
pub mod frame;
pub mod resolution;
pub mod traits;

pub use alphabet::Alphabet;
pub use config::RenderConfig;
pub use error::CoreError;
pub use frame::{AnimatedSequence, FrameBuffer, FrameGrid};
pub use traits::{DisplaySink, PlaybackStatus, VideoSource};
