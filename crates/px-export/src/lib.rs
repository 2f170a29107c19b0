//! File export for pixscii grids and sequences.
//!
//! Plain text and HTML write the glyphs directly; PNG, GIF and video render
//! them through a software glyph atlas first, then encode.

pub mod encode;
pub mod muxer;
pub mod rasterizer;
pub mod text;

pub use encode::{save_gif, save_png};
pub use muxer::{VideoMuxer, export_video};
pub use rasterizer::TextRasterizer;
pub use text::{save_html, save_text};
