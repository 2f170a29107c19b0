//! Visual sources for pixscii: still images and ffmpeg-backed video files,
//! plus the resize layer that adapts source pixels to the glyph grid.

pub mod image;
pub mod resize;
pub mod video;
