//! ASCII conversion engine for pixscii.
//!
//! Turns pixel frames into glyph grids and drives repeated rasterization
//! over time-varying sources (live preview and bounded export).

pub mod rasterize;
pub mod sampler;

pub use rasterize::rasterize;
pub use sampler::{ExportJob, ExportState, ExportStep, LiveSampler, LiveTick};
