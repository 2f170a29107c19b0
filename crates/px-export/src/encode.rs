use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame, RgbaImage};
use px_core::frame::{AnimatedSequence, FrameGrid};

use crate::rasterizer::TextRasterizer;

fn grid_to_image(rasterizer: &TextRasterizer, grid: &FrameGrid) -> Result<RgbaImage> {
    let fb = rasterizer.render_to_buffer(grid);
    RgbaImage::from_raw(fb.width, fb.height, fb.data)
        .context("rendered buffer has inconsistent dimensions")
}

/// Render a grid with the given font atlas and save it as a PNG.
///
/// # Errors
/// Returns an error for an empty grid or a write/encode failure.
pub fn save_png(grid: &FrameGrid, rasterizer: &TextRasterizer, path: &Path) -> Result<()> {
    if grid.height() == 0 || grid.width() == 0 {
        anyhow::bail!("grid is empty, nothing to render");
    }
    let img = grid_to_image(rasterizer, grid)?;
    img.save(path)
        .with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("wrote PNG export to {}", path.display());
    Ok(())
}

/// Encode a sealed sequence as an animated GIF, honoring its per-frame delay.
///
/// A single-frame sequence produces a still GIF — that is how still images
/// are exported through this path.
///
/// # Errors
/// Returns an error if the sequence is empty or encoding fails.
pub fn save_gif(
    sequence: &AnimatedSequence,
    rasterizer: &TextRasterizer,
    path: &Path,
) -> Result<()> {
    if sequence.is_empty() {
        anyhow::bail!("sequence holds no frames, nothing to encode");
    }

    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    let mut encoder = GifEncoder::new(BufWriter::new(file));
    encoder.set_repeat(Repeat::Infinite)?;

    let delay_ms = (sequence.frame_delay_secs() * 1000.0).round().max(1.0) as u32;
    for grid in sequence.frames() {
        let img = grid_to_image(rasterizer, grid)?;
        let frame = Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(delay_ms, 1));
        encoder.encode_frame(frame)?;
    }

    log::info!(
        "wrote {} GIF frame(s) to {}",
        sequence.len(),
        path.display()
    );
    Ok(())
}
