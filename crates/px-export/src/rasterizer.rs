use std::collections::HashMap;

use ab_glyph::{Font, FontRef, PxScale, point};
use px_core::frame::{FrameBuffer, FrameGrid};
use rayon::prelude::*;

/// Renders glyph grids into RGBA pixels, white on black, for the image-based
/// exports (PNG, GIF, video).
///
/// All printable ASCII glyphs are rasterized once up front into an alpha
/// atlas; the per-frame loop only composites cached coverage.
pub struct TextRasterizer {
    char_width: u32,
    char_height: u32,
    /// Per-character alpha coverage, size = char_width × char_height.
    glyph_cache: HashMap<char, Vec<u8>>,
    /// All-zero fallback for characters missing from the font.
    empty_glyph: Vec<u8>,
}

impl TextRasterizer {
    /// Build the atlas from raw font bytes (TTF/OTF) at the given pixel size.
    ///
    /// # Errors
    /// Returns an error if the font data cannot be parsed.
    pub fn new(font_data: &[u8], scale_px: f32) -> anyhow::Result<Self> {
        let font = FontRef::try_from_slice(font_data)?;
        let scale = PxScale::from(scale_px);

        let v_advance = font.ascent_unscaled() - font.descent_unscaled() + font.line_gap_unscaled();
        let height = (v_advance * scale.y / font.height_unscaled()).ceil() as u32;

        let m_glyph = font.glyph_id('M');
        let h_advance = font.h_advance_unscaled(m_glyph);
        let width = (h_advance * scale.x / font.height_unscaled()).ceil() as u32;

        let char_width = width.max(1);
        let char_height = height.max(1);

        let mut rasterizer = Self {
            char_width,
            char_height,
            glyph_cache: HashMap::new(),
            empty_glyph: vec![0u8; (char_width * char_height) as usize],
        };

        // Printable ASCII covers every built-in alphabet.
        rasterizer.cache_range(&font, scale, 32..=126);

        Ok(rasterizer)
    }

    fn cache_range(&mut self, font: &FontRef, scale: PxScale, range: std::ops::RangeInclusive<u32>) {
        for codepoint in range {
            let Some(ch) = std::char::from_u32(codepoint) else {
                continue;
            };
            // glyph_id 0 is .notdef; skip it so missing characters stay blank
            // instead of rendering placeholder boxes.
            let gid = font.glyph_id(ch);
            if gid.0 == 0 {
                continue;
            }

            let mut buffer = vec![0u8; (self.char_width * self.char_height) as usize];

            let ascent_px = font.ascent_unscaled() * scale.y / font.height_unscaled();
            let glyph = gid.with_scale_and_position(scale, point(0.0, ascent_px));

            if let Some(outline) = font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                #[allow(clippy::cast_possible_wrap)]
                outline.draw(|x, y, v| {
                    let px = (x as i32 + bounds.min.x as i32).max(0) as u32;
                    let py = (y as i32 + bounds.min.y as i32).max(0) as u32;
                    if px < self.char_width && py < self.char_height {
                        let idx = (py * self.char_width + px) as usize;
                        if idx < buffer.len() {
                            buffer[idx] = (v * 255.0).round() as u8;
                        }
                    }
                });
            }
            self.glyph_cache.insert(ch, buffer);
        }
    }

    /// Pixel dimensions a grid of the given size renders to.
    #[must_use]
    pub fn target_dimensions(&self, grid_w: u32, grid_h: u32) -> (u32, u32) {
        (grid_w * self.char_width, grid_h * self.char_height)
    }

    /// Render `grid` into `fb`, which must already match
    /// [`TextRasterizer::target_dimensions`]. Parallelized over glyph rows.
    pub fn render(&self, grid: &FrameGrid, fb: &mut FrameBuffer) {
        let (expected_w, expected_h) = self.target_dimensions(grid.width(), grid.height());
        if fb.width != expected_w || fb.height != expected_h {
            log::error!(
                "rasterizer dimension mismatch: fb={}x{} expected={}x{}",
                fb.width,
                fb.height,
                expected_w,
                expected_h
            );
            return;
        }

        let empty_glyph = &self.empty_glyph;
        let stride = (expected_w * 4) as usize;
        let band_size = stride * self.char_height as usize;

        fb.data
            .par_chunks_exact_mut(band_size)
            .enumerate()
            .for_each(|(gy, band)| {
                for (gx, ch) in grid.rows()[gy].chars().enumerate() {
                    let coverage = self.glyph_cache.get(&ch).unwrap_or(empty_glyph);
                    let cx_start = gx * self.char_width as usize;

                    for cy in 0..(self.char_height as usize) {
                        let band_row = cy * stride;
                        for cx in 0..(self.char_width as usize) {
                            let alpha = coverage[cy * self.char_width as usize + cx];
                            let px_idx = band_row + (cx_start + cx) * 4;
                            // White glyph on black: the coverage is the gray.
                            band[px_idx] = alpha;
                            band[px_idx + 1] = alpha;
                            band[px_idx + 2] = alpha;
                            band[px_idx + 3] = 255;
                        }
                    }
                }
            });
    }

    /// Render `grid` into a freshly sized buffer.
    #[must_use]
    pub fn render_to_buffer(&self, grid: &FrameGrid) -> FrameBuffer {
        let (w, h) = self.target_dimensions(grid.width(), grid.height());
        let mut fb = FrameBuffer::new(w, h);
        self.render(grid, &mut fb);
        fb
    }
}
