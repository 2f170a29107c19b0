use px_core::alphabet::Alphabet;
use px_core::frame::{FrameBuffer, FrameGrid};

/// Convert a pixel buffer into a glyph grid, one glyph per pixel.
///
/// The buffer must already be at the target grid resolution — this function
/// never resamples; scaling is the caller's job (see px-source's resizer).
/// Each cell is the floating-point average of the pixel's R, G and B
/// channels, bucket-mapped through the alphabet. Pure and deterministic:
/// the same buffer and alphabet always produce the same grid.
///
/// # Example
/// ```
/// use px_core::{Alphabet, FrameBuffer};
/// use px_ascii::rasterize::rasterize;
///
/// let frame = FrameBuffer::new(4, 2); // all black
/// let alphabet = Alphabet::parse("@. ").unwrap();
/// let grid = rasterize(&frame, &alphabet);
/// assert_eq!(grid.to_text(), "@@@@\n@@@@");
/// ```
#[must_use]
pub fn rasterize(frame: &FrameBuffer, alphabet: &Alphabet) -> FrameGrid {
    let mut rows = Vec::with_capacity(frame.height as usize);
    for y in 0..frame.height {
        let mut row = String::with_capacity(frame.width as usize);
        for x in 0..frame.width {
            row.push(alphabet.glyph(frame.luminance(x, y)));
        }
        rows.push(row);
    }
    FrameGrid::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use px_core::alphabet::ALPHABET_DEFAULT;

    fn gradient_frame(width: u32, height: u32) -> FrameBuffer {
        let mut fb = FrameBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = (x * 255 / width.max(1)) as u8;
                let idx = ((y * width + x) * 4) as usize;
                fb.data[idx] = v;
                fb.data[idx + 1] = v;
                fb.data[idx + 2] = v;
                fb.data[idx + 3] = 255;
            }
        }
        fb
    }

    #[test]
    fn grid_has_exact_dimensions() {
        let alphabet = Alphabet::parse(ALPHABET_DEFAULT).unwrap();
        for (w, h) in [(1, 1), (7, 3), (80, 24), (5, 0)] {
            let grid = rasterize(&FrameBuffer::new(w, h), &alphabet);
            assert_eq!(grid.height(), h, "{w}x{h}");
            for row in grid.rows() {
                assert_eq!(row.chars().count() as u32, w, "{w}x{h}");
            }
        }
    }

    #[test]
    fn black_and_white_hit_alphabet_ends() {
        let alphabet = Alphabet::parse(ALPHABET_DEFAULT).unwrap();
        let black = FrameBuffer::new(3, 1);
        assert_eq!(rasterize(&black, &alphabet).to_text(), "@@@");

        let mut white = FrameBuffer::new(3, 1);
        white.data.fill(255);
        assert_eq!(rasterize(&white, &alphabet).to_text(), "   ");
    }

    #[test]
    fn deterministic_for_same_input() {
        let alphabet = Alphabet::parse(ALPHABET_DEFAULT).unwrap();
        let frame = gradient_frame(32, 8);
        assert_eq!(rasterize(&frame, &alphabet), rasterize(&frame, &alphabet));
    }

    #[test]
    fn alpha_channel_does_not_affect_output() {
        let alphabet = Alphabet::parse(ALPHABET_DEFAULT).unwrap();
        let mut opaque = gradient_frame(16, 2);
        let transparent = {
            let mut fb = gradient_frame(16, 2);
            for px in fb.data.chunks_exact_mut(4) {
                px[3] = 0;
            }
            fb
        };
        for px in opaque.data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        assert_eq!(
            rasterize(&opaque, &alphabet),
            rasterize(&transparent, &alphabet)
        );
    }

    #[test]
    fn gradient_runs_dense_to_light() {
        let alphabet = Alphabet::parse(ALPHABET_DEFAULT).unwrap();
        let grid = rasterize(&gradient_frame(100, 1), &alphabet);
        let row: Vec<char> = grid.rows()[0].chars().collect();
        assert_eq!(row[0], '@');
        assert_eq!(*row.last().unwrap(), ' ');
    }
}
