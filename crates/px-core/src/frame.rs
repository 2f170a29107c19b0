/// Reusable pixel buffer. Pre-allocated, RGBA row-major, 4 bytes per pixel.
///
/// # Example
/// ```
/// use px_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
pub struct FrameBuffer {
    /// RGBA pixels, row-major, 4 bytes per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Create a zeroed buffer at the given dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; (width * height * 4) as usize],
            width,
            height,
        }
    }

    /// Pixel at (x, y) → (r, g, b, a).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = ((y * self.width + x) * 4) as usize;
        if idx + 3 >= self.data.len() {
            return (0, 0, 0, 0);
        }
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Grayscale sample at (x, y): floating-point average of R, G and B.
    ///
    /// Alpha is ignored. The result stays in [0, 255] at channel extremes and
    /// is deliberately not rounded — bucket mapping happens on the raw float.
    ///
    /// # Example
    /// ```
    /// use px_core::frame::FrameBuffer;
    /// let mut fb = FrameBuffer::new(1, 1);
    /// fb.data[0] = 255; fb.data[1] = 255; fb.data[2] = 255;
    /// assert_eq!(fb.luminance(0, 0), 255.0);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn luminance(&self, x: u32, y: u32) -> f32 {
        let (r, g, b, _) = self.pixel(x, y);
        (f32::from(r) + f32::from(g) + f32::from(b)) / 3.0
    }
}

/// One frame's worth of glyphs: H rows of exactly W characters each.
///
/// Immutable once produced. Serializes to newline-joined lines with no
/// trailing characters per line.
///
/// # Example
/// ```
/// use px_core::frame::FrameGrid;
/// let grid = FrameGrid::from_rows(vec!["@@".into(), "..".into()]);
/// assert_eq!(grid.width(), 2);
/// assert_eq!(grid.height(), 2);
/// assert_eq!(grid.to_text(), "@@\n..");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameGrid {
    rows: Vec<String>,
    width: u32,
}

impl FrameGrid {
    /// Build a grid from pre-assembled rows.
    ///
    /// Width is taken from the first row; every row must match it.
    #[must_use]
    pub fn from_rows(rows: Vec<String>) -> Self {
        let width = rows.first().map_or(0, |r| r.chars().count() as u32);
        debug_assert!(
            rows.iter().all(|r| r.chars().count() as u32 == width),
            "ragged FrameGrid rows"
        );
        Self { rows, width }
    }

    /// Glyphs per row.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Rows in top-to-bottom order.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Newline-joined text form.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.rows.join("\n")
    }
}

/// Ordered, time-delayed collection of [`FrameGrid`]s from a video source.
///
/// Lifecycle: created empty, appended to while sampling, then sealed when the
/// source is exhausted, the frame cap is reached, or the source goes away.
/// A sealed sequence refuses further frames.
///
/// # Example
/// ```
/// use px_core::frame::{AnimatedSequence, FrameGrid};
/// let mut seq = AnimatedSequence::new(0.2);
/// seq.push(FrameGrid::from_rows(vec!["@".into()]));
/// seq.seal();
/// assert_eq!(seq.len(), 1);
/// assert!(seq.is_sealed());
/// ```
pub struct AnimatedSequence {
    frames: Vec<FrameGrid>,
    /// Display delay per frame, in seconds. Constant across the sequence.
    frame_delay_secs: f64,
    sealed: bool,
}

impl AnimatedSequence {
    /// Create an empty sequence with the given per-frame delay (seconds).
    #[must_use]
    pub fn new(frame_delay_secs: f64) -> Self {
        Self {
            frames: Vec::new(),
            frame_delay_secs,
            sealed: false,
        }
    }

    /// Append a frame. Ignored (with a warning) after sealing.
    pub fn push(&mut self, grid: FrameGrid) {
        if self.sealed {
            log::warn!("frame pushed to a sealed sequence, dropping it");
            return;
        }
        self.frames.push(grid);
    }

    /// Seal the sequence. There is no transition back.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// True once sealed.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of frames captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when no frames were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames in capture order.
    #[must_use]
    pub fn frames(&self) -> &[FrameGrid] {
        &self.frames
    }

    /// Per-frame display delay in seconds.
    #[must_use]
    pub fn frame_delay_secs(&self) -> f64 {
        self.frame_delay_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framebuffer_luminance_extremes() {
        let mut fb = FrameBuffer::new(2, 1);
        // White pixel at (0,0), black at (1,0).
        for c in 0..3 {
            fb.data[c] = 255;
        }
        assert_eq!(fb.luminance(0, 0), 255.0);
        assert_eq!(fb.luminance(1, 0), 0.0);
    }

    #[test]
    fn framebuffer_luminance_ignores_alpha() {
        let mut fb = FrameBuffer::new(1, 1);
        fb.data[3] = 255;
        assert_eq!(fb.luminance(0, 0), 0.0);
    }

    #[test]
    fn frame_grid_text_has_no_trailing_newline() {
        let grid = FrameGrid::from_rows(vec!["ab".into(), "cd".into()]);
        assert_eq!(grid.to_text(), "ab\ncd");
    }

    #[test]
    fn empty_grid_is_valid() {
        let grid = FrameGrid::from_rows(Vec::new());
        assert_eq!(grid.height(), 0);
        assert_eq!(grid.to_text(), "");
    }

    #[test]
    fn sealed_sequence_refuses_frames() {
        let mut seq = AnimatedSequence::new(0.2);
        seq.push(FrameGrid::from_rows(vec!["@".into()]));
        seq.seal();
        seq.push(FrameGrid::from_rows(vec!["#".into()]));
        assert_eq!(seq.len(), 1);
        assert!(seq.is_sealed());
    }
}
