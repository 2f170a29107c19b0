use crate::error::CoreError;

/// Derive the glyph-grid dimensions for a requested width.
///
/// Height is `floor(width · (native_h / native_w) · 0.5)`: the 0.5 factor
/// compensates for monospaced cells being roughly twice as tall as they are
/// wide, so fewer rows preserve the visual proportion.
///
/// A zero height is a valid degenerate result for extremely wide sources.
///
/// # Errors
/// Returns `CoreError::InvalidResolution` when `width` is zero or the source
/// has a zero-width (degenerate aspect ratio).
///
/// # Example
/// ```
/// use px_core::resolution::grid_size;
/// assert_eq!(grid_size(100, (1920, 1080)).unwrap(), (100, 28));
/// assert_eq!(grid_size(80, (640, 480)).unwrap(), (80, 30));
/// ```
pub fn grid_size(width: u32, native: (u32, u32)) -> Result<(u32, u32), CoreError> {
    let (native_w, native_h) = native;
    if width == 0 || native_w == 0 {
        return Err(CoreError::InvalidResolution {
            width,
            height: 0,
            source_width: native_w,
            source_height: native_h,
        });
    }
    let aspect = f64::from(native_h) / f64::from(native_w);
    let height = (f64::from(width) * aspect * 0.5).floor() as u32;
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_halved_aspect_height() {
        // 100 wide on a 16:9 source: 100 * 0.5625 * 0.5 = 28.125 → 28.
        assert_eq!(grid_size(100, (1920, 1080)).unwrap(), (100, 28));
        // Square source: height is exactly half the width.
        assert_eq!(grid_size(60, (512, 512)).unwrap(), (60, 30));
    }

    #[test]
    fn zero_width_request_is_invalid() {
        assert!(matches!(
            grid_size(0, (640, 480)),
            Err(CoreError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn degenerate_source_is_invalid() {
        assert!(matches!(
            grid_size(80, (0, 480)),
            Err(CoreError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn extreme_panorama_can_yield_zero_height() {
        let (w, h) = grid_size(4, (4000, 10)).unwrap();
        assert_eq!((w, h), (4, 0));
    }
}
