use std::path::Path;

use anyhow::{Context, Result};
use px_core::frame::FrameBuffer;

/// Load a still image (PNG, JPEG, BMP, GIF) into an RGBA frame buffer at its
/// native resolution. Downscaling to the glyph grid happens afterwards via
/// the resizer.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded.
///
/// # Example
/// ```no_run
/// use px_source::image::load_image;
/// let frame = load_image(std::path::Path::new("photo.png")).unwrap();
/// ```
pub fn load_image(path: &Path) -> Result<FrameBuffer> {
    let img = image::open(path).with_context(|| format!("cannot load {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::debug!("loaded {} ({width}×{height})", path.display());
    Ok(FrameBuffer {
        data: rgba.into_raw(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_written_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let mut img = image::RgbaImage::new(4, 2);
        for px in img.pixels_mut() {
            *px = image::Rgba([120, 120, 120, 255]);
        }
        img.save(&path).unwrap();

        let frame = load_image(&path).unwrap();
        assert_eq!((frame.width, frame.height), (4, 2));
        assert_eq!(frame.pixel(3, 1), (120, 120, 120, 255));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_image(Path::new("no/such/file.png")).is_err());
    }
}
