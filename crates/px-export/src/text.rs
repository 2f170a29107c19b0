use std::path::Path;

use anyhow::{Context, Result};
use px_core::frame::FrameGrid;

/// Write a grid as plain text, one line per row.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_text(grid: &FrameGrid, path: &Path) -> Result<()> {
    std::fs::write(path, grid.to_text())
        .with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("wrote text export to {}", path.display());
    Ok(())
}

/// Escape the characters that would break out of a `<pre>` block.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Write a grid as a standalone HTML page: monospace, white on black.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn save_html(grid: &FrameGrid, path: &Path) -> Result<()> {
    let body = escape_html(&grid.to_text());
    let html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>ASCII Art</title>\n\
         <style>body {{ background: black; color: white; }}\n\
         pre {{ font-family: monospace; white-space: pre; }}</style>\n</head>\n<body>\n\
         <pre>{body}</pre>\n</body>\n</html>\n"
    );
    std::fs::write(path, html).with_context(|| format!("cannot write {}", path.display()))?;
    log::info!("wrote HTML export to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.txt");
        let grid = FrameGrid::from_rows(vec!["@#".into(), " .".into()]);
        save_text(&grid, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "@#\n .");
    }

    #[test]
    fn html_escapes_markup_glyphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("art.html");
        // The extended alphabet contains <, > and &-adjacent glyphs.
        let grid = FrameGrid::from_rows(vec!["<>&".into()]);
        save_html(&grid, &path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("&lt;&gt;&amp;"));
        assert!(!html.contains("<pre><>"));
    }
}
