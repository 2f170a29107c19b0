use std::io::{Stdout, Write, stdout};

use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use px_ascii::sampler::LiveSampler;
use px_core::config::RenderConfig;
use px_core::frame::FrameGrid;
use px_core::traits::{DisplaySink, VideoSource};
use px_source::video::VideoFile;

/// Display sink that repaints the alternate screen with each grid.
pub struct TerminalSink {
    out: Stdout,
}

impl TerminalSink {
    /// Enter the alternate screen and hide the cursor.
    ///
    /// # Errors
    /// Returns an error if the terminal refuses the escape sequences.
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        execute!(out, EnterAlternateScreen, Hide)?;
        Ok(Self { out })
    }

    fn draw(&mut self, grid: &FrameGrid) -> Result<()> {
        queue!(self.out, MoveTo(0, 0), Clear(ClearType::FromCursorDown))?;
        for (y, row) in grid.rows().iter().enumerate() {
            queue!(self.out, MoveTo(0, y as u16))?;
            self.out.write_all(row.as_bytes())?;
        }
        self.out.flush()?;
        Ok(())
    }
}

impl DisplaySink for TerminalSink {
    fn publish(&mut self, grid: &FrameGrid) {
        // Fire-and-forget: a failed repaint is just a dropped frame.
        if let Err(e) = self.draw(grid) {
            log::debug!("preview repaint failed: {e}");
        }
    }
}

impl Drop for TerminalSink {
    fn drop(&mut self) {
        let _ = execute!(self.out, LeaveAlternateScreen, Show);
    }
}

/// Play the video and keep the terminal updated until it pauses or ends.
///
/// # Errors
/// Returns an error for bad configuration (width, alphabet) or a terminal
/// that cannot enter the alternate screen.
pub fn run_live_preview(video: &mut VideoFile, config: &RenderConfig) -> Result<()> {
    let mut sampler = LiveSampler::new(config, video.native_size())?;
    let mut sink = TerminalSink::new()?;
    video.play();
    sampler.run(video, &mut sink);
    Ok(())
}
