use std::io::Write;
use std::path::Path;
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result};
use px_core::frame::{AnimatedSequence, FrameBuffer};

use crate::rasterizer::TextRasterizer;

/// Encodes raw RGBA frames into a video container through an ffmpeg stdin
/// pipe. The codec is picked from the output extension: `.webm` gets VP9,
/// everything else H.264.
pub struct VideoMuxer {
    ffmpeg_child: Child,
}

impl VideoMuxer {
    /// Spawn the encoder process for the given geometry and frame rate.
    ///
    /// # Errors
    /// Returns an error if ffmpeg is missing from PATH or fails to start.
    pub fn new(output_path: &Path, width: u32, height: u32, fps: u32) -> Result<Self> {
        let path_str = output_path.to_str().context("output path is not valid UTF-8")?;

        let is_webm = output_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("webm"));
        let codec_args: &[&str] = if is_webm {
            &["-c:v", "libvpx-vp9", "-b:v", "0", "-crf", "30"]
        } else {
            &["-c:v", "libx264", "-crf", "18", "-preset", "medium"]
        };

        let size = format!("{width}x{height}");
        let fps_str = fps.to_string();
        let mut args: Vec<&str> = vec![
            "-y",
            "-f",
            "rawvideo",
            "-vcodec",
            "rawvideo",
            "-s",
            &size,
            "-pix_fmt",
            "rgba",
            "-r",
            &fps_str,
            "-i",
            "-",
        ];
        args.extend_from_slice(codec_args);
        args.extend_from_slice(&[
            // yuv420p needs even dimensions; pad a stray odd pixel row/col.
            "-vf",
            "pad=ceil(iw/2)*2:ceil(ih/2)*2",
            "-pix_fmt",
            "yuv420p",
            "-hide_banner",
            "-loglevel",
            "error",
            path_str,
        ]);

        let child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .context("cannot start the ffmpeg encoder; is it installed and in PATH?")?;

        Ok(Self {
            ffmpeg_child: child,
        })
    }

    /// Stream one frame into the encoder.
    ///
    /// # Errors
    /// Returns an I/O error if the pipe write fails.
    pub fn write_frame(&mut self, fb: &FrameBuffer) -> Result<()> {
        if let Some(stdin) = self.ffmpeg_child.stdin.as_mut() {
            stdin.write_all(&fb.data)?;
        }
        Ok(())
    }

    /// Close the stream and wait for the container to be finalized.
    ///
    /// # Errors
    /// Returns an error if ffmpeg reports a failure, with its stderr attached.
    pub fn finish(mut self) -> Result<()> {
        drop(self.ffmpeg_child.stdin.take());

        let output = self.ffmpeg_child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("ffmpeg encoder error: {stderr}");
        }
        Ok(())
    }
}

/// Render every frame of a sealed sequence and encode it into `path`.
///
/// The container frame rate is derived from the sequence's per-frame delay.
///
/// # Errors
/// Returns an error if the sequence is empty or encoding fails.
pub fn export_video(
    sequence: &AnimatedSequence,
    rasterizer: &TextRasterizer,
    path: &Path,
) -> Result<()> {
    if sequence.is_empty() {
        anyhow::bail!("sequence holds no frames, nothing to encode");
    }

    let first = &sequence.frames()[0];
    let (width, height) = rasterizer.target_dimensions(first.width(), first.height());
    let fps = (1.0 / sequence.frame_delay_secs()).round().max(1.0) as u32;

    let mut muxer = VideoMuxer::new(path, width, height, fps)?;
    let mut fb = FrameBuffer::new(width, height);
    for grid in sequence.frames() {
        rasterizer.render(grid, &mut fb);
        muxer.write_frame(&fb)?;
    }
    muxer.finish()?;

    log::info!(
        "wrote {} video frame(s) @ {fps}fps to {}",
        sequence.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn muxer_new_does_not_panic() {
        // VideoMuxer::new may succeed or fail depending on ffmpeg
        // availability; either outcome is fine, panicking is not.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mp4");
        if let Ok(muxer) = VideoMuxer::new(&path, 64, 64, 30) {
            let _ = muxer.finish();
        }
    }
}
