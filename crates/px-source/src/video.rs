// Video decoding goes through ffmpeg/ffprobe subprocesses rather than a
// linked libav: `probe_video` asks ffprobe for stream metadata, and each
// capture spawns a one-shot ffmpeg that scales the frame at the requested
// position straight to raw RGBA on stdout. Requires ffmpeg + ffprobe in PATH.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use anyhow::{Context, Result};
use px_core::error::CoreError;
use px_core::frame::FrameBuffer;
use px_core::traits::{PlaybackStatus, VideoSource};

/// Metadata extracted via ffprobe.
#[derive(Clone, Copy, Debug)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Frames per second (e.g. 23.976, 24.0, 30.0).
    pub fps: f64,
    /// Stream duration in seconds.
    pub duration_secs: f64,
}

/// Parse the `key=value` lines ffprobe prints with
/// `-of default=noprint_wrappers=1`.
fn parse_probe_output(text: &str) -> VideoInfo {
    let mut info = VideoInfo {
        width: 0,
        height: 0,
        fps: 30.0,
        duration_secs: 0.0,
    };

    for line in text.lines() {
        if let Some(val) = line.strip_prefix("width=") {
            info.width = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("height=") {
            info.height = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("duration=") {
            info.duration_secs = val.trim().parse().unwrap_or(0.0);
        } else if let Some(val) = line.strip_prefix("r_frame_rate=") {
            // Format: "24/1" or "30000/1001"
            let mut parts = val.trim().splitn(2, '/');
            let num: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);
            let den: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1.0);
            if den > 0.0 {
                info.fps = num / den;
            }
        }
    }
    info
}

/// Query ffprobe for the main video stream's metadata.
///
/// # Errors
/// Returns an error if ffprobe is missing from PATH or the file has no
/// decodable video stream.
pub fn probe_video(path: &Path) -> Result<VideoInfo> {
    let path_str = path.to_str().context("video path is not valid UTF-8")?;

    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,r_frame_rate:format=duration",
            "-of",
            "default=noprint_wrappers=1",
            "-i",
            path_str,
        ])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .context("cannot run ffprobe; is it installed and in PATH?")?;

    let info = parse_probe_output(&String::from_utf8_lossy(&output.stdout));

    if info.width == 0 || info.height == 0 {
        anyhow::bail!("ffprobe found no video stream in {}", path.display());
    }

    log::info!(
        "probe_video: {}x{} @ {:.3}fps, {:.2}s — {}",
        info.width,
        info.height,
        info.fps,
        info.duration_secs,
        path.display()
    );

    Ok(info)
}

/// Read exactly `buf.len()` bytes from `reader`.
///
/// Returns `Ok(true)` on success, `Ok(false)` on EOF before completion.
///
/// # Errors
/// Returns the underlying error on fatal I/O failure.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

/// Decode the single frame at `pos_secs` into `fb`, scaled to the buffer's
/// dimensions. `-ss` before `-i` keeps the seek keyframe-fast.
fn capture_frame(path: &Path, pos_secs: f64, fb: &mut FrameBuffer) -> Result<(), CoreError> {
    let Some(path_str) = path.to_str() else {
        return Err(CoreError::source_unavailable("video path is not valid UTF-8"));
    };

    let scale_filter = format!("scale={}:{}:flags=bilinear", fb.width, fb.height);
    let pos_str = format!("{pos_secs:.3}");

    let mut child = Command::new("ffmpeg")
        .args([
            "-ss",
            &pos_str,
            "-i",
            path_str,
            "-vf",
            &scale_filter,
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-an",
            "-hide_banner",
            "-loglevel",
            "error",
            "pipe:1",
        ])
        .stdout(Stdio::piped())
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| CoreError::source_unavailable(format!("cannot spawn ffmpeg: {e}")))?;

    let frame_bytes = (fb.width * fb.height * 4) as usize;
    let read_result = child
        .stdout
        .as_mut()
        .map_or(Ok(false), |out| read_exact_or_eof(out, &mut fb.data[..frame_bytes]));

    let _ = child.wait();

    match read_result {
        Ok(true) => Ok(()),
        Ok(false) => Err(CoreError::source_unavailable(format!(
            "no frame at {pos_secs:.3}s (end of stream)"
        ))),
        Err(e) => Err(CoreError::source_unavailable(format!("pipe read failed: {e}"))),
    }
}

/// Wall-clock playback position: an anchor position plus, while playing, the
/// real time elapsed since play was pressed.
struct PlaybackClock {
    anchor_secs: f64,
    playing_since: Option<Instant>,
}

impl PlaybackClock {
    fn new() -> Self {
        Self {
            anchor_secs: 0.0,
            playing_since: None,
        }
    }

    fn position(&self, duration: f64) -> f64 {
        let pos = match self.playing_since {
            Some(since) => self.anchor_secs + since.elapsed().as_secs_f64(),
            None => self.anchor_secs,
        };
        if duration > 0.0 { pos.min(duration) } else { pos }
    }

    fn play(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn pause(&mut self, duration: f64) {
        self.anchor_secs = self.position(duration);
        self.playing_since = None;
    }

    fn seek(&mut self, secs: f64, duration: f64) {
        self.anchor_secs = if duration > 0.0 {
            secs.clamp(0.0, duration)
        } else {
            secs.max(0.0)
        };
        if self.playing_since.is_some() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }
}

/// A seekable video file backed by ffmpeg subprocess decoding.
///
/// # Example
/// ```no_run
/// use px_source::video::VideoFile;
/// use std::path::Path;
/// let mut video = VideoFile::open(Path::new("clip.mp4")).unwrap();
/// video.play();
/// ```
pub struct VideoFile {
    path: PathBuf,
    info: VideoInfo,
    clock: PlaybackClock,
}

impl VideoFile {
    /// Probe and open a video file.
    ///
    /// # Errors
    /// Returns an error if ffprobe is unavailable or the file has no video
    /// stream.
    pub fn open(path: &Path) -> Result<Self> {
        let info = probe_video(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            info,
            clock: PlaybackClock::new(),
        })
    }

    /// Stream metadata.
    #[must_use]
    pub fn info(&self) -> VideoInfo {
        self.info
    }

    /// Start (or resume) playback. Restarts from 0 when already at the end.
    pub fn play(&mut self) {
        if self.status() == PlaybackStatus::Ended {
            self.clock.seek(0.0, self.info.duration_secs);
        }
        self.clock.play();
    }

    /// Freeze playback at the current position.
    pub fn pause(&mut self) {
        self.clock.pause(self.info.duration_secs);
    }

    /// Pause and rewind to the start.
    pub fn stop(&mut self) {
        self.clock.pause(self.info.duration_secs);
        self.clock.seek(0.0, self.info.duration_secs);
    }
}

impl VideoSource for VideoFile {
    fn native_size(&self) -> (u32, u32) {
        (self.info.width, self.info.height)
    }

    fn duration_secs(&self) -> f64 {
        self.info.duration_secs
    }

    fn position_secs(&self) -> f64 {
        self.clock.position(self.info.duration_secs)
    }

    fn status(&self) -> PlaybackStatus {
        let duration = self.info.duration_secs;
        if duration > 0.0 && self.position_secs() >= duration {
            PlaybackStatus::Ended
        } else if self.clock.is_playing() {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        }
    }

    fn seek(&mut self, secs: f64) -> Result<(), CoreError> {
        self.clock.seek(secs, self.info.duration_secs);
        Ok(())
    }

    fn capture_into(&mut self, fb: &mut FrameBuffer) -> Result<(), CoreError> {
        capture_frame(&self.path, self.position_secs(), fb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_output_parsing() {
        let text = "width=1920\nheight=800\nr_frame_rate=24000/1001\nduration=12.480000\n";
        let info = parse_probe_output(text);
        assert_eq!((info.width, info.height), (1920, 800));
        assert!((info.fps - 23.976).abs() < 0.001);
        assert!((info.duration_secs - 12.48).abs() < 0.001);
    }

    #[test]
    fn probe_output_defaults_on_garbage() {
        let info = parse_probe_output("r_frame_rate=0/0\nnot a line\n");
        assert_eq!(info.width, 0);
        assert!((info.fps - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clock_paused_position_is_stable() {
        let mut clock = PlaybackClock::new();
        clock.seek(3.0, 10.0);
        assert!((clock.position(10.0) - 3.0).abs() < f64::EPSILON);
        assert!(!clock.is_playing());
    }

    #[test]
    fn clock_seek_clamps_to_duration() {
        let mut clock = PlaybackClock::new();
        clock.seek(99.0, 10.0);
        assert!((clock.position(10.0) - 10.0).abs() < f64::EPSILON);
        clock.seek(-5.0, 10.0);
        assert!(clock.position(10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn clock_advances_only_while_playing() {
        let mut clock = PlaybackClock::new();
        clock.play();
        std::thread::sleep(std::time::Duration::from_millis(20));
        clock.pause(10.0);
        let pos = clock.position(10.0);
        assert!(pos > 0.0, "position did not advance during playback");
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert!((clock.position(10.0) - pos).abs() < f64::EPSILON);
    }
}
