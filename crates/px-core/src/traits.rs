use crate::error::CoreError;
use crate::frame::{FrameBuffer, FrameGrid};

/// Playback state of a time-varying visual source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Source time is advancing; live sampling may run.
    Playing,
    /// Source time is frozen.
    Paused,
    /// Source time reached the duration.
    Ended,
}

/// A time-varying visual source (typically a video file).
///
/// Implementations expose playback time, a seek operation, and a way to
/// capture the current frame into a caller-sized buffer: the buffer's
/// dimensions are the requested capture resolution, so resolution adaptation
/// happens inside the source, never in the rasterizer.
///
/// Live sampling and bounded export must not run concurrently against the
/// same source — export seeks would corrupt the live playback position.
///
/// # Example
/// ```
/// use px_core::traits::{PlaybackStatus, VideoSource};
/// use px_core::frame::FrameBuffer;
/// use px_core::error::CoreError;
///
/// struct BlackSource;
/// impl VideoSource for BlackSource {
///     fn native_size(&self) -> (u32, u32) { (640, 480) }
///     fn duration_secs(&self) -> f64 { 1.0 }
///     fn position_secs(&self) -> f64 { 0.0 }
///     fn status(&self) -> PlaybackStatus { PlaybackStatus::Paused }
///     fn seek(&mut self, _secs: f64) -> Result<(), CoreError> { Ok(()) }
///     fn capture_into(&mut self, _fb: &mut FrameBuffer) -> Result<(), CoreError> { Ok(()) }
/// }
/// ```
pub trait VideoSource {
    /// Native pixel dimensions of the source.
    fn native_size(&self) -> (u32, u32);

    /// Total duration in seconds.
    fn duration_secs(&self) -> f64;

    /// Current playback position in seconds.
    fn position_secs(&self) -> f64;

    /// Current playback state.
    fn status(&self) -> PlaybackStatus;

    /// Set the playback position.
    ///
    /// # Errors
    /// Returns `CoreError::SourceUnavailable` if the source cannot seek.
    fn seek(&mut self, secs: f64) -> Result<(), CoreError>;

    /// Decode the frame at the current position into `fb`, scaled to the
    /// buffer's own dimensions.
    ///
    /// # Errors
    /// Returns `CoreError::SourceUnavailable` if no frame can be supplied.
    fn capture_into(&mut self, fb: &mut FrameBuffer) -> Result<(), CoreError>;
}

/// Accepts a finished [`FrameGrid`] for immediate presentation.
///
/// Fire-and-forget: no acknowledgment, no error path. A missed frame is
/// simply never revisited.
pub trait DisplaySink {
    /// Present one grid.
    fn publish(&mut self, grid: &FrameGrid);
}

/// Collects grids instead of displaying them. Handy in tests.
impl DisplaySink for Vec<FrameGrid> {
    fn publish(&mut self, grid: &FrameGrid) {
        self.push(grid.clone());
    }
}
