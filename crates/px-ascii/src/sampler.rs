//! Temporal sampling: turning a time-varying source into glyph grids.
//!
//! Two policies share the capture-rasterize step:
//! - [`LiveSampler`] keeps one on-screen grid fresh while the source plays,
//!   latest-frame-wins, never more often than the configured interval.
//! - [`ExportJob`] walks the source timeline at a fixed rate and collects a
//!   bounded [`AnimatedSequence`] for file export.
//!
//! Both run single-threaded and cooperatively: the only suspension points
//! are the explicit sleeps between iterations. The two must never drive the
//! same source at the same time (export seeks would corrupt the live
//! playback position); the app dispatch guarantees that.

use std::time::Duration;

use px_core::alphabet::Alphabet;
use px_core::config::RenderConfig;
use px_core::error::CoreError;
use px_core::frame::{AnimatedSequence, FrameBuffer};
use px_core::resolution::grid_size;
use px_core::traits::{DisplaySink, PlaybackStatus, VideoSource};

use crate::rasterize::rasterize;

/// Pacing of the live stepping loop, roughly one display refresh.
const LIVE_TICK: Duration = Duration::from_millis(15);

/// Build the session alphabet from the config (direction included).
fn session_alphabet(config: &RenderConfig) -> Result<Alphabet, CoreError> {
    let alphabet = Alphabet::parse(&config.alphabet)?;
    Ok(if config.invert {
        alphabet.reversed()
    } else {
        alphabet
    })
}

/// Outcome of one live scheduling tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveTick {
    /// A fresh grid was captured and handed to the sink.
    Published,
    /// Nothing to do: interval not yet elapsed, or the frame was unavailable.
    Skipped,
    /// The source left the playing state; the loop should return.
    Stopped,
}

/// Continuously refreshes a display sink while a source is playing.
///
/// Maintains a monotonic last-sampled timestamp; a tick resamples only when
/// the source has advanced by at least the configured interval since then.
/// Missed ticks are never revisited.
pub struct LiveSampler {
    alphabet: Alphabet,
    scratch: FrameBuffer,
    min_interval: f64,
    last_sampled: f64,
}

impl LiveSampler {
    /// Size the sampler for a source's native dimensions.
    ///
    /// # Errors
    /// Returns `EmptyAlphabet` or `InvalidResolution` for bad configuration —
    /// these surface immediately and are never retried.
    pub fn new(config: &RenderConfig, native: (u32, u32)) -> Result<Self, CoreError> {
        let alphabet = session_alphabet(config)?;
        let (w, h) = grid_size(config.width, native)?;
        Ok(Self {
            alphabet,
            scratch: FrameBuffer::new(w, h),
            min_interval: config.live_interval_secs,
            last_sampled: 0.0,
        })
    }

    /// One scheduling tick: best effort, latest frame wins.
    ///
    /// A frame the source cannot supply right now is simply skipped; only
    /// the playing state decides when the loop ends.
    pub fn tick<S: VideoSource + ?Sized, K: DisplaySink + ?Sized>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) -> LiveTick {
        if source.status() != PlaybackStatus::Playing {
            return LiveTick::Stopped;
        }
        let now = source.position_secs();
        if now - self.last_sampled < self.min_interval {
            return LiveTick::Skipped;
        }
        match source.capture_into(&mut self.scratch) {
            Ok(()) => {
                sink.publish(&rasterize(&self.scratch, &self.alphabet));
                self.last_sampled = now;
                LiveTick::Published
            }
            Err(e) => {
                log::debug!("live tick skipped: {e}");
                LiveTick::Skipped
            }
        }
    }

    /// Step until the source pauses or ends. Re-enter whenever the source
    /// resumes playing; `last_sampled` carries over, so resumption is
    /// seamless.
    pub fn run<S: VideoSource + ?Sized, K: DisplaySink + ?Sized>(
        &mut self,
        source: &mut S,
        sink: &mut K,
    ) {
        loop {
            match self.tick(source, sink) {
                LiveTick::Stopped => return,
                LiveTick::Published | LiveTick::Skipped => std::thread::sleep(LIVE_TICK),
            }
        }
    }
}

/// Export state machine. No transition leaves `Sealed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportState {
    /// Created, no step taken yet.
    Idle,
    /// Capture loop in progress.
    Capturing,
    /// Terminated; the sequence is final.
    Sealed,
}

/// Outcome of one export step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportStep {
    /// A frame was appended; the count so far.
    Captured(usize),
    /// The job terminated (a bound was hit, or the source went away).
    Sealed,
}

/// Bounded export: samples the source timeline at a fixed rate F into an
/// [`AnimatedSequence`] of at most `min(floor(duration · F), cap)` frames.
///
/// Termination is driven by two independent bounds — source duration and the
/// frame cap — whichever is hit first. A source that becomes unavailable
/// mid-sequence is a third terminator feeding the same path: the job seals
/// with the frames already captured rather than failing.
///
/// # Example
/// ```
/// use px_ascii::sampler::ExportJob;
/// use px_core::RenderConfig;
/// let job = ExportJob::new(&RenderConfig::default(), (640, 480), 10.0).unwrap();
/// assert_eq!(job.total_frames(), 50); // min(floor(10 · 5), 60)
/// ```
pub struct ExportJob {
    alphabet: Alphabet,
    scratch: FrameBuffer,
    fps: f64,
    duration: f64,
    total_frames: usize,
    next_time: f64,
    state: ExportState,
    sequence: AnimatedSequence,
}

impl ExportJob {
    /// Plan an export for a source with the given native size and duration.
    ///
    /// # Errors
    /// Returns `EmptyAlphabet` or `InvalidResolution` for bad configuration.
    pub fn new(
        config: &RenderConfig,
        native: (u32, u32),
        duration_secs: f64,
    ) -> Result<Self, CoreError> {
        let alphabet = session_alphabet(config)?;
        let (w, h) = grid_size(config.width, native)?;
        let fps = config.export_fps;
        let total_frames = ((duration_secs.max(0.0) * fps).floor() as usize).min(config.frame_cap);
        Ok(Self {
            alphabet,
            scratch: FrameBuffer::new(w, h),
            fps,
            duration: duration_secs,
            total_frames,
            next_time: 0.0,
            state: ExportState::Idle,
            sequence: AnimatedSequence::new(1.0 / fps),
        })
    }

    /// Frame count this job will produce if the source stays available.
    #[must_use]
    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    /// Current state-machine position.
    #[must_use]
    pub fn state(&self) -> ExportState {
        self.state
    }

    fn seal(&mut self) -> ExportStep {
        self.sequence.seal();
        self.state = ExportState::Sealed;
        ExportStep::Sealed
    }

    /// One capture step: seek, decode, rasterize, append.
    ///
    /// Never sleeps — pacing belongs to [`ExportJob::run`], so tests can
    /// drive the state machine directly.
    pub fn step<S: VideoSource + ?Sized>(&mut self, source: &mut S) -> ExportStep {
        match self.state {
            ExportState::Sealed => return ExportStep::Sealed,
            ExportState::Idle => self.state = ExportState::Capturing,
            ExportState::Capturing => {}
        }

        if self.sequence.len() >= self.total_frames || source.position_secs() >= self.duration {
            return self.seal();
        }

        if let Err(e) = source.seek(self.next_time) {
            log::warn!("export: seek failed, sealing with partial result: {e}");
            return self.seal();
        }
        match source.capture_into(&mut self.scratch) {
            Ok(()) => {
                self.sequence.push(rasterize(&self.scratch, &self.alphabet));
                self.next_time += 1.0 / self.fps;
                ExportStep::Captured(self.sequence.len())
            }
            Err(e) => {
                log::warn!("export: source unavailable, sealing with partial result: {e}");
                self.seal()
            }
        }
    }

    /// Run to completion, pausing `settle` of real time between captures so
    /// the source can finish seeking/decoding before the next one.
    pub fn run<S: VideoSource + ?Sized>(
        mut self,
        source: &mut S,
        settle: Duration,
    ) -> AnimatedSequence {
        loop {
            match self.step(source) {
                ExportStep::Captured(_) => std::thread::sleep(settle),
                ExportStep::Sealed => return self.into_sequence(),
            }
        }
    }

    /// Extract the sequence, sealing it if the job was abandoned mid-run.
    #[must_use]
    pub fn into_sequence(mut self) -> AnimatedSequence {
        self.sequence.seal();
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use px_core::frame::FrameGrid;

    /// In-memory source with scripted behavior.
    struct ScriptedSource {
        native: (u32, u32),
        duration: f64,
        position: f64,
        status: PlaybackStatus,
        /// Gray level written into every captured pixel.
        level: u8,
        /// Captures start failing once this many succeeded.
        fail_after: Option<usize>,
        captures: usize,
    }

    impl ScriptedSource {
        fn new(duration: f64) -> Self {
            Self {
                native: (64, 64),
                duration,
                position: 0.0,
                status: PlaybackStatus::Playing,
                level: 128,
                fail_after: None,
                captures: 0,
            }
        }
    }

    impl VideoSource for ScriptedSource {
        fn native_size(&self) -> (u32, u32) {
            self.native
        }
        fn duration_secs(&self) -> f64 {
            self.duration
        }
        fn position_secs(&self) -> f64 {
            self.position
        }
        fn status(&self) -> PlaybackStatus {
            self.status
        }
        fn seek(&mut self, secs: f64) -> Result<(), CoreError> {
            self.position = secs;
            Ok(())
        }
        fn capture_into(&mut self, fb: &mut FrameBuffer) -> Result<(), CoreError> {
            if self.fail_after.is_some_and(|limit| self.captures >= limit) {
                return Err(CoreError::source_unavailable("scripted failure"));
            }
            self.captures += 1;
            for px in fb.data.chunks_exact_mut(4) {
                px.copy_from_slice(&[self.level, self.level, self.level, 255]);
            }
            Ok(())
        }
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 8,
            ..RenderConfig::default()
        }
    }

    fn run_export(duration: f64) -> AnimatedSequence {
        let mut source = ScriptedSource::new(duration);
        let job = ExportJob::new(&small_config(), source.native, duration).unwrap();
        job.run(&mut source, Duration::ZERO)
    }

    #[test]
    fn export_count_duration_bound_wins() {
        // D=10, F=5, C=60 → 50 frames.
        let seq = run_export(10.0);
        assert_eq!(seq.len(), 50);
        assert!(seq.is_sealed());
    }

    #[test]
    fn export_count_cap_wins() {
        // D=20, F=5, C=60 → 60 frames.
        let seq = run_export(20.0);
        assert_eq!(seq.len(), 60);
    }

    #[test]
    fn export_zero_duration_yields_empty_sealed_sequence() {
        let seq = run_export(0.0);
        assert_eq!(seq.len(), 0);
        assert!(seq.is_sealed());
    }

    #[test]
    fn export_delay_is_one_over_fps() {
        let seq = run_export(2.0);
        assert!((seq.frame_delay_secs() - 0.2).abs() < 1e-9);
    }

    #[test]
    fn export_seals_partial_on_source_loss() {
        let mut source = ScriptedSource::new(10.0);
        source.fail_after = Some(7);
        let job = ExportJob::new(&small_config(), source.native, 10.0).unwrap();
        let seq = job.run(&mut source, Duration::ZERO);
        assert_eq!(seq.len(), 7);
        assert!(seq.is_sealed());
    }

    #[test]
    fn export_state_machine_never_leaves_sealed() {
        let mut source = ScriptedSource::new(0.0);
        let mut job = ExportJob::new(&small_config(), source.native, 0.0).unwrap();
        assert_eq!(job.state(), ExportState::Idle);
        assert_eq!(job.step(&mut source), ExportStep::Sealed);
        assert_eq!(job.state(), ExportState::Sealed);
        assert_eq!(job.step(&mut source), ExportStep::Sealed);
    }

    #[test]
    fn export_frames_match_grid_size_and_content() {
        let seq = run_export(1.0);
        // width 8 on a square source → 8×4 grid; level 128 with the default
        // 10-char set buckets to index 5 = '='.
        assert_eq!(seq.len(), 5);
        for frame in seq.frames() {
            assert_eq!(frame.width(), 8);
            assert_eq!(frame.height(), 4);
            assert_eq!(frame.to_text(), "========\n========\n========\n========");
        }
    }

    #[test]
    fn export_rejects_bad_config() {
        let mut config = small_config();
        config.alphabet = String::new();
        assert!(matches!(
            ExportJob::new(&config, (64, 64), 1.0),
            Err(CoreError::EmptyAlphabet)
        ));

        assert!(matches!(
            ExportJob::new(&small_config(), (0, 64), 1.0),
            Err(CoreError::InvalidResolution { .. })
        ));
    }

    #[test]
    fn live_interval_gates_publishing() {
        let mut source = ScriptedSource::new(10.0);
        let mut sink: Vec<FrameGrid> = Vec::new();
        let mut sampler = LiveSampler::new(&small_config(), source.native).unwrap();

        // Two ticks 0.1 apart: only the first that clears the 0.2 s gate
        // publishes.
        source.position = 0.2;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Published);
        source.position = 0.3;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Skipped);
        assert_eq!(sink.len(), 1);

        source.position = 0.4;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Published);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn live_does_not_publish_before_first_interval() {
        let mut source = ScriptedSource::new(10.0);
        let mut sink: Vec<FrameGrid> = Vec::new();
        let mut sampler = LiveSampler::new(&small_config(), source.native).unwrap();
        source.position = 0.1;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Skipped);
        assert!(sink.is_empty());
    }

    #[test]
    fn live_stops_when_source_not_playing() {
        let mut source = ScriptedSource::new(10.0);
        let mut sink: Vec<FrameGrid> = Vec::new();
        let mut sampler = LiveSampler::new(&small_config(), source.native).unwrap();

        source.status = PlaybackStatus::Paused;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Stopped);
        source.status = PlaybackStatus::Ended;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Stopped);
        assert!(sink.is_empty());
    }

    #[test]
    fn live_skips_unavailable_frames() {
        let mut source = ScriptedSource::new(10.0);
        source.fail_after = Some(0);
        let mut sink: Vec<FrameGrid> = Vec::new();
        let mut sampler = LiveSampler::new(&small_config(), source.native).unwrap();

        source.position = 0.5;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Skipped);
        assert!(sink.is_empty());

        // Source recovers; the next due tick publishes.
        source.fail_after = None;
        source.position = 0.7;
        assert_eq!(sampler.tick(&mut source, &mut sink), LiveTick::Published);
    }

    #[test]
    fn inverted_alphabet_flips_rendering() {
        let mut source = ScriptedSource::new(1.0);
        source.level = 0; // black frame
        let mut config = small_config();
        config.invert = true;
        let job = ExportJob::new(&config, source.native, 1.0).unwrap();
        let seq = job.run(&mut source, Duration::ZERO);
        // Inverted default alphabet renders black as its lightest glyph.
        assert!(seq.frames()[0].to_text().starts_with(' '));
    }
}
