use thiserror::Error;

/// Errors originating from the core pipeline.
///
/// Configuration errors (`EmptyAlphabet`, `InvalidResolution`) surface
/// immediately to the caller and are never retried. `SourceUnavailable` is a
/// live-source condition: the sampler absorbs it (skip the tick, or seal the
/// export with a partial result) instead of failing the whole run.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Alphabet string contains no characters.
    #[error("alphabet must contain at least one character")]
    EmptyAlphabet,

    /// Requested or derived grid dimensions are unusable.
    #[error("invalid resolution: {width}×{height} (from source {source_width}×{source_height})")]
    InvalidResolution {
        /// Requested grid width.
        width: u32,
        /// Derived grid height.
        height: u32,
        /// Native source width.
        source_width: u32,
        /// Native source height.
        source_height: u32,
    },

    /// The visual source cannot supply a frame right now.
    #[error("source unavailable: {reason}")]
    SourceUnavailable {
        /// Human-readable cause (decode failure, EOF, process gone).
        reason: String,
    },
}

impl CoreError {
    /// Shorthand for a `SourceUnavailable` with a formatted reason.
    #[must_use]
    pub fn source_unavailable(reason: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            reason: reason.into(),
        }
    }
}
