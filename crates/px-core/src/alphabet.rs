use crate::error::CoreError;

/// 10 characters — the classic set, densest→lightest.
pub const ALPHABET_DEFAULT: &str = "@%#*+=-:. ";

/// 37 characters — extended set, finer tonal steps.
pub const ALPHABET_EXTENDED: &str = "$@B%8&WM#*(){}[]|/\\?<>+=-_:;,.!~^`'\" ";

/// Dotted style — dots for dark areas, blanks for light.
pub const ALPHABET_DOTTED: &str = "........        ";

/// Ordered character set used to represent luminance levels.
///
/// Index 0 renders the darkest samples, index N-1 the lightest (or the
/// reverse after [`Alphabet::reversed`]). Validated non-empty at parse time,
/// so downstream mapping is total. Duplicates are permitted.
///
/// # Example
/// ```
/// use px_core::alphabet::Alphabet;
/// let alphabet = Alphabet::parse(" .:#@").unwrap();
/// assert_eq!(alphabet.glyph(0.0), ' ');
/// assert_eq!(alphabet.glyph(255.0), '@');
/// ```
#[derive(Clone, Debug)]
pub struct Alphabet {
    chars: Vec<char>,
}

impl Alphabet {
    /// Parse an alphabet from its character string.
    ///
    /// # Errors
    /// Returns `CoreError::EmptyAlphabet` if `s` contains no characters.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let chars: Vec<char> = s.chars().collect();
        if chars.is_empty() {
            return Err(CoreError::EmptyAlphabet);
        }
        Ok(Self { chars })
    }

    /// Number of characters (≥ 1).
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Characters in order.
    #[must_use]
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Map a luminance sample in [0, 255] to one glyph.
    ///
    /// Partitions [0, 256) into `len()` equal-width buckets:
    /// `index = floor(sample / (256 / len))`. The sample is kept as a float
    /// (no rounding before bucketing) so fractional channel averages land in
    /// the right bucket. An index pushed out of range by float rounding falls
    /// back to a space.
    ///
    /// # Example
    /// ```
    /// use px_core::alphabet::{Alphabet, ALPHABET_DEFAULT};
    /// let alphabet = Alphabet::parse(ALPHABET_DEFAULT).unwrap();
    /// assert_eq!(alphabet.glyph(0.0), '@');
    /// assert_eq!(alphabet.glyph(255.0), ' ');
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn glyph(&self, sample: f32) -> char {
        let bucket = (sample / (256.0 / self.chars.len() as f32)) as usize;
        self.chars.get(bucket).copied().unwrap_or(' ')
    }

    /// Same alphabet with the direction flipped (dark↔light).
    ///
    /// The direction is a per-session choice: pick it once when building the
    /// rendering configuration, not mid-sequence.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut chars = self.chars.clone();
        chars.reverse();
        Self { chars }
    }
}
