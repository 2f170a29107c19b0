use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Rendering and sampling configuration.
///
/// Serializable to TOML. Every field has a sane default; a config file may
/// override any subset. Passed explicitly into rasterization and sampling
/// calls — there is no shared mutable session state.
///
/// # Example
/// ```
/// use px_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert_eq!(config.width, 100);
/// assert_eq!(config.frame_cap, 60);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RenderConfig {
    // === Rendering ===
    /// Target grid width in glyphs. Height is derived from the source aspect.
    pub width: u32,
    /// Alphabet characters, ordered darkest→lightest.
    pub alphabet: String,
    /// Flip the alphabet direction (for light terminal backgrounds).
    pub invert: bool,

    // === Temporal sampling ===
    /// Export sampling rate F, frames per second of source time.
    pub export_fps: f64,
    /// Hard cap C on exported frame count.
    pub frame_cap: usize,
    /// Minimum source-time interval between live resamples, seconds.
    pub live_interval_secs: f64,
    /// Real-time pause between export captures, milliseconds. Gives the
    /// source room to finish seeking/decoding before the next capture.
    pub seek_settle_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 100,
            alphabet: crate::alphabet::ALPHABET_DEFAULT.to_string(),
            invert: false,
            export_fps: 5.0,
            frame_cap: 60,
            live_interval_secs: 0.2,
            seek_settle_ms: 60,
        }
    }
}

impl RenderConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.width = self.width.clamp(1, 1000);
        self.export_fps = self.export_fps.clamp(0.1, 60.0);
        self.frame_cap = self.frame_cap.clamp(1, 4096);
        self.live_interval_secs = self.live_interval_secs.clamp(0.01, 10.0);
        self.seek_settle_ms = self.seek_settle_ms.min(1000);
    }
}

/// Intermediate TOML structure: all fields optional for partial override.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    sampling: Option<SamplingSection>,
}

#[derive(Deserialize)]
struct RenderSection {
    width: Option<u32>,
    alphabet: Option<String>,
    invert: Option<bool>,
}

#[derive(Deserialize)]
struct SamplingSection {
    export_fps: Option<f64>,
    frame_cap: Option<usize>,
    live_interval_secs: Option<f64>,
    seek_settle_ms: Option<u64>,
}

/// Load a TOML file and merge it over the defaults.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use px_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<RenderConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("TOML parse error in {}", path.display()))?;

    let mut config = RenderConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.width {
            config.width = v;
        }
        if let Some(v) = r.alphabet {
            config.alphabet = v;
        }
        if let Some(v) = r.invert {
            config.invert = v;
        }
    }

    if let Some(s) = file.sampling {
        if let Some(v) = s.export_fps {
            config.export_fps = v;
        }
        if let Some(v) = s.frame_cap {
            config.frame_cap = v;
        }
        if let Some(v) = s.live_interval_secs {
            config.live_interval_secs = v;
        }
        if let Some(v) = s.seek_settle_ms {
            config.seek_settle_ms = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_reference_policy() {
        let config = RenderConfig::default();
        assert_eq!(config.alphabet, "@%#*+=-:. ");
        assert!((config.export_fps - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.frame_cap, 60);
        assert!((config.live_interval_secs - 0.2).abs() < f64::EPSILON);
        assert_eq!(config.seek_settle_ms, 60);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[render]\nwidth = 42\n\n[sampling]\nframe_cap = 10").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.width, 42);
        assert_eq!(config.frame_cap, 10);
        assert_eq!(config.alphabet, crate::alphabet::ALPHABET_DEFAULT);
        assert!((config.live_interval_secs - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[render]\nwidth = 0\n\n[sampling]\nexport_fps = 500.0\nframe_cap = 0"
        )
        .unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.width, 1);
        assert!((config.export_fps - 60.0).abs() < f64::EPSILON);
        assert_eq!(config.frame_cap, 1);
    }

    #[test]
    fn missing_sections_are_fine() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# empty config").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.width, 100);
    }
}
