use std::path::PathBuf;

use clap::Parser;
use px_core::alphabet::{ALPHABET_DEFAULT, ALPHABET_DOTTED, ALPHABET_EXTENDED};

/// pixscii — image and video to ASCII-art converter.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Visual source: path to a still image (PNG, JPEG, BMP, GIF).
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Visual source: path to a video file. Requires ffmpeg/ffprobe in PATH.
    #[arg(long)]
    pub video: Option<PathBuf>,

    /// TOML config file. Default: config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Target grid width in glyphs (overrides the config).
    #[arg(short, long)]
    pub width: Option<u32>,

    /// Alphabet: "default", "extended", "dotted", or a literal character
    /// string ordered darkest→lightest.
    #[arg(long)]
    pub alphabet: Option<String>,

    /// Flip the alphabet direction (for light terminal backgrounds).
    #[arg(long, default_value_t = false)]
    pub invert: bool,

    /// Export sampling rate in frames per second of source time.
    #[arg(long)]
    pub fps: Option<f64>,

    /// Hard cap on exported frame count.
    #[arg(long)]
    pub frame_cap: Option<usize>,

    /// Output file; repeatable. The extension picks the format:
    /// txt, html, png, gif, mp4, webm. With no --out, the grid goes to
    /// stdout (image) or a live terminal preview (video).
    #[arg(long = "out")]
    pub outputs: Vec<PathBuf>,

    /// TTF/OTF font for the image-based exports (png, gif, mp4, webm).
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// Glyph size in pixels for the image-based exports.
    #[arg(long, default_value_t = 16.0)]
    pub font_size: f32,

    /// Log level: error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one visual source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or both sources are specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        match (self.image.is_some(), self.video.is_some()) {
            (false, false) => anyhow::bail!("no visual source; use --image or --video"),
            (true, true) => anyhow::bail!("one visual source at a time: --image OR --video"),
            _ => Ok(()),
        }
    }

    /// Resolve the alphabet argument: preset name or literal characters.
    #[must_use]
    pub fn resolve_alphabet(name: &str) -> &str {
        match name {
            "default" => ALPHABET_DEFAULT,
            "extended" => ALPHABET_EXTENDED,
            "dotted" => ALPHABET_DOTTED,
            literal => literal,
        }
    }
}
