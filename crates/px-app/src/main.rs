use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use px_ascii::rasterize::rasterize;
use px_ascii::sampler::ExportJob;
use px_core::alphabet::Alphabet;
use px_core::config::RenderConfig;
use px_core::frame::{AnimatedSequence, FrameBuffer, FrameGrid};
use px_core::resolution::grid_size;
use px_export::rasterizer::TextRasterizer;
use px_source::video::VideoFile;

pub mod cli;
pub mod preview;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    cli.validate_source()?;

    let config = resolve_config(&cli)?;

    if let Some(ref path) = cli.image {
        run_image(path, &cli, &config)
    } else if let Some(ref path) = cli.video {
        run_video(path, &cli, &config)
    } else {
        unreachable!("validate_source guarantees a source")
    }
}

/// Load the config file and fold the CLI overrides on top.
fn resolve_config(cli: &cli::Cli) -> Result<RenderConfig> {
    let mut config = if cli.config.exists() {
        px_core::config::load_config(&cli.config)?
    } else {
        log::warn!(
            "config not found: {}, using defaults",
            cli.config.display()
        );
        RenderConfig::default()
    };

    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(ref alphabet) = cli.alphabet {
        config.alphabet = cli::Cli::resolve_alphabet(alphabet).to_string();
    }
    if cli.invert {
        config.invert = true;
    }
    if let Some(fps) = cli.fps {
        config.export_fps = fps;
    }
    if let Some(cap) = cli.frame_cap {
        config.frame_cap = cap;
    }
    config.clamp_all();
    Ok(config)
}

fn session_alphabet(config: &RenderConfig) -> Result<Alphabet> {
    let alphabet = Alphabet::parse(&config.alphabet)?;
    Ok(if config.invert {
        alphabet.reversed()
    } else {
        alphabet
    })
}

/// Still image: load, downscale to the glyph grid, rasterize once.
fn run_image(path: &Path, cli: &cli::Cli, config: &RenderConfig) -> Result<()> {
    let native = px_source::image::load_image(path)?;
    let (w, h) = grid_size(config.width, (native.width, native.height))?;
    let scaled = if h == 0 {
        FrameBuffer::new(w, 0)
    } else {
        px_source::resize::resize_frame(&native, w, h)?
    };
    let alphabet = session_alphabet(config)?;
    let grid = rasterize(&scaled, &alphabet);

    if cli.outputs.is_empty() {
        println!("{}", grid.to_text());
        return Ok(());
    }
    write_outputs(cli, &grid, None)
}

/// Video: live terminal preview without --out, bounded export with it.
fn run_video(path: &Path, cli: &cli::Cli, config: &RenderConfig) -> Result<()> {
    let mut video = VideoFile::open(path)?;

    if cli.outputs.is_empty() {
        return preview::run_live_preview(&mut video, config);
    }

    let info = video.info();
    let job = ExportJob::new(config, (info.width, info.height), info.duration_secs)?;
    log::info!(
        "exporting {} frame(s) @ {}fps from {}",
        job.total_frames(),
        config.export_fps,
        path.display()
    );
    let settle = Duration::from_millis(config.seek_settle_ms);
    let sequence = job.run(&mut video, settle);

    let still = sequence
        .frames()
        .first()
        .context("no frames captured from the video")?
        .clone();
    write_outputs(cli, &still, Some(&sequence))
}

/// Dispatch each --out by extension. `still` backs the single-frame formats;
/// `sequence` (when sampling a video) backs the animated ones.
fn write_outputs(
    cli: &cli::Cli,
    still: &FrameGrid,
    sequence: Option<&AnimatedSequence>,
) -> Result<()> {
    let mut rasterizer: Option<TextRasterizer> = None;

    for out in &cli.outputs {
        let ext = out
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "txt" => px_export::save_text(still, out)?,
            "html" => px_export::save_html(still, out)?,
            "png" => {
                let rast = ensure_rasterizer(&mut rasterizer, cli)?;
                px_export::save_png(still, rast, out)?;
            }
            "gif" => {
                let rast = ensure_rasterizer(&mut rasterizer, cli)?;
                match sequence {
                    Some(seq) => px_export::save_gif(seq, rast, out)?,
                    // A still image exports as a single-frame GIF.
                    None => px_export::save_gif(&still_sequence(still), rast, out)?,
                }
            }
            "mp4" | "webm" => {
                let seq = sequence.context("video container export needs --video")?;
                let rast = ensure_rasterizer(&mut rasterizer, cli)?;
                px_export::export_video(seq, rast, out)?;
            }
            other => anyhow::bail!(
                "unsupported output format {other:?} for {} (use txt, html, png, gif, mp4, webm)",
                out.display()
            ),
        }
    }
    Ok(())
}

fn still_sequence(grid: &FrameGrid) -> AnimatedSequence {
    let mut seq = AnimatedSequence::new(1.0);
    seq.push(grid.clone());
    seq.seal();
    seq
}

/// Build the glyph atlas on first use; png/gif/video all share it.
fn ensure_rasterizer<'a>(
    slot: &'a mut Option<TextRasterizer>,
    cli: &cli::Cli,
) -> Result<&'a TextRasterizer> {
    if slot.is_none() {
        let font_path: &PathBuf = cli
            .font
            .as_ref()
            .context("image-based exports (png, gif, mp4, webm) need --font <file.ttf>")?;
        let font_data = std::fs::read(font_path)
            .with_context(|| format!("cannot read font {}", font_path.display()))?;
        *slot = Some(TextRasterizer::new(&font_data, cli.font_size)?);
    }
    slot.as_ref()
        .context("rasterizer initialization failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_overrides_beat_config_defaults() {
        let cli = cli::Cli::parse_from([
            "pixscii",
            "--image",
            "a.png",
            "--width",
            "42",
            "--alphabet",
            "extended",
            "--invert",
            "--fps",
            "10",
            "--config",
            "definitely/not/here.toml",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.width, 42);
        assert_eq!(config.alphabet, px_core::alphabet::ALPHABET_EXTENDED);
        assert!(config.invert);
        assert!((config.export_fps - 10.0).abs() < f64::EPSILON);
        // Untouched fields keep their defaults.
        assert_eq!(config.frame_cap, 60);
    }

    #[test]
    fn still_sequence_is_single_frame_and_sealed() {
        let seq = still_sequence(&FrameGrid::from_rows(vec!["@".into()]));
        assert_eq!(seq.len(), 1);
        assert!(seq.is_sealed());
        assert!((seq.frame_delay_secs() - 1.0).abs() < f64::EPSILON);
    }
}
