//! Analyze command implementation
//!
//! Decodes a WAV file, runs the reassigned bandwidth-enhanced analysis and
//! writes the resulting Partials as JSON.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, warn};

use partials_analysis::{
    Analyzer, AnalyzerConfig, DEFAULT_F0_AMP_THRESHOLD_DB, DEFAULT_F0_FREQ_THRESHOLD,
};
use partials_model::collection::{breakpoint_count, write_json};
use partials_model::PartialList;

use super::{json_output, parse_range};
use crate::wav::read_mono;

/// Frequency resolution used when neither `--resolution` nor a config file
/// gives one (Hz).
pub const DEFAULT_RESOLUTION: f64 = 50.0;

/// Options of the analyze command.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub resolution: Option<f64>,
    pub window_width: Option<f64>,
    /// JSON file holding a complete [`AnalyzerConfig`].
    pub config: Option<PathBuf>,
    /// `FMIN:FMAX` range for a fundamental-guided second pass.
    pub reference_f0: Option<String>,
    pub no_phase_correct: bool,
    pub bw_region_width: Option<f64>,
    pub json: bool,
}

/// Machine-readable result of the analyze command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalyzeSummary {
    pub input: String,
    pub output: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration: f64,
    pub partials: usize,
    pub breakpoints: usize,
    pub config: AnalyzerConfig,
    pub reference_guided: bool,
}

/// Run the analyze command
pub fn run(options: &AnalyzeOptions) -> Result<ExitCode> {
    if options.json {
        return json_output::report("analyze", execute(options));
    }

    println!("{} {}", "Analyzing:".cyan().bold(), options.input.display());
    let summary = execute(options)?;
    println!(
        "{} {} Hz, {} channel(s), {:.3} s",
        "Input:".dimmed(),
        summary.sample_rate,
        summary.channels,
        summary.duration
    );
    println!(
        "{} resolution {} Hz, window {} Hz",
        "Config:".dimmed(),
        summary.config.freq_resolution,
        summary.config.window_width
    );
    println!(
        "{} {} partials, {} breakpoints",
        "Result:".dimmed(),
        summary.partials,
        summary.breakpoints
    );
    println!("{} {}", "Output written to:".green().bold(), summary.output);
    Ok(ExitCode::SUCCESS)
}

/// Resolves the analyzer configuration from an optional file and flags.
///
/// Without a file, defaults are derived from the resolution (and window
/// width, if given). Flags always override values from the file.
pub fn build_config(options: &AnalyzeOptions) -> Result<AnalyzerConfig> {
    let mut config = match &options.config {
        Some(path) => load_config(path)?,
        None => {
            let resolution = options.resolution.unwrap_or(DEFAULT_RESOLUTION);
            match options.window_width {
                Some(width) => AnalyzerConfig::with_window_width(resolution, width)?,
                None => AnalyzerConfig::new(resolution)?,
            }
        }
    };

    if options.config.is_some() {
        if let Some(resolution) = options.resolution {
            config.freq_resolution = resolution;
        }
        if let Some(width) = options.window_width {
            config.window_width = width;
        }
    }
    if let Some(width) = options.bw_region_width {
        config.bw_region_width = width;
    }
    if options.no_phase_correct {
        config.phase_correct = false;
    }
    config.validate().context("Invalid analyzer configuration")?;
    Ok(config)
}

fn load_config(path: &Path) -> Result<AnalyzerConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn execute(options: &AnalyzeOptions) -> Result<AnalyzeSummary> {
    let config = build_config(options)?;
    let audio = read_mono(&options.input)?;
    let sample_rate = audio.sample_rate as f64;

    let (partials, reference_guided) = match &options.reference_f0 {
        Some(range) => {
            let (fmin, fmax) = parse_range(range)?;
            analyze_guided(&config, &audio.samples, sample_rate, fmin, fmax)?
        }
        None => (analyze_plain(&config, &audio.samples, sample_rate)?, false),
    };

    write_json(&options.output, &partials)
        .with_context(|| format!("Failed to write Partials: {}", options.output.display()))?;

    Ok(AnalyzeSummary {
        input: options.input.display().to_string(),
        output: options.output.display().to_string(),
        sample_rate: audio.sample_rate,
        channels: audio.channels,
        duration: audio.duration(),
        partials: partials.len(),
        breakpoints: breakpoint_count(&partials),
        config,
        reference_guided,
    })
}

fn analyze_plain(config: &AnalyzerConfig, samples: &[f64], sr: f64) -> Result<PartialList> {
    let mut analyzer = Analyzer::from_config(config.clone())?;
    analyzer.analyze(samples, sr).context("Analysis failed")?;
    Ok(analyzer.take_partials())
}

/// Estimates the fundamental in a first pass, then tracks Partials along
/// its contour. Falls back to plain tracking when no fundamental is found.
fn analyze_guided(
    config: &AnalyzerConfig,
    samples: &[f64],
    sr: f64,
    fmin: f64,
    fmax: f64,
) -> Result<(PartialList, bool)> {
    let mut first_pass = Analyzer::from_config(config.clone())?;
    first_pass.build_fundamental_env(
        fmin,
        fmax,
        DEFAULT_F0_AMP_THRESHOLD_DB,
        DEFAULT_F0_FREQ_THRESHOLD,
    )?;
    first_pass.analyze(samples, sr).context("Fundamental analysis failed")?;

    let reference = first_pass.fundamental_env().clone();
    if reference.is_empty() {
        warn!(fmin, fmax, "no reliable fundamental found; tracking without reference");
        return Ok((first_pass.take_partials(), false));
    }
    debug!(points = reference.len(), "tracking against fundamental");

    let mut analyzer = Analyzer::from_config(config.clone())?;
    analyzer
        .analyze_with_reference(samples, sr, &reference)
        .context("Analysis failed")?;
    Ok((analyzer.take_partials(), true))
}
