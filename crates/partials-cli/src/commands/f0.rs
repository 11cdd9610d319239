//! F0 command implementation
//!
//! Analyzes a WAV file with fundamental tracking enabled and prints the
//! estimated fundamental frequency envelope.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitCode;

use partials_analysis::{Analyzer, DEFAULT_F0_AMP_THRESHOLD_DB, DEFAULT_F0_FREQ_THRESHOLD};

use super::json_output;
use crate::wav::read_mono;

/// Options of the f0 command.
#[derive(Debug, Clone)]
pub struct F0Options {
    pub input: PathBuf,
    pub fmin: f64,
    pub fmax: f64,
    /// Analysis resolution; defaults to 80% of `fmin`.
    pub resolution: Option<f64>,
    pub json: bool,
}

/// One point of the fundamental envelope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct F0Point {
    pub time: f64,
    pub frequency: f64,
}

/// Machine-readable result of the f0 command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct F0Summary {
    pub input: String,
    pub fmin: f64,
    pub fmax: f64,
    pub resolution: f64,
    pub points: Vec<F0Point>,
}

/// Run the f0 command
pub fn run(options: &F0Options) -> Result<ExitCode> {
    if options.json {
        return json_output::report("f0", execute(options));
    }

    let summary = execute(options)?;
    println!(
        "{} {} ({} to {} Hz)",
        "Fundamental:".cyan().bold(),
        summary.input,
        summary.fmin,
        summary.fmax
    );
    if summary.points.is_empty() {
        println!("{}", "No reliable fundamental found".yellow());
    }
    for point in &summary.points {
        println!("{:>10.4} s  {:>10.3} Hz", point.time, point.frequency);
    }
    Ok(ExitCode::SUCCESS)
}

fn execute(options: &F0Options) -> Result<F0Summary> {
    if !(options.fmin > 0.0 && options.fmin < options.fmax) {
        bail!(
            "Invalid fundamental range {}..{} Hz",
            options.fmin,
            options.fmax
        );
    }
    let resolution = options.resolution.unwrap_or(0.8 * options.fmin);
    let audio = read_mono(&options.input)?;

    let mut analyzer = Analyzer::new(resolution)?;
    analyzer.build_fundamental_env(
        options.fmin,
        options.fmax,
        DEFAULT_F0_AMP_THRESHOLD_DB,
        DEFAULT_F0_FREQ_THRESHOLD,
    )?;
    analyzer
        .analyze(&audio.samples, audio.sample_rate as f64)
        .context("Fundamental analysis failed")?;

    let points = analyzer
        .fundamental_env()
        .points()
        .iter()
        .map(|&(time, frequency)| F0Point { time, frequency })
        .collect();

    Ok(F0Summary {
        input: options.input.display().to_string(),
        fmin: options.fmin,
        fmax: options.fmax,
        resolution,
        points,
    })
}
