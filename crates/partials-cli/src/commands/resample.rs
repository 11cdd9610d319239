//! Resample command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitCode;

use partials_model::collection::{breakpoint_count, read_json, write_json};
use partials_transform::{Resampler, ResamplerConfig};

use super::json_output;

/// Options of the resample command.
#[derive(Debug, Clone)]
pub struct ResampleOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub interval: f64,
    pub dense: bool,
    pub no_phase_correct: bool,
    pub json: bool,
}

/// Machine-readable result of the resample command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResampleSummary {
    pub input: String,
    pub output: String,
    pub config: ResamplerConfig,
    pub partials: usize,
    pub breakpoints_before: usize,
    pub breakpoints_after: usize,
}

/// Run the resample command
pub fn run(options: &ResampleOptions) -> Result<ExitCode> {
    if options.json {
        return json_output::report("resample", execute(options));
    }

    let summary = execute(options)?;
    println!(
        "{} {} partials onto a {} s grid{}",
        "Resampled:".cyan().bold(),
        summary.partials,
        summary.config.interval,
        if summary.config.dense { " (dense)" } else { "" }
    );
    println!(
        "{} {} -> {}",
        "Breakpoints:".dimmed(),
        summary.breakpoints_before,
        summary.breakpoints_after
    );
    println!("{} {}", "Output written to:".green().bold(), summary.output);
    Ok(ExitCode::SUCCESS)
}

fn execute(options: &ResampleOptions) -> Result<ResampleSummary> {
    let resampler = Resampler::from_config(ResamplerConfig {
        interval: options.interval,
        dense: options.dense,
        phase_correct: !options.no_phase_correct,
    })
    .context("Invalid resampler settings")?;

    let mut partials = read_json(&options.input)
        .with_context(|| format!("Failed to read Partials: {}", options.input.display()))?;
    let breakpoints_before = breakpoint_count(&partials);
    resampler.resample_all(&mut partials);
    write_json(&options.output, &partials)
        .with_context(|| format!("Failed to write Partials: {}", options.output.display()))?;

    Ok(ResampleSummary {
        input: options.input.display().to_string(),
        output: options.output.display().to_string(),
        config: resampler.config(),
        partials: partials.len(),
        breakpoints_before,
        breakpoints_after: breakpoint_count(&partials),
    })
}
