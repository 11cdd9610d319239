//! Distill command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitCode;

use partials_model::collection::{breakpoint_count, read_json, write_json};
use partials_transform::distiller::{DEFAULT_FADE_TIME, DEFAULT_GAP_TIME};
use partials_transform::{Distiller, DistillerConfig};

use super::json_output;

/// Options of the distill command.
#[derive(Debug, Clone)]
pub struct DistillOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub fade_time: Option<f64>,
    pub gap_time: Option<f64>,
    pub json: bool,
}

/// Machine-readable result of the distill command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistillSummary {
    pub input: String,
    pub output: String,
    pub config: DistillerConfig,
    pub partials_before: usize,
    pub partials_after: usize,
    pub breakpoints: usize,
}

/// Run the distill command
pub fn run(options: &DistillOptions) -> Result<ExitCode> {
    if options.json {
        return json_output::report("distill", execute(options));
    }

    let summary = execute(options)?;
    println!(
        "{} {} -> {} partials ({} breakpoints)",
        "Distilled:".cyan().bold(),
        summary.partials_before,
        summary.partials_after,
        summary.breakpoints
    );
    println!("{} {}", "Output written to:".green().bold(), summary.output);
    Ok(ExitCode::SUCCESS)
}

fn execute(options: &DistillOptions) -> Result<DistillSummary> {
    let distiller = Distiller::from_config(DistillerConfig {
        fade_time: options.fade_time.unwrap_or(DEFAULT_FADE_TIME),
        gap_time: options.gap_time.unwrap_or(DEFAULT_GAP_TIME),
    })
    .context("Invalid distiller settings")?;

    let mut partials = read_json(&options.input)
        .with_context(|| format!("Failed to read Partials: {}", options.input.display()))?;
    let partials_before = partials.len();
    distiller.distill(&mut partials);
    write_json(&options.output, &partials)
        .with_context(|| format!("Failed to write Partials: {}", options.output.display()))?;

    Ok(DistillSummary {
        input: options.input.display().to_string(),
        output: options.output.display().to_string(),
        config: distiller.config(),
        partials_before,
        partials_after: partials.len(),
        breakpoints: breakpoint_count(&partials),
    })
}
