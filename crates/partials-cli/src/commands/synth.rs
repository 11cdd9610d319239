//! Synth command implementation

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitCode;

use partials_model::collection::read_json;
use partials_model::Partial;
use partials_synth::Synthesizer;

use super::json_output;
use crate::wav::write_mono;

/// Default output sample rate (Hz).
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Options of the synth command.
#[derive(Debug, Clone)]
pub struct SynthOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub sample_rate: u32,
    pub seed: u32,
    pub fade_time: Option<f64>,
    pub json: bool,
}

/// Machine-readable result of the synth command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynthSummary {
    pub input: String,
    pub output: String,
    pub sample_rate: u32,
    pub seed: u32,
    pub partials: usize,
    pub samples: usize,
    pub duration: f64,
    pub peak: f64,
}

/// Run the synth command
pub fn run(options: &SynthOptions) -> Result<ExitCode> {
    if options.json {
        return json_output::report("synth", execute(options));
    }

    let summary = execute(options)?;
    println!(
        "{} {} partials, {:.3} s at {} Hz (seed {})",
        "Synthesized:".cyan().bold(),
        summary.partials,
        summary.duration,
        summary.sample_rate,
        summary.seed
    );
    if summary.peak > 1.0 {
        println!(
            "{} peak level {:.3} exceeds full scale",
            "Warning:".yellow().bold(),
            summary.peak
        );
    }
    println!("{} {}", "Output written to:".green().bold(), summary.output);
    Ok(ExitCode::SUCCESS)
}

/// Number of samples needed to hold every Partial including its fade out.
pub fn output_length(partials: &[Partial], fade_time: f64, sample_rate: u32) -> usize {
    let end = partials
        .iter()
        .filter_map(Partial::end_time)
        .fold(0.0_f64, f64::max);
    if end <= 0.0 {
        return 0;
    }
    ((end + fade_time) * sample_rate as f64).ceil() as usize + 1
}

fn execute(options: &SynthOptions) -> Result<SynthSummary> {
    let mut synth =
        Synthesizer::new(options.sample_rate as f64).context("Invalid sample rate")?;
    synth.set_seed(options.seed);
    if let Some(fade) = options.fade_time {
        synth.set_fade_time(fade).context("Invalid fade time")?;
    }

    let partials = read_json(&options.input)
        .with_context(|| format!("Failed to read Partials: {}", options.input.display()))?;
    let length = output_length(&partials, synth.fade_time(), options.sample_rate);
    let samples = synth.synthesize(&partials, length);
    write_mono(&options.output, &samples, options.sample_rate)?;

    Ok(SynthSummary {
        input: options.input.display().to_string(),
        output: options.output.display().to_string(),
        sample_rate: options.sample_rate,
        seed: options.seed,
        partials: partials.len(),
        samples: samples.len(),
        duration: samples.len() as f64 / options.sample_rate as f64,
        peak: samples.iter().fold(0.0_f64, |m, s| m.max(s.abs())),
    })
}
