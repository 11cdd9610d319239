//! Morph command implementation
//!
//! Morphs two labeled Partial collections under one piecewise-linear weight
//! function shared by frequency, amplitude and bandwidth.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::ExitCode;

use partials_model::collection::{breakpoint_count, read_json, write_json};
use partials_model::{LinearEnvelope, Partial};
use partials_transform::Morpher;

use super::{json_output, parse_points};

/// Options of the morph command.
#[derive(Debug, Clone, Default)]
pub struct MorphOptions {
    pub source: PathBuf,
    pub target: PathBuf,
    pub output: PathBuf,
    /// `T:V,...` control points of the morph weight.
    pub function: String,
    pub amp_shape: Option<f64>,
    pub min_gap: Option<f64>,
    pub source_reference: Option<u32>,
    pub target_reference: Option<u32>,
    pub json: bool,
}

/// Machine-readable result of the morph command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MorphSummary {
    pub source: String,
    pub target: String,
    pub output: String,
    pub source_partials: usize,
    pub target_partials: usize,
    pub partials: usize,
    pub breakpoints: usize,
}

/// Run the morph command
pub fn run(options: &MorphOptions) -> Result<ExitCode> {
    if options.json {
        return json_output::report("morph", execute(options));
    }

    let summary = execute(options)?;
    println!(
        "{} {} + {} partials -> {} partials ({} breakpoints)",
        "Morphed:".cyan().bold(),
        summary.source_partials,
        summary.target_partials,
        summary.partials,
        summary.breakpoints
    );
    println!("{} {}", "Output written to:".green().bold(), summary.output);
    Ok(ExitCode::SUCCESS)
}

/// Builds a Morpher from the command options and reference collections.
pub fn build_morpher(
    options: &MorphOptions,
    source: &[Partial],
    target: &[Partial],
) -> Result<Morpher> {
    let weight = LinearEnvelope::from_points(parse_points(&options.function)?)
        .context("Invalid morph function")?;
    let mut morpher = Morpher::new(&weight);
    if let Some(shape) = options.amp_shape {
        morpher.set_amp_shape(shape)?;
    }
    if let Some(gap) = options.min_gap {
        morpher.set_min_breakpoint_gap(gap)?;
    }
    if let Some(label) = options.source_reference {
        morpher
            .set_source_reference_label(source, label)
            .context("Invalid source reference")?;
    }
    if let Some(label) = options.target_reference {
        morpher
            .set_target_reference_label(target, label)
            .context("Invalid target reference")?;
    }
    Ok(morpher)
}

fn execute(options: &MorphOptions) -> Result<MorphSummary> {
    let source = read_json(&options.source)
        .with_context(|| format!("Failed to read source: {}", options.source.display()))?;
    let target = read_json(&options.target)
        .with_context(|| format!("Failed to read target: {}", options.target.display()))?;

    let mut morpher = build_morpher(options, &source, &target)?;
    morpher.morph(&source, &target);
    let partials = morpher.take_partials();

    write_json(&options.output, &partials)
        .with_context(|| format!("Failed to write Partials: {}", options.output.display()))?;

    Ok(MorphSummary {
        source: options.source.display().to_string(),
        target: options.target.display().to_string(),
        output: options.output.display().to_string(),
        source_partials: source.len(),
        target_partials: target.len(),
        partials: partials.len(),
        breakpoints: breakpoint_count(&partials),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use partials_model::{Breakpoint, Envelope};

    fn labeled(label: u32) -> Partial {
        let mut p = Partial::with_label(label);
        p.insert(Breakpoint::sinusoid(0.0, 100.0 * label as f64, 0.5));
        p.insert(Breakpoint::sinusoid(1.0, 100.0 * label as f64, 0.5));
        p
    }

    #[test]
    fn test_build_morpher_applies_options() {
        let options = MorphOptions {
            function: "0:0,2:1".to_string(),
            amp_shape: Some(0.01),
            min_gap: Some(0.002),
            source_reference: Some(1),
            ..Default::default()
        };
        let morpher = build_morpher(&options, &[labeled(1)], &[labeled(2)]).unwrap();
        assert_eq!(morpher.amp_shape(), 0.01);
        assert_eq!(morpher.min_breakpoint_gap(), 0.002);
        assert_eq!(morpher.source_reference().label(), 1);
        assert!(morpher.target_reference().is_dummy());
        assert_eq!(morpher.frequency_function().evaluate(1.0), 0.5);
    }

    #[test]
    fn test_build_morpher_rejects_bad_options() {
        let mut options = MorphOptions {
            function: "0:0".to_string(),
            ..Default::default()
        };
        options.amp_shape = Some(0.0);
        assert!(build_morpher(&options, &[], &[]).is_err());

        options.amp_shape = None;
        options.target_reference = Some(7);
        assert!(build_morpher(&options, &[], &[labeled(1)]).is_err());

        options.target_reference = None;
        options.function = "nope".to_string();
        assert!(build_morpher(&options, &[], &[]).is_err());
    }
}
