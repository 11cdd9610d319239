//! CLI argument definitions for the `partials` command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined here,
//! keeping `main.rs` focused on dispatch logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use partials_cli::commands::synth::DEFAULT_SAMPLE_RATE;

/// Partials - Reassigned bandwidth-enhanced analysis, morphing and synthesis
#[derive(Parser)]
#[command(name = "partials")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub(crate) struct Cli {
    /// Log debug diagnostics to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Analyze a WAV file into bandwidth-enhanced Partials
    Analyze {
        /// Input WAV file (multi-channel input is averaged to mono)
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSON file for the Partials
        #[arg(short, long)]
        output: PathBuf,

        /// Frequency resolution in Hz
        #[arg(short, long)]
        resolution: Option<f64>,

        /// Analysis window main-lobe width in Hz (default: twice the resolution)
        #[arg(long)]
        window_width: Option<f64>,

        /// JSON file with a complete analyzer configuration
        #[arg(long)]
        config: Option<PathBuf>,

        /// Track Partials along a fundamental estimated in FMIN:FMAX Hz
        #[arg(long, value_name = "FMIN:FMAX")]
        reference_f0: Option<String>,

        /// Skip frequency/phase correction of finished Partials
        #[arg(long)]
        no_phase_correct: bool,

        /// Bandwidth association region width in Hz (0 disables association)
        #[arg(long)]
        bw_region_width: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Move breakpoints of every Partial onto a regular time grid
    Resample {
        /// Input Partials JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output Partials JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Grid interval in seconds
        #[arg(long)]
        interval: f64,

        /// Fill every grid point across each Partial's span
        #[arg(long)]
        dense: bool,

        /// Skip frequency/phase correction after resampling
        #[arg(long)]
        no_phase_correct: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Label Partials with harmonic numbers against a frequency reference
    Channelize {
        /// Input Partials JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output Partials JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Frequency range of the Partial used as reference, in Hz
        #[arg(long, value_name = "FMIN:FMAX")]
        reference: String,

        /// Harmonic number of the reference Partial
        #[arg(long, default_value_t = 1)]
        ref_label: u32,

        /// Number of reference samples (default: one every 30 ms)
        #[arg(long)]
        samples: Option<usize>,

        /// Distill each label to a single Partial afterwards
        #[arg(long)]
        distill: bool,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Join the Partials of each label into a single Partial
    Distill {
        /// Input Partials JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output Partials JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Fade to and from silence between joined fragments in seconds
        #[arg(long)]
        fade_time: Option<f64>,

        /// Minimum silence between joined fragments in seconds
        #[arg(long)]
        gap_time: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Morph two labeled Partial collections
    Morph {
        /// Source Partials JSON file
        #[arg(short, long)]
        source: PathBuf,

        /// Target Partials JSON file
        #[arg(short, long)]
        target: PathBuf,

        /// Output Partials JSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Morph weight as T:V control points, e.g. 0:0,1:1
        #[arg(short, long, value_name = "T:V,...", allow_hyphen_values = true)]
        function: String,

        /// Amplitude morphing shape (small values give log-like amplitude morphs)
        #[arg(long)]
        amp_shape: Option<f64>,

        /// Minimum time between morphed breakpoints in seconds
        #[arg(long)]
        min_gap: Option<f64>,

        /// Label of the source Partial used as frequency reference
        #[arg(long)]
        source_reference: Option<u32>,

        /// Label of the target Partial used as frequency reference
        #[arg(long)]
        target_reference: Option<u32>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Render Partials to a mono 32-bit float WAV file
    Synth {
        /// Input Partials JSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output WAV file
        #[arg(short, long)]
        output: PathBuf,

        /// Output sample rate in Hz
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,

        /// Seed of the noise generators
        #[arg(long, default_value_t = 0)]
        seed: u32,

        /// Fade in/out time at Partial ends in seconds
        #[arg(long)]
        fade_time: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Estimate the fundamental frequency envelope of a WAV file
    F0 {
        /// Input WAV file
        #[arg(short, long)]
        input: PathBuf,

        /// Lowest candidate fundamental in Hz
        #[arg(long)]
        fmin: f64,

        /// Highest candidate fundamental in Hz
        #[arg(long)]
        fmax: f64,

        /// Analysis frequency resolution in Hz (default: 80% of fmin)
        #[arg(short, long)]
        resolution: Option<f64>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}
