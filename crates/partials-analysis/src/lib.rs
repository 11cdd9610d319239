//! Partials Analysis
//!
//! Reassigned bandwidth-enhanced analysis of sampled sounds. A Kaiser
//! windowed short-time spectrum is reassigned in time and frequency, its
//! peaks are selected and linked frame to frame into [`Partial`]s, and the
//! energy of rejected peaks is attributed to nearby Partials as noise
//! (bandwidth).
//!
//! [`Partial`]: partials_model::Partial
//!
//! # Modules
//!
//! - [`analyzer`]: The [`Analyzer`] and its configuration accessors
//! - [`config`]: Serializable [`AnalyzerConfig`]
//! - [`window`]: Kaiser window design
//! - [`spectrum`]: Reassigned short-time spectrum
//! - [`peaks`]: Spectral peak selection
//! - [`tracking`]: Frame-to-frame peak linking
//! - [`bandwidth`]: Noise energy association
//! - [`envelope_builder`]: Fundamental and amplitude envelopes
//! - [`f0`]: Maximum-likelihood fundamental estimation

pub mod analyzer;
pub mod bandwidth;
pub mod config;
pub mod envelope_builder;
pub mod f0;
pub mod peaks;
pub mod spectrum;
pub mod tracking;
pub mod window;

pub use analyzer::{analyze_samples, Analyzer};
pub use config::AnalyzerConfig;
pub use envelope_builder::{DEFAULT_F0_AMP_THRESHOLD_DB, DEFAULT_F0_FREQ_THRESHOLD};
pub use f0::F0Estimate;
pub use window::KaiserWindow;
