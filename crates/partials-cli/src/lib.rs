//! Partials CLI library.
//!
//! Command implementations for the `partials` binary: analysis of WAV files
//! into Partials, harmonic labeling, resampling, morphing and resynthesis of
//! Partial collections stored as JSON.

pub mod commands;
pub mod logging;
pub mod wav;
