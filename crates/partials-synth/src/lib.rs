//! Partials Synth
//!
//! Renders bandwidth-enhanced Partials back to audio samples. Noise
//! modulation is driven by seeded PCG32 streams, so output is bit-for-bit
//! reproducible for a given seed.
//!
//! # Modules
//!
//! - [`synthesizer`]: The bandwidth-enhanced oscillator bank
//! - [`rng`]: Per-Partial deterministic noise streams

pub mod rng;
pub mod synthesizer;

pub use synthesizer::{Synthesizer, DEFAULT_FADE_TIME};
