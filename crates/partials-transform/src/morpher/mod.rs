//! Sound morphing by Partial interpolation.
//!
//! Corresponding Partials of two sounds (matched by label) are blended
//! under time-varying weights; Partials with no counterpart are faded in
//! or out.

mod blend;
mod config;
#[allow(clippy::module_inception)]
mod morpher;

#[cfg(test)]
mod tests_breakpoints;
#[cfg(test)]
mod tests_collections;
#[cfg(test)]
mod tests_partials;

// Re-export public API
pub use blend::{linear, shaped_amplitude};
pub use config::{
    MorpherConfig, DEFAULT_AMP_SHAPE, DEFAULT_FREQ_FIX_THRESHOLD_DB, DEFAULT_MIN_BREAKPOINT_GAP,
};
pub use morpher::Morpher;
