//! Morpher shaping parameters.

use serde::{Deserialize, Serialize};

use partials_model::error::{validate_finite, validate_positive};
use partials_model::PartialsResult;

/// Default amplitude shaping offset.
pub const DEFAULT_AMP_SHAPE: f64 = 1e-5;

/// Default minimum time between morphed breakpoints (s).
pub const DEFAULT_MIN_BREAKPOINT_GAP: f64 = 1e-4;

/// Default amplitude (dB) below which a breakpoint's frequency is taken
/// from the reference Partial.
pub const DEFAULT_FREQ_FIX_THRESHOLD_DB: f64 = -90.0;

/// Numeric parameters of a [`super::Morpher`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MorpherConfig {
    /// Offset added to amplitudes before logarithmic interpolation.
    /// Smaller values give a more perceptually even amplitude morph.
    #[serde(default = "default_amp_shape")]
    pub amp_shape: f64,
    /// Breakpoints closer than this to the previous one are dropped (s).
    #[serde(default = "default_min_breakpoint_gap")]
    pub min_breakpoint_gap: f64,
    /// Amplitude threshold for reference frequency correction (dB).
    #[serde(default = "default_freq_fix_threshold_db")]
    pub freq_fix_threshold_db: f64,
}

fn default_amp_shape() -> f64 {
    DEFAULT_AMP_SHAPE
}

fn default_min_breakpoint_gap() -> f64 {
    DEFAULT_MIN_BREAKPOINT_GAP
}

fn default_freq_fix_threshold_db() -> f64 {
    DEFAULT_FREQ_FIX_THRESHOLD_DB
}

impl Default for MorpherConfig {
    fn default() -> Self {
        Self {
            amp_shape: DEFAULT_AMP_SHAPE,
            min_breakpoint_gap: DEFAULT_MIN_BREAKPOINT_GAP,
            freq_fix_threshold_db: DEFAULT_FREQ_FIX_THRESHOLD_DB,
        }
    }
}

impl MorpherConfig {
    /// Checks every parameter against its domain.
    pub fn validate(&self) -> PartialsResult<()> {
        validate_positive("amp_shape", self.amp_shape)?;
        validate_positive("min_breakpoint_gap", self.min_breakpoint_gap)?;
        validate_finite("freq_fix_threshold_db", self.freq_fix_threshold_db)?;
        Ok(())
    }

    /// The reference-correction threshold as a linear amplitude.
    pub fn freq_fix_threshold(&self) -> f64 {
        10f64.powf(self.freq_fix_threshold_db / 20.0)
    }
}
