//! Per-frame envelope construction during analysis.

use partials_model::error::{validate_finite, validate_positive};
use partials_model::{Breakpoint, LinearEnvelope, PartialsError, PartialsResult};

use crate::f0::F0Estimate;

/// Default amplitude threshold for peaks used in F0 estimation (dB).
pub const DEFAULT_F0_AMP_THRESHOLD_DB: f64 = -60.0;

/// Default frequency ceiling for peaks used in F0 estimation (Hz).
pub const DEFAULT_F0_FREQ_THRESHOLD: f64 = 8000.0;

/// Estimates with lower confidence are not recorded.
pub const MIN_F0_CONFIDENCE: f64 = 0.9;

/// Search precision for per-frame F0 estimates (Hz).
const F0_PRECISION: f64 = 0.1;

/// Builds a fundamental frequency envelope from per-frame F0 estimates.
#[derive(Debug, Clone)]
pub struct FundamentalBuilder {
    fmin: f64,
    fmax: f64,
    amp_threshold: f64,
    freq_threshold: f64,
    envelope: LinearEnvelope,
    amps: Vec<f64>,
    freqs: Vec<f64>,
}

impl FundamentalBuilder {
    /// Creates a builder searching `[fmin, fmax]`, using only peaks louder
    /// than `amp_threshold_db` and below `freq_threshold` Hz.
    pub fn new(
        fmin: f64,
        fmax: f64,
        amp_threshold_db: f64,
        freq_threshold: f64,
    ) -> PartialsResult<Self> {
        validate_positive("fmin", fmin)?;
        validate_finite("fmax", fmax)?;
        if fmin >= fmax {
            return Err(PartialsError::invalid_argument(
                "fmax",
                format!("must exceed fmin ({}), got {}", fmin, fmax),
            ));
        }
        validate_finite("amp_threshold_db", amp_threshold_db)?;
        validate_positive("freq_threshold", freq_threshold)?;
        Ok(Self {
            fmin,
            fmax,
            amp_threshold: 10f64.powf(amp_threshold_db / 20.0),
            freq_threshold,
            envelope: LinearEnvelope::new(),
            amps: Vec::new(),
            freqs: Vec::new(),
        })
    }

    /// Estimates the fundamental of one frame's peaks and records it at
    /// `time` if the estimate is confident.
    pub fn build(&mut self, peaks: &[Breakpoint], time: f64) {
        self.amps.clear();
        self.freqs.clear();
        for peak in peaks {
            if peak.amplitude > self.amp_threshold && peak.frequency < self.freq_threshold {
                self.amps.push(peak.amplitude);
                self.freqs.push(peak.frequency);
            }
        }
        if self.amps.is_empty() {
            return;
        }
        // arguments were validated at construction
        let estimate =
            F0Estimate::new(&self.amps, &self.freqs, self.fmin, self.fmax, F0_PRECISION);
        if let Ok(est) = estimate {
            if est.confidence() >= MIN_F0_CONFIDENCE {
                self.envelope.insert(time, est.frequency());
            }
        }
    }

    /// The envelope built so far.
    pub fn envelope(&self) -> &LinearEnvelope {
        &self.envelope
    }

    /// Consumes the builder, returning its envelope.
    pub fn into_envelope(self) -> LinearEnvelope {
        self.envelope
    }
}

/// Builds an overall amplitude envelope from the per-frame sum of peak
/// amplitudes.
#[derive(Debug, Clone, Default)]
pub struct AmpEnvBuilder {
    envelope: LinearEnvelope,
}

impl AmpEnvBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the summed amplitude of `peaks` at `time`.
    pub fn build(&mut self, peaks: &[Breakpoint], time: f64) {
        let total: f64 = peaks.iter().map(|p| p.amplitude).sum();
        self.envelope.insert(time, total);
    }

    /// The envelope built so far.
    pub fn envelope(&self) -> &LinearEnvelope {
        &self.envelope
    }

    /// Consumes the builder, returning its envelope.
    pub fn into_envelope(self) -> LinearEnvelope {
        self.envelope
    }
}
