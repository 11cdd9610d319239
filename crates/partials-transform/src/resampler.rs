//! Regularization of breakpoint times.
//!
//! The Resampler moves every breakpoint of a Partial onto a grid of integer
//! multiples of a fixed interval, either keeping only the grid points near
//! existing breakpoints (sparse) or filling every grid point across the
//! Partial's span (dense). Frequencies are then adjusted so that the
//! breakpoint phases stay consistent.

use serde::{Deserialize, Serialize};

use partials_model::error::validate_positive;
use partials_model::phase::{fix_frequency, fix_phase_forward, DEFAULT_MAX_FIX};
use partials_model::{Partial, PartialsResult};
use tracing::debug;

/// Serializable Resampler settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResamplerConfig {
    /// Grid spacing in seconds.
    pub interval: f64,
    /// Fill every grid point across each Partial's span.
    #[serde(default)]
    pub dense: bool,
    /// Correct frequencies and phases after resampling.
    #[serde(default = "default_phase_correct")]
    pub phase_correct: bool,
}

fn default_phase_correct() -> bool {
    true
}

impl ResamplerConfig {
    /// Checks every parameter against its domain.
    pub fn validate(&self) -> PartialsResult<()> {
        validate_positive("interval", self.interval)
    }
}

/// Resamples Partials onto a regular time grid.
///
/// # Example
/// ```
/// use partials_model::{Breakpoint, Partial};
/// use partials_transform::Resampler;
///
/// let mut partial = Partial::with_label(1);
/// partial.insert(Breakpoint::sinusoid(0.0104, 220.0, 0.5));
/// partial.insert(Breakpoint::sinusoid(0.0296, 220.0, 0.5));
///
/// let resampler = Resampler::new(0.01).unwrap();
/// resampler.resample(&mut partial);
/// let times: Vec<f64> = partial.iter().map(|bp| bp.time).collect();
/// assert_eq!(times, vec![0.01, 0.03]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resampler {
    interval: f64,
    dense: bool,
    phase_correct: bool,
}

impl Resampler {
    /// Creates a sparse, phase-correcting Resampler with grid spacing
    /// `interval` seconds.
    pub fn new(interval: f64) -> PartialsResult<Self> {
        validate_positive("interval", interval)?;
        Ok(Self {
            interval,
            dense: false,
            phase_correct: true,
        })
    }

    /// Creates a Resampler from a configuration.
    pub fn from_config(config: ResamplerConfig) -> PartialsResult<Self> {
        config.validate()?;
        Ok(Self {
            interval: config.interval,
            dense: config.dense,
            phase_correct: config.phase_correct,
        })
    }

    /// The current settings.
    pub fn config(&self) -> ResamplerConfig {
        ResamplerConfig {
            interval: self.interval,
            dense: self.dense,
            phase_correct: self.phase_correct,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn dense_resampling(&self) -> bool {
        self.dense
    }

    pub fn set_dense_resampling(&mut self, dense: bool) {
        self.dense = dense;
    }

    pub fn phase_correct(&self) -> bool {
        self.phase_correct
    }

    pub fn set_phase_correct(&mut self, enabled: bool) {
        self.phase_correct = enabled;
    }

    fn grid_index(&self, time: f64) -> i64 {
        (time / self.interval).round() as i64
    }

    fn grid_time(&self, index: i64) -> f64 {
        index as f64 * self.interval
    }

    /// Resamples `partial` in place. Dummy Partials are left unchanged.
    pub fn resample(&self, partial: &mut Partial) {
        let (Some(start), Some(end)) = (partial.start_time(), partial.end_time()) else {
            return;
        };

        let indices: Vec<i64> = if self.dense {
            (self.grid_index(start)..=self.grid_index(end)).collect()
        } else {
            let mut indices: Vec<i64> = Vec::with_capacity(partial.len());
            for bp in partial.iter() {
                let index = self.grid_index(bp.time);
                if indices.last() != Some(&index) {
                    indices.push(index);
                }
            }
            indices
        };

        let mut resampled = Partial::with_label(partial.label());
        for index in indices {
            let time = self.grid_time(index);
            resampled.insert(partial.parameters_at(time).at_time(time));
        }

        if self.phase_correct {
            fix_frequency(&mut resampled, DEFAULT_MAX_FIX);
            fix_phase_forward(&mut resampled);
        }
        *partial = resampled;
    }

    /// Resamples every Partial in `partials`.
    pub fn resample_all(&self, partials: &mut [Partial]) {
        for partial in partials.iter_mut() {
            self.resample(partial);
        }
        debug!(
            partials = partials.len(),
            interval = self.interval,
            dense = self.dense,
            "resampled"
        );
    }
}
