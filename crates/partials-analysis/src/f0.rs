//! Maximum-likelihood fundamental frequency estimation.
//!
//! The likelihood of a candidate fundamental `f` for a set of peaks is
//! `Σ aᵢ cos(2π fᵢ / f) / Σ aᵢ`, which reaches 1 exactly when every peak is
//! a harmonic of `f`. Every sub-harmonic of the true fundamental fits just
//! as well, so among near-equal maxima the highest frequency is chosen.

use std::f64::consts::TAU;

use partials_model::error::{validate_finite, validate_positive};
use partials_model::{PartialsError, PartialsResult};

/// Upper bound on the number of coarse grid points.
const MAX_GRID_POINTS: usize = 4096;

/// Coarse maxima within this of the best are refined.
const CANDIDATE_TOLERANCE: f64 = 0.2;

/// Refined maxima within this of the best are considered equally good.
const SELECTION_TOLERANCE: f64 = 0.01;

/// Likelihood that `f0` is the fundamental of the given peaks.
///
/// Returns 0 when the amplitudes sum to zero.
pub fn likelihood(amps: &[f64], freqs: &[f64], f0: f64) -> f64 {
    let total: f64 = amps.iter().sum();
    if total <= 0.0 || f0 <= 0.0 {
        return 0.0;
    }
    let fit: f64 = amps
        .iter()
        .zip(freqs)
        .map(|(&a, &f)| a * (TAU * f / f0).cos())
        .sum();
    fit / total
}

/// A fundamental frequency estimate and its confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F0Estimate {
    frequency: f64,
    confidence: f64,
}

impl F0Estimate {
    /// Estimates the fundamental of peaks with amplitudes `amps` and
    /// frequencies `freqs`, searching `[fmin, fmax]` to within
    /// `resolution` Hz.
    ///
    /// # Example
    /// ```
    /// use partials_analysis::F0Estimate;
    ///
    /// let freqs = [200.0, 400.0, 600.0, 800.0];
    /// let amps = [1.0; 4];
    /// let est = F0Estimate::new(&amps, &freqs, 50.0, 500.0, 0.1).unwrap();
    /// assert!((est.frequency() - 200.0).abs() < 0.1);
    /// assert!(est.confidence() > 0.99);
    /// ```
    pub fn new(
        amps: &[f64],
        freqs: &[f64],
        fmin: f64,
        fmax: f64,
        resolution: f64,
    ) -> PartialsResult<Self> {
        if amps.is_empty() || freqs.is_empty() {
            return Err(PartialsError::invalid_argument(
                "peaks",
                "amplitude and frequency arrays must not be empty",
            ));
        }
        if amps.len() != freqs.len() {
            return Err(PartialsError::invalid_argument(
                "peaks",
                format!(
                    "{} amplitudes but {} frequencies",
                    amps.len(),
                    freqs.len()
                ),
            ));
        }
        validate_positive("fmin", fmin)?;
        validate_finite("fmax", fmax)?;
        if fmin >= fmax {
            return Err(PartialsError::invalid_argument(
                "fmax",
                format!("must exceed fmin ({}), got {}", fmin, fmax),
            ));
        }
        validate_positive("resolution", resolution)?;

        let (frequency, value) = search(amps, freqs, fmin, fmax, resolution);
        Ok(Self {
            frequency,
            confidence: value.clamp(0.0, 1.0),
        })
    }

    /// Estimated fundamental in Hz.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Likelihood of the estimate, in [0, 1].
    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

fn search(amps: &[f64], freqs: &[f64], fmin: f64, fmax: f64, resolution: f64) -> (f64, f64) {
    let top = freqs.iter().fold(0.0f64, |m, &f| m.max(f.abs()));
    let span = fmax - fmin;
    let fine = if top > 0.0 {
        fmin * fmin / (8.0 * top)
    } else {
        span
    };
    let step = fine.max(span / MAX_GRID_POINTS as f64).min(span);
    let points = (span / step).ceil() as usize + 1;

    let grid: Vec<(f64, f64)> = (0..points)
        .map(|i| {
            let f = (fmin + i as f64 * step).min(fmax);
            (f, likelihood(amps, freqs, f))
        })
        .collect();
    let best = grid
        .iter()
        .map(|&(_, v)| v)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut candidates = Vec::new();
    for (i, &(f, v)) in grid.iter().enumerate() {
        let left = if i > 0 { grid[i - 1].1 } else { f64::NEG_INFINITY };
        let right = grid.get(i + 1).map_or(f64::NEG_INFINITY, |&(_, r)| r);
        if v >= left && v >= right && v >= best - CANDIDATE_TOLERANCE {
            candidates.push(refine(amps, freqs, f, step, fmin, fmax, resolution));
        }
    }

    let refined_best = candidates
        .iter()
        .map(|&(_, v)| v)
        .fold(f64::NEG_INFINITY, f64::max);
    candidates
        .into_iter()
        .filter(|&(_, v)| v >= refined_best - SELECTION_TOLERANCE)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((fmin, 0.0))
}

/// Narrows a bracket around a coarse maximum at `centre` until it is
/// narrower than `resolution`.
fn refine(
    amps: &[f64],
    freqs: &[f64],
    centre: f64,
    step: f64,
    fmin: f64,
    fmax: f64,
    resolution: f64,
) -> (f64, f64) {
    let mut lo = (centre - step).max(fmin);
    let mut hi = (centre + step).min(fmax);
    let mut best = (centre, likelihood(amps, freqs, centre));
    while hi - lo > resolution {
        let spacing = (hi - lo) / 4.0;
        for i in 0..=4 {
            let f = lo + i as f64 * spacing;
            let v = likelihood(amps, freqs, f);
            if v > best.1 {
                best = (f, v);
            }
        }
        lo = (best.0 - spacing).max(fmin);
        hi = (best.0 + spacing).min(fmax);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_likelihood_of_exact_harmonics_is_one() {
        let freqs = [110.0, 220.0, 330.0];
        let amps = [0.5, 0.3, 0.1];
        assert!((likelihood(&amps, &freqs, 110.0) - 1.0).abs() < 1e-12);
        assert!(likelihood(&amps, &freqs, 220.0) < 0.5);
    }

    #[test]
    fn test_harmonic_set_finds_fundamental() {
        let f0 = 146.83;
        let freqs: Vec<f64> = (1..=4).map(|k| k as f64 * f0).collect();
        let amps = vec![1.0; 4];
        let est = F0Estimate::new(&amps, &freqs, 60.0, 400.0, 0.05).unwrap();
        assert!((est.frequency() - f0).abs() < 0.05, "got {}", est.frequency());
        assert!(est.confidence() >= 0.99);
    }

    #[test]
    fn test_sub_harmonics_are_rejected() {
        // 100 Hz, 50 Hz and 33.3 Hz all fit perfectly
        let freqs = [100.0, 200.0, 300.0, 400.0, 500.0];
        let amps = [1.0, 0.8, 0.6, 0.4, 0.2];
        let est = F0Estimate::new(&amps, &freqs, 30.0, 150.0, 0.1).unwrap();
        assert!((est.frequency() - 100.0).abs() < 0.1, "got {}", est.frequency());
    }

    #[test]
    fn test_missing_fundamental_is_recovered() {
        let freqs = [400.0, 600.0, 800.0, 1000.0];
        let amps = [1.0; 4];
        let est = F0Estimate::new(&amps, &freqs, 150.0, 350.0, 0.1).unwrap();
        assert!((est.frequency() - 200.0).abs() < 0.1, "got {}", est.frequency());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let freqs = [300.0, 410.0, 777.0];
        let amps = [1.0, 1.0, 1.0];
        let est = F0Estimate::new(&amps, &freqs, 50.0, 1000.0, 0.5).unwrap();
        assert!((0.0..=1.0).contains(&est.confidence()));
        assert!((50.0..=1000.0).contains(&est.frequency()));
    }

    #[test]
    fn test_invalid_arguments() {
        let a = [1.0];
        let f = [100.0];
        assert!(F0Estimate::new(&[], &[], 50.0, 200.0, 0.1).is_err());
        assert!(F0Estimate::new(&[1.0, 2.0], &f, 50.0, 200.0, 0.1).is_err());
        assert!(F0Estimate::new(&a, &f, 0.0, 200.0, 0.1).is_err());
        assert!(F0Estimate::new(&a, &f, 200.0, 200.0, 0.1).is_err());
        assert!(F0Estimate::new(&a, &f, 50.0, 200.0, 0.0).is_err());
        let err = F0Estimate::new(&a, &f, 300.0, 200.0, 0.1).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
