//! Synthetic test signals.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f64::consts::TAU;

/// A sine of `freq` Hz and peak `amp` lasting `duration` seconds.
pub fn sine(freq: f64, amp: f64, duration: f64, sample_rate: f64) -> Vec<f64> {
    let len = (duration * sample_rate).round() as usize;
    (0..len)
        .map(|n| amp * (TAU * freq * n as f64 / sample_rate).sin())
        .collect()
}

/// Equal-amplitude harmonics 1..=`count` of `f0`.
pub fn harmonic_tone(
    f0: f64,
    count: usize,
    amp: f64,
    duration: f64,
    sample_rate: f64,
) -> Vec<f64> {
    let mut out = vec![0.0; (duration * sample_rate).round() as usize];
    for h in 1..=count {
        for (s, v) in out.iter_mut().zip(sine(h as f64 * f0, amp, duration, sample_rate)) {
            *s += v;
        }
    }
    out
}

/// Uniform white noise in `[-amp, amp]` from a seeded generator.
pub fn noise(seed: u64, amp: f64, len: usize) -> Vec<f64> {
    let mut rng = Pcg32::seed_from_u64(seed);
    (0..len).map(|_| amp * (2.0 * rng.gen::<f64>() - 1.0)).collect()
}

/// Root-mean-square level; 0 for an empty slice.
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
}
