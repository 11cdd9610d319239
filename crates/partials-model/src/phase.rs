//! Frequency/phase consistency for Partials.
//!
//! A Partial's phase between breakpoints is defined by integrating its
//! linearly interpolated frequency, so independently measured breakpoint
//! phases drift out of agreement with the frequencies. [`fix_frequency`]
//! nudges the frequencies toward the measured phases and
//! [`fix_phase_forward`] then makes the phases exactly consistent.

use std::f64::consts::PI;

use crate::breakpoint::Breakpoint;
use crate::partial::Partial;

/// Default bound on a frequency correction, as a fraction of the frequency.
pub const DEFAULT_MAX_FIX: f64 = 0.02;

/// Wraps a phase to (-π, π].
pub fn wrap_pi(phase: f64) -> f64 {
    if !phase.is_finite() {
        return 0.0;
    }
    let mut wrapped = phase % (2.0 * PI);
    if wrapped > PI {
        wrapped -= 2.0 * PI;
    } else if wrapped <= -PI {
        wrapped += 2.0 * PI;
    }
    wrapped
}

/// Phase advance (radians) accumulated by integrating the linearly
/// interpolated frequency from `from` to `to`.
pub fn phase_travel(from: &Breakpoint, to: &Breakpoint) -> f64 {
    PI * (from.frequency + to.frequency) * (to.time - from.time)
}

/// Recomputes every phase after the first so that it equals the previous
/// phase plus the integrated frequency across the segment.
pub fn fix_phase_forward(partial: &mut Partial) {
    let bps = partial.breakpoints_mut();
    for i in 1..bps.len() {
        let travel = phase_travel(&bps[i - 1], &bps[i]);
        bps[i].phase = wrap_pi(bps[i - 1].phase + travel);
    }
}

/// Adjusts breakpoint frequencies so that each segment's integrated
/// frequency matches the measured phase advance between its breakpoints,
/// unwrapped to the branch nearest the current frequencies.
///
/// The adjustment is the minimum-norm change satisfying every segment at
/// once; each individual change is then limited to `max_fix` times the
/// breakpoint's frequency. Phases are left untouched.
pub fn fix_frequency(partial: &mut Partial, max_fix: f64) {
    let bps = partial.breakpoints_mut();
    let n = bps.len();
    if n < 2 {
        return;
    }

    // Each segment asks for the sum of its two endpoint corrections.
    let rhs: Vec<f64> = bps
        .windows(2)
        .map(|w| {
            let dt = w[1].time - w[0].time;
            let mismatch = wrap_pi(w[1].phase - w[0].phase - phase_travel(&w[0], &w[1]));
            2.0 * mismatch / (2.0 * PI * dt)
        })
        .collect();

    let y = solve_segment_system(&rhs);
    for (j, bp) in bps.iter_mut().enumerate() {
        let left = if j >= 1 { y[j - 1] } else { 0.0 };
        let right = if j < n - 1 { y[j] } else { 0.0 };
        let limit = max_fix * bp.frequency.abs();
        let correction = (left + right).clamp(-limit, limit);
        if bp.frequency + correction > 0.0 {
            bp.frequency += correction;
        }
    }
}

/// Solves `(A Aᵀ) y = r` where `A` sums adjacent breakpoint corrections;
/// `A Aᵀ` is tridiagonal with 2 on the diagonal and 1 beside it.
fn solve_segment_system(rhs: &[f64]) -> Vec<f64> {
    let m = rhs.len();
    let mut c_prime = vec![0.0; m];
    let mut d_prime = vec![0.0; m];

    c_prime[0] = 0.5;
    d_prime[0] = rhs[0] / 2.0;
    for i in 1..m {
        let denom = 2.0 - c_prime[i - 1];
        c_prime[i] = 1.0 / denom;
        d_prime[i] = (rhs[i] - d_prime[i - 1]) / denom;
    }

    let mut y = vec![0.0; m];
    y[m - 1] = d_prime[m - 1];
    for i in (0..m - 1).rev() {
        y[i] = d_prime[i] - c_prime[i] * y[i + 1];
    }
    y
}

/// Largest phase mismatch (radians) between consecutive breakpoints.
pub fn max_phase_error(partial: &Partial) -> f64 {
    partial
        .breakpoints()
        .windows(2)
        .map(|w| wrap_pi(w[1].phase - w[0].phase - phase_travel(&w[0], &w[1])).abs())
        .fold(0.0, f64::max)
}
