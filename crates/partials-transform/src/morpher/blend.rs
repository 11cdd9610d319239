//! Parameter interpolation rules.

/// Linear interpolation from `from` (w = 0) to `to` (w = 1).
pub fn linear(from: f64, to: f64, weight: f64) -> f64 {
    if weight <= 0.0 {
        from
    } else if weight >= 1.0 {
        to
    } else {
        from + (to - from) * weight
    }
}

/// Logarithmic amplitude interpolation.
///
/// `shape` is added to both amplitudes before interpolating their
/// logarithms and subtracted afterwards, so silence can be morphed. The
/// result is exact at the end weights and never negative.
///
/// # Example
/// ```
/// use partials_transform::morpher::shaped_amplitude;
///
/// assert_eq!(shaped_amplitude(0.5, 0.0, 0.0, 1e-5), 0.5);
/// assert_eq!(shaped_amplitude(0.5, 0.0, 1.0, 1e-5), 0.0);
/// let mid = shaped_amplitude(0.5, 0.0, 0.5, 1e-5);
/// assert!(mid > 0.0 && mid < 0.01);
/// ```
pub fn shaped_amplitude(from: f64, to: f64, weight: f64, shape: f64) -> f64 {
    if weight <= 0.0 {
        return from;
    }
    if weight >= 1.0 {
        return to;
    }
    let log = (1.0 - weight) * (from + shape).ln() + weight * (to + shape).ln();
    (log.exp() - shape).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_endpoints_and_midpoint() {
        assert_eq!(linear(100.0, 200.0, 0.0), 100.0);
        assert_eq!(linear(100.0, 200.0, 1.0), 200.0);
        assert_eq!(linear(100.0, 200.0, 0.5), 150.0);
        assert_eq!(linear(100.0, 200.0, -3.0), 100.0);
        assert_eq!(linear(100.0, 200.0, 7.0), 200.0);
    }

    #[test]
    fn test_shaped_amplitude_is_monotonic() {
        let mut previous = shaped_amplitude(0.2, 0.8, 0.0, 1e-5);
        for i in 1..=10 {
            let a = shaped_amplitude(0.2, 0.8, i as f64 / 10.0, 1e-5);
            assert!(a > previous);
            previous = a;
        }
        assert_eq!(previous, 0.8);
    }

    #[test]
    fn test_larger_shape_is_closer_to_linear() {
        let sharp = shaped_amplitude(1.0, 0.0, 0.5, 1e-5);
        let soft = shaped_amplitude(1.0, 0.0, 0.5, 10.0);
        assert!(sharp < soft);
        assert!((soft - 0.5).abs() < 0.02);
    }
}
