//! Kaiser analysis window design.
//!
//! The reassigned spectrum needs three windows: the Kaiser window itself,
//! the same window weighted by time (in samples from the window centre),
//! and its time derivative. All three are built together here.

use std::f64::consts::PI;

/// Kaiser shape parameter β for a desired window sidelobe attenuation in
/// (positive) dB.
///
/// Uses the Kaiser and Schafer fit of highest sidelobe level against β,
/// valid up to about 120 dB.
///
/// # Example
/// ```
/// use partials_analysis::window::kaiser_beta;
///
/// assert!((kaiser_beta(90.0) - 11.978).abs() < 1e-3);
/// assert_eq!(kaiser_beta(10.0), 0.0);
/// ```
pub fn kaiser_beta(attenuation_db: f64) -> f64 {
    if attenuation_db > 60.0 {
        0.12438 * (attenuation_db + 6.3)
    } else if attenuation_db > 13.26 {
        let excess = attenuation_db - 13.26;
        0.76609 * excess.powf(0.4) + 0.09834 * excess
    } else {
        0.0
    }
}

/// Odd window length (samples) whose main lobe, measured between
/// zero crossings, is `width_hz` wide at `sample_rate`.
pub fn kaiser_length(width_hz: f64, sample_rate: f64, beta: f64) -> usize {
    let duration = 2.0 * (PI * PI + beta * beta).sqrt() / (PI * width_hz);
    let half = (0.5 * duration * sample_rate).round().max(1.0) as usize;
    2 * half + 1
}

/// Modified Bessel function of the first kind, order 0 (power series).
pub fn bessel_i0(x: f64) -> f64 {
    let half = 0.5 * x;
    let mut term = 1.0;
    let mut sum = 1.0;
    for k in 1..200 {
        let r = half / k as f64;
        term *= r * r;
        sum += term;
        if term < sum * 1e-17 {
            break;
        }
    }
    sum
}

/// Modified Bessel function of the first kind, order 1 (power series).
pub fn bessel_i1(x: f64) -> f64 {
    let half = 0.5 * x;
    let mut term = half;
    let mut sum = half;
    for k in 1..200 {
        term *= half * half / (k as f64 * (k + 1) as f64);
        sum += term;
        if term.abs() < sum.abs() * 1e-17 {
            break;
        }
    }
    sum
}

/// A Kaiser window together with its time-weighted and derivative
/// companions, indexed from `-half` to `+half` samples around the centre.
#[derive(Debug, Clone)]
pub struct KaiserWindow {
    beta: f64,
    values: Vec<f64>,
    time_weighted: Vec<f64>,
    derivative: Vec<f64>,
    width_hz: f64,
    sample_rate: f64,
}

impl KaiserWindow {
    /// Designs a window with the given main-lobe width (Hz) and sidelobe
    /// attenuation (positive dB) at `sample_rate`.
    pub fn design(width_hz: f64, sidelobe_db: f64, sample_rate: f64) -> Self {
        let beta = kaiser_beta(sidelobe_db);
        let length = kaiser_length(width_hz, sample_rate, beta);
        let mut window = Self::with_length(length, beta);
        window.width_hz = width_hz;
        window.sample_rate = sample_rate;
        window
    }

    /// Builds a window of odd `length` with shape `beta`.
    pub fn with_length(length: usize, beta: f64) -> Self {
        let length = if length % 2 == 0 { length + 1 } else { length.max(1) };
        let half = (length - 1) / 2;
        let i0_beta = bessel_i0(beta);

        let mut values = Vec::with_capacity(length);
        let mut time_weighted = Vec::with_capacity(length);
        let mut derivative = Vec::with_capacity(length);

        for n in 0..length {
            let m = n as f64 - half as f64;
            if half == 0 {
                values.push(1.0);
                time_weighted.push(0.0);
                derivative.push(0.0);
                continue;
            }
            let x = m / half as f64;
            let u = (1.0 - x * x).max(0.0).sqrt();
            let h = bessel_i0(beta * u) / i0_beta;

            // d/dm I0(βu) = β I1(βu) du/dm, du/dm = -m / (half² u)
            let i1_over_u = if u < 1e-12 {
                0.5 * beta
            } else {
                bessel_i1(beta * u) / u
            };
            let dh = -beta * m * i1_over_u / ((half * half) as f64 * i0_beta);

            values.push(h);
            time_weighted.push(m * h);
            derivative.push(dh);
        }

        Self {
            beta,
            values,
            time_weighted,
            derivative,
            width_hz: 0.0,
            sample_rate: 0.0,
        }
    }

    /// Window length in samples (always odd).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True for a zero-length window (never produced by the constructors).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of samples on each side of the centre.
    pub fn half_length(&self) -> usize {
        (self.values.len() - 1) / 2
    }

    /// Kaiser shape parameter.
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Main-lobe width in Hz this window was designed for (0 if built
    /// directly from a length).
    pub fn width_hz(&self) -> f64 {
        self.width_hz
    }

    /// Sample rate this window was designed for (0 if built directly from a
    /// length).
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Window samples.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Window samples multiplied by their offset from the centre.
    pub fn time_weighted(&self) -> &[f64] {
        &self.time_weighted
    }

    /// Time derivative of the window, per sample.
    pub fn derivative(&self) -> &[f64] {
        &self.derivative
    }

    /// Sum of the window samples (its DC gain).
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Magnitude of the window's transform at `offset` radians per sample
    /// from the centre of the main lobe.
    pub fn transform_magnitude(&self, offset: f64) -> f64 {
        let half = self.half_length() as f64;
        self.values
            .iter()
            .enumerate()
            .map(|(n, &h)| h * (offset * (n as f64 - half)).cos())
            .sum::<f64>()
            .abs()
    }
}
