//! Reassigned short-time spectrum.
//!
//! Each frame is transformed three times: with the analysis window, with the
//! time-weighted window and with the window derivative. The ratios of those
//! transforms give, for every bin, the frequency and time that the bin's
//! energy actually belongs to.

use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::window::KaiserWindow;

/// Squared magnitudes below this are treated as silence.
const MIN_POWER: f64 = 1e-30;

/// Short-time spectrum with time/frequency reassignment.
pub struct ReassignedSpectrum {
    window: KaiserWindow,
    fft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex<f64>>,
    plain: Vec<Complex<f64>>,
    time_weighted: Vec<Complex<f64>>,
    derivative: Vec<Complex<f64>>,
}

impl std::fmt::Debug for ReassignedSpectrum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReassignedSpectrum")
            .field("window_len", &self.window.len())
            .field("fft_len", &self.plain.len())
            .finish()
    }
}

impl ReassignedSpectrum {
    /// Creates a spectrum for `window`. The transform length is the next
    /// power of two at least twice the window length.
    pub fn new(window: KaiserWindow) -> Self {
        let fft_len = (2 * window.len()).next_power_of_two();
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let zeros = vec![Complex::new(0.0, 0.0); fft_len];
        Self {
            window,
            fft,
            scratch,
            plain: zeros.clone(),
            time_weighted: zeros.clone(),
            derivative: zeros,
        }
    }

    /// The analysis window.
    pub fn window(&self) -> &KaiserWindow {
        &self.window
    }

    /// Transform length.
    pub fn fft_len(&self) -> usize {
        self.plain.len()
    }

    /// Transforms the frame of `samples` centred on sample index `centre`.
    ///
    /// Samples outside the buffer are taken as zero. The window centre is
    /// placed at transform index 0 so that phases refer to `centre`.
    pub fn transform(&mut self, samples: &[f64], centre: usize) {
        let n = self.plain.len();
        let half = self.window.half_length() as isize;
        let zero = Complex::new(0.0, 0.0);
        self.plain.fill(zero);
        self.time_weighted.fill(zero);
        self.derivative.fill(zero);

        let h = self.window.values();
        let th = self.window.time_weighted();
        let dh = self.window.derivative();

        for (k, offset) in (-half..=half).enumerate() {
            let index = centre as isize + offset;
            if index < 0 || index as usize >= samples.len() {
                continue;
            }
            let x = samples[index as usize];
            let slot = offset.rem_euclid(n as isize) as usize;
            self.plain[slot] = Complex::new(x * h[k], 0.0);
            self.time_weighted[slot] = Complex::new(x * th[k], 0.0);
            self.derivative[slot] = Complex::new(x * dh[k], 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.plain, &mut self.scratch);
        self.fft
            .process_with_scratch(&mut self.time_weighted, &mut self.scratch);
        self.fft
            .process_with_scratch(&mut self.derivative, &mut self.scratch);
    }

    /// Magnitude of bin `k`.
    pub fn magnitude(&self, k: usize) -> f64 {
        self.plain[k].norm()
    }

    /// Phase of bin `k`, referred to the frame centre.
    pub fn phase(&self, k: usize) -> f64 {
        self.plain[k].arg()
    }

    /// Reassigned frequency of bin `k`, in (fractional) bins.
    pub fn reassigned_bin(&self, k: usize) -> f64 {
        let x = self.plain[k];
        let power = x.norm_sqr();
        if power < MIN_POWER {
            return k as f64;
        }
        let correction = (self.derivative[k] * x.conj()).im / power;
        k as f64 - correction * self.fft_len() as f64 / std::f64::consts::TAU
    }

    /// Reassigned time of bin `k`, in samples relative to the frame centre.
    pub fn time_correction(&self, k: usize) -> f64 {
        let x = self.plain[k];
        let power = x.norm_sqr();
        if power < MIN_POWER {
            return 0.0;
        }
        (self.time_weighted[k] * x.conj()).re / power
    }

    /// Amplitude of a sinusoid whose energy peaks in bin `k` and whose true
    /// frequency is `reassigned_bin`, corrected for the window's main-lobe
    /// shape.
    pub fn corrected_amplitude(&self, k: usize, reassigned_bin: f64) -> f64 {
        let offset = (k as f64 - reassigned_bin) * std::f64::consts::TAU / self.fft_len() as f64;
        let gain = self.window.transform_magnitude(offset);
        if gain <= 0.0 {
            return 0.0;
        }
        2.0 * self.magnitude(k) / gain
    }

    /// Amplitude estimate for bin `k` assuming it sits on the main-lobe peak.
    pub fn uncorrected_amplitude(&self, k: usize) -> f64 {
        2.0 * self.magnitude(k) / self.window.sum()
    }
}
