//! Bandwidth-enhanced additive synthesis.
//!
//! Each Partial drives one oscillator whose carrier follows the Partial's
//! frequency and phase. The carrier amplitude is split by bandwidth into a
//! steady part and a part modulated by low-passed noise, so a breakpoint
//! with bandwidth 0 is a pure sinusoid and one with bandwidth 1 is a
//! narrow band of noise centred on its frequency.

use std::f64::consts::{PI, TAU};

use rand::Rng;
use rand_pcg::Pcg32;
use tracing::debug;

use partials_model::error::{validate_non_negative, validate_positive};
use partials_model::{Breakpoint, Partial, PartialsResult};

use crate::rng::create_partial_rng;

/// Default fade in and fade out time at Partial ends (s).
pub const DEFAULT_FADE_TIME: f64 = 0.001;

/// Cutoff of the noise modulator's low-pass filter (Hz).
pub const NOISE_CUTOFF: f64 = 500.0;

/// Renders Partials to a mono sample buffer.
///
/// # Example
/// ```
/// use partials_model::{Breakpoint, Partial};
/// use partials_synth::Synthesizer;
///
/// let mut partial = Partial::with_label(1);
/// partial.insert(Breakpoint::sinusoid(0.0, 440.0, 0.5));
/// partial.insert(Breakpoint::sinusoid(0.1, 440.0, 0.5));
///
/// let synth = Synthesizer::new(44100.0).unwrap();
/// let samples = synth.synthesize(&[partial], 4410);
/// assert_eq!(samples.len(), 4410);
/// assert!(samples.iter().all(|s| s.abs() <= 0.5 + 1e-9));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Synthesizer {
    sample_rate: f64,
    fade_time: f64,
    seed: u32,
}

/// One-pole low-passed uniform noise scaled to variance 1/2.
struct NoiseModulator {
    rng: Pcg32,
    coefficient: f64,
    gain: f64,
    state: f64,
}

impl NoiseModulator {
    fn new(rng: Pcg32, sample_rate: f64) -> Self {
        let coefficient = 1.0 - (-TAU * NOISE_CUTOFF / sample_rate).exp();
        // uniform noise on [-1, 1] has variance 1/3; the filter scales it
        // by k / (2 - k)
        let variance = coefficient / (3.0 * (2.0 - coefficient));
        Self {
            rng,
            coefficient,
            gain: (0.5 / variance).sqrt(),
            state: 0.0,
        }
    }

    fn next(&mut self) -> f64 {
        let white = 2.0 * self.rng.gen::<f64>() - 1.0;
        self.state += self.coefficient * (white - self.state);
        self.gain * self.state
    }
}

impl Synthesizer {
    /// Creates a synthesizer at `sample_rate` Hz with the default fade time
    /// and seed 0.
    pub fn new(sample_rate: f64) -> PartialsResult<Self> {
        validate_positive("sample_rate", sample_rate)?;
        Ok(Self {
            sample_rate,
            fade_time: DEFAULT_FADE_TIME,
            seed: 0,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn fade_time(&self) -> f64 {
        self.fade_time
    }

    /// Sets the time over which Partials fade in and out (s, ≥ 0).
    pub fn set_fade_time(&mut self, seconds: f64) -> PartialsResult<()> {
        validate_non_negative("fade_time", seconds)?;
        self.fade_time = seconds;
        Ok(())
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Sets the base seed of the noise generators.
    pub fn set_seed(&mut self, seed: u32) {
        self.seed = seed;
    }

    /// Renders `partials` into a new buffer of `num_samples` samples.
    pub fn synthesize(&self, partials: &[Partial], num_samples: usize) -> Vec<f64> {
        let mut buffer = vec![0.0; num_samples];
        for (index, partial) in partials.iter().enumerate() {
            self.render(partial, index as u32, &mut buffer);
        }
        debug!(
            partials = partials.len(),
            samples = num_samples,
            sample_rate = self.sample_rate,
            "synthesized"
        );
        buffer
    }

    /// Adds the Partial at position `index` of its collection to `buffer`.
    pub fn render(&self, partial: &Partial, index: u32, buffer: &mut [f64]) {
        let envelope = self.faded_breakpoints(partial);
        if envelope.len() < 2 {
            return;
        }
        let noisy = partial.iter().any(|bp| bp.bandwidth > 0.0);
        let rng = create_partial_rng(self.seed, index);
        let mut noise = NoiseModulator::new(rng, self.sample_rate);

        let mut phase = envelope[0].phase;
        for segment in envelope.windows(2) {
            let (b0, b1) = (&segment[0], &segment[1]);
            let duration = b1.time - b0.time;
            let slope = (b1.frequency - b0.frequency) / duration;

            let first = (b0.time * self.sample_rate).ceil().max(0.0) as usize;
            let end = ((b1.time * self.sample_rate).ceil().max(0.0) as usize).min(buffer.len());
            for (n, sample) in buffer.iter_mut().enumerate().take(end).skip(first) {
                let dt = n as f64 / self.sample_rate - b0.time;
                let alpha = dt / duration;
                let amplitude = b0.amplitude + (b1.amplitude - b0.amplitude) * alpha;
                let bandwidth = b0.bandwidth + (b1.bandwidth - b0.bandwidth) * alpha;
                let carrier =
                    (phase + TAU * (b0.frequency * dt + 0.5 * slope * dt * dt)).cos();

                let modulation = if noisy {
                    (1.0 - bandwidth).sqrt() + (2.0 * bandwidth).sqrt() * noise.next()
                } else {
                    1.0
                };
                *sample += amplitude * modulation * carrier;
            }
            phase += PI * (b0.frequency + b1.frequency) * duration;
        }
    }

    /// The Partial's breakpoints with silent breakpoints added one fade
    /// time before the start and after the end.
    fn faded_breakpoints(&self, partial: &Partial) -> Vec<Breakpoint> {
        let (Some(first), Some(last)) = (partial.first(), partial.last()) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(partial.len() + 2);
        if self.fade_time > 0.0 {
            let mut onset = *first;
            onset.time = first.time - self.fade_time;
            onset.amplitude = 0.0;
            onset.phase = first.phase - TAU * first.frequency * self.fade_time;
            out.push(onset);
        }
        out.extend(partial.iter().copied());
        if self.fade_time > 0.0 {
            let mut release = *last;
            release.time = last.time + self.fade_time;
            release.amplitude = 0.0;
            out.push(release);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f64 = 44100.0;

    fn steady(freq: f64, amp: f64, bandwidth: f64, start: f64, end: f64) -> Partial {
        let mut p = Partial::with_label(1);
        p.insert(Breakpoint::new(start, freq, amp, bandwidth, 0.0));
        p.insert(Breakpoint::new(end, freq, amp, bandwidth, 0.0));
        p
    }

    fn rms(samples: &[f64]) -> f64 {
        (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(Synthesizer::new(0.0).is_err());
        assert!(Synthesizer::new(f64::NAN).is_err());
        let mut synth = Synthesizer::new(SR).unwrap();
        assert!(synth.set_fade_time(-0.1).is_err());
        synth.set_fade_time(0.0).unwrap();
        assert_eq!(synth.fade_time(), 0.0);
    }

    #[test]
    fn test_sinusoid_rms_and_frequency() {
        let synth = Synthesizer::new(SR).unwrap();
        let out = synth.synthesize(&[steady(441.0, 0.5, 0.0, 0.0, 1.0)], 44100);
        let steady_part = &out[4410..39690];
        assert!((rms(steady_part) - 0.5 / 2f64.sqrt()).abs() < 0.005);

        // 441 Hz has exactly 100 samples per period
        let crossings = steady_part
            .windows(2)
            .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
            .count();
        assert!((crossings as i64 - 353).abs() <= 1);
    }

    #[test]
    fn test_phase_starts_at_first_breakpoint() {
        let mut synth = Synthesizer::new(SR).unwrap();
        synth.set_fade_time(0.0).unwrap();
        let mut p = Partial::new();
        p.insert(Breakpoint::new(0.0, 100.0, 1.0, 0.0, PI / 2.0));
        p.insert(Breakpoint::new(0.5, 100.0, 1.0, 0.0, 0.0));
        let out = synth.synthesize(&[p], 100);
        assert!(out[0].abs() < 1e-12);
    }

    #[test]
    fn test_silence_outside_partial_span() {
        let synth = Synthesizer::new(SR).unwrap();
        let out = synth.synthesize(&[steady(300.0, 0.5, 0.0, 0.5, 0.6)], 44100);
        let fade = (DEFAULT_FADE_TIME * SR) as usize + 1;
        assert!(out[..22050 - fade].iter().all(|&s| s == 0.0));
        assert!(out[26460 + fade..].iter().all(|&s| s == 0.0));
        assert!(rms(&out[22500..26000]) > 0.3);
    }

    #[test]
    fn test_noisy_partial_is_deterministic_per_seed() {
        let mut synth = Synthesizer::new(SR).unwrap();
        let partials = [steady(1000.0, 0.5, 0.8, 0.0, 0.2)];
        synth.set_seed(3);
        let a = synth.synthesize(&partials, 8820);
        let b = synth.synthesize(&partials, 8820);
        assert_eq!(a, b);
        synth.set_seed(4);
        let c = synth.synthesize(&partials, 8820);
        assert_ne!(a, c);
    }

    #[test]
    fn test_noisy_partial_keeps_energy() {
        let synth = Synthesizer::new(SR).unwrap();
        let out = synth.synthesize(&[steady(2000.0, 0.5, 1.0, 0.0, 2.0)], 88200);
        let level = rms(&out[4410..83790]);
        let expected = 0.5 / 2f64.sqrt();
        assert!((level - expected).abs() < 0.2 * expected, "rms {}", level);
    }

    #[test]
    fn test_dummy_and_empty_buffers() {
        let synth = Synthesizer::new(SR).unwrap();
        assert!(synth.synthesize(&[Partial::new()], 64).iter().all(|&s| s == 0.0));
        assert!(synth.synthesize(&[steady(100.0, 1.0, 0.0, 0.0, 1.0)], 0).is_empty());
    }
}
