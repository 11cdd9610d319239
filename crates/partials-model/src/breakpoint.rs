//! Instantaneous samples of a Partial's parameter envelopes.

use serde::{Deserialize, Serialize};

/// One (time, frequency, amplitude, bandwidth, phase) sample of a Partial.
///
/// Bandwidth is the fraction of the breakpoint's energy that is noise-like
/// rather than sinusoidal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Time in seconds.
    pub time: f64,
    /// Frequency in Hz.
    pub frequency: f64,
    /// Linear amplitude.
    pub amplitude: f64,
    /// Noisiness in [0, 1].
    #[serde(default)]
    pub bandwidth: f64,
    /// Phase in radians.
    #[serde(default)]
    pub phase: f64,
}

impl Default for Breakpoint {
    fn default() -> Self {
        Self {
            time: 0.0,
            frequency: 0.0,
            amplitude: 0.0,
            bandwidth: 0.0,
            phase: 0.0,
        }
    }
}

impl Breakpoint {
    /// Creates a new breakpoint. Amplitude is clamped to be non-negative and
    /// bandwidth to [0, 1].
    pub fn new(time: f64, frequency: f64, amplitude: f64, bandwidth: f64, phase: f64) -> Self {
        Self {
            time,
            frequency,
            amplitude: amplitude.max(0.0),
            bandwidth: bandwidth.clamp(0.0, 1.0),
            phase,
        }
    }

    /// Creates a purely sinusoidal breakpoint with zero phase.
    pub fn sinusoid(time: f64, frequency: f64, amplitude: f64) -> Self {
        Self::new(time, frequency, amplitude, 0.0, 0.0)
    }

    /// Returns a copy of this breakpoint moved to `time`.
    pub fn at_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    /// Returns a copy of this breakpoint with the given amplitude.
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude.max(0.0);
        self
    }

    /// Returns a copy of this breakpoint with the given frequency.
    pub fn with_frequency(mut self, frequency: f64) -> Self {
        self.frequency = frequency;
        self
    }

    /// Sets the bandwidth, clamped to [0, 1].
    pub fn set_bandwidth(&mut self, bandwidth: f64) {
        self.bandwidth = bandwidth.clamp(0.0, 1.0);
    }

    /// Energy of the sinusoidal component.
    pub fn sinusoidal_energy(&self) -> f64 {
        self.amplitude * self.amplitude * (1.0 - self.bandwidth)
    }

    /// Energy of the noise component.
    pub fn noise_energy(&self) -> f64 {
        self.amplitude * self.amplitude * self.bandwidth
    }

    /// Adds noise energy to this breakpoint, raising its amplitude and
    /// bandwidth so the total energy is conserved.
    pub fn add_noise_energy(&mut self, energy: f64) {
        if energy <= 0.0 {
            return;
        }
        let total = self.amplitude * self.amplitude + energy;
        let noise = self.noise_energy() + energy;
        self.amplitude = total.sqrt();
        self.bandwidth = (noise / total).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_amplitude_and_bandwidth() {
        let bp = Breakpoint::new(0.1, 440.0, -0.5, 1.5, 0.0);
        assert_eq!(bp.amplitude, 0.0);
        assert_eq!(bp.bandwidth, 1.0);
    }

    #[test]
    fn test_add_noise_energy_conserves_energy() {
        let mut bp = Breakpoint::sinusoid(0.0, 100.0, 0.6);
        bp.add_noise_energy(0.64);
        assert!((bp.amplitude - 1.0).abs() < 1e-12);
        assert!((bp.bandwidth - 0.64).abs() < 1e-12);
        assert!((bp.sinusoidal_energy() - 0.36).abs() < 1e-12);
    }

    #[test]
    fn test_add_noise_energy_ignores_non_positive() {
        let mut bp = Breakpoint::sinusoid(0.0, 100.0, 0.5);
        bp.add_noise_energy(0.0);
        bp.add_noise_energy(-1.0);
        assert_eq!(bp, Breakpoint::sinusoid(0.0, 100.0, 0.5));
    }

    #[test]
    fn test_deserialize_defaults_bandwidth_and_phase() {
        let bp: Breakpoint =
            serde_json::from_str(r#"{"time":0.5,"frequency":220.0,"amplitude":0.1}"#).unwrap();
        assert_eq!(bp.bandwidth, 0.0);
        assert_eq!(bp.phase, 0.0);
    }
}
