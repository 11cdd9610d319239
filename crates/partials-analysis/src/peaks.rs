//! Spectral peak selection.
//!
//! Local magnitude maxima of a reassigned frame become either retained
//! peaks (candidates for Partial tracking) or rejected peaks, whose energy
//! is later attributed to the retained peaks as noise.

use partials_model::Breakpoint;

use crate::spectrum::ReassignedSpectrum;

/// Largest distance (bins) between a peak's bin and its reassigned
/// frequency. The magnitude maximum of a main lobe is always the bin
/// nearest the component's frequency; sidelobe and leakage maxima reassign
/// toward a main lobe elsewhere.
pub const MAX_REASSIGNMENT_BINS: f64 = 1.0;

/// Why a spectral peak was not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Quieter than the amplitude floor.
    BelowFloor,
    /// More than the window's sidelobe level below the frame's strongest
    /// peak.
    Sidelobe,
    /// Reassigned farther than [`MAX_REASSIGNMENT_BINS`] from its bin.
    Unreliable,
    /// Reassigned farther than the crop time from the frame centre.
    Cropped,
    /// Within the frequency resolution of a stronger peak.
    Thinned,
}

impl Rejection {
    /// True if the peak's parameters are trustworthy and it was dropped
    /// only to keep peaks apart in time or frequency.
    pub fn is_valid_component(self) -> bool {
        matches!(self, Rejection::Cropped | Rejection::Thinned)
    }

    /// True if the peak's energy belongs to the noise of the frame. Window
    /// leakage of a retained peak does not.
    pub fn is_noise(self) -> bool {
        self != Rejection::Sidelobe
    }
}

/// A peak that did not survive selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectedPeak {
    /// Parameters as far as they were estimated.
    pub peak: Breakpoint,
    /// Reason for rejection.
    pub reason: Rejection,
}

/// Peaks found in one frame.
#[derive(Debug, Clone, Default)]
pub struct FramePeaks {
    /// Retained peaks, in increasing frequency.
    pub retained: Vec<Breakpoint>,
    /// Everything else in the band.
    pub rejected: Vec<RejectedPeak>,
}

/// Peak selection thresholds, in analysis units.
#[derive(Debug, Clone)]
pub struct PeakSelector {
    sample_rate: f64,
    amp_floor: f64,
    sidelobe_ratio: f64,
    freq_floor: f64,
    freq_resolution: f64,
    crop_samples: f64,
}

impl PeakSelector {
    /// Creates a selector.
    ///
    /// `amp_floor_db` is in dB relative to full scale, `sidelobe_db` in
    /// positive dB below the frame's strongest peak and `crop_time` in
    /// seconds.
    pub fn new(
        sample_rate: f64,
        amp_floor_db: f64,
        sidelobe_db: f64,
        freq_floor: f64,
        freq_resolution: f64,
        crop_time: f64,
    ) -> Self {
        Self {
            sample_rate,
            amp_floor: 10f64.powf(amp_floor_db / 20.0),
            sidelobe_ratio: 10f64.powf(-sidelobe_db / 20.0),
            freq_floor,
            freq_resolution,
            crop_samples: crop_time * sample_rate,
        }
    }

    /// Selects the peaks of the frame currently held by `spectrum`, whose
    /// centre is sample `centre`.
    pub fn select(&self, spectrum: &ReassignedSpectrum, centre: usize) -> FramePeaks {
        let n = spectrum.fft_len();
        let bin_hz = self.sample_rate / n as f64;
        let nyquist = 0.5 * self.sample_rate;
        let frame_time = centre as f64 / self.sample_rate;

        let maxima: Vec<usize> = (1..n / 2)
            .filter(|&k| {
                let mag = spectrum.magnitude(k);
                mag > spectrum.magnitude(k - 1) && mag >= spectrum.magnitude(k + 1)
            })
            .collect();
        let strongest = maxima
            .iter()
            .map(|&k| spectrum.uncorrected_amplitude(k))
            .fold(0.0, f64::max);
        let leakage_floor = strongest * self.sidelobe_ratio;

        let mut frame = FramePeaks::default();
        let mut candidates = Vec::new();

        for k in maxima {
            let bin = spectrum.reassigned_bin(k);
            let frequency = bin * bin_hz;
            if frequency <= self.freq_floor || frequency >= nyquist {
                continue;
            }

            let rough = spectrum.uncorrected_amplitude(k);
            let reason = if rough < leakage_floor {
                Some(Rejection::Sidelobe)
            } else if (bin - k as f64).abs() > MAX_REASSIGNMENT_BINS {
                Some(Rejection::Unreliable)
            } else if rough < self.amp_floor {
                Some(Rejection::BelowFloor)
            } else {
                None
            };
            if let Some(reason) = reason {
                frame.rejected.push(RejectedPeak {
                    peak: Breakpoint::sinusoid(frame_time, k as f64 * bin_hz, rough),
                    reason,
                });
                continue;
            }

            let offset = spectrum.time_correction(k);
            let amplitude = spectrum.corrected_amplitude(k, bin);
            let omega = std::f64::consts::TAU * bin / n as f64;
            let phase = partials_model::phase::wrap_pi(spectrum.phase(k) + omega * offset);
            let time = ((centre as f64 + offset) / self.sample_rate).max(0.0);
            let peak = Breakpoint::new(time, frequency, amplitude, 0.0, phase);

            if offset.abs() > self.crop_samples {
                frame.rejected.push(RejectedPeak {
                    peak,
                    reason: Rejection::Cropped,
                });
            } else {
                candidates.push(peak);
            }
        }

        // strongest first; a peak survives if no stronger survivor is
        // within the frequency resolution
        candidates.sort_by(|a, b| b.amplitude.total_cmp(&a.amplitude));
        for peak in candidates {
            let crowded = frame
                .retained
                .iter()
                .any(|kept| (kept.frequency - peak.frequency).abs() < self.freq_resolution);
            if crowded {
                frame.rejected.push(RejectedPeak {
                    peak,
                    reason: Rejection::Thinned,
                });
            } else {
                frame.retained.push(peak);
            }
        }
        frame
            .retained
            .sort_by(|a, b| a.frequency.total_cmp(&b.frequency));
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::KaiserWindow;
    use std::f64::consts::PI;

    const SR: f64 = 44100.0;

    fn tones(parts: &[(f64, f64)], len: usize) -> Vec<f64> {
        (0..len)
            .map(|n| {
                parts
                    .iter()
                    .map(|&(f, a)| a * (2.0 * PI * f * n as f64 / SR).sin())
                    .sum()
            })
            .collect()
    }

    fn selector() -> PeakSelector {
        PeakSelector::new(SR, -90.0, 90.0, 100.0, 100.0, 0.005)
    }

    fn analyze(samples: &[f64], centre: usize) -> FramePeaks {
        let mut spectrum = ReassignedSpectrum::new(KaiserWindow::design(200.0, 90.0, SR));
        spectrum.transform(samples, centre);
        selector().select(&spectrum, centre)
    }

    #[test]
    fn test_single_sine_gives_one_retained_peak() {
        let samples = tones(&[(440.0, 0.5)], 8192);
        let frame = analyze(&samples, 4096);
        assert_eq!(frame.retained.len(), 1);
        let peak = frame.retained[0];
        assert!((peak.frequency - 440.0).abs() < 0.5);
        assert!((peak.amplitude - 0.5).abs() < 0.01);
        assert!((peak.time - 4096.0 / SR).abs() < 1e-4);
    }

    #[test]
    fn test_two_sines_are_sorted_by_frequency() {
        let samples = tones(&[(2000.0, 0.1), (600.0, 0.3)], 8192);
        let frame = analyze(&samples, 4096);
        assert_eq!(frame.retained.len(), 2);
        assert!(frame.retained[0].frequency < frame.retained[1].frequency);
    }

    #[test]
    fn test_quiet_signal_is_rejected_below_floor() {
        let samples = tones(&[(1000.0, 1e-6)], 8192);
        let frame = analyze(&samples, 4096);
        assert!(frame.retained.is_empty());
        assert!(frame
            .rejected
            .iter()
            .any(|r| r.reason == Rejection::BelowFloor));
    }

    #[test]
    fn test_peaks_below_frequency_floor_are_ignored() {
        let samples = tones(&[(60.0, 0.5)], 8192);
        let frame = analyze(&samples, 4096);
        assert!(frame.retained.iter().all(|p| p.frequency > 100.0));
    }

    #[test]
    fn test_valid_component_reasons() {
        assert!(Rejection::Thinned.is_valid_component());
        assert!(Rejection::Cropped.is_valid_component());
        assert!(!Rejection::BelowFloor.is_valid_component());
        assert!(!Rejection::Unreliable.is_valid_component());
        assert!(!Rejection::Sidelobe.is_valid_component());
        assert!(!Rejection::Sidelobe.is_noise());
        assert!(Rejection::Unreliable.is_noise());
    }

    #[test]
    fn test_leakage_around_loud_sine_is_not_retained() {
        for freq in [440.0, 1234.5, 5000.0] {
            let samples = tones(&[(freq, 0.5)], 16384);
            let frame = analyze(&samples, 8192);
            assert_eq!(frame.retained.len(), 1, "{} Hz: {:?}", freq, frame.retained);
            assert!((frame.retained[0].frequency - freq).abs() < 0.5);
            for r in &frame.rejected {
                assert!(r.peak.amplitude < 1e-3, "{:?}", r);
            }
        }
    }

    #[test]
    fn test_quiet_partner_below_sidelobe_level_is_leakage() {
        // 100 dB below the loud tone, yet above the absolute floor
        let samples = tones(&[(1000.0, 1.0), (3000.0, 1e-5)], 16384);
        let mut spectrum = ReassignedSpectrum::new(KaiserWindow::design(200.0, 90.0, SR));
        spectrum.transform(&samples, 8192);
        let frame = PeakSelector::new(SR, -120.0, 90.0, 100.0, 100.0, 0.005)
            .select(&spectrum, 8192);
        assert_eq!(frame.retained.len(), 1);
        let partner = frame
            .rejected
            .iter()
            .find(|r| (r.peak.frequency - 3000.0).abs() < 20.0)
            .unwrap();
        assert_eq!(partner.reason, Rejection::Sidelobe);
    }
}
