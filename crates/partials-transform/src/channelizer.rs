//! Harmonic labeling of Partials.
//!
//! The spectrum is split into channels whose centre frequencies follow a
//! reference envelope: channel `k` is centred on `k / reference_label` times
//! the reference frequency. Each Partial is labeled with the channel that
//! best fits its frequency envelope, so the Partials of a harmonic sound
//! end up labeled with their harmonic numbers and can be paired by the
//! Morpher.

use partials_model::{Envelope, Partial, PartialsError, PartialsResult};
use tracing::debug;

/// Labels Partials by their frequency relative to a reference envelope.
///
/// # Example
/// ```
/// use partials_model::{Breakpoint, ConstantEnvelope, Partial};
/// use partials_transform::Channelizer;
///
/// let mut third = Partial::new();
/// third.insert(Breakpoint::sinusoid(0.0, 598.0, 0.2));
/// third.insert(Breakpoint::sinusoid(0.5, 603.0, 0.2));
///
/// let channelizer = Channelizer::new(&ConstantEnvelope(200.0), 1).unwrap();
/// let mut partials = vec![third];
/// channelizer.channelize(&mut partials);
/// assert_eq!(partials[0].label(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Channelizer {
    reference: Box<dyn Envelope>,
    reference_label: u32,
}

impl Channelizer {
    /// Creates a Channelizer whose channel `reference_label` is centred on
    /// `reference`. The label must be positive.
    pub fn new(reference: &dyn Envelope, reference_label: u32) -> PartialsResult<Self> {
        if reference_label == 0 {
            return Err(PartialsError::invalid_argument(
                "reference_label",
                "must be a positive channel number",
            ));
        }
        Ok(Self {
            reference: reference.duplicate(),
            reference_label,
        })
    }

    pub fn reference(&self) -> &dyn Envelope {
        self.reference.as_ref()
    }

    pub fn reference_label(&self) -> u32 {
        self.reference_label
    }

    /// Channel that best fits `partial`: the nearest integer to the
    /// amplitude-weighted mean ratio of its frequency to the channel
    /// spacing. Breakpoints where the reference is not positive are
    /// skipped; a Partial with none left, or fitting below half the
    /// spacing, gets channel 0.
    pub fn channel_of(&self, partial: &Partial) -> u32 {
        let mut weighted = 0.0;
        let mut weight = 0.0;
        let mut plain = 0.0;
        let mut count = 0usize;
        for bp in partial.iter() {
            let spacing = self.reference.evaluate(bp.time) / self.reference_label as f64;
            if spacing.is_nan() || spacing <= 0.0 {
                continue;
            }
            let ratio = bp.frequency / spacing;
            weighted += bp.amplitude * ratio;
            weight += bp.amplitude;
            plain += ratio;
            count += 1;
        }

        let mean = if weight > 0.0 {
            weighted / weight
        } else if count > 0 {
            plain / count as f64
        } else {
            return 0;
        };
        mean.round().max(0.0) as u32
    }

    /// Labels every Partial in `partials` with its channel.
    pub fn channelize(&self, partials: &mut [Partial]) {
        let mut unlabeled = 0usize;
        for partial in partials.iter_mut() {
            let channel = self.channel_of(partial);
            if channel == 0 {
                unlabeled += 1;
            }
            partial.set_label(channel);
        }
        debug!(
            partials = partials.len(),
            unlabeled,
            reference_label = self.reference_label,
            "channelized"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use partials_model::{Breakpoint, ConstantEnvelope, LinearEnvelope};
    use pretty_assertions::assert_eq;

    fn track(points: &[(f64, f64, f64)]) -> Partial {
        let mut p = Partial::new();
        for &(t, f, a) in points {
            p.insert(Breakpoint::sinusoid(t, f, a));
        }
        p
    }

    fn steady(freq: f64) -> Partial {
        track(&[(0.0, freq, 0.3), (0.5, freq, 0.3)])
    }

    #[test]
    fn test_harmonics_get_their_numbers() {
        let channelizer = Channelizer::new(&ConstantEnvelope(220.0), 1).unwrap();
        let mut partials: Vec<Partial> = [660.0, 221.0, 1095.0, 445.0].map(steady).to_vec();
        channelizer.channelize(&mut partials);
        let labels: Vec<u32> = partials.iter().map(Partial::label).collect();
        assert_eq!(labels, vec![3, 1, 5, 2]);
    }

    #[test]
    fn test_reference_label_scales_channels() {
        // the reference follows the second harmonic of a 150 Hz tone
        let channelizer = Channelizer::new(&ConstantEnvelope(300.0), 2).unwrap();
        assert_eq!(channelizer.channel_of(&steady(150.0)), 1);
        assert_eq!(channelizer.channel_of(&steady(450.0)), 3);
    }

    #[test]
    fn test_channels_follow_a_gliding_reference() {
        let reference = LinearEnvelope::from_points([(0.0, 100.0), (1.0, 200.0)]).unwrap();
        let channelizer = Channelizer::new(&reference, 1).unwrap();
        let fourth = track(&[(0.0, 400.0, 0.2), (0.5, 600.0, 0.2), (1.0, 800.0, 0.2)]);
        assert_eq!(channelizer.channel_of(&fourth), 4);
    }

    #[test]
    fn test_fit_is_amplitude_weighted() {
        let channelizer = Channelizer::new(&ConstantEnvelope(100.0), 1).unwrap();
        // loud at 300 Hz, one quiet stray breakpoint at 900 Hz
        let p = track(&[(0.0, 300.0, 0.5), (0.1, 300.0, 0.5), (0.2, 900.0, 0.001)]);
        assert_eq!(channelizer.channel_of(&p), 3);
        // silent breakpoints fall back to an unweighted mean
        let silent = track(&[(0.0, 200.0, 0.0), (0.1, 400.0, 0.0)]);
        assert_eq!(channelizer.channel_of(&silent), 3);
    }

    #[test]
    fn test_subharmonic_and_unreferenced_partials_are_unlabeled() {
        let channelizer = Channelizer::new(&ConstantEnvelope(400.0), 1).unwrap();
        assert_eq!(channelizer.channel_of(&steady(150.0)), 0);
        assert_eq!(channelizer.channel_of(&Partial::new()), 0);

        let silent_reference = Channelizer::new(&ConstantEnvelope(0.0), 1).unwrap();
        let mut partials = vec![Partial::with_label(7)];
        partials[0].insert(Breakpoint::sinusoid(0.0, 440.0, 0.1));
        silent_reference.channelize(&mut partials);
        assert_eq!(partials[0].label(), 0);
    }

    #[test]
    fn test_zero_reference_label_is_rejected() {
        let err = Channelizer::new(&ConstantEnvelope(100.0), 0).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_clone_owns_its_reference() {
        let reference = LinearEnvelope::from_points([(0.0, 100.0)]).unwrap();
        let channelizer = Channelizer::new(&reference, 1).unwrap();
        let copy = channelizer.clone();
        drop(channelizer);
        assert_eq!(copy.reference().evaluate(3.0), 100.0);
        assert_eq!(copy.reference_label(), 1);
    }
}
