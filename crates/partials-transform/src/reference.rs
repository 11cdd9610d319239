//! Frequency reference envelopes drawn from analyzed Partials.
//!
//! Channelizing needs a reference envelope that follows one harmonic of
//! the sound. Either the Analyzer's fundamental envelope or the frequency
//! of a prominent Partial serves; [`create_freq_reference`] builds the
//! latter.

use partials_model::error::{validate_non_negative, validate_positive};
use partials_model::{LinearEnvelope, Partial, PartialsError, PartialsResult};
use tracing::debug;

/// Spacing of reference samples when no count is requested (s).
pub const DEFAULT_SAMPLE_INTERVAL: f64 = 0.03;

/// Fewest samples taken when no count is requested.
pub const MIN_SAMPLES: usize = 10;

/// Samples the frequency of the longest Partial whose frequency at its
/// loudest breakpoint lies in `[fmin, fmax]`.
///
/// Without `num_samples`, the Partial is sampled every
/// [`DEFAULT_SAMPLE_INTERVAL`] seconds, and never fewer than
/// [`MIN_SAMPLES`] times.
///
/// # Example
/// ```
/// use partials_model::{Breakpoint, Envelope, Partial};
/// use partials_transform::create_freq_reference;
///
/// let mut fundamental = Partial::new();
/// fundamental.insert(Breakpoint::sinusoid(0.0, 200.0, 0.5));
/// fundamental.insert(Breakpoint::sinusoid(1.0, 220.0, 0.5));
///
/// let reference = create_freq_reference(&[fundamental], 100.0, 300.0, None).unwrap();
/// assert!((reference.evaluate(0.5) - 210.0).abs() < 1e-9);
/// ```
pub fn create_freq_reference(
    partials: &[Partial],
    fmin: f64,
    fmax: f64,
    num_samples: Option<usize>,
) -> PartialsResult<LinearEnvelope> {
    validate_non_negative("fmin", fmin)?;
    validate_positive("fmax", fmax)?;
    if fmin >= fmax {
        return Err(PartialsError::invalid_argument(
            "fmax",
            format!("must exceed fmin ({} >= {})", fmin, fmax),
        ));
    }
    if num_samples == Some(0) {
        return Err(PartialsError::invalid_argument(
            "num_samples",
            "at least one sample is required",
        ));
    }

    let longest = partials
        .iter()
        .filter(|p| {
            p.iter()
                .max_by(|a, b| a.amplitude.total_cmp(&b.amplitude))
                .is_some_and(|loudest| (fmin..=fmax).contains(&loudest.frequency))
        })
        .fold(None::<&Partial>, |best, p| match best {
            Some(b) if b.duration() >= p.duration() => Some(b),
            _ => Some(p),
        })
        .ok_or_else(|| {
            PartialsError::invalid_argument(
                "partials",
                format!("no Partial is loudest between {} and {} Hz", fmin, fmax),
            )
        })?;

    let (Some(start), Some(end)) = (longest.start_time(), longest.end_time()) else {
        return Err(PartialsError::invalid_argument("partials", "empty reference Partial"));
    };
    let duration = end - start;
    let count = num_samples.unwrap_or_else(|| {
        ((duration / DEFAULT_SAMPLE_INTERVAL).ceil() as usize + 1).max(MIN_SAMPLES)
    });

    let mut reference = LinearEnvelope::new();
    if count == 1 || duration == 0.0 {
        reference.insert(start, longest.frequency_at(start));
    } else {
        let step = duration / (count - 1) as f64;
        for i in 0..count {
            let time = if i + 1 == count { end } else { start + step * i as f64 };
            reference.insert(time, longest.frequency_at(time));
        }
    }
    debug!(
        start,
        end,
        samples = reference.len(),
        "built frequency reference"
    );
    Ok(reference)
}
