//! Frame-to-frame peak tracking.
//!
//! Active Partials are extended by the closest peak of each new frame.
//! Matching is global and greedy: all (Partial, peak) pairs within the
//! drift limit are considered together, closest first. A Partial that finds
//! no peak in a frame is finished.
//!
//! Reassignment can move a peak to or before the last breakpoint of the
//! Partial it continues. Such a peak keeps the Partial alive but adds no
//! breakpoint, so breakpoint times always strictly increase.

use partials_model::{Breakpoint, Envelope, Partial};
use tracing::trace;

/// Links per-frame peaks into Partials.
#[derive(Debug)]
pub struct PartialBuilder {
    freq_drift: f64,
    reference: Option<Box<dyn Envelope>>,
    active: Vec<Partial>,
    finished: Vec<Partial>,
}

struct Pairing {
    distance: f64,
    amplitude: f64,
    candidate: usize,
    peak: usize,
}

impl PartialBuilder {
    /// Creates a builder that lets frequencies drift by at most
    /// `freq_drift` Hz between frames.
    pub fn new(freq_drift: f64) -> Self {
        Self {
            freq_drift,
            reference: None,
            active: Vec::new(),
            finished: Vec::new(),
        }
    }

    /// Creates a builder whose frequency predictions follow `reference`.
    pub fn with_reference(freq_drift: f64, reference: &dyn Envelope) -> Self {
        Self {
            reference: Some(reference.duplicate()),
            ..Self::new(freq_drift)
        }
    }

    /// Number of Partials still being extended.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    fn predicted_frequency(&self, last: &Breakpoint, time: f64) -> f64 {
        match &self.reference {
            Some(reference) => {
                let then = reference.evaluate(last.time);
                let now = reference.evaluate(time);
                if then > 0.0 && now > 0.0 {
                    last.frequency * now / then
                } else {
                    last.frequency
                }
            }
            None => last.frequency,
        }
    }

    /// Extends the active Partials with the peaks of one frame.
    pub fn build_frame(&mut self, peaks: &[Breakpoint]) {
        let mut pairings = Vec::new();
        for (candidate, partial) in self.active.iter().enumerate() {
            let Some(last) = partial.last() else {
                continue;
            };
            for (index, peak) in peaks.iter().enumerate() {
                let distance = (peak.frequency - self.predicted_frequency(last, peak.time)).abs();
                if distance <= self.freq_drift {
                    pairings.push(Pairing {
                        distance,
                        amplitude: peak.amplitude,
                        candidate,
                        peak: index,
                    });
                }
            }
        }

        // closest first, then the louder peak, then the older Partial
        pairings.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(b.amplitude.total_cmp(&a.amplitude))
                .then(a.candidate.cmp(&b.candidate))
        });

        let mut candidate_used = vec![false; self.active.len()];
        let mut peak_used = vec![false; peaks.len()];
        for pairing in &pairings {
            if candidate_used[pairing.candidate] || peak_used[pairing.peak] {
                continue;
            }
            candidate_used[pairing.candidate] = true;
            peak_used[pairing.peak] = true;
            let partial = &mut self.active[pairing.candidate];
            let peak = peaks[pairing.peak];
            if partial.last().map_or(true, |last| peak.time > last.time) {
                partial.insert(peak);
            }
        }

        let previous = std::mem::take(&mut self.active);
        let mut closed = 0usize;
        for (partial, used) in previous.into_iter().zip(candidate_used) {
            if used {
                self.active.push(partial);
            } else {
                closed += 1;
                self.finished.push(partial);
            }
        }

        let mut spawned = 0usize;
        for (peak, used) in peaks.iter().zip(peak_used) {
            if !used {
                let mut partial = Partial::new();
                partial.insert(*peak);
                self.active.push(partial);
                spawned += 1;
            }
        }
        trace!(
            peaks = peaks.len(),
            closed,
            spawned,
            active = self.active.len(),
            "tracked frame"
        );
    }

    /// Closes every active Partial and returns all Partials built so far,
    /// in the order they were finished.
    pub fn finish(mut self) -> Vec<Partial> {
        self.finished.append(&mut self.active);
        self.finished
    }
}
