//! Partials: labeled, time-ordered sequences of Breakpoints.
//!
//! Between breakpoints every parameter is linearly interpolated in time,
//! except phase, which is reproduced by integrating the interpolated
//! frequency from the nearest preceding breakpoint.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::breakpoint::Breakpoint;
use crate::error::{PartialsError, PartialsResult};
use crate::phase::wrap_pi;

/// A bandwidth-enhanced sinusoidal track.
///
/// Breakpoint times are strictly increasing. A Partial without breakpoints
/// is a dummy Partial and represents silence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PartialData", into = "PartialData")]
pub struct Partial {
    label: u32,
    breakpoints: Vec<Breakpoint>,
}

/// Serialized form of a Partial, validated on the way in.
#[derive(Serialize, Deserialize)]
struct PartialData {
    #[serde(default)]
    label: u32,
    #[serde(default)]
    breakpoints: Vec<Breakpoint>,
}

impl TryFrom<PartialData> for Partial {
    type Error = PartialsError;

    fn try_from(data: PartialData) -> PartialsResult<Self> {
        Partial::from_breakpoints(data.label, data.breakpoints)
    }
}

impl From<Partial> for PartialData {
    fn from(partial: Partial) -> Self {
        Self {
            label: partial.label,
            breakpoints: partial.breakpoints,
        }
    }
}

impl Partial {
    /// Creates an unlabeled dummy Partial.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dummy Partial with the given label.
    pub fn with_label(label: u32) -> Self {
        Self {
            label,
            breakpoints: Vec::new(),
        }
    }

    /// Creates a Partial from breakpoints that must already be in strictly
    /// increasing time order with finite, non-negative times.
    pub fn from_breakpoints(label: u32, breakpoints: Vec<Breakpoint>) -> PartialsResult<Self> {
        for (i, bp) in breakpoints.iter().enumerate() {
            if !bp.time.is_finite() || bp.time < 0.0 {
                return Err(PartialsError::invalid_argument(
                    "breakpoints",
                    format!("breakpoint {} has invalid time {}", i, bp.time),
                ));
            }
            if !(bp.frequency.is_finite() && bp.amplitude.is_finite() && bp.phase.is_finite()) {
                return Err(PartialsError::invalid_argument(
                    "breakpoints",
                    format!("breakpoint {} has non-finite parameters", i),
                ));
            }
            if bp.amplitude < 0.0 || !(0.0..=1.0).contains(&bp.bandwidth) {
                return Err(PartialsError::invalid_argument(
                    "breakpoints",
                    format!(
                        "breakpoint {} has amplitude {} / bandwidth {} out of range",
                        i, bp.amplitude, bp.bandwidth
                    ),
                ));
            }
        }
        if let Some(i) = breakpoints.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(PartialsError::invalid_argument(
                "breakpoints",
                format!("breakpoint times must strictly increase (index {})", i + 1),
            ));
        }
        Ok(Self { label, breakpoints })
    }

    /// Returns the label (0 means unlabeled).
    pub fn label(&self) -> u32 {
        self.label
    }

    /// Sets the label.
    pub fn set_label(&mut self, label: u32) {
        self.label = label;
    }

    /// Number of breakpoints.
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// True if this Partial has no breakpoints.
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// True if this is a dummy Partial (no breakpoints).
    pub fn is_dummy(&self) -> bool {
        self.is_empty()
    }

    /// The breakpoints in time order.
    pub fn breakpoints(&self) -> &[Breakpoint] {
        &self.breakpoints
    }

    /// Iterates over the breakpoints in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.breakpoints.iter()
    }

    /// First breakpoint, if any.
    pub fn first(&self) -> Option<&Breakpoint> {
        self.breakpoints.first()
    }

    /// Last breakpoint, if any.
    pub fn last(&self) -> Option<&Breakpoint> {
        self.breakpoints.last()
    }

    /// Time of the first breakpoint.
    pub fn start_time(&self) -> Option<f64> {
        self.first().map(|bp| bp.time)
    }

    /// Time of the last breakpoint.
    pub fn end_time(&self) -> Option<f64> {
        self.last().map(|bp| bp.time)
    }

    /// Time span covered by the breakpoints (0 for dummy Partials).
    pub fn duration(&self) -> f64 {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => end - start,
            _ => 0.0,
        }
    }

    /// True if `time` lies within `[start_time, end_time]`.
    pub fn contains_time(&self, time: f64) -> bool {
        match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => start <= time && time <= end,
            _ => false,
        }
    }

    /// Inserts a breakpoint, keeping time order. A breakpoint already at the
    /// same time is replaced. Appending at the end is O(1).
    pub fn insert(&mut self, bp: Breakpoint) {
        match self.breakpoints.last() {
            None => self.breakpoints.push(bp),
            Some(last) if bp.time > last.time => self.breakpoints.push(bp),
            _ => {
                let idx = self.breakpoints.partition_point(|b| b.time < bp.time);
                if idx < self.breakpoints.len() && self.breakpoints[idx].time == bp.time {
                    self.breakpoints[idx] = bp;
                } else {
                    self.breakpoints.insert(idx, bp);
                }
            }
        }
    }

    /// Removes every breakpoint, leaving a dummy Partial with the same label.
    pub fn clear(&mut self) {
        self.breakpoints.clear();
    }

    /// Applies `f` to every breakpoint. Times are not allowed to change; any
    /// modification of `time` inside `f` is discarded.
    pub fn update_parameters<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, &mut Breakpoint),
    {
        for (i, bp) in self.breakpoints.iter_mut().enumerate() {
            let time = bp.time;
            f(i, bp);
            bp.time = time;
            bp.amplitude = bp.amplitude.max(0.0);
            bp.bandwidth = bp.bandwidth.clamp(0.0, 1.0);
        }
    }

    /// Locates `time` relative to the breakpoints.
    fn locate(&self, time: f64) -> Location {
        let n = self.breakpoints.len();
        if n == 0 {
            return Location::Empty;
        }
        let idx = self.breakpoints.partition_point(|bp| bp.time <= time);
        if idx == 0 {
            Location::Before
        } else if idx == n {
            Location::After
        } else if self.breakpoints[idx - 1].time == time {
            Location::Exact(idx - 1)
        } else {
            let b0 = &self.breakpoints[idx - 1];
            let b1 = &self.breakpoints[idx];
            let alpha = (time - b0.time) / (b1.time - b0.time);
            Location::Between(idx - 1, alpha)
        }
    }

    fn interpolate<F>(&self, time: f64, param: F) -> f64
    where
        F: Fn(&Breakpoint) -> f64,
    {
        match self.locate(time) {
            Location::Empty => 0.0,
            Location::Before => param(&self.breakpoints[0]),
            Location::After => param(&self.breakpoints[self.breakpoints.len() - 1]),
            Location::Exact(i) => param(&self.breakpoints[i]),
            Location::Between(i, alpha) => {
                let v0 = param(&self.breakpoints[i]);
                let v1 = param(&self.breakpoints[i + 1]);
                v0 + alpha * (v1 - v0)
            }
        }
    }

    /// Frequency at `time`, clamped to the end values outside the span.
    pub fn frequency_at(&self, time: f64) -> f64 {
        self.interpolate(time, |bp| bp.frequency)
    }

    /// Amplitude at `time`, clamped to the end values outside the span.
    pub fn amplitude_at(&self, time: f64) -> f64 {
        self.interpolate(time, |bp| bp.amplitude)
    }

    /// Bandwidth at `time`, clamped to the end values outside the span.
    pub fn bandwidth_at(&self, time: f64) -> f64 {
        self.interpolate(time, |bp| bp.bandwidth)
    }

    /// Amplitude at `time`, ramping linearly to zero over `fade_time`
    /// seconds beyond either end of the span.
    pub fn amplitude_at_with_fade(&self, time: f64, fade_time: f64) -> f64 {
        let (start, end) = match (self.start_time(), self.end_time()) {
            (Some(start), Some(end)) => (start, end),
            _ => return 0.0,
        };
        let outside = if time < start {
            start - time
        } else if time > end {
            time - end
        } else {
            return self.amplitude_at(time);
        };
        if fade_time <= 0.0 || outside >= fade_time {
            return 0.0;
        }
        self.amplitude_at(time) * (1.0 - outside / fade_time)
    }

    /// Phase at `time`, obtained by integrating the interpolated frequency.
    pub fn phase_at(&self, time: f64) -> f64 {
        match self.locate(time) {
            Location::Empty => 0.0,
            Location::Exact(i) => self.breakpoints[i].phase,
            Location::Before => {
                let bp = &self.breakpoints[0];
                wrap_pi(bp.phase - 2.0 * PI * bp.frequency * (bp.time - time))
            }
            Location::After => {
                let bp = &self.breakpoints[self.breakpoints.len() - 1];
                wrap_pi(bp.phase + 2.0 * PI * bp.frequency * (time - bp.time))
            }
            Location::Between(i, _) => {
                let b0 = &self.breakpoints[i];
                let b1 = &self.breakpoints[i + 1];
                let dt = time - b0.time;
                let slope = (b1.frequency - b0.frequency) / (b1.time - b0.time);
                let travel = 2.0 * PI * (b0.frequency * dt + 0.5 * slope * dt * dt);
                wrap_pi(b0.phase + travel)
            }
        }
    }

    /// All parameters at `time` as a Breakpoint located at `time`.
    ///
    /// Outside the span the end breakpoint's parameters are used, with phase
    /// extrapolated at constant frequency. A dummy Partial yields a silent
    /// breakpoint.
    pub fn parameters_at(&self, time: f64) -> Breakpoint {
        match self.locate(time) {
            Location::Empty => Breakpoint::default().at_time(time),
            Location::Exact(i) => self.breakpoints[i],
            _ => Breakpoint::new(
                time,
                self.frequency_at(time),
                self.amplitude_at(time),
                self.bandwidth_at(time),
                self.phase_at(time),
            ),
        }
    }

    /// Returns the breakpoint at exactly `time`, if there is one.
    pub fn breakpoint_at(&self, time: f64) -> Option<&Breakpoint> {
        match self.locate(time) {
            Location::Exact(i) => Some(&self.breakpoints[i]),
            _ => None,
        }
    }

    pub(crate) fn breakpoints_mut(&mut self) -> &mut [Breakpoint] {
        &mut self.breakpoints
    }
}

impl<'a> IntoIterator for &'a Partial {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy)]
enum Location {
    Empty,
    Before,
    After,
    Exact(usize),
    Between(usize, f64),
}
