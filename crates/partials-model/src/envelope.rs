//! Time-varying scalar functions.
//!
//! Envelopes drive the morphing weights and hold the fundamental frequency
//! and amplitude estimates built during analysis. [`Envelope`] is object
//! safe; `Box<dyn Envelope>` clones by deep copy through
//! [`Envelope::duplicate`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{validate_finite, PartialsResult};

/// A function of time.
pub trait Envelope: fmt::Debug + Send + Sync {
    /// Evaluates the envelope at `time` (seconds).
    fn evaluate(&self, time: f64) -> f64;

    /// Returns an owned deep copy of this envelope.
    fn duplicate(&self) -> Box<dyn Envelope>;
}

impl Clone for Box<dyn Envelope> {
    fn clone(&self) -> Self {
        self.duplicate()
    }
}

impl Envelope for Box<dyn Envelope> {
    fn evaluate(&self, time: f64) -> f64 {
        (**self).evaluate(time)
    }

    fn duplicate(&self) -> Box<dyn Envelope> {
        (**self).duplicate()
    }
}

/// An envelope with the same value at every time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstantEnvelope(pub f64);

impl Envelope for ConstantEnvelope {
    fn evaluate(&self, _time: f64) -> f64 {
        self.0
    }

    fn duplicate(&self) -> Box<dyn Envelope> {
        Box::new(*self)
    }
}

/// Piecewise-linear envelope over (time, value) control points.
///
/// Values between points are linearly interpolated; outside the covered
/// range the nearest end value is held. An empty envelope evaluates to 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearEnvelope {
    points: Vec<(f64, f64)>,
}

impl LinearEnvelope {
    /// Creates an empty envelope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an envelope holding a single value everywhere.
    pub fn with_value(value: f64) -> Self {
        Self {
            points: vec![(0.0, value)],
        }
    }

    /// Creates an envelope from (time, value) points in any order.
    pub fn from_points<I>(points: I) -> PartialsResult<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut env = Self::new();
        for (time, value) in points {
            validate_finite("time", time)?;
            validate_finite("value", value)?;
            env.insert(time, value);
        }
        Ok(env)
    }

    /// Inserts a control point; an existing point at `time` is replaced.
    pub fn insert(&mut self, time: f64, value: f64) {
        let idx = self.points.partition_point(|&(t, _)| t < time);
        if idx < self.points.len() && self.points[idx].0 == time {
            self.points[idx].1 = value;
        } else {
            self.points.insert(idx, (time, value));
        }
    }

    /// Removes every control point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of control points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if there are no control points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The control points in time order.
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
}

impl Envelope for LinearEnvelope {
    fn evaluate(&self, time: f64) -> f64 {
        let n = self.points.len();
        if n == 0 {
            return 0.0;
        }
        let idx = self.points.partition_point(|&(t, _)| t <= time);
        if idx == 0 {
            return self.points[0].1;
        }
        if idx == n {
            return self.points[n - 1].1;
        }
        let (t0, v0) = self.points[idx - 1];
        let (t1, v1) = self.points[idx];
        v0 + (v1 - v0) * (time - t0) / (t1 - t0)
    }

    fn duplicate(&self) -> Box<dyn Envelope> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_envelope_is_zero() {
        assert_eq!(LinearEnvelope::new().evaluate(1.0), 0.0);
    }

    #[test]
    fn test_interpolates_and_holds_ends() {
        let env = LinearEnvelope::from_points([(1.0, 1.0), (0.0, 0.0)]).unwrap();
        assert_eq!(env.points(), &[(0.0, 0.0), (1.0, 1.0)]);
        assert_eq!(env.evaluate(-3.0), 0.0);
        assert_eq!(env.evaluate(0.25), 0.25);
        assert_eq!(env.evaluate(4.0), 1.0);
    }

    #[test]
    fn test_insert_replaces_existing_point() {
        let mut env = LinearEnvelope::with_value(2.0);
        env.insert(0.0, 5.0);
        assert_eq!(env.len(), 1);
        assert_eq!(env.evaluate(10.0), 5.0);
    }

    #[test]
    fn test_from_points_rejects_non_finite() {
        assert!(LinearEnvelope::from_points([(f64::NAN, 1.0)]).is_err());
    }

    #[test]
    fn test_boxed_clone_is_deep() {
        let boxed: Box<dyn Envelope> =
            Box::new(LinearEnvelope::from_points([(0.0, 0.0), (2.0, 1.0)]).unwrap());
        let copy = boxed.clone();
        drop(boxed);
        assert_eq!(copy.evaluate(1.0), 0.5);
        assert_eq!(ConstantEnvelope(0.3).duplicate().evaluate(9.0), 0.3);
    }
}
