//! Partials Model
//!
//! Core data types for the Reassigned Bandwidth-Enhanced Additive Sound
//! Model. A sound is represented as a collection of [`Partial`]s, each an
//! ordered sequence of [`Breakpoint`]s carrying synchronized frequency,
//! amplitude, bandwidth (noisiness) and phase.
//!
//! # Example
//!
//! ```
//! use partials_model::{Breakpoint, Envelope, LinearEnvelope, Partial};
//!
//! let mut partial = Partial::with_label(1);
//! partial.insert(Breakpoint::sinusoid(0.0, 440.0, 0.5));
//! partial.insert(Breakpoint::sinusoid(1.0, 445.0, 0.25));
//! assert_eq!(partial.frequency_at(0.5), 442.5);
//!
//! let weight = LinearEnvelope::from_points([(0.0, 0.0), (1.0, 1.0)]).unwrap();
//! assert_eq!(weight.evaluate(0.25), 0.25);
//! ```
//!
//! # Modules
//!
//! - [`breakpoint`]: Instantaneous parameter samples
//! - [`partial`]: Partials and their interpolation rules
//! - [`collection`]: Partial collections and JSON persistence
//! - [`envelope`]: The Envelope capability and piecewise-linear envelopes
//! - [`phase`]: Frequency/phase consistency corrections
//! - [`view`]: Lazy transformed views over Partials
//! - [`error`]: Error type and parameter validation

pub mod breakpoint;
pub mod collection;
pub mod envelope;
pub mod error;
pub mod partial;
pub mod phase;
pub mod view;

// Re-export commonly used types at the crate root
pub use breakpoint::Breakpoint;
pub use collection::{PartialList, PartialsDocument};
pub use envelope::{ConstantEnvelope, Envelope, LinearEnvelope};
pub use error::{PartialsError, PartialsResult};
pub use partial::Partial;
pub use view::BreakpointView;
