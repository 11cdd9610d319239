//! Partials Transform
//!
//! Transformations of bandwidth-enhanced Partials:
//!
//! - [`reference`]: frequency reference envelopes drawn from analyzed
//!   Partials
//! - [`channelizer`]: harmonic labeling against a reference envelope
//! - [`distiller`]: collapsing each label to a single Partial
//! - [`morpher`]: interpolation between corresponding Partials of two
//!   sounds under time-varying weight envelopes
//! - [`resampler`]: regularization of breakpoint times onto a fixed grid
//!   with phase-consistent frequency correction
//!
//! # Example
//!
//! ```
//! use partials_model::{Breakpoint, LinearEnvelope, Partial};
//! use partials_transform::Morpher;
//!
//! let mut src = Partial::with_label(1);
//! src.insert(Breakpoint::sinusoid(0.0, 200.0, 0.5));
//! src.insert(Breakpoint::sinusoid(1.0, 200.0, 0.5));
//! let mut tgt = Partial::with_label(1);
//! tgt.insert(Breakpoint::sinusoid(0.0, 300.0, 0.5));
//! tgt.insert(Breakpoint::sinusoid(1.0, 300.0, 0.5));
//!
//! let weight = LinearEnvelope::from_points([(0.0, 0.0), (1.0, 1.0)]).unwrap();
//! let mut morpher = Morpher::new(&weight);
//! morpher.morph(&[src], &[tgt]);
//! let out = &morpher.partials()[0];
//! assert_eq!(out.frequency_at(0.0), 200.0);
//! assert_eq!(out.frequency_at(1.0), 300.0);
//! ```

pub mod channelizer;
pub mod distiller;
pub mod morpher;
pub mod reference;
pub mod resampler;

pub use channelizer::Channelizer;
pub use distiller::{Distiller, DistillerConfig};
pub use morpher::{Morpher, MorpherConfig};
pub use reference::create_freq_reference;
pub use resampler::{Resampler, ResamplerConfig};
