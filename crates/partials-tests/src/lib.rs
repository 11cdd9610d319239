//! Partials End-to-End Test Infrastructure
//!
//! Integration tests for flows that cross crate boundaries:
//!
//! - Analysis: samples -> Partials, checked against known signals
//! - Resynthesis: Partials -> samples, checked by level
//! - Transformation: labeling, morphing and resampling invariants
//! - CLI: WAV and JSON files through the command implementations
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p partials-tests
//! ```

pub mod fixtures;
pub mod signals;

pub use fixtures::WorkDir;
pub use signals::{harmonic_tone, noise, rms, sine};

use partials_model::Partial;

/// True if every Partial's breakpoint times strictly increase.
pub fn times_strictly_increase(partials: &[Partial]) -> bool {
    partials.iter().all(|p| {
        p.breakpoints()
            .windows(2)
            .all(|w| w[1].time > w[0].time)
    })
}
