//! Collapsing each label to a single Partial.
//!
//! After channelizing, a label usually owns several fragments of one
//! harmonic. The Distiller joins them into one Partial per label so the
//! Morpher can pair labels one to one. Where fragments overlap in time the
//! more energetic fragment is kept and the others' energy is absorbed into
//! it as noise. Fragments that follow each other are joined through short
//! fades to and from silence.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use partials_model::error::validate_positive;
use partials_model::phase::wrap_pi;
use partials_model::{Breakpoint, Partial, PartialList, PartialsResult};
use tracing::debug;

/// Default fade to and from silence between joined fragments (s).
pub const DEFAULT_FADE_TIME: f64 = 0.001;

/// Default silence kept between joined fragments (s).
pub const DEFAULT_GAP_TIME: f64 = 0.0001;

/// Serializable Distiller settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistillerConfig {
    /// Fade time at fragment junctions (s).
    #[serde(default = "default_fade_time")]
    pub fade_time: f64,
    /// Minimum silence between a fade out and the next fade in (s).
    #[serde(default = "default_gap_time")]
    pub gap_time: f64,
}

fn default_fade_time() -> f64 {
    DEFAULT_FADE_TIME
}

fn default_gap_time() -> f64 {
    DEFAULT_GAP_TIME
}

impl Default for DistillerConfig {
    fn default() -> Self {
        Self {
            fade_time: DEFAULT_FADE_TIME,
            gap_time: DEFAULT_GAP_TIME,
        }
    }
}

impl DistillerConfig {
    /// Checks every parameter against its domain.
    pub fn validate(&self) -> PartialsResult<()> {
        validate_positive("fade_time", self.fade_time)?;
        validate_positive("gap_time", self.gap_time)
    }
}

/// Distills labeled Partials into one Partial per label.
///
/// # Example
/// ```
/// use partials_model::{Breakpoint, Partial};
/// use partials_transform::Distiller;
///
/// let mut early = Partial::with_label(1);
/// early.insert(Breakpoint::sinusoid(0.0, 200.0, 0.5));
/// early.insert(Breakpoint::sinusoid(0.1, 200.0, 0.5));
/// let mut late = Partial::with_label(1);
/// late.insert(Breakpoint::sinusoid(0.2, 201.0, 0.4));
/// late.insert(Breakpoint::sinusoid(0.3, 201.0, 0.4));
///
/// let mut partials = vec![early, late];
/// Distiller::new().distill(&mut partials);
/// assert_eq!(partials.len(), 1);
/// assert_eq!(partials[0].amplitude_at(0.15), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distiller {
    config: DistillerConfig,
}

impl Default for Distiller {
    fn default() -> Self {
        Self::new()
    }
}

/// A run of breakpoints taken from one fragment.
struct Piece {
    breakpoints: Vec<Breakpoint>,
}

impl Piece {
    fn start(&self) -> f64 {
        self.breakpoints[0].time
    }

    fn end(&self) -> f64 {
        self.breakpoints[self.breakpoints.len() - 1].time
    }
}

impl Distiller {
    /// Creates a Distiller with the default fade and gap times.
    pub fn new() -> Self {
        Self {
            config: DistillerConfig::default(),
        }
    }

    /// Creates a Distiller from a configuration.
    pub fn from_config(config: DistillerConfig) -> PartialsResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> DistillerConfig {
        self.config
    }

    pub fn fade_time(&self) -> f64 {
        self.config.fade_time
    }

    pub fn gap_time(&self) -> f64 {
        self.config.gap_time
    }

    /// Replaces `partials` with one Partial per non-zero label, in
    /// increasing label order, followed by the unlabeled Partials
    /// unchanged. Dummy Partials are dropped.
    pub fn distill(&self, partials: &mut PartialList) {
        let before = partials.len();
        let mut groups: BTreeMap<u32, Vec<Partial>> = BTreeMap::new();
        let mut unlabeled = Vec::new();
        for partial in std::mem::take(partials) {
            if partial.is_dummy() {
                continue;
            }
            match partial.label() {
                0 => unlabeled.push(partial),
                label => groups.entry(label).or_default().push(partial),
            }
        }

        let labels = groups.len();
        for (label, group) in groups {
            partials.push(self.distill_label(label, group));
        }
        partials.extend(unlabeled);
        debug!(
            before,
            after = partials.len(),
            labels,
            "distilled"
        );
    }

    /// Joins the fragments of one label into a single Partial.
    fn distill_label(&self, label: u32, mut group: Vec<Partial>) -> Partial {
        if group.len() == 1 {
            let mut only = group.remove(0);
            only.set_label(label);
            return only;
        }

        // strongest first; ties go to the earlier fragment
        group.sort_by(|a, b| {
            energy(b)
                .total_cmp(&energy(a))
                .then(start(a).total_cmp(&start(b)))
        });

        let margin = 2.0 * self.config.fade_time + self.config.gap_time;
        let mut pieces: Vec<Piece> = Vec::new();
        for fragment in &group {
            for piece in pieces.iter_mut() {
                absorb(piece, fragment);
            }

            let mut run: Vec<Breakpoint> = Vec::new();
            let mut runs: Vec<Vec<Breakpoint>> = Vec::new();
            for bp in fragment.iter() {
                let free = pieces
                    .iter()
                    .all(|p| bp.time < p.start() - margin || bp.time > p.end() + margin);
                if free {
                    run.push(*bp);
                } else if !run.is_empty() {
                    runs.push(std::mem::take(&mut run));
                }
            }
            if !run.is_empty() {
                runs.push(run);
            }
            pieces.extend(runs.into_iter().map(|breakpoints| Piece { breakpoints }));
        }

        pieces.sort_by(|a, b| a.start().total_cmp(&b.start()));
        let mut out = Partial::with_label(label);
        let last = pieces.len().saturating_sub(1);
        let fade = self.config.fade_time;
        for (i, piece) in pieces.iter().enumerate() {
            if i > 0 {
                let first = piece.breakpoints[0];
                let mut onset = first.at_time(first.time - fade).with_amplitude(0.0);
                onset.phase = wrap_pi(first.phase - TAU * first.frequency * fade);
                out.insert(onset);
            }
            for bp in &piece.breakpoints {
                out.insert(*bp);
            }
            if i < last {
                let end = piece.breakpoints[piece.breakpoints.len() - 1];
                let mut release = end.at_time(end.time + fade).with_amplitude(0.0);
                release.phase = wrap_pi(end.phase + TAU * end.frequency * fade);
                out.insert(release);
            }
        }
        out
    }
}

/// Sum of squared breakpoint amplitudes.
fn energy(partial: &Partial) -> f64 {
    partial.iter().map(|bp| bp.amplitude * bp.amplitude).sum()
}

fn start(partial: &Partial) -> f64 {
    partial.start_time().unwrap_or(0.0)
}

/// Adds the energy `fragment` has at each sounding breakpoint of `piece`
/// to that breakpoint as noise.
fn absorb(piece: &mut Piece, fragment: &Partial) {
    for bp in piece.breakpoints.iter_mut() {
        if bp.amplitude > 0.0 && fragment.contains_time(bp.time) {
            let amplitude = fragment.amplitude_at(bp.time);
            bp.add_noise_energy(amplitude * amplitude);
        }
    }
}
