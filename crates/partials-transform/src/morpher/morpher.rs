use std::collections::BTreeMap;

use partials_model::error::{validate_finite, validate_positive};
use partials_model::{Breakpoint, Envelope, Partial, PartialList, PartialsError, PartialsResult};
use tracing::{debug, warn};

use super::blend::{linear, shaped_amplitude};
use super::config::MorpherConfig;

/// Interpolates Partials and collections of Partials between a source and a
/// target sound.
///
/// Three weight envelopes (frequency, amplitude, bandwidth) give, at every
/// time, how far the morph has moved from the source (0) to the target (1).
/// Morphed Partials accumulate in the Morpher until taken.
#[derive(Debug, Clone)]
pub struct Morpher {
    freq_function: Box<dyn Envelope>,
    amp_function: Box<dyn Envelope>,
    bw_function: Box<dyn Envelope>,
    config: MorpherConfig,
    src_reference: Partial,
    tgt_reference: Partial,
    partials: PartialList,
}

impl Morpher {
    /// Creates a Morpher that uses `function` for all three weights.
    pub fn new(function: &dyn Envelope) -> Self {
        Self::with_functions(function, function, function)
    }

    /// Creates a Morpher with separate frequency, amplitude and bandwidth
    /// weight functions.
    pub fn with_functions(
        freq_function: &dyn Envelope,
        amp_function: &dyn Envelope,
        bw_function: &dyn Envelope,
    ) -> Self {
        Self {
            freq_function: freq_function.duplicate(),
            amp_function: amp_function.duplicate(),
            bw_function: bw_function.duplicate(),
            config: MorpherConfig::default(),
            src_reference: Partial::new(),
            tgt_reference: Partial::new(),
            partials: PartialList::new(),
        }
    }

    pub fn frequency_function(&self) -> &dyn Envelope {
        self.freq_function.as_ref()
    }

    pub fn amplitude_function(&self) -> &dyn Envelope {
        self.amp_function.as_ref()
    }

    pub fn bandwidth_function(&self) -> &dyn Envelope {
        self.bw_function.as_ref()
    }

    pub fn set_frequency_function(&mut self, function: &dyn Envelope) {
        self.freq_function = function.duplicate();
    }

    pub fn set_amplitude_function(&mut self, function: &dyn Envelope) {
        self.amp_function = function.duplicate();
    }

    pub fn set_bandwidth_function(&mut self, function: &dyn Envelope) {
        self.bw_function = function.duplicate();
    }

    /// Shaping parameters.
    pub fn config(&self) -> &MorpherConfig {
        &self.config
    }

    /// Replaces all shaping parameters at once.
    pub fn set_config(&mut self, config: MorpherConfig) -> PartialsResult<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn amp_shape(&self) -> f64 {
        self.config.amp_shape
    }

    /// Sets the amplitude shaping offset (must be positive).
    pub fn set_amp_shape(&mut self, shape: f64) -> PartialsResult<()> {
        validate_positive("amp_shape", shape)?;
        self.config.amp_shape = shape;
        Ok(())
    }

    pub fn min_breakpoint_gap(&self) -> f64 {
        self.config.min_breakpoint_gap
    }

    /// Sets the minimum time between morphed breakpoints (must be
    /// positive).
    pub fn set_min_breakpoint_gap(&mut self, gap: f64) -> PartialsResult<()> {
        validate_positive("min_breakpoint_gap", gap)?;
        self.config.min_breakpoint_gap = gap;
        Ok(())
    }

    pub fn freq_fix_threshold_db(&self) -> f64 {
        self.config.freq_fix_threshold_db
    }

    pub fn set_freq_fix_threshold_db(&mut self, db: f64) -> PartialsResult<()> {
        validate_finite("freq_fix_threshold_db", db)?;
        self.config.freq_fix_threshold_db = db;
        Ok(())
    }

    /// Source reference Partial (a dummy when none is set).
    pub fn source_reference(&self) -> &Partial {
        &self.src_reference
    }

    /// Target reference Partial (a dummy when none is set).
    pub fn target_reference(&self) -> &Partial {
        &self.tgt_reference
    }

    /// Sets the source reference; a dummy Partial clears it. A reference
    /// with breakpoints must carry a non-zero label.
    pub fn set_source_reference(&mut self, reference: Partial) -> PartialsResult<()> {
        check_reference_label(&reference)?;
        self.src_reference = reference;
        Ok(())
    }

    /// Sets the target reference; a dummy Partial clears it. A reference
    /// with breakpoints must carry a non-zero label.
    pub fn set_target_reference(&mut self, reference: Partial) -> PartialsResult<()> {
        check_reference_label(&reference)?;
        self.tgt_reference = reference;
        Ok(())
    }

    /// Uses the Partial labeled `label` in `partials` as source reference.
    pub fn set_source_reference_label(
        &mut self,
        partials: &[Partial],
        label: u32,
    ) -> PartialsResult<()> {
        self.src_reference = find_reference(partials, label)?;
        Ok(())
    }

    /// Uses the Partial labeled `label` in `partials` as target reference.
    pub fn set_target_reference_label(
        &mut self,
        partials: &[Partial],
        label: u32,
    ) -> PartialsResult<()> {
        self.tgt_reference = find_reference(partials, label)?;
        Ok(())
    }

    /// Morphed Partials accumulated so far.
    pub fn partials(&self) -> &PartialList {
        &self.partials
    }

    pub fn partials_mut(&mut self) -> &mut PartialList {
        &mut self.partials
    }

    /// Moves the accumulated Partials out, leaving the Morpher empty.
    pub fn take_partials(&mut self) -> PartialList {
        std::mem::take(&mut self.partials)
    }

    fn weights(&self, time: f64) -> (f64, f64, f64) {
        (
            self.freq_function.evaluate(time),
            self.amp_function.evaluate(time),
            self.bw_function.evaluate(time),
        )
    }

    /// Morphs two breakpoints at `time`.
    ///
    /// Frequency and bandwidth move linearly, amplitude logarithmically
    /// (see [`super::shaped_amplitude`]). Phase is taken from whichever side
    /// dominates the frequency weight.
    pub fn morph_breakpoints(&self, src: &Breakpoint, tgt: &Breakpoint, time: f64) -> Breakpoint {
        let (wf, wa, wb) = self.weights(time);
        let phase = if wf < 0.5 { src.phase } else { tgt.phase };
        Breakpoint::new(
            time,
            linear(src.frequency, tgt.frequency, wf),
            shaped_amplitude(src.amplitude, tgt.amplitude, wa, self.config.amp_shape),
            linear(src.bandwidth, tgt.bandwidth, wb),
            phase,
        )
    }

    /// Fades a source breakpoint toward silence as the amplitude weight
    /// approaches 1.
    pub fn fade_src_breakpoint(&self, bp: &Breakpoint, time: f64) -> Breakpoint {
        let wa = self.amp_function.evaluate(time);
        let mut faded = bp.at_time(time);
        faded.amplitude = shaped_amplitude(bp.amplitude, 0.0, wa, self.config.amp_shape);
        faded
    }

    /// Fades a target breakpoint in from silence as the amplitude weight
    /// approaches 1.
    pub fn fade_tgt_breakpoint(&self, bp: &Breakpoint, time: f64) -> Breakpoint {
        let wa = self.amp_function.evaluate(time);
        let mut faded = bp.at_time(time);
        faded.amplitude = shaped_amplitude(0.0, bp.amplitude, wa, self.config.amp_shape);
        faded
    }

    /// Replaces the frequency of a quiet breakpoint with the reference's
    /// harmonic frequency for `label`.
    fn reference_fixed(
        &self,
        mut bp: Breakpoint,
        reference: &Partial,
        label: u32,
    ) -> Breakpoint {
        if label == 0 || reference.is_dummy() || reference.label() == 0 {
            return bp;
        }
        if bp.amplitude < self.config.freq_fix_threshold() {
            let harmonic = label as f64 / reference.label() as f64;
            bp.frequency = harmonic * reference.frequency_at(bp.time);
        }
        bp
    }

    /// Keeps times at least the minimum gap after the last kept time.
    fn thinned_times(&self, mut times: Vec<f64>) -> Vec<f64> {
        times.sort_by(f64::total_cmp);
        let gap = self.config.min_breakpoint_gap;
        let mut kept: Vec<f64> = Vec::with_capacity(times.len());
        for t in times {
            match kept.last() {
                Some(&last) if t - last < gap => {}
                _ => kept.push(t),
            }
        }
        kept
    }

    /// Morphs a source and a target Partial into a new Partial tagged
    /// `label`.
    ///
    /// Either side may be a dummy, in which case the other side is faded.
    /// Two dummies give an empty Partial.
    pub fn morph_partials(&self, src: &Partial, tgt: &Partial, label: u32) -> Partial {
        let mut out = Partial::with_label(label);
        match (src.is_dummy(), tgt.is_dummy()) {
            (true, true) => return out,
            (false, true) => {
                for t in self.thinned_times(src.iter().map(|bp| bp.time).collect()) {
                    out.insert(self.fade_src_breakpoint(&src.parameters_at(t), t));
                }
                return out;
            }
            (true, false) => {
                for t in self.thinned_times(tgt.iter().map(|bp| bp.time).collect()) {
                    out.insert(self.fade_tgt_breakpoint(&tgt.parameters_at(t), t));
                }
                return out;
            }
            (false, false) => {}
        }

        let all_times = src.iter().chain(tgt.iter()).map(|bp| bp.time).collect();
        let times = self.thinned_times(all_times);
        for t in times {
            let mut s = src.parameters_at(t);
            if !src.contains_time(t) {
                s.amplitude = 0.0;
            }
            let mut g = tgt.parameters_at(t);
            if !tgt.contains_time(t) {
                g.amplitude = 0.0;
            }
            let s = self.reference_fixed(s, &self.src_reference, label);
            let g = self.reference_fixed(g, &self.tgt_reference, label);
            out.insert(self.morph_breakpoints(&s, &g, t));
        }
        out
    }

    /// Morphs two collections.
    ///
    /// Partials are paired by label; a label present on only one side is
    /// morphed against a dummy. Unlabeled Partials are crossfaded. If a
    /// label occurs more than once on one side, the last occurrence is used.
    pub fn morph(&mut self, src: &[Partial], tgt: &[Partial]) {
        let mut pairs: BTreeMap<u32, (Option<&Partial>, Option<&Partial>)> = BTreeMap::new();
        for partial in src.iter().filter(|p| p.label() != 0) {
            let entry = pairs.entry(partial.label()).or_default();
            if entry.0.replace(partial).is_some() {
                warn!(label = partial.label(), "duplicate label in morph source");
            }
        }
        for partial in tgt.iter().filter(|p| p.label() != 0) {
            let entry = pairs.entry(partial.label()).or_default();
            if entry.1.replace(partial).is_some() {
                warn!(label = partial.label(), "duplicate label in morph target");
            }
        }

        let dummy = Partial::new();
        let before = self.partials.len();
        for (&label, &(s, t)) in &pairs {
            let morphed = self.morph_partials(s.unwrap_or(&dummy), t.unwrap_or(&dummy), label);
            self.partials.push(morphed);
        }

        self.crossfade(
            src.iter().filter(|p| p.label() == 0),
            tgt.iter().filter(|p| p.label() == 0),
            0,
        );

        debug!(
            labels = pairs.len(),
            produced = self.partials.len() - before,
            "morphed collections"
        );
    }

    /// Fades out every source Partial and fades in every target Partial,
    /// tagging the results with `label`.
    pub fn crossfade<'a, S, T>(&mut self, src: S, tgt: T, label: u32)
    where
        S: IntoIterator<Item = &'a Partial>,
        T: IntoIterator<Item = &'a Partial>,
    {
        let dummy = Partial::new();
        for partial in src.into_iter().filter(|p| !p.is_dummy()) {
            let faded = self.morph_partials(partial, &dummy, label);
            self.partials.push(faded);
        }
        for partial in tgt.into_iter().filter(|p| !p.is_dummy()) {
            let faded = self.morph_partials(&dummy, partial, label);
            self.partials.push(faded);
        }
    }
}

fn check_reference_label(reference: &Partial) -> PartialsResult<()> {
    if !reference.is_dummy() && reference.label() == 0 {
        return Err(PartialsError::invalid_argument(
            "label",
            "reference Partial must have a non-zero label",
        ));
    }
    Ok(())
}

fn find_reference(partials: &[Partial], label: u32) -> PartialsResult<Partial> {
    if label == 0 {
        return Err(PartialsError::invalid_argument(
            "label",
            "reference Partial must have a non-zero label",
        ));
    }
    partials
        .iter()
        .find(|p| p.label() == label)
        .cloned()
        .ok_or_else(|| {
            PartialsError::invalid_argument("label", format!("no Partial labeled {}", label))
        })
}
