//! The Analyzer: sampled sound in, Partials out.

use partials_model::error::{validate_negative, validate_non_negative, validate_positive};
use partials_model::phase::{fix_frequency, fix_phase_forward, DEFAULT_MAX_FIX};
use partials_model::{Breakpoint, Envelope, LinearEnvelope, Partial, PartialList, PartialsResult};
use tracing::{debug, trace};

use crate::bandwidth::BandwidthAssociation;
use crate::config::AnalyzerConfig;
use crate::envelope_builder::{AmpEnvBuilder, FundamentalBuilder};
use crate::peaks::PeakSelector;
use crate::spectrum::ReassignedSpectrum;
use crate::tracking::PartialBuilder;
use crate::window::KaiserWindow;

/// Fundamental tracking request.
#[derive(Debug, Clone, Copy, PartialEq)]
struct FundamentalRange {
    fmin: f64,
    fmax: f64,
    amp_threshold_db: f64,
    freq_threshold: f64,
}

/// Reassigned bandwidth-enhanced analyzer.
///
/// Partials from successive [`Analyzer::analyze`] calls accumulate until
/// they are taken with [`Analyzer::take_partials`].
///
/// # Example
/// ```
/// use partials_analysis::Analyzer;
///
/// let sr = 44100.0;
/// let samples: Vec<f64> = (0..22050)
///     .map(|n| 0.5 * (2.0 * std::f64::consts::PI * 440.0 * n as f64 / sr).sin())
///     .collect();
///
/// let mut analyzer = Analyzer::new(100.0).unwrap();
/// analyzer.analyze(&samples, sr).unwrap();
/// assert_eq!(analyzer.partials().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    fundamental: Option<FundamentalRange>,
    build_amp: bool,
    fundamental_env: LinearEnvelope,
    amp_env: LinearEnvelope,
    partials: PartialList,
}

impl Analyzer {
    /// Creates an analyzer for the given frequency resolution, with a
    /// window twice as wide.
    pub fn new(freq_resolution: f64) -> PartialsResult<Self> {
        Ok(Self::from_valid_config(AnalyzerConfig::new(freq_resolution)?))
    }

    /// Creates an analyzer with an explicit window width.
    pub fn with_window_width(freq_resolution: f64, window_width: f64) -> PartialsResult<Self> {
        Ok(Self::from_valid_config(AnalyzerConfig::with_window_width(
            freq_resolution,
            window_width,
        )?))
    }

    /// Creates an analyzer from a complete configuration.
    pub fn from_config(config: AnalyzerConfig) -> PartialsResult<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: AnalyzerConfig) -> Self {
        Self {
            config,
            fundamental: None,
            build_amp: false,
            fundamental_env: LinearEnvelope::new(),
            amp_env: LinearEnvelope::new(),
            partials: PartialList::new(),
        }
    }

    /// Re-derives every parameter from a resolution and window width.
    pub fn configure(&mut self, freq_resolution: f64, window_width: f64) -> PartialsResult<()> {
        self.config = AnalyzerConfig::with_window_width(freq_resolution, window_width)?;
        Ok(())
    }

    /// The current configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn freq_resolution(&self) -> f64 {
        self.config.freq_resolution
    }

    pub fn window_width(&self) -> f64 {
        self.config.window_width
    }

    pub fn amp_floor(&self) -> f64 {
        self.config.amp_floor
    }

    pub fn sidelobe_level(&self) -> f64 {
        self.config.sidelobe_level
    }

    pub fn freq_floor(&self) -> f64 {
        self.config.freq_floor
    }

    pub fn freq_drift(&self) -> f64 {
        self.config.freq_drift
    }

    pub fn hop_time(&self) -> f64 {
        self.config.hop_time
    }

    pub fn crop_time(&self) -> f64 {
        self.config.crop_time
    }

    pub fn bw_region_width(&self) -> f64 {
        self.config.bw_region_width
    }

    pub fn phase_correct(&self) -> bool {
        self.config.phase_correct
    }

    /// Sets the frequency resolution without re-deriving other parameters.
    pub fn set_freq_resolution(&mut self, hz: f64) -> PartialsResult<()> {
        validate_positive("freq_resolution", hz)?;
        self.config.freq_resolution = hz;
        Ok(())
    }

    pub fn set_window_width(&mut self, hz: f64) -> PartialsResult<()> {
        validate_positive("window_width", hz)?;
        self.config.window_width = hz;
        Ok(())
    }

    pub fn set_amp_floor(&mut self, db: f64) -> PartialsResult<()> {
        validate_negative("amp_floor", db)?;
        self.config.amp_floor = db;
        Ok(())
    }

    pub fn set_sidelobe_level(&mut self, db: f64) -> PartialsResult<()> {
        validate_positive("sidelobe_level", db)?;
        self.config.sidelobe_level = db;
        Ok(())
    }

    pub fn set_freq_floor(&mut self, hz: f64) -> PartialsResult<()> {
        validate_non_negative("freq_floor", hz)?;
        self.config.freq_floor = hz;
        Ok(())
    }

    pub fn set_freq_drift(&mut self, hz: f64) -> PartialsResult<()> {
        validate_positive("freq_drift", hz)?;
        self.config.freq_drift = hz;
        Ok(())
    }

    pub fn set_hop_time(&mut self, seconds: f64) -> PartialsResult<()> {
        validate_positive("hop_time", seconds)?;
        self.config.hop_time = seconds;
        Ok(())
    }

    pub fn set_crop_time(&mut self, seconds: f64) -> PartialsResult<()> {
        validate_positive("crop_time", seconds)?;
        self.config.crop_time = seconds;
        Ok(())
    }

    /// Sets the bandwidth association region width; 0 disables
    /// association.
    pub fn set_bw_region_width(&mut self, hz: f64) -> PartialsResult<()> {
        validate_non_negative("bw_region_width", hz)?;
        self.config.bw_region_width = hz;
        Ok(())
    }

    pub fn set_phase_correct(&mut self, enabled: bool) {
        self.config.phase_correct = enabled;
    }

    /// Requests a fundamental frequency envelope in `[fmin, fmax]` from the
    /// next analyses, estimated from peaks louder than `amp_threshold_db`
    /// and below `freq_threshold` Hz.
    ///
    /// See [`crate::envelope_builder::DEFAULT_F0_AMP_THRESHOLD_DB`] and
    /// [`crate::envelope_builder::DEFAULT_F0_FREQ_THRESHOLD`] for the usual
    /// thresholds.
    pub fn build_fundamental_env(
        &mut self,
        fmin: f64,
        fmax: f64,
        amp_threshold_db: f64,
        freq_threshold: f64,
    ) -> PartialsResult<()> {
        FundamentalBuilder::new(fmin, fmax, amp_threshold_db, freq_threshold)?;
        self.fundamental = Some(FundamentalRange {
            fmin,
            fmax,
            amp_threshold_db,
            freq_threshold,
        });
        Ok(())
    }

    /// Stops building the fundamental frequency envelope. The next analysis
    /// leaves [`Analyzer::fundamental_env`] empty.
    pub fn disable_fundamental_env(&mut self) {
        self.fundamental = None;
    }

    /// True if analyses build a fundamental frequency envelope.
    pub fn builds_fundamental_env(&self) -> bool {
        self.fundamental.is_some()
    }

    /// Enables or disables the overall amplitude envelope.
    pub fn build_amp_env(&mut self, enabled: bool) {
        self.build_amp = enabled;
    }

    /// Fundamental frequency envelope from the last analysis (empty unless
    /// requested).
    pub fn fundamental_env(&self) -> &LinearEnvelope {
        &self.fundamental_env
    }

    /// Amplitude envelope from the last analysis (empty unless requested).
    pub fn amp_env(&self) -> &LinearEnvelope {
        &self.amp_env
    }

    /// Partials accumulated so far.
    pub fn partials(&self) -> &PartialList {
        &self.partials
    }

    pub fn partials_mut(&mut self) -> &mut PartialList {
        &mut self.partials
    }

    /// Moves the accumulated Partials out, leaving the analyzer empty.
    pub fn take_partials(&mut self) -> PartialList {
        std::mem::take(&mut self.partials)
    }

    /// Analyzes mono `samples` at `sample_rate` Hz.
    pub fn analyze(&mut self, samples: &[f64], sample_rate: f64) -> PartialsResult<()> {
        self.run(samples, sample_rate, PartialBuilder::new(self.config.freq_drift))
    }

    /// Analyzes mono `samples`, predicting each Partial's frequency from
    /// the contour of `reference` while tracking.
    pub fn analyze_with_reference(
        &mut self,
        samples: &[f64],
        sample_rate: f64,
        reference: &dyn Envelope,
    ) -> PartialsResult<()> {
        let builder = PartialBuilder::with_reference(self.config.freq_drift, reference);
        self.run(samples, sample_rate, builder)
    }

    fn run(
        &mut self,
        samples: &[f64],
        sample_rate: f64,
        mut builder: PartialBuilder,
    ) -> PartialsResult<()> {
        validate_positive("sample_rate", sample_rate)?;

        self.fundamental_env.clear();
        self.amp_env.clear();
        if samples.is_empty() {
            return Ok(());
        }

        let config = &self.config;
        let window = KaiserWindow::design(config.window_width, config.sidelobe_level, sample_rate);
        let half = window.half_length();
        let mut spectrum = ReassignedSpectrum::new(window);
        let selector = PeakSelector::new(
            sample_rate,
            config.amp_floor,
            config.sidelobe_level,
            config.freq_floor,
            config.freq_resolution,
            config.crop_time,
        );
        let mut association = BandwidthAssociation::new(config.bw_region_width);
        let mut noise_builder = if config.associates_bandwidth() {
            None
        } else {
            Some(PartialBuilder::new(config.freq_drift))
        };
        let mut fundamental = match self.fundamental {
            Some(r) => Some(FundamentalBuilder::new(
                r.fmin,
                r.fmax,
                r.amp_threshold_db,
                r.freq_threshold,
            )?),
            None => None,
        };
        let mut amp = self.build_amp.then(AmpEnvBuilder::new);

        let hop = ((config.hop_time * sample_rate).round() as usize).max(1);
        let centres: Vec<usize> = if samples.len() > 2 * half {
            (half..samples.len() - half).step_by(hop).collect()
        } else {
            vec![samples.len() / 2]
        };
        debug!(
            window_len = spectrum.window().len(),
            fft_len = spectrum.fft_len(),
            frames = centres.len(),
            hop,
            "analyzing {} samples at {} Hz",
            samples.len(),
            sample_rate
        );

        for &centre in &centres {
            spectrum.transform(samples, centre);
            let mut frame = selector.select(&spectrum, centre);
            let frame_time = centre as f64 / sample_rate;
            trace!(
                time = frame_time,
                retained = frame.retained.len(),
                rejected = frame.rejected.len(),
                "selected peaks"
            );

            if let Some(builder) = fundamental.as_mut() {
                builder.build(&frame.retained, frame_time);
            }
            if let Some(builder) = amp.as_mut() {
                builder.build(&frame.retained, frame_time);
            }

            match noise_builder.as_mut() {
                None => association.associate(&mut frame.retained, &frame.rejected),
                Some(noise) => {
                    let components: Vec<Breakpoint> = frame
                        .rejected
                        .iter()
                        .filter(|r| r.reason.is_valid_component())
                        .map(|r| {
                            let mut bp = r.peak;
                            bp.set_bandwidth(1.0);
                            bp
                        })
                        .collect();
                    noise.build_frame(&components);
                }
            }

            builder.build_frame(&frame.retained);
        }

        let mut partials = builder.finish();
        let sinusoidal = partials.len();
        if let Some(noise) = noise_builder {
            partials.extend(noise.finish());
        }
        // a single frame cannot link anything, so its peaks are kept as
        // one-breakpoint Partials
        let found = partials.len();
        if centres.len() > 1 {
            partials.retain(|p| p.len() > 1);
        }
        if self.config.phase_correct {
            for partial in partials.iter_mut() {
                fix_frequency(partial, DEFAULT_MAX_FIX);
                fix_phase_forward(partial);
            }
        }
        debug!(
            partials = partials.len(),
            tracked = sinusoidal,
            pruned = found - partials.len(),
            "analysis complete"
        );

        if let Some(builder) = fundamental {
            self.fundamental_env = builder.into_envelope();
        }
        if let Some(builder) = amp {
            self.amp_env = builder.into_envelope();
        }
        self.partials.extend(partials);
        Ok(())
    }
}

/// Analyzes `samples` with default parameters for `freq_resolution` and
/// returns the Partials.
pub fn analyze_samples(
    samples: &[f64],
    sample_rate: f64,
    freq_resolution: f64,
) -> PartialsResult<Vec<Partial>> {
    let mut analyzer = Analyzer::new(freq_resolution)?;
    analyzer.analyze(samples, sample_rate)?;
    Ok(analyzer.take_partials())
}
