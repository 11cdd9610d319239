//! Analyzer configuration.

use serde::{Deserialize, Serialize};

use partials_model::error::{validate_negative, validate_non_negative, validate_positive};
use partials_model::PartialsResult;

/// Default amplitude floor (dB relative to full scale).
pub const DEFAULT_AMP_FLOOR: f64 = -90.0;

/// Default bandwidth association region width (Hz).
pub const DEFAULT_BW_REGION_WIDTH: f64 = 2000.0;

/// Complete set of analysis parameters.
///
/// Derived defaults come from [`AnalyzerConfig::new`] or
/// [`AnalyzerConfig::with_window_width`]; a deserialized configuration must
/// carry every field and is checked with [`AnalyzerConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Minimum frequency separation between simultaneous Partials (Hz).
    pub freq_resolution: f64,
    /// Main-lobe width of the analysis window (Hz).
    pub window_width: f64,
    /// Peaks quieter than this are not tracked (dB, negative).
    pub amp_floor: f64,
    /// Window sidelobe attenuation (positive dB).
    pub sidelobe_level: f64,
    /// Peaks at or below this frequency are ignored (Hz).
    pub freq_floor: f64,
    /// Largest frequency change between linked breakpoints (Hz).
    pub freq_drift: f64,
    /// Time between analysis frames (s).
    pub hop_time: f64,
    /// Largest allowed time reassignment from the frame centre (s).
    pub crop_time: f64,
    /// Bandwidth association region width (Hz); 0 disables association.
    pub bw_region_width: f64,
    /// Whether frequencies and phases of finished Partials are made
    /// consistent.
    pub phase_correct: bool,
}

impl AnalyzerConfig {
    /// Derives a configuration from a frequency resolution, with a window
    /// twice as wide.
    pub fn new(freq_resolution: f64) -> PartialsResult<Self> {
        Self::with_window_width(freq_resolution, 2.0 * freq_resolution)
    }

    /// Derives a configuration from a frequency resolution and window width.
    pub fn with_window_width(freq_resolution: f64, window_width: f64) -> PartialsResult<Self> {
        validate_positive("freq_resolution", freq_resolution)?;
        validate_positive("window_width", window_width)?;
        let hop_time = 1.0 / window_width;
        Ok(Self {
            freq_resolution,
            window_width,
            amp_floor: DEFAULT_AMP_FLOOR,
            sidelobe_level: -DEFAULT_AMP_FLOOR,
            freq_floor: freq_resolution,
            freq_drift: 0.5 * freq_resolution,
            hop_time,
            crop_time: hop_time,
            bw_region_width: DEFAULT_BW_REGION_WIDTH,
            phase_correct: true,
        })
    }

    /// Checks every parameter against its domain.
    pub fn validate(&self) -> PartialsResult<()> {
        validate_positive("freq_resolution", self.freq_resolution)?;
        validate_positive("window_width", self.window_width)?;
        validate_negative("amp_floor", self.amp_floor)?;
        validate_positive("sidelobe_level", self.sidelobe_level)?;
        validate_non_negative("freq_floor", self.freq_floor)?;
        validate_positive("freq_drift", self.freq_drift)?;
        validate_positive("hop_time", self.hop_time)?;
        validate_positive("crop_time", self.crop_time)?;
        validate_non_negative("bw_region_width", self.bw_region_width)?;
        Ok(())
    }

    /// True if noise energy is associated with Partials.
    pub fn associates_bandwidth(&self) -> bool {
        self.bw_region_width > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_from_resolution() {
        let config = AnalyzerConfig::new(100.0).unwrap();
        assert_eq!(config.window_width, 200.0);
        assert_eq!(config.amp_floor, -90.0);
        assert_eq!(config.sidelobe_level, 90.0);
        assert_eq!(config.freq_floor, 100.0);
        assert_eq!(config.freq_drift, 50.0);
        assert_eq!(config.hop_time, 0.005);
        assert_eq!(config.crop_time, 0.005);
        assert_eq!(config.bw_region_width, 2000.0);
        assert!(config.phase_correct);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_window_width() {
        let config = AnalyzerConfig::with_window_width(60.0, 300.0).unwrap();
        assert_eq!(config.window_width, 300.0);
        assert_eq!(config.freq_resolution, 60.0);
        assert!((config.hop_time - 1.0 / 300.0).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_resolution() {
        assert!(AnalyzerConfig::new(0.0).is_err());
        assert!(AnalyzerConfig::new(-5.0).is_err());
        assert!(AnalyzerConfig::with_window_width(10.0, f64::NAN).is_err());
    }

    #[test]
    fn test_validate_catches_bad_fields() {
        let mut config = AnalyzerConfig::new(100.0).unwrap();
        config.amp_floor = 3.0;
        assert_eq!(config.validate().unwrap_err().code(), "PARTIALS_001");

        let mut config = AnalyzerConfig::new(100.0).unwrap();
        config.bw_region_width = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = AnalyzerConfig::new(80.0).unwrap();
        let text = serde_json::to_string(&config).unwrap();
        let back: AnalyzerConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let mut value = serde_json::to_value(AnalyzerConfig::new(80.0).unwrap()).unwrap();
        value["hop_size"] = serde_json::json!(256);
        assert!(serde_json::from_value::<AnalyzerConfig>(value).is_err());
    }
}
