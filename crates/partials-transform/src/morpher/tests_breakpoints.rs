//! Tests for breakpoint morphing and fading.

use super::*;
use partials_model::{Breakpoint, ConstantEnvelope, Envelope, LinearEnvelope};

fn src() -> Breakpoint {
    Breakpoint::new(0.0, 200.0, 0.4, 0.1, 0.5)
}

fn tgt() -> Breakpoint {
    Breakpoint::new(0.0, 300.0, 0.1, 0.6, -1.0)
}

#[test]
fn test_zero_weights_reproduce_source() {
    let morpher = Morpher::new(&ConstantEnvelope(0.0));
    let bp = morpher.morph_breakpoints(&src(), &tgt(), 0.25);
    assert_eq!(bp.time, 0.25);
    assert_eq!(bp.frequency, 200.0);
    assert_eq!(bp.amplitude, 0.4);
    assert_eq!(bp.bandwidth, 0.1);
    assert_eq!(bp.phase, 0.5);
}

#[test]
fn test_unit_weights_reproduce_target() {
    let morpher = Morpher::new(&ConstantEnvelope(1.0));
    let bp = morpher.morph_breakpoints(&src(), &tgt(), 0.25);
    assert_eq!(bp.frequency, 300.0);
    assert_eq!(bp.amplitude, 0.1);
    assert_eq!(bp.bandwidth, 0.6);
    assert_eq!(bp.phase, -1.0);
}

#[test]
fn test_independent_weight_functions() {
    let morpher = Morpher::with_functions(
        &ConstantEnvelope(1.0),
        &ConstantEnvelope(0.0),
        &ConstantEnvelope(0.5),
    );
    let bp = morpher.morph_breakpoints(&src(), &tgt(), 0.0);
    assert_eq!(bp.frequency, 300.0);
    assert_eq!(bp.amplitude, 0.4);
    assert!((bp.bandwidth - 0.35).abs() < 1e-12);
}

#[test]
fn test_halfway_amplitude_is_geometric() {
    let morpher = Morpher::new(&ConstantEnvelope(0.5));
    let bp = morpher.morph_breakpoints(&src(), &tgt(), 0.0);
    // (0.4 * 0.1).sqrt() = 0.2, shifted slightly by the shape offset
    assert!((bp.amplitude - 0.2).abs() < 1e-4);
    assert_eq!(bp.frequency, 250.0);
}

#[test]
fn test_phase_follows_dominant_frequency_side() {
    let morpher = Morpher::new(&ConstantEnvelope(0.49));
    assert_eq!(morpher.morph_breakpoints(&src(), &tgt(), 0.0).phase, 0.5);
    let morpher = Morpher::new(&ConstantEnvelope(0.5));
    assert_eq!(morpher.morph_breakpoints(&src(), &tgt(), 0.0).phase, -1.0);
}

#[test]
fn test_fades_keep_frequency_and_bandwidth() {
    let ramp = LinearEnvelope::from_points([(0.0, 0.0), (1.0, 1.0)]).unwrap();
    let morpher = Morpher::new(&ramp);

    let out = morpher.fade_src_breakpoint(&src(), 0.0);
    assert_eq!(out.amplitude, 0.4);
    let out = morpher.fade_src_breakpoint(&src(), 1.0);
    assert_eq!(out.amplitude, 0.0);
    assert_eq!(out.frequency, 200.0);
    assert_eq!(out.bandwidth, 0.1);
    assert_eq!(out.time, 1.0);

    assert_eq!(morpher.fade_tgt_breakpoint(&tgt(), 0.0).amplitude, 0.0);
    assert_eq!(morpher.fade_tgt_breakpoint(&tgt(), 1.0).amplitude, 0.1);
}

#[test]
fn test_parameter_validation() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    assert!(morpher.set_amp_shape(0.0).is_err());
    assert!(morpher.set_amp_shape(-1.0).is_err());
    assert!(morpher.set_min_breakpoint_gap(0.0).is_err());
    assert!(morpher.set_freq_fix_threshold_db(f64::NAN).is_err());
    morpher.set_amp_shape(1e-3).unwrap();
    assert_eq!(morpher.amp_shape(), 1e-3);
    assert_eq!(morpher.min_breakpoint_gap(), DEFAULT_MIN_BREAKPOINT_GAP);
}

#[test]
fn test_clone_is_independent() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.25));
    let copy = morpher.clone();
    morpher.set_frequency_function(&ConstantEnvelope(0.75));
    assert_eq!(copy.frequency_function().evaluate(0.0), 0.25);
    assert_eq!(morpher.frequency_function().evaluate(0.0), 0.75);
}

#[test]
fn test_config_round_trip_and_defaults() {
    let config: MorpherConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, MorpherConfig::default());
    let custom: MorpherConfig = serde_json::from_str(r#"{"amp_shape": 0.01}"#).unwrap();
    assert_eq!(custom.amp_shape, 0.01);
    assert_eq!(custom.min_breakpoint_gap, DEFAULT_MIN_BREAKPOINT_GAP);

    let mut morpher = Morpher::new(&ConstantEnvelope(0.0));
    assert!(morpher
        .set_config(MorpherConfig {
            amp_shape: -1.0,
            ..MorpherConfig::default()
        })
        .is_err());
}
