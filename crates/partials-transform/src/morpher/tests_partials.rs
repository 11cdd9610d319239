//! Tests for Partial-to-Partial morphing.

use super::*;
use partials_model::{Breakpoint, ConstantEnvelope, LinearEnvelope, Partial};

fn steady(label: u32, freq: f64, amp: f64, start: f64, end: f64, step: f64) -> Partial {
    let mut p = Partial::with_label(label);
    let mut t = start;
    while t <= end + 1e-12 {
        p.insert(Breakpoint::sinusoid(t, freq, amp));
        t += step;
    }
    p
}

fn ramp() -> LinearEnvelope {
    LinearEnvelope::from_points([(0.0, 0.0), (1.0, 1.0)]).unwrap()
}

#[test]
fn test_both_dummies_give_empty_labeled_partial() {
    let morpher = Morpher::new(&ramp());
    let out = morpher.morph_partials(&Partial::new(), &Partial::new(), 7);
    assert!(out.is_dummy());
    assert_eq!(out.label(), 7);
}

#[test]
fn test_time_axis_is_union_of_both_sides() {
    let morpher = Morpher::new(&ConstantEnvelope(0.5));
    let a = steady(1, 100.0, 0.5, 0.0, 0.5, 0.1);
    let b = steady(1, 200.0, 0.5, 0.25, 1.0, 0.3);
    let out = morpher.morph_partials(&a, &b, 1);
    let times: Vec<f64> = out.iter().map(|bp| bp.time).collect();
    let mut expected: Vec<f64> = a.iter().chain(b.iter()).map(|bp| bp.time).collect();
    expected.sort_by(f64::total_cmp);
    expected.dedup();
    assert_eq!(times.len(), expected.len());
    for (t, e) in times.iter().zip(&expected) {
        assert!((t - e).abs() < 1e-12);
    }
    assert_eq!(out.label(), 1);
}

#[test]
fn test_one_sided_times_morph_against_silence() {
    let morpher = Morpher::new(&ConstantEnvelope(0.5));
    let a = steady(1, 100.0, 0.5, 0.0, 0.2, 0.1);
    let b = steady(1, 300.0, 0.5, 0.5, 0.7, 0.1);
    let out = morpher.morph_partials(&a, &b, 1);
    // at t = 0 only the source sounds; the target contributes its start
    // frequency at zero amplitude
    let first = out.first().unwrap();
    assert_eq!(first.frequency, 200.0);
    assert!(first.amplitude < 0.01);
}

#[test]
fn test_breakpoints_respect_minimum_gap() {
    let mut morpher = Morpher::new(&ramp());
    morpher.set_min_breakpoint_gap(0.05).unwrap();
    let a = steady(1, 100.0, 0.5, 0.0, 1.0, 0.01);
    let b = steady(1, 150.0, 0.5, 0.005, 1.0, 0.013);
    let out = morpher.morph_partials(&a, &b, 1);
    for pair in out.breakpoints().windows(2) {
        assert!(pair[1].time - pair[0].time >= 0.05 - 1e-12);
    }
    assert_eq!(out.start_time(), Some(0.0));
}

#[test]
fn test_dummy_target_fades_source() {
    let morpher = Morpher::new(&ramp());
    let a = steady(3, 440.0, 0.5, 0.0, 1.0, 0.1);
    let out = morpher.morph_partials(&a, &Partial::new(), 3);
    assert_eq!(out.len(), a.len());
    let amps: Vec<f64> = out.iter().map(|bp| bp.amplitude).collect();
    for pair in amps.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
    assert_eq!(amps[0], 0.5);
    assert!(out.iter().all(|bp| bp.frequency == 440.0));
}

#[test]
fn test_dummy_source_fades_in_target() {
    let morpher = Morpher::new(&ramp());
    let b = steady(2, 330.0, 0.4, 0.0, 1.0, 0.25);
    let out = morpher.morph_partials(&Partial::new(), &b, 2);
    assert_eq!(out.first().unwrap().amplitude, 0.0);
    assert_eq!(out.last().unwrap().amplitude, 0.4);
}

#[test]
fn test_reference_corrects_quiet_frequencies() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    // the source reference is the fundamental at 100 Hz, label 1
    morpher
        .set_source_reference(steady(1, 100.0, 0.5, 0.0, 1.0, 0.5))
        .unwrap();

    // label 3 source has a near-silent breakpoint with a bogus frequency
    let mut a = Partial::with_label(3);
    a.insert(Breakpoint::sinusoid(0.0, 777.0, 1e-6));
    a.insert(Breakpoint::sinusoid(0.5, 300.0, 0.2));
    let b = steady(3, 400.0, 0.2, 0.0, 0.5, 0.5);

    let out = morpher.morph_partials(&a, &b, 3);
    // corrected source frequency is 3 * 100 Hz, halfway to 400 Hz
    assert_eq!(out.first().unwrap().frequency, 350.0);
}

#[test]
fn test_reference_by_label() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    let list = vec![
        steady(1, 100.0, 0.5, 0.0, 1.0, 0.5),
        steady(2, 200.0, 0.5, 0.0, 1.0, 0.5),
    ];
    morpher.set_target_reference_label(&list, 2).unwrap();
    assert_eq!(morpher.target_reference().label(), 2);
    assert!(morpher.set_source_reference_label(&list, 9).is_err());
    assert!(morpher.set_source_reference_label(&list, 0).is_err());
    morpher.set_target_reference(Partial::new()).unwrap();
    assert!(morpher.target_reference().is_dummy());
}

#[test]
fn test_unlabeled_reference_is_rejected() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    morpher
        .set_source_reference(steady(1, 100.0, 0.5, 0.0, 1.0, 0.5))
        .unwrap();
    let err = morpher
        .set_source_reference(steady(0, 100.0, 0.5, 0.0, 1.0, 0.5))
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(morpher
        .set_target_reference(steady(0, 100.0, 0.5, 0.0, 1.0, 0.5))
        .is_err());
    // the previous reference is kept
    assert_eq!(morpher.source_reference().label(), 1);
    assert!(morpher.target_reference().is_dummy());
    // an unlabeled dummy still clears
    morpher.set_source_reference(Partial::new()).unwrap();
    assert!(morpher.source_reference().is_dummy());
}

#[test]
fn test_two_single_breakpoint_partials_morph_monotonically() {
    let ramp = LinearEnvelope::from_points([(0.0, 0.0), (2.0, 1.0)]).unwrap();
    let morpher = Morpher::new(&ramp);
    let mut a = Partial::with_label(1);
    a.insert(Breakpoint::sinusoid(0.0, 100.0, 0.5));
    let mut b = Partial::with_label(1);
    b.insert(Breakpoint::sinusoid(2.0, 200.0, 0.5));
    let out = morpher.morph_partials(&a, &b, 1);
    let freqs: Vec<f64> = out.iter().map(|bp| bp.frequency).collect();
    assert_eq!(freqs, vec![100.0, 200.0]);
}
