//! Tests for collection morphing and crossfading.

use super::*;
use partials_model::collection::labels;
use partials_model::{Breakpoint, ConstantEnvelope, LinearEnvelope, Partial};

fn partial(label: u32, freq: f64, amp: f64) -> Partial {
    let mut p = Partial::with_label(label);
    for i in 0..=10 {
        p.insert(Breakpoint::sinusoid(i as f64 * 0.1, freq, amp));
    }
    p
}

#[test]
fn test_morph_pairs_by_label_in_order() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    let src = vec![partial(2, 200.0, 0.5), partial(1, 100.0, 0.5)];
    let tgt = vec![partial(1, 110.0, 0.5), partial(3, 330.0, 0.5)];
    morpher.morph(&src, &tgt);

    let out = morpher.partials();
    let out_labels: Vec<u32> = out.iter().map(Partial::label).collect();
    assert_eq!(out_labels, vec![1, 2, 3]);
    assert_eq!(out[0].frequency_at(0.5), 105.0);
    // unmatched labels are morphed against silence
    assert!(out[1].amplitude_at(0.5) < 0.01);
    assert!(out[2].amplitude_at(0.5) < 0.01);
}

#[test]
fn test_unlabeled_partials_are_crossfaded() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.0));
    let src = vec![partial(0, 500.0, 0.3), partial(1, 100.0, 0.5)];
    let tgt = vec![partial(0, 700.0, 0.3), partial(1, 100.0, 0.5)];
    morpher.morph(&src, &tgt);
    let out = morpher.take_partials();
    assert_eq!(out.len(), 3);
    assert_eq!(labels(&out).into_iter().collect::<Vec<_>>(), vec![0, 1]);

    let faded_out = out.iter().find(|p| p.frequency_at(0.0) == 500.0).unwrap();
    let faded_in = out.iter().find(|p| p.frequency_at(0.0) == 700.0).unwrap();
    // weight 0: the source is untouched and the target is silent
    assert_eq!(faded_out.amplitude_at(0.5), 0.3);
    assert_eq!(faded_in.amplitude_at(0.5), 0.0);
    assert!(morpher.partials().is_empty());
}

#[test]
fn test_duplicate_label_uses_last_occurrence() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.0));
    let src = vec![partial(1, 100.0, 0.5), partial(1, 120.0, 0.5)];
    let tgt = vec![partial(1, 200.0, 0.5)];
    morpher.morph(&src, &tgt);
    assert_eq!(morpher.partials().len(), 1);
    assert_eq!(morpher.partials()[0].frequency_at(0.5), 120.0);
}

#[test]
fn test_results_accumulate() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    let src = vec![partial(1, 100.0, 0.5)];
    let tgt = vec![partial(1, 200.0, 0.5)];
    morpher.morph(&src, &tgt);
    morpher.morph(&src, &tgt);
    assert_eq!(morpher.partials().len(), 2);
    morpher.partials_mut().clear();
    assert!(morpher.partials().is_empty());
}

#[test]
fn test_crossfade_against_nothing_fades_out() {
    let ramp = LinearEnvelope::from_points([(0.0, 0.0), (1.0, 1.0)]).unwrap();
    let mut morpher = Morpher::new(&ramp);
    morpher.crossfade(&[partial(4, 250.0, 0.6)], std::iter::empty(), 9);
    let out = morpher.take_partials();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].label(), 9);
    let amps: Vec<f64> = out[0].iter().map(|bp| bp.amplitude).collect();
    assert_eq!(amps[0], 0.6);
    assert_eq!(*amps.last().unwrap(), 0.0);
    for pair in amps.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
    assert!(out[0].iter().all(|bp| bp.frequency == 250.0));
}

#[test]
fn test_crossfade_skips_dummies() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    morpher.crossfade(&[Partial::new()], &[Partial::with_label(3)], 0);
    assert!(morpher.partials().is_empty());
}

#[test]
fn test_crossfade_accepts_filtered_borrows() {
    let mut morpher = Morpher::new(&ConstantEnvelope(0.5));
    let src = vec![partial(0, 500.0, 0.3), partial(2, 200.0, 0.3)];
    let tgt = vec![partial(2, 210.0, 0.3), partial(0, 700.0, 0.3)];
    morpher.crossfade(
        src.iter().filter(|p| p.label() == 2),
        tgt.iter().filter(|p| p.label() == 2),
        5,
    );
    let out = morpher.take_partials();
    assert_eq!(out.len(), 2);
    assert!(out.iter().all(|p| p.label() == 5));
    assert_eq!(out[0].frequency_at(0.5), 200.0);
    assert_eq!(out[1].frequency_at(0.5), 210.0);
}
