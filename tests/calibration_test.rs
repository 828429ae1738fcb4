// ABOUTME: Integration tests for threshold calibration against human ratings
// ABOUTME: Covers the group search, accuracy reporting, and persisted history apply/rollback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::BTreeSet;

use common::{init_test_logging, synthetic_window};
use formcoach::synthetic::SquatProfile;
use formcoach_core::models::{DifficultyLevel, FaultType};
use formcoach_intelligence::calibration::{
    CalibrationError, CalibrationHistory, CalibrationSample, Calibrator, HumanRating,
};
use formcoach_intelligence::config::ThresholdConfig;
use tempfile::TempDir;

fn sample(bottom_back: f64, human_safety: f64) -> CalibrationSample {
    let human_faults = if human_safety < 100.0 {
        BTreeSet::from([FaultType::BackRounding])
    } else {
        BTreeSet::new()
    };
    CalibrationSample {
        window: synthetic_window(SquatProfile::rounded_back(bottom_back)),
        human: HumanRating {
            overall: human_safety.mul_add(0.4, 60.0),
            safety: human_safety,
            depth: 100.0,
            stability: 100.0,
        },
        human_faults,
    }
}

/// Raters who flag rounding at 85 degrees, which the defaults let through
fn strict_raters() -> Vec<CalibrationSample> {
    vec![sample(75.0, 80.0), sample(85.0, 80.0), sample(95.0, 100.0)]
}

fn calibrator() -> Calibrator {
    Calibrator::new(DifficultyLevel::Casual, ThresholdConfig::default()).unwrap()
}

#[test]
fn test_calibration_tightens_safety_to_match_raters() {
    init_test_logging();
    let samples = strict_raters();
    let result = calibrator().calibrate(&samples).unwrap();

    assert!(result.original_accuracy.safety.mae > 6.0);
    assert!(result.calibrated_accuracy.safety.mae < 1e-9);
    assert!(result.improvement.safety_mae > 6.0);

    let moderate = result.calibrated.safety_moderate_back_rounding;
    assert!(moderate > 85.0 && moderate <= 95.0, "moderate threshold {moderate}");
    assert!(result.calibrated.validate().is_ok());

    // Depth and stability already agree with the raters and stay untouched
    assert!((result.calibrated.depth_bad_shallow_threshold - 130.0).abs() < f64::EPSILON);
    assert!((result.calibrated.stability_poor_threshold - 0.03).abs() < f64::EPSILON);
    assert!((result.confidence - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(result.validation_samples, 3);
    assert!(result.iterations > 0);
}

#[test]
fn test_calibration_never_makes_accuracy_worse() {
    let samples = vec![sample(70.0, 100.0), sample(90.0, 100.0), sample(170.0, 100.0)];
    let result = calibrator().calibrate(&samples).unwrap();

    assert!(result.calibrated_accuracy.safety.mae <= result.original_accuracy.safety.mae);
    assert!(result.calibrated_accuracy.depth.mae <= result.original_accuracy.depth.mae);
    assert!(result.calibrated_accuracy.stability.mae <= result.original_accuracy.stability.mae);
}

#[test]
fn test_fault_agreement_is_reported() {
    let samples = strict_raters();
    let report = calibrator()
        .evaluate(&ThresholdConfig::default(), &samples)
        .unwrap();

    assert_eq!(report.samples, 3);
    let agreement = report
        .fault_agreement
        .get(&FaultType::BackRounding)
        .copied()
        .expect("back rounding agreement");
    assert!(agreement < 1.0);
}

#[test]
fn test_calibration_needs_two_samples() {
    let samples = vec![sample(85.0, 80.0)];
    let err = calibrator().calibrate(&samples).unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::InsufficientData {
            required: 2,
            actual: 1
        }
    ));
}

// === History ===

#[test]
fn test_history_persists_applies_and_rolls_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("calibration.json");

    let mut history = CalibrationHistory::load(&path).unwrap();
    assert!(history.records().is_empty());

    let result = calibrator().calibrate(&strict_raters()).unwrap();
    let id = result.id;
    history.record(result);
    history.save(&path).unwrap();

    let mut reloaded = CalibrationHistory::load(&path).unwrap();
    assert_eq!(reloaded, history);
    assert_eq!(reloaded.latest().map(|r| r.id), Some(id));

    let applied = reloaded.apply(id).unwrap();
    assert_eq!(reloaded.active(), Some(id));
    assert!(applied.safety_moderate_back_rounding > 85.0);

    let restored = reloaded.rollback();
    assert_eq!(restored, ThresholdConfig::default());
    assert_eq!(reloaded.active(), None);
}

#[test]
fn test_apply_unknown_record_fails() {
    let mut history = CalibrationHistory::new();
    let err = history.apply(uuid::Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, CalibrationError::RecordNotFound(_)));
}

#[test]
fn test_corrupt_history_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calibration.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        CalibrationHistory::load(&path),
        Err(CalibrationError::Json(_))
    ));
}
