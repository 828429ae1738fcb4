// ABOUTME: Threshold calibration against human expert ratings of recorded repetitions
// ABOUTME: Golden-section search per threshold group, minimizing mean absolute error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Calibration
//!
//! A calibration run grades every labeled sample with the current thresholds,
//! then searches one strictness factor per threshold group (safety, depth,
//! stability) that brings the machine sub-scores closest to the expert's.
//! Groups are tuned one after another so each search sees the improvements
//! already made. A factor is kept only when it lowers the error.

/// Persisted calibration results with apply and rollback
pub mod history;
/// Accuracy metrics and inter-rater agreement
pub mod metrics;

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use formcoach_core::errors::ConfigError;
use formcoach_core::models::{DifficultyLevel, FaultType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::analyzers::AnalyzerKind;
use crate::config::{ActiveConfig, ParameterGroup, ThresholdConfig};
use crate::grader::FormGrader;
use crate::window::RepetitionWindow;

pub use history::CalibrationHistory;
pub use metrics::{cohen_kappa, AccuracyMetrics, AccuracyReport, ComponentScores};

/// Minimum labeled samples for a calibration run
pub const MIN_CALIBRATION_SAMPLES: usize = 2;
/// Search interval for group strictness factors
pub const FACTOR_RANGE: (f64, f64) = (0.5, 1.5);

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_749_895;
const DEFAULT_TOLERANCE: f64 = 0.01;
const DEFAULT_MAX_ITERATIONS: usize = 40;
const MIN_IMPROVEMENT: f64 = 1e-9;

/// Calibration failures
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// Too few labeled samples
    #[error("calibration needs at least {required} samples, got {actual}")]
    InsufficientData {
        /// Required sample count
        required: usize,
        /// Provided sample count
        actual: usize,
    },
    /// No calibration with this id in the history
    #[error("calibration record not found: {0}")]
    RecordNotFound(String),
    /// Base or calibrated thresholds failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// History file could not be read or written
    #[error("calibration history I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// History or samples file is malformed
    #[error("calibration JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Expert scores for one repetition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HumanRating {
    /// Composite score
    pub overall: f64,
    /// Back safety
    pub safety: f64,
    /// Depth
    pub depth: f64,
    /// Stability
    pub stability: f64,
}

impl From<HumanRating> for ComponentScores {
    fn from(rating: HumanRating) -> Self {
        Self {
            overall: rating.overall,
            safety: rating.safety,
            depth: rating.depth,
            stability: rating.stability,
        }
    }
}

/// One labeled repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationSample {
    /// Frames of the repetition
    pub window: RepetitionWindow,
    /// Expert scores
    pub human: HumanRating,
    /// Faults the expert observed
    #[serde(default)]
    pub human_faults: BTreeSet<FaultType>,
}

/// Reduction in mean absolute error per component (positive is better)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImprovementSummary {
    /// Composite score
    pub overall_mae: f64,
    /// Safety sub-score
    pub safety_mae: f64,
    /// Depth sub-score
    pub depth_mae: f64,
    /// Stability sub-score
    pub stability_mae: f64,
}

impl ImprovementSummary {
    fn between(before: &AccuracyReport, after: &AccuracyReport) -> Self {
        Self {
            overall_mae: before.overall.mae - after.overall.mae,
            safety_mae: before.safety.mae - after.safety.mae,
            depth_mae: before.depth.mae - after.depth.mae,
            stability_mae: before.stability.mae - after.stability.mae,
        }
    }
}

/// Outcome of one calibration run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    /// Record id
    pub id: Uuid,
    /// When the run finished
    pub timestamp: DateTime<Utc>,
    /// Difficulty level the samples were graded at
    pub level: DifficultyLevel,
    /// Thresholds before calibration
    pub original: ThresholdConfig,
    /// Validated thresholds after calibration
    pub calibrated: ThresholdConfig,
    /// Accuracy before
    pub original_accuracy: AccuracyReport,
    /// Accuracy after
    pub calibrated_accuracy: AccuracyReport,
    /// Error reduction per component
    pub improvement: ImprovementSummary,
    /// Objective evaluations across all searches
    pub iterations: usize,
    /// Every search reached the tolerance before the iteration limit
    pub converged: bool,
    /// Labeled samples used
    pub validation_samples: usize,
    /// Share of tuned groups that improved, 0 to 100
    pub confidence: f64,
}

/// Calibration engine for one difficulty level
#[derive(Debug)]
pub struct Calibrator {
    level: DifficultyLevel,
    base: ThresholdConfig,
    grader: FormGrader,
    tolerance: f64,
    max_iterations: usize,
}

impl Calibrator {
    /// Calibrator starting from `base` thresholds
    ///
    /// # Errors
    ///
    /// Returns `Config` when `base` is invalid.
    pub fn new(level: DifficultyLevel, base: ThresholdConfig) -> Result<Self, CalibrationError> {
        let grader = FormGrader::with_config(level, base.clone())?;
        Ok(Self {
            level,
            base,
            grader,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        })
    }

    /// Override the search tolerance and iteration limit
    #[must_use]
    pub fn with_search(mut self, tolerance: f64, max_iterations: usize) -> Self {
        self.tolerance = tolerance;
        self.max_iterations = max_iterations;
        self
    }

    /// Accuracy of `config` over `samples`
    ///
    /// # Errors
    ///
    /// Returns the validation error when `config` is invalid.
    pub fn evaluate(
        &self,
        config: &ThresholdConfig,
        samples: &[CalibrationSample],
    ) -> Result<AccuracyReport, ConfigError> {
        let active = ActiveConfig::build(0, self.level, config.clone())?;
        let mut machine = Vec::with_capacity(samples.len());
        let mut machine_faults = Vec::with_capacity(samples.len());

        for (index, sample) in samples.iter().enumerate() {
            let result = self.grader.grade(&sample.window, &active, index as u32 + 1);
            let sub_score = |kind| result.component(kind).map_or(100.0, |c| c.score);
            machine.push(ComponentScores {
                overall: result.score,
                safety: sub_score(AnalyzerKind::Safety),
                depth: sub_score(AnalyzerKind::Depth),
                stability: sub_score(AnalyzerKind::Stability),
            });
            machine_faults.push(result.faults.iter().map(|f| f.fault_type).collect::<BTreeSet<_>>());
        }

        let human: Vec<ComponentScores> = samples.iter().map(|s| s.human.into()).collect();
        let human_faults: Vec<BTreeSet<FaultType>> =
            samples.iter().map(|s| s.human_faults.clone()).collect();
        Ok(AccuracyReport::build(&machine, &human, &machine_faults, &human_faults))
    }

    /// Run a full calibration
    ///
    /// # Errors
    ///
    /// Returns `InsufficientData` for fewer than two samples and `Config`
    /// when the base thresholds are invalid.
    pub fn calibrate(&self, samples: &[CalibrationSample]) -> Result<CalibrationResult, CalibrationError> {
        if samples.len() < MIN_CALIBRATION_SAMPLES {
            return Err(CalibrationError::InsufficientData {
                required: MIN_CALIBRATION_SAMPLES,
                actual: samples.len(),
            });
        }

        let original_accuracy = self.evaluate(&self.base, samples)?;
        let mut current = self.base.clone();
        let mut iterations = 0;
        let mut converged = true;
        let mut improved_groups = 0_usize;

        let groups: [(ParameterGroup, fn(&AccuracyReport) -> f64); 3] = [
            (ParameterGroup::Safety, |r| r.safety.mae),
            (ParameterGroup::Depth, |r| r.depth.mae),
            (ParameterGroup::Stability, |r| r.stability.mae),
        ];

        for (group, error_of) in groups {
            let before = self
                .evaluate(&current, samples)
                .map_or(f64::INFINITY, |r| error_of(&r));
            let objective = |factor: f64| {
                let candidate = current.with_group_strictness(group, factor);
                self.evaluate(&candidate, samples)
                    .map_or(f64::INFINITY, |r| error_of(&r))
            };
            let search = golden_section(objective, FACTOR_RANGE, self.tolerance, self.max_iterations);
            iterations += search.evaluations;
            converged &= search.converged;

            debug!(
                ?group,
                factor = search.argmin,
                before,
                after = search.min,
                "calibration search finished"
            );
            if search.min < before - MIN_IMPROVEMENT {
                current = current.with_group_strictness(group, search.argmin);
                improved_groups += 1;
            }
        }

        current.validate()?;
        let calibrated_accuracy = self.evaluate(&current, samples)?;
        let improvement = ImprovementSummary::between(&original_accuracy, &calibrated_accuracy);
        let confidence = improved_groups as f64 / groups.len() as f64 * 100.0;

        info!(
            level = %self.level,
            samples = samples.len(),
            overall_mae_before = original_accuracy.overall.mae,
            overall_mae_after = calibrated_accuracy.overall.mae,
            improved_groups,
            "calibration complete"
        );

        Ok(CalibrationResult {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level: self.level,
            original: self.base.clone(),
            calibrated: current,
            original_accuracy,
            calibrated_accuracy,
            improvement,
            iterations,
            converged,
            validation_samples: samples.len(),
            confidence,
        })
    }
}

/// Result of a one-dimensional minimization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Best argument found
    pub argmin: f64,
    /// Objective at `argmin`
    pub min: f64,
    /// Objective evaluations performed
    pub evaluations: usize,
    /// Interval shrank below the tolerance
    pub converged: bool,
}

/// Golden-section search for the minimum of `f` on `[lo, hi]`
///
/// Assumes `f` is unimodal on the interval. Non-finite objective values are
/// treated as worse than any finite value.
pub fn golden_section<F>(mut f: F, (lo, hi): (f64, f64), tolerance: f64, max_iterations: usize) -> SearchOutcome
where
    F: FnMut(f64) -> f64,
{
    let (mut a, mut b) = (lo, hi);
    let mut c = b - GOLDEN_RATIO_CONJUGATE * (b - a);
    let mut d = a + GOLDEN_RATIO_CONJUGATE * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    let mut evaluations = 2;

    while (b - a).abs() > tolerance && evaluations < max_iterations {
        if fc <= fd {
            b = d;
            d = c;
            fd = fc;
            c = b - GOLDEN_RATIO_CONJUGATE * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + GOLDEN_RATIO_CONJUGATE * (b - a);
            fd = f(d);
        }
        evaluations += 1;
    }

    let (argmin, min) = if fc <= fd { (c, fc) } else { (d, fd) };
    SearchOutcome {
        argmin,
        min,
        evaluations,
        converged: (b - a).abs() <= tolerance,
    }
}
