// ABOUTME: Per-session fatigue tracking from the drift of repetition metrics over a baseline
// ABOUTME: Scores duration, score, symmetry, and sway changes against the first completed reps
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Fatigue Monitor
//!
//! The first [`FATIGUE_BASELINE_REPS`] completed repetitions establish a
//! baseline. Every later repetition is compared with it:
//!
//! | Indicator | Trigger | Points |
//! |---|---|---|
//! | Duration | 15% longer than baseline | 25 |
//! | Score | dropped by 10% or more | 20 |
//! | Knee symmetry difference | 15% larger | 25 |
//! | Center-of-mass sway | 20% larger | 30 |
//!
//! The total is capped at 100 and mapped to a [`FatigueLevel`].

use formcoach_core::constants::processing::FATIGUE_BASELINE_REPS;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::analyzers::AnalyzerKind;
use crate::grader::RepetitionResult;
use crate::statistics;

const DURATION_INCREASE: f64 = 0.15;
const DURATION_POINTS: f64 = 25.0;
const SCORE_DROP: f64 = 0.10;
const SCORE_POINTS: f64 = 20.0;
const SYMMETRY_INCREASE: f64 = 0.15;
const SYMMETRY_POINTS: f64 = 25.0;
const SWAY_INCREASE: f64 = 0.20;
const SWAY_POINTS: f64 = 30.0;
const MAX_FATIGUE: f64 = 100.0;

/// Fatigue band
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FatigueLevel {
    /// Below 25
    #[default]
    Fresh,
    /// 25 to 50
    Moderate,
    /// 50 to 75
    High,
    /// 75 and above
    Exhausted,
}

impl FatigueLevel {
    /// Band for a fatigue score
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            Self::Fresh
        } else if score < 50.0 {
            Self::Moderate
        } else if score < 75.0 {
            Self::High
        } else {
            Self::Exhausted
        }
    }
}

/// Metrics of one repetition relevant to fatigue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepMetrics {
    /// Repetition duration in seconds
    pub duration: f64,
    /// Composite score
    pub score: f64,
    /// Mean left/right knee angle difference, when measured
    pub symmetry_difference: Option<f64>,
    /// Center-of-mass sway, when measured
    pub sway: Option<f64>,
}

impl RepMetrics {
    /// Pull the indicators out of a graded repetition
    #[must_use]
    pub fn from_result(result: &RepetitionResult) -> Self {
        let measurement = |kind: AnalyzerKind, key: &str| {
            result
                .analyzer_results
                .iter()
                .find(|r| r.kind == kind && r.evaluated)
                .and_then(|r| r.measurement(key))
        };
        Self {
            duration: result.duration_seconds,
            score: result.score,
            symmetry_difference: measurement(AnalyzerKind::Symmetry, "mean_knee_difference"),
            sway: measurement(AnalyzerKind::Stability, "sway"),
        }
    }
}

/// Averages of the baseline repetitions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueBaseline {
    /// Mean duration
    pub duration: f64,
    /// Mean score
    pub score: f64,
    /// Mean symmetry difference
    pub symmetry_difference: Option<f64>,
    /// Mean sway
    pub sway: Option<f64>,
}

impl FatigueBaseline {
    fn from_reps(reps: &[RepMetrics]) -> Option<Self> {
        Some(Self {
            duration: mean_of(reps, |r| Some(r.duration))?,
            score: mean_of(reps, |r| Some(r.score))?,
            symmetry_difference: mean_of(reps, |r| r.symmetry_difference),
            sway: mean_of(reps, |r| r.sway),
        })
    }
}

fn mean_of(reps: &[RepMetrics], signal: impl Fn(&RepMetrics) -> Option<f64>) -> Option<f64> {
    let values: Vec<f64> = reps.iter().filter_map(signal).collect();
    statistics::mean(&values)
}

/// Fatigue state after a repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueAssessment {
    /// Fatigue score in [0, 100]
    pub score: f64,
    /// Band of `score`
    pub level: FatigueLevel,
    /// Indicators that fired
    pub indicators: Vec<String>,
    /// False while the baseline is still being collected
    pub baseline_established: bool,
    /// Repetitions observed
    pub reps_observed: usize,
}

impl Default for FatigueAssessment {
    fn default() -> Self {
        Self {
            score: 0.0,
            level: FatigueLevel::Fresh,
            indicators: Vec::new(),
            baseline_established: false,
            reps_observed: 0,
        }
    }
}

/// Running fatigue tracker for one session
#[derive(Debug, Clone, Default)]
pub struct FatigueMonitor {
    warmup: Vec<RepMetrics>,
    baseline: Option<FatigueBaseline>,
    reps_observed: usize,
    latest: FatigueAssessment,
}

impl FatigueMonitor {
    /// Empty monitor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Baseline, once established
    #[must_use]
    pub const fn baseline(&self) -> Option<&FatigueBaseline> {
        self.baseline.as_ref()
    }

    /// Most recent assessment
    #[must_use]
    pub const fn latest(&self) -> &FatigueAssessment {
        &self.latest
    }

    /// Forget everything, for a new session
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a completed repetition and return the updated assessment
    pub fn record(&mut self, rep: RepMetrics) -> FatigueAssessment {
        self.reps_observed += 1;

        let Some(baseline) = self.baseline else {
            self.warmup.push(rep);
            if self.warmup.len() >= FATIGUE_BASELINE_REPS {
                self.baseline = FatigueBaseline::from_reps(&self.warmup);
                debug!(baseline = ?self.baseline, "fatigue baseline established");
            }
            self.latest = FatigueAssessment {
                baseline_established: self.baseline.is_some(),
                reps_observed: self.reps_observed,
                ..FatigueAssessment::default()
            };
            return self.latest.clone();
        };

        let mut score = 0.0;
        let mut indicators = Vec::new();

        if exceeds(rep.duration, baseline.duration, DURATION_INCREASE) {
            score += DURATION_POINTS;
            indicators.push("repetitions are slowing down".to_owned());
        }
        if baseline.score > 0.0 && (baseline.score - rep.score) / baseline.score >= SCORE_DROP {
            score += SCORE_POINTS;
            indicators.push("form score is dropping".to_owned());
        }
        if let (Some(current), Some(base)) = (rep.symmetry_difference, baseline.symmetry_difference) {
            if exceeds(current, base, SYMMETRY_INCREASE) {
                score += SYMMETRY_POINTS;
                indicators.push("left/right imbalance is growing".to_owned());
            }
        }
        if let (Some(current), Some(base)) = (rep.sway, baseline.sway) {
            if exceeds(current, base, SWAY_INCREASE) {
                score += SWAY_POINTS;
                indicators.push("balance is deteriorating".to_owned());
            }
        }

        let score: f64 = score.min(MAX_FATIGUE);
        self.latest = FatigueAssessment {
            score,
            level: FatigueLevel::from_score(score),
            indicators,
            baseline_established: true,
            reps_observed: self.reps_observed,
        };
        self.latest.clone()
    }
}

/// `current` is more than `fraction` above a positive `baseline`
fn exceeds(current: f64, baseline: f64, fraction: f64) -> bool {
    baseline > 0.0 && current > baseline * (1.0 + fraction)
}
