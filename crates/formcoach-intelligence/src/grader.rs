// ABOUTME: Form grader combining the nine analyzer results into one repetition score
// ABOUTME: Owns difficulty configuration, applies weights, safety gate, and confidence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Form Grader
//!
//! Grading a repetition:
//!
//! 1. Run every analyzer on the same window with the config snapshot taken
//!    when the repetition began.
//! 2. Composite = sum of sub-score x weight (skipped analyzers count as 100).
//! 3. Merge faults from all analyzers, deduplicate, apply the fault hierarchy
//!    and order safety-first, most severe first.
//! 4. Add the clean-rep bonus when no faults are reported (at most 105).
//! 5. Cap the composite at the safety sub-score when a critical safety fault
//!    is present, so no weighting can average a dangerous rep into a pass.
//! 6. Cap the composite at the lowest score any more lenient level awards the
//!    same window. Levels shift weight between analyzers, so without this a
//!    stricter level could outscore a lenient one on a rep with a fault the
//!    stricter weights discount.
//! 7. Clamp to [0, 100] and attach the difficulty context used.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use formcoach_core::constants::scores::{MAX_SCORE, MIN_SCORE};
use formcoach_core::errors::ConfigError;
use formcoach_core::models::{DifficultyLevel, Fault, FaultCategory, FaultSeverity, UserProfile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analyzers::{AnalyzerKind, AnalyzerResult, AnalyzerSuite};
use crate::config::{difficulty_profile, ActiveConfig, ComponentWeights, ConfigStore, ThresholdConfig};
use crate::hierarchy::filter_faults;
use crate::recommendations::{coaching_cues, Assessment};
use crate::statistics;
use crate::window::RepetitionWindow;

/// Scoring method label recorded on every result
pub const SCORING_METHOD: &str = "weighted_analyzer_composite";

/// One analyzer's contribution to the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    /// Analyzer
    pub kind: AnalyzerKind,
    /// Sub-score in [0, 100]
    pub score: f64,
    /// Weight at the grading level
    pub weight: f64,
    /// `score * weight`
    pub weighted: f64,
    /// False when the analyzer returned a neutral skip
    pub evaluated: bool,
}

/// Difficulty context used to grade a repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingContext {
    /// Config version the repetition was graded with
    pub config_version: u64,
    /// Difficulty level
    pub level: DifficultyLevel,
    /// Threshold multiplier applied
    pub threshold_multiplier: f64,
    /// Weight distribution applied
    pub weights: ComponentWeights,
    /// Lowest score a more lenient level gives the same window, if any level is more lenient
    pub lenient_ceiling: Option<f64>,
}

/// Final, immutable output for one repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepetitionResult {
    /// Unique result id
    pub id: Uuid,
    /// Repetition number within the session
    pub rep_number: u32,
    /// When the result was produced
    pub graded_at: DateTime<Utc>,
    /// Composite score clamped to [0, 100]
    pub score: f64,
    /// Composite at the grading level before the lenient ceiling and clamping
    /// (the clean-rep bonus may lift it to 105)
    pub raw_score: f64,
    /// Reported faults: deduplicated, filtered, most important first
    pub faults: Vec<Fault>,
    /// Every fault any analyzer produced
    pub raw_faults: Vec<Fault>,
    /// Per-analyzer breakdown in registry order
    pub components: Vec<ComponentScore>,
    /// Full analyzer outputs for explainability
    pub analyzer_results: Vec<AnalyzerResult>,
    /// Grading confidence in [0, 100]
    pub confidence: f64,
    /// Confidence fell below the configured floor
    pub low_confidence: bool,
    /// Up to three coaching cues
    pub recommendations: Vec<String>,
    /// Score band
    pub assessment: Assessment,
    /// Difficulty context
    pub context: GradingContext,
    /// Frames in the window
    pub frame_count: usize,
    /// Window duration in seconds
    pub duration_seconds: f64,
    /// How the composite was computed
    pub scoring_method: String,
}

impl RepetitionResult {
    /// Sub-score of one analyzer
    #[must_use]
    pub fn component(&self, kind: AnalyzerKind) -> Option<&ComponentScore> {
        self.components.iter().find(|c| c.kind == kind)
    }

    /// Whether any reported fault is in the safety category
    #[must_use]
    pub fn has_safety_fault(&self) -> bool {
        self.faults.iter().any(Fault::is_safety)
    }
}

/// Analyzer orchestration plus the configuration it grades with
#[derive(Debug)]
pub struct FormGrader {
    suite: AnalyzerSuite,
    parallel: bool,
    defaults: ThresholdConfig,
    store: Arc<ConfigStore>,
}

impl FormGrader {
    /// Grader over a shared config store
    #[must_use]
    pub fn new(store: Arc<ConfigStore>) -> Self {
        let defaults = store.snapshot().base.clone();
        Self {
            suite: AnalyzerSuite::standard(),
            parallel: false,
            defaults,
            store,
        }
    }

    /// Grader with its own store
    ///
    /// # Errors
    ///
    /// Returns the validation error for an invalid base config.
    pub fn with_config(level: DifficultyLevel, base: ThresholdConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Arc::new(ConfigStore::new(level, base)?)))
    }

    /// Run analyzers on the rayon pool
    #[must_use]
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Shared config store
    #[must_use]
    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Current configuration version
    #[must_use]
    pub fn snapshot(&self) -> Arc<ActiveConfig> {
        self.store.snapshot()
    }

    /// Select the threshold multiplier and weights for `level`
    ///
    /// # Errors
    ///
    /// Returns the validation error; the previous config stays active.
    pub fn set_difficulty(&self, level: DifficultyLevel) -> Result<Arc<ActiveConfig>, ConfigError> {
        self.store.set_difficulty(level)
    }

    /// Apply a user's level and personal overrides on top of the grader defaults
    ///
    /// # Errors
    ///
    /// Returns the validation error; the previous config stays active.
    pub fn set_user_profile(&self, profile: &UserProfile) -> Result<Arc<ActiveConfig>, ConfigError> {
        self.store.apply_user_profile(profile, &self.defaults)
    }

    /// Grade with the current config version
    #[must_use]
    pub fn grade_current(&self, window: &RepetitionWindow, rep_number: u32) -> RepetitionResult {
        self.grade(window, &self.snapshot(), rep_number)
    }

    /// Grade a completed window with the config captured when it began
    #[must_use]
    pub fn grade(&self, window: &RepetitionWindow, config: &ActiveConfig, rep_number: u32) -> RepetitionResult {
        let thresholds = &config.effective;
        let weights = config.profile.weights;
        let Composite {
            results,
            components,
            raw_faults,
            faults,
            raw_score,
        } = self.composite(window, thresholds, weights);

        let lenient_ceiling = self.lenient_ceiling(window, config);
        let score = lenient_ceiling
            .map_or(raw_score, |ceiling| raw_score.min(ceiling))
            .clamp(MIN_SCORE, MAX_SCORE);

        let confidence = confidence(window, &components);
        let low_confidence = confidence < thresholds.grader_low_confidence_threshold;
        if low_confidence {
            debug!(rep = rep_number, confidence, "low-confidence grading");
        }

        let result = RepetitionResult {
            id: Uuid::new_v4(),
            rep_number,
            graded_at: Utc::now(),
            score,
            raw_score,
            recommendations: coaching_cues(&faults),
            assessment: Assessment::from_score(score),
            faults,
            raw_faults,
            components,
            analyzer_results: results,
            confidence,
            low_confidence,
            context: GradingContext {
                config_version: config.version,
                level: config.level(),
                threshold_multiplier: config.profile.threshold_multiplier,
                weights,
                lenient_ceiling,
            },
            frame_count: window.len(),
            duration_seconds: window.duration_seconds(thresholds.frame_rate),
            scoring_method: SCORING_METHOD.to_owned(),
        };

        info!(
            rep = rep_number,
            score = result.score,
            faults = result.faults.len(),
            level = %result.context.level,
            config.version = config.version,
            "repetition graded"
        );
        result
    }

    /// Weighted composite of one analyzer pass, with bonus and safety gate applied
    fn composite(
        &self,
        window: &RepetitionWindow,
        thresholds: &ThresholdConfig,
        weights: ComponentWeights,
    ) -> Composite {
        let results = self.suite.run(window, thresholds, self.parallel);

        let components: Vec<ComponentScore> = results
            .iter()
            .map(|result| {
                let weight = weights.get(result.kind);
                ComponentScore {
                    kind: result.kind,
                    score: result.score,
                    weight,
                    weighted: result.score * weight,
                    evaluated: result.evaluated,
                }
            })
            .collect();
        let weighted: f64 = components.iter().map(|c| c.weighted).sum();

        let raw_faults: Vec<Fault> = results.iter().flat_map(|r| r.faults.iter().cloned()).collect();
        let faults = filter_faults(&raw_faults);

        let mut raw_score = weighted;
        if faults.is_empty() {
            raw_score += thresholds.grader_clean_rep_bonus;
        }
        if let Some(cap) = safety_cap(&results, &raw_faults) {
            raw_score = raw_score.min(cap);
        }

        Composite {
            results,
            components,
            raw_faults,
            faults,
            raw_score,
        }
    }

    /// Lowest clamped score the levels below `config`'s level give this window
    ///
    /// Each lenient level grades with the same base thresholds scaled by its
    /// own multiplier and its own weights, exactly as a grader at that level would.
    fn lenient_ceiling(&self, window: &RepetitionWindow, config: &ActiveConfig) -> Option<f64> {
        let ceiling = DifficultyLevel::ALL
            .into_iter()
            .take_while(|level| *level < config.level())
            .filter_map(|level| {
                let profile = difficulty_profile(level);
                let thresholds = config.base.scaled(profile.threshold_multiplier).ok()?;
                let composite = self.composite(window, &thresholds, profile.weights);
                Some(composite.raw_score.clamp(MIN_SCORE, MAX_SCORE))
            })
            .reduce(f64::min);
        if let Some(ceiling) = ceiling {
            debug!(level = %config.level(), ceiling, "lenient-level ceiling");
        }
        ceiling
    }
}

/// One analyzer pass combined under one weight distribution
struct Composite {
    results: Vec<AnalyzerResult>,
    components: Vec<ComponentScore>,
    raw_faults: Vec<Fault>,
    faults: Vec<Fault>,
    raw_score: f64,
}

/// Safety sub-score when a critical safety fault is present
fn safety_cap(results: &[AnalyzerResult], faults: &[Fault]) -> Option<f64> {
    let critical = faults
        .iter()
        .any(|f| f.category == FaultCategory::Safety && f.severity == FaultSeverity::Critical);
    if !critical {
        return None;
    }
    results
        .iter()
        .find(|r| r.kind == AnalyzerKind::Safety)
        .map(|r| r.score)
}

/// Grading confidence in [0, 100]
///
/// Mean of four factors (frame count, phase coverage, primary-angle
/// smoothness, visibility), then scaled by the share of weight whose analyzer
/// actually ran.
fn confidence(window: &RepetitionWindow, components: &[ComponentScore]) -> f64 {
    if window.is_empty() {
        return 0.0;
    }
    let frame_factor = (window.len() as f64 * 2.0).min(100.0);
    let phase_factor = window.phase_coverage() as f64 / 4.0 * 100.0;
    let visibility_factor = window.mean_visibility() * 100.0;

    let angles = window.primary_angles();
    let jerk: Vec<f64> = angles
        .windows(3)
        .map(|w| (w[2] - 2.0 * w[1] + w[0]).abs())
        .collect();
    let consistency_factor = statistics::mean(&jerk).map_or(50.0, |j| (100.0 - j * 10.0).max(0.0));

    let base = (frame_factor + phase_factor + consistency_factor + visibility_factor) / 4.0;

    let active: f64 = components.iter().map(|c| c.weight).sum();
    let evaluated: f64 = components.iter().filter(|c| c.evaluated).map(|c| c.weight).sum();
    let share = if active > 0.0 { evaluated / active } else { 0.0 };

    (base * 0.5f64.mul_add(share, 0.5)).clamp(0.0, 100.0)
}
