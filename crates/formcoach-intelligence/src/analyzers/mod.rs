// ABOUTME: Analyzer capability trait, result types, and the fixed ordered analyzer suite
// ABOUTME: Each analyzer is a stateless pure function of (window, thresholds)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Analyzer Suite
//!
//! Nine independent rule modules, each scoring one biomechanical dimension of
//! a completed repetition. Every analyzer starts from a 100-point baseline,
//! subtracts penalties and adds capped bonuses. An analyzer whose input data
//! is missing returns a neutral 100 with `evaluated = false` instead of
//! failing, so the grader can always proceed.

use std::collections::BTreeMap;
use std::fmt;

use formcoach_core::constants::scores::{BASELINE_SCORE, MAX_SCORE, MIN_SCORE};
use formcoach_core::models::{BiomechanicalMetrics, Fault, LandmarkId};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ThresholdConfig;
use crate::window::{JointSelection, RepetitionWindow};

/// Back-rounding safety
pub mod safety;
/// Squat depth
pub mod depth;
/// Center-of-mass stability
pub mod stability;
/// Repetition tempo
pub mod tempo;
/// Left/right symmetry
pub mod symmetry;
/// Lumbar flexion at the bottom
pub mod butt_wink;
/// Knee collapse
pub mod knee_valgus;
/// Head alignment
pub mod head_position;
/// Heel lift
pub mod foot_stability;

pub use butt_wink::ButtWinkAnalyzer;
pub use depth::DepthAnalyzer;
pub use foot_stability::FootStabilityAnalyzer;
pub use head_position::HeadPositionAnalyzer;
pub use knee_valgus::KneeValgusAnalyzer;
pub use safety::SafetyAnalyzer;
pub use stability::StabilityAnalyzer;
pub use symmetry::SymmetryAnalyzer;
pub use tempo::TempoAnalyzer;

/// Identity of each analyzer, in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    /// Back-rounding safety
    Safety,
    /// Depth
    Depth,
    /// Center-of-mass stability
    Stability,
    /// Tempo
    Tempo,
    /// Bilateral symmetry
    Symmetry,
    /// Butt wink
    ButtWink,
    /// Knee valgus
    KneeValgus,
    /// Head position
    HeadPosition,
    /// Foot stability
    FootStability,
}

impl AnalyzerKind {
    /// Every analyzer in registry order
    pub const ALL: [Self; 9] = [
        Self::Safety,
        Self::Depth,
        Self::Stability,
        Self::Tempo,
        Self::Symmetry,
        Self::ButtWink,
        Self::KneeValgus,
        Self::HeadPosition,
        Self::FootStability,
    ];

    /// Stable snake_case name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Depth => "depth",
            Self::Stability => "stability",
            Self::Tempo => "tempo",
            Self::Symmetry => "symmetry",
            Self::ButtWink => "butt_wink",
            Self::KneeValgus => "knee_valgus",
            Self::HeadPosition => "head_position",
            Self::FootStability => "foot_stability",
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Data an analyzer needs before it can score a window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRequirement {
    /// Primary (knee or hip) angle
    PrimaryAngle,
    /// Back angle
    BackAngle,
    /// Both knee angles in the same frame
    BilateralKnees,
    /// Center of mass
    CenterOfMass,
    /// Specific landmarks, all visible in the same frame
    Landmarks(&'static [LandmarkId]),
    /// At least one of several landmark groups, all visible in the same frame
    AnyLandmarks(&'static [&'static [LandmarkId]]),
}

/// Frames that must carry a required signal
pub const MIN_SIGNAL_FRAMES: usize = 2;

impl DataRequirement {
    fn frame_has(&self, frame: &BiomechanicalMetrics, min_visibility: f64) -> bool {
        match self {
            Self::PrimaryAngle => JointSelection::default().angle(frame, 0.0).is_some(),
            Self::BackAngle => frame.angles.back.is_some(),
            Self::BilateralKnees => frame.angles.knee_asymmetry().is_some(),
            Self::CenterOfMass => frame.center_of_mass.is_some(),
            Self::Landmarks(ids) => frame
                .landmarks
                .as_ref()
                .is_some_and(|lm| lm.has_all(ids, min_visibility)),
            Self::AnyLandmarks(groups) => frame.landmarks.as_ref().is_some_and(|lm| {
                groups.iter().any(|ids| lm.has_all(ids, min_visibility))
            }),
        }
    }

    /// Whether enough frames of `window` carry this signal
    #[must_use]
    pub fn is_met(&self, window: &RepetitionWindow, min_visibility: f64) -> bool {
        window
            .frames()
            .iter()
            .filter(|frame| self.frame_has(frame, min_visibility))
            .take(MIN_SIGNAL_FRAMES)
            .count()
            >= MIN_SIGNAL_FRAMES
    }

    /// Short description used in skip reasons
    #[must_use]
    pub const fn describe(&self) -> &'static str {
        match self {
            Self::PrimaryAngle => "primary joint angle",
            Self::BackAngle => "back angle",
            Self::BilateralKnees => "both knee angles",
            Self::CenterOfMass => "center of mass",
            Self::Landmarks(_) | Self::AnyLandmarks(_) => "pose landmarks",
        }
    }
}

/// One line of a score breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
    /// What caused the adjustment
    pub reason: String,
    /// Points removed (penalty) or added (bonus), always non-negative
    pub points: f64,
}

/// Output of one analyzer for one repetition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerResult {
    /// Which analyzer produced this
    pub kind: AnalyzerKind,
    /// Sub-score in [0, 100]
    pub score: f64,
    /// Faults detected
    pub faults: Vec<Fault>,
    /// Penalties applied
    pub penalties: Vec<ScoreAdjustment>,
    /// Bonuses applied
    pub bonuses: Vec<ScoreAdjustment>,
    /// Named measurements behind the decision
    pub measurements: BTreeMap<String, f64>,
    /// False when the analyzer could not run and returned a neutral result
    pub evaluated: bool,
    /// Why the analyzer was skipped
    pub skip_reason: Option<String>,
}

impl AnalyzerResult {
    /// Neutral baseline for a window the analyzer could not assess
    #[must_use]
    pub fn neutral(kind: AnalyzerKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            score: BASELINE_SCORE,
            faults: Vec::new(),
            penalties: Vec::new(),
            bonuses: Vec::new(),
            measurements: BTreeMap::new(),
            evaluated: false,
            skip_reason: Some(reason.into()),
        }
    }

    /// A measurement by name
    #[must_use]
    pub fn measurement(&self, key: &str) -> Option<f64> {
        self.measurements.get(key).copied()
    }
}

/// Accumulates penalties, bonuses and faults into an `AnalyzerResult`
#[derive(Debug, Clone)]
pub struct ScoreCard {
    kind: AnalyzerKind,
    penalties: Vec<ScoreAdjustment>,
    bonuses: Vec<ScoreAdjustment>,
    faults: Vec<Fault>,
    measurements: BTreeMap<String, f64>,
}

impl ScoreCard {
    /// Empty card at the 100-point baseline
    #[must_use]
    pub const fn new(kind: AnalyzerKind) -> Self {
        Self {
            kind,
            penalties: Vec::new(),
            bonuses: Vec::new(),
            faults: Vec::new(),
            measurements: BTreeMap::new(),
        }
    }

    /// Record a measurement
    #[must_use]
    pub fn measure(mut self, key: &str, value: f64) -> Self {
        self.measurements.insert(key.to_owned(), value);
        self
    }

    /// Record a fault with its penalty
    #[must_use]
    pub fn fault(mut self, fault: Fault, points: f64) -> Self {
        self.penalties.push(ScoreAdjustment {
            reason: fault.fault_type.as_str().to_owned(),
            points: points.max(0.0),
        });
        self.faults.push(fault);
        self
    }

    /// Record a penalty that is not a fault
    #[must_use]
    pub fn penalty(mut self, reason: &str, points: f64) -> Self {
        self.penalties.push(ScoreAdjustment {
            reason: reason.to_owned(),
            points: points.max(0.0),
        });
        self
    }

    /// Record a bonus
    #[must_use]
    pub fn bonus(mut self, reason: &str, points: f64) -> Self {
        self.bonuses.push(ScoreAdjustment {
            reason: reason.to_owned(),
            points: points.max(0.0),
        });
        self
    }

    /// Net score, clamped so bonuses can never lift it above 100
    #[must_use]
    pub fn score(&self) -> f64 {
        let penalty: f64 = self.penalties.iter().map(|p| p.points).sum();
        let bonus: f64 = self.bonuses.iter().map(|b| b.points).sum();
        (BASELINE_SCORE - penalty + bonus).clamp(MIN_SCORE, MAX_SCORE)
    }

    /// Finalize into an evaluated result
    #[must_use]
    pub fn finish(self) -> AnalyzerResult {
        AnalyzerResult {
            kind: self.kind,
            score: self.score(),
            faults: self.faults,
            penalties: self.penalties,
            bonuses: self.bonuses,
            measurements: self.measurements,
            evaluated: true,
            skip_reason: None,
        }
    }
}

/// Capability shared by all nine analyzers
pub trait FormAnalyzer: Send + Sync {
    /// Which analyzer this is
    fn kind(&self) -> AnalyzerKind;

    /// Signals that must be present for `analyze` to score the window
    fn requirements(&self) -> &'static [DataRequirement];

    /// Score a window; must be a pure function of its inputs
    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult;

    /// Check requirements, then analyze; never fails
    fn evaluate(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        if window.is_empty() {
            return AnalyzerResult::neutral(self.kind(), "empty repetition window");
        }
        if let Some(missing) = self
            .requirements()
            .iter()
            .find(|req| !req.is_met(window, config.min_landmark_visibility))
        {
            return AnalyzerResult::neutral(
                self.kind(),
                format!("insufficient {} data", missing.describe()),
            );
        }
        self.analyze(window, config)
    }
}

/// Fixed, ordered registry of the nine analyzers
pub struct AnalyzerSuite {
    analyzers: Vec<Box<dyn FormAnalyzer>>,
}

impl fmt::Debug for AnalyzerSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.analyzers.iter().map(|a| a.kind()))
            .finish()
    }
}

impl Default for AnalyzerSuite {
    fn default() -> Self {
        Self::standard()
    }
}

impl AnalyzerSuite {
    /// All nine analyzers in `AnalyzerKind::ALL` order
    #[must_use]
    pub fn standard() -> Self {
        Self {
            analyzers: vec![
                Box::new(SafetyAnalyzer),
                Box::new(DepthAnalyzer),
                Box::new(StabilityAnalyzer),
                Box::new(TempoAnalyzer),
                Box::new(SymmetryAnalyzer),
                Box::new(ButtWinkAnalyzer),
                Box::new(KneeValgusAnalyzer),
                Box::new(HeadPositionAnalyzer),
                Box::new(FootStabilityAnalyzer),
            ],
        }
    }

    /// Number of registered analyzers
    #[must_use]
    pub fn len(&self) -> usize {
        self.analyzers.len()
    }

    /// True when no analyzer is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.analyzers.is_empty()
    }

    /// Run every analyzer on the same window and config, in registry order
    #[must_use]
    pub fn run(
        &self,
        window: &RepetitionWindow,
        config: &ThresholdConfig,
        parallel: bool,
    ) -> Vec<AnalyzerResult> {
        if parallel {
            self.analyzers
                .par_iter()
                .map(|analyzer| analyzer.evaluate(window, config))
                .collect()
        } else {
            self.analyzers
                .iter()
                .map(|analyzer| analyzer.evaluate(window, config))
                .collect()
        }
    }
}

/// Frames near the deepest point of the repetition
///
/// A frame belongs to the bottom when its primary angle is within `margin`
/// degrees of the window minimum. Falls back to every frame when no primary
/// angle is available.
#[must_use]
pub fn bottom_frame_indices(window: &RepetitionWindow, margin: f64) -> Vec<usize> {
    let selection = JointSelection::default();
    let angles: Vec<Option<f64>> = window
        .frames()
        .iter()
        .map(|frame| selection.angle(frame, 0.0))
        .collect();
    let Some(deepest) = angles.iter().flatten().copied().reduce(f64::min) else {
        return (0..window.len()).collect();
    };
    angles
        .iter()
        .enumerate()
        .filter_map(|(i, angle)| angle.filter(|a| *a <= deepest + margin).map(|_| i))
        .collect()
}

/// Penalty proportional to relative excess over a threshold, capped
#[must_use]
pub fn relative_penalty(excess: f64, threshold: f64, max_penalty: f64) -> f64 {
    if threshold <= 0.0 {
        return max_penalty;
    }
    (excess / threshold * 100.0).clamp(0.0, max_penalty)
}
