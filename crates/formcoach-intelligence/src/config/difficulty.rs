// ABOUTME: Pure mapping from difficulty level to threshold multiplier and component weights
// ABOUTME: Keeps strictness and weighting in one place so the safety invariants are testable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Difficulty Profiles
//!
//! A level selects two things at once: how strict every threshold is (the
//! multiplier, smaller is stricter) and how much each analyzer contributes
//! to the composite score. Both come from [`difficulty_profile`] so they can
//! never drift apart. Across levels ordered from beginner to expert the
//! multiplier never increases and the safety weight never decreases.

use formcoach_core::constants::scores::WEIGHT_SUM_TOLERANCE;
use formcoach_core::errors::ConfigError;
use formcoach_core::models::DifficultyLevel;
use serde::{Deserialize, Serialize};

use crate::analyzers::AnalyzerKind;

/// Weight of each analyzer in the composite score
///
/// A weight of zero means the analyzer still runs but does not affect the
/// composite; weights of active analyzers must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentWeights {
    /// Back-rounding safety
    pub safety: f64,
    /// Depth
    pub depth: f64,
    /// Center-of-mass stability
    pub stability: f64,
    /// Tempo
    pub tempo: f64,
    /// Bilateral symmetry
    pub symmetry: f64,
    /// Butt wink
    pub butt_wink: f64,
    /// Knee valgus
    pub knee_valgus: f64,
    /// Head position
    pub head_position: f64,
    /// Foot stability
    pub foot_stability: f64,
}

impl ComponentWeights {
    /// Weight for one analyzer
    #[must_use]
    pub const fn get(&self, kind: AnalyzerKind) -> f64 {
        match kind {
            AnalyzerKind::Safety => self.safety,
            AnalyzerKind::Depth => self.depth,
            AnalyzerKind::Stability => self.stability,
            AnalyzerKind::Tempo => self.tempo,
            AnalyzerKind::Symmetry => self.symmetry,
            AnalyzerKind::ButtWink => self.butt_wink,
            AnalyzerKind::KneeValgus => self.knee_valgus,
            AnalyzerKind::HeadPosition => self.head_position,
            AnalyzerKind::FootStability => self.foot_stability,
        }
    }

    /// Sum of all weights
    #[must_use]
    pub fn total(&self) -> f64 {
        AnalyzerKind::ALL.iter().map(|kind| self.get(*kind)).sum()
    }

    /// Number of analyzers with a non-zero weight
    #[must_use]
    pub fn active_count(&self) -> usize {
        AnalyzerKind::ALL
            .iter()
            .filter(|kind| self.get(**kind) > 0.0)
            .count()
    }

    /// Check every weight lies in [0, 1] and the total is 1.0
    ///
    /// # Errors
    ///
    /// Returns `InvalidWeights` describing the violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for kind in AnalyzerKind::ALL {
            let weight = self.get(kind);
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(ConfigError::InvalidWeights(format!(
                    "{} weight {weight} is outside [0, 1]",
                    kind.name()
                )));
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::InvalidWeights(format!(
                "weights sum to {total:.6}, expected 1.0"
            )));
        }
        Ok(())
    }
}

/// Everything a difficulty level decides
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Level this profile was built for
    pub level: DifficultyLevel,
    /// Threshold multiplier; smaller is stricter
    pub threshold_multiplier: f64,
    /// Composite weights
    pub weights: ComponentWeights,
}

/// Map a difficulty level to its threshold multiplier and weight distribution
#[must_use]
pub const fn difficulty_profile(level: DifficultyLevel) -> DifficultyProfile {
    let (threshold_multiplier, weights) = match level {
        DifficultyLevel::Beginner => (
            1.25,
            ComponentWeights {
                safety: 0.40,
                depth: 0.35,
                stability: 0.25,
                tempo: 0.0,
                symmetry: 0.0,
                butt_wink: 0.0,
                knee_valgus: 0.0,
                head_position: 0.0,
                foot_stability: 0.0,
            },
        ),
        DifficultyLevel::Casual => (
            1.0,
            ComponentWeights {
                safety: 0.40,
                depth: 0.25,
                stability: 0.15,
                tempo: 0.10,
                symmetry: 0.10,
                butt_wink: 0.0,
                knee_valgus: 0.0,
                head_position: 0.0,
                foot_stability: 0.0,
            },
        ),
        DifficultyLevel::Professional => (
            0.9,
            ComponentWeights {
                safety: 0.42,
                depth: 0.18,
                stability: 0.10,
                tempo: 0.07,
                symmetry: 0.07,
                butt_wink: 0.06,
                knee_valgus: 0.10,
                head_position: 0.0,
                foot_stability: 0.0,
            },
        ),
        DifficultyLevel::Expert => (
            0.8,
            ComponentWeights {
                safety: 0.45,
                depth: 0.14,
                stability: 0.08,
                tempo: 0.06,
                symmetry: 0.06,
                butt_wink: 0.06,
                knee_valgus: 0.07,
                head_position: 0.04,
                foot_stability: 0.04,
            },
        ),
    };
    DifficultyProfile {
        level,
        threshold_multiplier,
        weights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_profile_has_valid_weights() {
        for level in DifficultyLevel::ALL {
            let profile = difficulty_profile(level);
            assert!(profile.weights.validate().is_ok(), "{level} weights invalid");
            assert!(profile.threshold_multiplier > 0.0);
        }
    }

    #[test]
    fn test_active_analyzer_counts() {
        assert!(difficulty_profile(DifficultyLevel::Beginner).weights.active_count() <= 3);
        assert!(difficulty_profile(DifficultyLevel::Expert).weights.active_count() >= 8);
    }

    #[test]
    fn test_invalid_sum_rejected() {
        let mut weights = difficulty_profile(DifficultyLevel::Casual).weights;
        weights.depth += 0.1;
        assert!(matches!(weights.validate(), Err(ConfigError::InvalidWeights(_))));
    }
}
