// ABOUTME: Parameter catalog describing every tunable analysis threshold
// ABOUTME: Records defaults, valid ranges, units, and how difficulty scaling applies
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration catalog for discovering available parameters

use serde::{Deserialize, Serialize};

use super::thresholds::THRESHOLD_CATALOG;

/// Which side of a threshold counts as good form
///
/// The sense decides how a difficulty multiplier `m` (smaller is stricter)
/// is applied: `LowerIsBetter` thresholds become `t * m`, `HigherIsBetter`
/// thresholds become `t / m`, and `Fixed` parameters are never scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSense {
    /// Measurements above the threshold are faults (sway, duration, tilt)
    LowerIsBetter,
    /// Measurements below the threshold are faults (back angle, range)
    HigherIsBetter,
    /// Penalties, bonuses, phase boundaries and stream settings
    Fixed,
}

/// Analyzer or subsystem a parameter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterGroup {
    /// Repetition state machine and stream settings
    Phase,
    /// Back-rounding safety analyzer
    Safety,
    /// Depth analyzer
    Depth,
    /// Center-of-mass stability analyzer
    Stability,
    /// Tempo analyzer
    Tempo,
    /// Bilateral symmetry analyzer
    Symmetry,
    /// Butt-wink analyzer
    ButtWink,
    /// Knee valgus analyzer
    KneeValgus,
    /// Head position analyzer
    HeadPosition,
    /// Foot stability analyzer
    FootStability,
    /// Aggregation settings
    Grader,
}

/// Catalog entry for one threshold parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdParameter {
    /// Parameter key, identical to the `ThresholdConfig` field name
    pub key: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Default value of the stock profile
    pub default_value: f64,
    /// Smallest accepted value
    pub min: f64,
    /// Largest accepted value
    pub max: f64,
    /// Units (degrees, seconds, points, ...)
    pub units: &'static str,
    /// How difficulty scaling applies
    pub sense: ThresholdSense,
    /// Owning analyzer or subsystem
    pub group: ParameterGroup,
    /// Safety floors are never loosened by lenient levels
    pub safety_critical: bool,
}

impl ThresholdParameter {
    /// Whether `value` lies in the documented valid range
    #[must_use]
    pub fn accepts(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// Apply a difficulty multiplier to `value` according to this parameter's sense
    ///
    /// Scaled values are clamped to the documented range, so a strict level
    /// can push a bonus threshold to its edge but never past it.
    #[must_use]
    pub fn scale(&self, value: f64, multiplier: f64) -> f64 {
        let effective = if self.safety_critical {
            multiplier.min(1.0)
        } else {
            multiplier
        };
        match self.sense {
            ThresholdSense::LowerIsBetter => (value * effective).clamp(self.min, self.max),
            ThresholdSense::HigherIsBetter => (value / effective).clamp(self.min, self.max),
            ThresholdSense::Fixed => value,
        }
    }
}

/// Look up a catalog entry by key
#[must_use]
pub fn get_parameter(key: &str) -> Option<&'static ThresholdParameter> {
    THRESHOLD_CATALOG.iter().find(|param| param.key == key)
}

/// All parameters owned by a group, in catalog order
#[must_use]
pub fn group_parameters(group: ParameterGroup) -> Vec<&'static ThresholdParameter> {
    THRESHOLD_CATALOG
        .iter()
        .filter(|param| param.group == group)
        .collect()
}
