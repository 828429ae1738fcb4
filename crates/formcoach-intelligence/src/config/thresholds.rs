// ABOUTME: Threshold configuration shared by the state machine and all nine analyzers
// ABOUTME: Single macro-generated source for fields, defaults, catalog entries, and key lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Threshold Configuration
//!
//! `ThresholdConfig` is a flat bag of named numeric parameters. The stock
//! values are a hand-tuned default profile, not ground truth: every one of
//! them can be overridden from JSON, from the environment, per user profile,
//! or by the calibration subsystem. A config is validated as a whole before
//! it is accepted anywhere.
//!
//! Back angles follow the torso convention used throughout the crate: 180 is
//! an upright torso and smaller values mean more spinal flexion.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use formcoach_core::constants::env_config;
use formcoach_core::errors::ConfigError;
use serde::{Deserialize, Serialize};

use super::catalog::{group_parameters, ParameterGroup, ThresholdParameter, ThresholdSense};

macro_rules! threshold_config {
    ($(
        $field:ident = $default:literal in [$min:literal, $max:literal] $units:literal,
        $sense:ident, $group:ident, critical: $critical:literal,
        $desc:literal;
    )*) => {
        /// Complete set of analysis thresholds
        ///
        /// Deserialization accepts partial documents; missing keys keep their
        /// defaults and unknown keys are rejected.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default, deny_unknown_fields)]
        pub struct ThresholdConfig {
            $(
                #[doc = $desc]
                pub $field: f64,
            )*
        }

        impl Default for ThresholdConfig {
            fn default() -> Self {
                Self {
                    $( $field: $default, )*
                }
            }
        }

        /// Catalog of every parameter in `ThresholdConfig`, in field order
        pub static THRESHOLD_CATALOG: &[ThresholdParameter] = &[
            $(
                ThresholdParameter {
                    key: stringify!($field),
                    description: $desc,
                    default_value: $default,
                    min: $min,
                    max: $max,
                    units: $units,
                    sense: ThresholdSense::$sense,
                    group: ParameterGroup::$group,
                    safety_critical: $critical,
                },
            )*
        ];

        impl ThresholdConfig {
            /// Read a parameter by catalog key
            #[must_use]
            pub fn get(&self, key: &str) -> Option<f64> {
                match key {
                    $( stringify!($field) => Some(self.$field), )*
                    _ => None,
                }
            }

            fn slot_mut(&mut self, key: &str) -> Option<&mut f64> {
                match key {
                    $( stringify!($field) => Some(&mut self.$field), )*
                    _ => None,
                }
            }
        }
    };
}

threshold_config! {
    // Repetition state machine and stream
    phase_standing_threshold = 150.0 in [120.0, 175.0] "degrees", Fixed, Phase, critical: false,
        "Primary angle below which a standing lifter is considered descending";
    phase_descent_threshold = 130.0 in [90.0, 170.0] "degrees", Fixed, Phase, critical: false,
        "Primary angle a descent must pass before a return to standing counts as an abandoned rep";
    phase_bottom_threshold = 110.0 in [60.0, 140.0] "degrees", Fixed, Phase, critical: false,
        "Primary angle below which a descent has reached the bottom";
    phase_ascent_threshold = 120.0 in [70.0, 160.0] "degrees", Fixed, Phase, critical: false,
        "Primary angle above which the lifter is ascending out of the bottom";
    min_rep_duration = 0.5 in [0.1, 5.0] "seconds", Fixed, Phase, critical: false,
        "Shortest repetition that is counted";
    max_rep_duration = 15.0 in [2.0, 60.0] "seconds", Fixed, Phase, critical: false,
        "Longest repetition that is counted";
    min_rep_frames = 5.0 in [1.0, 300.0] "frames", Fixed, Phase, critical: false,
        "Fewest frames a repetition window may contain";
    min_landmark_visibility = 0.5 in [0.0, 1.0] "ratio", Fixed, Phase, critical: false,
        "Visibility below which a frame's angles are not trusted for decisions";
    frame_rate = 30.0 in [1.0, 240.0] "fps", Fixed, Phase, critical: false,
        "Camera frame rate used to convert frame counts to seconds";

    // Safety (back rounding)
    safety_severe_back_rounding = 60.0 in [30.0, 120.0] "degrees", HigherIsBetter, Safety, critical: true,
        "Back angle below which rounding is severe";
    safety_moderate_back_rounding = 80.0 in [40.0, 150.0] "degrees", HigherIsBetter, Safety, critical: true,
        "Back angle below which rounding is moderate";
    safety_excellent_posture = 150.0 in [100.0, 180.0] "degrees", HigherIsBetter, Safety, critical: false,
        "Back angle above which posture earns a bonus";
    safety_severe_base_penalty = 50.0 in [0.0, 100.0] "points", Fixed, Safety, critical: false,
        "Penalty applied as soon as rounding is severe";
    safety_penalty_per_degree = 5.0 in [0.0, 20.0] "points/degree", Fixed, Safety, critical: false,
        "Additional severe penalty per degree below the severe threshold";
    safety_max_penalty = 75.0 in [0.0, 100.0] "points", Fixed, Safety, critical: false,
        "Cap on the severe rounding penalty";
    safety_moderate_penalty = 20.0 in [0.0, 100.0] "points", Fixed, Safety, critical: false,
        "Penalty for moderate rounding";
    safety_excellent_bonus = 5.0 in [0.0, 10.0] "points", Fixed, Safety, critical: false,
        "Bonus for excellent posture";

    // Depth
    depth_bad_shallow_threshold = 130.0 in [100.0, 170.0] "degrees", LowerIsBetter, Depth, critical: false,
        "Deepest knee angle above which the squat is badly shallow";
    depth_insufficient_threshold = 110.0 in [80.0, 150.0] "degrees", LowerIsBetter, Depth, critical: false,
        "Deepest knee angle above which depth is insufficient";
    depth_partial_rep_threshold = 60.0 in [20.0, 120.0] "degrees", HigherIsBetter, Depth, critical: false,
        "Movement range below which the repetition is partial";
    depth_good_min = 60.0 in [30.0, 100.0] "degrees", Fixed, Depth, critical: false,
        "Lower edge of the good-depth band";
    depth_good_max = 95.0 in [60.0, 120.0] "degrees", Fixed, Depth, critical: false,
        "Upper edge of the good-depth band";
    depth_bad_shallow_penalty = 45.0 in [0.0, 100.0] "points", Fixed, Depth, critical: false,
        "Penalty for a badly shallow repetition";
    depth_insufficient_penalty = 30.0 in [0.0, 100.0] "points", Fixed, Depth, critical: false,
        "Penalty for insufficient depth";
    depth_partial_rep_penalty = 20.0 in [0.0, 100.0] "points", Fixed, Depth, critical: false,
        "Penalty for a partial repetition";
    depth_good_bonus = 5.0 in [0.0, 10.0] "points", Fixed, Depth, critical: false,
        "Bonus for reaching the good-depth band";

    // Stability
    stability_excellent_threshold = 0.01 in [0.0, 0.1] "normalized", LowerIsBetter, Stability, critical: false,
        "Sway below which stability earns a bonus";
    stability_poor_threshold = 0.03 in [0.005, 0.2] "normalized", LowerIsBetter, Stability, critical: false,
        "Sway above which stability is poor";
    stability_severe_threshold = 0.06 in [0.01, 0.4] "normalized", LowerIsBetter, Stability, critical: false,
        "Sway above which the lifter is severely unstable";
    stability_penalty_per_unit = 400.0 in [0.0, 5000.0] "points/unit", Fixed, Stability, critical: false,
        "Penalty per unit of sway above the poor threshold";
    stability_severe_base_penalty = 15.0 in [0.0, 100.0] "points", Fixed, Stability, critical: false,
        "Extra penalty once sway is severe";
    stability_max_penalty = 40.0 in [0.0, 100.0] "points", Fixed, Stability, critical: false,
        "Cap on the stability penalty";
    stability_bonus = 5.0 in [0.0, 10.0] "points", Fixed, Stability, critical: false,
        "Bonus for near-zero sway";

    // Tempo
    tempo_too_fast_threshold = 1.2 in [0.3, 3.0] "seconds", HigherIsBetter, Tempo, critical: false,
        "Repetitions shorter than this are too fast";
    tempo_too_slow_threshold = 8.0 in [3.0, 30.0] "seconds", LowerIsBetter, Tempo, critical: false,
        "Repetitions longer than this are too slow";
    tempo_optimal_min = 1.5 in [0.5, 5.0] "seconds", Fixed, Tempo, critical: false,
        "Lower edge of the optimal tempo band";
    tempo_optimal_max = 4.0 in [1.0, 10.0] "seconds", Fixed, Tempo, critical: false,
        "Upper edge of the optimal tempo band";
    tempo_fault_penalty = 15.0 in [0.0, 100.0] "points", Fixed, Tempo, critical: false,
        "Penalty for a too-fast or too-slow repetition";
    tempo_suboptimal_penalty = 5.0 in [0.0, 100.0] "points", Fixed, Tempo, critical: false,
        "Penalty for a tempo outside the optimal band but within limits";

    // Symmetry
    symmetry_threshold = 15.0 in [2.0, 45.0] "degrees", LowerIsBetter, Symmetry, critical: false,
        "Mean left/right knee difference above which movement is asymmetric";
    symmetry_penalty_multiplier = 1.5 in [0.0, 10.0] "points/degree", Fixed, Symmetry, critical: false,
        "Penalty per degree of asymmetry above the threshold";
    symmetry_max_penalty = 30.0 in [0.0, 100.0] "points", Fixed, Symmetry, critical: false,
        "Cap on the symmetry penalty";

    // Butt wink
    butt_wink_std_threshold = 8.0 in [1.0, 30.0] "degrees", LowerIsBetter, ButtWink, critical: false,
        "Back angle standard deviation at the bottom above which the pelvis tucks";
    butt_wink_range_threshold = 20.0 in [2.0, 60.0] "degrees", LowerIsBetter, ButtWink, critical: false,
        "Back angle range at the bottom above which the pelvis tucks";
    butt_wink_bottom_margin = 15.0 in [1.0, 60.0] "degrees", Fixed, ButtWink, critical: false,
        "Frames within this many degrees of the deepest primary angle count as the bottom";
    butt_wink_penalty = 20.0 in [0.0, 100.0] "points", Fixed, ButtWink, critical: false,
        "Penalty for butt wink";

    // Knee valgus
    knee_valgus_ratio_threshold = 0.8 in [0.4, 1.2] "ratio", HigherIsBetter, KneeValgus, critical: true,
        "Knee width to ankle width ratio below which the knees cave in";
    knee_valgus_max_penalty = 30.0 in [0.0, 100.0] "points", Fixed, KneeValgus, critical: false,
        "Cap on the knee valgus penalty";

    // Head position
    head_position_angle_threshold = 25.0 in [5.0, 60.0] "degrees", LowerIsBetter, HeadPosition, critical: false,
        "Neck deviation from the torso line above which the head is forward";
    head_position_max_penalty = 15.0 in [0.0, 100.0] "points", Fixed, HeadPosition, critical: false,
        "Cap on the head position penalty";

    // Foot stability
    foot_heel_lift_threshold = 0.02 in [0.005, 0.1] "normalized", LowerIsBetter, FootStability, critical: false,
        "Heel rise relative to the toe above which the heel has lifted";
    foot_stability_max_penalty = 20.0 in [0.0, 100.0] "points", Fixed, FootStability, critical: false,
        "Cap on the heel lift penalty";

    // Aggregation
    grader_clean_rep_bonus = 5.0 in [0.0, 5.0] "points", Fixed, Grader, critical: false,
        "Bonus added to a repetition with no reported faults";
    grader_low_confidence_threshold = 60.0 in [0.0, 100.0] "points", Fixed, Grader, critical: false,
        "Confidence below which a result is flagged low-confidence";
}

impl ThresholdConfig {
    /// Validate every parameter range and the ordering between related thresholds
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for param in THRESHOLD_CATALOG {
            let value = self.get(param.key).unwrap_or(f64::NAN);
            if !param.accepts(value) {
                return Err(ConfigError::out_of_range(param.key, value, param.min, param.max));
            }
        }
        self.validate_ordering()
    }

    fn validate_ordering(&self) -> Result<(), ConfigError> {
        let checks: [(bool, &'static str); 10] = [
            (
                self.phase_standing_threshold > self.phase_descent_threshold
                    && self.phase_descent_threshold > self.phase_bottom_threshold,
                "phase thresholds must satisfy standing > descent > bottom",
            ),
            (
                self.phase_standing_threshold > self.phase_ascent_threshold
                    && self.phase_ascent_threshold > self.phase_bottom_threshold,
                "phase thresholds must satisfy standing > ascent > bottom",
            ),
            (
                self.min_rep_duration < self.max_rep_duration,
                "min_rep_duration must be below max_rep_duration",
            ),
            (
                self.safety_severe_back_rounding < self.safety_moderate_back_rounding
                    && self.safety_moderate_back_rounding < self.safety_excellent_posture,
                "back angle thresholds must satisfy severe < moderate < excellent",
            ),
            (
                self.depth_insufficient_threshold < self.depth_bad_shallow_threshold,
                "depth_insufficient_threshold must be below depth_bad_shallow_threshold",
            ),
            (
                self.depth_good_min < self.depth_good_max,
                "depth_good_min must be below depth_good_max",
            ),
            (
                self.stability_excellent_threshold < self.stability_poor_threshold
                    && self.stability_poor_threshold < self.stability_severe_threshold,
                "sway thresholds must satisfy excellent < poor < severe",
            ),
            (
                self.tempo_too_fast_threshold <= self.tempo_optimal_min
                    && self.tempo_optimal_min < self.tempo_optimal_max
                    && self.tempo_optimal_max <= self.tempo_too_slow_threshold,
                "tempo thresholds must satisfy too_fast <= optimal_min < optimal_max <= too_slow",
            ),
            (
                self.butt_wink_std_threshold <= self.butt_wink_range_threshold,
                "butt_wink_std_threshold must not exceed butt_wink_range_threshold",
            ),
            (
                self.safety_severe_base_penalty <= self.safety_max_penalty,
                "safety_severe_base_penalty must not exceed safety_max_penalty",
            ),
        ];

        checks
            .into_iter()
            .find(|(ok, _)| !ok)
            .map_or(Ok(()), |(_, message)| Err(ConfigError::InvalidOrdering(message)))
    }

    /// Set one parameter, validating the whole resulting config
    ///
    /// # Errors
    ///
    /// Returns `UnknownParameter` for keys outside the catalog and a range or
    /// ordering error when the new value is rejected; `self` is unchanged on error.
    pub fn set(&mut self, key: &str, value: f64) -> Result<(), ConfigError> {
        let mut candidate = self.clone();
        let slot = candidate
            .slot_mut(key)
            .ok_or_else(|| ConfigError::UnknownParameter(key.to_owned()))?;
        *slot = value;
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Apply a set of overrides, returning a new validated config
    ///
    /// # Errors
    ///
    /// Fails on the first unknown key or if the combined result is invalid.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, f64>) -> Result<Self, ConfigError> {
        let mut candidate = self.clone();
        for (key, value) in overrides {
            let slot = candidate
                .slot_mut(key)
                .ok_or_else(|| ConfigError::UnknownParameter(key.clone()))?;
            *slot = *value;
        }
        candidate.validate()?;
        Ok(candidate)
    }

    /// Every parameter keyed by name
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        THRESHOLD_CATALOG
            .iter()
            .filter_map(|param| self.get(param.key).map(|value| (param.key, value)))
            .collect()
    }

    /// Apply a difficulty multiplier (smaller is stricter) to every scalable threshold
    ///
    /// Each scaled value stays inside its catalog range. Orderings between
    /// related thresholds are not re-checked here; callers publishing the
    /// result validate it.
    ///
    /// # Errors
    ///
    /// Rejects non-finite or non-positive multipliers.
    pub fn scaled(&self, multiplier: f64) -> Result<Self, ConfigError> {
        if !multiplier.is_finite() || multiplier <= 0.0 {
            return Err(ConfigError::out_of_range(
                "threshold_multiplier",
                multiplier,
                f64::MIN_POSITIVE,
                f64::MAX,
            ));
        }
        let mut scaled = self.clone();
        for param in THRESHOLD_CATALOG {
            if let Some(slot) = scaled.slot_mut(param.key) {
                *slot = param.scale(*slot, multiplier);
            }
        }
        Ok(scaled)
    }

    /// Scale only one group's tunable thresholds by `factor`, without the safety clamp
    ///
    /// Used by calibration, where both tightening and loosening are legitimate.
    #[must_use]
    pub fn with_group_strictness(&self, group: ParameterGroup, factor: f64) -> Self {
        let mut adjusted = self.clone();
        for param in group_parameters(group) {
            if let Some(slot) = adjusted.slot_mut(param.key) {
                *slot = match param.sense {
                    ThresholdSense::LowerIsBetter => *slot * factor,
                    ThresholdSense::HigherIsBetter => *slot / factor,
                    ThresholdSense::Fixed => *slot,
                };
            }
        }
        adjusted
    }

    /// Defaults overridden by `FORMCOACH_<KEY>` environment variables
    ///
    /// # Errors
    ///
    /// Returns `Parse` for unparsable values and a validation error when the
    /// resulting config is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(&Self::env_overrides()?)
    }

    /// Every `FORMCOACH_<KEY>` variable set in the environment, by parameter key
    ///
    /// # Errors
    ///
    /// Returns `Parse` for values that are not numbers.
    pub fn env_overrides() -> Result<BTreeMap<String, f64>, ConfigError> {
        let mut overrides = BTreeMap::new();
        for param in THRESHOLD_CATALOG {
            let var = format!(
                "{}{}",
                env_config::THRESHOLD_PREFIX,
                param.key.to_ascii_uppercase()
            );
            if let Ok(raw) = env::var(&var) {
                let value = raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::parse(var.clone(), raw.clone()))?;
                overrides.insert(param.key.to_owned(), value);
            }
        }
        Ok(overrides)
    }

    /// Parse a (possibly partial) JSON object of overrides over the defaults
    ///
    /// # Errors
    ///
    /// Returns `Json` for malformed documents or unknown keys and a validation
    /// error for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load overrides from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `Io` when the file cannot be read, otherwise as `from_json_str`.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&json)
    }

    /// Seconds represented by `frames` at the configured frame rate
    #[must_use]
    pub fn frames_to_seconds(&self, frames: usize) -> f64 {
        frames as f64 / self.frame_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(ThresholdConfig::default().validate().is_ok());
    }

    #[test]
    fn test_set_rejects_and_keeps_previous_value() {
        let mut config = ThresholdConfig::default();
        let result = config.set("safety_severe_back_rounding", 500.0);
        assert!(matches!(result, Err(ConfigError::ValueOutOfRange { .. })));
        assert!((config.safety_severe_back_rounding - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_set_rejects_ordering_violation() {
        let mut config = ThresholdConfig::default();
        let result = config.set("phase_bottom_threshold", 135.0);
        assert!(matches!(result, Err(ConfigError::InvalidOrdering(_))));
    }

    #[test]
    fn test_scaled_never_changes_sign() {
        let config = ThresholdConfig::default();
        for multiplier in [0.5, 0.8, 1.0, 1.25, 2.0] {
            let scaled = config.scaled(multiplier).unwrap_or_default();
            for (key, value) in scaled.to_map() {
                assert!(value >= 0.0, "{key} became negative at {multiplier}");
            }
        }
        assert!(config.scaled(0.0).is_err());
        assert!(config.scaled(-1.0).is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ThresholdConfig::from_json_str(r#"{"symmetry_threshold": 10.0}"#);
        let config = config.unwrap_or_default();
        assert!((config.symmetry_threshold - 10.0).abs() < f64::EPSILON);
        assert!((config.frame_rate - 30.0).abs() < f64::EPSILON);
        assert!(ThresholdConfig::from_json_str(r#"{"not_a_key": 1.0}"#).is_err());
    }
}
