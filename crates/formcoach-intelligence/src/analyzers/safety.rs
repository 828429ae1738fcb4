// ABOUTME: Safety analyzer scoring back rounding from the minimum back angle
// ABOUTME: Severe rounding draws a large scaled penalty and a critical fault
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{Fault, FaultType};

use super::{AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard};
use crate::config::ThresholdConfig;
use crate::statistics;
use crate::window::RepetitionWindow;

/// Scores spinal position across the repetition
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyAnalyzer;

/// Score a single back angle against the safety thresholds
///
/// Shared by the repetition analysis (fed the window minimum) and the live
/// per-frame estimate (fed the current angle).
#[must_use]
pub fn assess_back_angle(back_angle: f64, config: &ThresholdConfig) -> ScoreCard {
    let card = ScoreCard::new(AnalyzerKind::Safety).measure("min_back_angle", back_angle);

    if back_angle < config.safety_severe_back_rounding {
        let deficit = config.safety_severe_back_rounding - back_angle;
        let penalty = config
            .safety_penalty_per_degree
            .mul_add(deficit, config.safety_severe_base_penalty)
            .min(config.safety_max_penalty);
        card.fault(
            Fault::new(
                FaultType::SevereBackRounding,
                back_angle,
                config.safety_severe_back_rounding,
                format!(
                    "back angle {back_angle:.0} deg is {deficit:.0} deg below the severe limit"
                ),
            ),
            penalty,
        )
    } else if back_angle < config.safety_moderate_back_rounding {
        card.fault(
            Fault::new(
                FaultType::BackRounding,
                back_angle,
                config.safety_moderate_back_rounding,
                format!("back angle {back_angle:.0} deg shows rounding"),
            ),
            config.safety_moderate_penalty,
        )
    } else if back_angle >= config.safety_excellent_posture {
        card.bonus("excellent posture", config.safety_excellent_bonus)
    } else {
        card
    }
}

impl FormAnalyzer for SafetyAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Safety
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        &[DataRequirement::BackAngle]
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let backs = window.series(|frame| frame.angles.back);
        let (Some(min_back), Some(mean_back)) = (statistics::min(&backs), statistics::mean(&backs))
        else {
            return AnalyzerResult::neutral(self.kind(), "no back angle samples");
        };
        assess_back_angle(min_back, config)
            .measure("mean_back_angle", mean_back)
            .finish()
    }
}
