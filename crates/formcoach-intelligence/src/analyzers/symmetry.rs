// ABOUTME: Symmetry analyzer comparing left and right knee angles frame by frame
// ABOUTME: Penalizes the mean bilateral difference beyond the configured tolerance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{Fault, FaultType};

use super::{AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard};
use crate::config::ThresholdConfig;
use crate::statistics;
use crate::window::RepetitionWindow;

/// Scores left/right balance
#[derive(Debug, Clone, Copy, Default)]
pub struct SymmetryAnalyzer;

impl FormAnalyzer for SymmetryAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Symmetry
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        &[DataRequirement::BilateralKnees]
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let differences = window.series(|frame| frame.angles.knee_asymmetry());
        let (Some(mean_diff), Some(max_diff)) =
            (statistics::mean(&differences), statistics::max(&differences))
        else {
            return AnalyzerResult::neutral(self.kind(), "no bilateral knee samples");
        };

        let card = ScoreCard::new(self.kind())
            .measure("mean_knee_difference", mean_diff)
            .measure("max_knee_difference", max_diff);

        if mean_diff <= config.symmetry_threshold {
            return card.finish();
        }

        let penalty = ((mean_diff - config.symmetry_threshold) * config.symmetry_penalty_multiplier)
            .min(config.symmetry_max_penalty);
        card.fault(
            Fault::new(
                FaultType::AsymmetricMovement,
                mean_diff,
                config.symmetry_threshold,
                format!("knees differ by {mean_diff:.1} deg on average"),
            ),
            penalty,
        )
        .finish()
    }
}
