// ABOUTME: Stability analyzer measuring center-of-mass sway over the repetition
// ABOUTME: Sway is the Euclidean magnitude of the x and y standard deviations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{Fault, FaultType};

use super::{AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard};
use crate::config::ThresholdConfig;
use crate::statistics;
use crate::window::RepetitionWindow;

/// Scores postural sway
#[derive(Debug, Clone, Copy, Default)]
pub struct StabilityAnalyzer;

impl FormAnalyzer for StabilityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Stability
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        &[DataRequirement::CenterOfMass]
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let xs = window.series(|frame| frame.center_of_mass.map(|c| c.x));
        let ys = window.series(|frame| frame.center_of_mass.map(|c| c.y));
        let (Some(std_x), Some(std_y)) = (statistics::std_dev(&xs), statistics::std_dev(&ys)) else {
            return AnalyzerResult::neutral(self.kind(), "no center of mass samples");
        };
        let sway = std_x.hypot(std_y);

        let card = ScoreCard::new(self.kind())
            .measure("sway", sway)
            .measure("sway_x", std_x)
            .measure("sway_y", std_y);

        let excess = sway - config.stability_poor_threshold;
        let card = if sway > config.stability_severe_threshold {
            let penalty = config
                .stability_penalty_per_unit
                .mul_add(excess, config.stability_severe_base_penalty)
                .min(config.stability_max_penalty);
            card.fault(
                Fault::new(
                    FaultType::SevereInstability,
                    sway,
                    config.stability_severe_threshold,
                    format!("center of mass sway {sway:.3} is severe"),
                ),
                penalty,
            )
        } else if sway > config.stability_poor_threshold {
            let penalty = (config.stability_penalty_per_unit * excess).min(config.stability_max_penalty);
            card.fault(
                Fault::new(
                    FaultType::PoorStability,
                    sway,
                    config.stability_poor_threshold,
                    format!("center of mass sway {sway:.3} exceeds tolerance"),
                ),
                penalty,
            )
        } else if sway < config.stability_excellent_threshold {
            card.bonus("steady base", config.stability_bonus)
        } else {
            card
        };
        card.finish()
    }
}
