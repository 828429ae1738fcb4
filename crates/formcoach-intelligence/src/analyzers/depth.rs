// ABOUTME: Depth analyzer scoring the deepest primary angle and total range of motion
// ABOUTME: Emits at most one depth fault, chosen by severity: shallow, insufficient, partial
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{Fault, FaultType};

use super::{AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard};
use crate::config::ThresholdConfig;
use crate::statistics;
use crate::window::RepetitionWindow;

/// Scores how deep the repetition went
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthAnalyzer;

impl DepthAnalyzer {
    /// The single depth fault for a repetition, if any
    fn classify(min_angle: f64, range: f64, config: &ThresholdConfig) -> Option<(Fault, f64)> {
        if min_angle > config.depth_bad_shallow_threshold {
            Some((
                Fault::new(
                    FaultType::BadShallowDepth,
                    min_angle,
                    config.depth_bad_shallow_threshold,
                    format!("deepest knee angle {min_angle:.0} deg is far above parallel"),
                ),
                config.depth_bad_shallow_penalty,
            ))
        } else if min_angle > config.depth_insufficient_threshold {
            Some((
                Fault::new(
                    FaultType::InsufficientDepth,
                    min_angle,
                    config.depth_insufficient_threshold,
                    format!("deepest knee angle {min_angle:.0} deg did not reach depth"),
                ),
                config.depth_insufficient_penalty,
            ))
        } else if range < config.depth_partial_rep_threshold {
            Some((
                Fault::new(
                    FaultType::PartialRep,
                    range,
                    config.depth_partial_rep_threshold,
                    format!("range of motion {range:.0} deg is a partial repetition"),
                ),
                config.depth_partial_rep_penalty,
            ))
        } else {
            None
        }
    }
}

impl FormAnalyzer for DepthAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Depth
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        &[DataRequirement::PrimaryAngle]
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let angles = window.primary_angles();
        let (Some(min_angle), Some(range)) = (statistics::min(&angles), statistics::range(&angles))
        else {
            return AnalyzerResult::neutral(self.kind(), "no primary angle samples");
        };

        let card = ScoreCard::new(self.kind())
            .measure("min_angle", min_angle)
            .measure("movement_range", range);

        let card = match Self::classify(min_angle, range, config) {
            Some((fault, penalty)) => card.fault(fault, penalty),
            None if (config.depth_good_min..=config.depth_good_max).contains(&min_angle) => {
                card.bonus("good depth", config.depth_good_bonus)
            }
            None => card,
        };
        card.finish()
    }
}
