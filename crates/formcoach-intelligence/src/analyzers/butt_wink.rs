// ABOUTME: Butt-wink analyzer detecting lumbar flexion at the bottom of the squat
// ABOUTME: Looks at back angle variability across frames near the deepest point
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{Fault, FaultType};

use super::{
    bottom_frame_indices, AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard,
};
use crate::config::ThresholdConfig;
use crate::statistics;
use crate::window::RepetitionWindow;

/// Bottom frames with a back angle needed before variability means anything
const MIN_BOTTOM_SAMPLES: usize = 3;

/// Scores pelvic tuck at depth
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtWinkAnalyzer;

impl FormAnalyzer for ButtWinkAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::ButtWink
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        &[DataRequirement::PrimaryAngle, DataRequirement::BackAngle]
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let frames = window.frames();
        let backs: Vec<f64> = bottom_frame_indices(window, config.butt_wink_bottom_margin)
            .into_iter()
            .filter_map(|i| frames.get(i).and_then(|frame| frame.angles.back))
            .collect();
        if backs.len() < MIN_BOTTOM_SAMPLES {
            return AnalyzerResult::neutral(self.kind(), "too few bottom frames with a back angle");
        }

        let std = statistics::std_dev(&backs).unwrap_or_default();
        let range = statistics::range(&backs).unwrap_or_default();
        let card = ScoreCard::new(self.kind())
            .measure("bottom_back_std", std)
            .measure("bottom_back_range", range)
            .measure("bottom_frames", backs.len() as f64);

        if std <= config.butt_wink_std_threshold && range <= config.butt_wink_range_threshold {
            return card.finish();
        }

        let (measured, threshold) = if std > config.butt_wink_std_threshold {
            (std, config.butt_wink_std_threshold)
        } else {
            (range, config.butt_wink_range_threshold)
        };
        card.fault(
            Fault::new(
                FaultType::ButtWink,
                measured,
                threshold,
                format!("back angle moved {range:.0} deg while at the bottom"),
            ),
            config.butt_wink_penalty,
        )
        .finish()
    }
}
