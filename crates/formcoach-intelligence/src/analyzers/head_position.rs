// ABOUTME: Head position analyzer measuring neck deviation from the torso line
// ABOUTME: Uses whichever side has a visible ear, shoulder, and hip
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{BiomechanicalMetrics, Fault, FaultType, LandmarkId};

use super::{
    relative_penalty, AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard,
};
use crate::config::ThresholdConfig;
use crate::geometry::neck_deviation;
use crate::statistics;
use crate::window::RepetitionWindow;

const LEFT_SIDE: &[LandmarkId] = &[LandmarkId::LeftEar, LandmarkId::LeftShoulder, LandmarkId::LeftHip];
const RIGHT_SIDE: &[LandmarkId] = &[
    LandmarkId::RightEar,
    LandmarkId::RightShoulder,
    LandmarkId::RightHip,
];

const REQUIREMENTS: &[DataRequirement] = &[DataRequirement::AnyLandmarks(&[LEFT_SIDE, RIGHT_SIDE])];

/// Scores head and neck alignment
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadPositionAnalyzer;

impl HeadPositionAnalyzer {
    fn deviation(frame: &BiomechanicalMetrics, min_visibility: f64) -> Option<f64> {
        let landmarks = frame.landmarks.as_ref()?;
        [LEFT_SIDE, RIGHT_SIDE].iter().find_map(|side| {
            let ear = landmarks.visible(side[0], min_visibility)?;
            let shoulder = landmarks.visible(side[1], min_visibility)?;
            let hip = landmarks.visible(side[2], min_visibility)?;
            neck_deviation(hip, shoulder, ear)
        })
    }
}

impl FormAnalyzer for HeadPositionAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::HeadPosition
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        REQUIREMENTS
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let deviations =
            window.series(|frame| Self::deviation(frame, config.min_landmark_visibility));
        let (Some(mean_dev), Some(max_dev)) =
            (statistics::mean(&deviations), statistics::max(&deviations))
        else {
            return AnalyzerResult::neutral(self.kind(), "no side-on head landmarks");
        };

        let card = ScoreCard::new(self.kind())
            .measure("mean_neck_deviation", mean_dev)
            .measure("max_neck_deviation", max_dev);

        let threshold = config.head_position_angle_threshold;
        if mean_dev <= threshold {
            return card.finish();
        }

        let penalty = relative_penalty(mean_dev - threshold, threshold, config.head_position_max_penalty);
        card.fault(
            Fault::new(
                FaultType::HeadForward,
                mean_dev,
                threshold,
                format!("head sat {mean_dev:.0} deg off the torso line"),
            ),
            penalty,
        )
        .finish()
    }
}
