// ABOUTME: Foot stability analyzer detecting heel lift relative to the toe
// ABOUTME: Compares each frame's heel height against the first frame of the repetition
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{BiomechanicalMetrics, Fault, FaultType, LandmarkId};

use super::{
    relative_penalty, AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard,
};
use crate::config::ThresholdConfig;
use crate::window::RepetitionWindow;

const LEFT_FOOT: &[LandmarkId] = &[LandmarkId::LeftHeel, LandmarkId::LeftFootIndex];
const RIGHT_FOOT: &[LandmarkId] = &[LandmarkId::RightHeel, LandmarkId::RightFootIndex];

const REQUIREMENTS: &[DataRequirement] = &[DataRequirement::AnyLandmarks(&[LEFT_FOOT, RIGHT_FOOT])];

/// Scores whether the feet stay planted
#[derive(Debug, Clone, Copy, Default)]
pub struct FootStabilityAnalyzer;

impl FootStabilityAnalyzer {
    /// Height of the heel above the toe (positive when the heel is higher)
    fn heel_height(frame: &BiomechanicalMetrics, foot: &[LandmarkId], min_visibility: f64) -> Option<f64> {
        let landmarks = frame.landmarks.as_ref()?;
        let heel = landmarks.visible(foot[0], min_visibility)?;
        let toe = landmarks.visible(foot[1], min_visibility)?;
        Some(toe.y - heel.y)
    }

    /// Largest rise of one foot's heel over its first observed height
    fn max_lift(window: &RepetitionWindow, foot: &[LandmarkId], min_visibility: f64) -> Option<f64> {
        let heights = window.series(|frame| Self::heel_height(frame, foot, min_visibility));
        let baseline = *heights.first()?;
        heights.iter().map(|h| h - baseline).reduce(f64::max)
    }
}

impl FormAnalyzer for FootStabilityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::FootStability
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        REQUIREMENTS
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let min_visibility = config.min_landmark_visibility;
        let lifts = [
            Self::max_lift(window, LEFT_FOOT, min_visibility),
            Self::max_lift(window, RIGHT_FOOT, min_visibility),
        ];
        let Some(lift) = lifts.into_iter().flatten().reduce(f64::max) else {
            return AnalyzerResult::neutral(self.kind(), "no heel and toe landmarks");
        };

        let card = ScoreCard::new(self.kind()).measure("max_heel_lift", lift);
        let threshold = config.foot_heel_lift_threshold;
        if lift <= threshold {
            return card.finish();
        }

        let penalty = relative_penalty(lift - threshold, threshold, config.foot_stability_max_penalty);
        card.fault(
            Fault::new(
                FaultType::HeelLift,
                lift,
                threshold,
                format!("heel rose {lift:.3} above its starting height"),
            ),
            penalty,
        )
        .finish()
    }
}
