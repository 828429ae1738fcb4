// ABOUTME: Knee valgus analyzer comparing knee width to ankle width near the bottom
// ABOUTME: A ratio below the threshold means the knees caved inward
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{BiomechanicalMetrics, Fault, FaultType, LandmarkId};

use super::{
    bottom_frame_indices, relative_penalty, AnalyzerKind, AnalyzerResult, DataRequirement,
    FormAnalyzer, ScoreCard,
};
use crate::config::ThresholdConfig;
use crate::statistics;
use crate::window::RepetitionWindow;

const REQUIRED: &[LandmarkId] = &[
    LandmarkId::LeftKnee,
    LandmarkId::RightKnee,
    LandmarkId::LeftAnkle,
    LandmarkId::RightAnkle,
];

/// Ankle widths below this are treated as a side-on view with no usable ratio
const MIN_ANKLE_WIDTH: f64 = 0.01;

/// Bottom margin used to select frames, in degrees of primary angle
const BOTTOM_MARGIN: f64 = 20.0;

/// Scores inward knee collapse
#[derive(Debug, Clone, Copy, Default)]
pub struct KneeValgusAnalyzer;

impl KneeValgusAnalyzer {
    fn width_ratio(frame: &BiomechanicalMetrics, min_visibility: f64) -> Option<f64> {
        let landmarks = frame.landmarks.as_ref()?;
        let knee_l = landmarks.visible(LandmarkId::LeftKnee, min_visibility)?;
        let knee_r = landmarks.visible(LandmarkId::RightKnee, min_visibility)?;
        let ankle_l = landmarks.visible(LandmarkId::LeftAnkle, min_visibility)?;
        let ankle_r = landmarks.visible(LandmarkId::RightAnkle, min_visibility)?;
        let ankle_width = (ankle_l.x - ankle_r.x).abs();
        (ankle_width >= MIN_ANKLE_WIDTH).then(|| (knee_l.x - knee_r.x).abs() / ankle_width)
    }
}

impl FormAnalyzer for KneeValgusAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::KneeValgus
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        &[DataRequirement::Landmarks(REQUIRED)]
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let frames = window.frames();
        let ratios: Vec<f64> = bottom_frame_indices(window, BOTTOM_MARGIN)
            .into_iter()
            .filter_map(|i| frames.get(i))
            .filter_map(|frame| Self::width_ratio(frame, config.min_landmark_visibility))
            .collect();
        let (Some(min_ratio), Some(mean_ratio)) = (statistics::min(&ratios), statistics::mean(&ratios))
        else {
            return AnalyzerResult::neutral(self.kind(), "no frontal knee/ankle width available");
        };

        let card = ScoreCard::new(self.kind())
            .measure("min_knee_ankle_ratio", min_ratio)
            .measure("mean_knee_ankle_ratio", mean_ratio);

        let threshold = config.knee_valgus_ratio_threshold;
        if min_ratio >= threshold {
            return card.finish();
        }

        let penalty = relative_penalty(threshold - min_ratio, threshold, config.knee_valgus_max_penalty);
        card.fault(
            Fault::new(
                FaultType::KneeValgus,
                min_ratio,
                threshold,
                format!("knees narrowed to {:.0}% of ankle width", min_ratio * 100.0),
            ),
            penalty,
        )
        .finish()
    }
}
