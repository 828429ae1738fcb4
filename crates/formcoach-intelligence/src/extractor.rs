// ABOUTME: Converts raw pose landmarks into per-frame biomechanical metrics
// ABOUTME: Computes joint, hip, back, and ankle angles plus center of mass with optional smoothing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Angle Extraction
//!
//! Landmarks below the visibility floor are ignored, so an angle is only
//! reported when all three of its points are trusted. Callers that already
//! have angles can bypass this module and feed `BiomechanicalMetrics`
//! directly.

use formcoach_core::models::{
    BiomechanicalMetrics, JointAngles, LandmarkId, Point2D, PoseLandmarks,
};

use crate::geometry::{back_angle, joint_angle};
use crate::smoothing::{AngleSmoother, OneEuroConfig};

/// Stateful extractor; state is only the smoothing history
#[derive(Debug, Clone)]
pub struct AngleExtractor {
    min_visibility: f64,
    smoother: Option<AngleSmoother>,
}

impl AngleExtractor {
    /// Extractor without smoothing
    #[must_use]
    pub const fn new(min_visibility: f64) -> Self {
        Self {
            min_visibility,
            smoother: None,
        }
    }

    /// Enable One-Euro smoothing of every angle channel
    #[must_use]
    pub fn with_smoothing(mut self, config: OneEuroConfig) -> Self {
        self.smoother = Some(AngleSmoother::new(config));
        self
    }

    /// Follow a new visibility floor from the active configuration
    pub fn set_min_visibility(&mut self, min_visibility: f64) {
        self.min_visibility = min_visibility;
    }

    /// Drop smoothing history, e.g. at session start
    pub fn reset(&mut self) {
        if let Some(smoother) = &mut self.smoother {
            smoother.reset();
        }
    }

    /// Build the metrics record for one frame
    pub fn extract(&mut self, timestamp: f64, landmarks: PoseLandmarks) -> BiomechanicalMetrics {
        let raw = self.joint_angles(&landmarks);
        let angles = match &mut self.smoother {
            Some(smoother) => smoother.smooth(timestamp, raw),
            None => raw,
        };

        let mut metrics = BiomechanicalMetrics::new(timestamp, angles)
            .with_visibility(landmarks.mean_visibility());
        if let Some(com) = self.center_of_mass(&landmarks) {
            metrics = metrics.with_center_of_mass(com);
        }
        metrics.with_landmarks(landmarks)
    }

    /// Angles only, without smoothing
    #[must_use]
    pub fn joint_angles(&self, landmarks: &PoseLandmarks) -> JointAngles {
        let angle = |a: LandmarkId, b: LandmarkId, c: LandmarkId| {
            let min = self.min_visibility;
            joint_angle(
                landmarks.visible(a, min)?,
                landmarks.visible(b, min)?,
                landmarks.visible(c, min)?,
            )
        };

        let hip_left = angle(LandmarkId::LeftShoulder, LandmarkId::LeftHip, LandmarkId::LeftKnee);
        let hip_right = angle(LandmarkId::RightShoulder, LandmarkId::RightHip, LandmarkId::RightKnee);
        let hip = match (hip_left, hip_right) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (one, other) => one.or(other),
        };

        let back = self
            .shoulder_mid(landmarks)
            .zip(self.hip_mid(landmarks))
            .and_then(|(shoulder, hip_point)| back_angle(shoulder, hip_point));

        JointAngles {
            knee_left: angle(LandmarkId::LeftHip, LandmarkId::LeftKnee, LandmarkId::LeftAnkle),
            knee_right: angle(LandmarkId::RightHip, LandmarkId::RightKnee, LandmarkId::RightAnkle),
            hip,
            back,
            ankle_left: angle(LandmarkId::LeftKnee, LandmarkId::LeftAnkle, LandmarkId::LeftFootIndex),
            ankle_right: angle(LandmarkId::RightKnee, LandmarkId::RightAnkle, LandmarkId::RightFootIndex),
        }
    }

    fn shoulder_mid(&self, landmarks: &PoseLandmarks) -> Option<Point2D> {
        landmarks.midpoint(LandmarkId::LeftShoulder, LandmarkId::RightShoulder, self.min_visibility)
    }

    fn hip_mid(&self, landmarks: &PoseLandmarks) -> Option<Point2D> {
        landmarks.midpoint(LandmarkId::LeftHip, LandmarkId::RightHip, self.min_visibility)
    }

    /// Center of mass approximated by the torso midpoint
    fn center_of_mass(&self, landmarks: &PoseLandmarks) -> Option<Point2D> {
        match (self.shoulder_mid(landmarks), self.hip_mid(landmarks)) {
            (Some(shoulder), Some(hip)) => Some(shoulder.midpoint(hip)),
            (_, Some(hip)) => Some(hip),
            _ => None,
        }
    }
}
