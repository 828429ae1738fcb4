// ABOUTME: Per-frame biomechanical snapshot: joint angles, center of mass, visibility
// ABOUTME: Includes input-contract validation that sanitizes out-of-range values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};

use super::landmarks::PoseLandmarks;
use crate::constants::{angles, visibility};

/// A 2D point in image-normalized coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate (downward)
    pub y: f64,
}

impl Point2D {
    /// Create a point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Midpoint between two points
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Euclidean distance
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Joint angles in degrees; `None` when the joint was not reliably detected
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointAngles {
    /// Left knee flexion angle (hip-knee-ankle)
    #[serde(default)]
    pub knee_left: Option<f64>,
    /// Right knee flexion angle (hip-knee-ankle)
    #[serde(default)]
    pub knee_right: Option<f64>,
    /// Hip angle (shoulder-hip-knee)
    #[serde(default)]
    pub hip: Option<f64>,
    /// Back angle: 180 is an upright torso, smaller values mean more flexion
    #[serde(default)]
    pub back: Option<f64>,
    /// Left ankle angle (knee-ankle-toe)
    #[serde(default)]
    pub ankle_left: Option<f64>,
    /// Right ankle angle (knee-ankle-toe)
    #[serde(default)]
    pub ankle_right: Option<f64>,
}

impl JointAngles {
    /// Mean of the available knee angles
    #[must_use]
    pub fn knee_mean(&self) -> Option<f64> {
        match (self.knee_left, self.knee_right) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }

    /// Absolute left/right knee difference when both sides are present
    #[must_use]
    pub fn knee_asymmetry(&self) -> Option<f64> {
        self.knee_left
            .zip(self.knee_right)
            .map(|(l, r)| (l - r).abs())
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut Option<f64>); 6] {
        [
            ("knee_left", &mut self.knee_left),
            ("knee_right", &mut self.knee_right),
            ("hip", &mut self.hip),
            ("back", &mut self.back),
            ("ankle_left", &mut self.ankle_left),
            ("ankle_right", &mut self.ankle_right),
        ]
    }
}

/// A problem found while checking a frame against the input contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputIssue {
    /// A joint angle lay outside [0, 180] or was not finite and was dropped
    AngleOutOfRange {
        /// Joint name
        joint: String,
        /// Rejected value
        value: f64,
    },
    /// Visibility lay outside [0, 1] and was clamped
    VisibilityOutOfRange {
        /// Rejected value
        value: f64,
    },
    /// Timestamp was not a finite number
    InvalidTimestamp,
    /// Center of mass was not finite and was dropped
    InvalidCenterOfMass,
}

/// Immutable per-frame snapshot produced by the angle extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomechanicalMetrics {
    /// Capture time in seconds since stream start
    pub timestamp: f64,
    /// Joint angles in degrees
    #[serde(default)]
    pub angles: JointAngles,
    /// Approximate center of mass in image coordinates
    #[serde(default)]
    pub center_of_mass: Option<Point2D>,
    /// Mean landmark confidence in [0, 1]
    #[serde(default = "default_visibility")]
    pub visibility: f64,
    /// Raw landmarks, needed by alignment analyzers when available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<PoseLandmarks>,
}

const fn default_visibility() -> f64 {
    visibility::MAX_VISIBILITY
}

impl BiomechanicalMetrics {
    /// Create a snapshot from angles alone
    #[must_use]
    pub fn new(timestamp: f64, angles: JointAngles) -> Self {
        Self {
            timestamp,
            angles,
            center_of_mass: None,
            visibility: visibility::MAX_VISIBILITY,
            landmarks: None,
        }
    }

    /// Builder: set center of mass
    #[must_use]
    pub const fn with_center_of_mass(mut self, com: Point2D) -> Self {
        self.center_of_mass = Some(com);
        self
    }

    /// Builder: set overall visibility
    #[must_use]
    pub const fn with_visibility(mut self, visibility: f64) -> Self {
        self.visibility = visibility;
        self
    }

    /// Builder: attach raw landmarks
    #[must_use]
    pub fn with_landmarks(mut self, landmarks: PoseLandmarks) -> Self {
        self.landmarks = Some(landmarks);
        self
    }

    /// List every input-contract violation without modifying the frame
    #[must_use]
    pub fn validate(&self) -> Vec<InputIssue> {
        self.clone().sanitized().1
    }

    /// Enforce the input contract, dropping or clamping invalid fields
    ///
    /// Out-of-range angles become `None`, visibility is clamped to [0, 1],
    /// a non-finite timestamp becomes 0 and a non-finite center of mass is
    /// removed. The returned issues describe each correction.
    #[must_use]
    pub fn sanitized(mut self) -> (Self, Vec<InputIssue>) {
        let mut issues = Vec::new();

        for (joint, slot) in self.angles.fields_mut() {
            if let Some(value) = *slot {
                if !value.is_finite()
                    || !(angles::MIN_JOINT_ANGLE..=angles::MAX_JOINT_ANGLE).contains(&value)
                {
                    issues.push(InputIssue::AngleOutOfRange {
                        joint: joint.to_owned(),
                        value,
                    });
                    *slot = None;
                }
            }
        }

        if !(visibility::MIN_VISIBILITY..=visibility::MAX_VISIBILITY).contains(&self.visibility) {
            issues.push(InputIssue::VisibilityOutOfRange {
                value: self.visibility,
            });
            self.visibility = if self.visibility.is_nan() {
                visibility::MIN_VISIBILITY
            } else {
                self.visibility
                    .clamp(visibility::MIN_VISIBILITY, visibility::MAX_VISIBILITY)
            };
        }

        if !self.timestamp.is_finite() {
            issues.push(InputIssue::InvalidTimestamp);
            self.timestamp = 0.0;
        }

        if let Some(com) = self.center_of_mass {
            if !com.x.is_finite() || !com.y.is_finite() {
                issues.push(InputIssue::InvalidCenterOfMass);
                self.center_of_mass = None;
            }
        }

        (self, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_drops_out_of_range_angles() {
        let angles = JointAngles {
            knee_left: Some(190.0),
            knee_right: Some(95.0),
            back: Some(f64::NAN),
            ..JointAngles::default()
        };
        let (frame, issues) = BiomechanicalMetrics::new(0.0, angles)
            .with_visibility(1.4)
            .sanitized();

        assert_eq!(frame.angles.knee_left, None);
        assert_eq!(frame.angles.knee_right, Some(95.0));
        assert_eq!(frame.angles.back, None);
        assert!((frame.visibility - 1.0).abs() < f64::EPSILON);
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_knee_mean_uses_available_side() {
        let angles = JointAngles {
            knee_right: Some(120.0),
            ..JointAngles::default()
        };
        assert_eq!(angles.knee_mean(), Some(120.0));
        assert_eq!(angles.knee_asymmetry(), None);
    }
}
