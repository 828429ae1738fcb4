// ABOUTME: Named 2D pose landmarks with visibility produced by the pose estimator
// ABOUTME: Provides lookup helpers for visible points and bilateral midpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::metrics::Point2D;

/// Body landmarks consumed by the squat analyzers
///
/// Coordinates are image-normalized with `y` growing downward, matching the
/// output convention of common 33-point pose estimators. `index()` returns the
/// position of the landmark in that 33-point layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandmarkId {
    /// Nose tip
    Nose,
    /// Left ear
    LeftEar,
    /// Right ear
    RightEar,
    /// Left shoulder
    LeftShoulder,
    /// Right shoulder
    RightShoulder,
    /// Left hip
    LeftHip,
    /// Right hip
    RightHip,
    /// Left knee
    LeftKnee,
    /// Right knee
    RightKnee,
    /// Left ankle
    LeftAnkle,
    /// Right ankle
    RightAnkle,
    /// Left heel
    LeftHeel,
    /// Right heel
    RightHeel,
    /// Left foot index (toe)
    LeftFootIndex,
    /// Right foot index (toe)
    RightFootIndex,
}

impl LandmarkId {
    /// Every landmark the analyzers know about
    pub const ALL: [Self; 15] = [
        Self::Nose,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
        Self::LeftHeel,
        Self::RightHeel,
        Self::LeftFootIndex,
        Self::RightFootIndex,
    ];

    /// Index in the 33-point pose layout
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Nose => 0,
            Self::LeftEar => 7,
            Self::RightEar => 8,
            Self::LeftShoulder => 11,
            Self::RightShoulder => 12,
            Self::LeftHip => 23,
            Self::RightHip => 24,
            Self::LeftKnee => 25,
            Self::RightKnee => 26,
            Self::LeftAnkle => 27,
            Self::RightAnkle => 28,
            Self::LeftHeel => 29,
            Self::RightHeel => 30,
            Self::LeftFootIndex => 31,
            Self::RightFootIndex => 32,
        }
    }

    /// Reverse lookup from a 33-point layout index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.index() == index)
    }
}

/// One landmark position with its detection confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    /// Horizontal position, normalized to image width
    pub x: f64,
    /// Vertical position, normalized to image height (downward)
    pub y: f64,
    /// Detection confidence in [0, 1]
    #[serde(default = "full_visibility")]
    pub visibility: f64,
}

const fn full_visibility() -> f64 {
    1.0
}

impl Landmark {
    /// Create a landmark
    #[must_use]
    pub const fn new(x: f64, y: f64, visibility: f64) -> Self {
        Self { x, y, visibility }
    }

    /// Position without the confidence
    #[must_use]
    pub const fn point(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Landmarks detected in a single frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseLandmarks {
    /// Detected landmarks keyed by identity; undetected ones are absent
    pub points: BTreeMap<LandmarkId, Landmark>,
}

impl PoseLandmarks {
    /// Empty landmark set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    #[must_use]
    pub fn with(mut self, id: LandmarkId, landmark: Landmark) -> Self {
        self.points.insert(id, landmark);
        self
    }

    /// Build from a full 33-point layout, keeping only the landmarks used here
    #[must_use]
    pub fn from_indexed(landmarks: &[Landmark]) -> Self {
        let points = LandmarkId::ALL
            .into_iter()
            .filter_map(|id| landmarks.get(id.index()).map(|lm| (id, *lm)))
            .collect();
        Self { points }
    }

    /// Raw landmark regardless of visibility
    #[must_use]
    pub fn get(&self, id: LandmarkId) -> Option<&Landmark> {
        self.points.get(&id)
    }

    /// Landmark position if its visibility reaches `min_visibility`
    #[must_use]
    pub fn visible(&self, id: LandmarkId, min_visibility: f64) -> Option<Point2D> {
        self.points
            .get(&id)
            .filter(|lm| lm.visibility >= min_visibility)
            .map(Landmark::point)
    }

    /// Midpoint of two landmarks, or whichever one is visible
    #[must_use]
    pub fn midpoint(&self, left: LandmarkId, right: LandmarkId, min_visibility: f64) -> Option<Point2D> {
        match (
            self.visible(left, min_visibility),
            self.visible(right, min_visibility),
        ) {
            (Some(a), Some(b)) => Some(a.midpoint(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        }
    }

    /// Mean visibility across detected landmarks (0 when none)
    #[must_use]
    pub fn mean_visibility(&self) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        self.points.values().map(|lm| lm.visibility).sum::<f64>() / self.points.len() as f64
    }

    /// True when every listed landmark is visible
    #[must_use]
    pub fn has_all(&self, ids: &[LandmarkId], min_visibility: f64) -> bool {
        ids.iter().all(|id| self.visible(*id, min_visibility).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for id in LandmarkId::ALL {
            assert_eq!(LandmarkId::from_index(id.index()), Some(id));
        }
        assert_eq!(LandmarkId::from_index(1), None);
    }

    #[test]
    fn test_midpoint_falls_back_to_visible_side() {
        let landmarks = PoseLandmarks::new()
            .with(LandmarkId::LeftHip, Landmark::new(0.4, 0.5, 0.9))
            .with(LandmarkId::RightHip, Landmark::new(0.6, 0.5, 0.1));
        let mid = landmarks.midpoint(LandmarkId::LeftHip, LandmarkId::RightHip, 0.5);
        assert_eq!(mid, Some(Point2D::new(0.4, 0.5)));
    }
}
