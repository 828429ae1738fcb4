// ABOUTME: Repetition window: the ordered frames of one descent-to-standing cycle
// ABOUTME: Also defines primary-joint selection with fallback used for phase decisions and depth
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{BiomechanicalMetrics, MovementPhase};
use serde::{Deserialize, Serialize};

use crate::statistics;

/// Joint whose angle drives phase detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryJoint {
    /// Mean of the available knee angles
    #[default]
    Knee,
    /// Hip angle
    Hip,
}

impl PrimaryJoint {
    /// This joint's angle in a frame
    #[must_use]
    pub fn angle(self, frame: &BiomechanicalMetrics) -> Option<f64> {
        match self {
            Self::Knee => frame.angles.knee_mean(),
            Self::Hip => frame.angles.hip,
        }
    }
}

/// Primary joint plus the joint used when it is missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JointSelection {
    /// Preferred joint
    pub primary: PrimaryJoint,
    /// Used when the preferred joint is unavailable
    pub fallback: Option<PrimaryJoint>,
}

impl Default for JointSelection {
    fn default() -> Self {
        Self {
            primary: PrimaryJoint::Knee,
            fallback: Some(PrimaryJoint::Hip),
        }
    }
}

impl JointSelection {
    /// Primary angle for a frame, or `None` if the frame is not trustworthy
    #[must_use]
    pub fn angle(&self, frame: &BiomechanicalMetrics, min_visibility: f64) -> Option<f64> {
        if frame.visibility < min_visibility {
            return None;
        }
        self.primary
            .angle(frame)
            .or_else(|| self.fallback.and_then(|joint| joint.angle(frame)))
    }
}

/// Ordered, append-only frames of one repetition with the phase of each frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepetitionWindow {
    frames: Vec<BiomechanicalMetrics>,
    phases: Vec<MovementPhase>,
}

impl RepetitionWindow {
    /// Open a window with its first frame
    #[must_use]
    pub fn start(frame: BiomechanicalMetrics, phase: MovementPhase) -> Self {
        Self {
            frames: vec![frame],
            phases: vec![phase],
        }
    }

    /// Wrap externally recorded frames (calibration data, replays)
    ///
    /// Unlike windows built by the state machine this may be empty; analyzers
    /// treat an empty window as malformed and return a neutral result.
    #[must_use]
    pub fn from_frames(frames: Vec<BiomechanicalMetrics>) -> Self {
        let phases = vec![MovementPhase::Standing; frames.len()];
        Self { frames, phases }
    }

    /// Append the next frame
    pub fn push(&mut self, frame: BiomechanicalMetrics, phase: MovementPhase) {
        self.frames.push(frame);
        self.phases.push(phase);
    }

    /// Frames in capture order
    #[must_use]
    pub fn frames(&self) -> &[BiomechanicalMetrics] {
        &self.frames
    }

    /// Phase assigned to each frame
    #[must_use]
    pub fn phases(&self) -> &[MovementPhase] {
        &self.phases
    }

    /// Number of frames
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// True when the window holds no frames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Values of a per-frame signal, skipping frames where it is missing
    #[must_use]
    pub fn series<F>(&self, signal: F) -> Vec<f64>
    where
        F: Fn(&BiomechanicalMetrics) -> Option<f64>,
    {
        self.frames.iter().filter_map(signal).collect()
    }

    /// Primary angle series using the default joint selection
    #[must_use]
    pub fn primary_angles(&self) -> Vec<f64> {
        let selection = JointSelection::default();
        self.series(|frame| selection.angle(frame, 0.0))
    }

    /// Duration in seconds at `frame_rate`
    #[must_use]
    pub fn duration_seconds(&self, frame_rate: f64) -> f64 {
        self.len() as f64 / frame_rate
    }

    /// Number of distinct phases the window passed through
    #[must_use]
    pub fn phase_coverage(&self) -> usize {
        [
            MovementPhase::Standing,
            MovementPhase::Descending,
            MovementPhase::Bottom,
            MovementPhase::Ascending,
        ]
        .iter()
        .filter(|phase| self.phases.contains(phase))
        .count()
    }

    /// Mean frame visibility (0 for an empty window)
    #[must_use]
    pub fn mean_visibility(&self) -> f64 {
        statistics::mean(&self.series(|frame| Some(frame.visibility))).unwrap_or(0.0)
    }

    /// Consume the window
    #[must_use]
    pub fn into_frames(self) -> Vec<BiomechanicalMetrics> {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use formcoach_core::models::JointAngles;

    use super::*;

    #[test]
    fn test_selection_falls_back_to_hip() {
        let frame = BiomechanicalMetrics::new(
            0.0,
            JointAngles {
                hip: Some(140.0),
                ..JointAngles::default()
            },
        );
        assert_eq!(JointSelection::default().angle(&frame, 0.5), Some(140.0));
        let hidden = frame.with_visibility(0.2);
        assert_eq!(JointSelection::default().angle(&hidden, 0.5), None);
    }
}
