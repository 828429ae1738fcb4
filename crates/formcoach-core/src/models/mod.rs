// ABOUTME: Core data models for repetition tracking and form grading
// ABOUTME: Re-exports metrics, landmarks, phases, difficulty levels, and fault types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Everything that flows between the angle extractor, the repetition state
//! machine, and the analyzers is defined here so the algorithm crate and the
//! session service agree on one vocabulary.

/// Per-landmark 2D pose positions
pub mod landmarks;
/// Per-frame biomechanical snapshot
pub mod metrics;
/// Movement phase enumeration
pub mod phase;
/// Difficulty levels and user profiles
pub mod level;
/// Fault taxonomy with severities and coaching cues
pub mod fault;

pub use fault::{Fault, FaultCategory, FaultSeverity, FaultType};
pub use landmarks::{Landmark, LandmarkId, PoseLandmarks};
pub use level::{DifficultyLevel, UserProfile};
pub use metrics::{BiomechanicalMetrics, InputIssue, JointAngles, Point2D};
pub use phase::MovementPhase;
