// ABOUTME: Squat form intelligence: repetition detection, form analyzers, and grading
// ABOUTME: Pure algorithms over per-frame metrics, independent of the session service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FormCoach Intelligence
//!
//! Converts a stream of per-frame joint angles into repetition boundaries
//! and an explainable, skill-adjusted quality score.
//!
//! ## Pipeline
//!
//! 1. [`extractor::AngleExtractor`] turns pose landmarks into
//!    [`BiomechanicalMetrics`](formcoach_core::models::BiomechanicalMetrics)
//! 2. [`state_machine::RepetitionStateMachine`] classifies movement phases and
//!    emits a [`window::RepetitionWindow`] per completed repetition
//! 3. [`grader::FormGrader`] runs the nine [`analyzers`] on the window and
//!    combines their sub-scores with difficulty-dependent weights
//! 4. [`fatigue::FatigueMonitor`] tracks drift across repetitions
//!
//! Thresholds live in [`config::ThresholdConfig`]; [`calibration`] tunes them
//! against expert ratings.

/// The nine form analyzers behind one trait
pub mod analyzers;
/// Threshold tuning against human ratings
pub mod calibration;
/// Thresholds, difficulty profiles, and the versioned config store
pub mod config;
/// Landmark to joint-angle extraction
pub mod extractor;
/// Session fatigue tracking
pub mod fatigue;
/// 2D joint-angle geometry
pub mod geometry;
/// Composite scoring of a repetition
pub mod grader;
/// Fault suppression rules
pub mod hierarchy;
/// Coaching cues and assessment bands
pub mod recommendations;
/// One-Euro signal smoothing
pub mod smoothing;
/// Repetition and phase state machine
pub mod state_machine;
/// Small numeric helpers
pub mod statistics;
/// Buffered frames of one repetition
pub mod window;

pub use analyzers::{AnalyzerKind, AnalyzerResult, AnalyzerSuite, FormAnalyzer};
pub use config::{ActiveConfig, ConfigStore, ThresholdConfig};
pub use grader::{FormGrader, RepetitionResult};
pub use state_machine::{DiscardReason, RepState, RepetitionStateMachine, StepOutcome};
pub use window::RepetitionWindow;
