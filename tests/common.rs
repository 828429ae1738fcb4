// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides logging setup, frame builders, and repetition capture helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::wildcard_in_or_patterns,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `formcoach`
//!
//! Frame builders and a capture helper that runs frames through the state
//! machine, so grading tests see windows shaped exactly like live sessions.

use std::sync::Once;

use formcoach::synthetic::{SquatGenerator, SquatProfile};
use formcoach_core::models::{BiomechanicalMetrics, DifficultyLevel, JointAngles, Point2D};
use formcoach_intelligence::config::ThresholdConfig;
use formcoach_intelligence::{FormGrader, RepetitionStateMachine, RepetitionWindow};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            Ok("WARN" | "ERROR") | _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Grader over default thresholds at `level`
pub fn grader(level: DifficultyLevel) -> FormGrader {
    FormGrader::with_config(level, ThresholdConfig::default()).expect("default thresholds are valid")
}

/// Frame at 30 fps with symmetric knees, a steady center of mass and full visibility
pub fn frame(index: usize, knee: f64, back: f64) -> BiomechanicalMetrics {
    BiomechanicalMetrics::new(
        index as f64 / 30.0,
        JointAngles {
            knee_left: Some(knee),
            knee_right: Some(knee),
            hip: Some((knee + 5.0).min(180.0)),
            back: Some(back),
            ..JointAngles::default()
        },
    )
    .with_center_of_mass(Point2D::new(0.5, 0.55))
}

/// Frames whose knee angle follows `knees` with a constant back angle
pub fn frames_from_knees(knees: &[f64], back: f64) -> Vec<BiomechanicalMetrics> {
    knees
        .iter()
        .enumerate()
        .map(|(i, &knee)| frame(i, knee, back))
        .collect()
}

/// Run `frames` through a fresh state machine and collect every counted window
pub fn capture_windows(frames: Vec<BiomechanicalMetrics>, config: &ThresholdConfig) -> Vec<RepetitionWindow> {
    let mut machine = RepetitionStateMachine::new();
    frames
        .into_iter()
        .filter_map(|f| machine.step(f, config).window)
        .collect()
}

/// The single repetition window produced by one synthetic repetition
pub fn synthetic_window(profile: SquatProfile) -> RepetitionWindow {
    let mut generator = SquatGenerator::new(profile, 30.0, 42);
    let frames = generator.session(1);
    capture_windows(frames, &ThresholdConfig::default())
        .into_iter()
        .next()
        .expect("synthetic repetition is counted")
}
