// ABOUTME: Integration tests for coaching sessions driven frame by frame
// ABOUTME: Covers lifecycle, events, cancellation, live config changes, and input sanitizing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::collections::BTreeMap;

use common::{grader, init_test_logging};
use formcoach::events::{spawn_event_logger, CoachEvent, EventPublisher};
use formcoach::session::{CoachSession, FrameInput};
use formcoach::synthetic::{SquatGenerator, SquatProfile};
use formcoach_core::errors::ErrorCode;
use formcoach_core::models::{
    BiomechanicalMetrics, DifficultyLevel, Landmark, LandmarkId, PoseLandmarks, UserProfile,
};
use formcoach_intelligence::DiscardReason;
use tokio::sync::mpsc;

fn session(level: DifficultyLevel, capacity: usize) -> (CoachSession, mpsc::Receiver<CoachEvent>) {
    let (events, rx) = EventPublisher::channel(capacity);
    (CoachSession::new(grader(level), events), rx)
}

fn feed(session: &mut CoachSession, frames: Vec<BiomechanicalMetrics>) -> u32 {
    let mut completed = 0;
    for frame in frames {
        let result = session.process_frame(FrameInput::Metrics(frame)).unwrap();
        if result.repetition.is_some() {
            completed += 1;
        }
    }
    completed
}

fn drain(rx: &mut mpsc::Receiver<CoachEvent>) -> Vec<CoachEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// === Lifecycle ===

#[test]
fn test_full_session_summary() {
    init_test_logging();
    let (mut session, mut rx) = session(DifficultyLevel::Casual, 1024);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);

    let info = session.start_session();
    assert!(session.is_active());
    assert_eq!(feed(&mut session, generator.session(3)), 3);

    let summary = session.end_session().unwrap();
    assert_eq!(summary.session_id, info.session_id);
    assert_eq!(summary.reps_completed, 3);
    assert_eq!(summary.results.len(), 3);
    assert_eq!(summary.reps_discarded, 0);
    assert!(!summary.cancelled);
    assert_eq!(summary.dropped_events, 0);
    assert!(summary.average_score.is_some_and(|s| s > 90.0));
    assert!(summary.best_score >= summary.worst_score);
    assert!(!session.is_active());

    let events = drain(&mut rx);
    assert!(matches!(events.first(), Some(CoachEvent::SessionStarted { .. })));
    assert!(matches!(
        events.last(),
        Some(CoachEvent::SessionEnded {
            reps_completed: 3,
            cancelled: false,
            ..
        })
    ));
    let completed = events
        .iter()
        .filter(|e| matches!(e, CoachEvent::RepetitionCompleted { .. }))
        .count();
    assert_eq!(completed, 3);
    let transitions = events
        .iter()
        .filter(|e| matches!(e, CoachEvent::PhaseChanged { .. }))
        .count();
    assert_eq!(transitions, 12);
}

#[test]
fn test_frames_require_an_active_session() {
    let (mut session, _rx) = session(DifficultyLevel::Casual, 16);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);
    let frame = generator.standing(0.1).remove(0);

    let err = session.process_frame(FrameInput::Metrics(frame)).unwrap_err();
    assert_eq!(err.code, ErrorCode::SessionNotActive);
    assert!(session.end_session().is_err());
}

#[test]
fn test_restart_resets_rep_count() {
    let (mut session, _rx) = session(DifficultyLevel::Casual, 1024);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);

    session.start_session();
    feed(&mut session, generator.session(2));
    session.start_session();
    feed(&mut session, generator.session(1));

    let summary = session.end_session().unwrap();
    assert_eq!(summary.reps_completed, 1);
    assert_eq!(summary.results[0].rep_number, 1);
}

// === Cancellation ===

#[test]
fn test_cancellation_ends_session_on_next_frame() {
    let (mut session, mut rx) = session(DifficultyLevel::Casual, 1024);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);
    let cancel = session.cancel_handle();

    session.start_session();
    feed(&mut session, generator.session(1));
    let half = generator.repetition();
    let (first, rest) = half.split_at(50);
    feed(&mut session, first.to_vec());

    cancel.cancel();
    assert!(cancel.is_cancelled());
    let result = session
        .process_frame(FrameInput::Metrics(rest[0].clone()))
        .unwrap();
    assert!(result.session_ended);
    assert!(matches!(result.discarded, Some(DiscardReason::Cancelled { .. })));

    let summary = session.end_session().unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.reps_completed, 1);
    assert!(session.end_session().is_err());
    assert!(session
        .process_frame(FrameInput::Metrics(rest[1].clone()))
        .is_err());

    let events = drain(&mut rx);
    assert!(matches!(
        events.last(),
        Some(CoachEvent::SessionEnded { cancelled: true, .. })
    ));
}

// === Configuration changes ===

#[test]
fn test_difficulty_change_applies_from_next_repetition() {
    let (mut session, _rx) = session(DifficultyLevel::Casual, 1024);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);

    session.start_session();
    let rep = generator.repetition();
    let (before, after) = rep.split_at(50);
    feed(&mut session, before.to_vec());

    let applied = session.set_difficulty(DifficultyLevel::Expert).unwrap();
    assert_eq!(applied.level(), DifficultyLevel::Expert);

    feed(&mut session, after.to_vec());
    feed(&mut session, generator.session(1));

    let summary = session.end_session().unwrap();
    assert_eq!(summary.results.len(), 2);
    assert_eq!(summary.results[0].context.level, DifficultyLevel::Casual);
    assert_eq!(summary.results[1].context.level, DifficultyLevel::Expert);
    assert!(summary.results[1].context.config_version > summary.results[0].context.config_version);
    assert_eq!(summary.level, DifficultyLevel::Expert);
}

#[test]
fn test_rejected_profile_keeps_previous_config() {
    let (mut session, mut rx) = session(DifficultyLevel::Casual, 1024);
    session.start_session();
    let before = session.config_store().snapshot();

    let profile = UserProfile {
        threshold_overrides: BTreeMap::from([("safety_severe_back_rounding".to_owned(), 500.0)]),
        ..UserProfile::with_level(DifficultyLevel::Expert)
    };
    assert!(session.set_user_profile(&profile).is_err());

    let after = session.config_store().snapshot();
    assert_eq!(after.version, before.version);
    assert_eq!(after.level(), DifficultyLevel::Casual);

    let events = drain(&mut rx);
    assert!(events
        .iter()
        .any(|e| matches!(e, CoachEvent::ConfigRejected { .. })));
}

#[test]
fn test_user_profile_overrides_apply() {
    let (mut session, _rx) = session(DifficultyLevel::Casual, 1024);
    session.start_session();

    let profile = UserProfile {
        threshold_overrides: BTreeMap::from([("symmetry_threshold".to_owned(), 10.0)]),
        ..UserProfile::with_level(DifficultyLevel::Professional)
    };
    let applied = session.set_user_profile(&profile).unwrap();
    assert_eq!(applied.level(), DifficultyLevel::Professional);
    assert!((applied.base.symmetry_threshold - 10.0).abs() < f64::EPSILON);
    assert!((applied.effective.symmetry_threshold - 9.0).abs() < 1e-9);
}

// === Input handling and events ===

/// Standing side view with both knees detected at `knee_visibility`
fn standing_landmarks(knee_visibility: f64) -> PoseLandmarks {
    [
        (LandmarkId::LeftShoulder, 0.50, 0.30, 1.0),
        (LandmarkId::RightShoulder, 0.52, 0.30, 1.0),
        (LandmarkId::LeftHip, 0.50, 0.55, 1.0),
        (LandmarkId::RightHip, 0.52, 0.55, 1.0),
        (LandmarkId::LeftKnee, 0.51, 0.75, knee_visibility),
        (LandmarkId::RightKnee, 0.53, 0.75, knee_visibility),
        (LandmarkId::LeftAnkle, 0.50, 0.95, 1.0),
        (LandmarkId::RightAnkle, 0.52, 0.95, 1.0),
    ]
    .into_iter()
    .fold(PoseLandmarks::new(), |lm, (id, x, y, v)| {
        lm.with(id, Landmark::new(x, y, v))
    })
}

#[test]
fn test_profile_visibility_floor_applies_to_landmark_extraction() {
    let (mut session, _rx) = session(DifficultyLevel::Casual, 64);
    session.start_session();

    let landmarks = |timestamp| FrameInput::Landmarks {
        timestamp,
        landmarks: standing_landmarks(0.6),
    };
    let before = session.process_frame(landmarks(0.0)).unwrap();
    assert!(before.primary_angle.is_some());

    let profile = UserProfile {
        threshold_overrides: BTreeMap::from([("min_landmark_visibility".to_owned(), 0.8)]),
        ..UserProfile::with_level(DifficultyLevel::Casual)
    };
    session.set_user_profile(&profile).unwrap();

    let after = session.process_frame(landmarks(1.0 / 30.0)).unwrap();
    assert!(after.primary_angle.is_none());
    assert_eq!(after.phase, before.phase);
}

#[test]
fn test_invalid_angles_are_sanitized_not_fatal() {
    let (mut session, _rx) = session(DifficultyLevel::Casual, 64);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);
    session.start_session();

    let mut frame = generator.standing(0.1).remove(0);
    frame.angles.back = Some(250.0);
    frame.angles.knee_left = Some(f64::NAN);
    let result = session.process_frame(FrameInput::Metrics(frame)).unwrap();
    assert_eq!(result.input_issues.len(), 2);
    assert!(result.live_score_estimate.is_none());

    let summary = session.end_session().unwrap();
    assert_eq!(summary.frames_processed, 1);
    assert_eq!(summary.frames_with_input_issues, 1);
}

#[test]
fn test_full_event_queue_drops_without_blocking() {
    let (mut session, _rx) = session(DifficultyLevel::Casual, 1);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);

    session.start_session();
    assert_eq!(feed(&mut session, generator.session(2)), 2);
    let summary = session.end_session().unwrap();

    assert_eq!(summary.reps_completed, 2);
    assert!(summary.dropped_events > 0);
    assert_eq!(session.dropped_events(), summary.dropped_events + 1);
}

#[tokio::test]
async fn test_event_logger_drains_session_events() {
    init_test_logging();
    let (events, rx) = EventPublisher::channel(1024);
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    let logger = spawn_event_logger(rx, shutdown_rx);

    let mut session = CoachSession::new(grader(DifficultyLevel::Casual), events);
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 5);
    session.start_session();
    feed(&mut session, generator.session(1));
    session.end_session().unwrap();
    drop(session);

    let logged = logger.await.unwrap();
    drop(shutdown_tx);
    // started + 4 transitions + completed + ended
    assert_eq!(logged, 7);
}
