// ABOUTME: Integration tests for the repetition state machine over realistic frame streams
// ABOUTME: Verifies rep counting, phase order, discard reasons, and low-visibility handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{capture_windows, frame, frames_from_knees, init_test_logging};
use formcoach::synthetic::{SquatGenerator, SquatProfile};
use formcoach_core::models::MovementPhase;
use formcoach_intelligence::config::ThresholdConfig;
use formcoach_intelligence::{DiscardReason, RepetitionStateMachine};

fn run(knees: &[f64]) -> (RepetitionStateMachine, Vec<DiscardReason>) {
    let config = ThresholdConfig::default();
    let mut machine = RepetitionStateMachine::new();
    let discards = frames_from_knees(knees, 175.0)
        .into_iter()
        .filter_map(|f| machine.step(f, &config).discarded)
        .collect();
    (machine, discards)
}

#[test]
fn test_synthetic_session_counts_every_repetition() {
    init_test_logging();
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 11);
    let windows = capture_windows(generator.session(5), &ThresholdConfig::default());

    assert_eq!(windows.len(), 5);
    for window in &windows {
        assert_eq!(window.phase_coverage(), 4);
        assert_eq!(window.phases().last(), Some(&MovementPhase::Standing));
        assert_eq!(window.phases().first(), Some(&MovementPhase::Descending));
    }
}

#[test]
fn test_noisy_session_still_counts_every_repetition() {
    let profile = SquatProfile {
        noise: 2.0,
        ..SquatProfile::default()
    };
    let mut generator = SquatGenerator::new(profile, 30.0, 99);
    let windows = capture_windows(generator.session(4), &ThresholdConfig::default());
    assert_eq!(windows.len(), 4);
}

#[test]
fn test_phase_transitions_follow_the_cycle() {
    let config = ThresholdConfig::default();
    let mut machine = RepetitionStateMachine::new();
    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 3);

    let transitions: Vec<(MovementPhase, MovementPhase)> = generator
        .session(1)
        .into_iter()
        .map(|f| machine.step(f, &config).state)
        .filter(|state| state.transitioned())
        .map(|state| (state.previous_phase, state.phase))
        .collect();

    assert_eq!(
        transitions,
        vec![
            (MovementPhase::Standing, MovementPhase::Descending),
            (MovementPhase::Descending, MovementPhase::Bottom),
            (MovementPhase::Bottom, MovementPhase::Ascending),
            (MovementPhase::Ascending, MovementPhase::Standing),
        ]
    );
    assert_eq!(machine.rep_count(), 1);
}

#[test]
fn test_small_dip_is_a_silent_false_start() {
    let (machine, discards) = run(&[170.0, 160.0, 145.0, 140.0, 145.0, 160.0, 170.0]);

    assert_eq!(machine.rep_count(), 0);
    assert_eq!(discards.len(), 1);
    assert!(matches!(discards[0], DiscardReason::FalseStart { .. }));
    assert!(!discards[0].is_reportable());
}

#[test]
fn test_descent_reversed_before_bottom_is_abandoned() {
    let (machine, discards) = run(&[170.0, 145.0, 130.0, 120.0, 115.0, 125.0, 140.0, 165.0]);

    assert_eq!(machine.rep_count(), 0);
    match &discards[..] {
        [DiscardReason::Abandoned {
            frames,
            deepest_angle,
        }] => {
            assert_eq!(*frames, 7);
            assert!((deepest_angle - 115.0).abs() < f64::EPSILON);
        }
        other => panic!("expected one abandoned window, got {other:?}"),
    }
    assert!(discards[0].is_reportable());
}

#[test]
fn test_rushed_repetition_fails_duration_gate() {
    let (machine, discards) = run(&[170.0, 140.0, 120.0, 100.0, 95.0, 125.0, 135.0, 145.0, 155.0, 170.0]);

    assert_eq!(machine.rep_count(), 0);
    assert!(matches!(discards.as_slice(), [DiscardReason::TooShort { .. }]));
}

#[test]
fn test_too_few_frames_is_rejected_before_duration() {
    let (machine, discards) = run(&[170.0, 140.0, 100.0, 125.0, 160.0]);

    assert_eq!(machine.rep_count(), 0);
    assert!(matches!(
        discards.as_slice(),
        [DiscardReason::TooFewFrames {
            frames: 4,
            min_frames: 5
        }]
    ));
}

#[test]
fn test_low_visibility_frames_never_move_the_phase() {
    let config = ThresholdConfig::default();
    let mut machine = RepetitionStateMachine::new();

    for i in 0..10 {
        let outcome = machine.step(frame(i, 90.0, 175.0).with_visibility(0.2), &config);
        assert_eq!(outcome.state.phase, MovementPhase::Standing);
        assert!(outcome.state.primary_angle.is_none());
    }
    assert!(!machine.in_repetition());
}

#[test]
fn test_cancel_discards_in_flight_repetition() {
    let config = ThresholdConfig::default();
    let mut machine = RepetitionStateMachine::new();
    for (i, knee) in [170.0, 140.0, 100.0].into_iter().enumerate() {
        let _ = machine.step(frame(i, knee, 175.0), &config);
    }
    assert!(machine.in_repetition());

    assert_eq!(machine.cancel(), Some(DiscardReason::Cancelled { frames: 2 }));
    assert_eq!(machine.phase(), MovementPhase::Standing);
    assert_eq!(machine.cancel(), None);
}

#[test]
fn test_long_bottom_hold_fails_duration_gate() {
    // 16 s at the bottom between a normal descent and ascent
    let mut knees = vec![170.0, 140.0, 120.0, 100.0];
    knees.extend(vec![80.0; 16 * 30]);
    knees.extend([100.0, 125.0, 140.0, 155.0, 170.0]);

    let config = ThresholdConfig::default();
    let mut machine = RepetitionStateMachine::new();
    let mut windows = 0;
    let mut discards = Vec::new();
    for f in frames_from_knees(&knees, 175.0) {
        let outcome = machine.step(f, &config);
        windows += usize::from(outcome.window.is_some());
        discards.extend(outcome.discarded);
    }

    assert_eq!(machine.rep_count(), 0);
    assert_eq!(windows, 0);
    match discards.as_slice() {
        [DiscardReason::TooLong {
            duration,
            max_duration,
        }] => {
            assert!(duration > max_duration);
            assert!((max_duration - 15.0).abs() < f64::EPSILON);
        }
        other => panic!("expected one too-long discard, got {other:?}"),
    }
    assert_eq!(machine.phase(), MovementPhase::Standing);
    assert!(!machine.in_repetition());
    assert_eq!(machine.buffered_frames(), 0);
}

#[test]
fn test_next_repetition_counts_after_overrun() {
    let mut knees = vec![170.0, 140.0, 120.0, 100.0];
    knees.extend(vec![80.0; 20 * 30]);
    knees.extend([100.0, 125.0, 140.0, 155.0, 170.0, 170.0]);
    let mut frames = frames_from_knees(&knees, 175.0);

    let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 3);
    frames.extend(generator.session(1));

    let windows = capture_windows(frames, &ThresholdConfig::default());
    assert_eq!(windows.len(), 1);
}
