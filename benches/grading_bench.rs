// ABOUTME: Criterion benchmarks for the per-frame and per-repetition hot paths
// ABOUTME: Measures state machine throughput, grading latency, and full session processing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for repetition tracking and grading.
//!
//! The per-frame path must stay far below one frame interval at 30 fps, and
//! grading a repetition must finish before the next one can complete.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use formcoach::events::EventPublisher;
use formcoach::session::{CoachSession, FrameInput};
use formcoach::synthetic::{SquatGenerator, SquatProfile};
use formcoach_core::models::{BiomechanicalMetrics, DifficultyLevel};
use formcoach_intelligence::config::ThresholdConfig;
use formcoach_intelligence::{FormGrader, RepetitionStateMachine, RepetitionWindow};

const FRAME_RATE: f64 = 30.0;

fn session_frames(reps: usize) -> Vec<BiomechanicalMetrics> {
    let profile = SquatProfile {
        noise: 1.5,
        ..SquatProfile::default()
    };
    SquatGenerator::new(profile, FRAME_RATE, 42).session(reps)
}

fn first_window() -> Option<RepetitionWindow> {
    let config = ThresholdConfig::default();
    let mut machine = RepetitionStateMachine::new();
    session_frames(1)
        .into_iter()
        .find_map(|frame| machine.step(frame, &config).window)
}

/// Benchmark phase classification over whole sessions
fn bench_state_machine(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_machine");
    let config = ThresholdConfig::default();

    for reps in [1_usize, 10, 50] {
        let frames = session_frames(reps);
        group.throughput(Throughput::Elements(frames.len() as u64));
        group.bench_with_input(BenchmarkId::new("frames", reps), &frames, |b, frames| {
            b.iter(|| {
                let mut machine = RepetitionStateMachine::new();
                for frame in frames {
                    let _ = machine.step(black_box(frame.clone()), &config);
                }
                machine.rep_count()
            });
        });
    }

    group.finish();
}

/// Benchmark grading one repetition at each difficulty level
fn bench_grading(c: &mut Criterion) {
    let Some(window) = first_window() else {
        return;
    };
    let mut group = c.benchmark_group("grading");

    for level in DifficultyLevel::ALL {
        for parallel in [false, true] {
            let Ok(grader) = FormGrader::with_config(level, ThresholdConfig::default()) else {
                continue;
            };
            let grader = grader.with_parallelism(parallel);
            let mode = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(mode, level), &window, |b, window| {
                b.iter(|| grader.grade_current(black_box(window), 1));
            });
        }
    }

    group.finish();
}

/// Benchmark the full session path, event publishing included
fn bench_session(c: &mut Criterion) {
    let mut group = c.benchmark_group("session");
    let frames = session_frames(10);
    group.throughput(Throughput::Elements(frames.len() as u64));

    group.bench_function("ten_reps", |b| {
        b.iter(|| {
            let Ok(grader) = FormGrader::with_config(DifficultyLevel::Casual, ThresholdConfig::default()) else {
                return 0;
            };
            let mut session = CoachSession::new(grader, EventPublisher::disabled());
            session.start_session();
            for frame in &frames {
                let _ = session.process_frame(FrameInput::Metrics(black_box(frame.clone())));
            }
            session.end_session().map_or(0, |summary| summary.reps_completed)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_state_machine, bench_grading, bench_session);
criterion_main!(benches);
