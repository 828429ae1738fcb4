// ABOUTME: Demo command running synthetic squats through a coaching session
// ABOUTME: Useful for checking thresholds and difficulty levels without a camera
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use formcoach::config::CoachConfig;
use formcoach::session::FrameInput;
use formcoach::synthetic::{SquatGenerator, SquatProfile};
use tracing::info;

use crate::helpers::runner::SessionRunner;

/// Run `reps` synthetic repetitions
pub async fn run(config: &CoachConfig, reps: usize, seed: u64, noise: f64, bottom_back: f64) -> Result<()> {
    let profile = SquatProfile {
        noise,
        bottom_back,
        ..SquatProfile::default()
    };
    info!(reps, seed, noise, bottom_back, level = %config.difficulty, "starting demo");

    let mut generator = SquatGenerator::new(profile, config.thresholds.frame_rate, seed);
    let mut runner = SessionRunner::start(config, false)?;
    for frame in generator.session(reps) {
        if !runner.feed(FrameInput::Metrics(frame))? {
            break;
        }
    }
    runner.finish().await?;
    Ok(())
}
