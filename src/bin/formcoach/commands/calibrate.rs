// ABOUTME: Calibrate command tuning thresholds against expert-rated repetitions
// ABOUTME: Records the result in a JSON history file when one is given
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use formcoach::config::CoachConfig;
use formcoach_intelligence::calibration::{CalibrationHistory, CalibrationSample, Calibrator};
use tracing::info;

use crate::helpers::display::print_calibration;

/// Calibrate from a samples file
pub fn run(config: &CoachConfig, samples: &Path, history: Option<&Path>) -> Result<()> {
    let json = fs::read_to_string(samples)
        .with_context(|| format!("failed to read {}", samples.display()))?;
    let samples: Vec<CalibrationSample> =
        serde_json::from_str(&json).context("samples file must be a JSON array of samples")?;
    info!(samples = samples.len(), level = %config.difficulty, "calibrating");

    let calibrator = Calibrator::new(config.difficulty, config.thresholds.clone())?;
    let result = calibrator.calibrate(&samples)?;
    print_calibration(&result);

    if let Some(path) = history {
        let mut log = CalibrationHistory::load(path)?;
        log.record(result);
        log.save(path)?;
        println!("\nRecorded in {}", path.display());
    }
    Ok(())
}
