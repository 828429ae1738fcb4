// ABOUTME: FormCoach CLI - analyze recorded frame streams, run demos, inspect and calibrate thresholds
// ABOUTME: Thin command layer over the session service and intelligence crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Grade every repetition in a JSON-lines frame recording
//! formcoach analyze --input session.jsonl --difficulty professional
//!
//! # Synthetic squats with noise
//! formcoach demo --reps 5 --noise 2.0 --seed 7
//!
//! # Effective thresholds for a level
//! formcoach thresholds --difficulty expert
//!
//! # Calibrate against expert ratings and record the run
//! formcoach calibrate --samples ratings.json --history calibration_history.json
//! ```

mod commands;
mod helpers;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use formcoach::config::CoachConfig;
use formcoach::logging::LoggingConfig;
use formcoach_core::models::DifficultyLevel;

#[derive(Parser)]
#[command(
    name = "formcoach",
    about = "FormCoach squat form analysis",
    long_about = "Detects squat repetitions in pose streams and grades form against skill-adjusted thresholds."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Analyze a JSON-lines file of frames (metrics or landmarks)
    Analyze {
        /// Frames file, one JSON object per line
        #[arg(long)]
        input: PathBuf,

        /// Difficulty level (beginner, casual, professional, expert)
        #[arg(long)]
        difficulty: Option<DifficultyLevel>,

        /// JSON file of threshold overrides
        #[arg(long)]
        thresholds: Option<PathBuf>,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Run synthetic squats through a session
    Demo {
        /// Number of repetitions
        #[arg(long, default_value = "5")]
        reps: usize,

        /// Difficulty level
        #[arg(long)]
        difficulty: Option<DifficultyLevel>,

        /// Random seed for the noise generator
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Angle noise amplitude in degrees
        #[arg(long, default_value = "0.0")]
        noise: f64,

        /// Minimum back angle reached at the bottom
        #[arg(long, default_value = "170.0")]
        bottom_back: f64,
    },

    /// Print the threshold catalog with effective values
    Thresholds {
        /// Difficulty level
        #[arg(long)]
        difficulty: Option<DifficultyLevel>,
    },

    /// Calibrate thresholds against expert-rated repetitions
    Calibrate {
        /// JSON array of calibration samples
        #[arg(long)]
        samples: PathBuf,

        /// History file to record the result in
        #[arg(long)]
        history: Option<PathBuf>,

        /// Difficulty level the samples are graded at
        #[arg(long)]
        difficulty: Option<DifficultyLevel>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    LoggingConfig::from_env().verbose(cli.verbose).init()?;

    let mut config = CoachConfig::from_env().context("invalid FORMCOACH_* configuration")?;

    match cli.command {
        Command::Analyze {
            input,
            difficulty,
            thresholds,
            json,
        } => {
            apply_overrides(&mut config, difficulty, thresholds)?;
            commands::analyze::run(&config, &input, json).await?;
        }
        Command::Demo {
            reps,
            difficulty,
            seed,
            noise,
            bottom_back,
        } => {
            apply_overrides(&mut config, difficulty, None)?;
            commands::demo::run(&config, reps, seed, noise, bottom_back).await?;
        }
        Command::Thresholds { difficulty } => {
            apply_overrides(&mut config, difficulty, None)?;
            commands::thresholds::run(&config)?;
        }
        Command::Calibrate {
            samples,
            history,
            difficulty,
        } => {
            apply_overrides(&mut config, difficulty, None)?;
            commands::calibrate::run(&config, &samples, history.as_deref())?;
        }
    }

    Ok(())
}

fn apply_overrides(
    config: &mut CoachConfig,
    difficulty: Option<DifficultyLevel>,
    thresholds: Option<PathBuf>,
) -> Result<()> {
    if let Some(level) = difficulty {
        config.difficulty = level;
    }
    if let Some(path) = thresholds {
        config.thresholds = CoachConfig::load_thresholds(Some(&path))
            .with_context(|| format!("failed to load thresholds from {}", path.display()))?;
        config.thresholds_file = Some(path);
    }
    Ok(())
}
