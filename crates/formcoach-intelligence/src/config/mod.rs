// ABOUTME: Configuration module for the formcoach-intelligence crate
// ABOUTME: Re-exports thresholds, catalog, difficulty profiles, and the versioned store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Parameter catalog (ranges, units, scaling sense)
pub mod catalog;
/// Difficulty level to multiplier/weights mapping
pub mod difficulty;
/// Versioned active configuration with atomic replacement
pub mod store;
/// Threshold parameters and their validation
pub mod thresholds;

pub use catalog::{get_parameter, group_parameters, ParameterGroup, ThresholdParameter, ThresholdSense};
pub use difficulty::{difficulty_profile, ComponentWeights, DifficultyProfile};
pub use store::{ActiveConfig, ConfigStore};
pub use thresholds::{ThresholdConfig, THRESHOLD_CATALOG};
