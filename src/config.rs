// ABOUTME: Service configuration loaded from FORMCOACH_* environment variables
// ABOUTME: Resolves difficulty, event queue size, analyzer parallelism, and threshold overrides
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration for the coaching service

use std::env;
use std::path::{Path, PathBuf};

use formcoach_core::constants::env_config;
use formcoach_core::constants::processing::DEFAULT_EVENT_QUEUE_CAPACITY;
use formcoach_core::errors::ConfigError;
use formcoach_core::models::DifficultyLevel;
use formcoach_intelligence::config::ThresholdConfig;
use tracing::info;

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CoachConfig {
    /// Initial difficulty level
    pub difficulty: DifficultyLevel,
    /// Capacity of the bounded event channel
    pub event_queue_capacity: usize,
    /// Run analyzers on the rayon pool
    pub parallel_analyzers: bool,
    /// Optional JSON file of threshold overrides
    pub thresholds_file: Option<PathBuf>,
    /// Base thresholds: defaults, then file, then `FORMCOACH_<KEY>` variables
    pub thresholds: ThresholdConfig,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyLevel::default(),
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
            parallel_analyzers: true,
            thresholds_file: None,
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl CoachConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for unparsable values, an unreadable thresholds
    /// file, or thresholds that fail validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let difficulty = match env::var(env_config::DIFFICULTY) {
            Ok(raw) => raw.parse()?,
            Err(_) => DifficultyLevel::default(),
        };

        let event_queue_capacity = match env::var(env_config::EVENT_QUEUE_CAPACITY) {
            Ok(raw) => parse_capacity(&raw)?,
            Err(_) => DEFAULT_EVENT_QUEUE_CAPACITY,
        };

        let parallel_analyzers = match env::var(env_config::PARALLEL_ANALYZERS) {
            Ok(raw) => parse_bool(env_config::PARALLEL_ANALYZERS, &raw)?,
            Err(_) => true,
        };

        let thresholds_file = env::var_os(env_config::THRESHOLDS_FILE).map(PathBuf::from);
        let thresholds = Self::load_thresholds(thresholds_file.as_deref())?;

        let config = Self {
            difficulty,
            event_queue_capacity,
            parallel_analyzers,
            thresholds_file,
            thresholds,
        };
        info!(
            difficulty = %config.difficulty,
            event_queue_capacity = config.event_queue_capacity,
            parallel_analyzers = config.parallel_analyzers,
            thresholds_file = ?config.thresholds_file,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Defaults or the given file, with environment overrides applied on top
    ///
    /// # Errors
    ///
    /// Returns the read, parse or validation error.
    pub fn load_thresholds(file: Option<&Path>) -> Result<ThresholdConfig, ConfigError> {
        let base = match file {
            Some(path) => ThresholdConfig::from_json_file(path)?,
            None => ThresholdConfig::default(),
        };
        base.with_overrides(&ThresholdConfig::env_overrides()?)
    }
}

fn parse_capacity(raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) | Err(_) => Err(ConfigError::parse(env_config::EVENT_QUEUE_CAPACITY, raw)),
        Ok(capacity) => Ok(capacity),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::parse(key, raw)),
    }
}
