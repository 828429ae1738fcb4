// ABOUTME: Versioned, immutable active configuration with atomic replacement
// ABOUTME: Readers take Arc snapshots; writers validate a full replacement before publishing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Configuration Store
//!
//! The only state shared between the frame path and configuration writers.
//! Each published [`ActiveConfig`] is immutable; a change builds and validates
//! a complete replacement and swaps the `Arc` under a short write lock.
//! Readers therefore observe either the previous version or the next one in
//! full. A rejected change leaves the current version in place.

use std::sync::{Arc, PoisonError, RwLock};

use formcoach_core::errors::ConfigError;
use formcoach_core::models::{DifficultyLevel, UserProfile};
use serde::Serialize;
use tracing::{info, warn};

use super::difficulty::{difficulty_profile, DifficultyProfile};
use super::thresholds::ThresholdConfig;

/// One immutable version of the analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveConfig {
    /// Monotonic version number, starting at 1
    pub version: u64,
    /// Difficulty level and the multiplier/weights it selected
    pub profile: DifficultyProfile,
    /// Unscaled thresholds (defaults plus overrides)
    pub base: ThresholdConfig,
    /// Thresholds after applying the difficulty multiplier; analyzers read these
    pub effective: ThresholdConfig,
}

impl ActiveConfig {
    /// Build and validate a configuration version
    ///
    /// # Errors
    ///
    /// Returns the validation error for invalid thresholds or weights.
    pub fn build(
        version: u64,
        level: DifficultyLevel,
        base: ThresholdConfig,
    ) -> Result<Self, ConfigError> {
        base.validate()?;
        let profile = difficulty_profile(level);
        profile.weights.validate()?;
        let effective = base.scaled(profile.threshold_multiplier)?;
        effective.validate()?;
        Ok(Self {
            version,
            profile,
            base,
            effective,
        })
    }

    /// Difficulty level of this version
    #[must_use]
    pub const fn level(&self) -> DifficultyLevel {
        self.profile.level
    }
}

/// Holder of the current configuration version
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<ActiveConfig>>,
}

impl ConfigStore {
    /// Create a store with an initial validated version
    ///
    /// # Errors
    ///
    /// Returns the validation error when the initial config is invalid.
    pub fn new(level: DifficultyLevel, base: ThresholdConfig) -> Result<Self, ConfigError> {
        let initial = ActiveConfig::build(1, level, base)?;
        Ok(Self {
            current: RwLock::new(Arc::new(initial)),
        })
    }

    /// Current version; cheap to clone and safe to hold across frames
    #[must_use]
    pub fn snapshot(&self) -> Arc<ActiveConfig> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Switch the difficulty level, keeping the base thresholds
    ///
    /// # Errors
    ///
    /// Returns the validation error; the previous version stays active.
    pub fn set_difficulty(&self, level: DifficultyLevel) -> Result<Arc<ActiveConfig>, ConfigError> {
        self.publish(|current| Ok((level, current.base.clone())))
    }

    /// Replace the base thresholds, keeping the difficulty level
    ///
    /// # Errors
    ///
    /// Returns the validation error; the previous version stays active.
    pub fn set_thresholds(&self, base: ThresholdConfig) -> Result<Arc<ActiveConfig>, ConfigError> {
        self.publish(|current| Ok((current.level(), base)))
    }

    /// Apply a user profile: its level plus its personal overrides over `defaults`
    ///
    /// # Errors
    ///
    /// Returns the validation error; the previous version stays active.
    pub fn apply_user_profile(
        &self,
        profile: &UserProfile,
        defaults: &ThresholdConfig,
    ) -> Result<Arc<ActiveConfig>, ConfigError> {
        self.publish(|_| {
            let base = defaults.with_overrides(&profile.threshold_overrides)?;
            Ok((profile.level, base))
        })
    }

    fn publish<F>(&self, change: F) -> Result<Arc<ActiveConfig>, ConfigError>
    where
        F: FnOnce(&ActiveConfig) -> Result<(DifficultyLevel, ThresholdConfig), ConfigError>,
    {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let next = change(&guard).and_then(|(level, base)| {
            ActiveConfig::build(guard.version + 1, level, base)
        });
        match next {
            Ok(config) => {
                let config = Arc::new(config);
                *guard = Arc::clone(&config);
                info!(
                    config.version = config.version,
                    config.level = %config.level(),
                    config.multiplier = config.profile.threshold_multiplier,
                    "published analysis configuration"
                );
                Ok(config)
            }
            Err(error) => {
                warn!(
                    config.version = guard.version,
                    error = %error,
                    "rejected configuration change; keeping current version"
                );
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_change_keeps_previous_version() {
        let store = ConfigStore::new(DifficultyLevel::Casual, ThresholdConfig::default());
        let Ok(store) = store else {
            unreachable!("default config is valid");
        };
        let mut bad = ThresholdConfig::default();
        bad.frame_rate = 0.0;
        assert!(store.set_thresholds(bad).is_err());
        let current = store.snapshot();
        assert_eq!(current.version, 1);
        assert!((current.base.frame_rate - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_version_increments_on_publish() {
        let Ok(store) = ConfigStore::new(DifficultyLevel::Casual, ThresholdConfig::default()) else {
            unreachable!("default config is valid");
        };
        let held = store.snapshot();
        let next = store.set_difficulty(DifficultyLevel::Expert);
        assert_eq!(next.map(|c| c.version).ok(), Some(2));
        assert_eq!(held.level(), DifficultyLevel::Casual);
        assert_eq!(store.snapshot().level(), DifficultyLevel::Expert);
    }

    #[test]
    fn test_effective_thresholds_valid_at_every_level() {
        for level in DifficultyLevel::ALL {
            let Ok(config) = ActiveConfig::build(1, level, ThresholdConfig::default()) else {
                unreachable!("default config is valid at {level}");
            };
            assert!(config.effective.validate().is_ok());
        }
        let Ok(expert) = ActiveConfig::build(1, DifficultyLevel::Expert, ThresholdConfig::default())
        else {
            unreachable!("default config is valid at expert");
        };
        assert!((expert.effective.safety_excellent_posture - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scaled_ordering_violation_is_rejected() {
        let mut base = ThresholdConfig::default();
        base.tempo_too_fast_threshold = 1.5;
        assert!(ActiveConfig::build(1, DifficultyLevel::Casual, base.clone()).is_ok());
        assert!(matches!(
            ActiveConfig::build(1, DifficultyLevel::Expert, base),
            Err(ConfigError::InvalidOrdering(_))
        ));
    }
}
