// ABOUTME: Difficulty levels and user profiles that drive threshold strictness
// ABOUTME: Parses the level names used by the CLI, environment, and legacy skill labels
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Skill/difficulty setting, ordered from most lenient to most strict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    /// New lifters: few analyzers, generous thresholds
    Beginner,
    /// Recreational lifters (default)
    #[default]
    Casual,
    /// Trained lifters; also accepted as "standard"
    #[serde(alias = "standard")]
    Professional,
    /// Competitive lifters: every analyzer, tight thresholds
    Expert,
}

impl DifficultyLevel {
    /// All levels from most lenient to most strict
    pub const ALL: [Self; 4] = [Self::Beginner, Self::Casual, Self::Professional, Self::Expert];

    /// Stable lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Casual => "casual",
            Self::Professional => "professional",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "casual" | "intermediate" => Ok(Self::Casual),
            "professional" | "standard" | "advanced" => Ok(Self::Professional),
            "expert" => Ok(Self::Expert),
            other => Err(ConfigError::parse("difficulty", other)),
        }
    }
}

/// The person being coached
///
/// Applying a profile selects its difficulty level and layers its personal
/// threshold overrides (for example a reduced depth requirement after an
/// injury) over the base configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name used in logs and summaries
    #[serde(default)]
    pub display_name: Option<String>,
    /// Skill level
    #[serde(default)]
    pub level: DifficultyLevel,
    /// Personal threshold overrides keyed by catalog parameter name
    #[serde(default)]
    pub threshold_overrides: BTreeMap<String, f64>,
}

impl UserProfile {
    /// Profile with only a level set
    #[must_use]
    pub fn with_level(level: DifficultyLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("standard".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Professional));
        assert_eq!(" Expert ".parse::<DifficultyLevel>(), Ok(DifficultyLevel::Expert));
        assert!("olympian".parse::<DifficultyLevel>().is_err());
    }

    #[test]
    fn test_levels_ordered_by_strictness() {
        assert!(DifficultyLevel::Beginner < DifficultyLevel::Expert);
        let mut sorted = DifficultyLevel::ALL;
        sorted.sort();
        assert_eq!(sorted, DifficultyLevel::ALL);
    }
}
