// ABOUTME: JSON-persisted log of calibration runs with apply and rollback support
// ABOUTME: Tracks which calibrated threshold set is active so it can be reverted to defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::{CalibrationError, CalibrationResult};
use crate::config::ThresholdConfig;

/// Ordered calibration records plus the currently applied one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationHistory {
    records: Vec<CalibrationResult>,
    #[serde(default)]
    active: Option<Uuid>,
}

impl CalibrationHistory {
    /// Empty history
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path`; a missing file is an empty history
    ///
    /// # Errors
    ///
    /// Returns `Io` for unreadable files and `Json` for malformed content.
    pub fn load(path: &Path) -> Result<Self, CalibrationError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Write the whole history to `path` as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns `Io` or `Json` on failure.
    pub fn save(&self, path: &Path) -> Result<(), CalibrationError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Append a run
    pub fn record(&mut self, result: CalibrationResult) {
        info!(id = %result.id, level = %result.level, "calibration recorded");
        self.records.push(result);
    }

    /// All runs, oldest first
    #[must_use]
    pub fn records(&self) -> &[CalibrationResult] {
        &self.records
    }

    /// Run by id
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&CalibrationResult> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Most recent run
    #[must_use]
    pub fn latest(&self) -> Option<&CalibrationResult> {
        self.records.last()
    }

    /// Id of the applied run, if any
    #[must_use]
    pub const fn active(&self) -> Option<Uuid> {
        self.active
    }

    /// Mark a run as applied and return its calibrated thresholds
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound` for unknown ids and `Config` when the stored
    /// thresholds no longer validate.
    pub fn apply(&mut self, id: Uuid) -> Result<ThresholdConfig, CalibrationError> {
        let record = self
            .get(id)
            .ok_or_else(|| CalibrationError::RecordNotFound(id.to_string()))?;
        record.calibrated.validate()?;
        let calibrated = record.calibrated.clone();
        self.active = Some(id);
        info!(%id, "calibration applied");
        Ok(calibrated)
    }

    /// Clear the applied run and return the default thresholds
    pub fn rollback(&mut self) -> ThresholdConfig {
        if let Some(id) = self.active.take() {
            info!(%id, "calibration rolled back");
        }
        ThresholdConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_empty() {
        let Ok(dir) = tempfile::tempdir() else {
            unreachable!("temp dir");
        };
        let Ok(history) = CalibrationHistory::load(&dir.path().join("none.json")) else {
            unreachable!("missing file is not an error");
        };
        assert!(history.records().is_empty());
        assert_eq!(history.active(), None);
    }

    #[test]
    fn test_empty_history_round_trips() {
        let Ok(dir) = tempfile::tempdir() else {
            unreachable!("temp dir");
        };
        let path = dir.path().join("history.json");
        let history = CalibrationHistory::new();
        assert!(history.save(&path).is_ok());
        assert!(matches!(CalibrationHistory::load(&path), Ok(loaded) if loaded == history));
    }
}
