// ABOUTME: Tempo analyzer scoring repetition duration against fast, slow, and optimal bands
// ABOUTME: Duration is the window frame count divided by the configured frame rate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::models::{Fault, FaultType};

use super::{AnalyzerKind, AnalyzerResult, DataRequirement, FormAnalyzer, ScoreCard};
use crate::config::ThresholdConfig;
use crate::window::RepetitionWindow;

/// Scores repetition speed
#[derive(Debug, Clone, Copy, Default)]
pub struct TempoAnalyzer;

impl FormAnalyzer for TempoAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Tempo
    }

    fn requirements(&self) -> &'static [DataRequirement] {
        &[]
    }

    fn analyze(&self, window: &RepetitionWindow, config: &ThresholdConfig) -> AnalyzerResult {
        let duration = window.duration_seconds(config.frame_rate);
        let card = ScoreCard::new(self.kind()).measure("duration_seconds", duration);

        let card = if duration < config.tempo_too_fast_threshold {
            card.fault(
                Fault::new(
                    FaultType::TooFast,
                    duration,
                    config.tempo_too_fast_threshold,
                    format!("repetition took {duration:.2}s"),
                ),
                config.tempo_fault_penalty,
            )
        } else if duration > config.tempo_too_slow_threshold {
            card.fault(
                Fault::new(
                    FaultType::TooSlow,
                    duration,
                    config.tempo_too_slow_threshold,
                    format!("repetition took {duration:.2}s"),
                ),
                config.tempo_fault_penalty,
            )
        } else if !(config.tempo_optimal_min..=config.tempo_optimal_max).contains(&duration) {
            card.penalty("tempo outside optimal band", config.tempo_suboptimal_penalty)
        } else {
            card
        };
        card.finish()
    }
}
