// ABOUTME: Repetition state machine classifying frames into movement phases
// ABOUTME: Buffers each repetition window and gates completion on duration and frame count
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Repetition State Machine
//!
//! Phases advance one step per frame at most:
//!
//! ```text
//! STANDING -> DESCENDING -> BOTTOM -> ASCENDING -> STANDING
//!                  \______________________________/
//!                       abandoned descent
//! ```
//!
//! A window opens on the frame that leaves STANDING and closes on the frame
//! that returns to it. Only an ASCENDING -> STANDING return whose duration and
//! frame count pass the gates counts as a repetition; every other return
//! discards the window. Frames without a trustworthy primary angle are still
//! buffered but never move the phase.
//!
//! A window that outgrows `max_rep_duration` is dropped as soon as it does,
//! and the rest of that cycle is tracked without buffering until the lifter
//! is standing again. Frozen or stalled streams therefore hold at most one
//! maximum-length window in memory.

use formcoach_core::models::{BiomechanicalMetrics, MovementPhase};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ThresholdConfig;
use crate::window::{JointSelection, RepetitionWindow};

/// Why a buffered window was dropped instead of being scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DiscardReason {
    /// Small dip that never passed the descent threshold
    FalseStart {
        /// Frames buffered
        frames: usize,
    },
    /// Descent reversed to standing without reaching the bottom
    Abandoned {
        /// Frames buffered
        frames: usize,
        /// Deepest primary angle reached
        deepest_angle: f64,
    },
    /// Repetition finished faster than the minimum duration
    TooShort {
        /// Measured duration in seconds
        duration: f64,
        /// Minimum accepted duration
        min_duration: f64,
    },
    /// Repetition took longer than the maximum duration
    TooLong {
        /// Measured duration in seconds
        duration: f64,
        /// Maximum accepted duration
        max_duration: f64,
    },
    /// Window held fewer frames than required
    TooFewFrames {
        /// Frames buffered
        frames: usize,
        /// Minimum frame count
        min_frames: usize,
    },
    /// Session ended or was cancelled mid-repetition
    Cancelled {
        /// Frames buffered
        frames: usize,
    },
}

impl DiscardReason {
    /// Whether this discard is worth surfacing to collaborators
    ///
    /// False starts are ordinary standing jitter and stay internal.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        !matches!(self, Self::FalseStart { .. })
    }
}

/// Per-frame state reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepState {
    /// Phase after this frame
    pub phase: MovementPhase,
    /// Phase before this frame
    pub previous_phase: MovementPhase,
    /// Repetitions counted so far
    pub rep_count: u32,
    /// Whether this frame completed a counted repetition
    pub completed: bool,
    /// Primary angle used for the decision, if trustworthy
    pub primary_angle: Option<f64>,
}

impl RepState {
    /// Whether this frame changed the phase
    #[must_use]
    pub fn transitioned(&self) -> bool {
        self.phase != self.previous_phase
    }
}

/// Result of feeding one frame
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// State after the frame
    pub state: RepState,
    /// Completed repetition window, handed off for analysis
    pub window: Option<RepetitionWindow>,
    /// Window dropped on this frame
    pub discarded: Option<DiscardReason>,
}

/// Phase classifier and repetition counter for one stream
#[derive(Debug, Clone, Default)]
pub struct RepetitionStateMachine {
    selection: JointSelection,
    phase: MovementPhase,
    rep_count: u32,
    window: Option<RepetitionWindow>,
    deepest_angle: Option<f64>,
    overrun: bool,
}

impl RepetitionStateMachine {
    /// State machine using the knee angle with hip fallback
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State machine with a custom joint selection
    #[must_use]
    pub fn with_selection(selection: JointSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> MovementPhase {
        self.phase
    }

    /// Repetitions counted
    #[must_use]
    pub const fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Whether a repetition is in progress, buffered or overrun
    #[must_use]
    pub const fn in_repetition(&self) -> bool {
        self.window.is_some() || self.overrun
    }

    /// Frames held in the open window
    #[must_use]
    pub fn buffered_frames(&self) -> usize {
        self.window.as_ref().map_or(0, RepetitionWindow::len)
    }

    /// Feed one frame
    pub fn step(&mut self, frame: BiomechanicalMetrics, config: &ThresholdConfig) -> StepOutcome {
        let previous = self.phase;
        let primary_angle = self.selection.angle(&frame, config.min_landmark_visibility);
        let next = primary_angle.map_or(previous, |angle| Self::next_phase(previous, angle, config));
        debug_assert!(previous.can_transition_to(next));

        if let Some(angle) = primary_angle {
            if previous != MovementPhase::Standing || next != MovementPhase::Standing {
                self.deepest_angle = Some(self.deepest_angle.map_or(angle, |d| d.min(angle)));
            }
        }

        match (previous, next) {
            (MovementPhase::Standing, MovementPhase::Standing) => {}
            (MovementPhase::Standing, _) => {
                self.window = Some(RepetitionWindow::start(frame, next));
            }
            _ if self.overrun => {}
            _ => match &mut self.window {
                Some(window) => window.push(frame, next),
                None => self.window = Some(RepetitionWindow::start(frame, next)),
            },
        }

        if next != previous {
            debug!(
                from = %previous,
                to = %next,
                angle = primary_angle.unwrap_or_default(),
                "phase transition"
            );
        }

        self.phase = next;
        let mut outcome = StepOutcome {
            state: RepState {
                phase: next,
                previous_phase: previous,
                rep_count: self.rep_count,
                completed: false,
                primary_angle,
            },
            window: None,
            discarded: None,
        };

        match (previous, next) {
            (_, MovementPhase::Standing) if self.overrun => {
                self.overrun = false;
                self.deepest_angle = None;
                debug!("overrun repetition ended");
            }
            (MovementPhase::Descending, MovementPhase::Standing) => {
                outcome.discarded = Some(self.abandon(config));
            }
            (MovementPhase::Ascending, MovementPhase::Standing) => {
                match self.close(config) {
                    Ok(window) => {
                        outcome.state.completed = true;
                        outcome.state.rep_count = self.rep_count;
                        outcome.window = Some(window);
                    }
                    Err(reason) => outcome.discarded = Some(reason),
                }
            }
            (_, MovementPhase::Standing) => {}
            _ => outcome.discarded = self.check_overrun(config),
        }

        outcome
    }

    /// Drop the open window once it is longer than any countable repetition
    fn check_overrun(&mut self, config: &ThresholdConfig) -> Option<DiscardReason> {
        let max_frames = (config.max_rep_duration * config.frame_rate).ceil() as usize;
        if self.buffered_frames() <= max_frames {
            return None;
        }
        let frames = self.window.take().map_or(0, |w| w.len());
        self.overrun = true;
        let duration = config.frames_to_seconds(frames);
        warn!(frames, duration, "repetition exceeded maximum duration; buffering stopped");
        Some(DiscardReason::TooLong {
            duration,
            max_duration: config.max_rep_duration,
        })
    }

    fn next_phase(phase: MovementPhase, angle: f64, config: &ThresholdConfig) -> MovementPhase {
        match phase {
            MovementPhase::Standing if angle < config.phase_standing_threshold => {
                MovementPhase::Descending
            }
            // Bottom detection wins over the abandonment check
            MovementPhase::Descending if angle < config.phase_bottom_threshold => {
                MovementPhase::Bottom
            }
            MovementPhase::Descending | MovementPhase::Ascending
                if angle > config.phase_standing_threshold =>
            {
                MovementPhase::Standing
            }
            MovementPhase::Bottom if angle > config.phase_ascent_threshold => {
                MovementPhase::Ascending
            }
            unchanged => unchanged,
        }
    }

    fn abandon(&mut self, config: &ThresholdConfig) -> DiscardReason {
        let frames = self.window.take().map_or(0, |w| w.len());
        let deepest = self.deepest_angle.take().unwrap_or(config.phase_standing_threshold);
        if deepest >= config.phase_descent_threshold {
            debug!(frames, deepest_angle = deepest, "false start ignored");
            DiscardReason::FalseStart { frames }
        } else {
            info!(frames, deepest_angle = deepest, "abandoned repetition discarded");
            DiscardReason::Abandoned {
                frames,
                deepest_angle: deepest,
            }
        }
    }

    fn close(&mut self, config: &ThresholdConfig) -> Result<RepetitionWindow, DiscardReason> {
        self.deepest_angle = None;
        let window = self.window.take().unwrap_or_default();
        let frames = window.len();
        let duration = config.frames_to_seconds(frames);
        let min_frames = config.min_rep_frames.round() as usize;

        let rejection = if frames < min_frames {
            Some(DiscardReason::TooFewFrames { frames, min_frames })
        } else if duration < config.min_rep_duration {
            Some(DiscardReason::TooShort {
                duration,
                min_duration: config.min_rep_duration,
            })
        } else if duration > config.max_rep_duration {
            Some(DiscardReason::TooLong {
                duration,
                max_duration: config.max_rep_duration,
            })
        } else {
            None
        };

        if let Some(reason) = rejection {
            info!(frames, duration, reason = ?reason, "repetition outside quality gates discarded");
            return Err(reason);
        }

        self.rep_count += 1;
        info!(rep = self.rep_count, frames, duration, "repetition completed");
        Ok(window)
    }

    /// Drop any in-flight repetition and return to STANDING
    pub fn cancel(&mut self) -> Option<DiscardReason> {
        self.phase = MovementPhase::Standing;
        self.deepest_angle = None;
        self.overrun = false;
        let window = self.window.take()?;
        info!(frames = window.len(), "in-flight repetition cancelled");
        Some(DiscardReason::Cancelled {
            frames: window.len(),
        })
    }

    /// Forget everything, including the rep count
    pub fn reset(&mut self) {
        *self = Self::with_selection(self.selection);
    }
}

#[cfg(test)]
mod tests {
    use formcoach_core::models::JointAngles;

    use super::*;

    fn frame(i: usize, knee: f64) -> BiomechanicalMetrics {
        BiomechanicalMetrics::new(
            i as f64 / 30.0,
            JointAngles {
                knee_left: Some(knee),
                knee_right: Some(knee),
                back: Some(175.0),
                ..JointAngles::default()
            },
        )
    }

    #[test]
    fn test_one_step_per_frame() {
        let config = ThresholdConfig::default();
        let mut machine = RepetitionStateMachine::new();
        let outcome = machine.step(frame(0, 60.0), &config);
        assert_eq!(outcome.state.phase, MovementPhase::Descending);
        let outcome = machine.step(frame(1, 60.0), &config);
        assert_eq!(outcome.state.phase, MovementPhase::Bottom);
        let outcome = machine.step(frame(2, 175.0), &config);
        assert_eq!(outcome.state.phase, MovementPhase::Ascending);
    }

    #[test]
    fn test_missing_angle_holds_phase() {
        let config = ThresholdConfig::default();
        let mut machine = RepetitionStateMachine::new();
        machine.step(frame(0, 140.0), &config);
        let blind = BiomechanicalMetrics::new(0.1, JointAngles::default());
        let outcome = machine.step(blind, &config);
        assert_eq!(outcome.state.phase, MovementPhase::Descending);
        assert!(outcome.state.primary_angle.is_none());
        assert!(machine.in_repetition());
    }

    #[test]
    fn test_cancel_discards_window() {
        let config = ThresholdConfig::default();
        let mut machine = RepetitionStateMachine::new();
        machine.step(frame(0, 140.0), &config);
        assert!(matches!(machine.cancel(), Some(DiscardReason::Cancelled { frames: 1 })));
        assert_eq!(machine.phase(), MovementPhase::Standing);
        assert_eq!(machine.cancel(), None);
    }

    #[test]
    fn test_stalled_bottom_stops_buffering() {
        let config = ThresholdConfig::default();
        let max_frames = (config.max_rep_duration * config.frame_rate).ceil() as usize;
        let mut machine = RepetitionStateMachine::new();
        let mut overruns = 0;
        for i in 0..max_frames * 4 {
            let outcome = machine.step(frame(i, 70.0), &config);
            if matches!(outcome.discarded, Some(DiscardReason::TooLong { .. })) {
                overruns += 1;
            }
            assert!(machine.buffered_frames() <= max_frames);
        }
        assert_eq!(overruns, 1);
        assert_eq!(machine.phase(), MovementPhase::Bottom);
        assert!(machine.in_repetition());
    }
}
