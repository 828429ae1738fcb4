// ABOUTME: Coaching session service driving the state machine, grader, and fatigue monitor per frame
// ABOUTME: Captures a config snapshot per repetition and supports cooperative cancellation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Coaching Session
//!
//! One [`CoachSession`] serves one person in one stream. Frames are processed
//! synchronously on the caller's thread; events are handed off through a
//! bounded channel that never blocks the frame path.
//!
//! Configuration changes publish a new version to the shared
//! [`ConfigStore`]. A repetition is always graded with the version that was
//! current when its window opened, so a change made mid-repetition applies
//! from the next repetition boundary.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use formcoach_core::errors::{AppError, AppResult, ConfigError};
use formcoach_core::models::{
    BiomechanicalMetrics, DifficultyLevel, FaultType, InputIssue, MovementPhase, PoseLandmarks,
    UserProfile,
};
use formcoach_intelligence::analyzers::safety::assess_back_angle;
use formcoach_intelligence::config::{ActiveConfig, ConfigStore};
use formcoach_intelligence::extractor::AngleExtractor;
use formcoach_intelligence::fatigue::{FatigueAssessment, FatigueMonitor, RepMetrics};
use formcoach_intelligence::smoothing::OneEuroConfig;
use formcoach_intelligence::{DiscardReason, FormGrader, RepetitionResult, RepetitionStateMachine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CoachConfig;
use crate::events::{CoachEvent, EventPublisher};

/// One input frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameInput {
    /// Raw pose landmarks; angles are extracted and smoothed
    Landmarks {
        /// Capture time in seconds
        timestamp: f64,
        /// Detected landmarks
        landmarks: PoseLandmarks,
    },
    /// Precomputed metrics
    Metrics(BiomechanicalMetrics),
}

/// Identity of a started session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// Session id
    pub session_id: Uuid,
    /// Start time
    pub started_at: DateTime<Utc>,
}

/// What one frame produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    /// Phase after this frame
    pub phase: MovementPhase,
    /// Repetitions counted so far
    pub rep_count: u32,
    /// This frame completed a repetition
    pub completed: bool,
    /// Instantaneous posture score from the current back angle
    pub live_score_estimate: Option<f64>,
    /// Primary angle used for phase detection
    pub primary_angle: Option<f64>,
    /// Graded repetition completed on this frame
    pub repetition: Option<RepetitionResult>,
    /// Repetition candidate discarded on this frame
    pub discarded: Option<DiscardReason>,
    /// Input-contract corrections applied to this frame
    pub input_issues: Vec<InputIssue>,
    /// The session ended on this frame (cancellation)
    pub session_ended: bool,
}

/// Cloneable, thread-safe cancellation flag for a session
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request cancellation; honored on the next processed frame
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Aggregate of a finished session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Session id
    pub session_id: Uuid,
    /// Difficulty level at the end of the session
    pub level: DifficultyLevel,
    /// Start time
    pub started_at: DateTime<Utc>,
    /// End time
    pub ended_at: DateTime<Utc>,
    /// Frames processed
    pub frames_processed: u64,
    /// Frames that needed input corrections
    pub frames_with_input_issues: u64,
    /// Graded repetitions
    pub reps_completed: u32,
    /// Reportable discarded candidates (false starts excluded)
    pub reps_discarded: u32,
    /// Mean composite score
    pub average_score: Option<f64>,
    /// Highest composite score
    pub best_score: Option<f64>,
    /// Lowest composite score
    pub worst_score: Option<f64>,
    /// How many repetitions reported each fault
    pub fault_frequency: BTreeMap<FaultType, u32>,
    /// Fatigue after the last repetition
    pub fatigue: FatigueAssessment,
    /// Ended through cancellation
    pub cancelled: bool,
    /// Events dropped because the queue was full
    pub dropped_events: u64,
    /// Every graded repetition in order
    pub results: Vec<RepetitionResult>,
}

#[derive(Debug)]
struct ActiveSession {
    info: SessionInfo,
    frames_processed: u64,
    frames_with_input_issues: u64,
    reps_discarded: u32,
    results: Vec<RepetitionResult>,
    rep_config: Arc<ActiveConfig>,
}

/// Single-user squat coaching session
#[derive(Debug)]
pub struct CoachSession {
    grader: FormGrader,
    events: EventPublisher,
    machine: RepetitionStateMachine,
    extractor: AngleExtractor,
    fatigue: FatigueMonitor,
    cancel: CancelHandle,
    active: Option<ActiveSession>,
    finished: Option<SessionSummary>,
}

impl CoachSession {
    /// Session over a shared grader
    #[must_use]
    pub fn new(grader: FormGrader, events: EventPublisher) -> Self {
        let min_visibility = grader.snapshot().base.min_landmark_visibility;
        Self {
            grader,
            events,
            machine: RepetitionStateMachine::new(),
            extractor: AngleExtractor::new(min_visibility).with_smoothing(OneEuroConfig::default()),
            fatigue: FatigueMonitor::new(),
            cancel: CancelHandle::default(),
            active: None,
            finished: None,
        }
    }

    /// Session built from service configuration
    ///
    /// # Errors
    ///
    /// Returns the validation error for invalid thresholds.
    pub fn from_config(config: &CoachConfig, events: EventPublisher) -> Result<Self, ConfigError> {
        let grader = FormGrader::with_config(config.difficulty, config.thresholds.clone())?
            .with_parallelism(config.parallel_analyzers);
        Ok(Self::new(grader, events))
    }

    /// Handle that cancels this session from any thread
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Shared config store
    #[must_use]
    pub fn config_store(&self) -> &Arc<ConfigStore> {
        self.grader.store()
    }

    /// Whether a session is running
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Events dropped so far
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.events.dropped_count()
    }

    /// Begin a session, resetting repetition, smoothing and fatigue state
    ///
    /// A session already running is ended first and its summary discarded.
    pub fn start_session(&mut self) -> SessionInfo {
        if let Some(previous) = self.active.as_ref() {
            warn!(session_id = %previous.info.session_id, "starting a new session over a running one");
            self.finish(false);
        }
        self.finished = None;
        self.cancel.clear();
        self.machine.reset();
        self.extractor.reset();
        self.fatigue.reset();

        let rep_config = self.grader.snapshot();
        let info = SessionInfo {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
        };
        info!(
            session_id = %info.session_id,
            level = %rep_config.level(),
            config.version = rep_config.version,
            "coaching session started"
        );
        self.events.publish(CoachEvent::SessionStarted {
            session_id: info.session_id,
            level: rep_config.level(),
            started_at: info.started_at,
        });
        self.active = Some(ActiveSession {
            info,
            frames_processed: 0,
            frames_with_input_issues: 0,
            reps_discarded: 0,
            results: Vec::new(),
            rep_config,
        });
        info
    }

    /// Process one frame
    ///
    /// # Errors
    ///
    /// Returns `SessionNotActive` when no session is running. Bad input never
    /// fails: invalid fields are sanitized and reported in `input_issues`.
    pub fn process_frame(&mut self, input: FrameInput) -> AppResult<FrameResult> {
        if self.active.is_none() {
            return Err(AppError::session_not_active());
        }

        if self.cancel.is_cancelled() {
            let discarded = self.machine.cancel();
            self.finish(true);
            return Ok(FrameResult {
                phase: MovementPhase::Standing,
                rep_count: self.machine.rep_count(),
                completed: false,
                live_score_estimate: None,
                primary_angle: None,
                repetition: None,
                discarded,
                input_issues: Vec::new(),
                session_ended: true,
            });
        }

        let Some(active) = self.active.as_mut() else {
            return Err(AppError::session_not_active());
        };
        if !self.machine.in_repetition() {
            active.rep_config = self.grader.snapshot();
        }
        let config = Arc::clone(&active.rep_config);
        let session_id = active.info.session_id;

        self.extractor
            .set_min_visibility(config.effective.min_landmark_visibility);
        let frame = match input {
            FrameInput::Landmarks { timestamp, landmarks } => self.extractor.extract(timestamp, landmarks),
            FrameInput::Metrics(metrics) => metrics,
        };
        let (frame, input_issues) = frame.sanitized();
        if !input_issues.is_empty() {
            debug!(issues = ?input_issues, "frame sanitized");
        }

        active.frames_processed += 1;
        if !input_issues.is_empty() {
            active.frames_with_input_issues += 1;
        }

        let live_score_estimate = frame
            .angles
            .back
            .map(|back| assess_back_angle(back, &config.effective).score());
        let timestamp = frame.timestamp;
        let outcome = self.machine.step(frame, &config.effective);

        if outcome.state.transitioned() {
            self.events.publish(CoachEvent::PhaseChanged {
                session_id,
                from: outcome.state.previous_phase,
                to: outcome.state.phase,
                rep_count: outcome.state.rep_count,
                timestamp,
            });
        }

        let repetition = outcome.window.as_ref().map(|window| {
            let result = self.grader.grade(window, &config, outcome.state.rep_count);
            let fatigue = self.fatigue.record(RepMetrics::from_result(&result));
            if fatigue.score > 0.0 {
                debug!(fatigue = fatigue.score, level = ?fatigue.level, "fatigue updated");
            }
            result
        });

        if let Some(result) = &repetition {
            active.results.push(result.clone());
            self.events.publish(CoachEvent::RepetitionCompleted {
                session_id,
                result: Box::new(result.clone()),
            });
        }
        if let Some(reason) = outcome.discarded.as_ref().filter(|r| r.is_reportable()) {
            active.reps_discarded += 1;
            self.events.publish(CoachEvent::RepetitionDiscarded {
                session_id,
                reason: reason.clone(),
            });
        }

        Ok(FrameResult {
            phase: outcome.state.phase,
            rep_count: outcome.state.rep_count,
            completed: outcome.state.completed,
            live_score_estimate,
            primary_angle: outcome.state.primary_angle,
            repetition,
            discarded: outcome.discarded,
            input_issues,
            session_ended: false,
        })
    }

    /// End the session, discarding any in-flight repetition
    ///
    /// After a cancellation ended the session, returns that summary once.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotActive` when there is nothing to end.
    pub fn end_session(&mut self) -> AppResult<SessionSummary> {
        if self.active.is_some() {
            self.machine.cancel();
            self.finish(false);
        }
        self.finished.take().ok_or_else(AppError::session_not_active)
    }

    /// Switch difficulty; applies from the next repetition
    ///
    /// # Errors
    ///
    /// Returns the validation error; the previous configuration stays active.
    pub fn set_difficulty(&self, level: DifficultyLevel) -> Result<Arc<ActiveConfig>, ConfigError> {
        let outcome = self.grader.set_difficulty(level);
        self.report_config_change(&outcome);
        outcome
    }

    /// Apply a user profile; applies from the next repetition
    ///
    /// # Errors
    ///
    /// Returns the validation error; the previous configuration stays active.
    pub fn set_user_profile(&self, profile: &UserProfile) -> Result<Arc<ActiveConfig>, ConfigError> {
        let outcome = self.grader.set_user_profile(profile);
        self.report_config_change(&outcome);
        outcome
    }

    fn report_config_change(&self, outcome: &Result<Arc<ActiveConfig>, ConfigError>) {
        let Err(err) = outcome else {
            return;
        };
        if let Some(active) = &self.active {
            self.events.publish(CoachEvent::ConfigRejected {
                session_id: active.info.session_id,
                reason: err.to_string(),
            });
        }
    }

    fn finish(&mut self, cancelled: bool) {
        let Some(active) = self.active.take() else {
            return;
        };
        let scores: Vec<f64> = active.results.iter().map(|r| r.score).collect();
        let mut fault_frequency: BTreeMap<FaultType, u32> = BTreeMap::new();
        for result in &active.results {
            for fault in &result.faults {
                *fault_frequency.entry(fault.fault_type).or_default() += 1;
            }
        }

        let summary = SessionSummary {
            session_id: active.info.session_id,
            level: self.grader.snapshot().level(),
            started_at: active.info.started_at,
            ended_at: Utc::now(),
            frames_processed: active.frames_processed,
            frames_with_input_issues: active.frames_with_input_issues,
            reps_completed: active.results.len() as u32,
            reps_discarded: active.reps_discarded,
            average_score: formcoach_intelligence::statistics::mean(&scores),
            best_score: formcoach_intelligence::statistics::max(&scores),
            worst_score: formcoach_intelligence::statistics::min(&scores),
            fault_frequency,
            fatigue: self.fatigue.latest().clone(),
            cancelled,
            dropped_events: self.events.dropped_count(),
            results: active.results,
        };

        info!(
            session_id = %summary.session_id,
            reps = summary.reps_completed,
            discarded = summary.reps_discarded,
            average_score = ?summary.average_score,
            cancelled,
            "coaching session ended"
        );
        self.events.publish(CoachEvent::SessionEnded {
            session_id: summary.session_id,
            reps_completed: summary.reps_completed,
            average_score: summary.average_score,
            cancelled,
        });
        self.finished = Some(summary);
    }
}
