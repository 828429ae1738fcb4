// ABOUTME: Main library entry point for the FormCoach squat coaching service
// ABOUTME: Wires the intelligence engine into a per-user session with events and configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FormCoach
//!
//! Real-time squat repetition tracking and biomechanical form grading.
//!
//! ## Architecture
//!
//! - **formcoach-core**: per-frame data model, fault taxonomy, errors
//! - **formcoach-intelligence**: state machine, nine analyzers, grader,
//!   fatigue monitor, calibration
//! - **session** (this crate): frame-by-frame service with cancellation
//! - **events** (this crate): bounded hand-off to feedback collaborators
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use formcoach::events::EventPublisher;
//! use formcoach::session::{CoachSession, FrameInput};
//! use formcoach::synthetic::{SquatGenerator, SquatProfile};
//! use formcoach_intelligence::FormGrader;
//! use formcoach_core::models::DifficultyLevel;
//! use formcoach_intelligence::config::ThresholdConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grader = FormGrader::with_config(DifficultyLevel::Casual, ThresholdConfig::default())?;
//! let mut session = CoachSession::new(grader, EventPublisher::disabled());
//! session.start_session();
//! for frame in SquatGenerator::new(SquatProfile::default(), 30.0, 1).session(3) {
//!     let result = session.process_frame(FrameInput::Metrics(frame))?;
//!     if let Some(rep) = result.repetition {
//!         println!("rep {}: {:.0}", rep.rep_number, rep.score);
//!     }
//! }
//! let summary = session.end_session()?;
//! println!("average {:?}", summary.average_score);
//! # Ok(())
//! # }
//! ```

/// Environment-based service configuration
pub mod config;

/// Coaching events and the bounded event channel
pub mod events;

/// Logging configuration and initialization
pub mod logging;

/// Per-user coaching session
pub mod session;

/// Synthetic squat streams for demos and tests
pub mod synthetic;

