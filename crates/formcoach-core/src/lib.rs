// ABOUTME: Core types and constants for the FormCoach squat analysis engine
// ABOUTME: Foundation crate with the per-frame data model, fault taxonomy, and error handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # FormCoach Core
//!
//! Foundation crate providing shared types and constants for the FormCoach
//! repetition tracker and form grader. This crate is designed to change
//! infrequently, enabling incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError`, `ErrorCode`, and `ConfigError`
//! - **constants**: Angle limits, landmark indices, and processing defaults
//! - **models**: Per-frame metrics, pose landmarks, movement phases, skill levels, and faults

/// Unified error handling system with standard error codes
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (metrics, landmarks, phases, difficulty, faults)
pub mod models;
