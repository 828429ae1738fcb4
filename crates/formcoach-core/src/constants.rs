// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Angle limits, processing defaults, and environment keys for FormCoach
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! large namespace. Tunable analysis thresholds do not live here; they belong
//! to the threshold catalog in `formcoach-intelligence`.

/// Joint angle geometry
pub mod angles {
    /// Smallest valid joint angle in degrees
    pub const MIN_JOINT_ANGLE: f64 = 0.0;
    /// Largest valid joint angle in degrees (fully extended / upright)
    pub const MAX_JOINT_ANGLE: f64 = 180.0;
    /// Back angle of a perfectly upright torso
    pub const UPRIGHT_BACK_ANGLE: f64 = 180.0;
}

/// Landmark confidence limits
pub mod visibility {
    /// Lowest visibility value a landmark may carry
    pub const MIN_VISIBILITY: f64 = 0.0;
    /// Highest visibility value a landmark may carry
    pub const MAX_VISIBILITY: f64 = 1.0;
    /// Default minimum visibility before a landmark is trusted
    pub const DEFAULT_MIN_LANDMARK_VISIBILITY: f64 = 0.5;
}

/// Stream processing defaults
pub mod processing {
    /// Default camera frame rate in frames per second
    pub const DEFAULT_FRAME_RATE: f64 = 30.0;
    /// Default capacity of the collaborator event queue
    pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;
    /// Number of completed reps used to establish a fatigue baseline
    pub const FATIGUE_BASELINE_REPS: usize = 3;
    /// Maximum number of coaching cues attached to one repetition
    pub const MAX_RECOMMENDATIONS: usize = 3;
}

/// Score scale limits
pub mod scores {
    /// Baseline every analyzer starts from
    pub const BASELINE_SCORE: f64 = 100.0;
    /// Lowest reportable score
    pub const MIN_SCORE: f64 = 0.0;
    /// Highest reportable score after clamping
    pub const MAX_SCORE: f64 = 100.0;
    /// Tolerance used when checking that weights sum to one
    pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
}

/// Environment variable names read by the service layer
pub mod env_config {
    /// Prefix for per-threshold overrides (`FORMCOACH_<KEY>`)
    pub const THRESHOLD_PREFIX: &str = "FORMCOACH_";
    /// Difficulty level applied at startup
    pub const DIFFICULTY: &str = "FORMCOACH_DIFFICULTY";
    /// Capacity of the bounded event queue
    pub const EVENT_QUEUE_CAPACITY: &str = "FORMCOACH_EVENT_QUEUE_CAPACITY";
    /// Path to a JSON file with threshold overrides
    pub const THRESHOLDS_FILE: &str = "FORMCOACH_THRESHOLDS_FILE";
    /// Toggle for running analyzers on the rayon pool
    pub const PARALLEL_ANALYZERS: &str = "FORMCOACH_PARALLEL_ANALYZERS";
}
