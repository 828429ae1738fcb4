// ABOUTME: Fault taxonomy for squat form: types, categories, severities, coaching cues
// ABOUTME: Provides the ordering used to rank faults most-severe-first with safety leading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::cmp::{Ordering, Reverse};
use std::fmt;

use serde::{Deserialize, Serialize};

/// How serious a detected fault is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultSeverity {
    /// Cosmetic; worth mentioning
    Minor,
    /// Degrades the repetition
    Moderate,
    /// Substantially compromises the repetition
    Major,
    /// Injury risk; stop and reset
    Critical,
}

/// Biomechanical dimension a fault belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultCategory {
    /// Spinal and joint loading risks
    Safety,
    /// Range of motion
    Depth,
    /// Balance and base of support
    Stability,
    /// Repetition speed
    Tempo,
    /// Left/right balance
    Symmetry,
    /// Head and neck alignment
    Posture,
}

/// Named deviation from ideal squat form
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultType {
    /// Back angle fell below the severe rounding threshold
    SevereBackRounding,
    /// Back angle fell below the moderate rounding threshold
    BackRounding,
    /// Deepest knee angle stayed far above parallel
    BadShallowDepth,
    /// Deepest knee angle did not reach the depth target
    InsufficientDepth,
    /// Total range of motion below the partial-rep floor
    PartialRep,
    /// Center of mass sway well beyond tolerance
    SevereInstability,
    /// Center of mass sway beyond tolerance
    PoorStability,
    /// Repetition completed faster than the control threshold
    TooFast,
    /// Repetition took longer than the slow threshold
    TooSlow,
    /// Left and right knees moved through different angles
    AsymmetricMovement,
    /// Pelvis tucked under at the bottom (lumbar flexion)
    ButtWink,
    /// Knees collapsed inward relative to the ankles
    KneeValgus,
    /// Head drifted forward of the torso line
    HeadForward,
    /// Heels rose off the floor
    HeelLift,
}

impl FaultType {
    /// Category used for ranking and reporting
    #[must_use]
    pub const fn category(self) -> FaultCategory {
        match self {
            Self::SevereBackRounding | Self::BackRounding | Self::ButtWink | Self::KneeValgus => {
                FaultCategory::Safety
            }
            Self::BadShallowDepth | Self::InsufficientDepth | Self::PartialRep => {
                FaultCategory::Depth
            }
            Self::SevereInstability | Self::PoorStability | Self::HeelLift => {
                FaultCategory::Stability
            }
            Self::TooFast | Self::TooSlow => FaultCategory::Tempo,
            Self::AsymmetricMovement => FaultCategory::Symmetry,
            Self::HeadForward => FaultCategory::Posture,
        }
    }

    /// Severity assigned when an analyzer does not escalate it
    #[must_use]
    pub const fn default_severity(self) -> FaultSeverity {
        match self {
            Self::SevereBackRounding => FaultSeverity::Critical,
            Self::BackRounding | Self::BadShallowDepth | Self::SevereInstability | Self::KneeValgus => {
                FaultSeverity::Major
            }
            Self::InsufficientDepth
            | Self::PoorStability
            | Self::TooFast
            | Self::AsymmetricMovement
            | Self::ButtWink
            | Self::HeelLift => FaultSeverity::Moderate,
            Self::PartialRep | Self::TooSlow | Self::HeadForward => FaultSeverity::Minor,
        }
    }

    /// Short coaching cue shown to the lifter
    #[must_use]
    pub const fn coaching_cue(self) -> &'static str {
        match self {
            Self::SevereBackRounding => {
                "Stop and reset: keep your chest up and brace your core to protect your spine"
            }
            Self::BackRounding => "Keep your chest proud and your back neutral",
            Self::BadShallowDepth => "Sit much deeper; aim for thighs parallel to the floor",
            Self::InsufficientDepth => "Go a little deeper to reach parallel",
            Self::PartialRep => "Use the full range of motion on every rep",
            Self::SevereInstability => "Slow down and find your balance before the next rep",
            Self::PoorStability => "Keep your weight centered over mid-foot",
            Self::TooFast => "Control the descent; take about two seconds down",
            Self::TooSlow => "Keep a steady rhythm without pausing too long",
            Self::AsymmetricMovement => "Distribute your weight evenly between both legs",
            Self::ButtWink => "Stop just above the depth where your pelvis tucks under",
            Self::KneeValgus => "Push your knees out in line with your toes",
            Self::HeadForward => "Keep your gaze forward and your neck neutral",
            Self::HeelLift => "Keep your heels planted and drive through the whole foot",
        }
    }

    /// Stable uppercase label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SevereBackRounding => "SEVERE_BACK_ROUNDING",
            Self::BackRounding => "BACK_ROUNDING",
            Self::BadShallowDepth => "BAD_SHALLOW_DEPTH",
            Self::InsufficientDepth => "INSUFFICIENT_DEPTH",
            Self::PartialRep => "PARTIAL_REP",
            Self::SevereInstability => "SEVERE_INSTABILITY",
            Self::PoorStability => "POOR_STABILITY",
            Self::TooFast => "TOO_FAST",
            Self::TooSlow => "TOO_SLOW",
            Self::AsymmetricMovement => "ASYMMETRIC_MOVEMENT",
            Self::ButtWink => "BUTT_WINK",
            Self::KneeValgus => "KNEE_VALGUS",
            Self::HeadForward => "HEAD_FORWARD",
            Self::HeelLift => "HEEL_LIFT",
        }
    }
}

impl fmt::Display for FaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected fault with the measurement that triggered it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fault {
    /// Which fault
    pub fault_type: FaultType,
    /// How serious this occurrence is
    pub severity: FaultSeverity,
    /// Dimension the fault belongs to
    pub category: FaultCategory,
    /// Measured value that crossed the threshold
    pub measured: f64,
    /// Effective threshold that was crossed
    pub threshold: f64,
    /// Human-readable explanation
    pub message: String,
}

impl Fault {
    /// Fault with the type's default severity
    #[must_use]
    pub fn new(fault_type: FaultType, measured: f64, threshold: f64, message: impl Into<String>) -> Self {
        Self {
            fault_type,
            severity: fault_type.default_severity(),
            category: fault_type.category(),
            measured,
            threshold,
            message: message.into(),
        }
    }

    /// Override the severity
    #[must_use]
    pub const fn with_severity(mut self, severity: FaultSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// True for safety-category faults
    #[must_use]
    pub fn is_safety(&self) -> bool {
        self.category == FaultCategory::Safety
    }

    /// Report ordering: safety first, then most severe, then by type
    #[must_use]
    pub fn report_order(&self, other: &Self) -> Ordering {
        let key = |f: &Self| (!f.is_safety(), Reverse(f.severity), f.fault_type);
        key(self).cmp(&key(other))
    }
}
