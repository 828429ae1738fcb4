// ABOUTME: Movement phase enumeration for the squat repetition cycle
// ABOUTME: Encodes the legal phase order so transitions are checked exhaustively
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where in a repetition the body currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementPhase {
    /// Upright between repetitions
    #[default]
    Standing,
    /// Lowering toward the bottom
    Descending,
    /// At or near maximum depth
    Bottom,
    /// Rising back toward standing
    Ascending,
}

impl MovementPhase {
    /// Next phase in the forward cycle
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Standing => Self::Descending,
            Self::Descending => Self::Bottom,
            Self::Bottom => Self::Ascending,
            Self::Ascending => Self::Standing,
        }
    }

    /// Whether moving from `self` to `to` is a legal single-frame transition
    ///
    /// Staying put and advancing one step are always legal. The only other
    /// edge is `Descending -> Standing`, used when a descent is abandoned.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Standing, Self::Standing | Self::Descending)
                | (Self::Descending, Self::Descending | Self::Bottom | Self::Standing)
                | (Self::Bottom, Self::Bottom | Self::Ascending)
                | (Self::Ascending, Self::Ascending | Self::Standing)
        )
    }

    /// Stable label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standing => "STANDING",
            Self::Descending => "DESCENDING",
            Self::Bottom => "BOTTOM",
            Self::Ascending => "ASCENDING",
        }
    }
}

impl fmt::Display for MovementPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_cannot_return_to_descending() {
        assert!(!MovementPhase::Bottom.can_transition_to(MovementPhase::Descending));
        assert!(!MovementPhase::Bottom.can_transition_to(MovementPhase::Standing));
        assert!(MovementPhase::Descending.can_transition_to(MovementPhase::Standing));
    }

    #[test]
    fn test_next_cycles() {
        let mut phase = MovementPhase::Standing;
        for _ in 0..4 {
            assert!(phase.can_transition_to(phase.next()));
            phase = phase.next();
        }
        assert_eq!(phase, MovementPhase::Standing);
    }
}
