// ABOUTME: Coaching cues and overall assessment text derived from a graded repetition
// ABOUTME: Limits cues to the most important faults so feedback stays actionable
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use formcoach_core::constants::processing::MAX_RECOMMENDATIONS;
use formcoach_core::models::Fault;
use serde::{Deserialize, Serialize};

/// Cue given when a repetition has no reported faults
pub const CLEAN_REP_CUE: &str = "Great rep! Keep the same control on the next one";

/// Score band for the overall assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    /// Below 60
    Poor,
    /// 60 to 70
    NeedsWork,
    /// 70 to 80
    Fair,
    /// 80 to 90
    Good,
    /// 90 and above
    Excellent,
}

impl Assessment {
    /// Band for a clamped composite score
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excellent
        } else if score >= 80.0 {
            Self::Good
        } else if score >= 70.0 {
            Self::Fair
        } else if score >= 60.0 {
            Self::NeedsWork
        } else {
            Self::Poor
        }
    }

    /// One-line summary shown with the score
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent form",
            Self::Good => "Good form with minor issues",
            Self::Fair => "Fair form; focus on the cues below",
            Self::NeedsWork => "Form needs work",
            Self::Poor => "Poor form; reduce load and rebuild the pattern",
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Coaching cues for already-ordered faults, at most `MAX_RECOMMENDATIONS`
#[must_use]
pub fn coaching_cues(faults: &[Fault]) -> Vec<String> {
    if faults.is_empty() {
        return vec![CLEAN_REP_CUE.to_owned()];
    }
    let mut cues: Vec<String> = Vec::with_capacity(MAX_RECOMMENDATIONS);
    for fault in faults {
        let cue = fault.fault_type.coaching_cue();
        if !cues.iter().any(|c| c == cue) {
            cues.push(cue.to_owned());
        }
        if cues.len() == MAX_RECOMMENDATIONS {
            break;
        }
    }
    cues
}

#[cfg(test)]
mod tests {
    use formcoach_core::models::FaultType;

    use super::*;

    #[test]
    fn test_bands() {
        assert_eq!(Assessment::from_score(95.0), Assessment::Excellent);
        assert_eq!(Assessment::from_score(80.0), Assessment::Good);
        assert_eq!(Assessment::from_score(59.9), Assessment::Poor);
    }

    #[test]
    fn test_cues_capped_at_three() {
        let faults: Vec<Fault> = [
            FaultType::BackRounding,
            FaultType::InsufficientDepth,
            FaultType::TooFast,
            FaultType::HeelLift,
        ]
        .into_iter()
        .map(|t| Fault::new(t, 0.0, 0.0, ""))
        .collect();
        assert_eq!(coaching_cues(&faults).len(), 3);
        assert_eq!(coaching_cues(&[]), vec![CLEAN_REP_CUE.to_owned()]);
    }
}
