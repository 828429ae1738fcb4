// ABOUTME: Fault hierarchy that removes faults explained by a more fundamental one
// ABOUTME: Deduplicates by fault type and orders the report safety-first, most severe first
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Fault Hierarchy
//!
//! Some faults are downstream symptoms of another: a severely rounded back
//! drags the head forward and shifts the center of mass. Reporting both
//! buries the cue that matters. Suppression only affects the reported list;
//! analyzer scores are untouched and the unfiltered list is kept alongside.
//! Depth faults are never suppressed.

use formcoach_core::models::{Fault, FaultCategory, FaultType};
use serde::Serialize;

/// A dominant fault and the symptoms it hides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuppressionRule {
    /// Fault that, when present, hides the others
    pub dominant: FaultType,
    /// Faults hidden while `dominant` is present
    pub suppressed: &'static [FaultType],
}

/// Fixed suppression rules
pub const FAULT_HIERARCHY: &[SuppressionRule] = &[
    SuppressionRule {
        dominant: FaultType::SevereBackRounding,
        suppressed: &[FaultType::HeadForward, FaultType::PoorStability],
    },
    SuppressionRule {
        dominant: FaultType::SevereInstability,
        suppressed: &[FaultType::HeelLift],
    },
    SuppressionRule {
        dominant: FaultType::BadShallowDepth,
        suppressed: &[FaultType::TooFast],
    },
];

/// Whether `fault_type` is hidden by some fault in `present`
#[must_use]
pub fn is_suppressed(fault_type: FaultType, present: &[FaultType]) -> bool {
    if fault_type.category() == FaultCategory::Depth {
        return false;
    }
    FAULT_HIERARCHY.iter().any(|rule| {
        rule.suppressed.contains(&fault_type) && present.contains(&rule.dominant)
    })
}

/// Deduplicate, apply the hierarchy and sort for reporting
#[must_use]
pub fn filter_faults(raw: &[Fault]) -> Vec<Fault> {
    let mut unique: Vec<Fault> = Vec::with_capacity(raw.len());
    for fault in raw {
        match unique.iter_mut().find(|f| f.fault_type == fault.fault_type) {
            Some(existing) if fault.severity > existing.severity => *existing = fault.clone(),
            Some(_) => {}
            None => unique.push(fault.clone()),
        }
    }

    let present: Vec<FaultType> = unique.iter().map(|f| f.fault_type).collect();
    let mut reported: Vec<Fault> = unique
        .into_iter()
        .filter(|f| !is_suppressed(f.fault_type, &present))
        .collect();
    reported.sort_by(Fault::report_order);
    reported
}

#[cfg(test)]
mod tests {
    use formcoach_core::models::FaultSeverity;

    use super::*;

    fn fault(fault_type: FaultType) -> Fault {
        Fault::new(fault_type, 0.0, 0.0, "")
    }

    #[test]
    fn test_severe_rounding_hides_head_forward() {
        let raw = vec![
            fault(FaultType::HeadForward),
            fault(FaultType::SevereBackRounding),
            fault(FaultType::PartialRep),
        ];
        let reported: Vec<_> = filter_faults(&raw).iter().map(|f| f.fault_type).collect();
        assert_eq!(reported, vec![FaultType::SevereBackRounding, FaultType::PartialRep]);
    }

    #[test]
    fn test_duplicates_keep_most_severe() {
        let raw = vec![
            fault(FaultType::TooSlow),
            fault(FaultType::TooSlow).with_severity(FaultSeverity::Major),
        ];
        let reported = filter_faults(&raw);
        assert_eq!(reported.len(), 1);
        assert_eq!(reported[0].severity, FaultSeverity::Major);
    }
}
