// ABOUTME: Agreement metrics between machine grades and human expert ratings
// ABOUTME: MAE, RMSE, and Pearson correlation per component plus Cohen's kappa per fault type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::{BTreeMap, BTreeSet};

use formcoach_core::models::FaultType;
use serde::{Deserialize, Serialize};

use crate::statistics;

/// Error and correlation of one score component
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyMetrics {
    /// Mean absolute error in score points
    pub mae: f64,
    /// Root mean squared error in score points
    pub rmse: f64,
    /// Pearson correlation, 0 when undefined
    pub correlation: f64,
}

impl AccuracyMetrics {
    /// Compare machine `predicted` scores with human `actual` scores
    ///
    /// Empty or mismatched inputs produce all-zero metrics.
    #[must_use]
    pub fn compute(predicted: &[f64], actual: &[f64]) -> Self {
        Self {
            mae: statistics::mean_absolute_error(predicted, actual).unwrap_or(0.0),
            rmse: statistics::root_mean_squared_error(predicted, actual).unwrap_or(0.0),
            correlation: statistics::pearson_correlation(predicted, actual).unwrap_or(0.0),
        }
    }
}

/// Paired machine and human scores for one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComponentScores {
    /// Composite score
    pub overall: f64,
    /// Safety sub-score
    pub safety: f64,
    /// Depth sub-score
    pub depth: f64,
    /// Stability sub-score
    pub stability: f64,
}

/// Accuracy of a configuration over a sample set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccuracyReport {
    /// Composite score accuracy
    pub overall: AccuracyMetrics,
    /// Safety sub-score accuracy
    pub safety: AccuracyMetrics,
    /// Depth sub-score accuracy
    pub depth: AccuracyMetrics,
    /// Stability sub-score accuracy
    pub stability: AccuracyMetrics,
    /// Cohen's kappa per fault type flagged by either rater
    pub fault_agreement: BTreeMap<FaultType, f64>,
    /// Number of samples compared
    pub samples: usize,
}

impl AccuracyReport {
    /// Build a report from paired scores and per-sample fault sets
    #[must_use]
    pub fn build(
        machine: &[ComponentScores],
        human: &[ComponentScores],
        machine_faults: &[BTreeSet<FaultType>],
        human_faults: &[BTreeSet<FaultType>],
    ) -> Self {
        let observed: BTreeSet<FaultType> = machine_faults
            .iter()
            .chain(human_faults)
            .flatten()
            .copied()
            .collect();
        let fault_agreement = observed
            .into_iter()
            .map(|fault| {
                let m: Vec<bool> = machine_faults.iter().map(|set| set.contains(&fault)).collect();
                let h: Vec<bool> = human_faults.iter().map(|set| set.contains(&fault)).collect();
                (fault, cohen_kappa(&m, &h))
            })
            .collect();

        Self {
            overall: component_metrics(machine, human, |s| s.overall),
            safety: component_metrics(machine, human, |s| s.safety),
            depth: component_metrics(machine, human, |s| s.depth),
            stability: component_metrics(machine, human, |s| s.stability),
            fault_agreement,
            samples: machine.len().min(human.len()),
        }
    }
}

fn component_metrics(
    machine: &[ComponentScores],
    human: &[ComponentScores],
    pick: fn(&ComponentScores) -> f64,
) -> AccuracyMetrics {
    let predicted: Vec<f64> = machine.iter().map(pick).collect();
    let actual: Vec<f64> = human.iter().map(pick).collect();
    AccuracyMetrics::compute(&predicted, &actual)
}

/// Cohen's kappa for two binary raters
///
/// Returns 1.0 when both raters are constant and agree (chance agreement is
/// total), and 0.0 for empty or mismatched input.
#[must_use]
pub fn cohen_kappa(a: &[bool], b: &[bool]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let n = a.len() as f64;
    let agree = a.iter().zip(b).filter(|(x, y)| x == y).count() as f64;
    let a_yes = a.iter().filter(|x| **x).count() as f64 / n;
    let b_yes = b.iter().filter(|x| **x).count() as f64 / n;

    let observed = agree / n;
    let chance = a_yes.mul_add(b_yes, (1.0 - a_yes) * (1.0 - b_yes));
    if (1.0 - chance).abs() < f64::EPSILON {
        return if (observed - 1.0).abs() < f64::EPSILON { 1.0 } else { 0.0 };
    }
    (observed - chance) / (1.0 - chance)
}
