// ABOUTME: Thresholds command printing the parameter catalog with effective values
// ABOUTME: Shows how the selected difficulty level scales each threshold
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use formcoach::config::CoachConfig;
use formcoach_intelligence::config::{ActiveConfig, THRESHOLD_CATALOG};
use formcoach_intelligence::AnalyzerKind;

/// Print every parameter with base and effective values
pub fn run(config: &CoachConfig) -> Result<()> {
    let active = ActiveConfig::build(1, config.difficulty, config.thresholds.clone())?;
    println!(
        "Difficulty: {} (multiplier {:.2})",
        active.level(),
        active.profile.threshold_multiplier
    );
    println!("{}", "=".repeat(96));
    println!(
        "{:<36} {:>10} {:>10} {:>16} {:<12} {}",
        "parameter", "base", "effective", "range", "units", "group"
    );

    for param in THRESHOLD_CATALOG {
        let base = active.base.get(param.key).unwrap_or(param.default_value);
        let effective = active.effective.get(param.key).unwrap_or(base);
        let range = format!("[{}, {}]", param.min, param.max);
        println!(
            "{:<36} {:>10.3} {:>10.3} {:>16} {:<12} {:?}{}",
            param.key,
            base,
            effective,
            range,
            param.units,
            param.group,
            if param.safety_critical { " (safety floor)" } else { "" }
        );
    }

    println!("\nWeights:");
    let weights = active.profile.weights;
    for kind in AnalyzerKind::ALL {
        let weight = weights.get(kind);
        if weight > 0.0 {
            println!("   {:<16} {:.2}", kind.name(), weight);
        }
    }
    Ok(())
}
