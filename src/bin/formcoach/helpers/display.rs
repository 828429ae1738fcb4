// ABOUTME: Output formatting helpers for the formcoach CLI
// ABOUTME: Human-readable and JSON renderings of repetitions, summaries, and calibration runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use anyhow::Result;
use formcoach::session::SessionSummary;
use formcoach_intelligence::calibration::{AccuracyReport, CalibrationResult};
use formcoach_intelligence::RepetitionResult;

/// Print one graded repetition
pub fn print_repetition(result: &RepetitionResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }

    println!(
        "Rep {:>2}: {:>5.1}/100  {:.1}s  confidence {:.0}{}  {}",
        result.rep_number,
        result.score,
        result.duration_seconds,
        result.confidence,
        if result.low_confidence { " (low)" } else { "" },
        result.assessment
    );
    for fault in &result.faults {
        println!("    - [{:?}] {}: {}", fault.severity, fault.fault_type, fault.message);
    }
    for cue in &result.recommendations {
        println!("    > {cue}");
    }
    Ok(())
}

/// Print the end-of-session summary
pub fn print_summary(summary: &SessionSummary, json: bool) -> Result<()> {
    if json {
        let mut compact = summary.clone();
        compact.results.clear();
        println!("{}", serde_json::to_string(&compact)?);
        return Ok(());
    }

    println!("\n{}", "=".repeat(60));
    println!("Session {} ({})", summary.session_id, summary.level);
    println!("{}", "=".repeat(60));
    println!("   Frames processed:  {}", summary.frames_processed);
    println!("   Reps completed:    {}", summary.reps_completed);
    println!("   Reps discarded:    {}", summary.reps_discarded);
    if let (Some(avg), Some(best), Some(worst)) =
        (summary.average_score, summary.best_score, summary.worst_score)
    {
        println!("   Average score:     {avg:.1}");
        println!("   Best / worst:      {best:.1} / {worst:.1}");
    }
    println!(
        "   Fatigue:           {:?} ({:.0})",
        summary.fatigue.level, summary.fatigue.score
    );
    if !summary.fault_frequency.is_empty() {
        println!("   Most common faults:");
        let mut faults: Vec<_> = summary.fault_frequency.iter().collect();
        faults.sort_by(|a, b| b.1.cmp(a.1));
        for (fault, count) in faults {
            println!("     {fault}: {count}");
        }
    }
    if summary.cancelled {
        println!("   Session was cancelled");
    }
    if summary.dropped_events > 0 {
        println!("   Dropped events:    {}", summary.dropped_events);
    }
    Ok(())
}

fn print_accuracy(label: &str, report: &AccuracyReport) {
    println!("   {label}:");
    for (name, metrics) in [
        ("overall", report.overall),
        ("safety", report.safety),
        ("depth", report.depth),
        ("stability", report.stability),
    ] {
        println!(
            "     {name:<10} MAE {:>6.2}  RMSE {:>6.2}  r {:>5.2}",
            metrics.mae, metrics.rmse, metrics.correlation
        );
    }
}

/// Print a calibration run
pub fn print_calibration(result: &CalibrationResult) {
    println!("\nCalibration {} ({})", result.id, result.level);
    println!("{}", "=".repeat(60));
    println!("   Samples:     {}", result.validation_samples);
    println!("   Evaluations: {}", result.iterations);
    println!("   Converged:   {}", result.converged);
    println!("   Confidence:  {:.0}%", result.confidence);
    print_accuracy("Before", &result.original_accuracy);
    print_accuracy("After", &result.calibrated_accuracy);
    println!(
        "   MAE change: overall {:+.2}, safety {:+.2}, depth {:+.2}, stability {:+.2}",
        result.improvement.overall_mae,
        result.improvement.safety_mae,
        result.improvement.depth_mae,
        result.improvement.stability_mae
    );

    let original = result.original.to_map();
    let changed: Vec<_> = result
        .calibrated
        .to_map()
        .into_iter()
        .filter(|(key, value)| original.get(key).is_some_and(|o| (o - value).abs() > 1e-9))
        .collect();
    if !changed.is_empty() {
        println!("   Adjusted thresholds:");
        for (key, value) in changed {
            let before = original.get(key).copied().unwrap_or_default();
            println!("     {key}: {before:.3} -> {value:.3}");
        }
    }
}
