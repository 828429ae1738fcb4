// ABOUTME: Small descriptive statistics over f64 slices used by analyzers and calibration
// ABOUTME: Mean, population standard deviation, range, error metrics, and correlation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Arithmetic mean, `None` for an empty slice
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation, `None` for an empty slice
#[must_use]
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Smallest value
#[must_use]
pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

/// Largest value
#[must_use]
pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// `max - min`
#[must_use]
pub fn range(values: &[f64]) -> Option<f64> {
    Some(max(values)? - min(values)?)
}

/// Mean absolute error between paired series
#[must_use]
pub fn mean_absolute_error(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    paired(predicted, actual)?;
    let errors: Vec<f64> = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).abs())
        .collect();
    mean(&errors)
}

/// Root mean squared error between paired series
#[must_use]
pub fn root_mean_squared_error(predicted: &[f64], actual: &[f64]) -> Option<f64> {
    paired(predicted, actual)?;
    let squared: Vec<f64> = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .collect();
    mean(&squared).map(f64::sqrt)
}

/// Pearson correlation; 0 when either series is constant
#[must_use]
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    paired(x, y)?;
    let mean_x = mean(x)?;
    let mean_y = mean(y)?;
    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        covariance += (a - mean_x) * (b - mean_y);
        var_x += (a - mean_x).powi(2);
        var_y += (b - mean_y).powi(2);
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator <= f64::EPSILON {
        return Some(0.0);
    }
    Some((covariance / denominator).clamp(-1.0, 1.0))
}

fn paired(a: &[f64], b: &[f64]) -> Option<()> {
    (!a.is_empty() && a.len() == b.len()).then_some(())
}
