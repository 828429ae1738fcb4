// ABOUTME: One-Euro low-pass filter for jittery per-frame angle signals
// ABOUTME: Adapts its cutoff to signal speed: smooth when still, responsive when moving
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # One-Euro Smoothing
//!
//! Pose estimators jitter by a few degrees frame to frame, which is enough to
//! make a phase threshold flicker. The One-Euro filter (Casiez et al., 2012)
//! lowers jitter at rest without adding lag during fast movement.

use std::f64::consts::PI;

use formcoach_core::constants::processing::DEFAULT_FRAME_RATE;
use formcoach_core::models::JointAngles;
use serde::{Deserialize, Serialize};

/// One-Euro filter parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OneEuroConfig {
    /// Minimum cutoff frequency in Hz
    pub min_cutoff: f64,
    /// Speed coefficient
    pub beta: f64,
    /// Cutoff for the derivative estimate in Hz
    pub derivative_cutoff: f64,
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.007,
            derivative_cutoff: 1.0,
        }
    }
}

/// Single-channel One-Euro filter
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    config: OneEuroConfig,
    previous: Option<(f64, f64)>,
    previous_derivative: f64,
}

impl OneEuroFilter {
    /// New filter with no history
    #[must_use]
    pub const fn new(config: OneEuroConfig) -> Self {
        Self {
            config,
            previous: None,
            previous_derivative: 0.0,
        }
    }

    fn alpha(cutoff: f64, dt: f64) -> f64 {
        let tau = 1.0 / (2.0 * PI * cutoff);
        1.0 / (1.0 + tau / dt)
    }

    /// Filter `value` observed at `timestamp` seconds
    pub fn filter(&mut self, timestamp: f64, value: f64) -> f64 {
        let Some((last_time, last_value)) = self.previous else {
            self.previous = Some((timestamp, value));
            return value;
        };

        let mut dt = timestamp - last_time;
        if dt <= 0.0 || !dt.is_finite() {
            dt = 1.0 / DEFAULT_FRAME_RATE;
        }

        let derivative = (value - last_value) / dt;
        let alpha_d = Self::alpha(self.config.derivative_cutoff, dt);
        let smoothed_derivative = alpha_d.mul_add(derivative, (1.0 - alpha_d) * self.previous_derivative);

        let cutoff = self
            .config
            .beta
            .mul_add(smoothed_derivative.abs(), self.config.min_cutoff);
        let alpha = Self::alpha(cutoff, dt);
        let smoothed = alpha.mul_add(value, (1.0 - alpha) * last_value);

        self.previous = Some((timestamp, smoothed));
        self.previous_derivative = smoothed_derivative;
        smoothed
    }

    /// Forget history
    pub fn reset(&mut self) {
        self.previous = None;
        self.previous_derivative = 0.0;
    }
}

/// One filter per joint-angle channel
#[derive(Debug, Clone)]
pub struct AngleSmoother {
    channels: [OneEuroFilter; 6],
}

impl AngleSmoother {
    /// Smoother with the same parameters on every channel
    #[must_use]
    pub fn new(config: OneEuroConfig) -> Self {
        Self {
            channels: std::array::from_fn(|_| OneEuroFilter::new(config)),
        }
    }

    /// Smooth every present angle; missing angles pass through as `None`
    pub fn smooth(&mut self, timestamp: f64, angles: JointAngles) -> JointAngles {
        let [knee_left, knee_right, hip, back, ankle_left, ankle_right] = &mut self.channels;
        let apply = |filter: &mut OneEuroFilter, value: Option<f64>| {
            value.map(|v| filter.filter(timestamp, v))
        };
        JointAngles {
            knee_left: apply(knee_left, angles.knee_left),
            knee_right: apply(knee_right, angles.knee_right),
            hip: apply(hip, angles.hip),
            back: apply(back, angles.back),
            ankle_left: apply(ankle_left, angles.ankle_left),
            ankle_right: apply(ankle_right, angles.ankle_right),
        }
    }

    /// Forget history on every channel
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
    }
}
