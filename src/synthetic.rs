// ABOUTME: Synthetic squat stream generator for demos, benchmarks, and deterministic tests
// ABOUTME: Produces per-frame metrics along a smooth descent/ascent curve with optional noise
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::f64::consts::TAU;

use formcoach_core::models::{BiomechanicalMetrics, JointAngles, Point2D};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Shape of every generated repetition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SquatProfile {
    /// Knee angle while standing
    pub standing_knee: f64,
    /// Knee angle at the deepest point
    pub bottom_knee: f64,
    /// Back angle while standing
    pub standing_back: f64,
    /// Back angle at the deepest point
    pub bottom_back: f64,
    /// Seconds from leaving standing to returning
    pub rep_seconds: f64,
    /// Standing pause before each repetition
    pub pause_seconds: f64,
    /// Center-of-mass sway amplitude in normalized image units
    pub sway: f64,
    /// Right knee angle minus left knee angle
    pub asymmetry: f64,
    /// Uniform noise amplitude in degrees added to every angle
    pub noise: f64,
}

impl Default for SquatProfile {
    fn default() -> Self {
        Self {
            standing_knee: 172.0,
            bottom_knee: 80.0,
            standing_back: 178.0,
            bottom_back: 170.0,
            rep_seconds: 2.5,
            pause_seconds: 0.5,
            sway: 0.002,
            asymmetry: 2.0,
            noise: 0.0,
        }
    }
}

impl SquatProfile {
    /// Good depth with a rounded back
    #[must_use]
    pub fn rounded_back(bottom_back: f64) -> Self {
        Self {
            bottom_back,
            ..Self::default()
        }
    }

    /// Descent that stops above parallel
    #[must_use]
    pub fn shallow(bottom_knee: f64) -> Self {
        Self {
            bottom_knee,
            ..Self::default()
        }
    }
}

/// Deterministic squat frame generator
#[derive(Debug, Clone)]
pub struct SquatGenerator {
    profile: SquatProfile,
    frame_rate: f64,
    rng: ChaCha8Rng,
    clock: f64,
}

impl SquatGenerator {
    /// Generator with a fixed seed for reproducible streams
    #[must_use]
    pub fn new(profile: SquatProfile, frame_rate: f64, seed: u64) -> Self {
        Self {
            profile,
            frame_rate,
            rng: ChaCha8Rng::seed_from_u64(seed),
            clock: 0.0,
        }
    }

    /// Change the profile for subsequent repetitions
    pub fn set_profile(&mut self, profile: SquatProfile) {
        self.profile = profile;
    }

    /// `reps` repetitions followed by a final standing pause
    pub fn session(&mut self, reps: usize) -> Vec<BiomechanicalMetrics> {
        let mut frames = Vec::new();
        for _ in 0..reps {
            frames.extend(self.repetition());
        }
        frames.extend(self.standing(self.profile.pause_seconds));
        frames
    }

    /// One standing pause plus one full repetition
    pub fn repetition(&mut self) -> Vec<BiomechanicalMetrics> {
        let mut frames = self.standing(self.profile.pause_seconds);
        let count = (self.profile.rep_seconds * self.frame_rate).round().max(2.0) as usize;
        for i in 0..count {
            let progress = i as f64 / (count - 1) as f64;
            let depth = (1.0 - (TAU * progress).cos()) / 2.0;
            frames.push(self.frame(depth));
        }
        frames
    }

    /// Standing still for `seconds`
    pub fn standing(&mut self, seconds: f64) -> Vec<BiomechanicalMetrics> {
        let count = (seconds * self.frame_rate).round() as usize;
        (0..count).map(|_| self.frame(0.0)).collect()
    }

    fn frame(&mut self, depth: f64) -> BiomechanicalMetrics {
        let p = self.profile;
        let knee = (p.bottom_knee - p.standing_knee).mul_add(depth, p.standing_knee);
        let back = (p.bottom_back - p.standing_back).mul_add(depth, p.standing_back);
        let hip = (knee + 5.0).min(180.0);

        let angles = JointAngles {
            knee_left: Some(self.jitter(knee - p.asymmetry / 2.0)),
            knee_right: Some(self.jitter(knee + p.asymmetry / 2.0)),
            hip: Some(self.jitter(hip)),
            back: Some(self.jitter(back)),
            ankle_left: None,
            ankle_right: None,
        };
        let phase = TAU * self.clock;
        let com = Point2D::new(
            p.sway.mul_add(phase.sin(), 0.5),
            p.sway.mul_add(phase.cos(), 0.55),
        );

        let frame = BiomechanicalMetrics::new(self.clock, angles)
            .with_center_of_mass(com)
            .with_visibility(0.95);
        self.clock += 1.0 / self.frame_rate;
        frame
    }

    fn jitter(&mut self, angle: f64) -> f64 {
        let noisy = if self.profile.noise > 0.0 {
            angle + self.rng.gen_range(-self.profile.noise..=self.profile.noise)
        } else {
            angle
        };
        noisy.clamp(0.0, 180.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repetition_reaches_bottom() {
        let mut generator = SquatGenerator::new(SquatProfile::default(), 30.0, 7);
        let frames = generator.repetition();
        let deepest = frames
            .iter()
            .filter_map(|f| f.angles.knee_mean())
            .fold(f64::INFINITY, f64::min);
        assert!((deepest - 80.0).abs() < 1.0);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let profile = SquatProfile {
            noise: 3.0,
            ..SquatProfile::default()
        };
        let a = SquatGenerator::new(profile, 30.0, 42).session(2);
        let b = SquatGenerator::new(profile, 30.0, 42).session(2);
        assert_eq!(a, b);
    }
}
