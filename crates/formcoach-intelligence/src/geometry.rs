// ABOUTME: 2D vector-angle geometry for joint, back, and neck angles
// ABOUTME: Pure functions over image-normalized points with y growing downward
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use formcoach_core::constants::angles::MAX_JOINT_ANGLE;
use formcoach_core::models::Point2D;

/// Angle at `vertex` formed by `a` and `c`, in degrees within [0, 180]
///
/// Returns `None` when either arm has zero length.
#[must_use]
pub fn joint_angle(a: Point2D, vertex: Point2D, c: Point2D) -> Option<f64> {
    let (ax, ay) = (a.x - vertex.x, a.y - vertex.y);
    let (cx, cy) = (c.x - vertex.x, c.y - vertex.y);
    let norm = ax.hypot(ay) * cx.hypot(cy);
    if norm <= f64::EPSILON {
        return None;
    }
    let cosine = ((ax * cx + ay * cy) / norm).clamp(-1.0, 1.0);
    Some(cosine.acos().to_degrees())
}

/// Torso angle at the hip between the shoulder and a point straight below the hip
///
/// 180 means the shoulders are directly above the hips; forward lean or
/// rounding lowers the value.
#[must_use]
pub fn back_angle(shoulder: Point2D, hip: Point2D) -> Option<f64> {
    joint_angle(shoulder, hip, Point2D::new(hip.x, hip.y + 1.0))
}

/// Deviation of the neck line (shoulder to ear) from the torso line (hip to shoulder)
///
/// 0 means the head is stacked on the torso line.
#[must_use]
pub fn neck_deviation(hip: Point2D, shoulder: Point2D, ear: Point2D) -> Option<f64> {
    joint_angle(hip, shoulder, ear).map(|angle| MAX_JOINT_ANGLE - angle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_right_angle() {
        let angle = joint_angle(
            Point2D::new(0.0, 1.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
        );
        assert!(angle.is_some_and(|a| (a - 90.0).abs() < 1e-9));
    }

    #[test]
    fn test_degenerate_arm() {
        let p = Point2D::new(0.5, 0.5);
        assert_eq!(joint_angle(p, p, Point2D::new(1.0, 1.0)), None);
    }

    #[test]
    fn test_upright_back_is_180() {
        let angle = back_angle(Point2D::new(0.5, 0.2), Point2D::new(0.5, 0.6));
        assert!(angle.is_some_and(|a| (a - 180.0).abs() < 1e-9));
    }

    #[test]
    fn test_horizontal_torso_is_90() {
        let angle = back_angle(Point2D::new(0.9, 0.6), Point2D::new(0.5, 0.6));
        assert!(angle.is_some_and(|a| (a - 90.0).abs() < 1e-9));
    }
}
