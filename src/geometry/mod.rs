// Planar geometry helpers shared by the analysis, telemetry and rendering modules

pub mod bounds;

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

pub use bounds::{BoundingBox, FitTransform};

/// A single coordinate of a track outline in track-local planar units.
///
/// An ordered sequence of points forms a closed loop: the last point
/// implicitly connects back to the first.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
}

impl TrackPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector pointing from `self` to `other`
    pub fn to(&self, other: &TrackPoint) -> (f64, f64) {
        (other.x - self.x, other.y - self.y)
    }
}

/// Wrap a possibly negative or overflowing index onto a closed sequence of `n` points.
///
/// `n` must be non-zero.
pub fn circular_index(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

/// Euclidean distance between two points
pub fn distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let (dx, dy) = a.to(b);
    (dx * dx + dy * dy).sqrt()
}

/// Unsigned turning angle at `curr`, in degrees within `[0, 180]`.
///
/// Computed between the incoming vector `curr - prev` and the outgoing vector
/// `next - curr`. Coincident points leave a zero-length vector and therefore no
/// defined direction; they count as no turn at all.
pub fn turn_angle(prev: &TrackPoint, curr: &TrackPoint, next: &TrackPoint) -> f64 {
    let (v1x, v1y) = prev.to(curr);
    let (v2x, v2y) = curr.to(next);

    let mag1 = (v1x * v1x + v1y * v1y).sqrt();
    let mag2 = (v2x * v2x + v2y * v2y).sqrt();
    if mag1 == 0.0 || mag2 == 0.0 {
        return 0.0;
    }

    let cos_angle = (v1x * v2x + v1y * v2y) / (mag1 * mag2);
    cos_angle.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Signed heading change at `curr`, in radians within `[-PI, PI]`.
///
/// Positive values turn counter-clockwise in a y-up frame.
pub fn heading_change(prev: &TrackPoint, curr: &TrackPoint, next: &TrackPoint) -> f64 {
    let (v1x, v1y) = prev.to(curr);
    let (v2x, v2y) = curr.to(next);
    normalize_angle(v2y.atan2(v2x) - v1y.atan2(v1x))
}

/// Fold an angle in radians into `[-PI, PI]`
pub fn normalize_angle(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unsigned turning angle of `coords[i]` against its neighbours `window` points
/// behind and ahead, wrapping across the start/finish line.
pub(crate) fn windowed_turn_angle(coords: &[TrackPoint], i: usize, window: usize) -> f64 {
    let n = coords.len();
    let prev = &coords[circular_index(i as isize - window as isize, n)];
    let next = &coords[circular_index((i + window) as isize, n)];
    turn_angle(prev, &coords[i], next)
}

/// Signed counterpart of [`windowed_turn_angle`], in radians
pub(crate) fn windowed_heading_change(coords: &[TrackPoint], i: usize, window: usize) -> f64 {
    let n = coords.len();
    let prev = &coords[circular_index(i as isize - window as isize, n)];
    let next = &coords[circular_index((i + window) as isize, n)];
    heading_change(prev, &coords[i], next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> TrackPoint {
        TrackPoint::new(x, y)
    }

    #[test]
    fn test_circular_index_wraps_both_directions() {
        assert_eq!(circular_index(-1, 10), 9);
        assert_eq!(circular_index(-12, 10), 8);
        assert_eq!(circular_index(10, 10), 0);
        assert_eq!(circular_index(13, 10), 3);
        assert_eq!(circular_index(4, 10), 4);
    }

    #[test]
    fn test_turn_angle_straight_line() {
        let angle = turn_angle(&p(0.0, 0.0), &p(1.0, 0.0), &p(2.0, 0.0));
        assert!(angle.abs() < 1e-9);
    }

    #[test]
    fn test_turn_angle_right_angle() {
        let angle = turn_angle(&p(0.0, 0.0), &p(10.0, 0.0), &p(10.0, 10.0));
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_turn_angle_reversal() {
        let angle = turn_angle(&p(0.0, 0.0), &p(10.0, 0.0), &p(0.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_turn_angle_coincident_points_is_zero() {
        let angle = turn_angle(&p(5.0, 5.0), &p(5.0, 5.0), &p(8.0, 1.0));
        assert_eq!(angle, 0.0);
        assert!(!angle.is_nan());

        let angle = turn_angle(&p(0.0, 0.0), &p(5.0, 5.0), &p(5.0, 5.0));
        assert_eq!(angle, 0.0);
    }

    #[test]
    fn test_heading_change_sign() {
        // left turn in a y-up frame
        let left = heading_change(&p(0.0, 0.0), &p(10.0, 0.0), &p(10.0, 10.0));
        assert!((left - PI / 2.0).abs() < 1e-9);

        let right = heading_change(&p(0.0, 0.0), &p(10.0, 0.0), &p(10.0, -10.0));
        assert!((right + PI / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_change_across_pi_boundary() {
        // heading goes from just below +PI to just above -PI, a small left turn
        let prev = p(10.0, -0.1);
        let curr = p(0.0, 0.0);
        let next = p(-10.0, -0.1);
        let change = heading_change(&prev, &curr, &next);
        assert!(change.abs() < 0.1);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-9);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-9);
        assert_eq!(normalize_angle(0.5), 0.5);
    }

    #[test]
    fn test_windowed_turn_angle_wraps_across_seam() {
        let square = vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)];
        // at index 0 the window reaches back to the last point
        let angle = windowed_turn_angle(&square, 0, 1);
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance() {
        assert_eq!(distance(&p(0.0, 0.0), &p(3.0, 4.0)), 5.0);
    }
}
