//! Geometric utility functions for headings, rays, and interpolation.
//!
//! Positions are 3-component vectors with the vertical component at index 1.
//! Agents steer on the horizontal plane, so headings are yaw angles and every
//! direction produced here carries a zero vertical component.

use geo::algorithm::Distance;
use geo::{Euclidean, Line, Point};
use ndarray::Array1;

/// Builds a unit direction on the horizontal plane from a yaw angle.
///
/// Yaw 0 points along +z; positive yaw turns toward +x.
///
/// # Arguments
///
/// * `yaw` - Heading angle in radians
///
/// # Returns
///
/// A flat unit direction vector.
pub fn direction_from_yaw(yaw: f32) -> Array1<f32> {
    Array1::from_vec(vec![yaw.sin(), 0.0, yaw.cos()])
}

/// Extracts the yaw angle of a direction projected on the horizontal plane.
pub fn yaw_of(direction: &Array1<f32>) -> f32 {
    direction[0].atan2(direction[2])
}

/// Euclidean length of a vector.
pub fn norm(v: &Array1<f32>) -> f32 {
    v.mapv(|x| x.powi(2)).sum().sqrt()
}

/// Projects a vector onto the horizontal plane and normalizes it.
///
/// Returns a zero vector when the projection has no usable length.
pub fn flattened(v: &Array1<f32>) -> Array1<f32> {
    let mut flat = v.clone();
    flat[1] = 0.0;
    let len = norm(&flat);
    if len > f32::EPSILON {
        flat / len
    } else {
        Array1::zeros(3)
    }
}

/// Wraps an angle into the `(-π, π]` range.
pub fn wrap_signed_angle(mut angle: f32) -> f32 {
    if angle.is_nan() {
        return 0.0;
    }
    while angle <= -std::f32::consts::PI {
        angle += std::f32::consts::TAU;
    }
    while angle > std::f32::consts::PI {
        angle -= std::f32::consts::TAU;
    }
    angle
}

/// Rotates `yaw` toward `target` by `factor` of the remaining arc, taking the
/// shortest way around.
pub fn rotate_toward(yaw: f32, target: f32, factor: f32) -> f32 {
    yaw + wrap_signed_angle(target - yaw) * factor
}

/// Minimum distance between a segment and a point, both taken on the
/// horizontal plane.
///
/// # Arguments
///
/// * `start` - Segment start position
/// * `end` - Segment end position
/// * `point` - The point to measure against
///
/// # Returns
///
/// The minimum Euclidean distance from the point to the segment.
pub fn segment_point_distance(start: &Array1<f32>, end: &Array1<f32>, point: &Array1<f32>) -> f32 {
    let p = Point::new(point[0], point[2]);
    let line = Line::new(Point::new(start[0], start[2]), Point::new(end[0], end[2]));
    Euclidean.distance(&p, &line)
}

/// Distance along a flat ray at which it first enters a circle of `radius`
/// around `center`, when it does so within `max_distance`.
///
/// The segment-versus-circle test decides whether the ray touches the target
/// at all; the chord geometry then yields the entry distance. An origin
/// already inside the circle reports distance 0.
pub fn ray_circle_entry(
    origin: &Array1<f32>,
    direction: &Array1<f32>,
    center: &Array1<f32>,
    radius: f32,
    max_distance: f32,
) -> Option<f32> {
    let end = origin + &(direction * max_distance);
    if segment_point_distance(origin, &end, center) >= radius {
        return None;
    }

    let to_center_x = center[0] - origin[0];
    let to_center_z = center[2] - origin[2];
    let along = to_center_x * direction[0] + to_center_z * direction[2];
    let center_sq = to_center_x * to_center_x + to_center_z * to_center_z;
    let perp_sq = (center_sq - along * along).max(0.0);
    let half_chord = (radius * radius - perp_sq).max(0.0).sqrt();
    let entry = (along - half_chord).clamp(0.0, max_distance);
    Some(entry)
}

/// Inverse linear interpolation, clamped to `[0, 1]`.
///
/// Works for descending ranges as well: `inverse_lerp(300.0, 0.0, d)` is 1 at
/// distance 0 and fades to 0 at distance 300 and beyond.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

/// Linear interpolation between `a` and `b` with `t` clamped to `[0, 1]`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
