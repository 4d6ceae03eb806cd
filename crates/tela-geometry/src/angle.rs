//! Angle helpers. All scene-facing APIs take radians; degrees only appear at
//! the user-input boundary.

use std::f64::consts::PI;

pub const TAU: f64 = 2.0 * PI;

#[inline]
pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[inline]
pub fn to_degrees(radians: f64) -> f64 {
    radians * 180.0 / PI
}

/// Normalize an angle into `[0, 2π)`.
pub fn normalize(radians: f64) -> f64 {
    let r = radians % TAU;
    if r < 0.0 { r + TAU } else { r }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_degree_round_trip() {
        assert!(approx_eq(to_degrees(to_radians(90.0)), 90.0));
        assert!(approx_eq(to_radians(180.0), PI));
    }

    #[test]
    fn test_normalize() {
        assert!(approx_eq(normalize(-PI / 2.0), 1.5 * PI));
        assert!(approx_eq(normalize(TAU + 0.5), 0.5));
        assert!(approx_eq(normalize(0.0), 0.0));
    }
}
