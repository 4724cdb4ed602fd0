use nalgebra::{Point2, Vector2};

pub type Vec2 = Vector2<f32>;
pub type Point = Point2<f32>;

/// Steering helpers on top of nalgebra's 2D vectors.
///
/// Addition, subtraction, scaling and `norm()` come from nalgebra. These
/// fill in the operations nalgebra either lacks or defines differently
/// (its `normalize` divides by zero on the zero vector).
pub trait VectorExt: Sized {
    /// Unit vector in the same direction, or the zero vector unchanged.
    fn normalize_or_zero(&self) -> Self;

    /// Rescales to exactly `max` when longer than `max`, otherwise unchanged.
    fn limit(&self, max: f32) -> Self;

    /// Angle to the positive x axis, in `(-π, π]`.
    fn angle_of(&self) -> f32;

    /// Unit vector pointing at `radians`.
    fn from_angle(radians: f32) -> Self;
}

impl VectorExt for Vec2 {
    fn normalize_or_zero(&self) -> Self {
        let length = self.norm();
        if length == 0.0 {
            *self
        } else {
            self / length
        }
    }

    fn limit(&self, max: f32) -> Self {
        if self.norm() > max {
            self.normalize_or_zero() * max
        } else {
            *self
        }
    }

    fn angle_of(&self) -> f32 {
        self.y.atan2(self.x)
    }

    fn from_angle(radians: f32) -> Self {
        Vec2::new(radians.cos(), radians.sin())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    const EPS: f32 = 1e-5;

    fn samples() -> Vec<Vec2> {
        vec![
            Vec2::zeros(),
            Vec2::new(3.0, 4.0),
            Vec2::new(-0.001, 0.0),
            Vec2::new(1e6, -2e6),
            Vec2::new(-7.5, -0.25),
            Vec2::new(0.0, 12.0),
        ]
    }

    #[test]
    fn normalize_is_unit_or_zero() {
        for v in samples() {
            let n = v.normalize_or_zero().norm();
            if v == Vec2::zeros() {
                assert_eq!(n, 0.0);
            } else {
                assert!((n - 1.0).abs() < EPS, "{v:?} normalized to length {n}");
            }
        }
    }

    #[test]
    fn limit_never_exceeds_max() {
        for v in samples() {
            for max in [0.0, 0.5, 3.0, 100.0] {
                let limited = v.limit(max);
                assert!(limited.norm() <= max + EPS * max.max(1.0));
            }
        }
    }

    #[test]
    fn limit_leaves_short_vectors_alone() {
        let v = Vec2::new(1.0, 1.0);
        assert_eq!(v.limit(3.0), v);
        let long = Vec2::new(30.0, 40.0).limit(5.0);
        assert!((long.x - 3.0).abs() < EPS && (long.y - 4.0).abs() < EPS);
    }

    #[test]
    fn angle_round_trips_through_from_angle() {
        let mut theta = -3.0 * PI;
        while theta < 3.0 * PI {
            let back = Vec2::from_angle(theta).angle_of();
            let diff = (back - theta).rem_euclid(TAU);
            assert!(diff < 1e-4 || TAU - diff < 1e-4, "theta {theta} came back as {back}");
            theta += 0.37;
        }
    }

    #[test]
    fn angle_of_negative_x_axis_is_pi() {
        assert!((Vec2::new(-1.0, 0.0).angle_of() - PI).abs() < EPS);
        assert_eq!(Vec2::zeros().angle_of(), 0.0);
    }
}
