//! 2D helpers on top of macroquad's `Vec2`
//!
//! World space is y-up. Angles are radians, counter-clockwise.

use std::f32::consts::PI;

pub use macroquad::math::Vec2;

/// Unit vector pointing along `angle`.
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Vector rotated 90 degrees counter-clockwise.
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

/// Vector rotated 90 degrees clockwise.
pub fn right_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Length of `v` along `onto`. `onto` does not need to be normalized.
pub fn scalar_projection(v: Vec2, onto: Vec2) -> f32 {
    let len = onto.length();
    if len == 0.0 {
        return 0.0;
    }
    v.dot(onto) / len
}

/// Angle mirrored over the vertical axis (PI - angle), wrapped to (-PI, PI].
pub fn supplement(angle: f32) -> f32 {
    wrap_angle(PI - angle)
}

/// Wrap an angle into (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = angle % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Rotate `v` by `angle`.
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_normals() {
        let v = Vec2::new(1.0, 0.0);
        assert_eq!(left_normal(v), Vec2::new(0.0, 1.0));
        assert_eq!(right_normal(v), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_scalar_projection() {
        let v = Vec2::new(3.0, 4.0);
        assert!(close(scalar_projection(v, Vec2::new(2.0, 0.0)), 3.0));
        assert_eq!(scalar_projection(v, Vec2::ZERO), 0.0);
    }

    #[test]
    fn test_supplement_is_involution() {
        for a in [0.0, 0.3, -1.2, PI / 2.0, 3.0] {
            let back = supplement(supplement(a));
            assert!(close(wrap_angle(back), wrap_angle(a)), "{} -> {}", a, back);
        }
        assert!(close(supplement(0.0), PI));
    }

    #[test]
    fn test_rotate() {
        let r = rotate(Vec2::new(1.0, 0.0), PI / 2.0);
        assert!(close(r.x, 0.0) && close(r.y, 1.0));
    }
}
