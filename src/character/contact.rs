//! Contact Classification
//!
//! Decides whether a character is standing on a candidate body. Every
//! threshold is derived from the character's own size:
//! - low tolerance (0.1 * height): "still on the ground" while moving
//! - high tolerance (0.2 * height): landing and jump permission
//! - lateral epsilon (width / 6): brushing a wall edge is not standing
//!
//! The top surface of a rotated platform is found by projecting the
//! character's bottom corners onto the platform's local axes.

use crate::math::{left_normal, scalar_projection, unit_from_angle, Vec2};
use crate::physics::{Body, BodyId, Collidable, PhysicsWorld, Positionable};

/// Vertical tolerance used while walking and riding
pub fn low_tolerance(size: Vec2) -> f32 {
    size.y * 0.1
}

/// Vertical tolerance used for landing and jumping
pub fn high_tolerance(size: Vec2) -> f32 {
    size.y * 0.2
}

/// Horizontal margin removed from each side of the candidate
pub fn lateral_epsilon(size: Vec2) -> f32 {
    size.x / 6.0
}

/// A body a character can stand on: anything that takes part in collision response.
pub fn is_platform(body: &Body) -> bool {
    !body.ignores_collision_response
}

/// Height of the platform's top surface under the character's feet.
///
/// Flat platforms report their raw top edge. Rotated platforms report the
/// higher of the surface points under the character's bottom-left and
/// bottom-right corners.
pub fn platform_top_y(character: &Body, platform: &Body) -> f32 {
    if platform.angle == 0.0 {
        return platform.top();
    }

    let ux = unit_from_angle(platform.angle);
    let uy = left_normal(ux);
    let half_height = platform.height() / 2.0;
    let bottom = character.bottom();

    let surface_y = |x: f32| {
        let proj = scalar_projection(Vec2::new(x, bottom) - platform.position, ux);
        (ux * proj + uy * half_height).y
    };

    platform.position.y + surface_y(character.left()).max(surface_y(character.right()))
}

/// Geometric standing test between two bodies, without identity checks.
pub fn stands_on(character: &Body, platform: &Body, y_tolerance: f32) -> bool {
    let epsilon = lateral_epsilon(character.size);
    let top = platform_top_y(character, platform);

    platform.position.y <= character.position.y
        && character.bottom() - top < y_tolerance
        && platform.left() + epsilon < character.right()
        && character.left() < platform.right() - epsilon
}

/// Whether `character` stands on `candidate` within `y_tolerance`.
///
/// A missing candidate, a stale handle (destroyed body) or a body the
/// character ignores collisions with is never stood on.
pub fn is_standing_on(
    world: &PhysicsWorld,
    character: BodyId,
    candidate: Option<BodyId>,
    y_tolerance: f32,
) -> bool {
    let Some(candidate) = candidate else {
        return false;
    };
    if candidate == character {
        return false;
    }
    let (Some(body), Some(platform)) = (world.get(character), world.get(candidate)) else {
        return false;
    };
    if body.ignores_collision_with(platform) {
        return false;
    }
    stands_on(body, platform, y_tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_6;

    fn hero() -> Body {
        Body::dynamic(40.0, 80.0)
    }

    #[test]
    fn test_flat_top_is_raw_edge() {
        let platform = Body::fixed(300.0, 20.0).at(12.0, -57.5);
        for x in [-100.0, 0.0, 55.0] {
            let c = hero().at(x, 3.0);
            assert_eq!(platform_top_y(&c, &platform), platform.top());
        }
    }

    #[test]
    fn test_rotated_top_takes_higher_corner() {
        let ramp = Body::fixed(400.0, 20.0).with_angle(FRAC_PI_6);

        // Put the bottom-right corner exactly on the ramp surface
        let ux = unit_from_angle(FRAC_PI_6);
        let on_surface = ux * 50.0 + left_normal(ux) * 10.0;
        let c = hero().at(on_surface.x - 20.0, on_surface.y + 40.0);

        let top = platform_top_y(&c, &ramp);
        assert!((top - c.bottom()).abs() < 1e-3, "{} vs {}", top, c.bottom());
        assert!(stands_on(&c, &ramp, low_tolerance(c.size)));
    }

    #[test]
    fn test_standing_within_tolerance() {
        let c = hero();
        let platform = Body::fixed(400.0, 20.0).at(0.0, -50.05);
        assert!(stands_on(&c, &platform, low_tolerance(c.size)));

        let far = Body::fixed(400.0, 20.0).at(0.0, -60.0);
        assert!(!stands_on(&c, &far, low_tolerance(c.size)));
        assert!(stands_on(&c, &far, high_tolerance(c.size)));
    }

    #[test]
    fn test_sunk_character_still_stands() {
        let c = hero().at(0.0, -45.0);
        let platform = Body::fixed(400.0, 20.0).at(0.0, -50.0);
        assert!(stands_on(&c, &platform, 0.5));
    }

    #[test]
    fn test_monotonic_in_gap() {
        let tolerance = 4.0;
        let mut was_standing = false;
        // Lower the character toward the platform one step at a time
        for step in 0..40 {
            let y = 60.0 - step as f32 * 0.5;
            let c = hero().at(0.0, y);
            let platform = Body::fixed(400.0, 20.0).at(0.0, -10.0);
            let standing = stands_on(&c, &platform, tolerance);
            assert!(!was_standing || standing, "lost contact at y = {}", y);
            was_standing = standing;
        }
        assert!(was_standing);
    }

    #[test]
    fn test_wall_edge_is_not_ground() {
        // Character hugging the side of a tall block, feet level with its top
        let wall = Body::fixed(40.0, 200.0).at(0.0, -140.0);
        let beside = hero().at(35.0, 0.0);
        assert!(!stands_on(&beside, &wall, high_tolerance(beside.size)));

        let on_top = hero().at(20.0, 0.0);
        assert!(stands_on(&on_top, &wall, high_tolerance(on_top.size)));
    }

    #[test]
    fn test_platform_above_is_rejected() {
        let c = hero();
        let ceiling = Body::fixed(400.0, 20.0).at(0.0, 5.0);
        assert!(!stands_on(&c, &ceiling, 1000.0));
    }

    #[test]
    fn test_world_lookup_rejections() {
        let mut world = PhysicsWorld::default();
        let c = world.add(hero().with_group(2));
        let floor = world.add(Body::fixed(400.0, 20.0).at(0.0, -50.0));
        let sensor = world.add(Body::sensor(400.0, 20.0).at(0.0, -50.0));
        let same_group = world.add(Body::fixed(400.0, 20.0).at(0.0, -50.0).with_group(2));

        assert!(is_standing_on(&world, c, Some(floor), 8.0));
        assert!(!is_standing_on(&world, c, None, 8.0));
        assert!(!is_standing_on(&world, c, Some(sensor), 8.0));
        assert!(!is_standing_on(&world, c, Some(same_group), 8.0));
        assert!(!is_standing_on(&world, c, Some(c), 8.0));

        world.remove(floor);
        assert!(!is_standing_on(&world, c, Some(floor), 8.0));
    }

    #[test]
    fn test_sensors_are_not_platforms() {
        assert!(is_platform(&Body::fixed(1.0, 1.0)));
        assert!(is_platform(&Body::dynamic(1.0, 1.0)));
        assert!(!is_platform(&Body::sensor(1.0, 1.0)));
    }
}
