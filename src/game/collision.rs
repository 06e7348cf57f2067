//! Collision Helpers
//!
//! Capability traits shared by players, shields, bullets and map objects,
//! plus the edge-clamping and 1-unit probe helpers used for movement.

use crate::core::rect::Rect;
use crate::game::map::Map;

/// Anything with an axis-aligned bounding box.
pub trait Bounded {
    /// Current bounding box.
    fn bounds(&self) -> Rect;

    /// Overlap test against any other bounded value.
    #[inline]
    fn collides_with(&self, other: &impl Bounded) -> bool {
        self.bounds().intersects(&other.bounds())
    }
}

/// Anything with a health pool.
pub trait Damageable {
    /// Current health.
    fn health(&self) -> f32;

    /// Subtract `amount`. Returns true if this hit emptied the pool.
    fn take_damage(&mut self, amount: f32) -> bool;

    /// True once health has dropped to zero or below.
    #[inline]
    fn is_depleted(&self) -> bool {
        self.health() <= 0.0
    }
}

/// Anything with an accumulated vertical velocity.
pub trait GravityAffected {
    /// Vertical velocity (negative is up).
    fn vertical_velocity(&self) -> f32;

    /// Overwrite the vertical velocity.
    fn set_vertical_velocity(&mut self, velocity: f32);
}

/// Snap `rect` against `blocker` given the horizontal move that caused the overlap.
#[inline]
pub fn clamp_horizontal(rect: &mut Rect, blocker: &Rect, dx: f32) {
    if dx > 0.0 {
        rect.x = rect.x.min(blocker.left() - rect.w);
    } else if dx < 0.0 {
        rect.x = rect.x.max(blocker.right());
    }
}

/// Snap `rect` against `blocker` given the vertical move that caused the overlap.
#[inline]
pub fn clamp_vertical(rect: &mut Rect, blocker: &Rect, dy: f32) {
    if dy > 0.0 {
        rect.y = rect.y.min(blocker.top() - rect.h);
    } else if dy < 0.0 {
        rect.y = rect.y.max(blocker.bottom());
    }
}

/// Something solid directly below `rect` (1-unit downward probe).
pub fn is_grounded(map: &Map, rect: &Rect) -> bool {
    map.is_blocked(&rect.offset(0.0, 1.0))
}

/// Something solid directly above `rect` (1-unit upward probe).
pub fn head_blocked(map: &Map, rect: &Rect) -> bool {
    map.is_blocked(&rect.offset(0.0, -1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::map::MapObject;

    #[test]
    fn test_clamp_horizontal() {
        let wall = Rect::new(100.0, 0.0, 10.0, 100.0);

        let mut moving_right = Rect::new(65.0, 10.0, 39.0, 39.0);
        clamp_horizontal(&mut moving_right, &wall, 5.0);
        assert_eq!(moving_right.right(), 100.0);

        let mut moving_left = Rect::new(105.0, 10.0, 39.0, 39.0);
        clamp_horizontal(&mut moving_left, &wall, -5.0);
        assert_eq!(moving_left.left(), 110.0);
    }

    #[test]
    fn test_clamp_vertical() {
        let floor = Rect::new(0.0, 200.0, 500.0, 20.0);
        let mut falling = Rect::new(10.0, 170.0, 39.0, 39.0);
        clamp_vertical(&mut falling, &floor, 8.0);
        assert_eq!(falling.bottom(), 200.0);

        let mut rising = Rect::new(10.0, 215.0, 39.0, 39.0);
        clamp_vertical(&mut rising, &floor, -8.0);
        assert_eq!(rising.top(), 220.0);
    }

    #[test]
    fn test_probes_ignore_decorative() {
        let map = Map::new(vec![
            MapObject::solid(0.0, 100.0, 200.0, 20.0),
            MapObject::solid(300.0, 100.0, 200.0, 20.0).decorative(),
        ]);

        // Standing exactly on the floor: touching, not overlapping
        let standing = Rect::new(10.0, 61.0, 39.0, 39.0);
        assert!(!map.is_blocked(&standing));
        assert!(is_grounded(&map, &standing));

        let on_decoration = Rect::new(310.0, 61.0, 39.0, 39.0);
        assert!(!is_grounded(&map, &on_decoration));

        let under = Rect::new(10.0, 120.0, 39.0, 39.0);
        assert!(head_blocked(&map, &under));
    }
}
