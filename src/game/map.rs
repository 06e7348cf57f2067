//! Map Object Model
//!
//! Static and physics-enabled level geometry stored in an index-based
//! arena. Physics blocks fall under gravity and can push each other
//! horizontally in chains; damage blocks detonate once when shot.
//!
//! Decorative objects are visual-only and skipped by every query here.

use std::collections::{BTreeSet, VecDeque};

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::rect::Rect;
use crate::core::tuning::{FALL_SPEED_CAP, OBJECT_GRAVITY_STEP};
use crate::core::vec2::Vec2;
use crate::game::collision::{clamp_horizontal, clamp_vertical, Bounded, GravityAffected};
use crate::game::state::Color;

/// How a map object reacts to bullets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionType {
    /// Bullets are destroyed on contact
    #[default]
    Solid,
    /// Detonates once into a ring of bullets
    Damage,
    /// Bullets are reflected
    Bounce,
}

/// Stable identifier of a map object (survives removals of other objects).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct MapObjectId(pub u32);

/// A piece of level geometry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapObject {
    /// Assigned by [`Map::new`]
    pub id: MapObjectId,
    /// Bounds
    pub rect: Rect,
    /// Cosmetic
    pub color: Color,
    /// Bullet reaction
    pub collision: CollisionType,
    /// Players touching it horizontally may latch
    pub latchable: bool,
    /// Visual only, never collides
    pub decorative: bool,
    /// Falls and can be pushed
    pub affected_by_gravity: bool,
    /// Gravity added to `vertical_velocity` each tick
    pub gravity_step: f32,
    /// Current fall speed (physics objects only)
    pub vertical_velocity: f32,
    /// Damage blocks latch this on detonation; removed at end of tick
    pub blown_up: bool,
}

impl MapObject {
    /// Solid, static, non-latchable block.
    pub fn solid(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id: MapObjectId::default(),
            rect: Rect::new(x, y, w, h),
            color: Color::PLATFORM,
            collision: CollisionType::Solid,
            latchable: false,
            decorative: false,
            affected_by_gravity: false,
            gravity_step: 0.0,
            vertical_velocity: 0.0,
            blown_up: false,
        }
    }

    /// Builder: bullet reaction.
    pub fn with_collision(mut self, collision: CollisionType) -> Self {
        self.collision = collision;
        self
    }

    /// Builder: draw color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Builder: players can latch onto its sides.
    pub fn latchable(mut self) -> Self {
        self.latchable = true;
        self
    }

    /// Builder: drawn but never collides.
    pub fn decorative(mut self) -> Self {
        self.decorative = true;
        self
    }

    /// Enable gravity with the given per-tick step.
    pub fn physics(mut self, gravity_step: f32) -> Self {
        self.affected_by_gravity = true;
        self.gravity_step = gravity_step;
        self
    }

    /// True if this object takes part in collisions at all.
    #[inline]
    pub fn is_collidable(&self) -> bool {
        !self.decorative && !self.blown_up
    }
}

impl Bounded for MapObject {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl GravityAffected for MapObject {
    fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    fn set_vertical_velocity(&mut self, velocity: f32) {
        self.vertical_velocity = velocity;
    }
}

/// Owner of every map object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Map {
    objects: Vec<MapObject>,
}

impl Map {
    /// Build a map, assigning ids in list order.
    pub fn new(mut objects: Vec<MapObject>) -> Self {
        for (i, object) in objects.iter_mut().enumerate() {
            object.id = MapObjectId(i as u32);
        }
        Self { objects }
    }

    /// All objects, in draw and update order.
    pub fn objects(&self) -> &[MapObject] {
        &self.objects
    }

    /// Object at `index`.
    pub fn object(&self, index: usize) -> Option<&MapObject> {
        self.objects.get(index)
    }

    /// Look up by id.
    pub fn find(&self, id: MapObjectId) -> Option<&MapObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the map has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Indices of collidable objects overlapping `rect`, skipping `exclude`.
    pub fn overlapping(&self, rect: &Rect, exclude: Option<usize>) -> Vec<usize> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(i, o)| Some(*i) != exclude && o.is_collidable() && o.rect.intersects(rect))
            .map(|(i, _)| i)
            .collect()
    }

    /// True if any collidable object overlaps `rect`.
    pub fn is_blocked(&self, rect: &Rect) -> bool {
        self.objects
            .iter()
            .any(|o| o.is_collidable() && o.rect.intersects(rect))
    }

    // =========================================================================
    // Physics
    // =========================================================================

    /// Gravity pass over every physics object, in list order.
    pub fn apply_gravity(&mut self) {
        for index in 0..self.objects.len() {
            self.apply_gravity_step(index);
        }
    }

    /// Accumulate gravity on one physics object and move it vertically.
    pub fn apply_gravity_step(&mut self, index: usize) {
        let Some(object) = self.objects.get_mut(index) else {
            return;
        };
        if !object.affected_by_gravity || object.blown_up {
            return;
        }

        let velocity = (object.vertical_velocity + object.gravity_step).min(FALL_SPEED_CAP);
        object.vertical_velocity = velocity;
        self.move_vertical(index, velocity);
    }

    /// Move one object vertically, resting on / hanging under whatever it hits.
    pub fn move_vertical(&mut self, index: usize, dy: f32) {
        if dy == 0.0 || index >= self.objects.len() {
            return;
        }

        self.objects[index].rect.y += dy;
        let hits = self.overlapping(&self.objects[index].rect, Some(index));
        for other in hits {
            let other_rect = self.objects[other].rect;
            let object = &mut self.objects[index];
            if object.rect.intersects(&other_rect) {
                clamp_vertical(&mut object.rect, &other_rect, dy);
                object.vertical_velocity = 0.0;
            }
        }
    }

    /// Move one object horizontally, pushing physics objects in its way.
    ///
    /// Returns the displacement actually achieved.
    pub fn move_horizontal(&mut self, index: usize, dx: f32) -> f32 {
        let Some(object) = self.objects.get(index) else {
            return 0.0;
        };
        let start = object.rect.x;
        self.push_group(&[index], dx);
        self.objects[index].rect.x - start
    }

    /// Push a group of objects horizontally by `dx` as one cascading move.
    ///
    /// Worklist over the arena: every reached object moves once (tracked in
    /// a visited set), static blockers clamp it, and physics objects it
    /// now overlaps join the worklist. A final back-to-front pass clamps
    /// each pusher against a child that could not move the full distance,
    /// so a blocked chain stops instead of overlapping.
    pub fn push_group(&mut self, roots: &[usize], dx: f32) {
        if dx == 0.0 {
            return;
        }

        let mut visited: BTreeSet<usize> = BTreeSet::new();
        let mut order: Vec<(usize, Option<usize>)> = Vec::new();
        let mut queue: VecDeque<(usize, Option<usize>)> = roots
            .iter()
            .filter(|&&i| i < self.objects.len())
            .map(|&i| (i, None))
            .collect();

        while let Some((current, parent)) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            order.push((current, parent));
            self.objects[current].rect.x += dx;

            let hits = self.overlapping(&self.objects[current].rect, Some(current));

            // Static blockers first; the nearest edge wins
            for &other in &hits {
                if !self.objects[other].affected_by_gravity {
                    let other_rect = self.objects[other].rect;
                    let rect = &mut self.objects[current].rect;
                    if rect.intersects(&other_rect) {
                        clamp_horizontal(rect, &other_rect, dx);
                    }
                }
            }

            for &other in &hits {
                if self.objects[other].affected_by_gravity
                    && !visited.contains(&other)
                    && self.objects[current].rect.intersects(&self.objects[other].rect)
                {
                    queue.push_back((other, Some(current)));
                }
            }
        }

        for &(child, parent) in order.iter().rev() {
            if let Some(parent) = parent {
                let child_rect = self.objects[child].rect;
                let rect = &mut self.objects[parent].rect;
                if rect.intersects(&child_rect) {
                    clamp_horizontal(rect, &child_rect, dx);
                }
            }
        }
    }

    // =========================================================================
    // Detonation
    // =========================================================================

    /// Latch a damage object as blown up.
    ///
    /// Returns the detonation center the first time only.
    pub fn detonate(&mut self, index: usize) -> Option<Vec2> {
        let object = self.objects.get_mut(index)?;
        if object.collision != CollisionType::Damage || object.blown_up {
            return None;
        }
        object.blown_up = true;
        debug!("Map object {:?} detonated", object.id);
        Some(object.rect.center())
    }

    /// Drop every detonated object. Returns how many were removed.
    pub fn remove_detonated(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !o.blown_up);
        before - self.objects.len()
    }

    // =========================================================================
    // Default arena
    // =========================================================================

    /// Stock 1280x720 arena: border walls, floor, latchable platforms, two
    /// movable blocks and an explosive block.
    pub fn default_arena() -> Self {
        let mut objects = vec![
            MapObject::solid(-20.0, 0.0, 10.0, 720.0).with_color(Color::WALL),
            MapObject::solid(1280.0, 0.0, 10.0, 720.0).with_color(Color::WALL),
            MapObject::solid(20.0, 655.0, 1240.0, 20.0),
        ];

        // Pillars under the floor
        for i in 0..6 {
            objects.push(MapObject::solid(100.0 + i as f32 * 200.0, 675.0, 40.0, 90.0).decorative());
        }

        objects.extend([
            // Outer towers
            MapObject::solid(200.0, 380.0, 40.0, 290.0).decorative(),
            MapObject::solid(1000.0, 380.0, 40.0, 290.0).decorative(),
            MapObject::solid(200.0, 560.0, 40.0, 40.0).latchable(),
            MapObject::solid(1000.0, 560.0, 40.0, 40.0).latchable(),
            MapObject::solid(130.0, 360.0, 180.0, 20.0).latchable(),
            MapObject::solid(930.0, 360.0, 180.0, 20.0).latchable(),
            // Inner pillars and L shapes
            MapObject::solid(400.0, 540.0, 40.0, 120.0).decorative(),
            MapObject::solid(800.0, 540.0, 40.0, 120.0).decorative(),
            MapObject::solid(360.0, 500.0, 100.0, 40.0).latchable(),
            MapObject::solid(440.0, 460.0, 40.0, 80.0).latchable(),
            MapObject::solid(780.0, 500.0, 100.0, 40.0).latchable(),
            MapObject::solid(760.0, 460.0, 40.0, 80.0).latchable(),
            // Center pillar
            MapObject::solid(600.0, 420.0, 40.0, 240.0).decorative(),
            MapObject::solid(540.0, 410.0, 160.0, 20.0).latchable(),
            MapObject::solid(600.0, 635.0, 40.0, 20.0),
            // Movable blocks resting on the center platform
            MapObject::solid(570.0, 370.0, 40.0, 40.0).physics(OBJECT_GRAVITY_STEP),
            MapObject::solid(630.0, 370.0, 40.0, 40.0).physics(OBJECT_GRAVITY_STEP),
            // Explosive block dropping onto the pedestal
            MapObject::solid(600.0, 500.0, 40.0, 40.0)
                .with_collision(CollisionType::Damage)
                .with_color(Color::DANGER)
                .physics(OBJECT_GRAVITY_STEP),
        ]);

        Self::new(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> MapObject {
        MapObject::solid(0.0, 200.0, 1000.0, 20.0)
    }

    #[test]
    fn test_physics_block_falls_and_rests() {
        let mut map = Map::new(vec![
            floor(),
            MapObject::solid(100.0, 100.0, 40.0, 40.0).physics(1.0),
        ]);

        for _ in 0..60 {
            map.apply_gravity();
        }

        let block = map.object(1).unwrap();
        assert_eq!(block.rect.bottom(), 200.0, "block rests on the floor");
        assert_eq!(block.vertical_velocity, 0.0);
    }

    #[test]
    fn test_fall_speed_is_capped() {
        let mut map = Map::new(vec![MapObject::solid(0.0, 0.0, 10.0, 10.0).physics(5.0)]);
        for _ in 0..10 {
            map.apply_gravity();
        }
        assert_eq!(map.object(0).unwrap().vertical_velocity, FALL_SPEED_CAP);
    }

    #[test]
    fn test_decorative_is_transparent_to_gravity() {
        let mut map = Map::new(vec![
            floor(),
            MapObject::solid(100.0, 150.0, 40.0, 10.0).decorative(),
            MapObject::solid(100.0, 100.0, 40.0, 40.0).physics(1.0),
        ]);
        for _ in 0..60 {
            map.apply_gravity();
        }
        assert_eq!(map.object(2).unwrap().rect.bottom(), 200.0);
    }

    #[test]
    fn test_cascading_push() {
        // A pushes B pushes C
        let mut map = Map::new(vec![
            MapObject::solid(0.0, 0.0, 40.0, 40.0).physics(1.0),
            MapObject::solid(40.0, 0.0, 40.0, 40.0).physics(1.0),
            MapObject::solid(80.0, 0.0, 40.0, 40.0).physics(1.0),
        ]);

        let moved = map.move_horizontal(0, 5.0);
        assert_eq!(moved, 5.0);
        assert_eq!(map.object(1).unwrap().rect.x, 45.0);
        assert_eq!(map.object(2).unwrap().rect.x, 85.0);
    }

    #[test]
    fn test_push_blocked_by_static() {
        // A pushes B into a wall; both stop at the wall
        let mut map = Map::new(vec![
            MapObject::solid(0.0, 0.0, 40.0, 40.0).physics(1.0),
            MapObject::solid(40.0, 0.0, 40.0, 40.0).physics(1.0),
            MapObject::solid(82.0, -100.0, 10.0, 300.0),
        ]);

        let moved = map.move_horizontal(0, 5.0);
        assert_eq!(map.object(1).unwrap().rect.right(), 82.0);
        assert_eq!(map.object(0).unwrap().rect.right(), 42.0);
        assert_eq!(moved, 2.0);
        assert!(!map.object(0).unwrap().rect.intersects(&map.object(1).unwrap().rect));
    }

    #[test]
    fn test_push_cycle_terminates() {
        // Two overlapping physics blocks would recurse forever without a visited set
        let mut map = Map::new(vec![
            MapObject::solid(0.0, 0.0, 40.0, 40.0).physics(1.0),
            MapObject::solid(20.0, 0.0, 40.0, 40.0).physics(1.0),
        ]);
        map.push_group(&[0, 1], -3.0);
        assert_eq!(map.object(0).unwrap().rect.x, -3.0);
        assert_eq!(map.object(1).unwrap().rect.x, 17.0);
    }

    #[test]
    fn test_detonate_once() {
        let mut map = Map::new(vec![
            MapObject::solid(0.0, 0.0, 40.0, 40.0).with_collision(CollisionType::Damage),
            floor(),
        ]);

        assert_eq!(map.detonate(0), Some(Vec2::new(20.0, 20.0)));
        assert_eq!(map.detonate(0), None, "second hit must not detonate again");
        assert!(!map.object(0).unwrap().is_collidable());

        // Solid objects never detonate
        assert_eq!(map.detonate(1), None);

        assert_eq!(map.remove_detonated(), 1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.objects()[0].id, MapObjectId(1));
    }

    #[test]
    fn test_default_arena_settles() {
        let mut map = Map::default_arena();
        for _ in 0..120 {
            map.apply_gravity();
        }
        let bomb = map
            .objects()
            .iter()
            .find(|o| o.collision == CollisionType::Damage)
            .unwrap();
        assert_eq!(bomb.rect.bottom(), 635.0, "explosive block lands on the pedestal");

        let movable: Vec<_> = map
            .objects()
            .iter()
            .filter(|o| o.affected_by_gravity && o.collision == CollisionType::Solid)
            .collect();
        assert_eq!(movable.len(), 2);
        assert!(movable.iter().all(|o| o.rect.bottom() == 410.0), "blocks sit on the center platform");
        assert_eq!(map.object(0).unwrap().rect.x, -20.0);
    }
}
