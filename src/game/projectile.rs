//! Projectile Subsystem
//!
//! Bullet kinematics and collision resolution.
//!
//! Per tick, every bullet:
//! 1. integrates (gravity on Y, drag on X)
//! 2. resolves against the map (solid kills, damage detonates, bounce reflects)
//! 3. resolves against players (explosive modifier, then shield, then body)
//!
//! Bullets never expire on their own; they live until they hit something
//! or the round resets.

use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::config::MatchConfig;
use crate::core::rect::Rect;
use crate::core::tuning::{BULLET_DRAG, BULLET_GRAVITY, BULLET_SIZE, DETONATION_BURST, EXPLOSIVE_BURST};
use crate::core::vec2::Vec2;
use crate::game::collision::{Bounded, Damageable};
use crate::game::events::GameEvent;
use crate::game::map::{CollisionType, Map};
use crate::game::state::{MatchState, PlayerId, PlayerState};

/// A bullet in flight.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    /// Bounds (10x10 square)
    pub rect: Rect,
    /// Pixels per tick
    pub velocity: Vec2,
    /// Damage dealt on hit
    pub damage: f32,
    /// When the bullet was fired
    pub cast_ms: u64,
    /// Shooter
    pub owner: PlayerId,
    /// Owner immunity applies; off for burst and detonation rings
    pub time_protected: bool,
    /// Velocity components reflected so far
    pub bounces: u32,
}

impl Bullet {
    /// Bullet centered on `center`, travelling along `angle` degrees.
    pub fn new(
        owner: PlayerId,
        center: Vec2,
        angle: f32,
        speed: f32,
        damage: f32,
        cast_ms: u64,
        time_protected: bool,
    ) -> Self {
        Self {
            rect: Rect::centered(center, BULLET_SIZE, BULLET_SIZE),
            velocity: Vec2::from_angle_degrees(angle).scale(speed),
            damage,
            cast_ms,
            owner,
            time_protected,
            bounces: 0,
        }
    }

    /// Center of the bounds.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// One tick of ballistic motion.
    #[inline]
    pub fn integrate(&mut self) {
        self.velocity.y += BULLET_GRAVITY;
        self.velocity.x *= BULLET_DRAG;
        self.rect.x += self.velocity.x;
        self.rect.y += self.velocity.y;
    }

    /// True while `player` is the protected owner and the bullet is younger than `window_ms`.
    #[inline]
    pub fn spares(&self, player: PlayerId, now_ms: u64, window_ms: u64) -> bool {
        self.time_protected && self.owner == player && now_ms.saturating_sub(self.cast_ms) < window_ms
    }

    /// Reflect off `wall` and step back to `previous`.
    ///
    /// Every velocity component whose axis overlaps the wall flips and
    /// counts as one bounce. After the move into the wall both axes overlap,
    /// so a hit reverses the bullet and adds two.
    fn reflect(&mut self, previous: Rect, wall: &Rect) {
        if self.rect.overlaps_y(wall) {
            self.velocity.y = -self.velocity.y;
            self.bounces += 1;
        }
        if self.rect.overlaps_x(wall) {
            self.velocity.x = -self.velocity.x;
            self.bounces += 1;
        }
        self.rect = previous;
    }
}

impl Bounded for Bullet {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Ring of bullets around `center`, one every `step_degrees` starting at 0.
pub fn ring_burst(
    owner: PlayerId,
    center: Vec2,
    (speed, damage, step_degrees): (f32, f32, u32),
    now_ms: u64,
    time_protected: bool,
) -> Vec<Bullet> {
    (0..360)
        .step_by(step_degrees.max(1) as usize)
        .map(|deg| Bullet::new(owner, center, deg as f32, speed, damage, now_ms, time_protected))
        .collect()
}

/// Shared per-tick context for collision resolution.
struct HitContext<'a> {
    config: &'a MatchConfig,
    now_ms: u64,
    tick: u64,
    spawns: Vec<Bullet>,
    events: Vec<GameEvent>,
}

// =============================================================================
// TICK PHASE
// =============================================================================

/// Advance and resolve every bullet of every weapon.
///
/// Bullets spawned by bursts join their owner's weapon after the pass and
/// first move on the next tick.
pub fn update_projectiles(state: &mut MatchState, config: &MatchConfig) {
    let mut ctx = HitContext {
        config,
        now_ms: state.now_ms(),
        tick: state.tick,
        spawns: Vec::new(),
        events: Vec::new(),
    };

    let holders: Vec<PlayerId> = state.players.keys().copied().collect();
    for holder in holders {
        let Some(player) = state.players.get_mut(&holder) else {
            continue;
        };
        let bullets = std::mem::take(&mut player.weapon.bullets);
        let mut survivors = Vec::with_capacity(bullets.len());

        for mut bullet in bullets {
            let previous = bullet.rect;
            bullet.integrate();

            if let Some(bounds) = &config.bullet_cull_bounds {
                if !bullet.rect.intersects(bounds) {
                    continue;
                }
            }
            if !resolve_map(&mut bullet, previous, &mut state.map, &mut ctx) {
                continue;
            }
            if !resolve_players(&bullet, &mut state.players, &mut ctx) {
                continue;
            }
            survivors.push(bullet);
        }

        if let Some(player) = state.players.get_mut(&holder) {
            player.weapon.bullets = survivors;
        }
    }

    for bullet in ctx.spawns {
        if let Some(player) = state.players.get_mut(&bullet.owner) {
            player.weapon.bullets.push(bullet);
        }
    }
    state.pending_events.extend(ctx.events);
}

/// Returns false if the bullet was consumed.
fn resolve_map(bullet: &mut Bullet, previous: Rect, map: &mut Map, ctx: &mut HitContext<'_>) -> bool {
    for index in map.overlapping(&bullet.rect, None) {
        let Some(object) = map.object(index) else {
            continue;
        };
        let (object_id, wall, collision) = (object.id, object.rect, object.collision);

        match collision {
            CollisionType::Solid => return false,
            CollisionType::Damage => {
                // Already blown objects are filtered by `overlapping`
                if let Some(center) = map.detonate(index) {
                    let ring = ring_burst(bullet.owner, center, DETONATION_BURST, ctx.now_ms, false);
                    ctx.events.push(GameEvent::object_detonated(
                        ctx.tick,
                        object_id,
                        center,
                        bullet.owner,
                        ring.len() as u32,
                    ));
                    ctx.spawns.extend(ring);
                }
                return false;
            }
            CollisionType::Bounce => {
                if let Some(max) = ctx.config.max_bullet_bounces {
                    if bullet.bounces >= max {
                        debug!("Bullet from {} hit the bounce cap", bullet.owner);
                        return false;
                    }
                }
                bullet.reflect(previous, &wall);
                return true;
            }
        }
    }
    true
}

/// Returns false if the bullet was consumed.
fn resolve_players(
    bullet: &Bullet,
    players: &mut BTreeMap<PlayerId, PlayerState>,
    ctx: &mut HitContext<'_>,
) -> bool {
    let config = ctx.config;
    let now = ctx.now_ms;

    for (&id, player) in players.iter_mut() {
        if player.is_dead {
            continue;
        }
        let hits_body = bullet.collides_with(player);

        // Explosive modifier converts the hit into a burst
        if player.exploding_bullets && hits_body && explosion_ready(player, now, config) {
            if bullet.spares(id, now, config.shield_self_immunity_ms) {
                continue;
            }
            player.last_explosion_ms = Some(now);
            let center = bullet.center();
            // Chain-reaction bullets belong to the shooter and spare nobody
            let ring = ring_burst(bullet.owner, center, EXPLOSIVE_BURST, now, false);
            ctx.events.push(GameEvent::bullet_burst(ctx.tick, id, center, ring.len() as u32));
            ctx.spawns.extend(ring);
            return false;
        }

        if let Some(shield) = player.shield.as_mut() {
            if bullet.collides_with(shield) {
                if bullet.spares(id, now, config.shield_self_immunity_ms) {
                    continue;
                }
                if shield.take_damage(bullet.damage) {
                    player.shield = None;
                    player.last_shield_ms = Some(now);
                    ctx.events.push(GameEvent::shield_broken(ctx.tick, id));
                }
                return false;
            }
        }

        if hits_body {
            if bullet.spares(id, now, config.self_immunity_ms) {
                continue;
            }
            if player.take_damage(bullet.damage) {
                player.is_dead = true;
                info!("{} killed by {}", id, bullet.owner);
                ctx.events.push(GameEvent::player_died(ctx.tick, id, Some(bullet.owner)));
            }
            return false;
        }
    }
    true
}

fn explosion_ready(player: &PlayerState, now_ms: u64, config: &MatchConfig) -> bool {
    match player.last_explosion_ms {
        Some(last) => now_ms.saturating_sub(last) > config.explosive_cooldown_ms,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::GameEventData;
    use crate::game::map::MapObject;
    use crate::game::state::{Color, ControlScheme, ShieldBubble};

    const SHOOTER: PlayerId = PlayerId(0);
    const TARGET: PlayerId = PlayerId(1);

    /// Two players far apart on an empty map, clock at 1000 ms.
    fn setup(objects: Vec<MapObject>) -> (MatchState, MatchConfig) {
        let config = MatchConfig::default();
        let mut state = MatchState::new(Map::new(objects), &config);
        state.add_player(ControlScheme::Mouse, Color::RED).unwrap();
        state.add_player(ControlScheme::Gamepad { device: 0 }, Color::BLUE).unwrap();
        state.tick = 60;
        (state, config)
    }

    fn place(state: &mut MatchState, id: PlayerId, x: f32, y: f32) {
        let player = state.get_player_mut(&id).unwrap();
        player.rect.x = x;
        player.rect.y = y;
    }

    /// Still bullet (no velocity after integration) for deterministic overlap.
    fn parked(owner: PlayerId, center: Vec2, damage: f32, cast_ms: u64) -> Bullet {
        let mut bullet = Bullet::new(owner, center, 0.0, 0.0, damage, cast_ms, true);
        bullet.velocity = Vec2::new(0.0, -BULLET_GRAVITY);
        bullet
    }

    fn give(state: &mut MatchState, bullet: Bullet) {
        let owner = bullet.owner;
        state.get_player_mut(&owner).unwrap().weapon.bullets.push(bullet);
    }

    #[test]
    fn test_integration() {
        let mut bullet = Bullet::new(SHOOTER, Vec2::new(0.0, 0.0), 0.0, 20.0, 10.0, 0, true);
        bullet.integrate();
        assert!((bullet.velocity.x - 19.8).abs() < 1e-4);
        assert!((bullet.velocity.y - 0.3).abs() < 1e-6);
        assert!((bullet.center().x - 19.8).abs() < 1e-4);
    }

    #[test]
    fn test_ring_sizes() {
        let det = ring_burst(SHOOTER, Vec2::ZERO, DETONATION_BURST, 0, false);
        assert_eq!(det.len(), 36);
        assert!(det.iter().all(|b| !b.time_protected && b.damage == 60.0));

        let exp = ring_burst(SHOOTER, Vec2::ZERO, EXPLOSIVE_BURST, 0, false);
        assert_eq!(exp.len(), 11);
    }

    #[test]
    fn test_solid_destroys() {
        let (mut state, config) = setup(vec![MapObject::solid(500.0, 500.0, 100.0, 100.0)]);
        give(&mut state, parked(SHOOTER, Vec2::new(550.0, 550.0), 10.0, 0));
        update_projectiles(&mut state, &config);
        assert_eq!(state.bullet_count(), 0);
    }

    #[test]
    fn test_damage_block_detonates_once() {
        let block = MapObject::solid(500.0, 500.0, 40.0, 40.0).with_collision(CollisionType::Damage);
        let (mut state, config) = setup(vec![block]);

        // Two bullets hit in the same tick
        give(&mut state, parked(SHOOTER, Vec2::new(510.0, 510.0), 10.0, 0));
        give(&mut state, parked(SHOOTER, Vec2::new(530.0, 530.0), 10.0, 0));
        update_projectiles(&mut state, &config);

        let weapon = &state.get_player(&SHOOTER).unwrap().weapon;
        // First bullet consumed, second passes through the latched object
        assert_eq!(weapon.bullets.len(), 36 + 1);
        assert_eq!(weapon.bullets.iter().filter(|b| b.damage == 60.0).count(), 36);
        assert!(state.map.object(0).unwrap().blown_up);

        let events = state.take_events();
        let detonations = events
            .iter()
            .filter(|e| matches!(e.data, GameEventData::ObjectDetonated { bullets: 36, .. }))
            .count();
        assert_eq!(detonations, 1);

        assert_eq!(state.map.remove_detonated(), 1);
    }

    fn bounce_wall() -> MapObject {
        MapObject::solid(100.0, 0.0, 20.0, 200.0).with_collision(CollisionType::Bounce)
    }

    /// Send the shooter's only bullet right into the wall again.
    fn rearm(state: &mut MatchState) {
        let bullet = &mut state.get_player_mut(&SHOOTER).unwrap().weapon.bullets[0];
        bullet.rect.set_center(Vec2::new(90.0, 100.0));
        bullet.velocity = Vec2::new(20.0, 0.0);
    }

    #[test]
    fn test_bounce_reflects() {
        let (mut state, config) = setup(vec![bounce_wall()]);
        give(&mut state, Bullet::new(SHOOTER, Vec2::new(90.0, 100.0), 0.0, 20.0, 10.0, 0, true));

        update_projectiles(&mut state, &config);

        // Both axes overlap after the move, so both components flip
        let bullet = &state.get_player(&SHOOTER).unwrap().weapon.bullets[0];
        assert!((bullet.velocity.x + 19.8).abs() < 1e-4);
        assert!((bullet.velocity.y + 0.3).abs() < 1e-6);
        assert_eq!(bullet.bounces, 2);
        assert_eq!(bullet.center(), Vec2::new(90.0, 100.0));
    }

    #[test]
    fn test_bounce_cap() {
        let (mut state, mut config) = setup(vec![bounce_wall()]);
        config.max_bullet_bounces = Some(3);
        give(&mut state, Bullet::new(SHOOTER, Vec2::new(90.0, 100.0), 0.0, 20.0, 10.0, 0, true));

        // Under the cap: 0 -> 2 -> 4
        for expected in [2, 4] {
            update_projectiles(&mut state, &config);
            assert_eq!(state.get_player(&SHOOTER).unwrap().weapon.bullets[0].bounces, expected);
            rearm(&mut state);
        }

        // Cap already reached: the next hit destroys it
        update_projectiles(&mut state, &config);
        assert_eq!(state.bullet_count(), 0);
    }

    #[test]
    fn test_bounce_cap_of_one_allows_first_hit() {
        let (mut state, mut config) = setup(vec![bounce_wall()]);
        config.max_bullet_bounces = Some(1);
        give(&mut state, Bullet::new(SHOOTER, Vec2::new(90.0, 100.0), 0.0, 20.0, 10.0, 0, true));

        update_projectiles(&mut state, &config);
        assert_eq!(state.bullet_count(), 1);

        rearm(&mut state);
        update_projectiles(&mut state, &config);
        assert_eq!(state.bullet_count(), 0);
    }

    #[test]
    fn test_unlimited_bounces() {
        let (mut state, mut config) = setup(vec![bounce_wall()]);
        config.max_bullet_bounces = None;
        give(&mut state, Bullet::new(SHOOTER, Vec2::new(90.0, 100.0), 0.0, 20.0, 10.0, 0, true));

        for _ in 0..40 {
            update_projectiles(&mut state, &config);
            rearm(&mut state);
        }
        assert_eq!(state.get_player(&SHOOTER).unwrap().weapon.bullets[0].bounces, 80);
    }

    #[test]
    fn test_body_hit_and_death() {
        let (mut state, config) = setup(vec![]);
        place(&mut state, TARGET, 300.0, 300.0);
        let center = state.get_player(&TARGET).unwrap().center();

        give(&mut state, parked(SHOOTER, center, 60.0, 0));
        update_projectiles(&mut state, &config);
        assert_eq!(state.get_player(&TARGET).unwrap().health, 40.0);
        assert_eq!(state.bullet_count(), 0);

        give(&mut state, parked(SHOOTER, center, 60.0, 0));
        update_projectiles(&mut state, &config);
        let target = state.get_player(&TARGET).unwrap();
        assert!(target.is_dead);

        // Dead players are skipped: bullet flies on
        give(&mut state, parked(SHOOTER, center, 60.0, 0));
        update_projectiles(&mut state, &config);
        assert_eq!(state.bullet_count(), 1);
        assert_eq!(state.get_player(&TARGET).unwrap().health, -20.0);
    }

    #[test]
    fn test_self_immunity_window() {
        let (mut state, config) = setup(vec![]);
        place(&mut state, SHOOTER, 300.0, 300.0);
        let center = state.get_player(&SHOOTER).unwrap().center();
        let now = state.now_ms();

        // 10 ms old: owner is spared
        give(&mut state, parked(SHOOTER, center, 10.0, now - 10));
        update_projectiles(&mut state, &config);
        assert_eq!(state.get_player(&SHOOTER).unwrap().health, 100.0);
        assert_eq!(state.bullet_count(), 1);

        // Unprotected bullets ignore the window
        state.get_player_mut(&SHOOTER).unwrap().weapon.bullets.clear();
        let mut ring_bullet = parked(SHOOTER, center, 10.0, now);
        ring_bullet.time_protected = false;
        give(&mut state, ring_bullet);
        update_projectiles(&mut state, &config);
        assert_eq!(state.get_player(&SHOOTER).unwrap().health, 90.0);
    }

    #[test]
    fn test_shield_absorbs() {
        let (mut state, config) = setup(vec![]);
        place(&mut state, TARGET, 300.0, 300.0);
        let center = state.get_player(&TARGET).unwrap().center();
        state.get_player_mut(&TARGET).unwrap().shield = Some(ShieldBubble::new(center));

        give(&mut state, parked(SHOOTER, center, 4.0, 0));
        update_projectiles(&mut state, &config);
        let target = state.get_player(&TARGET).unwrap();
        assert_eq!(target.health, 100.0);
        assert_eq!(target.shield.as_ref().unwrap().health, 1.0);

        give(&mut state, parked(SHOOTER, center, 4.0, 0));
        update_projectiles(&mut state, &config);
        let target = state.get_player(&TARGET).unwrap();
        assert!(target.shield.is_none());
        assert_eq!(target.last_shield_ms, Some(state.now_ms()));
        assert_eq!(target.health, 100.0);
    }

    #[test]
    fn test_explosive_modifier_bursts() {
        let (mut state, config) = setup(vec![]);
        place(&mut state, TARGET, 300.0, 300.0);
        let center = state.get_player(&TARGET).unwrap().center();
        state.get_player_mut(&TARGET).unwrap().exploding_bullets = true;

        give(&mut state, parked(SHOOTER, center, 10.0, 0));
        update_projectiles(&mut state, &config);

        let target = state.get_player(&TARGET).unwrap();
        assert_eq!(target.health, 100.0);
        assert!(target.weapon.bullets.is_empty());
        assert_eq!(target.last_explosion_ms, Some(1000));

        // The ring joins the shooter's bullets, unprotected
        let ring = &state.get_player(&SHOOTER).unwrap().weapon.bullets;
        assert_eq!(ring.len(), 11);
        assert!(ring.iter().all(|b| b.owner == SHOOTER && b.damage == 4.0 && !b.time_protected));

        // On cooldown: the next bullet does normal damage
        state.get_player_mut(&SHOOTER).unwrap().weapon.bullets.clear();
        give(&mut state, parked(SHOOTER, center, 10.0, 0));
        update_projectiles(&mut state, &config);
        assert_eq!(state.get_player(&TARGET).unwrap().health, 90.0);
    }

    #[test]
    fn test_burst_ring_hits_carrier() {
        let (mut state, config) = setup(vec![]);
        place(&mut state, TARGET, 300.0, 300.0);
        let center = state.get_player(&TARGET).unwrap().center();
        state.get_player_mut(&TARGET).unwrap().exploding_bullets = true;

        give(&mut state, parked(SHOOTER, center, 10.0, 0));
        update_projectiles(&mut state, &config);
        assert_eq!(state.bullet_count(), 11);

        // Next pass: diagonal ring bullets still overlap the carrier
        state.tick += 1;
        update_projectiles(&mut state, &config);
        let health = state.get_player(&TARGET).unwrap().health;
        assert!(health < 100.0, "ring damages its carrier");
        assert_eq!((100.0 - health) % 4.0, 0.0);
        assert!(state.bullet_count() < 11);
    }

    #[test]
    fn test_cull_bounds() {
        let (mut state, mut config) = setup(vec![]);
        config.bullet_cull_bounds = Some(Rect::new(0.0, 0.0, 100.0, 100.0));
        give(&mut state, parked(SHOOTER, Vec2::new(50.0, 50.0), 1.0, 0));
        give(&mut state, parked(SHOOTER, Vec2::new(500.0, 50.0), 1.0, 0));
        update_projectiles(&mut state, &config);
        assert_eq!(state.bullet_count(), 1);
    }
}
