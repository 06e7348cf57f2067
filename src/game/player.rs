//! Player Movement and Actions
//!
//! Per-tick player update driven by a [`PlayerIntent`]. Order within a tick:
//!
//! ```text
//! gravity ─▶ aim ─▶ horizontal move ─▶ latch ─▶ jump ─▶ shield ─▶ reload ─▶ fire
//!                                                         (reload completion and
//!                                                          shield follow always run)
//! ```
//!
//! Dead players skip everything except reload completion.

use tracing::{debug, trace};

use crate::config::MatchConfig;
use crate::core::tuning::{FALL_SPEED_CAP, HEAD_BUMP_FALL_START, JUMP_IMPULSE, PLAYER_GRAVITY_STEP};
use crate::core::vec2::Vec2;
use crate::game::collision::{clamp_horizontal, clamp_vertical, head_blocked, is_grounded};
use crate::game::events::GameEvent;
use crate::game::input::PlayerIntent;
use crate::game::map::Map;
use crate::game::state::{PlayerState, ShieldBubble};

impl PlayerState {
    // =========================================================================
    // Gravity
    // =========================================================================

    /// Gravity manager.
    ///
    /// Latching freezes gravity. Ascending players decelerate by one unit per
    /// tick and start falling at once if their head hits something. Falling
    /// accelerates up to the fall-speed cap.
    pub fn apply_gravity(&mut self, map: &mut Map) {
        if self.latching {
            self.vertical_velocity = 0.0;
            return;
        }

        if self.vertical_velocity < 0.0 {
            self.move_vertical(map, self.vertical_velocity);
            if head_blocked(map, &self.rect) {
                self.vertical_velocity = HEAD_BUMP_FALL_START;
            } else {
                self.vertical_velocity += PLAYER_GRAVITY_STEP;
            }
        } else {
            self.vertical_velocity = (self.vertical_velocity + PLAYER_GRAVITY_STEP).min(FALL_SPEED_CAP);
            self.move_vertical(map, self.vertical_velocity);
        }
    }

    /// Vertical move. Moving up shoves physics blocks out of the way.
    pub fn move_vertical(&mut self, map: &mut Map, dy: f32) {
        if self.is_dead || self.latching || dy == 0.0 {
            return;
        }

        self.rect.y += dy;
        for index in map.overlapping(&self.rect, None) {
            let Some(object) = map.object(index) else {
                continue;
            };
            if dy < 0.0 && object.affected_by_gravity {
                map.move_vertical(index, dy);
            }
            if let Some(object) = map.object(index) {
                if self.rect.intersects(&object.rect) {
                    clamp_vertical(&mut self.rect, &object.rect, dy);
                }
            }
        }
    }

    // =========================================================================
    // Horizontal movement
    // =========================================================================

    /// Horizontal move with latch detection and block pushing.
    ///
    /// `can_latch` is recomputed on every call: it is only true if this move
    /// touched a latchable surface.
    pub fn move_horizontal(&mut self, map: &mut Map, dx: f32) {
        self.can_latch = false;
        if self.is_dead || dx == 0.0 {
            return;
        }

        self.rect.x += dx;
        let mut pushed = Vec::new();
        for index in map.overlapping(&self.rect, None) {
            let Some(object) = map.object(index) else {
                continue;
            };
            if object.latchable {
                self.can_latch = true;
            }
            if object.affected_by_gravity {
                pushed.push(index);
            } else {
                clamp_horizontal(&mut self.rect, &object.rect, dx);
            }
        }

        if pushed.is_empty() {
            return;
        }
        map.push_group(&pushed, dx);

        // Blocks that could not move the full distance stop the player too
        for index in pushed {
            if let Some(object) = map.object(index) {
                if self.rect.intersects(&object.rect) {
                    clamp_horizontal(&mut self.rect, &object.rect, dx);
                }
            }
        }
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Jump if grounded, not latching, and outside the rate limit.
    pub fn jump(&mut self, map: &Map, now_ms: u64, rate_limit_ms: u64) -> bool {
        if self.is_dead || self.latching {
            return false;
        }
        if let Some(last) = self.last_jump_ms {
            if now_ms.saturating_sub(last) < rate_limit_ms {
                return false;
            }
        }
        if !is_grounded(map, &self.rect) {
            return false;
        }

        self.vertical_velocity = JUMP_IMPULSE;
        self.last_jump_ms = Some(now_ms);
        true
    }

    /// Hold or release the latch. Only engages after touching a latchable wall.
    pub fn set_latch(&mut self, held: bool) {
        self.latching = held && self.can_latch && !self.is_dead;
    }

    /// Raise a shield bubble unless one exists or the cooldown is running.
    pub fn create_shield(&mut self, now_ms: u64, cooldown_ms: u64) -> bool {
        if self.shield.is_some() {
            return false;
        }
        if let Some(last) = self.last_shield_ms {
            if now_ms.saturating_sub(last) < cooldown_ms {
                trace!("{} shield on cooldown", self.id);
                return false;
            }
        }

        self.shield = Some(ShieldBubble::new(self.center()));
        self.last_shield_ms = Some(now_ms);
        debug!("{} raised a shield", self.id);
        true
    }

    /// Keep the bubble centered on its owner.
    pub fn follow_shield(&mut self) {
        let center = self.center();
        if let Some(shield) = self.shield.as_mut() {
            shield.rect.set_center(center);
        }
    }

    /// Place at `top_left` with full health and a full magazine.
    pub fn respawn_at(&mut self, top_left: Vec2) {
        self.is_dead = false;
        self.rect.x = top_left.x;
        self.rect.y = top_left.y;
        self.vertical_velocity = 0.0;
        self.latching = false;
        self.can_latch = false;
        self.health = self.max_health;
        self.weapon.refill();
    }
}

// =============================================================================
// PER-TICK UPDATE
// =============================================================================

/// Apply one tick of intent to a player.
pub fn update_player(
    player: &mut PlayerState,
    map: &mut Map,
    intent: &PlayerIntent,
    config: &MatchConfig,
    now_ms: u64,
    tick: u64,
    events: &mut Vec<GameEvent>,
) {
    let id = player.id;

    if !player.is_dead {
        player.apply_gravity(map);

        let center = player.center();
        player.weapon.update_aim(center, intent.aim);
        player.direction = player.weapon.angle;

        player.move_horizontal(map, intent.move_axis * player.walk_speed);
        player.set_latch(intent.latch);

        if intent.jump {
            player.jump(map, now_ms, config.jump_rate_limit_ms);
        }

        if intent.shield && player.create_shield(now_ms, config.shield_cooldown_ms) {
            events.push(GameEvent::shield_created(tick, id));
        }

        let weapon = &mut player.weapon;
        if intent.reload
            && weapon.ammo < weapon.stats.magazine_size
            && weapon.start_reload(now_ms, config.reload_restarts_on_repeat)
        {
            events.push(GameEvent::reload_started(tick, id));
        }

        if intent.fire {
            if weapon.ammo > 0 {
                // Muzzle follows the post-move position
                weapon.update_aim(player.rect.center(), intent.aim);
                if weapon.fire(id, intent.aim, now_ms) {
                    events.push(GameEvent::shot_fired(tick, id, weapon.archetype, weapon.ammo));
                }
            } else if weapon.start_reload(now_ms, false) {
                events.push(GameEvent::reload_started(tick, id));
            }
        }
    }

    if player.weapon.check_reload_complete(now_ms) {
        events.push(GameEvent::reload_completed(tick, id));
    }
    player.follow_shield();
}
