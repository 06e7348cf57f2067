//! Gameplay Tuning Constants
//!
//! Every behavioral constant of the simulation lives here so the rest of
//! the crate never carries magic numbers. Units are arena pixels, pixels
//! per tick and milliseconds unless stated otherwise.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Arena: 1280 x 720, origin top-left, +Y points down         │
//! │  Tick:  60 Hz fixed step (one tick ≈ 16.67 ms)              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use crate::core::vec2::Vec2;

// =============================================================================
// ARENA
// =============================================================================

/// Arena width in pixels.
pub const ARENA_WIDTH: f32 = 1280.0;

/// Arena height in pixels.
pub const ARENA_HEIGHT: f32 = 720.0;

/// Maximum number of players in one match.
pub const MAX_PLAYERS: usize = 3;

/// Minimum number of players needed to start a match.
pub const MIN_PLAYERS: usize = 2;

// =============================================================================
// PLAYER
// =============================================================================

/// Player bounding box edge length.
pub const PLAYER_SIZE: f32 = 39.0;

/// Default horizontal walk speed (pixels per tick at full input).
pub const PLAYER_WALK_SPEED: f32 = 10.0;

/// Default maximum health.
pub const PLAYER_MAX_HEALTH: f32 = 100.0;

/// Upward impulse applied by a jump (negative is up).
pub const JUMP_IMPULSE: f32 = -16.0;

/// Gravity added to a player's vertical velocity each tick.
pub const PLAYER_GRAVITY_STEP: f32 = 1.0;

/// Terminal falling velocity for players and physics blocks.
pub const FALL_SPEED_CAP: f32 = 12.0;

/// Vertical velocity assigned when an ascending player bumps their head.
pub const HEAD_BUMP_FALL_START: f32 = 0.1;

/// Minimum milliseconds between two jumps.
pub const JUMP_RATE_LIMIT_MS: u64 = 100;

/// Spawn corner for the mouse player.
pub const SPAWN_MOUSE: Vec2 = Vec2::new(100.0, 100.0);

/// Spawn corner for the first gamepad.
pub const SPAWN_FIRST_GAMEPAD: Vec2 = Vec2::new(600.0, 100.0);

/// Spawn corner for every other gamepad.
pub const SPAWN_OTHER_GAMEPAD: Vec2 = Vec2::new(1140.0, 100.0);

// =============================================================================
// SHIELD
// =============================================================================

/// Shield bubble edge length (square, centered on the owner).
pub const SHIELD_SIZE: f32 = 100.0;

/// Shield bubble hit points.
pub const SHIELD_HEALTH: f32 = 5.0;

/// Cooldown between shield bubbles.
pub const SHIELD_COOLDOWN_MS: u64 = 8000;

// =============================================================================
// INPUT
// =============================================================================

/// Movement stick deadzone (per axis).
pub const MOVE_DEADZONE: f32 = 0.1;

/// Aim stick deadzone (either axis must exceed it).
pub const AIM_DEADZONE: f32 = 0.2;

/// Movement stick Y below this value requests a jump.
pub const STICK_JUMP_THRESHOLD: f32 = -0.8;

/// Trigger axis value above which fire / latch are held.
pub const TRIGGER_THRESHOLD: f32 = 0.5;

// =============================================================================
// WEAPONS
// =============================================================================

/// Reload duration shared by every archetype.
pub const RELOAD_TIME_MS: u64 = 3000;

/// Horizontal distance between the player center and the weapon grip.
pub const WEAPON_HANDLE_OFFSET: f32 = 20.0;

/// Base stats per archetype: (fire rate ms, magazine, bullet speed, damage).
pub const PISTOL_STATS: (u64, u32, f32, f32) = (500, 12, 20.0, 10.0);
/// Assault rifle base stats.
pub const ASSAULT_RIFLE_STATS: (u64, u32, f32, f32) = (220, 28, 30.0, 15.0);
/// Sub machine gun base stats.
pub const SMG_STATS: (u64, u32, f32, f32) = (80, 45, 20.0, 6.0);
/// Desert eagle base stats.
pub const DESERT_EAGLE_STATS: (u64, u32, f32, f32) = (800, 3, 46.0, 60.0);

// =============================================================================
// PROJECTILES
// =============================================================================

/// Bullet bounding box edge length.
pub const BULLET_SIZE: f32 = 10.0;

/// Horizontal drag multiplier per tick.
pub const BULLET_DRAG: f32 = 0.99;

/// Vertical gravity added per tick.
pub const BULLET_GRAVITY: f32 = 0.3;

/// Window after casting during which a bullet ignores its owner's body.
pub const SELF_IMMUNITY_MS: u64 = 30;

/// Window after casting during which a bullet ignores its owner's shield.
pub const SHIELD_SELF_IMMUNITY_MS: u64 = 40;

/// Cooldown between two explosive-bullet bursts on the same victim.
pub const EXPLOSIVE_COOLDOWN_MS: u64 = 6000;

/// Bounces after which a bullet is destroyed.
pub const MAX_BULLET_BOUNCES: u32 = 32;

/// Damage block detonation: (speed, damage, angular step in degrees).
pub const DETONATION_BURST: (f32, f32, u32) = (25.0, 60.0, 10);

/// Explosive-bullet burst: (speed, damage, angular step in degrees).
pub const EXPLOSIVE_BURST: (f32, f32, u32) = (25.0, 4.0, 35);

// =============================================================================
// MAP OBJECTS
// =============================================================================

/// Default gravity step for physics-enabled map objects.
pub const OBJECT_GRAVITY_STEP: f32 = 1.0;

// =============================================================================
// MODIFIER CLAMPS
// =============================================================================

/// Magazine size bounds after an `ammo` modifier.
pub const MAGAZINE_CLAMP: (u32, u32) = (1, 500);

/// Fire interval bounds (ms) after a `fireRate` modifier.
pub const FIRE_RATE_CLAMP: (u64, u64) = (2, 2000);

/// Bullet speed bounds after a `fireRange` modifier.
pub const BULLET_SPEED_CLAMP: (f32, f32) = (8.0, 120.0);

// =============================================================================
// MATCH
// =============================================================================

/// Score that ends the match.
pub const WIN_SCORE: u32 = 3;

/// Number of cards offered to each player per draft.
pub const DRAFT_OFFER_SIZE: usize = 3;

/// Milliseconds elapsed after `tick` ticks at `tick_rate` Hz.
#[inline]
pub const fn ticks_to_ms(tick: u64, tick_rate: u32) -> u64 {
    tick * 1000 / tick_rate as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_to_ms() {
        assert_eq!(ticks_to_ms(0, 60), 0);
        assert_eq!(ticks_to_ms(60, 60), 1000);
        assert_eq!(ticks_to_ms(6, 60), 100);
        assert_eq!(ticks_to_ms(1, 60), 16);
    }

    #[test]
    fn test_archetype_table_matches_design() {
        assert_eq!(PISTOL_STATS.0, 500);
        assert_eq!(ASSAULT_RIFLE_STATS.1, 28);
        assert_eq!(SMG_STATS.0, 80);
        assert_eq!(DESERT_EAGLE_STATS.3, 60.0);
    }
}
