//! Weapon Subsystem
//!
//! Fire cadence, magazine and reload state machine per archetype.
//!
//! ```text
//!            fire() [ammo > 0, cadence ok]
//!          ┌──────────┐
//!          ▼          │
//!      ┌───────┐ ─────┘        ┌───────────┐
//!      │ Ready │ ─start_reload─▶ Reloading │
//!      └───────┘ ◀─────────────└───────────┘
//!           check_reload_complete() [elapsed ≥ 3000 ms]
//! ```
//!
//! A weapon owns the bullets it fired. Swapping archetypes resets stats,
//! ammo and reload state but leaves those bullets in flight.

use serde::{Serialize, Deserialize};
use tracing::{debug, trace};

use crate::core::tuning::{
    AIM_DEADZONE, ASSAULT_RIFLE_STATS, DESERT_EAGLE_STATS, PISTOL_STATS, RELOAD_TIME_MS, SMG_STATS,
    WEAPON_HANDLE_OFFSET,
};
use crate::core::vec2::Vec2;
use crate::game::input::AimInput;
use crate::game::projectile::Bullet;
use crate::game::state::PlayerId;

/// Weapon archetype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum WeaponArchetype {
    /// Starting weapon
    #[default]
    Pistol,
    /// Medium cadence, fast bullets
    AssaultRifle,
    /// Very high cadence, weak bullets
    Smg,
    /// Three heavy rounds
    DesertEagle,
}

impl WeaponArchetype {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            WeaponArchetype::Pistol => "Pistol",
            WeaponArchetype::AssaultRifle => "Assault Rifle",
            WeaponArchetype::Smg => "SMG",
            WeaponArchetype::DesertEagle => "Desert Eagle",
        }
    }
}

/// Tunable weapon stats. Ability cards mutate these in place.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Minimum milliseconds between shots
    pub fire_rate_ms: u64,
    /// Rounds per magazine
    pub magazine_size: u32,
    /// Initial bullet speed (pixels per tick)
    pub bullet_speed: f32,
    /// Damage per bullet
    pub damage: f32,
    /// Reload duration
    pub reload_time_ms: u64,
}

impl WeaponStats {
    /// Base stats for an archetype.
    pub fn from_archetype(archetype: WeaponArchetype) -> Self {
        let (fire_rate_ms, magazine_size, bullet_speed, damage) = match archetype {
            WeaponArchetype::Pistol => PISTOL_STATS,
            WeaponArchetype::AssaultRifle => ASSAULT_RIFLE_STATS,
            WeaponArchetype::Smg => SMG_STATS,
            WeaponArchetype::DesertEagle => DESERT_EAGLE_STATS,
        };
        Self {
            fire_rate_ms,
            magazine_size,
            bullet_speed,
            damage,
            reload_time_ms: RELOAD_TIME_MS,
        }
    }
}

/// A held weapon and the bullets it has fired.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Weapon {
    /// Current archetype
    pub archetype: WeaponArchetype,
    /// Current stats (base stats plus card modifiers)
    pub stats: WeaponStats,
    /// Rounds left, always within `0..=stats.magazine_size`
    pub ammo: u32,
    /// Reload in progress
    pub is_reloading: bool,
    /// When the current reload started
    pub reload_started_ms: u64,
    /// Last successful shot
    pub last_fire_ms: Option<u64>,
    /// Last stick angle outside the deadzone
    pub last_stick_angle: f32,
    /// Aim angle in degrees
    pub angle: f32,
    /// Aiming left of the holder
    pub flipped: bool,
    /// Muzzle position (bullets spawn here)
    pub position: Vec2,
    /// Bullets in flight
    pub bullets: Vec<Bullet>,
}

impl Weapon {
    /// Fresh weapon with a full magazine.
    pub fn new(archetype: WeaponArchetype) -> Self {
        let stats = WeaponStats::from_archetype(archetype);
        Self {
            archetype,
            stats,
            ammo: stats.magazine_size,
            is_reloading: false,
            reload_started_ms: 0,
            last_fire_ms: None,
            last_stick_angle: 0.0,
            angle: 0.0,
            flipped: false,
            position: Vec2::ZERO,
            bullets: Vec::new(),
        }
    }

    /// Replace with a fresh weapon of `archetype`, keeping bullets in flight.
    pub fn swap_to(&mut self, archetype: WeaponArchetype) {
        let bullets = std::mem::take(&mut self.bullets);
        let (angle, position) = (self.angle, self.position);
        *self = Weapon::new(archetype);
        self.bullets = bullets;
        self.angle = angle;
        self.position = position;
        debug!("Weapon swapped to {}", archetype.name());
    }

    /// Refill the magazine (respawn).
    pub fn refill(&mut self) {
        self.ammo = self.stats.magazine_size;
    }

    /// Drop every bullet in flight. Returns how many were dropped.
    pub fn clear_bullets(&mut self) -> usize {
        let count = self.bullets.len();
        self.bullets.clear();
        count
    }

    // =========================================================================
    // Aim
    // =========================================================================

    /// Recompute aim angle and muzzle position around the holder's center.
    ///
    /// Stick aim inside the deadzone keeps the last valid stick angle so the
    /// weapon does not snap back when the stick is released.
    pub fn update_aim(&mut self, holder_center: Vec2, aim: AimInput) {
        self.angle = match aim {
            AimInput::Pointer(target) => holder_center.angle_to(target),
            AimInput::Stick(stick) => self.stick_angle(stick),
            AimInput::Hold => self.angle,
        };
        self.flipped = self.angle > 90.0 || self.angle < -90.0;

        let offset = if self.flipped { -WEAPON_HANDLE_OFFSET } else { WEAPON_HANDLE_OFFSET };
        self.position = Vec2::new(holder_center.x + offset, holder_center.y);
    }

    fn stick_angle(&mut self, stick: Vec2) -> f32 {
        if stick.x.abs() > AIM_DEADZONE || stick.y.abs() > AIM_DEADZONE {
            self.last_stick_angle = stick.angle_degrees();
        }
        self.last_stick_angle
    }

    // =========================================================================
    // Fire
    // =========================================================================

    /// True if a shot at `now_ms` would go off.
    pub fn can_fire(&self, now_ms: u64) -> bool {
        if self.is_reloading || self.ammo == 0 {
            return false;
        }
        match self.last_fire_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.stats.fire_rate_ms,
            None => true,
        }
    }

    /// Fire one bullet from the muzzle.
    ///
    /// Pointer aim is measured from the muzzle, stick aim reuses the angle
    /// from [`Weapon::update_aim`]. Returns false (and changes nothing) while
    /// reloading, when empty, or inside the fire-rate window.
    pub fn fire(&mut self, owner: PlayerId, aim: AimInput, now_ms: u64) -> bool {
        if !self.can_fire(now_ms) {
            trace!("{} fire rejected (ammo {}, reloading {})", owner, self.ammo, self.is_reloading);
            return false;
        }

        let angle = match aim {
            AimInput::Pointer(target) => self.position.angle_to(target),
            AimInput::Stick(_) | AimInput::Hold => self.angle,
        };

        self.bullets.push(Bullet::new(
            owner,
            self.position,
            angle,
            self.stats.bullet_speed,
            self.stats.damage,
            now_ms,
            true,
        ));
        self.ammo -= 1;
        self.last_fire_ms = Some(now_ms);
        true
    }

    // =========================================================================
    // Reload
    // =========================================================================

    /// Begin reloading. Returns true if a new reload started.
    ///
    /// While a reload is running, a repeat call is ignored unless
    /// `restart_on_repeat` is set, in which case the countdown restarts.
    pub fn start_reload(&mut self, now_ms: u64, restart_on_repeat: bool) -> bool {
        if self.is_reloading {
            if restart_on_repeat {
                self.reload_started_ms = now_ms;
            }
            return false;
        }
        self.is_reloading = true;
        self.reload_started_ms = now_ms;
        debug!("Reload started ({} ms)", self.stats.reload_time_ms);
        true
    }

    /// Finish the reload once its time has elapsed. Returns true on completion.
    pub fn check_reload_complete(&mut self, now_ms: u64) -> bool {
        if !self.is_reloading {
            return false;
        }
        if now_ms.saturating_sub(self.reload_started_ms) < self.stats.reload_time_ms {
            return false;
        }
        self.ammo = self.stats.magazine_size;
        self.is_reloading = false;
        debug!("Reload completed, {} rounds", self.ammo);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OWNER: PlayerId = PlayerId(0);

    #[test]
    fn test_archetype_stats() {
        let smg = WeaponStats::from_archetype(WeaponArchetype::Smg);
        assert_eq!(smg.fire_rate_ms, 80);
        assert_eq!(smg.magazine_size, 45);

        let deagle = Weapon::new(WeaponArchetype::DesertEagle);
        assert_eq!(deagle.ammo, 3);
        assert_eq!(deagle.stats.damage, 60.0);
        assert_eq!(deagle.stats.reload_time_ms, 3000);
    }

    #[test]
    fn test_pistol_fire_cadence() {
        let mut pistol = Weapon::new(WeaponArchetype::Pistol);

        assert!(pistol.fire(OWNER, AimInput::Hold, 0));
        assert_eq!(pistol.ammo, 11);
        assert_eq!(pistol.bullets.len(), 1);
        assert_eq!(pistol.bullets[0].damage, 10.0);

        assert!(!pistol.fire(OWNER, AimInput::Hold, 100), "inside the 500 ms window");
        assert_eq!(pistol.ammo, 11);

        assert!(pistol.fire(OWNER, AimInput::Hold, 600));
        assert_eq!(pistol.ammo, 10);
        assert_eq!(pistol.bullets.len(), 2);
    }

    #[test]
    fn test_fire_twice_same_window() {
        let mut smg = Weapon::new(WeaponArchetype::Smg);
        smg.fire(OWNER, AimInput::Hold, 1000);
        smg.fire(OWNER, AimInput::Hold, 1000);
        assert_eq!(smg.ammo, 44);
    }

    #[test]
    fn test_empty_and_reloading_are_noops() {
        let mut deagle = Weapon::new(WeaponArchetype::DesertEagle);
        for i in 0..3 {
            assert!(deagle.fire(OWNER, AimInput::Hold, i * 1000));
        }
        assert_eq!(deagle.ammo, 0);
        assert!(!deagle.fire(OWNER, AimInput::Hold, 10_000));

        assert!(deagle.start_reload(10_000, false));
        assert!(!deagle.check_reload_complete(12_999));
        assert!(deagle.check_reload_complete(13_000));
        assert_eq!(deagle.ammo, 3);

        deagle.start_reload(20_000, false);
        deagle.ammo = 2;
        assert!(!deagle.fire(OWNER, AimInput::Hold, 21_000), "no firing while reloading");
    }

    #[test]
    fn test_repeat_reload_policy() {
        let mut kept = Weapon::new(WeaponArchetype::Pistol);
        kept.start_reload(0, false);
        assert!(!kept.start_reload(2000, false));
        assert!(kept.check_reload_complete(3000));

        let mut restarted = Weapon::new(WeaponArchetype::Pistol);
        restarted.start_reload(0, true);
        restarted.start_reload(2000, true);
        assert!(!restarted.check_reload_complete(3000));
        assert!(restarted.check_reload_complete(5000));
    }

    #[test]
    fn test_swap_keeps_bullets() {
        let mut weapon = Weapon::new(WeaponArchetype::Pistol);
        weapon.fire(OWNER, AimInput::Hold, 0);
        weapon.start_reload(10, false);

        weapon.swap_to(WeaponArchetype::AssaultRifle);
        assert_eq!(weapon.archetype, WeaponArchetype::AssaultRifle);
        assert_eq!(weapon.ammo, 28);
        assert!(!weapon.is_reloading);
        assert_eq!(weapon.bullets.len(), 1);
    }

    #[test]
    fn test_aim_and_hand_offset() {
        let mut weapon = Weapon::new(WeaponArchetype::Pistol);
        let center = Vec2::new(100.0, 100.0);

        weapon.update_aim(center, AimInput::Pointer(Vec2::new(200.0, 100.0)));
        assert_eq!(weapon.angle, 0.0);
        assert_eq!(weapon.position, Vec2::new(120.0, 100.0));

        weapon.update_aim(center, AimInput::Pointer(Vec2::new(0.0, 100.0)));
        assert!(weapon.flipped);
        assert_eq!(weapon.position, Vec2::new(80.0, 100.0));
    }

    #[test]
    fn test_stick_deadzone_keeps_last_angle() {
        let mut weapon = Weapon::new(WeaponArchetype::Pistol);
        let center = Vec2::new(0.0, 0.0);

        weapon.update_aim(center, AimInput::Stick(Vec2::new(0.0, 1.0)));
        assert!((weapon.angle - 90.0).abs() < 1e-4);

        // Released stick: still pointing down
        weapon.update_aim(center, AimInput::Stick(Vec2::new(0.05, -0.1)));
        assert!((weapon.angle - 90.0).abs() < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_ammo_stays_in_magazine(ops in proptest::collection::vec((0u8..3, 0u64..400), 1..200)) {
            let mut weapon = Weapon::new(WeaponArchetype::Smg);
            let mut now = 0u64;
            for (op, dt) in ops {
                now += dt;
                match op {
                    0 => { weapon.fire(OWNER, AimInput::Hold, now); }
                    1 => { weapon.start_reload(now, false); }
                    _ => {
                        if weapon.check_reload_complete(now) {
                            prop_assert_eq!(weapon.ammo, weapon.stats.magazine_size);
                        }
                    }
                }
                prop_assert!(weapon.ammo <= weapon.stats.magazine_size);
            }
        }
    }
}
