//! Ability Cards
//!
//! Stat modifiers applied to a player between rounds. A card bundles one
//! or more modifiers which apply in order. Every scaled stat is truncated
//! toward zero, so stats stay whole numbers.
//!
//! | Modifier   | Target                 | Clamp        |
//! |------------|------------------------|--------------|
//! | speed      | walk speed             | none         |
//! | health     | max health             | none         |
//! | damage     | bullet damage          | none         |
//! | ammo       | magazine size          | [1, 500]     |
//! | fire rate  | ms between shots       | [2, 2000]    |
//! | fire range | bullet speed           | [8, 120]     |
//! | weapon     | archetype swap         | n/a          |
//! | explosive  | exploding bullets flag | n/a          |

use serde::{Serialize, Deserialize};

use crate::core::tuning::{BULLET_SPEED_CLAMP, FIRE_RATE_CLAMP, MAGAZINE_CLAMP};
use crate::game::state::PlayerState;
use crate::game::weapon::WeaponArchetype;

/// What a modifier changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Multiply walk speed
    Speed,
    /// Multiply max health
    Health,
    /// Multiply bullet damage
    Damage,
    /// Multiply magazine size
    Ammo,
    /// Multiply the fire interval (lower is faster)
    FireRate,
    /// Multiply bullet speed
    FireRange,
    /// Replace the weapon with a fresh one
    Weapon(WeaponArchetype),
    /// Enable exploding bullets
    Explosive,
}

/// One stat change.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    /// What changes
    pub kind: ModifierKind,
    /// Multiplier (ignored by weapon swaps and explosive)
    pub value: f32,
}

impl Modifier {
    /// Multiplying modifier.
    pub const fn scale(kind: ModifierKind, value: f32) -> Self {
        Self { kind, value }
    }

    /// Weapon swap modifier.
    pub const fn weapon(archetype: WeaponArchetype) -> Self {
        Self { kind: ModifierKind::Weapon(archetype), value: 0.0 }
    }

    /// Exploding bullets modifier.
    pub const fn explosive() -> Self {
        Self { kind: ModifierKind::Explosive, value: 0.0 }
    }

    /// Mutate `player` in place. Returns true if the weapon was replaced.
    pub fn apply(&self, player: &mut PlayerState) -> bool {
        let m = self.value;
        let stats = &mut player.weapon.stats;
        match self.kind {
            ModifierKind::Speed => player.walk_speed = (player.walk_speed * m).trunc(),
            ModifierKind::Health => {
                player.max_health = (player.max_health * m).trunc();
                player.health = player.health.min(player.max_health);
            }
            ModifierKind::Damage => stats.damage = (stats.damage * m).trunc(),
            ModifierKind::Ammo => {
                let (lo, hi) = MAGAZINE_CLAMP;
                stats.magazine_size = (stats.magazine_size as f64 * m as f64).clamp(lo as f64, hi as f64) as u32;
                player.weapon.ammo = player.weapon.ammo.min(stats.magazine_size);
            }
            ModifierKind::FireRate => {
                let (lo, hi) = FIRE_RATE_CLAMP;
                stats.fire_rate_ms = (stats.fire_rate_ms as f64 * m as f64).clamp(lo as f64, hi as f64) as u64;
            }
            ModifierKind::FireRange => {
                let (lo, hi) = BULLET_SPEED_CLAMP;
                stats.bullet_speed = (stats.bullet_speed * m).trunc().clamp(lo, hi);
            }
            ModifierKind::Weapon(archetype) => {
                player.weapon.swap_to(archetype);
                return true;
            }
            ModifierKind::Explosive => player.exploding_bullets = true,
        }
        false
    }
}

/// Card category, for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    /// Stat changes
    Attribute,
    /// Weapon swap
    Weapon,
}

/// A draftable card.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AbilityCard {
    /// Category
    pub kind: CardKind,
    /// Title
    pub name: String,
    /// Flavor text
    pub description: String,
    /// Applied in order
    pub modifiers: Vec<Modifier>,
}

impl AbilityCard {
    /// Build a card.
    pub fn new(kind: CardKind, name: &str, description: &str, modifiers: Vec<Modifier>) -> Self {
        Self {
            kind,
            name: name.to_string(),
            description: description.to_string(),
            modifiers,
        }
    }

    /// Apply every modifier in order. Returns true if the weapon was replaced.
    pub fn apply(&self, player: &mut PlayerState) -> bool {
        self.modifiers
            .iter()
            .fold(false, |changed, modifier| modifier.apply(player) || changed)
    }
}

/// The stock 18-card deck.
pub fn standard_deck() -> Vec<AbilityCard> {
    use ModifierKind::{Ammo, Damage, FireRange, FireRate, Health, Speed};

    let attr = |name: &str, desc: &str, mods: &[(ModifierKind, f32)]| {
        AbilityCard::new(
            CardKind::Attribute,
            name,
            desc,
            mods.iter().map(|&(kind, value)| Modifier::scale(kind, value)).collect(),
        )
    };
    let weapon = |name: &str, desc: &str, archetype| {
        AbilityCard::new(CardKind::Weapon, name, desc, vec![Modifier::weapon(archetype)])
    };

    vec![
        attr("Speed Boost", "Increases player speed by 50%", &[(Speed, 1.5)]),
        attr("Health Boost", "Increases player health by 2x", &[(Health, 2.0)]),
        attr("Damage Boost", "Increases player damage by 1.5x", &[(Damage, 1.5)]),
        attr("Ammo Boost", "Increases player ammo by 2x", &[(Ammo, 2.0)]),
        attr("Fire Range Boost", "Increases player fire range by 1.5x", &[(FireRange, 1.5)]),
        weapon("Assault Rifle", "Gives player an Assault Rifle", WeaponArchetype::AssaultRifle),
        weapon("Desert Eagle", "Gives player a Desert Eagle", WeaponArchetype::DesertEagle),
        weapon("SMG", "Gives player an SMG", WeaponArchetype::Smg),
        attr("Speed Demon", "Increases player speed by 2x", &[(Speed, 2.0)]),
        attr("Healthier Boost", "Increases player health by 3x", &[(Health, 3.0)]),
        attr("Triple Damage", "Increases player damage by 3x", &[(Damage, 3.0)]),
        attr("Fire Rate Boost", "Increases player fire rate by 2x", &[(FireRate, 0.5)]),
        attr("Gimmie an SMG", "Increases player fire rate by 3x", &[(FireRate, 0.33)]),
        attr("Speedy Gonzales", "4x player speed but horrible Health", &[(Speed, 4.0), (Health, 0.33)]),
        attr("Basically a Sniper", "5x damage but horrible Fire rate", &[(Damage, 5.0), (FireRate, 10.0)]),
        attr("Tank", "5x health but 1/5th speed", &[(Health, 5.0), (Speed, 0.2)]),
        attr("Bullet Hell", "5x ammo but 1/5th damage", &[(Ammo, 5.0), (Damage, 0.2)]),
        AbilityCard::new(CardKind::Attribute, "Bullet Shield", "Make a wild guess.", vec![Modifier::explosive()]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use crate::game::state::{Color, ControlScheme, PlayerId};
    use proptest::prelude::*;

    fn player() -> PlayerState {
        PlayerState::new(PlayerId(0), ControlScheme::Mouse, Vec2::ZERO, Color::RED)
    }

    fn apply(player: &mut PlayerState, kind: ModifierKind, value: f32) {
        Modifier::scale(kind, value).apply(player);
    }

    #[test]
    fn test_deck_contents() {
        let deck = standard_deck();
        assert_eq!(deck.len(), 18);
        assert_eq!(deck.iter().filter(|c| c.kind == CardKind::Weapon).count(), 3);

        let sniper = deck.iter().find(|c| c.name == "Basically a Sniper").unwrap();
        assert_eq!(sniper.modifiers.len(), 2);
    }

    #[test]
    fn test_ammo_modifier_on_deagle() {
        let mut p = player();
        Modifier::weapon(WeaponArchetype::DesertEagle).apply(&mut p);
        apply(&mut p, ModifierKind::Ammo, 2.0);
        assert_eq!(p.weapon.stats.magazine_size, 6);

        apply(&mut p, ModifierKind::Ammo, 1000.0);
        assert_eq!(p.weapon.stats.magazine_size, 500);
    }

    #[test]
    fn test_fire_rate_clamp() {
        let mut p = player();
        apply(&mut p, ModifierKind::FireRate, 0.0001);
        assert_eq!(p.weapon.stats.fire_rate_ms, 2);

        apply(&mut p, ModifierKind::FireRate, 1e6);
        assert_eq!(p.weapon.stats.fire_rate_ms, 2000);
    }

    #[test]
    fn test_fire_range_clamp() {
        let mut p = player();
        apply(&mut p, ModifierKind::FireRange, 0.01);
        assert_eq!(p.weapon.stats.bullet_speed, 8.0);
        apply(&mut p, ModifierKind::FireRange, 100.0);
        assert_eq!(p.weapon.stats.bullet_speed, 120.0);
    }

    #[test]
    fn test_health_only_moves_ceiling() {
        let mut p = player();
        p.health = 60.0;
        apply(&mut p, ModifierKind::Health, 2.0);
        assert_eq!(p.max_health, 200.0);
        assert_eq!(p.health, 60.0, "no heal");

        apply(&mut p, ModifierKind::Health, 0.25);
        assert_eq!(p.max_health, 50.0);
        assert_eq!(p.health, 50.0);
    }

    #[test]
    fn test_bundle_order_and_swap_report() {
        let deck = standard_deck();
        let mut p = player();

        let gonzales = deck.iter().find(|c| c.name == "Speedy Gonzales").unwrap();
        assert!(!gonzales.apply(&mut p));
        assert_eq!(p.walk_speed, 40.0);
        assert!((p.max_health - 33.0).abs() < 1e-3);

        let smg = deck.iter().find(|c| c.name == "SMG").unwrap();
        assert!(smg.apply(&mut p));
        assert_eq!(p.weapon.archetype, WeaponArchetype::Smg);

        let shield = deck.iter().find(|c| c.name == "Bullet Shield").unwrap();
        shield.apply(&mut p);
        assert!(p.exploding_bullets);
    }

    #[test]
    fn test_scaled_stats_truncate() {
        let deck = standard_deck();
        let mut p = player();
        Modifier::weapon(WeaponArchetype::Smg).apply(&mut p);

        let bullet_hell = deck.iter().find(|c| c.name == "Bullet Hell").unwrap();
        bullet_hell.apply(&mut p);
        assert_eq!(p.weapon.stats.damage, 1.0, "6 * 0.2 truncates to 1");
        assert_eq!(p.weapon.stats.magazine_size, 225);

        apply(&mut p, ModifierKind::Speed, 1.55);
        assert_eq!(p.walk_speed, 15.0);
        apply(&mut p, ModifierKind::FireRange, 1.5);
        assert_eq!(p.weapon.stats.bullet_speed, 30.0);
        apply(&mut p, ModifierKind::Health, 0.333);
        assert_eq!(p.max_health, 33.0);
    }

    #[test]
    fn test_swap_discards_stat_changes() {
        let mut p = player();
        apply(&mut p, ModifierKind::Damage, 3.0);
        Modifier::weapon(WeaponArchetype::AssaultRifle).apply(&mut p);
        assert_eq!(p.weapon.stats.damage, 15.0);
    }

    proptest! {
        #[test]
        fn prop_weapon_clamps_hold(m in -10.0f32..10_000.0) {
            let mut p = player();
            apply(&mut p, ModifierKind::Ammo, m);
            apply(&mut p, ModifierKind::FireRate, m);
            apply(&mut p, ModifierKind::FireRange, m);

            let stats = p.weapon.stats;
            prop_assert!((1..=500).contains(&stats.magazine_size));
            prop_assert!((2..=2000).contains(&stats.fire_rate_ms));
            prop_assert!((8.0..=120.0).contains(&stats.bullet_speed));
            prop_assert!(p.weapon.ammo <= stats.magazine_size);
        }

        #[test]
        fn prop_health_never_exceeds_max(m in 0.01f32..10.0, hp in 1.0f32..100.0) {
            let mut p = player();
            p.health = hp;
            apply(&mut p, ModifierKind::Health, m);
            prop_assert!(p.health <= p.max_health);
        }
    }
}
