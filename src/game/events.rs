//! Game Events
//!
//! Cues generated during simulation for the presentation layer (audio,
//! HUD, banners). The core never plays a sound itself; it reports what
//! happened and when.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Vec2;
use crate::game::map::MapObjectId;
use crate::game::state::{Color, PlayerId};
use crate::game::weapon::WeaponArchetype;

/// Priority for event processing order.
///
/// Lower value = processed first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EventPriority {
    /// Deaths first
    Death = 0,
    /// Round and match transitions
    Round = 1,
    /// Hits, explosions, shots
    Combat = 2,
    /// Reloads, shields, weapon changes
    Equipment = 3,
}

/// Game event data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventData {
    /// A weapon fired one bullet
    ShotFired {
        /// Shooter
        player_id: PlayerId,
        /// Weapon used (picks the sound)
        archetype: WeaponArchetype,
        /// Rounds left in the magazine
        ammo_left: u32,
    },

    /// Reload began
    ReloadStarted {
        /// Reloading player
        player_id: PlayerId,
    },

    /// Magazine refilled
    ReloadCompleted {
        /// Reloading player
        player_id: PlayerId,
    },

    /// Shield bubble raised
    ShieldCreated {
        /// Shield owner
        player_id: PlayerId,
    },

    /// Shield bubble ran out of hit points
    ShieldBroken {
        /// Shield owner
        player_id: PlayerId,
    },

    /// Player health reached zero
    PlayerDied {
        /// Player who died
        victim_id: PlayerId,
        /// Owner of the fatal bullet
        killer_id: Option<PlayerId>,
    },

    /// Damage block blew up
    ObjectDetonated {
        /// Block that blew up
        object_id: MapObjectId,
        /// Ring origin
        center: Vec2,
        /// Owner of the triggering bullet (and of the ring)
        triggered_by: PlayerId,
        /// Ring size
        bullets: u32,
    },

    /// Explosive-bullets modifier burst on its carrier
    BulletBurst {
        /// Carrier of the modifier
        player_id: PlayerId,
        /// Ring origin
        center: Vec2,
        /// Ring size
        bullets: u32,
    },

    /// Round resolved
    RoundWon {
        /// Survivor, `None` when nobody survived
        winner_id: Option<PlayerId>,
        /// Survivor's score after the award
        new_score: u32,
    },

    /// Player took a card in the draft
    CardDrafted {
        /// Drafting player
        player_id: PlayerId,
        /// Card title
        card: String,
    },

    /// Player now holds a different weapon
    WeaponChanged {
        /// Player whose weapon changed
        player_id: PlayerId,
        /// New weapon
        archetype: WeaponArchetype,
    },

    /// Players respawned (bell cue)
    RoundStarted {
        /// Round number, from 1
        round: u32,
    },

    /// Match decided
    GameOver {
        /// Match winner
        winner_id: PlayerId,
        /// Banner color
        color: Color,
    },
}

/// A game event with timing and priority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Tick when event occurred
    pub tick: u64,

    /// Processing priority
    pub priority: EventPriority,

    /// Player involved (for tie-breaking)
    pub player_id: Option<PlayerId>,

    /// Event data
    pub data: GameEventData,
}

impl GameEvent {
    /// Create a new event.
    pub fn new(tick: u64, priority: EventPriority, data: GameEventData) -> Self {
        let player_id = match &data {
            GameEventData::ShotFired { player_id, .. }
            | GameEventData::ReloadStarted { player_id }
            | GameEventData::ReloadCompleted { player_id }
            | GameEventData::ShieldCreated { player_id }
            | GameEventData::ShieldBroken { player_id }
            | GameEventData::BulletBurst { player_id, .. }
            | GameEventData::CardDrafted { player_id, .. }
            | GameEventData::WeaponChanged { player_id, .. } => Some(*player_id),
            GameEventData::PlayerDied { victim_id, .. } => Some(*victim_id),
            GameEventData::ObjectDetonated { triggered_by, .. } => Some(*triggered_by),
            GameEventData::RoundWon { winner_id, .. } => *winner_id,
            GameEventData::GameOver { winner_id, .. } => Some(*winner_id),
            GameEventData::RoundStarted { .. } => None,
        };

        Self {
            tick,
            priority,
            player_id,
            data,
        }
    }

    /// Create shot fired event.
    pub fn shot_fired(tick: u64, player_id: PlayerId, archetype: WeaponArchetype, ammo_left: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::ShotFired { player_id, archetype, ammo_left },
        )
    }

    /// Create reload started event.
    pub fn reload_started(tick: u64, player_id: PlayerId) -> Self {
        Self::new(tick, EventPriority::Equipment, GameEventData::ReloadStarted { player_id })
    }

    /// Create reload completed event.
    pub fn reload_completed(tick: u64, player_id: PlayerId) -> Self {
        Self::new(tick, EventPriority::Equipment, GameEventData::ReloadCompleted { player_id })
    }

    /// Create shield created event.
    pub fn shield_created(tick: u64, player_id: PlayerId) -> Self {
        Self::new(tick, EventPriority::Equipment, GameEventData::ShieldCreated { player_id })
    }

    /// Create shield broken event.
    pub fn shield_broken(tick: u64, player_id: PlayerId) -> Self {
        Self::new(tick, EventPriority::Combat, GameEventData::ShieldBroken { player_id })
    }

    /// Create player died event.
    pub fn player_died(tick: u64, victim_id: PlayerId, killer_id: Option<PlayerId>) -> Self {
        Self::new(tick, EventPriority::Death, GameEventData::PlayerDied { victim_id, killer_id })
    }

    /// Create object detonated event.
    pub fn object_detonated(
        tick: u64,
        object_id: MapObjectId,
        center: Vec2,
        triggered_by: PlayerId,
        bullets: u32,
    ) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::ObjectDetonated { object_id, center, triggered_by, bullets },
        )
    }

    /// Create bullet burst event.
    pub fn bullet_burst(tick: u64, player_id: PlayerId, center: Vec2, bullets: u32) -> Self {
        Self::new(
            tick,
            EventPriority::Combat,
            GameEventData::BulletBurst { player_id, center, bullets },
        )
    }

    /// Create round won event.
    pub fn round_won(tick: u64, winner_id: Option<PlayerId>, new_score: u32) -> Self {
        Self::new(tick, EventPriority::Round, GameEventData::RoundWon { winner_id, new_score })
    }

    /// Create card drafted event.
    pub fn card_drafted(tick: u64, player_id: PlayerId, card: impl Into<String>) -> Self {
        Self::new(
            tick,
            EventPriority::Equipment,
            GameEventData::CardDrafted { player_id, card: card.into() },
        )
    }

    /// Create weapon changed event.
    pub fn weapon_changed(tick: u64, player_id: PlayerId, archetype: WeaponArchetype) -> Self {
        Self::new(
            tick,
            EventPriority::Equipment,
            GameEventData::WeaponChanged { player_id, archetype },
        )
    }

    /// Create round started event.
    pub fn round_started(tick: u64, round: u32) -> Self {
        Self::new(tick, EventPriority::Round, GameEventData::RoundStarted { round })
    }

    /// Processing order: tick, then priority, then player.
    pub fn order_key(&self) -> (u64, EventPriority, Option<PlayerId>) {
        (self.tick, self.priority, self.player_id)
    }

    /// Create game over event.
    pub fn game_over(tick: u64, winner_id: PlayerId, color: Color) -> Self {
        Self::new(tick, EventPriority::Round, GameEventData::GameOver { winner_id, color })
    }
}
