//! Game State Definitions
//!
//! All state types for match simulation.
//! Uses BTreeMap for deterministic iteration order.
//!
//! ```text
//! MatchState
//! ├── players: BTreeMap<PlayerId, PlayerState>
//! │   └── PlayerState
//! │       ├── weapon: Weapon ── bullets: Vec<Bullet>
//! │       └── shield: Option<ShieldBubble>
//! ├── map: Map ── objects: Vec<MapObject>
//! └── deck: Vec<AbilityCard>
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::info;

use crate::config::MatchConfig;
use crate::core::rect::Rect;
use crate::core::rng::DeterministicRng;
use crate::core::tuning::{
    ticks_to_ms, MAX_PLAYERS, MIN_PLAYERS, PLAYER_MAX_HEALTH, PLAYER_SIZE, PLAYER_WALK_SPEED,
    SHIELD_HEALTH, SHIELD_SIZE, SPAWN_FIRST_GAMEPAD, SPAWN_MOUSE, SPAWN_OTHER_GAMEPAD,
};
use crate::core::vec2::Vec2;
use crate::game::ability::{standard_deck, AbilityCard};
use crate::game::collision::{Bounded, Damageable, GravityAffected};
use crate::game::events::GameEvent;
use crate::game::map::Map;
use crate::game::weapon::{Weapon, WeaponArchetype};

// =============================================================================
// ERRORS
// =============================================================================

/// Match setup errors. The simulation itself never fails.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    /// Lobby already holds the maximum number of players.
    #[error("match is full ({} players max)", MAX_PLAYERS)]
    MatchFull,

    /// Only one player can use the mouse and keyboard.
    #[error("a mouse player is already registered")]
    DuplicateMouse,

    /// Each gamepad device drives at most one player.
    #[error("gamepad {0} is already bound to a player")]
    DuplicateGamepad(u8),

    /// Not enough players to start.
    #[error("need at least {} players, have {0}", MIN_PLAYERS)]
    NotEnoughPlayers(usize),

    /// No player with this id.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Lobby operations are only valid before the match starts.
    #[error("match already started")]
    AlreadyStarted,
}

// =============================================================================
// PLAYER ID
// =============================================================================

/// Player identifier, assigned in join order.
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

// =============================================================================
// CONTROL SCHEME
// =============================================================================

/// Input device driving a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlScheme {
    /// Mouse and keyboard
    Mouse,
    /// Gamepad by device index
    Gamepad {
        /// Device index reported by the input backend
        device: u8,
    },
}

impl ControlScheme {
    /// Fixed spawn corner for this scheme.
    ///
    /// Mouse spawns far left, gamepad 0 in the center, any other gamepad far right.
    pub fn spawn_point(self) -> Vec2 {
        match self {
            ControlScheme::Mouse => SPAWN_MOUSE,
            ControlScheme::Gamepad { device: 0 } => SPAWN_FIRST_GAMEPAD,
            ControlScheme::Gamepad { .. } => SPAWN_OTHER_GAMEPAD,
        }
    }
}

// =============================================================================
// COLOR
// =============================================================================

/// RGB color. Cosmetic only, except as the winner's identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Color {
    /// Create a color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Player red
    pub const RED: Color = Color::rgb(255, 103, 117);
    /// Player orange
    pub const ORANGE: Color = Color::rgb(255, 188, 110);
    /// Player yellow
    pub const YELLOW: Color = Color::rgb(255, 255, 135);
    /// Player green
    pub const GREEN: Color = Color::rgb(135, 255, 161);
    /// Player blue
    pub const BLUE: Color = Color::rgb(110, 192, 255);
    /// Player purple
    pub const PURPLE: Color = Color::rgb(188, 167, 255);

    /// Platform fill
    pub const PLATFORM: Color = Color::rgb(60, 60, 255);
    /// Border wall fill
    pub const WALL: Color = Color::rgb(5, 1, 23);
    /// Explosive block fill
    pub const DANGER: Color = Color::rgb(255, 60, 60);

    /// Selectable player colors, lobby order.
    pub const PALETTE: [Color; 6] = [
        Color::RED,
        Color::ORANGE,
        Color::YELLOW,
        Color::GREEN,
        Color::BLUE,
        Color::PURPLE,
    ];
}

// =============================================================================
// SHIELD BUBBLE
// =============================================================================

/// Square bubble centered on its owner that soaks bullets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShieldBubble {
    /// Bounds, re-centered on the owner every tick
    pub rect: Rect,
    /// Remaining hit points
    pub health: f32,
}

impl ShieldBubble {
    /// Fresh bubble around `center`.
    pub fn new(center: Vec2) -> Self {
        Self {
            rect: Rect::centered(center, SHIELD_SIZE, SHIELD_SIZE),
            health: SHIELD_HEALTH,
        }
    }
}

impl Bounded for ShieldBubble {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl Damageable for ShieldBubble {
    fn health(&self) -> f32 {
        self.health
    }

    fn take_damage(&mut self, amount: f32) -> bool {
        let was_up = self.health > 0.0;
        self.health -= amount;
        was_up && self.health <= 0.0
    }
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// State of a single player in the match.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Unique player ID
    pub id: PlayerId,

    /// Input device
    pub scheme: ControlScheme,

    /// Bounding box (top-left + size)
    pub rect: Rect,

    /// Current health
    pub health: f32,

    /// Health ceiling, restored on respawn
    pub max_health: f32,

    /// Vertical velocity (negative is up)
    pub vertical_velocity: f32,

    /// Horizontal speed at full input
    pub walk_speed: f32,

    /// Aim angle in degrees
    pub direction: f32,

    /// Touched a latchable surface during the last horizontal move
    pub can_latch: bool,

    /// Clinging to a wall (gravity frozen)
    pub latching: bool,

    /// Active shield bubble
    pub shield: Option<ShieldBubble>,

    /// Last time a shield was created or destroyed
    pub last_shield_ms: Option<u64>,

    /// Last successful jump
    pub last_jump_ms: Option<u64>,

    /// The one weapon this player holds
    pub weapon: Weapon,

    /// Rounds won
    pub score: u32,

    /// Out for the rest of the round
    pub is_dead: bool,

    // =========================================================================
    // Explosive bullets modifier
    // =========================================================================

    /// Incoming bullets burst into a ring instead of dealing damage
    pub exploding_bullets: bool,

    /// Last burst triggered on this player
    pub last_explosion_ms: Option<u64>,

    /// Identity color
    pub color: Color,
}

impl PlayerState {
    /// Create a new player with its top-left corner at `spawn`.
    pub fn new(id: PlayerId, scheme: ControlScheme, spawn: Vec2, color: Color) -> Self {
        Self {
            id,
            scheme,
            rect: Rect::new(spawn.x, spawn.y, PLAYER_SIZE, PLAYER_SIZE),
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            vertical_velocity: 0.0,
            walk_speed: PLAYER_WALK_SPEED,
            direction: 0.0,
            can_latch: false,
            latching: false,
            shield: None,
            last_shield_ms: None,
            last_jump_ms: None,
            weapon: Weapon::new(WeaponArchetype::Pistol),
            score: 0,
            is_dead: false,
            exploding_bullets: false,
            last_explosion_ms: None,
            color,
        }
    }

    /// Center of the bounding box.
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}

impl Bounded for PlayerState {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

impl Damageable for PlayerState {
    fn health(&self) -> f32 {
        self.health
    }

    fn take_damage(&mut self, amount: f32) -> bool {
        let was_alive = self.health > 0.0;
        self.health -= amount;
        was_alive && self.health <= 0.0
    }
}

impl GravityAffected for PlayerState {
    fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    fn set_vertical_velocity(&mut self, velocity: f32) {
        self.vertical_velocity = velocity;
    }
}

// =============================================================================
// MATCH PHASE
// =============================================================================

/// Current phase of the match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    /// Lobby, players joining
    #[default]
    Waiting,
    /// Players fighting
    RoundActive,
    /// Round resolved, ability draft in progress
    DraftPending,
    /// Someone won; no more respawns
    GameOver,
}

// =============================================================================
// MATCH STATE
// =============================================================================

/// Complete state of a match.
///
/// Uses BTreeMap for deterministic iteration order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchState {
    /// Ticks simulated so far
    pub tick: u64,

    /// Simulation rate, used to derive the millisecond clock
    pub tick_rate: u32,

    /// Current match phase
    pub phase: MatchPhase,

    /// Rounds started so far
    pub round: u32,

    /// All players (BTreeMap for deterministic iteration)
    pub players: BTreeMap<PlayerId, PlayerState>,

    /// Level geometry
    pub map: Map,

    /// Cards offered during drafts
    pub deck: Vec<AbilityCard>,

    /// Players that died this round, in death order
    pub dead_players: Vec<PlayerId>,

    /// Set once a surviving player reaches the win score
    pub disable_respawns: bool,

    /// Match winner
    pub winner: Option<PlayerId>,

    /// Winner's color for the game-over banner
    pub winner_color: Option<Color>,

    /// Draft RNG, saved with the snapshot so offers resume in sequence
    pub rng: DeterministicRng,

    /// Events generated this tick (drained by `tick`)
    #[serde(skip)]
    pub pending_events: Vec<GameEvent>,
}

impl MatchState {
    /// Create a new match on `map` with the standard deck.
    pub fn new(map: Map, config: &MatchConfig) -> Self {
        Self {
            tick: 0,
            tick_rate: config.tick_rate,
            phase: MatchPhase::Waiting,
            round: 0,
            players: BTreeMap::new(),
            map,
            deck: standard_deck(),
            dead_players: Vec::new(),
            disable_respawns: false,
            winner: None,
            winner_color: None,
            rng: DeterministicRng::new(config.rng_seed),
            pending_events: Vec::new(),
        }
    }

    /// Simulation clock in milliseconds.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        ticks_to_ms(self.tick, self.tick_rate)
    }

    /// Add a player to the lobby.
    pub fn add_player(&mut self, scheme: ControlScheme, color: Color) -> Result<PlayerId, MatchError> {
        if self.phase != MatchPhase::Waiting {
            return Err(MatchError::AlreadyStarted);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(MatchError::MatchFull);
        }
        for player in self.players.values() {
            match (player.scheme, scheme) {
                (ControlScheme::Mouse, ControlScheme::Mouse) => return Err(MatchError::DuplicateMouse),
                (ControlScheme::Gamepad { device: a }, ControlScheme::Gamepad { device: b }) if a == b => {
                    return Err(MatchError::DuplicateGamepad(b));
                }
                _ => {}
            }
        }

        let id = PlayerId(self.players.len() as u8);
        self.players.insert(id, PlayerState::new(id, scheme, scheme.spawn_point(), color));
        Ok(id)
    }

    /// Change a player's color while still in the lobby.
    pub fn set_color(&mut self, id: PlayerId, color: Color) -> Result<(), MatchError> {
        if self.phase != MatchPhase::Waiting {
            return Err(MatchError::AlreadyStarted);
        }
        let player = self.players.get_mut(&id).ok_or(MatchError::UnknownPlayer(id))?;
        player.color = color;
        Ok(())
    }

    /// Leave the lobby and start the first round.
    pub fn start_match(&mut self) -> Result<(), MatchError> {
        if self.phase != MatchPhase::Waiting {
            return Err(MatchError::AlreadyStarted);
        }
        if self.players.len() < MIN_PLAYERS {
            return Err(MatchError::NotEnoughPlayers(self.players.len()));
        }

        self.respawn_all();
        self.phase = MatchPhase::RoundActive;
        self.round = 1;
        info!("Match started with {} players", self.players.len());
        self.push_event(GameEvent::round_started(self.tick, self.round));
        Ok(())
    }

    /// Put every player back at their spawn corner with full health and ammo.
    pub fn respawn_all(&mut self) {
        for player in self.players.values_mut() {
            let spawn = player.scheme.spawn_point();
            player.respawn_at(spawn);
        }
    }

    /// Get player by ID.
    pub fn get_player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.get(id)
    }

    /// Get mutable player by ID.
    pub fn get_player_mut(&mut self, id: &PlayerId) -> Option<&mut PlayerState> {
        self.players.get_mut(id)
    }

    /// Number of players not dead.
    pub fn alive_count(&self) -> usize {
        self.players.values().filter(|p| !p.is_dead).count()
    }

    /// True once the match is decided.
    pub fn is_over(&self) -> bool {
        self.phase == MatchPhase::GameOver
    }

    /// Bullets in flight across every weapon.
    pub fn bullet_count(&self) -> usize {
        self.players.values().map(|p| p.weapon.bullets.len()).sum()
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Push a game event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }
}

// =============================================================================
// TESTS
// =============================================================================
