//! Game Logic Module
//!
//! Everything that runs inside one match.
//!
//! ## Module Structure
//!
//! - `input`: Device frames and their scheme-independent intent
//! - `map`: Arena objects, physics blocks, detonation
//! - `collision`: Bounding traits and axis clamping
//! - `state`: Match state, player state, colors
//! - `player`: Per-tick player update (move, jump, latch, shield, fire)
//! - `weapon`: Archetypes, fire rate, magazine, reload
//! - `projectile`: Bullet flight, bounces, hits, bursts
//! - `ability`: Modifier cards and the stock deck
//! - `round`: Deaths, scoring, draft, respawn
//! - `tick`: The simulation step
//! - `events`: Presentation cues

pub mod ability;
pub mod collision;
pub mod events;
pub mod input;
pub mod map;
pub mod player;
pub mod projectile;
pub mod round;
pub mod state;
pub mod tick;
pub mod weapon;

// Re-export key types
pub use ability::{AbilityCard, Modifier, ModifierKind};
pub use events::{GameEvent, GameEventData};
pub use input::{AimInput, GamepadFrame, InputFrame, MouseFrame, PlayerIntent};
pub use map::{CollisionType, Map, MapObject};
pub use projectile::Bullet;
pub use round::{DraftContext, DraftScreen, FirstCardDraft};
pub use state::{Color, ControlScheme, MatchError, MatchPhase, MatchState, PlayerId, PlayerState};
pub use tick::{tick, TickResult};
pub use weapon::{Weapon, WeaponArchetype};
