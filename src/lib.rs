//! # Gundown
//!
//! Simulation core for Gundown, a local multiplayer 2D arena shooter for
//! two or three players on one screen.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         GUNDOWN                              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Geometry and shared primitives            │
//! │  ├── vec2.rs     - 2D vector, angles in degrees (+Y down)    │
//! │  ├── rect.rs     - Axis-aligned rectangles                   │
//! │  ├── rng.rs      - Seeded Xorshift128+ for draft offers      │
//! │  └── tuning.rs   - Gameplay constants                        │
//! │                                                              │
//! │  config.rs       - MatchConfig (JSON overrides)              │
//! │                                                              │
//! │  game/           - Match simulation                          │
//! │  ├── input.rs    - Mouse / gamepad frames, intent            │
//! │  ├── map.rs      - Arena objects, physics blocks             │
//! │  ├── player.rs   - Movement, jump, latch, shield             │
//! │  ├── weapon.rs   - Archetypes, fire, reload                  │
//! │  ├── projectile.rs - Bullets, bounces, detonations           │
//! │  ├── ability.rs  - Modifier cards                            │
//! │  ├── round.rs    - Scoring, draft, respawn                   │
//! │  └── tick.rs     - The fixed simulation step                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering, audio and device polling live outside this crate. The host
//! feeds one [`InputFrame`] per player into [`tick`] and presents the
//! returned events.
//!
//! ## Determinism
//!
//! Players are stored in a `BTreeMap` and updated in id order. The only
//! randomness is the seeded draft RNG, so the same inputs and seed replay
//! to the same match.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod game;

// Re-export commonly used types
pub use crate::config::{ConfigError, MatchConfig};
pub use crate::core::rect::Rect;
pub use crate::core::rng::DeterministicRng;
pub use crate::core::vec2::Vec2;
pub use crate::game::input::InputFrame;
pub use crate::game::map::Map;
pub use crate::game::round::{DraftScreen, FirstCardDraft};
pub use crate::game::state::{MatchState, PlayerId, PlayerState};
pub use crate::game::tick::{tick, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tick rate (Hz)
pub const TICK_RATE: u32 = 60;
