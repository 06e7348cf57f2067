//! Core primitives.
//!
//! Geometry, tuning constants and the seeded RNG the simulation is built on.

pub mod vec2;
pub mod rect;
pub mod rng;
pub mod tuning;

// Re-export core types
pub use vec2::Vec2;
pub use rect::{Rect, intersects};
pub use rng::DeterministicRng;
