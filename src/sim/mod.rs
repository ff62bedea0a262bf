//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One fixed tick per frame
//! - Seeded RNG only
//! - Stable iteration order (obstacles kept in spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod expiry;
pub mod input;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, avatar_bounds};
pub use expiry::{ExpiryEntry, ExpiryQueue};
pub use input::Key;
pub use state::{FrameReport, GameState, MessageState, Obstacle, Session};
pub use tick::tick;
