//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, driven by `tick`
//! - Host-supplied timestamps only (no clock reads)
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod interact;
pub mod physics;
pub mod progress;
pub mod rect;
pub mod state;
pub mod tick;
pub mod timers;

pub use collision::{Response, VerticalHit};
pub use rect::{Rect, overlaps};
pub use state::{
    Entity, EntityId, EntityKind, GamePhase, GameState, PLAYER_ID, SimEvent, Status,
    WasteCategory,
};
pub use tick::{InputState, TickInput, tick};
pub use timers::{InteractGesture, JumpTimers, ReleaseAction, classify_hold};
