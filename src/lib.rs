//! Waste Sorter - a side-scrolling platformer about sorting waste
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (physics, collisions, interaction, progress)
//! - `level`: Level layouts, load-time validation and spawning
//! - `settings`: Tunable constants and session settings
//! - `narrative`: Dialogue/description lookups, dispatched off the simulation loop
//! - `session`: Host-side glue (input buffering, level commands, dialogue slot)

pub mod level;
pub mod narrative;
pub mod session;
pub mod settings;
pub mod sim;

pub use level::{LevelConfig, LevelError, LevelSet};
pub use session::Session;
pub use settings::{Settings, Tuning};

/// Game configuration constants
///
/// Units are world pixels and simulation frames; y grows downward.
pub mod consts {
    /// Downward acceleration added to every falling body each frame
    pub const GRAVITY: f32 = 0.6;
    /// Horizontal velocity multiplier while grounded
    pub const GROUND_FRICTION: f32 = 0.85;
    /// Horizontal velocity multiplier while airborne (weaker damping)
    pub const AIR_FRICTION: f32 = 0.95;

    /// Run profile (down or run held)
    pub const RUN_SPEED: f32 = 9.0;
    pub const RUN_ACCEL: f32 = 0.8;
    /// Walk profile is 26% slower than running
    pub const WALK_SPEED: f32 = RUN_SPEED * 0.74;
    pub const WALK_ACCEL: f32 = RUN_ACCEL * 0.74;

    /// Upward impulse applied on jump (negative = up)
    pub const JUMP_FORCE: f32 = -15.0;
    /// Upward speed clamp when jump is released early (short hop)
    pub const JUMP_CUTOFF: f32 = -3.0;
    pub const COYOTE_FRAMES: u32 = 8;
    pub const JUMP_BUFFER_FRAMES: u32 = 8;

    /// Throw impulse
    pub const THROW_FORCE_X: f32 = 12.0;
    pub const THROW_FORCE_Y: f32 = -6.0;
    /// Thrown boxes spawn this far above the player's top edge
    pub const THROW_LIFT: f32 = 10.0;
    /// Gap between player and a placed box
    pub const PLACE_GAP: f32 = 5.0;
    /// Releases shorter than this place the box, anything longer throws it
    pub const HOLD_THRESHOLD_MS: f64 = 250.0;

    /// Free box horizontal drag (per frame)
    pub const BOX_DRAG: f32 = 0.9;
    /// Velocity multiplier on a horizontal box impact (reverse + damp)
    pub const BOX_BOUNCE: f32 = -0.5;
    /// Horizontal velocity multiplier when a box lands on something
    pub const BOX_LANDING_FRICTION: f32 = 0.9;

    /// Interaction radii (center to center)
    pub const TALK_RADIUS: f32 = 80.0;
    pub const GRAB_REACH: f32 = 60.0;
    pub const INSPECT_RADIUS: f32 = 150.0;

    /// Viewport
    pub const CANVAS_WIDTH: f32 = 1200.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;
    /// Falling this far below the canvas ends the run
    pub const FALL_MARGIN: f32 = 200.0;
    /// Camera low-pass gain per frame
    pub const CAMERA_GAIN: f32 = 0.1;

    /// Entity sizes
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    pub const BOX_SIZE: f32 = 40.0;
    pub const NPC_WIDTH: f32 = 40.0;
    pub const NPC_HEIGHT: f32 = 60.0;
    pub const SIGN_SIZE: f32 = 40.0;
    pub const GOAL_WIDTH: f32 = 120.0;
    pub const GOAL_HEIGHT: f32 = 100.0;

    /// Above this horizontal speed a running player shows speed lines
    pub const SPRINT_INDICATOR_SPEED: f32 = 3.0;
}
