//! Game settings and physics tuning
//!
//! Stored as JSON; any field missing from the file keeps its default, so a
//! settings file only needs the values it overrides.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Physics and interaction constants used by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player movement ===
    pub gravity: f32,
    pub ground_friction: f32,
    pub air_friction: f32,
    pub walk_speed: f32,
    pub walk_accel: f32,
    pub run_speed: f32,
    pub run_accel: f32,

    // === Jumping ===
    pub jump_force: f32,
    pub jump_cutoff: f32,
    pub coyote_frames: u32,
    pub jump_buffer_frames: u32,

    // === Carrying ===
    pub throw_force_x: f32,
    pub throw_force_y: f32,
    pub throw_lift: f32,
    pub place_gap: f32,
    pub hold_threshold_ms: f64,

    // === Boxes ===
    pub box_drag: f32,
    pub box_bounce: f32,
    pub box_landing_friction: f32,

    // === Reach ===
    pub talk_radius: f32,
    pub grab_reach: f32,
    pub inspect_radius: f32,

    // === World ===
    pub canvas_height: f32,
    pub fall_margin: f32,
    pub camera_gain: f32,
    /// Width of the visible area; the camera keeps the player centered in it
    pub viewport_width: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            ground_friction: GROUND_FRICTION,
            air_friction: AIR_FRICTION,
            walk_speed: WALK_SPEED,
            walk_accel: WALK_ACCEL,
            run_speed: RUN_SPEED,
            run_accel: RUN_ACCEL,

            jump_force: JUMP_FORCE,
            jump_cutoff: JUMP_CUTOFF,
            coyote_frames: COYOTE_FRAMES,
            jump_buffer_frames: JUMP_BUFFER_FRAMES,

            throw_force_x: THROW_FORCE_X,
            throw_force_y: THROW_FORCE_Y,
            throw_lift: THROW_LIFT,
            place_gap: PLACE_GAP,
            hold_threshold_ms: HOLD_THRESHOLD_MS,

            box_drag: BOX_DRAG,
            box_bounce: BOX_BOUNCE,
            box_landing_friction: BOX_LANDING_FRICTION,

            talk_radius: TALK_RADIUS,
            grab_reach: GRAB_REACH,
            inspect_radius: INSPECT_RADIUS,

            canvas_height: CANVAS_HEIGHT,
            fall_margin: FALL_MARGIN,
            camera_gain: CAMERA_GAIN,
            viewport_width: CANVAS_WIDTH,
        }
    }
}

impl Tuning {
    /// Max speed and acceleration for the current run modifier
    #[inline]
    pub fn move_profile(&self, running: bool) -> (f32, f32) {
        if running {
            (self.run_speed, self.run_accel)
        } else {
            (self.walk_speed, self.walk_accel)
        }
    }

    /// Player y beyond which the run is lost
    #[inline]
    pub fn kill_plane(&self) -> f32 {
        self.canvas_height + self.fall_margin
    }
}

/// Failure reading or writing a settings file
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings I/O error: {}", e),
            SettingsError::Json(e) => write!(f, "settings JSON error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,
    /// Seed for box glyph selection
    pub seed: u64,
    /// 1-based level to start on
    pub start_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            seed: 0x5eed,
            start_level: 1,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Load settings, falling back to defaults if the file is missing or bad
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!(
                    "Using default settings ({}: {})",
                    path.as_ref().display(),
                    e
                );
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}
