//! Game state and core simulation types
//!
//! Everything the per-frame simulation reads or writes lives in `GameState`,
//! which is handed to each step by exclusive reference.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rect::Rect;
use super::tick::InputState;
use super::timers::{InteractGesture, JumpTimers};
use crate::consts::*;
use crate::level::LevelError;
use crate::settings::Tuning;

/// Stable entity identifier (`player`, `b-0-3`, `npc-1-0`, ...)
pub type EntityId = String;

/// Id of the single player entity
pub const PLAYER_ID: &str = "player";

/// The four waste classes, each with its own bin color and goal zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WasteCategory {
    Hazardous = 0,
    General = 1,
    Organic = 2,
    Recycle = 3,
}

impl WasteCategory {
    pub const ALL: [WasteCategory; 4] = [
        WasteCategory::Hazardous,
        WasteCategory::General,
        WasteCategory::Organic,
        WasteCategory::Recycle,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            WasteCategory::Hazardous => "Hazardous",
            WasteCategory::General => "General",
            WasteCategory::Organic => "Organic",
            WasteCategory::Recycle => "Recycle",
        }
    }

    /// Bin color (0xRRGGBBAA)
    pub fn color(self) -> u32 {
        match self {
            WasteCategory::Hazardous => 0xef4444ff, // red
            WasteCategory::General => 0x3b82f6ff,   // blue
            WasteCategory::Organic => 0x22c55eff,   // green
            WasteCategory::Recycle => 0xeab308ff,   // yellow
        }
    }

    /// Goal zone tint: the bin color at 20% alpha
    pub fn goal_color(self) -> u32 {
        (self.color() & 0xffffff00) | 0x33
    }

    /// Glyphs a box of this category may be drawn with
    pub fn glyphs(self) -> &'static [&'static str] {
        match self {
            WasteCategory::Hazardous => &["☣️", "🔋", "💉", "🧪", "☠️"],
            WasteCategory::General => &["🥡", "🧻", "🥢", "🍬", "🚬"],
            WasteCategory::Organic => &["🍎", "🍌", "🦴", "🥬", "🐟"],
            WasteCategory::Recycle => &["🥤", "📰", "📦", "🍾", "🥫"],
        }
    }
}

impl TryFrom<u8> for WasteCategory {
    type Error = LevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_index(value).ok_or(LevelError::InvalidCategory(value))
    }
}

impl From<WasteCategory> for u8 {
    fn from(category: WasteCategory) -> Self {
        category as u8
    }
}

/// Entity category tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Platform,
    Box,
    Goal,
    Npc,
    Sign,
}

/// Display colors for non-waste entities (0xRRGGBBAA)
pub mod colors {
    pub const PLAYER: u32 = 0x6366f1ff;
    pub const NPC: u32 = 0xf59e0bff;
    pub const GROUND: u32 = 0x334155ff;
    pub const SIGN: u32 = 0x92400eff;
}

/// A game object
///
/// All kinds share one shape; fields that do not apply to a kind stay at
/// their neutral value (zero velocity, no category, no holder).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub rect: Rect,
    pub vel: Vec2,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub grounded: bool,
    /// Id of the entity carrying this one (boxes only)
    #[serde(default)]
    pub held_by: Option<EntityId>,
    /// Waste category (boxes and goals), fixed at spawn
    #[serde(default)]
    pub category: Option<WasteCategory>,
    /// Glyph for boxes, text for signs
    #[serde(default)]
    pub content: Option<String>,
    pub color: u32,
}

impl Entity {
    fn base(id: impl Into<EntityId>, kind: EntityKind, rect: Rect, color: u32) -> Self {
        Self {
            id: id.into(),
            kind,
            rect,
            vel: Vec2::ZERO,
            facing: 1.0,
            grounded: false,
            held_by: None,
            category: None,
            content: None,
            color,
        }
    }

    pub fn player() -> Self {
        Self::base(
            PLAYER_ID,
            EntityKind::Player,
            Rect::new(0.0, 0.0, PLAYER_WIDTH, PLAYER_HEIGHT),
            colors::PLAYER,
        )
    }

    pub fn platform(id: impl Into<EntityId>, rect: Rect) -> Self {
        let mut platform = Self::base(id, EntityKind::Platform, rect, colors::GROUND);
        platform.grounded = true;
        platform
    }

    pub fn goal(category: WasteCategory, x: f32, y: f32) -> Self {
        let mut goal = Self::base(
            format!("g-{}", category.index()),
            EntityKind::Goal,
            Rect::new(x, y, GOAL_WIDTH, GOAL_HEIGHT),
            category.goal_color(),
        );
        goal.category = Some(category);
        goal.grounded = true;
        goal
    }

    pub fn waste_box(
        id: impl Into<EntityId>,
        category: WasteCategory,
        x: f32,
        y: f32,
        glyph: &str,
    ) -> Self {
        let mut waste = Self::base(
            id,
            EntityKind::Box,
            Rect::new(x, y, BOX_SIZE, BOX_SIZE),
            category.color(),
        );
        waste.category = Some(category);
        waste.content = Some(glyph.to_string());
        waste
    }

    pub fn npc(id: impl Into<EntityId>, x: f32, y: f32) -> Self {
        let mut npc = Self::base(
            id,
            EntityKind::Npc,
            Rect::new(x, y, NPC_WIDTH, NPC_HEIGHT),
            colors::NPC,
        );
        npc.grounded = true;
        npc
    }

    pub fn sign(id: impl Into<EntityId>, x: f32, y: f32, text: impl Into<String>) -> Self {
        let mut sign = Self::base(
            id,
            EntityKind::Sign,
            Rect::new(x, y, SIGN_SIZE, SIGN_SIZE),
            colors::SIGN,
        );
        sign.content = Some(text.into());
        sign.grounded = true;
        sign
    }

    /// Not carried by anyone
    #[inline]
    pub fn is_free(&self) -> bool {
        self.held_by.is_none()
    }

    #[inline]
    pub fn is_held_by(&self, holder: &str) -> bool {
        self.held_by.as_deref() == Some(holder)
    }
}

/// Current phase of play; the terminal phases are mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    Playing,
    /// Every box of the level has been delivered
    LevelComplete,
    /// The last level was advanced past
    GameComplete,
    /// The player fell out of the world
    GameOver,
}

impl GamePhase {
    /// Terminal phases freeze the simulation until a level command
    pub fn is_terminal(self) -> bool {
        self != GamePhase::Playing
    }
}

/// Things the simulation reports to its collaborators during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Boxes were delivered; remaining counts per category
    ProgressChanged([u32; 4]),
    LevelComplete,
    GameOver,
    Grabbed { box_id: EntityId },
    Placed { box_id: EntityId },
    Thrown { box_id: EntityId },
    TalkToNpc { npc_id: EntityId },
    ReadSign { sign_id: EntityId, text: String },
    Inspect { box_id: EntityId, category: WasteCategory },
    NothingToInspect,
}

/// Read-only summary for the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Status {
    /// 1-based level number
    pub level: u32,
    pub level_count: u32,
    pub zone_progress: [u32; 4],
    pub level_complete: bool,
    pub game_complete: bool,
    pub game_over: bool,
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Physics constants in effect
    pub tuning: Tuning,
    pub player: Entity,
    pub platforms: Vec<Entity>,
    /// Iteration order decides box-vs-box resolution order
    pub boxes: Vec<Entity>,
    pub goals: Vec<Entity>,
    pub npcs: Vec<Entity>,
    pub signs: Vec<Entity>,
    /// Smoothed camera offset
    pub camera: Vec2,
    /// Current level (1-based, 0 before the first load)
    pub level: u32,
    pub level_count: u32,
    pub phase: GamePhase,
    /// Undelivered boxes per category
    pub zone_progress: [u32; 4],
    pub jump: JumpTimers,
    pub interact: InteractGesture,
    /// Held buttons as of the previous tick (for edge detection)
    pub last_input: InputState,
    /// Simulation tick counter (ticks advanced in the current level)
    pub time_ticks: u64,
    /// Outbound notifications, drained by the host each frame
    #[serde(skip)]
    pub events: Vec<SimEvent>,
}

impl GameState {
    /// Empty world with the player at the origin; load a level before ticking
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            player: Entity::player(),
            platforms: Vec::new(),
            boxes: Vec::new(),
            goals: Vec::new(),
            npcs: Vec::new(),
            signs: Vec::new(),
            camera: Vec2::ZERO,
            level: 0,
            level_count: 0,
            phase: GamePhase::Playing,
            zone_progress: [0; 4],
            jump: JumpTimers::default(),
            interact: InteractGesture::default(),
            last_input: InputState::default(),
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Index of the box the player is carrying
    pub fn held_box_index(&self) -> Option<usize> {
        self.boxes.iter().position(|b| b.is_held_by(&self.player.id))
    }

    pub fn held_box(&self) -> Option<&Entity> {
        self.held_box_index().map(|i| &self.boxes[i])
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn status(&self) -> Status {
        Status {
            level: self.level,
            level_count: self.level_count,
            zone_progress: self.zone_progress,
            level_complete: self.phase == GamePhase::LevelComplete,
            game_complete: self.phase == GamePhase::GameComplete,
            game_over: self.phase == GamePhase::GameOver,
        }
    }

    /// Throw charge in 0..=1 while a carried box is being wound up
    ///
    /// `None` unless interact is held, a box is carried and the press was
    /// not spent on grabbing it. Reaches 1.0 at the throw threshold.
    pub fn throw_charge(&self, now_ms: f64) -> Option<f32> {
        if !self.last_input.interact || self.interact.consumed || self.held_box_index().is_none() {
            return None;
        }
        Some(self.interact.charge(now_ms, self.tuning.hold_threshold_ms))
    }

    /// Run modifier held while moving fast (drives the speed-lines effect)
    pub fn is_sprinting(&self) -> bool {
        (self.last_input.down || self.last_input.run)
            && self.player.vel.x.abs() > SPRINT_INDICATOR_SPEED
    }
}
