//! Level layouts, validation and spawning
//!
//! A level is plain data. Loading one validates it first, then replaces every
//! entity in the world except the player, who is moved to the start point.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{Entity, GamePhase, GameState, InputState, Rect, WasteCategory};

/// Problems with level data, caught at load time
#[derive(Debug, Clone, PartialEq)]
pub enum LevelError {
    /// Category index outside 0..=3
    InvalidCategory(u8),
    /// A level must have at least one box to sort
    NoBoxes,
    /// A level must have something to stand on
    NoPlatforms,
    /// Boxes of this category exist but no goal accepts them
    MissingGoal(WasteCategory),
    /// 0-based level index past the end of the set
    UnknownLevel(usize),
    EmptyLevelSet,
    /// Malformed level JSON
    Parse(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::InvalidCategory(c) => write!(f, "invalid waste category {}", c),
            LevelError::NoBoxes => write!(f, "level has no boxes"),
            LevelError::NoPlatforms => write!(f, "level has no platforms"),
            LevelError::MissingGoal(c) => write!(f, "no goal for {} boxes", c.name()),
            LevelError::UnknownLevel(i) => write!(f, "no level at index {}", i),
            LevelError::EmptyLevelSet => write!(f, "level set is empty"),
            LevelError::Parse(msg) => write!(f, "level parse error: {}", msg),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<serde_json::Error> for LevelError {
    fn from(e: serde_json::Error) -> Self {
        LevelError::Parse(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSpec {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Goal zone of fixed size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalSpec {
    pub category: u8,
    pub x: f32,
    pub y: f32,
}

/// Box spawn of fixed size; its glyph is picked at load time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSpawn {
    pub category: u8,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NpcSpawn {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignSpawn {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// One level's layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    #[serde(default)]
    pub name: String,
    pub player_start: Vec2,
    pub platforms: Vec<PlatformSpec>,
    pub goals: Vec<GoalSpec>,
    pub boxes: Vec<BoxSpawn>,
    #[serde(default)]
    pub npcs: Vec<NpcSpawn>,
    #[serde(default)]
    pub signs: Vec<SignSpawn>,
}

impl LevelConfig {
    /// Check the layout is loadable and winnable
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.platforms.is_empty() {
            return Err(LevelError::NoPlatforms);
        }
        if self.boxes.is_empty() {
            return Err(LevelError::NoBoxes);
        }

        let mut goal_categories = Vec::with_capacity(self.goals.len());
        for goal in &self.goals {
            goal_categories.push(WasteCategory::try_from(goal.category)?);
        }
        for spawn in &self.boxes {
            let category = WasteCategory::try_from(spawn.category)?;
            if !goal_categories.contains(&category) {
                return Err(LevelError::MissingGoal(category));
            }
        }
        Ok(())
    }

    /// Boxes per category at load time
    pub fn box_counts(&self) -> [u32; 4] {
        let mut counts = [0u32; 4];
        for spawn in &self.boxes {
            if let Some(category) = WasteCategory::from_index(spawn.category) {
                counts[category.index()] += 1;
            }
        }
        counts
    }
}

/// An ordered list of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub levels: Vec<LevelConfig>,
}

impl LevelSet {
    /// Parse and validate a level set from JSON
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let set: LevelSet = serde_json::from_str(json)?;
        if set.levels.is_empty() {
            return Err(LevelError::EmptyLevelSet);
        }
        for (i, level) in set.levels.iter().enumerate() {
            level.validate().inspect_err(|e| {
                log::warn!("Rejecting level {} ({}): {}", i + 1, level.name, e);
            })?;
        }
        Ok(set)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&LevelConfig, LevelError> {
        self.levels.get(index).ok_or(LevelError::UnknownLevel(index))
    }

    /// The five stock levels
    pub fn builtin() -> Self {
        Self {
            levels: vec![
                training_yard(),
                the_park(),
                urban_rooftops(),
                construction_site(),
                the_landfill(),
            ],
        }
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Replace the world with level `index` (0-based) of `levels`
///
/// The player keeps its identity and facing but is moved to the start point
/// with zero velocity. Timers, gesture state and terminal flags reset.
pub fn load_level(
    state: &mut GameState,
    levels: &LevelSet,
    index: usize,
    rng: &mut Pcg32,
) -> Result<(), LevelError> {
    let config = levels.get(index)?;
    config.validate().inspect_err(|e| {
        log::warn!("Refusing to load level {}: {}", index + 1, e);
    })?;

    let player = &mut state.player;
    player.rect.x = config.player_start.x;
    player.rect.y = config.player_start.y;
    player.vel = Vec2::ZERO;
    player.held_by = None;
    player.grounded = false;

    state.platforms = config
        .platforms
        .iter()
        .map(|p| Entity::platform(p.id.clone(), Rect::new(p.x, p.y, p.w, p.h)))
        .collect();

    state.goals = config
        .goals
        .iter()
        .filter_map(|g| WasteCategory::from_index(g.category).map(|c| Entity::goal(c, g.x, g.y)))
        .collect();

    state.boxes = config
        .boxes
        .iter()
        .enumerate()
        .filter_map(|(i, spawn)| {
            let category = WasteCategory::from_index(spawn.category)?;
            let glyphs = category.glyphs();
            let glyph = glyphs[rng.random_range(0..glyphs.len())];
            Some(Entity::waste_box(
                format!("b-{}-{}", index, i),
                category,
                spawn.x,
                spawn.y,
                glyph,
            ))
        })
        .collect();

    state.npcs = config
        .npcs
        .iter()
        .enumerate()
        .map(|(i, n)| Entity::npc(format!("npc-{}-{}", index, i), n.x, n.y))
        .collect();

    state.signs = config
        .signs
        .iter()
        .enumerate()
        .map(|(i, s)| Entity::sign(format!("sign-{}-{}", index, i), s.x, s.y, s.text.clone()))
        .collect();

    state.zone_progress = config.box_counts();
    state.level = index as u32 + 1;
    state.level_count = levels.len() as u32;
    state.phase = GamePhase::Playing;
    state.jump.reset();
    state.interact.reset();
    state.last_input = InputState::default();
    state.camera = Vec2::ZERO;
    state.time_ticks = 0;
    state.events.clear();

    log::info!(
        "Loaded level {} ({}): {} boxes, zones {:?}",
        state.level,
        config.name,
        state.boxes.len(),
        state.zone_progress
    );
    Ok(())
}

// --- Stock layouts ---

fn platform(id: &str, x: f32, y: f32, w: f32, h: f32) -> PlatformSpec {
    PlatformSpec {
        id: id.to_string(),
        x,
        y,
        w,
        h,
    }
}

fn goal(category: u8, x: f32, y: f32) -> GoalSpec {
    GoalSpec { category, x, y }
}

fn waste(category: u8, x: f32, y: f32) -> BoxSpawn {
    BoxSpawn { category, x, y }
}

fn npc(x: f32, y: f32) -> NpcSpawn {
    NpcSpawn { x, y }
}

/// One long floor slab, so walking never snags on tile seams
fn base_ground() -> PlatformSpec {
    platform("floor-main", -500.0, 600.0, 6000.0, 50.0)
}

fn training_yard() -> LevelConfig {
    LevelConfig {
        name: "Training Yard".to_string(),
        player_start: Vec2::new(100.0, 500.0),
        platforms: vec![
            base_ground(),
            platform("w1", -50.0, 0.0, 50.0, 800.0),
            platform("w2", 1500.0, 0.0, 50.0, 800.0),
        ],
        goals: vec![
            goal(0, 400.0, 500.0),
            goal(1, 600.0, 500.0),
            goal(2, 800.0, 500.0),
            goal(3, 1000.0, 500.0),
        ],
        boxes: vec![
            waste(0, 200.0, 500.0),
            waste(1, 250.0, 500.0),
            waste(2, 300.0, 500.0),
            waste(3, 350.0, 500.0),
        ],
        npcs: vec![npc(50.0, 500.0)],
        signs: Vec::new(),
    }
}

fn the_park() -> LevelConfig {
    LevelConfig {
        name: "The Park".to_string(),
        player_start: Vec2::new(100.0, 500.0),
        platforms: vec![
            base_ground(),
            platform("p1", 300.0, 450.0, 200.0, 20.0),
            platform("p2", 700.0, 350.0, 200.0, 20.0),
            platform("w1", -50.0, 0.0, 50.0, 800.0),
            platform("w2", 1600.0, 0.0, 50.0, 800.0),
        ],
        goals: vec![
            goal(2, 350.0, 350.0),
            goal(3, 750.0, 250.0),
            goal(0, 1200.0, 500.0),
            goal(1, 1400.0, 500.0),
        ],
        boxes: vec![
            waste(2, 200.0, 500.0),
            waste(2, 250.0, 500.0),
            waste(3, 600.0, 500.0),
            waste(3, 650.0, 500.0),
            waste(0, 500.0, 200.0),
            waste(1, 800.0, 200.0),
        ],
        npcs: vec![npc(50.0, 500.0)],
        signs: Vec::new(),
    }
}

fn urban_rooftops() -> LevelConfig {
    LevelConfig {
        name: "Urban Rooftops".to_string(),
        player_start: Vec2::new(100.0, 300.0),
        platforms: vec![
            platform("base", 0.0, 600.0, 400.0, 50.0),
            platform("gap1", 500.0, 500.0, 200.0, 50.0),
            platform("gap2", 800.0, 400.0, 200.0, 50.0),
            platform("tower", 1100.0, 600.0, 300.0, 50.0),
            platform("high1", 200.0, 250.0, 150.0, 20.0),
            platform("high2", 600.0, 200.0, 150.0, 20.0),
            platform("w1", -50.0, 0.0, 50.0, 800.0),
            platform("w2", 1500.0, 0.0, 50.0, 800.0),
        ],
        goals: vec![
            goal(0, 200.0, 150.0),
            goal(1, 600.0, 100.0),
            goal(2, 550.0, 400.0),
            goal(3, 1200.0, 500.0),
        ],
        boxes: vec![
            waste(0, 1250.0, 500.0),
            waste(0, 1300.0, 500.0),
            waste(1, 550.0, 400.0),
            waste(1, 600.0, 400.0),
            waste(2, 50.0, 500.0),
            waste(3, 100.0, 500.0),
        ],
        npcs: vec![npc(50.0, 300.0)],
        signs: Vec::new(),
    }
}

fn construction_site() -> LevelConfig {
    LevelConfig {
        name: "Construction Site".to_string(),
        player_start: Vec2::new(50.0, 500.0),
        platforms: vec![
            platform("floor", 0.0, 600.0, 2000.0, 50.0),
            platform("p1", 300.0, 450.0, 100.0, 20.0),
            platform("p2", 500.0, 350.0, 100.0, 20.0),
            platform("p3", 700.0, 250.0, 100.0, 20.0),
            platform("top", 800.0, 150.0, 400.0, 20.0),
            platform("cage", 900.0, 450.0, 200.0, 20.0),
            platform("w1", -50.0, 0.0, 50.0, 800.0),
            platform("w2", 2000.0, 0.0, 50.0, 800.0),
        ],
        goals: vec![
            goal(0, 900.0, 50.0),
            goal(1, 950.0, 350.0),
            goal(2, 100.0, 500.0),
            goal(3, 1600.0, 500.0),
        ],
        boxes: vec![
            waste(0, 1600.0, 500.0),
            waste(0, 1650.0, 500.0),
            waste(1, 320.0, 400.0),
            waste(1, 520.0, 300.0),
            waste(2, 1000.0, 100.0),
            waste(2, 1100.0, 100.0),
            waste(3, 100.0, 200.0),
        ],
        npcs: vec![npc(100.0, 500.0)],
        signs: Vec::new(),
    }
}

fn the_landfill() -> LevelConfig {
    LevelConfig {
        name: "The Landfill".to_string(),
        player_start: Vec2::new(1200.0, 200.0),
        platforms: vec![
            platform("g1", 0.0, 600.0, 600.0, 50.0),
            platform("pit", 600.0, 750.0, 400.0, 50.0),
            platform("g2", 1000.0, 600.0, 800.0, 50.0),
            platform("island1", 200.0, 400.0, 200.0, 20.0),
            platform("island2", 1400.0, 400.0, 200.0, 20.0),
            platform("bridge", 700.0, 300.0, 200.0, 20.0),
            platform("w1", -50.0, 0.0, 50.0, 800.0),
            platform("w2", 1800.0, 0.0, 50.0, 800.0),
        ],
        goals: vec![
            goal(0, 50.0, 500.0),
            goal(1, 1600.0, 500.0),
            goal(2, 250.0, 300.0),
            goal(3, 1450.0, 300.0),
        ],
        boxes: vec![
            waste(0, 1600.0, 300.0),
            waste(0, 1650.0, 300.0),
            waste(1, 100.0, 300.0),
            waste(1, 150.0, 300.0),
            waste(2, 750.0, 250.0),
            waste(2, 800.0, 250.0),
            waste(3, 700.0, 700.0),
            waste(3, 750.0, 700.0),
        ],
        npcs: vec![npc(1100.0, 200.0)],
        signs: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use rand::SeedableRng;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_builtin_levels_are_valid() {
        let levels = LevelSet::builtin();
        assert_eq!(levels.len(), 5);
        for level in &levels.levels {
            level.validate().unwrap();
        }
    }

    #[test]
    fn test_load_training_yard() {
        let mut state = GameState::new(Tuning::default());
        load_level(&mut state, &LevelSet::builtin(), 0, &mut rng()).unwrap();

        assert_eq!(state.level, 1);
        assert_eq!(state.level_count, 5);
        assert_eq!(state.player.rect.x, 100.0);
        assert_eq!(state.player.rect.y, 500.0);
        assert_eq!(state.platforms.len(), 3);
        assert_eq!(state.goals.len(), 4);
        assert_eq!(state.npcs[0].id, "npc-0-0");
        assert_eq!(state.zone_progress, [1, 1, 1, 1]);

        let first = &state.boxes[0];
        assert_eq!(first.id, "b-0-0");
        assert_eq!(first.category, Some(WasteCategory::Hazardous));
        assert_eq!((first.rect.w, first.rect.h), (40.0, 40.0));
        let glyph = first.content.as_deref().unwrap();
        assert!(WasteCategory::Hazardous.glyphs().contains(&glyph));
    }

    #[test]
    fn test_same_seed_same_glyphs() {
        let levels = LevelSet::builtin();
        let mut a = GameState::new(Tuning::default());
        let mut b = GameState::new(Tuning::default());
        load_level(&mut a, &levels, 4, &mut rng()).unwrap();
        load_level(&mut b, &levels, 4, &mut rng()).unwrap();
        assert_eq!(a.boxes, b.boxes);
    }

    #[test]
    fn test_reload_resets_progress_and_timers() {
        let levels = LevelSet::builtin();
        let mut state = GameState::new(Tuning::default());
        load_level(&mut state, &levels, 1, &mut rng()).unwrap();
        state.boxes.clear();
        state.phase = GamePhase::LevelComplete;
        state.jump.buffer = 5;
        state.player.vel = Vec2::new(3.0, 4.0);

        load_level(&mut state, &levels, 1, &mut rng()).unwrap();
        assert_eq!(state.boxes.len(), 6);
        assert_eq!(state.zone_progress, [1, 1, 2, 2]);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.jump.buffer, 0);
        assert_eq!(state.player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_unknown_level_index() {
        let mut state = GameState::new(Tuning::default());
        let err = load_level(&mut state, &LevelSet::builtin(), 9, &mut rng()).unwrap_err();
        assert_eq!(err, LevelError::UnknownLevel(9));
    }

    #[test]
    fn test_validation_rejects_bad_levels() {
        let mut level = training_yard();
        level.boxes.push(waste(7, 0.0, 0.0));
        assert_eq!(level.validate(), Err(LevelError::InvalidCategory(7)));

        let mut level = training_yard();
        level.goals.retain(|g| g.category != 2);
        assert_eq!(
            level.validate(),
            Err(LevelError::MissingGoal(WasteCategory::Organic))
        );

        let mut level = training_yard();
        level.boxes.clear();
        assert_eq!(level.validate(), Err(LevelError::NoBoxes));

        let mut level = training_yard();
        level.platforms.clear();
        assert_eq!(level.validate(), Err(LevelError::NoPlatforms));
    }

    #[test]
    fn test_level_set_json() {
        let json = r#"{
            "levels": [{
                "name": "Tiny",
                "player_start": [10.0, 20.0],
                "platforms": [{ "id": "floor", "x": 0, "y": 100, "w": 500, "h": 20 }],
                "goals": [{ "category": 3, "x": 300, "y": 0 }],
                "boxes": [{ "category": 3, "x": 50, "y": 60 }],
                "signs": [{ "x": 80, "y": 60, "text": "Rinse bottles first" }]
            }]
        }"#;
        let set = LevelSet::from_json(json).unwrap();
        assert_eq!(set.levels[0].player_start, Vec2::new(10.0, 20.0));
        assert!(set.levels[0].npcs.is_empty());

        let mut state = GameState::new(Tuning::default());
        load_level(&mut state, &set, 0, &mut rng()).unwrap();
        assert_eq!(state.signs[0].content.as_deref(), Some("Rinse bottles first"));
        assert_eq!(state.zone_progress, [0, 0, 0, 1]);

        let bad = json.replace("\"category\": 3, \"x\": 50", "\"category\": 4, \"x\": 50");
        assert_eq!(
            LevelSet::from_json(&bad),
            Err(LevelError::InvalidCategory(4))
        );
        assert!(matches!(
            LevelSet::from_json("{\"levels\": []}"),
            Err(LevelError::EmptyLevelSet)
        ));
        assert!(matches!(
            LevelSet::from_json("nope"),
            Err(LevelError::Parse(_))
        ));
    }
}
