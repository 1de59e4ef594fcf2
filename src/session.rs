//! Host-side game session
//!
//! Owns the simulation state and everything around it that is not physics:
//! keyboard buffering, level transitions, the dialogue slot and the narrative
//! desk. A host calls `key_down`/`key_up` whenever input arrives and `step`
//! once per displayed frame.

use std::sync::Arc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::level::{LevelError, LevelSet, load_level};
use crate::narrative::{
    Dispatch, NOTHING_NEARBY, NarrativeDesk, Narrator, SIGN_TITLE, StaticNarrator, Topic,
};
use crate::settings::Settings;
use crate::sim::{GamePhase, GameState, InputState, SimEvent, Status, TickInput, tick};

/// Held-state inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
    Jump,
    Down,
    Run,
    Interact,
    Talk,
    Inspect,
}

/// One-shot session commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    NextLevel,
    ResetLevel,
    CloseDialogue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Button(Button),
    Command(Command),
}

/// Map a browser-style key code (`KeyboardEvent.code`) to an action
pub fn map_key(code: &str) -> Option<KeyAction> {
    let action = match code {
        "ArrowLeft" | "KeyA" => KeyAction::Button(Button::Left),
        "ArrowRight" | "KeyD" => KeyAction::Button(Button::Right),
        "ArrowUp" | "Space" => KeyAction::Button(Button::Jump),
        "ArrowDown" | "KeyS" => KeyAction::Button(Button::Down),
        "ShiftLeft" | "ShiftRight" => KeyAction::Button(Button::Run),
        "KeyE" => KeyAction::Button(Button::Interact),
        "KeyF" => KeyAction::Button(Button::Talk),
        "KeyI" => KeyAction::Button(Button::Inspect),
        "KeyR" => KeyAction::Command(Command::ResetLevel),
        _ => return None,
    };
    Some(action)
}

/// Input accumulated between frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputBuffer {
    held: InputState,
    jump_latch: bool,
}

impl InputBuffer {
    pub fn press(&mut self, button: Button) {
        // Key repeat must not re-arm the jump
        if button == Button::Jump && !self.held.up {
            self.jump_latch = true;
        }
        self.set(button, true);
    }

    pub fn release(&mut self, button: Button) {
        self.set(button, false);
    }

    pub fn held(&self) -> InputState {
        self.held
    }

    /// Snapshot for one tick; clears the jump latch
    pub fn take_tick_input(&mut self, now_ms: f64) -> TickInput {
        TickInput {
            held: self.held,
            jump_requested: std::mem::take(&mut self.jump_latch),
            now_ms,
        }
    }

    fn set(&mut self, button: Button, down: bool) {
        let held = &mut self.held;
        let slot = match button {
            Button::Left => &mut held.left,
            Button::Right => &mut held.right,
            Button::Jump => &mut held.up,
            Button::Down => &mut held.down,
            Button::Run => &mut held.run,
            Button::Interact => &mut held.interact,
            Button::Talk => &mut held.talk,
            Button::Inspect => &mut held.inspect,
        };
        *slot = down;
    }
}

/// The on-screen dialogue box
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dialogue {
    pub visible: bool,
    /// A lookup is in flight; `text` is stale
    pub loading: bool,
    pub title: Option<String>,
    pub text: String,
}

impl Dialogue {
    fn show(&mut self, title: Option<String>, text: impl Into<String>) {
        self.visible = true;
        self.loading = false;
        self.title = title;
        self.text = text.into();
    }

    fn wait(&mut self, title: &str) {
        self.visible = true;
        self.loading = true;
        self.title = Some(title.to_string());
    }

    fn close(&mut self) {
        self.visible = false;
        self.loading = false;
    }
}

/// A running game
pub struct Session {
    state: GameState,
    levels: LevelSet,
    rng: Pcg32,
    input: InputBuffer,
    /// Command keys currently down, so key repeat fires a command once
    commands_down: Vec<Command>,
    desk: NarrativeDesk,
    dialogue: Dialogue,
    published: Status,
}

impl Session {
    /// Start a session on `settings.start_level`
    pub fn new(
        settings: &Settings,
        levels: LevelSet,
        narrator: Arc<dyn Narrator>,
        dispatch: Dispatch,
    ) -> Result<Self, LevelError> {
        let mut session = Self {
            state: GameState::new(settings.tuning),
            levels,
            rng: Pcg32::seed_from_u64(settings.seed),
            input: InputBuffer::default(),
            commands_down: Vec::new(),
            desk: NarrativeDesk::new(narrator, dispatch),
            dialogue: Dialogue::default(),
            published: Status::default(),
        };
        session.load(settings.start_level.saturating_sub(1) as usize)?;
        Ok(session)
    }

    /// Built-in levels with the static narrator, resolved inline
    pub fn with_builtin_levels(settings: &Settings) -> Result<Self, LevelError> {
        Self::new(
            settings,
            LevelSet::builtin(),
            Arc::new(StaticNarrator),
            Dispatch::Inline,
        )
    }

    pub fn key_down(&mut self, code: &str) {
        match map_key(code) {
            Some(KeyAction::Button(button)) => self.input.press(button),
            Some(KeyAction::Command(command)) => {
                if self.commands_down.contains(&command) {
                    return;
                }
                self.commands_down.push(command);
                if let Err(e) = self.command(command) {
                    log::warn!("{:?} failed: {}", command, e);
                }
            }
            None => {}
        }
    }

    pub fn key_up(&mut self, code: &str) {
        match map_key(code) {
            Some(KeyAction::Button(button)) => self.input.release(button),
            Some(KeyAction::Command(command)) => self.commands_down.retain(|&c| c != command),
            None => {}
        }
    }

    pub fn press(&mut self, button: Button) {
        self.input.press(button);
    }

    pub fn release(&mut self, button: Button) {
        self.input.release(button);
    }

    pub fn command(&mut self, command: Command) -> Result<(), LevelError> {
        match command {
            Command::NextLevel => self.next_level(),
            Command::ResetLevel => self.reset_level(),
            Command::CloseDialogue => {
                self.close_dialogue();
                Ok(())
            }
        }
    }

    /// Advance one frame and return what happened in it
    pub fn step(&mut self, now_ms: f64) -> Vec<SimEvent> {
        let input = self.input.take_tick_input(now_ms);
        tick(&mut self.state, &input);

        let events = self.state.drain_events();
        for event in &events {
            self.dispatch(event);
        }
        if let Some(narration) = self.desk.poll() {
            self.dialogue.show(Some(narration.title), narration.body);
        }
        self.publish();
        events
    }

    /// Load the level after the current one, or finish the game after the last
    pub fn next_level(&mut self) -> Result<(), LevelError> {
        let next = self.state.level as usize;
        if next < self.levels.len() {
            log::info!("Advancing to level {}", next + 1);
            self.load(next)
        } else {
            log::info!("All {} levels cleared", self.levels.len());
            self.state.phase = GamePhase::GameComplete;
            self.publish();
            Ok(())
        }
    }

    /// Reload the current level from its layout
    pub fn reset_level(&mut self) -> Result<(), LevelError> {
        log::info!("Resetting level {}", self.state.level);
        self.load(self.state.level.saturating_sub(1) as usize)
    }

    /// Hide the dialogue; an answer still in flight will not reopen it
    pub fn close_dialogue(&mut self) {
        self.desk.supersede();
        self.dialogue.close();
    }

    pub fn status(&self) -> Status {
        self.published
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn dialogue(&self) -> &Dialogue {
        &self.dialogue
    }

    /// Name of the level being played
    pub fn level_name(&self) -> &str {
        self.levels
            .get(self.state.level.saturating_sub(1) as usize)
            .map(|l| l.name.as_str())
            .unwrap_or("")
    }

    fn load(&mut self, index: usize) -> Result<(), LevelError> {
        load_level(&mut self.state, &self.levels, index, &mut self.rng)?;
        // Keys still down across the load are not fresh presses
        self.state.last_input = self.input.held();
        self.close_dialogue();
        self.publish();
        Ok(())
    }

    fn dispatch(&mut self, event: &SimEvent) {
        match event {
            SimEvent::TalkToNpc { npc_id } => {
                log::debug!("Dialogue with {}", npc_id);
                self.ask(Topic::Villager);
            }
            SimEvent::Inspect { category, .. } => self.ask(Topic::Waste(*category)),
            SimEvent::ReadSign { text, .. } => {
                self.desk.supersede();
                self.dialogue.show(Some(SIGN_TITLE.to_string()), text.as_str());
            }
            SimEvent::NothingToInspect => {
                self.desk.supersede();
                self.dialogue.show(None, NOTHING_NEARBY);
            }
            _ => {}
        }
    }

    fn ask(&mut self, topic: Topic) {
        self.dialogue.wait(topic.loading_title());
        self.desk.request(topic);
    }

    fn publish(&mut self) {
        let status = self.state.status();
        if status != self.published {
            log::debug!("Status changed: {:?}", status);
            self.published = status;
        }
    }
}
