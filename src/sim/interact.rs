//! Talk, grab/place/throw and inspect gestures
//!
//! All gestures are edge-triggered against the previous tick's held buttons.
//! Outcomes that concern the outside world (dialogue, descriptions) are
//! reported as `SimEvent`s; the arbiter itself never waits on anything.

use glam::Vec2;

use super::rect::{Rect, overlaps};
use super::state::{Entity, GameState, SimEvent};
use super::tick::TickInput;
use super::timers::ReleaseAction;

/// Index of the candidate whose center is closest to `origin`, strictly within `radius`
///
/// Ties go to the earliest candidate.
pub fn nearest<'a>(
    origin: &Rect,
    candidates: impl IntoIterator<Item = (usize, &'a Entity)>,
    radius: f32,
) -> Option<usize> {
    candidates
        .into_iter()
        .map(|(i, e)| (i, origin.center_distance(&e.rect)))
        .filter(|&(_, dist)| dist < radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Resolve this tick's gesture edges in a fixed order: talk, interact, inspect
pub fn resolve_gestures(state: &mut GameState, input: &TickInput) {
    let prev = state.last_input;
    let held = input.held;

    if held.talk && !prev.talk {
        talk(state);
    }
    if held.interact && !prev.interact {
        press_interact(state, input.now_ms);
    }
    if !held.interact && prev.interact {
        release_interact(state, input.now_ms);
    }
    if held.inspect && !prev.inspect {
        inspect(state);
    }
}

/// Nearest NPC wins; otherwise the nearest sign; at most one target
fn talk(state: &mut GameState) {
    let origin = state.player.rect;
    let radius = state.tuning.talk_radius;

    if let Some(i) = nearest(&origin, state.npcs.iter().enumerate(), radius) {
        let npc_id = state.npcs[i].id.clone();
        log::debug!("Talking to {}", npc_id);
        state.events.push(SimEvent::TalkToNpc { npc_id });
    } else if let Some(i) = nearest(&origin, state.signs.iter().enumerate(), radius) {
        let sign = &state.signs[i];
        let event = SimEvent::ReadSign {
            sign_id: sign.id.clone(),
            text: sign.content.clone().unwrap_or_else(|| "...".to_string()),
        };
        state.events.push(event);
    }
}

/// Rising edge: start timing the press and grab the nearest free box if empty-handed
fn press_interact(state: &mut GameState, now_ms: f64) {
    state.interact.press(now_ms);
    if state.held_box_index().is_some() {
        return;
    }

    let origin = state.player.rect;
    let free = state.boxes.iter().enumerate().filter(|(_, b)| b.is_free());
    let Some(i) = nearest(&origin, free, state.tuning.grab_reach) else {
        return;
    };

    let holder = state.player.id.clone();
    let waste = &mut state.boxes[i];
    waste.held_by = Some(holder);
    waste.vel = Vec2::ZERO;
    state.interact.consume();

    log::debug!("Grabbed {}", waste.id);
    let box_id = waste.id.clone();
    state.events.push(SimEvent::Grabbed { box_id });
}

/// Falling edge: place or throw the carried box, unless this press grabbed it
fn release_interact(state: &mut GameState, now_ms: f64) {
    let Some(i) = state.held_box_index() else {
        return;
    };
    let Some(action) = state.interact.release(now_ms, state.tuning.hold_threshold_ms) else {
        return;
    };

    let GameState {
        player,
        boxes,
        platforms,
        tuning,
        events,
        ..
    } = state;
    let waste = &mut boxes[i];
    waste.held_by = None;

    // Beside the player on the facing side, bottoms aligned
    let beside_x = player.rect.x + player.rect.w / 2.0 - waste.rect.w / 2.0
        + player.facing * (player.rect.w / 2.0 + waste.rect.w / 2.0 + tuning.place_gap);
    let box_id = waste.id.clone();

    match action {
        ReleaseAction::Place => {
            waste.vel = Vec2::ZERO;
            waste.rect.x = beside_x;
            waste.rect.y = player.rect.bottom() - waste.rect.h;
            if platforms.iter().any(|p| overlaps(&waste.rect, &p.rect)) {
                // No room beside the player: drop it at the player's feet instead
                waste.rect.x = player.rect.x + (player.rect.w - waste.rect.w) / 2.0;
            }
            log::debug!("Placed {} at ({}, {})", box_id, waste.rect.x, waste.rect.y);
            events.push(SimEvent::Placed { box_id });
        }
        ReleaseAction::Throw => {
            waste.vel = Vec2::new(
                player.vel.x + player.facing * tuning.throw_force_x,
                tuning.throw_force_y,
            );
            waste.rect.x = beside_x;
            waste.rect.y = player.rect.y - tuning.throw_lift;
            log::debug!("Threw {} with velocity {}", box_id, waste.vel);
            events.push(SimEvent::Thrown { box_id });
        }
    }
}

/// Report the carried box, or the nearest one in range
fn inspect(state: &mut GameState) {
    let target = state.held_box_index().or_else(|| {
        nearest(
            &state.player.rect,
            state.boxes.iter().enumerate(),
            state.tuning.inspect_radius,
        )
    });

    let event = match target.and_then(|i| {
        let waste = &state.boxes[i];
        waste.category.map(|category| (waste.id.clone(), category))
    }) {
        Some((box_id, category)) => SimEvent::Inspect { box_id, category },
        None => SimEvent::NothingToInspect,
    };
    state.events.push(event);
}
