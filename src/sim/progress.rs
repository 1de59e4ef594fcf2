//! Delivery detection and level completion

use super::rect::overlaps;
use super::state::{Entity, GamePhase, GameState, SimEvent};

/// True if a free box overlaps a goal of its own category
fn is_delivered(waste: &Entity, goals: &[Entity]) -> bool {
    let Some(category) = waste.category else {
        return false;
    };
    waste.is_free()
        && goals
            .iter()
            .any(|g| g.category == Some(category) && overlaps(&waste.rect, &g.rect))
}

/// Remove delivered boxes, recount what is left, and flag completion
///
/// Returns the number of boxes delivered this tick. Calling it again with no
/// new deliveries changes nothing.
pub fn evaluate(state: &mut GameState) -> usize {
    let mut remaining = [0u32; 4];
    let delivered: Vec<bool> = state
        .boxes
        .iter()
        .map(|waste| {
            let done = is_delivered(waste, &state.goals);
            if !done {
                if let Some(category) = waste.category {
                    remaining[category.index()] += 1;
                }
            }
            done
        })
        .collect();

    let count = delivered.iter().filter(|&&d| d).count();
    if count > 0 {
        let mut flags = delivered.into_iter();
        state.boxes.retain(|_| !flags.next().unwrap_or(false));
        log::info!(
            "Delivered {} box(es), remaining per zone: {:?}",
            count,
            remaining
        );
        state.events.push(SimEvent::ProgressChanged(remaining));
    }

    state.zone_progress = remaining;

    if remaining.iter().all(|&c| c == 0) && state.phase == GamePhase::Playing {
        state.phase = GamePhase::LevelComplete;
        log::info!("Level {} complete", state.level);
        state.events.push(SimEvent::LevelComplete);
    }

    count
}
