//! Per-frame integration for the player, NPCs and boxes
//!
//! Velocities are in world units per frame; one call advances one frame.

use glam::Vec2;

use super::collision::{self, Response, VerticalHit, resolve_horizontal, resolve_vertical};
use super::rect::Rect;
use super::state::Entity;
use super::tick::InputState;
use crate::settings::Tuning;

/// Horizontal acceleration, friction and speed clamp for the player
pub fn apply_player_controls(player: &mut Entity, input: &InputState, tuning: &Tuning) {
    let (max_speed, accel) = tuning.move_profile(input.down || input.run);

    if input.left {
        player.vel.x -= accel;
        player.facing = -1.0;
    }
    if input.right {
        player.vel.x += accel;
        player.facing = 1.0;
    }

    let friction = if player.grounded {
        tuning.ground_friction
    } else {
        tuning.air_friction
    };
    player.vel.x = (player.vel.x * friction).clamp(-max_speed, max_speed);
}

/// Obstacles the player collides with: platforms and boxes nobody carries
fn player_obstacles<'a>(
    platforms: &'a [Entity],
    boxes: &'a [Entity],
) -> impl Iterator<Item = &'a Rect> {
    platforms
        .iter()
        .chain(boxes.iter().filter(|b| b.is_free()))
        .map(|e| &e.rect)
}

pub fn move_player_x(player: &mut Entity, platforms: &[Entity], boxes: &[Entity]) {
    collision::move_x(
        &mut player.rect,
        &mut player.vel,
        player_obstacles(platforms, boxes),
        Response::Stop,
    );
}

pub fn move_player_y(player: &mut Entity, platforms: &[Entity], boxes: &[Entity]) {
    player.grounded = collision::move_y(
        &mut player.rect,
        &mut player.vel,
        player_obstacles(platforms, boxes),
    );
}

/// NPCs only fall and stand on platforms
pub fn step_npcs(npcs: &mut [Entity], platforms: &[Entity], tuning: &Tuning) {
    for npc in npcs {
        npc.vel.y += tuning.gravity;
        npc.grounded = collision::move_y(
            &mut npc.rect,
            &mut npc.vel,
            platforms.iter().map(|p| &p.rect),
        );
    }
}

/// Pin a carried box on top of its holder's head
pub fn follow_holder(held: &mut Entity, holder: &Entity) {
    held.vel = Vec2::ZERO;
    held.grounded = false;
    held.rect.x = holder.rect.x + (holder.rect.w - held.rect.w) / 2.0;
    held.rect.y = holder.rect.y - held.rect.h;
}

/// Advance every box one frame
///
/// Carried boxes follow the player. Free boxes fall, drag, and bounce off
/// platforms and each other. Boxes are resolved one at a time in slice order,
/// each seeing the already-updated positions of the boxes before it.
pub fn step_boxes(boxes: &mut [Entity], player: &Entity, platforms: &[Entity], tuning: &Tuning) {
    let bounce = Response::Bounce(tuning.box_bounce);

    for i in 0..boxes.len() {
        if boxes[i].is_held_by(&player.id) {
            follow_holder(&mut boxes[i], player);
            continue;
        }
        if let Some(holder) = boxes[i].held_by.take() {
            log::warn!(
                "Box {} held by unknown entity {}, dropping it",
                boxes[i].id,
                holder
            );
        }

        let mut rect = boxes[i].rect;
        let mut vel = boxes[i].vel;

        vel.y += tuning.gravity;
        vel.x *= tuning.box_drag;

        // --- X ---
        rect.x += vel.x;
        for platform in platforms {
            resolve_horizontal(&mut rect, &mut vel, &platform.rect, bounce);
        }
        for (j, other) in boxes.iter().enumerate() {
            if j == i || !other.is_free() {
                continue;
            }
            resolve_horizontal(&mut rect, &mut vel, &other.rect, bounce);
        }

        // --- Y ---
        rect.y += vel.y;
        let mut grounded = false;
        let obstacles = platforms
            .iter()
            .chain(
                boxes
                    .iter()
                    .enumerate()
                    .filter(|&(j, other)| j != i && other.is_free())
                    .map(|(_, other)| other),
            )
            .map(|e| &e.rect);
        for obstacle in obstacles {
            if resolve_vertical(&mut rect, &mut vel, obstacle) == Some(VerticalHit::Landed) {
                vel.x *= tuning.box_landing_friction;
                grounded = true;
            }
        }

        let waste = &mut boxes[i];
        waste.rect = rect;
        waste.vel = vel;
        waste.grounded = grounded;
    }
}

/// Ease the camera toward centering the player horizontally
pub fn smooth_camera(camera: &mut Vec2, player: &Entity, tuning: &Tuning) {
    let target_x = player.rect.center().x - tuning.viewport_width / 2.0;
    camera.x += (target_x - camera.x) * tuning.camera_gain;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{PLAYER_ID, WasteCategory};

    fn floor() -> Entity {
        Entity::platform("floor", Rect::new(-500.0, 600.0, 6000.0, 50.0))
    }

    fn grounded_player(x: f32) -> Entity {
        let mut player = Entity::player();
        player.rect.x = x;
        player.rect.y = 540.0;
        player.grounded = true;
        player
    }

    #[test]
    fn test_walk_speed_is_clamped() {
        let tuning = Tuning::default();
        let mut player = grounded_player(0.0);
        let input = InputState {
            right: true,
            ..Default::default()
        };
        for _ in 0..200 {
            apply_player_controls(&mut player, &input, &tuning);
        }
        assert!(player.vel.x > 0.0);
        assert!(player.vel.x <= tuning.walk_speed);
        assert_eq!(player.facing, 1.0);
    }

    #[test]
    fn test_run_is_faster_than_walk() {
        let tuning = Tuning::default();
        let mut walker = grounded_player(0.0);
        let mut runner = grounded_player(0.0);
        walker.grounded = false;
        runner.grounded = false;
        let walk = InputState {
            left: true,
            ..Default::default()
        };
        let run = InputState {
            left: true,
            run: true,
            ..Default::default()
        };
        for _ in 0..200 {
            apply_player_controls(&mut walker, &walk, &tuning);
            apply_player_controls(&mut runner, &run, &tuning);
        }
        assert_eq!(runner.vel.x, -tuning.run_speed);
        assert!(walker.vel.x > runner.vel.x);
        assert_eq!(walker.facing, -1.0);
    }

    #[test]
    fn test_ground_friction_stronger_than_air() {
        let tuning = Tuning::default();
        let idle = InputState::default();
        let mut on_ground = grounded_player(0.0);
        let mut in_air = grounded_player(0.0);
        in_air.grounded = false;
        on_ground.vel.x = 5.0;
        in_air.vel.x = 5.0;
        apply_player_controls(&mut on_ground, &idle, &tuning);
        apply_player_controls(&mut in_air, &idle, &tuning);
        assert!(on_ground.vel.x < in_air.vel.x);
    }

    #[test]
    fn test_player_stands_on_free_box_but_not_held_one() {
        let platforms = vec![floor()];
        let mut boxes = vec![Entity::waste_box(
            "b-0-0",
            WasteCategory::Organic,
            0.0,
            560.0,
            "🍎",
        )];
        let mut player = Entity::player();
        player.rect.x = 0.0;
        player.rect.y = 495.0;
        player.vel.y = 6.0;
        move_player_y(&mut player, &platforms, &boxes);
        assert!(player.grounded);
        assert_eq!(player.rect.bottom(), 560.0);

        boxes[0].held_by = Some(PLAYER_ID.to_string());
        player.rect.y = 495.0;
        player.vel.y = 6.0;
        move_player_y(&mut player, &platforms, &boxes);
        assert!(!player.grounded);
    }

    #[test]
    fn test_npc_lands_on_platform() {
        let tuning = Tuning::default();
        let platforms = vec![floor()];
        let mut npcs = vec![Entity::npc("npc-0-0", 50.0, 500.0)];
        for _ in 0..60 {
            step_npcs(&mut npcs, &platforms, &tuning);
        }
        assert!(npcs[0].grounded);
        assert_eq!(npcs[0].rect.bottom(), 600.0);
        assert_eq!(npcs[0].rect.x, 50.0);
    }

    #[test]
    fn test_held_box_follows_player() {
        let tuning = Tuning::default();
        let player = grounded_player(100.0);
        let mut boxes = vec![Entity::waste_box(
            "b-0-0",
            WasteCategory::General,
            0.0,
            0.0,
            "🧻",
        )];
        boxes[0].held_by = Some(PLAYER_ID.to_string());
        boxes[0].vel = Vec2::new(3.0, 3.0);
        step_boxes(&mut boxes, &player, &[floor()], &tuning);
        assert_eq!(boxes[0].vel, Vec2::ZERO);
        assert_eq!(boxes[0].rect.x, 100.0);
        assert_eq!(boxes[0].rect.y, 500.0);
    }

    #[test]
    fn test_unknown_holder_is_released() {
        let tuning = Tuning::default();
        let player = grounded_player(100.0);
        let mut boxes = vec![Entity::waste_box(
            "b-0-0",
            WasteCategory::General,
            300.0,
            560.0,
            "🧻",
        )];
        boxes[0].held_by = Some("ghost".to_string());
        step_boxes(&mut boxes, &player, &[floor()], &tuning);
        assert!(boxes[0].is_free());
    }

    #[test]
    fn test_free_box_falls_through_held_box() {
        let tuning = Tuning::default();
        let player = grounded_player(100.0);
        let mut held = Entity::waste_box("b-0-0", WasteCategory::General, 0.0, 0.0, "🧻");
        held.held_by = Some(PLAYER_ID.to_string());
        let mut falling = Entity::waste_box("b-0-1", WasteCategory::Organic, 100.0, 455.0, "🍎");
        falling.vel.y = 10.0;
        let mut boxes = vec![held, falling];

        step_boxes(&mut boxes, &player, &[floor()], &tuning);
        // The carried box sits at y 500..540; the falling one now overlaps it
        assert_eq!(boxes[0].rect.y, 500.0);
        assert!((boxes[1].rect.y - 465.6).abs() < 1e-3);
        assert!(boxes[1].vel.y > 0.0);
        assert!(!boxes[1].grounded);

        for _ in 0..60 {
            step_boxes(&mut boxes, &player, &[floor()], &tuning);
        }
        assert!(boxes[1].grounded);
        assert_eq!(boxes[1].rect.y, 560.0);
        assert!(boxes[0].is_held_by(PLAYER_ID));
    }

    #[test]
    fn test_box_bounces_off_wall() {
        let tuning = Tuning::default();
        let wall = Entity::platform("w", Rect::new(200.0, 0.0, 50.0, 800.0));
        let player = grounded_player(-400.0);
        let mut boxes = vec![Entity::waste_box(
            "b-0-0",
            WasteCategory::Recycle,
            150.0,
            100.0,
            "🥤",
        )];
        boxes[0].vel.x = 20.0;
        step_boxes(&mut boxes, &player, &[wall], &tuning);
        // 20 * 0.9 = 18 of travel; snapped to the wall's left edge, reversed at half speed
        assert_eq!(boxes[0].rect.right(), 200.0);
        assert!((boxes[0].vel.x - (-9.0)).abs() < 1e-4);
    }

    #[test]
    fn test_boxes_stack() {
        let tuning = Tuning::default();
        let player = grounded_player(-400.0);
        let mut boxes = vec![
            Entity::waste_box("b-0-0", WasteCategory::Hazardous, 100.0, 560.0, "🔋"),
            Entity::waste_box("b-0-1", WasteCategory::General, 100.0, 500.0, "🧻"),
        ];
        for _ in 0..120 {
            step_boxes(&mut boxes, &player, &[floor()], &tuning);
        }
        assert_eq!(boxes[0].rect.y, 560.0);
        assert_eq!(boxes[1].rect.y, 520.0);
        assert!(boxes[0].grounded && boxes[1].grounded);
    }

    #[test]
    fn test_free_box_slides_to_rest() {
        let tuning = Tuning::default();
        let player = grounded_player(-400.0);
        let mut boxes = vec![Entity::waste_box(
            "b-0-0",
            WasteCategory::Organic,
            100.0,
            560.0,
            "🍌",
        )];
        boxes[0].vel.x = 10.0;
        for _ in 0..300 {
            step_boxes(&mut boxes, &player, &[floor()], &tuning);
        }
        assert!(boxes[0].vel.x.abs() < 1e-3);
        assert!(boxes[0].rect.x > 100.0);
    }

    #[test]
    fn test_camera_lags_player() {
        let tuning = Tuning::default();
        let player = grounded_player(1000.0);
        let mut camera = Vec2::ZERO;
        smooth_camera(&mut camera, &player, &tuning);
        let target = player.rect.center().x - tuning.viewport_width / 2.0;
        assert!(camera.x > 0.0 && camera.x < target);
        for _ in 0..500 {
            smooth_camera(&mut camera, &player, &tuning);
        }
        assert!((camera.x - target).abs() < 0.01);
        assert_eq!(camera.y, 0.0);
    }
}
