//! Collision response for axis-separated movement
//!
//! Bodies move one axis at a time. After each axis step, every overlapping
//! obstacle pushes the body back to the obstacle's near edge; which edge is
//! decided by the sign of the velocity on that axis.

use glam::Vec2;

use super::rect::{Rect, overlaps};

/// What happens to the velocity component along the blocked axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    /// Zero it (player, NPCs)
    Stop,
    /// Multiply by the factor (negative = reverse, boxes)
    Bounce(f32),
}

impl Response {
    #[inline]
    pub fn apply(self, v: f32) -> f32 {
        match self {
            Response::Stop => 0.0,
            Response::Bounce(factor) => v * factor,
        }
    }
}

/// Result of a vertical push-out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalHit {
    /// Moving down, now resting on top of the obstacle
    Landed,
    /// Moving up, stopped under the obstacle
    Bonked,
}

/// Resolve a horizontal overlap; returns true if the body was touching
pub fn resolve_horizontal(
    body: &mut Rect,
    vel: &mut Vec2,
    obstacle: &Rect,
    response: Response,
) -> bool {
    if !overlaps(body, obstacle) {
        return false;
    }
    if vel.x > 0.0 {
        body.x = obstacle.x - body.w;
    } else if vel.x < 0.0 {
        body.x = obstacle.right();
    }
    vel.x = response.apply(vel.x);
    true
}

/// Resolve a vertical overlap with a hard stop
///
/// A body overlapping with zero vertical speed is left where it is.
pub fn resolve_vertical(body: &mut Rect, vel: &mut Vec2, obstacle: &Rect) -> Option<VerticalHit> {
    if !overlaps(body, obstacle) {
        return None;
    }
    let hit = if vel.y > 0.0 {
        body.y = obstacle.y - body.h;
        VerticalHit::Landed
    } else if vel.y < 0.0 {
        body.y = obstacle.bottom();
        VerticalHit::Bonked
    } else {
        return None;
    };
    vel.y = 0.0;
    Some(hit)
}

/// Move horizontally by `vel.x` and resolve against every obstacle
pub fn move_x<'a>(
    body: &mut Rect,
    vel: &mut Vec2,
    obstacles: impl IntoIterator<Item = &'a Rect>,
    response: Response,
) {
    body.x += vel.x;
    for obstacle in obstacles {
        resolve_horizontal(body, vel, obstacle, response);
    }
}

/// Move vertically by `vel.y` and resolve; returns true on a downward landing
pub fn move_y<'a>(
    body: &mut Rect,
    vel: &mut Vec2,
    obstacles: impl IntoIterator<Item = &'a Rect>,
) -> bool {
    body.y += vel.y;
    let mut landed = false;
    for obstacle in obstacles {
        if resolve_vertical(body, vel, obstacle) == Some(VerticalHit::Landed) {
            landed = true;
        }
    }
    landed
}
