//! Frame-counted jump timers and the interact hold gesture
//!
//! These are small state machines advanced once per tick. They know nothing
//! about positions; the orchestrator feeds them grounded/input flags and acts
//! on what they report.

use serde::{Deserialize, Serialize};

/// Coyote-time and jump-buffer counters (frames remaining)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JumpTimers {
    /// Frames left in which a jump still counts as "from the ground"
    pub coyote: u32,
    /// Frames left in which an early jump press is remembered
    pub buffer: u32,
}

impl JumpTimers {
    /// Advance one frame; returns true when the jump fires this frame
    ///
    /// A fired jump zeroes both counters, so one press can never produce a
    /// second impulse while the key stays down.
    pub fn update(
        &mut self,
        grounded: bool,
        jump_requested: bool,
        coyote_frames: u32,
        buffer_frames: u32,
    ) -> bool {
        if grounded {
            self.coyote = coyote_frames;
        } else {
            self.coyote = self.coyote.saturating_sub(1);
        }

        if jump_requested {
            self.buffer = buffer_frames;
        } else {
            self.buffer = self.buffer.saturating_sub(1);
        }

        if self.coyote > 0 && self.buffer > 0 {
            self.coyote = 0;
            self.buffer = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Clamp upward speed when the jump button is no longer held
#[inline]
pub fn cut_jump(vy: f32, jump_held: bool, cutoff: f32) -> f32 {
    if !jump_held && vy < cutoff { cutoff } else { vy }
}

/// What a release of the interact button does with a carried box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseAction {
    Place,
    Throw,
}

/// Classify a hold by its duration; exactly at the threshold throws
#[inline]
pub fn classify_hold(duration_ms: f64, threshold_ms: f64) -> ReleaseAction {
    if duration_ms < threshold_ms {
        ReleaseAction::Place
    } else {
        ReleaseAction::Throw
    }
}

/// Interact press bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InteractGesture {
    /// Host timestamp of the last rising edge (ms)
    pub press_ms: f64,
    /// The last press already grabbed a box; its release does nothing
    pub consumed: bool,
}

impl InteractGesture {
    pub fn press(&mut self, now_ms: f64) {
        self.press_ms = now_ms;
        self.consumed = false;
    }

    pub fn consume(&mut self) {
        self.consumed = true;
    }

    pub fn held_for(&self, now_ms: f64) -> f64 {
        (now_ms - self.press_ms).max(0.0)
    }

    /// Decide the outcome of a release, or `None` if the press was spent
    pub fn release(&self, now_ms: f64, threshold_ms: f64) -> Option<ReleaseAction> {
        if self.consumed {
            None
        } else {
            Some(classify_hold(self.held_for(now_ms), threshold_ms))
        }
    }

    /// Hold progress toward the throw threshold, clamped to 0..=1
    pub fn charge(&self, now_ms: f64, threshold_ms: f64) -> f32 {
        if threshold_ms <= 0.0 {
            return 1.0;
        }
        (self.held_for(now_ms) / threshold_ms).min(1.0) as f32
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
