//! Drag / touch capture and the player's target band.
//!
//! Coordinates arriving here are already logical (the frontend owns the
//! screen-to-field transform).

use crate::entities::Field;
use crate::geometry::clamp;

/// Horizontal inset of the target band.
pub const TARGET_MARGIN_X: f32 = 22.0;
/// Top of the target band as a fraction of the field height.
pub const TARGET_TOP_FRAC: f32 = 0.45;
/// Gap between the bottom of the band and the bottom edge.
pub const TARGET_BOTTOM_GAP: f32 = 46.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Single-contact drag: the pointer that pressed first owns every following
/// move/up until it is released.
#[derive(Clone, Debug, PartialEq)]
pub struct DragState {
    pub active: bool,
    pub pointer: Option<u32>,
    pub tx: f32,
    pub ty: f32,
}

impl DragState {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            active: false,
            pointer: None,
            tx: x,
            ty: y,
        }
    }

    pub fn pointer_down(&mut self, id: u32, x: f32, y: f32) {
        self.active = true;
        self.pointer = Some(id);
        self.tx = x;
        self.ty = y;
    }

    /// Returns `false` when the event belongs to a pointer that does not own
    /// the drag.
    pub fn pointer_move(&mut self, id: u32, x: f32, y: f32) -> bool {
        if !self.active || self.pointer != Some(id) {
            return false;
        }
        self.tx = x;
        self.ty = y;
        true
    }

    pub fn pointer_up(&mut self, id: u32) -> bool {
        if self.pointer != Some(id) {
            return false;
        }
        self.active = false;
        self.pointer = None;
        true
    }

    /// Touch fallback: follow the first active touch, or the first changed
    /// touch when the list of active ones is already empty (touchend).
    pub fn touch(&mut self, phase: TouchPhase, touches: &[(f32, f32)], changed: &[(f32, f32)]) {
        let Some(&(x, y)) = touches.first().or_else(|| changed.first()) else {
            return;
        };
        self.tx = x;
        self.ty = y;
        self.active = !matches!(phase, TouchPhase::End | TouchPhase::Cancel);
    }

    /// Keyboard steering: move the target relative to where it is clamped.
    pub fn nudge(&mut self, dx: f32, dy: f32, field: &Field) {
        let (x, y) = self.clamped_target(field);
        self.tx = x + dx;
        self.ty = y + dy;
    }

    /// The target clamped into the player's band at the bottom of the field.
    pub fn clamped_target(&self, field: &Field) -> (f32, f32) {
        (
            clamp(self.tx, TARGET_MARGIN_X, field.width - TARGET_MARGIN_X),
            clamp(
                self.ty,
                field.height * TARGET_TOP_FRAC,
                field.height - TARGET_BOTTOM_GAP,
            ),
        )
    }
}
