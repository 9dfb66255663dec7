//! Per-frame integration of every moving thing.
//!
//! Out-of-bounds and expired entities are removed in the same pass with
//! `retain`, so the collections stay dense.

use rand::Rng;

use crate::config::StageTuning;
use crate::entities::{Field, GameSession};
use crate::geometry::{clamp, lerp};
use crate::weapons::enemy_try_fire;

/// Fraction of the remaining distance covered each frame.  Applied once per
/// frame, not scaled by the delta.
pub const PLAYER_SMOOTHING: f32 = 0.28;

/// Keep weaving enemies this far from the side walls.
const ENEMY_WALL_MARGIN: f32 = 24.0;

const BULLET_MARGIN: f32 = 80.0;
const ENEMY_EXIT_MARGIN: f32 = 80.0;
const MISSILE_MARGIN: f32 = 120.0;
const ITEM_EXIT_MARGIN: f32 = 60.0;

/// Ease the player toward the clamped drag target.
pub fn steer_player(session: &mut GameSession) {
    let (tx, ty) = session.drag.clamped_target(&session.field);
    let p = &mut session.player;
    p.x = lerp(p.x, tx, PLAYER_SMOOTHING);
    p.y = lerp(p.y, ty, PLAYER_SMOOTHING);
}

pub fn update_bullets(session: &mut GameSession, dt: f32) {
    let Field { width, .. } = session.field;
    session.bullets.retain_mut(|b| {
        b.t += dt;
        b.x += b.vx * dt;
        b.y += b.vy * dt;
        b.t <= b.life && b.y >= -BULLET_MARGIN && b.x >= -BULLET_MARGIN && b.x <= width + BULLET_MARGIN
    });
}

/// Descend, weave, and (during PLAY) roll for a shot.
pub fn update_enemies<R: Rng>(session: &mut GameSession, tuning: &StageTuning, dt: f32, rng: &mut R) {
    let Field { width, height } = session.field;
    let playing = session.is_playing();
    let missiles = &mut session.missiles;
    session.enemies.retain_mut(|e| {
        e.t += dt;
        e.y += e.vy * dt;
        if let Some(weave) = e.weave {
            let x = weave.base_x + (e.t * weave.freq).sin() * weave.amp;
            e.x = clamp(x, ENEMY_WALL_MARGIN, width - ENEMY_WALL_MARGIN);
        }
        if playing {
            if let Some(shot) = enemy_try_fire(e, tuning, dt, &mut *rng) {
                missiles.push(shot);
            }
        } else {
            e.shoot_cd = (e.shoot_cd - dt).max(0.0);
        }
        e.y <= height + ENEMY_EXIT_MARGIN
    });
}

pub fn update_missiles(session: &mut GameSession, dt: f32) {
    let Field { width, height } = session.field;
    session.missiles.retain_mut(|m| {
        m.t += dt;
        m.x += m.vx * dt;
        m.y += m.vy * dt;
        m.t <= m.life
            && m.y <= height + MISSILE_MARGIN
            && m.x >= -MISSILE_MARGIN
            && m.x <= width + MISSILE_MARGIN
    });
}

pub fn update_items(session: &mut GameSession, dt: f32) {
    let height = session.field.height;
    session.items.retain_mut(|it| {
        it.y += it.vy * dt;
        it.y <= height + ITEM_EXIT_MARGIN
    });
}
