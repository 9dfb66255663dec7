//! Enemy cadence before the boss, and the one-way boss activation.

use rand::Rng;

use crate::entities::{Enemy, GameSession};
use crate::events::GameEvent;
use crate::geometry::rand_range;
use crate::stage::Stage;

/// Range for an enemy's first shot delay.
const FIRST_SHOT_DELAY: (f32, f32) = (0.2, 1.0);

/// Give a freshly produced enemy its first shot delay and append it.
pub fn admit_enemy<R: Rng>(session: &mut GameSession, mut enemy: Enemy, rng: &mut R) {
    enemy.shoot_cd = rand_range(rng, FIRST_SHOT_DELAY.0, FIRST_SHOT_DELAY.1);
    session.enemies.push(enemy);
}

/// Count the spawn cooldown down; on expiry ask the stage for an enemy and
/// redraw the cooldown.  Does nothing once the boss is active.
pub fn update_spawner<R: Rng>(session: &mut GameSession, stage: &mut dyn Stage, dt: f32, rng: &mut R) {
    if session.boss.active {
        return;
    }
    session.spawn_cd = (session.spawn_cd - dt).max(0.0);
    if session.spawn_cd > 0.0 {
        return;
    }
    let field = session.field;
    if let Some(enemy) = stage.spawn_enemy(&field, &mut *rng) {
        admit_enemy(session, enemy, rng);
    }
    let [lo, hi] = stage.tuning().spawn_interval;
    session.spawn_cd = rand_range(rng, lo, hi);
}

/// Flip the boss on once enough play time has passed.  Never flips back.
pub fn check_boss_activation(session: &mut GameSession, appear_at: f32) {
    if session.boss.active || session.time_in_play < appear_at {
        return;
    }
    session.boss.active = true;
    log::info!("boss activated at {:.1}s", session.time_in_play);
    session.emit(GameEvent::BossAppeared);
}
