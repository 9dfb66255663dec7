//! Game state machine and the per-frame update.
//!
//! Every function takes the session explicitly (and, where needed, the stage
//! and an RNG handle).  All randomness comes through the injected RNG so
//! callers control determinism (tests use a seeded `StdRng`).

use rand::Rng;

use crate::boss::update_boss;
use crate::collision::resolve_collisions;
use crate::config::StageTuning;
use crate::entities::{Boss, ClearStats, Field, GameSession, GameStatus, Player};
use crate::events::GameEvent;
use crate::input::{DragState, TouchPhase};
use crate::movement::{steer_player, update_bullets, update_enemies, update_items, update_missiles};
use crate::spawner::{check_boss_activation, update_spawner};
use crate::stage::Stage;
use crate::weapons::fire_player;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Build the initial (TITLE) session for a stage.
pub fn init_state(tuning: &StageTuning) -> GameSession {
    let field = Field::default();
    let player = Player::spawn(&field);
    GameSession {
        status: GameStatus::Title,
        field,
        time_in_play: 0.0,
        frame: 0,
        drag: DragState::at(player.x, player.y),
        player,
        bullets: Vec::new(),
        enemies: Vec::new(),
        missiles: Vec::new(),
        items: Vec::new(),
        boss: Boss::dormant(&field, tuning.boss.max_hp, tuning.boss.radius),
        fire_cd: 0.0,
        spawn_cd: 0.0,
        max_weapon_level: tuning.max_weapon_level.max(1),
        boss_urgent: false,
        clear_stats: None,
        events: Vec::new(),
    }
}

// ── Transitions ──────────────────────────────────────────────────────────────

/// Any state → TITLE with every field reset.
pub fn restart(session: &mut GameSession, tuning: &StageTuning) {
    *session = init_state(tuning);
    log::info!("run reset");
    session.emit(GameEvent::Restarted);
}

/// TITLE → PLAY.  Returns `true` if the transition happened.
pub fn start_play(session: &mut GameSession) -> bool {
    if session.status != GameStatus::Title {
        return false;
    }
    session.status = GameStatus::Playing;
    log::info!("run started");
    session.emit(GameEvent::Started);
    true
}

/// Swap the active character.  Ignored outside PLAY.
pub fn swap_character(session: &mut GameSession) -> bool {
    if !session.is_playing() {
        return false;
    }
    let next = session.player.character.other();
    session.player.character = next;
    session.emit(GameEvent::CharacterSwapped(next));
    true
}

/// PLAY → WIN.  Clamps health, awards the boss score and freezes the stats,
/// exactly once.
pub fn resolve_boss_defeat(session: &mut GameSession, tuning: &StageTuning) {
    if !session.is_playing() {
        return;
    }
    session.boss.hp = 0.0;
    session.status = GameStatus::Won;
    session.boss_urgent = false;
    session.player.score += tuning.score.boss_kill;
    let stats = ClearStats {
        elapsed: session.time_in_play,
        score: session.player.score,
        max_levels: session.player.max_weapon_level,
    };
    log::info!(
        "boss down after {:.1}s, score {}",
        stats.elapsed,
        stats.score
    );
    session.clear_stats = Some(stats.clone());
    session.emit(GameEvent::Won(stats));
}

/// PLAY → LOSE, exactly once.
pub fn resolve_player_defeat(session: &mut GameSession) {
    if !session.is_playing() {
        return;
    }
    session.player.hp = 0.0;
    session.status = GameStatus::Lost;
    session.boss_urgent = false;
    log::info!("player down at {:.1}s", session.time_in_play);
    session.emit(GameEvent::Lost);
}

// ── Input ────────────────────────────────────────────────────────────────────

/// First contact starts the run, then captures the drag.
pub fn pointer_down(session: &mut GameSession, id: u32, x: f32, y: f32) {
    start_play(session);
    session.drag.pointer_down(id, x, y);
}

pub fn pointer_move(session: &mut GameSession, id: u32, x: f32, y: f32) {
    session.drag.pointer_move(id, x, y);
}

pub fn pointer_up(session: &mut GameSession, id: u32) {
    session.drag.pointer_up(id);
}

pub fn touch(session: &mut GameSession, phase: TouchPhase, touches: &[(f32, f32)], changed: &[(f32, f32)]) {
    if phase == TouchPhase::Start {
        start_play(session);
    }
    session.drag.touch(phase, touches, changed);
}

/// Shift the drag target by a keyboard step.  Ignored outside PLAY.
pub fn nudge(session: &mut GameSession, dx: f32, dy: f32) {
    if session.is_playing() {
        let field = session.field;
        session.drag.nudge(dx, dy, &field);
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame of `dt` seconds (already clamped by
/// the caller's clock).
///
/// Order: movement, fire, spawn, boss activation, projectile and enemy
/// physics, boss motion and attacks, collisions.
pub fn tick<R: Rng>(session: &mut GameSession, stage: &mut dyn Stage, dt: f32, rng: &mut R) {
    session.frame += 1;
    log::trace!("tick frame={} dt={:.4}", session.frame, dt);

    if session.is_playing() {
        session.time_in_play += dt;
        steer_player(session);
        fire_player(session, stage.tuning(), dt);
        update_spawner(session, stage, dt, rng);
        check_boss_activation(session, stage.tuning().boss.appear_at);
    }

    update_bullets(session, dt);
    update_enemies(session, stage.tuning(), dt, rng);
    update_boss(session, stage, dt);
    update_missiles(session, dt);
    update_items(session, dt);

    resolve_collisions(session, stage.tuning(), rng);
}
