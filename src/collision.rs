//! Hit detection and its consequences: damage, score, drops, pickups.
//!
//! Every test is a circle overlap.  Removal happens inside the pass, so a
//! removed entity can't be hit again in the same frame.

use rand::Rng;

use crate::compute::{resolve_boss_defeat, resolve_player_defeat};
use crate::config::{DropRates, StageTuning};
use crate::entities::{GameSession, Item, ItemKind, Player, PLAYER_MAX_HP};
use crate::geometry::circle_hit;

/// Extra reach the player gets when touching items.
pub const PICKUP_BONUS_RADIUS: f32 = 10.0;

/// Map a uniform sample in `[0, 1)` to a drop.  Heal occupies the bottom of
/// the range, upgrade the slice above it, and the rest drops nothing.
pub fn roll_drop(rates: &DropRates, sample: f32) -> Option<ItemKind> {
    if sample < rates.heal {
        Some(ItemKind::Heal)
    } else if sample < rates.heal + rates.gun {
        Some(ItemKind::Upgrade)
    } else {
        None
    }
}

/// Raise the active character's level, clamped to `[1, max_level]`.
pub fn apply_upgrade(player: &mut Player, max_level: u8) {
    let c = player.character;
    let level = player.weapon_level[c].saturating_add(1).clamp(1, max_level.max(1));
    player.weapon_level[c] = level;
    player.max_weapon_level[c] = player.max_weapon_level[c].max(level);
}

pub fn apply_heal(player: &mut Player, amount: f32) {
    player.hp = (player.hp + amount).clamp(0.0, PLAYER_MAX_HP);
}

/// Run all collision passes.  Damage and pickups only apply during PLAY, and
/// the passes stop as soon as one of them ends the run.
pub fn resolve_collisions<R: Rng>(session: &mut GameSession, tuning: &StageTuning, rng: &mut R) {
    if !session.is_playing() {
        return;
    }
    resolve_player_bullets(session, tuning, rng);
    if !session.is_playing() {
        return;
    }
    resolve_missiles(session);
    if !session.is_playing() {
        return;
    }
    resolve_pickups(session, tuning);
}

/// Bullets against enemies, then the boss.  Both lists are walked from the
/// most recently added entry backwards; the first enemy hit takes the bullet.
pub fn resolve_player_bullets<R: Rng>(session: &mut GameSession, tuning: &StageTuning, rng: &mut R) {
    let mut i = session.bullets.len();
    while i > 0 {
        i -= 1;
        let b = session.bullets[i].clone();
        let mut hit = false;

        for j in (0..session.enemies.len()).rev() {
            let e = &mut session.enemies[j];
            if !circle_hit(b.x, b.y, b.r, e.x, e.y, e.r) {
                continue;
            }
            e.hp -= b.dmg;
            hit = true;
            if e.hp <= 0.0 {
                let (ex, ey) = (e.x, e.y);
                session.enemies.remove(j);
                session.player.score += tuning.score.enemy_kill;
                if let Some(kind) = roll_drop(&tuning.drop_rates, rng.gen::<f32>()) {
                    session.items.push(Item::drop_at(kind, ex, ey));
                }
            }
            break;
        }

        let boss = &mut session.boss;
        if !hit && boss.active && circle_hit(b.x, b.y, b.r, boss.x, boss.y, boss.r) {
            boss.hp = (boss.hp - b.dmg).max(0.0);
            hit = true;
        }

        if hit {
            session.bullets.remove(i);
        }
        if session.boss.active && session.boss.hp <= 0.0 {
            resolve_boss_defeat(session, tuning);
            return;
        }
    }
}

/// Enemy and boss missiles against the player.
pub fn resolve_missiles(session: &mut GameSession) {
    let mut i = session.missiles.len();
    while i > 0 {
        i -= 1;
        let m = &session.missiles[i];
        let p = &session.player;
        if !circle_hit(m.x, m.y, m.r, p.x, p.y, p.r) {
            continue;
        }
        let dmg = m.dmg;
        session.missiles.remove(i);
        session.player.hp = (session.player.hp - dmg).max(0.0);
        if session.player.hp <= 0.0 {
            resolve_player_defeat(session);
            return;
        }
    }
}

/// Items against the player's enlarged pickup circle.
pub fn resolve_pickups(session: &mut GameSession, tuning: &StageTuning) {
    let max_level = session.max_weapon_level;
    let mut i = session.items.len();
    while i > 0 {
        i -= 1;
        let it = &session.items[i];
        let p = &session.player;
        if !circle_hit(it.x, it.y, it.r, p.x, p.y, p.r + PICKUP_BONUS_RADIUS) {
            continue;
        }
        let kind = it.kind;
        session.items.remove(i);
        match kind {
            ItemKind::Upgrade => apply_upgrade(&mut session.player, max_level),
            ItemKind::Heal => apply_heal(&mut session.player, tuning.heal_amount),
        }
    }
}
