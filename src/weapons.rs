//! Player volleys, enemy shots and boss attack patterns.

use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use crate::boss::{BurstSpec, FanSpec};
use crate::config::{StageTuning, WeaponProfile};
use crate::entities::{Boss, Bullet, Enemy, GameSession, Missile, MissileOrigin, Player};
use crate::geometry::{fan_offset, rand_range};

// ── Projectile constants ──────────────────────────────────────────────────────

const BULLET_RADIUS: f32 = 3.2;
const BULLET_LIFE: f32 = 1.4;
/// Muzzle offset above the player's centre.
const BULLET_MUZZLE: f32 = 28.0;

const ENEMY_MISSILE_RADIUS: f32 = 4.2;
const ENEMY_MISSILE_DAMAGE: f32 = 12.0;
const ENEMY_MISSILE_LIFE: f32 = 3.0;
const ENEMY_MISSILE_SPEED: (f32, f32) = (240.0, 320.0);
const ENEMY_MUZZLE: f32 = 18.0;
/// Enemies hold fire until they are this far onto the screen.
pub const ENEMY_FIRE_LINE: f32 = 40.0;

const FAN_RADIUS: f32 = 4.6;
const FAN_DAMAGE: f32 = 14.0;
const FAN_MUZZLE: f32 = 40.0;
const BURST_RADIUS: f32 = 4.8;
const BURST_DAMAGE: f32 = 16.0;
const BURST_MUZZLE: f32 = 30.0;
const BOSS_MISSILE_LIFE: f32 = 4.0;

// ── Player ────────────────────────────────────────────────────────────────────

/// Half-angle of the fan for `level`.
pub fn spread_for(profile: &WeaponProfile, level: u8) -> f32 {
    profile.spread_base + profile.spread_per_level * f32::from(level.saturating_sub(1))
}

pub fn damage_for(profile: &WeaponProfile, level: u8) -> f32 {
    profile.base_damage + profile.damage_per_level * f32::from(level.saturating_sub(1))
}

/// One volley: `level` bullets spread symmetrically around straight up.
pub fn player_volley(player: &Player, profile: &WeaponProfile, level: u8) -> Vec<Bullet> {
    let n = usize::from(level.max(1));
    let max_angle = spread_for(profile, level);
    let dmg = damage_for(profile, level);
    (0..n)
        .map(|i| {
            let ang = fan_offset(i, n) * max_angle;
            Bullet {
                x: player.x,
                y: player.y - BULLET_MUZZLE,
                vx: ang.sin() * profile.bullet_speed,
                vy: -ang.cos() * profile.bullet_speed,
                r: BULLET_RADIUS,
                dmg,
                t: 0.0,
                life: BULLET_LIFE,
            }
        })
        .collect()
}

/// Auto-fire: count the cooldown down and fire when it reaches zero.
pub fn fire_player(session: &mut GameSession, tuning: &StageTuning, dt: f32) {
    session.fire_cd = (session.fire_cd - dt).max(0.0);
    if session.fire_cd > 0.0 {
        return;
    }
    let character = session.player.character;
    let profile = tuning.weapon_profiles()[character];
    let level = session.player.level().clamp(1, session.max_weapon_level);
    let volley = player_volley(&session.player, &profile, level);
    session.bullets.extend(volley);
    session.fire_cd = profile.interval;
}

// ── Enemies ───────────────────────────────────────────────────────────────────

pub fn enemy_shot<R: Rng + ?Sized>(enemy: &Enemy, rng: &mut R) -> Missile {
    Missile {
        origin: MissileOrigin::Enemy,
        x: enemy.x,
        y: enemy.y + ENEMY_MUZZLE,
        vx: 0.0,
        vy: rand_range(rng, ENEMY_MISSILE_SPEED.0, ENEMY_MISSILE_SPEED.1),
        r: ENEMY_MISSILE_RADIUS,
        dmg: ENEMY_MISSILE_DAMAGE,
        t: 0.0,
        life: ENEMY_MISSILE_LIFE,
    }
}

/// Count an enemy's cooldown down and maybe fire.  The chance is a rate per
/// second, so it is scaled by the frame delta.
pub fn enemy_try_fire<R: Rng + ?Sized>(
    enemy: &mut Enemy,
    tuning: &StageTuning,
    dt: f32,
    rng: &mut R,
) -> Option<Missile> {
    enemy.shoot_cd = (enemy.shoot_cd - dt).max(0.0);
    if enemy.y <= ENEMY_FIRE_LINE || enemy.shoot_cd > 0.0 {
        return None;
    }
    if rng.gen::<f32>() >= tuning.enemy_shoot_chance_per_sec * dt {
        return None;
    }
    let [lo, hi] = tuning.enemy_shoot_cooldown;
    enemy.shoot_cd = rand_range(rng, lo, hi);
    Some(enemy_shot(enemy, rng))
}

// ── Boss ──────────────────────────────────────────────────────────────────────

pub fn boss_fan(boss: &Boss, fan: FanSpec) -> impl Iterator<Item = Missile> + '_ {
    (0..fan.count).map(move |i| {
        let ang = FRAC_PI_2 + fan_offset(i, fan.count) * fan.spread;
        Missile {
            origin: MissileOrigin::Boss,
            x: boss.x,
            y: boss.y + FAN_MUZZLE,
            vx: ang.cos() * fan.speed,
            vy: ang.sin() * fan.speed,
            r: FAN_RADIUS,
            dmg: FAN_DAMAGE,
            t: 0.0,
            life: BOSS_MISSILE_LIFE,
        }
    })
}

/// Shots pointed at `(tx, ty)`, each rotated by a multiple of `burst.gap`.
pub fn boss_aimed_burst(boss: &Boss, tx: f32, ty: f32, burst: BurstSpec) -> impl Iterator<Item = Missile> + '_ {
    let dx = tx - boss.x;
    let dy = ty - boss.y;
    let dist = dx.hypot(dy).max(1.0);
    let (ux, uy) = (dx / dist, dy / dist);
    let mid = (burst.count as f32 - 1.0) / 2.0;
    (0..burst.count).map(move |i| {
        let off = (i as f32 - mid) * burst.gap;
        let (sin, cos) = off.sin_cos();
        Missile {
            origin: MissileOrigin::Boss,
            x: boss.x,
            y: boss.y + BURST_MUZZLE,
            vx: (ux * cos - uy * sin) * burst.speed,
            vy: (ux * sin + uy * cos) * burst.speed,
            r: BURST_RADIUS,
            dmg: BURST_DAMAGE,
            t: 0.0,
            life: BOSS_MISSILE_LIFE,
        }
    })
}

/// Fire the current phase's pattern whenever the attack cooldown expires.
pub fn boss_attack(session: &mut GameSession, dt: f32) {
    let boss = &mut session.boss;
    boss.shoot_cd = (boss.shoot_cd - dt).max(0.0);
    if boss.shoot_cd > 0.0 {
        return;
    }
    let pattern = boss.phase().pattern();
    session.missiles.extend(boss_fan(boss, pattern.fan));
    if let Some(burst) = pattern.burst {
        let (px, py) = (session.player.x, session.player.y);
        session.missiles.extend(boss_aimed_burst(boss, px, py, burst));
    }
    boss.shoot_cd = pattern.cooldown;
}
