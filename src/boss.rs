//! Boss phase machine, entry sequence and per-frame boss update.
//!
//! The phase is never stored: it is recomputed from the health ratio every
//! time it is needed, so it can't drift from the health bar.

use crate::compute::resolve_boss_defeat;
use crate::entities::{Boss, GameSession};
use crate::stage::Stage;
use crate::weapons::boss_attack;

/// Health ratio at or below which the music turns urgent and the screen dims.
pub const URGENT_RATIO: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BossPhase {
    /// Ratio ≥ 0.55: narrow fan only.
    Opening,
    /// Ratio < 0.55: wider fan plus an aimed burst.
    Pressing,
    /// Ratio < 0.25: widest fan, heavier burst, shortest cooldown.
    Desperate,
}

/// Radial fan centred on straight down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FanSpec {
    pub count: usize,
    pub speed: f32,
    /// Half-angle from the centre line to the outermost shot (radians).
    pub spread: f32,
}

/// Shots aimed at the player, fanned by `gap` radians between neighbours.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstSpec {
    pub count: usize,
    pub speed: f32,
    pub gap: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackPattern {
    pub fan: FanSpec,
    pub burst: Option<BurstSpec>,
    /// Re-armed after every volley.
    pub cooldown: f32,
}

impl BossPhase {
    pub fn from_ratio(ratio: f32) -> Self {
        if ratio < 0.25 {
            BossPhase::Desperate
        } else if ratio < 0.55 {
            BossPhase::Pressing
        } else {
            BossPhase::Opening
        }
    }

    /// 0, 1 or 2.
    pub fn index(self) -> u8 {
        match self {
            BossPhase::Opening => 0,
            BossPhase::Pressing => 1,
            BossPhase::Desperate => 2,
        }
    }

    pub fn pattern(self) -> AttackPattern {
        match self {
            BossPhase::Opening => AttackPattern {
                fan: FanSpec { count: 5, speed: 300.0, spread: 0.55 },
                burst: None,
                cooldown: 1.05,
            },
            BossPhase::Pressing => AttackPattern {
                fan: FanSpec { count: 7, speed: 320.0, spread: 0.75 },
                burst: Some(BurstSpec { count: 3, speed: 340.0, gap: 0.10 }),
                cooldown: 0.95,
            },
            BossPhase::Desperate => AttackPattern {
                fan: FanSpec { count: 9, speed: 340.0, spread: 0.95 },
                burst: Some(BurstSpec { count: 5, speed: 360.0, gap: 0.12 }),
                cooldown: 0.70,
            },
        }
    }
}

impl Boss {
    pub fn phase(&self) -> BossPhase {
        BossPhase::from_ratio(self.hp_ratio())
    }
}

pub fn is_urgent(ratio: f32) -> bool {
    ratio <= URGENT_RATIO
}

/// Opacity of the full-screen dim, growing linearly as health falls below
/// half.  `None` above the threshold.
pub fn dim_overlay_alpha(ratio: f32) -> Option<f32> {
    if ratio > URGENT_RATIO {
        return None;
    }
    let depth = ((URGENT_RATIO - ratio) / URGENT_RATIO).clamp(0.0, 1.0);
    Some(0.10 + 0.12 * depth)
}

/// Move the boss down from off-screen.  Returns `true` on the frame the
/// resting altitude is reached.
pub fn advance_entry(boss: &mut Boss, dt: f32, speed: f32, rest_y: f32) -> bool {
    if boss.entered {
        return false;
    }
    boss.y += speed * dt;
    if boss.y >= rest_y {
        boss.y = rest_y;
        boss.entered = true;
        boss.entered_at = boss.t;
        return true;
    }
    false
}

/// Entry or stage motion, urgency flag, attacks and defeat check.
/// Only runs while the boss is active during PLAY.
pub fn update_boss(session: &mut GameSession, stage: &mut dyn Stage, dt: f32) {
    if !session.boss.active || !session.is_playing() {
        return;
    }
    let field = session.field;
    let (entry_speed, rest_y) = {
        let stats = &stage.tuning().boss;
        (stats.entry_speed, stats.rest_y)
    };

    session.boss.t += dt;
    if session.boss.entered {
        stage.update_boss(&mut session.boss, dt, &field);
    } else if advance_entry(&mut session.boss, dt, entry_speed, rest_y) {
        log::debug!("boss entry complete at t={:.2}s", session.boss.t);
    }

    let urgent = is_urgent(session.boss.hp_ratio());
    if urgent != session.boss_urgent {
        log::debug!("boss urgent mode -> {urgent}");
    }
    session.boss_urgent = urgent;

    if session.boss.entered {
        boss_attack(session, dt);
    }

    if session.boss.hp <= 0.0 {
        resolve_boss_defeat(session, stage.tuning());
    }
}
