//! Stage provider contract and the built-in Stage 1 content.
//!
//! The core never hard-codes what a stage looks like: enemies come from
//! [`Stage::spawn_enemy`], the boss's post-entry motion from
//! [`Stage::update_boss`], the backdrop from [`Stage::draw_background`], and
//! every number from [`Stage::tuning`].

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

use crate::config::StageTuning;
use crate::entities::{Boss, Enemy, Field, Weave};
use crate::geometry::{clamp, rand_range};
use crate::render::{Painter, Rgba};

/// What the background routine may look at.
#[derive(Clone, Copy, Debug)]
pub struct BackgroundEnv {
    pub field: Field,
    pub time_in_play: f32,
    /// Boss health ratio once the boss is on screen, for mood shifts.
    pub boss_ratio: Option<f32>,
}

pub trait Stage {
    fn tuning(&self) -> &StageTuning;

    /// Produce one enemy, or `None` to leave a gap in the wave.
    fn spawn_enemy(&mut self, field: &Field, rng: &mut dyn RngCore) -> Option<Enemy>;

    /// Move the boss after its entry has completed.
    fn update_boss(&mut self, boss: &mut Boss, dt: f32, field: &Field);

    fn draw_background(&mut self, painter: &mut dyn Painter, dt: f32, env: &BackgroundEnv);
}

// ── Stage 1: the lab corridor ─────────────────────────────────────────────────

const STAR_COUNT: usize = 48;
const BACKGROUND_SEED: u64 = 0x7e1a_0001;

/// Chance that the factory skips a slot.
const LULL_CHANCE: f32 = 0.08;
/// Chance of a fast, non-weaving diver instead of a weaver.
const DIVER_CHANCE: f32 = 0.15;

const C_SKY_TOP: Rgba = Rgba::rgb(10, 14, 30);
const C_SKY_MID: Rgba = Rgba::rgb(16, 22, 44);
const C_SKY_LOW: Rgba = Rgba::rgb(22, 30, 58);
const C_STAR: Rgba = Rgba::new(200, 220, 255, 0.75);
const C_GRID: Rgba = Rgba::new(90, 140, 220, 0.18);
const C_ALERT: Rgba = Rgba::rgb(255, 60, 60);

#[derive(Clone, Debug)]
struct Star {
    x: f32,
    y: f32,
    speed: f32,
    r: f32,
}

pub struct StageOne {
    tuning: StageTuning,
    stars: Vec<Star>,
    grid_scroll: f32,
}

impl StageOne {
    pub fn new(tuning: StageTuning) -> Self {
        let field = Field::default();
        let mut rng = StdRng::seed_from_u64(BACKGROUND_SEED);
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: rand_range(&mut rng, 0.0, field.width),
                y: rand_range(&mut rng, 0.0, field.height),
                speed: rand_range(&mut rng, 18.0, 90.0),
                r: rand_range(&mut rng, 0.6, 1.8),
            })
            .collect();
        Self {
            tuning,
            stars,
            grid_scroll: 0.0,
        }
    }
}

impl Default for StageOne {
    fn default() -> Self {
        Self::new(StageTuning::default())
    }
}

impl Stage for StageOne {
    fn tuning(&self) -> &StageTuning {
        &self.tuning
    }

    fn spawn_enemy(&mut self, field: &Field, rng: &mut dyn RngCore) -> Option<Enemy> {
        if rng.gen::<f32>() < LULL_CHANCE {
            return None;
        }
        let x = rand_range(rng, 36.0, field.width - 36.0);
        let enemy = if rng.gen::<f32>() < DIVER_CHANCE {
            Enemy {
                x,
                y: -40.0,
                vy: rand_range(rng, 180.0, 220.0),
                r: 16.0,
                hp: 20.0,
                weave: None,
                t: 0.0,
                shoot_cd: 0.0,
            }
        } else {
            Enemy {
                x,
                y: -40.0,
                vy: rand_range(rng, 95.0, 150.0),
                r: 20.0,
                hp: 30.0,
                weave: Some(Weave {
                    amp: rand_range(rng, 18.0, 56.0),
                    freq: rand_range(rng, 1.6, 2.8),
                    base_x: x,
                }),
                t: 0.0,
                shoot_cd: 0.0,
            }
        };
        Some(enemy)
    }

    fn update_boss(&mut self, boss: &mut Boss, _dt: f32, field: &Field) {
        let rest_y = self.tuning.boss.rest_y;
        let t = boss.motion_time();
        let sway = (t * 0.7).sin() * field.width * 0.28;
        boss.x = clamp(field.width / 2.0 + sway, boss.r, field.width - boss.r);
        boss.y = rest_y + (t * 1.3).sin() * 14.0;
    }

    fn draw_background(&mut self, painter: &mut dyn Painter, dt: f32, env: &BackgroundEnv) {
        let Field { width, height } = env.field;
        let band = height / 3.0;
        painter.fill_rect(0.0, 0.0, width, band, C_SKY_TOP);
        painter.fill_rect(0.0, band, width, band, C_SKY_MID);
        painter.fill_rect(0.0, band * 2.0, width, height - band * 2.0, C_SKY_LOW);

        // Floor grid scrolls faster once the run is underway.
        let grid_speed = if env.time_in_play > 0.0 { 60.0 } else { 20.0 };
        self.grid_scroll = (self.grid_scroll + grid_speed * dt) % 80.0;
        let mut y = self.grid_scroll - 80.0;
        while y < height {
            painter.fill_rect(0.0, y, width, 1.0, C_GRID);
            y += 80.0;
        }

        for star in &mut self.stars {
            star.y += star.speed * dt;
            if star.y > height {
                star.y -= height;
            }
            painter.fill_circle(star.x, star.y, star.r, C_STAR);
        }

        if let Some(ratio) = env.boss_ratio {
            if ratio <= 0.5 {
                let strength = clamp((0.5 - ratio) / 0.5, 0.0, 1.0);
                painter.fill_rect(0.0, 0.0, width, height, C_ALERT.with_alpha(0.06 + 0.08 * strength));
            }
        }
    }
}
