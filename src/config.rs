//! Stage tuning loaded from `assets/stage1.toml`.
//!
//! [`StageTuning`] mirrors every number a stage is allowed to change.  Every
//! struct is `#[serde(default)]`, so a minimal TOML can override just the
//! values you care about and everything else keeps the built-in Stage 1
//! numbers.
//!
//! The table is validated once at load time ([`StageTuning::validate`]); the
//! simulation then reads fields directly without any fallback logic.
//!
//! ## Tuning workflow
//!
//! 1. Edit `assets/stage1.toml` (or point `TERRA_ESCAPE_STAGE` at another file).
//! 2. Restart the game; no recompilation required.

use std::path::Path;

use serde::Deserialize;

use crate::entities::{PerCharacter, BOSS_START_Y, LOG_H};
use crate::error::{ConfigError, ConfigResult};
use crate::render::Rgba;

pub const DEFAULT_STAGE_PATH: &str = "assets/stage1.toml";
pub const STAGE_PATH_ENV: &str = "TERRA_ESCAPE_STAGE";

// ── Drop table & scoring ─────────────────────────────────────────────────────

/// Probability of each item kind on an enemy kill.  Heal is rolled first.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DropRates {
    pub gun: f32,
    pub heal: f32,
}

impl Default for DropRates {
    fn default() -> Self {
        Self {
            gun: 0.20,
            heal: 0.10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreTable {
    pub enemy_kill: u32,
    pub boss_kill: u32,
}

impl Default for ScoreTable {
    fn default() -> Self {
        Self {
            enemy_kill: 60,
            boss_kill: 900,
        }
    }
}

// ── Boss ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossStats {
    pub name: String,
    pub max_hp: f32,
    /// Seconds of play before the boss activates.
    pub appear_at: f32,
    /// Sprite size in logical pixels.
    pub size: f32,
    /// Hit radius.
    pub radius: f32,
    /// Descent speed during the entry.
    pub entry_speed: f32,
    /// Altitude where the entry ends and stage motion takes over.
    pub rest_y: f32,
}

impl Default for BossStats {
    fn default() -> Self {
        Self {
            name: "ROBO-RED".to_string(),
            max_hp: 3000.0,
            appear_at: 18.0,
            size: 170.0,
            radius: 34.0,
            entry_speed: 120.0,
            rest_y: 150.0,
        }
    }
}

// ── Player weapons ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponProfile {
    pub base_damage: f32,
    pub damage_per_level: f32,
    /// Seconds between volleys.
    pub interval: f32,
    /// Half-angle of the fan at level 1 (radians).
    pub spread_base: f32,
    /// Extra half-angle per level above 1.
    pub spread_per_level: f32,
    pub bullet_speed: f32,
}

impl WeaponProfile {
    pub const LUCA: WeaponProfile = WeaponProfile {
        base_damage: 12.0,
        damage_per_level: 2.0,
        interval: 0.12,
        spread_base: 0.10,
        spread_per_level: 0.06,
        bullet_speed: 820.0,
    };

    pub const MARCA: WeaponProfile = WeaponProfile {
        base_damage: 10.0,
        damage_per_level: 2.0,
        interval: 0.14,
        spread_base: 0.02,
        spread_per_level: 0.005,
        bullet_speed: 820.0,
    };
}

/// A profile as written in the stage file.  Missing keys fall back to the
/// character's own built-in profile, not to a shared default.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct ProfileOverride {
    pub base_damage: Option<f32>,
    pub damage_per_level: Option<f32>,
    pub interval: Option<f32>,
    pub spread_base: Option<f32>,
    pub spread_per_level: Option<f32>,
    pub bullet_speed: Option<f32>,
}

impl ProfileOverride {
    fn over(self, base: WeaponProfile) -> WeaponProfile {
        WeaponProfile {
            base_damage: self.base_damage.unwrap_or(base.base_damage),
            damage_per_level: self.damage_per_level.unwrap_or(base.damage_per_level),
            interval: self.interval.unwrap_or(base.interval),
            spread_base: self.spread_base.unwrap_or(base.spread_base),
            spread_per_level: self.spread_per_level.unwrap_or(base.spread_per_level),
            bullet_speed: self.bullet_speed.unwrap_or(base.bullet_speed),
        }
    }
}

/// `[weapons]` as written in the stage file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct WeaponTableOverride {
    pub luca: ProfileOverride,
    pub marca: ProfileOverride,
}

impl From<WeaponTableOverride> for WeaponTable {
    fn from(raw: WeaponTableOverride) -> Self {
        Self {
            luca: raw.luca.over(WeaponProfile::LUCA),
            marca: raw.marca.over(WeaponProfile::MARCA),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "WeaponTableOverride")]
pub struct WeaponTable {
    pub luca: WeaponProfile,
    pub marca: WeaponProfile,
}

impl Default for WeaponTable {
    fn default() -> Self {
        Self {
            luca: WeaponProfile::LUCA,
            marca: WeaponProfile::MARCA,
        }
    }
}

impl From<&WeaponTable> for PerCharacter<WeaponProfile> {
    fn from(table: &WeaponTable) -> Self {
        PerCharacter {
            luca: table.luca,
            marca: table.marca,
        }
    }
}

// ── Stage ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageTuning {
    pub name: String,
    /// Seconds between enemy spawns, drawn uniformly from `[min, max)`.
    pub spawn_interval: [f32; 2],
    pub enemy_shoot_chance_per_sec: f32,
    /// Cooldown after an enemy shot, drawn uniformly from `[min, max)`.
    pub enemy_shoot_cooldown: [f32; 2],
    pub drop_rates: DropRates,
    pub heal_amount: f32,
    pub score: ScoreTable,
    pub boss: BossStats,
    pub player_size: f32,
    pub enemy_size: f32,
    pub max_weapon_level: u8,
    pub weapons: WeaponTable,
    pub letterbox_color: String,
    pub debug: bool,
}

impl Default for StageTuning {
    fn default() -> Self {
        Self {
            name: "STAGE 1".to_string(),
            spawn_interval: [0.42, 0.72],
            enemy_shoot_chance_per_sec: 0.85,
            enemy_shoot_cooldown: [0.9, 1.6],
            drop_rates: DropRates::default(),
            heal_amount: 22.0,
            score: ScoreTable::default(),
            boss: BossStats::default(),
            player_size: 72.0,
            enemy_size: 64.0,
            max_weapon_level: 5,
            weapons: WeaponTable::default(),
            letterbox_color: "#05070d".to_string(),
            debug: false,
        }
    }
}

fn check(name: &'static str, value: f32, ok: bool, expected: &'static str) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            expected,
        })
    }
}

fn check_range(name: &'static str, range: [f32; 2]) -> ConfigResult<()> {
    let [lo, hi] = range;
    check(name, lo, lo >= 0.0 && lo.is_finite(), "[0, ∞)")?;
    check(name, hi, hi >= lo && hi.is_finite(), "[min, ∞)")
}

impl StageTuning {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(contents: &str, path: &str) -> ConfigResult<Self> {
        let tuning: StageTuning = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml_str(&contents, &display)
    }

    /// Load `path`, falling back to the built-in tuning.
    ///
    /// A missing file is not an error.  A malformed or out-of-range file is
    /// logged and ignored so the game still starts.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(tuning) => {
                log::info!("loaded stage tuning from {}", path.display());
                tuning
            }
            Err(ConfigError::Read { .. }) => {
                log::info!("no {} found; using built-in stage tuning", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("{e}; using built-in stage tuning");
                Self::default()
            }
        }
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        check_range("spawn_interval", self.spawn_interval)?;
        check(
            "spawn_interval",
            self.spawn_interval[1],
            self.spawn_interval[1] > 0.0,
            "(0, ∞)",
        )?;
        check_range("enemy_shoot_cooldown", self.enemy_shoot_cooldown)?;
        check(
            "enemy_shoot_chance_per_sec",
            self.enemy_shoot_chance_per_sec,
            self.enemy_shoot_chance_per_sec >= 0.0,
            "[0, ∞)",
        )?;

        let DropRates { gun, heal } = self.drop_rates;
        check("drop_rates.gun", gun, (0.0..=1.0).contains(&gun), "[0, 1]")?;
        check("drop_rates.heal", heal, (0.0..=1.0).contains(&heal), "[0, 1]")?;
        check(
            "drop_rates.gun + drop_rates.heal",
            gun + heal,
            gun + heal <= 1.0,
            "[0, 1]",
        )?;
        check("heal_amount", self.heal_amount, self.heal_amount >= 0.0, "[0, ∞)")?;

        let boss = &self.boss;
        check("boss.max_hp", boss.max_hp, boss.max_hp > 0.0 && boss.max_hp.is_finite(), "(0, ∞)")?;
        check("boss.appear_at", boss.appear_at, boss.appear_at >= 0.0, "[0, ∞)")?;
        check("boss.radius", boss.radius, boss.radius > 0.0, "(0, ∞)")?;
        check(
            "boss.entry_speed",
            boss.entry_speed,
            boss.entry_speed > 0.0 && boss.entry_speed.is_finite(),
            "(0, ∞)",
        )?;
        check(
            "boss.rest_y",
            boss.rest_y,
            boss.rest_y > BOSS_START_Y && boss.rest_y < LOG_H,
            "(-160, 720)",
        )?;

        check(
            "max_weapon_level",
            f32::from(self.max_weapon_level),
            self.max_weapon_level >= 1,
            "[1, 255]",
        )?;
        for (name, profile) in [("weapons.luca", &self.weapons.luca), ("weapons.marca", &self.weapons.marca)] {
            check(name, profile.interval, profile.interval > 0.0, "(0, ∞) interval")?;
            check(name, profile.bullet_speed, profile.bullet_speed > 0.0, "(0, ∞) speed")?;
            for value in [
                profile.base_damage,
                profile.damage_per_level,
                profile.spread_base,
                profile.spread_per_level,
                profile.interval,
                profile.bullet_speed,
            ] {
                check(name, value, value.is_finite(), "finite values")?;
            }
        }

        if Rgba::from_hex(&self.letterbox_color).is_none() {
            return Err(ConfigError::InvalidColor(self.letterbox_color.clone()));
        }
        Ok(())
    }

    pub fn weapon_profiles(&self) -> PerCharacter<WeaponProfile> {
        PerCharacter::from(&self.weapons)
    }
}
