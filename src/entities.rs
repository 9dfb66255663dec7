//! All game entity types and their constructors.

use std::ops::{Index, IndexMut};

use crate::events::GameEvent;
use crate::input::DragState;

// ── Play field ────────────────────────────────────────────────────────────────

/// Logical portrait resolution, independent of the physical display.
pub const LOG_W: f32 = 360.0;
pub const LOG_H: f32 = 720.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Field {
    pub width: f32,
    pub height: f32,
}

impl Default for Field {
    fn default() -> Self {
        Self {
            width: LOG_W,
            height: LOG_H,
        }
    }
}

// ── Status & characters ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Title,
    Playing,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Character {
    /// Wide spread and quicker volleys.
    Luca,
    /// Tight, almost parallel stream.
    Marca,
}

impl Character {
    pub fn other(self) -> Self {
        match self {
            Character::Luca => Character::Marca,
            Character::Marca => Character::Luca,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Character::Luca => "LUCA",
            Character::Marca => "MARCA",
        }
    }
}

/// One value per playable character.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct PerCharacter<T> {
    pub luca: T,
    pub marca: T,
}

impl<T: Copy> PerCharacter<T> {
    pub fn splat(value: T) -> Self {
        Self {
            luca: value,
            marca: value,
        }
    }
}

impl<T> Index<Character> for PerCharacter<T> {
    type Output = T;

    fn index(&self, c: Character) -> &T {
        match c {
            Character::Luca => &self.luca,
            Character::Marca => &self.marca,
        }
    }
}

impl<T> IndexMut<Character> for PerCharacter<T> {
    fn index_mut(&mut self, c: Character) -> &mut T {
        match c {
            Character::Luca => &mut self.luca,
            Character::Marca => &mut self.marca,
        }
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

pub const PLAYER_MAX_HP: f32 = 100.0;
pub const PLAYER_RADIUS: f32 = 14.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub character: Character,
    pub hp: f32,
    pub r: f32,
    pub score: u32,
    pub weapon_level: PerCharacter<u8>,
    /// Highest level each character reached this run (end-of-run stats).
    pub max_weapon_level: PerCharacter<u8>,
}

impl Player {
    pub fn spawn(field: &Field) -> Self {
        Self {
            x: field.width / 2.0,
            y: field.height * 0.82,
            character: Character::Luca,
            hp: PLAYER_MAX_HP,
            r: PLAYER_RADIUS,
            score: 0,
            weapon_level: PerCharacter::splat(1),
            max_weapon_level: PerCharacter::splat(1),
        }
    }

    /// Weapon level of the character currently on the field.
    pub fn level(&self) -> u8 {
        self.weapon_level[self.character]
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

/// A player shot.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    pub dmg: f32,
    /// Seconds alive.
    pub t: f32,
    pub life: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissileOrigin {
    Enemy,
    Boss,
}

/// A shot aimed at the player, fired by an enemy unit or the boss.
#[derive(Clone, Debug, PartialEq)]
pub struct Missile {
    pub origin: MissileOrigin,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    pub dmg: f32,
    pub t: f32,
    pub life: f32,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

/// Horizontal sine weave around `base_x`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weave {
    pub amp: f32,
    pub freq: f32,
    pub base_x: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub r: f32,
    pub hp: f32,
    pub weave: Option<Weave>,
    /// Seconds since spawn; drives the weave.
    pub t: f32,
    /// Re-armed by the spawner and after each shot.
    pub shoot_cd: f32,
}

// ── Items ─────────────────────────────────────────────────────────────────────

pub const ITEM_FALL_SPEED: f32 = 140.0;
pub const ITEM_RADIUS: f32 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// Raises the active character's weapon level.
    Upgrade,
    /// Restores health.
    Heal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub x: f32,
    pub y: f32,
    pub vy: f32,
    pub r: f32,
}

impl Item {
    pub fn drop_at(kind: ItemKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            x,
            y,
            vy: ITEM_FALL_SPEED,
            r: ITEM_RADIUS,
        }
    }
}

// ── Boss ──────────────────────────────────────────────────────────────────────

pub const BOSS_START_Y: f32 = -160.0;
pub const BOSS_FIRST_ATTACK_DELAY: f32 = 1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Seconds since activation.
    pub t: f32,
    pub entered: bool,
    /// Value of `t` when the entry finished.
    pub entered_at: f32,
    pub active: bool,
    pub shoot_cd: f32,
}

impl Boss {
    pub fn dormant(field: &Field, max_hp: f32, r: f32) -> Self {
        Self {
            x: field.width / 2.0,
            y: BOSS_START_Y,
            r,
            hp: max_hp,
            max_hp,
            t: 0.0,
            entered: false,
            entered_at: 0.0,
            active: false,
            shoot_cd: BOSS_FIRST_ATTACK_DELAY,
        }
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            return 0.0;
        }
        self.hp / self.max_hp
    }

    /// Seconds since the entry finished; zero before that.
    pub fn motion_time(&self) -> f32 {
        if self.entered {
            (self.t - self.entered_at).max(0.0)
        } else {
            0.0
        }
    }
}

// ── End-of-run stats ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct ClearStats {
    /// Seconds spent in PLAY.
    pub elapsed: f32,
    pub score: u32,
    pub max_levels: PerCharacter<u8>,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything one run owns.  Subsystems receive it explicitly; nothing lives
/// in module-level state.
#[derive(Clone, Debug, PartialEq)]
pub struct GameSession {
    pub status: GameStatus,
    pub field: Field,
    /// Seconds spent in PLAY this run.
    pub time_in_play: f32,
    pub frame: u64,
    pub player: Player,
    pub drag: DragState,
    pub bullets: Vec<Bullet>,
    pub enemies: Vec<Enemy>,
    pub missiles: Vec<Missile>,
    pub items: Vec<Item>,
    pub boss: Boss,
    pub fire_cd: f32,
    pub spawn_cd: f32,
    pub max_weapon_level: u8,
    /// Written every frame; the only thing the music scheduler reads.
    pub boss_urgent: bool,
    pub clear_stats: Option<ClearStats>,
    pub(crate) events: Vec<GameEvent>,
}

impl GameSession {
    /// Drain the UI notifications raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[GameEvent] {
        &self.events
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }
}
