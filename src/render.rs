//! HUD and entity drawing against an abstract [`Painter`].
//!
//! Only translates state into draw calls; no game logic lives here.  A
//! painter that cannot show a sprite reports it, and the entity is drawn as a
//! primitive circle instead.

use crate::boss::dim_overlay_alpha;
use crate::entities::{
    Character, Enemy, GameSession, GameStatus, ItemKind, MissileOrigin, PLAYER_MAX_HP,
};
use crate::geometry::format_clock;
use crate::stage::{BackgroundEnv, Stage};

// ── Colours ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Parse `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

const C_TEXT: Rgba = Rgba::new(232, 242, 255, 0.9);
const C_TEXT_STRONG: Rgba = Rgba::new(232, 242, 255, 0.96);
const C_PANEL: Rgba = Rgba::new(0, 0, 0, 0.35);
const C_CARD: Rgba = Rgba::new(12, 16, 28, 0.72);
const C_HP: Rgba = Rgba::new(255, 90, 90, 0.85);
const C_BOSS_BAR: Rgba = Rgba::new(255, 120, 120, 0.9);
const C_BAR_TRACK: Rgba = Rgba::new(255, 255, 255, 0.12);
const C_PLAYER: Rgba = Rgba::new(232, 242, 255, 0.9);
const C_ENEMY: Rgba = Rgba::new(80, 160, 255, 0.95);
const C_BOSS: Rgba = Rgba::new(255, 90, 90, 0.95);
const C_ITEM_GUN: Rgba = Rgba::new(255, 220, 120, 0.95);
const C_ITEM_HEAL: Rgba = Rgba::new(118, 210, 200, 0.95);
const C_BULLET: Rgba = Rgba::new(232, 242, 255, 0.95);
const C_MISSILE_ENEMY: Rgba = Rgba::new(255, 180, 90, 0.95);
const C_MISSILE_BOSS: Rgba = Rgba::new(255, 130, 70, 0.95);

// ── Painter contract ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteId {
    Luca,
    Marca,
    RoboBlue,
    RoboRed,
    Gun,
    FishCan,
}

impl SpriteId {
    pub fn for_character(c: Character) -> Self {
        match c {
            Character::Luca => SpriteId::Luca,
            Character::Marca => SpriteId::Marca,
        }
    }

    pub fn for_item(kind: ItemKind) -> Self {
        match kind {
            ItemKind::Upgrade => SpriteId::Gun,
            ItemKind::Heal => SpriteId::FishCan,
        }
    }
}

/// Drawing surface in logical field coordinates.
pub trait Painter {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);
    fn fill_circle(&mut self, x: f32, y: f32, r: f32, color: Rgba);
    fn text(&mut self, x: f32, y: f32, text: &str, color: Rgba, align: Align);
    /// Draw `sprite` centred on (x, y).  Returns `false` if the sprite is not
    /// available, in which case nothing was drawn.
    fn sprite(&mut self, sprite: SpriteId, x: f32, y: f32, size: f32) -> bool;
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Draw one complete frame.
pub fn draw_frame(painter: &mut dyn Painter, session: &GameSession, stage: &mut dyn Stage, dt: f32) {
    let boss = &session.boss;
    let env = BackgroundEnv {
        field: session.field,
        time_in_play: session.time_in_play,
        boss_ratio: boss.active.then(|| boss.hp_ratio()),
    };
    stage.draw_background(painter, dt, &env);

    let tuning = stage.tuning();

    for enemy in &session.enemies {
        draw_enemy(painter, enemy, tuning.enemy_size);
    }
    if boss.active {
        if !painter.sprite(SpriteId::RoboRed, boss.x, boss.y, tuning.boss.size) {
            painter.fill_circle(boss.x, boss.y, boss.r, C_BOSS);
        }
    }
    for item in &session.items {
        if !painter.sprite(SpriteId::for_item(item.kind), item.x, item.y, 44.0) {
            let color = match item.kind {
                ItemKind::Upgrade => C_ITEM_GUN,
                ItemKind::Heal => C_ITEM_HEAL,
            };
            painter.fill_circle(item.x, item.y, 10.0, color);
        }
    }
    for m in &session.missiles {
        let color = match m.origin {
            MissileOrigin::Enemy => C_MISSILE_ENEMY,
            MissileOrigin::Boss => C_MISSILE_BOSS,
        };
        painter.fill_circle(m.x, m.y, m.r, color);
    }
    for b in &session.bullets {
        painter.fill_circle(b.x, b.y, b.r, C_BULLET);
    }

    let p = &session.player;
    if !painter.sprite(SpriteId::for_character(p.character), p.x, p.y, tuning.player_size) {
        painter.fill_circle(p.x, p.y, 22.0, C_PLAYER);
    }

    if boss.active {
        if let Some(alpha) = dim_overlay_alpha(boss.hp_ratio()) {
            painter.fill_rect(0.0, 0.0, session.field.width, session.field.height, Rgba::new(0, 0, 0, alpha));
        }
    }

    draw_hud(painter, session, &tuning.boss.name, tuning.debug);

    match session.status {
        GameStatus::Title => draw_title(painter, session),
        GameStatus::Won => draw_clear_stats(painter, session, &tuning.name),
        GameStatus::Lost => draw_lost(painter, session),
        GameStatus::Playing => {}
    }
}

fn draw_enemy(painter: &mut dyn Painter, enemy: &Enemy, size: f32) {
    if !painter.sprite(SpriteId::RoboBlue, enemy.x, enemy.y, size) {
        painter.fill_circle(enemy.x, enemy.y, enemy.r + 6.0, C_ENEMY);
    }
}

// ── HUD ───────────────────────────────────────────────────────────────────────

fn draw_hud(painter: &mut dyn Painter, session: &GameSession, boss_name: &str, debug: bool) {
    let w = session.field.width;
    let h = session.field.height;
    let p = &session.player;

    // HP
    painter.fill_rect(8.0, 8.0, 140.0, 34.0, C_PANEL);
    painter.text(14.0, 22.0, "HP", C_TEXT, Align::Left);
    painter.fill_rect(36.0, 14.0, 104.0, 10.0, C_BAR_TRACK);
    painter.fill_rect(36.0, 14.0, 104.0 * (p.hp / PLAYER_MAX_HP), 10.0, C_HP);

    painter.text(w - 10.0, 24.0, &format!("SCORE {}", p.score), C_TEXT_STRONG, Align::Right);

    let levels = format!(
        "LUCA LV.{}  MARCA LV.{}",
        p.weapon_level.luca, p.weapon_level.marca
    );
    painter.text(10.0, h - 10.0, &levels, C_TEXT, Align::Left);

    let boss = &session.boss;
    if boss.active {
        let (bw, bh) = (260.0, 12.0);
        let x = (w - bw) / 2.0;
        let y = 40.0;
        painter.fill_rect(x - 8.0, y - 10.0, bw + 16.0, bh + 28.0, C_PANEL);
        painter.text(x, y, boss_name, C_TEXT, Align::Left);
        painter.fill_rect(x, y + 6.0, bw, bh, C_BAR_TRACK);
        painter.fill_rect(x, y + 6.0, bw * boss.hp_ratio().max(0.0), bh, C_BOSS_BAR);
    }

    if debug {
        painter.text(10.0, h - 44.0, &format!("STATE: {:?}", session.status), C_TEXT, Align::Left);
        painter.text(
            10.0,
            h - 28.0,
            &format!("ENEMIES: {}  TIME: {:.1}s", session.enemies.len(), session.time_in_play),
            C_TEXT,
            Align::Left,
        );
    }
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_title(painter: &mut dyn Painter, session: &GameSession) {
    let (cx, h) = (session.field.width / 2.0, session.field.height);
    painter.fill_rect(0.0, 0.0, session.field.width, h, Rgba::new(0, 0, 0, 0.45));
    painter.text(cx, h * 0.40, "TERRA ESCAPE LAB", C_TEXT_STRONG, Align::Center);
    painter.text(cx, h * 0.40 + 24.0, "TOUCH TO START", C_TEXT, Align::Center);
}

fn draw_lost(painter: &mut dyn Painter, session: &GameSession) {
    let (cx, h) = (session.field.width / 2.0, session.field.height);
    painter.fill_rect(0.0, 0.0, session.field.width, h, Rgba::new(0, 0, 0, 0.55));
    painter.text(cx, h / 2.0 - 10.0, "SIGNAL LOST", C_TEXT_STRONG, Align::Center);
    painter.text(cx, h / 2.0 + 16.0, "RESTART TO TRY AGAIN", C_TEXT, Align::Center);
}

fn draw_clear_stats(painter: &mut dyn Painter, session: &GameSession, stage_name: &str) {
    let Some(stats) = &session.clear_stats else {
        return;
    };
    let w = session.field.width;
    let (cx, h) = (w / 2.0, session.field.height);

    painter.fill_rect(0.0, 0.0, w, h, Rgba::new(0, 0, 0, 0.60));
    painter.text(cx, h * 0.38, &format!("{stage_name} CLEAR"), C_TEXT_STRONG, Align::Center);
    painter.text(cx, h * 0.38 + 22.0, "LAB LOG SUMMARY", C_TEXT, Align::Center);

    let (card_w, card_h) = (280.0, 150.0);
    let x = (w - card_w) / 2.0;
    let y = h * 0.45;
    painter.fill_rect(x, y, card_w, card_h, C_CARD);

    let lines = [
        format!("TIME  : {}", format_clock(stats.elapsed)),
        format!("SCORE : {}", stats.score),
        format!("MAX LV (LUCA)  : {}", stats.max_levels.luca),
        format!("MAX LV (MARCA) : {}", stats.max_levels.marca),
    ];
    for (i, line) in lines.iter().enumerate() {
        painter.text(x + 18.0, y + 38.0 + 26.0 * i as f32, line, C_TEXT_STRONG, Align::Left);
    }

    painter.text(cx, h * 0.66, "RESTART TO PLAY AGAIN", C_TEXT, Align::Center);
}
