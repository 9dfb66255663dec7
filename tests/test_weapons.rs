use terra_escape::boss::*;
use terra_escape::collision::{apply_heal, apply_upgrade, roll_drop};
use terra_escape::config::{DropRates, WeaponProfile};
use terra_escape::entities::*;
use terra_escape::weapons::*;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn player() -> Player {
    Player::spawn(&Field::default())
}

fn angle_of(b: &Bullet) -> f32 {
    b.vx.atan2(-b.vy)
}

// ── player volleys ────────────────────────────────────────────────────────────

#[test]
fn level_one_fires_straight_up() {
    let p = player();
    let volley = player_volley(&p, &WeaponProfile::LUCA, 1);
    assert_eq!(volley.len(), 1);
    assert_relative_eq!(volley[0].vx, 0.0);
    assert_relative_eq!(volley[0].vy, -820.0);
    assert_relative_eq!(volley[0].y, p.y - 28.0);
    assert_relative_eq!(volley[0].dmg, 12.0);
}

#[test]
fn level_three_luca_spreads_symmetrically() {
    let volley = player_volley(&player(), &WeaponProfile::LUCA, 3);
    assert_eq!(volley.len(), 3);
    let max = 0.10 + 0.06 * 2.0;
    assert_relative_eq!(angle_of(&volley[0]), -max, epsilon = 1e-5);
    assert_relative_eq!(angle_of(&volley[1]), 0.0, epsilon = 1e-5);
    assert_relative_eq!(angle_of(&volley[2]), max, epsilon = 1e-5);
    assert!(volley.iter().all(|b| (b.dmg - 16.0).abs() < 1e-6));
}

#[test]
fn marca_stream_is_tight() {
    let volley = player_volley(&player(), &WeaponProfile::MARCA, 5);
    assert_eq!(volley.len(), 5);
    let max = 0.02 + 0.005 * 4.0;
    assert_relative_eq!(angle_of(&volley[4]), max, epsilon = 1e-5);
    assert_relative_eq!(volley[0].dmg, 18.0);
}

#[test]
fn damage_and_spread_scale_per_level() {
    assert_relative_eq!(damage_for(&WeaponProfile::LUCA, 1), 12.0);
    assert_relative_eq!(damage_for(&WeaponProfile::LUCA, 5), 20.0);
    assert_relative_eq!(spread_for(&WeaponProfile::MARCA, 1), 0.02);
}

// ── enemy fire ────────────────────────────────────────────────────────────────

#[test]
fn enemies_hold_fire_above_the_line() {
    let tuning = terra_escape::config::StageTuning {
        enemy_shoot_chance_per_sec: 1000.0,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(42);
    let mut e = Enemy { x: 100.0, y: 30.0, vy: 0.0, r: 20.0, hp: 30.0, weave: None, t: 0.0, shoot_cd: 0.0 };
    assert!(enemy_try_fire(&mut e, &tuning, 0.016, &mut rng).is_none());

    e.y = 41.0;
    let shot = enemy_try_fire(&mut e, &tuning, 0.016, &mut rng).expect("certain shot");
    assert_eq!(shot.origin, MissileOrigin::Enemy);
    assert_relative_eq!(shot.y, 59.0);
    assert!(shot.vy >= 240.0 && shot.vy < 320.0);
    assert!(e.shoot_cd >= 0.9 && e.shoot_cd < 1.6);
}

// ── boss phases ───────────────────────────────────────────────────────────────

#[test]
fn phase_follows_health_ratio() {
    assert_eq!(BossPhase::from_ratio(0.8), BossPhase::Opening);
    assert_eq!(BossPhase::from_ratio(0.55), BossPhase::Opening);
    assert_eq!(BossPhase::from_ratio(0.5), BossPhase::Pressing);
    assert_eq!(BossPhase::from_ratio(0.25), BossPhase::Pressing);
    assert_eq!(BossPhase::from_ratio(0.2), BossPhase::Desperate);
    assert_eq!(BossPhase::from_ratio(0.2).index(), 2);
}

#[test]
fn phase_patterns_escalate() {
    let p0 = BossPhase::Opening.pattern();
    let p1 = BossPhase::Pressing.pattern();
    let p2 = BossPhase::Desperate.pattern();
    assert_eq!((p0.fan.count, p0.burst.map(|b| b.count)), (5, None));
    assert_eq!((p1.fan.count, p1.burst.map(|b| b.count)), (7, Some(3)));
    assert_eq!((p2.fan.count, p2.burst.map(|b| b.count)), (9, Some(5)));
    assert!(p0.cooldown > p1.cooldown && p1.cooldown > p2.cooldown);
}

#[test]
fn boss_fan_is_centred_on_straight_down() {
    let boss = Boss { x: 180.0, y: 150.0, ..Boss::dormant(&Field::default(), 3000.0, 34.0) };
    let fan: Vec<Missile> = boss_fan(&boss, BossPhase::Opening.pattern().fan).collect();
    assert_eq!(fan.len(), 5);
    assert_relative_eq!(fan[2].vx, 0.0, epsilon = 1e-3);
    assert_relative_eq!(fan[2].vy, 300.0, epsilon = 1e-3);
    assert_relative_eq!(fan[0].vx, -fan[4].vx, epsilon = 1e-3);
    assert!(fan.iter().all(|m| m.y == 190.0 && m.dmg == 14.0));
}

#[test]
fn aimed_burst_points_at_the_target() {
    let boss = Boss { x: 180.0, y: 150.0, ..Boss::dormant(&Field::default(), 3000.0, 34.0) };
    let pattern = BossPhase::Pressing.pattern().burst.expect("burst in phase 1");
    let burst: Vec<Missile> = boss_aimed_burst(&boss, 180.0, 600.0, pattern).collect();
    assert_eq!(burst.len(), 3);
    assert_relative_eq!(burst[1].vx, 0.0, epsilon = 1e-3);
    assert_relative_eq!(burst[1].vy, 340.0, epsilon = 1e-3);
    assert!(burst.iter().all(|m| m.y == 180.0 && m.dmg == 16.0));
}

#[test]
fn urgency_and_dim_overlay() {
    assert!(!is_urgent(0.51));
    assert!(is_urgent(0.5));
    assert_eq!(dim_overlay_alpha(0.6), None);
    assert_relative_eq!(dim_overlay_alpha(0.5).unwrap_or(-1.0), 0.10);
    assert_relative_eq!(dim_overlay_alpha(0.0).unwrap_or(-1.0), 0.22, epsilon = 1e-6);
}

#[test]
fn entry_stops_at_rest_altitude() {
    let mut boss = Boss::dormant(&Field::default(), 3000.0, 34.0);
    assert!(!advance_entry(&mut boss, 1.0, 120.0, 150.0));
    assert_relative_eq!(boss.y, -40.0);
    assert!(!advance_entry(&mut boss, 1.0, 120.0, 150.0));
    assert!(advance_entry(&mut boss, 1.0, 120.0, 150.0));
    assert_relative_eq!(boss.y, 150.0);
    assert!(boss.entered);
}

// ── drops & pickups ───────────────────────────────────────────────────────────

#[test]
fn heal_is_rolled_before_upgrade() {
    let rates = DropRates { gun: 0.2, heal: 0.1 };
    assert_eq!(roll_drop(&rates, 0.05), Some(ItemKind::Heal));
    assert_eq!(roll_drop(&rates, 0.15), Some(ItemKind::Upgrade));
    assert_eq!(roll_drop(&rates, 0.29), Some(ItemKind::Upgrade));
    assert_eq!(roll_drop(&rates, 0.35), None);
}

#[test]
fn weapon_level_stays_in_bounds() {
    let mut p = player();
    for _ in 0..10 {
        apply_upgrade(&mut p, 5);
        assert!((1..=5).contains(&p.level()));
    }
    assert_eq!(p.level(), 5);
    assert_eq!(p.max_weapon_level.luca, 5);
}

#[test]
fn heal_never_exceeds_max() {
    let mut p = player();
    p.hp = 80.0;
    apply_heal(&mut p, 22.0);
    assert_eq!(p.hp, 100.0);
}
