use terra_escape::config::{StageTuning, WeaponProfile};
use terra_escape::error::ConfigError;

const SHIPPED: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/stage1.toml");

#[test]
fn built_in_tuning_is_valid() {
    assert!(StageTuning::default().validate().is_ok());
}

#[test]
fn shipped_stage_file_matches_built_in_values() {
    let loaded = StageTuning::load(SHIPPED).expect("shipped stage file loads");
    assert_eq!(loaded, StageTuning::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let tuning = StageTuning::from_toml_str(
        "heal_amount = 40.0\n[boss]\nmax_hp = 500.0\n",
        "inline",
    )
    .expect("valid override");
    assert_eq!(tuning.heal_amount, 40.0);
    assert_eq!(tuning.boss.max_hp, 500.0);
    assert_eq!(tuning.boss.appear_at, 18.0);
    assert_eq!(tuning.spawn_interval, [0.42, 0.72]);
    assert_eq!(tuning.score.enemy_kill, 60);
}

#[test]
fn partial_weapon_profile_falls_back_to_its_own_character() {
    let tuning = StageTuning::from_toml_str("[weapons.marca]\nbase_damage = 15.0\n", "inline")
        .expect("valid override");
    let marca = tuning.weapons.marca;
    assert_eq!(marca.base_damage, 15.0);
    assert_eq!(marca.interval, WeaponProfile::MARCA.interval);
    assert_eq!(marca.spread_base, WeaponProfile::MARCA.spread_base);
    assert_eq!(tuning.weapons.luca, WeaponProfile::LUCA);
}

#[test]
fn drop_rates_above_one_are_rejected() {
    let err = StageTuning::from_toml_str("[drop_rates]\ngun = 0.8\nheal = 0.4\n", "inline")
        .expect_err("rates sum past 1");
    assert!(matches!(err, ConfigError::OutOfRange { .. }));
}

#[test]
fn inverted_spawn_interval_is_rejected() {
    let err = StageTuning::from_toml_str("spawn_interval = [0.9, 0.3]\n", "inline")
        .expect_err("max below min");
    assert!(matches!(err, ConfigError::OutOfRange { name: "spawn_interval", .. }));
}

#[test]
fn boss_rest_altitude_must_be_on_screen() {
    for rest_y in ["nan", "5000.0", "-300.0", "inf"] {
        let doc = format!("[boss]\nrest_y = {rest_y}\n");
        let err = StageTuning::from_toml_str(&doc, "inline").expect_err("rest_y off the field");
        assert!(matches!(err, ConfigError::OutOfRange { name: "boss.rest_y", .. }), "{rest_y}: {err:?}");
    }
    assert!(StageTuning::from_toml_str("[boss]\nrest_y = 240.0\n", "inline").is_ok());
}

#[test]
fn weapon_numbers_must_be_finite() {
    for key in ["base_damage", "damage_per_level", "spread_base", "spread_per_level"] {
        let doc = format!("[weapons.luca]\n{key} = nan\n");
        let err = StageTuning::from_toml_str(&doc, "inline").expect_err("non-finite weapon value");
        assert!(matches!(err, ConfigError::OutOfRange { name: "weapons.luca", .. }), "{key}: {err:?}");
    }
    let err = StageTuning::from_toml_str("[weapons.marca]\nbase_damage = inf\n", "inline")
        .expect_err("infinite damage");
    assert!(matches!(err, ConfigError::OutOfRange { name: "weapons.marca", .. }));
}

#[test]
fn bad_letterbox_colour_is_rejected() {
    let err = StageTuning::from_toml_str("letterbox_color = \"navy\"\n", "inline")
        .expect_err("not a hex colour");
    assert!(matches!(err, ConfigError::InvalidColor(ref c) if c == "navy"));
}

#[test]
fn malformed_toml_reports_the_path() {
    let err = StageTuning::from_toml_str("heal_amount = = 3", "broken.toml").expect_err("bad syntax");
    match err {
        ConfigError::Parse { path, .. } => assert_eq!(path, "broken.toml"),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_a_read_error_and_falls_back() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/no_such_stage.toml");
    assert!(matches!(StageTuning::load(path), Err(ConfigError::Read { .. })));
    assert_eq!(StageTuning::load_or_default(path), StageTuning::default());
}

#[test]
fn profiles_are_indexed_per_character() {
    let profiles = StageTuning::default().weapon_profiles();
    assert_eq!(profiles.luca, WeaponProfile::LUCA);
    assert_eq!(profiles.marca, WeaponProfile::MARCA);
}
