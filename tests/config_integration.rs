//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use plat2d::config::AppConfig;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;

/// Scratch config directory unique to one test
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("plat2d_config_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("P2D_PHYSICS__GRAVITY_Y", "500.0");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.physics.gravity_y, 500.0);
    assert_eq!(config.physics.to_physics_config().gravity.y, 500.0);
    std::env::remove_var("P2D_PHYSICS__GRAVITY_Y");
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("P2D_PHYSICS__GRAVITY_Y");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert!(config.simulation.fixed_dt > 0.0);
    assert!(config.physics.ground_sensor_depth > config.physics.collision_slop);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = scratch_dir("user");
    fs::write(dir.join("default.toml"), "[physics]\ngravity_y = 100.0\ndrag_factor = 0.9\n").unwrap();
    fs::write(dir.join("user.toml"), "[physics]\ngravity_y = 250.0\n").unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.physics.gravity_y, 250.0);
    assert_eq!(config.physics.drag_factor, 0.9);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let dir = scratch_dir("missing").join("nowhere");
    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.simulation.frames, 600);
    assert_eq!(config.debug.log_level, "info");
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    let dir = scratch_dir("malformed");
    fs::write(dir.join("default.toml"), "[physics]\ngravity_y = \"sideways\"\n").unwrap();

    let err = AppConfig::load_from(&dir).unwrap_err();
    assert!(err.to_string().contains("Configuration error"));

    let _ = fs::remove_dir_all(&dir);
}
