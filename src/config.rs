//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`P2D_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use plat2d_math::Vec2;
use serde::{Serialize, Deserialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Physics configuration
    #[serde(default)]
    pub physics: PhysicsSection,
    /// Frame driver configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`P2D_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Optional
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // P2D_PHYSICS__GRAVITY_Y=500 -> physics.gravity_y = 500
        figment = figment.merge(Env::prefixed("P2D_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Physics configuration
///
/// Kept flat so every value can be overridden from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsSection {
    /// Horizontal gravity
    pub gravity_x: f32,
    /// Vertical gravity (positive = downward)
    pub gravity_y: f32,
    /// Horizontal velocity kept per airborne frame
    pub drag_factor: f32,
    /// Clearance left between an entity and the block it was pushed out of
    pub collision_slop: f32,
    /// Depth of the ground sensor below an entity
    pub ground_sensor_depth: f32,
    /// Friction between moving platforms and riders (0..1)
    pub platform_friction: f32,
    /// Upward speed of a jump
    pub jump_speed: f32,
}

impl Default for PhysicsSection {
    fn default() -> Self {
        let defaults = plat2d_physics::PhysicsConfig::default();
        Self {
            gravity_x: defaults.gravity.x,
            gravity_y: defaults.gravity.y,
            drag_factor: defaults.drag_factor,
            collision_slop: defaults.collision_slop,
            ground_sensor_depth: defaults.ground_sensor_depth,
            platform_friction: defaults.platform_friction,
            jump_speed: 400.0,
        }
    }
}

impl PhysicsSection {
    /// Convert to the physics crate's config
    pub fn to_physics_config(&self) -> plat2d_physics::PhysicsConfig {
        plat2d_physics::PhysicsConfig::new(Vec2::new(self.gravity_x, self.gravity_y))
            .with_drag_factor(self.drag_factor)
            .with_collision_slop(self.collision_slop)
            .with_ground_sensor_depth(self.ground_sensor_depth)
            .with_platform_friction(self.platform_friction)
    }
}

/// Frame driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Frames the headless runner advances before exiting
    pub frames: u32,
    /// Fixed physics timestep in seconds
    pub fixed_dt: f32,
    /// Longest frame delta accepted before clamping, in seconds
    pub max_dt: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            fixed_dt: 1.0 / 60.0,
            max_dt: 0.25,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Log every body's position each time this many frames have run (0 = off)
    pub report_interval: u32,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            report_interval: 60,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
