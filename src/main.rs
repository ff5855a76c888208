//! plat2d - headless platformer physics runner
//!
//! Loads configuration, builds a demo level, and advances it with the
//! fixed-step driver while logging what the bodies do.

use plat2d::config::AppConfig;
use plat2d::scene::SceneBuilder;
use plat2d::systems::SimulationSystem;
use plat2d_math::Vec2;
use plat2d_physics::{CollisionEvent, ContactSides, DynamicEntity, EventFlow, PhysicsWorld};

/// Horizontal push applied to the demo player every step
const WALK_ACCELERATION: f32 = 600.0;

/// Fastest the demo player walks before the push stops
const WALK_SPEED: f32 = 120.0;

/// Depth below which the demo player counts as lost
const FALL_LIMIT: f32 = 1000.0;

fn build_demo(config: &AppConfig) -> plat2d::scene::Scene {
    let jump_speed = config.physics.jump_speed;

    SceneBuilder::new()
        .with_physics(config.physics.to_physics_config())
        .with_event_sink(|event: &CollisionEvent| {
            log::info!("Event '{}' from {:?} on {:?}", event.name, event.entity, event.block);
            if event.name == "End" {
                EventFlow::EndWorld
            } else {
                EventFlow::Continue
            }
        })
        .add_floor(Vec2::new(0.0, 400.0), 400.0)
        .add_moving_platform(Vec2::new(420.0, 380.0), Vec2::new(700.0, 380.0), 3.0, Vec2::new(100.0, 12.0))
        .add_floor(Vec2::new(820.0, 400.0), 400.0)
        .add_wall(Vec2::new(1220.0, 200.0), 200.0)
        .add_event_block(Vec2::new(1180.0, 360.0), Vec2::new(20.0, 40.0), "End")
        .add_controlled_player(
            Vec2::new(40.0, 360.0),
            Vec2::new(16.0, 32.0),
            move |entity: &mut DynamicEntity, _dt: f32| {
                if entity.velocity().x < WALK_SPEED {
                    entity.add_acceleration(Vec2::new(WALK_ACCELERATION, 0.0));
                }
                // Hop whenever a wall blocks the way
                if entity.contacts().contains(ContactSides::RIGHT) && entity.jump(jump_speed) {
                    log::debug!("Player jumped at {:?}", entity.position());
                }
                // Falling off the level ends the run
                if entity.position().y > FALL_LIMIT {
                    log::info!("Player fell out of the level");
                    return EventFlow::EndWorld;
                }
                EventFlow::Continue
            },
        )
        .build()
}

fn report(world: &PhysicsWorld, frame: u32) {
    for (key, entity) in world.entities() {
        log::info!(
            "frame {:>5} entity {:?}: pos ({:.2}, {:.2}) vel ({:.2}, {:.2}) ground {}",
            frame,
            key,
            entity.position().x,
            entity.position().y,
            entity.velocity().x,
            entity.velocity().y,
            entity.on_ground()
        );
    }
}

fn main() {
    // Load configuration before logging so the configured level applies
    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(config.debug.log_level.as_str())).init();
    log::info!("Starting plat2d");
    if let Some(e) = load_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }

    let mut scene = build_demo(&config);
    if scene.rejected > 0 {
        log::warn!("{} bodies were rejected while building the level", scene.rejected);
    }

    let mut simulation = SimulationSystem::from_config(&config.simulation);
    let interval = config.debug.report_interval;
    let frame_dt = simulation.fixed_dt();

    for frame in 0..config.simulation.frames {
        let result = simulation.advance(&mut scene.world, frame_dt);
        if interval > 0 && frame % interval == 0 {
            report(&scene.world, frame);
        }
        if result.ended {
            log::info!("Level ended on frame {}", frame);
            break;
        }
    }

    log::info!("Finished after {} physics steps", simulation.total_steps());
}
