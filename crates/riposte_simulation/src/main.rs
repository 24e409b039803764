//! Headless симуляция RIPOSTE
//!
//! Поединок player vs enemy без рендера. Опциональный аргумент: путь к JSON конфигу.

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;
use riposte_simulation::{
    create_simulation_app, log_error, log_info, logger, spawn_enemy, spawn_player, Agent, AlarmPool, LogLevel,
    SimulationConfig,
};

fn main() -> ExitCode {
    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => match SimulationConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                riposte_simulation::init_logger();
                log_error(&format!("{err}"));
                return ExitCode::FAILURE;
            }
        },
        None => SimulationConfig::default(),
    };

    let mut app = create_simulation_app(&config);
    // Переходы состояний логируются на debug: в headless прогоне только итоги
    logger::set_log_level(LogLevel::Info);
    log_info(&format!(
        "Starting RIPOSTE headless simulation (seed: {}, ticks: {})",
        config.seed, config.ticks
    ));

    let player = spawn_player(app.world_mut(), &config.player, Vec2::new(-2.0, 0.0));
    let enemy = spawn_enemy(app.world_mut(), &config.enemy, Vec2::new(2.0, 0.0), -1.0);

    for tick in 0..config.ticks {
        app.update();

        if tick % 60 == 0 {
            let world = app.world();
            let describe = |entity: Entity| {
                world
                    .get::<Agent>(entity)
                    .map(|agent| {
                        format!(
                            "{} hp {:.0} parry {:.0} x {:.2}",
                            agent.state(),
                            agent.health().value(),
                            agent.parry().value(),
                            agent.x()
                        )
                    })
                    .unwrap_or_else(|| "despawned".to_string())
            };
            let pool = world.resource::<AlarmPool>();
            log_info(&format!(
                "Tick {}: player [{}] enemy [{}] alarms {}/{}",
                tick,
                describe(player),
                describe(enemy),
                pool.in_use_count(),
                pool.pool_size()
            ));
        }
    }

    let report = app.world().resource::<AlarmPool>().report();
    match serde_json::to_string_pretty(&report) {
        Ok(json) => log_info(&format!("Alarm pool:\n{json}")),
        Err(err) => log_error(&format!("Alarm pool report failed: {err}")),
    }

    log_info("Simulation complete!");
    ExitCode::SUCCESS
}
