//! RIPOSTE Simulation Core
//!
//! ECS-симуляция 2D поединка на Bevy 0.16 (headless):
//! - `alarm`: пул таймеров с тремя доменами времени (Scaled / Unscaled / Fixed)
//! - `agent`: конечные автоматы агентов (Enter / Stay / Exit на каждое состояние)
//! - `meter`: шкалы health / parry с порогами
//! - `combat`: оружие, hit list, урон и парирование
//!
//! Рендер, ввод и физика снаружи: агенты видят мир через `SenseOracle`.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod agent;
pub mod alarm;
pub mod combat;
pub mod config;
pub mod logger;
pub mod meter;

// Re-export базовых типов для удобства
pub use agent::{
    Agent, AgentConfig, AgentPlugin, AgentState, ClipProgress, EnemyBehavior, FlatArena, PlayerBehavior,
    PlayerInput, SenseOracle, Senses, StateAlarm, StateMachine, StepCadence,
};
pub use alarm::{
    AlarmCompleted, AlarmHandle, AlarmPlugin, AlarmPool, AlarmPoolConfig, AlarmPoolReport, AlarmSettings, TimeDomain,
};
pub use combat::{AttackParried, CombatPlugin, DamageDealt, EntityDied, Weapon, WeaponOverlap};
pub use config::{ConfigError, SimulationConfig};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use meter::{Meter, MeterSpec, MultiMeter};

/// Fixed timestep (60Hz)
pub const FIXED_HZ: f64 = 60.0;

pub const PLAYER_FACTION: u64 = 1;
pub const ENEMY_FACTION: u64 = 2;

pub fn fixed_step() -> Duration {
    Duration::from_secs_f64(1.0 / FIXED_HZ)
}

/// Главный plugin симуляции (объединяет все подсистемы)
#[derive(Debug, Clone, Copy)]
pub struct SimulationPlugin {
    pub seed: u64,
    pub alarms: AlarmPoolConfig,
}

impl Default for SimulationPlugin {
    fn default() -> Self {
        Self {
            seed: 42,
            alarms: AlarmPoolConfig::default(),
        }
    }
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
            // Детерминистичный RNG
            .insert_resource(DeterministicRng::new(self.seed))
            // Alarm driver ставится первым: AgentPlugin его требует
            .add_plugins(AlarmPlugin { config: self.alarms })
            .add_plugins((AgentPlugin, CombatPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый `app.update()` = ровно один fixed step (первый update
/// только инициализирует часы, delta = 0).
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(FIXED_HZ))
        .insert_resource(TimeUpdateStrategy::ManualDuration(fixed_step()));

    app
}

/// Headless app with every subsystem configured from `config`
pub fn create_simulation_app(config: &SimulationConfig) -> App {
    let mut app = create_headless_app(config.seed);
    app.add_plugins(SimulationPlugin {
        seed: config.seed,
        alarms: config.alarms,
    });
    app
}

/// Spawn a player-controlled agent with its weapon
pub fn spawn_player(world: &mut World, config: &AgentConfig, position: Vec2) -> Entity {
    world
        .spawn((
            Agent::new(config, position, PLAYER_FACTION),
            config.clone(),
            StateMachine::default(),
            PlayerBehavior::default(),
            ClipProgress::default(),
            StateAlarm::default(),
            Weapon::new(config.weapon_reach),
        ))
        .id()
}

/// Spawn an AI enemy with its weapon, facing `facing` (±1)
pub fn spawn_enemy(world: &mut World, config: &AgentConfig, position: Vec2, facing: f32) -> Entity {
    let mut agent = Agent::new(config, position, ENEMY_FACTION);
    agent.facing = facing;

    world
        .spawn((
            agent,
            config.clone(),
            StateMachine::default(),
            EnemyBehavior::default(),
            ClipProgress::default(),
            StateAlarm::default(),
            Weapon::new(config.weapon_reach),
        ))
        .id()
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
