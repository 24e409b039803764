//! Agent state machines (Player, Enemy) and their ECS integration.
//!
//! ECS ответственность:
//! - `Agent` (state, meters, kinematics), `AgentConfig`, `StateMachine`
//! - Behaviors: `PlayerBehavior`, `EnemyBehavior` (static phase tables)
//! - Deferred transitions через `StateAlarm` + `AlarmCompleted`
//!
//! Порядок в каждом расписании: alarms → state alarms → step агентов.

use bevy::prelude::*;

use crate::alarm::{has_alarm_driver, install_alarm_driver, AlarmPoolConfig, AlarmSet};
use crate::logger;
use crate::DeterministicRng;

pub mod components;
pub mod config;
pub mod enemy;
pub mod machine;
pub mod player;
pub mod senses;
pub mod state;
pub mod systems;
pub mod table;

#[cfg(test)]
mod machine_tests;
#[cfg(test)]
pub(crate) mod testing;

pub use components::{Agent, MeterKind};
pub use config::{AgentConfig, ClipTimings, EnemySenses};
pub use enemy::EnemyBehavior;
pub use machine::{Behavior, PhaseContext, StateAlarm, StateMachine, MAX_TRANSITIONS_PER_STEP};
pub use player::{PlayerBehavior, PlayerInput};
pub use senses::{ClipProgress, FlatArena, SenseOracle, Senses, SightTarget};
pub use state::{AgentState, Phase, StepCadence};
pub use systems::{
    apply_fixed_state_alarms, apply_frame_state_alarms, regenerate_parry, step_fixed_agents, step_frame_agents,
    sync_sense_targets,
};
pub use table::{PhaseError, PhaseFn, PhaseTable};

/// Anchor for systems that consume agent decisions (weapon hits)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentSet {
    Step,
}

/// Agent Plugin
///
/// Требует alarm driver: если его нет, создаёт с настройками по умолчанию (warning).
pub struct AgentPlugin;

impl Plugin for AgentPlugin {
    fn build(&self, app: &mut App) {
        if !has_alarm_driver(app) {
            logger::log_warning("AgentPlugin: no alarm driver installed, creating a default one");
            if let Err(err) = install_alarm_driver(app, AlarmPoolConfig::default()) {
                logger::log_error(&format!("AgentPlugin: {err}"));
            }
        }

        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        app.init_resource::<Senses>();

        app.add_systems(
            Update,
            (
                sync_sense_targets,
                apply_frame_state_alarms,
                step_frame_agents::<PlayerBehavior>,
                step_frame_agents::<EnemyBehavior>,
            )
                .chain()
                .in_set(AgentSet::Step)
                .after(AlarmSet::Advance),
        );

        app.add_systems(
            FixedUpdate,
            (
                sync_sense_targets,
                apply_fixed_state_alarms,
                regenerate_parry,
                step_fixed_agents::<PlayerBehavior>,
                step_fixed_agents::<EnemyBehavior>,
            )
                .chain()
                .in_set(AgentSet::Step)
                .after(AlarmSet::Advance),
        );
    }
}
