//! Agent systems: stepping state machines and applying state alarms.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::components::{Agent, MeterKind};
use super::config::AgentConfig;
use super::machine::{Behavior, PhaseContext, StateAlarm, StateMachine};
use super::senses::{ClipProgress, SenseOracle, Senses, SightTarget};
use super::state::{AgentState, StepCadence};
use crate::alarm::{AlarmCompleted, AlarmPool, TimeDomain};
use crate::combat::Weapon;
use crate::DeterministicRng;

type AgentItem<B> = (
    Entity,
    &'static mut StateMachine,
    &'static mut B,
    &'static mut Agent,
    &'static AgentConfig,
    &'static mut ClipProgress,
    &'static mut StateAlarm,
    Option<&'static mut Weapon>,
);

/// Update: agents with `StepCadence::Frame`, virtual delta
pub fn step_frame_agents<B: Behavior>(
    time: Res<Time<Virtual>>,
    mut pool: ResMut<AlarmPool>,
    senses: Res<Senses>,
    mut rng: ResMut<DeterministicRng>,
    mut agents: Query<AgentItem<B>>,
) {
    step_agents(
        StepCadence::Frame,
        time.delta_secs(),
        &mut pool,
        senses.oracle(),
        &mut rng.rng,
        &mut agents,
    );
}

/// FixedUpdate: agents with `StepCadence::Fixed`, fixed delta
pub fn step_fixed_agents<B: Behavior>(
    time: Res<Time<Fixed>>,
    mut pool: ResMut<AlarmPool>,
    senses: Res<Senses>,
    mut rng: ResMut<DeterministicRng>,
    mut agents: Query<AgentItem<B>>,
) {
    step_agents(
        StepCadence::Fixed,
        time.delta_secs(),
        &mut pool,
        senses.oracle(),
        &mut rng.rng,
        &mut agents,
    );
}

fn step_agents<B: Behavior>(
    cadence: StepCadence,
    dt: f32,
    pool: &mut AlarmPool,
    senses: &dyn SenseOracle,
    rng: &mut ChaCha8Rng,
    agents: &mut Query<AgentItem<B>>,
) {
    for (entity, mut machine, mut behavior, mut agent, config, mut clip, mut state_alarm, mut weapon) in
        agents.iter_mut()
    {
        if config.cadence != cadence {
            continue;
        }

        clip.advance(dt);

        let mut ctx = PhaseContext {
            entity,
            agent: &mut agent,
            config,
            clip: &mut clip,
            state_alarm: &mut state_alarm,
            alarms: &mut *pool,
            senses,
            rng: &mut *rng,
            weapon: weapon.as_deref_mut(),
            dt,
        };
        machine.step(&mut *behavior, &mut ctx);
        behavior.after_step();
    }
}

/// Update: completions of Scaled/Unscaled alarms → deferred transitions
pub fn apply_frame_state_alarms(
    mut completed: EventReader<AlarmCompleted>,
    mut agents: Query<(&StateAlarm, &mut Agent)>,
) {
    apply_state_alarms(
        completed.read().filter(|event| event.domain != TimeDomain::Fixed),
        &mut agents,
    );
}

/// FixedUpdate: completions of Fixed alarms → deferred transitions
pub fn apply_fixed_state_alarms(
    mut completed: EventReader<AlarmCompleted>,
    mut agents: Query<(&StateAlarm, &mut Agent)>,
) {
    apply_state_alarms(
        completed.read().filter(|event| event.domain == TimeDomain::Fixed),
        &mut agents,
    );
}

fn apply_state_alarms<'a>(
    completed: impl Iterator<Item = &'a AlarmCompleted>,
    agents: &mut Query<(&StateAlarm, &mut Agent)>,
) {
    for event in completed {
        for (state_alarm, mut agent) in agents.iter_mut() {
            if state_alarm.handle != Some(event.handle) || !agent.is_alive() {
                continue;
            }
            if let Some(target) = state_alarm.target {
                agent.change_state_to(target);
            }
        }
    }
}

/// Refresh the oracle's view of living agents
pub fn sync_sense_targets(mut senses: ResMut<Senses>, agents: Query<(Entity, &Agent)>) {
    let targets: Vec<SightTarget> = agents
        .iter()
        .filter(|(_, agent)| agent.is_alive())
        .map(|(entity, agent)| SightTarget {
            entity,
            position: agent.position,
            faction_id: agent.faction_id,
        })
        .collect();

    senses.0.observe(&targets);
}

/// Parry meter regeneration (не в Prone и не мёртвым)
pub fn regenerate_parry(time: Res<Time<Fixed>>, mut agents: Query<(&mut Agent, &AgentConfig)>) {
    let dt = time.delta_secs();

    for (mut agent, config) in agents.iter_mut() {
        if config.parry_regen <= 0.0 || agent.parry().is_full() {
            continue;
        }
        if matches!(agent.state(), AgentState::Prone | AgentState::Dead) {
            continue;
        }
        agent.adjust_meter(MeterKind::Parry, config.parry_regen * dt);
    }
}
