//! Test harness: one agent stepped without an App.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::components::Agent;
use super::config::AgentConfig;
use super::machine::{Behavior, PhaseContext, StateAlarm, StateMachine};
use super::senses::{ClipProgress, FlatArena, SenseOracle, SightTarget};
use super::table::PhaseTable;
use crate::alarm::{AlarmPool, TimeDomain};
use crate::combat::Weapon;

pub(crate) const STEP: f32 = 1.0 / 60.0;

pub(crate) struct Harness {
    pub entity: Entity,
    pub agent: Agent,
    pub config: AgentConfig,
    pub clip: ClipProgress,
    pub state_alarm: StateAlarm,
    pub alarms: AlarmPool,
    pub arena: FlatArena,
    pub rng: ChaCha8Rng,
    pub weapon: Option<Weapon>,
    pub dt: f32,
}

impl Harness {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            entity: Entity::from_raw(7),
            agent: Agent::new(&config, Vec2::ZERO, 0),
            config,
            clip: ClipProgress::default(),
            state_alarm: StateAlarm::default(),
            alarms: AlarmPool::default(),
            arena: FlatArena::default(),
            rng: ChaCha8Rng::seed_from_u64(42),
            weapon: None,
            dt: STEP,
        }
    }

    pub fn with_weapon(&mut self) {
        self.weapon = Some(Weapon::new(self.config.weapon_reach));
    }

    pub fn place_target(&mut self, position: Vec2, faction_id: u64) {
        self.arena.observe(&[SightTarget {
            entity: Entity::from_raw(99),
            position,
            faction_id,
        }]);
    }

    pub fn step<B: Behavior>(&mut self, machine: &mut StateMachine, behavior: &mut B) {
        self.step_with(B::phases(), machine, behavior);
    }

    pub fn step_with<B>(&mut self, table: &PhaseTable<B>, machine: &mut StateMachine, behavior: &mut B) {
        self.clip.advance(self.dt);
        let mut ctx = PhaseContext {
            entity: self.entity,
            agent: &mut self.agent,
            config: &self.config,
            clip: &mut self.clip,
            state_alarm: &mut self.state_alarm,
            alarms: &mut self.alarms,
            senses: &self.arena,
            rng: &mut self.rng,
            weapon: self.weapon.as_mut(),
            dt: self.dt,
        };
        machine.step_with(table, behavior, &mut ctx);
    }

    /// Driver pass + deferred transition, as `apply_*_state_alarms` would do
    pub fn advance_alarms(&mut self, domain: TimeDomain, elapsed: f32) {
        self.alarms.tick(domain, elapsed);
        for completion in self.alarms.drain_completed() {
            if self.state_alarm.handle == Some(completion.handle) && self.agent.is_alive() {
                if let Some(target) = self.state_alarm.target {
                    self.agent.change_state_to(target);
                }
            }
        }
    }
}
