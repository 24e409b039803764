//! Per-agent tunables (supplied at spawn, immutable during a run).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::state::{AgentState, StepCadence};
use crate::alarm::TimeDomain;
use crate::meter::MeterSpec;

/// Enemy perception geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySenses {
    /// Sight ray length along the facing direction
    pub sight_distance: f32,
    /// Ledge check depth, cast one unit ahead of the agent
    pub drop_check_distance: f32,
}

impl Default for EnemySenses {
    fn default() -> Self {
        Self {
            sight_distance: 6.0,
            drop_check_distance: 1.0,
        }
    }
}

/// Animation clip lengths in seconds (normalized progress = elapsed / length)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipTimings {
    pub windup: f32,
    pub light: f32,
    pub heavy: f32,
    pub stagger: f32,
}

impl Default for ClipTimings {
    fn default() -> Self {
        Self {
            windup: 0.3,
            light: 0.25,
            heavy: 0.5,
            stagger: 0.4,
        }
    }
}

/// Параметры агента
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub walk_speed: f32,
    /// Initial vertical speed of a jump
    pub jump_height: f32,
    /// Vertical speed lost per second
    pub gravity: f32,
    pub attack_light_power: f32,
    pub attack_heavy_power: f32,
    pub prone_duration: f32,
    /// Feet clearance under which the agent counts as grounded
    pub grounded_distance: f32,
    pub grounded_radius: f32,
    pub cadence: StepCadence,
    /// Clock for state alarms
    pub alarm_domain: TimeDomain,
    /// States in which incoming hits (while facing the attacker) drain parry instead of health
    pub parry_states: Vec<AgentState>,
    pub health: MeterSpec,
    pub parry: MeterSpec,
    /// Parry meter regained per second outside Prone/Dead
    pub parry_regen: f32,
    pub weapon_reach: f32,
    pub clips: ClipTimings,
    pub senses: EnemySenses,
    pub initial_state: AgentState,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::player()
    }
}

impl AgentConfig {
    pub fn player() -> Self {
        Self {
            walk_speed: 5.0,
            jump_height: 8.0,
            gravity: 20.0,
            attack_light_power: 10.0,
            attack_heavy_power: 25.0,
            prone_duration: 1.5,
            grounded_distance: 0.05,
            grounded_radius: 0.25,
            cadence: StepCadence::Fixed,
            alarm_domain: TimeDomain::Scaled,
            parry_states: vec![AgentState::Idle, AgentState::Parry],
            health: MeterSpec::full(100.0),
            parry: MeterSpec::full(50.0),
            parry_regen: 5.0,
            weapon_reach: 1.2,
            clips: ClipTimings::default(),
            senses: EnemySenses::default(),
            initial_state: AgentState::Idle,
        }
    }

    pub fn enemy() -> Self {
        Self {
            walk_speed: 2.0,
            jump_height: 6.0,
            attack_light_power: 8.0,
            attack_heavy_power: 20.0,
            prone_duration: 2.0,
            parry_states: vec![AgentState::Parry],
            health: MeterSpec::full(60.0),
            parry: MeterSpec::full(30.0),
            parry_regen: 3.0,
            weapon_reach: 1.0,
            clips: ClipTimings {
                windup: 0.2,
                light: 0.4,
                heavy: 0.7,
                stagger: 0.5,
            },
            ..Self::player()
        }
    }

    pub fn can_parry_in(&self, state: AgentState) -> bool {
        self.parry_states.contains(&state)
    }
}
