//! Agent component: state, meters and kinematics of one combatant.

use bevy::prelude::*;

use super::config::AgentConfig;
use super::state::AgentState;
use crate::meter::{Meter, Thresholds};

/// Which meter of the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeterKind {
    Health,
    Parry,
}

/// Standing subscription: threshold of a meter → forced state
struct ThresholdBinding {
    meter: MeterKind,
    on_min: Option<AgentState>,
    on_max: Option<AgentState>,
}

/// health пуст → Dead, parry пуст → Prone
const STANDING_BINDINGS: [ThresholdBinding; 2] = [
    ThresholdBinding {
        meter: MeterKind::Health,
        on_min: Some(AgentState::Dead),
        on_max: None,
    },
    ThresholdBinding {
        meter: MeterKind::Parry,
        on_min: Some(AgentState::Prone),
        on_max: None,
    },
];

#[derive(Component, Debug)]
pub struct Agent {
    state: AgentState,
    health: Meter,
    parry: Meter,
    /// +1 right, -1 left
    pub facing: f32,
    pub position: Vec2,
    /// Agents with the same faction never hurt each other
    pub faction_id: u64,
}

impl Agent {
    pub fn new(config: &AgentConfig, position: Vec2, faction_id: u64) -> Self {
        Self {
            state: config.initial_state,
            health: Meter::from_spec("health", config.health),
            parry: Meter::from_spec("parry", config.parry),
            facing: 1.0,
            position,
            faction_id,
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    /// Declarative transition: the state machine notices it at its next check.
    /// Writing the current state again is not a transition.
    pub fn change_state_to(&mut self, state: AgentState) {
        self.state = state;
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn facing_direction(&self) -> Vec2 {
        Vec2::new(self.facing, 0.0)
    }

    pub fn turn_around(&mut self) {
        self.facing = -self.facing;
    }

    pub fn face(&mut self, horizontal: f32) {
        if horizontal != 0.0 {
            self.facing = horizontal.signum();
        }
    }

    pub fn is_alive(&self) -> bool {
        self.state != AgentState::Dead
    }

    pub fn meter(&self, kind: MeterKind) -> &Meter {
        match kind {
            MeterKind::Health => &self.health,
            MeterKind::Parry => &self.parry,
        }
    }

    fn meter_mut(&mut self, kind: MeterKind) -> &mut Meter {
        match kind {
            MeterKind::Health => &mut self.health,
            MeterKind::Parry => &mut self.parry,
        }
    }

    pub fn health(&self) -> &Meter {
        &self.health
    }

    pub fn parry(&self) -> &Meter {
        &self.parry
    }

    /// Every meter mutation goes through here so the standing bindings see it
    fn mutate_meter(&mut self, kind: MeterKind, f: impl FnOnce(&mut Meter) -> Thresholds) -> Thresholds {
        let fired = f(self.meter_mut(kind));
        self.route_thresholds(kind, fired);
        fired
    }

    /// Adjust a meter (clamped) and route fired thresholds through the standing bindings
    pub fn adjust_meter(&mut self, kind: MeterKind, delta: f32) -> Thresholds {
        self.mutate_meter(kind, |meter| meter.adjust(delta, true))
    }

    pub fn fill_meter(&mut self, kind: MeterKind) -> Thresholds {
        self.mutate_meter(kind, Meter::fill)
    }

    /// `trigger = false` is a silent reset: no threshold, no forced state
    pub fn empty_meter(&mut self, kind: MeterKind, trigger: bool) -> Thresholds {
        self.mutate_meter(kind, |meter| meter.empty(trigger))
    }

    pub fn clamp_meter(&mut self, kind: MeterKind) -> Thresholds {
        self.mutate_meter(kind, Meter::clamp)
    }

    pub fn set_meter_bounds(&mut self, kind: MeterKind, min: f32, max: f32, clip: bool) -> Thresholds {
        self.mutate_meter(kind, |meter| meter.set_new_bounds(min, max, clip))
    }

    pub fn take_damage(&mut self, amount: f32) -> Thresholds {
        self.adjust_meter(MeterKind::Health, -amount)
    }

    pub fn heal(&mut self, amount: f32) -> Thresholds {
        self.adjust_meter(MeterKind::Health, amount)
    }

    /// Parried hit: the blow drains the parry meter instead of health
    pub fn reduce_stamina(&mut self, amount: f32) -> Thresholds {
        self.adjust_meter(MeterKind::Parry, -amount)
    }

    /// Dead is terminal: bindings never pull an agent out of it
    fn route_thresholds(&mut self, kind: MeterKind, fired: Thresholds) {
        if !self.is_alive() {
            return;
        }
        for binding in STANDING_BINDINGS.iter().filter(|b| b.meter == kind) {
            if fired.min {
                if let Some(state) = binding.on_min {
                    self.state = state;
                }
            }
            if fired.max {
                if let Some(state) = binding.on_max {
                    self.state = state;
                }
            }
        }
    }

    /// Opposite facings, and `other` is on the side this agent faces
    pub fn is_facing(&self, other: &Agent) -> bool {
        let side = if other.x() - self.x() >= 0.0 { 1.0 } else { -1.0 };
        other.facing != self.facing && side == self.facing
    }
}
