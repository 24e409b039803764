//! Agent states, lifecycle phases and step cadence.

use serde::{Deserialize, Serialize};

/// Behavioral state (closed set). `Dead` is absorbing only by convention of the
/// concrete behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AgentState {
    #[default]
    Idle,
    Prone,
    Walk,
    Jump,
    AttackLight,
    AttackHeavy,
    AttackJump,
    Parry,
    Dead,
}

impl AgentState {
    pub const ALL: [AgentState; 9] = [
        AgentState::Idle,
        AgentState::Prone,
        AgentState::Walk,
        AgentState::Jump,
        AgentState::AttackLight,
        AgentState::AttackHeavy,
        AgentState::AttackJump,
        AgentState::Parry,
        AgentState::Dead,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn is_attack(self) -> bool {
        matches!(
            self,
            AgentState::AttackLight | AgentState::AttackHeavy | AgentState::AttackJump
        )
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Lifecycle phase of a state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Once, on activation
    Enter,
    /// Once per step while active
    Stay,
    /// Once, before deactivation
    Exit,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Enter, Phase::Stay, Phase::Exit];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// How often an agent's state machine is resumed.
///
/// Also selects the delta used by `gravity()` / `move_agent()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StepCadence {
    /// Once per rendered frame (Update, virtual delta)
    Frame,
    /// Once per fixed step (FixedUpdate, fixed delta)
    #[default]
    Fixed,
}
