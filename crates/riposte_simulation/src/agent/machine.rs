//! Per-agent state machine driver.
//!
//! Каждый шаг: либо Stay текущей фазы, либо Exit(старое) → Enter(новое) → Stay.
//! Переход декларативный: запись в `Agent::state` замечается только при
//! следующей проверке драйвера.

use bevy::ecs::component::Mutable;
use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::components::Agent;
use super::config::AgentConfig;
use super::senses::{ClipProgress, SenseOracle};
use super::state::{AgentState, Phase};
use super::table::PhaseTable;
use crate::alarm::{AlarmHandle, AlarmPool, AlarmSettings};
use crate::combat::Weapon;
use crate::logger;

/// Enter-redirect chain length after which the step is abandoned
pub const MAX_TRANSITIONS_PER_STEP: usize = 32;

/// Concrete agent behavior: per-agent data plus its static phase table
pub trait Behavior: Component<Mutability = Mutable> + Sized {
    fn phases() -> &'static PhaseTable<Self>;

    /// Called after every step (e.g. to clear one-frame input edges)
    fn after_step(&mut self) {}
}

/// Deferred transition: when `handle` completes, the agent switches to `target`
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateAlarm {
    pub handle: Option<AlarmHandle>,
    pub target: Option<AgentState>,
}

/// Everything a phase callback may touch during one step
pub struct PhaseContext<'a> {
    pub entity: Entity,
    pub agent: &'a mut Agent,
    pub config: &'a AgentConfig,
    pub clip: &'a mut ClipProgress,
    pub state_alarm: &'a mut StateAlarm,
    pub alarms: &'a mut AlarmPool,
    pub senses: &'a dyn SenseOracle,
    pub rng: &'a mut ChaCha8Rng,
    pub weapon: Option<&'a mut Weapon>,
    /// Cadence delta (virtual frame delta or fixed step)
    pub dt: f32,
}

impl PhaseContext<'_> {
    pub fn state(&self) -> AgentState {
        self.agent.state()
    }

    pub fn change_state_to(&mut self, state: AgentState) {
        self.agent.change_state_to(state);
    }

    /// Gravity for this step (`gravity * dt`)
    pub fn gravity(&self) -> f32 {
        self.config.gravity * self.dt
    }

    /// Translate by `velocity * dt`, resolved by the physics oracle
    pub fn move_agent(&mut self, velocity: Vec2) {
        let from = self.agent.position;
        let to = from + velocity * self.dt;
        self.agent.position = self.senses.resolve_motion(from, to);
    }

    pub fn is_grounded(&self) -> bool {
        self.senses.surface_within(
            self.agent.position,
            self.config.grounded_radius,
            self.config.grounded_distance,
        )
    }

    /// Ledge check one unit ahead
    pub fn ground_in_front(&self) -> bool {
        let origin = self.agent.position + self.agent.facing_direction();
        self.senses
            .surface_within(origin, 0.0, self.config.senses.drop_check_distance)
    }

    /// Sight ray along the facing direction
    pub fn target_seen(&self) -> bool {
        self.senses.target_within(
            self.agent.position,
            self.agent.facing,
            self.config.senses.sight_distance,
            self.agent.faction_id,
        )
    }

    /// True 1 in `n` times
    pub fn roll(&mut self, n: u32) -> bool {
        n > 0 && self.rng.gen_range(0..n) == n - 1
    }

    /// In `seconds`, change the state to `next`. Reuses the agent's alarm slot.
    pub fn set_state_alarm(&mut self, seconds: f32, next: AgentState) {
        let handle = match self.state_alarm.handle.filter(|h| self.alarms.is_in_use(*h)) {
            Some(handle) => handle,
            None => {
                let handle = self.alarms.get(
                    AlarmSettings::new(0.0)
                        .named(format!("{:?} next state", self.entity))
                        .auto_release(false)
                        .domain(self.config.alarm_domain),
                );
                self.state_alarm.handle = Some(handle);
                handle
            }
        };

        self.state_alarm.target = Some(next);
        self.alarms.reset_and_play(handle, Some(seconds));
    }

    pub fn stop_state_alarm(&mut self) {
        if let Some(handle) = self.state_alarm.handle {
            self.alarms.stop(handle);
        }
    }

    /// Start a swing: set power and open a new hit window
    pub fn arm_weapon(&mut self, power: f32) {
        if let Some(weapon) = self.weapon.as_deref_mut() {
            weapon.arm(power);
        }
    }

    pub fn disarm_weapon(&mut self) {
        if let Some(weapon) = self.weapon.as_deref_mut() {
            weapon.disarm();
        }
    }
}

/// Running-phase bookkeeping of one agent
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateMachine {
    running: Option<AgentState>,
}

impl StateMachine {
    /// State whose Enter has run and whose Exit has not
    pub fn running(&self) -> Option<AgentState> {
        self.running
    }

    pub fn step<B: Behavior>(&mut self, behavior: &mut B, ctx: &mut PhaseContext<'_>) {
        self.step_with(B::phases(), behavior, ctx);
    }

    /// Resume once: Stay if the state is unchanged, else Exit then Enter the new one
    pub fn step_with<B>(&mut self, table: &PhaseTable<B>, behavior: &mut B, ctx: &mut PhaseContext<'_>) {
        match self.running {
            None => self.begin(table, behavior, ctx),
            Some(running) if running == ctx.state() => {
                table.dispatch(running, Phase::Stay, behavior, ctx);
            }
            Some(running) => {
                table.dispatch(running, Phase::Exit, behavior, ctx);
                self.running = None;
                self.begin(table, behavior, ctx);
            }
        }
    }

    /// Enter the current state; an Enter that redirects is followed by its Exit
    /// and the next Enter within the same step.
    fn begin<B>(&mut self, table: &PhaseTable<B>, behavior: &mut B, ctx: &mut PhaseContext<'_>) {
        let mut state = ctx.state();

        for _ in 0..MAX_TRANSITIONS_PER_STEP {
            table.dispatch(state, Phase::Enter, behavior, ctx);
            self.running = Some(state);
            logger::log(&format!("{:?} entered {} state", ctx.entity, state));

            if ctx.state() == state {
                table.dispatch(state, Phase::Stay, behavior, ctx);
                return;
            }

            table.dispatch(state, Phase::Exit, behavior, ctx);
            self.running = None;
            state = ctx.state();
        }

        logger::log_warning(&format!(
            "{:?}: state chain exceeded {} transitions in one step, resuming next step in {}",
            ctx.entity,
            MAX_TRANSITIONS_PER_STEP,
            ctx.state()
        ));
    }
}
