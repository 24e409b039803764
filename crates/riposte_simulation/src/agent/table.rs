//! Phase dispatch table: one optional callback per (state, phase).

use thiserror::Error;

use super::machine::PhaseContext;
use super::state::{AgentState, Phase};

/// Phase callback: behavior data + per-step context
pub type PhaseFn<B> = fn(&mut B, &mut PhaseContext<'_>);

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PhaseError {
    #[error("{state} has no {phase} phase implemented")]
    Unimplemented { state: AgentState, phase: Phase },
}

/// Enter/Stay/Exit callbacks keyed by state variant.
///
/// Built once per behavior type (usually in a `static Lazy`). Dispatching a phase
/// that was never registered is fatal.
pub struct PhaseTable<B> {
    entries: [[Option<PhaseFn<B>>; 3]; 9],
}

impl<B> Default for PhaseTable<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> PhaseTable<B> {
    pub fn new() -> Self {
        Self {
            entries: [[None; 3]; 9],
        }
    }

    pub fn on(mut self, state: AgentState, phase: Phase, callback: PhaseFn<B>) -> Self {
        self.entries[state.index()][phase.index()] = Some(callback);
        self
    }

    pub fn on_enter(self, state: AgentState, callback: PhaseFn<B>) -> Self {
        self.on(state, Phase::Enter, callback)
    }

    pub fn on_stay(self, state: AgentState, callback: PhaseFn<B>) -> Self {
        self.on(state, Phase::Stay, callback)
    }

    pub fn on_exit(self, state: AgentState, callback: PhaseFn<B>) -> Self {
        self.on(state, Phase::Exit, callback)
    }

    /// Register the same no-op for every phase of `state`
    pub fn inert(mut self, state: AgentState) -> Self {
        let noop: PhaseFn<B> = |_, _| {};
        for phase in Phase::ALL {
            self.entries[state.index()][phase.index()] = Some(noop);
        }
        self
    }

    pub fn get(&self, state: AgentState, phase: Phase) -> Option<PhaseFn<B>> {
        self.entries[state.index()][phase.index()]
    }

    /// First missing (state, phase) pair, in declaration order
    pub fn validate(&self) -> Result<(), PhaseError> {
        for state in AgentState::ALL {
            for phase in Phase::ALL {
                if self.get(state, phase).is_none() {
                    return Err(PhaseError::Unimplemented { state, phase });
                }
            }
        }
        Ok(())
    }

    /// Run the callback for `(state, phase)`.
    ///
    /// # Panics
    /// If no callback is registered.
    pub fn dispatch(&self, state: AgentState, phase: Phase, behavior: &mut B, ctx: &mut PhaseContext<'_>) {
        match self.get(state, phase) {
            Some(callback) => callback(behavior, ctx),
            None => panic!("{}", PhaseError::Unimplemented { state, phase }),
        }
    }
}
