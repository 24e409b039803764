//! Tests for StateMachine stepping and PhaseTable dispatch.

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::super::*;
    use crate::meter::MeterSpec;

    /// Records every phase call; optional redirects drive transitions
    #[derive(Default)]
    struct Recorder {
        log: Vec<&'static str>,
        idle_stay_redirect: Option<AgentState>,
        idle_enter_redirect: Option<AgentState>,
        walk_enter_redirect: Option<AgentState>,
    }

    fn idle_enter(r: &mut Recorder, ctx: &mut PhaseContext<'_>) {
        r.log.push("Idle.Enter");
        if let Some(next) = r.idle_enter_redirect {
            ctx.change_state_to(next);
        }
    }

    fn idle_stay(r: &mut Recorder, ctx: &mut PhaseContext<'_>) {
        r.log.push("Idle.Stay");
        if let Some(next) = r.idle_stay_redirect.take() {
            ctx.change_state_to(next);
        }
    }

    fn idle_exit(r: &mut Recorder, _: &mut PhaseContext<'_>) {
        r.log.push("Idle.Exit");
    }

    fn walk_enter(r: &mut Recorder, ctx: &mut PhaseContext<'_>) {
        r.log.push("Walk.Enter");
        if let Some(next) = r.walk_enter_redirect {
            ctx.change_state_to(next);
        }
    }

    fn walk_stay(r: &mut Recorder, _: &mut PhaseContext<'_>) {
        r.log.push("Walk.Stay");
    }

    fn walk_exit(r: &mut Recorder, _: &mut PhaseContext<'_>) {
        r.log.push("Walk.Exit");
    }

    fn jump_enter(r: &mut Recorder, _: &mut PhaseContext<'_>) {
        r.log.push("Jump.Enter");
    }

    fn jump_stay(r: &mut Recorder, _: &mut PhaseContext<'_>) {
        r.log.push("Jump.Stay");
    }

    fn jump_exit(r: &mut Recorder, _: &mut PhaseContext<'_>) {
        r.log.push("Jump.Exit");
    }

    fn table() -> PhaseTable<Recorder> {
        PhaseTable::new()
            .on_enter(AgentState::Idle, idle_enter)
            .on_stay(AgentState::Idle, idle_stay)
            .on_exit(AgentState::Idle, idle_exit)
            .on_enter(AgentState::Walk, walk_enter)
            .on_stay(AgentState::Walk, walk_stay)
            .on_exit(AgentState::Walk, walk_exit)
            .on_enter(AgentState::Jump, jump_enter)
            .on_stay(AgentState::Jump, jump_stay)
            .on_exit(AgentState::Jump, jump_exit)
            .inert(AgentState::Dead)
            .inert(AgentState::Prone)
    }

    struct Fixture {
        harness: Harness,
        machine: StateMachine,
        recorder: Recorder,
        table: PhaseTable<Recorder>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                harness: Harness::new(AgentConfig::player()),
                machine: StateMachine::default(),
                recorder: Recorder::default(),
                table: table(),
            }
        }

        fn step(&mut self) -> Vec<&'static str> {
            self.harness
                .step_with(&self.table, &mut self.machine, &mut self.recorder);
            std::mem::take(&mut self.recorder.log)
        }
    }

    #[test]
    fn test_first_step_enters_then_stays() {
        let mut fx = Fixture::new();
        assert_eq!(fx.machine.running(), None);

        assert_eq!(fx.step(), vec!["Idle.Enter", "Idle.Stay"]);
        assert_eq!(fx.machine.running(), Some(AgentState::Idle));

        assert_eq!(fx.step(), vec!["Idle.Stay"]);
    }

    #[test]
    fn test_transition_from_stay_is_seen_next_step() {
        let mut fx = Fixture::new();
        fx.step();

        fx.recorder.idle_stay_redirect = Some(AgentState::Walk);
        assert_eq!(fx.step(), vec!["Idle.Stay"]);
        assert_eq!(fx.machine.running(), Some(AgentState::Idle));

        // Exit старого строго до Enter нового
        assert_eq!(fx.step(), vec!["Idle.Exit", "Walk.Enter", "Walk.Stay"]);
        assert_eq!(fx.machine.running(), Some(AgentState::Walk));
    }

    #[test]
    fn test_external_write_between_steps() {
        let mut fx = Fixture::new();
        fx.step();

        fx.harness.agent.change_state_to(AgentState::Jump);
        assert_eq!(fx.step(), vec!["Idle.Exit", "Jump.Enter", "Jump.Stay"]);
    }

    #[test]
    fn test_writing_same_state_is_not_a_transition() {
        let mut fx = Fixture::new();
        fx.step();

        fx.harness.agent.change_state_to(AgentState::Idle);
        assert_eq!(fx.step(), vec!["Idle.Stay"]);
    }

    #[test]
    fn test_enter_redirect_chains_within_one_step() {
        let mut fx = Fixture::new();
        fx.recorder.idle_enter_redirect = Some(AgentState::Jump);

        assert_eq!(
            fx.step(),
            vec!["Idle.Enter", "Idle.Exit", "Jump.Enter", "Jump.Stay"]
        );
        assert_eq!(fx.machine.running(), Some(AgentState::Jump));
    }

    #[test]
    fn test_endless_redirect_is_truncated() {
        let mut fx = Fixture::new();
        fx.recorder.idle_enter_redirect = Some(AgentState::Walk);
        fx.recorder.walk_enter_redirect = Some(AgentState::Idle);

        let log = fx.step();

        assert_eq!(log.len(), MAX_TRANSITIONS_PER_STEP * 2);
        assert_eq!(fx.machine.running(), None);
        assert!(!log.iter().any(|entry| entry.ends_with(".Stay")));
    }

    #[test]
    #[should_panic(expected = "Parry has no Enter phase implemented")]
    fn test_unimplemented_phase_is_fatal() {
        let mut fx = Fixture::new();
        fx.step();

        fx.harness.agent.change_state_to(AgentState::Parry);
        fx.step();
    }

    #[test]
    fn test_validate_reports_first_gap() {
        assert_eq!(
            PhaseTable::<Recorder>::new().validate(),
            Err(PhaseError::Unimplemented {
                state: AgentState::Idle,
                phase: Phase::Enter
            })
        );
        assert_eq!(
            table().validate(),
            Err(PhaseError::Unimplemented {
                state: AgentState::AttackLight,
                phase: Phase::Enter
            })
        );
    }

    #[test]
    fn test_health_depletion_reaches_dead_by_next_step() {
        let mut config = AgentConfig::player();
        config.health = MeterSpec {
            min: 0.0,
            max: 100.0,
            value: 5.0,
            ..MeterSpec::default()
        };
        let mut fx = Fixture::new();
        fx.harness = Harness::new(config);
        fx.step();

        let fired = fx.harness.agent.take_damage(10.0);

        assert!(fired.min);
        assert_eq!(fx.harness.agent.health().value(), 0.0);
        assert_eq!(fx.harness.agent.state(), AgentState::Dead);

        assert_eq!(fx.step(), vec!["Idle.Exit"]);
        assert_eq!(fx.machine.running(), Some(AgentState::Dead));
    }
}
