//! Tests for weapon hit resolution.

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::agent::{Agent, AgentConfig, AgentState};
    use bevy::prelude::*;

    struct Duel {
        app: App,
        attacker: Entity,
        target: Entity,
    }

    /// Attacker at x=0 facing right, target at x=1 facing left
    fn duel(target_config: AgentConfig) -> Duel {
        let mut app = App::new();
        app.add_event::<WeaponOverlap>()
            .add_event::<DamageDealt>()
            .add_event::<AttackParried>()
            .add_event::<EntityDied>()
            .add_systems(Update, (detect_arena_overlaps, resolve_weapon_hits).chain());

        let attacker_config = AgentConfig::enemy();
        let mut weapon = Weapon::new(attacker_config.weapon_reach);
        weapon.arm(10.0);
        let attacker = app
            .world_mut()
            .spawn((
                Agent::new(&attacker_config, Vec2::ZERO, 2),
                attacker_config,
                weapon,
            ))
            .id();

        let mut target_agent = Agent::new(&target_config, Vec2::new(1.0, 0.0), 1);
        target_agent.facing = -1.0;
        let target = app.world_mut().spawn((target_agent, target_config)).id();

        Duel { app, attacker, target }
    }

    fn agent(duel: &Duel, entity: Entity) -> &Agent {
        duel.app.world().get::<Agent>(entity).unwrap()
    }

    #[test]
    fn test_hit_lands_on_health_once_per_swing() {
        let mut config = AgentConfig::player();
        config.parry_states.clear();
        let mut duel = duel(config);

        duel.app.update();
        duel.app.update();
        duel.app.update();

        assert_eq!(agent(&duel, duel.target).health().value(), 90.0);
        let weapon = duel.app.world().get::<Weapon>(duel.attacker).unwrap();
        assert_eq!(weapon.hit_list(), &[duel.target]);
    }

    #[test]
    fn test_new_swing_can_hit_again() {
        let mut config = AgentConfig::player();
        config.parry_states.clear();
        let mut duel = duel(config);
        duel.app.update();

        duel.app
            .world_mut()
            .get_mut::<Weapon>(duel.attacker)
            .unwrap()
            .arm(15.0);
        duel.app.update();

        assert_eq!(agent(&duel, duel.target).health().value(), 75.0);
    }

    #[test]
    fn test_facing_parry_state_drains_parry_meter() {
        // Player парирует в Idle
        let mut duel = duel(AgentConfig::player());
        duel.app.update();

        let target = agent(&duel, duel.target);
        assert_eq!(target.health().value(), 100.0);
        assert_eq!(target.parry().value(), 40.0);

        let events = duel.app.world().resource::<Events<AttackParried>>();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_back_turned_target_takes_damage_despite_parry_state() {
        let mut duel = duel(AgentConfig::player());
        duel.app
            .world_mut()
            .get_mut::<Agent>(duel.target)
            .unwrap()
            .facing = 1.0;

        duel.app.update();

        let target = agent(&duel, duel.target);
        assert_eq!(target.health().value(), 90.0);
        assert_eq!(target.parry().value(), 50.0);
    }

    #[test]
    fn test_empty_parry_meter_knocks_prone() {
        let mut config = AgentConfig::player();
        config.parry.value = 5.0;
        let mut duel = duel(config);

        duel.app.update();

        assert_eq!(agent(&duel, duel.target).state(), AgentState::Prone);
    }

    #[test]
    fn test_killing_blow_reports_death() {
        let mut config = AgentConfig::player();
        config.parry_states.clear();
        config.health.value = 10.0;
        let mut duel = duel(config);

        duel.app.update();

        assert_eq!(agent(&duel, duel.target).state(), AgentState::Dead);
        let died = duel.app.world().resource::<Events<EntityDied>>();
        assert_eq!(died.len(), 1);
    }

    #[test]
    fn test_same_faction_is_ignored() {
        let mut config = AgentConfig::player();
        config.parry_states.clear();
        let mut duel = duel(config);
        duel.app
            .world_mut()
            .get_mut::<Agent>(duel.target)
            .unwrap()
            .faction_id = 2;

        duel.app.update();

        assert_eq!(agent(&duel, duel.target).health().value(), 100.0);
    }

    #[test]
    fn test_disarmed_weapon_detects_nothing() {
        let mut config = AgentConfig::player();
        config.parry_states.clear();
        let mut duel = duel(config);
        duel.app
            .world_mut()
            .get_mut::<Weapon>(duel.attacker)
            .unwrap()
            .disarm();

        duel.app.update();

        assert_eq!(agent(&duel, duel.target).health().value(), 100.0);
    }

    #[test]
    fn test_clear_request_applies_on_next_overlap() {
        let mut weapon = Weapon::new(1.0);
        let target = Entity::from_raw(3);

        assert!(weapon.register_hit(target));
        assert!(!weapon.register_hit(target));

        weapon.request_clear();
        assert_eq!(weapon.hit_list(), &[target]);
        assert!(weapon.register_hit(target));
    }
}
