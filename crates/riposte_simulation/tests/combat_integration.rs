//! Combat integration test
//!
//! Полный App (SimulationPlugin) headless, время ручное: один update = один fixed step.
//!
//! Проверяем:
//! - Alarm'ы всех доменов завершаются через driver
//! - Отложенные переходы (Prone → Idle)
//! - Удар игрока попадает во врага, инварианты meter'ов в длинном поединке

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bevy::prelude::*;
use riposte_simulation::*;

fn create_combat_app(seed: u64) -> App {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin {
        seed,
        ..SimulationPlugin::default()
    });
    app
}

fn run(app: &mut App, updates: usize) {
    for _ in 0..updates {
        app.update();
    }
}

fn agent(app: &App, entity: Entity) -> &Agent {
    app.world().get::<Agent>(entity).unwrap()
}

fn counting_alarm(app: &mut App, settings: AlarmSettings) -> (AlarmHandle, Arc<AtomicUsize>) {
    let fired = Arc::new(AtomicUsize::new(0));
    let seen = fired.clone();
    let mut pool = app.world_mut().resource_mut::<AlarmPool>();
    let handle = pool.get(settings);
    pool.set_on_complete(handle, move |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    });
    (handle, fired)
}

#[test]
fn test_alarms_complete_in_every_domain() {
    let mut app = create_combat_app(42);
    app.update(); // первый update только инициализирует часы

    let alarms: Vec<_> = [TimeDomain::Scaled, TimeDomain::Unscaled, TimeDomain::Fixed]
        .into_iter()
        .map(|domain| counting_alarm(&mut app, AlarmSettings::new(0.5).domain(domain)))
        .collect();

    // 0.5s = 30 шагов; 20 шагов мало
    run(&mut app, 20);
    for (_, fired) in &alarms {
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    run(&mut app, 20);
    for (handle, fired) in &alarms {
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        // One-shot auto-release: handle уже не активен
        assert!(!app.world().resource::<AlarmPool>().is_in_use(*handle));
    }
}

#[test]
fn test_scaled_alarm_follows_virtual_speed() {
    let mut app = create_combat_app(42);
    app.update();

    let (_, scaled) = counting_alarm(&mut app, AlarmSettings::new(0.5));
    let (_, unscaled) = counting_alarm(&mut app, AlarmSettings::new(0.5).domain(TimeDomain::Unscaled));

    app.world_mut().resource_mut::<Time<Virtual>>().set_relative_speed(0.5);
    run(&mut app, 40);

    assert_eq!(unscaled.load(Ordering::SeqCst), 1);
    assert_eq!(scaled.load(Ordering::SeqCst), 0);

    run(&mut app, 30);
    assert_eq!(scaled.load(Ordering::SeqCst), 1);
}

#[test]
fn test_looping_alarm_keeps_firing() {
    let mut app = create_combat_app(42);
    app.update();

    let (handle, fired) = counting_alarm(&mut app, AlarmSettings::new(0.25).looping(true));
    run(&mut app, 70);

    let count = fired.load(Ordering::SeqCst);
    assert!((3..=4).contains(&count), "looping alarm fired {} times", count);
    assert!(app.world().resource::<AlarmPool>().is_in_use(handle));
}

#[test]
fn test_prone_player_recovers_through_state_alarm() {
    let mut app = create_combat_app(42);
    let config = AgentConfig::player();
    let player = spawn_player(app.world_mut(), &config, Vec2::ZERO);
    run(&mut app, 3);
    assert_eq!(agent(&app, player).state(), AgentState::Idle);

    // Parry meter пуст → Prone (standing threshold binding)
    app.world_mut()
        .get_mut::<Agent>(player)
        .unwrap()
        .reduce_stamina(1000.0);
    assert_eq!(agent(&app, player).state(), AgentState::Prone);

    // prone_duration = 1.5s = 90 шагов
    run(&mut app, 60);
    assert_eq!(agent(&app, player).state(), AgentState::Prone);
    assert_eq!(agent(&app, player).parry().value(), 0.0);

    run(&mut app, 60);
    assert_eq!(agent(&app, player).state(), AgentState::Idle);
    let state_alarm = app.world().get::<StateAlarm>(player).unwrap();
    assert_eq!(state_alarm.target, Some(AgentState::Idle));
    assert!(state_alarm.handle.is_some());
}

#[test]
fn test_player_light_attack_hits_enemy() {
    let mut app = create_combat_app(42);
    let player = spawn_player(app.world_mut(), &AgentConfig::player(), Vec2::ZERO);
    let enemy = spawn_enemy(app.world_mut(), &AgentConfig::enemy(), Vec2::new(1.0, 0.0), -1.0);
    run(&mut app, 3);

    let set_input = |app: &mut App, input: PlayerInput| {
        app.world_mut().get_mut::<PlayerBehavior>(player).unwrap().input = input;
    };

    set_input(
        &mut app,
        PlayerInput {
            attack_pressed: true,
            ..PlayerInput::default()
        },
    );
    run(&mut app, 2);
    assert_eq!(agent(&app, player).state(), AgentState::AttackLight);

    set_input(
        &mut app,
        PlayerInput {
            attack_released: true,
            ..PlayerInput::default()
        },
    );
    app.update();

    // Враг в Idle не парирует: чистый урон
    let light = AgentConfig::player().attack_light_power;
    assert_eq!(agent(&app, enemy).health().value(), 60.0 - light);
    let weapon = app.world().get::<Weapon>(player).unwrap();
    assert_eq!(weapon.hit_list(), &[enemy]);

    // Свинг закончился → Idle, оружие разряжено
    run(&mut app, 30);
    assert_eq!(agent(&app, player).state(), AgentState::Idle);
    assert!(!app.world().get::<Weapon>(player).unwrap().is_armed());
    assert_eq!(agent(&app, enemy).health().value(), 60.0 - light);
}

/// Test: player vs 2 enemy, 20 секунд без краша, meter'ы в границах
#[test]
fn test_duel_keeps_meter_invariants() {
    let mut app = create_combat_app(42);
    let config = SimulationConfig::default();

    let player = spawn_player(app.world_mut(), &config.player, Vec2::new(-1.0, 0.0));
    let enemies = [
        spawn_enemy(app.world_mut(), &config.enemy, Vec2::new(1.0, 0.0), -1.0),
        spawn_enemy(app.world_mut(), &config.enemy, Vec2::new(3.0, 0.0), -1.0),
    ];

    let mut enemy_left_idle = false;

    for tick in 0..1200 {
        app.update();

        for entity in std::iter::once(player).chain(enemies) {
            let current = agent(&app, entity);
            let (health, parry) = (current.health(), current.parry());
            assert!(
                health.value() >= health.min() && health.value() <= health.max(),
                "Tick {}: health {} out of bounds",
                tick,
                health.value()
            );
            assert!(
                parry.value() >= parry.min() && parry.value() <= parry.max(),
                "Tick {}: parry {} out of bounds",
                tick,
                parry.value()
            );
            if health.is_empty() {
                assert_eq!(current.state(), AgentState::Dead, "Tick {}: empty health but alive", tick);
            }
        }

        enemy_left_idle |= enemies
            .iter()
            .any(|entity| agent(&app, *entity).state() != AgentState::Idle);
    }

    // Enemy Idle длится 2s, за 20s AI обязан что-то сделать
    assert!(enemy_left_idle);

    // Dead агенты не держат играющий state alarm
    let pool = app.world().resource::<AlarmPool>();
    for entity in std::iter::once(player).chain(enemies) {
        if agent(&app, entity).state() != AgentState::Dead {
            continue;
        }
        if let Some(handle) = app.world().get::<StateAlarm>(entity).unwrap().handle {
            assert!(pool.alarm(handle).map_or(true, |alarm| !alarm.is_playing()));
        }
    }
}
