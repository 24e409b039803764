//! Enemy behavior: alarm-driven wandering, attacks on sight.

use bevy::prelude::*;
use once_cell::sync::Lazy;

use super::machine::{Behavior, PhaseContext};
use super::state::AgentState;
use super::table::PhaseTable;

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct EnemyBehavior {
    move_dir: Vec2,
}

impl EnemyBehavior {
    pub fn move_dir(&self) -> Vec2 {
        self.move_dir
    }
}

static ENEMY_PHASES: Lazy<PhaseTable<EnemyBehavior>> = Lazy::new(|| {
    use AgentState::*;

    PhaseTable::new()
        .on_enter(Idle, idle_enter)
        .on_stay(Idle, idle_stay)
        .on_exit(Idle, noop)
        .on_enter(Walk, walk_enter)
        .on_stay(Walk, walk_stay)
        .on_exit(Walk, noop)
        .on_enter(Jump, jump_enter)
        .on_stay(Jump, jump_stay)
        .on_exit(Jump, noop)
        .on_enter(AttackLight, attack_light_enter)
        .on_stay(AttackLight, attack_light_stay)
        .on_exit(AttackLight, disarm)
        .on_enter(AttackHeavy, attack_heavy_enter)
        .on_stay(AttackHeavy, attack_heavy_stay)
        .on_exit(AttackHeavy, disarm)
        .on_enter(Prone, prone_enter)
        .on_stay(Prone, noop)
        .on_exit(Prone, prone_exit)
        .on_enter(Dead, dead_enter)
        .on_stay(Dead, noop)
        .on_exit(Dead, noop)
        .inert(AttackJump)
        .inert(Parry)
});

impl Behavior for EnemyBehavior {
    fn phases() -> &'static PhaseTable<Self> {
        &ENEMY_PHASES
    }
}

fn noop(_: &mut EnemyBehavior, _: &mut PhaseContext<'_>) {}

fn disarm(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.disarm_weapon();
}

/// 1 из 3 → тяжёлая атака
fn pick_attack(ctx: &mut PhaseContext<'_>) -> AgentState {
    if ctx.roll(3) {
        AgentState::AttackHeavy
    } else {
        AgentState::AttackLight
    }
}

fn idle_enter(behavior: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.clip.stop();
    ctx.disarm_weapon();
    let next = if ctx.roll(4) {
        AgentState::Jump
    } else {
        AgentState::Walk
    };
    ctx.set_state_alarm(2.0, next);
    behavior.move_dir.x = 0.0;
}

fn idle_stay(behavior: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    behavior.move_dir.y = if ctx.is_grounded() {
        behavior.move_dir.y.max(0.0)
    } else {
        behavior.move_dir.y - ctx.gravity()
    };
    ctx.move_agent(behavior.move_dir);
}

fn walk_enter(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.set_state_alarm(4.0, AgentState::Idle);
    if ctx.roll(2) {
        ctx.agent.turn_around();
    }
}

fn walk_stay(behavior: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    behavior.move_dir.x = ctx.agent.facing * ctx.config.walk_speed;
    if ctx.is_grounded() {
        behavior.move_dir.y = behavior.move_dir.y.max(0.0);
    }
    behavior.move_dir.y -= ctx.gravity();
    if !ctx.ground_in_front() {
        ctx.agent.turn_around();
    }
    ctx.move_agent(behavior.move_dir);

    if ctx.target_seen() {
        let attack = pick_attack(ctx);
        ctx.change_state_to(attack);
    }
}

fn jump_enter(behavior: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    behavior.move_dir.y = ctx.config.jump_height;
}

fn jump_stay(behavior: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    behavior.move_dir.x = ctx.agent.facing * ctx.config.walk_speed / 2.0;
    behavior.move_dir.y -= ctx.gravity();
    ctx.move_agent(behavior.move_dir);

    if ctx.is_grounded() {
        ctx.change_state_to(AgentState::Idle);
    }
}

fn attack_light_enter(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    let (length, power) = (ctx.config.clips.light, ctx.config.attack_light_power);
    ctx.clip.play("attack_light", length);
    ctx.stop_state_alarm();
    ctx.arm_weapon(power);
}

fn attack_light_stay(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    if !ctx.target_seen() {
        ctx.change_state_to(AgentState::Idle);
    } else if ctx.roll(4) && ctx.clip.is_finished() {
        ctx.change_state_to(AgentState::AttackHeavy);
    }
}

fn attack_heavy_enter(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    let (length, power) = (ctx.config.clips.heavy, ctx.config.attack_heavy_power);
    ctx.clip.play("attack_heavy", length);
    ctx.stop_state_alarm();
    ctx.arm_weapon(power);
}

fn attack_heavy_stay(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    if ctx.roll(2) && ctx.clip.is_finished() {
        ctx.change_state_to(AgentState::AttackLight);
    }
}

fn prone_enter(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.disarm_weapon();
    let (stagger, prone) = (ctx.config.clips.stagger, ctx.config.prone_duration);
    ctx.clip.play("stagger", stagger);
    ctx.set_state_alarm(prone, AgentState::Idle);
}

/// Встаёт с контратакой, если игрок рядом
fn prone_exit(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    if ctx.target_seen() {
        let attack = pick_attack(ctx);
        ctx.change_state_to(attack);
    }
}

fn dead_enter(_: &mut EnemyBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.stop_state_alarm();
    ctx.disarm_weapon();
    ctx.clip.stop();
}
