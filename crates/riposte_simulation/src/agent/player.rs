//! Player behavior: intent-driven (horizontal axis, attack, jump).

use bevy::prelude::*;
use once_cell::sync::Lazy;

use super::machine::{Behavior, PhaseContext};
use super::state::AgentState;
use super::table::PhaseTable;

/// One step of player intent. Edge flags (`*_pressed`, `attack_released`) are
/// cleared after each step; the host sets them again on the frame they happen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// -1..1
    pub horizontal: f32,
    pub attack_pressed: bool,
    pub attack_held: bool,
    pub attack_released: bool,
    pub jump_pressed: bool,
}

impl PlayerInput {
    pub fn clear_edges(&mut self) {
        self.attack_pressed = false;
        self.attack_released = false;
        self.jump_pressed = false;
    }
}

#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct PlayerBehavior {
    pub input: PlayerInput,
    move_dir: Vec2,
    /// Light swing started (attack released after the windup began)
    swinging: bool,
}

impl PlayerBehavior {
    pub fn move_dir(&self) -> Vec2 {
        self.move_dir
    }

    pub fn is_swinging(&self) -> bool {
        self.swinging
    }
}

static PLAYER_PHASES: Lazy<PhaseTable<PlayerBehavior>> = Lazy::new(|| {
    use AgentState::*;

    PhaseTable::new()
        .on_enter(Idle, idle_enter)
        .on_stay(Idle, idle_stay)
        .on_exit(Idle, noop)
        .on_enter(Walk, noop)
        .on_stay(Walk, walk_stay)
        .on_exit(Walk, noop)
        .on_enter(Jump, jump_enter)
        .on_stay(Jump, jump_stay)
        .on_exit(Jump, noop)
        .on_enter(AttackJump, attack_jump_enter)
        .on_stay(AttackJump, attack_jump_stay)
        .on_exit(AttackJump, noop)
        .on_enter(AttackLight, attack_light_enter)
        .on_stay(AttackLight, attack_light_stay)
        .on_exit(AttackLight, attack_light_exit)
        .on_enter(AttackHeavy, attack_heavy_enter)
        .on_stay(AttackHeavy, attack_heavy_stay)
        .on_exit(AttackHeavy, disarm)
        .on_enter(Prone, prone_enter)
        .on_stay(Prone, noop)
        .on_exit(Prone, noop)
        .on_enter(Dead, dead_enter)
        .on_stay(Dead, noop)
        .on_exit(Dead, noop)
        .inert(Parry)
});

impl Behavior for PlayerBehavior {
    fn phases() -> &'static PhaseTable<Self> {
        &PLAYER_PHASES
    }

    fn after_step(&mut self) {
        self.input.clear_edges();
    }
}

fn noop(_: &mut PlayerBehavior, _: &mut PhaseContext<'_>) {}

fn disarm(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.disarm_weapon();
}

fn transition(ctx: &mut PhaseContext<'_>, next: AgentState) {
    if next != ctx.state() {
        ctx.change_state_to(next);
    }
}

fn face_input(behavior: &PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.agent.face(behavior.input.horizontal);
}

fn idle_enter(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.clip.stop();
    ctx.disarm_weapon();
}

fn idle_stay(behavior: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    let input = behavior.input;
    let next = if input.attack_pressed || input.attack_held {
        AgentState::AttackLight
    } else if input.jump_pressed {
        AgentState::Jump
    } else if input.horizontal != 0.0 {
        AgentState::Walk
    } else {
        ctx.state()
    };
    transition(ctx, next);
}

fn walk_stay(behavior: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    let input = behavior.input;
    behavior.move_dir.x = input.horizontal * ctx.config.walk_speed;
    if ctx.is_grounded() {
        behavior.move_dir.y = behavior.move_dir.y.max(0.0);
    }
    behavior.move_dir.y -= ctx.gravity();
    ctx.move_agent(behavior.move_dir);
    face_input(behavior, ctx);

    let next = if input.attack_pressed {
        AgentState::AttackLight
    } else if input.jump_pressed {
        AgentState::Jump
    } else if input.horizontal == 0.0 {
        AgentState::Idle
    } else {
        ctx.state()
    };
    transition(ctx, next);
}

fn jump_enter(behavior: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    behavior.move_dir.y = ctx.config.jump_height;
}

fn jump_stay(behavior: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    // В прыжке горизонтальная скорость 2/3 от ходьбы
    behavior.move_dir.x = behavior.input.horizontal * ctx.config.walk_speed * 2.0 / 3.0;
    behavior.move_dir.y -= ctx.gravity();
    ctx.move_agent(behavior.move_dir);
    face_input(behavior, ctx);

    if ctx.is_grounded() {
        transition(ctx, AgentState::Idle);
    }
}

fn attack_jump_enter(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.change_state_to(AgentState::Jump);
}

fn attack_jump_stay(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    if ctx.is_grounded() {
        transition(ctx, AgentState::Idle);
    }
}

fn attack_light_enter(behavior: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    behavior.swinging = false;
    let windup = ctx.config.clips.windup;
    ctx.clip.play("attack_windup", windup);
}

/// Windup: release → light swing; hold through the windup → heavy
fn attack_light_stay(behavior: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    let input = behavior.input;

    if !behavior.swinging {
        if input.attack_released {
            behavior.swinging = true;
            let (length, power) = (ctx.config.clips.light, ctx.config.attack_light_power);
            ctx.clip.play("attack_light", length);
            ctx.arm_weapon(power);
        } else if input.attack_held && ctx.clip.take_done() {
            ctx.change_state_to(AgentState::AttackHeavy);
        }
    }

    if behavior.swinging && ctx.clip.take_done() {
        ctx.change_state_to(AgentState::Idle);
    }
}

fn attack_light_exit(behavior: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    behavior.swinging = false;
    ctx.disarm_weapon();
}

fn attack_heavy_enter(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    let (length, power) = (ctx.config.clips.heavy, ctx.config.attack_heavy_power);
    ctx.clip.play("attack_heavy", length);
    ctx.arm_weapon(power);
}

fn attack_heavy_stay(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    if ctx.clip.take_done() {
        ctx.change_state_to(AgentState::Idle);
    }
}

fn prone_enter(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.disarm_weapon();
    let (stagger, prone) = (ctx.config.clips.stagger, ctx.config.prone_duration);
    ctx.clip.play("stagger", stagger);
    ctx.set_state_alarm(prone, AgentState::Idle);
}

fn dead_enter(_: &mut PlayerBehavior, ctx: &mut PhaseContext<'_>) {
    ctx.stop_state_alarm();
    ctx.disarm_weapon();
    ctx.clip.stop();
}
