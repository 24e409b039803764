//! Combat module: weapons, hit detection, damage/parry resolution.
//!
//! ECS ответственность:
//! - `Weapon` (attack power, hit list)
//! - `WeaponOverlap` → `DamageDealt` / `AttackParried` / `EntityDied`
//!
//! Overlap может прийти от host'а (настоящая физика) или от
//! `detect_arena_overlaps` (headless арена).

use bevy::prelude::*;

use crate::agent::AgentSet;

pub mod damage;
pub mod hitbox;
pub mod weapon;

#[cfg(test)]
mod damage_tests;

pub use damage::{resolve_weapon_hits, AttackParried, DamageDealt, EntityDied};
pub use hitbox::{detect_arena_overlaps, WeaponOverlap};
pub use weapon::Weapon;

/// Combat Plugin
///
/// Регистрирует combat системы в FixedUpdate, после шага агентов:
/// 1. detect_arena_overlaps: armed оружие → WeaponOverlap
/// 2. resolve_weapon_hits: WeaponOverlap → damage/parry
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<WeaponOverlap>()
            .add_event::<DamageDealt>()
            .add_event::<AttackParried>()
            .add_event::<EntityDied>();

        app.add_systems(
            FixedUpdate,
            (detect_arena_overlaps, resolve_weapon_hits)
                .chain()
                .after(AgentSet::Step),
        );
    }
}
