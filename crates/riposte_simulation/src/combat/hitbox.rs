//! Weapon overlap detection for the headless arena.
//!
//! Host с настоящей физикой шлёт `WeaponOverlap` сам; здесь упрощённый hitbox:
//! отрезок длиной `reach` перед владельцем, пока оружие armed.

use bevy::prelude::*;

use super::weapon::Weapon;
use crate::agent::Agent;

/// Вертикальный допуск hitbox'а
const HITBOX_HEIGHT: f32 = 1.0;

/// Событие: оружие `attacker` пересеклось с агентом `target`
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeaponOverlap {
    pub attacker: Entity,
    pub target: Entity,
}

/// Система: armed оружие → WeaponOverlap для каждого агента в зоне досягаемости
pub fn detect_arena_overlaps(
    attackers: Query<(Entity, &Weapon, &Agent)>,
    targets: Query<(Entity, &Agent)>,
    mut overlaps: EventWriter<WeaponOverlap>,
) {
    for (attacker, weapon, owner) in attackers.iter() {
        if !weapon.is_armed() || !owner.is_alive() {
            continue;
        }

        for (target, agent) in targets.iter() {
            if target == attacker {
                continue;
            }

            let ahead = (agent.x() - owner.x()) * owner.facing;
            let level = (agent.y() - owner.y()).abs() <= HITBOX_HEIGHT;
            if level && (0.0..=weapon.reach).contains(&ahead) {
                overlaps.write(WeaponOverlap { attacker, target });
            }
        }
    }
}
