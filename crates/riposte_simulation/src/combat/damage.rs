//! Hit resolution: overlap → damage or parry.

use bevy::prelude::*;

use super::hitbox::WeaponOverlap;
use super::weapon::Weapon;
use crate::agent::{Agent, AgentConfig};
use crate::logger;

/// Событие: урон нанесен (health)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct DamageDealt {
    pub attacker: Entity,
    pub target: Entity,
    pub damage: f32,
    pub target_died: bool,
}

/// Событие: удар принят на парирование (parry meter)
#[derive(Event, Debug, Clone, PartialEq)]
pub struct AttackParried {
    pub attacker: Entity,
    pub target: Entity,
    pub amount: f32,
    /// Parry meter emptied: target knocked prone
    pub target_staggered: bool,
}

/// Событие: агент умер
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Система: WeaponOverlap → damage / parry
///
/// 1. Та же фракция, мёртвая цель или уже в hit list → пропуск
/// 2. Цель в parry-состоянии и смотрит на атакующего → parry meter
/// 3. Иначе → health
pub fn resolve_weapon_hits(
    mut overlaps: EventReader<WeaponOverlap>,
    mut weapons: Query<&mut Weapon>,
    mut agents: Query<(&mut Agent, &AgentConfig)>,
    mut damage_dealt: EventWriter<DamageDealt>,
    mut attack_parried: EventWriter<AttackParried>,
    mut entity_died: EventWriter<EntityDied>,
) {
    for overlap in overlaps.read() {
        if overlap.attacker == overlap.target {
            continue;
        }

        let Ok([(attacker, _), (mut target, target_config)]) =
            agents.get_many_mut([overlap.attacker, overlap.target])
        else {
            continue;
        };

        if attacker.faction_id == target.faction_id || !target.is_alive() {
            continue;
        }

        let Ok(mut weapon) = weapons.get_mut(overlap.attacker) else {
            logger::log_warning(&format!(
                "WeaponOverlap: attacker {:?} has no Weapon",
                overlap.attacker
            ));
            continue;
        };

        if !weapon.register_hit(overlap.target) {
            continue;
        }

        let power = weapon.attack_power;
        let parrying = target_config.can_parry_in(target.state()) && target.is_facing(&attacker);

        if parrying {
            let fired = target.reduce_stamina(power);
            attack_parried.write(AttackParried {
                attacker: overlap.attacker,
                target: overlap.target,
                amount: power,
                target_staggered: fired.min,
            });
            logger::log(&format!(
                "{:?} parried {:?} ({:.1}, parry {:.1})",
                overlap.target,
                overlap.attacker,
                power,
                target.parry().value()
            ));
        } else {
            let fired = target.take_damage(power);
            damage_dealt.write(DamageDealt {
                attacker: overlap.attacker,
                target: overlap.target,
                damage: power,
                target_died: fired.min,
            });
            if fired.min {
                entity_died.write(EntityDied {
                    entity: overlap.target,
                    killer: Some(overlap.attacker),
                });
                logger::log_info(&format!("{:?} killed by {:?}", overlap.target, overlap.attacker));
            }
        }
    }
}
