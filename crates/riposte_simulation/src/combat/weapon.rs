//! Weapon component: attack power and per-swing hit list.

use bevy::prelude::*;

/// Weapon carried by an agent (same entity)
///
/// `hit_list` предотвращает повторные попадания по одной цели за один swing.
/// Новый swing просит очистку (`request_clear`); она применяется при
/// следующем overlap, а не сразу.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Weapon {
    pub attack_power: f32,
    /// Horizontal hitbox length in front of the owner
    pub reach: f32,
    armed: bool,
    clear_requested: bool,
    hit_list: Vec<Entity>,
}

impl Weapon {
    pub fn new(reach: f32) -> Self {
        Self {
            attack_power: 0.0,
            reach,
            armed: false,
            clear_requested: false,
            hit_list: Vec::new(),
        }
    }

    /// Hitbox active: a swing is in progress
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Begin a swing with `power`; opens a new hit window
    pub fn arm(&mut self, power: f32) {
        self.attack_power = power;
        self.armed = true;
        self.request_clear();
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn request_clear(&mut self) {
        self.clear_requested = true;
    }

    pub fn hit_list(&self) -> &[Entity] {
        &self.hit_list
    }

    /// Record an overlap with `target`; `false` if it was already hit this window
    pub fn register_hit(&mut self, target: Entity) -> bool {
        if self.clear_requested {
            self.hit_list.clear();
            self.clear_requested = false;
        }

        if self.hit_list.contains(&target) {
            return false;
        }
        self.hit_list.push(target);
        true
    }
}
