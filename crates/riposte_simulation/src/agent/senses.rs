//! External oracles: physics queries and animation clip progress.
//!
//! Физика и анимация вне симуляции; агенты видят их только через эти интерфейсы.

use bevy::prelude::*;

/// Position snapshot of an agent other agents may look for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SightTarget {
    pub entity: Entity,
    pub position: Vec2,
    pub faction_id: u64,
}

/// Movement/physics oracle
pub trait SenseOracle: Send + Sync {
    /// Is there a surface at most `distance` below `origin` (cast half-width `radius`)?
    fn surface_within(&self, origin: Vec2, radius: f32, distance: f32) -> bool;

    /// Is an agent of another faction within `distance` along `direction` (±1) from `origin`?
    fn target_within(&self, origin: Vec2, direction: f32, distance: f32, faction_id: u64) -> bool;

    /// Final position for a move from `from` towards `to`
    fn resolve_motion(&self, _from: Vec2, to: Vec2) -> Vec2 {
        to
    }

    /// Latest agent positions, refreshed once per step
    fn observe(&mut self, _targets: &[SightTarget]) {}
}

/// Headless world: one horizontal ground segment and sight rays against agents
#[derive(Debug, Clone, PartialEq)]
pub struct FlatArena {
    pub ground_y: f32,
    pub left: f32,
    pub right: f32,
    /// Vertical tolerance of a sight ray
    pub sight_height: f32,
    targets: Vec<SightTarget>,
}

impl Default for FlatArena {
    fn default() -> Self {
        Self::new(0.0, -20.0, 20.0)
    }
}

impl FlatArena {
    pub fn new(ground_y: f32, left: f32, right: f32) -> Self {
        Self {
            ground_y,
            left,
            right,
            sight_height: 1.0,
            targets: Vec::new(),
        }
    }

    pub fn targets(&self) -> &[SightTarget] {
        &self.targets
    }

    fn over_ground(&self, x: f32, radius: f32) -> bool {
        x + radius >= self.left && x - radius <= self.right
    }
}

impl SenseOracle for FlatArena {
    fn surface_within(&self, origin: Vec2, radius: f32, distance: f32) -> bool {
        let clearance = origin.y - self.ground_y;
        self.over_ground(origin.x, radius) && (0.0..=distance).contains(&clearance)
    }

    fn target_within(&self, origin: Vec2, direction: f32, distance: f32, faction_id: u64) -> bool {
        self.targets.iter().any(|target| {
            let ahead = (target.position.x - origin.x) * direction;
            target.faction_id != faction_id
                && (0.0..=distance).contains(&ahead)
                && (target.position.y - origin.y).abs() <= self.sight_height
        })
    }

    /// Земля не пропускает вниз, пока агент над ней; за краем падение свободное
    fn resolve_motion(&self, from: Vec2, to: Vec2) -> Vec2 {
        let was_above = from.y >= self.ground_y;
        if was_above && to.y < self.ground_y && self.over_ground(to.x, 0.0) {
            Vec2::new(to.x, self.ground_y)
        } else {
            to
        }
    }

    fn observe(&mut self, targets: &[SightTarget]) {
        self.targets.clear();
        self.targets.extend_from_slice(targets);
    }
}

/// Oracle shared by every agent
#[derive(Resource)]
pub struct Senses(pub Box<dyn SenseOracle>);

impl Default for Senses {
    fn default() -> Self {
        Self(Box::new(FlatArena::default()))
    }
}

impl Senses {
    pub fn oracle(&self) -> &dyn SenseOracle {
        self.0.as_ref()
    }
}

/// Animation oracle: normalized progress of the current clip
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct ClipProgress {
    clip: Option<&'static str>,
    length: f32,
    elapsed: f32,
    done_reported: bool,
}

impl ClipProgress {
    /// Restart with a new clip; re-arms the completion edge
    pub fn play(&mut self, clip: &'static str, length: f32) {
        self.clip = Some(clip);
        self.length = length;
        self.elapsed = 0.0;
        self.done_reported = false;
    }

    pub fn stop(&mut self) {
        self.clip = None;
        self.elapsed = 0.0;
        self.done_reported = false;
    }

    pub fn clip(&self) -> Option<&'static str> {
        self.clip
    }

    pub fn advance(&mut self, dt: f32) {
        if self.clip.is_some() {
            self.elapsed += dt;
        }
    }

    /// 0..1 over the clip, may exceed 1; 0 without a clip
    pub fn normalized_time(&self) -> f32 {
        match self.clip {
            Some(_) if self.length > 0.0 => self.elapsed / self.length,
            Some(_) => 1.0,
            None => 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.clip.is_some() && self.normalized_time() >= 1.0
    }

    /// True exactly once per completion of the current clip
    pub fn take_done(&mut self) -> bool {
        if self.is_finished() && !self.done_reported {
            self.done_reported = true;
            true
        } else {
            false
        }
    }
}
