//! Meters: bounded scalar accumulators (health, parry stamina, bars).
//!
//! A `Meter` scales every adjustment by an asymmetric rate (`rate_up` for gains,
//! `rate_down` for losses), clamps into `[min, max]` and evaluates its threshold
//! observers after each mutation: min first, then max.
//!
//! Observers come in two forms:
//! - closures registered with [`Meter::on_min`] / [`Meter::on_max`];
//! - the returned [`Thresholds`] value, which owners (e.g. `Agent`) route through
//!   their own standing subscriptions.

use serde::{Deserialize, Serialize};

pub mod multi;


pub use multi::MultiMeter;

/// Observer closure for a threshold crossing
pub type ThresholdCallback = Box<dyn FnMut() + Send + Sync>;

/// Which thresholds fired during one mutating call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thresholds {
    pub min: bool,
    pub max: bool,
}

impl Thresholds {
    pub const NONE: Thresholds = Thresholds { min: false, max: false };

    pub fn any(&self) -> bool {
        self.min || self.max
    }
}

/// Result of [`Meter::adjust_with_overflow`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Adjustment {
    /// `(bound - unclamped_value) / rate`; 0 when no bound was crossed.
    /// Positive when the minimum was undershot, negative when the maximum was overshot.
    pub overflow: f32,
    pub fired: Thresholds,
}

/// Serializable meter definition (config files, presets)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeterSpec {
    pub min: f32,
    pub max: f32,
    pub value: f32,
    pub rate_up: f32,
    pub rate_down: f32,
}

impl Default for MeterSpec {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            value: 100.0,
            rate_up: 1.0,
            rate_down: 1.0,
        }
    }
}

impl MeterSpec {
    /// Full meter `[0, max]` with unit rates
    pub fn full(max: f32) -> Self {
        Self {
            max,
            value: max,
            ..Self::default()
        }
    }
}

/// `f32::clamp` panics on inverted bounds; meters tolerate them.
pub(crate) fn clamp_between(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

pub struct Meter {
    pub name: String,
    min: f32,
    max: f32,
    value: f32,
    rate_up: f32,
    rate_down: f32,
    on_min: Vec<ThresholdCallback>,
    on_max: Vec<ThresholdCallback>,
}

impl std::fmt::Debug for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Meter")
            .field("name", &self.name)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("value", &self.value)
            .field("rate_up", &self.rate_up)
            .field("rate_down", &self.rate_down)
            .field("on_min", &self.on_min.len())
            .field("on_max", &self.on_max.len())
            .finish()
    }
}

impl Default for Meter {
    fn default() -> Self {
        Self::from_spec("New Meter", MeterSpec::default())
    }
}

impl Meter {
    pub fn new(min: f32, max: f32, value: f32) -> Self {
        Self::from_spec(
            "New Meter",
            MeterSpec {
                min,
                max,
                value,
                ..MeterSpec::default()
            },
        )
    }

    pub fn from_spec(name: impl Into<String>, spec: MeterSpec) -> Self {
        Self {
            name: name.into(),
            min: spec.min,
            max: spec.max,
            value: spec.value,
            rate_up: spec.rate_up,
            rate_down: spec.rate_down,
            on_min: Vec::new(),
            on_max: Vec::new(),
        }
    }

    pub fn with_rates(mut self, rate_up: f32, rate_down: f32) -> Self {
        self.rate_up = rate_up;
        self.rate_down = rate_down;
        self
    }

    pub fn spec(&self) -> MeterSpec {
        MeterSpec {
            min: self.min,
            max: self.max,
            value: self.value,
            rate_up: self.rate_up,
            rate_down: self.rate_down,
        }
    }

    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn rate_up(&self) -> f32 {
        self.rate_up
    }

    pub fn rate_down(&self) -> f32 {
        self.rate_down
    }

    /// 0 at minimum, 1 at maximum
    pub fn percent(&self) -> f32 {
        (self.value - self.min) / (self.max - self.min)
    }

    pub fn range(&self) -> f32 {
        self.max - self.min
    }

    pub fn is_full(&self) -> bool {
        self.value >= self.max
    }

    pub fn is_empty(&self) -> bool {
        self.value <= self.min
    }

    /// Subscribe to "value reached minimum or lower"
    pub fn on_min(&mut self, callback: impl FnMut() + Send + Sync + 'static) {
        self.on_min.push(Box::new(callback));
    }

    /// Subscribe to "value reached maximum or higher"
    pub fn on_max(&mut self, callback: impl FnMut() + Send + Sync + 'static) {
        self.on_max.push(Box::new(callback));
    }

    pub fn clear_observers(&mut self) {
        self.on_min.clear();
        self.on_max.clear();
    }

    fn rate_for(&self, delta: f32) -> f32 {
        if delta > 0.0 {
            self.rate_up
        } else {
            self.rate_down
        }
    }

    /// Adjust by `delta` scaled by the directional rate.
    pub fn adjust(&mut self, delta: f32, clamp: bool) -> Thresholds {
        let scaled = delta * self.rate_for(delta);
        self.value = if clamp {
            clamp_between(self.value + scaled, self.min, self.max)
        } else {
            self.value + scaled
        };
        self.check_thresholds()
    }

    /// Same as [`Meter::adjust`], also reporting how far past the crossed bound
    /// the unclamped value landed, divided back by the rate.
    pub fn adjust_with_overflow(&mut self, delta: f32, clamp: bool) -> Adjustment {
        let rate = self.rate_for(delta);
        self.value += delta * rate;

        let mut overflow = 0.0;
        if self.value < self.min || self.value > self.max {
            let bound = if self.value < self.min { self.min } else { self.max };
            overflow = (bound - self.value) / rate;

            if clamp {
                self.value = clamp_between(self.value, self.min, self.max);
            }
        }

        Adjustment {
            overflow,
            fired: self.check_thresholds(),
        }
    }

    pub fn fill(&mut self) -> Thresholds {
        self.value = self.max;
        self.check_thresholds()
    }

    /// Set to minimum; `trigger = false` is a silent reset (no `on_min`).
    pub fn empty(&mut self, trigger: bool) -> Thresholds {
        self.value = self.min;
        if trigger {
            self.check_thresholds()
        } else {
            Thresholds::NONE
        }
    }

    pub fn clamp(&mut self) -> Thresholds {
        self.value = clamp_between(self.value, self.min, self.max);
        self.check_thresholds()
    }

    pub fn set_new_bounds(&mut self, min: f32, max: f32, clip: bool) -> Thresholds {
        self.min = min;
        self.max = max;
        if clip {
            self.value = clamp_between(self.value, self.min, self.max);
        }
        self.check_thresholds()
    }

    fn check_thresholds(&mut self) -> Thresholds {
        let mut fired = Thresholds::NONE;

        if self.value <= self.min {
            fired.min = true;
            for callback in self.on_min.iter_mut() {
                callback();
            }
        }

        if self.value >= self.max {
            fired.max = true;
            for callback in self.on_max.iter_mut() {
                callback();
            }
        }

        fired
    }
}
