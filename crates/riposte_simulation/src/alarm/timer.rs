//! Alarm value: one countdown timer slot.
//!
//! Every mutation goes through the methods here; the pool only decides which slot
//! is live and performs release.

use serde::{Deserialize, Serialize};

use super::pool::AlarmHandle;
use crate::meter::clamp_between;

/// Remaining time of a stopped alarm (distinct from "reached zero")
pub const STOPPED_SENTINEL: f32 = -1.0;

/// Which simulation clock advances an alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeDomain {
    /// Virtual (time-scaled) frame clock
    #[default]
    Scaled,
    /// Real frame clock, ignores time scale
    Unscaled,
    /// Fixed-rate physics step
    Fixed,
}

/// Completion observer; receives the handle of the alarm that completed
pub type CompletionCallback = Box<dyn FnMut(AlarmHandle) + Send + Sync>;

/// Parameters for [`AlarmPool::get`](super::AlarmPool::get)
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmSettings {
    pub name: String,
    pub duration: f32,
    pub looping: bool,
    pub auto_release: bool,
    pub scale: f32,
    pub domain: TimeDomain,
}

impl AlarmSettings {
    /// One-shot, auto-releasing, scaled alarm
    pub fn new(duration: f32) -> Self {
        Self {
            name: "New".to_string(),
            duration,
            looping: false,
            auto_release: true,
            scale: 1.0,
            domain: TimeDomain::Scaled,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn auto_release(mut self, auto_release: bool) -> Self {
        self.auto_release = auto_release;
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn domain(mut self, domain: TimeDomain) -> Self {
        self.domain = domain;
        self
    }
}

/// Pool-wide debug switches honored by every alarm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmOverrides {
    pub disable_all_auto_release: bool,
    pub disable_all_complete: bool,
}

/// What the pool must do after a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TickOutcome {
    pub completed: bool,
    pub release: bool,
}

pub struct Alarm {
    id: u64,
    name: String,
    time_remaining: f32,
    time_max: f32,
    time_scale: f32,
    domain: TimeDomain,
    looping: bool,
    auto_release: bool,
    paused: bool,
    stopped: bool,
    on_complete: Option<CompletionCallback>,
}

impl std::fmt::Debug for Alarm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alarm")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("time_remaining", &self.time_remaining)
            .field("time_max", &self.time_max)
            .field("time_scale", &self.time_scale)
            .field("domain", &self.domain)
            .field("looping", &self.looping)
            .field("auto_release", &self.auto_release)
            .field("paused", &self.paused)
            .field("stopped", &self.stopped)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Alarm {
    pub(crate) fn new(id: u64, settings: AlarmSettings) -> Self {
        let mut alarm = Self {
            id,
            name: String::new(),
            time_remaining: 0.0,
            time_max: 0.0,
            time_scale: 1.0,
            domain: TimeDomain::Scaled,
            looping: false,
            auto_release: true,
            paused: false,
            stopped: false,
            on_complete: None,
        };
        alarm.configure(settings);
        alarm
    }

    /// Re-arm a (possibly reused) slot. Negative durations keep their sign in
    /// `time_remaining` but the bound is `|duration|`.
    pub(crate) fn configure(&mut self, settings: AlarmSettings) {
        self.name = settings.name;
        self.time_max = settings.duration.abs();
        self.time_remaining = settings.duration;
        self.time_scale = settings.scale;
        self.domain = settings.domain;
        self.looping = settings.looping;
        self.auto_release = settings.auto_release;
        self.paused = false;
        self.stopped = false;
        self.on_complete = None;
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> String {
        format!("Alarm {}: {}", self.id, self.name)
    }

    /// Raw remaining time; [`STOPPED_SENTINEL`] once stopped
    pub fn time_remaining(&self) -> f32 {
        self.time_remaining
    }

    pub fn time_max(&self) -> f32 {
        self.time_max
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    pub fn auto_release(&self) -> bool {
        self.auto_release
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Neither paused nor stopped, with time left
    pub fn is_playing(&self) -> bool {
        !self.paused && !self.stopped && self.time_remaining > 0.0
    }

    /// 1 when freshly armed, approaching 0
    pub fn percent_remaining(&self) -> f32 {
        self.time_remaining / self.time_max
    }

    /// 0 when freshly armed, approaching 1
    pub fn percent_complete(&self) -> f32 {
        1.0 - self.time_remaining / self.time_max
    }

    /// Remaining time rounded up to `precision` decimals, never below 0
    pub fn display_time_remaining(&self, precision: u32) -> f32 {
        clip_to_decimal_place(self.time_remaining, precision).max(0.0)
    }

    pub fn display_time_max(&self, precision: u32) -> f32 {
        clip_to_decimal_place(self.time_max, precision)
    }

    pub fn set_on_complete(&mut self, callback: impl FnMut(AlarmHandle) + Send + Sync + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    pub fn clear_on_complete(&mut self) {
        self.on_complete = None;
    }

    pub fn has_on_complete(&self) -> bool {
        self.on_complete.is_some()
    }

    pub fn play(&mut self) {
        self.paused = false;
        self.stopped = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Stopped alarms stay in use; only `release` frees the slot
    pub fn stop(&mut self) {
        self.stopped = true;
        self.time_remaining = STOPPED_SENTINEL;
    }

    /// Restore `time_remaining` (optionally with a new maximum, `|duration|`).
    /// Paused/stopped flags are untouched: a stopped alarm needs an explicit `play`.
    pub fn reset(&mut self, duration: Option<f32>) {
        if let Some(duration) = duration {
            self.time_max = duration.abs();
        }
        self.time_remaining = self.time_max;
    }

    pub fn reset_and_play(&mut self, duration: Option<f32>) {
        self.reset(duration);
        self.play();
    }

    /// Landing on exactly 0 completes on the next tick, like natural expiry
    pub fn adjust_time_remaining(&mut self, delta: f32) {
        self.time_remaining = clamp_between(self.time_remaining + delta, 0.0, self.time_max);
    }

    pub fn set_time_remaining(&mut self, time: f32) {
        self.time_remaining = clamp_between(time, 0.0, self.time_max);
    }

    /// Negative maximums are taken as `|time|`
    pub fn set_time_maximum(&mut self, time: f32) {
        self.time_max = time.abs();
        self.time_remaining = clamp_between(self.time_remaining, 0.0, self.time_max);
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    pub fn set_auto_release(&mut self, auto_release: bool) {
        self.auto_release = auto_release;
    }

    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale;
    }

    /// One driver pass for `domain`.
    ///
    /// A remaining time of exactly 0 on entry fires completion first; anything at
    /// or below 0 then loops, asks the pool for release, or stops.
    pub(crate) fn tick(
        &mut self,
        handle: AlarmHandle,
        domain: TimeDomain,
        elapsed: f32,
        overrides: AlarmOverrides,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if self.paused || self.stopped || self.domain != domain {
            return outcome;
        }

        if self.time_remaining == 0.0 && !overrides.disable_all_complete {
            outcome.completed = true;
            if let Some(callback) = self.on_complete.as_mut() {
                callback(handle);
            }
        }

        if self.time_remaining <= 0.0 {
            if self.looping && !self.stopped {
                self.reset(None);
            } else if self.auto_release && !overrides.disable_all_auto_release {
                outcome.release = true;
            } else {
                self.stop();
            }
            return outcome;
        }

        let moved = move_towards(self.time_remaining, 0.0, self.time_scale * elapsed);
        self.time_remaining = clamp_between(moved, 0.0, self.time_max);
        outcome
    }
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

fn clip_to_decimal_place(value: f32, decimals: u32) -> f32 {
    let precision = 10f32.powi(decimals as i32).max(1.0);
    (value * precision).ceil() / precision
}
