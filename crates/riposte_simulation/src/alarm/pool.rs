//! AlarmPool: arena of reusable alarms addressed by generational handles.
//!
//! Слоты живут в `slots`; `in_use` хранит упорядоченный список активных handle'ов.
//! Освобождённый слот остаётся в пуле (reuse) пока пул не превышает
//! `max_alarms_allowed`, иначе слот вытесняется.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::timer::{Alarm, AlarmOverrides, AlarmSettings, TimeDomain};
use crate::logger;

/// Generational reference into [`AlarmPool`].
///
/// A handle goes stale once its alarm is released; the slot's generation is bumped
/// on reuse so stale handles never reach the new occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AlarmHandle {
    index: u32,
    generation: u32,
}

impl AlarmHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Pool sizing and inspector options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmPoolConfig {
    /// Soft cap on pooled (allocated) alarms; release evicts above it
    pub max_alarms_allowed: usize,
    /// Decimal places used by display values
    pub precision: u32,
}

impl Default for AlarmPoolConfig {
    fn default() -> Self {
        Self {
            max_alarms_allowed: 10,
            precision: 2,
        }
    }
}

/// Completion recorded during a tick, drained by the driver into events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmCompletion {
    pub handle: AlarmHandle,
    pub domain: TimeDomain,
}

struct AlarmSlot {
    generation: u32,
    /// `None` = evicted (slot vacant, reusable for a fresh allocation)
    alarm: Option<Alarm>,
    in_use: bool,
}

#[derive(Resource)]
pub struct AlarmPool {
    slots: Vec<AlarmSlot>,
    in_use: Vec<AlarmHandle>,
    next_id: u64,
    completed: Vec<AlarmCompletion>,
    pub config: AlarmPoolConfig,
    pub overrides: AlarmOverrides,
}

impl Default for AlarmPool {
    fn default() -> Self {
        Self::new(AlarmPoolConfig::default())
    }
}

impl AlarmPool {
    pub fn new(config: AlarmPoolConfig) -> Self {
        Self {
            slots: Vec::new(),
            in_use: Vec::new(),
            next_id: 0,
            completed: Vec::new(),
            config,
            overrides: AlarmOverrides::default(),
        }
    }

    /// Allocated alarms (in use or idle, not evicted)
    pub fn pool_size(&self) -> usize {
        self.slots.iter().filter(|slot| slot.alarm.is_some()).count()
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.len()
    }

    /// Active handles in acquisition order
    pub fn in_use(&self) -> &[AlarmHandle] {
        &self.in_use
    }

    pub fn is_in_use(&self, handle: AlarmHandle) -> bool {
        self.alarm(handle).is_some()
    }

    /// Acquire an alarm, reusing an idle pooled one when available.
    ///
    /// The alarm starts playing immediately.
    pub fn get(&mut self, settings: AlarmSettings) -> AlarmHandle {
        let idle = if self.in_use.len() < self.pool_size() {
            self.slots
                .iter()
                .position(|slot| slot.alarm.is_some() && !slot.in_use)
        } else {
            None
        };

        let index = match idle {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.generation = slot.generation.wrapping_add(1);
                if let Some(alarm) = slot.alarm.as_mut() {
                    alarm.configure(settings);
                }
                slot.in_use = true;
                index
            }
            None => {
                let alarm = Alarm::new(self.next_id, settings);
                self.next_id += 1;

                match self.slots.iter().position(|slot| slot.alarm.is_none()) {
                    Some(index) => {
                        let slot = &mut self.slots[index];
                        slot.generation = slot.generation.wrapping_add(1);
                        slot.alarm = Some(alarm);
                        slot.in_use = true;
                        index
                    }
                    None => {
                        self.slots.push(AlarmSlot {
                            generation: 0,
                            alarm: Some(alarm),
                            in_use: true,
                        });
                        logger::log(&format!("AlarmPool: grew to {} slots", self.slots.len()));
                        self.slots.len() - 1
                    }
                }
            }
        };

        let handle = AlarmHandle {
            index: index as u32,
            generation: self.slots[index].generation,
        };
        self.in_use.push(handle);
        handle
    }

    /// `get(AlarmSettings::new(duration).named(name))`
    pub fn get_named(&mut self, name: impl Into<String>, duration: f32) -> AlarmHandle {
        self.get(AlarmSettings::new(duration).named(name))
    }

    /// `None` for stale or released handles
    pub fn alarm(&self, handle: AlarmHandle) -> Option<&Alarm> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation || !slot.in_use {
            return None;
        }
        slot.alarm.as_ref()
    }

    pub fn alarm_mut(&mut self, handle: AlarmHandle) -> Option<&mut Alarm> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || !slot.in_use {
            return None;
        }
        slot.alarm.as_mut()
    }

    /// Apply `f` to a live alarm; `false` when the handle is stale
    pub fn with_alarm(&mut self, handle: AlarmHandle, f: impl FnOnce(&mut Alarm)) -> bool {
        match self.alarm_mut(handle) {
            Some(alarm) => {
                f(alarm);
                true
            }
            None => false,
        }
    }

    pub fn play(&mut self, handle: AlarmHandle) -> bool {
        self.with_alarm(handle, Alarm::play)
    }

    pub fn pause(&mut self, handle: AlarmHandle) -> bool {
        self.with_alarm(handle, Alarm::pause)
    }

    pub fn stop(&mut self, handle: AlarmHandle) -> bool {
        self.with_alarm(handle, Alarm::stop)
    }

    pub fn reset(&mut self, handle: AlarmHandle, duration: Option<f32>) -> bool {
        self.with_alarm(handle, |alarm| alarm.reset(duration))
    }

    pub fn reset_and_play(&mut self, handle: AlarmHandle, duration: Option<f32>) -> bool {
        self.with_alarm(handle, |alarm| alarm.reset_and_play(duration))
    }

    pub fn set_on_complete(
        &mut self,
        handle: AlarmHandle,
        callback: impl FnMut(AlarmHandle) + Send + Sync + 'static,
    ) -> bool {
        self.with_alarm(handle, |alarm| alarm.set_on_complete(callback))
    }

    /// Return the alarm to the pool. Idempotent: releasing a stale handle is a no-op.
    ///
    /// Completion observers are dropped. If the pool holds more than
    /// `max_alarms_allowed` alarms, the slot is evicted instead of kept for reuse.
    pub fn release(&mut self, handle: AlarmHandle) -> bool {
        let Some(position) = self.in_use.iter().position(|h| *h == handle) else {
            return false;
        };
        self.in_use.remove(position);

        let evict = self.pool_size() > self.config.max_alarms_allowed;
        let slot = &mut self.slots[handle.index as usize];
        slot.in_use = false;

        if evict {
            if let Some(alarm) = slot.alarm.take() {
                logger::log(&format!("AlarmPool: evicting {}", alarm.display_name()));
            }
        } else if let Some(alarm) = slot.alarm.as_mut() {
            alarm.clear_on_complete();
        }
        true
    }

    pub fn release_all(&mut self) {
        while let Some(handle) = self.in_use.first().copied() {
            self.release(handle);
        }
    }

    pub fn stop_all(&mut self) {
        self.for_each_in_use(Alarm::stop);
    }

    pub fn pause_all(&mut self) {
        self.for_each_in_use(Alarm::pause);
    }

    pub fn play_all(&mut self) {
        self.for_each_in_use(Alarm::play);
    }

    pub fn reset_all(&mut self) {
        self.for_each_in_use(|alarm| alarm.reset(None));
    }

    fn for_each_in_use(&mut self, mut f: impl FnMut(&mut Alarm)) {
        for handle in self.in_use.clone() {
            if let Some(alarm) = self.alarm_mut(handle) {
                f(alarm);
            }
        }
    }

    /// One driver pass over every in-use alarm of `domain`.
    ///
    /// Safe against alarms releasing themselves mid-pass: when the current entry
    /// leaves `in_use`, the same position is visited again. Returns the number of
    /// completions recorded.
    pub fn tick(&mut self, domain: TimeDomain, elapsed: f32) -> usize {
        let overrides = self.overrides;
        let mut completions = 0;
        let mut position = 0;

        while position < self.in_use.len() {
            let handle = self.in_use[position];
            let Some(alarm) = self.alarm_mut(handle) else {
                position += 1;
                continue;
            };

            let outcome = alarm.tick(handle, domain, elapsed, overrides);

            if outcome.completed {
                completions += 1;
                self.completed.push(AlarmCompletion { handle, domain });
            }
            if outcome.release {
                self.release(handle);
            }

            // Текущий handle всё ещё на месте → дальше; иначе позиция уже указывает на следующий
            if self.in_use.get(position) == Some(&handle) {
                position += 1;
            }
        }

        completions
    }

    /// Completions recorded since the last drain, oldest first
    pub fn drain_completed(&mut self) -> Vec<AlarmCompletion> {
        std::mem::take(&mut self.completed)
    }

    /// Inspector snapshot of the pool
    pub fn report(&self) -> AlarmPoolReport {
        let precision = self.config.precision;
        let alarms = self
            .in_use
            .iter()
            .filter_map(|handle| self.alarm(*handle).map(|alarm| (*handle, alarm)))
            .map(|(handle, alarm)| AlarmReportEntry {
                handle,
                name: alarm.display_name(),
                time_remaining: alarm.display_time_remaining(precision),
                time_max: alarm.display_time_max(precision),
                scale: alarm.time_scale(),
                domain: alarm.domain(),
                looping: alarm.is_looping(),
                auto_release: alarm.auto_release(),
                paused: alarm.is_paused(),
                stopped: alarm.is_stopped(),
            })
            .collect();

        AlarmPoolReport {
            pool_size: self.pool_size(),
            in_use: self.in_use.len(),
            max_alarms_allowed: self.config.max_alarms_allowed,
            overrides: self.overrides,
            alarms,
        }
    }
}

/// Serializable pool snapshot (debug overlay / log dump)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmPoolReport {
    pub pool_size: usize,
    pub in_use: usize,
    pub max_alarms_allowed: usize,
    pub overrides: AlarmOverrides,
    pub alarms: Vec<AlarmReportEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlarmReportEntry {
    pub handle: AlarmHandle,
    pub name: String,
    pub time_remaining: f32,
    pub time_max: f32,
    pub scale: f32,
    pub domain: TimeDomain,
    pub looping: bool,
    pub auto_release: bool,
    pub paused: bool,
    pub stopped: bool,
}
