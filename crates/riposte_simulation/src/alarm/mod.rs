//! Alarm system: pooled countdown timers driven by the simulation clocks.
//!
//! ECS ответственность:
//! - `AlarmPool` resource (arena + generational handles)
//! - Driver systems: Update (Scaled + Unscaled), FixedUpdate (Fixed)
//! - `AlarmCompleted` events
//!
//! Гарантия: ровно один driver на App. Повторная установка → `AlarmDriverError`.

use bevy::prelude::*;
use thiserror::Error;

use crate::logger;

pub mod pool;
pub mod systems;
pub mod timer;


pub use pool::{AlarmCompletion, AlarmHandle, AlarmPool, AlarmPoolConfig, AlarmPoolReport, AlarmReportEntry};
pub use systems::{advance_fixed_alarms, advance_frame_alarms, AlarmCompleted};
pub use timer::{Alarm, AlarmOverrides, AlarmSettings, CompletionCallback, TimeDomain, STOPPED_SENTINEL};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AlarmDriverError {
    #[error("alarm driver is already installed in this app")]
    AlreadyInstalled,
}

/// Ordering anchor: systems reacting to alarms run `.after(AlarmSet::Advance)`
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmSet {
    Advance,
}

/// Marker: the driver has been installed into this app
#[derive(Resource)]
struct AlarmDriverInstalled;

/// Install the pool resource, event and driver systems.
///
/// Fails if the app already has a driver; the existing pool is left untouched.
pub fn install_alarm_driver(app: &mut App, config: AlarmPoolConfig) -> Result<(), AlarmDriverError> {
    if app.world().contains_resource::<AlarmDriverInstalled>() {
        return Err(AlarmDriverError::AlreadyInstalled);
    }

    app.insert_resource(AlarmDriverInstalled)
        .insert_resource(AlarmPool::new(config))
        .add_event::<AlarmCompleted>()
        .add_systems(Update, advance_frame_alarms.in_set(AlarmSet::Advance))
        .add_systems(FixedUpdate, advance_fixed_alarms.in_set(AlarmSet::Advance));

    logger::log(&format!(
        "AlarmPool: driver installed (max_alarms_allowed={}, precision={})",
        config.max_alarms_allowed, config.precision
    ));
    Ok(())
}

pub fn has_alarm_driver(app: &App) -> bool {
    app.world().contains_resource::<AlarmDriverInstalled>()
}

/// Alarm Plugin
///
/// Добавление второго экземпляра не паникует: driver уже есть → warning, пул не трогаем.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlarmPlugin {
    pub config: AlarmPoolConfig,
}

impl Plugin for AlarmPlugin {
    fn build(&self, app: &mut App) {
        if let Err(err) = install_alarm_driver(app, self.config) {
            logger::log_warning(&format!("AlarmPlugin: {err}, keeping the existing pool"));
        }
    }

    fn is_unique(&self) -> bool {
        false
    }
}
