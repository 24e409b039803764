//! Alarm driver systems: advance the pool once per pass of each clock.

use bevy::prelude::*;

use super::pool::{AlarmHandle, AlarmPool};
use super::timer::TimeDomain;

/// Completion notification for ECS consumers (state alarms, scripted reactions)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmCompleted {
    pub handle: AlarmHandle,
    pub domain: TimeDomain,
}

/// Update: Scaled alarms on the virtual clock, then Unscaled on the real clock
pub fn advance_frame_alarms(
    virtual_time: Res<Time<Virtual>>,
    real_time: Res<Time<Real>>,
    mut pool: ResMut<AlarmPool>,
    mut completed: EventWriter<AlarmCompleted>,
) {
    pool.tick(TimeDomain::Scaled, virtual_time.delta_secs());
    pool.tick(TimeDomain::Unscaled, real_time.delta_secs());

    for completion in pool.drain_completed() {
        completed.write(AlarmCompleted {
            handle: completion.handle,
            domain: completion.domain,
        });
    }
}

/// FixedUpdate: Fixed alarms on the fixed step
pub fn advance_fixed_alarms(
    fixed_time: Res<Time<Fixed>>,
    mut pool: ResMut<AlarmPool>,
    mut completed: EventWriter<AlarmCompleted>,
) {
    pool.tick(TimeDomain::Fixed, fixed_time.delta_secs());

    for completion in pool.drain_completed() {
        completed.write(AlarmCompleted {
            handle: completion.handle,
            domain: completion.domain,
        });
    }
}
