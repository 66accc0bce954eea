//! Scenario runner: advances the tick clock and runs the dispatch schedule.
//!
//! Clock progression happens here, outside systems. Each step advances
//! [TickClock] by one tick, then runs the schedule once.

use std::sync::atomic::{AtomicBool, Ordering};

use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::ExecutorKind;

use crate::clock::TickClock;
use crate::ecs::{FleetOrder, Tick};
use crate::error::{DispatchError, DispatchResult};
use crate::matching::ScoringFunctionResource;
use crate::movement::MovementModelResource;
use crate::scenario::DispatchParams;
use crate::spatial::SpatialIndex;
use crate::systems::fleet_step::fleet_step_system;
use crate::telemetry::DispatchTelemetry;

/// Builds the dispatch schedule. A single system walks the fleet in order, so
/// there is nothing to run in parallel within a tick.
pub fn dispatch_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(fleet_step_system);
    schedule
}

/// Returns a configuration error naming the first resource the schedule needs
/// but the world lacks.
pub fn ensure_dispatch_resources(world: &World) -> DispatchResult<()> {
    let missing = [
        ("TickClock", world.contains_resource::<TickClock>()),
        ("DispatchParams", world.contains_resource::<DispatchParams>()),
        ("SpatialIndex", world.contains_resource::<SpatialIndex>()),
        ("FleetOrder", world.contains_resource::<FleetOrder>()),
        ("DispatchTelemetry", world.contains_resource::<DispatchTelemetry>()),
        ("MovementModelResource", world.contains_resource::<MovementModelResource>()),
        ("ScoringFunctionResource", world.contains_resource::<ScoringFunctionResource>()),
    ]
    .into_iter()
    .find(|(_, present)| !present);

    match missing {
        Some((name, _)) => Err(DispatchError::configuration(format!(
            "world is missing the {name} resource"
        ))),
        None => Ok(()),
    }
}

/// Runs one tick. Returns `false` once `ticks_to_run` ticks have run.
pub fn run_next_tick(world: &mut World, schedule: &mut Schedule) -> bool {
    let ticks_to_run = world
        .get_resource::<DispatchParams>()
        .map(|params| params.ticks_to_run)
        .unwrap_or(0);
    let Some(mut clock) = world.get_resource_mut::<TickClock>() else {
        return false;
    };
    if clock.now() >= ticks_to_run {
        return false;
    }
    clock.advance();

    schedule.run(world);
    true
}

/// Runs every remaining tick and returns the number of ticks completed.
///
/// `cancel` is checked before each tick; once set, the run stops with
/// [`DispatchError::Cancelled`]. A run that is never cancelled is unaffected.
pub fn run_all_ticks(
    world: &mut World,
    schedule: &mut Schedule,
    cancel: Option<&AtomicBool>,
) -> DispatchResult<Tick> {
    ensure_dispatch_resources(world)?;

    loop {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            return Err(DispatchError::Cancelled {
                completed_ticks: world.resource::<TickClock>().elapsed(),
            });
        }
        if !run_next_tick(world, schedule) {
            break;
        }
    }
    Ok(world.resource::<TickClock>().elapsed())
}
