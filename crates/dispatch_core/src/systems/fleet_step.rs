//! Fleet step system: one tick for every vehicle, in fleet order.
//!
//! Per vehicle: movement, then the pickup/dropoff transition, then (if the
//! vehicle holds no assignment) the matching search. Vehicles are processed
//! one after another because scoring writes derived fields onto requests that
//! later vehicles read.

use bevy_ecs::prelude::{Query, Res, ResMut};
use tracing::{debug, trace, warn};

use crate::clock::TickClock;
use crate::ecs::{FleetOrder, Tick, Vehicle};
use crate::error::DispatchResult;
use crate::matching::{assign_request, find_best_request, ScoringFunction, ScoringFunctionResource};
use crate::movement::{MovementModel, MovementModelResource};
use crate::scenario::DispatchParams;
use crate::spatial::SpatialIndex;
use crate::telemetry::{DispatchTelemetry, MatchRecord};

use super::vehicle_state::{advance_vehicle, apply_transition, Transition};

/// Borrowed scenario state a single vehicle step works against.
pub struct StepContext<'a> {
    pub index: &'a mut SpatialIndex,
    pub telemetry: &'a mut DispatchTelemetry,
    pub movement: &'a dyn MovementModel,
    pub scoring: &'a dyn ScoringFunction,
    pub params: &'a DispatchParams,
    pub tick: Tick,
}

fn move_and_transition(vehicle: &mut Vehicle, ctx: &mut StepContext<'_>) -> DispatchResult<()> {
    advance_vehicle(vehicle, ctx.index, ctx.movement, ctx.tick)?;
    match apply_transition(vehicle, ctx.index, ctx.tick)? {
        Transition::Completed(request) => {
            ctx.telemetry.record_completion();
            debug!(tick = ctx.tick, vehicle = %vehicle.id, request = %request, "dropoff");
        }
        Transition::PickedUp(request) => {
            debug!(tick = ctx.tick, vehicle = %vehicle.id, request = %request, "pickup");
        }
        Transition::Holding(request) => {
            trace!(
                tick = ctx.tick,
                vehicle = %vehicle.id,
                request = %request,
                state = ?vehicle.state,
                "holding assignment"
            );
        }
        Transition::Idle => {}
    }
    Ok(())
}

/// Run one tick for one vehicle. Faults are contained here: the vehicle loses
/// its assignment and may still be matched in the same tick.
pub fn step_vehicle(vehicle: &mut Vehicle, ctx: &mut StepContext<'_>) {
    if let Err(err) = move_and_transition(vehicle, ctx) {
        warn!(tick = ctx.tick, vehicle = %vehicle.id, error = %err, "vehicle fault, dropping assignment");
        ctx.telemetry.record_fault();
        vehicle.drop_assignment();
    }

    if !vehicle.is_idle() {
        return;
    }

    let Some(candidate) =
        find_best_request(vehicle, ctx.index, ctx.scoring, ctx.params, ctx.tick)
    else {
        return;
    };
    if assign_request(vehicle, ctx.index, &candidate, ctx.tick) {
        debug!(
            tick = ctx.tick,
            vehicle = %vehicle.id,
            request = %candidate.request,
            score = candidate.score,
            radius = candidate.radius,
            "matched request"
        );
        ctx.telemetry.record_match(MatchRecord {
            tick: ctx.tick,
            vehicle: vehicle.id,
            request: candidate.request,
            score: candidate.score,
        });
    }
}

#[allow(clippy::too_many_arguments)]
pub fn fleet_step_system(
    clock: Res<TickClock>,
    params: Res<DispatchParams>,
    fleet: Res<FleetOrder>,
    movement: Res<MovementModelResource>,
    scoring: Res<ScoringFunctionResource>,
    mut index: ResMut<SpatialIndex>,
    mut telemetry: ResMut<DispatchTelemetry>,
    mut vehicles: Query<&mut Vehicle>,
) {
    let mut ctx = StepContext {
        index: &mut index,
        telemetry: &mut telemetry,
        movement: &**movement,
        scoring: &**scoring,
        params: &params,
        tick: clock.now(),
    };

    for &entity in fleet.iter() {
        let Ok(mut vehicle) = vehicles.get_mut(entity) else {
            continue;
        };
        step_vehicle(&mut vehicle, &mut ctx);
    }
}
