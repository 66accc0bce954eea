use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use dispatch_core::error::DispatchResult;
use dispatch_core::runner::{dispatch_schedule, run_all_ticks, run_next_tick};

/// Helper that owns a reusable `Schedule` so tests can step tick by tick or
/// run the whole scenario.
pub struct TickRunner {
    schedule: Schedule,
}

impl Default for TickRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TickRunner {
    pub fn new() -> Self {
        Self {
            schedule: dispatch_schedule(),
        }
    }

    /// Run a single tick (returns `false` once every tick has run).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_tick(world, &mut self.schedule)
    }

    /// Run up to `ticks` ticks, returning how many actually ran.
    pub fn run_ticks(&mut self, world: &mut World, ticks: u64) -> u64 {
        let mut ran = 0;
        while ran < ticks && self.run_one(world) {
            ran += 1;
        }
        ran
    }

    pub fn run_full(&mut self, world: &mut World) -> DispatchResult<u64> {
        run_all_ticks(world, &mut self.schedule, None)
    }
}
