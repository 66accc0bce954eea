pub mod scoring;
pub mod search;

use bevy_ecs::prelude::Resource;

pub use scoring::{HeuristicScoring, ScoringFunction};
pub use search::{assign_request, find_best_request, probe_cells, MatchCandidate};

/// Resource wrapper for the scoring function trait object.
#[derive(Resource)]
pub struct ScoringFunctionResource(pub Box<dyn ScoringFunction>);

impl ScoringFunctionResource {
    pub fn new(scoring: Box<dyn ScoringFunction>) -> Self {
        Self(scoring)
    }
}

impl Default for ScoringFunctionResource {
    fn default() -> Self {
        Self(Box::new(HeuristicScoring))
    }
}

impl std::ops::Deref for ScoringFunctionResource {
    type Target = dyn ScoringFunction;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}
