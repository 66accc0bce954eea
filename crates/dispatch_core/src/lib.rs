pub mod clock;
pub mod ecs;
pub mod error;
pub mod geo;
pub mod matching;
pub mod movement;
pub mod runner;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
