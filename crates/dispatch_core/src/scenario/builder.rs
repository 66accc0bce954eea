use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::DispatchResult;
use crate::geo::Coordinate;
use crate::matching::{HeuristicScoring, ScoringFunction};
use crate::movement::{MovementModel, StraightLineMovement};
use crate::spatial::GridBounds;

use super::{validate_settings, DispatchParams, RequestSpec, Scenario, DEFAULT_SECTION_RADIUS};

/// Explicit context for populating one scenario.
///
/// Listed vehicles and requests are kept in the order given. If a fleet size or
/// request count larger than the listed entities is set, `build` tops the lists
/// up with uniformly random entities inside the normalized bounds.
pub struct ScenarioBuilder {
    name: String,
    bounds: GridBounds,
    section_radius: f64,
    params: DispatchParams,
    vehicles: Vec<Coordinate>,
    requests: Vec<RequestSpec>,
    fleet_size: Option<usize>,
    request_count: Option<usize>,
    seed: Option<u64>,
    movement: Option<Box<dyn MovementModel>>,
    scoring: Option<Box<dyn ScoringFunction>>,
}

impl ScenarioBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: GridBounds::default(),
            section_radius: DEFAULT_SECTION_RADIUS,
            params: DispatchParams::default(),
            vehicles: Vec::new(),
            requests: Vec::new(),
            fleet_size: None,
            request_count: None,
            seed: None,
            movement: None,
            scoring: None,
        }
    }

    pub fn with_bounds(mut self, bounds: GridBounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_section_radius(mut self, section_radius: f64) -> Self {
        self.section_radius = section_radius;
        self
    }

    pub fn with_params(mut self, params: DispatchParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_vehicle(mut self, location: Coordinate) -> Self {
        self.vehicles.push(location);
        self
    }

    pub fn with_vehicles(mut self, locations: impl IntoIterator<Item = Coordinate>) -> Self {
        self.vehicles.extend(locations);
        self
    }

    pub fn with_request(mut self, request: RequestSpec) -> Self {
        self.requests.push(request);
        self
    }

    pub fn with_requests(mut self, requests: impl IntoIterator<Item = RequestSpec>) -> Self {
        self.requests.extend(requests);
        self
    }

    /// Target fleet size; missing vehicles are placed at random.
    pub fn with_fleet_size(mut self, fleet_size: usize) -> Self {
        self.fleet_size = Some(fleet_size);
        self
    }

    /// Target request count; missing requests are generated at random.
    pub fn with_request_count(mut self, request_count: usize) -> Self {
        self.request_count = Some(request_count);
        self
    }

    /// Seed for the random top-up. Without one the top-up is not reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_movement(mut self, movement: impl MovementModel + 'static) -> Self {
        self.movement = Some(Box::new(movement));
        self
    }

    pub fn with_scoring(mut self, scoring: impl ScoringFunction + 'static) -> Self {
        self.scoring = Some(Box::new(scoring));
        self
    }

    fn random_location<R: Rng>(rng: &mut R, bounds: &GridBounds) -> Coordinate {
        Coordinate::new(
            rng.gen_range(bounds.lat_min..=bounds.lat_max),
            rng.gen_range(bounds.long_min..=bounds.long_max),
        )
    }

    /// Validate and produce the scenario. Configuration problems are reported
    /// here, before any world exists.
    pub fn build(self) -> DispatchResult<Scenario> {
        validate_settings(&self.name, self.section_radius, &self.bounds, &self.params)?;

        let mut vehicles = self.vehicles;
        let mut requests = self.requests;
        let missing_vehicles = self
            .fleet_size
            .map_or(0, |target| target.saturating_sub(vehicles.len()));
        let missing_requests = self
            .request_count
            .map_or(0, |target| target.saturating_sub(requests.len()));

        if missing_vehicles > 0 || missing_requests > 0 {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let area = self.bounds.normalized(self.section_radius);
            let last_tick = self.params.ticks_to_run;

            for _ in 0..missing_requests {
                let location = Self::random_location(&mut rng, &area);
                let destination = Self::random_location(&mut rng, &area);
                let request_time = rng.gen_range(0..=last_tick);
                requests.push(RequestSpec::new(location, destination, request_time));
            }
            for _ in 0..missing_vehicles {
                vehicles.push(Self::random_location(&mut rng, &area));
            }
        }

        let scenario = Scenario {
            name: self.name,
            bounds: self.bounds,
            section_radius: self.section_radius,
            params: self.params,
            vehicles,
            requests,
            movement: self
                .movement
                .unwrap_or_else(|| Box::new(StraightLineMovement::default())),
            scoring: self.scoring.unwrap_or_else(|| Box::new(HeuristicScoring)),
        };
        scenario.validate_entities()?;
        Ok(scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listed_entities_are_kept_in_order() {
        let scenario = ScenarioBuilder::new("listed")
            .with_vehicles([Coordinate::new(1.0, 1.0), Coordinate::new(2.0, 2.0)])
            .with_request(RequestSpec::new(
                Coordinate::new(3.0, 3.0),
                Coordinate::new(4.0, 4.0),
                2,
            ))
            .build()
            .expect("scenario");
        assert_eq!(scenario.vehicles[1], Coordinate::new(2.0, 2.0));
        assert_eq!(scenario.requests.len(), 1);
    }

    #[test]
    fn top_up_is_seeded_and_stays_in_bounds() {
        let build = || {
            ScenarioBuilder::new("random")
                .with_vehicle(Coordinate::new(0.0, 0.0))
                .with_fleet_size(5)
                .with_request_count(40)
                .with_seed(7)
                .build()
                .expect("scenario")
        };
        let first = build();
        let second = build();

        assert_eq!(first.vehicles.len(), 5);
        assert_eq!(first.requests.len(), 40);
        assert_eq!(first.vehicles, second.vehicles);
        assert_eq!(first.requests, second.requests);
        assert_eq!(first.vehicles[0], Coordinate::new(0.0, 0.0));

        let area = GridBounds::default();
        let last_tick = DispatchParams::default().ticks_to_run;
        for request in &first.requests {
            assert!(area.contains(request.location));
            assert!(area.contains(request.destination));
            assert!(request.request_time <= last_tick);
        }
    }

    #[test]
    fn smaller_targets_never_remove_entities() {
        let scenario = ScenarioBuilder::new("shrink")
            .with_vehicles([Coordinate::new(1.0, 1.0), Coordinate::new(2.0, 2.0)])
            .with_fleet_size(1)
            .build()
            .expect("scenario");
        assert_eq!(scenario.vehicles.len(), 2);
    }

    #[test]
    fn invalid_parameters_fail_the_build() {
        let err = ScenarioBuilder::new("bad radius")
            .with_section_radius(0.0)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());

        let err = ScenarioBuilder::new("bad step")
            .with_params(DispatchParams::default().with_search_radii(5.0, -1.0, 15.0))
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn settings_are_checked_before_the_top_up() {
        let err = ScenarioBuilder::new("inverted")
            .with_bounds(GridBounds::new(20.0, 0.0, 0.0, 20.0))
            .with_request_count(10)
            .with_seed(1)
            .build()
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("inverted"));

        let err = ScenarioBuilder::new("listed nan")
            .with_vehicle(Coordinate::new(f64::NAN, 1.0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("vehicle 0"));
    }
}
