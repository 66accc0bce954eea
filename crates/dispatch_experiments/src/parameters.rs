//! Parameter variation over a base scenario configuration.
//!
//! A [`ParameterSpace`] lists candidate values per dimension. Dimensions left
//! empty keep the base configuration's value. [`ParameterSpace::generate`]
//! yields the full cartesian product; [`ParameterSpace::sample_random`] draws
//! a seeded subset of it.

use dispatch_core::scenario::ScenarioConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// One point of a parameter space, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    pub run_id: usize,
    pub config: ScenarioConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterSpace {
    base: ScenarioConfig,
    distance_weights: Vec<f64>,
    minimum_scores: Vec<f64>,
    time_radii: Vec<f64>,
    destination_saturations: Vec<f64>,
    fleet_sizes: Vec<usize>,
    request_counts: Vec<usize>,
    seeds: Vec<u64>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grid search over the listed values.
    pub fn grid() -> Self {
        Self::new()
    }

    pub fn with_base(mut self, base: ScenarioConfig) -> Self {
        self.base = base;
        self
    }

    pub fn distance_weight(mut self, weights: Vec<f64>) -> Self {
        self.distance_weights = weights;
        self
    }

    pub fn minimum_score(mut self, scores: Vec<f64>) -> Self {
        self.minimum_scores = scores;
        self
    }

    pub fn time_radius(mut self, radii: Vec<f64>) -> Self {
        self.time_radii = radii;
        self
    }

    pub fn destination_saturation(mut self, saturations: Vec<f64>) -> Self {
        self.destination_saturations = saturations;
        self
    }

    pub fn fleet_size(mut self, sizes: Vec<usize>) -> Self {
        self.fleet_sizes = sizes;
        self
    }

    pub fn request_count(mut self, counts: Vec<usize>) -> Self {
        self.request_counts = counts;
        self
    }

    pub fn seed(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Every combination, in dimension order with the last dimension varying
    /// fastest. Each configuration is named `<base name>-<run id>`.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let mut configs = vec![self.base.clone()];
        configs = expand(configs, &self.distance_weights, |c, v| {
            c.params.distance_weight = v
        });
        configs = expand(configs, &self.minimum_scores, |c, v| c.params.minimum_score = v);
        configs = expand(configs, &self.time_radii, |c, v| c.params.time_radius = v);
        configs = expand(configs, &self.destination_saturations, |c, v| {
            c.params.destination_saturation = v
        });
        configs = expand(configs, &self.fleet_sizes, |c, v| c.fleet_size = Some(v));
        configs = expand(configs, &self.request_counts, |c, v| c.request_count = Some(v));
        configs = expand(configs, &self.seeds, |c, v| c.seed = Some(v));

        configs
            .into_iter()
            .enumerate()
            .map(|(run_id, mut config)| {
                config.name = format!("{}-{}", self.base.name, run_id);
                ParameterSet { run_id, config }
            })
            .collect()
    }

    /// `count` distinct combinations drawn with a seeded RNG, in grid order.
    /// Returns the whole grid when it has at most `count` points.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        let all = self.generate();
        if all.len() <= count {
            return all;
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let mut picked: Vec<ParameterSet> = all.choose_multiple(&mut rng, count).cloned().collect();
        picked.sort_by_key(|set| set.run_id);
        picked
    }
}

fn expand<T: Copy>(
    configs: Vec<ScenarioConfig>,
    values: &[T],
    apply: impl Fn(&mut ScenarioConfig, T),
) -> Vec<ScenarioConfig> {
    if values.is_empty() {
        return configs;
    }
    let apply = &apply;
    configs
        .into_iter()
        .flat_map(|config| {
            values.iter().map(move |&value| {
                let mut next = config.clone();
                apply(&mut next, value);
                next
            })
        })
        .collect()
}

impl ParameterSet {
    pub fn into_config(self) -> ScenarioConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_search_single_parameter() {
        let sets = ParameterSpace::grid().minimum_score(vec![0.0, 5.0, 10.0]).generate();
        assert_eq!(sets.len(), 3);
        let scores: Vec<f64> = sets.iter().map(|s| s.config.params.minimum_score).collect();
        assert_eq!(scores, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_grid_search_multiple_parameters() {
        let sets = ParameterSpace::grid()
            .fleet_size(vec![5, 10])
            .request_count(vec![20, 40, 60])
            .seed(vec![1, 2])
            .generate();
        assert_eq!(sets.len(), 12);

        // Last dimension varies fastest.
        assert_eq!(sets[0].config.fleet_size, Some(5));
        assert_eq!(sets[0].config.seed, Some(1));
        assert_eq!(sets[1].config.seed, Some(2));
        assert_eq!(sets[11].config.fleet_size, Some(10));
        assert_eq!(sets[11].config.request_count, Some(60));

        for (i, set) in sets.iter().enumerate() {
            assert_eq!(set.run_id, i);
            assert_eq!(set.config.name, format!("scenario-{i}"));
        }
    }

    #[test]
    fn empty_space_yields_the_base_configuration() {
        let base = ScenarioConfig {
            name: "base".to_string(),
            fleet_size: Some(3),
            ..ScenarioConfig::default()
        };
        let sets = ParameterSpace::grid().with_base(base.clone()).generate();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].config.fleet_size, base.fleet_size);
        assert_eq!(sets[0].config.name, "base-0");
    }

    #[test]
    fn test_random_sampling() {
        let space = ParameterSpace::grid()
            .distance_weight(vec![10.0, 20.0, 30.0])
            .time_radius(vec![3.0, 5.0, 8.0]);
        let sample = space.sample_random(4, 42);
        assert_eq!(sample.len(), 4);
        assert!(sample.windows(2).all(|w| w[0].run_id < w[1].run_id));
        assert_eq!(sample, space.sample_random(4, 42));

        assert_eq!(space.sample_random(100, 1).len(), 9);
    }
}
