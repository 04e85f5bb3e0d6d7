use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpaceSearchMode {
    #[default]
    Uniform,
    Dirichlet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// Bounded Nelder-Mead, continuous parameters only.
    Simplex,
    /// Seeded random draws over mixed parameter spaces.
    RandomSearch,
    /// Exhaustive product of every parameter's sample values.
    Grid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub num_points: usize,
    pub space_search_mode: SpaceSearchMode,
    pub include_zero_weights: bool,
    pub dirichlet_alpha: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub optimizer: OptimizerKind,
    pub max_iterations: u64,
    pub budget: usize,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedConfig {
    pub sampling: SamplingConfig,
    pub backend: BackendConfig,
    pub verbose_run: bool,
}

#[derive(Default)]
pub struct WeightedConfigBuilder {
    num_points: Option<usize>,
    space_search_mode: Option<SpaceSearchMode>,
    include_zero_weights: Option<bool>,
    dirichlet_alpha: Option<f64>,
    optimizer: Option<OptimizerKind>,
    max_iterations: Option<u64>,
    budget: Option<usize>,
    seed: Option<u64>,
    verbose_run: Option<bool>,
}

impl WeightedConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_points(mut self, n: usize) -> Self {
        self.num_points = Some(n);
        self
    }
    pub fn space_search_mode(mut self, mode: SpaceSearchMode) -> Self {
        self.space_search_mode = Some(mode);
        self
    }
    pub fn include_zero_weights(mut self, include: bool) -> Self {
        self.include_zero_weights = Some(include);
        self
    }
    pub fn dirichlet_alpha(mut self, alpha: f64) -> Self {
        self.dirichlet_alpha = Some(alpha);
        self
    }
    pub fn optimizer(mut self, kind: OptimizerKind) -> Self {
        self.optimizer = Some(kind);
        self
    }
    pub fn max_iterations(mut self, iterations: u64) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
    pub fn verbose_run(mut self, verbose: bool) -> Self {
        self.verbose_run = Some(verbose);
        self
    }

    pub fn build(self) -> Result<WeightedConfig, ConfigError> {
        let sampling = SamplingConfig {
            num_points: self
                .num_points
                .ok_or(ConfigError::MissingParameter("num_points"))?,
            space_search_mode: self
                .space_search_mode
                .ok_or(ConfigError::MissingParameter("space_search_mode"))?,
            include_zero_weights: self
                .include_zero_weights
                .ok_or(ConfigError::MissingParameter("include_zero_weights"))?,
            dirichlet_alpha: self
                .dirichlet_alpha
                .ok_or(ConfigError::MissingParameter("dirichlet_alpha"))?,
        };
        let backend = BackendConfig {
            optimizer: self
                .optimizer
                .ok_or(ConfigError::MissingParameter("optimizer"))?,
            max_iterations: self
                .max_iterations
                .ok_or(ConfigError::MissingParameter("max_iterations"))?,
            budget: self.budget.ok_or(ConfigError::MissingParameter("budget"))?,
            seed: self.seed,
        };

        if sampling.num_points == 0 {
            return Err(ConfigError::InvalidValue {
                name: "num_points",
                reason: "must be at least 1".to_string(),
            });
        }
        if sampling.dirichlet_alpha.is_nan() || sampling.dirichlet_alpha <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "dirichlet_alpha",
                reason: format!("must be positive, got {}", sampling.dirichlet_alpha),
            });
        }
        validate_backend(&backend)?;

        Ok(WeightedConfig {
            sampling,
            backend,
            verbose_run: self
                .verbose_run
                .ok_or(ConfigError::MissingParameter("verbose_run"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AposterioriConfig {
    pub backend: BackendConfig,
}

#[derive(Default)]
pub struct AposterioriConfigBuilder {
    optimizer: Option<OptimizerKind>,
    budget: Option<usize>,
    seed: Option<u64>,
}

impl AposterioriConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optimizer(mut self, kind: OptimizerKind) -> Self {
        self.optimizer = Some(kind);
        self
    }
    pub fn budget(mut self, budget: usize) -> Self {
        self.budget = Some(budget);
        self
    }
    pub fn seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> Result<AposterioriConfig, ConfigError> {
        let backend = BackendConfig {
            optimizer: self
                .optimizer
                .ok_or(ConfigError::MissingParameter("optimizer"))?,
            max_iterations: 0,
            budget: self.budget.ok_or(ConfigError::MissingParameter("budget"))?,
            seed: self.seed,
        };
        if backend.optimizer == OptimizerKind::Simplex {
            return Err(ConfigError::InvalidValue {
                name: "optimizer",
                reason: "the simplex optimizer cannot produce a Pareto set".to_string(),
            });
        }
        validate_backend(&backend)?;
        Ok(AposterioriConfig { backend })
    }
}

fn validate_backend(backend: &BackendConfig) -> Result<(), ConfigError> {
    if backend.optimizer == OptimizerKind::RandomSearch && backend.budget == 0 {
        return Err(ConfigError::InvalidValue {
            name: "budget",
            reason: "random search needs at least one evaluation".to_string(),
        });
    }
    if backend.optimizer == OptimizerKind::Simplex && backend.max_iterations == 0 {
        return Err(ConfigError::InvalidValue {
            name: "max_iterations",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_weighted() -> WeightedConfigBuilder {
        WeightedConfigBuilder::new()
            .num_points(7)
            .space_search_mode(SpaceSearchMode::Uniform)
            .include_zero_weights(false)
            .dirichlet_alpha(1.0)
            .optimizer(OptimizerKind::Simplex)
            .max_iterations(200)
            .budget(100)
            .verbose_run(false)
    }

    #[test]
    fn weighted_builder_builds_complete_configuration() {
        let config = complete_weighted().seed(Some(3)).build().unwrap();
        assert_eq!(config.sampling.num_points, 7);
        assert_eq!(config.backend.optimizer, OptimizerKind::Simplex);
        assert_eq!(config.backend.seed, Some(3));
        assert!(!config.verbose_run);
    }

    #[test]
    fn weighted_builder_reports_first_missing_parameter() {
        let result = WeightedConfigBuilder::new().num_points(3).build();
        assert_eq!(
            result,
            Err(ConfigError::MissingParameter("space_search_mode"))
        );
    }

    #[test]
    fn weighted_builder_rejects_invalid_values() {
        assert!(matches!(
            complete_weighted().num_points(0).build(),
            Err(ConfigError::InvalidValue { name: "num_points", .. })
        ));
        assert!(matches!(
            complete_weighted().dirichlet_alpha(-1.0).build(),
            Err(ConfigError::InvalidValue { name: "dirichlet_alpha", .. })
        ));
        assert!(matches!(
            complete_weighted().max_iterations(0).build(),
            Err(ConfigError::InvalidValue { name: "max_iterations", .. })
        ));
    }

    #[test]
    fn aposteriori_builder_rejects_simplex() {
        let result = AposterioriConfigBuilder::new()
            .optimizer(OptimizerKind::Simplex)
            .budget(10)
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { name: "optimizer", .. })
        ));
    }

    #[test]
    fn aposteriori_builder_requires_budget() {
        let result = AposterioriConfigBuilder::new()
            .optimizer(OptimizerKind::Grid)
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("budget")));
    }
}
