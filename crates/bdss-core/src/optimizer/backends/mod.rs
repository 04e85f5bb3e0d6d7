//! Adapters between MCO parameters and concrete optimization algorithms.
//!
//! Every backend minimizes. Objectives are fallible so that evaluator failures and
//! cancellation abort the search instead of being mistaken for poor scores.

pub mod grid;
pub mod random_search;
pub mod simplex;

use super::config::{BackendConfig, ConfigError, OptimizerKind};
use crate::core::data::value::Value;
use crate::core::mco::parameter::McoParameter;
use crate::engine::error::EngineError;

pub use grid::GridSearchOptimizer;
pub use random_search::RandomSearchOptimizer;
pub use simplex::SimplexOptimizer;

pub type ScalarObjective<'a> = dyn FnMut(&[Value]) -> Result<f64, EngineError> + 'a;
pub type VectorObjective<'a> = dyn FnMut(&[Value]) -> Result<Vec<f64>, EngineError> + 'a;

/// Single-objective backends: return the best point found.
pub trait ScalarOptimizer {
    fn optimize_function(
        &self,
        objective: &mut ScalarObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Value>, EngineError>;
}

/// Multi-objective backends: return the Pareto-optimal points found.
pub trait MultiObjectiveOptimizer {
    fn optimize_function(
        &self,
        objective: &mut VectorObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Vec<Value>>, EngineError>;
}

pub fn scalar_optimizer(config: &BackendConfig) -> Box<dyn ScalarOptimizer> {
    match config.optimizer {
        OptimizerKind::Simplex => Box::new(SimplexOptimizer::new(config.max_iterations)),
        OptimizerKind::RandomSearch => {
            Box::new(RandomSearchOptimizer::new(config.budget).with_seed(config.seed))
        }
        OptimizerKind::Grid => Box::new(GridSearchOptimizer),
    }
}

pub fn multi_objective_optimizer(
    config: &BackendConfig,
) -> Result<Box<dyn MultiObjectiveOptimizer>, EngineError> {
    match config.optimizer {
        OptimizerKind::Simplex => Err(ConfigError::InvalidValue {
            name: "optimizer",
            reason: "the simplex optimizer cannot produce a Pareto set".to_string(),
        }
        .into()),
        OptimizerKind::RandomSearch => Ok(Box::new(
            RandomSearchOptimizer::new(config.budget).with_seed(config.seed),
        )),
        OptimizerKind::Grid => Ok(Box::new(GridSearchOptimizer)),
    }
}
