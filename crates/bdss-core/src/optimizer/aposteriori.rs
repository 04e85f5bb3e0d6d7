use super::backends::multi_objective_optimizer;
use super::base::{BaseEngine, OptimalPoint, OptimizationRun, OptimizerEngine};
use super::config::AposterioriConfig;
use crate::core::data::value::Value;
use crate::engine::error::EngineError;
use tracing::info;

/// Searches for the Pareto front directly with a multi-objective backend and reports
/// every non-dominated point found.
pub struct AposterioriOptimizerEngine<'a> {
    base: BaseEngine<'a>,
    config: AposterioriConfig,
}

impl<'a> AposterioriOptimizerEngine<'a> {
    pub fn new(base: BaseEngine<'a>, config: AposterioriConfig) -> Self {
        Self { base, config }
    }

    fn pareto_points(&self) -> Result<Vec<OptimalPoint>, EngineError> {
        let backend = multi_objective_optimizer(&self.config.backend)?;
        let mut objective = |point: &[Value]| -> Result<Vec<f64>, EngineError> {
            let scores = self.base.score(point)?;
            Ok(self.base.minimization_score(&scores))
        };
        let front = backend.optimize_function(&mut objective, self.base.parameters())?;
        info!(points = front.len(), "Pareto front found.");

        front
            .into_iter()
            .map(|point| {
                let kpis = self.base.score(&point)?;
                Ok(OptimalPoint::new(point, kpis))
            })
            .collect()
    }
}

impl OptimizerEngine for AposterioriOptimizerEngine<'_> {
    fn optimize(&self) -> OptimizationRun<'_> {
        let mut done = false;
        OptimizationRun::new(Box::new(move || {
            if done {
                return None;
            }
            done = true;
            Some(self.pareto_points())
        }))
    }
}
