use super::{MultiObjectiveOptimizer, ScalarObjective, ScalarOptimizer, VectorObjective};
use crate::core::data::value::Value;
use crate::core::mco::parameter::McoParameter;
use crate::engine::error::EngineError;
use crate::optimizer::pareto::pareto_front;
use itertools::Itertools;
use tracing::debug;

/// Evaluates every combination of the parameters' sample values.
#[derive(Debug, Clone, Copy, Default)]
pub struct GridSearchOptimizer;

impl GridSearchOptimizer {
    fn grid(parameters: &[McoParameter]) -> Vec<Vec<Value>> {
        if parameters.is_empty() {
            return vec![Vec::new()];
        }
        let grid: Vec<Vec<Value>> = parameters
            .iter()
            .map(McoParameter::sample_values)
            .multi_cartesian_product()
            .collect();
        debug!(points = grid.len(), "Grid built.");
        grid
    }
}

impl ScalarOptimizer for GridSearchOptimizer {
    fn optimize_function(
        &self,
        objective: &mut ScalarObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Value>, EngineError> {
        let mut best: Option<(f64, Vec<Value>)> = None;
        for point in Self::grid(parameters) {
            let score = objective(&point)?;
            if best.as_ref().is_none_or(|(b, _)| score < *b) {
                best = Some((score, point));
            }
        }
        best.map(|(_, point)| point)
            .ok_or_else(|| EngineError::Backend("grid search has no points to evaluate".into()))
    }
}

impl MultiObjectiveOptimizer for GridSearchOptimizer {
    fn optimize_function(
        &self,
        objective: &mut VectorObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Vec<Value>>, EngineError> {
        let points = Self::grid(parameters);
        let scores = points
            .iter()
            .map(|p| objective(p))
            .collect::<Result<Vec<_>, _>>()?;
        let mut points: Vec<Option<Vec<Value>>> = points.into_iter().map(Some).collect();
        Ok(pareto_front(&scores)
            .into_iter()
            .filter_map(|i| points[i].take())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_grid_finds_the_best_sample() {
        let parameters = vec![
            McoParameter::ranged("x", "X", 0.0, -1.0, 1.0),
            McoParameter::listed("n", "N", vec![1.0, 2.0, 3.0]),
        ];
        let mut calls = 0;
        let mut objective = |p: &[Value]| -> Result<f64, EngineError> {
            calls += 1;
            let x = p[0].as_f64().unwrap_or_default();
            let n = p[1].as_f64().unwrap_or_default();
            Ok((x - 0.5).powi(2) + (n - 2.0).powi(2))
        };

        let best =
            ScalarOptimizer::optimize_function(&GridSearchOptimizer, &mut objective, &parameters)
                .unwrap();

        assert_eq!(best, vec![Value::Float(0.5), Value::Float(2.0)]);
        assert_eq!(calls, 15);
    }

    #[test]
    fn categorical_parameters_are_enumerated() {
        let parameters = vec![McoParameter::categorical("s", "S", &["a", "b", "c"])];
        let mut objective = |p: &[Value]| -> Result<f64, EngineError> {
            Ok(if p[0].as_str() == Some("b") { 0.0 } else { 1.0 })
        };
        let best =
            ScalarOptimizer::optimize_function(&GridSearchOptimizer, &mut objective, &parameters)
                .unwrap();
        assert_eq!(best, vec![Value::Text("b".into())]);
    }

    #[test]
    fn multi_objective_grid_returns_the_front() {
        let parameters = vec![McoParameter::listed("x", "X", vec![0.0, 1.0, 2.0])];
        let mut objective = |p: &[Value]| -> Result<Vec<f64>, EngineError> {
            let x = p[0].as_f64().unwrap_or_default();
            Ok(vec![x, (x - 1.0).abs() + 2.0 - x])
        };

        let front = MultiObjectiveOptimizer::optimize_function(
            &GridSearchOptimizer,
            &mut objective,
            &parameters,
        )
        .unwrap();

        assert_eq!(front, vec![vec![Value::Float(0.0)], vec![Value::Float(1.0)]]);
    }

    #[test]
    fn objective_errors_abort_the_search() {
        let parameters = vec![McoParameter::listed("x", "X", vec![0.0, 1.0])];
        let mut objective = |_: &[Value]| -> Result<f64, EngineError> { Err(EngineError::Cancelled) };
        assert!(matches!(
            ScalarOptimizer::optimize_function(&GridSearchOptimizer, &mut objective, &parameters),
            Err(EngineError::Cancelled)
        ));
    }
}
