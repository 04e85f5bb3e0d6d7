use super::{ScalarObjective, ScalarOptimizer};
use crate::core::data::value::Value;
use crate::core::mco::parameter::McoParameter;
use crate::engine::error::EngineError;
use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::neldermead::NelderMead;
use std::cell::RefCell;
use tracing::debug;

const NAME: &str = "simplex";
const SD_TOLERANCE: f64 = 1e-8;
const INITIAL_STEP: f64 = 0.05;
const ZERO_WIDTH_STEP: f64 = 0.00025;

/// Nelder-Mead minimization of the continuous parameters. Points outside the bounds
/// are projected onto them before evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplexOptimizer {
    max_iterations: u64,
}

impl SimplexOptimizer {
    pub fn new(max_iterations: u64) -> Self {
        Self { max_iterations }
    }
}

enum Coordinate {
    Constant(Value),
    Scalar(usize),
    Vector { start: usize, len: usize },
}

/// Flattens the free parameters into one bounded coordinate vector.
struct Layout {
    coordinates: Vec<Coordinate>,
    initial: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

impl Layout {
    fn new(parameters: &[McoParameter]) -> Result<Self, EngineError> {
        let mut layout = Layout {
            coordinates: Vec::with_capacity(parameters.len()),
            initial: Vec::new(),
            lower: Vec::new(),
            upper: Vec::new(),
        };
        for parameter in parameters {
            let coordinate = match parameter {
                McoParameter::Fixed(p) => Coordinate::Constant(p.value.clone()),
                McoParameter::Ranged(p) => {
                    layout.initial.push(p.initial_value);
                    layout.lower.push(p.lower_bound);
                    layout.upper.push(p.upper_bound);
                    Coordinate::Scalar(layout.initial.len() - 1)
                }
                McoParameter::RangedVector(p) => {
                    let lengths = [p.initial_value.len(), p.lower_bound.len(), p.upper_bound.len()];
                    if lengths.iter().any(|&len| len != p.dimension) {
                        return Err(EngineError::InvalidParameter {
                            name: p.name.clone(),
                            reason: format!(
                                "dimension {} does not match initial/lower/upper lengths {:?}",
                                p.dimension, lengths
                            ),
                        });
                    }
                    let start = layout.initial.len();
                    layout.initial.extend(&p.initial_value);
                    layout.lower.extend(&p.lower_bound);
                    layout.upper.extend(&p.upper_bound);
                    Coordinate::Vector {
                        start,
                        len: p.dimension,
                    }
                }
                McoParameter::Listed(_) | McoParameter::Categorical(_) => {
                    return Err(EngineError::UnsupportedParameter {
                        name: parameter.name().to_string(),
                        kind: parameter.kind(),
                        optimizer: NAME,
                    });
                }
            };
            layout.coordinates.push(coordinate);
        }
        Ok(layout)
    }

    fn dimension(&self) -> usize {
        self.initial.len()
    }

    fn project(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.lower.iter().zip(&self.upper))
            .map(|(&v, (&lo, &hi))| v.max(lo).min(hi))
            .collect()
    }

    fn decode(&self, x: &[f64]) -> Vec<Value> {
        self.coordinates
            .iter()
            .map(|c| match c {
                Coordinate::Constant(v) => v.clone(),
                Coordinate::Scalar(i) => Value::Float(x[*i]),
                Coordinate::Vector { start, len } => Value::Vector(x[*start..start + len].to_vec()),
            })
            .collect()
    }

    /// The starting simplex: the initial point plus one vertex stepped along each axis,
    /// stepping backwards where the upper bound would be crossed.
    fn initial_simplex(&self) -> Vec<Vec<f64>> {
        let origin = self.project(&self.initial);
        let mut vertices = vec![origin.clone()];
        for i in 0..self.dimension() {
            let width = self.upper[i] - self.lower[i];
            let step = if width > 0.0 {
                INITIAL_STEP * width
            } else {
                ZERO_WIDTH_STEP
            };
            let mut vertex = origin.clone();
            vertex[i] = if origin[i] + step <= self.upper[i] {
                origin[i] + step
            } else {
                origin[i] - step
            };
            vertices.push(vertex);
        }
        vertices
    }
}

/// Adapts the objective to argmin. The solver unwraps costs on its initial simplex, so
/// the first objective error is held here and every later vertex costs infinity.
struct BoundedObjective<'a, 'o> {
    layout: &'a Layout,
    objective: RefCell<&'a mut ScalarObjective<'o>>,
    failure: RefCell<Option<EngineError>>,
}

impl BoundedObjective<'_, '_> {
    fn take_failure(&self) -> Option<EngineError> {
        self.failure.borrow_mut().take()
    }
}

impl CostFunction for &BoundedObjective<'_, '_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, x: &Self::Param) -> Result<Self::Output, ArgminError> {
        if self.failure.borrow().is_some() {
            return Ok(f64::INFINITY);
        }
        let point = self.layout.decode(&self.layout.project(x));
        let mut objective = self.objective.borrow_mut();
        match (&mut **objective)(&point) {
            Ok(cost) => Ok(cost),
            Err(e) => {
                debug!(error = %e, "Objective failed, abandoning the search.");
                *self.failure.borrow_mut() = Some(e);
                Ok(f64::INFINITY)
            }
        }
    }
}

fn into_engine_error(error: ArgminError) -> EngineError {
    match error.downcast::<EngineError>() {
        Ok(engine_error) => engine_error,
        Err(other) => EngineError::Backend(other.to_string()),
    }
}

impl ScalarOptimizer for SimplexOptimizer {
    fn optimize_function(
        &self,
        objective: &mut ScalarObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Value>, EngineError> {
        let layout = Layout::new(parameters)?;
        if layout.dimension() == 0 {
            debug!("No free coordinates, returning the fixed point.");
            return Ok(layout.decode(&[]));
        }

        let solver = NelderMead::new(layout.initial_simplex())
            .with_sd_tolerance(SD_TOLERANCE)
            .map_err(into_engine_error)?;
        let problem = BoundedObjective {
            layout: &layout,
            objective: RefCell::new(objective),
            failure: RefCell::new(None),
        };
        let outcome = Executor::new(&problem, solver)
            .configure(|state| state.max_iters(self.max_iterations))
            .run();
        if let Some(failure) = problem.take_failure() {
            return Err(failure);
        }
        let result = outcome.map_err(into_engine_error)?;

        let state = result.state();
        debug!(
            iterations = state.get_iter(),
            best_cost = state.get_best_cost(),
            "Nelder-Mead finished."
        );
        let best = state
            .get_best_param()
            .ok_or_else(|| EngineError::Backend("Nelder-Mead produced no best point".into()))?;
        Ok(layout.decode(&layout.project(best)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mco::parameter::RangedVectorParameter;

    fn optimize(
        objective: &mut ScalarObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Value>, EngineError> {
        SimplexOptimizer::new(500).optimize_function(objective, parameters)
    }

    #[test]
    fn converges_to_interior_minimum() {
        let parameters = vec![
            McoParameter::ranged("x", "X", 0.0, -5.0, 5.0),
            McoParameter::ranged("y", "Y", 0.0, -5.0, 5.0),
        ];
        let mut objective = |p: &[Value]| -> Result<f64, EngineError> {
            let x = p[0].as_f64().unwrap_or_default();
            let y = p[1].as_f64().unwrap_or_default();
            Ok((x - 1.0).powi(2) + (y + 2.0).powi(2))
        };

        let best = optimize(&mut objective, &parameters).unwrap();

        assert!((best[0].as_f64().unwrap() - 1.0).abs() < 1e-3);
        assert!((best[1].as_f64().unwrap() + 2.0).abs() < 1e-3);
    }

    #[test]
    fn minimum_outside_bounds_is_projected_onto_the_bound() {
        let parameters = vec![McoParameter::ranged("x", "X", 0.5, 0.0, 1.0)];
        let mut objective =
            |p: &[Value]| -> Result<f64, EngineError> { Ok((p[0].as_f64().unwrap_or_default() - 3.0).powi(2)) };

        let best = optimize(&mut objective, &parameters).unwrap();

        assert!((best[0].as_f64().unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn fixed_and_vector_parameters_are_decoded_in_place() {
        let parameters = vec![
            McoParameter::fixed("t", "T", Value::Int(300)),
            McoParameter::RangedVector(RangedVectorParameter {
                name: "v".into(),
                data_type: "V".into(),
                dimension: 2,
                initial_value: vec![0.0, 0.0],
                lower_bound: vec![-1.0, -1.0],
                upper_bound: vec![1.0, 1.0],
                n_samples: 5,
            }),
        ];
        let mut objective = |p: &[Value]| -> Result<f64, EngineError> {
            assert_eq!(p[0], Value::Int(300));
            let v = p[1].as_vector().unwrap_or(&[]);
            Ok((v[0] - 0.5).powi(2) + (v[1] + 0.25).powi(2))
        };

        let best = optimize(&mut objective, &parameters).unwrap();

        assert_eq!(best[0], Value::Int(300));
        let v = best[1].as_vector().unwrap();
        assert!((v[0] - 0.5).abs() < 1e-3 && (v[1] + 0.25).abs() < 1e-3);
    }

    #[test]
    fn discrete_parameters_are_unsupported() {
        let parameters = vec![McoParameter::listed("n", "N", vec![1.0, 2.0])];
        let mut objective = |_: &[Value]| -> Result<f64, EngineError> { Ok(0.0) };
        assert!(matches!(
            optimize(&mut objective, &parameters),
            Err(EngineError::UnsupportedParameter { kind: "listed", optimizer: "simplex", .. })
        ));
    }

    #[test]
    fn objective_errors_are_propagated_unchanged() {
        let parameters = vec![McoParameter::ranged("x", "X", 0.0, -1.0, 1.0)];
        let mut objective = |_: &[Value]| -> Result<f64, EngineError> { Err(EngineError::Cancelled) };
        assert!(matches!(
            optimize(&mut objective, &parameters),
            Err(EngineError::Cancelled)
        ));
    }

    #[test]
    fn failure_mid_search_stops_calling_the_objective() {
        let parameters = vec![McoParameter::ranged("x", "X", 0.0, -1.0, 1.0)];
        let mut calls = 0;
        let mut objective = |p: &[Value]| -> Result<f64, EngineError> {
            calls += 1;
            if calls > 4 {
                return Err(EngineError::MissingKpi { name: "cost".into() });
            }
            Ok(p[0].as_f64().unwrap_or_default().powi(2))
        };

        let result = optimize(&mut objective, &parameters);

        assert!(matches!(result, Err(EngineError::MissingKpi { name }) if name == "cost"));
        assert_eq!(calls, 5);
    }

    #[test]
    fn vector_bounds_must_match_the_dimension() {
        let parameters = vec![McoParameter::RangedVector(RangedVectorParameter {
            name: "v".into(),
            data_type: "V".into(),
            dimension: 2,
            initial_value: vec![0.0, 0.0],
            lower_bound: vec![-1.0],
            upper_bound: vec![1.0],
            n_samples: 5,
        })];
        let mut objective = |_: &[Value]| -> Result<f64, EngineError> { Ok(0.0) };
        assert!(matches!(
            optimize(&mut objective, &parameters),
            Err(EngineError::InvalidParameter { name, .. }) if name == "v"
        ));
    }

    #[test]
    fn all_fixed_parameters_skip_the_search() {
        let parameters = vec![McoParameter::fixed("t", "T", Value::Float(1.0))];
        let mut objective = |_: &[Value]| -> Result<f64, EngineError> {
            Err(EngineError::Internal("should not be called".into()))
        };
        assert_eq!(
            optimize(&mut objective, &parameters).unwrap(),
            vec![Value::Float(1.0)]
        );
    }
}
