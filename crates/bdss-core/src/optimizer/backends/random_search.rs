use super::{MultiObjectiveOptimizer, ScalarObjective, ScalarOptimizer, VectorObjective};
use crate::core::data::value::Value;
use crate::core::mco::parameter::McoParameter;
use crate::engine::error::EngineError;
use crate::optimizer::pareto::pareto_front;
use rand::prelude::*;
use rand::rngs::StdRng;
use tracing::debug;

/// Draws `budget` points at random over a mixed parameter space. The first point is
/// always the parameters' initial values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomSearchOptimizer {
    budget: usize,
    seed: Option<u64>,
}

impl RandomSearchOptimizer {
    pub fn new(budget: usize) -> Self {
        Self { budget, seed: None }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn candidates(&self, parameters: &[McoParameter]) -> Result<Vec<Vec<Value>>, EngineError> {
        if self.budget == 0 {
            return Err(EngineError::Backend(
                "random search needs a budget of at least one evaluation".into(),
            ));
        }
        let mut rng = self.rng();
        let initial = parameters
            .iter()
            .map(|p| {
                p.initial_value().ok_or_else(|| {
                    EngineError::Backend(format!("parameter '{}' has no values to draw", p.name()))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut candidates = Vec::with_capacity(self.budget);
        candidates.push(initial);
        while candidates.len() < self.budget {
            let point = parameters
                .iter()
                .map(|p| draw(p, &mut rng))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| EngineError::Internal("empty parameter domain".into()))?;
            candidates.push(point);
        }
        debug!(candidates = candidates.len(), "Random candidates drawn.");
        Ok(candidates)
    }
}

fn uniform(lower: f64, upper: f64, rng: &mut impl Rng) -> f64 {
    if lower < upper {
        rng.gen_range(lower..=upper)
    } else {
        lower
    }
}

fn draw(parameter: &McoParameter, rng: &mut impl Rng) -> Option<Value> {
    match parameter {
        McoParameter::Fixed(p) => Some(p.value.clone()),
        McoParameter::Ranged(p) => Some(Value::Float(uniform(p.lower_bound, p.upper_bound, rng))),
        McoParameter::RangedVector(p) => Some(Value::Vector(
            p.lower_bound
                .iter()
                .zip(&p.upper_bound)
                .map(|(&lo, &hi)| uniform(lo, hi, rng))
                .collect(),
        )),
        McoParameter::Listed(_) | McoParameter::Categorical(_) => {
            parameter.sample_values().choose(rng).cloned()
        }
    }
}

impl ScalarOptimizer for RandomSearchOptimizer {
    fn optimize_function(
        &self,
        objective: &mut ScalarObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Value>, EngineError> {
        let mut best: Option<(f64, Vec<Value>)> = None;
        for point in self.candidates(parameters)? {
            let score = objective(&point)?;
            if best.as_ref().is_none_or(|(b, _)| score < *b) {
                best = Some((score, point));
            }
        }
        best.map(|(_, point)| point)
            .ok_or_else(|| EngineError::Internal("random search evaluated no point".into()))
    }
}

impl MultiObjectiveOptimizer for RandomSearchOptimizer {
    fn optimize_function(
        &self,
        objective: &mut VectorObjective<'_>,
        parameters: &[McoParameter],
    ) -> Result<Vec<Vec<Value>>, EngineError> {
        let candidates = self.candidates(parameters)?;
        let scores = candidates
            .iter()
            .map(|p| objective(p))
            .collect::<Result<Vec<_>, _>>()?;
        let mut candidates: Vec<Option<Vec<Value>>> = candidates.into_iter().map(Some).collect();
        Ok(pareto_front(&scores)
            .into_iter()
            .filter_map(|i| candidates[i].take())
            .collect())
    }
}
