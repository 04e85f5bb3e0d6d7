use crate::core::data::value::Value;
use crate::core::mco::kpi::KpiSpecification;
use crate::core::mco::parameter::McoParameter;
use crate::engine::control::ControlChannel;
use crate::engine::error::EngineError;
use crate::engine::evaluator::Evaluator;
use std::collections::VecDeque;
use std::fmt;

/// A point produced by an optimizer engine with its KPI values. `weights` is set for
/// the optimum of a weighted sub-problem.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimalPoint {
    pub point: Vec<Value>,
    pub kpis: Vec<f64>,
    pub weights: Option<Vec<f64>>,
}

impl OptimalPoint {
    pub fn new(point: Vec<Value>, kpis: Vec<f64>) -> Self {
        Self {
            point,
            kpis,
            weights: None,
        }
    }

    pub fn with_weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Configured,
    Running,
    Exhausted,
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EngineState::Configured => "configured",
            EngineState::Running => "running",
            EngineState::Exhausted => "exhausted",
            EngineState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

pub type OptimizationStep<'a> =
    Box<dyn FnMut() -> Option<Result<Vec<OptimalPoint>, EngineError>> + 'a>;

/// The lazy result of one [`OptimizerEngine::optimize`] call.
///
/// Each step of the underlying search yields a batch of points; they are handed out one
/// at a time. The sequence ends after the search is exhausted or after the first error,
/// and cannot be restarted.
pub struct OptimizationRun<'a> {
    state: EngineState,
    pending: VecDeque<OptimalPoint>,
    step: OptimizationStep<'a>,
}

impl<'a> OptimizationRun<'a> {
    pub fn new(step: OptimizationStep<'a>) -> Self {
        Self {
            state: EngineState::Configured,
            pending: VecDeque::new(),
            step,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }
}

impl Iterator for OptimizationRun<'_> {
    type Item = Result<OptimalPoint, EngineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(point) = self.pending.pop_front() {
            return Some(Ok(point));
        }
        match self.state {
            EngineState::Exhausted | EngineState::Failed => return None,
            EngineState::Configured => self.state = EngineState::Running,
            EngineState::Running => {}
        }
        loop {
            match (self.step)() {
                None => {
                    self.state = EngineState::Exhausted;
                    return None;
                }
                Some(Err(e)) => {
                    self.state = EngineState::Failed;
                    return Some(Err(e));
                }
                Some(Ok(points)) => {
                    self.pending.extend(points);
                    if let Some(point) = self.pending.pop_front() {
                        return Some(Ok(point));
                    }
                }
            }
        }
    }
}

pub trait OptimizerEngine {
    /// Starts a fresh search. Nothing is evaluated until the run is iterated.
    fn optimize(&self) -> OptimizationRun<'_>;
}

/// State shared by every optimizer engine: the search space, the objectives and the
/// evaluator that connects them.
pub struct BaseEngine<'a> {
    parameters: &'a [McoParameter],
    kpis: &'a [KpiSpecification],
    evaluator: &'a dyn Evaluator,
    control: ControlChannel,
}

impl<'a> BaseEngine<'a> {
    pub fn new(
        parameters: &'a [McoParameter],
        kpis: &'a [KpiSpecification],
        evaluator: &'a dyn Evaluator,
    ) -> Self {
        Self {
            parameters,
            kpis,
            evaluator,
            control: ControlChannel::new(),
        }
    }

    pub fn with_control(mut self, control: ControlChannel) -> Self {
        self.control = control;
        self
    }

    pub fn parameters(&self) -> &'a [McoParameter] {
        self.parameters
    }

    pub fn kpis(&self) -> &'a [KpiSpecification] {
        self.kpis
    }

    /// Evaluates `point` once. Pause and stop requests are honoured before the call.
    pub fn score(&self, point: &[Value]) -> Result<Vec<f64>, EngineError> {
        self.control.checkpoint()?;
        let scores = self.evaluator.evaluate(point)?;
        if scores.len() != self.kpis.len() {
            return Err(EngineError::Internal(format!(
                "evaluator returned {} KPI value(s) for {} KPI(s)",
                scores.len(),
                self.kpis.len()
            )));
        }
        Ok(scores)
    }

    /// Expresses every KPI as a quantity to minimise: values of minimised KPIs are kept,
    /// all others are negated.
    pub fn minimization_score(&self, scores: &[f64]) -> Vec<f64> {
        scores
            .iter()
            .zip(self.kpis)
            .map(|(&score, kpi)| if kpi.is_minimised() { score } else { -score })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mco::kpi::KpiObjective;
    use std::cell::Cell;

    fn kpis() -> Vec<KpiSpecification> {
        vec![
            KpiSpecification::minimise("a"),
            KpiSpecification::maximise("b"),
            KpiSpecification::new("c", KpiObjective::Target),
            KpiSpecification {
                objective: None,
                ..KpiSpecification::minimise("d")
            },
        ]
    }

    #[test]
    fn minimization_score_negates_everything_but_minimised_kpis() {
        let kpis = kpis();
        let evaluator = |_: &[Value]| -> Result<Vec<f64>, EngineError> { Ok(vec![]) };
        let engine = BaseEngine::new(&[], &kpis, &evaluator);

        assert_eq!(
            engine.minimization_score(&[1.0, 2.0, -3.0, 4.0]),
            vec![1.0, -2.0, 3.0, -4.0]
        );
    }

    #[test]
    fn score_calls_the_evaluator_once_per_point() {
        let kpis = vec![KpiSpecification::minimise("a")];
        let calls = Cell::new(0);
        let evaluator = |p: &[Value]| -> Result<Vec<f64>, EngineError> {
            calls.set(calls.get() + 1);
            Ok(vec![p[0].as_f64().unwrap_or_default() * 2.0])
        };
        let engine = BaseEngine::new(&[], &kpis, &evaluator);

        assert_eq!(engine.score(&[Value::Float(1.5)]).unwrap(), vec![3.0]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn stopped_engine_never_calls_the_evaluator() {
        let kpis = vec![KpiSpecification::minimise("a")];
        let evaluator = |_: &[Value]| -> Result<Vec<f64>, EngineError> {
            Err(EngineError::Internal("evaluated after stop".into()))
        };
        let control = ControlChannel::new();
        control.stop();
        let engine = BaseEngine::new(&[], &kpis, &evaluator).with_control(control);

        assert!(matches!(engine.score(&[]), Err(EngineError::Cancelled)));
    }

    #[test]
    fn wrong_number_of_kpi_values_is_an_error() {
        let kpis = vec![KpiSpecification::minimise("a")];
        let evaluator = |_: &[Value]| -> Result<Vec<f64>, EngineError> { Ok(vec![1.0, 2.0]) };
        let engine = BaseEngine::new(&[], &kpis, &evaluator);
        assert!(matches!(engine.score(&[]), Err(EngineError::Internal(_))));
    }

    #[test]
    fn run_moves_through_states_and_stops_after_failure() {
        let mut steps = vec![
            Some(Ok(vec![
                OptimalPoint::new(vec![Value::Int(1)], vec![1.0]),
                OptimalPoint::new(vec![Value::Int(2)], vec![2.0]),
            ])),
            Some(Err(EngineError::Cancelled)),
            Some(Ok(vec![OptimalPoint::new(vec![Value::Int(3)], vec![3.0])])),
        ]
        .into_iter();
        let mut run = OptimizationRun::new(Box::new(move || steps.next().flatten()));
        assert_eq!(run.state(), EngineState::Configured);

        assert_eq!(run.next().unwrap().unwrap().kpis, vec![1.0]);
        assert_eq!(run.state(), EngineState::Running);
        assert_eq!(run.next().unwrap().unwrap().kpis, vec![2.0]);
        assert!(matches!(run.next(), Some(Err(EngineError::Cancelled))));
        assert_eq!(run.state(), EngineState::Failed);
        assert!(run.next().is_none());
    }

    #[test]
    fn run_is_exhausted_when_the_search_ends() {
        let mut run = OptimizationRun::new(Box::new(|| None));
        assert!(run.next().is_none());
        assert_eq!(run.state(), EngineState::Exhausted);
        assert!(run.next().is_none());
    }

    #[test]
    fn empty_batches_are_skipped() {
        let mut batches = vec![vec![], vec![OptimalPoint::new(vec![], vec![7.0])]].into_iter();
        let run = OptimizationRun::new(Box::new(move || batches.next().map(Ok)));
        let kpis: Vec<_> = run.map(|p| p.unwrap().kpis).collect();
        assert_eq!(kpis, vec![vec![7.0]]);
    }
}
