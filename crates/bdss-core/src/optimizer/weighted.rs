//! Scalarization of a multi-objective problem by weighted sums.
//!
//! For every weight vector produced by a space sampler the engine minimizes
//! `dot(w * s, minimization_score(kpis))`, where `s` holds one scale factor per KPI.
//! Scale factors come either from the KPI itself or from Sen's scaling method, which
//! normalizes each KPI by the range it spans over the single-objective optima.

use super::backends::{ScalarOptimizer, scalar_optimizer};
use super::base::{BaseEngine, OptimalPoint, OptimizationRun, OptimizerEngine};
use super::config::{SamplingConfig, SpaceSearchMode, WeightedConfig};
use super::space_sampling::{DirichletSpaceSampler, SpaceSampler, UniformSpaceSampler, WeightIter};
use crate::core::data::value::Value;
use crate::engine::error::EngineError;
use nalgebra::DVector;
use tracing::{debug, info, instrument, warn};

pub struct WeightedOptimizerEngine<'a> {
    base: BaseEngine<'a>,
    config: WeightedConfig,
}

/// The optimum of one weighted sub-problem and, for verbose runs, every point
/// evaluated on the way to it.
struct WeightedOptimum {
    point: Vec<Value>,
    kpis: Vec<f64>,
    trail: Vec<OptimalPoint>,
}

impl<'a> WeightedOptimizerEngine<'a> {
    pub fn new(base: BaseEngine<'a>, config: WeightedConfig) -> Self {
        Self { base, config }
    }

    pub fn config(&self) -> &WeightedConfig {
        &self.config
    }

    fn backend(&self) -> Box<dyn ScalarOptimizer> {
        scalar_optimizer(&self.config.backend)
    }

    /// Minimizes the weighted sum of minimization scores and re-scores the optimum.
    fn weighted_optimize(
        &self,
        backend: &dyn ScalarOptimizer,
        weights: &[f64],
        record_trail: bool,
    ) -> Result<WeightedOptimum, EngineError> {
        let weights = DVector::from_column_slice(weights);
        let mut trail = Vec::new();
        let mut objective = |point: &[Value]| -> Result<f64, EngineError> {
            let scores = self.base.score(point)?;
            let minimization = DVector::from_vec(self.base.minimization_score(&scores));
            if record_trail {
                trail.push(OptimalPoint::new(point.to_vec(), scores));
            }
            Ok(weights.dot(&minimization))
        };

        let point = backend.optimize_function(&mut objective, self.base.parameters())?;
        let kpis = self.base.score(&point)?;
        Ok(WeightedOptimum { point, kpis, trail })
    }

    /// Sen's scaling: one single-objective optimization per KPI, then the inverse of
    /// the range each KPI spans over those optima. A KPI whose range is zero keeps a
    /// factor of one.
    #[instrument(skip_all, name = "sen_scaling")]
    pub fn sen_scaling(&self) -> Result<Vec<f64>, EngineError> {
        let dimension = self.base.kpis().len();
        let backend = self.backend();

        let mut extrema = Vec::with_capacity(dimension);
        for i in 0..dimension {
            let mut weights = vec![0.0; dimension];
            weights[i] = 1.0;
            let optimum = self.weighted_optimize(backend.as_ref(), &weights, false)?;
            debug!(kpi = i, kpis = ?optimum.kpis, "Extremal run finished.");
            extrema.push(optimum.kpis);
        }

        let factors = (0..dimension)
            .map(|i| {
                let column = extrema.iter().map(|kpis| kpis[i]);
                let max = column.clone().fold(f64::NEG_INFINITY, f64::max);
                let min = column.fold(f64::INFINITY, f64::min);
                let range = max - min;
                if range > 0.0 && range.is_finite() {
                    1.0 / range
                } else {
                    warn!(
                        kpi = %self.base.kpis()[i].name,
                        range,
                        "KPI does not vary over the extremal points, using a scale factor of 1."
                    );
                    1.0
                }
            })
            .collect();
        Ok(factors)
    }

    /// One factor per KPI: Sen's factor for auto-scaled KPIs, the configured
    /// `scale_factor` otherwise.
    pub fn scaling_factors(&self) -> Result<Vec<f64>, EngineError> {
        let kpis = self.base.kpis();
        let sen = if kpis.iter().any(|k| k.auto_scale) {
            Some(self.sen_scaling()?)
        } else {
            None
        };
        Ok(kpis
            .iter()
            .enumerate()
            .map(|(i, kpi)| match &sen {
                Some(sen) if kpi.auto_scale => sen[i],
                _ => kpi.scale_factor,
            })
            .collect())
    }

    /// Runs the weighted sub-problem for `weights` as given, without scaling.
    fn step(
        &self,
        backend: &dyn ScalarOptimizer,
        weights: Vec<f64>,
    ) -> Result<Vec<OptimalPoint>, EngineError> {
        let optimum = self.weighted_optimize(backend, &weights, self.config.verbose_run)?;
        let mut points = optimum.trail;
        points.push(OptimalPoint::new(optimum.point, optimum.kpis).with_weights(weights));
        Ok(points)
    }
}

pub fn space_sampler(
    config: &SamplingConfig,
    dimension: usize,
    seed: Option<u64>,
) -> Result<Box<dyn SpaceSampler>, EngineError> {
    Ok(match config.space_search_mode {
        SpaceSearchMode::Uniform => Box::new(UniformSpaceSampler::new(
            dimension,
            config.num_points,
            config.include_zero_weights,
        )?),
        SpaceSearchMode::Dirichlet => Box::new(
            DirichletSpaceSampler::new(dimension, config.num_points, config.dirichlet_alpha)?
                .with_seed(seed),
        ),
    })
}

impl OptimizerEngine for WeightedOptimizerEngine<'_> {
    fn optimize(&self) -> OptimizationRun<'_> {
        let backend = self.backend();
        let mut weights: Option<(WeightIter, Vec<f64>)> = None;

        OptimizationRun::new(Box::new(move || {
            if weights.is_none() {
                let prepared = space_sampler(
                    &self.config.sampling,
                    self.base.kpis().len(),
                    self.config.backend.seed,
                )
                .and_then(|sampler| {
                    let mut samples = sampler.generate_space_sample().peekable();
                    if samples.peek().is_none() {
                        warn!(
                            num_points = self.config.sampling.num_points,
                            kpis = self.base.kpis().len(),
                            "The weight sampler yields no weights, nothing to optimize. \
                             Raise num_points or include zero weights."
                        );
                        return Ok((Box::new(std::iter::empty()) as WeightIter, Vec::new()));
                    }
                    let factors = self.scaling_factors()?;
                    info!(factors = ?factors, "Scaling factors computed.");
                    Ok((Box::new(samples) as WeightIter, factors))
                });
                match prepared {
                    Ok(prepared) => weights = Some(prepared),
                    Err(e) => return Some(Err(e)),
                }
            }
            let (samples, factors) = weights.as_mut()?;
            let sample = samples.next()?;
            let scaled: Vec<f64> = sample.iter().zip(factors.iter()).map(|(w, s)| w * s).collect();
            debug!(weights = ?scaled, "Optimizing weighted sub-problem.");
            Some(self.step(backend.as_ref(), scaled))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mco::kpi::KpiSpecification;
    use crate::core::mco::parameter::McoParameter;
    use crate::engine::control::ControlChannel;
    use crate::optimizer::config::{OptimizerKind, WeightedConfigBuilder};
    use std::cell::Cell;

    fn config(optimizer: OptimizerKind, num_points: usize) -> WeightedConfigBuilder {
        WeightedConfigBuilder::new()
            .num_points(num_points)
            .space_search_mode(SpaceSearchMode::Uniform)
            .include_zero_weights(true)
            .dirichlet_alpha(1.0)
            .optimizer(optimizer)
            .max_iterations(300)
            .budget(50)
            .seed(Some(11))
            .verbose_run(false)
    }

    /// Two competing objectives on x in [0, 1]: x^2 and (x - 1)^2.
    fn competing(point: &[Value]) -> Result<Vec<f64>, EngineError> {
        let x = point[0].as_f64().unwrap_or_default();
        Ok(vec![x * x, (x - 1.0) * (x - 1.0)])
    }

    fn parameters() -> Vec<McoParameter> {
        vec![McoParameter::ranged("x", "X", 0.5, 0.0, 1.0)]
    }

    #[test]
    fn uniform_weights_trace_the_trade_off() {
        let parameters = parameters();
        let kpis = vec![KpiSpecification::minimise("a"), KpiSpecification::minimise("b")];
        let evaluator = competing;
        let base = BaseEngine::new(&parameters, &kpis, &evaluator);
        let engine =
            WeightedOptimizerEngine::new(base, config(OptimizerKind::Simplex, 3).build().unwrap());

        let points: Vec<_> = engine.optimize().collect::<Result<_, _>>().unwrap();

        assert_eq!(points.len(), 3);
        let xs: Vec<f64> = points.iter().map(|p| p.point[0].as_f64().unwrap()).collect();
        assert!((xs[0] - 0.0).abs() < 1e-3, "{:?}", xs);
        assert!((xs[1] - 0.5).abs() < 1e-3, "{:?}", xs);
        assert!((xs[2] - 1.0).abs() < 1e-3, "{:?}", xs);
        assert_eq!(points[1].weights, Some(vec![0.5, 0.5]));
        assert!((points[1].kpis[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn maximised_kpis_are_optimized_in_the_right_direction() {
        let parameters = parameters();
        let kpis = vec![KpiSpecification::maximise("x")];
        let evaluator =
            |p: &[Value]| -> Result<Vec<f64>, EngineError> { Ok(vec![p[0].as_f64().unwrap_or_default()]) };
        let base = BaseEngine::new(&parameters, &kpis, &evaluator);
        let engine =
            WeightedOptimizerEngine::new(base, config(OptimizerKind::Grid, 1).build().unwrap());

        let points: Vec<_> = engine.optimize().collect::<Result<_, _>>().unwrap();

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].point, vec![Value::Float(1.0)]);
        assert_eq!(points[0].kpis, vec![1.0]);
    }

    #[test]
    fn sen_scaling_normalizes_by_the_extremal_range() {
        let parameters = parameters();
        let kpis = vec![
            KpiSpecification::minimise("a").with_auto_scale(true),
            KpiSpecification::minimise("b").with_auto_scale(true),
        ];
        let evaluator = |p: &[Value]| -> Result<Vec<f64>, EngineError> {
            let x = p[0].as_f64().unwrap_or_default();
            Ok(vec![10.0 * x, 2.0 * (1.0 - x)])
        };
        let base = BaseEngine::new(&parameters, &kpis, &evaluator);
        let engine =
            WeightedOptimizerEngine::new(base, config(OptimizerKind::Grid, 3).build().unwrap());

        let factors = engine.sen_scaling().unwrap();

        assert!((factors[0] - 0.1).abs() < 1e-12);
        assert!((factors[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn scaling_factors_mix_sen_and_configured_factors() {
        let parameters = parameters();
        let kpis = vec![
            KpiSpecification::minimise("a").with_scale_factor(3.0),
            KpiSpecification::minimise("b").with_auto_scale(true),
        ];
        let evaluator = |p: &[Value]| -> Result<Vec<f64>, EngineError> {
            let x = p[0].as_f64().unwrap_or_default();
            Ok(vec![x, 4.0 * (1.0 - x)])
        };
        let base = BaseEngine::new(&parameters, &kpis, &evaluator);
        let engine =
            WeightedOptimizerEngine::new(base, config(OptimizerKind::Grid, 3).build().unwrap());

        assert_eq!(engine.scaling_factors().unwrap(), vec![3.0, 0.25]);
    }

    #[test]
    fn constant_kpi_falls_back_to_unit_scale() {
        let parameters = parameters();
        let kpis = vec![KpiSpecification::minimise("c").with_auto_scale(true)];
        let evaluator = |_: &[Value]| -> Result<Vec<f64>, EngineError> { Ok(vec![5.0]) };
        let base = BaseEngine::new(&parameters, &kpis, &evaluator);
        let engine =
            WeightedOptimizerEngine::new(base, config(OptimizerKind::Grid, 3).build().unwrap());

        assert_eq!(engine.sen_scaling().unwrap(), vec![1.0]);
    }

    #[test]
    fn verbose_run_reports_intermediate_points_before_each_optimum() {
        let parameters = parameters();
        let kpis = vec![KpiSpecification::minimise("a"), KpiSpecification::minimise("b")];
        let evaluator = competing;
        let base = BaseEngine::new(&parameters, &kpis, &evaluator);
        let engine = WeightedOptimizerEngine::new(
            base,
            config(OptimizerKind::Grid, 2).verbose_run(true).build().unwrap(),
        );

        let points: Vec<_> = engine.optimize().collect::<Result<_, _>>().unwrap();

        // Two weight vectors, five grid samples each, plus the two optima.
        assert_eq!(points.len(), 12);
        assert!(points[..5].iter().all(|p| p.weights.is_none()));
        assert_eq!(points[5].weights, Some(vec![1.0, 0.0]));
        assert_eq!(points[11].weights, Some(vec![0.0, 1.0]));
    }

    #[test]
    fn evaluation_is_lazy_and_stops_on_cancellation() {
        let parameters = parameters();
        let kpis = vec![KpiSpecification::minimise("a"), KpiSpecification::minimise("b")];
        let calls = Cell::new(0);
        let evaluator = |p: &[Value]| -> Result<Vec<f64>, EngineError> {
            calls.set(calls.get() + 1);
            competing(p)
        };
        let control = ControlChannel::new();
        let base = BaseEngine::new(&parameters, &kpis, &evaluator).with_control(control.clone());
        let engine =
            WeightedOptimizerEngine::new(base, config(OptimizerKind::Grid, 5).build().unwrap());

        let mut run = engine.optimize();
        assert_eq!(calls.get(), 0);

        assert!(run.next().unwrap().is_ok());
        let after_first = calls.get();
        assert_eq!(after_first, 6);

        control.stop();
        assert!(matches!(run.next(), Some(Err(EngineError::Cancelled))));
        assert!(run.next().is_none());
        assert_eq!(calls.get(), after_first);
    }

    #[test]
    fn empty_weight_sample_skips_scaling() {
        let parameters = parameters();
        let kpis = vec![
            KpiSpecification::minimise("a").with_auto_scale(true),
            KpiSpecification::minimise("b").with_auto_scale(true),
        ];
        let calls = Cell::new(0);
        let evaluator = |p: &[Value]| -> Result<Vec<f64>, EngineError> {
            calls.set(calls.get() + 1);
            competing(p)
        };
        let base = BaseEngine::new(&parameters, &kpis, &evaluator);
        let engine = WeightedOptimizerEngine::new(
            base,
            config(OptimizerKind::Grid, 2)
                .include_zero_weights(false)
                .build()
                .unwrap(),
        );

        assert!(engine.optimize().next().is_none());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn engine_without_kpis_fails_to_sample() {
        let parameters = parameters();
        let evaluator = |_: &[Value]| -> Result<Vec<f64>, EngineError> { Ok(vec![]) };
        let base = BaseEngine::new(&parameters, &[], &evaluator);
        let engine =
            WeightedOptimizerEngine::new(base, config(OptimizerKind::Grid, 3).build().unwrap());

        let mut run = engine.optimize();
        assert!(matches!(run.next(), Some(Err(EngineError::Sampling { .. }))));
    }
}
