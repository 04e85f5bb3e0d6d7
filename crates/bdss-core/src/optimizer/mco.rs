//! MCO strategies selectable from a workflow's `mco_model.id`.
//!
//! A strategy reads its settings from the model, configures an optimizer engine and
//! publishes the run as events.

use super::aposteriori::AposterioriOptimizerEngine;
use super::base::{BaseEngine, OptimalPoint, OptimizationRun, OptimizerEngine};
use super::config::{
    AposterioriConfig, AposterioriConfigBuilder, ConfigError, OptimizerKind, SpaceSearchMode,
    WeightedConfig, WeightedConfigBuilder,
};
use super::weighted::WeightedOptimizerEngine;
use crate::core::mco::model::McoModel;
use crate::engine::control::ControlChannel;
use crate::engine::error::EngineError;
use crate::engine::evaluator::Evaluator;
use crate::engine::events::{Event, EventReporter};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use tracing::{info, instrument};

pub const DEFAULT_NUM_POINTS: usize = 7;
pub const DEFAULT_DIRICHLET_ALPHA: f64 = 1.0;
pub const DEFAULT_MAX_ITERATIONS: u64 = 200;
pub const DEFAULT_WEIGHTED_BUDGET: usize = 100;
pub const DEFAULT_APOSTERIORI_BUDGET: usize = 200;

pub trait Mco {
    /// Optimizes `model` and returns every reported point in order.
    fn run(
        &self,
        model: &McoModel,
        evaluator: &dyn Evaluator,
        reporter: &EventReporter,
        control: &ControlChannel,
    ) -> Result<Vec<OptimalPoint>, EngineError>;
}

pub trait McoFactory: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str {
        self.id()
    }

    fn create_mco(&self) -> Box<dyn Mco>;
}

/// Optional overrides of the weighted engine defaults, as found in the model settings.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct WeightedSettings {
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

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AposterioriSettings {
    optimizer: Option<OptimizerKind>,
    budget: Option<usize>,
    seed: Option<u64>,
}

fn parse_settings<T: DeserializeOwned>(settings: &Map<String, JsonValue>) -> Result<T, ConfigError> {
    serde_json::from_value(JsonValue::Object(settings.clone())).map_err(|e| {
        ConfigError::InvalidValue {
            name: "model_data",
            reason: e.to_string(),
        }
    })
}

pub fn weighted_config(model: &McoModel) -> Result<WeightedConfig, ConfigError> {
    let settings: WeightedSettings = parse_settings(&model.settings)?;
    WeightedConfigBuilder::new()
        .num_points(settings.num_points.unwrap_or(DEFAULT_NUM_POINTS))
        .space_search_mode(settings.space_search_mode.unwrap_or_default())
        .include_zero_weights(settings.include_zero_weights.unwrap_or(false))
        .dirichlet_alpha(settings.dirichlet_alpha.unwrap_or(DEFAULT_DIRICHLET_ALPHA))
        .optimizer(settings.optimizer.unwrap_or(OptimizerKind::Simplex))
        .max_iterations(settings.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS))
        .budget(settings.budget.unwrap_or(DEFAULT_WEIGHTED_BUDGET))
        .seed(settings.seed)
        .verbose_run(settings.verbose_run.unwrap_or(false))
        .build()
}

pub fn aposteriori_config(model: &McoModel) -> Result<AposterioriConfig, ConfigError> {
    let settings: AposterioriSettings = parse_settings(&model.settings)?;
    AposterioriConfigBuilder::new()
        .optimizer(settings.optimizer.unwrap_or(OptimizerKind::RandomSearch))
        .budget(settings.budget.unwrap_or(DEFAULT_APOSTERIORI_BUDGET))
        .seed(settings.seed)
        .build()
}

/// Reports the start, every produced point and the end of a run.
fn publish(
    model: &McoModel,
    run: OptimizationRun<'_>,
    reporter: &EventReporter,
) -> Result<Vec<OptimalPoint>, EngineError> {
    reporter.report(Event::McoStart {
        parameter_names: model.parameter_names(),
        kpi_names: model.kpi_names(),
    });

    let mut points = Vec::new();
    for point in run {
        let point = point?;
        reporter.report(Event::McoProgress {
            point: point.point.clone(),
            kpis: point.kpis.clone(),
            weights: point.weights.clone(),
        });
        points.push(point);
    }

    reporter.report(Event::McoFinish);
    info!(points = points.len(), "MCO run finished.");
    Ok(points)
}

pub struct WeightedMco;

impl Mco for WeightedMco {
    #[instrument(skip_all, name = "weighted_mco")]
    fn run(
        &self,
        model: &McoModel,
        evaluator: &dyn Evaluator,
        reporter: &EventReporter,
        control: &ControlChannel,
    ) -> Result<Vec<OptimalPoint>, EngineError> {
        let config = weighted_config(model)?;
        info!(
            num_points = config.sampling.num_points,
            optimizer = ?config.backend.optimizer,
            "Starting weighted optimization."
        );
        let base = BaseEngine::new(&model.parameters, &model.kpis, evaluator)
            .with_control(control.clone());
        let engine = WeightedOptimizerEngine::new(base, config);
        publish(model, engine.optimize(), reporter)
    }
}

pub struct WeightedMcoFactory;

impl McoFactory for WeightedMcoFactory {
    fn id(&self) -> &str {
        "weighted"
    }

    fn name(&self) -> &str {
        "Weighted sum optimizer"
    }

    fn create_mco(&self) -> Box<dyn Mco> {
        Box::new(WeightedMco)
    }
}

pub struct AposterioriMco;

impl Mco for AposterioriMco {
    #[instrument(skip_all, name = "aposteriori_mco")]
    fn run(
        &self,
        model: &McoModel,
        evaluator: &dyn Evaluator,
        reporter: &EventReporter,
        control: &ControlChannel,
    ) -> Result<Vec<OptimalPoint>, EngineError> {
        let config = aposteriori_config(model)?;
        info!(
            budget = config.backend.budget,
            optimizer = ?config.backend.optimizer,
            "Starting a-posteriori optimization."
        );
        let base = BaseEngine::new(&model.parameters, &model.kpis, evaluator)
            .with_control(control.clone());
        let engine = AposterioriOptimizerEngine::new(base, config);
        publish(model, engine.optimize(), reporter)
    }
}

pub struct AposterioriMcoFactory;

impl McoFactory for AposterioriMcoFactory {
    fn id(&self) -> &str {
        "aposteriori"
    }

    fn name(&self) -> &str {
        "A-posteriori Pareto search"
    }

    fn create_mco(&self) -> Box<dyn Mco> {
        Box::new(AposterioriMco)
    }
}
