use super::error::EngineError;
use super::registry::FactoryRegistry;
use super::workflow::Workflow;
use crate::core::data::value::Value;
use tracing::debug;

/// Maps a point in parameter space to its KPI values. This is the only call an
/// optimizer engine makes that may be slow.
pub trait Evaluator {
    fn evaluate(&self, point: &[Value]) -> Result<Vec<f64>, EngineError>;
}

impl<F> Evaluator for F
where
    F: Fn(&[Value]) -> Result<Vec<f64>, EngineError>,
{
    fn evaluate(&self, point: &[Value]) -> Result<Vec<f64>, EngineError> {
        self(point)
    }
}

/// Evaluates points by running a workflow: tags the raw values with the MCO
/// parameter names, executes every layer and unwraps the numeric KPI values.
pub struct WorkflowEvaluator<'a> {
    workflow: &'a Workflow,
    registry: &'a FactoryRegistry,
}

impl<'a> WorkflowEvaluator<'a> {
    pub fn new(workflow: &'a Workflow, registry: &'a FactoryRegistry) -> Self {
        Self { workflow, registry }
    }
}

impl Evaluator for WorkflowEvaluator<'_> {
    fn evaluate(&self, point: &[Value]) -> Result<Vec<f64>, EngineError> {
        let mco_model = self
            .workflow
            .mco_model
            .as_ref()
            .ok_or(EngineError::MissingMcoModel)?;
        if point.len() != mco_model.parameters.len() {
            return Err(EngineError::ParameterCount {
                expected: mco_model.parameters.len(),
                actual: point.len(),
            });
        }

        let inputs = mco_model.bind_parameters(point);
        let kpis = self.workflow.execute(self.registry, inputs)?;
        debug!(point = ?point, "Point evaluated.");

        kpis.into_iter()
            .map(|kpi| {
                kpi.value.as_f64().ok_or_else(|| EngineError::NonNumericKpi {
                    name: kpi.name.clone(),
                    value: kpi.value.clone(),
                })
            })
            .collect()
    }
}
