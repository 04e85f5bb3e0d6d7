use super::ensure_valid;
use crate::core::data::value::{DataValue, Value};
use crate::engine::error::EngineError;
use crate::engine::registry::FactoryRegistry;
use crate::engine::workflow::Workflow;
use tracing::{info, instrument};

/// Evaluates `workflow` once for `values`, given in MCO parameter order, and returns
/// the KPI values in the order the model requests them.
#[instrument(skip_all, name = "evaluate_workflow")]
pub fn run(
    workflow: &Workflow,
    registry: &FactoryRegistry,
    values: &[Value],
) -> Result<Vec<DataValue>, EngineError> {
    ensure_valid(workflow, registry)?;
    let mco_model = workflow
        .mco_model
        .as_ref()
        .ok_or(EngineError::MissingMcoModel)?;
    if values.len() != mco_model.parameters.len() {
        return Err(EngineError::ParameterCount {
            expected: mco_model.parameters.len(),
            actual: values.len(),
        });
    }

    let kpis = workflow.execute(registry, mco_model.bind_parameters(values))?;
    info!(kpis = kpis.len(), "Single-point evaluation complete.");
    Ok(kpis)
}
