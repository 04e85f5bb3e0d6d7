use super::ensure_valid;
use crate::engine::control::ControlChannel;
use crate::engine::error::EngineError;
use crate::engine::evaluator::WorkflowEvaluator;
use crate::engine::events::{Event, EventReporter};
use crate::engine::registry::FactoryRegistry;
use crate::engine::workflow::Workflow;
use crate::optimizer::base::OptimalPoint;
use tracing::{info, instrument};

/// Optimizes `workflow` with the MCO strategy named by its model.
///
/// The workflow is verified first; any error-severity finding aborts the run before a
/// single evaluation. Points are published through `reporter` as they are found and
/// also returned.
#[instrument(skip_all, name = "optimize_workflow")]
pub fn run(
    workflow: &Workflow,
    registry: &FactoryRegistry,
    reporter: &EventReporter,
    control: &ControlChannel,
) -> Result<Vec<OptimalPoint>, EngineError> {
    ensure_valid(workflow, registry)?;
    let mco_model = workflow
        .mco_model
        .as_ref()
        .ok_or(EngineError::MissingMcoModel)?;
    let factory = registry
        .mco(&mco_model.id)
        .ok_or_else(|| EngineError::UnknownMco {
            id: mco_model.id.clone(),
        })?;

    info!(mco = factory.name(), "Starting optimization.");
    reporter.report(Event::Message(format!("Running MCO '{}'", mco_model.id)));

    let evaluator = WorkflowEvaluator::new(workflow, registry);
    factory
        .create_mco()
        .run(mco_model, &evaluator, reporter, control)
}
