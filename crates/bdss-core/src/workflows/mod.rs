//! # Workflows Module
//!
//! High-level entry points that take a loaded [`Workflow`](crate::engine::workflow::Workflow)
//! and a populated [`FactoryRegistry`](crate::engine::registry::FactoryRegistry) and run
//! it end to end.
//!
//! - **Optimization** ([`optimize`]) - Verifies the workflow, selects its MCO strategy and
//!   reports every optimal point as it is found
//! - **Single-point Evaluation** ([`evaluate`]) - Evaluates the workflow for one set of
//!   parameter values and returns the KPIs

pub mod evaluate;
pub mod optimize;

use crate::engine::error::EngineError;
use crate::engine::registry::FactoryRegistry;
use crate::engine::verifier::{VerifierError, verify};
use crate::engine::workflow::Workflow;
use tracing::warn;

/// Runs the verifier and turns error-severity findings into
/// [`EngineError::InvalidWorkflow`]. Warnings are logged and otherwise ignored.
fn ensure_valid(workflow: &Workflow, registry: &FactoryRegistry) -> Result<(), EngineError> {
    let findings = verify(workflow, registry)?;
    for finding in findings.iter().filter(|f| !f.is_error()) {
        warn!("{}", finding);
    }
    let errors: Vec<VerifierError> = findings.into_iter().filter(VerifierError::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::InvalidWorkflow(errors))
    }
}
