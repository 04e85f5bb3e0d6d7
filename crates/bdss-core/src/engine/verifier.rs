//! Static structural checks of a workflow, run before any evaluation.

use super::error::{EngineError, StageIdentity};
use super::registry::FactoryRegistry;
use super::workflow::Workflow;
use crate::core::mco::model::McoModel;
use crate::core::stage::DataSourceModel;
use std::fmt;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// The workflow entity a finding refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifierSubject {
    Workflow,
    McoModel,
    Parameter { index: usize },
    Kpi { index: usize },
    ExecutionLayer { layer: usize },
    DataSource { layer: usize, index: usize, id: String },
}

impl fmt::Display for VerifierSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifierSubject::Workflow => write!(f, "workflow"),
            VerifierSubject::McoModel => write!(f, "MCO model"),
            VerifierSubject::Parameter { index } => write!(f, "parameter {}", index),
            VerifierSubject::Kpi { index } => write!(f, "KPI {}", index),
            VerifierSubject::ExecutionLayer { layer } => write!(f, "execution layer {}", layer),
            VerifierSubject::DataSource { layer, index, id } => {
                write!(f, "data source '{}' (layer {}, position {})", id, layer, index)
            }
        }
    }
}

/// One structural problem. Findings are collected, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierError {
    pub subject: VerifierSubject,
    pub local_error: String,
    pub severity: Severity,
}

impl VerifierError {
    pub fn error(subject: VerifierSubject, local_error: impl Into<String>) -> Self {
        Self {
            subject,
            local_error: local_error.into(),
            severity: Severity::Error,
        }
    }

    pub fn warning(subject: VerifierSubject, local_error: impl Into<String>) -> Self {
        Self {
            subject,
            local_error: local_error.into(),
            severity: Severity::Warning,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for VerifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.subject, self.local_error)
    }
}

/// Collects every structural problem of `workflow` in one pass.
///
/// Stages are instantiated to compare their declared slots against the slot names in
/// the file. A registered factory that fails to create its stage is a defect in the
/// plugin rather than in the workflow, and is returned as `Err`.
#[instrument(skip_all, name = "verify_workflow")]
pub fn verify(
    workflow: &Workflow,
    registry: &FactoryRegistry,
) -> Result<Vec<VerifierError>, EngineError> {
    let mut findings = Vec::new();

    match &workflow.mco_model {
        None => findings.push(VerifierError::error(
            VerifierSubject::Workflow,
            "Workflow has no MCO",
        )),
        Some(mco_model) => verify_mco_model(mco_model, &mut findings),
    }

    if workflow.execution_layers.is_empty() {
        findings.push(VerifierError::error(
            VerifierSubject::Workflow,
            "Workflow has no execution layers",
        ));
    } else {
        for (layer_index, layer) in workflow.execution_layers.iter().enumerate() {
            if layer.is_empty() {
                findings.push(VerifierError::error(
                    VerifierSubject::ExecutionLayer { layer: layer_index },
                    "Layer has no data sources",
                ));
            }
            for (position, model) in layer.data_sources.iter().enumerate() {
                verify_data_source(model, layer_index, position, registry, &mut findings)?;
            }
        }
    }

    info!(
        findings = findings.len(),
        errors = findings.iter().filter(|f| f.is_error()).count(),
        "Workflow verification complete."
    );
    Ok(findings)
}

fn verify_mco_model(mco_model: &McoModel, findings: &mut Vec<VerifierError>) {
    if mco_model.parameters.is_empty() {
        findings.push(VerifierError::error(
            VerifierSubject::McoModel,
            "MCO has no defined parameters",
        ));
    }

    for (index, parameter) in mco_model.parameters.iter().enumerate() {
        let subject = VerifierSubject::Parameter { index };
        if parameter.name().is_empty() || parameter.data_type().is_empty() {
            findings.push(VerifierError::error(
                subject.clone(),
                "Parameter is missing its name or type",
            ));
        }
        for problem in parameter.problems() {
            findings.push(VerifierError::error(subject.clone(), problem));
        }
    }

    for (index, kpi) in mco_model.kpis.iter().enumerate() {
        if kpi.name.is_empty() || kpi.objective.is_none() {
            findings.push(VerifierError::error(
                VerifierSubject::Kpi { index },
                "KPI is missing its name or objective",
            ));
        }
    }
}

fn verify_data_source(
    model: &DataSourceModel,
    layer: usize,
    index: usize,
    registry: &FactoryRegistry,
    findings: &mut Vec<VerifierError>,
) -> Result<(), EngineError> {
    let subject = VerifierSubject::DataSource {
        layer,
        index,
        id: model.id.clone(),
    };

    let Some(factory) = registry.data_source(&model.id) else {
        findings.push(VerifierError::error(
            subject,
            format!("No data source factory registered for '{}'", model.id),
        ));
        return Ok(());
    };

    let data_source = factory
        .create_data_source()
        .map_err(|source| EngineError::StageCreation {
            stage: StageIdentity {
                id: model.id.clone(),
                layer,
                position: index,
            },
            source,
        })?;
    if let Err(e) = data_source.check_settings(model) {
        findings.push(VerifierError::error(subject, format!("Invalid settings: {}", e)));
        return Ok(());
    }
    let (input_slots, output_slots) = data_source.slots(model);
    debug!(
        stage = %subject,
        inputs = input_slots.len(),
        outputs = output_slots.len(),
        "Checking slot information."
    );

    if input_slots.len() != model.input_slot_info.len() {
        findings.push(VerifierError::error(
            subject.clone(),
            format!(
                "The number of input slots ({}) does not match the number of user-defined names ({})",
                input_slots.len(),
                model.input_slot_info.len()
            ),
        ));
    }
    if output_slots.len() != model.output_slot_info.len() {
        findings.push(VerifierError::error(
            subject.clone(),
            format!(
                "The number of output slots ({}) does not match the number of user-defined names ({})",
                output_slots.len(),
                model.output_slot_info.len()
            ),
        ));
    }

    for (slot, info) in model.input_slot_info.iter().enumerate() {
        if info.name.is_empty() {
            findings.push(VerifierError::error(
                subject.clone(),
                format!("Input slot {} has no name", slot),
            ));
        }
    }
    for (slot, info) in model.output_slot_info.iter().enumerate() {
        if info.is_discarded() {
            findings.push(VerifierError::warning(
                subject.clone(),
                format!("Output slot {} has no name and its value will be discarded", slot),
            ));
        }
    }

    Ok(())
}
