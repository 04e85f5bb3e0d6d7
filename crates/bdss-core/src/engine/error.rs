use super::binder::BindingError;
use super::verifier::VerifierError;
use crate::core::data::value::Value;
use crate::core::stage::StageError;
use crate::optimizer::config::ConfigError;
use crate::optimizer::space_sampling::SamplingError;
use std::fmt;
use thiserror::Error;

/// Where a stage sits in a workflow, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageIdentity {
    pub id: String,
    pub layer: usize,
    pub position: usize,
}

impl fmt::Display for StageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' (layer {}, position {})",
            self.id, self.layer, self.position
        )
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No data source factory registered for {stage}")]
    UnknownDataSource { stage: StageIdentity },

    #[error("Unable to create data source {stage}: {source}")]
    StageCreation {
        stage: StageIdentity,
        #[source]
        source: StageError,
    },

    #[error("Unable to bind inputs of data source {stage}: {source}")]
    Binding {
        stage: StageIdentity,
        #[source]
        source: BindingError,
    },

    #[error("Data source {stage} failed: {source}")]
    StageRun {
        stage: StageIdentity,
        #[source]
        source: StageError,
    },

    #[error(
        "Plugin error: data source {stage} declares {expected} output slot(s) but returned {actual} value(s)"
    )]
    OutputCount {
        stage: StageIdentity,
        expected: usize,
        actual: usize,
    },

    #[error(
        "Plugin or file error: data source {stage} returned {actual} value(s) but its model names {expected} output(s)"
    )]
    OutputNaming {
        stage: StageIdentity,
        expected: usize,
        actual: usize,
    },

    #[error("Workflow has no MCO model")]
    MissingMcoModel,

    #[error("KPI '{name}' was not produced by the workflow")]
    MissingKpi { name: String },

    #[error("KPI '{name}' has a non-numeric value: {value}")]
    NonNumericKpi { name: String, value: Value },

    #[error("Expected {expected} parameter value(s), got {actual}")]
    ParameterCount { expected: usize, actual: usize },

    #[error("Workflow failed verification with {} finding(s)", .0.len())]
    InvalidWorkflow(Vec<VerifierError>),

    #[error("No MCO factory registered for '{id}'")]
    UnknownMco { id: String },

    #[error("Parameter '{name}' ({kind}) is not supported by the {optimizer} optimizer")]
    UnsupportedParameter {
        name: String,
        kind: &'static str,
        optimizer: &'static str,
    },

    #[error("Parameter '{name}' is inconsistent: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Optimizer backend failed: {0}")]
    Backend(String),

    #[error("Invalid optimizer configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Weight sampling failed: {source}")]
    Sampling {
        #[from]
        source: SamplingError,
    },

    #[error("Optimization stopped on request")]
    Cancelled,

    #[error("Internal logic error: {0}")]
    Internal(String),
}
