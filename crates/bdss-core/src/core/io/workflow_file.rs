use crate::engine::workflow::Workflow;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Version written by [`WorkflowFile::write_to`].
pub const CURRENT_VERSION: &str = "1.1";

/// Every version [`WorkflowFile::read_from`] accepts.
pub const SUPPORTED_VERSIONS: &[&str] = &["1", "1.1"];

#[derive(Debug, Error)]
pub enum WorkflowFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid workflow file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Workflow file has no version")]
    MissingVersion,
    #[error("Unsupported workflow file version '{found}' (supported: {})", SUPPORTED_VERSIONS.join(", "))]
    UnsupportedVersion { found: String },
}

#[derive(Deserialize)]
struct WorkflowDocument {
    version: Option<JsonValue>,
    workflow: Option<Workflow>,
}

#[derive(Serialize)]
struct WorkflowDocumentRef<'a> {
    version: &'a str,
    workflow: &'a Workflow,
}

/// The JSON workflow format:
/// `{"version": ..., "workflow": {"mco_model": ..., "execution_layers": [...], "notification_listeners": [...]}}`.
pub struct WorkflowFile;

impl WorkflowFile {
    /// Reads a workflow from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON, if its version is missing or
    /// unsupported, or if the workflow does not match the expected layout.
    pub fn read_from(reader: impl Read) -> Result<Workflow, WorkflowFileError> {
        let document: WorkflowDocument = serde_json::from_reader(reader)?;
        let version = match document.version {
            None => return Err(WorkflowFileError::MissingVersion),
            Some(JsonValue::String(s)) => s,
            Some(other) => other.to_string(),
        };
        if !SUPPORTED_VERSIONS.contains(&version.as_str()) {
            return Err(WorkflowFileError::UnsupportedVersion { found: version });
        }
        let workflow = document.workflow.unwrap_or_default();
        debug!(
            version = %version,
            layers = workflow.execution_layers.len(),
            "Workflow document parsed."
        );
        Ok(workflow)
    }

    /// Writes `workflow` as a pretty-printed document of the current version.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to(workflow: &Workflow, writer: &mut impl Write) -> Result<(), WorkflowFileError> {
        let document = WorkflowDocumentRef {
            version: CURRENT_VERSION,
            workflow,
        };
        serde_json::to_writer_pretty(&mut *writer, &document)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Reads a workflow from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Workflow, WorkflowFileError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let workflow = Self::read_from(BufReader::new(file))?;
        info!(path = %path.display(), "Workflow loaded.");
        Ok(workflow)
    }

    /// Writes a workflow to a file path, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    pub fn write_to_path<P: AsRef<Path>>(
        workflow: &Workflow,
        path: P,
    ) -> Result<(), WorkflowFileError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(workflow, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
