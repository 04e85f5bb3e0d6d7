//! The contract every computation stage (simulator, extractor, ...) implements.
//!
//! A stage is described in a workflow by a [`DataSourceModel`]: the identifier of the
//! factory that creates it, the user's names for its positional inputs and outputs, and
//! free-form settings. The engine asks the factory for a fresh [`DataSource`] on every
//! evaluation, so implementations may keep scratch state without being re-entrant.

use crate::core::data::slot::{InputSlotInfo, OutputSlotInfo, Slot};
use crate::core::data::value::DataValue;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StageError {
    #[error("Invalid input '{name}': {reason}")]
    InvalidInput { name: String, reason: String },

    #[error("Invalid model settings: {0}")]
    Settings(String),

    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// A stage instance in a workflow, as authored by the user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "DataSourceEntry", into = "DataSourceEntry")]
pub struct DataSourceModel {
    /// Identifier of the factory that creates the stage implementation.
    pub id: String,
    pub input_slot_info: Vec<InputSlotInfo>,
    pub output_slot_info: Vec<OutputSlotInfo>,
    pub settings: Map<String, JsonValue>,
}

impl DataSourceModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_inputs(mut self, names: &[&str]) -> Self {
        self.input_slot_info = names.iter().map(|n| InputSlotInfo::new(*n)).collect();
        self
    }

    pub fn with_outputs(mut self, names: &[&str]) -> Self {
        self.output_slot_info = names.iter().map(|n| OutputSlotInfo::new(*n)).collect();
        self
    }

    pub fn with_setting(mut self, key: &str, value: JsonValue) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }

    /// Deserializes the free-form settings into a stage-specific type.
    pub fn settings_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, StageError> {
        serde_json::from_value(JsonValue::Object(self.settings.clone()))
            .map_err(|e| StageError::Settings(e.to_string()))
    }
}

#[derive(Serialize, Deserialize)]
struct DataSourceEntry {
    id: String,
    #[serde(default)]
    model_data: DataSourceModelData,
}

#[derive(Default, Serialize, Deserialize)]
struct DataSourceModelData {
    #[serde(default)]
    input_slot_info: Vec<InputSlotInfo>,
    #[serde(default)]
    output_slot_info: Vec<OutputSlotInfo>,
    #[serde(flatten)]
    settings: Map<String, JsonValue>,
}

impl From<DataSourceEntry> for DataSourceModel {
    fn from(entry: DataSourceEntry) -> Self {
        Self {
            id: entry.id,
            input_slot_info: entry.model_data.input_slot_info,
            output_slot_info: entry.model_data.output_slot_info,
            settings: entry.model_data.settings,
        }
    }
}

impl From<DataSourceModel> for DataSourceEntry {
    fn from(model: DataSourceModel) -> Self {
        Self {
            id: model.id,
            model_data: DataSourceModelData {
                input_slot_info: model.input_slot_info,
                output_slot_info: model.output_slot_info,
                settings: model.settings,
            },
        }
    }
}

/// A computation stage.
pub trait DataSource {
    /// The positional input and output slots this stage declares for `model`.
    fn slots(&self, model: &DataSourceModel) -> (Vec<Slot>, Vec<Slot>);

    /// Rejects settings this stage cannot use. Checked before `slots` during
    /// verification, since slot shapes may depend on settings.
    fn check_settings(&self, _model: &DataSourceModel) -> Result<(), StageError> {
        Ok(())
    }

    /// Computes one value per output slot from the bound inputs, which arrive in
    /// input-slot order. Returned values are unnamed; the engine names them.
    fn run(
        &mut self,
        model: &DataSourceModel,
        inputs: &[DataValue],
    ) -> Result<Vec<DataValue>, StageError>;
}

/// Creates stage implementations for one identifier.
pub trait DataSourceFactory: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str {
        self.id()
    }

    fn default_settings(&self) -> Map<String, JsonValue> {
        Map::new()
    }

    fn create_data_source(&self) -> Result<Box<dyn DataSource>, StageError>;

    /// A fresh model for this factory with default settings and no slot names.
    fn create_model(&self) -> DataSourceModel {
        DataSourceModel {
            id: self.id().to_string(),
            settings: self.default_settings(),
            ..Default::default()
        }
    }
}
