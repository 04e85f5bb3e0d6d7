use super::binder::bind;
use super::error::{EngineError, StageIdentity};
use super::registry::FactoryRegistry;
use crate::core::data::value::DataValue;
use crate::core::stage::DataSourceModel;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// One step of the sequential pipeline. Every stage of a layer sees the same pool of
/// values; stages are run in list order so that runs are reproducible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionLayer {
    #[serde(default)]
    pub data_sources: Vec<DataSourceModel>,
}

impl ExecutionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data_source(mut self, model: DataSourceModel) -> Self {
        self.data_sources.push(model);
        self
    }

    pub fn add_data_source(&mut self, model: DataSourceModel) {
        self.data_sources.push(model);
    }

    pub fn remove_data_source(&mut self, index: usize) -> Option<DataSourceModel> {
        (index < self.data_sources.len()).then(|| self.data_sources.remove(index))
    }

    pub fn is_empty(&self) -> bool {
        self.data_sources.is_empty()
    }
}

/// Runs every stage of `layer` against `available_values` and returns only the newly
/// produced, named values. Values whose output slot has an empty name are dropped.
///
/// Any failure aborts the layer; no partial results are returned.
#[instrument(skip_all, name = "execution_layer", fields(layer = layer_index))]
pub fn execute_layer(
    layer: &ExecutionLayer,
    layer_index: usize,
    registry: &FactoryRegistry,
    available_values: &[DataValue],
) -> Result<Vec<DataValue>, EngineError> {
    let mut produced = Vec::new();

    for (position, model) in layer.data_sources.iter().enumerate() {
        let stage = StageIdentity {
            id: model.id.clone(),
            layer: layer_index,
            position,
        };
        let values = run_data_source(model, stage.clone(), registry, available_values)
            .inspect_err(|e| error!(stage = %stage, "{}", e))?;
        produced.extend(values);
    }

    debug!(count = produced.len(), "Layer produced new values.");
    Ok(produced)
}

fn run_data_source(
    model: &DataSourceModel,
    stage: StageIdentity,
    registry: &FactoryRegistry,
    available_values: &[DataValue],
) -> Result<Vec<DataValue>, EngineError> {
    let factory = registry
        .data_source(&model.id)
        .ok_or_else(|| EngineError::UnknownDataSource {
            stage: stage.clone(),
        })?;
    let mut data_source =
        factory
            .create_data_source()
            .map_err(|source| EngineError::StageCreation {
                stage: stage.clone(),
                source,
            })?;

    let (input_slots, output_slots) = data_source.slots(model);

    let inputs = bind(available_values, &model.input_slot_info, &input_slots).map_err(
        |source| EngineError::Binding {
            stage: stage.clone(),
            source,
        },
    )?;

    debug!(stage = %stage, inputs = inputs.len(), "Running data source.");
    let results = data_source
        .run(model, &inputs)
        .map_err(|source| EngineError::StageRun {
            stage: stage.clone(),
            source,
        })?;

    if results.len() != output_slots.len() {
        return Err(EngineError::OutputCount {
            stage,
            expected: output_slots.len(),
            actual: results.len(),
        });
    }
    if results.len() != model.output_slot_info.len() {
        return Err(EngineError::OutputNaming {
            stage,
            expected: model.output_slot_info.len(),
            actual: results.len(),
        });
    }

    Ok(results
        .into_iter()
        .zip(&model.output_slot_info)
        .filter(|(_, info)| !info.is_discarded())
        .map(|(mut value, info)| {
            value.name = info.name.clone();
            value
        })
        .collect())
}
