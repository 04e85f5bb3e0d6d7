use super::error::EngineError;
use super::layer::{ExecutionLayer, execute_layer};
use super::registry::FactoryRegistry;
use crate::core::data::value::DataValue;
use crate::core::mco::kpi::KpiSpecification;
use crate::core::mco::model::McoModel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// A listener configured in a workflow file. Listener delivery is the host's concern;
/// the engine only preserves these entries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NotificationListenerModel {
    pub id: String,
    #[serde(default)]
    pub model_data: Map<String, JsonValue>,
}

/// The complete description of a process: the optimization problem and the ordered
/// execution layers that compute its KPIs.
///
/// A workflow is read-only during evaluation; every call to [`Workflow::execute`]
/// builds its own value pool and its own stage instances.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default)]
    pub mco_model: Option<McoModel>,
    #[serde(default)]
    pub execution_layers: Vec<ExecutionLayer>,
    #[serde(default)]
    pub notification_listeners: Vec<NotificationListenerModel>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mco_model(mut self, mco_model: McoModel) -> Self {
        self.mco_model = Some(mco_model);
        self
    }

    pub fn with_layer(mut self, layer: ExecutionLayer) -> Self {
        self.execution_layers.push(layer);
        self
    }

    /// Evaluates the workflow for `input_values` and returns the requested KPIs, in
    /// the order of `mco_model.kpis`, one entry per request.
    ///
    /// The pool starts with the inputs; each layer appends its outputs so later layers
    /// see everything published before them. When several pool entries share a name,
    /// the last published one is used, both for binding and for KPI lookup.
    #[instrument(skip_all, name = "workflow_execute", fields(inputs = input_values.len()))]
    pub fn execute(
        &self,
        registry: &FactoryRegistry,
        input_values: Vec<DataValue>,
    ) -> Result<Vec<DataValue>, EngineError> {
        let mco_model = self.mco_model.as_ref().ok_or(EngineError::MissingMcoModel)?;

        let mut pool = input_values;
        for (index, layer) in self.execution_layers.iter().enumerate() {
            let produced = execute_layer(layer, index, registry, &pool)?;
            debug!(layer = index, produced = produced.len(), "Layer completed.");
            pool.extend(produced);
        }

        let kpis = collect_kpis(&pool, &mco_model.kpis)?;
        info!(kpis = kpis.len(), "Workflow evaluation complete.");
        Ok(kpis)
    }
}

fn collect_kpis(
    pool: &[DataValue],
    kpis: &[KpiSpecification],
) -> Result<Vec<DataValue>, EngineError> {
    let latest: HashMap<&str, &DataValue> =
        pool.iter().map(|dv| (dv.name.as_str(), dv)).collect();

    kpis.iter()
        .map(|kpi| {
            latest
                .get(kpi.name.as_str())
                .map(|dv| (*dv).clone())
                .ok_or_else(|| EngineError::MissingKpi {
                    name: kpi.name.clone(),
                })
        })
        .collect()
}
