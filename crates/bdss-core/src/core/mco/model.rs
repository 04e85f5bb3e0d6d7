use super::kpi::KpiSpecification;
use super::parameter::McoParameter;
use crate::core::data::value::{DataValue, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The optimization problem attached to a workflow.
///
/// `id` selects the MCO strategy from the factory registry; `settings` holds the
/// strategy-specific configuration exactly as it appears in the workflow file.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "McoEntry", into = "McoEntry")]
pub struct McoModel {
    pub id: String,
    pub parameters: Vec<McoParameter>,
    pub kpis: Vec<KpiSpecification>,
    pub settings: Map<String, JsonValue>,
}

impl McoModel {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_parameter(mut self, parameter: McoParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn with_kpi(mut self, kpi: KpiSpecification) -> Self {
        self.kpis.push(kpi);
        self
    }

    pub fn with_setting(mut self, key: &str, value: JsonValue) -> Self {
        self.settings.insert(key.to_string(), value);
        self
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.parameters.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn kpi_names(&self) -> Vec<String> {
        self.kpis.iter().map(|k| k.name.clone()).collect()
    }

    /// Tags raw point values with the name and type of the parameter at the same
    /// position. Values beyond the number of parameters are ignored.
    pub fn bind_parameters(&self, values: &[Value]) -> Vec<DataValue> {
        self.parameters
            .iter()
            .zip(values)
            .map(|(parameter, value)| {
                DataValue::new(parameter.name(), parameter.data_type(), value.clone())
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize)]
struct McoEntry {
    id: String,
    #[serde(default)]
    model_data: McoModelData,
}

#[derive(Default, Serialize, Deserialize)]
struct McoModelData {
    #[serde(default)]
    parameters: Vec<McoParameter>,
    #[serde(default)]
    kpis: Vec<KpiEntry>,
    #[serde(flatten)]
    settings: Map<String, JsonValue>,
}

#[derive(Serialize, Deserialize)]
struct KpiEntry {
    #[serde(default = "kpi_entry_id")]
    id: String,
    model_data: KpiSpecification,
}

fn kpi_entry_id() -> String {
    "kpi".to_string()
}

impl From<McoEntry> for McoModel {
    fn from(entry: McoEntry) -> Self {
        Self {
            id: entry.id,
            parameters: entry.model_data.parameters,
            kpis: entry
                .model_data
                .kpis
                .into_iter()
                .map(|k| k.model_data)
                .collect(),
            settings: entry.model_data.settings,
        }
    }
}

impl From<McoModel> for McoEntry {
    fn from(model: McoModel) -> Self {
        Self {
            id: model.id,
            model_data: McoModelData {
                parameters: model.parameters,
                kpis: model
                    .kpis
                    .into_iter()
                    .map(|k| KpiEntry {
                        id: kpi_entry_id(),
                        model_data: k,
                    })
                    .collect(),
                settings: model.settings,
            },
        }
    }
}
