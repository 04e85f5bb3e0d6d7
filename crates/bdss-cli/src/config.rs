use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use bdss::core::mco::model::McoModel;
use bdss::optimizer::config::{OptimizerKind, SpaceSearchMode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// MCO settings as written in a run configuration. Keys are kebab-case in TOML and are
/// stored snake_case in the model settings.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(
    deny_unknown_fields,
    rename_all(deserialize = "kebab-case", serialize = "snake_case")
)]
pub struct PartialMcoSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_points: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_search_mode: Option<SpaceSearchMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_zero_weights: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirichlet_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimizer: Option<OptimizerKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose_run: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialRunConfig {
    pub mco: Option<PartialMcoSettings>,
}

impl PartialRunConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading run configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

/// Builds the MCO settings for a run: config file first, then `-S` overrides, then
/// dedicated flags.
pub fn build_mco_settings(args: &RunArgs) -> Result<PartialMcoSettings> {
    let file_config = match &args.config {
        Some(path) => PartialRunConfig::from_file(path)?,
        None => PartialRunConfig::default(),
    };

    let mut settings = file_config.mco.unwrap_or_default();
    apply_set_values(&mut settings, &args.set_values)?;

    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    if let Some(num_points) = args.num_points {
        settings.num_points = Some(num_points);
    }
    Ok(settings)
}

fn apply_set_values(settings: &mut PartialMcoSettings, set_values: &[String]) -> Result<()> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "mco.num-points" => settings.num_points = Some(parse_value(key, value_str)?),
            "mco.space-search-mode" => {
                settings.space_search_mode = Some(parse_keyword(key, value_str)?)
            }
            "mco.include-zero-weights" => {
                settings.include_zero_weights = Some(parse_value(key, value_str)?)
            }
            "mco.dirichlet-alpha" => settings.dirichlet_alpha = Some(parse_value(key, value_str)?),
            "mco.optimizer" => settings.optimizer = Some(parse_keyword(key, value_str)?),
            "mco.max-iterations" => settings.max_iterations = Some(parse_value(key, value_str)?),
            "mco.budget" => settings.budget = Some(parse_value(key, value_str)?),
            "mco.seed" => settings.seed = Some(parse_value(key, value_str)?),
            "mco.verbose-run" => settings.verbose_run = Some(parse_value(key, value_str)?),
            _ => {
                return Err(CliError::Config(format!(
                    "Unknown configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(())
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_keyword<T: DeserializeOwned>(key: &str, value: &str) -> Result<T> {
    serde_json::from_value(JsonValue::String(value.replace('-', "_")))
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

/// Writes every set field into the model settings, replacing values from the workflow file.
pub fn apply_to_model(settings: &PartialMcoSettings, model: &mut McoModel) -> Result<()> {
    let JsonValue::Object(map) =
        serde_json::to_value(settings).map_err(|e| CliError::Other(e.into()))?
    else {
        return Err(CliError::Config(
            "MCO settings did not serialize to a table".to_string(),
        ));
    };
    for (key, value) in map {
        debug!(key = %key, value = %value, "Overriding MCO setting.");
        model.settings.insert(key, value);
    }
    Ok(())
}
