use crate::core::data::slot::Slot;
use crate::core::data::value::{DataValue, Value};
use crate::core::stage::{DataSource, DataSourceFactory, DataSourceModel, StageError};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};
use tracing::warn;

const DEFAULT_TYPE: &str = "NUMBER";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticKind {
    /// `n_inputs` values summed into one.
    Sum,
    /// `n_inputs` values multiplied into one.
    Product,
    /// `x ^ exponent`.
    Power,
    /// `slope * x + intercept`.
    Linear,
    /// `amplitude * exp(-(x - mean)^2 / (2 sigma^2))`.
    Gaussian,
}

impl ArithmeticKind {
    pub const ALL: [ArithmeticKind; 5] = [
        ArithmeticKind::Sum,
        ArithmeticKind::Product,
        ArithmeticKind::Power,
        ArithmeticKind::Linear,
        ArithmeticKind::Gaussian,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ArithmeticKind::Sum => "sum",
            ArithmeticKind::Product => "product",
            ArithmeticKind::Power => "power",
            ArithmeticKind::Linear => "linear",
            ArithmeticKind::Gaussian => "gaussian",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ArithmeticSettings {
    n_inputs: usize,
    output_type: String,
    exponent: f64,
    slope: f64,
    intercept: f64,
    amplitude: f64,
    mean: f64,
    sigma: f64,
}

impl Default for ArithmeticSettings {
    fn default() -> Self {
        Self {
            n_inputs: 2,
            output_type: DEFAULT_TYPE.to_string(),
            exponent: 2.0,
            slope: 1.0,
            intercept: 0.0,
            amplitude: 1.0,
            mean: 0.0,
            sigma: 1.0,
        }
    }
}

pub struct ArithmeticFactory {
    kind: ArithmeticKind,
}

impl ArithmeticFactory {
    pub fn new(kind: ArithmeticKind) -> Self {
        Self { kind }
    }
}

impl DataSourceFactory for ArithmeticFactory {
    fn id(&self) -> &str {
        self.kind.id()
    }

    fn default_settings(&self) -> Map<String, JsonValue> {
        let mut settings = Map::new();
        match self.kind {
            ArithmeticKind::Sum | ArithmeticKind::Product => {
                settings.insert("n_inputs".into(), json!(2));
            }
            ArithmeticKind::Power => {
                settings.insert("exponent".into(), json!(2.0));
            }
            ArithmeticKind::Linear => {
                settings.insert("slope".into(), json!(1.0));
                settings.insert("intercept".into(), json!(0.0));
            }
            ArithmeticKind::Gaussian => {
                settings.insert("amplitude".into(), json!(1.0));
                settings.insert("mean".into(), json!(0.0));
                settings.insert("sigma".into(), json!(1.0));
            }
        }
        settings
    }

    fn create_data_source(&self) -> Result<Box<dyn DataSource>, StageError> {
        Ok(Box::new(ArithmeticStage { kind: self.kind }))
    }
}

pub struct ArithmeticStage {
    kind: ArithmeticKind,
}

impl ArithmeticStage {
    fn n_inputs(&self, settings: &ArithmeticSettings) -> usize {
        match self.kind {
            ArithmeticKind::Sum | ArithmeticKind::Product => settings.n_inputs,
            _ => 1,
        }
    }

    fn settings(model: &DataSourceModel) -> ArithmeticSettings {
        model.settings_as().unwrap_or_else(|e| {
            warn!(stage = %model.id, error = %e, "Unreadable settings, declaring default slots.");
            ArithmeticSettings::default()
        })
    }
}

impl DataSource for ArithmeticStage {
    fn check_settings(&self, model: &DataSourceModel) -> Result<(), StageError> {
        model.settings_as::<ArithmeticSettings>().map(|_| ())
    }

    fn slots(&self, model: &DataSourceModel) -> (Vec<Slot>, Vec<Slot>) {
        let settings = Self::settings(model);
        let inputs = (0..self.n_inputs(&settings))
            .map(|i| Slot::new(DEFAULT_TYPE, format!("Operand {}", i + 1)))
            .collect();
        let outputs = vec![Slot::new(
            settings.output_type.clone(),
            format!("Result of {}", self.kind.id()),
        )];
        (inputs, outputs)
    }

    fn run(
        &mut self,
        model: &DataSourceModel,
        inputs: &[DataValue],
    ) -> Result<Vec<DataValue>, StageError> {
        let settings: ArithmeticSettings = model.settings_as()?;
        let operands = inputs
            .iter()
            .map(|dv| {
                dv.value.as_f64().ok_or_else(|| StageError::InvalidInput {
                    name: dv.name.clone(),
                    reason: format!("expected a number, got {}", dv.value),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let result = match self.kind {
            ArithmeticKind::Sum => operands.iter().sum(),
            ArithmeticKind::Product => operands.iter().product(),
            ArithmeticKind::Power => single(&operands)?.powf(settings.exponent),
            ArithmeticKind::Linear => settings.slope * single(&operands)? + settings.intercept,
            ArithmeticKind::Gaussian => {
                if settings.sigma <= 0.0 {
                    return Err(StageError::Settings(format!(
                        "sigma must be positive, got {}",
                        settings.sigma
                    )));
                }
                let d = single(&operands)? - settings.mean;
                settings.amplitude * (-(d * d) / (2.0 * settings.sigma * settings.sigma)).exp()
            }
        };

        Ok(vec![DataValue::unnamed(
            settings.output_type,
            Value::Float(result),
        )])
    }
}

fn single(operands: &[f64]) -> Result<f64, StageError> {
    match operands {
        [x] => Ok(*x),
        _ => Err(StageError::Failed(format!(
            "expected exactly one operand, got {}",
            operands.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(kind: ArithmeticKind, model: &DataSourceModel, xs: &[f64]) -> f64 {
        let factory = ArithmeticFactory::new(kind);
        let mut stage = factory.create_data_source().unwrap();
        let inputs: Vec<_> = xs
            .iter()
            .map(|&x| DataValue::new("x", DEFAULT_TYPE, Value::Float(x)))
            .collect();
        let out = stage.run(model, &inputs).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].name.is_empty());
        out[0].value.as_f64().unwrap()
    }

    #[test]
    fn sum_and_product_respect_n_inputs() {
        let model = DataSourceModel::new("sum").with_setting("n_inputs", json!(3));
        let stage = ArithmeticStage {
            kind: ArithmeticKind::Sum,
        };
        let (inputs, outputs) = stage.slots(&model);
        assert_eq!(inputs.len(), 3);
        assert_eq!(outputs.len(), 1);

        assert_eq!(run(ArithmeticKind::Sum, &model, &[1.0, 2.0, 3.0]), 6.0);
        assert_eq!(run(ArithmeticKind::Product, &model, &[2.0, 3.0, 4.0]), 24.0);
    }

    #[test]
    fn unary_stages_apply_their_settings() {
        let power = DataSourceModel::new("power").with_setting("exponent", json!(3.0));
        assert_eq!(run(ArithmeticKind::Power, &power, &[2.0]), 8.0);

        let linear = DataSourceModel::new("linear")
            .with_setting("slope", json!(2.0))
            .with_setting("intercept", json!(1.0));
        assert_eq!(run(ArithmeticKind::Linear, &linear, &[4.0]), 9.0);

        let gaussian = DataSourceModel::new("gaussian").with_setting("amplitude", json!(2.0));
        assert_eq!(run(ArithmeticKind::Gaussian, &gaussian, &[0.0]), 2.0);
    }

    #[test]
    fn malformed_settings_fail_the_check_but_keep_default_slots() {
        let stage = ArithmeticStage {
            kind: ArithmeticKind::Sum,
        };
        let model = DataSourceModel::new("sum").with_setting("n_inputs", json!("three"));

        assert!(matches!(
            stage.check_settings(&model),
            Err(StageError::Settings(_))
        ));
        assert_eq!(stage.slots(&model).0.len(), 2);

        let valid = DataSourceModel::new("sum").with_setting("n_inputs", json!(3));
        assert!(stage.check_settings(&valid).is_ok());
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        let mut stage = ArithmeticStage {
            kind: ArithmeticKind::Power,
        };
        let model = DataSourceModel::new("power");
        let inputs = vec![DataValue::new("x", "TEXT", Value::Text("abc".into()))];
        assert!(matches!(
            stage.run(&model, &inputs),
            Err(StageError::InvalidInput { .. })
        ));
    }

    #[test]
    fn create_model_carries_default_settings() {
        let model = ArithmeticFactory::new(ArithmeticKind::Power).create_model();
        assert_eq!(model.id, "power");
        assert_eq!(model.settings.get("exponent"), Some(&json!(2.0)));
    }
}
