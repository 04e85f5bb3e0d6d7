use crate::core::data::value::Value;
use serde::{Deserialize, Serialize};

fn default_n_samples() -> usize {
    5
}

/// A parameter held constant during optimization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    pub value: Value,
}

/// A continuous scalar parameter bounded by `[lower_bound, upper_bound]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    pub initial_value: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    #[serde(default = "default_n_samples")]
    pub n_samples: usize,
}

/// A continuous vector parameter with componentwise bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedVectorParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    pub dimension: usize,
    pub initial_value: Vec<f64>,
    pub lower_bound: Vec<f64>,
    pub upper_bound: Vec<f64>,
    #[serde(default = "default_n_samples")]
    pub n_samples: usize,
}

/// An ordered, discrete numeric parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    pub levels: Vec<f64>,
}

/// An unordered choice among named categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    pub categories: Vec<String>,
}

/// An input of the workflow that an optimizer is allowed to vary.
///
/// Persisted as `{"id": <variant>, "model_data": {...fields...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "id", content = "model_data", rename_all = "snake_case")]
pub enum McoParameter {
    Fixed(FixedParameter),
    Ranged(RangedParameter),
    RangedVector(RangedVectorParameter),
    Listed(ListedParameter),
    Categorical(CategoricalParameter),
}

impl McoParameter {
    pub fn fixed(name: &str, data_type: &str, value: Value) -> Self {
        McoParameter::Fixed(FixedParameter {
            name: name.to_string(),
            data_type: data_type.to_string(),
            value,
        })
    }

    pub fn ranged(name: &str, data_type: &str, initial: f64, lower: f64, upper: f64) -> Self {
        McoParameter::Ranged(RangedParameter {
            name: name.to_string(),
            data_type: data_type.to_string(),
            initial_value: initial,
            lower_bound: lower,
            upper_bound: upper,
            n_samples: default_n_samples(),
        })
    }

    pub fn listed(name: &str, data_type: &str, levels: Vec<f64>) -> Self {
        McoParameter::Listed(ListedParameter {
            name: name.to_string(),
            data_type: data_type.to_string(),
            levels,
        })
    }

    pub fn categorical(name: &str, data_type: &str, categories: &[&str]) -> Self {
        McoParameter::Categorical(CategoricalParameter {
            name: name.to_string(),
            data_type: data_type.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            McoParameter::Fixed(p) => &p.name,
            McoParameter::Ranged(p) => &p.name,
            McoParameter::RangedVector(p) => &p.name,
            McoParameter::Listed(p) => &p.name,
            McoParameter::Categorical(p) => &p.name,
        }
    }

    pub fn data_type(&self) -> &str {
        match self {
            McoParameter::Fixed(p) => &p.data_type,
            McoParameter::Ranged(p) => &p.data_type,
            McoParameter::RangedVector(p) => &p.data_type,
            McoParameter::Listed(p) => &p.data_type,
            McoParameter::Categorical(p) => &p.data_type,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            McoParameter::Fixed(_) => "fixed",
            McoParameter::Ranged(_) => "ranged",
            McoParameter::RangedVector(_) => "ranged_vector",
            McoParameter::Listed(_) => "listed",
            McoParameter::Categorical(_) => "categorical",
        }
    }

    /// The value an optimizer starts from. For discrete parameters this is the
    /// first sample.
    pub fn initial_value(&self) -> Option<Value> {
        match self {
            McoParameter::Fixed(p) => Some(p.value.clone()),
            McoParameter::Ranged(p) => Some(Value::Float(p.initial_value)),
            McoParameter::RangedVector(p) => Some(Value::Vector(p.initial_value.clone())),
            McoParameter::Listed(_) | McoParameter::Categorical(_) => {
                self.sample_values().into_iter().next()
            }
        }
    }

    /// A finite discretization of the parameter's domain, used by space-agnostic
    /// optimizers such as grid search.
    pub fn sample_values(&self) -> Vec<Value> {
        match self {
            McoParameter::Fixed(p) => vec![p.value.clone()],
            McoParameter::Ranged(p) => linspace(p.lower_bound, p.upper_bound, p.n_samples)
                .into_iter()
                .map(Value::Float)
                .collect(),
            McoParameter::RangedVector(p) => {
                let columns: Vec<Vec<f64>> = p
                    .lower_bound
                    .iter()
                    .zip(&p.upper_bound)
                    .map(|(&lo, &hi)| linspace(lo, hi, p.n_samples))
                    .collect();
                (0..p.n_samples)
                    .map(|i| Value::Vector(columns.iter().map(|c| c[i]).collect()))
                    .collect()
            }
            McoParameter::Listed(p) => {
                let mut levels = p.levels.clone();
                levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                levels.into_iter().map(Value::Float).collect()
            }
            McoParameter::Categorical(p) => {
                p.categories.iter().cloned().map(Value::Text).collect()
            }
        }
    }

    /// Variant-specific consistency problems, one message per defect.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        match self {
            McoParameter::Fixed(_) => {}
            McoParameter::Ranged(p) => {
                if p.lower_bound > p.upper_bound {
                    problems.push(format!(
                        "Lower bound {} is greater than upper bound {}",
                        p.lower_bound, p.upper_bound
                    ));
                } else if p.initial_value < p.lower_bound || p.initial_value > p.upper_bound {
                    problems.push(format!(
                        "Initial value {} lies outside the bounds [{}, {}]",
                        p.initial_value, p.lower_bound, p.upper_bound
                    ));
                }
                if p.n_samples == 0 {
                    problems.push("Number of samples must be at least 1".to_string());
                }
            }
            McoParameter::RangedVector(p) => {
                let lengths = [p.initial_value.len(), p.lower_bound.len(), p.upper_bound.len()];
                if lengths.iter().any(|&len| len != p.dimension) {
                    problems.push(format!(
                        "Initial value and bounds must all have dimension {}",
                        p.dimension
                    ));
                } else if p
                    .lower_bound
                    .iter()
                    .zip(&p.upper_bound)
                    .any(|(lo, hi)| lo > hi)
                {
                    problems.push("Lower bound is greater than upper bound".to_string());
                } else if p
                    .initial_value
                    .iter()
                    .zip(p.lower_bound.iter().zip(&p.upper_bound))
                    .any(|(x, (lo, hi))| x < lo || x > hi)
                {
                    problems.push("Initial value lies outside the bounds".to_string());
                }
                if p.n_samples == 0 {
                    problems.push("Number of samples must be at least 1".to_string());
                }
            }
            McoParameter::Listed(p) => {
                if p.levels.is_empty() {
                    problems.push("Listed parameter has no levels".to_string());
                }
            }
            McoParameter::Categorical(p) => {
                if p.categories.is_empty() {
                    problems.push("Categorical parameter has no categories".to_string());
                }
            }
        }
        problems
    }
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranged_sample_values_are_evenly_spaced_and_inclusive() {
        let p = McoParameter::ranged("x", "LENGTH", 1.0, 0.0, 1.0);
        let samples: Vec<f64> = p.sample_values().iter().filter_map(Value::as_f64).collect();
        assert_eq!(samples, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn ranged_vector_samples_componentwise() {
        let p = McoParameter::RangedVector(RangedVectorParameter {
            name: "v".into(),
            data_type: "VEC".into(),
            dimension: 2,
            initial_value: vec![0.0, 0.0],
            lower_bound: vec![0.0, 10.0],
            upper_bound: vec![1.0, 20.0],
            n_samples: 3,
        });
        assert_eq!(
            p.sample_values(),
            vec![
                Value::Vector(vec![0.0, 10.0]),
                Value::Vector(vec![0.5, 15.0]),
                Value::Vector(vec![1.0, 20.0]),
            ]
        );
    }

    #[test]
    fn listed_samples_are_sorted_and_first_is_initial() {
        let p = McoParameter::listed("n", "COUNT", vec![3.0, 1.0, 2.0]);
        assert_eq!(
            p.sample_values(),
            vec![Value::Float(1.0), Value::Float(2.0), Value::Float(3.0)]
        );
        assert_eq!(p.initial_value(), Some(Value::Float(1.0)));
    }

    #[test]
    fn categorical_and_fixed_samples() {
        let c = McoParameter::categorical("solvent", "SOLVENT", &["water", "ethanol"]);
        assert_eq!(
            c.sample_values(),
            vec![Value::Text("water".into()), Value::Text("ethanol".into())]
        );
        let f = McoParameter::fixed("t", "TEMP", Value::Float(300.0));
        assert_eq!(f.sample_values(), vec![Value::Float(300.0)]);
    }

    #[test]
    fn problems_reports_each_ranged_defect() {
        let mut p = RangedParameter {
            name: "x".into(),
            data_type: "X".into(),
            initial_value: 5.0,
            lower_bound: 0.0,
            upper_bound: 1.0,
            n_samples: 0,
        };
        assert_eq!(McoParameter::Ranged(p.clone()).problems().len(), 2);
        p.initial_value = 0.5;
        p.n_samples = 3;
        assert!(McoParameter::Ranged(p).problems().is_empty());
    }

    #[test]
    fn persisted_form_uses_id_and_model_data() {
        let json = r#"{"id": "ranged", "model_data": {"name": "x", "type": "LENGTH",
            "initial_value": 0.5, "lower_bound": 0.0, "upper_bound": 1.0}}"#;
        let p: McoParameter = serde_json::from_str(json).unwrap();
        assert_eq!(p.name(), "x");
        assert_eq!(p.data_type(), "LENGTH");
        assert_eq!(p.kind(), "ranged");
        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["id"], "ranged");
        assert_eq!(back["model_data"]["n_samples"], 5);
    }
}
