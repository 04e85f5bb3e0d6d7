use serde::{Deserialize, Serialize};
use std::fmt;

/// The payload carried by a [`DataValue`].
///
/// Stages agree on the meaning of a value through its `data_type` key, not through
/// the variant used here; no coercion is ever performed by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vector(Vec<f64>),
}

impl Value {
    /// Returns the value as a float if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[f64]> {
        match self {
            Value::Vector(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Parses a whitespace-free token as typed by a user: integers, then floats,
    /// then booleans, otherwise text.
    pub fn parse_token(token: &str) -> Self {
        if let Ok(v) = token.parse::<i64>() {
            Value::Int(v)
        } else if let Ok(v) = token.parse::<f64>() {
            Value::Float(v)
        } else if let Ok(v) = token.parse::<bool>() {
            Value::Bool(v)
        } else {
            Value::Text(token.to_string())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v),
            Value::Vector(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", x)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<f64>> for Value {
    fn from(v: Vec<f64>) -> Self {
        Value::Vector(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Quality {
    High,
    #[default]
    Average,
    Poor,
}

/// A named, typed value produced by a stage or by binding an MCO parameter.
///
/// Within one evaluation a `DataValue` is never mutated after it has been published
/// to the value pool; the only rewrite the engine performs is assigning the
/// user-chosen output name to a freshly returned value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValue {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
    #[serde(default)]
    pub quality: Quality,
}

impl DataValue {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            value,
            uncertainty: None,
            quality: Quality::default(),
        }
    }

    /// Creates an unnamed value, as stages do before the engine assigns output names.
    pub fn unnamed(data_type: impl Into<String>, value: Value) -> Self {
        Self::new(String::new(), data_type, value)
    }

    pub fn with_uncertainty(mut self, uncertainty: f64) -> Self {
        self.uncertainty = Some(uncertainty);
        self
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.data_type, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_f64_accepts_integers_and_floats_only() {
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert_eq!(Value::Text("x".into()).as_f64(), None);
        assert_eq!(Value::Vector(vec![1.0]).as_f64(), None);
    }

    #[test]
    fn parse_token_prefers_integers_then_floats_then_booleans() {
        assert_eq!(Value::parse_token("7"), Value::Int(7));
        assert_eq!(Value::parse_token("7.5"), Value::Float(7.5));
        assert_eq!(Value::parse_token("true"), Value::Bool(true));
        assert_eq!(Value::parse_token("eggs"), Value::Text("eggs".into()));
    }

    #[test]
    fn untagged_deserialization_keeps_integer_and_float_apart() {
        let values: Vec<Value> = serde_json::from_str(r#"[10, 10.5, "a", [1.0, 2.0], false]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Int(10),
                Value::Float(10.5),
                Value::Text("a".into()),
                Value::Vector(vec![1.0, 2.0]),
                Value::Bool(false),
            ]
        );
    }

    #[test]
    fn data_value_defaults_to_average_quality_without_uncertainty() {
        let dv = DataValue::new("pressure", "PRESSURE", Value::Float(1.0));
        assert_eq!(dv.quality, Quality::Average);
        assert!(dv.uncertainty.is_none());
    }

    #[test]
    fn data_value_deserializes_with_type_key() {
        let dv: DataValue =
            serde_json::from_str(r#"{"name": "x", "type": "LENGTH", "value": 2, "quality": "HIGH"}"#)
                .unwrap();
        assert_eq!(dv.data_type, "LENGTH");
        assert_eq!(dv.value, Value::Int(2));
        assert_eq!(dv.quality, Quality::High);
    }

    #[test]
    fn display_formats_vectors_as_lists() {
        let dv = DataValue::new("v", "VEC", Value::Vector(vec![1.0, 2.5]));
        assert_eq!(dv.to_string(), "v (VEC): [1, 2.5]");
    }
}
