use serde::{Deserialize, Serialize};

/// The shape of one positional input or output of a stage: a type key and a
/// human-readable description, but no name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Slot {
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub description: String,
}

impl Slot {
    pub fn new(data_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            description: description.into(),
        }
    }
}

/// User annotation naming the pool value bound to a positional input slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InputSlotInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
}

impl InputSlotInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: String::new(),
        }
    }

    pub fn with_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = data_type.into();
        self
    }
}

/// User annotation naming a positional output slot. An empty name discards the
/// value the stage returns for that slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputSlotInfo {
    #[serde(default)]
    pub name: String,
}

impl OutputSlotInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn discarded() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_discarded(&self) -> bool {
        self.name.is_empty()
    }
}
