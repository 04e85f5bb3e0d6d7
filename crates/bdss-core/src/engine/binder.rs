use crate::core::data::slot::{InputSlotInfo, Slot};
use crate::core::data::value::DataValue;
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    #[error(
        "Slot/slot-map length mismatch ({slots} slot(s), {slot_map} slot info(s)); the model is corrupted"
    )]
    LengthMismatch { slots: usize, slot_map: usize },

    #[error("Unable to find data value '{name}' among the available values {available:?}")]
    MissingValue {
        name: String,
        available: Vec<String>,
    },
}

/// Resolves a stage's inputs from the pool of available values by name.
///
/// The returned values follow the order of `slots`, which is the argument order the
/// stage expects, regardless of the order of `available_values`. When several pool
/// entries share a name, the one published last wins. No type coercion is performed.
pub fn bind(
    available_values: &[DataValue],
    slot_map: &[InputSlotInfo],
    slots: &[Slot],
) -> Result<Vec<DataValue>, BindingError> {
    if slot_map.len() != slots.len() {
        return Err(BindingError::LengthMismatch {
            slots: slots.len(),
            slot_map: slot_map.len(),
        });
    }

    let lookup: HashMap<&str, &DataValue> = available_values
        .iter()
        .map(|dv| (dv.name.as_str(), dv))
        .collect();

    slot_map
        .iter()
        .zip(slots)
        .map(|(info, slot)| {
            let value = lookup
                .get(info.name.as_str())
                .ok_or_else(|| BindingError::MissingValue {
                    name: info.name.clone(),
                    available: available_names(&lookup),
                })?;
            if !slot.data_type.is_empty() && value.data_type != slot.data_type {
                trace!(
                    name = %info.name,
                    expected = %slot.data_type,
                    actual = %value.data_type,
                    "Binding value with a type that differs from the slot declaration."
                );
            }
            Ok((*value).clone())
        })
        .collect()
}

fn available_names(lookup: &HashMap<&str, &DataValue>) -> Vec<String> {
    let mut names: Vec<String> = lookup.keys().map(|k| k.to_string()).collect();
    names.sort();
    names
}
