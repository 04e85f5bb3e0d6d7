//! Test fixtures shared by the engine, optimizer and workflow tests.

use crate::core::data::slot::Slot;
use crate::core::data::value::{DataValue, Value};
use crate::core::stage::{DataSource, DataSourceFactory, DataSourceModel, StageError};
use crate::engine::registry::FactoryRegistry;
use std::sync::Arc;

/// Declares `n_out` output slots and no inputs, but returns `returned`.
pub struct FixedOutputFactory {
    pub id: &'static str,
    pub n_out: usize,
    pub returned: Vec<f64>,
}

impl FixedOutputFactory {
    pub fn new(id: &'static str, returned: Vec<f64>) -> Self {
        Self {
            id,
            n_out: returned.len(),
            returned,
        }
    }
}

struct FixedOutputStage {
    n_out: usize,
    returned: Vec<f64>,
}

impl DataSource for FixedOutputStage {
    fn slots(&self, _: &DataSourceModel) -> (Vec<Slot>, Vec<Slot>) {
        (vec![], (0..self.n_out).map(|_| Slot::new("N", "")).collect())
    }

    fn run(&mut self, _: &DataSourceModel, _: &[DataValue]) -> Result<Vec<DataValue>, StageError> {
        Ok(self
            .returned
            .iter()
            .map(|v| DataValue::unnamed("N", Value::Float(*v)))
            .collect())
    }
}

impl DataSourceFactory for FixedOutputFactory {
    fn id(&self) -> &str {
        self.id
    }

    fn create_data_source(&self) -> Result<Box<dyn DataSource>, StageError> {
        Ok(Box::new(FixedOutputStage {
            n_out: self.n_out,
            returned: self.returned.clone(),
        }))
    }
}

/// A factory whose stages can never be created.
pub struct BrokenFactory;

impl DataSourceFactory for BrokenFactory {
    fn id(&self) -> &str {
        "broken"
    }

    fn create_data_source(&self) -> Result<Box<dyn DataSource>, StageError> {
        Err(StageError::Failed("no licence".into()))
    }
}

/// A stage whose `run` always fails.
pub struct FailingFactory;

struct FailingStage;

impl DataSource for FailingStage {
    fn slots(&self, _: &DataSourceModel) -> (Vec<Slot>, Vec<Slot>) {
        (vec![], vec![Slot::new("N", "")])
    }

    fn run(&mut self, _: &DataSourceModel, _: &[DataValue]) -> Result<Vec<DataValue>, StageError> {
        Err(StageError::Failed("simulation diverged".into()))
    }
}

impl DataSourceFactory for FailingFactory {
    fn id(&self) -> &str {
        "failing"
    }

    fn create_data_source(&self) -> Result<Box<dyn DataSource>, StageError> {
        Ok(Box::new(FailingStage))
    }
}

/// Built-in registry plus every fixture above.
pub fn test_registry() -> FactoryRegistry {
    let mut registry = FactoryRegistry::with_builtins();
    registry.register_data_source(Arc::new(FixedOutputFactory::new(
        "three_outputs",
        vec![99.0, 1.0, 100.0],
    )));
    registry.register_data_source(Arc::new(BrokenFactory));
    registry.register_data_source(Arc::new(FailingFactory));
    registry
}

pub fn number(name: &str, value: f64) -> DataValue {
    DataValue::new(name, "NUMBER", Value::Float(value))
}
