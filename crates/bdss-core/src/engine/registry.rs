use crate::core::plugins::arithmetic::{ArithmeticFactory, ArithmeticKind};
use crate::core::stage::DataSourceFactory;
use crate::optimizer::mco::{AposterioriMcoFactory, McoFactory, WeightedMcoFactory};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Maps factory identifiers to the factories that build stages and MCO strategies.
///
/// The registry is populated explicitly by the host; discovery of plugins is not this
/// crate's concern.
#[derive(Default, Clone)]
pub struct FactoryRegistry {
    data_sources: HashMap<String, Arc<dyn DataSourceFactory>>,
    mcos: HashMap<String, Arc<dyn McoFactory>>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in arithmetic stages and both built-in MCOs.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for kind in ArithmeticKind::ALL {
            registry.register_data_source(Arc::new(ArithmeticFactory::new(kind)));
        }
        registry.register_mco(Arc::new(WeightedMcoFactory));
        registry.register_mco(Arc::new(AposterioriMcoFactory));
        registry
    }

    /// Registers a stage factory, replacing any factory with the same id.
    pub fn register_data_source(&mut self, factory: Arc<dyn DataSourceFactory>) {
        debug!(id = factory.id(), "Registering data source factory.");
        self.data_sources.insert(factory.id().to_string(), factory);
    }

    pub fn register_mco(&mut self, factory: Arc<dyn McoFactory>) {
        debug!(id = factory.id(), "Registering MCO factory.");
        self.mcos.insert(factory.id().to_string(), factory);
    }

    pub fn data_source(&self, id: &str) -> Option<&Arc<dyn DataSourceFactory>> {
        self.data_sources.get(id)
    }

    pub fn mco(&self, id: &str) -> Option<&Arc<dyn McoFactory>> {
        self.mcos.get(id)
    }

    pub fn data_source_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.data_sources.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn mco_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.mcos.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_register_every_arithmetic_stage_and_both_mcos() {
        let registry = FactoryRegistry::with_builtins();
        assert_eq!(
            registry.data_source_ids(),
            vec!["gaussian", "linear", "power", "product", "sum"]
        );
        assert_eq!(registry.mco_ids(), vec!["aposteriori", "weighted"]);
    }

    #[test]
    fn lookups_of_unknown_ids_return_none() {
        let registry = FactoryRegistry::new();
        assert!(registry.data_source("sum").is_none());
        assert!(registry.mco("weighted").is_none());
    }
}
