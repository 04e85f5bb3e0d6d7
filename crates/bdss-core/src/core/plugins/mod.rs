//! # Built-in Plugins
//!
//! Small, dependency-free stages registered by
//! [`FactoryRegistry::with_builtins`](crate::engine::registry::FactoryRegistry::with_builtins).
//! They are enough to author analytic test problems and demonstrations without
//! linking any simulator.

pub mod arithmetic;
