//! # BDSS Core Library
//!
//! The execution and optimization core of a decision-support workflow engine. A workflow
//! is a sequence of execution layers whose stages turn a point in parameter space into
//! key performance indicators (KPIs); multi-criteria optimizers search that space for
//! the best trade-offs between the KPIs.
//!
//! ## Architectural Philosophy
//!
//! The library follows a layered architecture so that the data model, the execution
//! machinery and the optimizers can be tested and extended independently.
//!
//! - **[`core`]: The Foundation.** Stateless data models: values and slots, MCO
//!   parameters and KPI specifications, the stage plugin contract, the built-in
//!   arithmetic stages and the persisted workflow format.
//!
//! - **[`engine`]: The Execution Core.** Binds stage inputs by name, runs execution
//!   layers in order, aggregates KPIs, verifies workflows before they run and bridges
//!   evaluations to optimizers through the [`Evaluator`](engine::evaluator::Evaluator)
//!   trait.
//!
//! - **[`optimizer`]: The Optimizer Engines.** Weighted-sum scalarization with Sen's
//!   scaling, a-posteriori Pareto search, simplex weight samplers and the backend
//!   adapters they drive.
//!
//! - **[`workflows`]: The Public API.** End-to-end entry points that verify a workflow,
//!   select its MCO strategy from the registry and report results as events.

pub mod core;
pub mod engine;
pub mod optimizer;
pub mod workflows;
