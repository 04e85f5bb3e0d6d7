//! # Engine Module
//!
//! The stateful machinery that turns a [`Workflow`](workflow::Workflow) description
//! into KPI values.
//!
//! ## Overview
//!
//! A workflow evaluation starts from the values of one parameter point and runs the
//! execution layers in order. Every stage of a layer is instantiated through the
//! [`FactoryRegistry`](registry::FactoryRegistry), its inputs are bound by name from the
//! values published so far, and its renamed outputs are appended to the pool seen by
//! later layers. The requested KPIs are finally read from that pool.
//!
//! ## Architecture
//!
//! - **Slot Binder** ([`binder`]) - Resolves a stage's positional inputs by name
//! - **Execution Layers** ([`layer`]) - Runs the stages of one layer against a shared pool
//! - **Workflow** ([`workflow`]) - Chains layers and aggregates KPIs
//! - **Verifier** ([`verifier`]) - Collects structural problems before anything runs
//! - **Evaluator Bridge** ([`evaluator`]) - The point-to-KPIs function used by optimizers
//! - **Events and Control** ([`events`], [`control`]) - Listener callbacks and pause/stop flags
//! - **Error Handling** ([`error`]) - Runtime errors fatal to an evaluation

pub mod binder;
pub mod control;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod layer;
pub mod registry;
pub mod verifier;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
