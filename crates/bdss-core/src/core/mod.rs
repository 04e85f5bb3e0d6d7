//! # Core Module
//!
//! The stateless foundation of the crate: the value vocabulary, the description of
//! the optimization problem, the contract stages implement, and persistence.
//!
//! - **Values and Slots** ([`data`]) - `DataValue`, `Slot`, and the slot annotations
//!   users attach to stage instances
//! - **Optimization Problem** ([`mco`]) - parameters, KPI specifications and the MCO model
//! - **Stage Contract** ([`stage`]) - the `DataSource`/`DataSourceFactory` traits and
//!   the `DataSourceModel` that configures a stage instance
//! - **Built-in Stages** ([`plugins`]) - arithmetic stages for analytic workflows
//! - **Persistence** ([`io`]) - reading and writing workflow files

pub mod data;
pub mod io;
pub mod mco;
pub mod plugins;
pub mod stage;
