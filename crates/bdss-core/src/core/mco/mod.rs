//! # MCO Module
//!
//! Declarative description of a multi-criteria optimization problem: the input
//! parameters an optimizer may vary ([`parameter`]), the KPIs it optimizes ([`kpi`]),
//! and the model tying both to an optimizer strategy ([`model`]).

pub mod kpi;
pub mod model;
pub mod parameter;
