//! # Data Module
//!
//! The typed-named-value vocabulary shared by every other part of the crate.
//!
//! - [`value`] - [`DataValue`](value::DataValue), the unit of data flowing between stages,
//!   and its untyped payload [`Value`](value::Value).
//! - [`slot`] - positional, unnamed [`Slot`](slot::Slot) declarations made by stage
//!   implementations and the per-workflow annotations that give them names.

pub mod slot;
pub mod value;
