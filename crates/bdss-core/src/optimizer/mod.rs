//! # Optimizer Module
//!
//! The optimizer-engine framework that drives repeated workflow evaluations.
//!
//! An engine owns the search space (the MCO parameters), the objectives (the KPI
//! specifications) and an [`Evaluator`](crate::engine::evaluator::Evaluator). Every
//! engine minimizes: KPIs that are not minimised are negated by
//! [`BaseEngine::minimization_score`](base::BaseEngine::minimization_score) before a
//! backend sees them, and reported points always carry the raw KPI values.
//!
//! - **Base Engine** ([`base`]) - Scoring, sign convention and the lazy run state machine
//! - **Weighted Engine** ([`weighted`]) - Weighted-sum scalarization with Sen's scaling
//! - **A-posteriori Engine** ([`aposteriori`]) - Direct Pareto-front search
//! - **Space Sampling** ([`space_sampling`]) - Simplex weight-vector generators
//! - **Backends** ([`backends`]) - Nelder-Mead, random search and grid search adapters
//! - **Configuration** ([`config`]) - Engine settings and their builders
//! - **MCO Strategies** ([`mco`]) - Factories selected by a workflow's MCO model id

pub mod aposteriori;
pub mod backends;
pub mod base;
pub mod config;
pub mod mco;
pub mod pareto;
pub mod space_sampling;
pub mod weighted;
