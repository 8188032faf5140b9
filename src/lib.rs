//! Routing engine library: tick math, swap simulation, pool graph,
//! pathfinding, route evaluation, split optimization, quote caching and
//! the router facade that ties them together, plus the ambient HTTP,
//! metrics, ingestion and config surfaces that turn the core into a
//! runnable service.

pub mod cache;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod facade;
pub mod graph;
pub mod http;
pub mod ingestion;
pub mod metrics;
pub mod optimizer;
pub mod pathfinder;
pub mod swap;
pub mod tick_math;
pub mod types;

pub use config::Config;
pub use error::{RouterError, RouterResult, SimResult, SimulationError};
pub use facade::{QuoteRequest, QuoteResult, Router};
pub use graph::PoolGraph;
