//! Error taxonomy for the routing engine.
//!
//! Mirrors the failure taxonomy: input errors, structural failures,
//! timeout, numeric faults, graph-state faults and cache-internal
//! errors. Only facade-level errors ever reach a caller; simulator and
//! graph-state faults are handled locally by discarding the offending
//! candidate path.

use alloy_primitives::Address;
use thiserror::Error;

/// Errors surfaced by the router facade to its callers (HTTP layer or
/// any other embedder).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("unknown token: {0}")]
    UnknownToken(Address),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("parameter {name} out of range: {value}")]
    OutOfRangeParameter { name: &'static str, value: String },

    #[error("no route found from {from} to {to}")]
    NoRouteFound { from: Address, to: Address },

    #[error("insufficient liquidity for requested amount")]
    InsufficientLiquidity,

    #[error("request deadline exceeded")]
    Timeout,

    #[error("graph is degraded: last update {age_seconds}s ago")]
    Degraded { age_seconds: u64 },

    #[error("graph has no pools loaded yet")]
    GraphCold,

    #[error("internal error: {0}")]
    Internal(String),
}

impl RouterError {
    /// HTTP status code this error maps to, per the response table.
    pub fn status_code(&self) -> u16 {
        match self {
            RouterError::UnknownToken(_)
            | RouterError::InvalidAmount(_)
            | RouterError::OutOfRangeParameter { .. }
            | RouterError::InsufficientLiquidity => 400,
            RouterError::NoRouteFound { .. } => 404,
            RouterError::Timeout => 408,
            RouterError::Degraded { .. } | RouterError::GraphCold => 503,
            RouterError::Internal(_) => 500,
        }
    }

    /// Machine-readable error kind for the JSON error body.
    pub fn kind(&self) -> &'static str {
        match self {
            RouterError::UnknownToken(_) => "UnknownToken",
            RouterError::InvalidAmount(_) => "InvalidAmount",
            RouterError::OutOfRangeParameter { .. } => "OutOfRangeParameter",
            RouterError::NoRouteFound { .. } => "NoRouteFound",
            RouterError::InsufficientLiquidity => "InsufficientLiquidity",
            RouterError::Timeout => "Timeout",
            RouterError::Degraded { .. } => "Degraded",
            RouterError::GraphCold => "GraphCold",
            RouterError::Internal(_) => "InternalError",
        }
    }
}

/// Local failures from the swap simulator. Never surfaced directly to
/// a caller — the evaluator discards the candidate path and logs a
/// numeric fault if one occurred.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("pool not initialized")]
    PoolNotInitialized,

    #[error("numeric overflow in swap step computation")]
    NumericOverflow,

    #[error("tick {0} out of bounds")]
    TickOutOfBounds(i32),

    #[error("sqrt price out of bounds")]
    SqrtPriceOutOfBounds,
}

pub type RouterResult<T> = Result<T, RouterError>;
pub type SimResult<T> = Result<T, SimulationError>;
