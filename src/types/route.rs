//! Route, hop and split-quote data model.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::types::pool::PoolId;

/// A single pool traversal within a multi-pool path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hop {
    pub pool_id: PoolId,
    pub zero_for_one: bool,
    pub amount_in: U256,
    pub amount_out: U256,
    /// Fraction: (pre_mid_price - execution_price) / pre_mid_price.
    pub price_impact: f64,
    pub sqrt_price_after: U256,
    pub gas_estimate: u64,
}

/// An ordered list of >=1 hops realizing a quote from one input token
/// to one output token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub hops: Vec<Hop>,
    pub amount_in: U256,
    pub amount_out: U256,
    pub amount_out_min: U256,
    pub price_impact: f64,
    pub gas_estimate: u64,
    pub path_string: String,
}

impl Route {
    /// Apply a slippage tolerance (basis points) to compute the minimum
    /// acceptable output for this route, and populate `amount_out_min`.
    pub fn with_slippage(mut self, slippage_bps: u32) -> Self {
        let bps = U256::from(slippage_bps as u64);
        let denom = U256::from(10_000u64);
        let shortfall = (self.amount_out * bps) / denom;
        self.amount_out_min = self.amount_out.saturating_sub(shortfall);
        self
    }

    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }
}

/// An unordered set of routes sharing the same (token_in, token_out);
/// the sum of hop-0 inputs equals the request amount and the sum of
/// hop-last outputs equals the total output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitQuote {
    /// Each entry is (weight as a fraction of the total input, route).
    pub legs: Vec<(f64, Route)>,
    pub amount_in: U256,
    pub amount_out: U256,
    pub amount_out_min: U256,
    pub gas_estimate: u64,
}

impl SplitQuote {
    pub fn single(route: Route) -> Self {
        Self {
            amount_in: route.amount_in,
            amount_out: route.amount_out,
            amount_out_min: route.amount_out_min,
            gas_estimate: route.gas_estimate,
            legs: vec![(1.0, route)],
        }
    }

    pub fn is_split(&self) -> bool {
        self.legs.len() > 1
    }
}
