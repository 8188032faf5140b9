//! Request/response wire types for the HTTP surface.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::types::{Hop, Route, SplitQuote};

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    pub max_hops: Option<usize>,
    pub max_splits: Option<usize>,
}

fn default_slippage_bps() -> u32 {
    50
}

#[derive(Debug, Serialize)]
pub struct HopDto {
    pub pool_id: String,
    pub zero_for_one: bool,
    pub amount_in: String,
    pub amount_out: String,
    pub price_impact: f64,
    pub gas_estimate: u64,
}

impl From<&Hop> for HopDto {
    fn from(hop: &Hop) -> Self {
        Self {
            pool_id: format!("{:#x}", hop.pool_id),
            zero_for_one: hop.zero_for_one,
            amount_in: hop.amount_in.to_string(),
            amount_out: hop.amount_out.to_string(),
            price_impact: hop.price_impact,
            gas_estimate: hop.gas_estimate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RouteDto {
    pub hops: Vec<HopDto>,
    pub amount_in: String,
    pub amount_out: String,
    pub amount_out_min: String,
    pub price_impact: f64,
    pub gas_estimate: u64,
    pub path: String,
}

impl From<&Route> for RouteDto {
    fn from(route: &Route) -> Self {
        Self {
            hops: route.hops.iter().map(HopDto::from).collect(),
            amount_in: route.amount_in.to_string(),
            amount_out: route.amount_out.to_string(),
            amount_out_min: route.amount_out_min.to_string(),
            price_impact: route.price_impact,
            gas_estimate: route.gas_estimate,
            path: route.path_string.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SplitLegDto {
    pub weight: f64,
    pub route: RouteDto,
}

/// Shape of the `quote` object per §6: top-level `route`/`route_string`/
/// `price_impact` describe the highest-weighted leg (the only leg, when
/// the request wasn't split); `splits` is present only when more than
/// one path was chosen, carrying every leg with its own weight.
#[derive(Debug, Serialize)]
pub struct QuoteDto {
    pub amount_in: String,
    pub amount_out: String,
    pub amount_out_min: String,
    pub price_impact: f64,
    pub gas_estimate: u64,
    pub route_string: String,
    pub route: Vec<HopDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub splits: Option<Vec<SplitLegDto>>,
}

impl From<&SplitQuote> for QuoteDto {
    fn from(quote: &SplitQuote) -> Self {
        let (_, primary) = quote
            .legs
            .iter()
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
            .expect("a SplitQuote always carries at least one leg");

        let price_impact: f64 = quote.legs.iter().map(|(weight, route)| weight * route.price_impact).sum();

        let splits = quote.is_split().then(|| {
            quote
                .legs
                .iter()
                .map(|(weight, route)| SplitLegDto { weight: *weight, route: RouteDto::from(route) })
                .collect()
        });

        Self {
            amount_in: quote.amount_in.to_string(),
            amount_out: quote.amount_out.to_string(),
            amount_out_min: quote.amount_out_min.to_string(),
            price_impact,
            gas_estimate: quote.gas_estimate,
            route_string: primary.path_string.clone(),
            route: primary.hops.iter().map(HopDto::from).collect(),
            splits,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote: QuoteDto,
    pub timestamp: u64,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GraphStatsDto {
    pub token_count: usize,
    pub pool_count: usize,
    pub last_update_unix_seconds: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
    pub graph_stats: GraphStatsDto,
}
