//! Route evaluator: drives the swap simulator hop-by-hop over a
//! candidate path, threading each hop's output into the next hop's
//! input.
//!
//! Evaluation of independent paths is embarrassingly parallel (no
//! shared mutation, only shared graph reads) — above
//! `parallel_eval_threshold` candidates, `evaluate_all` dispatches
//! across scoped threads; below it, sequential evaluation avoids
//! thread-switch overhead, per the spec's stated trade-off.

use alloy_primitives::{Address, U256};

use crate::graph::PoolGraph;
use crate::swap::{self, GasParams};
use crate::tick_math;
use crate::types::pool::PoolId;
use crate::types::{Hop, Route};

#[derive(Clone, Copy)]
pub struct EvaluatorParams<'a> {
    pub graph: &'a PoolGraph,
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub slippage_bps: u32,
    pub gas: GasParams,
    /// A hop whose simulated fill is below this fraction of its intended
    /// input causes the whole path to be discarded.
    pub min_fill_fraction: f64,
}

impl<'a> EvaluatorParams<'a> {
    pub fn with_amount(&self, amount_in: U256) -> Self {
        Self { amount_in, ..*self }
    }
}

/// Simulate every hop of `path` in sequence. Returns `None` if any hop
/// fails (uninitialized pool, numeric overflow, a partial fill below
/// `min_fill_fraction`) or the path doesn't land on `token_out`.
pub fn evaluate_path(path: &[PoolId], params: &EvaluatorParams) -> Option<Route> {
    if path.is_empty() || params.amount_in.is_zero() {
        return None;
    }

    let mut hops = Vec::with_capacity(path.len());
    let mut current_token = params.token_in;
    let mut current_amount = params.amount_in;
    let mut total_gas: u64 = 0;
    let mut path_tokens = vec![params.token_in];

    for &pool_id in path {
        let pool = params.graph.pool_snapshot(pool_id)?;
        let zero_for_one = pool.zero_for_one(current_token)?;
        let limit = tick_math::price_limit(zero_for_one, pool.sqrt_price_x96, params.slippage_bps).ok()?;

        let result = swap::simulate_exact_input(&pool, zero_for_one, current_amount, limit, params.gas).ok()?;

        if !result.remaining_in.is_zero() {
            let requested = swap::u256_to_f64(current_amount);
            let filled = swap::u256_to_f64(result.amount_in_used);
            let filled_fraction = if requested > 0.0 { filled / requested } else { 0.0 };
            if filled_fraction < params.min_fill_fraction {
                return None;
            }
        }

        let pre_mid_price = swap::sqrt_price_to_price_f64(pool.sqrt_price_x96);
        let post_price = swap::sqrt_price_to_price_f64(result.new_sqrt_price);
        // `pre_mid_price`/`post_price` are token1-per-token0; flip to the
        // hop's own input-denominated price so `price_impact` is always a
        // fraction of "how much worse did I do than the mid price".
        let price_impact = if pre_mid_price > 0.0 {
            if zero_for_one {
                ((pre_mid_price - post_price) / pre_mid_price).abs()
            } else {
                let pre_inv = 1.0 / pre_mid_price;
                let post_inv = 1.0 / post_price;
                ((pre_inv - post_inv) / pre_inv).abs()
            }
        } else {
            0.0
        };

        let next_token = pool.other_token(current_token)?;
        hops.push(Hop {
            pool_id,
            zero_for_one,
            amount_in: result.amount_in_used,
            amount_out: result.amount_out,
            price_impact,
            sqrt_price_after: result.new_sqrt_price,
            gas_estimate: result.gas_estimate,
        });
        total_gas += result.gas_estimate;
        current_token = next_token;
        current_amount = result.amount_out;
        path_tokens.push(current_token);

        if current_amount.is_zero() {
            return None;
        }
    }

    if current_token != params.token_out {
        return None;
    }

    let amount_out = current_amount;
    let total_price_impact: f64 = hops.iter().map(|h| h.price_impact).sum();
    let path_string = path_tokens
        .iter()
        .map(|a| format!("{a:#x}"))
        .collect::<Vec<_>>()
        .join(" \u{2192} ");

    let route = Route {
        hops,
        amount_in: params.amount_in,
        amount_out,
        amount_out_min: U256::ZERO,
        price_impact: total_price_impact,
        gas_estimate: total_gas,
        path_string,
    }
    .with_slippage(params.slippage_bps);

    Some(route)
}

/// Evaluate every candidate path, sequentially below
/// `parallel_threshold` and across scoped worker threads above it.
/// Returns the path alongside its route so callers (the split
/// optimizer) can re-simulate the same path at a different amount.
pub fn evaluate_all(
    paths: &[Vec<PoolId>],
    params: &EvaluatorParams,
    parallel_threshold: usize,
) -> Vec<(Vec<PoolId>, Route)> {
    let eval_one = |path: &Vec<PoolId>| evaluate_path(path, params).map(|r| (path.clone(), r));

    if paths.len() < parallel_threshold {
        return paths.iter().filter_map(eval_one).collect();
    }

    std::thread::scope(|scope| {
        let handles: Vec<_> = paths.iter().map(|path| scope.spawn(|| eval_one(path))).collect();
        handles.into_iter().filter_map(|h| h.join().ok().flatten()).collect()
    })
}

/// Highest output wins; ties broken by lower gas estimate.
pub fn best_route<'a>(routes: impl IntoIterator<Item = &'a Route>) -> Option<&'a Route> {
    routes
        .into_iter()
        .max_by(|a, b| a.amount_out.cmp(&b.amount_out).then_with(|| b.gas_estimate.cmp(&a.gas_estimate)))
}
