//! Split optimizer: partitions the input amount across up to `S`
//! candidate paths to maximize total output under the simulator's
//! concave, non-linear response.
//!
//! Concavity (diminishing returns as a swap consumes tick liquidity)
//! means a golden-section search over the split ratio converges to the
//! optimum for two paths; for more than two, this module runs a
//! cyclic-coordinate-ascent pass over adjacent pairs in ranked order,
//! each pass itself a golden-section search — the "fix all but one,
//! re-optimize with the 2-split method" scheme the spec describes,
//! applied pairwise rather than one-vs-the-rest (see `DESIGN.md` for why
//! that reading was chosen).

use alloy_primitives::{U256, U512};

use crate::evaluator::{self, EvaluatorParams};
use crate::swap;
use crate::types::pool::PoolId;
use crate::types::{Route, SplitQuote};

const TOLERANCE: f64 = 1e-4;
const CONVERGENCE_BPS: f64 = 3e-4;
const MAX_COORD_ITERATIONS: usize = 8;
/// `2 - phi`, the golden-section search step fraction.
const RESPHI: f64 = 0.381_966_011_250_105;
const FRACTION_SCALE: u64 = 1_000_000_000;

/// `amount * round(fraction * FRACTION_SCALE) / FRACTION_SCALE`, widened
/// through `U512` (the same `mulDiv` shape `swap::mul_div` uses) so an
/// `amount_in` near `U256::MAX` can't overflow the intermediate product.
fn scale_amount(amount: U256, fraction: f64) -> U256 {
    let f = fraction.clamp(0.0, 1.0);
    let scaled = (f * FRACTION_SCALE as f64).round() as u64;
    let product = U512::from(amount) * U512::from(scaled);
    let divided = product / U512::from(FRACTION_SCALE);
    U256::try_from(divided).unwrap_or(amount)
}

/// Maximize `f` over `[0, 1]`, assuming `f` is unimodal (concave), to a
/// tolerance of `TOLERANCE` in the search variable.
fn golden_section_max<F: Fn(f64) -> f64>(f: F) -> f64 {
    let (mut lo, mut hi) = (0.0f64, 1.0f64);
    let mut x1 = lo + RESPHI * (hi - lo);
    let mut x2 = hi - RESPHI * (hi - lo);
    let mut f1 = f(x1);
    let mut f2 = f(x2);
    while hi - lo > TOLERANCE {
        if f1 > f2 {
            hi = x2;
            x2 = x1;
            f2 = f1;
            x1 = lo + RESPHI * (hi - lo);
            f1 = f(x1);
        } else {
            lo = x1;
            x1 = x2;
            f1 = f2;
            x2 = hi - RESPHI * (hi - lo);
            f2 = f(x2);
        }
    }
    (lo + hi) / 2.0
}

fn total_output(paths: &[&Vec<PoolId>], amounts: &[U256], params: &EvaluatorParams) -> Option<U256> {
    let mut total = U256::ZERO;
    for (path, &amount) in paths.iter().zip(amounts) {
        if amount.is_zero() {
            continue;
        }
        let route = evaluator::evaluate_path(path, &params.with_amount(amount))?;
        total = total.checked_add(route.amount_out)?;
    }
    Some(total)
}

/// Cyclic coordinate ascent over the weights of `paths` (each a fraction
/// of `params.amount_in`). Converges when total output stabilizes within
/// `CONVERGENCE_BPS` or after `MAX_COORD_ITERATIONS` passes.
fn optimize_weights(paths: &[&Vec<PoolId>], params: &EvaluatorParams) -> Vec<f64> {
    let k = paths.len();
    let mut weights = vec![1.0 / k as f64; k];
    let mut prev_total: Option<U256> = None;

    for _ in 0..MAX_COORD_ITERATIONS {
        for i in 0..k {
            let j = (i + 1) % k;
            if i == j {
                break;
            }
            let pair_total = weights[i] + weights[j];
            if pair_total <= 0.0 {
                continue;
            }
            let r = golden_section_max(|r| {
                let amt_i = scale_amount(params.amount_in, r * pair_total);
                let amt_j = scale_amount(params.amount_in, (1.0 - r) * pair_total);
                let out = total_output(&[paths[i], paths[j]], &[amt_i, amt_j], params).unwrap_or_default();
                swap::u256_to_f64(out)
            });
            weights[i] = r * pair_total;
            weights[j] = (1.0 - r) * pair_total;
        }

        let amounts: Vec<U256> = weights.iter().map(|w| scale_amount(params.amount_in, *w)).collect();
        let current_total = total_output(paths, &amounts, params);
        if let (Some(t), Some(p)) = (current_total, prev_total) {
            if !p.is_zero() {
                let diff = t.max(p) - t.min(p);
                if swap::u256_to_f64(diff) / swap::u256_to_f64(p) < CONVERGENCE_BPS {
                    prev_total = current_total;
                    break;
                }
            }
        }
        prev_total = current_total;
    }

    weights
}

/// Allocate `amount_in` across `weights` so the per-leg amounts sum
/// exactly to `amount_in` (invariant: no phantom liquidity) — every leg
/// but the last is scaled from its weight, the last absorbs the
/// remainder.
fn amounts_from_weights(amount_in: U256, weights: &[f64]) -> Vec<U256> {
    let mut amounts = Vec::with_capacity(weights.len());
    let mut allocated = U256::ZERO;
    for w in &weights[..weights.len().saturating_sub(1)] {
        let amt = scale_amount(amount_in, *w);
        allocated = allocated.saturating_add(amt);
        amounts.push(amt);
    }
    amounts.push(amount_in.saturating_sub(allocated));
    amounts
}

/// Choose a partition of `params.amount_in` across up to
/// `opt.max_splits` of `candidates` maximizing total output. Falls back
/// to the single best path when splitting doesn't beat it, or when
/// fewer than two candidates clear `min_split_fraction`.
pub fn optimize(candidates: &[Vec<PoolId>], params: &EvaluatorParams, opt: &OptimizerParams) -> Option<SplitQuote> {
    if candidates.is_empty() {
        return None;
    }

    let mut evaluated: Vec<(&Vec<PoolId>, Route)> = candidates
        .iter()
        .filter_map(|p| evaluator::evaluate_path(p, &params.with_amount(params.amount_in)).map(|r| (p, r)))
        .collect();
    if evaluated.is_empty() {
        return None;
    }
    evaluated.sort_by(|a, b| b.1.amount_out.cmp(&a.1.amount_out));

    let best_single = evaluated[0].1.clone();

    if opt.max_splits <= 1 || evaluated.len() < 2 {
        return Some(SplitQuote::single(best_single));
    }

    let k = opt.max_splits.min(evaluated.len());
    let ranked_paths: Vec<&Vec<PoolId>> = evaluated.iter().take(k).map(|(p, _)| *p).collect();

    let weights = optimize_weights(&ranked_paths, params);

    let kept: Vec<(usize, f64)> = weights
        .iter()
        .enumerate()
        .filter(|(_, w)| **w >= opt.min_split_fraction)
        .map(|(i, w)| (i, *w))
        .collect();

    if kept.len() < 2 {
        return Some(SplitQuote::single(best_single));
    }

    let kept_weight_sum: f64 = kept.iter().map(|(_, w)| w).sum();
    let normalized: Vec<f64> = kept.iter().map(|(_, w)| w / kept_weight_sum).collect();
    let kept_paths: Vec<&Vec<PoolId>> = kept.iter().map(|(i, _)| ranked_paths[*i]).collect();

    let amounts = amounts_from_weights(params.amount_in, &normalized);
    let legs: Vec<(f64, Route)> = kept_paths
        .iter()
        .zip(amounts.iter())
        .zip(normalized.iter())
        .filter_map(|((path, &amount), &weight)| {
            evaluator::evaluate_path(path, &params.with_amount(amount)).map(|r| (weight, r))
        })
        .collect();

    if legs.len() < 2 {
        return Some(SplitQuote::single(best_single));
    }

    let amount_out: U256 = legs.iter().fold(U256::ZERO, |acc, (_, r)| acc + r.amount_out);
    if amount_out <= best_single.amount_out {
        return Some(SplitQuote::single(best_single));
    }

    let amount_out_min: U256 = legs.iter().fold(U256::ZERO, |acc, (_, r)| acc + r.amount_out_min);
    let gas_estimate: u64 = legs.iter().map(|(_, r)| r.gas_estimate).sum();

    Some(SplitQuote {
        legs,
        amount_in: params.amount_in,
        amount_out,
        amount_out_min,
        gas_estimate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swap::GasParams;
    use crate::types::Pool;
    use alloy_primitives::{Address, B256};
    use std::collections::BTreeMap;

    fn graph_with_two_paths() -> crate::graph::PoolGraph {
        let graph = crate::graph::PoolGraph::new();
        let mk = |id: u8, t0: u8, t1: u8, liquidity: u128| {
            Pool::new(
                B256::repeat_byte(id),
                Address::with_last_byte(t0),
                Address::with_last_byte(t1),
                3000,
                10,
                U256::from(1u128) << 96,
                0,
                liquidity,
                BTreeMap::new(),
            )
            .unwrap()
        };
        graph
            .apply_snapshot(vec![
                mk(1, 1, 2, 50_000_000_000u128),
                mk(2, 1, 2, 50_000_000_000u128),
            ])
            .unwrap();
        graph
    }

    #[test]
    fn split_output_is_at_least_best_single() {
        let graph = graph_with_two_paths();
        let pools = graph.pools_between(Address::with_last_byte(1), Address::with_last_byte(2));
        let candidates: Vec<Vec<PoolId>> = pools.into_iter().map(|p| vec![p]).collect();
        let params = EvaluatorParams {
            graph: &graph,
            token_in: Address::with_last_byte(1),
            token_out: Address::with_last_byte(2),
            amount_in: U256::from(5_000_000_000u64),
            slippage_bps: 200,
            gas: GasParams { base_gas: 80_000, gas_per_tick: 20_000 },
            min_fill_fraction: 0.9,
        };
        let opt = OptimizerParams { max_splits: 2, min_split_fraction: 0.01 };

        let split = optimizer_best_output(&candidates, &params, &opt);
        let single_only = OptimizerParams { max_splits: 1, min_split_fraction: 0.01 };
        let single = optimizer_best_output(&candidates, &params, &single_only);

        assert!(split >= single);
    }

    fn optimizer_best_output(candidates: &[Vec<PoolId>], params: &EvaluatorParams, opt: &OptimizerParams) -> U256 {
        optimize(candidates, params, opt).map(|q| q.amount_out).unwrap_or_default()
    }

    #[test]
    fn split_legs_sum_to_requested_input() {
        let graph = graph_with_two_paths();
        let pools = graph.pools_between(Address::with_last_byte(1), Address::with_last_byte(2));
        let candidates: Vec<Vec<PoolId>> = pools.into_iter().map(|p| vec![p]).collect();
        let amount_in = U256::from(5_000_000_000u64);
        let params = EvaluatorParams {
            graph: &graph,
            token_in: Address::with_last_byte(1),
            token_out: Address::with_last_byte(2),
            amount_in,
            slippage_bps: 200,
            gas: GasParams { base_gas: 80_000, gas_per_tick: 20_000 },
            min_fill_fraction: 0.9,
        };
        let opt = OptimizerParams { max_splits: 2, min_split_fraction: 0.01 };
        if let Some(quote) = optimize(&candidates, &params, &opt) {
            if quote.is_split() {
                let sum: U256 = quote.legs.iter().fold(U256::ZERO, |acc, (_, r)| acc + r.amount_in);
                assert_eq!(sum, amount_in);
            }
        }
    }

    #[test]
    fn scale_amount_does_not_overflow_near_u256_max() {
        let amount = U256::MAX - U256::from(1u64);
        assert_eq!(scale_amount(amount, 1.0), amount);
        assert_eq!(scale_amount(amount, 0.0), U256::ZERO);
        assert!(scale_amount(amount, 0.5) < amount);
    }

    #[test]
    fn single_candidate_returns_single_quote() {
        let graph = graph_with_two_paths();
        let pool_id = graph.pools_between(Address::with_last_byte(1), Address::with_last_byte(2))[0];
        let params = EvaluatorParams {
            graph: &graph,
            token_in: Address::with_last_byte(1),
            token_out: Address::with_last_byte(2),
            amount_in: U256::from(1_000_000u64),
            slippage_bps: 50,
            gas: GasParams { base_gas: 80_000, gas_per_tick: 20_000 },
            min_fill_fraction: 0.9,
        };
        let opt = OptimizerParams { max_splits: 3, min_split_fraction: 0.01 };
        let quote = optimize(&[vec![pool_id]], &params, &opt).unwrap();
        assert!(!quote.is_split());
    }
}
