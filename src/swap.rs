//! Swap simulator: tick-by-tick exact-input AMM execution.
//!
//! Mirrors the on-chain Uniswap V3 `SwapMath`/`SqrtPriceMath` step
//! functions: `liquidity << 96` products are widened through `U512`
//! before dividing back down, the same trick the reference contract's
//! `FullMath.mulDiv` uses to avoid overflowing a 256-bit intermediate.
//! The simulator never mutates the pool it is given — callers clone or
//! snapshot pool state per candidate path.

use alloy_primitives::{U256, U512};

use crate::error::SimulationError;
use crate::tick_math::{self, MAX_SQRT_PRICE, MAX_TICK, MIN_SQRT_PRICE, MIN_TICK};
use crate::types::pool::Pool;

const Q96: u32 = 96;
const FEE_DENOMINATOR: u64 = 1_000_000;

/// Gas model constants, configurable per §6's options table.
#[derive(Debug, Clone, Copy)]
pub struct GasParams {
    pub base_gas: u64,
    pub gas_per_tick: u64,
}

/// Outcome of simulating an exact-input swap against one pool.
#[derive(Debug, Clone)]
pub struct SwapResult {
    pub amount_in_used: U256,
    pub amount_out: U256,
    pub new_sqrt_price: U256,
    pub new_tick: i32,
    pub new_liquidity: u128,
    pub gas_estimate: u64,
    pub initialized_ticks_crossed: u32,
    /// Non-zero only when the loop exited on `sqrt_price_limit` before
    /// fully consuming the input. Whether to accept the partial fill is
    /// a routing decision, not a simulator decision.
    pub remaining_in: U256,
}

fn mul_div(a: U256, b: U256, denom: U256) -> Result<U256, SimulationError> {
    if denom.is_zero() {
        return Err(SimulationError::NumericOverflow);
    }
    let product = U512::from(a) * U512::from(b);
    U256::try_from(product / U512::from(denom)).map_err(|_| SimulationError::NumericOverflow)
}

fn mul_div_rounding_up(a: U256, b: U256, denom: U256) -> Result<U256, SimulationError> {
    if denom.is_zero() {
        return Err(SimulationError::NumericOverflow);
    }
    let product = U512::from(a) * U512::from(b);
    let denom512 = U512::from(denom);
    let (quotient, remainder) = (product / denom512, product % denom512);
    let result = if remainder.is_zero() { quotient } else { quotient + U512::from(1u64) };
    U256::try_from(result).map_err(|_| SimulationError::NumericOverflow)
}

fn div_rounding_up(a: U256, b: U256) -> Result<U256, SimulationError> {
    if b.is_zero() {
        return Err(SimulationError::NumericOverflow);
    }
    let (q, r) = (a / b, a % b);
    Ok(if r.is_zero() { q } else { q + U256::from(1u64) })
}

/// `liquidity * (sqrtB - sqrtA) / (sqrtA * sqrtB)`, scaled by `2^96`: the
/// amount of token0 locked between two sqrt prices at a given liquidity.
fn get_amount0_delta(
    mut sqrt_a: U256,
    mut sqrt_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, SimulationError> {
    if sqrt_a > sqrt_b {
        std::mem::swap(&mut sqrt_a, &mut sqrt_b);
    }
    if liquidity == 0 || sqrt_a == sqrt_b {
        return Ok(U256::ZERO);
    }
    let numerator1 = U256::from(liquidity) << Q96;
    let numerator2 = sqrt_b - sqrt_a;
    if round_up {
        div_rounding_up(mul_div_rounding_up(numerator1, numerator2, sqrt_b)?, sqrt_a)
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_b)? / sqrt_a)
    }
}

/// `liquidity * (sqrtB - sqrtA) / 2^96`: the amount of token1 locked
/// between two sqrt prices at a given liquidity.
fn get_amount1_delta(
    mut sqrt_a: U256,
    mut sqrt_b: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256, SimulationError> {
    if sqrt_a > sqrt_b {
        std::mem::swap(&mut sqrt_a, &mut sqrt_b);
    }
    if liquidity == 0 || sqrt_a == sqrt_b {
        return Ok(U256::ZERO);
    }
    let liquidity256 = U256::from(liquidity);
    let diff = sqrt_b - sqrt_a;
    let q96 = U256::from(1u128) << Q96;
    if round_up {
        mul_div_rounding_up(liquidity256, diff, q96)
    } else {
        mul_div(liquidity256, diff, q96)
    }
}

fn next_sqrt_price_from_amount0(
    sqrt_p: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, SimulationError> {
    if amount.is_zero() {
        return Ok(sqrt_p);
    }
    let numerator1 = U256::from(liquidity) << Q96;
    if add {
        if let Some(product) = amount.checked_mul(sqrt_p) {
            if let Some(denom) = numerator1.checked_add(product) {
                if denom >= numerator1 {
                    return mul_div_rounding_up(numerator1, sqrt_p, denom);
                }
            }
        }
        // `amount * sqrt_p` would overflow 256 bits; fall back to the
        // division-first form, losing a little precision but staying
        // within a single 256-bit word.
        let denom = (numerator1 / sqrt_p)
            .checked_add(amount)
            .ok_or(SimulationError::NumericOverflow)?;
        div_rounding_up(numerator1, denom)
    } else {
        let product = amount.checked_mul(sqrt_p).ok_or(SimulationError::NumericOverflow)?;
        if numerator1 <= product {
            return Err(SimulationError::NumericOverflow);
        }
        mul_div_rounding_up(numerator1, sqrt_p, numerator1 - product)
    }
}

fn next_sqrt_price_from_amount1(
    sqrt_p: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256, SimulationError> {
    let liquidity256 = U256::from(liquidity);
    let q96 = U256::from(1u128) << Q96;
    if add {
        let quotient = mul_div(amount, q96, liquidity256)?;
        sqrt_p.checked_add(quotient).ok_or(SimulationError::NumericOverflow)
    } else {
        let quotient = mul_div_rounding_up(amount, q96, liquidity256)?;
        if sqrt_p <= quotient {
            return Err(SimulationError::NumericOverflow);
        }
        Ok(sqrt_p - quotient)
    }
}

fn next_sqrt_price_from_input(
    sqrt_p: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256, SimulationError> {
    if zero_for_one {
        next_sqrt_price_from_amount0(sqrt_p, liquidity, amount_in, true)
    } else {
        next_sqrt_price_from_amount1(sqrt_p, liquidity, amount_in, true)
    }
}

struct SwapStep {
    sqrt_price_next: U256,
    amount_in: U256,
    amount_out: U256,
    fee_amount: U256,
}

/// One single-tick-range step of the swap, mirroring `SwapMath.computeSwapStep`.
fn compute_swap_step(
    sqrt_price_current: U256,
    sqrt_price_target: U256,
    liquidity: u128,
    amount_remaining: U256,
    fee_ppm: u32,
) -> Result<SwapStep, SimulationError> {
    let zero_for_one = sqrt_price_current >= sqrt_price_target;
    let fee = U256::from(fee_ppm as u64);
    let denom = U256::from(FEE_DENOMINATOR);
    let amount_remaining_less_fee = mul_div(amount_remaining, denom - fee, denom)?;

    let amount_in_full = if zero_for_one {
        get_amount0_delta(sqrt_price_target, sqrt_price_current, liquidity, true)?
    } else {
        get_amount1_delta(sqrt_price_current, sqrt_price_target, liquidity, true)?
    };

    let reached_target = amount_remaining_less_fee >= amount_in_full;
    let sqrt_price_next = if reached_target {
        sqrt_price_target
    } else {
        next_sqrt_price_from_input(sqrt_price_current, liquidity, amount_remaining_less_fee, zero_for_one)?
    };

    let amount_in = if reached_target {
        amount_in_full
    } else if zero_for_one {
        get_amount0_delta(sqrt_price_next, sqrt_price_current, liquidity, true)?
    } else {
        get_amount1_delta(sqrt_price_current, sqrt_price_next, liquidity, true)?
    };

    let amount_out = if zero_for_one {
        get_amount1_delta(sqrt_price_next, sqrt_price_current, liquidity, false)?
    } else {
        get_amount0_delta(sqrt_price_current, sqrt_price_next, liquidity, false)?
    };

    let fee_amount = if reached_target {
        // The step didn't consume all of `amount_remaining`; charge fee
        // proportional to the input actually used.
        if denom == fee {
            U256::ZERO
        } else {
            mul_div_rounding_up(amount_in, fee, denom - fee)?
        }
    } else {
        amount_remaining.saturating_sub(amount_in)
    };

    Ok(SwapStep { sqrt_price_next, amount_in, amount_out, fee_amount })
}

fn apply_liquidity_delta(liquidity: u128, delta: i128) -> Result<u128, SimulationError> {
    let signed = liquidity as i128;
    let updated = signed.checked_add(delta).ok_or(SimulationError::NumericOverflow)?;
    if updated < 0 {
        return Err(SimulationError::NumericOverflow);
    }
    Ok(updated as u128)
}

/// Horner-expand a `U256` into an `f64`. Lossy — only used for reporting
/// (price impact, cache bucketing ratios), never for amounts that affect
/// `amount_out`.
pub fn u256_to_f64(x: U256) -> f64 {
    let mut result = 0f64;
    for limb in x.as_limbs().iter().rev() {
        result = result * 18_446_744_073_709_551_616.0 /* 2^64 */ + (*limb as f64);
    }
    result
}

/// `(sqrt_price / 2^96)^2`, the pool's price of token1 per token0.
pub fn sqrt_price_to_price_f64(sqrt_price: U256) -> f64 {
    let sp = u256_to_f64(sqrt_price) / 79_228_162_514_264_337_593_543_950_336.0 /* 2^96 */;
    sp * sp
}

/// Simulate an exact-input swap through `pool`, crossing initialized
/// ticks one at a time until `amount_in` is consumed or `sqrt_price_limit`
/// is reached. Pure: `pool` is read, never mutated.
pub fn simulate_exact_input(
    pool: &Pool,
    zero_for_one: bool,
    amount_in: U256,
    sqrt_price_limit: U256,
    gas: GasParams,
) -> Result<SwapResult, SimulationError> {
    if pool.is_uninitialized() {
        return Err(SimulationError::PoolNotInitialized);
    }

    let mut sqrt_p = pool.sqrt_price_x96;
    let mut liquidity = pool.liquidity;
    let mut tick = pool.tick;
    let mut remaining = amount_in;
    let mut amount_out = U256::ZERO;
    let mut ticks_crossed: u32 = 0;

    // Bounded by the number of initialized ticks plus the final
    // limit-bounded step; defends against an unbounded loop on a
    // malformed tick index.
    let max_iterations = pool.ticks.len() + 2;

    for _ in 0..max_iterations {
        if remaining.is_zero() || sqrt_p == sqrt_price_limit {
            break;
        }

        let next_tick = pool.next_initialized_tick(tick, zero_for_one);
        let next_tick_sqrt_price = match next_tick {
            Some(t) => tick_math::tick_to_sqrt_price(t)?,
            None => {
                if zero_for_one {
                    MIN_SQRT_PRICE + U256::from(1u64)
                } else {
                    MAX_SQRT_PRICE - U256::from(1u64)
                }
            }
        };

        let sqrt_price_target = if zero_for_one {
            next_tick_sqrt_price.max(sqrt_price_limit)
        } else {
            next_tick_sqrt_price.min(sqrt_price_limit)
        };

        let step = compute_swap_step(sqrt_p, sqrt_price_target, liquidity, remaining, pool.fee_ppm)?;

        let step_in_gross = step
            .amount_in
            .checked_add(step.fee_amount)
            .ok_or(SimulationError::NumericOverflow)?;
        remaining = remaining.saturating_sub(step_in_gross);
        amount_out = amount_out.checked_add(step.amount_out).ok_or(SimulationError::NumericOverflow)?;
        sqrt_p = step.sqrt_price_next;

        if let Some(t) = next_tick {
            if sqrt_p == next_tick_sqrt_price {
                let delta = pool.ticks.get(&t).copied().unwrap_or(0);
                let signed_delta = if zero_for_one { -delta } else { delta };
                liquidity = apply_liquidity_delta(liquidity, signed_delta)?;
                tick = if zero_for_one { t - 1 } else { t };
                ticks_crossed += 1;
                continue;
            }
        }

        tick = tick_math::sqrt_price_to_tick(sqrt_p)?;
    }

    let gas_estimate = gas.base_gas + gas.gas_per_tick * ticks_crossed as u64;

    Ok(SwapResult {
        amount_in_used: amount_in.saturating_sub(remaining),
        amount_out,
        new_sqrt_price: sqrt_p,
        new_tick: tick,
        new_liquidity: liquidity,
        gas_estimate,
        initialized_ticks_crossed: ticks_crossed,
        remaining_in: remaining,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};
    use std::collections::BTreeMap;

    fn flat_pool(liquidity: u128, fee_ppm: u32) -> Pool {
        Pool::new(
            B256::repeat_byte(1),
            Address::with_last_byte(1),
            Address::with_last_byte(2),
            fee_ppm,
            10,
            U256::from(1u128) << 96,
            0,
            liquidity,
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn uninitialized_pool_fails() {
        let pool = Pool::new(
            B256::repeat_byte(1),
            Address::with_last_byte(1),
            Address::with_last_byte(2),
            500,
            10,
            U256::ZERO,
            0,
            0,
            BTreeMap::new(),
        )
        .unwrap();
        let limit = tick_math::price_limit(true, tick_math::tick_to_sqrt_price(0).unwrap(), 100).unwrap();
        let result = simulate_exact_input(&pool, true, U256::from(1000u64), limit, GasParams { base_gas: 1, gas_per_tick: 1 });
        assert_eq!(result.unwrap_err(), SimulationError::PoolNotInitialized);
    }

    #[test]
    fn small_swap_within_one_tick_range_fully_fills() {
        let pool = flat_pool(1_000_000_000_000u128, 3000);
        let limit = tick_math::price_limit(true, pool.sqrt_price_x96, 500).unwrap();
        let result = simulate_exact_input(
            &pool,
            true,
            U256::from(1_000_000u64),
            limit,
            GasParams { base_gas: 80_000, gas_per_tick: 20_000 },
        )
        .unwrap();
        assert!(result.remaining_in.is_zero());
        assert!(!result.amount_out.is_zero());
        assert!(result.new_sqrt_price < pool.sqrt_price_x96);
        assert_eq!(result.gas_estimate, 80_000);
    }

    #[test]
    fn output_is_monotone_in_input() {
        let pool = flat_pool(5_000_000_000_000u128, 3000);
        let limit = tick_math::price_limit(true, pool.sqrt_price_x96, 2000).unwrap();
        let gas = GasParams { base_gas: 80_000, gas_per_tick: 20_000 };
        let small = simulate_exact_input(&pool, true, U256::from(1_000_000u64), limit, gas).unwrap();
        let large = simulate_exact_input(&pool, true, U256::from(10_000_000u64), limit, gas).unwrap();
        assert!(large.amount_out >= small.amount_out);
    }

    #[test]
    fn pool_purity_after_simulation() {
        let pool = flat_pool(1_000_000_000_000u128, 3000);
        let snapshot = pool.clone();
        let limit = tick_math::price_limit(true, pool.sqrt_price_x96, 500).unwrap();
        let _ = simulate_exact_input(&pool, true, U256::from(1_000_000u64), limit, GasParams { base_gas: 1, gas_per_tick: 1 }).unwrap();
        assert_eq!(pool.sqrt_price_x96, snapshot.sqrt_price_x96);
        assert_eq!(pool.liquidity, snapshot.liquidity);
        assert_eq!(pool.tick, snapshot.tick);
    }

    #[test]
    fn hitting_price_limit_reports_remaining_in() {
        let pool = flat_pool(10u128, 3000);
        // A tiny-liquidity pool with a tight slippage limit should hit
        // the limit long before a huge input amount is exhausted.
        let limit = tick_math::price_limit(true, pool.sqrt_price_x96, 1).unwrap();
        let result = simulate_exact_input(
            &pool,
            true,
            U256::from(1_000_000_000u64),
            limit,
            GasParams { base_gas: 80_000, gas_per_tick: 20_000 },
        )
        .unwrap();
        assert!(!result.remaining_in.is_zero());
        assert_eq!(result.new_sqrt_price, limit);
    }
}
