//! Fixed-point conversions between tick index, sqrt price and price
//! limits. Pure function library — no state, no I/O.
//!
//! The bit-decomposition algorithm and magic constants follow the
//! canonical Uniswap V3 `TickMath` formula (the same constants appear,
//! truncated to Q64.64, in the reference CLMM program retrieved
//! alongside this codebase). `get_sqrt_price_at_tick` multiplies a
//! running Q128.128 ratio by a precomputed `sqrt(1.0001)^(2^i)` for
//! every set bit of `|tick|`, inverts for negative ticks, then rounds
//! down to Q128.96 and truncates to 160 bits.

use alloy_primitives::U256;

use crate::error::SimulationError;

pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// sqrt price at MIN_TICK, as a Q64.96 value.
pub const MIN_SQRT_PRICE: U256 = U256::from_limbs([4295128739u64, 0, 0, 0]);

const MAX_SQRT_PRICE_LIMBS: [u64; 4] = [
    0x7a3fc3688d0000u64,
    0xfbd41b1fff64a5a0u64,
    0xffffffffffffffe1u64,
    0x0000000000000fffu64,
];
/// sqrt price at MAX_TICK, as a Q64.96 value (1461446703485210103287273052203988822378723970342).
pub const MAX_SQRT_PRICE: U256 = U256::from_limbs(MAX_SQRT_PRICE_LIMBS);

const Q128_MASK: U256 = U256::from_limbs([0, 0, 1, 0]); // 2^128

/// Q128.128 magic constants: `sqrt(1.0001)^(2^i) * 2^128`, for bits 0..19
/// of `|tick|` (covers the full [MIN_TICK, MAX_TICK] range, which needs
/// 20 bits since `887272 < 2^20`).
const RATIOS: [U256; 20] = [
    U256::from_limbs([0xaa2d162d1a594001u64, 0xfffcb933bd6fad37u64, 0, 0]),
    U256::from_limbs([0x59a46990580e213au64, 0xfff97272373d4132u64, 0, 0]),
    U256::from_limbs([0xf12357cf3c7fdccu64, 0xfff2e50f5f656932u64, 0, 0]),
    U256::from_limbs([0x1c3624eaa0941cd0u64, 0xffe5caca7e10e4e6u64, 0, 0]),
    U256::from_limbs([0xc9db58835c926644u64, 0xffcb9843d60f6159u64, 0, 0]),
    U256::from_limbs([0x472e6896dfb254c0u64, 0xff973b41fa98c081u64, 0, 0]),
    U256::from_limbs([0x43ec78b326b52861u64, 0xff2ea16466c96a38u64, 0, 0]),
    U256::from_limbs([0x11c461f1969c3053u64, 0xfe5dee046a99a2a8u64, 0, 0]),
    U256::from_limbs([0xdcffc83b479aa3a4u64, 0xfcbe86c7900a88aeu64, 0, 0]),
    U256::from_limbs([0x6f2b074cf7815e54u64, 0xf987a7253ac41317u64, 0, 0]),
    U256::from_limbs([0x940c7a398e4b70f3u64, 0xf3392b0822b70005u64, 0, 0]),
    U256::from_limbs([0x43b29c7fa6e889d9u64, 0xe7159475a2c29b74u64, 0, 0]),
    U256::from_limbs([0x845ad8f792aa5825u64, 0xd097f3bdfd2022b8u64, 0, 0]),
    U256::from_limbs([0x8a65dc1f90e061e5u64, 0xa9f746462d870fdfu64, 0, 0]),
    U256::from_limbs([0x90bb3df62baf32f7u64, 0x70d869a156d2a1b8u64, 0, 0]),
    U256::from_limbs([0x981231505542fcfau64, 0x31be135f97d08fd9u64, 0, 0]),
    U256::from_limbs([0xc677de54f3e99bc9u64, 0x9aa508b5b7a84e1u64, 0, 0]),
    U256::from_limbs([0x99c329225ee604u64, 0x5d6af8dedb8119u64, 0, 0]),
    U256::from_limbs([0x26041bedfe98u64, 0x2216e584f5fa1eu64, 0, 0]),
    U256::from_limbs([0x444e8fa2u64, 0x48a170391f7dc4u64, 0, 0]),
];

/// Returns the sqrt price (Q64.96) at which a pool sits when its
/// current tick equals `tick`.
pub fn tick_to_sqrt_price(tick: i32) -> Result<U256, SimulationError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(SimulationError::TickOutOfBounds(tick));
    }

    let abs_tick = tick.unsigned_abs();
    let mut ratio = if abs_tick & 0x1 != 0 {
        RATIOS[0]
    } else {
        Q128_MASK
    };

    for (i, r) in RATIOS.iter().enumerate().skip(1) {
        if abs_tick & (1u32 << i) != 0 {
            ratio = (ratio.wrapping_mul(*r)) >> 128u32;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Round down from Q128.128 to Q128.96, keeping only the low 160 bits.
    let remainder = ratio & U256::from(0xffffffffu64);
    let mut sqrt_price = ratio >> 32u32;
    if !remainder.is_zero() {
        sqrt_price += U256::from(1u64);
    }

    Ok(sqrt_price.clamp(MIN_SQRT_PRICE, MAX_SQRT_PRICE))
}

/// Inverse of [`tick_to_sqrt_price`], floored so that
/// `tick_to_sqrt_price(result) <= sqrt_price < tick_to_sqrt_price(result + 1)`.
pub fn sqrt_price_to_tick(sqrt_price: U256) -> Result<i32, SimulationError> {
    if sqrt_price < MIN_SQRT_PRICE || sqrt_price > MAX_SQRT_PRICE {
        return Err(SimulationError::SqrtPriceOutOfBounds);
    }

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;
    while low < high {
        // Avoid i32 overflow: MIN_TICK/MAX_TICK are well within i32 range
        // but the classic (low+high)/2 is kept for readability since no
        // overflow is possible here.
        let mid = low + (high - low + 1) / 2;
        let mid_price = tick_to_sqrt_price(mid)?;
        if mid_price <= sqrt_price {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

/// Compute the sqrt price boundary a swap may cross, given the current
/// sqrt price and a slippage tolerance in basis points.
///
/// `zero_for_one` moves price down: `current * sqrt(1 - bps/10000)`.
/// Otherwise price moves up: `current * sqrt(1 + bps/10000)`. The f64
/// square root is an accepted approximation for this boundary only
/// (never for `amount_out`) — see the source material's own tolerance
/// note.
pub fn price_limit(
    zero_for_one: bool,
    current_sqrt_price: U256,
    slippage_bps: u32,
) -> Result<U256, SimulationError> {
    if slippage_bps > 5000 {
        return Err(SimulationError::SqrtPriceOutOfBounds);
    }

    let factor = if zero_for_one {
        (1.0 - slippage_bps as f64 / 10_000.0).sqrt()
    } else {
        (1.0 + slippage_bps as f64 / 10_000.0).sqrt()
    };
    // Scale by 1e9 to keep useful precision in the f64 -> U256 conversion.
    const SCALE: u64 = 1_000_000_000;
    let scaled_factor = (factor * SCALE as f64).round() as u64;

    let limit = (current_sqrt_price * U256::from(scaled_factor)) / U256::from(SCALE);

    let low = MIN_SQRT_PRICE + U256::from(1u64);
    let high = MAX_SQRT_PRICE - U256::from(1u64);
    Ok(limit.clamp(low, high))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_zero_is_one() {
        let sp = tick_to_sqrt_price(0).unwrap();
        // 1.0 in Q64.96 is 2^96.
        assert_eq!(sp, U256::from(1u128) << 96u32);
    }

    #[test]
    fn bounds_match_constants() {
        assert_eq!(tick_to_sqrt_price(MIN_TICK).unwrap(), MIN_SQRT_PRICE);
        assert_eq!(tick_to_sqrt_price(MAX_TICK).unwrap(), MAX_SQRT_PRICE);
    }

    #[test]
    fn out_of_range_tick_fails() {
        assert!(tick_to_sqrt_price(MAX_TICK + 1).is_err());
        assert!(tick_to_sqrt_price(MIN_TICK - 1).is_err());
    }

    #[test]
    fn round_trip_sample_ticks() {
        for tick in [MIN_TICK, -500_000, -100_000, -1000, 0, 1000, 100_000, 500_000, MAX_TICK] {
            let sp = tick_to_sqrt_price(tick).unwrap();
            let back = sqrt_price_to_tick(sp).unwrap();
            assert_eq!(tick, back, "round trip failed for tick {tick}");
        }
    }

    #[test]
    fn sqrt_price_is_monotonic_in_tick() {
        let mut prev = tick_to_sqrt_price(MIN_TICK).unwrap();
        for tick in (-800_000..=800_000).step_by(50_000) {
            let next = tick_to_sqrt_price(tick).unwrap();
            assert!(next >= prev, "sqrt price must be non-decreasing in tick");
            prev = next;
        }
    }

    #[test]
    fn price_limit_moves_correct_direction() {
        let current = tick_to_sqrt_price(0).unwrap();
        let down = price_limit(true, current, 100).unwrap();
        let up = price_limit(false, current, 100).unwrap();
        assert!(down < current);
        assert!(up > current);
        assert!(down > MIN_SQRT_PRICE);
        assert!(up < MAX_SQRT_PRICE);
    }

    #[test]
    fn price_limit_rejects_excess_slippage() {
        let current = tick_to_sqrt_price(0).unwrap();
        assert!(price_limit(true, current, 5001).is_err());
    }
}
