//! Pool (graph edge) representation and its invariants.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::tick_math::{MAX_TICK, MIN_TICK};

pub type PoolId = B256;

/// A concentrated-liquidity pool between `token0` and `token1`.
///
/// Invariants (enforced by [`Pool::new`] and [`Pool::validate`]):
/// 1. `token0 < token1` lexicographically.
/// 2. `tick == floor(log_1.0001(price))`, consistent with `sqrt_price_x96`.
/// 3. Every key in `ticks` is a multiple of `tick_spacing`.
/// 4. The pool is uninitialized iff `sqrt_price_x96 == 0`.
/// 5. `tick` lies in `[MIN_TICK, MAX_TICK]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: PoolId,
    pub token0: Address,
    pub token1: Address,
    /// Fee tier in parts-per-million, e.g. 500 = 0.05%.
    pub fee_ppm: u32,
    pub tick_spacing: i32,
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub liquidity: u128,
    /// Sparse map of initialized tick index -> signed net liquidity delta.
    pub ticks: BTreeMap<i32, i128>,
}

impl Pool {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: PoolId,
        token0: Address,
        token1: Address,
        fee_ppm: u32,
        tick_spacing: i32,
        sqrt_price_x96: U256,
        tick: i32,
        liquidity: u128,
        ticks: BTreeMap<i32, i128>,
    ) -> anyhow::Result<Self> {
        let pool = Self {
            id,
            token0,
            token1,
            fee_ppm,
            tick_spacing,
            sqrt_price_x96,
            tick,
            liquidity,
            ticks,
        };
        pool.validate()?;
        Ok(pool)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.token0 < self.token1,
            "pool {:#x}: token0 must sort below token1",
            self.id
        );
        anyhow::ensure!(self.tick_spacing > 0, "tick_spacing must be positive");
        if !self.is_uninitialized() {
            anyhow::ensure!(
                (MIN_TICK..=MAX_TICK).contains(&self.tick),
                "tick {} out of [{}, {}]",
                self.tick,
                MIN_TICK,
                MAX_TICK
            );
        }
        for &t in self.ticks.keys() {
            anyhow::ensure!(
                t % self.tick_spacing == 0,
                "tick {} is not a multiple of tick_spacing {}",
                t,
                self.tick_spacing
            );
        }
        Ok(())
    }

    /// A pool is uninitialized iff its sqrt price is zero; such pools
    /// are invisible to routing.
    pub fn is_uninitialized(&self) -> bool {
        self.sqrt_price_x96.is_zero()
    }

    /// The token on the other side of `token`, if `token` participates
    /// in this pool.
    pub fn other_token(&self, token: Address) -> Option<Address> {
        if token == self.token0 {
            Some(self.token1)
        } else if token == self.token1 {
            Some(self.token0)
        } else {
            None
        }
    }

    /// Swap direction for an input of `token_in`: `true` means token0 is
    /// being sold (price decreases).
    pub fn zero_for_one(&self, token_in: Address) -> Option<bool> {
        if token_in == self.token0 {
            Some(true)
        } else if token_in == self.token1 {
            Some(false)
        } else {
            None
        }
    }

    /// Next initialized tick strictly in the direction of travel from
    /// `from_tick`. `lte` selects the "less than or equal" (zeroForOne,
    /// price decreasing) direction; otherwise the "greater than" one.
    pub fn next_initialized_tick(&self, from_tick: i32, lte: bool) -> Option<i32> {
        if lte {
            self.ticks
                .range(..from_tick)
                .next_back()
                .map(|(&t, _)| t)
        } else {
            self.ticks
                .range(from_tick + 1..)
                .next()
                .map(|(&t, _)| t)
        }
    }
}
