//! Quote cache: time-bounded memoization of `(chain_id, token_in,
//! token_out, bucketed_amount, slippage_bps, max_hops, max_splits)` ->
//! quote, with LRU eviction once `cache_capacity` is exceeded.
//!
//! `DashMap` gives the sharded concurrent map the teacher already
//! depends on; the LRU order itself is a small `parking_lot`-guarded
//! deque, since `DashMap` doesn't track access order on its own. A
//! concurrent miss on the same key by two requests may compute the
//! quote twice — the spec explicitly allows this (no single-flight
//! requirement).

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::types::SplitQuote;

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    pub chain_id: u64,
    pub token_in: Address,
    pub token_out: Address,
    pub bucketed_amount: U256,
    pub slippage_bps: u32,
    pub max_hops: usize,
    pub max_splits: usize,
}

struct CacheEntry {
    quote: SplitQuote,
    produced_at: Instant,
    produced_at_unix: u64,
}

/// Round `amount` down to its top `granularity_bits` significant bits,
/// zeroing the rest. With `granularity_bits = 10` the bucket width is at
/// most `2^-10 ≈ 0.098%` of the amount — under the spec's 0.1% fidelity
/// target — which is the default this crate ships (`Config::default`).
pub fn bucket_amount(amount: U256, granularity_bits: u32) -> U256 {
    if amount.is_zero() {
        return amount;
    }
    let bit_len = 256 - amount.leading_zeros();
    if bit_len <= granularity_bits {
        return amount;
    }
    let shift = bit_len - granularity_bits;
    (amount >> shift) << shift
}

pub struct QuoteCache {
    map: DashMap<CacheKey, CacheEntry>,
    order: Mutex<VecDeque<CacheKey>>,
    capacity: usize,
    ttl: Duration,
}

pub struct CacheHit {
    pub quote: SplitQuote,
    pub produced_at_unix: u64,
}

impl QuoteCache {
    pub fn new(capacity: usize, ttl_seconds: u64) -> Self {
        Self {
            map: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            ttl: Duration::from_secs(ttl_seconds),
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<CacheHit> {
        let hit = self.map.get(key).and_then(|entry| {
            if entry.produced_at.elapsed() < self.ttl {
                Some(CacheHit { quote: entry.quote.clone(), produced_at_unix: entry.produced_at_unix })
            } else {
                None
            }
        });
        match hit {
            Some(hit) => {
                self.touch(key);
                Some(hit)
            }
            None => {
                // Expired entries are evicted lazily on access.
                self.map.remove(key);
                None
            }
        }
    }

    pub fn put(&self, key: CacheKey, quote: SplitQuote, produced_at_unix: u64) {
        self.sweep_expired();
        self.map.insert(key.clone(), CacheEntry { quote, produced_at: Instant::now(), produced_at_unix });

        let mut order = self.order.lock();
        order.retain(|k| k != &key);
        order.push_back(key);
        while order.len() > self.capacity {
            if let Some(evicted) = order.pop_front() {
                self.map.remove(&evicted);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    fn touch(&self, key: &CacheKey) {
        let mut order = self.order.lock();
        if let Some(pos) = order.iter().position(|k| k == key) {
            if let Some(k) = order.remove(pos) {
                order.push_back(k);
            }
        }
    }

    /// Bulk-swept on insert, per the spec; `get` also evicts lazily.
    fn sweep_expired(&self) {
        let ttl = self.ttl;
        self.map.retain(|_, v| v.produced_at.elapsed() < ttl);
    }
}
