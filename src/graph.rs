//! Pool graph: indexed, read-mostly store of tokens (nodes) and pools
//! (edges). Snapshot-updated by a single ingestion writer; many readers
//! quote concurrently.
//!
//! Concurrency follows the teacher's established pattern of a
//! `dashmap::DashMap` keyed index with `parking_lot::RwLock`-guarded
//! entries (see `price_oracle.rs`'s `Arc<RwLock<..>>` state) rather than
//! a hand-rolled atomic pointer swap: a reader's `RwLock::read()` guard
//! is a consistent snapshot of one pool for the duration of a hop, which
//! is all a single request needs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use alloy_primitives::Address;
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::types::pool::PoolId;
use crate::types::{Pool, Token};

/// One directed incidence of a pool at a token: `other` is the token on
/// the far side, `pool_id` identifies the edge.
#[derive(Debug, Clone, Copy)]
pub struct PoolEdge {
    pub other: Address,
    pub pool_id: PoolId,
}

/// Indexed store of tokens and pools. Cheaply cloneable handle semantics
/// are not provided on purpose — callers share a `PoolGraph` behind an
/// `Arc` (see `Router`), matching the single-graph-per-process model.
pub struct PoolGraph {
    pools: DashMap<PoolId, Arc<RwLock<Pool>>>,
    adjacency: DashMap<Address, Vec<PoolEdge>>,
    tokens: DashMap<Address, Token>,
    last_update_unix: AtomicU64,
}

impl Default for PoolGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolGraph {
    pub fn new() -> Self {
        Self {
            pools: DashMap::new(),
            adjacency: DashMap::new(),
            tokens: DashMap::new(),
            last_update_unix: AtomicU64::new(0),
        }
    }

    pub fn token_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    pub fn has_token(&self, token: Address) -> bool {
        self.adjacency.contains_key(&token)
    }

    /// Token metadata (decimals, symbol), if known. A token incident to
    /// a pool always has at least a placeholder entry (18 decimals, no
    /// symbol) from the moment its first pool is applied; ingestion may
    /// overwrite it with real metadata via [`Self::register_token`].
    pub fn token(&self, address: Address) -> Option<Token> {
        self.tokens.get(&address).map(|t| t.clone())
    }

    /// Upgrade a token's metadata (symbol, decimals). Ingestion calls
    /// this when token metadata is known; routing itself never depends
    /// on decimals or symbol, so an unregistered token still routes
    /// fine under its placeholder entry.
    pub fn register_token(&self, token: Token) {
        self.tokens.insert(token.address, token);
    }

    fn ensure_token_placeholder(&self, address: Address) {
        self.tokens.entry(address).or_insert_with(|| {
            Token::new(address, 18, None).expect("18 is a valid decimals value")
        });
    }

    pub fn last_update_unix_seconds(&self) -> Option<u64> {
        let v = self.last_update_unix.load(Ordering::Acquire);
        if v == 0 {
            None
        } else {
            Some(v)
        }
    }

    /// All pools incident to `token`, ordered as ingested (the
    /// pathfinder re-orders by liquidity per its own heuristic).
    pub fn neighbours(&self, token: Address) -> Vec<PoolEdge> {
        self.adjacency.get(&token).map(|v| v.clone()).unwrap_or_default()
    }

    /// Parallel edges between two tokens across fee tiers.
    pub fn pools_between(&self, token_a: Address, token_b: Address) -> Vec<PoolId> {
        self.neighbours(token_a)
            .into_iter()
            .filter(|e| e.other == token_b)
            .map(|e| e.pool_id)
            .collect()
    }

    /// Shared handle to a pool's guarded state, for callers that need to
    /// hold a lock across more than one read.
    pub fn pool(&self, id: PoolId) -> Option<Arc<RwLock<Pool>>> {
        self.pools.get(&id).map(|e| e.clone())
    }

    /// A consistent point-in-time copy of a pool's state. The preferred
    /// access pattern for the evaluator: clone once per hop, simulate
    /// against the clone.
    pub fn pool_snapshot(&self, id: PoolId) -> Option<Pool> {
        self.pool(id).map(|p| p.read().clone())
    }

    /// Batch-apply new or changed pool states. Single writer; safe to
    /// call from multiple threads only if the caller serializes calls
    /// (the ingestion adapter owns this responsibility).
    pub fn apply_snapshot(&self, updates: Vec<Pool>) -> anyhow::Result<()> {
        for pool in updates {
            self.apply_one(pool)?;
        }
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.last_update_unix.store(now, Ordering::Release);
        Ok(())
    }

    fn apply_one(&self, pool: Pool) -> anyhow::Result<()> {
        pool.validate()?;

        if let Some(existing) = self.pools.get(&pool.id) {
            let current = existing.read();
            anyhow::ensure!(
                current.token0 == pool.token0 && current.token1 == pool.token1,
                "pool {:#x}: id reused for a different token pair ({:#x}/{:#x} vs {:#x}/{:#x})",
                pool.id,
                current.token0,
                current.token1,
                pool.token0,
                pool.token1,
            );
            drop(current);
            *existing.write() = pool;
            return Ok(());
        }

        self.ensure_token_placeholder(pool.token0);
        self.ensure_token_placeholder(pool.token1);
        self.adjacency.entry(pool.token0).or_default().push(PoolEdge { other: pool.token1, pool_id: pool.id });
        self.adjacency.entry(pool.token1).or_default().push(PoolEdge { other: pool.token0, pool_id: pool.id });
        self.pools.insert(pool.id, Arc::new(RwLock::new(pool)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{B256, U256};
    use std::collections::BTreeMap;

    fn pool(id: u8, token0: u8, token1: u8, fee: u32) -> Pool {
        Pool::new(
            B256::repeat_byte(id),
            Address::with_last_byte(token0),
            Address::with_last_byte(token1),
            fee,
            10,
            U256::from(1u128) << 96,
            0,
            1_000_000,
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn apply_and_lookup() {
        let graph = PoolGraph::new();
        graph.apply_snapshot(vec![pool(1, 1, 2, 500)]).unwrap();
        assert_eq!(graph.pool_count(), 1);
        assert_eq!(graph.token_count(), 2);
        assert!(graph.has_token(Address::with_last_byte(1)));
        assert_eq!(graph.neighbours(Address::with_last_byte(1)).len(), 1);
        assert!(graph.last_update_unix_seconds().is_some());
    }

    #[test]
    fn parallel_edges_across_fee_tiers() {
        let graph = PoolGraph::new();
        graph
            .apply_snapshot(vec![pool(1, 1, 2, 500), pool(2, 1, 2, 3000)])
            .unwrap();
        assert_eq!(graph.pools_between(Address::with_last_byte(1), Address::with_last_byte(2)).len(), 2);
    }

    #[test]
    fn idempotent_reapply() {
        let graph = PoolGraph::new();
        let p = pool(1, 1, 2, 500);
        graph.apply_snapshot(vec![p.clone()]).unwrap();
        graph.apply_snapshot(vec![p]).unwrap();
        assert_eq!(graph.pool_count(), 1);
        assert_eq!(graph.neighbours(Address::with_last_byte(1)).len(), 1);
    }

    #[test]
    fn pools_register_placeholder_tokens() {
        let graph = PoolGraph::new();
        graph.apply_snapshot(vec![pool(1, 1, 2, 500)]).unwrap();
        let token = graph.token(Address::with_last_byte(1)).unwrap();
        assert_eq!(token.decimals, 18);
        assert!(token.symbol.is_none());
    }

    #[test]
    fn registered_token_metadata_overrides_placeholder() {
        let graph = PoolGraph::new();
        graph.apply_snapshot(vec![pool(1, 1, 2, 500)]).unwrap();
        graph.register_token(crate::types::Token::new(Address::with_last_byte(1), 6, Some("USDC".to_string())).unwrap());
        let token = graph.token(Address::with_last_byte(1)).unwrap();
        assert_eq!(token.decimals, 6);
        assert_eq!(token.symbol.as_deref(), Some("USDC"));
    }

    #[test]
    fn rejects_id_reused_for_different_pair() {
        let graph = PoolGraph::new();
        graph.apply_snapshot(vec![pool(1, 1, 2, 500)]).unwrap();
        let conflicting = pool(1, 3, 4, 500);
        assert!(graph.apply_snapshot(vec![conflicting]).is_err());
    }
}
