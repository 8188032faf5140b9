//! Ingestion adapter: the inbound surface an upstream chain/subgraph
//! indexer calls to publish pool state. The indexer itself is an
//! external collaborator (a Non-goal of this crate); what lives here is
//! the DTO and the idempotent-apply entry point, mirroring the
//! teacher's `price_oracle.rs` refresh-then-swap pattern but replacing
//! its on-chain `abigen!` calls with a plain snapshot DTO.

use serde::{Deserialize, Serialize};

use crate::graph::PoolGraph;
use crate::types::{Pool, Token};

/// Wire format for a pool snapshot push. Mirrors `types::pool::Pool`
/// field-for-field; kept as a separate type so the wire format can
/// evolve independently of the in-memory representation. `tokens` is
/// optional metadata (decimals, symbol) for addresses the snapshot's
/// pools reference — the graph itself auto-registers a placeholder
/// entry for any token it has never seen, so this only needs to carry
/// tokens whose real metadata the upstream source actually knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolSnapshotDto {
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub tokens: Vec<Token>,
}

/// Applies an ingestion snapshot to `graph`. Idempotent: applying the
/// same snapshot twice leaves the graph in the same observable state
/// (`graph::PoolGraph::apply_snapshot` is itself idempotent per-pool,
/// and `register_token` is a plain overwrite).
pub fn apply_snapshot(graph: &PoolGraph, snapshot: PoolSnapshotDto) -> anyhow::Result<()> {
    graph.apply_snapshot(snapshot.pools)?;
    for token in snapshot.tokens {
        graph.register_token(token);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256, U256};
    use std::collections::BTreeMap;

    fn sample_pool() -> Pool {
        Pool::new(
            B256::repeat_byte(1),
            Address::with_last_byte(1),
            Address::with_last_byte(2),
            500,
            10,
            U256::from(1u128) << 96,
            0,
            1_000_000u128,
            BTreeMap::new(),
        )
        .unwrap()
    }

    #[test]
    fn reapplying_the_same_snapshot_is_a_no_op() {
        let graph = PoolGraph::new();
        let snapshot = PoolSnapshotDto { pools: vec![sample_pool()], tokens: vec![] };
        apply_snapshot(&graph, snapshot.clone()).unwrap();
        let count_after_first = graph.pool_count();
        apply_snapshot(&graph, snapshot).unwrap();
        assert_eq!(graph.pool_count(), count_after_first);
    }

    #[test]
    fn snapshot_token_metadata_is_registered() {
        let graph = PoolGraph::new();
        let token = Token::new(Address::with_last_byte(1), 6, Some("USDC".to_string())).unwrap();
        let snapshot = PoolSnapshotDto { pools: vec![sample_pool()], tokens: vec![token] };
        apply_snapshot(&graph, snapshot).unwrap();
        let registered = graph.token(Address::with_last_byte(1)).unwrap();
        assert_eq!(registered.symbol.as_deref(), Some("USDC"));
        assert_eq!(registered.decimals, 6);
    }
}
