//! Depth-bounded DFS path enumeration from `token_in` to `token_out`.
//!
//! A candidate path is a sequence of pool ids where consecutive pools
//! share a token and no pool repeats within the path (the same pool may
//! still appear in a sibling path). Enumeration is capped at
//! `path_enumeration_cap` paths — a fairness/latency knob, not a
//! correctness constraint — and orders each frontier's neighbours by
//! descending active liquidity so the cap drops low-quality paths
//! first.

use alloy_primitives::Address;
use std::collections::HashSet;

use crate::graph::PoolGraph;
use crate::types::pool::PoolId;

pub type Path = Vec<PoolId>;

#[derive(Debug, Clone)]
pub struct PathfinderConfig {
    pub max_hops: usize,
    pub path_cap: usize,
}

pub fn enumerate_paths(graph: &PoolGraph, token_in: Address, token_out: Address, cfg: &PathfinderConfig) -> Vec<Path> {
    let mut results = Vec::new();
    let mut visited = HashSet::new();
    let mut path = Path::new();
    dfs(graph, token_in, token_out, cfg, &mut visited, &mut path, &mut results);
    results
}

fn dfs(
    graph: &PoolGraph,
    frontier: Address,
    target: Address,
    cfg: &PathfinderConfig,
    visited: &mut HashSet<PoolId>,
    path: &mut Path,
    results: &mut Vec<Path>,
) {
    if results.len() >= cfg.path_cap {
        return;
    }
    if !path.is_empty() && frontier == target {
        results.push(path.clone());
        return;
    }
    if path.len() >= cfg.max_hops {
        return;
    }

    let mut neighbours = graph.neighbours(frontier);
    neighbours.sort_by(|a, b| {
        let liquidity_of = |pool_id| graph.pool(pool_id).map(|p| p.read().liquidity).unwrap_or(0);
        liquidity_of(b.pool_id).cmp(&liquidity_of(a.pool_id))
    });

    for edge in neighbours {
        if results.len() >= cfg.path_cap {
            return;
        }
        if visited.contains(&edge.pool_id) {
            continue;
        }
        let routable = graph
            .pool(edge.pool_id)
            .map(|p| {
                let pool = p.read();
                !pool.is_uninitialized() && pool.liquidity > 0
            })
            .unwrap_or(false);
        if !routable {
            continue;
        }

        visited.insert(edge.pool_id);
        path.push(edge.pool_id);
        dfs(graph, edge.other, target, cfg, visited, path, results);
        path.pop();
        visited.remove(&edge.pool_id);
    }
}
