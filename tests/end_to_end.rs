//! Integration tests against a fixed three-token graph: token A, B, C
//! with pools P_AB (fee 500), P_BC (fee 3000), P_AC (fee 3000). P_AC
//! carries much shallower liquidity than the A-B-C path, so large
//! trades route through two hops instead of the thin direct pool.

use std::collections::BTreeMap;
use std::thread::sleep;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use routing_engine::config::Config;
use routing_engine::error::RouterError;
use routing_engine::facade::{default_deadline, QuoteRequest};
use routing_engine::types::Pool;
use routing_engine::Router;

fn token_a() -> Address {
    Address::with_last_byte(1)
}
fn token_b() -> Address {
    Address::with_last_byte(2)
}
fn token_c() -> Address {
    Address::with_last_byte(3)
}

const ONE_Q96: u128 = 1u128 << 96;

fn deep_pool(id: u8, token0: Address, token1: Address, fee_ppm: u32) -> Pool {
    Pool::new(
        B256::repeat_byte(id),
        token0,
        token1,
        fee_ppm,
        10,
        U256::from(ONE_Q96),
        0,
        1_000_000_000_000_000_000_000_000_000_000u128,
        BTreeMap::new(),
    )
    .unwrap()
}

fn shallow_pool(id: u8, token0: Address, token1: Address, fee_ppm: u32) -> Pool {
    Pool::new(
        B256::repeat_byte(id),
        token0,
        token1,
        fee_ppm,
        10,
        U256::from(ONE_Q96),
        0,
        1_000_000_000_000_000_000u128,
        BTreeMap::new(),
    )
    .unwrap()
}

fn build_router(cache_ttl_seconds: u64) -> Router {
    let config = Config { cache_ttl_seconds, ..Config::default() };
    let router = Router::new(config);
    router
        .graph()
        .apply_snapshot(vec![
            deep_pool(1, token_a(), token_b(), 500),
            deep_pool(2, token_b(), token_c(), 3000),
            shallow_pool(3, token_a(), token_c(), 3000),
        ])
        .unwrap();
    router
}

fn request(amount_in: U256, max_splits: usize) -> QuoteRequest {
    QuoteRequest {
        token_in: token_a(),
        token_out: token_c(),
        amount_in,
        slippage_bps: 500,
        max_hops: 4,
        max_splits,
        deadline: default_deadline(5_000),
    }
}

#[test]
fn single_hop_direct_for_a_small_amount() {
    let router = build_router(15);
    let result = router.quote(request(U256::from(1_000_000_000_000_000u128), 1)).unwrap();
    assert!(!result.cached);
    assert_eq!(result.quote.legs.len(), 1);
    assert_eq!(result.quote.legs[0].1.hop_count(), 1);
}

#[test]
fn multi_hop_wins_for_a_large_amount() {
    let router = build_router(15);
    let small = router.quote(request(U256::from(1_000_000_000_000_000u128), 1)).unwrap();
    let scale = U256::from(1000u64);
    let small_scaled_output = small.quote.amount_out.saturating_mul(scale);

    let big = router.quote(request(U256::from(1_000_000_000_000_000_000u128), 1)).unwrap();
    assert_eq!(big.quote.legs[0].1.hop_count(), 2);
    assert!(big.quote.amount_out > small_scaled_output);
}

#[test]
fn repeated_request_hits_cache_then_expires() {
    let router = build_router(1);
    let first = router.quote(request(U256::from(1_000_000_000_000_000u128), 1)).unwrap();
    assert!(!first.cached);

    let second = router.quote(request(U256::from(1_000_000_000_000_000u128), 1)).unwrap();
    assert!(second.cached);
    assert_eq!(first.quote.amount_out, second.quote.amount_out);

    sleep(Duration::from_secs(2));
    let third = router.quote(request(U256::from(1_000_000_000_000_000u128), 1)).unwrap();
    assert!(!third.cached);
}

#[test]
fn split_beats_best_single_for_a_very_large_amount() {
    let router = build_router(15);
    let single_only = router.quote(request(U256::from(10_000_000_000_000_000_000u128), 1)).unwrap();

    let split = router.quote(request(U256::from(10_000_000_000_000_000_000u128), 2)).unwrap();
    if split.quote.is_split() {
        let sum: U256 = split.quote.legs.iter().fold(U256::ZERO, |acc, (_, r)| acc + r.amount_in);
        assert_eq!(sum, U256::from(10_000_000_000_000_000_000u128));
        assert!(split.quote.amount_out >= single_only.quote.amount_out);
    }
}

#[test]
fn unknown_token_is_rejected_with_bad_request() {
    let router = build_router(15);
    let mut req = request(U256::from(1_000_000_000_000_000u128), 1);
    req.token_in = Address::repeat_byte(0xde);
    let err = router.quote(req).unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(matches!(err, RouterError::UnknownToken(_)));
}

#[test]
fn no_route_when_a_and_c_are_in_disconnected_components() {
    // A only connects to B; C only connects to D. Both tokens are known
    // to the graph but no path joins them.
    let token_d = Address::with_last_byte(4);
    let router = Router::new(Config::default());
    router
        .graph()
        .apply_snapshot(vec![deep_pool(1, token_a(), token_b(), 500), deep_pool(2, token_c(), token_d, 3000)])
        .unwrap();

    let err = router.quote(request(U256::from(1_000_000_000_000_000u128), 1)).unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert!(matches!(err, RouterError::NoRouteFound { .. }));
}
