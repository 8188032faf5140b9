//! Router facade: the engine's single entry point. Validates a request,
//! consults the cache, drives pathfinder -> evaluator -> optimizer, and
//! populates the cache with the winner.
//!
//! ```text
//! quote(req):
//!   validate req
//!   key <- derive(req)
//!   if cache.get(key) fresh: return it marked cached
//!   paths <- pathfinder.enumerate(req.in, req.out, req.max_hops)
//!   if paths empty: fail NoRouteFound
//!   routes <- evaluator.evaluate_each(paths, req.amount)   # maybe parallel
//!   best_single <- best(routes)
//!   best_overall <- split_optimizer.optimize(...) or best_single
//!   cache.put(key, best_overall)
//!   return best_overall
//! ```

use std::time::{Duration, Instant};

use alloy_primitives::{Address, U256};
use tracing::{debug, instrument, warn};

use crate::cache::{bucket_amount, CacheKey, QuoteCache};
use crate::config::Config;
use crate::error::{RouterError, RouterResult};
use crate::evaluator::{self, EvaluatorParams};
use crate::graph::PoolGraph;
use crate::optimizer::{self, OptimizerParams};
use crate::pathfinder::{self, PathfinderConfig};
use crate::swap::GasParams;
use crate::types::SplitQuote;

#[derive(Debug, Clone)]
pub struct QuoteRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub slippage_bps: u32,
    pub max_hops: usize,
    pub max_splits: usize,
    pub deadline: Instant,
}

#[derive(Debug, Clone)]
pub struct QuoteResult {
    pub quote: SplitQuote,
    pub cached: bool,
    pub produced_at_unix: u64,
}

pub struct Router {
    graph: PoolGraph,
    cache: QuoteCache,
    config: Config,
}

fn now_unix() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

impl Router {
    pub fn new(config: Config) -> Self {
        Self {
            graph: PoolGraph::new(),
            cache: QuoteCache::new(config.cache_capacity, config.cache_ttl_seconds),
            config,
        }
    }

    pub fn graph(&self) -> &PoolGraph {
        &self.graph
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_degraded(&self) -> bool {
        match self.graph.last_update_unix_seconds() {
            None => true,
            Some(last) => now_unix().saturating_sub(last) > self.config.staleness_threshold_seconds,
        }
    }

    #[instrument(skip(self, req), fields(token_in = %req.token_in, token_out = %req.token_out))]
    pub fn quote(&self, req: QuoteRequest) -> RouterResult<QuoteResult> {
        self.validate(&req)?;

        let key = self.derive_key(&req);
        if let Some(hit) = self.cache.get(&key) {
            debug!("cache hit");
            metrics::counter!("routing_engine_cache_hits_total").increment(1);
            return Ok(QuoteResult { quote: hit.quote, cached: true, produced_at_unix: hit.produced_at_unix });
        }
        metrics::counter!("routing_engine_cache_misses_total").increment(1);

        if Instant::now() >= req.deadline {
            return Err(RouterError::Timeout);
        }

        let pf_cfg = PathfinderConfig { max_hops: req.max_hops, path_cap: self.config.path_enumeration_cap };
        let paths = pathfinder::enumerate_paths(&self.graph, req.token_in, req.token_out, &pf_cfg);
        if paths.is_empty() {
            return Err(RouterError::NoRouteFound { from: req.token_in, to: req.token_out });
        }

        if Instant::now() >= req.deadline {
            return Err(RouterError::Timeout);
        }

        let eval_params = EvaluatorParams {
            graph: &self.graph,
            token_in: req.token_in,
            token_out: req.token_out,
            amount_in: req.amount_in,
            slippage_bps: req.slippage_bps,
            gas: GasParams { base_gas: self.config.base_gas_per_hop, gas_per_tick: self.config.gas_per_tick_crossed },
            min_fill_fraction: 0.99,
        };

        let evaluated = evaluator::evaluate_all(&paths, &eval_params, self.config.parallel_eval_threshold);
        if evaluated.is_empty() {
            return Err(RouterError::InsufficientLiquidity);
        }

        if Instant::now() >= req.deadline {
            let best = evaluator::best_route(evaluated.iter().map(|(_, r)| r)).cloned();
            return match best {
                Some(route) => Ok(QuoteResult {
                    quote: SplitQuote::single(route),
                    cached: false,
                    produced_at_unix: now_unix(),
                }),
                None => Err(RouterError::Timeout),
            };
        }

        let best_single = evaluator::best_route(evaluated.iter().map(|(_, r)| r))
            .ok_or(RouterError::InsufficientLiquidity)?
            .clone();

        let quote = if req.max_splits > 1 && evaluated.len() >= 2 {
            let mut ranked = evaluated.clone();
            ranked.sort_by(|a, b| b.1.amount_out.cmp(&a.1.amount_out));
            let top_n = (req.max_splits * 2).min(ranked.len());
            let candidate_paths: Vec<Vec<crate::types::pool::PoolId>> =
                ranked.into_iter().take(top_n).map(|(p, _)| p).collect();

            let opt_params =
                OptimizerParams { max_splits: req.max_splits, min_split_fraction: self.config.min_split_fraction };

            optimizer::optimize(&candidate_paths, &eval_params, &opt_params)
                .unwrap_or_else(|| SplitQuote::single(best_single.clone()))
        } else {
            SplitQuote::single(best_single)
        };

        let produced_at_unix = now_unix();
        self.cache.put(key, quote.clone(), produced_at_unix);
        metrics::gauge!("routing_engine_quote_amount_out").set(crate::swap::u256_to_f64(quote.amount_out));

        Ok(QuoteResult { quote, cached: false, produced_at_unix })
    }

    fn validate(&self, req: &QuoteRequest) -> RouterResult<()> {
        if req.amount_in.is_zero() {
            return Err(RouterError::InvalidAmount("amount_in must be non-zero".to_string()));
        }
        if req.token_in == req.token_out {
            return Err(RouterError::InvalidAmount("token_in and token_out must differ".to_string()));
        }
        if !self.graph.has_token(req.token_in) {
            return Err(RouterError::UnknownToken(req.token_in));
        }
        if !self.graph.has_token(req.token_out) {
            return Err(RouterError::UnknownToken(req.token_out));
        }
        if !(1..=4).contains(&req.max_hops) {
            return Err(RouterError::OutOfRangeParameter { name: "max_hops", value: req.max_hops.to_string() });
        }
        if !(1..=3).contains(&req.max_splits) {
            return Err(RouterError::OutOfRangeParameter { name: "max_splits", value: req.max_splits.to_string() });
        }
        if req.slippage_bps > 5000 {
            return Err(RouterError::OutOfRangeParameter {
                name: "slippage_bps",
                value: req.slippage_bps.to_string(),
            });
        }
        if self.graph.pool_count() == 0 {
            warn!("quote requested against a cold graph");
            return Err(RouterError::GraphCold);
        }
        Ok(())
    }

    fn derive_key(&self, req: &QuoteRequest) -> CacheKey {
        CacheKey {
            chain_id: self.config.chain_id,
            token_in: req.token_in,
            token_out: req.token_out,
            bucketed_amount: bucket_amount(req.amount_in, self.config.amount_bucket_granularity),
            slippage_bps: req.slippage_bps,
            max_hops: req.max_hops,
            max_splits: req.max_splits,
        }
    }
}

pub fn default_deadline(request_deadline_ms: u64) -> Instant {
    Instant::now() + Duration::from_millis(request_deadline_ms)
}
