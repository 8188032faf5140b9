//! Token node in the pool graph.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// An ERC20-style token. Immutable once loaded into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    pub symbol: Option<String>,
}

impl Token {
    pub fn new(address: Address, decimals: u8, symbol: Option<String>) -> anyhow::Result<Self> {
        anyhow::ensure!(decimals <= 30, "decimals must be in 0..=30, got {decimals}");
        Ok(Self {
            address,
            decimals,
            symbol,
        })
    }

    pub fn display_name(&self) -> String {
        self.symbol
            .clone()
            .unwrap_or_else(|| format!("{:#x}", self.address))
    }
}
