use alloy_primitives::Address;

use crate::{PoolRef, Token};

/// Everything the workflows need, resolved once at startup and passed by
/// reference. No ambient globals: tests construct alternates freely.
#[derive(Clone, Debug)]
pub struct KeeperSettings {
    pub chain_id: u64,
    pub pool: PoolRef,
    /// The token the operator quotes prices against ("one base buys N quote").
    pub base: Token,
    pub quote: Token,
    pub position_manager: Address,
    pub recipient: Address,
    pub default_slippage: f64,
    /// Window added to the current timestamp to form the on-chain deadline.
    pub deadline_secs: u64,
}

impl KeeperSettings {
    pub fn slippage_or_default(&self, override_slippage: Option<f64>) -> f64 {
        override_slippage.unwrap_or(self.default_slippage)
    }
}
