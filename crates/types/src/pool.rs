use alloy_primitives::{Address, U256};

use crate::{FeeTier, KeeperError, Token};

/// A deployed pool: an ordered token pair plus fee tier.
#[derive(Clone, Debug)]
pub struct PoolRef {
    pub address: Address,
    pub token0: Token,
    pub token1: Token,
    pub fee_tier: FeeTier,
}

impl PoolRef {
    /// Orders the pair by address; rejects a degenerate pair.
    pub fn new(address: Address, a: Token, b: Token, fee_tier: FeeTier) -> Result<PoolRef, KeeperError> {
        if a.address == b.address {
            return Err(KeeperError::InvalidInput(format!("pool tokens must be distinct, got {} twice", a.address)));
        }
        let (token0, token1) = if a.is_token0_of(&b) { (a, b) } else { (b, a) };
        Ok(PoolRef { address, token0, token1, fee_tier })
    }

    pub fn tick_spacing(&self) -> i32 {
        self.fee_tier.tick_spacing()
    }
}

/// Snapshot of the pool's slot0, read fresh on every workflow invocation.
/// Observation/fee-protocol fields are carried opaquely.
#[derive(Clone, Debug, Default)]
pub struct PoolState {
    pub sqrt_price_x96: U256,
    pub tick: i32,
    pub observation_index: u16,
    pub observation_cardinality: u16,
    pub fee_protocol: u8,
    pub unlocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    fn usdc() -> Token {
        Token::new(1, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6, "USDC")
    }

    fn weth() -> Token {
        Token::new(1, address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18, "WETH")
    }

    #[test]
    fn pair_is_sorted_on_construction() {
        let pool = PoolRef::new(Address::ZERO, weth(), usdc(), FeeTier::Medium).unwrap();
        assert_eq!(pool.token0.symbol, "USDC");
        assert_eq!(pool.token1.symbol, "WETH");
        assert_eq!(pool.tick_spacing(), 60);
    }

    #[test]
    fn identical_tokens_rejected() {
        assert!(PoolRef::new(Address::ZERO, usdc(), usdc(), FeeTier::Low).is_err());
    }
}
