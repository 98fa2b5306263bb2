use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Immutable token descriptor. Two tokens are distinguishable only by address,
/// and pair ordering follows address order: the lower address is token0.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: u64,
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl Token {
    pub fn new(chain_id: u64, address: Address, decimals: u8, symbol: impl Into<String>) -> Token {
        Token { chain_id, address, decimals, symbol: symbol.into() }
    }

    /// Address byte order is identical to case-insensitive hex comparison.
    pub fn is_token0_of(&self, other: &Token) -> bool {
        self.address < other.address
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl Eq for Token {}

impl Ord for Token {
    fn cmp(&self, other: &Self) -> Ordering {
        self.address.cmp(&other.address)
    }
}

impl PartialOrd for Token {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.symbol, self.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn ordering_follows_address_bytes() {
        let usdc = Token::new(1, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6, "USDC");
        let weth = Token::new(1, address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18, "WETH");
        assert!(usdc.is_token0_of(&weth));
        assert!(!weth.is_token0_of(&usdc));
        assert!(usdc < weth);
    }

    #[test]
    fn identity_is_address_only() {
        let a = Token::new(1, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6, "USDC");
        let b = Token::new(1, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 18, "other");
        assert_eq!(a, b);
    }
}
