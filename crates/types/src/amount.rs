use alloy_primitives::U256;

/// Token amounts in smallest units, always produced together: a tick range
/// plus a liquidity amount determines both sides at once.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AmountPair {
    pub amount0: U256,
    pub amount1: U256,
}

impl AmountPair {
    pub fn new(amount0: U256, amount1: U256) -> AmountPair {
        AmountPair { amount0, amount1 }
    }

    pub fn is_zero(&self) -> bool {
        self.amount0.is_zero() && self.amount1.is_zero()
    }
}
