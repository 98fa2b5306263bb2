use alloy_primitives::{Address, U256};

/// Registry entry for one NFT position, as returned by the position manager.
/// Fee-growth checkpoints are contract accounting state and are never
/// recomputed locally.
#[derive(Clone, Debug, Default)]
pub struct Position {
    pub token_id: U256,
    pub operator: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub fee_growth_inside0_x128: U256,
    pub fee_growth_inside1_x128: U256,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

impl Position {
    pub fn has_liquidity(&self) -> bool {
        self.liquidity > 0
    }

    pub fn has_owed_tokens(&self) -> bool {
        self.tokens_owed0 > 0 || self.tokens_owed1 > 0
    }
}
