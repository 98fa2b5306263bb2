use alloy_primitives::{Address, B256, U256};
use rangekeeper_types::AmountPair;

/// Mint a fresh position over an aligned tick range.
#[derive(Clone, Debug)]
pub struct MintCall {
    pub token0: Address,
    pub token1: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub amount0_desired: U256,
    pub amount1_desired: U256,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub recipient: Address,
    pub deadline: u64,
}

#[derive(Clone, Debug)]
pub struct DecreaseCall {
    pub token_id: U256,
    pub liquidity: u128,
    pub amount0_min: U256,
    pub amount1_min: U256,
    pub deadline: u64,
}

/// Max bounds are the protocol convention for "collect everything owed".
#[derive(Clone, Debug)]
pub struct CollectCall {
    pub token_id: U256,
    pub recipient: Address,
    pub amount0_max: u128,
    pub amount1_max: u128,
}

#[derive(Clone, Debug)]
pub struct Erc20ApproveCall {
    pub token: Address,
    pub spender: Address,
    pub amount: U256,
}

#[derive(Clone, Debug)]
pub struct NftApproveCall {
    pub token_id: U256,
    pub to: Address,
}

/// The full set of liquidity-changing calls, tagged by operation so the
/// boundary stays statically checkable.
#[derive(Clone, Debug)]
pub enum WriteCall {
    Mint(MintCall),
    DecreaseLiquidity(DecreaseCall),
    Collect(CollectCall),
    ApproveErc20(Erc20ApproveCall),
    ApproveNft(NftApproveCall),
}

impl WriteCall {
    pub fn operation(&self) -> &'static str {
        match self {
            WriteCall::Mint(_) => "mint",
            WriteCall::DecreaseLiquidity(_) => "decrease_liquidity",
            WriteCall::Collect(_) => "collect",
            WriteCall::ApproveErc20(_) => "approve_erc20",
            WriteCall::ApproveNft(_) => "approve_nft",
        }
    }
}

/// A submitted-but-unconfirmed call.
#[derive(Clone, Debug)]
pub struct PendingCall {
    pub operation: &'static str,
    pub tx_hash: B256,
}

#[derive(Clone, Debug, Default)]
pub struct Minted {
    pub token_id: U256,
    pub liquidity: u128,
    pub amounts: AmountPair,
}

/// Confirmed call outcome with the decoded liquidity events, so workflows can
/// chain the amounts produced by one call into the next.
#[derive(Clone, Debug, Default)]
pub struct CallReceipt {
    pub operation: &'static str,
    pub tx_hash: B256,
    pub block_number: u64,
    pub minted: Option<Minted>,
    pub decreased: Option<AmountPair>,
    pub collected: Option<AmountPair>,
}
