use alloy_primitives::{B256, U256};
use rangekeeper_chain::{ChainClient, MintCall, WriteCall};
use rangekeeper_math::{minimum_amounts, optimal_amounts, parse_size, price_to_tick, validate_price_range, validate_slippage};
use rangekeeper_types::{AmountPair, KeeperError, KeeperSettings};
use tracing::{debug, info};

use crate::{deadline, ensure_allowance, order_ticks};

#[derive(Clone, Debug)]
pub struct OpenParams {
    pub price_lower: String,
    pub price_upper: String,
    /// Liquidity sizing input, a positive decimal.
    pub size: String,
    pub slippage: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct OpenOutcome {
    pub token_id: U256,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: u128,
    pub desired: AmountPair,
    pub minimums: AmountPair,
    pub tx_hash: B256,
}

/// Opens a new position: validate, read pool state, convert the price bounds
/// to ticks, size the amounts, approve, mint, confirm.
pub async fn open_position<C: ChainClient>(
    settings: &KeeperSettings,
    client: &C,
    params: &OpenParams,
) -> Result<OpenOutcome, KeeperError> {
    // all validation happens before the first chain call
    validate_price_range(&params.price_lower, &params.price_upper)?;
    let slippage = settings.slippage_or_default(params.slippage);
    validate_slippage(slippage)?;
    parse_size(&params.size)?;
    let pool = &settings.pool;
    let tick_a = price_to_tick(&params.price_lower, &settings.base, &settings.quote, pool.fee_tier)?;
    let tick_b = price_to_tick(&params.price_upper, &settings.base, &settings.quote, pool.fee_tier)?;
    let (tick_lower, tick_upper) = order_ticks(tick_a, tick_b)?;
    debug!(tick_lower, tick_upper, "price bounds mapped onto the tick grid");

    let state = client.pool_state(pool.address).await?;
    debug!(tick = state.tick, "pool state fetched");

    let desired = optimal_amounts(&state, tick_lower, tick_upper, pool.tick_spacing(), &params.size)?;
    let minimums = minimum_amounts(&desired, slippage)?;
    debug!(amount0 = %desired.amount0, amount1 = %desired.amount1, "computed deposit amounts");

    ensure_allowance(client, settings, pool.token0.address, desired.amount0).await?;
    ensure_allowance(client, settings, pool.token1.address, desired.amount1).await?;

    let call = WriteCall::Mint(MintCall {
        token0: pool.token0.address,
        token1: pool.token1.address,
        fee: pool.fee_tier.fee(),
        tick_lower,
        tick_upper,
        amount0_desired: desired.amount0,
        amount1_desired: desired.amount1,
        amount0_min: minimums.amount0,
        amount1_min: minimums.amount1,
        recipient: settings.recipient,
        deadline: deadline(settings),
    });
    let pending = client.submit(call).await?;
    let receipt = client.confirm(pending).await?;
    let minted = receipt
        .minted
        .ok_or(KeeperError::Unknown { operation: "mint", reason: "confirmation carried no liquidity event".to_string() })?;

    info!(token_id = %minted.token_id, liquidity = minted.liquidity, tx = %receipt.tx_hash, "position opened");
    Ok(OpenOutcome {
        token_id: minted.token_id,
        tick_lower,
        tick_upper,
        liquidity: minted.liquidity,
        desired,
        minimums,
        tx_hash: receipt.tx_hash,
    })
}
