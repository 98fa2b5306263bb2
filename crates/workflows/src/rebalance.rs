use alloy_primitives::U256;
use rangekeeper_chain::{ChainClient, CollectCall, DecreaseCall, MintCall, WriteCall};
use rangekeeper_math::{
    amounts_for_liquidity, get_sqrt_ratio_at_tick, liquidity_for_amounts, minimum_amounts, price_to_tick, validate_price_range,
    validate_slippage,
};
use rangekeeper_types::{AmountPair, KeeperError, KeeperSettings};
use tracing::{debug, info, warn};

use crate::{deadline, ensure_allowance, order_ticks};

#[derive(Clone, Debug)]
pub struct RebalanceParams {
    pub token_id: U256,
    pub price_lower: String,
    pub price_upper: String,
    pub slippage: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct RebalanceOutcome {
    pub old_token_id: U256,
    pub new_token_id: U256,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub collected: AmountPair,
    pub redeployed: AmountPair,
}

/// Moves the full position onto a new price range: remove all liquidity,
/// collect principal plus fees, mint the collected amounts into the new
/// range. The three writes are separate transactions; an interruption leaves
/// the funds collected-but-undeployed, which the precondition below detects
/// on the next attempt.
pub async fn rebalance_position<C: ChainClient>(
    settings: &KeeperSettings,
    client: &C,
    params: &RebalanceParams,
) -> Result<RebalanceOutcome, KeeperError> {
    validate_price_range(&params.price_lower, &params.price_upper)?;
    let slippage = settings.slippage_or_default(params.slippage);
    validate_slippage(slippage)?;
    let pool = &settings.pool;
    let tick_a = price_to_tick(&params.price_lower, &settings.base, &settings.quote, pool.fee_tier)?;
    let tick_b = price_to_tick(&params.price_upper, &settings.base, &settings.quote, pool.fee_tier)?;
    let (tick_lower, tick_upper) = order_ticks(tick_a, tick_b)?;

    let position = client.position(params.token_id).await?;
    if position.liquidity == 0 {
        if position.has_owed_tokens() {
            // a previous attempt stopped between removal and re-mint; do not
            // guess at resuming with stale parameters
            return Err(KeeperError::InvalidPosition(format!(
                "position {} holds no liquidity but {} / {} uncollected tokens; a prior rebalance appears interrupted, collect and redeploy manually",
                params.token_id, position.tokens_owed0, position.tokens_owed1
            )));
        }
        return Err(KeeperError::InvalidPosition(format!("position {} has no liquidity to rebalance", params.token_id)));
    }

    let state = client.pool_state(pool.address).await?;
    let sqrt_lower = get_sqrt_ratio_at_tick(position.tick_lower)?;
    let sqrt_upper = get_sqrt_ratio_at_tick(position.tick_upper)?;
    let expected = amounts_for_liquidity(state.sqrt_price_x96, sqrt_lower, sqrt_upper, position.liquidity);
    // real lower bounds for the removal, not the historical zero minimums
    let removal_minimums = minimum_amounts(&expected, slippage)?;
    debug!(liquidity = position.liquidity, amount0 = %expected.amount0, amount1 = %expected.amount1, "removing existing range");

    let pending = client
        .submit(WriteCall::DecreaseLiquidity(DecreaseCall {
            token_id: params.token_id,
            liquidity: position.liquidity,
            amount0_min: removal_minimums.amount0,
            amount1_min: removal_minimums.amount1,
            deadline: deadline(settings),
        }))
        .await?;
    let removal = client.confirm(pending).await?;
    if removal.decreased.is_none() {
        warn!(token_id = %params.token_id, "decrease confirmed without a liquidity event");
    }

    let pending = client
        .submit(WriteCall::Collect(CollectCall {
            token_id: params.token_id,
            recipient: client.caller(),
            amount0_max: u128::MAX,
            amount1_max: u128::MAX,
        }))
        .await?;
    let collected = client
        .confirm(pending)
        .await?
        .collected
        .ok_or(KeeperError::Unknown { operation: "collect", reason: "confirmation carried no collect event".to_string() })?;
    if collected.is_zero() {
        return Err(KeeperError::InvalidPosition(format!("position {} released no tokens to redeploy", params.token_id)));
    }
    debug!(amount0 = %collected.amount0, amount1 = %collected.amount1, "collected principal and fees");

    ensure_allowance(client, settings, pool.token0.address, collected.amount0).await?;
    ensure_allowance(client, settings, pool.token1.address, collected.amount1).await?;

    // the new range may be one-sided at the current price, so the lower
    // bounds come from the amounts the mint is expected to consume rather
    // than from the collected pair
    let new_sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
    let new_sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;
    let redeploy_liquidity = liquidity_for_amounts(state.sqrt_price_x96, new_sqrt_lower, new_sqrt_upper, collected.amount0, collected.amount1);
    if redeploy_liquidity == 0 {
        return Err(KeeperError::InvalidPosition(format!(
            "collected amounts from position {} cannot seed liquidity in the new range",
            params.token_id
        )));
    }
    let expected_redeploy = amounts_for_liquidity(state.sqrt_price_x96, new_sqrt_lower, new_sqrt_upper, redeploy_liquidity);
    let mint_minimums = minimum_amounts(&expected_redeploy, slippage)?;
    let pending = client
        .submit(WriteCall::Mint(MintCall {
            token0: pool.token0.address,
            token1: pool.token1.address,
            fee: pool.fee_tier.fee(),
            tick_lower,
            tick_upper,
            amount0_desired: collected.amount0,
            amount1_desired: collected.amount1,
            amount0_min: mint_minimums.amount0,
            amount1_min: mint_minimums.amount1,
            recipient: settings.recipient,
            deadline: deadline(settings),
        }))
        .await?;
    let minted = client
        .confirm(pending)
        .await?
        .minted
        .ok_or(KeeperError::Unknown { operation: "mint", reason: "confirmation carried no liquidity event".to_string() })?;

    info!(old = %params.token_id, new = %minted.token_id, tick_lower, tick_upper, "position rebalanced");
    Ok(RebalanceOutcome {
        old_token_id: params.token_id,
        new_token_id: minted.token_id,
        tick_lower,
        tick_upper,
        collected,
        redeployed: minted.amounts,
    })
}
