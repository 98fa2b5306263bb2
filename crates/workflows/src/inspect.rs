use alloy_primitives::U256;
use rangekeeper_chain::ChainClient;
use rangekeeper_math::tick_to_price;
use rangekeeper_types::{KeeperError, KeeperSettings};
use tracing::debug;

/// Read-only view of a position against the live pool price.
#[derive(Clone, Debug)]
pub struct PositionSnapshot {
    pub token_id: U256,
    pub liquidity: u128,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub price_lower: f64,
    pub price_upper: f64,
    pub price_current: f64,
    pub in_range: bool,
    /// Share of the deposit currently held as each token, linearly
    /// interpolated across the tick range and pinned to 0/100 outside it.
    pub token0_share: f64,
    pub token1_share: f64,
    pub fee_growth_inside0_x128: U256,
    pub fee_growth_inside1_x128: U256,
    pub tokens_owed0: u128,
    pub tokens_owed1: u128,
}

/// No writes: two back-to-back inspections of an untouched position return
/// identical snapshots.
pub async fn inspect_position<C: ChainClient>(
    settings: &KeeperSettings,
    client: &C,
    token_id: U256,
) -> Result<PositionSnapshot, KeeperError> {
    let position = client.position(token_id).await?;
    let state = client.pool_state(settings.pool.address).await?;
    debug!(%token_id, liquidity = position.liquidity, pool_tick = state.tick, "inspecting position");

    let base = &settings.base;
    let quote = &settings.quote;
    let at_lower_tick = tick_to_price(position.tick_lower, base, quote)?;
    let at_upper_tick = tick_to_price(position.tick_upper, base, quote)?;
    // a token1 base flips the price axis relative to the tick axis
    let (price_lower, price_upper) =
        if at_lower_tick <= at_upper_tick { (at_lower_tick, at_upper_tick) } else { (at_upper_tick, at_lower_tick) };
    let price_current = tick_to_price(state.tick, base, quote)?;

    let in_range = position.tick_lower <= state.tick && state.tick < position.tick_upper;
    let span = (position.tick_upper - position.tick_lower) as f64;
    let progress = ((state.tick - position.tick_lower) as f64 / span).clamp(0.0, 1.0);
    // at the lower boundary the position is entirely token0
    let token1_share = progress;
    let token0_share = 1.0 - progress;

    Ok(PositionSnapshot {
        token_id,
        liquidity: position.liquidity,
        tick_lower: position.tick_lower,
        tick_upper: position.tick_upper,
        price_lower,
        price_upper,
        price_current,
        in_range,
        token0_share,
        token1_share,
        fee_growth_inside0_x128: position.fee_growth_inside0_x128,
        fee_growth_inside1_x128: position.fee_growth_inside1_x128,
        tokens_owed0: position.tokens_owed0,
        tokens_owed1: position.tokens_owed1,
    })
}
