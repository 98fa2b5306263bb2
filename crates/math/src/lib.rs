pub use liquidity::{
    amount0_delta, amount1_delta, amounts_for_liquidity, liquidity_for_amounts, minimum_amounts, optimal_amounts, parse_size,
    validate_slippage, withdraw_share,
};
pub use price::{price_to_tick, tick_to_price, validate_price_range};
pub use tick_math::{
    ensure_usable_tick, get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, nearest_usable_tick, MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO,
    MIN_TICK,
};

mod liquidity;
mod price;
mod tick_math;
