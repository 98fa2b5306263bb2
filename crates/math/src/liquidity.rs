use alloy_primitives::{U256, U512};
use rangekeeper_types::{AmountPair, KeeperError, PoolState};

use crate::price::parse_positive_decimal;
use crate::tick_math::{ensure_usable_tick, get_sqrt_ratio_at_tick};

const BPS_DENOMINATOR: u64 = 10_000;

/// A sizing input is a positive decimal liquidity magnitude with 18 implied
/// fractional digits. Exposed so workflows can validate it before touching
/// the chain.
pub fn parse_size(size: &str) -> Result<u128, KeeperError> {
    parse_positive_decimal(size, "size")?
        .try_into()
        .map_err(|_| KeeperError::InvalidInput(format!("size {size:?} exceeds the liquidity domain")))
}

pub fn validate_slippage(slippage: f64) -> Result<(), KeeperError> {
    if !slippage.is_finite() || !(0.0..1.0).contains(&slippage) {
        return Err(KeeperError::InvalidInput(format!("slippage tolerance {slippage} outside [0, 1)")));
    }
    Ok(())
}

/// token0 owed across [sqrt_a, sqrt_b] for the given liquidity, floored:
/// floor(floor(L<<96 * (sb - sa) / sb) / sa).
pub fn amount0_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128) -> U256 {
    let (sa, sb) = if sqrt_a < sqrt_b { (sqrt_a, sqrt_b) } else { (sqrt_b, sqrt_a) };
    if liquidity == 0 || sa.is_zero() || sa == sb {
        return U256::ZERO;
    }
    let numerator1 = U512::from(liquidity) << 96;
    let numerator2 = U512::from(sb - sa);
    let interim: U512 = numerator1 * numerator2 / U512::from(sb) / U512::from(sa);
    // bounded by (L << 96) / sa < 2^192
    interim.to::<U256>()
}

/// token1 owed across [sqrt_a, sqrt_b], floored: floor(L * (sb - sa) / 2^96).
pub fn amount1_delta(sqrt_a: U256, sqrt_b: U256, liquidity: u128) -> U256 {
    let (sa, sb) = if sqrt_a < sqrt_b { (sqrt_a, sqrt_b) } else { (sqrt_b, sqrt_a) };
    if liquidity == 0 || sa == sb {
        return U256::ZERO;
    }
    let interim: U512 = (U512::from(liquidity) * U512::from(sb - sa)) >> 96;
    interim.to::<U256>()
}

/// Three-region constant-liquidity split: entirely token0 below the range,
/// entirely token1 above it, a boundary-distance mix inside.
pub fn amounts_for_liquidity(sqrt_price: U256, sqrt_lower: U256, sqrt_upper: U256, liquidity: u128) -> AmountPair {
    if sqrt_price <= sqrt_lower {
        AmountPair::new(amount0_delta(sqrt_lower, sqrt_upper, liquidity), U256::ZERO)
    } else if sqrt_price >= sqrt_upper {
        AmountPair::new(U256::ZERO, amount1_delta(sqrt_lower, sqrt_upper, liquidity))
    } else {
        AmountPair::new(amount0_delta(sqrt_price, sqrt_upper, liquidity), amount1_delta(sqrt_lower, sqrt_price, liquidity))
    }
}

fn saturate_u128(value: U512) -> u128 {
    if value > U512::from(u128::MAX) {
        u128::MAX
    } else {
        value.to::<u128>()
    }
}

fn liquidity_for_amount0(sqrt_a: U256, sqrt_b: U256, amount0: U256) -> u128 {
    let (sa, sb) = if sqrt_a < sqrt_b { (sqrt_a, sqrt_b) } else { (sqrt_b, sqrt_a) };
    if sa == sb {
        return u128::MAX;
    }
    let intermediate = (U512::from(sa) * U512::from(sb)) >> 96;
    saturate_u128(U512::from(amount0) * intermediate / U512::from(sb - sa))
}

fn liquidity_for_amount1(sqrt_a: U256, sqrt_b: U256, amount1: U256) -> u128 {
    let (sa, sb) = if sqrt_a < sqrt_b { (sqrt_a, sqrt_b) } else { (sqrt_b, sqrt_a) };
    if sa == sb {
        return u128::MAX;
    }
    saturate_u128((U512::from(amount1) << 96) / U512::from(sb - sa))
}

/// Largest liquidity whose required deposit stays within the given amounts;
/// truncated inverse of the delta formulas.
pub fn liquidity_for_amounts(sqrt_price: U256, sqrt_lower: U256, sqrt_upper: U256, amount0: U256, amount1: U256) -> u128 {
    let (sa, sb) = if sqrt_lower < sqrt_upper { (sqrt_lower, sqrt_upper) } else { (sqrt_upper, sqrt_lower) };
    if sqrt_price <= sa {
        liquidity_for_amount0(sa, sb, amount0)
    } else if sqrt_price >= sb {
        liquidity_for_amount1(sa, sb, amount1)
    } else {
        std::cmp::min(liquidity_for_amount0(sqrt_price, sb, amount0), liquidity_for_amount1(sa, sqrt_price, amount1))
    }
}

/// Desired deposit (or expected withdrawal) amounts for a liquidity change
/// over an aligned tick range. `size` is a positive decimal liquidity
/// magnitude with 18 implied fractional digits. All rounding is floor, so
/// the caller is never asked for more than intended.
pub fn optimal_amounts(state: &PoolState, tick_lower: i32, tick_upper: i32, spacing: i32, size: &str) -> Result<AmountPair, KeeperError> {
    if tick_lower >= tick_upper {
        return Err(KeeperError::InvalidRange { lower: tick_lower.to_string(), upper: tick_upper.to_string() });
    }
    ensure_usable_tick(tick_lower, spacing)?;
    ensure_usable_tick(tick_upper, spacing)?;
    let liquidity = parse_size(size)?;

    let sqrt_lower = get_sqrt_ratio_at_tick(tick_lower)?;
    let sqrt_upper = get_sqrt_ratio_at_tick(tick_upper)?;
    let amounts = amounts_for_liquidity(state.sqrt_price_x96, sqrt_lower, sqrt_upper, liquidity);
    if amounts.is_zero() {
        return Err(KeeperError::InvalidPosition(format!(
            "range [{tick_lower}, {tick_upper}] yields zero amounts at the current pool price"
        )));
    }
    Ok(amounts)
}

/// Slippage-deflated lower bounds, computed in basis points so there is no
/// floating-point drift: amount * round((1 - slippage) * 10000) / 10000.
pub fn minimum_amounts(amounts: &AmountPair, slippage: f64) -> Result<AmountPair, KeeperError> {
    validate_slippage(slippage)?;
    let multiplier = U256::from(((1.0 - slippage) * BPS_DENOMINATOR as f64).round() as u64);
    let denominator = U256::from(BPS_DENOMINATOR);
    Ok(AmountPair::new(amounts.amount0 * multiplier / denominator, amounts.amount1 * multiplier / denominator))
}

/// Liquidity share for a partial withdrawal, truncated so the tool never
/// removes more than entitled.
pub fn withdraw_share(liquidity: u128, percentage: u8) -> u128 {
    (liquidity / 100) * percentage as u128 + (liquidity % 100) * percentage as u128 / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at_tick(tick: i32) -> PoolState {
        PoolState { sqrt_price_x96: get_sqrt_ratio_at_tick(tick).unwrap(), tick, ..PoolState::default() }
    }

    const ONE_E18: &str = "1.0";

    #[test]
    fn price_inside_range_needs_both_tokens() {
        let amounts = optimal_amounts(&state_at_tick(0), -600, 600, 60, ONE_E18).unwrap();
        assert!(amounts.amount0 > U256::ZERO);
        assert!(amounts.amount1 > U256::ZERO);
    }

    #[test]
    fn price_below_range_needs_only_token0() {
        let amounts = optimal_amounts(&state_at_tick(-1200), 600, 1200, 60, ONE_E18).unwrap();
        assert!(amounts.amount0 > U256::ZERO);
        assert_eq!(amounts.amount1, U256::ZERO);
    }

    #[test]
    fn price_above_range_needs_only_token1() {
        let amounts = optimal_amounts(&state_at_tick(1800), 600, 1200, 60, ONE_E18).unwrap();
        assert_eq!(amounts.amount0, U256::ZERO);
        assert!(amounts.amount1 > U256::ZERO);
    }

    #[test]
    fn degenerate_range_is_rejected() {
        // 1 wei of liquidity far below the range floors both sides to zero
        let err = optimal_amounts(&state_at_tick(-887220), 887160, 887220, 60, "0.000000000000000001").unwrap_err();
        assert!(matches!(err, KeeperError::InvalidPosition(_)));
    }

    #[test]
    fn range_and_alignment_preconditions() {
        let state = state_at_tick(0);
        assert!(matches!(optimal_amounts(&state, 600, 600, 60, ONE_E18), Err(KeeperError::InvalidRange { .. })));
        assert!(matches!(optimal_amounts(&state, 600, -600, 60, ONE_E18), Err(KeeperError::InvalidRange { .. })));
        assert!(matches!(optimal_amounts(&state, -601, 600, 60, ONE_E18), Err(KeeperError::InvalidTickAlignment { .. })));
        assert!(matches!(optimal_amounts(&state, -600, 601, 60, ONE_E18), Err(KeeperError::InvalidTickAlignment { .. })));
        assert!(matches!(optimal_amounts(&state, -600, 600, 60, "0"), Err(KeeperError::InvalidInput(_))));
        assert!(matches!(optimal_amounts(&state, -600, 600, 60, "-3"), Err(KeeperError::InvalidInput(_))));
    }

    #[test]
    fn amount_deltas_are_symmetric_in_bounds() {
        let sa = get_sqrt_ratio_at_tick(-600).unwrap();
        let sb = get_sqrt_ratio_at_tick(600).unwrap();
        let liq = 10_u128.pow(18);
        assert_eq!(amount0_delta(sa, sb, liq), amount0_delta(sb, sa, liq));
        assert_eq!(amount1_delta(sa, sb, liq), amount1_delta(sb, sa, liq));
        assert_eq!(amount0_delta(sa, sa, liq), U256::ZERO);
        assert_eq!(amount0_delta(sa, sb, 0), U256::ZERO);
    }

    #[test]
    fn liquidity_inverts_amounts_within_rounding() {
        let sa = get_sqrt_ratio_at_tick(-600).unwrap();
        let sb = get_sqrt_ratio_at_tick(600).unwrap();
        let price = get_sqrt_ratio_at_tick(0).unwrap();
        let liq = 10_u128.pow(18);
        let amounts = amounts_for_liquidity(price, sa, sb, liq);
        let recovered = liquidity_for_amounts(price, sa, sb, amounts.amount0, amounts.amount1);
        assert!(recovered <= liq);
        assert!(liq - recovered < liq / 1_000_000, "recovered {recovered}");
    }

    #[test]
    fn slippage_is_exact_basis_point_arithmetic() {
        let amounts = AmountPair::new(U256::from(1_000_000u64), U256::from(1_000_000u64));
        let min = minimum_amounts(&amounts, 0.005).unwrap();
        assert_eq!(min.amount0, U256::from(995_000u64));
        assert_eq!(min.amount1, U256::from(995_000u64));
    }

    #[test]
    fn zero_slippage_keeps_amounts_identical() {
        let amounts = AmountPair::new(U256::from(777u64), U256::from(1u64));
        let min = minimum_amounts(&amounts, 0.0).unwrap();
        assert_eq!(min, amounts);
    }

    #[test]
    fn minimums_never_exceed_desired() {
        let amounts = AmountPair::new(U256::from(123_456_789u64), U256::from(42u64));
        for slippage in [0.0001, 0.005, 0.03, 0.5, 0.9999] {
            let min = minimum_amounts(&amounts, slippage).unwrap();
            assert!(min.amount0 <= amounts.amount0);
            assert!(min.amount1 <= amounts.amount1);
            if slippage >= 0.0001 {
                assert!(min.amount0 < amounts.amount0);
            }
        }
    }

    #[test]
    fn slippage_bounds_are_validated() {
        let amounts = AmountPair::new(U256::from(1u64), U256::from(1u64));
        assert!(matches!(minimum_amounts(&amounts, 1.0), Err(KeeperError::InvalidInput(_))));
        assert!(matches!(minimum_amounts(&amounts, -0.1), Err(KeeperError::InvalidInput(_))));
        assert!(matches!(minimum_amounts(&amounts, f64::NAN), Err(KeeperError::InvalidInput(_))));
    }

    #[test]
    fn withdraw_share_truncates() {
        assert_eq!(withdraw_share(1000, 100), 1000);
        assert_eq!(withdraw_share(1000, 50), 500);
        assert_eq!(withdraw_share(99, 50), 49);
        assert_eq!(withdraw_share(1, 99), 0);
        assert_eq!(withdraw_share(u128::MAX, 100), u128::MAX);
    }
}
