use alloy_primitives::utils::{parse_units, ParseUnits};
use alloy_primitives::{U256, U512};
use rangekeeper_types::{FeeTier, KeeperError, Token};

use crate::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio, isqrt_u512, nearest_usable_tick, MAX_TICK, MIN_TICK};

/// Fixed-point scale for decimal price strings on the input path.
const PRICE_SCALE_DECIMALS: u8 = 18;

fn pow10(exp: u8) -> U256 {
    U256::from(10u8).pow(U256::from(exp))
}

pub(crate) fn parse_positive_decimal(value: &str, what: &str) -> Result<U256, KeeperError> {
    let parsed =
        parse_units(value.trim(), PRICE_SCALE_DECIMALS).map_err(|e| KeeperError::InvalidInput(format!("{what} {value:?}: {e}")))?;
    match parsed {
        ParseUnits::U256(v) if !v.is_zero() => Ok(v),
        _ => Err(KeeperError::InvalidInput(format!("{what} must be positive, got {value:?}"))),
    }
}

/// The raw token1-per-token0 ratio as a rational, folding in orientation and
/// decimal normalization. `price` is quote-token units per one base-token
/// unit, already scaled by 10^18.
fn raw_ratio(price: U256, base: &Token, quote: &Token) -> Result<(U256, U256), KeeperError> {
    let overflow = || KeeperError::OutOfRange("price magnitude exceeds the supported domain".to_string());
    let scale = pow10(PRICE_SCALE_DECIMALS);
    if base.is_token0_of(quote) {
        // price is already token1 per token0
        let num = price.checked_mul(pow10(quote.decimals)).ok_or_else(overflow)?;
        let den = scale.checked_mul(pow10(base.decimals)).ok_or_else(overflow)?;
        Ok((num, den))
    } else {
        // base is token1: the pool convention inverts the supplied price
        let num = scale.checked_mul(pow10(base.decimals)).ok_or_else(overflow)?;
        let den = price.checked_mul(pow10(quote.decimals)).ok_or_else(overflow)?;
        Ok((num, den))
    }
}

fn sqrt_ratio_x96(num: U256, den: U256) -> U256 {
    let scaled = (U512::from(num) << 192) / U512::from(den);
    let root = isqrt_u512(scaled);
    // scaled < 2^448, so the root always fits 224 bits
    root.to::<U256>()
}

/// Maps a human price onto the pool's tick grid for the given fee tier.
pub fn price_to_tick(price: &str, base: &Token, quote: &Token, fee_tier: FeeTier) -> Result<i32, KeeperError> {
    if base.address == quote.address {
        return Err(KeeperError::InvalidInput("base and quote token must be distinct".to_string()));
    }
    let price = parse_positive_decimal(price, "price")?;
    let (num, den) = raw_ratio(price, base, quote)?;
    let tick = get_tick_at_sqrt_ratio(sqrt_ratio_x96(num, den))?;
    Ok(nearest_usable_tick(tick, fee_tier.tick_spacing()))
}

/// Human price at a tick; inverse of the orientation and normalization steps
/// of `price_to_tick`. The result is for display, converted to f64 at the
/// very end of the integer computation.
pub fn tick_to_price(tick: i32, base: &Token, quote: &Token) -> Result<f64, KeeperError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(KeeperError::OutOfRange(format!("tick {tick} outside [{MIN_TICK}, {MAX_TICK}]")));
    }
    let sqrt = get_sqrt_ratio_at_tick(tick)?;
    let ratio = U512::from(sqrt) * U512::from(sqrt);
    let q192 = U512::from(1u8) << 192;
    let (num, den) = if base.is_token0_of(quote) {
        (ratio * U512::from(pow10(base.decimals)), q192 * U512::from(pow10(quote.decimals)))
    } else {
        (q192 * U512::from(pow10(base.decimals)), ratio * U512::from(pow10(quote.decimals)))
    };
    Ok(u512_to_f64(num) / u512_to_f64(den))
}

/// Pure precondition check on price bounds; ticks are not involved.
pub fn validate_price_range(lower: &str, upper: &str) -> Result<(), KeeperError> {
    let lo = parse_positive_decimal(lower, "lower price bound")?;
    let hi = parse_positive_decimal(upper, "upper price bound")?;
    if lo >= hi {
        return Err(KeeperError::InvalidRange { lower: lower.to_string(), upper: upper.to_string() });
    }
    Ok(())
}

fn u512_to_f64(value: U512) -> f64 {
    let bits = value.bit_len();
    if bits <= 64 {
        return value.to::<u64>() as f64;
    }
    let shift = bits - 53;
    let mantissa = (value >> shift).to::<u64>();
    mantissa as f64 * 2f64.powi(shift as i32)
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

    fn dai() -> Token {
        Token::new(1, address!("6B175474E89094C44Da98b954EedeAC495271d0F"), 18, "DAI")
    }

    #[test]
    fn rejects_bad_price_input() {
        assert!(matches!(price_to_tick("0", &weth(), &usdc(), FeeTier::Medium), Err(KeeperError::InvalidInput(_))));
        assert!(matches!(price_to_tick("-1800", &weth(), &usdc(), FeeTier::Medium), Err(KeeperError::InvalidInput(_))));
        assert!(matches!(price_to_tick("nope", &weth(), &usdc(), FeeTier::Medium), Err(KeeperError::InvalidInput(_))));
        assert!(matches!(price_to_tick("1800", &weth(), &weth(), FeeTier::Medium), Err(KeeperError::InvalidInput(_))));
    }

    #[test]
    fn known_market_price_lands_on_the_expected_tick() {
        // USDC is token0, WETH is token1; 1800 USDC per WETH corresponds to
        // a raw ratio of ~5.5556e8 -> tick ~201357, quantized to spacing 60.
        let tick = price_to_tick("1800", &weth(), &usdc(), FeeTier::Medium).unwrap();
        assert_eq!(tick % 60, 0);
        assert!((201300..=201420).contains(&tick), "tick {tick}");
    }

    #[test]
    fn round_trip_within_tolerance_both_orientations() {
        let cases = ["0.0004", "0.85", "1.0", "42.5", "1800", "250000"];
        for price in cases {
            let reference: f64 = price.parse().unwrap();
            for (base, quote) in [(weth(), usdc()), (usdc(), weth()), (dai(), weth())] {
                let tick = price_to_tick(price, &base, &quote, FeeTier::Low).unwrap();
                let back = tick_to_price(tick, &base, &quote).unwrap();
                let rel = (back - reference).abs() / reference;
                assert!(rel < 0.01, "{price} {}->{} round-tripped to {back} (rel {rel})", base.symbol, quote.symbol);
            }
        }
    }

    #[test]
    fn orientation_symmetry() {
        // the same market quoted from either side resolves to one pool tick,
        // because a token1-based price is inverted into canonical orientation
        let tick_ab = price_to_tick("1800", &weth(), &usdc(), FeeTier::Medium).unwrap();
        let tick_ba = price_to_tick("0.000555555555555555", &usdc(), &weth(), FeeTier::Medium).unwrap();
        assert!((tick_ab - tick_ba).abs() <= FeeTier::Medium.tick_spacing(), "{tick_ab} vs {tick_ba}");
    }

    #[test]
    fn equal_decimals_unit_price_is_tick_zero() {
        assert_eq!(price_to_tick("1.0", &dai(), &weth(), FeeTier::Low).unwrap(), 0);
    }

    #[test]
    fn alignment_invariant_for_all_tiers() {
        for tier in [FeeTier::Low, FeeTier::Medium, FeeTier::High] {
            for price in ["0.001", "1.0", "3.5", "1800", "99999"] {
                let tick = price_to_tick(price, &weth(), &usdc(), tier).unwrap();
                assert_eq!(tick % tier.tick_spacing(), 0);
                assert!((MIN_TICK..=MAX_TICK).contains(&tick));
            }
        }
    }

    #[test]
    fn absurd_price_is_out_of_range() {
        let huge = "1".to_string() + &"0".repeat(45);
        assert!(matches!(price_to_tick(&huge, &dai(), &weth(), FeeTier::Low), Err(KeeperError::OutOfRange(_))));
    }

    #[test]
    fn tick_to_price_bounds() {
        assert!(matches!(tick_to_price(MAX_TICK + 1, &weth(), &usdc()), Err(KeeperError::OutOfRange(_))));
        assert!(matches!(tick_to_price(MIN_TICK - 1, &weth(), &usdc()), Err(KeeperError::OutOfRange(_))));
    }

    #[test]
    fn price_range_validation() {
        assert!(validate_price_range("1700", "1900").is_ok());
        assert!(matches!(validate_price_range("1900", "1700"), Err(KeeperError::InvalidRange { .. })));
        assert!(matches!(validate_price_range("1700", "1700"), Err(KeeperError::InvalidRange { .. })));
        assert!(matches!(validate_price_range("-1", "100"), Err(KeeperError::InvalidInput(_))));
        assert!(matches!(validate_price_range("0", "100"), Err(KeeperError::InvalidInput(_))));
    }
}
