use alloy_primitives::{U256, U512};
use rangekeeper_types::KeeperError;

/// Global tick bounds shared by every fee tier.
pub const MIN_TICK: i32 = -887272;
pub const MAX_TICK: i32 = 887272;

/// sqrt(1.0001^MIN_TICK) * 2^96
pub const MIN_SQRT_RATIO: U256 = U256::from_limbs([4295128739, 0, 0, 0]);
/// sqrt(1.0001^MAX_TICK) * 2^96
pub const MAX_SQRT_RATIO: U256 = U256::from_limbs([6743328256752651558, 17280870778742802505, 4294805859, 0]);

/// Q64.96 square-root price for a tick, canonical bit-decomposition over the
/// Q128.128 magic multipliers with a round-up downshift at the end.
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256, KeeperError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(KeeperError::OutOfRange(format!("tick {tick} outside [{MIN_TICK}, {MAX_TICK}]")));
    }
    let abs_tick = tick.unsigned_abs();

    let mut ratio: U256 =
        if abs_tick & 0x1 != 0 { U256::from(0xfffcb933bd6fad37aa2d162d1a594001_u128) } else { U256::from(1u8) << 128 };
    if abs_tick & 0x2 != 0 {
        ratio = (ratio * U256::from(0xfff97272373d413259a46990580e213a_u128)) >> 128
    }
    if abs_tick & 0x4 != 0 {
        ratio = (ratio * U256::from(0xfff2e50f5f656932ef12357cf3c7fdcc_u128)) >> 128
    }
    if abs_tick & 0x8 != 0 {
        ratio = (ratio * U256::from(0xffe5caca7e10e4e61c3624eaa0941cd0_u128)) >> 128
    }
    if abs_tick & 0x10 != 0 {
        ratio = (ratio * U256::from(0xffcb9843d60f6159c9db58835c926644_u128)) >> 128
    }
    if abs_tick & 0x20 != 0 {
        ratio = (ratio * U256::from(0xff973b41fa98c081472e6896dfb254c0_u128)) >> 128
    }
    if abs_tick & 0x40 != 0 {
        ratio = (ratio * U256::from(0xff2ea16466c96a3843ec78b326b52861_u128)) >> 128
    }
    if abs_tick & 0x80 != 0 {
        ratio = (ratio * U256::from(0xfe5dee046a99a2a811c461f1969c3053_u128)) >> 128
    }
    if abs_tick & 0x100 != 0 {
        ratio = (ratio * U256::from(0xfcbe86c7900a88aedcffc83b479aa3a4_u128)) >> 128
    }
    if abs_tick & 0x200 != 0 {
        ratio = (ratio * U256::from(0xf987a7253ac413176f2b074cf7815e54_u128)) >> 128
    }
    if abs_tick & 0x400 != 0 {
        ratio = (ratio * U256::from(0xf3392b0822b70005940c7a398e4b70f3_u128)) >> 128
    }
    if abs_tick & 0x800 != 0 {
        ratio = (ratio * U256::from(0xe7159475a2c29b7443b29c7fa6e889d9_u128)) >> 128
    }
    if abs_tick & 0x1000 != 0 {
        ratio = (ratio * U256::from(0xd097f3bdfd2022b8845ad8f792aa5825_u128)) >> 128
    }
    if abs_tick & 0x2000 != 0 {
        ratio = (ratio * U256::from(0xa9f746462d870fdf8a65dc1f90e061e5_u128)) >> 128
    }
    if abs_tick & 0x4000 != 0 {
        ratio = (ratio * U256::from(0x70d869a156d2a1b890bb3df62baf32f7_u128)) >> 128
    }
    if abs_tick & 0x8000 != 0 {
        ratio = (ratio * U256::from(0x31be135f97d08fd981231505542fcfa6_u128)) >> 128
    }
    if abs_tick & 0x10000 != 0 {
        ratio = (ratio * U256::from(0x9aa508b5b7a84e1c677de54f3e99bc9_u128)) >> 128
    }
    if abs_tick & 0x20000 != 0 {
        ratio = (ratio * U256::from(0x5d6af8dedb81196699c329225ee604_u128)) >> 128
    }
    if abs_tick & 0x40000 != 0 {
        ratio = (ratio * U256::from(0x2216e584f5fa1ea926041bedfe98_u128)) >> 128
    }
    if abs_tick & 0x80000 != 0 {
        ratio = (ratio * U256::from(0x48a170391f7dc42444e8fa2_u128)) >> 128
    }

    if tick > 0 {
        ratio = U256::MAX / ratio
    }

    // Q128.128 -> Q64.96, rounding up so the inverse mapping stays consistent.
    Ok((ratio >> 32) + if (ratio % (U256::from(1u64) << 32usize)).is_zero() { U256::ZERO } else { U256::from(1u8) })
}

/// Largest tick whose sqrt ratio is <= the input; exact inverse of
/// `get_sqrt_ratio_at_tick` on the tick grid, found by binary search.
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32, KeeperError> {
    if sqrt_price_x96 < MIN_SQRT_RATIO || sqrt_price_x96 >= MAX_SQRT_RATIO {
        return Err(KeeperError::OutOfRange(format!("sqrt price {sqrt_price_x96} outside the protocol domain")));
    }
    let mut lo = MIN_TICK;
    let mut hi = MAX_TICK;
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Ok(lo)
}

/// Rounds to the nearest tick on the spacing grid, then snaps into the
/// innermost aligned ticks within the global bounds.
pub fn nearest_usable_tick(tick: i32, spacing: i32) -> i32 {
    let rem = tick.rem_euclid(spacing);
    let quantized = if 2 * rem >= spacing { tick - rem + spacing } else { tick - rem };
    let max_aligned = (MAX_TICK / spacing) * spacing;
    quantized.clamp(-max_aligned, max_aligned)
}

/// A tick passed to a chain call must sit on the spacing grid and inside the
/// global bounds.
pub fn ensure_usable_tick(tick: i32, spacing: i32) -> Result<(), KeeperError> {
    if !(MIN_TICK..=MAX_TICK).contains(&tick) {
        return Err(KeeperError::OutOfRange(format!("tick {tick} outside [{MIN_TICK}, {MAX_TICK}]")));
    }
    if tick % spacing != 0 {
        return Err(KeeperError::InvalidTickAlignment { tick, spacing });
    }
    Ok(())
}

/// Newton iteration; the initial guess starts above the root so the sequence
/// decreases monotonically to floor(sqrt(value)).
pub(crate) fn isqrt_u512(value: U512) -> U512 {
    if value.is_zero() {
        return U512::ZERO;
    }
    let shift = (value.bit_len() + 1) / 2;
    let mut x = U512::from(1u8) << shift;
    loop {
        let y = (x + value / x) >> 1;
        if y >= x {
            return x;
        }
        x = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_ratio_known_points() {
        // 2^96 at tick zero
        assert_eq!(get_sqrt_ratio_at_tick(0).unwrap(), U256::from(79228162514264337593543950336_u128));
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert!(get_sqrt_ratio_at_tick(MAX_TICK + 1).is_err());
        assert!(get_sqrt_ratio_at_tick(MIN_TICK - 1).is_err());
    }

    #[test]
    fn sqrt_ratio_is_monotonic() {
        for tick in [-887272, -500000, -1000, -1, 0, 1, 1000, 500000, 887271] {
            assert!(get_sqrt_ratio_at_tick(tick).unwrap() < get_sqrt_ratio_at_tick(tick + 1).unwrap());
        }
    }

    #[test]
    fn tick_at_sqrt_ratio_inverts_on_grid() {
        for tick in [MIN_TICK, -201360, -60, 0, 60, 201360, MAX_TICK - 1] {
            let ratio = get_sqrt_ratio_at_tick(tick).unwrap();
            assert_eq!(get_tick_at_sqrt_ratio(ratio).unwrap(), tick);
        }
        assert_eq!(get_tick_at_sqrt_ratio(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(get_tick_at_sqrt_ratio(MAX_SQRT_RATIO - U256::from(1u8)).unwrap(), MAX_TICK - 1);
        assert!(get_tick_at_sqrt_ratio(MAX_SQRT_RATIO).is_err());
        assert!(get_tick_at_sqrt_ratio(MIN_SQRT_RATIO - U256::from(1u8)).is_err());
    }

    #[test]
    fn usable_tick_rounds_to_nearest() {
        assert_eq!(nearest_usable_tick(0, 60), 0);
        assert_eq!(nearest_usable_tick(29, 60), 0);
        assert_eq!(nearest_usable_tick(30, 60), 60);
        assert_eq!(nearest_usable_tick(-29, 60), 0);
        assert_eq!(nearest_usable_tick(-31, 60), -60);
        // rounding may not push past the innermost aligned bound
        assert_eq!(nearest_usable_tick(887271, 60), 887220);
        assert_eq!(nearest_usable_tick(-887271, 60), -887220);
    }

    #[test]
    fn usable_tick_checks() {
        assert!(ensure_usable_tick(120, 60).is_ok());
        assert!(matches!(ensure_usable_tick(121, 60), Err(KeeperError::InvalidTickAlignment { .. })));
        assert!(matches!(ensure_usable_tick(887280, 60), Err(KeeperError::OutOfRange(_))));
    }

    #[test]
    fn isqrt_exact_squares() {
        for v in [0u128, 1, 4, 9, 1 << 96, 10_000_000_000_000_000_000_000] {
            let root = isqrt_u512(U512::from(v) * U512::from(v));
            assert_eq!(root, U512::from(v));
        }
        assert_eq!(isqrt_u512(U512::from(8u8)), U512::from(2u8));
    }
}
