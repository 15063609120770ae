//! Tick Math
//!
//! Converts between tick indices and Q64.96 sqrt prices.
//! Based on Uniswap V3's TickMath library.
//!
//! sqrt_price = sqrt(1.0001^tick) * 2^96
//! tick = greatest tick whose sqrt price is <= the given sqrt price

use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK};
use crate::errors::PoolError;
use crate::math::U256;
use anchor_lang::prelude::*;

/// 1/sqrt(1.0001)^(2^i) as Q128.128, for i = 1..=19 (bit 0 is handled separately)
const TICK_RATIOS: [u128; 19] = [
    0xfff97272373d413259a46990580e213a,
    0xfff2e50f5f656932ef12357cf3c7fdcc,
    0xffe5caca7e10e4e61c3624eaa0941cd0,
    0xffcb9843d60f6159c9db58835c926644,
    0xff973b41fa98c081472e6896dfb254c0,
    0xff2ea16466c96a3843ec78b326b52861,
    0xfe5dee046a99a2a811c461f1969c3053,
    0xfcbe86c7900a88aedcffc83b479aa3a4,
    0xf987a7253ac413176f2b074cf7815e54,
    0xf3392b0822b70005940c7a398e4b70f3,
    0xe7159475a2c29b7443b29c7fa6e889d9,
    0xd097f3bdfd2022b8845ad8f792aa5825,
    0xa9f746462d870fdf8a65dc1f90e061e5,
    0x70d869a156d2a1b890bb3df62baf32f7,
    0x31be135f97d08fd981231505542fcfa6,
    0x9aa508b5b7a84e1c677de54f3e99bc9,
    0x5d6af8dedb81196699c329225ee604,
    0x2216e584f5fa1ea926041bedfe98,
    0x48a170391f7dc42444e8fa2,
];

/// 1/sqrt(1.0001) as Q128.128
const TICK_RATIO_BIT_0: u128 = 0xfffcb933bd6fad37aa2d162d1a594001;

/// Calculate sqrt(1.0001^tick) * 2^96
///
/// # Arguments
/// * `tick` - Tick index in [MIN_TICK, MAX_TICK]
///
/// # Returns
/// * Q64.96 sqrt price, rounded up so that `get_tick_at_sqrt_ratio` of the
///   result is always `tick`
pub fn get_sqrt_ratio_at_tick(tick: i32) -> Result<U256> {
    require!(
        (MIN_TICK..=MAX_TICK).contains(&tick),
        PoolError::TickOutOfBounds
    );

    let abs_tick = tick.unsigned_abs();

    let mut ratio = if abs_tick & 0x1 != 0 {
        U256::from(TICK_RATIO_BIT_0)
    } else {
        U256::one() << 128
    };

    for (i, magic) in TICK_RATIOS.iter().enumerate() {
        if abs_tick & (0x2 << i) != 0 {
            // ratio <= 2^128 and magic < 2^128, the product fits in 256 bits
            ratio = (ratio * U256::from(*magic)) >> 128;
        }
    }

    if tick > 0 {
        ratio = U256::MAX / ratio;
    }

    // Q128.128 -> Q128.96, rounding up
    let rounding = if (ratio & U256::from(u32::MAX)).is_zero() {
        U256::zero()
    } else {
        U256::one()
    };

    Ok((ratio >> 32) + rounding)
}

/// Calculate the greatest tick whose sqrt price is <= `sqrt_price_x96`
///
/// Binary search over the tick range against `get_sqrt_ratio_at_tick`, which
/// makes the pair exactly inverse to each other.
///
/// # Errors
/// * `SqrtPriceOutOfBounds` if the price is below MIN_SQRT_RATIO or at/above MAX_SQRT_RATIO
pub fn get_tick_at_sqrt_ratio(sqrt_price_x96: U256) -> Result<i32> {
    require!(
        sqrt_price_x96 >= MIN_SQRT_RATIO && sqrt_price_x96 < MAX_SQRT_RATIO,
        PoolError::SqrtPriceOutOfBounds
    );

    let mut low = MIN_TICK;
    let mut high = MAX_TICK;

    while low < high {
        let mid = low + (high - low + 1) / 2;
        if get_sqrt_ratio_at_tick(mid)? <= sqrt_price_x96 {
            low = mid;
        } else {
            high = mid - 1;
        }
    }

    Ok(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;
    use proptest::prelude::*;

    #[test]
    fn test_bounds() {
        assert_eq!(get_sqrt_ratio_at_tick(MIN_TICK).unwrap(), MIN_SQRT_RATIO);
        assert_eq!(get_sqrt_ratio_at_tick(MAX_TICK).unwrap(), MAX_SQRT_RATIO);
        assert_eq!(
            MAX_SQRT_RATIO,
            U256::from_dec_str("1461446703485210103287273052203988822378723970342").unwrap()
        );
    }

    #[test]
    fn test_tick_out_of_bounds() {
        assert!(get_sqrt_ratio_at_tick(MIN_TICK - 1).is_err());
        assert!(get_sqrt_ratio_at_tick(MAX_TICK + 1).is_err());
    }

    #[test]
    fn test_tick_zero_is_one() {
        assert_eq!(get_sqrt_ratio_at_tick(0).unwrap(), Q96);
        assert_eq!(get_tick_at_sqrt_ratio(Q96).unwrap(), 0);
    }

    #[test]
    fn test_min_tick_plus_one() {
        assert_eq!(
            get_sqrt_ratio_at_tick(MIN_TICK + 1).unwrap(),
            U256::from(4295343490u64)
        );
        assert_eq!(
            get_sqrt_ratio_at_tick(MAX_TICK - 1).unwrap(),
            U256::from_dec_str("1461373636630004318706518188784493106690254656249").unwrap()
        );
    }

    #[test]
    fn test_tick_at_sqrt_ratio_bounds() {
        assert_eq!(get_tick_at_sqrt_ratio(MIN_SQRT_RATIO).unwrap(), MIN_TICK);
        assert_eq!(get_tick_at_sqrt_ratio(MAX_SQRT_RATIO - 1).unwrap(), MAX_TICK - 1);
        assert!(get_tick_at_sqrt_ratio(MIN_SQRT_RATIO - 1).is_err());
        assert!(get_tick_at_sqrt_ratio(MAX_SQRT_RATIO).is_err());
    }

    #[test]
    fn test_tick_at_sqrt_ratio_between_ticks() {
        let at_10 = get_sqrt_ratio_at_tick(10).unwrap();
        let at_11 = get_sqrt_ratio_at_tick(11).unwrap();
        assert_eq!(get_tick_at_sqrt_ratio(at_10 + 1).unwrap(), 10);
        assert_eq!(get_tick_at_sqrt_ratio(at_11 - 1).unwrap(), 10);
        assert_eq!(get_tick_at_sqrt_ratio(at_11).unwrap(), 11);
    }

    #[test]
    fn test_sqrt_ratio_monotonic() {
        let mut previous = get_sqrt_ratio_at_tick(-1000).unwrap();
        for tick in -999..=1000 {
            let current = get_sqrt_ratio_at_tick(tick).unwrap();
            assert!(current > previous, "not increasing at tick {}", tick);
            previous = current;
        }
    }

    proptest! {
        #[test]
        fn prop_tick_round_trip(tick in MIN_TICK..=MAX_TICK) {
            let sqrt_price = get_sqrt_ratio_at_tick(tick).unwrap();
            prop_assume!(sqrt_price < MAX_SQRT_RATIO);
            prop_assert_eq!(get_tick_at_sqrt_ratio(sqrt_price).unwrap(), tick);
        }

        #[test]
        fn prop_price_just_below_next_tick(tick in MIN_TICK..MAX_TICK) {
            let next = get_sqrt_ratio_at_tick(tick + 1).unwrap();
            prop_assert_eq!(get_tick_at_sqrt_ratio(next - 1).unwrap(), tick);
        }
    }
}
