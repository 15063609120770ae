//! Liquidity Math
//!
//! Signed liquidity updates, plus conversions between token amounts and
//! liquidity for callers sizing a position.

use crate::constants::Q96;
use crate::errors::PoolError;
use crate::math::full_math::mul_div;
use crate::math::sqrt_price_math::{get_amount0_delta, get_amount1_delta};
use crate::math::U256;
use anchor_lang::prelude::*;

/// Add a signed liquidity delta to existing liquidity
///
/// # Errors
/// * `InsufficientLiquidity` if the result would be negative
/// * `LiquidityOverflow` if the result exceeds u128
pub fn add_delta(x: u128, y: i128) -> Result<u128> {
    if y < 0 {
        x.checked_sub(y.unsigned_abs())
            .ok_or_else(|| PoolError::InsufficientLiquidity.into())
    } else {
        x.checked_add(y as u128)
            .ok_or_else(|| PoolError::LiquidityOverflow.into())
    }
}

/// Liquidity received for `amount0` of token0 across [sqrt_a, sqrt_b]
///
/// L = amount0 * (sqrt_a * sqrt_b / 2^96) / (sqrt_b - sqrt_a)
pub fn get_liquidity_for_amount0(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: u128,
) -> Result<u128> {
    let (sqrt_lower, sqrt_upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96)?;
    let intermediate = mul_div(sqrt_lower, sqrt_upper, Q96)?;
    mul_div(U256::from(amount0), intermediate, sqrt_upper - sqrt_lower)?.to_u128()
}

/// Liquidity received for `amount1` of token1 across [sqrt_a, sqrt_b]
///
/// L = amount1 * 2^96 / (sqrt_b - sqrt_a)
pub fn get_liquidity_for_amount1(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount1: u128,
) -> Result<u128> {
    let (sqrt_lower, sqrt_upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96)?;
    mul_div(U256::from(amount1), Q96, sqrt_upper - sqrt_lower)?.to_u128()
}

/// Maximum liquidity mintable at the current price with the given amounts
///
/// Below the range only token0 counts, above it only token1, and inside it
/// the scarcer of the two.
pub fn get_liquidity_for_amounts(
    sqrt_price_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    amount0: u128,
    amount1: u128,
) -> Result<u128> {
    let (sqrt_lower, sqrt_upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96)?;

    if sqrt_price_x96 <= sqrt_lower {
        get_liquidity_for_amount0(sqrt_lower, sqrt_upper, amount0)
    } else if sqrt_price_x96 < sqrt_upper {
        let liquidity0 = get_liquidity_for_amount0(sqrt_price_x96, sqrt_upper, amount0)?;
        let liquidity1 = get_liquidity_for_amount1(sqrt_lower, sqrt_price_x96, amount1)?;
        Ok(liquidity0.min(liquidity1))
    } else {
        get_liquidity_for_amount1(sqrt_lower, sqrt_upper, amount1)
    }
}

/// Token amounts held by `liquidity` across [sqrt_a, sqrt_b] at the current price, rounded down
pub fn get_amounts_for_liquidity(
    sqrt_price_x96: U256,
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
) -> Result<(U256, U256)> {
    let (sqrt_lower, sqrt_upper) = ordered(sqrt_ratio_a_x96, sqrt_ratio_b_x96)?;

    if sqrt_price_x96 <= sqrt_lower {
        Ok((
            get_amount0_delta(sqrt_lower, sqrt_upper, liquidity, false)?,
            U256::zero(),
        ))
    } else if sqrt_price_x96 < sqrt_upper {
        Ok((
            get_amount0_delta(sqrt_price_x96, sqrt_upper, liquidity, false)?,
            get_amount1_delta(sqrt_lower, sqrt_price_x96, liquidity, false)?,
        ))
    } else {
        Ok((
            U256::zero(),
            get_amount1_delta(sqrt_lower, sqrt_upper, liquidity, false)?,
        ))
    }
}

fn ordered(a: U256, b: U256) -> Result<(U256, U256)> {
    let (lower, upper) = if a > b { (b, a) } else { (a, b) };
    require!(lower < upper, PoolError::InvalidTickRange);
    Ok((lower, upper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::tick_math::get_sqrt_ratio_at_tick;
    use crate::testing::assert_pool_error;
    use crate::utils::encode_price_sqrt;

    #[test]
    fn test_add_delta() {
        assert_eq!(add_delta(1, 0).unwrap(), 1);
        assert_eq!(add_delta(1, -1).unwrap(), 0);
        assert_eq!(add_delta(1, 1).unwrap(), 2);
    }

    #[test]
    fn test_add_delta_overflow() {
        assert_pool_error(add_delta(u128::MAX - 14, 15), PoolError::LiquidityOverflow);
    }

    #[test]
    fn test_add_delta_underflow() {
        assert_pool_error(add_delta(0, -1), PoolError::InsufficientLiquidity);
        assert!(add_delta(3, -4).is_err());
    }

    #[test]
    fn test_liquidity_for_amounts_in_range() {
        let price = encode_price_sqrt(1, 1).unwrap();
        let lower = encode_price_sqrt(100, 110).unwrap();
        let upper = encode_price_sqrt(110, 100).unwrap();
        let liquidity = get_liquidity_for_amounts(price, lower, upper, 100, 200).unwrap();
        assert_eq!(liquidity, 2148);
    }

    #[test]
    fn test_liquidity_for_amounts_outside_range() {
        let lower = encode_price_sqrt(100, 110).unwrap();
        let upper = encode_price_sqrt(110, 100).unwrap();

        let below = encode_price_sqrt(99, 110).unwrap();
        assert_eq!(get_liquidity_for_amounts(below, lower, upper, 100, 200).unwrap(), 1048);

        let above = encode_price_sqrt(111, 100).unwrap();
        assert_eq!(get_liquidity_for_amounts(above, lower, upper, 100, 200).unwrap(), 2097);
    }

    #[test]
    fn test_amounts_for_liquidity_round_down() {
        let price = get_sqrt_ratio_at_tick(0).unwrap();
        let lower = get_sqrt_ratio_at_tick(-600).unwrap();
        let upper = get_sqrt_ratio_at_tick(600).unwrap();
        let liquidity = get_liquidity_for_amounts(price, lower, upper, 1_000_000, 1_000_000).unwrap();
        let (amount0, amount1) = get_amounts_for_liquidity(price, lower, upper, liquidity).unwrap();
        assert!(amount0 <= U256::from(1_000_000u64));
        assert!(amount1 <= U256::from(1_000_000u64));
    }

    #[test]
    fn test_empty_range_rejected() {
        let price = get_sqrt_ratio_at_tick(0).unwrap();
        assert!(get_liquidity_for_amounts(price, price, price, 1, 1).is_err());
    }
}
