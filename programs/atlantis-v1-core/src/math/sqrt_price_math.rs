//! Sqrt Price Math
//!
//! Price movement and token amounts for a constant-product curve within one
//! tick range, in Q64.96. Every amount the pool receives rounds up and every
//! amount it pays out rounds down.

use crate::constants::Q96;
use crate::errors::PoolError;
use crate::math::full_math::{div_rounding_up, mul_div, mul_div_rounding_up};
use crate::math::U256;
use anchor_lang::prelude::*;

/// Next sqrt price after adding or removing `amount` of token0, rounding up
///
/// # Formula
/// next = L * sqrt_p / (L ± amount * sqrt_p)
///
/// Falls back to L / (L / sqrt_p ± amount) when the product overflows.
pub fn get_next_sqrt_price_from_amount0_rounding_up(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256> {
    if amount.is_zero() {
        return Ok(sqrt_price_x96);
    }
    let numerator1 = U256::from(liquidity) << 96;

    if add {
        if let Some(product) = amount.checked_mul(sqrt_price_x96) {
            if let Some(denominator) = numerator1.checked_add(product) {
                return mul_div_rounding_up(numerator1, sqrt_price_x96, denominator);
            }
        }

        let denominator = (numerator1 / sqrt_price_x96)
            .checked_add(amount)
            .ok_or(PoolError::MathOverflow)?;
        div_rounding_up(numerator1, denominator)
    } else {
        let product = amount
            .checked_mul(sqrt_price_x96)
            .ok_or(PoolError::InsufficientLiquidity)?;
        require!(numerator1 > product, PoolError::InsufficientLiquidity);

        let denominator = numerator1 - product;
        to_sqrt_price(mul_div_rounding_up(numerator1, sqrt_price_x96, denominator)?)
    }
}

/// Next sqrt price after adding or removing `amount` of token1, rounding down
///
/// # Formula
/// next = sqrt_p ± amount / L
pub fn get_next_sqrt_price_from_amount1_rounding_down(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount: U256,
    add: bool,
) -> Result<U256> {
    let liquidity = U256::from(liquidity);

    if add {
        let quotient = if amount.fits_160() {
            (amount << 96) / non_zero(liquidity)?
        } else {
            mul_div(amount, Q96, liquidity)?
        };

        let next = sqrt_price_x96
            .checked_add(quotient)
            .ok_or(PoolError::SqrtPriceOverflow)?;
        to_sqrt_price(next)
    } else {
        let quotient = if amount.fits_160() {
            div_rounding_up(amount << 96, liquidity)?
        } else {
            mul_div_rounding_up(amount, Q96, liquidity)?
        };

        require!(sqrt_price_x96 > quotient, PoolError::InsufficientLiquidity);
        Ok(sqrt_price_x96 - quotient)
    }
}

/// Next sqrt price given an input amount of token0 or token1
///
/// Rounds so the price never moves past what the input pays for.
pub fn get_next_sqrt_price_from_input(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_in: U256,
    zero_for_one: bool,
) -> Result<U256> {
    require!(!sqrt_price_x96.is_zero(), PoolError::SqrtPriceOutOfBounds);
    require!(liquidity > 0, PoolError::InsufficientLiquidity);

    if zero_for_one {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_in, true)
    } else {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_in, true)
    }
}

/// Next sqrt price given an output amount of token0 or token1
///
/// Rounds so the price always moves at least as far as the output requires.
pub fn get_next_sqrt_price_from_output(
    sqrt_price_x96: U256,
    liquidity: u128,
    amount_out: U256,
    zero_for_one: bool,
) -> Result<U256> {
    require!(!sqrt_price_x96.is_zero(), PoolError::SqrtPriceOutOfBounds);
    require!(liquidity > 0, PoolError::InsufficientLiquidity);

    if zero_for_one {
        get_next_sqrt_price_from_amount1_rounding_down(sqrt_price_x96, liquidity, amount_out, false)
    } else {
        get_next_sqrt_price_from_amount0_rounding_up(sqrt_price_x96, liquidity, amount_out, false)
    }
}

/// Amount of token0 between two prices for a given liquidity
///
/// amount0 = L * 2^96 * (sqrt_b - sqrt_a) / (sqrt_a * sqrt_b)
pub fn get_amount0_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    require!(!sqrt_lower.is_zero(), PoolError::SqrtPriceOutOfBounds);

    let numerator1 = U256::from(liquidity) << 96;
    let numerator2 = sqrt_upper - sqrt_lower;

    if round_up {
        div_rounding_up(
            mul_div_rounding_up(numerator1, numerator2, sqrt_upper)?,
            sqrt_lower,
        )
    } else {
        Ok(mul_div(numerator1, numerator2, sqrt_upper)? / sqrt_lower)
    }
}

/// Amount of token1 between two prices for a given liquidity
///
/// amount1 = L * (sqrt_b - sqrt_a) / 2^96
pub fn get_amount1_delta(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: u128,
    round_up: bool,
) -> Result<U256> {
    let (sqrt_lower, sqrt_upper) = sorted(sqrt_ratio_a_x96, sqrt_ratio_b_x96);
    let liquidity = U256::from(liquidity);

    if round_up {
        mul_div_rounding_up(liquidity, sqrt_upper - sqrt_lower, Q96)
    } else {
        mul_div(liquidity, sqrt_upper - sqrt_lower, Q96)
    }
}

/// Signed token0 delta for a signed liquidity change
///
/// Adding liquidity rounds the owed amount up, removing rounds the paid amount down.
pub fn get_amount0_delta_signed(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<i128> {
    if liquidity < 0 {
        let amount = get_amount0_delta(
            sqrt_ratio_a_x96,
            sqrt_ratio_b_x96,
            liquidity.unsigned_abs(),
            false,
        )?;
        Ok(-amount.to_i128()?)
    } else {
        get_amount0_delta(sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity as u128, true)?.to_i128()
    }
}

/// Signed token1 delta for a signed liquidity change
pub fn get_amount1_delta_signed(
    sqrt_ratio_a_x96: U256,
    sqrt_ratio_b_x96: U256,
    liquidity: i128,
) -> Result<i128> {
    if liquidity < 0 {
        let amount = get_amount1_delta(
            sqrt_ratio_a_x96,
            sqrt_ratio_b_x96,
            liquidity.unsigned_abs(),
            false,
        )?;
        Ok(-amount.to_i128()?)
    } else {
        get_amount1_delta(sqrt_ratio_a_x96, sqrt_ratio_b_x96, liquidity as u128, true)?.to_i128()
    }
}

fn sorted(a: U256, b: U256) -> (U256, U256) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn non_zero(x: U256) -> Result<U256> {
    require!(!x.is_zero(), PoolError::DivisionByZero);
    Ok(x)
}

/// Prices are 160-bit values
fn to_sqrt_price(x: U256) -> Result<U256> {
    require!(x.fits_160(), PoolError::SqrtPriceOverflow);
    Ok(x)
}
