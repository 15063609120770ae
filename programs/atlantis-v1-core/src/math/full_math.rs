//! Full precision math operations
//!
//! 256-bit multiply-then-divide without intermediate overflow. The product is
//! carried in 512 bits and only the quotient has to fit back into 256.

use crate::errors::PoolError;
use crate::math::U256;
use anchor_lang::prelude::*;

/// Multiply two 256-bit numbers and divide by a third, with full precision
///
/// # Formula
/// result = floor(a * b / denominator)
///
/// # Errors
/// * `DivisionByZero` if `denominator` is zero
/// * `MulDivOverflow` if the quotient does not fit in 256 bits
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256> {
    require!(!denominator.is_zero(), PoolError::DivisionByZero);

    let product = a.widen() * b.widen();
    let quotient = product / denominator.widen();

    quotient.narrow().ok_or_else(|| PoolError::MulDivOverflow.into())
}

/// Multiply two 256-bit numbers and divide by a third, rounding up
pub fn mul_div_rounding_up(a: U256, b: U256, denominator: U256) -> Result<U256> {
    require!(!denominator.is_zero(), PoolError::DivisionByZero);

    let product = a.widen() * b.widen();
    let (quotient, remainder) = product.div_mod(denominator.widen());
    let quotient = quotient.narrow().ok_or(PoolError::MulDivOverflow)?;

    if remainder.is_zero() {
        Ok(quotient)
    } else {
        quotient
            .checked_add(U256::one())
            .ok_or_else(|| PoolError::MulDivOverflow.into())
    }
}

/// ceil(x / y)
pub fn div_rounding_up(x: U256, y: U256) -> Result<U256> {
    require!(!y.is_zero(), PoolError::DivisionByZero);

    let (quotient, remainder) = x.div_mod(y);
    if remainder.is_zero() {
        Ok(quotient)
    } else {
        // quotient < U256::MAX whenever there is a remainder, since y > 1
        Ok(quotient + 1)
    }
}
