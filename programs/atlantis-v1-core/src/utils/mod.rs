//! Utility functions for Atlantis V1

use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::PoolError;
use crate::math::{U256, U512};
use anchor_lang::prelude::*;

/// Validate token ordering (token0 must be < token1 lexicographically)
pub fn validate_token_order(token0: &[u8; 32], token1: &[u8; 32]) -> bool {
    token0 < token1
}

/// Order two distinct tokens as (token0, token1)
pub fn sort_tokens(token_a: Pubkey, token_b: Pubkey) -> Result<(Pubkey, Pubkey)> {
    require!(token_a != token_b, PoolError::InvalidTokenOrder);
    if validate_token_order(&token_a.to_bytes(), &token_b.to_bytes()) {
        Ok((token_a, token_b))
    } else {
        Ok((token_b, token_a))
    }
}

/// Sqrt price for a reserve ratio
/// sqrt_price_x96 = sqrt(reserve1 / reserve0) * 2^96
pub fn encode_price_sqrt(reserve1: u128, reserve0: u128) -> Result<U256> {
    require!(reserve0 > 0, PoolError::DivisionByZero);

    // (reserve1 << 192) / reserve0 needs up to 320 bits
    let ratio_x192 = (U512::from(reserve1) << 192) / U512::from(reserve0);
    ratio_x192
        .integer_sqrt()
        .narrow()
        .ok_or_else(|| PoolError::SqrtPriceOverflow.into())
}

/// Lowest usable tick for a spacing
pub fn get_min_tick(tick_spacing: i32) -> i32 {
    (MIN_TICK / tick_spacing) * tick_spacing
}

/// Highest usable tick for a spacing
pub fn get_max_tick(tick_spacing: i32) -> i32 {
    (MAX_TICK / tick_spacing) * tick_spacing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Q96;
    use crate::math::tick_math::get_tick_at_sqrt_ratio;

    #[test]
    fn test_encode_price_sqrt() {
        assert_eq!(encode_price_sqrt(1, 1).unwrap(), Q96);
        assert_eq!(encode_price_sqrt(4, 1).unwrap(), Q96 * 2);
        assert_eq!(
            encode_price_sqrt(1, 10).unwrap(),
            U256::from_dec_str("25054144837504793118641380156").unwrap()
        );
        assert!(encode_price_sqrt(1, 0).is_err());
    }

    #[test]
    fn test_encoded_ticks() {
        assert_eq!(get_tick_at_sqrt_ratio(encode_price_sqrt(1, 1).unwrap()).unwrap(), 0);
        assert_eq!(get_tick_at_sqrt_ratio(encode_price_sqrt(1, 2).unwrap()).unwrap(), -6932);
        assert_eq!(get_tick_at_sqrt_ratio(encode_price_sqrt(1, 10).unwrap()).unwrap(), -23028);
    }

    #[test]
    fn test_usable_ticks() {
        assert_eq!(get_min_tick(60), -887220);
        assert_eq!(get_max_tick(60), 887220);
        assert_eq!(get_min_tick(1), MIN_TICK);
        assert_eq!(get_max_tick(200), 887200);
    }

    #[test]
    fn test_sort_tokens() {
        let a = Pubkey::new_from_array([1u8; 32]);
        let b = Pubkey::new_from_array([2u8; 32]);
        assert_eq!(sort_tokens(b, a).unwrap(), (a, b));
        assert_eq!(sort_tokens(a, b).unwrap(), (a, b));
        assert!(sort_tokens(a, a).is_err());
    }
}
