//! Bit Math
//!
//! Most and least significant bit of 256-bit words, used by the tick bitmap.

use crate::math::U256;

/// Find the most significant bit (position of highest set bit)
/// Returns 0 for input 0
pub fn most_significant_bit(x: U256) -> u8 {
    if x.is_zero() {
        return 0;
    }

    let mut n = x;
    let mut r = 0u8;

    for shift in [128u32, 64, 32, 16, 8, 4, 2, 1] {
        if n >= U256::one() << shift {
            n >>= shift;
            r += shift as u8;
        }
    }

    r
}

/// Find the least significant bit (position of lowest set bit)
/// Returns 0 for input 0
pub fn least_significant_bit(x: U256) -> u8 {
    if x.is_zero() {
        return 0;
    }

    let mut n = x;
    let mut r = 255u8;

    for shift in [128u32, 64, 32, 16, 8, 4, 2, 1] {
        let low_mask = (U256::one() << shift) - 1;
        if !(n & low_mask).is_zero() {
            r -= shift as u8;
        } else {
            n >>= shift;
        }
    }

    r
}
