//! Wide Integers
//!
//! 256-bit values for Q64.96 prices and Q128.128 fee growth, and a 512-bit
//! type used only as the intermediate of full-precision multiplication.

use crate::errors::PoolError;
use anchor_lang::prelude::*;

// Kept apart from the anchor prelude so its `Result` alias never meets the macro expansion.
mod types {
    use uint::construct_uint;

    construct_uint! {
        /// 256-bit unsigned integer
        pub struct U256(4);
    }

    construct_uint! {
        /// 512-bit unsigned integer
        pub struct U512(8);
    }
}

pub use types::{U256, U512};

/// Mask of the low 160 bits, the width of prices and seconds-per-liquidity accumulators
pub const MASK_160: U256 = U256([u64::MAX, u64::MAX, 0xffff_ffff, 0]);

impl U256 {
    /// Zero-extend into 512 bits
    pub fn widen(self) -> U512 {
        let U256(limbs) = self;
        U512([limbs[0], limbs[1], limbs[2], limbs[3], 0, 0, 0, 0])
    }

    /// Checked narrowing to u128
    pub fn to_u128(self) -> Result<u128> {
        require!(self.bits() <= 128, PoolError::CastOverflow);
        Ok(self.low_u128())
    }

    /// Checked narrowing to a non-negative i128
    pub fn to_i128(self) -> Result<i128> {
        i128::try_from(self.to_u128()?).map_err(|_| PoolError::CastOverflow.into())
    }

    /// Truncate to 160 bits (uint160 wraparound)
    pub fn low_160(self) -> U256 {
        self & MASK_160
    }

    /// Whether the value fits in 160 bits
    pub fn fits_160(self) -> bool {
        self.bits() <= 160
    }
}

impl U512 {
    /// Narrow back to 256 bits, `None` if any high limb is set
    pub fn narrow(self) -> Option<U256> {
        let U512(limbs) = self;
        if limbs[4..].iter().any(|limb| *limb != 0) {
            return None;
        }
        Some(U256([limbs[0], limbs[1], limbs[2], limbs[3]]))
    }
}
