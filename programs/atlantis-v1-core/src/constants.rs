// Atlantis V1 Protocol Constants
// Uniswap V3 conventions: Q64.96 sqrt prices, fees in hundredths of a bip

use crate::math::U256;

/// Minimum tick index, log base sqrt(1.0001) of 2^-128
pub const MIN_TICK: i32 = -887272;

/// Maximum tick index, log base sqrt(1.0001) of 2^128
pub const MAX_TICK: i32 = 887272;

/// Sqrt price at MIN_TICK (Q64.96)
pub const MIN_SQRT_RATIO: U256 = U256([4295128739, 0, 0, 0]);

/// Sqrt price at MAX_TICK (Q64.96)
/// 1461446703485210103287273052203988822378723970342
pub const MAX_SQRT_RATIO: U256 = U256([0x5d951d5263988d26, 0xefd1fc6a50648849, 0xfffd8963, 0]);

/// Q96 multiplier (2^96)
pub const Q96: U256 = U256([0, 1 << 32, 0, 0]);

/// Q128 multiplier (2^128) for fee growth and seconds-per-liquidity
pub const Q128: U256 = U256([0, 0, 1, 0]);

/// Fee denominator (1_000_000 = 100%, fees are in hundredths of a bip)
pub const FEE_RATE_DENOMINATOR: u32 = 1_000_000;

/// Maximum tick spacing, keeps spacing * 256 well inside the tick range
pub const MAX_TICK_SPACING: i32 = 16384;

/// Protocol fee denominators allowed besides 0 (fee share is 1/n of swap fees)
pub const PROTOCOL_FEE_MIN: u8 = 4;
pub const PROTOCOL_FEE_MAX: u8 = 10;

/// Standard fee tiers (matching Uniswap V3)
pub mod fee_tiers {
    /// 0.01% fee (tick spacing 1) - for pegged pairs
    pub const FEE_TIER_100: u32 = 100;
    pub const TICK_SPACING_100: i32 = 1;

    /// 0.05% fee (tick spacing 10) - for stable pairs
    pub const FEE_TIER_500: u32 = 500;
    pub const TICK_SPACING_500: i32 = 10;

    /// 0.30% fee (tick spacing 60) - for most pairs
    pub const FEE_TIER_3000: u32 = 3000;
    pub const TICK_SPACING_3000: i32 = 60;

    /// 1.00% fee (tick spacing 200) - for exotic pairs
    pub const FEE_TIER_10000: u32 = 10000;
    pub const TICK_SPACING_10000: i32 = 200;
}

/// Oracle constants
pub mod oracle {
    /// Observation cardinality after initialize
    pub const OBSERVATION_CARDINALITY_INIT: u16 = 1;
    /// Timestamp marking reserved but never written slots
    pub const RESERVED_SLOT_TIMESTAMP: u32 = 1;
}
