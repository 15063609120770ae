use crate::constants::fee_tiers::*;

/// Standard fee tiers
/// Lower fee = tighter spacing for stable pairs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.30%
    Medium,
    /// 1.00%
    High,
}

impl FeeTier {
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    /// Fee rate in hundredths of a basis point (100 = 0.01%)
    pub fn fee(self) -> u32 {
        match self {
            FeeTier::Lowest => FEE_TIER_100,
            FeeTier::Low => FEE_TIER_500,
            FeeTier::Medium => FEE_TIER_3000,
            FeeTier::High => FEE_TIER_10000,
        }
    }

    pub fn tick_spacing(self) -> i32 {
        match self {
            FeeTier::Lowest => TICK_SPACING_100,
            FeeTier::Low => TICK_SPACING_500,
            FeeTier::Medium => TICK_SPACING_3000,
            FeeTier::High => TICK_SPACING_10000,
        }
    }

    /// Look up a standard tier by fee rate
    pub fn from_fee(fee: u32) -> Option<FeeTier> {
        Self::ALL.into_iter().find(|tier| tier.fee() == fee)
    }
}
