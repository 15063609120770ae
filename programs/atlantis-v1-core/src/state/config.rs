use crate::constants::{FEE_RATE_DENOMINATOR, MAX_TICK_SPACING};
use crate::errors::PoolError;
use crate::state::fee_tier::FeeTier;
use crate::utils::validate_token_order;
use anchor_lang::prelude::*;

/// Immutable pool parameters, fixed by the deploying factory
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Factory that deployed the pool
    pub factory: Pubkey,

    /// Address the pool holds its token balances under
    pub address: Pubkey,

    /// Token0 (must be < token1 lexicographically)
    pub token0: Pubkey,

    /// Token1
    pub token1: Pubkey,

    /// Swap fee in hundredths of a basis point (3000 = 0.3%)
    pub fee: u32,

    /// Only multiples of this can be position bounds
    pub tick_spacing: i32,

    /// Authority allowed to set and collect protocol fees
    /// Defaults to the factory
    pub protocol_authority: Pubkey,
}

impl PoolConfig {
    pub fn new(
        factory: Pubkey,
        address: Pubkey,
        token0: Pubkey,
        token1: Pubkey,
        fee: u32,
        tick_spacing: i32,
    ) -> Result<Self> {
        let config = Self {
            factory,
            address,
            token0,
            token1,
            fee,
            tick_spacing,
            protocol_authority: factory,
        };
        config.validate()?;
        Ok(config)
    }

    /// Token order, fee and tick spacing checks
    ///
    /// Configs built field by field must pass this before a pool uses them.
    pub fn validate(&self) -> Result<()> {
        require!(self.token0 != Pubkey::default(), PoolError::InvalidTokenOrder);
        require!(
            validate_token_order(&self.token0.to_bytes(), &self.token1.to_bytes()),
            PoolError::InvalidTokenOrder
        );
        require!(self.fee < FEE_RATE_DENOMINATOR, PoolError::FeeRateTooHigh);
        require!(
            self.tick_spacing > 0 && self.tick_spacing < MAX_TICK_SPACING,
            PoolError::InvalidTickSpacing
        );
        Ok(())
    }

    /// Config for one of the standard fee tiers
    pub fn for_fee_tier(
        factory: Pubkey,
        address: Pubkey,
        token0: Pubkey,
        token1: Pubkey,
        tier: FeeTier,
    ) -> Result<Self> {
        Self::new(factory, address, token0, token1, tier.fee(), tier.tick_spacing())
    }

    pub fn with_protocol_authority(mut self, protocol_authority: Pubkey) -> Self {
        self.protocol_authority = protocol_authority;
        self
    }

    pub fn is_protocol_authority(&self, signer: &Pubkey) -> bool {
        self.protocol_authority == *signer
    }
}
