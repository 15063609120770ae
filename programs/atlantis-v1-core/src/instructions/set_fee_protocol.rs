use crate::constants::{PROTOCOL_FEE_MAX, PROTOCOL_FEE_MIN};
use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::state::Pool;
use anchor_lang::prelude::*;

/// Set protocol fee parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetFeeProtocolParams {
    /// Must be the protocol authority
    pub sender: Pubkey,
    /// Denominator of the protocol share of token0 fees, 0 to disable
    pub fee_protocol0: u8,
    /// Denominator of the protocol share of token1 fees, 0 to disable
    pub fee_protocol1: u8,
}

fn is_valid_fee_protocol(fee_protocol: u8) -> bool {
    fee_protocol == 0 || (PROTOCOL_FEE_MIN..=PROTOCOL_FEE_MAX).contains(&fee_protocol)
}

impl Pool {
    /// Set the protocol's share of swap and flash fees, 1/N of the fee per token
    pub fn set_fee_protocol(&mut self, params: SetFeeProtocolParams) -> Result<()> {
        self.run_locked_local(|pool| {
            require!(
                pool.config.is_protocol_authority(&params.sender),
                PoolError::NotProtocolAuthority
            );
            require!(
                is_valid_fee_protocol(params.fee_protocol0) && is_valid_fee_protocol(params.fee_protocol1),
                PoolError::InvalidFeeProtocol
            );

            let old = pool.slot0;
            pool.slot0.fee_protocol = params.fee_protocol0 + (params.fee_protocol1 << 4);

            pool.emit(PoolEvent::SetFeeProtocol {
                fee_protocol0_old: old.fee_protocol0(),
                fee_protocol1_old: old.fee_protocol1(),
                fee_protocol0_new: params.fee_protocol0,
                fee_protocol1_new: params.fee_protocol1,
            });

            msg!("Protocol fee updated");
            msg!("Fee protocol0: {} -> {}", old.fee_protocol0(), params.fee_protocol0);
            msg!("Fee protocol1: {} -> {}", old.fee_protocol1(), params.fee_protocol1);

            Ok(())
        })
    }
}
