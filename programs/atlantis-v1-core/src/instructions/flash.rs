use crate::callbacks::{balance0, balance1, call_flash, FlashCallback, TokenLedger};
use crate::constants::{FEE_RATE_DENOMINATOR, Q128};
use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use crate::math::U256;
use crate::state::Pool;
use anchor_lang::prelude::*;

/// Flash loan parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlashParams {
    /// Caller, reported in the event
    pub sender: Pubkey,
    /// Receives the loaned tokens
    pub recipient: Pubkey,
    pub amount0: u128,
    pub amount1: u128,
}

/// Split a flash payment into the protocol share and the LP share
fn split_protocol_fee(paid: u128, fee_protocol: u8) -> (u128, u128) {
    let protocol = if fee_protocol == 0 { 0 } else { paid / fee_protocol as u128 };
    (protocol, paid - protocol)
}

impl Pool {
    /// Lend pool tokens for the duration of the callback
    ///
    /// The callback must return the loan plus the pool fee. Anything paid on
    /// top of the starting balances is distributed to in-range liquidity,
    /// less the protocol share.
    pub fn flash<L, C>(
        &mut self,
        ledger: &mut L,
        callback: &mut C,
        params: FlashParams,
        data: &[u8],
    ) -> Result<()>
    where
        L: TokenLedger,
        C: FlashCallback<L> + ?Sized,
    {
        self.run_locked(ledger, |pool, ledger| {
            let liquidity = pool.liquidity;
            require!(liquidity > 0, PoolError::InsufficientLiquidity);

            let config = pool.config;
            let fee = U256::from(config.fee);
            let denominator = U256::from(FEE_RATE_DENOMINATOR);
            let fee0 = mul_div_rounding_up(U256::from(params.amount0), fee, denominator)?.to_u128()?;
            let fee1 = mul_div_rounding_up(U256::from(params.amount1), fee, denominator)?.to_u128()?;

            let balances_before = (balance0(&config, ledger), balance1(&config, ledger));

            if params.amount0 > 0 {
                ledger.transfer(&config.token0, &config.address, &params.recipient, params.amount0)?;
            }
            if params.amount1 > 0 {
                ledger.transfer(&config.token1, &config.address, &params.recipient, params.amount1)?;
            }

            let (paid0, paid1) = call_flash(pool, ledger, callback, balances_before, fee0, fee1, data)?;

            if paid0 > 0 {
                let (protocol0, lp0) = split_protocol_fee(paid0, pool.slot0.fee_protocol0());
                pool.protocol_fees.token0 = pool
                    .protocol_fees
                    .token0
                    .checked_add(protocol0)
                    .ok_or(PoolError::MathOverflow)?;
                let growth = mul_div(U256::from(lp0), Q128, U256::from(liquidity))?;
                pool.fee_growth_global_0_x128 = pool.fee_growth_global_0_x128.overflowing_add(growth).0;
            }
            if paid1 > 0 {
                let (protocol1, lp1) = split_protocol_fee(paid1, pool.slot0.fee_protocol1());
                pool.protocol_fees.token1 = pool
                    .protocol_fees
                    .token1
                    .checked_add(protocol1)
                    .ok_or(PoolError::MathOverflow)?;
                let growth = mul_div(U256::from(lp1), Q128, U256::from(liquidity))?;
                pool.fee_growth_global_1_x128 = pool.fee_growth_global_1_x128.overflowing_add(growth).0;
            }

            pool.emit(PoolEvent::Flash {
                sender: params.sender,
                recipient: params.recipient,
                amount0: params.amount0,
                amount1: params.amount1,
                paid0,
                paid1,
            });

            msg!("Flash loan repaid");
            msg!("Recipient: {}", params.recipient);
            msg!("Amount0: {}, amount1: {}", params.amount0, params.amount1);
            msg!("Paid0: {}, paid1: {}", paid0, paid1);

            Ok(())
        })
    }
}
