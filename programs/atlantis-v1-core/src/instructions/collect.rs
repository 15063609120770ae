use crate::callbacks::TokenLedger;
use crate::events::PoolEvent;
use crate::state::{Pool, PositionKey};
use anchor_lang::prelude::*;

/// Collect parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectParams {
    /// Position owner as asserted by the host, not authenticated here
    pub owner: Pubkey,
    /// Receives the tokens
    pub recipient: Pubkey,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Maximum token0 to collect
    pub amount0_requested: u128,
    /// Maximum token1 to collect
    pub amount1_requested: u128,
}

impl Pool {
    /// Withdraw owed tokens (burned liquidity and fees) from a position
    ///
    /// Fees are only credited to owed amounts by `mint` or `burn`, so burn 0
    /// first to collect everything accrued.
    ///
    /// # Returns
    /// * (amount0, amount1) actually sent, the minimum of request and owed
    pub fn collect<L: TokenLedger>(&mut self, ledger: &mut L, params: CollectParams) -> Result<(u128, u128)> {
        self.run_locked(ledger, |pool, ledger| {
            let key = PositionKey::new(params.owner, params.tick_lower, params.tick_upper);
            let config = pool.config;

            let owed = pool.positions.get(&key);
            let amount0 = params.amount0_requested.min(owed.tokens_owed_0);
            let amount1 = params.amount1_requested.min(owed.tokens_owed_1);

            if amount0 > 0 || amount1 > 0 {
                let position = pool.positions.get_mut(&key);
                position.tokens_owed_0 -= amount0;
                position.tokens_owed_1 -= amount1;
            }

            if amount0 > 0 {
                ledger.transfer(&config.token0, &config.address, &params.recipient, amount0)?;
            }
            if amount1 > 0 {
                ledger.transfer(&config.token1, &config.address, &params.recipient, amount1)?;
            }

            pool.emit(PoolEvent::Collect {
                owner: params.owner,
                recipient: params.recipient,
                tick_lower: params.tick_lower,
                tick_upper: params.tick_upper,
                amount0,
                amount1,
            });

            msg!("Fees collected");
            msg!("Owner: {}", params.owner);
            msg!("Recipient: {}", params.recipient);
            msg!("Amount0: {}, amount1: {}", amount0, amount1);

            Ok((amount0, amount1))
        })
    }
}
