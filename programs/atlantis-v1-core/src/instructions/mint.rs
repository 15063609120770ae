use crate::callbacks::{call_mint, MintCallback, TokenLedger};
use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::state::{Pool, PositionKey};
use anchor_lang::prelude::*;

/// Mint parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MintParams {
    /// Caller, reported in the event
    pub sender: Pubkey,
    /// Owner of the position receiving the liquidity
    pub recipient: Pubkey,
    pub tick_lower: i32,
    pub tick_upper: i32,
    /// Liquidity to add
    pub amount: u128,
}

impl Pool {
    /// Add liquidity to a position
    ///
    /// The callback must pay the returned amounts into the pool before it returns.
    ///
    /// # Returns
    /// * (amount0, amount1) paid for the liquidity, rounded up
    pub fn mint<L, C>(
        &mut self,
        ledger: &mut L,
        callback: &mut C,
        params: MintParams,
        data: &[u8],
    ) -> Result<(u128, u128)>
    where
        L: TokenLedger,
        C: MintCallback<L> + ?Sized,
    {
        self.run_locked(ledger, |pool, ledger| {
            require!(params.amount > 0, PoolError::ZeroAmount);

            let liquidity_delta =
                i128::try_from(params.amount).map_err(|_| PoolError::LiquidityOverflow)?;
            let key = PositionKey::new(params.recipient, params.tick_lower, params.tick_upper);

            let (_, amount0_int, amount1_int) = pool.modify_position(&key, liquidity_delta)?;

            // Adding liquidity never produces negative amounts
            let amount0 = amount0_int as u128;
            let amount1 = amount1_int as u128;

            call_mint(pool, ledger, callback, amount0, amount1, data)?;

            pool.emit(PoolEvent::Mint {
                sender: params.sender,
                owner: params.recipient,
                tick_lower: params.tick_lower,
                tick_upper: params.tick_upper,
                amount: params.amount,
                amount0,
                amount1,
            });

            msg!("Liquidity minted");
            msg!("Owner: {}", params.recipient);
            msg!("Tick range: [{}, {}]", params.tick_lower, params.tick_upper);
            msg!("Liquidity: {}, amount0: {}, amount1: {}", params.amount, amount0, amount1);

            Ok((amount0, amount1))
        })
    }
}
