use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::state::{Pool, PositionKey};
use anchor_lang::prelude::*;

impl Pool {
    /// Remove liquidity from a position and credit the tokens it held as owed
    ///
    /// Nothing is transferred; owed tokens are withdrawn with `collect`.
    /// Burning 0 only credits fees accrued so far (a "poke").
    ///
    /// # Returns
    /// * (amount0, amount1) credited for the removed liquidity, rounded down
    pub fn burn(
        &mut self,
        owner: Pubkey,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(u128, u128)> {
        self.run_locked_local(|pool| {
            let liquidity_delta = i128::try_from(amount)
                .map_err(|_| PoolError::LiquidityOverflow)?
                .checked_neg()
                .ok_or(PoolError::LiquidityOverflow)?;
            let key = PositionKey::new(owner, tick_lower, tick_upper);

            let (_, amount0_int, amount1_int) = pool.modify_position(&key, liquidity_delta)?;

            // Removing liquidity never produces positive amounts
            let amount0 = amount0_int.unsigned_abs();
            let amount1 = amount1_int.unsigned_abs();

            if amount0 > 0 || amount1 > 0 {
                let position = pool.positions.get_mut(&key);
                position.tokens_owed_0 = position
                    .tokens_owed_0
                    .checked_add(amount0)
                    .ok_or(PoolError::MathOverflow)?;
                position.tokens_owed_1 = position
                    .tokens_owed_1
                    .checked_add(amount1)
                    .ok_or(PoolError::MathOverflow)?;
            }

            pool.emit(PoolEvent::Burn {
                owner,
                tick_lower,
                tick_upper,
                amount,
                amount0,
                amount1,
            });

            msg!("Liquidity burned");
            msg!("Owner: {}", owner);
            msg!("Tick range: [{}, {}]", tick_lower, tick_upper);
            msg!("Liquidity: {}, amount0: {}, amount1: {}", amount, amount0, amount1);

            Ok((amount0, amount1))
        })
    }
}
