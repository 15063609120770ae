//! Callback Caller
//!
//! Invokes counterparty callbacks and verifies payment by balance delta.

use super::*;
use crate::errors::PoolError;
use crate::state::{Pool, PoolConfig};
use anchor_lang::prelude::*;

/// Pool balance of token0
pub fn balance0<L: TokenLedger>(config: &PoolConfig, ledger: &L) -> u128 {
    ledger.balance_of(&config.token0, &config.address)
}

/// Pool balance of token1
pub fn balance1<L: TokenLedger>(config: &PoolConfig, ledger: &L) -> u128 {
    ledger.balance_of(&config.token1, &config.address)
}

/// `before + owed <= after`, overflow counts as a failed payment check
fn require_paid(before: u128, owed: u128, after: u128) -> Result<()> {
    let expected = before.checked_add(owed).ok_or(PoolError::MathOverflow)?;
    require!(expected <= after, PoolError::InsufficientInputAmount);
    Ok(())
}

/// Call the mint callback and check both owed amounts arrived
pub fn call_mint<L, C>(
    pool: &mut Pool,
    ledger: &mut L,
    callback: &mut C,
    amount0: u128,
    amount1: u128,
    data: &[u8],
) -> Result<()>
where
    L: TokenLedger,
    C: MintCallback<L> + ?Sized,
{
    let config = *pool.config();
    let balance0_before = if amount0 > 0 { balance0(&config, ledger) } else { 0 };
    let balance1_before = if amount1 > 0 { balance1(&config, ledger) } else { 0 };

    callback.mint_callback(pool, ledger, amount0, amount1, data)?;

    if amount0 > 0 {
        require_paid(balance0_before, amount0, balance0(&config, ledger))?;
    }
    if amount1 > 0 {
        require_paid(balance1_before, amount1, balance1(&config, ledger))?;
    }
    Ok(())
}

/// Call the swap callback and check the input side arrived
///
/// The output side must already have been sent to the recipient.
pub fn call_swap<L, C>(
    pool: &mut Pool,
    ledger: &mut L,
    callback: &mut C,
    amount0: i128,
    amount1: i128,
    zero_for_one: bool,
    data: &[u8],
) -> Result<()>
where
    L: TokenLedger,
    C: SwapCallback<L> + ?Sized,
{
    let config = *pool.config();

    let (owed, balance_before) = if zero_for_one {
        (amount0, balance0(&config, ledger))
    } else {
        (amount1, balance1(&config, ledger))
    };

    callback.swap_callback(pool, ledger, amount0, amount1, data)?;

    let balance_after = if zero_for_one {
        balance0(&config, ledger)
    } else {
        balance1(&config, ledger)
    };
    require_paid(balance_before, owed.max(0) as u128, balance_after)
}

/// Call the flash callback and check the loan came back with fees
///
/// # Arguments
/// * `balances_before` - Pool balances before the loaned amounts were sent
///
/// # Returns
/// * Amounts paid on top of the starting balances
pub fn call_flash<L, C>(
    pool: &mut Pool,
    ledger: &mut L,
    callback: &mut C,
    balances_before: (u128, u128),
    fee0: u128,
    fee1: u128,
    data: &[u8],
) -> Result<(u128, u128)>
where
    L: TokenLedger,
    C: FlashCallback<L> + ?Sized,
{
    let config = *pool.config();
    let (balance0_before, balance1_before) = balances_before;

    callback.flash_callback(pool, ledger, fee0, fee1, data)?;

    let balance0_after = balance0(&config, ledger);
    let balance1_after = balance1(&config, ledger);

    let required0 = balance0_before.checked_add(fee0).ok_or(PoolError::MathOverflow)?;
    let required1 = balance1_before.checked_add(fee1).ok_or(PoolError::MathOverflow)?;
    require!(required0 <= balance0_after, PoolError::FlashRepaymentInsufficient);
    require!(required1 <= balance1_after, PoolError::FlashRepaymentInsufficient);

    Ok((balance0_after - balance0_before, balance1_after - balance1_before))
}
