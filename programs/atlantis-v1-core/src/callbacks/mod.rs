//! Counterparty Callbacks
//!
//! The pool never pulls tokens. It tells the caller what it owes through a
//! callback, lets the caller pay however it likes, then checks its own
//! balances on the token ledger.

use crate::state::Pool;
use anchor_lang::prelude::*;

pub mod callback_caller;

pub use callback_caller::*;

/// Token balances the pool and its counterparties hold
///
/// `Clone` lets the pool snapshot the ledger and restore it when an
/// operation fails part way through.
pub trait TokenLedger: Clone {
    /// Balance of `owner` in `token`
    fn balance_of(&self, token: &Pubkey, owner: &Pubkey) -> u128;

    /// Move `amount` of `token` from `from` to `to`
    fn transfer(&mut self, token: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()>;
}

/// Called by `mint` with the amounts the new liquidity requires
pub trait MintCallback<L: TokenLedger> {
    fn mint_callback(
        &mut self,
        pool: &mut Pool,
        ledger: &mut L,
        amount0_owed: u128,
        amount1_owed: u128,
        data: &[u8],
    ) -> Result<()>;
}

/// Called by `swap` with the signed pool deltas
///
/// A positive delta is owed to the pool, a negative one was already sent to
/// the recipient.
pub trait SwapCallback<L: TokenLedger> {
    fn swap_callback(
        &mut self,
        pool: &mut Pool,
        ledger: &mut L,
        amount0_delta: i128,
        amount1_delta: i128,
        data: &[u8],
    ) -> Result<()>;
}

/// Called by `flash` after the loaned amounts were sent
///
/// The loan plus these fees must be back in the pool when it returns.
pub trait FlashCallback<L: TokenLedger> {
    fn flash_callback(
        &mut self,
        pool: &mut Pool,
        ledger: &mut L,
        fee0: u128,
        fee1: u128,
        data: &[u8],
    ) -> Result<()>;
}
