//! Pool Events
//!
//! Each successful operation appends one event to the pool's journal.
//! Events of a failed operation are rolled back with the rest of its state.

use crate::math::U256;
use anchor_lang::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PoolEvent {
    /// Pool price set for the first time
    Initialize {
        sqrt_price_x96: U256,
        tick: i32,
    },

    /// Liquidity minted to a position
    Mint {
        sender: Pubkey,
        owner: Pubkey,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: u128,
        amount1: u128,
    },

    /// Liquidity removed from a position, amounts credited as owed
    Burn {
        owner: Pubkey,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        amount0: u128,
        amount1: u128,
    },

    /// Owed tokens sent out of a position
    Collect {
        owner: Pubkey,
        recipient: Pubkey,
        tick_lower: i32,
        tick_upper: i32,
        amount0: u128,
        amount1: u128,
    },

    /// Swap executed; positive amounts were paid in, negative were paid out
    Swap {
        sender: Pubkey,
        recipient: Pubkey,
        amount0: i128,
        amount1: i128,
        sqrt_price_x96: U256,
        liquidity: u128,
        tick: i32,
    },

    /// Flash loan repaid
    Flash {
        sender: Pubkey,
        recipient: Pubkey,
        amount0: u128,
        amount1: u128,
        paid0: u128,
        paid1: u128,
    },

    /// Oracle ring reserved to a larger size
    IncreaseObservationCardinalityNext {
        observation_cardinality_next_old: u16,
        observation_cardinality_next_new: u16,
    },

    /// Protocol fee denominators changed
    SetFeeProtocol {
        fee_protocol0_old: u8,
        fee_protocol1_old: u8,
        fee_protocol0_new: u8,
        fee_protocol1_new: u8,
    },

    /// Protocol fees withdrawn
    CollectProtocol {
        sender: Pubkey,
        recipient: Pubkey,
        amount0: u128,
        amount1: u128,
    },
}
