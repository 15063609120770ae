//! Atlantis V1 Core - Concentrated Liquidity Pool Engine
//!
//! The pool engine behind the Atlantis exchange: Uniswap V3 style
//! concentrated liquidity with a built-in time-weighted price oracle.
//!
//! ## Architecture
//!
//! - **Math**: Q64.96 sqrt prices and Q128.128 fee growth over 256-bit integers
//! - **Ticks**: Sparse tick table plus a word-packed bitmap for fast range walks
//! - **Positions**: Liquidity and owed fees keyed by (owner, lower, upper)
//! - **Oracle**: Growable ring buffer of cumulative tick and liquidity observations
//! - **Callbacks**: Counterparties pay for mints, swaps and flashes from a callback,
//!   verified against ledger balances afterwards
//!
//! ## Safety
//!
//! - Every mutating operation holds the pool lock, so re-entry from a callback fails
//! - Every operation is atomic: a failure restores pool state and token balances
//! - Fee growth and oracle accumulators use wrapping arithmetic, everything else is checked

pub mod callbacks;
pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use callbacks::{FlashCallback, MintCallback, SwapCallback, TokenLedger};
pub use errors::PoolError;
pub use events::PoolEvent;
pub use instructions::{
    CollectParams, CollectProtocolParams, CumulativesInside, FlashParams, MintParams,
    SetFeeProtocolParams, SwapParams,
};
pub use math::U256;
pub use state::{Pool, PoolConfig};
