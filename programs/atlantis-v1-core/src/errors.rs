use anchor_lang::prelude::*;

/// Atlantis V1 pool error codes
/// One variant per failure mode, grouped by the layer that raises it
#[error_code]
pub enum PoolError {
    // ═══════════════════════════════════════════════════════════════════════
    // MATH ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Arithmetic overflow in checked operation
    #[msg("Math overflow")]
    MathOverflow, // 6000

    /// Division by zero attempted
    #[msg("Division by zero")]
    DivisionByZero, // 6001

    /// Result doesn't fit in expected type
    #[msg("Cast overflow")]
    CastOverflow, // 6002

    /// Full-precision mul_div result does not fit in 256 bits
    #[msg("Multiplication overflow in fixed-point math")]
    MulDivOverflow, // 6003

    /// Computed sqrt price does not fit in 160 bits
    #[msg("Sqrt price overflow")]
    SqrtPriceOverflow, // 6004

    // ═══════════════════════════════════════════════════════════════════════
    // TICK ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Tick is outside [MIN_TICK, MAX_TICK]
    #[msg("Tick out of bounds")]
    TickOutOfBounds, // 6005

    /// Tick is not a multiple of the tick spacing
    #[msg("Tick not aligned to spacing")]
    TickNotAligned, // 6006

    /// Lower tick must be less than upper tick and both within bounds
    #[msg("Invalid tick range")]
    InvalidTickRange, // 6007

    // ═══════════════════════════════════════════════════════════════════════
    // PRICE/LIQUIDITY ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Sqrt price is outside [MIN_SQRT_RATIO, MAX_SQRT_RATIO)
    #[msg("Sqrt price out of bounds")]
    SqrtPriceOutOfBounds, // 6008

    /// Not enough liquidity for the requested operation
    #[msg("Insufficient liquidity")]
    InsufficientLiquidity, // 6009

    /// Liquidity exceeds the per-tick maximum or overflows u128
    #[msg("Liquidity overflow")]
    LiquidityOverflow, // 6010

    /// Amount is zero
    #[msg("Zero amount")]
    ZeroAmount, // 6011

    // ═══════════════════════════════════════════════════════════════════════
    // SWAP ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Sqrt price limit on the wrong side of the current price or out of range
    #[msg("Invalid price limit")]
    InvalidPriceLimit, // 6012

    // ═══════════════════════════════════════════════════════════════════════
    // POOL ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Pool already initialized
    #[msg("Pool already initialized")]
    AlreadyInitialized, // 6013

    /// Pool not initialized
    #[msg("Pool not initialized")]
    NotInitialized, // 6014

    /// Pool lock is held, re-entrant call rejected
    #[msg("Pool locked")]
    Locked, // 6015

    /// Invalid token order (token0 must be < token1)
    #[msg("Invalid token order")]
    InvalidTokenOrder, // 6016

    /// Tick spacing outside 1..MAX_TICK_SPACING
    #[msg("Invalid tick spacing")]
    InvalidTickSpacing, // 6017

    // ═══════════════════════════════════════════════════════════════════════
    // COUNTERPARTY ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Callback paid less than the pool requires
    #[msg("Insufficient input amount")]
    InsufficientInputAmount, // 6018

    /// Flash loan not repaid with fee
    #[msg("Flash repayment insufficient")]
    FlashRepaymentInsufficient, // 6019

    /// Ledger transfer failed (balance too low)
    #[msg("Transfer failed")]
    TransferFailed, // 6020

    // ═══════════════════════════════════════════════════════════════════════
    // FEE ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Fee rate must be below 100%
    #[msg("Fee rate too high")]
    FeeRateTooHigh, // 6021

    /// Protocol fee denominator must be 0 or within 4..=10
    #[msg("Invalid protocol fee")]
    InvalidFeeProtocol, // 6022

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESS CONTROL ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Not the protocol authority
    #[msg("Not protocol authority")]
    NotProtocolAuthority, // 6023

    // ═══════════════════════════════════════════════════════════════════════
    // ORACLE ERRORS
    // ═══════════════════════════════════════════════════════════════════════

    /// Requested time is older than the oldest stored observation
    #[msg("Target predates oldest observation")]
    TargetPredatesOldestObservation, // 6024

    /// Oracle has no observations yet
    #[msg("Oracle not initialized")]
    OracleNotInitialized, // 6025

    /// Range bound has no liquidity referencing it
    #[msg("Tick not initialized")]
    TickNotInitialized, // 6026
}
