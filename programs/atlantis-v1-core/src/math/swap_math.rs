//! Swap Math
//!
//! A single swap step within one tick range.

use crate::constants::FEE_RATE_DENOMINATOR;
use crate::math::full_math::{mul_div, mul_div_rounding_up};
use crate::math::sqrt_price_math::{
    get_amount0_delta, get_amount1_delta, get_next_sqrt_price_from_input,
    get_next_sqrt_price_from_output,
};
use crate::math::U256;
use anchor_lang::prelude::*;

/// Result of a single swap step computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapStepResult {
    /// The sqrt price after the step, never past the target
    pub sqrt_price_next_x96: U256,
    /// Input consumed, excluding the fee
    pub amount_in: U256,
    /// Output produced
    pub amount_out: U256,
    /// Fee taken from the input
    pub fee_amount: U256,
}

/// Compute the result of swapping within one range
///
/// # Arguments
/// * `sqrt_price_current_x96` - Current sqrt price (Q64.96)
/// * `sqrt_price_target_x96` - Price the step may not pass (next tick or caller limit)
/// * `liquidity` - Liquidity in range
/// * `amount_remaining` - Positive for exact input, negative for exact output
/// * `fee_pips` - Fee in hundredths of a bip (3000 = 0.3%)
///
/// # Returns
/// SwapStepResult with next price, amounts in/out, and fee. The direction is
/// implied by the target: a lower target means token0 in.
pub fn compute_swap_step(
    sqrt_price_current_x96: U256,
    sqrt_price_target_x96: U256,
    liquidity: u128,
    amount_remaining: i128,
    fee_pips: u32,
) -> Result<SwapStepResult> {
    let zero_for_one = sqrt_price_current_x96 >= sqrt_price_target_x96;
    let exact_input = amount_remaining >= 0;
    let amount_remaining_abs = U256::from(amount_remaining.unsigned_abs());

    let fee = U256::from(fee_pips);
    let denominator = U256::from(FEE_RATE_DENOMINATOR);

    let sqrt_price_next_x96: U256;
    let mut amount_in = U256::zero();
    let mut amount_out = U256::zero();

    if exact_input {
        let amount_remaining_less_fee = mul_div(amount_remaining_abs, denominator - fee, denominator)?;

        amount_in = if zero_for_one {
            get_amount0_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, true)?
        } else {
            get_amount1_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, true)?
        };

        sqrt_price_next_x96 = if amount_remaining_less_fee >= amount_in {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_input(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining_less_fee,
                zero_for_one,
            )?
        };
    } else {
        amount_out = if zero_for_one {
            get_amount1_delta(sqrt_price_target_x96, sqrt_price_current_x96, liquidity, false)?
        } else {
            get_amount0_delta(sqrt_price_current_x96, sqrt_price_target_x96, liquidity, false)?
        };

        sqrt_price_next_x96 = if amount_remaining_abs >= amount_out {
            sqrt_price_target_x96
        } else {
            get_next_sqrt_price_from_output(
                sqrt_price_current_x96,
                liquidity,
                amount_remaining_abs,
                zero_for_one,
            )?
        };
    }

    let max = sqrt_price_target_x96 == sqrt_price_next_x96;

    // Recompute whichever side the step did not pin to the target
    if zero_for_one {
        if !(max && exact_input) {
            amount_in = get_amount0_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, true)?;
        }
        if !(max && !exact_input) {
            amount_out = get_amount1_delta(sqrt_price_next_x96, sqrt_price_current_x96, liquidity, false)?;
        }
    } else {
        if !(max && exact_input) {
            amount_in = get_amount1_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, true)?;
        }
        if !(max && !exact_input) {
            amount_out = get_amount0_delta(sqrt_price_current_x96, sqrt_price_next_x96, liquidity, false)?;
        }
    }

    // Rounding up the price can overshoot the requested output by a unit
    if !exact_input && amount_out > amount_remaining_abs {
        amount_out = amount_remaining_abs;
    }

    let fee_amount = if exact_input && sqrt_price_next_x96 != sqrt_price_target_x96 {
        // Target not reached: whatever input is left over is the fee
        amount_remaining_abs - amount_in
    } else {
        mul_div_rounding_up(amount_in, fee, denominator - fee)?
    };

    Ok(SwapStepResult {
        sqrt_price_next_x96,
        amount_in,
        amount_out,
        fee_amount,
    })
}
