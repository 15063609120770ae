//! Shared position bookkeeping for mint and burn

use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::PoolError;
use crate::math::liquidity_math::add_delta;
use crate::math::sqrt_price_math::{get_amount0_delta_signed, get_amount1_delta_signed};
use crate::math::tick_math::get_sqrt_ratio_at_tick;
use crate::state::{Pool, Position, PositionKey, TickGlobals};
use anchor_lang::prelude::*;

/// Validate a position range against bounds and spacing
pub fn check_ticks(tick_lower: i32, tick_upper: i32, tick_spacing: i32) -> Result<()> {
    require!(tick_lower < tick_upper, PoolError::InvalidTickRange);
    require!(tick_lower >= MIN_TICK, PoolError::InvalidTickRange);
    require!(tick_upper <= MAX_TICK, PoolError::InvalidTickRange);
    require!(
        tick_lower % tick_spacing == 0 && tick_upper % tick_spacing == 0,
        PoolError::TickNotAligned
    );
    Ok(())
}

impl Pool {
    /// Current accumulators, with the oracle extrapolated to now
    pub(crate) fn tick_globals(&self) -> Result<TickGlobals> {
        let time = self.block_timestamp;
        let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
            self.observations.observe_single(
                time,
                0,
                self.slot0.tick,
                self.slot0.observation_index,
                self.liquidity,
                self.slot0.observation_cardinality,
            )?;

        Ok(TickGlobals {
            fee_growth_global_0_x128: self.fee_growth_global_0_x128,
            fee_growth_global_1_x128: self.fee_growth_global_1_x128,
            seconds_per_liquidity_cumulative_x128,
            tick_cumulative,
            time,
        })
    }

    /// Apply a liquidity change to a position and its bounding ticks
    ///
    /// # Returns
    /// * (position after update, amount0, amount1), where positive amounts are
    ///   owed to the pool and negative ones are owed to the owner
    pub(crate) fn modify_position(
        &mut self,
        key: &PositionKey,
        liquidity_delta: i128,
    ) -> Result<(Position, i128, i128)> {
        check_ticks(key.tick_lower, key.tick_upper, self.config.tick_spacing)?;

        let slot0 = self.slot0;
        let position = self.update_position(key, liquidity_delta, slot0.tick)?;

        let mut amount0 = 0i128;
        let mut amount1 = 0i128;

        if liquidity_delta != 0 {
            let sqrt_ratio_lower = get_sqrt_ratio_at_tick(key.tick_lower)?;
            let sqrt_ratio_upper = get_sqrt_ratio_at_tick(key.tick_upper)?;

            if slot0.tick < key.tick_lower {
                // Range is above the price: only token0
                amount0 = get_amount0_delta_signed(sqrt_ratio_lower, sqrt_ratio_upper, liquidity_delta)?;
            } else if slot0.tick < key.tick_upper {
                // Range contains the price: in-range liquidity changes
                let liquidity_before = self.liquidity;

                let (observation_index, observation_cardinality) = self.observations.write(
                    slot0.observation_index,
                    self.block_timestamp,
                    slot0.tick,
                    liquidity_before,
                    slot0.observation_cardinality,
                    slot0.observation_cardinality_next,
                );
                self.slot0.observation_index = observation_index;
                self.slot0.observation_cardinality = observation_cardinality;

                amount0 = get_amount0_delta_signed(slot0.sqrt_price_x96, sqrt_ratio_upper, liquidity_delta)?;
                amount1 = get_amount1_delta_signed(sqrt_ratio_lower, slot0.sqrt_price_x96, liquidity_delta)?;

                self.liquidity = add_delta(liquidity_before, liquidity_delta)?;
            } else {
                // Range is below the price: only token1
                amount1 = get_amount1_delta_signed(sqrt_ratio_lower, sqrt_ratio_upper, liquidity_delta)?;
            }
        }

        Ok((position, amount0, amount1))
    }

    fn update_position(
        &mut self,
        key: &PositionKey,
        liquidity_delta: i128,
        tick: i32,
    ) -> Result<Position> {
        let fee_growth_global_0_x128 = self.fee_growth_global_0_x128;
        let fee_growth_global_1_x128 = self.fee_growth_global_1_x128;
        let tick_spacing = self.config.tick_spacing;

        let mut flipped_lower = false;
        let mut flipped_upper = false;

        if liquidity_delta != 0 {
            let globals = self.tick_globals()?;

            flipped_lower = self.ticks.update(
                key.tick_lower,
                tick,
                liquidity_delta,
                &globals,
                false,
                self.max_liquidity_per_tick,
            )?;
            flipped_upper = self.ticks.update(
                key.tick_upper,
                tick,
                liquidity_delta,
                &globals,
                true,
                self.max_liquidity_per_tick,
            )?;

            if flipped_lower {
                self.tick_bitmap.flip_tick(key.tick_lower, tick_spacing)?;
            }
            if flipped_upper {
                self.tick_bitmap.flip_tick(key.tick_upper, tick_spacing)?;
            }
        }

        let (fee_growth_inside_0_x128, fee_growth_inside_1_x128) = self.ticks.get_fee_growth_inside(
            key.tick_lower,
            key.tick_upper,
            tick,
            fee_growth_global_0_x128,
            fee_growth_global_1_x128,
        );

        let position = self.positions.update(
            key,
            liquidity_delta,
            fee_growth_inside_0_x128,
            fee_growth_inside_1_x128,
        )?;

        // Ticks that no position references any more are dropped
        if liquidity_delta < 0 {
            if flipped_lower {
                self.ticks.clear(key.tick_lower);
            }
            if flipped_upper {
                self.ticks.clear(key.tick_upper);
            }
        }

        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_pool_error;

    #[test]
    fn test_check_ticks() {
        assert!(check_ticks(-60, 60, 60).is_ok());
        assert!(check_ticks(MIN_TICK, MAX_TICK, 1).is_ok());
        assert_pool_error(check_ticks(1, 0, 1), PoolError::InvalidTickRange);
        assert_pool_error(check_ticks(0, 0, 1), PoolError::InvalidTickRange);
        assert_pool_error(check_ticks(MIN_TICK - 1, 0, 1), PoolError::InvalidTickRange);
        assert_pool_error(check_ticks(0, MAX_TICK + 1, 1), PoolError::InvalidTickRange);
        assert_pool_error(check_ticks(-61, 60, 60), PoolError::TickNotAligned);
        assert_pool_error(check_ticks(-60, 59, 60), PoolError::TickNotAligned);
    }
}
