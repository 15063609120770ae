//! Read-only oracle queries

use crate::errors::PoolError;
use crate::instructions::check_ticks;
use crate::math::U256;
use crate::state::Pool;
use anchor_lang::prelude::*;

/// Cumulative values inside a tick range, only meaningful as differences
/// between two snapshots of the same range
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CumulativesInside {
    pub tick_cumulative_inside: i64,
    pub seconds_per_liquidity_inside_x128: U256,
    pub seconds_inside: u32,
}

impl Pool {
    /// Tick and seconds-per-liquidity cumulatives `seconds_agos` before now
    ///
    /// A TWAP over a window is `(cumulative[now] - cumulative[then]) / window`.
    pub fn observe(&self, seconds_agos: &[u32]) -> Result<(Vec<i64>, Vec<U256>)> {
        require!(self.is_initialized(), PoolError::NotInitialized);

        self.observations.observe(
            self.block_timestamp,
            seconds_agos,
            self.slot0.tick,
            self.slot0.observation_index,
            self.liquidity,
            self.slot0.observation_cardinality,
        )
    }

    /// Snapshot of the cumulatives accrued while the price was inside
    /// [tick_lower, tick_upper)
    ///
    /// Both bounds must be initialized, i.e. referenced by some position.
    pub fn snapshot_cumulatives_inside(&self, tick_lower: i32, tick_upper: i32) -> Result<CumulativesInside> {
        require!(self.is_initialized(), PoolError::NotInitialized);
        check_ticks(tick_lower, tick_upper, self.config.tick_spacing)?;

        let lower = self.ticks.get(tick_lower);
        let upper = self.ticks.get(tick_upper);
        require!(lower.initialized && upper.initialized, PoolError::TickNotInitialized);

        let slot0 = self.slot0;

        let snapshot = if slot0.tick < tick_lower {
            CumulativesInside {
                tick_cumulative_inside: lower
                    .tick_cumulative_outside
                    .wrapping_sub(upper.tick_cumulative_outside),
                seconds_per_liquidity_inside_x128: lower
                    .seconds_per_liquidity_outside_x128
                    .overflowing_sub(upper.seconds_per_liquidity_outside_x128)
                    .0
                    .low_160(),
                seconds_inside: lower.seconds_outside.wrapping_sub(upper.seconds_outside),
            }
        } else if slot0.tick < tick_upper {
            let time = self.block_timestamp;
            let (tick_cumulative, seconds_per_liquidity_cumulative_x128) =
                self.observations.observe_single(
                    time,
                    0,
                    slot0.tick,
                    slot0.observation_index,
                    self.liquidity,
                    slot0.observation_cardinality,
                )?;

            CumulativesInside {
                tick_cumulative_inside: tick_cumulative
                    .wrapping_sub(lower.tick_cumulative_outside)
                    .wrapping_sub(upper.tick_cumulative_outside),
                seconds_per_liquidity_inside_x128: seconds_per_liquidity_cumulative_x128
                    .overflowing_sub(lower.seconds_per_liquidity_outside_x128)
                    .0
                    .overflowing_sub(upper.seconds_per_liquidity_outside_x128)
                    .0
                    .low_160(),
                seconds_inside: time
                    .wrapping_sub(lower.seconds_outside)
                    .wrapping_sub(upper.seconds_outside),
            }
        } else {
            CumulativesInside {
                tick_cumulative_inside: upper
                    .tick_cumulative_outside
                    .wrapping_sub(lower.tick_cumulative_outside),
                seconds_per_liquidity_inside_x128: upper
                    .seconds_per_liquidity_outside_x128
                    .overflowing_sub(lower.seconds_per_liquidity_outside_x128)
                    .0
                    .low_160(),
                seconds_inside: upper.seconds_outside.wrapping_sub(lower.seconds_outside),
            }
        };

        Ok(snapshot)
    }
}
