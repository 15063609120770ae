use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::PoolError;
use crate::math::liquidity_math::add_delta;
use crate::math::U256;
use anchor_lang::prelude::*;
use std::collections::HashMap;

/// Per-tick state
/// Each initialized tick is a price point where in-range liquidity changes
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Tick {
    /// Total liquidity referencing this tick as either bound
    /// Used to track when tick can be uninitialized
    pub liquidity_gross: u128,

    /// Net liquidity change when crossing this tick left to right
    /// When price moves up through tick: add liquidity_net
    /// When price moves down through tick: subtract liquidity_net
    pub liquidity_net: i128,

    /// Fee growth per unit of liquidity on the other side of this tick (token0)
    /// Only meaningful relative to the current tick
    pub fee_growth_outside_0_x128: U256,

    /// Fee growth per unit of liquidity on the other side of this tick (token1)
    pub fee_growth_outside_1_x128: U256,

    /// Tick cumulative on the other side of this tick
    pub tick_cumulative_outside: i64,

    /// Seconds per liquidity on the other side of this tick (160-bit)
    pub seconds_per_liquidity_outside_x128: U256,

    /// Seconds spent on the other side of this tick
    pub seconds_outside: u32,

    /// Whether this tick is initialized
    pub initialized: bool,
}

/// Pool-wide accumulators at the moment a tick is touched
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct TickGlobals {
    pub fee_growth_global_0_x128: U256,
    pub fee_growth_global_1_x128: U256,
    pub seconds_per_liquidity_cumulative_x128: U256,
    pub tick_cumulative: i64,
    pub time: u32,
}

impl Tick {
    /// Apply a liquidity change to this tick
    ///
    /// # Arguments
    /// * `tick_index` - Index of this tick
    /// * `tick_current` - Current pool tick
    /// * `liquidity_delta` - Liquidity added (positive) or removed (negative)
    /// * `globals` - Current pool accumulators
    /// * `upper` - Whether this tick is the upper bound of the position
    /// * `max_liquidity` - Per-tick cap on gross liquidity
    ///
    /// # Returns
    /// * Whether the tick flipped between initialized and uninitialized
    pub fn update(
        &mut self,
        tick_index: i32,
        tick_current: i32,
        liquidity_delta: i128,
        globals: &TickGlobals,
        upper: bool,
        max_liquidity: u128,
    ) -> Result<bool> {
        let liquidity_gross_before = self.liquidity_gross;
        let liquidity_gross_after = add_delta(liquidity_gross_before, liquidity_delta)?;

        require!(
            liquidity_gross_after <= max_liquidity,
            PoolError::LiquidityOverflow
        );

        let flipped = (liquidity_gross_after == 0) != (liquidity_gross_before == 0);

        if liquidity_gross_before == 0 {
            // By convention, all growth before initialization happened below the tick
            if tick_index <= tick_current {
                self.fee_growth_outside_0_x128 = globals.fee_growth_global_0_x128;
                self.fee_growth_outside_1_x128 = globals.fee_growth_global_1_x128;
                self.seconds_per_liquidity_outside_x128 = globals.seconds_per_liquidity_cumulative_x128;
                self.tick_cumulative_outside = globals.tick_cumulative;
                self.seconds_outside = globals.time;
            }
            self.initialized = true;
        }

        self.liquidity_gross = liquidity_gross_after;

        // Lower bounds add liquidity when crossed upward, upper bounds remove it
        self.liquidity_net = if upper {
            self.liquidity_net.checked_sub(liquidity_delta)
        } else {
            self.liquidity_net.checked_add(liquidity_delta)
        }
        .ok_or(PoolError::LiquidityOverflow)?;

        Ok(flipped)
    }

    /// Cross this tick, flipping every "outside" value to the other side
    ///
    /// # Returns
    /// * liquidity_net, to be added when moving up and subtracted when moving down
    pub fn cross(&mut self, globals: &TickGlobals) -> i128 {
        self.fee_growth_outside_0_x128 = globals
            .fee_growth_global_0_x128
            .overflowing_sub(self.fee_growth_outside_0_x128)
            .0;
        self.fee_growth_outside_1_x128 = globals
            .fee_growth_global_1_x128
            .overflowing_sub(self.fee_growth_outside_1_x128)
            .0;
        self.seconds_per_liquidity_outside_x128 = globals
            .seconds_per_liquidity_cumulative_x128
            .overflowing_sub(self.seconds_per_liquidity_outside_x128)
            .0
            .low_160();
        self.tick_cumulative_outside = globals
            .tick_cumulative
            .wrapping_sub(self.tick_cumulative_outside);
        self.seconds_outside = globals.time.wrapping_sub(self.seconds_outside);

        self.liquidity_net
    }
}

/// Maximum gross liquidity per tick so that every usable tick at full
/// liquidity still sums to at most u128::MAX
pub fn tick_spacing_to_max_liquidity_per_tick(tick_spacing: i32) -> u128 {
    let min_tick = (MIN_TICK / tick_spacing) * tick_spacing;
    let max_tick = (MAX_TICK / tick_spacing) * tick_spacing;
    let num_ticks = ((max_tick - min_tick) / tick_spacing) as u128 + 1;
    u128::MAX / num_ticks
}

/// Sparse tick table
/// Absent entries read as an uninitialized default tick
#[derive(Clone, Debug, Default)]
pub struct TickTable {
    ticks: HashMap<i32, Tick>,
}

impl TickTable {
    /// Read a tick, default if never initialized
    pub fn get(&self, tick: i32) -> Tick {
        self.ticks.get(&tick).copied().unwrap_or_default()
    }

    /// Number of initialized ticks
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Initialized tick indices, unordered
    pub fn initialized_ticks(&self) -> impl Iterator<Item = i32> + '_ {
        self.ticks.keys().copied()
    }

    /// Update a tick for a position change, see [`Tick::update`]
    pub fn update(
        &mut self,
        tick: i32,
        tick_current: i32,
        liquidity_delta: i128,
        globals: &TickGlobals,
        upper: bool,
        max_liquidity: u128,
    ) -> Result<bool> {
        let mut info = self.get(tick);
        let flipped = info.update(tick, tick_current, liquidity_delta, globals, upper, max_liquidity)?;
        self.ticks.insert(tick, info);
        Ok(flipped)
    }

    /// Cross a tick during a swap, see [`Tick::cross`]
    pub fn cross(&mut self, tick: i32, globals: &TickGlobals) -> i128 {
        self.ticks.entry(tick).or_default().cross(globals)
    }

    /// Drop a tick whose gross liquidity returned to zero
    pub fn clear(&mut self, tick: i32) {
        self.ticks.remove(&tick);
    }

    /// Fee growth per unit of liquidity inside [tick_lower, tick_upper)
    ///
    /// inside = global - below(lower) - above(upper), all modulo 2^256
    pub fn get_fee_growth_inside(
        &self,
        tick_lower: i32,
        tick_upper: i32,
        tick_current: i32,
        fee_growth_global_0_x128: U256,
        fee_growth_global_1_x128: U256,
    ) -> (U256, U256) {
        let lower = self.get(tick_lower);
        let upper = self.get(tick_upper);

        let (fee_growth_below_0, fee_growth_below_1) = if tick_current >= tick_lower {
            (lower.fee_growth_outside_0_x128, lower.fee_growth_outside_1_x128)
        } else {
            (
                fee_growth_global_0_x128.overflowing_sub(lower.fee_growth_outside_0_x128).0,
                fee_growth_global_1_x128.overflowing_sub(lower.fee_growth_outside_1_x128).0,
            )
        };

        let (fee_growth_above_0, fee_growth_above_1) = if tick_current < tick_upper {
            (upper.fee_growth_outside_0_x128, upper.fee_growth_outside_1_x128)
        } else {
            (
                fee_growth_global_0_x128.overflowing_sub(upper.fee_growth_outside_0_x128).0,
                fee_growth_global_1_x128.overflowing_sub(upper.fee_growth_outside_1_x128).0,
            )
        };

        (
            fee_growth_global_0_x128
                .overflowing_sub(fee_growth_below_0)
                .0
                .overflowing_sub(fee_growth_above_0)
                .0,
            fee_growth_global_1_x128
                .overflowing_sub(fee_growth_below_1)
                .0
                .overflowing_sub(fee_growth_above_1)
                .0,
        )
    }
}
