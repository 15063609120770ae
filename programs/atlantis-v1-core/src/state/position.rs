use crate::constants::Q128;
use crate::errors::PoolError;
use crate::math::full_math::mul_div;
use crate::math::liquidity_math::add_delta;
use crate::math::U256;
use anchor_lang::prelude::*;
use std::collections::HashMap;

/// Identity of a liquidity position: one per owner and range
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey {
    pub owner: Pubkey,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

impl PositionKey {
    pub fn new(owner: Pubkey, tick_lower: i32, tick_upper: i32) -> Self {
        Self {
            owner,
            tick_lower,
            tick_upper,
        }
    }
}

/// Liquidity position - an LP's concentrated liquidity in one range
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Position {
    /// Amount of liquidity in this position
    pub liquidity: u128,

    /// Fee growth inside the position's range at last update (token0)
    pub fee_growth_inside_0_last_x128: U256,

    /// Fee growth inside the position's range at last update (token1)
    pub fee_growth_inside_1_last_x128: U256,

    /// Tokens owed to the position owner (token0)
    pub tokens_owed_0: u128,

    /// Tokens owed to the position owner (token1)
    pub tokens_owed_1: u128,
}

impl Position {
    /// Check if position is empty (no liquidity and no owed tokens)
    pub fn is_empty(&self) -> bool {
        self.liquidity == 0 && self.tokens_owed_0 == 0 && self.tokens_owed_1 == 0
    }

    /// Credit fees accrued since the last update and apply a liquidity change
    ///
    /// Fee calculation: tokens = liquidity * (fee_growth_inside - last) / 2^128
    /// The growth delta wraps modulo 2^256, and owed amounts wrap at u128:
    /// owners must collect before 2^128 of either token accrues.
    pub fn update(
        &mut self,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<()> {
        let liquidity_next = if liquidity_delta == 0 {
            // A poke of an empty position would only move checkpoints
            require!(self.liquidity > 0, PoolError::InsufficientLiquidity);
            self.liquidity
        } else {
            add_delta(self.liquidity, liquidity_delta)?
        };

        let tokens_owed_0 = owed(
            self.liquidity,
            fee_growth_inside_0_x128,
            self.fee_growth_inside_0_last_x128,
        )?;
        let tokens_owed_1 = owed(
            self.liquidity,
            fee_growth_inside_1_x128,
            self.fee_growth_inside_1_last_x128,
        )?;

        self.liquidity = liquidity_next;
        self.fee_growth_inside_0_last_x128 = fee_growth_inside_0_x128;
        self.fee_growth_inside_1_last_x128 = fee_growth_inside_1_x128;

        if tokens_owed_0 > 0 || tokens_owed_1 > 0 {
            self.tokens_owed_0 = self.tokens_owed_0.wrapping_add(tokens_owed_0);
            self.tokens_owed_1 = self.tokens_owed_1.wrapping_add(tokens_owed_1);
        }

        Ok(())
    }
}

fn owed(liquidity: u128, fee_growth_inside_x128: U256, last_x128: U256) -> Result<u128> {
    let delta = fee_growth_inside_x128.overflowing_sub(last_x128).0;
    // (delta * liquidity) / 2^128 < 2^256, truncated to 128 bits
    Ok(mul_div(delta, U256::from(liquidity), Q128)?.low_u128())
}

/// Positions of a pool keyed by owner and range
#[derive(Clone, Debug, Default)]
pub struct PositionTable {
    positions: HashMap<PositionKey, Position>,
}

impl PositionTable {
    /// Read a position, default if never touched
    pub fn get(&self, key: &PositionKey) -> Position {
        self.positions.get(key).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Mutable access, creating the record on first touch
    pub fn get_mut(&mut self, key: &PositionKey) -> &mut Position {
        self.positions.entry(*key).or_default()
    }

    /// Update a position, see [`Position::update`]
    ///
    /// The table is unchanged on error.
    pub fn update(
        &mut self,
        key: &PositionKey,
        liquidity_delta: i128,
        fee_growth_inside_0_x128: U256,
        fee_growth_inside_1_x128: U256,
    ) -> Result<Position> {
        let mut position = self.get(key);
        position.update(liquidity_delta, fee_growth_inside_0_x128, fee_growth_inside_1_x128)?;
        self.positions.insert(*key, position);
        Ok(position)
    }
}
