use crate::callbacks::TokenLedger;
use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::math::U256;
use crate::state::{
    tick_spacing_to_max_liquidity_per_tick, Observation, Observations, PoolConfig, Position,
    PositionKey, PositionTable, Tick, TickBitmap, TickTable,
};
use anchor_lang::prelude::*;

/// Frequently read pool state
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Slot0 {
    /// Current sqrt price as Q64.96, zero until initialized
    pub sqrt_price_x96: U256,

    /// Current tick index, the greatest tick at or below the price
    pub tick: i32,

    /// Most recently written observation slot
    pub observation_index: u16,

    /// Number of observations in the active ring
    pub observation_cardinality: u16,

    /// Ring size adopted at the next wraparound
    pub observation_cardinality_next: u16,

    /// Protocol fee denominators, token0 in the low nibble and token1 in the high nibble
    /// 0 disables the protocol fee for that token
    pub fee_protocol: u8,

    /// Reentrancy guard
    pub unlocked: bool,
}

impl Slot0 {
    pub fn fee_protocol0(&self) -> u8 {
        self.fee_protocol % 16
    }

    pub fn fee_protocol1(&self) -> u8 {
        self.fee_protocol >> 4
    }
}

/// Protocol fees accrued and not yet collected
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct ProtocolFees {
    pub token0: u128,
    pub token1: u128,
}

/// Pool state - the core AMM state for a token pair
///
/// Token balances live in an external [`TokenLedger`] under `config.address`;
/// the pool only keeps the accounting.
#[derive(Clone, Debug)]
pub struct Pool {
    pub(crate) config: PoolConfig,

    /// Derived from the tick spacing at construction
    pub(crate) max_liquidity_per_tick: u128,

    pub(crate) slot0: Slot0,

    /// Global fee growth per unit of liquidity (Q128.128, wrapping)
    pub(crate) fee_growth_global_0_x128: U256,
    pub(crate) fee_growth_global_1_x128: U256,

    pub(crate) protocol_fees: ProtocolFees,

    /// Liquidity currently in range
    pub(crate) liquidity: u128,

    pub(crate) ticks: TickTable,
    pub(crate) tick_bitmap: TickBitmap,
    pub(crate) positions: PositionTable,
    pub(crate) observations: Observations,

    /// Clock supplied by the host
    pub(crate) block_timestamp: u32,

    /// Event journal, drained by the host
    pub(crate) events: Vec<PoolEvent>,
}

impl Pool {
    /// Uninitialized pool for `config`
    ///
    /// Fails if the config does not pass [`PoolConfig::validate`].
    pub fn new(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            max_liquidity_per_tick: tick_spacing_to_max_liquidity_per_tick(config.tick_spacing),
            config,
            slot0: Slot0 {
                unlocked: true,
                ..Default::default()
            },
            fee_growth_global_0_x128: U256::zero(),
            fee_growth_global_1_x128: U256::zero(),
            protocol_fees: ProtocolFees::default(),
            liquidity: 0,
            ticks: TickTable::default(),
            tick_bitmap: TickBitmap::default(),
            positions: PositionTable::default(),
            observations: Observations::default(),
            block_timestamp: 0,
            events: Vec::new(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // READ ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    pub fn slot0(&self) -> Slot0 {
        self.slot0
    }

    pub fn is_initialized(&self) -> bool {
        !self.slot0.sqrt_price_x96.is_zero()
    }

    pub fn liquidity(&self) -> u128 {
        self.liquidity
    }

    pub fn fee_growth_global_0_x128(&self) -> U256 {
        self.fee_growth_global_0_x128
    }

    pub fn fee_growth_global_1_x128(&self) -> U256 {
        self.fee_growth_global_1_x128
    }

    pub fn protocol_fees(&self) -> ProtocolFees {
        self.protocol_fees
    }

    pub fn max_liquidity_per_tick(&self) -> u128 {
        self.max_liquidity_per_tick
    }

    pub fn ticks(&self, tick: i32) -> Tick {
        self.ticks.get(tick)
    }

    pub fn tick_bitmap(&self, word_pos: i16) -> U256 {
        self.tick_bitmap.word(word_pos)
    }

    pub fn positions(&self, owner: &Pubkey, tick_lower: i32, tick_upper: i32) -> Position {
        self.positions.get(&PositionKey::new(*owner, tick_lower, tick_upper))
    }

    pub fn observations(&self, index: u16) -> Observation {
        self.observations.get(index)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // CLOCK AND EVENTS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn block_timestamp(&self) -> u32 {
        self.block_timestamp
    }

    pub fn set_block_timestamp(&mut self, time: u32) {
        self.block_timestamp = time;
    }

    /// Move the clock forward, wrapping like a 32-bit block timestamp
    pub fn advance_time(&mut self, seconds: u32) {
        self.block_timestamp = self.block_timestamp.wrapping_add(seconds);
    }

    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Drain the event journal
    pub fn take_events(&mut self) -> Vec<PoolEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LOCK
    // ═══════════════════════════════════════════════════════════════════════

    /// Run a mutating operation under the pool lock
    ///
    /// The pool must be initialized and unlocked. Pool and ledger are
    /// restored to their entry state if the operation fails.
    ///
    /// The snapshot clones the whole pool (tick, position and bitmap tables
    /// included) and the ledger, so every call costs O(total state).
    // TODO: replace the full snapshot with an undo log of touched ticks and
    // positions once hosts keep pools with many initialized ticks.
    pub(crate) fn run_locked<L, T, F>(&mut self, ledger: &mut L, op: F) -> Result<T>
    where
        L: TokenLedger,
        F: FnOnce(&mut Pool, &mut L) -> Result<T>,
    {
        require!(self.is_initialized(), PoolError::NotInitialized);
        require!(self.slot0.unlocked, PoolError::Locked);

        let pool_snapshot = self.clone();
        let ledger_snapshot = ledger.clone();

        self.slot0.unlocked = false;
        match op(self, ledger) {
            Ok(value) => {
                self.slot0.unlocked = true;
                Ok(value)
            }
            Err(err) => {
                *self = pool_snapshot;
                *ledger = ledger_snapshot;
                Err(err)
            }
        }
    }

    /// [`Pool::run_locked`] for operations that never touch token balances
    ///
    /// Clones the pool but not the ledger.
    pub(crate) fn run_locked_local<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Pool) -> Result<T>,
    {
        require!(self.is_initialized(), PoolError::NotInitialized);
        require!(self.slot0.unlocked, PoolError::Locked);

        let pool_snapshot = self.clone();

        self.slot0.unlocked = false;
        match op(self) {
            Ok(value) => {
                self.slot0.unlocked = true;
                Ok(value)
            }
            Err(err) => {
                *self = pool_snapshot;
                Err(err)
            }
        }
    }
}
