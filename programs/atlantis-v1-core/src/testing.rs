//! Test Fixtures
//!
//! In-memory token ledger, a scriptable callback counterparty and a small
//! harness that wires them to a pool. Available to downstream crates
//! through the `test-utils` feature.

use crate::callbacks::{FlashCallback, MintCallback, SwapCallback, TokenLedger};
use crate::constants::{MAX_SQRT_RATIO, MIN_SQRT_RATIO};
use crate::errors::PoolError;
use crate::instructions::{FlashParams, MintParams, SwapParams};
use crate::math::U256;
use crate::state::{Pool, PoolConfig};
use anchor_lang::prelude::*;
use std::collections::HashMap;

pub const TOKEN0: Pubkey = Pubkey::new_from_array([1; 32]);
pub const TOKEN1: Pubkey = Pubkey::new_from_array([2; 32]);
pub const WALLET: Pubkey = Pubkey::new_from_array([3; 32]);
pub const OTHER: Pubkey = Pubkey::new_from_array([4; 32]);
pub const FACTORY: Pubkey = Pubkey::new_from_array([5; 32]);
pub const POOL_ADDRESS: Pubkey = Pubkey::new_from_array([9; 32]);

/// Starting balance of each token for `WALLET`
pub const WALLET_FUNDS: u128 = 1 << 120;

/// Config for the TOKEN0/TOKEN1 pool with the given fee and spacing
pub fn config_with(fee: u32, tick_spacing: i32) -> PoolConfig {
    PoolConfig {
        factory: FACTORY,
        address: POOL_ADDRESS,
        token0: TOKEN0,
        token1: TOKEN1,
        fee,
        tick_spacing,
        protocol_authority: FACTORY,
    }
}

/// The 0.3% pool used by most tests
pub fn config_3000() -> PoolConfig {
    config_with(3000, 60)
}

/// Assert that `result` failed with `expected`
pub fn assert_pool_error<T: std::fmt::Debug>(result: Result<T>, expected: PoolError) {
    let name = format!("{:?}", expected);
    let code: u32 = expected.into();
    match result {
        Err(Error::AnchorError(err)) => {
            assert_eq!(
                err.error_code_number, code,
                "expected {}, got {}",
                name, err.error_name
            );
        }
        other => panic!("expected {}, got {:?}", name, other),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════════

/// Balances keyed by (token, owner)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockLedger {
    balances: HashMap<(Pubkey, Pubkey), u128>,
}

impl MockLedger {
    pub fn set_balance(&mut self, token: &Pubkey, owner: &Pubkey, amount: u128) {
        self.balances.insert((*token, *owner), amount);
    }

    /// Create tokens out of thin air
    pub fn mint_to(&mut self, token: &Pubkey, owner: &Pubkey, amount: u128) {
        let balance = self.balances.entry((*token, *owner)).or_default();
        *balance = balance.saturating_add(amount);
    }
}

impl TokenLedger for MockLedger {
    fn balance_of(&self, token: &Pubkey, owner: &Pubkey) -> u128 {
        self.balances.get(&(*token, *owner)).copied().unwrap_or(0)
    }

    fn transfer(&mut self, token: &Pubkey, from: &Pubkey, to: &Pubkey, amount: u128) -> Result<()> {
        let from_balance = self.balance_of(token, from);
        require!(from_balance >= amount, PoolError::TransferFailed);
        let to_balance = self
            .balance_of(token, to)
            .checked_add(amount)
            .ok_or(PoolError::MathOverflow)?;

        self.balances.insert((*token, *from), from_balance - amount);
        // read after the debit so self transfers net out
        let to_balance = if from == to { from_balance } else { to_balance };
        self.balances.insert((*token, *to), to_balance);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CALLEE
// ═══════════════════════════════════════════════════════════════════════════

/// Flash repayment instructions, passed to the callee as callback data
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlashPayment {
    pub pay0: u128,
    pub pay1: u128,
}

impl FlashPayment {
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::new();
        // writing into a Vec cannot fail
        let _ = self.serialize(&mut data);
        data
    }

    pub fn decode(data: &[u8]) -> Self {
        Self::try_from_slice(data).unwrap_or_default()
    }
}

/// Counterparty that pays what the pool asks from `payer`
#[derive(Clone, Debug)]
pub struct TestCallee {
    pub payer: Pubkey,
    /// Amount withheld from every mint and swap payment
    pub shortfall: u128,
    /// Call back into the pool from inside the callback
    pub reenter: bool,
}

impl TestCallee {
    pub fn new(payer: Pubkey) -> Self {
        Self {
            payer,
            shortfall: 0,
            reenter: false,
        }
    }

    fn pay<L: TokenLedger>(&self, pool: &Pool, ledger: &mut L, token: &Pubkey, amount: u128) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        ledger.transfer(token, &self.payer, &pool.config().address, amount)
    }

    fn maybe_reenter(&self, pool: &mut Pool) -> Result<()> {
        if self.reenter {
            pool.increase_observation_cardinality_next(2)?;
        }
        Ok(())
    }
}

impl<L: TokenLedger> MintCallback<L> for TestCallee {
    fn mint_callback(
        &mut self,
        pool: &mut Pool,
        ledger: &mut L,
        amount0_owed: u128,
        amount1_owed: u128,
        _data: &[u8],
    ) -> Result<()> {
        self.maybe_reenter(pool)?;
        let config = *pool.config();
        self.pay(pool, ledger, &config.token0, amount0_owed.saturating_sub(self.shortfall))?;
        self.pay(pool, ledger, &config.token1, amount1_owed.saturating_sub(self.shortfall))
    }
}

impl<L: TokenLedger> SwapCallback<L> for TestCallee {
    fn swap_callback(
        &mut self,
        pool: &mut Pool,
        ledger: &mut L,
        amount0_delta: i128,
        amount1_delta: i128,
        _data: &[u8],
    ) -> Result<()> {
        self.maybe_reenter(pool)?;
        let config = *pool.config();
        if amount0_delta > 0 {
            self.pay(pool, ledger, &config.token0, (amount0_delta as u128).saturating_sub(self.shortfall))?;
        }
        if amount1_delta > 0 {
            self.pay(pool, ledger, &config.token1, (amount1_delta as u128).saturating_sub(self.shortfall))?;
        }
        Ok(())
    }
}

impl<L: TokenLedger> FlashCallback<L> for TestCallee {
    fn flash_callback(
        &mut self,
        pool: &mut Pool,
        ledger: &mut L,
        _fee0: u128,
        _fee1: u128,
        data: &[u8],
    ) -> Result<()> {
        self.maybe_reenter(pool)?;
        let payment = FlashPayment::decode(data);
        let config = *pool.config();
        self.pay(pool, ledger, &config.token0, payment.pay0)?;
        self.pay(pool, ledger, &config.token1, payment.pay1)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HARNESS
// ═══════════════════════════════════════════════════════════════════════════

/// A pool, its ledger and a funded counterparty acting for `WALLET`
pub struct TestEnv {
    pub pool: Pool,
    pub ledger: MockLedger,
    pub callee: TestCallee,
}

impl TestEnv {
    /// Panics if `config` is rejected by [`Pool::new`]
    pub fn new(config: PoolConfig) -> Self {
        let mut ledger = MockLedger::default();
        ledger.mint_to(&config.token0, &WALLET, WALLET_FUNDS);
        ledger.mint_to(&config.token1, &WALLET, WALLET_FUNDS);

        Self {
            pool: Pool::new(config).expect("test pool config"),
            ledger,
            callee: TestCallee::new(WALLET),
        }
    }

    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<()> {
        self.pool.initialize(sqrt_price_x96)
    }

    /// Pool balances of (token0, token1)
    pub fn pool_balances(&self) -> (u128, u128) {
        let config = self.pool.config();
        (
            self.ledger.balance_of(&config.token0, &config.address),
            self.ledger.balance_of(&config.token1, &config.address),
        )
    }

    pub fn mint(&mut self, recipient: Pubkey, tick_lower: i32, tick_upper: i32, amount: u128) -> Result<(u128, u128)> {
        self.pool.mint(
            &mut self.ledger,
            &mut self.callee,
            MintParams {
                sender: WALLET,
                recipient,
                tick_lower,
                tick_upper,
                amount,
            },
            &[],
        )
    }

    pub fn swap(
        &mut self,
        recipient: Pubkey,
        zero_for_one: bool,
        amount_specified: i128,
        sqrt_price_limit_x96: U256,
    ) -> Result<(i128, i128)> {
        self.pool.swap(
            &mut self.ledger,
            &mut self.callee,
            SwapParams {
                sender: WALLET,
                recipient,
                zero_for_one,
                amount_specified,
                sqrt_price_limit_x96,
            },
            &[],
        )
    }

    pub fn swap_exact0_for1(&mut self, amount: u128, recipient: Pubkey) -> Result<(i128, i128)> {
        self.swap(recipient, true, amount as i128, MIN_SQRT_RATIO + 1)
    }

    pub fn swap_exact1_for0(&mut self, amount: u128, recipient: Pubkey) -> Result<(i128, i128)> {
        self.swap(recipient, false, amount as i128, MAX_SQRT_RATIO - 1)
    }

    pub fn swap0_for_exact1(&mut self, amount: u128, recipient: Pubkey) -> Result<(i128, i128)> {
        self.swap(recipient, true, -(amount as i128), MIN_SQRT_RATIO + 1)
    }

    pub fn swap1_for_exact0(&mut self, amount: u128, recipient: Pubkey) -> Result<(i128, i128)> {
        self.swap(recipient, false, -(amount as i128), MAX_SQRT_RATIO - 1)
    }

    /// Sell token0 until the price falls to `sqrt_price_x96`
    pub fn swap_to_lower_price(&mut self, sqrt_price_x96: U256, recipient: Pubkey) -> Result<(i128, i128)> {
        self.swap(recipient, true, i128::MAX, sqrt_price_x96)
    }

    /// Sell token1 until the price rises to `sqrt_price_x96`
    pub fn swap_to_higher_price(&mut self, sqrt_price_x96: U256, recipient: Pubkey) -> Result<(i128, i128)> {
        self.swap(recipient, false, i128::MAX, sqrt_price_x96)
    }

    /// Borrow `amount0`/`amount1` to `recipient` and repay `pay0`/`pay1` from `WALLET`
    pub fn flash(
        &mut self,
        recipient: Pubkey,
        amount0: u128,
        amount1: u128,
        pay0: u128,
        pay1: u128,
    ) -> Result<()> {
        let data = FlashPayment { pay0, pay1 }.encode();
        self.pool.flash(
            &mut self.ledger,
            &mut self.callee,
            FlashParams {
                sender: WALLET,
                recipient,
                amount0,
                amount1,
            },
            &data,
        )
    }
}
