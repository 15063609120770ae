use crate::callbacks::{call_swap, SwapCallback, TokenLedger};
use crate::constants::{MAX_SQRT_RATIO, MAX_TICK, MIN_SQRT_RATIO, MIN_TICK, Q128};
use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::math::full_math::mul_div;
use crate::math::liquidity_math::add_delta;
use crate::math::swap_math::compute_swap_step;
use crate::math::tick_math::{get_sqrt_ratio_at_tick, get_tick_at_sqrt_ratio};
use crate::math::U256;
use crate::state::{Pool, TickGlobals};
use anchor_lang::prelude::*;

/// Swap parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SwapParams {
    /// Caller, reported in the event
    pub sender: Pubkey,
    /// Receives the output tokens
    pub recipient: Pubkey,
    /// true sells token0 for token1 (price moves down)
    pub zero_for_one: bool,
    /// Positive for exact input, negative for exact output
    pub amount_specified: i128,
    /// Price the swap may not pass
    pub sqrt_price_limit_x96: U256,
}

/// Values fixed for the whole swap
struct SwapCache {
    liquidity_start: u128,
    block_timestamp: u32,
    fee_protocol: u8,
    /// Oracle accumulators, computed on the first initialized tick crossed
    seconds_per_liquidity_cumulative_x128: U256,
    tick_cumulative: i64,
    computed_latest_observation: bool,
}

/// Running state of the swap loop
struct SwapState {
    amount_specified_remaining: i128,
    amount_calculated: i128,
    sqrt_price_x96: U256,
    tick: i32,
    /// Fee growth of the input token
    fee_growth_global_x128: U256,
    protocol_fee: u128,
    liquidity: u128,
}

impl Pool {
    /// Swap one token for the other, walking across initialized ticks
    ///
    /// The output is sent to the recipient first; the callback must then pay
    /// the input into the pool.
    ///
    /// # Returns
    /// * (amount0, amount1) pool deltas, positive amounts were paid in and
    ///   negative ones sent out
    pub fn swap<L, C>(
        &mut self,
        ledger: &mut L,
        callback: &mut C,
        params: SwapParams,
        data: &[u8],
    ) -> Result<(i128, i128)>
    where
        L: TokenLedger,
        C: SwapCallback<L> + ?Sized,
    {
        self.run_locked(ledger, |pool, ledger| {
            require!(params.amount_specified != 0, PoolError::ZeroAmount);

            let slot0_start = pool.slot0;
            let zero_for_one = params.zero_for_one;
            let sqrt_price_limit_x96 = params.sqrt_price_limit_x96;

            if zero_for_one {
                require!(
                    sqrt_price_limit_x96 < slot0_start.sqrt_price_x96
                        && sqrt_price_limit_x96 > MIN_SQRT_RATIO,
                    PoolError::InvalidPriceLimit
                );
            } else {
                require!(
                    sqrt_price_limit_x96 > slot0_start.sqrt_price_x96
                        && sqrt_price_limit_x96 < MAX_SQRT_RATIO,
                    PoolError::InvalidPriceLimit
                );
            }

            let mut cache = SwapCache {
                liquidity_start: pool.liquidity,
                block_timestamp: pool.block_timestamp,
                fee_protocol: if zero_for_one {
                    slot0_start.fee_protocol0()
                } else {
                    slot0_start.fee_protocol1()
                },
                seconds_per_liquidity_cumulative_x128: U256::zero(),
                tick_cumulative: 0,
                computed_latest_observation: false,
            };

            let exact_input = params.amount_specified > 0;
            let tick_spacing = pool.config.tick_spacing;
            let fee = pool.config.fee;

            let mut state = SwapState {
                amount_specified_remaining: params.amount_specified,
                amount_calculated: 0,
                sqrt_price_x96: slot0_start.sqrt_price_x96,
                tick: slot0_start.tick,
                fee_growth_global_x128: if zero_for_one {
                    pool.fee_growth_global_0_x128
                } else {
                    pool.fee_growth_global_1_x128
                },
                protocol_fee: 0,
                liquidity: cache.liquidity_start,
            };

            // Main swap loop: one step per initialized tick or bitmap word
            while state.amount_specified_remaining != 0 && state.sqrt_price_x96 != sqrt_price_limit_x96 {
                // Out of liquidity with nothing left to cross
                if state.liquidity == 0
                    && pool
                        .tick_bitmap
                        .next_initialized_tick(state.tick, tick_spacing, zero_for_one)
                        .is_none()
                {
                    return err!(PoolError::InsufficientLiquidity);
                }

                let sqrt_price_start_x96 = state.sqrt_price_x96;

                let (tick_next, initialized) = pool.tick_bitmap.next_initialized_tick_within_one_word(
                    state.tick,
                    tick_spacing,
                    zero_for_one,
                );
                // The bitmap knows nothing of tick bounds
                let tick_next = tick_next.clamp(MIN_TICK, MAX_TICK);
                let sqrt_price_next_x96 = get_sqrt_ratio_at_tick(tick_next)?;

                let sqrt_price_target_x96 = if zero_for_one {
                    sqrt_price_next_x96.max(sqrt_price_limit_x96)
                } else {
                    sqrt_price_next_x96.min(sqrt_price_limit_x96)
                };

                let step = compute_swap_step(
                    state.sqrt_price_x96,
                    sqrt_price_target_x96,
                    state.liquidity,
                    state.amount_specified_remaining,
                    fee,
                )?;
                state.sqrt_price_x96 = step.sqrt_price_next_x96;

                let amount_in = step.amount_in.to_i128()?;
                let amount_out = step.amount_out.to_i128()?;
                let fee_amount_signed = step.fee_amount.to_i128()?;

                if exact_input {
                    state.amount_specified_remaining = state
                        .amount_specified_remaining
                        .checked_sub(amount_in)
                        .and_then(|v| v.checked_sub(fee_amount_signed))
                        .ok_or(PoolError::MathOverflow)?;
                    state.amount_calculated = state
                        .amount_calculated
                        .checked_sub(amount_out)
                        .ok_or(PoolError::MathOverflow)?;
                } else {
                    state.amount_specified_remaining = state
                        .amount_specified_remaining
                        .checked_add(amount_out)
                        .ok_or(PoolError::MathOverflow)?;
                    state.amount_calculated = state
                        .amount_calculated
                        .checked_add(amount_in)
                        .and_then(|v| v.checked_add(fee_amount_signed))
                        .ok_or(PoolError::MathOverflow)?;
                }

                // Protocol takes 1/fee_protocol of the step fee
                let mut fee_amount = step.fee_amount;
                if cache.fee_protocol > 0 {
                    let delta = fee_amount / U256::from(cache.fee_protocol);
                    fee_amount -= delta;
                    state.protocol_fee = state
                        .protocol_fee
                        .checked_add(delta.to_u128()?)
                        .ok_or(PoolError::MathOverflow)?;
                }

                if state.liquidity > 0 {
                    let fee_growth_delta = mul_div(fee_amount, Q128, U256::from(state.liquidity))?;
                    state.fee_growth_global_x128 =
                        state.fee_growth_global_x128.overflowing_add(fee_growth_delta).0;
                }

                if state.sqrt_price_x96 == sqrt_price_next_x96 {
                    if initialized {
                        if !cache.computed_latest_observation {
                            let (tick_cumulative, seconds_per_liquidity) =
                                pool.observations.observe_single(
                                    cache.block_timestamp,
                                    0,
                                    slot0_start.tick,
                                    slot0_start.observation_index,
                                    cache.liquidity_start,
                                    slot0_start.observation_cardinality,
                                )?;
                            cache.tick_cumulative = tick_cumulative;
                            cache.seconds_per_liquidity_cumulative_x128 = seconds_per_liquidity;
                            cache.computed_latest_observation = true;
                        }

                        let globals = TickGlobals {
                            fee_growth_global_0_x128: if zero_for_one {
                                state.fee_growth_global_x128
                            } else {
                                pool.fee_growth_global_0_x128
                            },
                            fee_growth_global_1_x128: if zero_for_one {
                                pool.fee_growth_global_1_x128
                            } else {
                                state.fee_growth_global_x128
                            },
                            seconds_per_liquidity_cumulative_x128: cache
                                .seconds_per_liquidity_cumulative_x128,
                            tick_cumulative: cache.tick_cumulative,
                            time: cache.block_timestamp,
                        };

                        let liquidity_net = pool.ticks.cross(tick_next, &globals);
                        // Moving left exits ranges whose lower bound this is
                        let liquidity_net = if zero_for_one {
                            liquidity_net.checked_neg().ok_or(PoolError::LiquidityOverflow)?
                        } else {
                            liquidity_net
                        };
                        state.liquidity = add_delta(state.liquidity, liquidity_net)?;
                    }

                    state.tick = if zero_for_one { tick_next - 1 } else { tick_next };
                } else if state.sqrt_price_x96 != sqrt_price_start_x96 {
                    state.tick = get_tick_at_sqrt_ratio(state.sqrt_price_x96)?;
                }
            }

            // Record the pre-swap tick, a no-op if this timestamp is already written
            let (observation_index, observation_cardinality) = pool.observations.write(
                slot0_start.observation_index,
                cache.block_timestamp,
                slot0_start.tick,
                cache.liquidity_start,
                slot0_start.observation_cardinality,
                slot0_start.observation_cardinality_next,
            );
            pool.slot0.tick = state.tick;
            pool.slot0.observation_index = observation_index;
            pool.slot0.observation_cardinality = observation_cardinality;
            pool.slot0.sqrt_price_x96 = state.sqrt_price_x96;

            if cache.liquidity_start != state.liquidity {
                pool.liquidity = state.liquidity;
            }

            if zero_for_one {
                pool.fee_growth_global_0_x128 = state.fee_growth_global_x128;
                pool.protocol_fees.token0 = pool
                    .protocol_fees
                    .token0
                    .checked_add(state.protocol_fee)
                    .ok_or(PoolError::MathOverflow)?;
            } else {
                pool.fee_growth_global_1_x128 = state.fee_growth_global_x128;
                pool.protocol_fees.token1 = pool
                    .protocol_fees
                    .token1
                    .checked_add(state.protocol_fee)
                    .ok_or(PoolError::MathOverflow)?;
            }

            let amount_specified_used = params
                .amount_specified
                .checked_sub(state.amount_specified_remaining)
                .ok_or(PoolError::MathOverflow)?;
            let (amount0, amount1) = if zero_for_one == exact_input {
                (amount_specified_used, state.amount_calculated)
            } else {
                (state.amount_calculated, amount_specified_used)
            };

            // Send the output, then collect the input through the callback
            let config = pool.config;
            if zero_for_one {
                if amount1 < 0 {
                    ledger.transfer(&config.token1, &config.address, &params.recipient, amount1.unsigned_abs())?;
                }
            } else if amount0 < 0 {
                ledger.transfer(&config.token0, &config.address, &params.recipient, amount0.unsigned_abs())?;
            }

            call_swap(pool, ledger, callback, amount0, amount1, zero_for_one, data)?;

            pool.emit(PoolEvent::Swap {
                sender: params.sender,
                recipient: params.recipient,
                amount0,
                amount1,
                sqrt_price_x96: state.sqrt_price_x96,
                liquidity: state.liquidity,
                tick: state.tick,
            });

            msg!("Swap executed");
            msg!("Direction: {}", if zero_for_one { "0 -> 1" } else { "1 -> 0" });
            msg!("Amount0: {}, amount1: {}", amount0, amount1);
            msg!("New sqrt price: {}, tick: {}", state.sqrt_price_x96, state.tick);

            Ok((amount0, amount1))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::SetFeeProtocolParams;
    use crate::testing::*;
    use crate::utils::{encode_price_sqrt, get_max_tick, get_min_tick};
    use proptest::prelude::*;

    const SPACING: i32 = 60;

    /// Pool at price 1:10 with 3161 full-range liquidity
    fn initialized_env() -> TestEnv {
        let mut env = TestEnv::new(config_3000());
        env.initialize(encode_price_sqrt(1, 10).unwrap()).unwrap();
        env.mint(WALLET, get_min_tick(SPACING), get_max_tick(SPACING), 3161).unwrap();
        env
    }

    fn set_fee_protocol(env: &mut TestEnv, fee_protocol0: u8, fee_protocol1: u8) {
        env.pool
            .set_fee_protocol(SetFeeProtocolParams {
                sender: FACTORY,
                fee_protocol0,
                fee_protocol1,
            })
            .unwrap();
    }

    #[test]
    fn test_swap_before_initialize_fails() {
        let mut env = TestEnv::new(config_3000());
        assert_pool_error(env.swap_exact0_for1(1000, WALLET), PoolError::NotInitialized);
    }

    #[test]
    fn test_swap_zero_amount_fails() {
        let mut env = initialized_env();
        assert_pool_error(
            env.swap(WALLET, true, 0, MIN_SQRT_RATIO + 1),
            PoolError::ZeroAmount,
        );
    }

    #[test]
    fn test_swap_price_limit_validation() {
        let mut env = initialized_env();
        let price = env.pool.slot0().sqrt_price_x96;

        assert_pool_error(env.swap(WALLET, true, 1000, price), PoolError::InvalidPriceLimit);
        assert_pool_error(env.swap(WALLET, true, 1000, price + 1), PoolError::InvalidPriceLimit);
        assert_pool_error(env.swap(WALLET, true, 1000, MIN_SQRT_RATIO), PoolError::InvalidPriceLimit);
        assert_pool_error(env.swap(WALLET, false, 1000, price), PoolError::InvalidPriceLimit);
        assert_pool_error(env.swap(WALLET, false, 1000, price - 1), PoolError::InvalidPriceLimit);
        assert_pool_error(env.swap(WALLET, false, 1000, MAX_SQRT_RATIO), PoolError::InvalidPriceLimit);
    }

    #[test]
    fn test_swap_exact0_for1() {
        let mut env = initialized_env();
        let amounts = env.swap_exact0_for1(1000, OTHER).unwrap();
        assert_eq!(amounts, (1000, -90));

        assert_eq!(env.pool.slot0().tick, -24929);
        assert_eq!(env.pool_balances(), (9996 + 1000, 1000 - 90));
        assert_eq!(env.ledger.balance_of(&TOKEN1, &OTHER), 90);
        assert_eq!(
            env.pool.fee_growth_global_0_x128(),
            U256::from_dec_str("322950680405825811575489978581241579").unwrap()
        );
        assert!(env.pool.fee_growth_global_1_x128().is_zero());
        assert_eq!(env.pool.liquidity(), 3161);
    }

    #[test]
    fn test_swap_exact1_for0() {
        let mut env = initialized_env();
        let amounts = env.swap_exact1_for0(1000, OTHER).unwrap();
        assert_eq!(amounts, (-4987, 1000));

        assert_eq!(env.pool.slot0().tick, -9204);
        assert_eq!(env.ledger.balance_of(&TOKEN0, &OTHER), 4987);
        assert_eq!(
            env.pool.fee_growth_global_1_x128(),
            U256::from_dec_str("430600907207767748767319971441655438").unwrap()
        );
        assert!(env.pool.fee_growth_global_0_x128().is_zero());
    }

    #[test]
    fn test_swap_exact_output() {
        let mut env = initialized_env();
        assert_eq!(env.swap0_for_exact1(100, OTHER).unwrap(), (1116, -100));
        assert_eq!(env.pool.slot0().tick, -25136);
        assert_eq!(env.ledger.balance_of(&TOKEN1, &OTHER), 100);

        let mut env = initialized_env();
        assert_eq!(env.swap1_for_exact0(100, OTHER).unwrap(), (-100, 12));
        assert_eq!(env.pool.slot0().tick, -22826);
        assert_eq!(env.ledger.balance_of(&TOKEN0, &OTHER), 100);
    }

    #[test]
    fn test_swap_stops_at_price_limit() {
        let mut env = initialized_env();
        let limit = encode_price_sqrt(1, 11).unwrap();
        let amounts = env.swap_to_lower_price(limit, WALLET).unwrap();

        assert_eq!(amounts, (490, -46));
        assert_eq!(env.pool.slot0().sqrt_price_x96, limit);
        assert_eq!(env.pool.slot0().tick, -23981);
    }

    #[test]
    fn test_swap_crosses_initialized_tick() {
        let mut env = initialized_env();
        assert_eq!(env.mint(WALLET, -23100, -22980, 10000).unwrap(), (75, 12));
        assert_eq!(env.pool.liquidity(), 13161);

        assert_eq!(env.swap_exact0_for1(5000, WALLET).unwrap(), (5000, -338));
        assert_eq!(env.pool.slot0().tick, -30960);
        assert_eq!(env.pool.liquidity(), 3161);

        // fee growth below the crossed tick flipped into its outside value
        assert_eq!(
            env.pool.ticks(-23100).fee_growth_outside_0_x128,
            U256::from_dec_str("25855358021498249636302302821348545").unwrap()
        );
        assert!(env.pool.ticks(-22980).fee_growth_outside_0_x128.is_zero());
    }

    #[test]
    fn test_swap_runs_out_of_liquidity() {
        let mut env = TestEnv::new(config_3000());
        env.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();
        env.mint(WALLET, -60, 60, 1000).unwrap();
        let balances = env.pool_balances();

        assert_pool_error(
            env.swap_exact0_for1(1_000_000, WALLET),
            PoolError::InsufficientLiquidity,
        );
        assert_eq!(env.pool_balances(), balances);
        assert_eq!(env.pool.slot0().tick, 0);
        assert_eq!(env.pool.liquidity(), 1000);
    }

    #[test]
    fn test_swap_without_liquidity_fails() {
        let mut env = TestEnv::new(config_3000());
        env.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();
        assert_pool_error(env.swap_exact1_for0(10, WALLET), PoolError::InsufficientLiquidity);
    }

    #[test]
    fn test_swap_protocol_fee() {
        let mut env = initialized_env();
        set_fee_protocol(&mut env, 6, 6);
        env.swap_exact0_for1(100_000, WALLET).unwrap();

        assert_eq!(env.pool.protocol_fees().token0, 48);
        assert_eq!(env.pool.protocol_fees().token1, 0);
        assert_eq!(env.pool.slot0().tick, -70940);
        assert_eq!(
            env.pool.fee_growth_global_0_x128(),
            U256::from_dec_str("27450807834495193983916648179405534296").unwrap()
        );
    }

    #[test]
    fn test_swap_protocol_fee_uses_input_token_nibble() {
        let mut env = initialized_env();
        set_fee_protocol(&mut env, 4, 10);
        assert_eq!(env.swap_exact1_for0(100_000, WALLET).unwrap(), (-9893, 100_000));
        assert_eq!(env.pool.protocol_fees().token0, 0);
        assert_eq!(env.pool.protocol_fees().token1, 28);
    }

    #[test]
    fn test_swap_underpaid_rolls_back() {
        let mut env = initialized_env();
        let balances = env.pool_balances();
        let slot0 = env.pool.slot0();
        env.pool.take_events();

        env.callee.shortfall = 1;
        assert_pool_error(env.swap_exact0_for1(1000, OTHER), PoolError::InsufficientInputAmount);

        assert_eq!(env.pool_balances(), balances);
        assert_eq!(env.ledger.balance_of(&TOKEN1, &OTHER), 0);
        assert_eq!(env.pool.slot0(), slot0);
        assert!(env.pool.fee_growth_global_0_x128().is_zero());
        assert!(env.pool.take_events().is_empty());
    }

    #[test]
    fn test_swap_reentrancy_rejected() {
        let mut env = initialized_env();
        env.callee.reenter = true;
        assert_pool_error(env.swap_exact0_for1(1000, WALLET), PoolError::Locked);
        assert!(env.pool.slot0().unlocked);
    }

    #[test]
    fn test_swap_writes_observation() {
        let mut env = TestEnv::new(config_3000());
        env.pool.set_block_timestamp(1000);
        env.initialize(encode_price_sqrt(1, 10).unwrap()).unwrap();
        env.mint(WALLET, get_min_tick(SPACING), get_max_tick(SPACING), 3161).unwrap();

        env.pool.advance_time(10);
        env.swap_exact0_for1(1000, WALLET).unwrap();

        let observation = env.pool.observations(0);
        assert_eq!(observation.block_timestamp, 1010);
        // the tick that held before the swap is what accrues
        assert_eq!(observation.tick_cumulative, -23028 * 10);
    }

    #[test]
    fn test_swap_without_tick_change_writes_observation() {
        let mut env = TestEnv::new(config_3000());
        env.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();
        env.mint(WALLET, get_min_tick(SPACING), get_max_tick(SPACING), 1_000_000_000_000_000_000).unwrap();
        env.pool.increase_observation_cardinality_next(2).unwrap();

        env.pool.advance_time(10);
        env.swap_exact1_for0(10, WALLET).unwrap();

        let slot0 = env.pool.slot0();
        assert_eq!(slot0.tick, 0);
        assert_eq!(slot0.observation_index, 1);
        assert_eq!(slot0.observation_cardinality, 2);

        let observation = env.pool.observations(1);
        assert!(observation.initialized);
        assert_eq!(observation.block_timestamp, 10);
        assert_eq!(observation.tick_cumulative, 0);
        assert_eq!(
            observation.seconds_per_liquidity_cumulative_x128,
            (U256::from(10u64) << 128) / U256::from(1_000_000_000_000_000_000u128)
        );

        // a second swap in the same second leaves the ring alone
        env.swap_exact0_for1(10, WALLET).unwrap();
        assert_eq!(env.pool.slot0().observation_index, 1);
    }

    #[test]
    fn test_swap_emits_event() {
        let mut env = initialized_env();
        env.pool.take_events();
        env.swap_exact0_for1(1000, OTHER).unwrap();
        assert_eq!(
            env.pool.take_events(),
            vec![PoolEvent::Swap {
                sender: WALLET,
                recipient: OTHER,
                amount0: 1000,
                amount1: -90,
                sqrt_price_x96: env.pool.slot0().sqrt_price_x96,
                liquidity: 3161,
                tick: -24929,
            }]
        );
    }

    proptest! {
        #[test]
        fn prop_fee_growth_never_decreases(
            swaps in prop::collection::vec((any::<bool>(), 1u128..1_000_000_000u128), 1..12)
        ) {
            let mut env = TestEnv::new(config_3000());
            env.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();
            env.mint(WALLET, get_min_tick(SPACING), get_max_tick(SPACING), 1_000_000_000_000).unwrap();
            env.mint(WALLET, -600, 600, 1_000_000_000_000).unwrap();

            for (zero_for_one, amount) in swaps {
                let before0 = env.pool.fee_growth_global_0_x128();
                let before1 = env.pool.fee_growth_global_1_x128();
                let (amount0, amount1) = if zero_for_one {
                    env.swap_exact0_for1(amount, WALLET).unwrap()
                } else {
                    env.swap_exact1_for0(amount, WALLET).unwrap()
                };

                prop_assert!(env.pool.fee_growth_global_0_x128() >= before0);
                prop_assert!(env.pool.fee_growth_global_1_x128() >= before1);
                // exact input is always spent in full here
                if zero_for_one {
                    prop_assert_eq!(amount0, amount as i128);
                    prop_assert!(amount1 <= 0);
                } else {
                    prop_assert_eq!(amount1, amount as i128);
                    prop_assert!(amount0 <= 0);
                }

                let slot0 = env.pool.slot0();
                let tick_at_price = get_tick_at_sqrt_ratio(slot0.sqrt_price_x96).unwrap();
                prop_assert!(slot0.tick == tick_at_price || slot0.tick == tick_at_price - 1);
            }
        }
    }
}
