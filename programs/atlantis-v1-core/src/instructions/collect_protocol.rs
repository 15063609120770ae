use crate::callbacks::TokenLedger;
use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::state::Pool;
use anchor_lang::prelude::*;

/// Collect protocol fee parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectProtocolParams {
    /// Must be the protocol authority
    pub sender: Pubkey,
    pub recipient: Pubkey,
    pub amount0_requested: u128,
    pub amount1_requested: u128,
}

/// Amount to withdraw from an accrued balance
///
/// A full withdrawal leaves one unit behind so the slot is never emptied.
fn withdrawable(requested: u128, accrued: u128) -> u128 {
    let amount = requested.min(accrued);
    if amount > 0 && amount == accrued {
        amount - 1
    } else {
        amount
    }
}

impl Pool {
    /// Withdraw accrued protocol fees
    ///
    /// # Returns
    /// * (amount0, amount1) actually sent
    pub fn collect_protocol<L: TokenLedger>(
        &mut self,
        ledger: &mut L,
        params: CollectProtocolParams,
    ) -> Result<(u128, u128)> {
        self.run_locked(ledger, |pool, ledger| {
            require!(
                pool.config.is_protocol_authority(&params.sender),
                PoolError::NotProtocolAuthority
            );

            let config = pool.config;
            let amount0 = withdrawable(params.amount0_requested, pool.protocol_fees.token0);
            let amount1 = withdrawable(params.amount1_requested, pool.protocol_fees.token1);

            if amount0 > 0 {
                pool.protocol_fees.token0 -= amount0;
                ledger.transfer(&config.token0, &config.address, &params.recipient, amount0)?;
            }
            if amount1 > 0 {
                pool.protocol_fees.token1 -= amount1;
                ledger.transfer(&config.token1, &config.address, &params.recipient, amount1)?;
            }

            pool.emit(PoolEvent::CollectProtocol {
                sender: params.sender,
                recipient: params.recipient,
                amount0,
                amount1,
            });

            msg!("Protocol fees collected: 0={}, 1={}", amount0, amount1);
            msg!("Remaining: 0={}, 1={}", pool.protocol_fees.token0, pool.protocol_fees.token1);

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

    const SPACING: i32 = 60;

    /// Pool with protocol fee 1/6 and 48 token0 of protocol fees accrued
    fn env_with_protocol_fees() -> TestEnv {
        let mut env = TestEnv::new(config_3000());
        env.initialize(encode_price_sqrt(1, 10).unwrap()).unwrap();
        env.mint(WALLET, get_min_tick(SPACING), get_max_tick(SPACING), 3161).unwrap();
        env.pool
            .set_fee_protocol(SetFeeProtocolParams {
                sender: FACTORY,
                fee_protocol0: 6,
                fee_protocol1: 6,
            })
            .unwrap();
        env.swap_exact0_for1(100_000, WALLET).unwrap();
        assert_eq!(env.pool.protocol_fees().token0, 48);
        env
    }

    fn params(sender: Pubkey, amount0_requested: u128, amount1_requested: u128) -> CollectProtocolParams {
        CollectProtocolParams {
            sender,
            recipient: OTHER,
            amount0_requested,
            amount1_requested,
        }
    }

    #[test]
    fn test_withdrawable() {
        assert_eq!(withdrawable(0, 10), 0);
        assert_eq!(withdrawable(5, 10), 5);
        assert_eq!(withdrawable(10, 10), 9);
        assert_eq!(withdrawable(u128::MAX, 10), 9);
        assert_eq!(withdrawable(u128::MAX, 0), 0);
    }

    #[test]
    fn test_collect_protocol_leaves_one() {
        let mut env = env_with_protocol_fees();
        let collected = env
            .pool
            .collect_protocol(&mut env.ledger, params(FACTORY, u128::MAX, u128::MAX))
            .unwrap();

        assert_eq!(collected, (47, 0));
        assert_eq!(env.ledger.balance_of(&TOKEN0, &OTHER), 47);
        assert_eq!(env.pool.protocol_fees().token0, 1);
        assert_eq!(
            env.pool.take_events().last(),
            Some(&PoolEvent::CollectProtocol {
                sender: FACTORY,
                recipient: OTHER,
                amount0: 47,
                amount1: 0,
            })
        );
    }

    #[test]
    fn test_collect_protocol_partial() {
        let mut env = env_with_protocol_fees();
        let collected = env
            .pool
            .collect_protocol(&mut env.ledger, params(FACTORY, 10, 0))
            .unwrap();
        assert_eq!(collected, (10, 0));
        assert_eq!(env.pool.protocol_fees().token0, 38);
    }

    #[test]
    fn test_collect_protocol_requires_authority() {
        let mut env = env_with_protocol_fees();
        assert_pool_error(
            env.pool.collect_protocol(&mut env.ledger, params(WALLET, 10, 0)),
            PoolError::NotProtocolAuthority,
        );
        assert_eq!(env.pool.protocol_fees().token0, 48);
    }
}
