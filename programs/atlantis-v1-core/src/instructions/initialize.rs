use crate::errors::PoolError;
use crate::events::PoolEvent;
use crate::math::tick_math::get_tick_at_sqrt_ratio;
use crate::math::U256;
use crate::state::Pool;
use anchor_lang::prelude::*;

impl Pool {
    /// Set the starting price of the pool
    /// Can only be called once
    ///
    /// # Arguments
    /// * `sqrt_price_x96` - Initial sqrt(price) as Q64.96, within [MIN_SQRT_RATIO, MAX_SQRT_RATIO)
    pub fn initialize(&mut self, sqrt_price_x96: U256) -> Result<()> {
        require!(!self.is_initialized(), PoolError::AlreadyInitialized);

        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;

        let (cardinality, cardinality_next) = self.observations.initialize(self.block_timestamp);

        self.slot0.sqrt_price_x96 = sqrt_price_x96;
        self.slot0.tick = tick;
        self.slot0.observation_index = 0;
        self.slot0.observation_cardinality = cardinality;
        self.slot0.observation_cardinality_next = cardinality_next;
        self.slot0.fee_protocol = 0;
        self.slot0.unlocked = true;

        self.emit(PoolEvent::Initialize { sqrt_price_x96, tick });

        msg!("Pool initialized");
        msg!("Token0: {}", self.config.token0);
        msg!("Token1: {}", self.config.token1);
        msg!("Fee: {}", self.config.fee);
        msg!("Initial sqrt price: {}", sqrt_price_x96);
        msg!("Initial tick: {}", tick);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_SQRT_RATIO, MIN_SQRT_RATIO, MIN_TICK, Q96};
    use crate::state::Observation;
    use crate::testing::{assert_pool_error, config_3000};
    use crate::utils::encode_price_sqrt;

    #[test]
    fn test_initialize_at_one_to_one() {
        let mut pool = Pool::new(config_3000()).unwrap();
        pool.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();

        let slot0 = pool.slot0();
        assert_eq!(slot0.sqrt_price_x96, Q96);
        assert_eq!(slot0.tick, 0);
        assert_eq!(slot0.observation_index, 0);
        assert_eq!(slot0.observation_cardinality, 1);
        assert_eq!(slot0.observation_cardinality_next, 1);
        assert!(slot0.unlocked);
        assert_eq!(
            pool.take_events(),
            vec![PoolEvent::Initialize { sqrt_price_x96: Q96, tick: 0 }]
        );
    }

    #[test]
    fn test_initialize_at_one_to_two() {
        let mut pool = Pool::new(config_3000()).unwrap();
        pool.initialize(encode_price_sqrt(1, 2).unwrap()).unwrap();
        assert_eq!(pool.slot0().tick, -6932);
    }

    #[test]
    fn test_initialize_writes_first_observation() {
        let mut pool = Pool::new(config_3000()).unwrap();
        pool.set_block_timestamp(1_601_906_400);
        pool.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();
        assert_eq!(
            pool.observations(0),
            Observation {
                block_timestamp: 1_601_906_400,
                tick_cumulative: 0,
                seconds_per_liquidity_cumulative_x128: U256::zero(),
                initialized: true,
            }
        );
    }

    #[test]
    fn test_initialize_twice_fails() {
        let mut pool = Pool::new(config_3000()).unwrap();
        pool.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();
        assert_pool_error(
            pool.initialize(encode_price_sqrt(1, 1).unwrap()),
            PoolError::AlreadyInitialized,
        );
    }

    #[test]
    fn test_initialize_price_bounds() {
        let mut pool = Pool::new(config_3000()).unwrap();
        assert_pool_error(pool.initialize(U256::one()), PoolError::SqrtPriceOutOfBounds);
        assert_pool_error(pool.initialize(MIN_SQRT_RATIO - 1), PoolError::SqrtPriceOutOfBounds);
        assert_pool_error(pool.initialize(MAX_SQRT_RATIO), PoolError::SqrtPriceOutOfBounds);
        assert!(!pool.is_initialized());

        pool.initialize(MIN_SQRT_RATIO).unwrap();
        assert_eq!(pool.slot0().tick, MIN_TICK);
    }

    #[test]
    fn test_initialize_at_max_minus_one() {
        let mut pool = Pool::new(config_3000()).unwrap();
        pool.initialize(MAX_SQRT_RATIO - 1).unwrap();
        assert_eq!(pool.slot0().tick, crate::constants::MAX_TICK - 1);
    }
}
