use crate::events::PoolEvent;
use crate::state::Pool;
use anchor_lang::prelude::*;

impl Pool {
    /// Reserve oracle slots so the ring can grow to `observation_cardinality_next`
    ///
    /// The new slots become active once the write index wraps around the
    /// current ring. Asking for fewer slots than already reserved is a no-op.
    pub fn increase_observation_cardinality_next(&mut self, observation_cardinality_next: u16) -> Result<()> {
        self.run_locked_local(|pool| {
            let old = pool.slot0.observation_cardinality_next;
            let new = pool.observations.grow(old, observation_cardinality_next)?;
            pool.slot0.observation_cardinality_next = new;

            if old != new {
                pool.emit(PoolEvent::IncreaseObservationCardinalityNext {
                    observation_cardinality_next_old: old,
                    observation_cardinality_next_new: new,
                });
                msg!("Observation cardinality next: {} -> {}", old, new);
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PoolError;
    use crate::testing::{assert_pool_error, config_3000};
    use crate::utils::encode_price_sqrt;

    fn initialized_pool() -> Pool {
        let mut pool = Pool::new(config_3000()).unwrap();
        pool.initialize(encode_price_sqrt(1, 1).unwrap()).unwrap();
        pool.take_events();
        pool
    }

    #[test]
    fn test_increase_before_initialize_fails() {
        let mut pool = Pool::new(config_3000()).unwrap();
        assert_pool_error(
            pool.increase_observation_cardinality_next(2),
            PoolError::NotInitialized,
        );
    }

    #[test]
    fn test_increase_grows_and_emits() {
        let mut pool = initialized_pool();
        pool.increase_observation_cardinality_next(3).unwrap();

        let slot0 = pool.slot0();
        assert_eq!(slot0.observation_cardinality, 1);
        assert_eq!(slot0.observation_cardinality_next, 3);
        assert_eq!(pool.observations(1).block_timestamp, 1);
        assert_eq!(pool.observations(2).block_timestamp, 1);
        assert!(!pool.observations(2).initialized);
        assert_eq!(
            pool.take_events(),
            vec![PoolEvent::IncreaseObservationCardinalityNext {
                observation_cardinality_next_old: 1,
                observation_cardinality_next_new: 3,
            }]
        );
    }

    #[test]
    fn test_increase_to_smaller_value_is_noop() {
        let mut pool = initialized_pool();
        pool.increase_observation_cardinality_next(3).unwrap();
        pool.take_events();

        pool.increase_observation_cardinality_next(2).unwrap();
        assert_eq!(pool.slot0().observation_cardinality_next, 3);
        assert!(pool.take_events().is_empty());
    }
}
