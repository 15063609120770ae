use crate::constants::oracle::{OBSERVATION_CARDINALITY_INIT, RESERVED_SLOT_TIMESTAMP};
use crate::errors::PoolError;
use crate::math::U256;
use anchor_lang::prelude::*;

/// Oracle observation - one TWAP data point
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Observation {
    /// Block timestamp of the observation
    pub block_timestamp: u32,

    /// Cumulative tick value (tick * time elapsed), wrapping
    pub tick_cumulative: i64,

    /// Cumulative seconds per unit of in-range liquidity (Q128.128, wrapping at 160 bits)
    pub seconds_per_liquidity_cumulative_x128: U256,

    /// Whether this observation has been written
    pub initialized: bool,
}

impl Observation {
    /// Extrapolate this observation to `block_timestamp` assuming `tick` and
    /// `liquidity` held over the whole interval
    pub fn transform(&self, block_timestamp: u32, tick: i32, liquidity: u128) -> Observation {
        let delta = block_timestamp.wrapping_sub(self.block_timestamp);

        let tick_cumulative = self
            .tick_cumulative
            .wrapping_add((tick as i64).wrapping_mul(delta as i64));

        // Zero liquidity counts as one so time still accumulates
        let liquidity = U256::from(liquidity.max(1));
        let seconds_per_liquidity_cumulative_x128 = self
            .seconds_per_liquidity_cumulative_x128
            .overflowing_add((U256::from(delta) << 128) / liquidity)
            .0
            .low_160();

        Observation {
            block_timestamp,
            tick_cumulative,
            seconds_per_liquidity_cumulative_x128,
            initialized: true,
        }
    }
}

/// Ring buffer of observations
///
/// The vector only grows. `cardinality` slots are in the active ring and the
/// slots up to `cardinality_next` are reserved with a sentinel timestamp.
/// Index and cardinality live in the pool's slot0 and are passed in.
#[derive(Clone, Debug, Default)]
pub struct Observations {
    data: Vec<Observation>,
}

impl Observations {
    /// Observation at slot `index`, default if not allocated
    pub fn get(&self, index: u16) -> Observation {
        self.data.get(index as usize).copied().unwrap_or_default()
    }

    /// Number of allocated slots
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Write the first observation
    ///
    /// # Returns
    /// * (cardinality, cardinality_next)
    pub fn initialize(&mut self, time: u32) -> (u16, u16) {
        self.data.clear();
        self.data.push(Observation {
            block_timestamp: time,
            tick_cumulative: 0,
            seconds_per_liquidity_cumulative_x128: U256::zero(),
            initialized: true,
        });
        (OBSERVATION_CARDINALITY_INIT, OBSERVATION_CARDINALITY_INIT)
    }

    /// Write an observation, at most once per timestamp
    ///
    /// The ring adopts `cardinality_next` once the index reaches the end of
    /// the current ring.
    ///
    /// # Returns
    /// * (new index, new cardinality)
    pub fn write(
        &mut self,
        index: u16,
        time: u32,
        tick: i32,
        liquidity: u128,
        cardinality: u16,
        cardinality_next: u16,
    ) -> (u16, u16) {
        let last = self.get(index);

        if last.block_timestamp == time {
            return (index, cardinality);
        }

        let cardinality_updated = if cardinality_next > cardinality && index == cardinality - 1 {
            cardinality_next
        } else {
            cardinality
        };

        let index_updated = ((index as u32 + 1) % cardinality_updated as u32) as u16;
        let observation = last.transform(time, tick, liquidity);
        self.store(index_updated, observation);

        (index_updated, cardinality_updated)
    }

    /// Reserve slots up to `next`
    ///
    /// # Returns
    /// * The resulting cardinality_next, unchanged if `next` is not larger
    pub fn grow(&mut self, current: u16, next: u16) -> Result<u16> {
        require!(current > 0, PoolError::OracleNotInitialized);

        if next <= current {
            return Ok(current);
        }

        // Touch each reserved slot so later writes land in an allocated one
        for i in current..next {
            let mut slot = self.get(i);
            slot.block_timestamp = RESERVED_SLOT_TIMESTAMP;
            self.store(i, slot);
        }

        Ok(next)
    }

    fn store(&mut self, index: u16, observation: Observation) {
        let index = index as usize;
        if index >= self.data.len() {
            self.data.resize(index + 1, Observation {
                block_timestamp: RESERVED_SLOT_TIMESTAMP,
                ..Default::default()
            });
        }
        self.data[index] = observation;
    }

    /// Cumulative values `seconds_ago` before `time`
    ///
    /// Extrapolates past the newest observation and interpolates between two
    /// stored ones.
    ///
    /// # Returns
    /// * (tick_cumulative, seconds_per_liquidity_cumulative_x128)
    pub fn observe_single(
        &self,
        time: u32,
        seconds_ago: u32,
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(i64, U256)> {
        if seconds_ago == 0 {
            let mut last = self.get(index);
            if last.block_timestamp != time {
                last = last.transform(time, tick, liquidity);
            }
            return Ok((last.tick_cumulative, last.seconds_per_liquidity_cumulative_x128));
        }

        let target = time.wrapping_sub(seconds_ago);

        let (before_or_at, at_or_after) =
            self.get_surrounding_observations(time, target, tick, index, liquidity, cardinality)?;

        if target == before_or_at.block_timestamp {
            Ok((
                before_or_at.tick_cumulative,
                before_or_at.seconds_per_liquidity_cumulative_x128,
            ))
        } else if target == at_or_after.block_timestamp {
            Ok((
                at_or_after.tick_cumulative,
                at_or_after.seconds_per_liquidity_cumulative_x128,
            ))
        } else {
            let observation_time_delta = at_or_after
                .block_timestamp
                .wrapping_sub(before_or_at.block_timestamp);
            let target_delta = target.wrapping_sub(before_or_at.block_timestamp);

            let tick_cumulative = before_or_at.tick_cumulative.wrapping_add(
                (at_or_after
                    .tick_cumulative
                    .wrapping_sub(before_or_at.tick_cumulative)
                    / observation_time_delta as i64)
                    .wrapping_mul(target_delta as i64),
            );

            let seconds_per_liquidity_delta = at_or_after
                .seconds_per_liquidity_cumulative_x128
                .overflowing_sub(before_or_at.seconds_per_liquidity_cumulative_x128)
                .0
                .low_160();
            let seconds_per_liquidity_cumulative_x128 = before_or_at
                .seconds_per_liquidity_cumulative_x128
                .overflowing_add(
                    (seconds_per_liquidity_delta * U256::from(target_delta))
                        / U256::from(observation_time_delta),
                )
                .0
                .low_160();

            Ok((tick_cumulative, seconds_per_liquidity_cumulative_x128))
        }
    }

    /// Cumulative values for each entry of `seconds_agos`
    pub fn observe(
        &self,
        time: u32,
        seconds_agos: &[u32],
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(Vec<i64>, Vec<U256>)> {
        require!(cardinality > 0, PoolError::OracleNotInitialized);

        let mut tick_cumulatives = Vec::with_capacity(seconds_agos.len());
        let mut seconds_per_liquidity_cumulatives = Vec::with_capacity(seconds_agos.len());

        for seconds_ago in seconds_agos {
            let (tick_cumulative, seconds_per_liquidity) =
                self.observe_single(time, *seconds_ago, tick, index, liquidity, cardinality)?;
            tick_cumulatives.push(tick_cumulative);
            seconds_per_liquidity_cumulatives.push(seconds_per_liquidity);
        }

        Ok((tick_cumulatives, seconds_per_liquidity_cumulatives))
    }

    fn get_surrounding_observations(
        &self,
        time: u32,
        target: u32,
        tick: i32,
        index: u16,
        liquidity: u128,
        cardinality: u16,
    ) -> Result<(Observation, Observation)> {
        let newest = self.get(index);

        if lte(time, newest.block_timestamp, target) {
            if newest.block_timestamp == target {
                return Ok((newest, newest));
            }
            return Ok((newest, newest.transform(target, tick, liquidity)));
        }

        // Oldest is the next slot, or slot 0 if the ring has not wrapped yet
        let mut oldest = self.get(((index as u32 + 1) % cardinality as u32) as u16);
        if !oldest.initialized {
            oldest = self.get(0);
        }

        require!(
            lte(time, oldest.block_timestamp, target),
            PoolError::TargetPredatesOldestObservation
        );

        Ok(self.binary_search(time, target, index, cardinality))
    }

    /// Find the observations at or around `target`, which must lie within the ring
    fn binary_search(
        &self,
        time: u32,
        target: u32,
        index: u16,
        cardinality: u16,
    ) -> (Observation, Observation) {
        let cardinality = cardinality as usize;
        let mut left = (index as usize + 1) % cardinality;
        let mut right = left + cardinality - 1;

        loop {
            let i = (left + right) / 2;

            let before_or_at = self.data[i % cardinality];

            // Not yet written in a ring that has not wrapped: search higher
            if !before_or_at.initialized {
                left = i + 1;
                continue;
            }

            let at_or_after = self.data[(i + 1) % cardinality];

            let target_at_or_after = lte(time, before_or_at.block_timestamp, target);

            if target_at_or_after && lte(time, target, at_or_after.block_timestamp) {
                return (before_or_at, at_or_after);
            }

            if !target_at_or_after {
                right = i - 1;
            } else {
                left = i + 1;
            }
        }
    }
}

/// `a <= b` for 32-bit timestamps that may have wrapped, both at or before `time`
fn lte(time: u32, a: u32, b: u32) -> bool {
    if a <= time && b <= time {
        return a <= b;
    }

    let a_adjusted = if a > time { a as u64 } else { a as u64 + (1u64 << 32) };
    let b_adjusted = if b > time { b as u64 } else { b as u64 + (1u64 << 32) };

    a_adjusted <= b_adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::assert_pool_error;

    /// Minimal ring driver tracking index/cardinality the way the pool does
    struct Ring {
        observations: Observations,
        index: u16,
        cardinality: u16,
        cardinality_next: u16,
        time: u32,
        tick: i32,
        liquidity: u128,
    }

    impl Ring {
        fn new(time: u32, tick: i32, liquidity: u128) -> Self {
            let mut observations = Observations::default();
            let (cardinality, cardinality_next) = observations.initialize(time);
            Self { observations, index: 0, cardinality, cardinality_next, time, tick, liquidity }
        }

        fn grow(&mut self, next: u16) {
            self.cardinality_next = self.observations.grow(self.cardinality_next, next).unwrap();
        }

        /// Advance time and write with the state that held over the interval, then apply the new state
        fn update(&mut self, advance: u32, tick: i32, liquidity: u128) {
            self.time = self.time.wrapping_add(advance);
            let (index, cardinality) = self.observations.write(
                self.index,
                self.time,
                self.tick,
                self.liquidity,
                self.cardinality,
                self.cardinality_next,
            );
            self.index = index;
            self.cardinality = cardinality;
            self.tick = tick;
            self.liquidity = liquidity;
        }

        fn observe_single(&self, seconds_ago: u32) -> Result<(i64, U256)> {
            self.observations.observe_single(
                self.time,
                seconds_ago,
                self.tick,
                self.index,
                self.liquidity,
                self.cardinality,
            )
        }
    }

    #[test]
    fn test_initialize() {
        let ring = Ring::new(1, 1, 1);
        assert_eq!((ring.index, ring.cardinality, ring.cardinality_next), (0, 1, 1));
        assert_eq!(
            ring.observations.get(0),
            Observation {
                block_timestamp: 1,
                tick_cumulative: 0,
                seconds_per_liquidity_cumulative_x128: U256::zero(),
                initialized: true,
            }
        );
    }

    #[test]
    fn test_grow() {
        let mut ring = Ring::new(5, 0, 1);
        ring.grow(5);
        assert_eq!(ring.cardinality_next, 5);
        assert_eq!(ring.cardinality, 1);
        for i in 1..5 {
            let slot = ring.observations.get(i);
            assert_eq!(slot.block_timestamp, RESERVED_SLOT_TIMESTAMP);
            assert!(!slot.initialized);
        }

        // shrinking is a no-op
        ring.grow(3);
        assert_eq!(ring.cardinality_next, 5);
        assert_eq!(ring.observations.len(), 5);
    }

    #[test]
    fn test_grow_before_initialize_fails() {
        let mut observations = Observations::default();
        assert_pool_error(observations.grow(0, 5), PoolError::OracleNotInitialized);
    }

    #[test]
    fn test_write_same_timestamp_is_noop() {
        let mut ring = Ring::new(0, 0, 0);
        ring.update(0, 5, 1);
        assert_eq!(ring.index, 0);
        assert_eq!(ring.observations.get(0).tick_cumulative, 0);
    }

    #[test]
    fn test_write_accumulates() {
        let mut ring = Ring::new(0, 3, 4);
        ring.update(1, -7, 6);
        let observation = ring.observations.get(0);
        assert_eq!(observation.block_timestamp, 1);
        assert_eq!(observation.tick_cumulative, 3);
        // 1 second / 4 liquidity in Q128.128
        assert_eq!(observation.seconds_per_liquidity_cumulative_x128, U256::one() << 126);

        ring.update(5, 0, 0);
        let observation = ring.observations.get(0);
        assert_eq!(observation.tick_cumulative, 3 - 35);
        assert_eq!(
            observation.seconds_per_liquidity_cumulative_x128,
            (U256::one() << 126) + (U256::from(5u64) << 128) / 6
        );
    }

    #[test]
    fn test_write_zero_liquidity_counts_as_one() {
        let mut ring = Ring::new(0, 0, 0);
        ring.update(3, 0, 0);
        assert_eq!(
            ring.observations.get(0).seconds_per_liquidity_cumulative_x128,
            U256::from(3u64) << 128
        );
    }

    #[test]
    fn test_write_adopts_cardinality_next() {
        let mut ring = Ring::new(5, 0, 1);
        ring.grow(3);
        ring.update(1, 0, 1);
        assert_eq!((ring.index, ring.cardinality), (1, 3));
        ring.update(1, 0, 1);
        assert_eq!((ring.index, ring.cardinality), (2, 3));
        // wraps back to slot 0
        ring.update(1, 0, 1);
        assert_eq!((ring.index, ring.cardinality), (0, 3));
        assert_eq!(ring.observations.get(0).block_timestamp, 8);
    }

    #[test]
    fn test_observe_current() {
        let ring = Ring::new(5, 2, 4);
        assert_eq!(ring.observe_single(0).unwrap(), (0, U256::zero()));
    }

    #[test]
    fn test_observe_extrapolates() {
        let mut ring = Ring::new(5, 2, 4);
        ring.time += 3;
        let (tick_cumulative, seconds_per_liquidity) = ring.observe_single(0).unwrap();
        assert_eq!(tick_cumulative, 6);
        assert_eq!(seconds_per_liquidity, (U256::from(3u64) << 128) / 4);
    }

    #[test]
    fn test_observe_before_oldest_fails() {
        let ring = Ring::new(5, 0, 1);
        assert_pool_error(ring.observe_single(1), PoolError::TargetPredatesOldestObservation);
    }

    #[test]
    fn test_observe_interpolates() {
        let mut ring = Ring::new(0, 2, 5);
        ring.grow(2);
        ring.update(4, 7, 5);

        // halfway between t=0 (0) and t=4 (8)
        let (tick_cumulative, _) = ring.observe_single(2).unwrap();
        assert_eq!(tick_cumulative, 4);

        // exact hits on stored observations
        assert_eq!(ring.observe_single(4).unwrap().0, 0);
        assert_eq!(ring.observe_single(0).unwrap().0, 8);
        assert_pool_error(ring.observe_single(5), PoolError::TargetPredatesOldestObservation);
    }

    #[test]
    fn test_observe_after_wrap() {
        let mut ring = Ring::new(0, 1, 1);
        ring.grow(3);
        for _ in 0..5 {
            ring.update(10, 1, 1);
        }
        // ring holds t=30, 40, 50
        assert_eq!(ring.observe_single(20).unwrap().0, 30);
        assert_eq!(ring.observe_single(15).unwrap().0, 35);
        assert_pool_error(ring.observe_single(21), PoolError::TargetPredatesOldestObservation);
    }

    #[test]
    fn test_observe_across_timestamp_overflow() {
        let mut ring = Ring::new(u32::MAX - 4, 1, 1);
        ring.grow(2);
        ring.update(8, 1, 1);
        assert_eq!(ring.time, 3);
        assert_eq!(ring.observations.get(1).tick_cumulative, 8);

        // target is u32::MAX, four seconds after the first observation
        let (tick_cumulative, _) = ring.observe_single(4).unwrap();
        assert_eq!(tick_cumulative, 4);
    }

    #[test]
    fn test_observe_many() {
        let mut ring = Ring::new(0, 3, 1);
        ring.grow(4);
        ring.update(10, 3, 1);
        let (tick_cumulatives, seconds_per_liquidity) = ring
            .observations
            .observe(ring.time, &[0, 5, 10], ring.tick, ring.index, ring.liquidity, ring.cardinality)
            .unwrap();
        assert_eq!(tick_cumulatives, vec![30, 15, 0]);
        assert_eq!(seconds_per_liquidity[2], U256::zero());
        assert_eq!(seconds_per_liquidity[0], U256::from(10u64) << 128);
    }

    #[test]
    fn test_lte_wraparound() {
        assert!(lte(5, 1, 2));
        assert!(!lte(5, 2, 1));
        // a is before the wrap, b after
        assert!(lte(5, u32::MAX, 3));
        assert!(!lte(5, 3, u32::MAX));
    }
}
