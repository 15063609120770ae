use crate::constants::{MAX_TICK, MIN_TICK};
use crate::errors::PoolError;
use crate::math::bit_math::{least_significant_bit, most_significant_bit};
use crate::math::U256;
use anchor_lang::prelude::*;
use std::collections::HashMap;

/// One bit per spacing-aligned tick, packed into 256-bit words
///
/// A compressed tick `c = tick / spacing` lives in word `c >> 8` at bit `c & 0xff`.
/// Words that drop back to zero are removed so the map only holds live words.
#[derive(Clone, Debug, Default)]
pub struct TickBitmap {
    words: HashMap<i16, U256>,
}

/// Word index and bit position of a compressed tick
fn position(compressed: i32) -> (i16, u8) {
    ((compressed >> 8) as i16, (compressed & 0xff) as u8)
}

/// Compress a tick, rounding toward negative infinity
fn compress(tick: i32, tick_spacing: i32) -> i32 {
    let mut compressed = tick / tick_spacing;
    if tick < 0 && tick % tick_spacing != 0 {
        compressed -= 1;
    }
    compressed
}

impl TickBitmap {
    /// Raw word, zero if absent
    pub fn word(&self, word_pos: i16) -> U256 {
        self.words.get(&word_pos).copied().unwrap_or_default()
    }

    /// Flip the initialized state of an aligned tick
    pub fn flip_tick(&mut self, tick: i32, tick_spacing: i32) -> Result<()> {
        require!(tick % tick_spacing == 0, PoolError::TickNotAligned);

        let (word_pos, bit_pos) = position(tick / tick_spacing);
        let mask = U256::one() << bit_pos;

        let word = self.words.entry(word_pos).or_default();
        *word = *word ^ mask;
        if word.is_zero() {
            self.words.remove(&word_pos);
        }
        Ok(())
    }

    pub fn is_initialized(&self, tick: i32, tick_spacing: i32) -> bool {
        if tick % tick_spacing != 0 {
            return false;
        }
        let (word_pos, bit_pos) = position(tick / tick_spacing);
        !(self.word(word_pos) & (U256::one() << bit_pos)).is_zero()
    }

    /// Next initialized tick in the same word as `tick`
    ///
    /// With `lte` the search covers `tick` and everything to its left,
    /// otherwise strictly to its right.
    ///
    /// # Returns
    /// * (next tick, whether it is initialized). When nothing is found the
    ///   word boundary is returned so callers can step to the next word.
    pub fn next_initialized_tick_within_one_word(
        &self,
        tick: i32,
        tick_spacing: i32,
        lte: bool,
    ) -> (i32, bool) {
        let compressed = compress(tick, tick_spacing);

        if lte {
            let (word_pos, bit_pos) = position(compressed);
            // all bits at or to the right of bit_pos
            let mask = ((U256::one() << bit_pos) - 1) + (U256::one() << bit_pos);
            let masked = self.word(word_pos) & mask;

            let initialized = !masked.is_zero();
            let next = if initialized {
                (compressed - (bit_pos - most_significant_bit(masked)) as i32) * tick_spacing
            } else {
                (compressed - bit_pos as i32) * tick_spacing
            };
            (next, initialized)
        } else {
            let (word_pos, bit_pos) = position(compressed + 1);
            // all bits at or to the left of bit_pos
            let mask = !((U256::one() << bit_pos) - 1);
            let masked = self.word(word_pos) & mask;

            let initialized = !masked.is_zero();
            let next = if initialized {
                (compressed + 1 + (least_significant_bit(masked) - bit_pos) as i32) * tick_spacing
            } else {
                (compressed + 1 + (u8::MAX - bit_pos) as i32) * tick_spacing
            };
            (next, initialized)
        }
    }

    /// Next initialized tick in the given direction across all words
    ///
    /// Returns None when no initialized tick exists within tick bounds.
    pub fn next_initialized_tick(&self, tick: i32, tick_spacing: i32, lte: bool) -> Option<i32> {
        if self.words.is_empty() {
            return None;
        }

        let mut current = tick;
        loop {
            let (next, initialized) =
                self.next_initialized_tick_within_one_word(current, tick_spacing, lte);
            if initialized {
                return Some(next);
            }
            if lte {
                if next <= MIN_TICK {
                    return None;
                }
                current = next - 1;
            } else {
                if next >= MAX_TICK {
                    return None;
                }
                current = next;
            }
        }
    }
}
