//! Cumulative price accumulators
//!
//! Prices are UQ112x112 fixed point: the numerator reserve is shifted left by
//! 112 bits before integer division by the denominator reserve. Accumulators
//! are 256-bit and wrap on overflow, and elapsed time is computed with
//! wrapping u32 subtraction. Only differences between two samples carry
//! meaning, so both wraps are harmless to consumers.

use ethereum_types::U256;
use pairswap_config::fixed_point::{RESERVE_BITS, RESOLUTION, TIMESTAMP_BITS};
use serde::{Deserialize, Serialize};

/// Largest committable reserve, 2^112 - 1
pub fn max_reserve() -> U256 {
    (U256::one() << RESERVE_BITS) - U256::one()
}

/// Reduce a wall-clock second to the stored 32-bit timestamp
pub fn truncate_timestamp(now: u64) -> u32 {
    (now % (1u64 << TIMESTAMP_BITS)) as u32
}

/// Seconds between two stored timestamps, correct across a 2^32 wrap
pub fn time_elapsed(now: u32, last: u32) -> u32 {
    now.wrapping_sub(last)
}

/// UQ112x112 ratio `numerator / denominator`
///
/// Both reserves are below 2^112, so the result fits in 224 bits.
pub fn encode_ratio(numerator: U256, denominator: U256) -> U256 {
    (numerator << RESOLUTION) / denominator
}

/// Time-integrals of the two price ratios
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CumulativePrices {
    /// Integral of reserve_a / reserve_b
    pub price_a: U256,
    /// Integral of reserve_b / reserve_a
    pub price_b: U256,
}

impl CumulativePrices {
    /// Add `elapsed` seconds at the given (non-zero) reserves
    pub fn accumulate(&mut self, reserve_a: U256, reserve_b: U256, elapsed: u32) {
        let elapsed = U256::from(elapsed);
        // < 2^224 * 2^32, cannot overflow the multiplication
        let term_a = encode_ratio(reserve_a, reserve_b) * elapsed;
        let term_b = encode_ratio(reserve_b, reserve_a) * elapsed;

        self.price_a = self.price_a.overflowing_add(term_a).0;
        self.price_b = self.price_b.overflowing_add(term_b).0;
    }
}

/// Raw accumulator sample for external TWAP consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    pub cumulative_price_a: U256,
    pub cumulative_price_b: U256,
    pub timestamp: u32,
}
