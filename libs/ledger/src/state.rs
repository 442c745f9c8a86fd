//! Pair state

use crate::oracle::{CumulativePrices, PriceSample};
use ethereum_types::{Address, U256};
use serde::{Deserialize, Serialize};

/// Committed state of a single pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairState {
    pub initialized: bool,
    pub asset_a: Address,
    pub asset_b: Address,

    // Both bounded by 2^112 - 1 after every commit
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub last_update_timestamp: u32,

    pub cumulative: CumulativePrices,

    /// reserve_a * reserve_b as of the last protocol fee checkpoint
    pub k_last: U256,
}

impl PairState {
    pub fn reserves(&self) -> (U256, U256) {
        (self.reserve_a, self.reserve_b)
    }

    pub fn contains_asset(&self, asset: Address) -> bool {
        self.asset_a == asset || self.asset_b == asset
    }

    pub fn price_sample(&self) -> PriceSample {
        PriceSample {
            cumulative_price_a: self.cumulative.price_a,
            cumulative_price_b: self.cumulative.price_b,
            timestamp: self.last_update_timestamp,
        }
    }
}
