//! Pool trait definitions for trade planning against committed reserves

use crate::v2_math::{QuoteError, V2Math};
use ethereum_types::U256;
use serde::{Deserialize, Serialize};

/// Reserves oriented along a trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePair {
    pub reserve_in: U256,
    pub reserve_out: U256,
}

impl ReservePair {
    pub fn new(reserve_in: U256, reserve_out: U256) -> Self {
        Self {
            reserve_in,
            reserve_out,
        }
    }

    /// Same pool seen from the opposite trade direction
    pub fn flipped(&self) -> Self {
        Self::new(self.reserve_out, self.reserve_in)
    }
}

/// Unified quoting interface for planning a trade before submission
pub trait AmmPool {
    /// Calculate output amount for given input
    fn get_amount_out(&self, amount_in: U256) -> Result<U256, QuoteError>;

    /// Calculate required input for desired output
    fn get_amount_in(&self, amount_out: U256) -> Result<U256, QuoteError>;

    /// Get reserves as (reserve_in, reserve_out)
    fn get_liquidity(&self) -> (U256, U256);
}

impl AmmPool for ReservePair {
    fn get_amount_out(&self, amount_in: U256) -> Result<U256, QuoteError> {
        V2Math::get_amount_out(amount_in, self.reserve_in, self.reserve_out)
    }

    fn get_amount_in(&self, amount_out: U256) -> Result<U256, QuoteError> {
        V2Math::get_amount_in(amount_out, self.reserve_in, self.reserve_out)
    }

    fn get_liquidity(&self) -> (U256, U256) {
        (self.reserve_in, self.reserve_out)
    }
}
