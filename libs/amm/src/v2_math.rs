//! Constant product quote math with exact integer rounding
//!
//! Every function floors its division except [`V2Math::get_amount_in`], which
//! adds one unit so that supplying exactly the returned input always satisfies
//! the pair's fee-adjusted invariant. Callers that pre-compute swap parameters
//! off-ledger rely on this rounding being reproduced bit for bit.

use ethereum_types::U256;
use pairswap_config::fees::{FEE_DENOMINATOR, INPUT_MULTIPLIER};
use thiserror::Error;

/// Quote math failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum QuoteError {
    #[error("Insufficient amount: quoted amount must be positive")]
    InsufficientAmount,

    #[error("Insufficient input amount: input must be positive")]
    InsufficientInputAmount,

    #[error("Insufficient output amount: output must be positive")]
    InsufficientOutputAmount,

    #[error("Insufficient liquidity: reserves cannot cover the request")]
    InsufficientLiquidity,

    #[error("Arithmetic overflow: intermediate product exceeds 256 bits")]
    Overflow,
}

/// Constant product math functions
pub struct V2Math;

impl V2Math {
    /// Equivalent amount of the other asset at the current reserve ratio
    ///
    /// `amount_b = floor(amount_a * reserve_b / reserve_a)`
    pub fn quote(amount_a: U256, reserve_a: U256, reserve_b: U256) -> Result<U256, QuoteError> {
        if amount_a.is_zero() {
            return Err(QuoteError::InsufficientAmount);
        }
        if reserve_a.is_zero() || reserve_b.is_zero() {
            return Err(QuoteError::InsufficientLiquidity);
        }

        Ok(mul(amount_a, reserve_b)? / reserve_a)
    }

    /// Maximum output for an exact input, after the 0.2% fee
    ///
    /// # Arguments
    /// * `amount_in` - Input amount delivered to the pair
    /// * `reserve_in` - Committed reserve of the input asset
    /// * `reserve_out` - Committed reserve of the output asset
    pub fn get_amount_out(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256, QuoteError> {
        if amount_in.is_zero() {
            return Err(QuoteError::InsufficientInputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(QuoteError::InsufficientLiquidity);
        }

        let amount_in_with_fee = mul(amount_in, U256::from(INPUT_MULTIPLIER))?;
        let numerator = mul(amount_in_with_fee, reserve_out)?;
        let denominator = mul(reserve_in, U256::from(FEE_DENOMINATOR))?
            .checked_add(amount_in_with_fee)
            .ok_or(QuoteError::Overflow)?;

        Ok(numerator / denominator)
    }

    /// Minimum input for an exact output, rounded up by one unit
    pub fn get_amount_in(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
    ) -> Result<U256, QuoteError> {
        if amount_out.is_zero() {
            return Err(QuoteError::InsufficientOutputAmount);
        }
        if reserve_in.is_zero() || reserve_out.is_zero() || amount_out >= reserve_out {
            return Err(QuoteError::InsufficientLiquidity);
        }

        let numerator = mul(mul(reserve_in, amount_out)?, U256::from(FEE_DENOMINATOR))?;
        let denominator = mul(reserve_out - amount_out, U256::from(INPUT_MULTIPLIER))?;

        (numerator / denominator)
            .checked_add(U256::one())
            .ok_or(QuoteError::Overflow)
    }
}

fn mul(a: U256, b: U256) -> Result<U256, QuoteError> {
    a.checked_mul(b).ok_or(QuoteError::Overflow)
}
