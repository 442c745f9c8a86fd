//! # Pairswap AMM Library - Constant Product Quote Math
//!
//! ## Purpose
//!
//! Stateless, referentially transparent quote functions for a two-asset
//! constant-product pair with a 0.2% swap fee. The pair ledger validates
//! exchanges against the same arithmetic, and external callers use these
//! functions to size trades before submitting them.
//!
//! ## Rounding
//!
//! - [`V2Math::quote`] and [`V2Math::get_amount_out`] floor.
//! - [`V2Math::get_amount_in`] floors and then adds one unit, so the returned
//!   input is the smallest amount that passes the pair's invariant check.
//!
//! All arithmetic is 256-bit and checked: an intermediate product that does
//! not fit fails with [`QuoteError::Overflow`].
//!
//! ## Concurrency
//!
//! Nothing here holds state; every function may be called from any number of
//! threads without synchronization.

pub mod pool_traits;
pub mod v2_math;

pub use pool_traits::{AmmPool, ReservePair};
pub use v2_math::{QuoteError, V2Math};

/// Common types for AMM calculations
pub use ethereum_types::U256;
