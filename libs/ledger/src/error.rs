//! Pair error types
//!
//! Every failure is terminal for the invocation that raised it. The pair's
//! state is left as it was at entry and its own custody and share writes are
//! undone.

use crate::traits::{CustodyError, ShareLedgerError};
use ethereum_types::{Address, U256};
use pairswap_amm::QuoteError;
use thiserror::Error;

/// Pair operation failures
#[derive(Debug, Error)]
pub enum PairError {
    // Authorization and lifecycle
    #[error("Forbidden: caller is not the pair creator or the pair is already initialized")]
    NotOwner,

    #[error("Pair is not initialized")]
    NotInitialized,

    #[error("Identical assets: both sides are {0:?}")]
    IdenticalAssets(Address),

    #[error("Locked: another operation on this pair is in progress")]
    Locked,

    // Arithmetic bounds
    #[error("Overflow: value exceeds the 112-bit reserve bound or 256-bit arithmetic")]
    Overflow,

    #[error("Underflow: custodial balance of {asset:?} is below its committed reserve")]
    Underflow { asset: Address },

    // Invariant and magnitude checks
    #[error("Insufficient liquidity: fee-adjusted product fell below the committed product")]
    InsufficientLiquidity,

    #[error("Insufficient liquidity minted")]
    InsufficientMintedLiquidity,

    #[error("Insufficient liquidity burned")]
    InsufficientBurningLiquidity,

    #[error("Insufficient input amount: no input arrived for the exchange")]
    InsufficientInputAmount,

    #[error("Insufficient amount: quoted amount must be positive")]
    InsufficientAmount,

    // Request shape
    #[error("Invalid output amount: at least one output must be positive")]
    InvalidOutputAmount,

    #[error("Insufficient reserves: requested output must be below the committed reserve")]
    InsufficientReserves,

    #[error("Invalid output address: recipient {0:?} is one of the pair's assets")]
    InvalidOutputAddress(Address),

    #[error("Unknown asset {0:?} for this pair")]
    UnknownAsset(Address),

    // Collaborators
    #[error("Transfer of {amount} {asset:?} failed: {reason}")]
    TransferFailed {
        asset: Address,
        amount: U256,
        reason: String,
    },

    #[error("Custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Share ledger error: {0}")]
    Shares(#[from] ShareLedgerError),

    #[error("Rollback of {operation} incomplete after '{cause}': {reason}")]
    Rollback {
        operation: &'static str,
        cause: String,
        reason: String,
    },

    #[error("Flash callback failed: {0}")]
    Callback(#[source] anyhow::Error),
}

impl From<QuoteError> for PairError {
    fn from(err: QuoteError) -> Self {
        match err {
            QuoteError::InsufficientAmount => PairError::InsufficientAmount,
            QuoteError::InsufficientInputAmount => PairError::InsufficientInputAmount,
            QuoteError::InsufficientOutputAmount => PairError::InvalidOutputAmount,
            QuoteError::InsufficientLiquidity => PairError::InsufficientLiquidity,
            QuoteError::Overflow => PairError::Overflow,
        }
    }
}

pub type Result<T, E = PairError> = std::result::Result<T, E>;
