//! Collaborator Traits
//!
//! The pair ledger owns reserves, accumulators and the fee checkpoint. Asset
//! custody, share balances, the protocol fee switch, time and notification
//! delivery are collaborators behind these traits.

use crate::events::PairEvent;
use ethereum_types::{Address, U256};
use thiserror::Error;

/// Custody failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Insufficient balance of {asset:?} held by {holder:?}: need {needed}, have {available}")]
    InsufficientBalance {
        asset: Address,
        holder: Address,
        needed: U256,
        available: U256,
    },

    #[error("Transfer rejected: {reason}")]
    Rejected { reason: String },
}

/// Share ledger failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShareLedgerError {
    #[error("Insufficient shares held by {holder:?}: need {needed}, have {available}")]
    InsufficientBalance {
        holder: Address,
        needed: U256,
        available: U256,
    },

    #[error("Share supply overflow")]
    SupplyOverflow,
}

/// Asset custody: balances per (asset, holder) and the transfer primitive
pub trait Custody: Send + Sync {
    fn balance_of(&self, asset: Address, holder: Address) -> U256;

    /// Move `amount` of `asset` from `from` to `to`
    ///
    /// Returns the raw reply of the asset: `None` or an empty payload means
    /// success, otherwise the payload must ABI-decode to `true`. An `Ok`
    /// return means the amount moved, unless the payload decodes to `false`.
    fn transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Option<Vec<u8>>, CustodyError>;

    /// Undo a transfer that moved `amount` of `asset` from `from` to `to`
    ///
    /// Touches only those two balances and skips the asset's reply. Fails if
    /// `to` no longer holds the amount.
    fn revert_transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CustodyError>;
}

/// Fungible share ledger the pair mints into and burns from
pub trait ShareLedger: Send + Sync {
    fn total_supply(&self) -> U256;

    fn balance_of(&self, holder: Address) -> U256;

    fn mint(&self, to: Address, amount: U256) -> Result<(), ShareLedgerError>;

    fn burn(&self, from: Address, amount: U256) -> Result<(), ShareLedgerError>;

    /// Used by holders to hand shares to the pair before a withdrawal
    fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), ShareLedgerError>;
}

/// Protocol fee recipient query; `None` means the protocol fee is off
pub trait FeeRecipient: Send + Sync {
    fn fee_to(&self) -> Option<Address>;
}

/// Wall-clock seconds
pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

/// Ordered, append-only delivery of pair notifications
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PairEvent);
}

/// Output amounts already transferred when a flash callback runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashRequest {
    pub sender: Address,
    pub amount_a_out: U256,
    pub amount_b_out: U256,
}

/// Hook invoked by `exchange` after the optimistic output transfer, giving the
/// caller a chance to deliver input within the same invocation
pub trait FlashCallback {
    fn on_exchange(&self, request: &FlashRequest) -> anyhow::Result<()>;
}

impl<F> FlashCallback for F
where
    F: Fn(&FlashRequest) -> anyhow::Result<()>,
{
    fn on_exchange(&self, request: &FlashRequest) -> anyhow::Result<()> {
        self(request)
    }
}
