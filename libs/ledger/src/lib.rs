//! # Pairswap Ledger - Two-Asset Constant-Product Pair
//!
//! ## Purpose
//!
//! Accounting core of a two-asset liquidity pair. Tracks committed reserves,
//! mints and burns proportional ownership shares, validates exchanges against
//! the 0.2% fee-adjusted constant-product invariant and maintains
//! time-weighted cumulative price accumulators for external price oracles.
//!
//! ## Integration Points
//!
//! - **Custody**: asset balances and transfers, behind [`Custody`]
//! - **Shares**: fungible ownership shares, behind [`ShareLedger`]
//! - **Protocol fee**: optional recipient query, behind [`FeeRecipient`]
//! - **Time**: wall-clock seconds, behind [`Clock`]
//! - **Notifications**: Mint/Burn/Swap/Sync delivered to an [`EventSink`]
//!
//! ## Architecture Role
//!
//! ```text
//! Caller moves assets ─→ Custody ─┐
//!                                 ↓
//!   deposit / withdraw / exchange / sync / skim
//!                                 ↓
//!   [Pair] ── guard → work on copy + journal → commit or undo journal
//!                                 ↓
//!   Reserves + Accumulators + kLast          EventSink (after commit)
//! ```
//!
//! Deposits and exchanges use optimistic transfer: the caller moves input into
//! custody first and the pair infers the amount from the balance surplus over
//! the committed reserves.
//!
//! ## Atomicity
//!
//! Every operation is all-or-nothing for the pair. Its own custody transfers
//! and share mints or burns are journaled and undone on failure, its state is
//! only published on success, and notifications are emitted only after the
//! final commit. Writes made by anyone else in the meantime are left alone.

pub mod error;
pub mod events;
pub mod guard;
pub mod memory;
pub mod oracle;
pub mod pair;
pub mod state;
pub mod traits;
pub mod transfer;

pub use error::{PairError, Result};
pub use events::{EventLog, PairEvent};
pub use guard::OperationGuard;
pub use memory::{
    FeeSwitch, FeeSwitchError, ManualClock, MemoryCustody, MemoryShareLedger, SystemClock,
    TransferReply,
};
pub use oracle::{CumulativePrices, PriceSample};
pub use pair::{Pair, PairContext};
pub use state::PairState;
pub use traits::{
    Clock, Custody, CustodyError, EventSink, FeeRecipient, FlashCallback, FlashRequest,
    ShareLedger, ShareLedgerError,
};

pub use ethereum_types::{Address, U256};
