//! In-memory collaborators
//!
//! Self-contained implementations of custody, the share ledger, the protocol
//! fee switch and clocks. Used by the simulator and the test suites, and a
//! reference for embedding the pair against real backends.

use crate::traits::{Clock, Custody, CustodyError, FeeRecipient, ShareLedger, ShareLedgerError};
use crate::transfer::encode_bool_reply;
use ethereum_types::{Address, U256};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info};

/// How an asset answers a transfer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferReply {
    /// No return payload (treated as success)
    #[default]
    Empty,
    /// ABI-encoded boolean; `false` moves nothing
    Bool(bool),
    /// Arbitrary bytes after moving the funds
    Raw(Vec<u8>),
}

#[derive(Debug, Default)]
struct CustodyBook {
    balances: HashMap<(Address, Address), U256>,
}

impl CustodyBook {
    fn balance(&self, asset: Address, holder: Address) -> U256 {
        self.balances.get(&(asset, holder)).copied().unwrap_or_default()
    }

    fn move_funds(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CustodyError> {
        let available = self.balance(asset, from);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                asset,
                holder: from,
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance(asset, to)
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Rejected {
                reason: "balance overflow".to_string(),
            })?;
        self.balances.insert((asset, from), available - amount);
        self.balances.insert((asset, to), credited);
        Ok(())
    }
}

/// Balance table per (asset, holder)
#[derive(Debug, Default)]
pub struct MemoryCustody {
    book: RwLock<CustodyBook>,
    replies: RwLock<HashMap<Address, TransferReply>>,
}

impl MemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `holder` out of thin air
    pub fn mint(&self, asset: Address, holder: Address, amount: U256) -> Result<(), CustodyError> {
        let mut book = self.book.write();
        let balance = book.balances.entry((asset, holder)).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| CustodyError::Rejected {
                reason: "balance overflow".to_string(),
            })?;
        debug!(asset = ?asset, holder = ?holder, %amount, "Custody mint");
        Ok(())
    }

    /// Configure the reply an asset gives to transfers
    pub fn set_reply(&self, asset: Address, reply: TransferReply) {
        info!(asset = ?asset, reply = ?reply, "Custody transfer reply configured");
        self.replies.write().insert(asset, reply);
    }
}

impl Custody for MemoryCustody {
    fn balance_of(&self, asset: Address, holder: Address) -> U256 {
        self.book.read().balance(asset, holder)
    }

    fn transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<Option<Vec<u8>>, CustodyError> {
        let reply = self.replies.read().get(&asset).cloned().unwrap_or_default();
        if reply == TransferReply::Bool(false) {
            return Ok(Some(encode_bool_reply(false)));
        }

        self.book.write().move_funds(asset, from, to, amount)?;
        debug!(asset = ?asset, from = ?from, to = ?to, %amount, "Custody transfer");

        Ok(match reply {
            TransferReply::Empty => None,
            TransferReply::Bool(value) => Some(encode_bool_reply(value)),
            TransferReply::Raw(bytes) => Some(bytes),
        })
    }

    fn revert_transfer(
        &self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CustodyError> {
        self.book.write().move_funds(asset, to, from, amount)?;
        debug!(asset = ?asset, from = ?from, to = ?to, %amount, "Custody transfer reverted");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct ShareBook {
    total_supply: U256,
    balances: HashMap<Address, U256>,
}

/// Fungible share balances with a tracked total supply
#[derive(Debug, Default)]
pub struct MemoryShareLedger {
    book: RwLock<ShareBook>,
}

impl MemoryShareLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShareBook {
    fn debit(&mut self, holder: Address, amount: U256) -> Result<(), ShareLedgerError> {
        let available = self.balances.get(&holder).copied().unwrap_or_default();
        if available < amount {
            return Err(ShareLedgerError::InsufficientBalance {
                holder,
                needed: amount,
                available,
            });
        }
        self.balances.insert(holder, available - amount);
        Ok(())
    }

    fn credit(&mut self, holder: Address, amount: U256) -> Result<(), ShareLedgerError> {
        let balance = self.balances.entry(holder).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(ShareLedgerError::SupplyOverflow)?;
        Ok(())
    }
}

impl ShareLedger for MemoryShareLedger {
    fn total_supply(&self) -> U256 {
        self.book.read().total_supply
    }

    fn balance_of(&self, holder: Address) -> U256 {
        self.book
            .read()
            .balances
            .get(&holder)
            .copied()
            .unwrap_or_default()
    }

    fn mint(&self, to: Address, amount: U256) -> Result<(), ShareLedgerError> {
        let mut book = self.book.write();
        book.total_supply = book
            .total_supply
            .checked_add(amount)
            .ok_or(ShareLedgerError::SupplyOverflow)?;
        book.credit(to, amount)
    }

    fn burn(&self, from: Address, amount: U256) -> Result<(), ShareLedgerError> {
        let mut book = self.book.write();
        book.debit(from, amount)?;
        // Supply is the sum of balances, so it covers any debited amount
        book.total_supply -= amount;
        Ok(())
    }

    fn transfer(&self, from: Address, to: Address, amount: U256) -> Result<(), ShareLedgerError> {
        let mut book = self.book.write();
        book.debit(from, amount)?;
        book.credit(to, amount)
    }
}

/// Fee switch errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeeSwitchError {
    #[error("Forbidden: {0:?} is not the fee setter")]
    Forbidden(Address),
}

/// Single protocol fee recipient, changeable only by its setter
#[derive(Debug)]
pub struct FeeSwitch {
    setter: Address,
    fee_to: RwLock<Option<Address>>,
}

impl FeeSwitch {
    pub fn new(setter: Address, fee_to: Option<Address>) -> Self {
        Self {
            setter,
            fee_to: RwLock::new(fee_to),
        }
    }

    /// Fee switch that is off and stays off unless `setter` turns it on
    pub fn disabled(setter: Address) -> Self {
        Self::new(setter, None)
    }

    pub fn set_fee_to(&self, caller: Address, fee_to: Option<Address>) -> Result<(), FeeSwitchError> {
        if caller != self.setter {
            return Err(FeeSwitchError::Forbidden(caller));
        }
        info!(fee_to = ?fee_to, "Protocol fee recipient updated");
        *self.fee_to.write() = fee_to;
        Ok(())
    }
}

impl FeeRecipient for FeeSwitch {
    fn fee_to(&self) -> Option<Address> {
        *self.fee_to.read()
    }
}

/// Clock moved by hand
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default()
    }
}
