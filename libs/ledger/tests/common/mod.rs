//! Shared pair harness for the integration suites
#![allow(dead_code)]

use pairswap_ledger::{
    Address, Custody, EventLog, FeeSwitch, ManualClock, MemoryCustody, MemoryShareLedger, Pair,
    PairContext, U256,
};
use std::sync::Arc;

pub const START_TIME: u64 = 1_700_000_000;

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn pair_address() -> Address {
    addr(0x10)
}
pub fn creator() -> Address {
    addr(0x20)
}
pub fn asset_a() -> Address {
    addr(0x0a)
}
pub fn asset_b() -> Address {
    addr(0x0b)
}
pub fn alice() -> Address {
    addr(0xa1)
}
pub fn bob() -> Address {
    addr(0xb0)
}
pub fn fee_setter() -> Address {
    addr(0xfe)
}
pub fn fee_to() -> Address {
    addr(0xf0)
}

pub fn u(value: u64) -> U256 {
    U256::from(value)
}

pub struct Harness {
    pub pair: Arc<Pair>,
    pub custody: Arc<MemoryCustody>,
    pub shares: Arc<MemoryShareLedger>,
    pub fees: Arc<FeeSwitch>,
    pub clock: Arc<ManualClock>,
    pub events: Arc<EventLog>,
}

impl Harness {
    /// Initialized pair with the protocol fee off
    pub fn new() -> Self {
        Self::with_custody(Arc::new(MemoryCustody::new()), |custody| custody)
    }

    /// Initialized pair whose custody is `custody` wrapped by `wrap`
    pub fn with_custody<C, F>(custody: Arc<MemoryCustody>, wrap: F) -> Self
    where
        C: Custody + 'static,
        F: FnOnce(Arc<MemoryCustody>) -> Arc<C>,
    {
        let shares = Arc::new(MemoryShareLedger::new());
        let fees = Arc::new(FeeSwitch::disabled(fee_setter()));
        let clock = Arc::new(ManualClock::new(START_TIME));
        let events = Arc::new(EventLog::new());

        let ctx = PairContext {
            custody: wrap(Arc::clone(&custody)),
            shares: shares.clone(),
            fee_recipient: fees.clone(),
            clock: clock.clone(),
            events: events.clone(),
        };
        let pair = Arc::new(Pair::new(pair_address(), creator(), ctx));
        pair.initialize(creator(), asset_a(), asset_b())
            .expect("creator initializes a fresh pair");

        Self {
            pair,
            custody,
            shares,
            fees,
            clock,
            events,
        }
    }

    /// Give `holder` fresh units of `asset`
    pub fn fund(&self, asset: Address, holder: Address, amount: u64) {
        self.custody.mint(asset, holder, u(amount)).unwrap();
    }

    /// Move `amount` of `asset` from `holder` into the pair's custody
    pub fn send(&self, asset: Address, holder: Address, amount: u64) {
        self.custody
            .transfer(asset, holder, pair_address(), u(amount))
            .unwrap();
    }

    /// Fund `alice`, send both amounts to the pair and deposit for her
    pub fn provide(&self, amount_a: u64, amount_b: u64) -> pairswap_ledger::Result<U256> {
        self.fund(asset_a(), alice(), amount_a);
        self.fund(asset_b(), alice(), amount_b);
        self.send(asset_a(), alice(), amount_a);
        self.send(asset_b(), alice(), amount_b);
        self.pair.deposit(alice(), alice())
    }

    /// Commit reserves without minting any shares
    pub fn seed_reserves(&self, reserve_a: u64, reserve_b: u64) {
        self.fund(asset_a(), pair_address(), reserve_a);
        self.fund(asset_b(), pair_address(), reserve_b);
        self.pair.sync().unwrap();
    }

    pub fn balance(&self, asset: Address, holder: Address) -> U256 {
        self.custody.balance_of(asset, holder)
    }

    pub fn reserves(&self) -> (U256, U256) {
        let (reserve_a, reserve_b, _) = self.pair.get_reserves();
        (reserve_a, reserve_b)
    }
}
