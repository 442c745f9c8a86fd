//! In-memory pair deployment driven by scenario steps

use crate::scenario::{account, Amount, Scenario, Side, Step};
use anyhow::{bail, Context, Result};
use ethereum_types::{Address, U256};
use pairswap_config::{parse_address, PairSettings};
use pairswap_ledger::{
    Clock, Custody, EventLog, FeeSwitch, ManualClock, MemoryCustody, MemoryShareLedger, Pair,
    PairContext, PairEvent, PriceSample, ShareLedger, SystemClock,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of one replayed step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub action: &'static str,
    pub ok: bool,
    pub detail: String,
}

/// Pair state after the replay
#[derive(Debug, Clone, Serialize)]
pub struct FinalState {
    pub reserve_a: U256,
    pub reserve_b: U256,
    pub last_update_timestamp: u32,
    pub total_shares: U256,
    pub k_last: U256,
    pub prices: PriceSample,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scenario: Option<String>,
    pub steps: Vec<StepReport>,
    pub events: Vec<PairEvent>,
    pub final_state: FinalState,
}

pub struct Simulation {
    pair: Arc<Pair>,
    custody: Arc<MemoryCustody>,
    shares: Arc<MemoryShareLedger>,
    fees: Arc<FeeSwitch>,
    clock: Arc<ManualClock>,
    events: Arc<EventLog>,
    asset_a: Address,
    asset_b: Address,
}

impl Simulation {
    /// Build and initialize a pair from settings; the creator also sets fees
    ///
    /// The clock starts at the configured timestamp, or at wall-clock time
    /// when none is set, and only moves on `advance_clock` steps.
    pub fn from_settings(settings: &PairSettings) -> Result<Self> {
        let definition = &settings.pair;
        let address = Address::from(parse_address(&definition.address)?);
        let creator = Address::from(parse_address(&definition.creator)?);
        let asset_a = Address::from(parse_address(&definition.asset_a)?);
        let asset_b = Address::from(parse_address(&definition.asset_b)?);
        let fee_to = definition
            .fee_to
            .as_deref()
            .map(account)
            .transpose()?;

        let custody = Arc::new(MemoryCustody::new());
        let shares = Arc::new(MemoryShareLedger::new());
        let fees = Arc::new(FeeSwitch::new(creator, fee_to));
        let start = settings
            .clock
            .start_timestamp
            .unwrap_or_else(|| SystemClock.now());
        let clock = Arc::new(ManualClock::new(start));
        let events = Arc::new(EventLog::new());

        let pair = Arc::new(Pair::new(
            address,
            creator,
            PairContext {
                custody: custody.clone(),
                shares: shares.clone(),
                fee_recipient: fees.clone(),
                clock: clock.clone(),
                events: events.clone(),
            },
        ));
        pair.initialize(creator, asset_a, asset_b)
            .context("Failed to initialize pair")?;

        Ok(Self {
            pair,
            custody,
            shares,
            fees,
            clock,
            events,
            asset_a,
            asset_b,
        })
    }

    pub fn pair(&self) -> &Pair {
        &self.pair
    }

    pub fn balance(&self, side: Side, holder: Address) -> U256 {
        self.custody.balance_of(self.asset(side), holder)
    }

    pub fn shares_of(&self, holder: Address) -> U256 {
        self.shares.balance_of(holder)
    }

    /// Replay every step, recording failures instead of stopping unless
    /// `fail_fast` is set
    pub fn run(&self, scenario: &Scenario, fail_fast: bool) -> Result<Report> {
        let mut steps = Vec::with_capacity(scenario.steps.len());

        for (index, step) in scenario.steps.iter().enumerate() {
            let action = step.action();
            match self.apply(step) {
                Ok(detail) => {
                    info!(index, action, %detail, "Step applied");
                    steps.push(StepReport {
                        index,
                        action,
                        ok: true,
                        detail,
                    });
                }
                Err(e) => {
                    warn!(index, action, error = %e, "Step failed");
                    if fail_fast {
                        return Err(e.context(format!("Step {} ({}) failed", index, action)));
                    }
                    steps.push(StepReport {
                        index,
                        action,
                        ok: false,
                        detail: format!("{:#}", e),
                    });
                }
            }
        }

        Ok(Report {
            scenario: scenario.name.clone(),
            steps,
            events: self.events.events(),
            final_state: self.final_state(),
        })
    }

    pub fn final_state(&self) -> FinalState {
        let (reserve_a, reserve_b, last_update_timestamp) = self.pair.get_reserves();
        FinalState {
            reserve_a,
            reserve_b,
            last_update_timestamp,
            total_shares: self.pair.total_shares(),
            k_last: self.pair.k_last(),
            prices: self.pair.observe(),
        }
    }

    fn apply(&self, step: &Step) -> Result<String> {
        let pair_address = self.pair.address();

        match step {
            Step::Fund {
                account: holder,
                asset,
                amount,
            } => {
                let holder = account(holder)?;
                self.custody.mint(self.asset(*asset), holder, amount.0)?;
                Ok(format!("funded {} of asset {:?}", amount.0, asset))
            }
            Step::Deposit {
                account: sender,
                amount_a,
                amount_b,
                recipient,
            } => {
                let sender = account(sender)?;
                let recipient = self.recipient(recipient.as_deref(), sender)?;
                self.send(Side::A, sender, *amount_a)?;
                self.send(Side::B, sender, *amount_b)?;
                let minted = self.pair.deposit(sender, recipient)?;
                Ok(format!("minted {} shares", minted))
            }
            Step::Withdraw {
                account: sender,
                shares,
                recipient,
            } => {
                let sender = account(sender)?;
                let recipient = self.recipient(recipient.as_deref(), sender)?;
                self.shares.transfer(sender, pair_address, shares.0)?;
                let (amount_a, amount_b) = self.pair.withdraw(sender, recipient)?;
                Ok(format!("redeemed {} A and {} B", amount_a, amount_b))
            }
            Step::Exchange {
                account: sender,
                amount_a_in,
                amount_b_in,
                amount_a_out,
                amount_b_out,
                recipient,
            } => {
                let sender = account(sender)?;
                let recipient = self.recipient(recipient.as_deref(), sender)?;
                self.send(Side::A, sender, *amount_a_in)?;
                self.send(Side::B, sender, *amount_b_in)?;
                self.pair
                    .exchange(sender, amount_a_out.0, amount_b_out.0, recipient)?;
                Ok(format!("received {} A and {} B", amount_a_out.0, amount_b_out.0))
            }
            Step::ExchangeExactIn {
                account: sender,
                asset_in,
                amount_in,
                min_out,
                recipient,
            } => {
                let sender = account(sender)?;
                let recipient = self.recipient(recipient.as_deref(), sender)?;
                let out = self
                    .pair
                    .quote_exact_in(self.asset(*asset_in), amount_in.0)?;
                if let Some(min_out) = min_out {
                    if out < min_out.0 {
                        bail!("quoted output {} is below the minimum {}", out, min_out.0);
                    }
                }

                self.send(*asset_in, sender, *amount_in)?;
                let (amount_a_out, amount_b_out) = match asset_in {
                    Side::A => (U256::zero(), out),
                    Side::B => (out, U256::zero()),
                };
                self.pair
                    .exchange(sender, amount_a_out, amount_b_out, recipient)?;
                Ok(format!("swapped {} for {}", amount_in.0, out))
            }
            Step::Sync => {
                self.pair.sync()?;
                let (reserve_a, reserve_b, _) = self.pair.get_reserves();
                Ok(format!("reserves {} / {}", reserve_a, reserve_b))
            }
            Step::Skim { recipient } => {
                let recipient = account(recipient)?;
                let (surplus_a, surplus_b) = self.pair.skim(recipient)?;
                Ok(format!("skimmed {} A and {} B", surplus_a, surplus_b))
            }
            Step::AdvanceClock { seconds } => {
                self.clock.advance(*seconds);
                Ok(format!("clock advanced {}s", seconds))
            }
            Step::SetFeeTo { caller, fee_to } => {
                let caller = account(caller)?;
                let fee_to = fee_to.as_deref().map(account).transpose()?;
                self.fees.set_fee_to(caller, fee_to)?;
                Ok(match fee_to {
                    Some(fee_to) => format!("protocol fee to {:?}", fee_to),
                    None => "protocol fee off".to_string(),
                })
            }
        }
    }

    fn asset(&self, side: Side) -> Address {
        match side {
            Side::A => self.asset_a,
            Side::B => self.asset_b,
        }
    }

    fn recipient(&self, recipient: Option<&str>, sender: Address) -> Result<Address> {
        recipient.map(account).unwrap_or(Ok(sender))
    }

    /// Move `amount` from `holder` into the pair's custody
    fn send(&self, side: Side, holder: Address, amount: Amount) -> Result<()> {
        if amount.0.is_zero() {
            return Ok(());
        }
        self.custody
            .transfer(self.asset(side), holder, self.pair.address(), amount.0)?;
        Ok(())
    }
}
