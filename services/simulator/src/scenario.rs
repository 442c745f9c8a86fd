//! Scenario files
//!
//! A scenario is a TOML list of `[[steps]]`, each tagged by `action`:
//!
//! ```toml
//! [[steps]]
//! action = "fund"
//! account = "0x00000000000000000000000000000000000000a1"
//! asset = "a"
//! amount = 4000
//!
//! [[steps]]
//! action = "deposit"
//! account = "0x00000000000000000000000000000000000000a1"
//! amount_a = 4000
//! amount_b = "4000"
//! ```
//!
//! Amounts are TOML integers or decimal strings (for values beyond i64).

use anyhow::{Context, Result};
use ethereum_types::{Address, U256};
use pairswap_config::parse_address;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::Path;

/// Side of the pair an amount refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

/// Non-negative 256-bit amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Amount(pub U256);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Integer(u64),
            Decimal(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Integer(value) => Ok(Amount(U256::from(value))),
            Raw::Decimal(text) => U256::from_dec_str(text.trim())
                .map(Amount)
                .map_err(|e| serde::de::Error::custom(format!("invalid amount '{}': {:?}", text, e))),
        }
    }
}

/// One scripted action against the pair
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Credit fresh units of an asset to an account
    Fund {
        account: String,
        asset: Side,
        amount: Amount,
    },
    /// Send both amounts to the pair and deposit
    Deposit {
        account: String,
        #[serde(default)]
        amount_a: Amount,
        #[serde(default)]
        amount_b: Amount,
        recipient: Option<String>,
    },
    /// Hand shares to the pair and withdraw
    Withdraw {
        account: String,
        shares: Amount,
        recipient: Option<String>,
    },
    /// Raw exchange: send the inputs, request the outputs
    Exchange {
        account: String,
        #[serde(default)]
        amount_a_in: Amount,
        #[serde(default)]
        amount_b_in: Amount,
        #[serde(default)]
        amount_a_out: Amount,
        #[serde(default)]
        amount_b_out: Amount,
        recipient: Option<String>,
    },
    /// Exchange an exact input for the quoted output
    ExchangeExactIn {
        account: String,
        asset_in: Side,
        amount_in: Amount,
        min_out: Option<Amount>,
        recipient: Option<String>,
    },
    Sync,
    Skim {
        recipient: String,
    },
    AdvanceClock {
        seconds: u64,
    },
    /// Change the protocol fee recipient; absent `fee_to` turns it off
    SetFeeTo {
        caller: String,
        fee_to: Option<String>,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Fund { .. } => "fund",
            Step::Deposit { .. } => "deposit",
            Step::Withdraw { .. } => "withdraw",
            Step::Exchange { .. } => "exchange",
            Step::ExchangeExactIn { .. } => "exchange_exact_in",
            Step::Sync => "sync",
            Step::Skim { .. } => "skim",
            Step::AdvanceClock { .. } => "advance_clock",
            Step::SetFeeTo { .. } => "set_fee_to",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid scenario {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse scenario TOML")
    }
}

pub fn account(value: &str) -> Result<Address> {
    Ok(Address::from(parse_address(value)?))
}
