//! Pair Settings Module
//!
//! Loads the settings a pair deployment needs (identities, fee recipient,
//! clock origin, logging) from a TOML file with environment overrides.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Prefix of environment variables overriding file values
/// (e.g. `PAIRSWAP_PAIR__FEE_TO=0x...`)
pub const ENV_PREFIX: &str = "PAIRSWAP";

/// Main settings structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PairSettings {
    #[serde(default)]
    pub logging: LoggingConfig,

    pub pair: PairDefinition,

    #[serde(default)]
    pub clock: ClockConfig,
}

/// Logging settings
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

/// Identities of a single pair deployment, as 0x-prefixed hex addresses
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PairDefinition {
    pub address: String,
    pub creator: String,
    pub asset_a: String,
    pub asset_b: String,
    /// Protocol fee recipient; absent means the protocol fee is off
    pub fee_to: Option<String>,
}

/// Clock origin for simulated deployments
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ClockConfig {
    /// Seconds since the epoch the simulated clock starts at; absent starts
    /// at the current wall-clock time
    pub start_timestamp: Option<u64>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl PairSettings {
    /// Load settings from a TOML file, then apply `PAIRSWAP_` overrides
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading pair settings: {:?}", path);

        let config = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let settings: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from an in-memory TOML document (no env overrides)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse settings TOML")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every configured identity is a well-formed address
    pub fn validate(&self) -> Result<()> {
        let pair = &self.pair;
        for (field, value) in [
            ("pair.address", &pair.address),
            ("pair.creator", &pair.creator),
            ("pair.asset_a", &pair.asset_a),
            ("pair.asset_b", &pair.asset_b),
        ] {
            parse_address(value).with_context(|| format!("Invalid {}", field))?;
        }
        if let Some(fee_to) = &pair.fee_to {
            parse_address(fee_to).context("Invalid pair.fee_to")?;
        }
        if pair.asset_a.eq_ignore_ascii_case(&pair.asset_b) {
            bail!("pair.asset_a and pair.asset_b must differ");
        }
        debug!(address = %pair.address, "Pair settings validated");
        Ok(())
    }
}

/// Decode a 0x-prefixed (or bare) 40-digit hex string into address bytes
pub fn parse_address(value: &str) -> Result<[u8; 20]> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    let bytes = hex::decode(digits).with_context(|| format!("'{}' is not hex", value))?;
    bytes
        .try_into()
        .map_err(|bytes: Vec<u8>| anyhow::anyhow!("expected 20 bytes, got {}", bytes.len()))
}
