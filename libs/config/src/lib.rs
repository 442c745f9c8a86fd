//! # Pairswap Configuration
//!
//! Protocol constants shared by the quote math and the pair ledger, plus
//! file/environment settings loading for pair deployments.
//!
//! ## Usage
//!
//! ```rust
//! use pairswap_config::{fees, MINIMUM_LIQUIDITY};
//!
//! assert_eq!(fees::INPUT_MULTIPLIER, 998);
//! assert_eq!(MINIMUM_LIQUIDITY, 1_000);
//! ```

pub mod protocol;
pub mod settings;

// Re-export commonly used types
pub use protocol::*;
pub use settings::{parse_address, PairSettings, ENV_PREFIX};
