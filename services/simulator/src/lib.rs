//! # Pairswap Simulator
//!
//! Replays scripted scenarios against an in-memory pair: settings define the
//! pair identities and clock origin, a scenario lists funding, liquidity,
//! exchange and maintenance steps, and the report carries every step outcome
//! plus the ordered notification log.

pub mod scenario;
pub mod simulation;

pub use scenario::{Amount, Scenario, Side, Step};
pub use simulation::{FinalState, Report, Simulation, StepReport};
