//! Pair notifications
//!
//! Events are buffered while an operation runs and delivered, in order, only
//! after its final commit. A failed operation emits nothing.

use crate::traits::EventSink;
use ethereum_types::{Address, U256};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Notifications consumed by off-ledger indexers and oracles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PairEvent {
    Mint {
        sender: Address,
        amount_a: U256,
        amount_b: U256,
    },
    Burn {
        sender: Address,
        amount_a: U256,
        amount_b: U256,
        to: Address,
    },
    Swap {
        sender: Address,
        amount_a_in: U256,
        amount_b_in: U256,
        amount_a_out: U256,
        amount_b_out: U256,
        to: Address,
    },
    Sync {
        reserve_a: U256,
        reserve_b: U256,
    },
}

impl PairEvent {
    pub fn name(&self) -> &'static str {
        match self {
            PairEvent::Mint { .. } => "Mint",
            PairEvent::Burn { .. } => "Burn",
            PairEvent::Swap { .. } => "Swap",
            PairEvent::Sync { .. } => "Sync",
        }
    }
}

/// In-memory event recorder
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<PairEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded so far, oldest first
    pub fn events(&self) -> Vec<PairEvent> {
        self.events.lock().clone()
    }

    /// Take the recorded events, leaving the log empty
    pub fn drain(&self) -> Vec<PairEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: PairEvent) {
        debug!(event = event.name(), "Pair event");
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_preserves_order() {
        let log = EventLog::new();
        log.emit(PairEvent::Sync {
            reserve_a: U256::from(1),
            reserve_b: U256::from(2),
        });
        log.emit(PairEvent::Mint {
            sender: Address::repeat_byte(1),
            amount_a: U256::from(1),
            amount_b: U256::from(2),
        });

        let names: Vec<_> = log.events().iter().map(PairEvent::name).collect();
        assert_eq!(names, vec!["Sync", "Mint"]);

        assert_eq!(log.drain().len(), 2);
        assert!(log.is_empty());
    }
}
