//! Per-pair operation guard
//!
//! Admits one state-changing operation at a time. Any attempt to enter while
//! an operation is running is refused with [`PairError::Locked`] without
//! waiting, whether it comes from a custody or flash callback on the same
//! thread or from a worker that callback handed the call to.

use crate::error::PairError;
use parking_lot::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct OperationGuard {
    gate: Mutex<()>,
}

/// Proof of exclusive access; released on drop
#[derive(Debug)]
pub struct Entered<'a> {
    _gate: MutexGuard<'a, ()>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access, failing immediately if it is held
    pub fn enter(&self) -> Result<Entered<'_>, PairError> {
        let gate = self.gate.try_lock().ok_or(PairError::Locked)?;
        Ok(Entered { _gate: gate })
    }

    /// Whether an operation currently holds the guard
    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }
}
