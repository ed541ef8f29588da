//! A cooperative cancellation token, checked between pipeline stages and
//! between XY-cut recursion levels.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{FoliateError, Result};

/// Cheaply cloned handle shared between a pipeline caller and the stages it
/// drives. Cancelling is a one-way operation: once set, a token stays
/// cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns `Err(FoliateError::Cancelled)` if cancellation has fired.
    /// Call between stages and at each XY-cut recursion level.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(FoliateError::Cancelled)
        } else {
            Ok(())
        }
    }
}
