//! Cooperative cancellation for long-running filesystem and stream analyses.
//!
//! The core never spawns its own work; a caller hands a `CancellationToken`
//! to any operation that walks a potentially large tree or consumes a
//! potentially unbounded stream (co-change parsing, import/link scanning).
//! The operation polls it at loop-iteration boundaries (per-file, per-commit)
//! and fails with [`crate::error::CoreError::Cancelled`] the first time it
//! observes a cancelled token. Partial results are never returned.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A shareable, cooperative cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a fresh, not-yet-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// True once `cancel` has been called on this token or any of its clones.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
