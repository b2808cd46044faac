// crates/statscopy-core/src/core/cancel.rs
// ============================================================================
// Module: Statscopy Cancellation
// Description: Caller-supplied cancellation signal with optional deadline.
// Purpose: Let one signal stop the cursor, the sink, and the copier loop.
// Dependencies: std, time
// ============================================================================

//! ## Overview
//! Cancellation is a first-class input to a copy run. The copier checks the
//! token before pulling each row and before each sink operation, and hands the
//! same token to the source cursor and the sink so implementations can abort
//! in-flight work. Timeouts are expressed as a deadline on the same signal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use time::OffsetDateTime;

// ============================================================================
// SECTION: Cancel Token
// ============================================================================

/// Shared cancellation signal for one copy run.
///
/// Clones observe the same flag. A deadline, when set, reads as cancellation
/// once it has passed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Shared cancellation flag.
    cancelled: Arc<AtomicBool>,
    /// Optional absolute deadline.
    deadline: Option<OffsetDateTime>,
}

impl CancelToken {
    /// Creates a token that never fires unless cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that also fires once the deadline passes.
    #[must_use]
    pub fn with_deadline(deadline: OffsetDateTime) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    /// Signals cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true when cancellation was signalled or the deadline passed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        self.deadline.is_some_and(|deadline| OffsetDateTime::now_utc() >= deadline)
    }
}
