//! Process-wide identity minting.
//!
//! A single atomic counter serves every identity the crate hands out:
//! observer/context tokens ([`ContextId`]) and callback tokens
//! ([`HandlerId`]). Ids are unique within a process run, never reused, and
//! the counter resets only at process start.

use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter backing all identity tokens.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_raw() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identity token for an observer or an explicit subscription context.
///
/// Contexts group subscriptions for bulk removal ([`Off::with_context`])
/// and key the listening map that backs `listen_to`/`stop_listening`.
/// Every [`Observer`] owns one, assigned at construction and stable for
/// its lifetime; callers may mint additional tokens with
/// [`ContextId::fresh`] to tag unrelated groups of subscriptions.
///
/// [`Off::with_context`]: crate::Off::with_context
/// [`Observer`]: crate::Observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Mints a new process-unique token.
    pub fn fresh() -> Self {
        Self(next_raw())
    }
}

/// Identity token for a callback reference.
///
/// Removal by callback compares these tokens instead of comparing function
/// pointers or allocations; a cloned [`HandlerRef`] keeps the id of the
/// reference it was cloned from.
///
/// [`HandlerRef`]: crate::HandlerRef
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    pub(crate) fn fresh() -> Self {
        Self(next_raw())
    }
}
