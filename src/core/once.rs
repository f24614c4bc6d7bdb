//! # Self-removing single-shot adapter.
//!
//! `once` wraps the given handler in a [`OnceHandler`]: the first
//! invocation unsubscribes the adapter by its own pre-minted id, then
//! invokes the wrapped handler with the same arguments. Invocations
//! already queued behind the first are no-ops through the first-run
//! guard.
//!
//! The adapter's reference records the wrapped handler's id as its
//! origin, so `off` by the original reference still removes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Weak;

use serde_json::Value;

use crate::core::observer::{Observer, Shared};
use crate::core::subscription::Off;
use crate::error::HandlerError;
use crate::events::MatchedEvent;
use crate::handlers::{Handle, HandlerRef};
use crate::ids::HandlerId;
use crate::patterns::Pattern;

pub(crate) struct OnceHandler {
    /// Owner to unsubscribe from; weak so the adapter never keeps it alive.
    observer: Weak<Shared>,
    /// Raw pattern as passed to `once`, re-normalized by `off`.
    pattern: Pattern,
    /// The adapter's own id, minted before registration.
    id: HandlerId,
    inner: HandlerRef,
    fired: AtomicBool,
}

impl OnceHandler {
    pub(crate) fn new(
        observer: Weak<Shared>,
        pattern: Pattern,
        id: HandlerId,
        inner: HandlerRef,
    ) -> Self {
        Self {
            observer,
            pattern,
            id,
            inner,
            fired: AtomicBool::new(false),
        }
    }
}

impl Handle for OnceHandler {
    fn call(&self, event: &MatchedEvent, args: &[Value]) -> Result<(), HandlerError> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // Unsubscribe before invoking, so a re-entrant trigger from the
        // wrapped handler no longer sees this registration.
        if let Some(shared) = self.observer.upgrade() {
            Observer::from_shared(shared).off(
                Off::new()
                    .with_pattern(self.pattern.clone())
                    .with_handler(self.id),
            );
        }

        self.inner.call(event, args)
    }
}
