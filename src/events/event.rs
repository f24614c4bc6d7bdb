//! # Matched-event descriptor delivered to subscriber callbacks.
//!
//! One [`MatchedEvent`] is built per ranked match of a `trigger` call. All
//! events of the same call share one stop capability: invoking
//! [`MatchedEvent::stop`] from any callback prevents every not-yet-run
//! deferred invocation of that call from executing its body.
//!
//! ## Rules
//! - `stop()` is cooperative and time-of-check: an invocation already
//!   running or already completed is unaffected.
//! - Stop never crosses trigger calls; each call mints a fresh token.
//!
//! ## Example
//! ```rust,ignore
//! obj.on(Pattern::from_json(&json!({"a": 1, "b": 2}))?, HandlerRef::from_fn(|event, _args| {
//!     event.stop(); // lower-ranked matches of this trigger never run
//!     Ok(())
//! }));
//! ```

use tokio_util::sync::CancellationToken;

use crate::ids::ContextId;
use crate::patterns::{Name, Pattern};

/// Per-match dispatch descriptor.
///
/// Carries the triggered name, the stored pattern that matched, the match
/// rank inputs and the shared stop capability of the owning trigger call.
#[derive(Debug, Clone)]
pub struct MatchedEvent {
    name: Name,
    matched: Pattern,
    specificity: u32,
    index: u64,
    context: ContextId,
    stop: CancellationToken,
}

impl MatchedEvent {
    pub(crate) fn new(
        name: Name,
        matched: Pattern,
        specificity: u32,
        index: u64,
        context: ContextId,
        stop: CancellationToken,
    ) -> Self {
        Self {
            name,
            matched,
            specificity,
            index,
            context,
            stop,
        }
    }

    /// The concrete name this trigger call was invoked with (normalized).
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The stored pattern that matched the name.
    pub fn matched(&self) -> &Pattern {
        &self.matched
    }

    /// How precisely the pattern matched; higher dispatched first.
    pub fn specificity(&self) -> u32 {
        self.specificity
    }

    /// Insertion index of the matched subscription (specificity tie-break).
    pub fn index(&self) -> u64 {
        self.index
    }

    /// The context the subscription resolved to: the explicit context
    /// given at registration, else the owning observer's identity.
    ///
    /// Lets a handler shared across registrations tell which one fired.
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Halts propagation: no not-yet-run invocation of this trigger call
    /// will execute its callback body.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// True once any callback of this trigger call has requested a stop.
    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }
}
