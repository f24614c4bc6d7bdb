//! # Subscriber callback trait.
//!
//! Provides [`Handle`], the extension point for plugging subscriber
//! callbacks into an observer.
//!
//! Each invocation gets:
//! - the [`MatchedEvent`] describing which pattern matched and how well;
//! - the trailing trigger arguments.
//!
//! ## Rules
//! - Callbacks run on the scheduler worker, never inside `trigger`.
//! - Bodies run to completion; they may re-enter the observer
//!   (`trigger`/`on`/`off`), which only enqueues further work.
//! - `Err` returns and panics are caught at the dispatch boundary and
//!   forwarded to the owning observer's error hook; siblings of the same
//!   trigger call are unaffected.

use serde_json::Value;

use crate::error::HandlerError;
use crate::events::MatchedEvent;

/// Subscriber callback invoked per matched dispatch.
///
/// Most callers construct one through [`HandlerRef::from_fn`] or
/// [`HandlerFn`]; implement the trait directly for stateful handlers.
///
/// [`HandlerRef::from_fn`]: crate::HandlerRef::from_fn
/// [`HandlerFn`]: crate::HandlerFn
pub trait Handle: Send + Sync + 'static {
    /// Processes one matched event.
    ///
    /// `event` describes the match (triggered name, matched pattern,
    /// specificity, insertion index) and carries the shared stop
    /// capability; `args` are the trailing arguments passed to `trigger`.
    fn call(&self, event: &MatchedEvent, args: &[Value]) -> Result<(), HandlerError>;
}
