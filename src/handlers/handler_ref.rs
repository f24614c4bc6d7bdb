//! # Identity-carrying callback reference.
//!
//! [`HandlerRef`] pairs a shared [`Handle`] target with a process-unique
//! [`HandlerId`]. Removal by callback compares ids, not allocations or
//! function pointers: clone the reference you registered with and removal
//! by the clone still finds the subscription.
//!
//! ## Rules
//! - Cloning keeps the id; two refs built from the same `Arc` target via
//!   separate [`HandlerRef::new`] calls get distinct ids.
//! - A single-shot adapter records the wrapped handler's id as its
//!   `origin`, so removal by the original reference also matches the
//!   adapter.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::HandlerError;
use crate::events::MatchedEvent;
use crate::handlers::handler::Handle;
use crate::handlers::handler_fn::HandlerFn;
use crate::ids::HandlerId;

/// Cloneable reference to a subscriber callback.
///
/// Identity is the [`HandlerId`], assigned when the reference is created
/// and stable across clones.
#[derive(Clone)]
pub struct HandlerRef {
    id: HandlerId,
    origin: Option<HandlerId>,
    target: Arc<dyn Handle>,
}

impl HandlerRef {
    /// Creates a reference to the given callback target with a fresh id.
    pub fn new(target: Arc<dyn Handle>) -> Self {
        Self {
            id: HandlerId::fresh(),
            origin: None,
            target,
        }
    }

    /// Creates a reference from a closure.
    ///
    /// ## Example
    /// ```rust
    /// use eventmatch::HandlerRef;
    ///
    /// let handler = HandlerRef::from_fn(|_event, _args| Ok(()));
    /// let clone = handler.clone();
    /// assert_eq!(handler.id(), clone.id());
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&MatchedEvent, &[Value]) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self::new(HandlerFn::arc(f))
    }

    /// Creates an adapter reference with a pre-minted id and a recorded
    /// origin, used by single-shot wrappers.
    pub(crate) fn adapter(id: HandlerId, origin: HandlerId, target: Arc<dyn Handle>) -> Self {
        Self {
            id,
            origin: Some(origin),
            target,
        }
    }

    /// Returns this reference's identity token.
    pub fn id(&self) -> HandlerId {
        self.id
    }

    /// Returns the wrapped handler's id when this reference is a
    /// single-shot adapter.
    pub fn origin(&self) -> Option<HandlerId> {
        self.origin
    }

    /// True when `id` names this reference or the handler it wraps.
    pub(crate) fn matches(&self, id: HandlerId) -> bool {
        self.id == id || self.origin == Some(id)
    }

    pub(crate) fn call(&self, event: &MatchedEvent, args: &[Value]) -> Result<(), HandlerError> {
        self.target.call(event, args)
    }
}

impl From<Arc<dyn Handle>> for HandlerRef {
    fn from(target: Arc<dyn Handle>) -> Self {
        Self::new(target)
    }
}

impl fmt::Debug for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRef")
            .field("id", &self.id)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Handle for Noop {
        fn call(&self, _event: &MatchedEvent, _args: &[Value]) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    #[test]
    fn test_clone_keeps_identity() {
        let a = HandlerRef::from_fn(|_, _| Ok(()));
        let b = a.clone();
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_separate_refs_get_distinct_ids() {
        let a = HandlerRef::from_fn(|_, _| Ok(()));
        let b = HandlerRef::from_fn(|_, _| Ok(()));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_adapter_matches_origin() {
        let original = HandlerRef::from_fn(|_, _| Ok(()));
        let id = HandlerId::fresh();
        let adapter = HandlerRef::adapter(id, original.id(), Arc::new(Noop));

        assert!(adapter.matches(id));
        assert!(adapter.matches(original.id()));
        assert!(!original.matches(id));
    }
}
