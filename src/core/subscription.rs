//! # Subscription handles and removal criteria.
//!
//! [`Subscription`] is the opaque handle returned by `on`/`once`; feeding
//! it back through `unsubscribe` removes exactly that registration.
//! [`Off`] is the multi-criteria filter accepted by `off`.
//!
//! ## Removal modes
//! `off` evaluates criteria in precedence order:
//! 1. no registry → no-op;
//! 2. no criteria at all → discard the whole registry;
//! 3. only a pattern → bulk-remove everything stored under that exact
//!    pattern;
//! 4. a handler or context present → remove each candidate (scoped to the
//!    pattern when given) whose handler id, wrapped-handler origin, or
//!    explicit context matches.

use crate::ids::{ContextId, HandlerId};
use crate::patterns::Pattern;

/// Opaque handle to one registration.
///
/// Holds the normalized pattern and the handler id the entry was stored
/// with, which is all `unsubscribe` needs for an exact removal.
#[derive(Debug, Clone)]
pub struct Subscription {
    pattern: Pattern,
    handler: HandlerId,
}

impl Subscription {
    pub(crate) fn new(pattern: Pattern, handler: HandlerId) -> Self {
        Self { pattern, handler }
    }

    /// The pattern the subscription was stored under (after delimiter
    /// normalization).
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Identity of the registered handler.
    ///
    /// For a `once` registration this is the self-removing adapter's id,
    /// not the wrapped handler's.
    pub fn handler(&self) -> HandlerId {
        self.handler
    }
}

/// Removal criteria for `off`.
///
/// ## Example
/// ```rust,ignore
/// obj.off(Off::all());                                    // drop everything
/// obj.off(Off::new().with_pattern("event"));              // bulk by pattern
/// obj.off(Off::new().with_pattern("event").with_handler(h.id()));
/// obj.off(Off::new().with_context(ctx));                  // by context only
/// ```
#[derive(Debug, Clone, Default)]
pub struct Off {
    pub(crate) pattern: Option<Pattern>,
    pub(crate) handler: Option<HandlerId>,
    pub(crate) context: Option<ContextId>,
}

impl Off {
    /// Starts an empty criteria set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria matching every subscription: `off(Off::all())` discards
    /// the whole registry.
    pub fn all() -> Self {
        Self::default()
    }

    /// Scopes removal to one pattern.
    pub fn with_pattern(mut self, pattern: impl Into<Pattern>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Removes entries registered with this handler, or wrapping it
    /// through a single-shot adapter.
    pub fn with_handler(mut self, handler: HandlerId) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Removes entries registered with this explicit context.
    pub fn with_context(mut self, context: ContextId) -> Self {
        self.context = Some(context);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pattern.is_none() && self.handler.is_none() && self.context.is_none()
    }
}
