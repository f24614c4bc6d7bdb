//! # Subscription registry.
//!
//! Owns the observer's [`PatternStore`] and the monotonic insertion
//! counter. Created lazily on first subscription and discarded when the
//! last entry is removed (or wholesale by `off` with no criteria), so a
//! registry exists iff at least one subscription is live.
//!
//! ## Rules
//! - Insertion indexes strictly increase for the registry's lifetime and
//!   are never reused or renumbered; they only break specificity ties.
//! - All mutation happens synchronously inside `on`/`off` under the
//!   observer's state lock; dispatch works from cloned snapshots.

use crate::handlers::HandlerRef;
use crate::ids::{ContextId, HandlerId};
use crate::patterns::{Name, Pattern, PatternStore};

/// One stored subscription.
pub(crate) struct SubscriberEntry {
    /// The registered callback reference.
    pub(crate) handler: HandlerRef,
    /// Explicit context given at registration, used by removal filtering.
    pub(crate) context: Option<ContextId>,
    /// The context the entry resolved to: `context` if given, else the
    /// owning observer's identity. Surfaced on the dispatched event.
    pub(crate) resolved: ContextId,
}

/// Snapshot of one ranked match, detached from the store so dispatch can
/// proceed without holding the state lock.
pub(crate) struct DispatchItem {
    pub(crate) pattern: Pattern,
    pub(crate) specificity: u32,
    pub(crate) index: u64,
    pub(crate) handler: HandlerRef,
    pub(crate) resolved: ContextId,
}

/// Pattern store plus insertion counter.
pub(crate) struct Registry {
    store: PatternStore<SubscriberEntry>,
    next_index: u64,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            store: PatternStore::new(),
            next_index: 0,
        }
    }

    /// Inserts an entry under `pattern` with a fresh insertion index.
    pub(crate) fn subscribe(&mut self, pattern: Pattern, entry: SubscriberEntry) -> u64 {
        let index = self.next_index;
        self.next_index += 1;
        self.store.add(pattern, index, entry);
        index
    }

    /// Bulk removal of everything stored under the exact pattern.
    pub(crate) fn remove_pattern(&mut self, pattern: &Pattern) -> usize {
        self.store.remove_pattern(pattern)
    }

    /// Filtered removal: drops each candidate whose handler id (or
    /// wrapped-handler origin) equals `handler`, or whose explicit context
    /// equals `context`. Candidates are scoped to `pattern` when given.
    pub(crate) fn remove_matching(
        &mut self,
        pattern: Option<&Pattern>,
        handler: Option<HandlerId>,
        context: Option<ContextId>,
    ) -> usize {
        self.store.remove_where(pattern, |entry| {
            handler.is_some_and(|id| entry.handler.matches(id))
                || (context.is_some() && entry.context == context)
        })
    }

    /// Ranked match snapshot for one trigger call.
    pub(crate) fn ranked(&self, name: &Name) -> Vec<DispatchItem> {
        self.store
            .ranked_matches(name)
            .into_iter()
            .map(|m| DispatchItem {
                pattern: m.pattern.clone(),
                specificity: m.specificity,
                index: m.index,
                handler: m.data.handler.clone(),
                resolved: m.data.resolved,
            })
            .collect()
    }

    /// True when any entry was registered with this explicit context.
    pub(crate) fn has_context(&self, context: ContextId) -> bool {
        self.store
            .entries(None)
            .iter()
            .any(|(_, _, entry)| entry.context == Some(context))
    }

    pub(crate) fn len(&self) -> usize {
        self.store.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
