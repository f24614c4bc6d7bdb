//! # IoC listening bookkeeping.
//!
//! [`ListenMap`] records which sources this observer has placed
//! subscriptions on via `listen_to`, keyed by the source's identity
//! token. Sources are held weakly so tracking never keeps a dropped
//! observer alive; dead references are pruned during `stop_listening`.

use std::collections::HashMap;
use std::sync::Weak;

use crate::core::observer::Shared;
use crate::ids::ContextId;

/// Map from a source observer's identity to a weak reference to it.
///
/// Created lazily on first cross-object listen; an entry exists iff this
/// observer currently has at least one active subscription placed on that
/// source through `listen_to`/`listen_to_once`.
#[derive(Default)]
pub(crate) struct ListenMap {
    sources: HashMap<ContextId, Weak<Shared>>,
}

impl ListenMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records (or refreshes) a tracked source.
    pub(crate) fn insert(&mut self, id: ContextId, source: Weak<Shared>) {
        self.sources.insert(id, source);
    }

    /// Snapshot of every tracked source, detached from the map so
    /// teardown can call into sources without holding the state lock.
    pub(crate) fn snapshot(&self) -> Vec<(ContextId, Weak<Shared>)> {
        self.sources
            .iter()
            .map(|(id, source)| (*id, source.clone()))
            .collect()
    }

    pub(crate) fn remove(&mut self, id: &ContextId) {
        self.sources.remove(id);
    }

    pub(crate) fn len(&self) -> usize {
        self.sources.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
