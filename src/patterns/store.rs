//! # Pattern-indexed subscriber store.
//!
//! [`PatternStore`] indexes entries by pattern and answers ranked match
//! queries against concrete names. It owns the ranking policy; the
//! dispatcher consumes the order it returns verbatim.
//!
//! ## Architecture
//! ```text
//! add(pattern, index, data)
//!     │
//!     ▼
//! ┌───────────────────────────────────────────────┐
//! │ buckets: storage key → { pattern, entries[] } │
//! └───────────────────────────────────────────────┘
//!     │                 │                  │
//!     ▼                 ▼                  ▼
//! remove_pattern   remove_where      ranked_matches(name)
//! (whole bucket)   (per-entry        (specificity desc,
//!                   predicate)        insertion index asc)
//! ```
//!
//! ## Rules
//! - Buckets are keyed by [`Pattern::storage_key`], so exact removal finds
//!   the same bucket an equal pattern was inserted under.
//! - Insertion indexes are assigned by the caller and never renumbered;
//!   ties in specificity resolve to the earliest-bound entry.
//! - The ranking is deterministic regardless of bucket iteration order.

use std::collections::HashMap;

use crate::patterns::pattern::{Name, Pattern};

/// One stored entry plus its insertion index.
struct Slot<T> {
    index: u64,
    data: T,
}

/// All entries stored under one pattern.
struct Bucket<T> {
    pattern: Pattern,
    slots: Vec<Slot<T>>,
}

/// A single ranked match returned by [`PatternStore::ranked_matches`].
#[derive(Debug)]
pub struct Ranked<'a, T> {
    /// The stored pattern that matched.
    pub pattern: &'a Pattern,
    /// Match specificity against the queried name.
    pub specificity: u32,
    /// Insertion index of the entry.
    pub index: u64,
    /// Caller data attached at insertion.
    pub data: &'a T,
}

/// Per-observable index from pattern to subscriber entries.
///
/// Generic over the entry payload so the matching engine stays independent
/// of subscription bookkeeping.
pub struct PatternStore<T> {
    buckets: HashMap<String, Bucket<T>>,
    len: usize,
}

impl<T> Default for PatternStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PatternStore<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            buckets: HashMap::new(),
            len: 0,
        }
    }

    /// Inserts `data` under `pattern` with the given insertion index.
    pub fn add(&mut self, pattern: Pattern, index: u64, data: T) {
        let bucket = self
            .buckets
            .entry(pattern.storage_key())
            .or_insert_with(|| Bucket {
                pattern,
                slots: Vec::new(),
            });
        bucket.slots.push(Slot { index, data });
        self.len += 1;
    }

    /// Removes every entry stored under the exact pattern.
    ///
    /// Returns the number of entries removed.
    pub fn remove_pattern(&mut self, pattern: &Pattern) -> usize {
        match self.buckets.remove(&pattern.storage_key()) {
            Some(bucket) => {
                self.len -= bucket.slots.len();
                bucket.slots.len()
            }
            None => 0,
        }
    }

    /// Removes entries matching `predicate`, scoped to one pattern's bucket
    /// when `scope` is given, across all buckets otherwise.
    ///
    /// Emptied buckets are dropped. Returns the number of entries removed.
    pub fn remove_where(
        &mut self,
        scope: Option<&Pattern>,
        mut predicate: impl FnMut(&T) -> bool,
    ) -> usize {
        let mut removed = 0;
        let mut emptied = Vec::new();

        match scope {
            Some(pattern) => {
                let key = pattern.storage_key();
                if let Some(bucket) = self.buckets.get_mut(&key) {
                    removed += drain_matching(bucket, &mut predicate);
                    if bucket.slots.is_empty() {
                        emptied.push(key);
                    }
                }
            }
            None => {
                for (key, bucket) in &mut self.buckets {
                    removed += drain_matching(bucket, &mut predicate);
                    if bucket.slots.is_empty() {
                        emptied.push(key.clone());
                    }
                }
            }
        }

        for key in emptied {
            self.buckets.remove(&key);
        }
        self.len -= removed;
        removed
    }

    /// Enumerates entries, scoped to one pattern's bucket when `scope` is
    /// given.
    pub fn entries(&self, scope: Option<&Pattern>) -> Vec<(&Pattern, u64, &T)> {
        match scope {
            Some(pattern) => match self.buckets.get(&pattern.storage_key()) {
                Some(bucket) => bucket
                    .slots
                    .iter()
                    .map(|slot| (&bucket.pattern, slot.index, &slot.data))
                    .collect(),
                None => Vec::new(),
            },
            None => self
                .buckets
                .values()
                .flat_map(|bucket| {
                    bucket
                        .slots
                        .iter()
                        .map(move |slot| (&bucket.pattern, slot.index, &slot.data))
                })
                .collect(),
        }
    }

    /// Returns every entry whose pattern matches `name`, ranked descending
    /// by specificity with ties broken ascending by insertion index.
    pub fn ranked_matches(&self, name: &Name) -> Vec<Ranked<'_, T>> {
        let mut matches: Vec<Ranked<'_, T>> = Vec::new();

        for bucket in self.buckets.values() {
            if let Some(specificity) = bucket.pattern.specificity_for(name) {
                for slot in &bucket.slots {
                    matches.push(Ranked {
                        pattern: &bucket.pattern,
                        specificity,
                        index: slot.index,
                        data: &slot.data,
                    });
                }
            }
        }

        matches.sort_by(|a, b| {
            b.specificity
                .cmp(&a.specificity)
                .then(a.index.cmp(&b.index))
        });
        matches
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn drain_matching<T>(bucket: &mut Bucket<T>, predicate: &mut impl FnMut(&T) -> bool) -> usize {
    let before = bucket.slots.len();
    bucket.slots.retain(|slot| !predicate(&slot.data));
    before - bucket.slots.len()
}
