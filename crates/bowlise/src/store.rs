//! Cache containers owned by the facade.
//!
//! Removals bump a counter: the catalog has one, and keyed lists have one
//! per key plus a container-wide one for `clear`. A fetch takes a snapshot
//! of the counters before it awaits the backend and stores its result only
//! if they are unchanged. That keeps a read racing a write to the same key
//! from re-inserting data the write just invalidated, while writes to other
//! keys leave it alone.

use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bowlise_core::{HasHandle, Result, SubjectTargetKey};

/// A backend fetch that several callers may await together.
pub(crate) type Pending<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Lock a cache container.
///
/// Every critical section leaves the maps consistent, so a poisoned lock is
/// still safe to use.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The global role or permission list, indexed by handle.
pub(crate) struct Catalog<T> {
    pub(crate) items: Vec<T>,
    pub(crate) pending: Option<Pending<Vec<T>>>,
    pub(crate) generation: u64,
}

impl<T: HasHandle> Catalog<T> {
    /// Replace the contents, collapsing repeated handles.
    pub(crate) fn fill(&mut self, items: Vec<T>) {
        self.items = index_by_handle(items);
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
        self.pending = None;
        self.generation += 1;
    }
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pending: None,
            generation: 0,
        }
    }
}

/// Counters a keyed fetch must find unchanged before it may store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Stamp {
    generation: u64,
    epoch: u64,
}

/// Per subject/target lists, including captured failures.
pub(crate) struct KeyedLists<T> {
    pub(crate) entries: HashMap<SubjectTargetKey, Result<Vec<T>>>,
    pub(crate) pending: HashMap<SubjectTargetKey, Pending<Vec<T>>>,
    epochs: HashMap<SubjectTargetKey, u64>,
    generation: u64,
}

impl<T: Clone> KeyedLists<T> {
    pub(crate) fn stamp(&self, key: &SubjectTargetKey) -> Stamp {
        Stamp {
            generation: self.generation,
            epoch: self.epochs.get(key).copied().unwrap_or(0),
        }
    }

    /// Store `result` for `key` unless the key was invalidated after `stamp`
    /// was taken.
    pub(crate) fn store(
        &mut self,
        key: SubjectTargetKey,
        stamp: Stamp,
        result: &Result<Vec<T>>,
    ) -> bool {
        if self.stamp(&key) != stamp {
            return false;
        }
        self.entries.insert(key, result.clone());
        true
    }

    /// Drop the entry and any pending fetch for `key`.
    pub(crate) fn remove(&mut self, key: &SubjectTargetKey) -> bool {
        self.pending.remove(key);
        *self.epochs.entry(key.clone()).or_insert(0) += 1;
        self.entries.remove(key).is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.pending.clear();
        self.epochs.clear();
        self.generation += 1;
    }
}

impl<T> Default for KeyedLists<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            pending: HashMap::new(),
            epochs: HashMap::new(),
            generation: 0,
        }
    }
}

/// Deduplicate by handle, keeping first-seen position and last-seen value.
pub(crate) fn index_by_handle<T: HasHandle>(items: Vec<T>) -> Vec<T> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(items.len());
    let mut indexed: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        match positions.get(item.handle()) {
            Some(&i) => indexed[i] = item,
            None => {
                positions.insert(item.handle().to_string(), indexed.len());
                indexed.push(item);
            }
        }
    }

    indexed
}
