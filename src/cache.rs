//! Lazily built, explicitly invalidated cache slots.
//!
//! Every derived structure in a layer (visibility maps, prefix sums, inverse
//! orders) lives in a [`CacheSlot`]. A slot is either empty or holds a fully
//! built value behind an `Rc`; invalidation replaces it with `Empty`. Builds run
//! without any borrow of the slot held, so a query that re-enters the same slot
//! while a build is underway simply builds again and the first stored value
//! wins. Builds are deterministic, so both results are identical.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// Two-state cache contents.
#[derive(Debug)]
pub enum Cached<T> {
    Empty,
    Populated(Rc<T>),
}

/// A single lazily built value.
#[derive(Debug)]
pub struct CacheSlot<T> {
    state: RefCell<Cached<T>>,
}

impl<T> Default for CacheSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CacheSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            state: RefCell::new(Cached::Empty),
        }
    }

    /// Return the cached value, building it with `build` if the slot is empty.
    pub fn get_or_build(&self, build: impl FnOnce() -> T) -> Rc<T> {
        if let Some(value) = self.get() {
            return value;
        }
        let built = Rc::new(build());
        let mut state = self.state.borrow_mut();
        match &*state {
            // A re-entrant build stored first; keep it so callers share one value.
            Cached::Populated(existing) => Rc::clone(existing),
            Cached::Empty => {
                *state = Cached::Populated(Rc::clone(&built));
                built
            }
        }
    }

    /// The cached value, if populated.
    pub fn get(&self) -> Option<Rc<T>> {
        match &*self.state.borrow() {
            Cached::Populated(value) => Some(Rc::clone(value)),
            Cached::Empty => None,
        }
    }

    pub fn is_populated(&self) -> bool {
        matches!(&*self.state.borrow(), Cached::Populated(_))
    }

    /// Drop the cached value.
    pub fn invalidate(&self) {
        *self.state.borrow_mut() = Cached::Empty;
    }
}

/// Memoized per-key values, cleared as a whole on invalidation.
///
/// Used for lookups that are computed on demand one key at a time, where
/// building the full table up front would defeat the point.
#[derive(Debug)]
pub struct MemoMap<K: Hash + Eq, V: Copy> {
    entries: RefCell<HashMap<K, V>>,
}

impl<K: Hash + Eq, V: Copy> Default for MemoMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq, V: Copy> MemoMap<K, V> {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Look up `key`, computing and storing it with `compute` on a miss.
    pub fn get_or_compute(&self, key: K, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.entries.borrow().get(&key).copied() {
            return value;
        }
        let value = compute();
        self.entries.borrow_mut().entry(key).or_insert(value);
        value
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
