// ember-value - Persistent maps
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Persistent maps with three storage strategies.
//!
//! - **Array map**: a flat vector of pairs kept in insertion order with
//!   linear lookup. Every map starts here.
//! - **Hash map**: a HAMT, used once the entry count exceeds
//!   [`ARRAY_MAP_THRESHOLD`]. The switch happens on the insert that crosses
//!   the threshold and is never undone, even if entries are later removed.
//! - **Sorted map**: entries kept in comparator order with binary search.
//!
//! The strategy is invisible to `=` and hashing: maps with the same entries
//! are equal whatever their storage.
//!
//! The in-place `*_mut` methods are what transients use. Storage is shared
//! between clones and copied on the first write, so mutating a map obtained
//! by cloning never affects the original.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::compare::{self, equiv};
use crate::error::Result;
use crate::value::{Tag, Value};

/// Largest entry count stored as an array map.
pub const ARRAY_MAP_THRESHOLD: usize = 8;

/// Signature of a sort comparator.
pub type CompareFn = dyn Fn(&Value, &Value) -> Result<Ordering> + Send + Sync;

/// Ordering used by sorted maps and sets.
#[derive(Clone, Default)]
pub struct Comparator {
    func: Option<Arc<CompareFn>>,
}

impl Comparator {
    /// The natural ordering, Clojure `compare`.
    pub fn natural() -> Self {
        Comparator { func: None }
    }

    /// A custom ordering.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Ordering> + Send + Sync + 'static,
    {
        Comparator {
            func: Some(Arc::new(func)),
        }
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Result<Ordering> {
        match &self.func {
            Some(func) => func(a, b),
            None => compare::compare(a, b),
        }
    }

    /// Binary search over a sorted sequence, with a fallible comparator.
    pub(crate) fn search<T>(
        &self,
        items: &im::Vector<T>,
        key: &Value,
        key_of: impl Fn(&T) -> &Value,
    ) -> Result<std::result::Result<usize, usize>>
    where
        T: Clone,
    {
        let (mut lo, mut hi) = (0, items.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.compare(key_of(&items[mid]), key)? {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(Ok(mid)),
            }
        }
        Ok(Err(lo))
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.func {
            Some(_) => write!(f, "Comparator(custom)"),
            None => write!(f, "Comparator(natural)"),
        }
    }
}

#[derive(Clone)]
enum MapRepr {
    Array(Arc<Vec<(Value, Value)>>),
    Hash(im::HashMap<Value, Value>),
    Sorted {
        entries: im::Vector<(Value, Value)>,
        comparator: Comparator,
    },
}

/// An immutable map.
#[derive(Clone)]
pub struct PersistentMap {
    repr: MapRepr,
}

impl Default for PersistentMap {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistentMap {
    /// An empty array map.
    pub fn new() -> Self {
        PersistentMap {
            repr: MapRepr::Array(Arc::new(Vec::new())),
        }
    }

    /// An empty sorted map.
    pub fn sorted(comparator: Comparator) -> Self {
        PersistentMap {
            repr: MapRepr::Sorted {
                entries: im::Vector::new(),
                comparator,
            },
        }
    }

    /// Build from pairs; later pairs replace earlier ones with equal keys.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> Self {
        let mut map = PersistentMap::new();
        for (k, v) in pairs {
            map.insert_unsorted(k, v);
        }
        map
    }

    /// An empty map with the same ordering as this one.
    pub fn empty(&self) -> Self {
        match &self.repr {
            MapRepr::Sorted { comparator, .. } => PersistentMap::sorted(comparator.clone()),
            _ => PersistentMap::new(),
        }
    }

    pub fn tag(&self) -> Tag {
        match self.repr {
            MapRepr::Array(_) => Tag::ArrayMap,
            MapRepr::Hash(_) => Tag::HashMap,
            MapRepr::Sorted { .. } => Tag::SortedMap,
        }
    }

    pub fn is_sorted(&self) -> bool {
        matches!(self.repr, MapRepr::Sorted { .. })
    }

    pub fn comparator(&self) -> Option<&Comparator> {
        match &self.repr {
            MapRepr::Sorted { comparator, .. } => Some(comparator),
            _ => None,
        }
    }

    pub fn count(&self) -> usize {
        match &self.repr {
            MapRepr::Array(entries) => entries.len(),
            MapRepr::Hash(map) => map.len(),
            MapRepr::Sorted { entries, .. } => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Look up the stored entry for `key`.
    pub fn get_entry(&self, key: &Value) -> Result<Option<(&Value, &Value)>> {
        Ok(match &self.repr {
            MapRepr::Array(entries) => entries.iter().find(|(k, _)| k == key).map(|(k, v)| (k, v)),
            MapRepr::Hash(map) => map.get_key_value(key),
            MapRepr::Sorted {
                entries,
                comparator,
            } => match comparator.search(entries, key, |(k, _)| k)? {
                Ok(i) => entries.get(i).map(|(k, v)| (k, v)),
                Err(_) => None,
            },
        })
    }

    pub fn get(&self, key: &Value) -> Result<Option<&Value>> {
        Ok(self.get_entry(key)?.map(|(_, v)| v))
    }

    pub fn contains_key(&self, key: &Value) -> Result<bool> {
        Ok(self.get_entry(key)?.is_some())
    }

    pub fn assoc(&self, key: Value, value: Value) -> Result<PersistentMap> {
        let mut next = self.clone();
        next.assoc_mut(key, value)?;
        Ok(next)
    }

    pub fn assoc_mut(&mut self, key: Value, value: Value) -> Result<()> {
        if let MapRepr::Sorted {
            entries,
            comparator,
        } = &mut self.repr
        {
            match comparator.search(entries, &key, |(k, _)| k)? {
                Ok(i) => {
                    entries.set(i, (key, value));
                }
                Err(i) => entries.insert(i, (key, value)),
            }
            return Ok(());
        }
        self.insert_unsorted(key, value);
        Ok(())
    }

    fn insert_unsorted(&mut self, key: Value, value: Value) {
        match &mut self.repr {
            MapRepr::Array(entries) => {
                let entries = Arc::make_mut(entries);
                if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                    return;
                }
                entries.push((key, value));
                if entries.len() > ARRAY_MAP_THRESHOLD {
                    trace!(count = entries.len(), "promoting array map to hash map");
                    let promoted: im::HashMap<Value, Value> = entries.drain(..).collect();
                    self.repr = MapRepr::Hash(promoted);
                }
            }
            MapRepr::Hash(map) => {
                map.insert(key, value);
            }
            MapRepr::Sorted { .. } => {}
        }
    }

    pub fn dissoc(&self, key: &Value) -> Result<PersistentMap> {
        if !self.contains_key(key)? {
            return Ok(self.clone());
        }
        let mut next = self.clone();
        next.dissoc_mut(key)?;
        Ok(next)
    }

    pub fn dissoc_mut(&mut self, key: &Value) -> Result<()> {
        match &mut self.repr {
            MapRepr::Array(entries) => {
                if let Some(pos) = entries.iter().position(|(k, _)| k == key) {
                    Arc::make_mut(entries).remove(pos);
                }
            }
            MapRepr::Hash(map) => {
                map.remove(key);
            }
            MapRepr::Sorted {
                entries,
                comparator,
            } => {
                if let Ok(i) = comparator.search(entries, key, |(k, _)| k)? {
                    entries.remove(i);
                }
            }
        }
        Ok(())
    }

    /// Entries of `other` assoc'd onto this map.
    pub fn merge(&self, other: &PersistentMap) -> Result<PersistentMap> {
        let mut next = self.clone();
        for (k, v) in other.iter() {
            next.assoc_mut(k.clone(), v.clone())?;
        }
        Ok(next)
    }

    pub fn iter(&self) -> MapIter<'_> {
        match &self.repr {
            MapRepr::Array(entries) => MapIter::Array(entries.iter()),
            MapRepr::Hash(map) => MapIter::Hash(map.iter()),
            MapRepr::Sorted { entries, .. } => MapIter::Sorted(entries.iter()),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|(k, _)| k)
    }

    pub fn vals(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|(_, v)| v)
    }

    pub fn ptr_eq(&self, other: &PersistentMap) -> bool {
        match (&self.repr, &other.repr) {
            (MapRepr::Array(a), MapRepr::Array(b)) => Arc::ptr_eq(a, b),
            (MapRepr::Hash(a), MapRepr::Hash(b)) => a.ptr_eq(b),
            (MapRepr::Sorted { entries: a, .. }, MapRepr::Sorted { entries: b, .. }) => {
                a.ptr_eq(b)
            }
            _ => false,
        }
    }

    /// Entry-wise equality, independent of storage strategy.
    pub fn equiv(&self, other: &PersistentMap) -> Result<bool> {
        if self.count() != other.count() {
            return Ok(false);
        }
        // Probe the unsorted side so a custom comparator only sees its own keys
        if self.is_sorted() && !other.is_sorted() {
            return other.equiv(self);
        }
        for (k, v) in self.iter() {
            match other.get(k)? {
                Some(ov) if equiv(v, ov)? => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }
}

/// Iterator over map entries in storage order.
pub enum MapIter<'a> {
    Array(std::slice::Iter<'a, (Value, Value)>),
    Hash(im::hashmap::Iter<'a, Value, Value>),
    Sorted(im::vector::Iter<'a, (Value, Value)>),
}

impl<'a> Iterator for MapIter<'a> {
    type Item = (&'a Value, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            MapIter::Array(it) => it.next().map(|(k, v)| (k, v)),
            MapIter::Hash(it) => it.next(),
            MapIter::Sorted(it) => it.next().map(|(k, v)| (k, v)),
        }
    }
}

impl FromIterator<(Value, Value)> for PersistentMap {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        PersistentMap::from_pairs(iter)
    }
}
