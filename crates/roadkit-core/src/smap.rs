//! Ordered map keyed by an s-coordinate
//!
//! Every profile of a road (tracks, sections, lane widths, road marks) is an
//! ordered sequence keyed by its start coordinate. Keys are `f64` wrapped in
//! [`OrderedFloat`] to obtain a total order. Exact key equality is relied
//! upon for removal and moves, so every key is canonicalized with
//! [`canonical_s`] before insertion and lookup; [`SMap::key_near`] offers the
//! tolerant lookup for coordinates that come from computation.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound::{Excluded, Included, Unbounded};

use ordered_float::OrderedFloat;
use serde::de::Deserializer;
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};

use crate::constants::NUMERICAL_ZERO6;

/// Snap an s-coordinate to zero when it lies within [`NUMERICAL_ZERO6`].
pub fn canonical_s(s: f64) -> f64 {
    if s.abs() < NUMERICAL_ZERO6 {
        0.0
    } else {
        s
    }
}

fn key(s: f64) -> OrderedFloat<f64> {
    OrderedFloat(canonical_s(s))
}

/// An ordered map from start coordinate to value.
#[derive(Clone, PartialEq)]
pub struct SMap<V> {
    entries: BTreeMap<OrderedFloat<f64>, V>,
}

impl<V> Default for SMap<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for SMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> SMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert `value` at `s`.
    ///
    /// The value is handed back when `s` is not a finite non-negative
    /// coordinate or when the key is already occupied.
    pub fn insert(&mut self, s: f64, value: V) -> Result<(), V> {
        let s = canonical_s(s);
        if !s.is_finite() || s < 0.0 {
            return Err(value);
        }
        match self.entries.entry(OrderedFloat(s)) {
            std::collections::btree_map::Entry::Occupied(_) => Err(value),
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }

    /// Remove the entry keyed exactly at `s`
    pub fn remove(&mut self, s: f64) -> Option<V> {
        self.entries.remove(&key(s))
    }

    /// Relocate the entry at `old_s` to `new_s`.
    ///
    /// Fails without touching the map when `old_s` is absent or `new_s`
    /// is occupied by another entry.
    pub fn move_key(&mut self, old_s: f64, new_s: f64) -> bool {
        let (old, new) = (key(old_s), key(new_s));
        if old == new {
            return self.entries.contains_key(&old);
        }
        if !new.0.is_finite() || new.0 < 0.0 || self.entries.contains_key(&new) {
            return false;
        }
        match self.entries.remove(&old) {
            Some(value) => {
                self.entries.insert(new, value);
                true
            }
            None => false,
        }
    }

    /// Whether an entry is keyed exactly at `s`
    pub fn contains_key(&self, s: f64) -> bool {
        self.entries.contains_key(&key(s))
    }

    /// Entry keyed exactly at `s`
    pub fn get(&self, s: f64) -> Option<&V> {
        self.entries.get(&key(s))
    }

    /// Mutable entry keyed exactly at `s`
    pub fn get_mut(&mut self, s: f64) -> Option<&mut V> {
        self.entries.get_mut(&key(s))
    }

    /// Key of the entry within [`NUMERICAL_ZERO6`] of `s`, if any
    pub fn key_near(&self, s: f64) -> Option<f64> {
        self.entries
            .range((
                Included(OrderedFloat(s - NUMERICAL_ZERO6)),
                Included(OrderedFloat(s + NUMERICAL_ZERO6)),
            ))
            .map(|(k, _)| k.0)
            .min_by(|a, b| (a - s).abs().total_cmp(&(b - s).abs()))
    }

    /// The entry with the greatest key `<= s` (the entry containing `s`)
    pub fn containing(&self, s: f64) -> Option<(f64, &V)> {
        self.entries
            .range((Unbounded, Included(key(s))))
            .next_back()
            .map(|(k, v)| (k.0, v))
    }

    /// Mutable variant of [`SMap::containing`]
    pub fn containing_mut(&mut self, s: f64) -> Option<(f64, &mut V)> {
        self.entries
            .range_mut((Unbounded, Included(key(s))))
            .next_back()
            .map(|(k, v)| (k.0, v))
    }

    /// The entry preceding the one containing `s`
    pub fn before(&self, s: f64) -> Option<(f64, &V)> {
        self.entries
            .range((Unbounded, Included(key(s))))
            .rev()
            .nth(1)
            .map(|(k, v)| (k.0, v))
    }

    /// The first entry with a key strictly greater than `s`
    pub fn next_after(&self, s: f64) -> Option<(f64, &V)> {
        self.entries
            .range((Excluded(key(s)), Unbounded))
            .next()
            .map(|(k, v)| (k.0, v))
    }

    /// End of the entry containing `s`: the next key, or `domain_end`
    pub fn end_of(&self, s: f64, domain_end: f64) -> f64 {
        self.next_after(s).map_or(domain_end, |(k, _)| k)
    }

    /// The entry with the smallest key
    pub fn first(&self) -> Option<(f64, &V)> {
        self.entries.iter().next().map(|(k, v)| (k.0, v))
    }

    /// The entry with the greatest key
    pub fn last(&self) -> Option<(f64, &V)> {
        self.entries.iter().next_back().map(|(k, v)| (k.0, v))
    }

    /// Mutable entry with the greatest key
    pub fn last_mut(&mut self) -> Option<(f64, &mut V)> {
        self.entries.iter_mut().next_back().map(|(k, v)| (k.0, v))
    }

    /// Iterate entries in ascending key order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (f64, &V)> + '_ {
        self.entries.iter().map(|(k, v)| (k.0, v))
    }

    /// Iterate entries mutably in ascending key order
    pub fn iter_mut(&mut self) -> impl DoubleEndedIterator<Item = (f64, &mut V)> + '_ {
        self.entries.iter_mut().map(|(k, v)| (k.0, v))
    }

    /// Iterate keys in ascending order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = f64> + '_ {
        self.entries.keys().map(|k| k.0)
    }

    /// Iterate values in ascending key order
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.entries.values()
    }

    /// Iterate values mutably in ascending key order
    pub fn values_mut(&mut self) -> impl DoubleEndedIterator<Item = &mut V> + '_ {
        self.entries.values_mut()
    }

    /// Entries with keys in `[from, to)`
    pub fn range(&self, from: f64, to: f64) -> impl DoubleEndedIterator<Item = (f64, &V)> + '_ {
        let from = key(from);
        let to = key(to).max(from);
        self.entries
            .range((Included(from), Excluded(to)))
            .map(|(k, v)| (k.0, v))
    }

    /// Remove all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Remove and return all entries in ascending order
    pub fn drain(&mut self) -> Vec<(f64, V)> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .map(|(k, v)| (k.0, v))
            .collect()
    }
}

impl<V> IntoIterator for SMap<V> {
    type Item = (f64, V);
    type IntoIter = std::iter::Map<
        std::collections::btree_map::IntoIter<OrderedFloat<f64>, V>,
        fn((OrderedFloat<f64>, V)) -> (f64, V),
    >;

    fn into_iter(self) -> Self::IntoIter {
        let unwrap_key: fn((OrderedFloat<f64>, V)) -> (f64, V) = |(k, v)| (k.0, v);
        self.entries.into_iter().map(unwrap_key)
    }
}

impl<V: Serialize> Serialize for SMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            seq.serialize_element(&(k.0, v))?;
        }
        seq.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for SMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let pairs = Vec::<(f64, V)>::deserialize(deserializer)?;
        let mut map = SMap::new();
        for (s, v) in pairs {
            if map.insert(s, v).is_err() {
                return Err(serde::de::Error::custom(format!(
                    "duplicate or invalid key s = {s}"
                )));
            }
        }
        Ok(map)
    }
}
