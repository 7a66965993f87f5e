//! Persistent ordered key-value mapping.
//!
//! [`OrderedMap`] stores `(key, value)` pairs in an [`OrderedCollection`]
//! ordered by key only. Setting a key that is already present replaces its
//! value through the collection's upsert semantics. All structural work is
//! delegated to the collection.
//!
//! # Examples
//!
//! ```rust
//! use persistent_llrb::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.set(3, "three").unwrap();
//! map.set(1, "one").unwrap();
//! map.set(3, "THREE").unwrap();
//!
//! assert_eq!(map.get(&3), Ok(Some(&"THREE")));
//! assert_eq!(map.get(&2), Ok(None));
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![1, 3]);
//! ```

use super::comparator::ByFirst;
use super::llrb::{IntoIter, Iter, TreeStats};
use super::ordered_collection::OrderedCollection;
use crate::error::{InvariantViolation, TreeError};
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{FromIterator, FusedIterator};

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// A persistent map ordered by key.
///
/// Cloning is O(1); the clone is a snapshot unaffected by later mutations of
/// either copy.
///
/// # Examples
///
/// ```rust
/// use persistent_llrb::{OrderedMap, TreeError};
///
/// let mut map: OrderedMap<String, i32> = OrderedMap::new();
/// map.set("apple".to_string(), 3).unwrap();
/// let snapshot = map.clone();
///
/// assert_eq!(map.delete("apple"), Ok(3));
/// assert_eq!(map.delete("apple"), Err(TreeError::KeyNotFound));
/// assert_eq!(snapshot.get("apple"), Ok(Some(&3)));
/// ```
pub struct OrderedMap<K, V> {
    entries: OrderedCollection<(K, V), ByFirst>,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: OrderedCollection::with_comparator(ByFirst),
        }
    }

    /// Returns `true` if the map holds no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Counts the entries. O(N).
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries.size()
    }

    /// Returns an iterator over entries in ascending key order.
    #[must_use]
    pub fn iter(&self) -> OrderedMapIterator<'_, K, V> {
        OrderedMapIterator {
            inner: self.entries.iter(),
        }
    }

    /// Returns an iterator over keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in key order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Returns the entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entries.min().map(|(key, value)| (key, value))
    }

    /// Returns the entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entries.max().map(|(key, value)| (key, value))
    }

    /// Returns `true` if both maps are the same version of the tree.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.entries.ptr_eq(&other.entries)
    }
}

impl<K: PartialOrd, V> OrderedMap<K, V> {
    /// Returns the value stored under `key`.
    ///
    /// The key may be any borrowed form of the map's key type, but the
    /// ordering on the borrowed form must match the ordering on the key type.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`] if `key` cannot be ordered against a
    /// stored key.
    pub fn get<Q>(&self, key: &Q) -> Result<Option<&V>, TreeError>
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.entries
            .find_by(&|(stored, _): &(K, V)| key.partial_cmp(stored.borrow()))
            .map(|found| found.map(|(_, value)| value))
    }

    /// Returns `true` if a value is stored under `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`] as for [`get`](Self::get).
    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool, TreeError>
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.get(key).map(|found| found.is_some())
    }

    /// Checks the tree invariants of the underlying collection.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<TreeStats, InvariantViolation> {
        self.entries.validate()
    }
}

impl<K: PartialOrd + Clone, V: Clone> OrderedMap<K, V> {
    /// Builds a map from `pairs`; later pairs overwrite earlier ones.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`] if two keys cannot be ordered.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        OrderedCollection::from_items(pairs, ByFirst).map(|entries| Self { entries })
    }

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`]; the map is left unchanged.
    pub fn set(&mut self, key: K, value: V) -> Result<(), TreeError> {
        self.entries.add((key, value))
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// [`TreeError::KeyNotFound`] if `key` is absent,
    /// [`TreeError::InvalidComparator`] if it cannot be ordered.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q>,
        Q: PartialOrd + ?Sized,
    {
        self.entries
            .discard_by(&|(stored, _): &(K, V)| key.partial_cmp(stored.borrow()))
            .map(|(_, value)| value)
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty.
    pub fn pop_min(&mut self) -> Result<(K, V), TreeError> {
        self.entries.pop_min()
    }

    /// Removes and returns the entry with the largest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the map is empty.
    pub fn pop_max(&mut self) -> Result<(K, V), TreeError> {
        self.entries.pop_max()
    }

    /// Returns an O(1) copy of the current version.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of an [`OrderedMap`] in ascending key order.
pub struct OrderedMapIterator<'a, K, V> {
    inner: Iter<'a, (K, V)>,
}

impl<'a, K, V> Iterator for OrderedMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (key, value))
    }
}

impl<K, V> FusedIterator for OrderedMapIterator<'_, K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + Clone, V: Clone> FromIterator<(K, V)> for OrderedMap<K, V> {
    /// # Panics
    ///
    /// Panics if the `PartialOrd` implementation of a key returns `None`
    /// while its `Ord` implementation claims a total order.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord + Clone, V: Clone> Extend<(K, V)> for OrderedMap<K, V> {
    /// # Panics
    ///
    /// Panics if the `PartialOrd` implementation of a key returns `None`
    /// while its `Ord` implementation claims a total order.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            // A total order never yields an incomparable pair.
            if let Err(error) = self.set(key, value) {
                unreachable!("totally ordered key rejected: {error}");
            }
        }
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = OrderedMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone, V: Clone> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: Hash, V: Hash> Hash for OrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entries.hash(state);
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for OrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for (key, value) in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K: serde::Serialize, V: serde::Serialize> serde::Serialize for OrderedMap<K, V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.size()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<K, V> {
    key_marker: std::marker::PhantomData<K>,
    value_marker: std::marker::PhantomData<V>,
}

#[cfg(feature = "serde")]
impl<K, V> OrderedMapVisitor<K, V> {
    const fn new() -> Self {
        Self {
            key_marker: std::marker::PhantomData,
            value_marker: std::marker::PhantomData,
        }
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::de::Visitor<'de> for OrderedMapVisitor<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    type Value = OrderedMap<K, V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        use serde::de::Error;
        let mut map = OrderedMap::new();
        while let Some((key, value)) = access.next_entry()? {
            map.set(key, value).map_err(A::Error::custom)?;
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V> serde::Deserialize<'de> for OrderedMap<K, V>
where
    K: serde::Deserialize<'de> + Clone + Ord,
    V: serde::Deserialize<'de> + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor::new())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn numbers() -> OrderedMap<i32, String> {
        [(3, "three"), (1, "one"), (2, "two")]
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect()
    }

    #[rstest]
    fn test_display_sorted_by_key() {
        assert_eq!(format!("{}", numbers()), "{1: one, 2: two, 3: three}");
    }

    #[rstest]
    fn test_debug_sorted_by_key() {
        assert_eq!(
            format!("{:?}", numbers()),
            r#"{1: "one", 2: "two", 3: "three"}"#
        );
    }

    #[rstest]
    fn test_set_overwrites_without_growing() {
        let mut map = numbers();
        map.set(2, "TWO".to_string()).unwrap();
        assert_eq!(map.size(), 3);
        assert_eq!(map.get(&2), Ok(Some(&"TWO".to_string())));
    }

    #[rstest]
    fn test_get_absent_is_not_an_error_but_delete_is() {
        let mut map = numbers();
        assert_eq!(map.get(&9), Ok(None));
        assert_eq!(map.delete(&9), Err(TreeError::KeyNotFound));
        assert_eq!(map.size(), 3);
    }

    #[rstest]
    fn test_delete_returns_value() {
        let mut map = numbers();
        assert_eq!(map.delete(&1), Ok("one".to_string()));
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert!(map.validate().is_ok());
    }

    #[rstest]
    fn test_borrowed_key_lookup() {
        let mut map: OrderedMap<String, i32> = OrderedMap::new();
        map.set("b".to_string(), 2).unwrap();
        map.set("a".to_string(), 1).unwrap();
        assert_eq!(map.get("a"), Ok(Some(&1)));
        assert_eq!(map.contains_key("c"), Ok(false));
        assert_eq!(map.delete("b"), Ok(2));
    }

    #[rstest]
    fn test_extremes() {
        let mut map = numbers();
        assert_eq!(map.first_key_value(), Some((&1, &"one".to_string())));
        assert_eq!(map.last_key_value(), Some((&3, &"three".to_string())));
        assert_eq!(map.pop_min(), Ok((1, "one".to_string())));
        assert_eq!(map.pop_max(), Ok((3, "three".to_string())));
        assert_eq!(map.values().cloned().collect::<Vec<_>>(), vec!["two"]);
    }

    #[rstest]
    fn test_incomparable_key() {
        let mut map = OrderedMap::new();
        map.set(1.0, 'a').unwrap();
        assert_eq!(map.set(f64::NAN, 'b'), Err(TreeError::InvalidComparator));
        assert_eq!(map.get(&f64::NAN), Err(TreeError::InvalidComparator));
        assert_eq!(map.size(), 1);
    }

    #[rstest]
    fn test_from_pairs_last_write_wins() {
        let map = OrderedMap::from_pairs([(1, 'a'), (2, 'b'), (1, 'c')]).unwrap();
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&1, &'c'), (&2, &'b')]);
    }
}
