//! Persistent ordered collection of uniquely keyed payloads.
//!
//! This module provides [`OrderedCollection`], an ordered set backed by a
//! persistent left-leaning red-black tree.
//!
//! # Overview
//!
//! The collection owns a root link and a [`Comparator`] fixed at
//! construction. Every mutation computes a new root from the old one and
//! swaps it in; nodes the mutation did not touch are shared between the old
//! and the new version. Cloning a collection is O(1) and yields an
//! independent snapshot.
//!
//! Payloads whose keys compare equal are the same entry: [`add`] replaces
//! the stored payload instead of adding a second one.
//!
//! - O(log N) `add`, `discard`, `find`, `contains`, `pop_min`, `pop_max`
//! - O(log N) `min`/`max`
//! - O(N) `size` (not cached) and full iteration
//! - O(1) `is_empty` and `snapshot`
//!
//! Lookups are tolerant and removals are strict: [`find`] on an absent key
//! returns `Ok(None)` while [`discard`] returns [`TreeError::KeyNotFound`].
//!
//! [`add`]: OrderedCollection::add
//! [`find`]: OrderedCollection::find
//! [`discard`]: OrderedCollection::discard
//!
//! # Examples
//!
//! ```rust
//! use persistent_llrb::OrderedCollection;
//!
//! let mut collection: OrderedCollection<i32> = [5, 3, 8, 1, 4].into_iter().collect();
//! let before = collection.snapshot();
//!
//! collection.discard(&3).unwrap();
//! assert_eq!(collection.pop_min(), Ok(1));
//! assert_eq!(collection.pop_max(), Ok(8));
//!
//! assert_eq!(collection.iter().copied().collect::<Vec<_>>(), vec![4, 5]);
//! assert_eq!(before.iter().copied().collect::<Vec<_>>(), vec![1, 3, 4, 5, 8]);
//! ```

use super::comparator::{Comparator, Natural};
use super::llrb::{IntoIter, Iter, Tree, TreeStats};
use crate::error::{InvariantViolation, TreeError};
use log::{debug, trace};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

// =============================================================================
// OrderedCollection Definition
// =============================================================================

/// A persistent ordered collection of uniquely keyed payloads.
///
/// # Time Complexity
///
/// | Operation            | Complexity |
/// |----------------------|------------|
/// | `new`                | O(1)       |
/// | `add`                | O(log N)   |
/// | `discard`            | O(log N)   |
/// | `find` / `contains`  | O(log N)   |
/// | `pop_min`/`pop_max`  | O(log N)   |
/// | `min`/`max`          | O(log N)   |
/// | `size`               | O(N)       |
/// | `is_empty`           | O(1)       |
/// | `snapshot`/`clone`   | O(1)       |
///
/// # Examples
///
/// ```rust
/// use persistent_llrb::{OrderedCollection, TreeError};
///
/// let mut collection = OrderedCollection::new();
/// collection.add(2).unwrap();
/// collection.add(1).unwrap();
/// collection.add(2).unwrap();
///
/// assert_eq!(collection.size(), 2);
/// assert_eq!(collection.find(&2), Ok(Some(&2)));
/// assert_eq!(collection.find(&3), Ok(None));
/// assert_eq!(collection.discard(&3), Err(TreeError::KeyNotFound));
/// ```
pub struct OrderedCollection<T, C = Natural> {
    root: Tree<T>,
    comparator: C,
}

impl<T> OrderedCollection<T, Natural> {
    /// Creates an empty collection that compares payloads directly.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_llrb::OrderedCollection;
    ///
    /// let collection: OrderedCollection<i32> = OrderedCollection::new();
    /// assert!(collection.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<T, C> OrderedCollection<T, C> {
    /// Creates an empty collection ordered by `comparator`.
    #[inline]
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            root: Tree::Empty,
            comparator,
        }
    }

    /// Returns the comparator captured at construction.
    #[inline]
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns `true` if the collection holds no payloads.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Counts the stored payloads by walking the whole tree.
    ///
    /// # Complexity
    ///
    /// O(N)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_llrb::OrderedCollection;
    ///
    /// let collection: OrderedCollection<i32> = (0..10).collect();
    /// assert_eq!(collection.size(), 10);
    /// ```
    #[must_use]
    pub fn size(&self) -> usize {
        self.root.count()
    }

    /// Returns an ascending iterator over the current version.
    ///
    /// Each call starts a fresh traversal from the current root.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T> {
        self.root.iter()
    }

    /// Returns the smallest payload.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.root.min()
    }

    /// Returns the largest payload.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.root.max()
    }

    /// Returns `true` if both collections are the same version of the tree.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.root.ptr_eq(&other.root)
    }
}

impl<T, C: Comparator<T>> OrderedCollection<T, C> {
    /// Returns the stored payload whose key equals `value`'s key.
    ///
    /// An absent key is not an error.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`] if the comparator cannot order `value`
    /// against a stored payload.
    pub fn find(&self, value: &T) -> Result<Option<&T>, TreeError> {
        self.find_by(&|stored: &T| self.comparator.compare(value, stored))
    }

    /// Returns `true` if a payload with `value`'s key is stored.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`] as for [`find`](Self::find).
    pub fn contains(&self, value: &T) -> Result<bool, TreeError> {
        self.find(value).map(|found| found.is_some())
    }

    /// Checks the ordering, red-link and black-balance invariants.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found.
    pub fn validate(&self) -> Result<TreeStats, InvariantViolation> {
        self.root
            .validate(|left: &T, right: &T| self.comparator.compare(left, right))
    }

    pub(crate) fn find_by<P>(&self, probe: &P) -> Result<Option<&T>, TreeError>
    where
        P: Fn(&T) -> Option<Ordering>,
    {
        self.root
            .find(probe)
            .inspect_err(|error| debug!("lookup failed: {error}"))
    }
}

impl<T: Clone, C: Comparator<T>> OrderedCollection<T, C> {
    /// Builds a collection from `items` ordered by `comparator`.
    ///
    /// Later items replace earlier ones with an equal key.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`] if two items cannot be ordered.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_llrb::OrderedCollection;
    /// use persistent_llrb::persistent::ByKey;
    ///
    /// let words = ["pear", "fig", "banana", "kiwi"].map(String::from);
    /// let by_length = OrderedCollection::from_items(words, ByKey::new(|word: &String| word.len())).unwrap();
    ///
    /// let sorted: Vec<&str> = by_length.iter().map(String::as_str).collect();
    /// assert_eq!(sorted, vec!["fig", "kiwi", "banana"]);
    /// ```
    pub fn from_items<I>(items: I, comparator: C) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut collection = Self::with_comparator(comparator);
        for item in items {
            collection.add(item)?;
        }
        Ok(collection)
    }

    /// Returns an O(1) copy of the current version.
    ///
    /// Later mutations of either copy leave the other untouched.
    #[must_use]
    pub fn snapshot(&self) -> Self
    where
        C: Clone,
    {
        self.clone()
    }

    /// Inserts `value`, replacing the stored payload with an equal key.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidComparator`]; the collection is left unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use persistent_llrb::OrderedCollection;
    /// use persistent_llrb::persistent::ByFirst;
    ///
    /// let mut collection = OrderedCollection::with_comparator(ByFirst);
    /// collection.add((1, "one")).unwrap();
    /// collection.add((1, "uno")).unwrap();
    ///
    /// assert_eq!(collection.size(), 1);
    /// assert_eq!(collection.find(&(1, "")), Ok(Some(&(1, "uno"))));
    /// ```
    pub fn add(&mut self, value: T) -> Result<(), TreeError> {
        self.root = self
            .root
            .clone()
            .inserted(value, &self.comparator)
            .inspect_err(|error| debug!("add rejected: {error}"))?;
        trace!("add: root replaced");
        Ok(())
    }

    /// Removes and returns the stored payload whose key equals `value`'s key.
    ///
    /// # Errors
    ///
    /// [`TreeError::KeyNotFound`] if no such payload is stored (always the
    /// case for an empty collection), [`TreeError::InvalidComparator`] if the
    /// comparator fails. The collection is left unchanged on error.
    pub fn discard(&mut self, value: &T) -> Result<T, TreeError> {
        let comparator = &self.comparator;
        remove_matching(&mut self.root, &|stored: &T| {
            comparator.compare(value, stored)
        })
    }

    /// Removes and returns the smallest payload.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the collection is empty.
    pub fn pop_min(&mut self) -> Result<T, TreeError> {
        let (root, removed) = self
            .root
            .clone()
            .without_min()
            .inspect_err(|error| debug!("pop_min rejected: {error}"))?;
        self.root = root;
        trace!("pop_min: root replaced");
        Ok(removed)
    }

    /// Removes and returns the largest payload.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyCollection`] if the collection is empty.
    pub fn pop_max(&mut self) -> Result<T, TreeError> {
        let (root, removed) = self
            .root
            .clone()
            .without_max()
            .inspect_err(|error| debug!("pop_max rejected: {error}"))?;
        self.root = root;
        trace!("pop_max: root replaced");
        Ok(removed)
    }

    pub(crate) fn discard_by<P>(&mut self, probe: &P) -> Result<T, TreeError>
    where
        P: Fn(&T) -> Option<Ordering>,
    {
        remove_matching(&mut self.root, probe)
    }
}

/// Swaps `root` for a version without the payload `probe` matches.
fn remove_matching<T, P>(root: &mut Tree<T>, probe: &P) -> Result<T, TreeError>
where
    T: Clone,
    P: Fn(&T) -> Option<Ordering>,
{
    if root.find(probe)?.is_none() {
        debug!("discard rejected: {}", TreeError::KeyNotFound);
        return Err(TreeError::KeyNotFound);
    }
    let (next, removed) = root
        .clone()
        .removed(probe)
        .inspect_err(|error| debug!("discard rejected: {error}"))?;
    *root = next;
    trace!("discard: root replaced");
    Ok(removed)
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T, C: Clone> Clone for OrderedCollection<T, C> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            comparator: self.comparator.clone(),
        }
    }
}

impl<T, C: Default> Default for OrderedCollection<T, C> {
    #[inline]
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: Clone + Ord> FromIterator<T> for OrderedCollection<T, Natural> {
    /// # Panics
    ///
    /// Panics if the `PartialOrd` implementation of a payload returns `None`
    /// while its `Ord` implementation claims a total order.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        collection.extend(iter);
        collection
    }
}

impl<T: Clone + Ord> Extend<T> for OrderedCollection<T, Natural> {
    /// # Panics
    ///
    /// Panics if the `PartialOrd` implementation of a payload returns `None`
    /// while its `Ord` implementation claims a total order.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            // A total order never yields an incomparable pair.
            if let Err(error) = self.add(value) {
                unreachable!("totally ordered payload rejected: {error}");
            }
        }
    }
}

impl<'a, T, C> IntoIterator for &'a OrderedCollection<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone, C> IntoIterator for OrderedCollection<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.root)
    }
}

impl<T: PartialEq, C> PartialEq for OrderedCollection<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.iter().eq(other.iter())
    }
}

impl<T: Eq, C> Eq for OrderedCollection<T, C> {}

/// Hashes the payload count followed by every payload in ascending order,
/// so equal collections hash equally regardless of insertion order.
impl<T: Hash, C> Hash for OrderedCollection<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.size().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for OrderedCollection<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

impl<T: fmt::Display, C> fmt::Display for OrderedCollection<T, C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for value in self {
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<T: serde::Serialize, C> serde::Serialize for OrderedCollection<T, C> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut sequence = serializer.serialize_seq(Some(self.size()))?;
        for value in self {
            sequence.serialize_element(value)?;
        }
        sequence.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedCollectionVisitor<T> {
    marker: std::marker::PhantomData<T>,
}

#[cfg(feature = "serde")]
impl<'de, T> serde::de::Visitor<'de> for OrderedCollectionVisitor<T>
where
    T: serde::Deserialize<'de> + Clone + Ord,
{
    type Value = OrderedCollection<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        use serde::de::Error;
        let mut collection = OrderedCollection::new();
        while let Some(value) = access.next_element()? {
            collection.add(value).map_err(A::Error::custom)?;
        }
        Ok(collection)
    }
}

#[cfg(feature = "serde")]
impl<'de, T> serde::Deserialize<'de> for OrderedCollection<T>
where
    T: serde::Deserialize<'de> + Clone + Ord,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(OrderedCollectionVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistent::comparator::{ByFirst, ByKey};
    use rstest::{fixture, rstest};

    #[fixture]
    fn scenario() -> OrderedCollection<i32> {
        [5, 3, 8, 1, 4].into_iter().collect()
    }

    fn contents(collection: &OrderedCollection<i32>) -> Vec<i32> {
        collection.iter().copied().collect()
    }

    // =========================================================================
    // Display Tests
    // =========================================================================

    #[rstest]
    fn test_display_empty_collection() {
        let collection: OrderedCollection<i32> = OrderedCollection::new();
        assert_eq!(format!("{collection}"), "{}");
    }

    #[rstest]
    fn test_display_sorted(scenario: OrderedCollection<i32>) {
        assert_eq!(format!("{scenario}"), "{1, 3, 4, 5, 8}");
        assert_eq!(format!("{scenario:?}"), "{1, 3, 4, 5, 8}");
    }

    // =========================================================================
    // Scenario Tests
    // =========================================================================

    #[rstest]
    fn test_concrete_scenario(mut scenario: OrderedCollection<i32>) {
        assert_eq!(contents(&scenario), vec![1, 3, 4, 5, 8]);

        assert_eq!(scenario.discard(&3), Ok(3));
        assert_eq!(contents(&scenario), vec![1, 4, 5, 8]);

        assert_eq!(scenario.pop_min(), Ok(1));
        assert_eq!(contents(&scenario), vec![4, 5, 8]);

        assert_eq!(scenario.pop_max(), Ok(8));
        assert_eq!(contents(&scenario), vec![4, 5]);
        assert!(scenario.validate().is_ok());
    }

    #[rstest]
    fn test_lookup_is_tolerant_removal_is_strict(mut scenario: OrderedCollection<i32>) {
        assert_eq!(scenario.find(&7), Ok(None));
        assert_eq!(scenario.contains(&7), Ok(false));
        assert_eq!(scenario.discard(&7), Err(TreeError::KeyNotFound));
        assert_eq!(contents(&scenario), vec![1, 3, 4, 5, 8]);
    }

    #[rstest]
    fn test_empty_collection_errors() {
        let mut collection: OrderedCollection<i32> = OrderedCollection::new();
        assert_eq!(collection.discard(&1), Err(TreeError::KeyNotFound));
        assert_eq!(collection.pop_min(), Err(TreeError::EmptyCollection));
        assert_eq!(collection.pop_max(), Err(TreeError::EmptyCollection));
        assert_eq!(collection.min(), None);
        assert_eq!(collection.max(), None);
    }

    // =========================================================================
    // Comparator Tests
    // =========================================================================

    #[rstest]
    fn test_invalid_comparator_leaves_collection_unchanged() {
        let mut collection = OrderedCollection::new();
        collection.add(1.0).unwrap();
        collection.add(2.0).unwrap();

        assert_eq!(collection.add(f64::NAN), Err(TreeError::InvalidComparator));
        assert_eq!(collection.find(&f64::NAN), Err(TreeError::InvalidComparator));
        assert_eq!(
            collection.discard(&f64::NAN),
            Err(TreeError::InvalidComparator)
        );
        assert_eq!(collection.size(), 2);
    }

    #[rstest]
    fn test_key_function_upserts_by_key() {
        let mut collection = OrderedCollection::with_comparator(ByKey::new(|pair: &(i32, char)| pair.0));
        collection.add((2, 'b')).unwrap();
        collection.add((1, 'a')).unwrap();
        collection.add((2, 'z')).unwrap();

        assert_eq!(collection.size(), 2);
        assert_eq!(collection.find(&(2, '?')), Ok(Some(&(2, 'z'))));
        assert_eq!(collection.discard(&(2, '?')), Ok((2, 'z')));
        assert_eq!(collection.size(), 1);
    }

    #[rstest]
    fn test_from_items_with_comparator() {
        let collection =
            OrderedCollection::from_items([(3, 'c'), (1, 'a'), (3, 'd')], ByFirst).unwrap();
        let pairs: Vec<(i32, char)> = collection.iter().copied().collect();
        assert_eq!(pairs, vec![(1, 'a'), (3, 'd')]);
    }

    #[rstest]
    fn test_from_items_reports_incomparable_items() {
        let result = OrderedCollection::from_items([1.0, f64::NAN], Natural);
        assert_eq!(result.err(), Some(TreeError::InvalidComparator));
    }

    // =========================================================================
    // Persistence Tests
    // =========================================================================

    #[rstest]
    fn test_snapshot_is_unaffected_by_mutation(mut scenario: OrderedCollection<i32>) {
        let snapshot = scenario.snapshot();
        assert!(snapshot.ptr_eq(&scenario));

        scenario.add(10).unwrap();
        scenario.discard(&1).unwrap();
        scenario.pop_max().unwrap();

        assert!(!snapshot.ptr_eq(&scenario));
        assert_eq!(contents(&snapshot), vec![1, 3, 4, 5, 8]);
        assert_eq!(contents(&scenario), vec![3, 4, 5, 8]);
    }

    // =========================================================================
    // Trait Tests
    // =========================================================================

    #[rstest]
    fn test_eq_ignores_insertion_order() {
        let first: OrderedCollection<i32> = [1, 2, 3].into_iter().collect();
        let second: OrderedCollection<i32> = [3, 1, 2].into_iter().collect();
        let shorter: OrderedCollection<i32> = [1, 2].into_iter().collect();
        assert_eq!(first, second);
        assert_ne!(first, shorter);
    }

    /// `Ord` claims a total order but `partial_cmp` gives up on odd values.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct Inconsistent(u8);

    impl PartialOrd for Inconsistent {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            if self.0 % 2 == 1 || other.0 % 2 == 1 {
                None
            } else {
                Some(self.0.cmp(&other.0))
            }
        }
    }

    impl Ord for Inconsistent {
        fn cmp(&self, other: &Self) -> Ordering {
            self.0.cmp(&other.0)
        }
    }

    #[rstest]
    #[should_panic(expected = "totally ordered payload rejected")]
    fn test_extend_panics_on_inconsistent_ord() {
        let mut collection: OrderedCollection<Inconsistent> = OrderedCollection::new();
        collection.extend([Inconsistent(2), Inconsistent(3)]);
    }

    #[rstest]
    fn test_into_iter_owned(scenario: OrderedCollection<i32>) {
        let values: Vec<i32> = scenario.into_iter().collect();
        assert_eq!(values, vec![1, 3, 4, 5, 8]);
    }

    #[rstest]
    fn test_min_max(scenario: OrderedCollection<i32>) {
        assert_eq!(scenario.min(), Some(&1));
        assert_eq!(scenario.max(), Some(&8));
    }
}
