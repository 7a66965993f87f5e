//! Key functions for ordered collections.
//!
//! A collection captures one [`Comparator`] at construction and uses it for
//! every comparison it makes. Comparators return `Option<Ordering>` so that
//! partially ordered keys (such as floating point numbers) can be stored; a
//! `None` answer is reported as [`TreeError::InvalidComparator`].
//!
//! [`TreeError::InvalidComparator`]: crate::TreeError::InvalidComparator
//!
//! # Examples
//!
//! ```rust
//! use persistent_llrb::persistent::{ByKey, Comparator, Natural};
//! use std::cmp::Ordering;
//!
//! assert_eq!(Natural.compare(&1, &2), Some(Ordering::Less));
//!
//! let by_length = ByKey::new(|word: &String| word.len());
//! assert_eq!(
//!     by_length.compare(&"pear".to_string(), &"fig".to_string()),
//!     Some(Ordering::Greater)
//! );
//! ```

use std::cmp::Ordering;
use std::fmt;

/// A three-way comparison between a probe payload and a stored payload.
///
/// Implementations must be a total, consistent order over every payload the
/// collection holds for its whole lifetime.
pub trait Comparator<T: ?Sized> {
    /// Compares `probe` against `stored`.
    ///
    /// Returns `None` when the two payloads cannot be ordered.
    fn compare(&self, probe: &T, stored: &T) -> Option<Ordering>;
}

/// The identity key function: payloads are compared directly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<T: PartialOrd + ?Sized> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, probe: &T, stored: &T) -> Option<Ordering> {
        probe.partial_cmp(stored)
    }
}

/// Orders payloads by a key extracted with a caller-supplied function.
///
/// # Examples
///
/// ```rust
/// use persistent_llrb::OrderedCollection;
/// use persistent_llrb::persistent::ByKey;
///
/// let mut people = OrderedCollection::with_comparator(ByKey::new(|person: &(char, u32)| person.1));
/// people.add(('a', 36)).unwrap();
/// people.add(('b', 41)).unwrap();
/// people.add(('c', 36)).unwrap(); // same key as 'a': replaces it
///
/// let initials: Vec<char> = people.iter().map(|person| person.0).collect();
/// assert_eq!(initials, vec!['c', 'b']);
/// ```
#[derive(Clone, Copy)]
pub struct ByKey<F> {
    extract: F,
}

impl<F> ByKey<F> {
    /// Creates a comparator from a key extraction function.
    #[inline]
    #[must_use]
    pub const fn new(extract: F) -> Self {
        Self { extract }
    }
}

impl<T, K, F> Comparator<T> for ByKey<F>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    #[inline]
    fn compare(&self, probe: &T, stored: &T) -> Option<Ordering> {
        (self.extract)(probe).partial_cmp(&(self.extract)(stored))
    }
}

impl<F> fmt::Debug for ByKey<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("ByKey").finish_non_exhaustive()
    }
}

/// Orders `(key, value)` pairs by their first element only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ByFirst;

impl<K: PartialOrd, V> Comparator<(K, V)> for ByFirst {
    #[inline]
    fn compare(&self, probe: &(K, V), stored: &(K, V)) -> Option<Ordering> {
        probe.0.partial_cmp(&stored.0)
    }
}
