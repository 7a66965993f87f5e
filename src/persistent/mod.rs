//! Persistent (immutable) ordered collections.
//!
//! This module provides ordered containers backed by a left-leaning
//! red-black tree with structural sharing:
//!
//! - [`OrderedCollection`]: Ordered set of payloads under a [`Comparator`]
//! - [`OrderedMap`]: Ordered key-value mapping
//!
//! # Structural Sharing
//!
//! Every mutation builds a new root and copies only the nodes on the
//! affected search path. Clones and snapshots are O(1) and are never
//! affected by later mutations of any other version.
//!
//! # Examples
//!
//! ## `OrderedCollection`
//!
//! ```rust
//! use persistent_llrb::persistent::OrderedCollection;
//!
//! let mut collection: OrderedCollection<i32> = [5, 3, 8].into_iter().collect();
//! let snapshot = collection.snapshot();
//!
//! collection.add(1).unwrap();
//! assert_eq!(collection.pop_max(), Ok(8));
//!
//! assert_eq!(collection.iter().copied().collect::<Vec<_>>(), vec![1, 3, 5]);
//! assert_eq!(snapshot.iter().copied().collect::<Vec<_>>(), vec![3, 5, 8]);
//! ```
//!
//! ## `OrderedMap`
//!
//! ```rust
//! use persistent_llrb::persistent::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! map.set("b", 2).unwrap();
//! map.set("a", 1).unwrap();
//!
//! let keys: Vec<&&str> = map.keys().collect();
//! assert_eq!(keys, vec![&"a", &"b"]);
//! assert_eq!(map.delete(&"a"), Ok(1));
//! ```

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`,
/// which is thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

mod comparator;
mod llrb;
mod ordered_collection;
mod ordered_map;

pub use comparator::ByFirst;
pub use comparator::ByKey;
pub use comparator::Comparator;
pub use comparator::Natural;
pub use llrb::IntoIter;
pub use llrb::Iter;
pub use llrb::TreeStats;
pub use ordered_collection::OrderedCollection;
pub use ordered_map::OrderedMap;
pub use ordered_map::OrderedMapIterator;

#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(OrderedCollection<i32>: Send, Sync);
#[cfg(feature = "arc")]
static_assertions::assert_impl_all!(OrderedMap<String, i32>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
