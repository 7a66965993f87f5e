//! # persistent-llrb
//!
//! Persistent ordered collections built on a left-leaning red-black tree.
//!
//! ## Overview
//!
//! Every mutation produces a new version of the tree that shares all
//! untouched nodes with the previous one. Existing clones and snapshots
//! observe exactly the content they had when they were taken.
//!
//! - **`OrderedCollection`**: ordered set of payloads with upsert semantics
//! - **`OrderedMap`**: ordered key-value mapping on top of the collection
//! - **Comparators**: natural order, ordering by an extracted key, pair keys
//!
//! ## Feature Flags
//!
//! - `arc`: share nodes through `Arc` instead of `Rc`, making collections
//!   `Send + Sync`
//! - `serde`: `Serialize`/`Deserialize` implementations
//!
//! ## Example
//!
//! ```rust
//! use persistent_llrb::prelude::*;
//!
//! let mut scores = OrderedMap::new();
//! scores.set("carol", 7).unwrap();
//! scores.set("alice", 9).unwrap();
//! let before = scores.snapshot();
//!
//! scores.set("alice", 3).unwrap();
//! assert_eq!(scores.get("alice"), Ok(Some(&3)));
//! assert_eq!(before.get("alice"), Ok(Some(&9)));
//! assert_eq!(scores.delete("bob"), Err(TreeError::KeyNotFound));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Note: Disabling redundant_closure_for_method_calls due to clippy 0.1.92 panic bug
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports the collections, comparators and error types.
///
/// # Usage
///
/// ```rust
/// use persistent_llrb::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::*;
    pub use crate::persistent::*;
}

pub mod error;
pub mod persistent;

pub use error::InvariantViolation;
pub use error::TreeError;
pub use persistent::OrderedCollection;
pub use persistent::OrderedMap;
