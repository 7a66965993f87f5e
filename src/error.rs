//! Error types for the persistent ordered collections.
//!
//! Lookups are tolerant (an absent key yields `Ok(None)`), removals are
//! strict (an absent key yields [`TreeError::KeyNotFound`]).

use std::fmt;

/// Represents errors that can occur when operating on an ordered collection.
///
/// # Examples
///
/// ```rust
/// use persistent_llrb::{OrderedCollection, TreeError};
///
/// let mut collection: OrderedCollection<i32> = OrderedCollection::new();
/// assert_eq!(collection.pop_min(), Err(TreeError::EmptyCollection));
/// assert_eq!(collection.discard(&1), Err(TreeError::KeyNotFound));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TreeError {
    /// The comparator could not order two keys.
    ///
    /// This is a programmer error: the key function must be a total order
    /// over every key stored in the collection.
    InvalidComparator,
    /// A removal was requested for a key the collection does not hold.
    KeyNotFound,
    /// `pop_min` or `pop_max` was called on an empty collection.
    EmptyCollection,
}

impl fmt::Display for TreeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidComparator => write!(
                formatter,
                "comparator returned no ordering; the key function must be a total order"
            ),
            Self::KeyNotFound => write!(formatter, "key not found"),
            Self::EmptyCollection => write!(formatter, "collection is empty"),
        }
    }
}

impl std::error::Error for TreeError {}

/// Describes the first broken tree invariant found by `validate`.
///
/// A correctly implemented collection never produces one of these; they
/// exist so tests and debugging sessions can check the tree shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvariantViolation {
    /// An in-order neighbour compared greater than or equal to its successor.
    OutOfOrder,
    /// A red node was found in a right child position.
    RightLeaningRed,
    /// A red node has a red child.
    RedChain,
    /// Two sibling subtrees have different black heights.
    UnbalancedBlacks {
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },
    /// The comparator could not order two stored keys.
    IncomparableKeys,
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder => write!(formatter, "keys are not in ascending order"),
            Self::RightLeaningRed => write!(formatter, "red link leans right"),
            Self::RedChain => write!(formatter, "two consecutive red links"),
            Self::UnbalancedBlacks { left, right } => write!(
                formatter,
                "unbalanced black heights: left {left}, right {right}"
            ),
            Self::IncomparableKeys => write!(formatter, "stored keys are not comparable"),
        }
    }
}

impl std::error::Error for InvariantViolation {}
