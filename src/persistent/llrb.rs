//! Persistent left-leaning red-black tree.
//!
//! This module holds the node representation and every algorithm that
//! reshapes the tree. Nothing here mutates a node that another version can
//! reach: a node is taken out of its [`ReferenceCounter`] with
//! `unwrap_or_clone`, so a node still shared with an older root is copied
//! and a node owned by nobody else is reused in place.
//!
//! # Invariants
//!
//! After every public operation:
//!
//! 1. Keys are in ascending in-order sequence.
//! 2. No red link leans right.
//! 3. A red node never has a red child.
//! 4. Every path from a node to an empty subtree crosses the same number of
//!    black links.
//! 5. New leaves are created red; the empty tree is always black. The root is
//!    recolored black after each mutation.
//!
//! Rebalancing is done bottom-up: [`balance`] runs on every node of the
//! mutated path strictly after the recursive call below it has returned.

use super::ReferenceCounter;
use super::comparator::Comparator;
use crate::error::{InvariantViolation, TreeError};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::iter::FusedIterator;
use std::mem;

/// Inline capacity of the iterator stack. The stack never holds more than
/// the tree height, which is at most `2 * log2(n + 1)`.
const INLINE_DEPTH: usize = 48;

// =============================================================================
// Node Definition
// =============================================================================

/// The color of the link pointing at a node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

impl Color {
    const fn flipped(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }
}

/// An immutable tree node.
#[derive(Clone)]
pub(crate) struct Node<T> {
    value: T,
    left: Tree<T>,
    right: Tree<T>,
    color: Color,
}

impl<T> Node<T> {
    /// Creates a red leaf with empty children.
    const fn leaf(value: T) -> Self {
        Self {
            value,
            left: Tree::Empty,
            right: Tree::Empty,
            color: Color::Red,
        }
    }
}

/// A link to a subtree: either the empty sentinel or a shared node.
pub(crate) enum Tree<T> {
    Empty,
    Occupied(ReferenceCounter<Node<T>>),
}

impl<T> Clone for Tree<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Occupied(node) => Self::Occupied(ReferenceCounter::clone(node)),
        }
    }
}

impl<T> Default for Tree<T> {
    #[inline]
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> From<Node<T>> for Tree<T> {
    #[inline]
    fn from(node: Node<T>) -> Self {
        Self::Occupied(ReferenceCounter::new(node))
    }
}

impl<T> Tree<T> {
    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[inline]
    fn node(&self) -> Option<&Node<T>> {
        match self {
            Self::Empty => None,
            Self::Occupied(node) => Some(&**node),
        }
    }

    /// The empty tree is black.
    #[inline]
    fn color(&self) -> Color {
        self.node().map_or(Color::Black, |node| node.color)
    }

    #[inline]
    fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    /// Whether this subtree's left child is red. False for the empty tree,
    /// whose children do not exist.
    #[inline]
    fn left_is_red(&self) -> bool {
        self.node().is_some_and(|node| node.left.is_red())
    }

    /// Walks from the root to the stored payload the probe compares equal to.
    ///
    /// `probe` compares the searched-for key against a stored payload.
    pub(crate) fn find<P>(&self, probe: &P) -> Result<Option<&T>, TreeError>
    where
        P: Fn(&T) -> Option<Ordering>,
    {
        let mut current = self;
        while let Self::Occupied(node) = current {
            match ordering(probe, &node.value)? {
                Ordering::Less => current = &node.left,
                Ordering::Greater => current = &node.right,
                Ordering::Equal => return Ok(Some(&node.value)),
            }
        }
        Ok(None)
    }

    pub(crate) fn min(&self) -> Option<&T> {
        let mut node = self.node()?;
        while let Some(left) = node.left.node() {
            node = left;
        }
        Some(&node.value)
    }

    pub(crate) fn max(&self) -> Option<&T> {
        let mut node = self.node()?;
        while let Some(right) = node.right.node() {
            node = right;
        }
        Some(&node.value)
    }

    /// Counts the non-empty nodes. O(n).
    pub(crate) fn count(&self) -> usize {
        self.iter().count()
    }

    pub(crate) fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Whether both links point at the same node (or are both empty).
    pub(crate) fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Occupied(left), Self::Occupied(right)) => ReferenceCounter::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Checks invariants 1 to 4 over the whole tree.
    pub(crate) fn validate<F>(&self, compare: F) -> Result<TreeStats, InvariantViolation>
    where
        F: Fn(&T, &T) -> Option<Ordering>,
    {
        let mut previous: Option<&T> = None;
        for value in self.iter() {
            if let Some(previous) = previous {
                match compare(previous, value) {
                    Some(Ordering::Less) => {}
                    Some(_) => return Err(InvariantViolation::OutOfOrder),
                    None => return Err(InvariantViolation::IncomparableKeys),
                }
            }
            previous = Some(value);
        }

        let mut stats = TreeStats::default();
        stats.black_height = validate_shape(self, 0, &mut stats)?;
        Ok(stats)
    }
}

impl<T: Clone> Tree<T> {
    /// Takes the node out of its link, copying it only if another version
    /// still references it.
    #[inline]
    fn into_node(self) -> Option<Node<T>> {
        match self {
            Self::Empty => None,
            Self::Occupied(node) => Some(ReferenceCounter::unwrap_or_clone(node)),
        }
    }

    fn map_node<F>(self, transform: F) -> Self
    where
        F: FnOnce(Node<T>) -> Node<T>,
    {
        self.into_node()
            .map_or(Self::Empty, |node| Self::from(transform(node)))
    }

    fn with_flipped_color(self) -> Self {
        self.map_node(|mut node| {
            node.color = node.color.flipped();
            node
        })
    }

    fn with_black_root(self) -> Self {
        if self.is_red() {
            self.map_node(|mut node| {
                node.color = Color::Black;
                node
            })
        } else {
            self
        }
    }

    /// Gives the root a red link to spend when neither child has one.
    fn prepared_for_delete(self) -> Self {
        let children_black = self
            .node()
            .is_some_and(|node| !node.left.is_red() && !node.right.is_red());
        if children_black {
            self.map_node(|mut node| {
                node.color = Color::Red;
                node
            })
        } else {
            self
        }
    }

    /// Returns the tree with `value` inserted, replacing the payload whose key
    /// compares equal if there is one.
    pub(crate) fn inserted<C>(self, value: T, comparator: &C) -> Result<Self, TreeError>
    where
        C: Comparator<T> + ?Sized,
    {
        insert(self, value, comparator).map(|node| Self::from(node).with_black_root())
    }

    /// Returns the tree without the payload the probe matches, and that payload.
    pub(crate) fn removed<P>(self, probe: &P) -> Result<(Self, T), TreeError>
    where
        P: Fn(&T) -> Option<Ordering>,
    {
        let (tree, removed) = delete(self.prepared_for_delete(), probe)?;
        Ok((tree.with_black_root(), removed))
    }

    /// Returns the tree without its minimum payload, and that payload.
    pub(crate) fn without_min(self) -> Result<(Self, T), TreeError> {
        let (tree, removed) = delete_min(self.prepared_for_delete());
        removed
            .map(|value| (tree.with_black_root(), value))
            .ok_or(TreeError::EmptyCollection)
    }

    /// Returns the tree without its maximum payload, and that payload.
    pub(crate) fn without_max(self) -> Result<(Self, T), TreeError> {
        let (tree, removed) = delete_max(self.prepared_for_delete());
        removed
            .map(|value| (tree.with_black_root(), value))
            .ok_or(TreeError::EmptyCollection)
    }
}

#[inline]
fn ordering<T, P>(probe: &P, stored: &T) -> Result<Ordering, TreeError>
where
    P: Fn(&T) -> Option<Ordering>,
{
    probe(stored).ok_or(TreeError::InvalidComparator)
}

// =============================================================================
// Rotations and Color Flip
// =============================================================================

/// Promotes the right child. The promoted node takes the old top's color and
/// the demoted node becomes red.
fn rotate_left<T: Clone>(mut node: Node<T>) -> Node<T> {
    let Some(mut top) = mem::take(&mut node.right).into_node() else {
        return node;
    };
    node.right = mem::take(&mut top.left);
    top.color = node.color;
    node.color = Color::Red;
    top.left = Tree::from(node);
    top
}

/// Mirror of [`rotate_left`].
fn rotate_right<T: Clone>(mut node: Node<T>) -> Node<T> {
    let Some(mut top) = mem::take(&mut node.left).into_node() else {
        return node;
    };
    node.left = mem::take(&mut top.right);
    top.color = node.color;
    node.color = Color::Red;
    top.right = Tree::from(node);
    top
}

/// Toggles the color of the node and both of its children.
fn flip<T: Clone>(mut node: Node<T>) -> Node<T> {
    node.color = node.color.flipped();
    node.left = mem::take(&mut node.left).with_flipped_color();
    node.right = mem::take(&mut node.right).with_flipped_color();
    node
}

// =============================================================================
// Rebalancing
// =============================================================================

fn balance<T: Clone>(mut node: Node<T>) -> Node<T> {
    if node.right.is_red() {
        node = rotate_left(node);
    }
    // An empty left child is black, which short-circuits the grandchild test.
    if node.left.is_red() && node.left.left_is_red() {
        node = rotate_right(node);
    }
    if node.left.is_red() && node.right.is_red() {
        node = flip(node);
    }
    node
}

fn insert<T, C>(tree: Tree<T>, value: T, comparator: &C) -> Result<Node<T>, TreeError>
where
    T: Clone,
    C: Comparator<T> + ?Sized,
{
    let Some(mut node) = tree.into_node() else {
        return Ok(Node::leaf(value));
    };

    match comparator
        .compare(&value, &node.value)
        .ok_or(TreeError::InvalidComparator)?
    {
        Ordering::Less => {
            let left = insert(mem::take(&mut node.left), value, comparator)?;
            node.left = Tree::from(left);
        }
        Ordering::Greater => {
            let right = insert(mem::take(&mut node.right), value, comparator)?;
            node.right = Tree::from(right);
        }
        Ordering::Equal => node.value = value,
    }

    Ok(balance(node))
}

// =============================================================================
// Deletion
// =============================================================================

/// Makes the left child or one of its children red before descending left.
fn move_red_left<T: Clone>(node: Node<T>) -> Node<T> {
    let mut node = flip(node);
    if node.right.left_is_red() {
        node.right = mem::take(&mut node.right).map_node(rotate_right);
        node = flip(rotate_left(node));
    }
    node
}

/// Makes the right child or one of its children red before descending right.
fn move_red_right<T: Clone>(node: Node<T>) -> Node<T> {
    let mut node = flip(node);
    if node.left.left_is_red() {
        node = flip(rotate_right(node));
    }
    node
}

/// Removes the leftmost node. Yields `None` only for the empty tree.
fn delete_min<T: Clone>(tree: Tree<T>) -> (Tree<T>, Option<T>) {
    let Some(mut node) = tree.into_node() else {
        return (Tree::Empty, None);
    };
    if node.left.is_empty() {
        return (Tree::Empty, Some(node.value));
    }
    if !node.left.is_red() && !node.left.left_is_red() {
        node = move_red_left(node);
    }

    let (left, removed) = delete_min(mem::take(&mut node.left));
    node.left = left;
    (Tree::from(balance(node)), removed)
}

/// Removes the rightmost node. Yields `None` only for the empty tree.
fn delete_max<T: Clone>(tree: Tree<T>) -> (Tree<T>, Option<T>) {
    let Some(mut node) = tree.into_node() else {
        return (Tree::Empty, None);
    };
    if node.left.is_red() {
        node = rotate_right(node);
    }
    if node.right.is_empty() {
        return (Tree::Empty, Some(node.value));
    }
    if !node.right.is_red() && !node.right.left_is_red() {
        node = move_red_right(node);
    }

    let (right, removed) = delete_max(mem::take(&mut node.right));
    node.right = right;
    (Tree::from(balance(node)), removed)
}

/// Removes the node the probe compares equal to.
///
/// The comparison is taken again after every rotation, since a rotation
/// replaces the node under examination.
fn delete<T, P>(tree: Tree<T>, probe: &P) -> Result<(Tree<T>, T), TreeError>
where
    T: Clone,
    P: Fn(&T) -> Option<Ordering>,
{
    let Some(mut node) = tree.into_node() else {
        return Err(TreeError::KeyNotFound);
    };

    let removed = if ordering(probe, &node.value)? == Ordering::Less {
        if !node.left.is_red() && !node.left.left_is_red() {
            node = move_red_left(node);
        }
        let (left, removed) = delete(mem::take(&mut node.left), probe)?;
        node.left = left;
        removed
    } else {
        if node.left.is_red() {
            node = rotate_right(node);
        }
        if ordering(probe, &node.value)? == Ordering::Equal && node.right.is_empty() {
            return Ok((Tree::Empty, node.value));
        }
        // The right child may be empty here, so its grandchild is checked
        // through the guarded accessor.
        if !node.right.is_red() && !node.right.left_is_red() {
            node = move_red_right(node);
        }
        if ordering(probe, &node.value)? == Ordering::Equal {
            // The right subtree is non-empty on this path; its minimum is the
            // in-order successor.
            let (right, successor) = delete_min(mem::take(&mut node.right));
            node.right = right;
            let successor = successor.ok_or(TreeError::KeyNotFound)?;
            mem::replace(&mut node.value, successor)
        } else {
            let (right, removed) = delete(mem::take(&mut node.right), probe)?;
            node.right = right;
            removed
        }
    };

    Ok((Tree::from(balance(node)), removed))
}

// =============================================================================
// Validation
// =============================================================================

/// Shape statistics gathered by `validate`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    entries: usize,
    black_height: usize,
    max_depth: usize,
}

impl TreeStats {
    /// Number of stored payloads.
    #[must_use]
    pub const fn entries(&self) -> usize {
        self.entries
    }

    /// Number of black links on every root-to-empty path.
    #[must_use]
    pub const fn black_height(&self) -> usize {
        self.black_height
    }

    /// Length of the longest root-to-empty path, counted in nodes.
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }
}

fn validate_shape<T>(
    tree: &Tree<T>,
    depth: usize,
    stats: &mut TreeStats,
) -> Result<usize, InvariantViolation> {
    let Some(node) = tree.node() else {
        stats.max_depth = stats.max_depth.max(depth);
        return Ok(0);
    };
    stats.entries += 1;

    if node.right.is_red() {
        return Err(InvariantViolation::RightLeaningRed);
    }
    if node.color == Color::Red && node.left.is_red() {
        return Err(InvariantViolation::RedChain);
    }

    let left = validate_shape(&node.left, depth + 1, stats)?;
    let right = validate_shape(&node.right, depth + 1, stats)?;
    if left != right {
        return Err(InvariantViolation::UnbalancedBlacks { left, right });
    }

    Ok(left + usize::from(node.color == Color::Black))
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An ascending in-order iterator over a tree's payloads.
///
/// The iterator borrows the tree version it was created from; mutations of
/// the owning collection after creation produce a new version and do not
/// affect it.
pub struct Iter<'a, T> {
    stack: SmallVec<[&'a Node<T>; INLINE_DEPTH]>,
}

impl<'a, T> Iter<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        let mut iterator = Self {
            stack: SmallVec::new(),
        };
        iterator.push_left_spine(tree);
        iterator
    }

    fn push_left_spine(&mut self, mut tree: &'a Tree<T>) {
        while let Tree::Occupied(node) = tree {
            self.stack.push(&**node);
            tree = &node.left;
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        Some(&node.value)
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// An owning ascending iterator. Payloads are cloned out of the shared nodes.
pub struct IntoIter<T> {
    stack: Vec<ReferenceCounter<Node<T>>>,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(tree: Tree<T>) -> Self {
        let mut iterator = Self { stack: Vec::new() };
        iterator.push_left_spine(tree);
        iterator
    }

    fn push_left_spine(&mut self, mut tree: Tree<T>) {
        while let Tree::Occupied(node) = tree {
            tree = node.left.clone();
            self.stack.push(node);
        }
    }
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.clone());
        Some(node.value.clone())
    }
}

impl<T: Clone> FusedIterator for IntoIter<T> {}

// =============================================================================
// Tests
// =============================================================================
