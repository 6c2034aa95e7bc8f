use core::cmp::Ordering;
use core::fmt::Display;

use super::RBTree;
use super::node::{Color, NodePtr, is_red};
use crate::compare::Comparator;


/// A broken red-black tree invariant, as reported by [`RBTree::validate`].
///
/// A tree only gets into one of these states if its comparator is not a consistent total order.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantViolation {
    RootNotBlack,
    /// A red node has a red child.
    RedRed,
    /// Two paths from the same node to a leaf cross a different number of black nodes.
    BlackHeightMismatch,
    /// An in-order neighbour is not strictly larger than the key before it.
    OrderViolation,
    /// A child's parent link does not point back at the node that owns it.
    ParentMismatch,
    LengthMismatch { expected: usize, found: usize },
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RootNotBlack => write!(f, "the root node is red"),
            Self::RedRed => write!(f, "a red node has a red child"),
            Self::BlackHeightMismatch => write!(f, "black height differs between paths"),
            Self::OrderViolation => write!(f, "keys are not in strictly ascending order"),
            Self::ParentMismatch => write!(f, "a parent link does not match the tree shape"),
            Self::LengthMismatch { expected, found } => {
                write!(f, "tree claims {expected} entries but holds {found}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}


impl<K, V, C> RBTree<K, V, C> {
    /// Number of nodes on the longest path from the root down to a leaf.
    pub fn height(&self) -> usize {
        fn height_of<K, V>(node: Option<NodePtr<K, V>>) -> usize {
            node.map_or(0, |node| 1 + height_of(node.left()).max(height_of(node.right())))
        }
        height_of(self.root)
    }

    /// Number of black nodes on the path from the root to its leftmost leaf (which is the same
    /// for every path in a valid tree).
    ///
    /// The root itself is counted and the empty leaves below the last node are not, so a lone
    /// black root has black height 1 and an empty tree 0.
    pub fn black_height(&self) -> usize {
        let mut count = 0;
        let mut current = self.root;
        while let Some(node) = current {
            if node.color() == Color::Black {
                count += 1;
            }
            current = node.left();
        }
        count
    }

    /// Checks the shape of the subtree at `node` and returns its black height.
    fn check_subtree(
        node: Option<NodePtr<K, V>>,
        parent: Option<NodePtr<K, V>>,
        count: &mut usize,
    ) -> Result<usize, InvariantViolation> {
        let Some(node) = node else { return Ok(0) };
        *count += 1;

        if node.parent() != parent {
            return Err(InvariantViolation::ParentMismatch)
        }
        if node.color() == Color::Red && (is_red(node.left()) || is_red(node.right())) {
            return Err(InvariantViolation::RedRed)
        }

        let left = Self::check_subtree(node.left(), Some(node), count)?;
        let right = Self::check_subtree(node.right(), Some(node), count)?;
        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch)
        }
        Ok(left + usize::from(node.color() == Color::Black))
    }
}

impl<K, V, C: Comparator<K>> RBTree<K, V, C> {
    /// Checks every red-black tree invariant, plus parent links and the stored length.
    ///
    /// This walks the whole tree, so it is `O(n)`. Mostly useful for tests, or for finding out
    /// whether a comparator has been misbehaving.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        if is_red(self.root) {
            return Err(InvariantViolation::RootNotBlack)
        }

        let mut found = 0;
        Self::check_subtree(self.root, None, &mut found)?;
        if found != self.len {
            return Err(InvariantViolation::LengthMismatch { expected: self.len, found })
        }

        let mut keys = self.keys();
        if let Some(mut previous) = keys.next() {
            for key in keys {
                if self.cmp.compare(previous, key) != Ordering::Less {
                    return Err(InvariantViolation::OrderViolation)
                }
                previous = key;
            }
        }
        Ok(())
    }
}
