use log::trace;

use super::RBTree;
use super::node::{NodePtr, Side};


impl<K, V, C> RBTree<K, V, C> {
    /// Puts `new` where `old` used to hang (under `old`'s parent, or at the root).
    ///
    /// `old`'s own parent link is left untouched.
    pub(super) fn replace_in_parent(&mut self, old: NodePtr<K, V>, new: Option<NodePtr<K, V>>) {
        let parent = old.parent();
        if let Some(new) = new {
            new.set_parent(parent);
        }
        match parent {
            None => self.root = new,
            Some(parent) => parent.set_child(parent.side_of(old), new),
        }
    }

    /// Rotates `node` down towards `dir`, lifting its child on the other side into its place.
    ///
    /// ```text
    ///       node                pivot
    ///      /    \              /     \
    ///     a    pivot   ==>   node     c
    ///          /   \        /    \
    ///      inner    c      a    inner
    /// ```
    /// (drawn for `dir == Side::Left`, i.e. a left rotation)
    ///
    /// In-order sequence and colors are preserved. Panics if the pivot child is missing, which
    /// would mean the repair logic is broken.
    pub(super) fn rotate(&mut self, node: NodePtr<K, V>, dir: Side) {
        let Some(pivot) = node.child(dir.opposite()) else {
            unreachable!("rotation of {node:?} towards {dir:?} without a pivot child")
        };
        trace!("Rotating {node:?} {dir:?}");

        let inner = pivot.child(dir);
        node.set_child(dir.opposite(), inner);
        if let Some(inner) = inner {
            inner.set_parent(Some(node));
        }

        self.replace_in_parent(node, Some(pivot));

        pivot.set_child(dir, Some(node));
        node.set_parent(Some(pivot));
    }
}
