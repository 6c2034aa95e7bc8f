use core::cmp::Ordering;
use core::mem;

use log::trace;

use super::RBTree;
use super::node::{Color, NodePtr, Side, is_red};
use crate::compare::Comparator;


impl<K, V, C: Comparator<K>> RBTree<K, V, C> {
    /// Inserts `key` and `value`, returning whether the key was new.
    ///
    /// If the key was already present its value is overwritten in place and the length does not
    /// change.
    pub fn put(&mut self, key: K, value: V) -> bool {
        self.insert(key, value).is_none()
    }

    /// Like [`put`](Self::put), but hands back the value that was replaced, if any.
    ///
    /// The key stored in the tree is not updated when it was already present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(node) = current {
            // SAFETY: the key reference is dropped before anything is mutated
            let node_key = unsafe { node.key() };
            (side, current) = match self.cmp.compare(&key, node_key) {
                Ordering::Less => (Side::Left, node.left()),
                Ordering::Greater => (Side::Right, node.right()),
                Ordering::Equal => {
                    // SAFETY: `&mut self` means nobody else is looking at this value
                    let (_, old) = unsafe { node.key_value_mut() };
                    return Some(mem::replace(old, value))
                }
            };
            parent = Some(node);
        }

        let node = NodePtr::alloc(key, value, parent);
        match parent {
            None => self.root = Some(node),
            Some(parent) => parent.set_child(side, Some(node)),
        }
        self.len += 1;

        self.fix_after_insert(node);
        None
    }

    /// Restores the color invariants after `node` was attached as a red leaf.
    ///
    /// The only thing that can be wrong is `node` having a red parent. Each pass either fixes that
    /// with at most two rotations, or recolors and moves the problem two levels up.
    fn fix_after_insert(&mut self, mut node: NodePtr<K, V>) {
        while let Some(mut parent) = node.parent().filter(|p| p.color() == Color::Red) {
            // the root is black, so a red parent has a parent of its own
            let Some(grandparent) = parent.parent() else {
                unreachable!("red node {parent:?} at the root")
            };
            let side = grandparent.side_of(parent);
            let uncle = grandparent.child(side.opposite());

            if is_red(uncle) {
                trace!("Insert fixup: red uncle, recoloring around {grandparent:?}");
                parent.set_color(Color::Black);
                if let Some(uncle) = uncle {
                    uncle.set_color(Color::Black);
                }
                grandparent.set_color(Color::Red);
                node = grandparent;
                continue
            }

            if parent.child(side.opposite()) == Some(node) {
                // inner grandchild: turn it into an outer one
                trace!("Insert fixup: inner grandchild {node:?}, rotating {parent:?}");
                self.rotate(parent, side);
                mem::swap(&mut node, &mut parent);
            }

            trace!("Insert fixup: outer grandchild {node:?}, rotating {grandparent:?}");
            parent.set_color(Color::Black);
            grandparent.set_color(Color::Red);
            self.rotate(grandparent, side.opposite());
            break
        }

        if let Some(root) = self.root {
            root.set_color(Color::Black);
        }
    }
}
