use log::trace;

use super::RBTree;
use super::node::{Color, NodePtr, is_red};
use crate::compare::Comparator;


impl<K, V, C: Comparator<K>> RBTree<K, V, C> {
    /// Removes `key`, returning whether it was present.
    pub fn delete(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        Some(self.remove_entry(key)?.1)
    }

    /// Removes `key`, handing back the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let node = self.find(key)?;
        Some(self.remove_node(node))
    }
}

impl<K, V, C> RBTree<K, V, C> {
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let node = self.root?.minimum();
        Some(self.remove_node(node))
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let node = self.root?.maximum();
        Some(self.remove_node(node))
    }

    /// Unlinks the entry stored in `node` and returns it.
    ///
    /// If `node` has two children, its successor's entry is moved into it and the successor's
    /// node is the one that gets freed, so `node` stays alive in that case.
    pub(super) fn remove_node(&mut self, mut node: NodePtr<K, V>) -> (K, V) {
        if let (Some(_), Some(right)) = (node.left(), node.right()) {
            let successor = right.minimum();
            // SAFETY: `&mut self` means no references into the tree are alive
            unsafe { node.swap_entries(successor) };
            node = successor;
        }
        self.len -= 1;

        // `node` has at most one child now
        let child = node.left().or(node.right());
        if node.color() == Color::Black {
            match child {
                // a black node with a single child must have a red leaf there, so that child
                // can take over the black
                Some(child) => child.set_color(Color::Black),
                // Taking out a black leaf leaves its path one black short. Fix that while the
                // leaf is still in place to stand in for the empty slot.
                None => self.fix_before_remove(node),
            }
        }

        self.replace_in_parent(node, child);
        // SAFETY: `node` was just unlinked, and nothing else points to it anymore
        unsafe { node.dealloc() }
    }

    /// Repairs the black height around `node`, whose subtree is about to lose one black node.
    ///
    /// Each pass either fixes the deficit with at most three rotations, or pushes it one level up
    /// by recoloring the sibling.
    fn fix_before_remove(&mut self, mut node: NodePtr<K, V>) {
        while let Some(parent) = node.parent() {
            if node.color() == Color::Red { break }

            let side = parent.side_of(node);
            // `node`'s side is short a black node, so the other side can't be empty
            let Some(mut sibling) = parent.child(side.opposite()) else {
                unreachable!("{node:?} has no sibling")
            };

            if sibling.color() == Color::Red {
                trace!("Remove fixup: red sibling {sibling:?}, rotating {parent:?}");
                sibling.set_color(Color::Black);
                parent.set_color(Color::Red);
                self.rotate(parent, side);
                let Some(new_sibling) = parent.child(side.opposite()) else {
                    unreachable!("{node:?} lost its sibling in a rotation")
                };
                sibling = new_sibling;
            }

            let near = sibling.child(side);
            let far = sibling.child(side.opposite());

            if !is_red(near) && !is_red(far) {
                trace!("Remove fixup: black nephews, recoloring {sibling:?}");
                sibling.set_color(Color::Red);
                node = parent;
                continue
            }

            if !is_red(far) {
                trace!("Remove fixup: red near nephew, rotating {sibling:?}");
                if let Some(near) = near {
                    near.set_color(Color::Black);
                }
                sibling.set_color(Color::Red);
                self.rotate(sibling, side.opposite());
                let Some(new_sibling) = parent.child(side.opposite()) else {
                    unreachable!("{node:?} lost its sibling in a rotation")
                };
                sibling = new_sibling;
            }

            trace!("Remove fixup: red far nephew, rotating {parent:?}");
            sibling.set_color(parent.color());
            parent.set_color(Color::Black);
            if let Some(far) = sibling.child(side.opposite()) {
                far.set_color(Color::Black);
            }
            self.rotate(parent, side);
            if let Some(root) = self.root {
                node = root;
            }
            break
        }

        node.set_color(Color::Black);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn keys(tree: &RBTree<i32, ()>) -> Vec<i32> {
        tree.keys().copied().collect()
    }

    #[test]
    fn delete_root_of_three() {
        crate::logging::init_for_tests();
        let mut tree = RBTree::new();
        for k in [10, 5, 15] {
            tree.put(k, ());
        }
        assert!(tree.delete(&10));
        tree.validate().unwrap();
        assert_eq!(keys(&tree), [5, 15]);
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains_key(&10));
    }

    #[test]
    fn delete_missing_changes_nothing() {
        let mut tree = RBTree::new();
        assert!(!tree.delete(&1));
        for k in 0..10 {
            tree.put(k, ());
        }
        let before = tree.clone();
        assert!(!tree.delete(&42));
        assert_eq!(tree.len(), 10);
        assert_eq!(tree, before);
        tree.validate().unwrap();
    }

    #[test]
    fn delete_black_leaf_with_red_sibling() {
        let mut tree = RBTree::new();
        for k in 1..=6 {
            tree.put(k, ());
        }
        // 1 is a black leaf whose sibling subtree is rooted at a red node
        assert!(tree.delete(&1));
        tree.validate().unwrap();
        assert_eq!(keys(&tree), [2, 3, 4, 5, 6]);
    }

    #[test]
    fn delete_down_to_empty() {
        let mut tree = RBTree::new();
        for k in 0..32 {
            tree.put(k, ());
        }
        for k in (0..32).rev().step_by(2).chain((0..32).step_by(2)) {
            assert!(tree.delete(&k));
            tree.validate().unwrap();
            assert!(!tree.contains_key(&k));
        }
        assert!(tree.is_empty());
        assert!(tree.root.is_none());
    }

    #[test]
    fn remove_returns_stored_entry() {
        let mut tree = RBTree::new();
        for k in 0..10 {
            tree.put(k, k * 10);
        }
        // 3 has two children, so its successor's entry moves into its node
        assert_eq!(tree.remove_entry(&3), Some((3, 30)));
        assert_eq!(tree.remove(&3), None);
        assert_eq!(tree.remove(&4), Some(40));
        assert_eq!(tree.pop_first(), Some((0, 0)));
        assert_eq!(tree.pop_last(), Some((9, 90)));
        assert_eq!(tree.len(), 6);
        tree.validate().unwrap();
        let entries: Vec<_> = tree.iter().map(|(&k, &v)| (k, v)).collect();
        assert_eq!(entries, [(1, 10), (2, 20), (5, 50), (6, 60), (7, 70), (8, 80)]);
    }
}
