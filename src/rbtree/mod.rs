//! An ordered map stored in a red-black tree.
//!
//! Every node is either red or black, and the tree keeps these invariants between operations:
//!  - keys are in binary-search-tree order under the tree's [`Comparator`]
//!  - a red node never has a red child (missing children count as black)
//!  - the root is black
//!  - every path from a node down to a missing child crosses the same number of black nodes
//!
// PROVE: any node with height `h` has black height at least `h/2`
// PROVE: the subtree located at any node `x` contains at least `2^bh(x) - 1` nodes (use induction)
// LEMMA: An RBTree with `n` internal nodes has height at most `2*log₂(n+1)`

use core::cmp::Ordering;
use core::fmt::Debug;
use core::marker::PhantomData;
use core::ops::Index;

use log::debug;

use crate::compare::{Comparator, Natural};

mod insert;
mod iter;
mod node;
mod remove;
mod rotate;
mod validate;

use node::{Node, NodePtr};

pub use iter::{IntoIter, Iter, Keys, Values, ValuesMut};
pub use validate::InvariantViolation;


/// An ordered map backed by a red-black tree.
///
/// Lookups, insertions and removals are `O(log n)`; iteration yields entries in ascending order
/// according to `C` (the keys' [`Ord`] impl unless a comparator is given).
///
/// ```
/// use rbtree_map::RBTree;
///
/// let mut tree = RBTree::new();
/// assert!(tree.put(3, "c"));
/// assert!(tree.put(1, "a"));
/// assert!(!tree.put(3, "C"));
///
/// assert_eq!(tree.get(&3), Some(&"C"));
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [1, 3]);
/// ```
pub struct RBTree<K, V, C = Natural> {
    root: Option<NodePtr<K, V>>,
    len: usize,
    cmp: C,
    // the tree owns its nodes
    _marker: PhantomData<Box<Node<K, V>>>,
}

/// SAFETY: the tree uniquely owns its nodes, just like a `Box` would, so sending it sends the keys
///         and values along with it.
unsafe impl<K: Send, V: Send, C: Send> Send for RBTree<K, V, C> {}

/// SAFETY: shared access to the tree only ever hands out shared references to keys and values.
unsafe impl<K: Sync, V: Sync, C: Sync> Sync for RBTree<K, V, C> {}

impl<K: Ord, V> RBTree<K, V> {
    /// Creates an empty tree ordered by `K`'s [`Ord`] impl.
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, C> RBTree<K, V, C> {
    /// Creates an empty tree ordered by `cmp`.
    ///
    /// `cmp` must be a strict total order over the keys that will be inserted, and must stay
    /// consistent for the tree's lifetime.
    pub const fn with_comparator(cmp: C) -> Self {
        Self {
            root: None,
            len: 0,
            cmp,
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Removes (and drops) every entry.
    pub fn clear(&mut self) {
        if self.root.is_some() {
            debug!("Clearing tree of {} entries", self.len);
        }
        let mut current = self.root.take();
        self.len = 0;

        // Walk down to some leaf, unhook and free it, then continue from its parent. This never
        // needs more than one pointer of state, however deep the tree is.
        while let Some(node) = current {
            if let Some(child) = node.left().or(node.right()) {
                current = Some(child);
                continue
            }
            let parent = node.parent();
            if let Some(parent) = parent {
                parent.set_child(parent.side_of(node), None);
            }
            // SAFETY: `node` is a leaf that was just unhooked from its parent (or was the root,
            //         which was taken out of `self.root` above)
            drop(unsafe { node.dealloc() });
            current = parent;
        }
    }

    /// The smallest entry.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let node = self.root?.minimum();
        // SAFETY: borrowing `self` keeps the node alive and unmodified
        Some(unsafe { node.key_value() })
    }

    /// The largest entry.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let node = self.root?.maximum();
        // SAFETY: borrowing `self` keeps the node alive and unmodified
        Some(unsafe { node.key_value() })
    }

    /// Calls `f` on every entry in ascending order, stopping as soon as `f` returns `false`.
    ///
    /// Returns whether every entry was visited.
    pub fn for_each<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.iter().all(|(k, v)| f(k, v))
    }
}

impl<K, V, C: Comparator<K>> RBTree<K, V, C> {
    /// Plain binary search from the root.
    fn find(&self, key: &K) -> Option<NodePtr<K, V>> {
        let mut current = self.root;
        while let Some(node) = current {
            // SAFETY: nothing mutates the tree while we hold `&self`
            let node_key = unsafe { node.key() };
            current = match self.cmp.compare(key, node_key) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(node),
            };
        }
        None
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        Some(self.get_key_value(key)?.1)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let node = self.find(key)?;
        // SAFETY: borrowing `self` keeps the node alive and unmodified
        Some(unsafe { node.key_value() })
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let node = self.find(key)?;
        // SAFETY: `&mut self` is held for as long as the value is borrowed
        Some(unsafe { node.key_value_mut() }.1)
    }

    /// Keeps only the entries for which `f` returns `true`, visiting them in ascending order.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut current = self.root.map(NodePtr::minimum);
        while let Some(node) = current {
            // SAFETY: the references die before the tree is touched again
            let (key, value) = unsafe { node.key_value_mut() };
            if f(key, value) {
                current = node.successor();
                continue
            }

            // Removing a node with two children moves its successor's entry into it, so then the
            // next entry to look at is in the same node.
            let successor_moves_in = node.left().is_some() && node.right().is_some();
            let next = node.successor();
            drop(self.remove_node(node));
            current = if successor_moves_in { Some(node) } else { next };
        }
    }
}

impl<K, V, C> Drop for RBTree<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V, C: Default> Default for RBTree<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K: Debug, V: Debug, C> Debug for RBTree<K, V, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for RBTree<K, V, C> {
    /// Copies the tree node for node, so the clone has the same shape and colors.
    fn clone(&self) -> Self {
        fn clone_subtree<K: Clone, V: Clone>(
            node: NodePtr<K, V>,
            parent: Option<NodePtr<K, V>>,
        ) -> NodePtr<K, V> {
            // SAFETY: the source tree is borrowed for the whole clone
            let (key, value) = unsafe { node.key_value() };
            let copy = NodePtr::alloc(key.clone(), value.clone(), parent);
            copy.set_color(node.color());
            copy.set_left(node.left().map(|left| clone_subtree(left, Some(copy))));
            copy.set_right(node.right().map(|right| clone_subtree(right, Some(copy))));
            copy
        }

        let mut tree = Self::with_comparator(self.cmp.clone());
        tree.root = self.root.map(|root| clone_subtree(root, None));
        tree.len = self.len;
        tree
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for RBTree<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for RBTree<K, V, C> {}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for RBTree<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RBTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K, V, C: Comparator<K>> Index<&K> for RBTree<K, V, C> {
    type Output = V;

    /// Panics if the key is not present.
    fn index(&self, key: &K) -> &V {
        self.get(key).expect("no entry found for key")
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use super::node::Color;
    use crate::Reverse;

    use std::cell::Cell;
    use std::rc::Rc;

    fn root_of<K: Copy, V>(tree: &RBTree<K, V, impl Sized>) -> Option<(K, Color)> {
        // SAFETY: the tree is not mutated while the key is read
        tree.root.map(|root| (*unsafe { root.key() }, root.color()))
    }

    /// Counts how many times values made by it have been dropped.
    #[derive(Clone, Default)]
    struct DropCounter(Rc<Cell<usize>>);

    struct DropDetector(Rc<Cell<usize>>);

    impl DropCounter {
        fn make(&self) -> DropDetector {
            DropDetector(self.0.clone())
        }
        fn drops(&self) -> usize {
            self.0.get()
        }
    }

    impl Drop for DropDetector {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn basic_map_operations() {
        crate::logging::init_for_tests();
        let mut tree = RBTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.get(&1), None);

        assert!(tree.put(2, "b"));
        assert!(tree.put(1, "a"));
        assert!(tree.put(3, "c"));
        assert_eq!(tree.len(), 3);
        assert!(tree.contains_key(&1));
        assert!(!tree.contains_key(&4));
        assert_eq!(tree.get_key_value(&3), Some((&3, &"c")));
        assert_eq!(tree[&2], "b");

        *tree.get_mut(&2).unwrap() = "B";
        assert_eq!(tree.get(&2), Some(&"B"));

        assert_eq!(tree.first_key_value(), Some((&1, &"a")));
        assert_eq!(tree.last_key_value(), Some((&3, &"c")));

        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.first_key_value(), None);
        assert_eq!(tree.iter().count(), 0);
        tree.validate().unwrap();

        // still usable after clearing
        assert!(tree.put(5, "e"));
        assert_eq!(root_of(&tree), Some((5, Color::Black)));
    }

    #[test]
    fn for_each_stops_early() {
        let tree: RBTree<_, _> = (0..100).map(|i| (i, i * i)).collect();

        let mut seen = vec![];
        let visited_all = tree.for_each(|&k, &v| {
            seen.push((k, v));
            seen.len() < 2
        });
        assert!(!visited_all);
        assert_eq!(seen, [(0, 0), (1, 1)]);

        let mut count = 0;
        assert!(tree.for_each(|_, _| { count += 1; true }));
        assert_eq!(count, 100);
    }

    #[test]
    fn custom_comparators() {
        let mut tree = RBTree::with_comparator(Reverse(Natural));
        tree.extend([(1, ()), (3, ()), (2, ())]);
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);

        let mut by_len = RBTree::with_comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()));
        assert!(by_len.put("aaa", 3));
        assert!(by_len.put("b", 1));
        // same length means same key
        assert!(!by_len.put("ccc", 33));
        assert_eq!(by_len.len(), 2);
        assert_eq!(by_len.get(&"zzz"), Some(&33));
        by_len.validate().unwrap();
    }

    #[test]
    fn retain_removes_rejected_entries() {
        let mut tree: RBTree<_, _> = (0..200).map(|i| (i, i)).collect();
        tree.retain(|&k, v| {
            *v += 1;
            k % 3 == 0
        });
        tree.validate().unwrap();
        assert_eq!(tree.len(), 67);
        assert!(tree.iter().all(|(&k, &v)| k % 3 == 0 && v == k + 1));

        tree.retain(|_, _| false);
        assert!(tree.is_empty());
        tree.validate().unwrap();
    }

    #[test]
    fn clone_and_eq() {
        let tree: RBTree<_, _> = (0..50).map(|i| (i, i.to_string())).collect();
        let copy = tree.clone();
        copy.validate().unwrap();
        assert_eq!(tree, copy);
        assert_eq!(tree.height(), copy.height());

        let mut other = copy.clone();
        other.put(0, "zero".to_string());
        assert_ne!(tree, other);
        other.delete(&0);
        assert_ne!(tree, other);

        assert_eq!(format!("{:?}", RBTree::<_, _>::from_iter([(1, 'a'), (2, 'b')])), "{1: 'a', 2: 'b'}");
    }

    #[test]
    fn every_value_is_dropped_once() {
        let counter = DropCounter::default();

        let mut tree = RBTree::new();
        for i in 0..64 {
            tree.put(i, counter.make());
        }
        // overwriting drops the old value
        tree.put(0, counter.make());
        assert_eq!(counter.drops(), 1);

        assert!(tree.delete(&10));
        drop(tree.remove(&11));
        assert_eq!(counter.drops(), 3);

        tree.clear();
        assert_eq!(counter.drops(), 65);

        for i in 0..64 {
            tree.put(i, counter.make());
        }
        drop(tree);
        assert_eq!(counter.drops(), 129);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_missing_key() {
        let tree: RBTree<i32, i32> = RBTree::new();
        let _value = tree[&1];
    }
}
