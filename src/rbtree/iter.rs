use core::iter::FusedIterator;
use core::marker::PhantomData;

use super::RBTree;
use super::node::NodePtr;


impl<K, V> NodePtr<K, V> {
    /// The leftmost node of this subtree.
    pub(super) fn minimum(self) -> Self {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// The rightmost node of this subtree.
    pub(super) fn maximum(self) -> Self {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// The node holding the next larger key, if any.
    pub(super) fn successor(self) -> Option<Self> {
        if let Some(right) = self.right() {
            return Some(right.minimum())
        }
        // climb until we leave a left subtree
        let mut node = self;
        while let Some(parent) = node.parent() {
            if parent.left() == Some(node) {
                return Some(parent)
            }
            node = parent;
        }
        None
    }

    /// The node holding the next smaller key, if any.
    pub(super) fn predecessor(self) -> Option<Self> {
        if let Some(left) = self.left() {
            return Some(left.maximum())
        }
        let mut node = self;
        while let Some(parent) = node.parent() {
            if parent.right() == Some(node) {
                return Some(parent)
            }
            node = parent;
        }
        None
    }
}

/// The raw cursor pair shared by all the iterators: walks inwards from both ends and stops once
/// `remaining` hits zero, so the ends never cross.
struct Range<K, V> {
    front: Option<NodePtr<K, V>>,
    back: Option<NodePtr<K, V>>,
    remaining: usize,
}

impl<K, V> Clone for Range<K, V> {
    fn clone(&self) -> Self {
        Self { front: self.front, back: self.back, remaining: self.remaining }
    }
}

impl<K, V> Range<K, V> {
    fn new<C>(tree: &RBTree<K, V, C>) -> Self {
        Self {
            front: tree.root.map(NodePtr::minimum),
            back: tree.root.map(NodePtr::maximum),
            remaining: tree.len,
        }
    }

    fn next(&mut self) -> Option<NodePtr<K, V>> {
        if self.remaining == 0 { return None }
        let node = self.front?;
        self.remaining -= 1;
        self.front = node.successor();
        Some(node)
    }

    fn next_back(&mut self) -> Option<NodePtr<K, V>> {
        if self.remaining == 0 { return None }
        let node = self.back?;
        self.remaining -= 1;
        self.back = node.predecessor();
        Some(node)
    }
}


/// Entries of an [`RBTree`] in ascending key order, see [`RBTree::iter`].
///
/// Nodes are found one at a time by walking to the in-order successor, so creating the iterator
/// is `O(log n)` and a full pass is `O(n)`.
pub struct Iter<'a, K, V> {
    range: Range<K, V>,
    _marker: PhantomData<&'a (K, V)>,
}

/// SAFETY: an `Iter` only hands out shared references, just like `&RBTree` does.
unsafe impl<K: Sync, V: Sync> Send for Iter<'_, K, V> {}
/// SAFETY: see the `Send` impl.
unsafe impl<K: Sync, V: Sync> Sync for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { range: self.range.clone(), _marker: PhantomData }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.range.next()?;
        // SAFETY: the tree is borrowed for `'a`
        Some(unsafe { node.key_value() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.range.remaining, Some(self.range.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.range.next_back()?;
        // SAFETY: the tree is borrowed for `'a`
        Some(unsafe { node.key_value() })
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}


/// Mutable access to the values of an [`RBTree`], in ascending key order.
pub struct ValuesMut<'a, K, V> {
    range: Range<K, V>,
    _marker: PhantomData<(&'a K, &'a mut V)>,
}

/// SAFETY: keys are shared and values are exclusively borrowed, like `&mut RBTree`.
unsafe impl<K: Sync, V: Send> Send for ValuesMut<'_, K, V> {}
/// SAFETY: see the `Send` impl.
unsafe impl<K: Sync, V: Sync> Sync for ValuesMut<'_, K, V> {}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.range.next()?;
        // SAFETY: the tree is mutably borrowed for `'a`, and every node is yielded at most once
        Some(unsafe { node.key_value_mut() }.1)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.range.remaining, Some(self.range.remaining))
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.range.next_back()?;
        // SAFETY: same as `next`
        Some(unsafe { node.key_value_mut() }.1)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}
impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}


/// Keys of an [`RBTree`] in ascending order.
pub struct Keys<'a, K, V>(Iter<'a, K, V>);

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}
impl<K, V> FusedIterator for Keys<'_, K, V> {}


/// Values of an [`RBTree`], in the order of their keys.
pub struct Values<'a, K, V>(Iter<'a, K, V>);

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}
impl<K, V> FusedIterator for Values<'_, K, V> {}


/// Owning iterator over the entries of an [`RBTree`], in ascending key order.
///
/// Entries that are never yielded are dropped along with the iterator.
pub struct IntoIter<K, V, C> {
    tree: RBTree<K, V, C>,
}

impl<K, V, C> Iterator for IntoIter<K, V, C> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.tree.pop_first()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.tree.len(), Some(self.tree.len()))
    }
}

impl<K, V, C> DoubleEndedIterator for IntoIter<K, V, C> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.tree.pop_last()
    }
}

impl<K, V, C> ExactSizeIterator for IntoIter<K, V, C> {}
impl<K, V, C> FusedIterator for IntoIter<K, V, C> {}


impl<K, V, C> RBTree<K, V, C> {
    /// Lazily walks the entries in ascending key order.
    ///
    /// Every call starts a fresh walk over the tree as it is now.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { range: Range::new(self), _marker: PhantomData }
    }

    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { range: Range::new(self), _marker: PhantomData }
    }
}

impl<'a, K, V, C> IntoIterator for &'a RBTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for RBTree<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, C>;

    fn into_iter(self) -> IntoIter<K, V, C> {
        IntoIter { tree: self }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_both_ways() {
        let tree: RBTree<_, _> = [5, 3, 8, 1, 4, 7, 9, 2, 6].into_iter().map(|k| (k, k * 2)).collect();

        assert!(tree.keys().copied().eq(1..=9));
        assert!(tree.keys().rev().copied().eq((1..=9).rev()));
        assert!(tree.values().copied().eq((1..=9).map(|k| k * 2)));
        assert_eq!(tree.iter().len(), 9);

        // the ends meet in the middle without overlapping
        let mut iter = tree.keys();
        let mut seen = vec![];
        while let (Some(&a), Some(&b)) = (iter.next(), iter.next_back()) {
            seen.push(a);
            seen.push(b);
        }
        assert_eq!(iter.len(), 0);
        assert_eq!(seen.len(), 8);
        assert!(!seen.contains(&5));
    }

    #[test]
    fn iterators_restart() {
        let mut tree: RBTree<_, _> = (0..10).map(|k| (k, ())).collect();
        let first: Vec<_> = tree.keys().copied().collect();
        let second: Vec<_> = (&tree).into_iter().map(|(&k, _)| k).collect();
        assert_eq!(first, second);

        tree.delete(&0);
        tree.put(10, ());
        assert!(tree.keys().copied().eq(1..=10));
    }

    #[test]
    fn mutate_values_in_place() {
        let mut tree: RBTree<_, _> = (0..10).map(|k| (k, k)).collect();
        for v in tree.values_mut() {
            *v *= 10;
        }
        assert!(tree.values().copied().eq((0..10).map(|k| k * 10)));
        if let Some(v) = tree.values_mut().next_back() {
            *v = -1;
        }
        assert_eq!(tree.get(&9), Some(&-1));
    }

    #[test]
    fn values_mut_with_borrowed_keys() {
        let names = [String::from("b"), String::from("a"), String::from("c")];
        let mut tree: RBTree<&str, Vec<usize>> = RBTree::new();
        for (i, name) in names.iter().enumerate() {
            tree.put(name.as_str(), vec![i]);
        }
        let mut values = tree.values_mut();
        values.next_back().unwrap().push(10);
        values.next().unwrap().push(20);
        assert_eq!(values.len(), 1);
        drop(values);
        assert_eq!(tree.get(&"a"), Some(&vec![1, 20]));
        assert_eq!(tree.get(&"c"), Some(&vec![2, 10]));
        assert_eq!(tree.get(&"b"), Some(&vec![0]));
    }

    #[test]
    fn into_iter_drains_in_order() {
        let tree: RBTree<_, _> = (0..20).rev().map(|k| (k, k.to_string())).collect();
        let mut iter = tree.into_iter();
        assert_eq!(iter.next(), Some((0, "0".to_string())));
        assert_eq!(iter.next_back(), Some((19, "19".to_string())));
        assert_eq!(iter.len(), 18);
        assert!(iter.map(|(k, _)| k).eq(1..19));
    }

    #[test]
    fn successor_and_predecessor() {
        let tree: RBTree<_, _> = (0..64).map(|k| (k * 2, ())).collect();
        let mut node = tree.root.unwrap().minimum();
        let mut count = 1;
        while let Some(next) = node.successor() {
            assert_eq!(next.predecessor(), Some(node));
            node = next;
            count += 1;
        }
        assert_eq!(count, 64);
        assert_eq!(node, tree.root.unwrap().maximum());
        assert_eq!(node.successor(), None);
        assert_eq!(tree.root.unwrap().minimum().predecessor(), None);
    }
}
