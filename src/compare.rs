//! Orderings used to arrange keys inside an [`RBTree`].
//!
//! An ordering must be a strict total order over every key that ends up in the same tree, and it
//! must give the same answer every time it is asked. The tree cannot detect a broken ordering; it
//! will simply stop finding keys (see [`RBTree::validate`] for a way to notice after the fact).
//!
//! [`RBTree`]: crate::RBTree
//! [`RBTree::validate`]: crate::RBTree::validate

use core::cmp::Ordering;


/// A total order over `K`.
///
/// Any `Fn(&K, &K) -> Ordering` closure is a comparator, so most callers never implement this
/// by hand.
pub trait Comparator<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The ordering given by `K`'s [`Ord`] impl.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Flips another comparator, e.g. `Reverse(Natural)` keeps keys in descending order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reverse<C = Natural>(pub C);

impl<K: ?Sized, C: Comparator<K>> Comparator<K> for Reverse<C> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<K: ?Sized, F> Comparator<K> for F where F: Fn(&K, &K) -> Ordering {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
