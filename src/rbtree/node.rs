use core::marker::PhantomData;
use core::ptr::{self, NonNull};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Color {
    Red,
    Black,
}

/// Which child slot of a node we are talking about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(super) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

pub(super) struct Node<K, V> {
    key: K,
    value: V,
    color: Color,
    // `left` and `right` own their targets, `parent` only points back up.
    left: Option<NodePtr<K, V>>,
    right: Option<NodePtr<K, V>>,
    parent: Option<NodePtr<K, V>>,
}

/// A handle to a node that is owned by some `RBTree`.
///
/// The critical invariant of this type is that every `NodePtr` that is reachable from a tree's root
/// (or handed out by one of the tree's methods) points to a live allocation made by
/// [`NodePtr::alloc`], which is only ever freed by [`NodePtr::dealloc`] once it has been unlinked.
/// The color and link accessors rely on this, which is why this type never leaves the `rbtree`
/// module.
pub(super) struct NodePtr<K, V>(NonNull<Node<K, V>>, PhantomData<Box<Node<K, V>>>);

impl<K, V> Copy for NodePtr<K, V> {}
impl<K, V> Clone for NodePtr<K, V> {
    fn clone(&self) -> Self { *self }
}

// node identity, not key equality
impl<K, V> PartialEq for NodePtr<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl<K, V> Eq for NodePtr<K, V> {}

impl<K, V> core::fmt::Debug for NodePtr<K, V> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "NodePtr({:016x?}, {:?})", self.0, self.color())
    }
}

/// Absent children count as black.
#[inline]
pub(super) fn is_red<K, V>(link: Option<NodePtr<K, V>>) -> bool {
    link.is_some_and(|node| node.color() == Color::Red)
}

impl<K, V> NodePtr<K, V> {
    /// Allocates a new, red, childless node hanging off `parent`.
    ///
    /// The caller still has to store the result in `parent`'s child slot (or the root).
    pub(super) fn alloc(key: K, value: V, parent: Option<Self>) -> Self {
        let node = Box::new(Node {
            key,
            value,
            color: Color::Red,
            left: None,
            right: None,
            parent,
        });
        NodePtr(NonNull::from(Box::leak(node)), PhantomData)
    }

    /// Frees the node, handing back its entry.
    ///
    /// SAFETY: the node must have been unlinked from its tree, and no other `NodePtr` to it may be
    ///         used afterwards.
    pub(super) unsafe fn dealloc(self) -> (K, V) {
        // SAFETY: asserted by caller, and the allocation came from `Box` in `alloc`
        let node = unsafe { Box::from_raw(self.0.as_ptr()) };
        (node.key, node.value)
    }

    #[inline]
    fn raw(self) -> *mut Node<K, V> {
        self.0.as_ptr()
    }

    #[inline]
    pub(super) fn color(self) -> Color {
        // SAFETY: `NodePtr`s always point to live nodes (see type-level docs)
        unsafe { (*self.raw()).color }
    }

    #[inline]
    pub(super) fn set_color(self, color: Color) {
        // SAFETY: same as `color`
        unsafe { (*self.raw()).color = color }
    }

    #[inline]
    pub(super) fn left(self) -> Option<Self> {
        // SAFETY: same as `color`
        unsafe { (*self.raw()).left }
    }

    #[inline]
    pub(super) fn right(self) -> Option<Self> {
        // SAFETY: same as `color`
        unsafe { (*self.raw()).right }
    }

    #[inline]
    pub(super) fn parent(self) -> Option<Self> {
        // SAFETY: same as `color`
        unsafe { (*self.raw()).parent }
    }

    #[inline]
    pub(super) fn set_left(self, child: Option<Self>) {
        // SAFETY: same as `color`
        unsafe { (*self.raw()).left = child }
    }

    #[inline]
    pub(super) fn set_right(self, child: Option<Self>) {
        // SAFETY: same as `color`
        unsafe { (*self.raw()).right = child }
    }

    #[inline]
    pub(super) fn set_parent(self, parent: Option<Self>) {
        // SAFETY: same as `color`
        unsafe { (*self.raw()).parent = parent }
    }

    #[inline]
    pub(super) fn child(self, side: Side) -> Option<Self> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    #[inline]
    pub(super) fn set_child(self, side: Side, child: Option<Self>) {
        match side {
            Side::Left => self.set_left(child),
            Side::Right => self.set_right(child),
        }
    }

    /// The slot of `self` that holds `child`.
    #[inline]
    pub(super) fn side_of(self, child: Self) -> Side {
        if self.left() == Some(child) { Side::Left } else { Side::Right }
    }

    /// SAFETY: the node must stay alive, and its key must not be swapped out, for all of `'a`.
    #[inline]
    pub(super) unsafe fn key<'a>(self) -> &'a K {
        // SAFETY: asserted by caller
        unsafe { &(*self.raw()).key }
    }

    /// SAFETY: the node must stay alive, and its entry must not be swapped out, for all of `'a`.
    #[inline]
    pub(super) unsafe fn key_value<'a>(self) -> (&'a K, &'a V) {
        // SAFETY: asserted by caller
        unsafe { (&(*self.raw()).key, &(*self.raw()).value) }
    }

    /// SAFETY: same as `key_value`, and nobody else may look at this value during `'a`.
    #[inline]
    pub(super) unsafe fn key_value_mut<'a>(self) -> (&'a K, &'a mut V) {
        // SAFETY: asserted by caller
        unsafe { (&(*self.raw()).key, &mut (*self.raw()).value) }
    }

    /// Exchanges the entries of two nodes, leaving their colors and links alone.
    ///
    /// SAFETY: no references into either entry may be alive.
    pub(super) unsafe fn swap_entries(self, other: Self) {
        if self == other { return }
        let (a, b) = (self.raw(), other.raw());
        // SAFETY: the nodes are distinct and live, and asserted by caller
        unsafe {
            ptr::swap(&raw mut (*a).key, &raw mut (*b).key);
            ptr::swap(&raw mut (*a).value, &raw mut (*b).value);
        }
    }
}
