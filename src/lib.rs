#![deny(unsafe_op_in_unsafe_fn)]

// ordering contract for keys
pub mod compare;

// the map itself
pub mod rbtree;

pub mod logging;

pub use compare::{Comparator, Natural, Reverse};
pub use rbtree::{InvariantViolation, IntoIter, Iter, Keys, RBTree, Values, ValuesMut};
