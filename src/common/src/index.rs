//! Index types.
//!
//! Arenas hand out an [`Index`] for each thing they store instead of a
//! reference. The type parameter is the kind of thing the index is for, so the
//! type checker stops an index into one arena from being used with another.
//!
//! Since it's a struct with [`PhantomData`], it takes up no more space than the
//! `u32` inside it.

use std::{
    fmt::{Display, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// An index into some arena of `T`s.
///
/// This is a 'newtype' wrapper since we don't want people creating new
/// arbitrary indices or carelessly doing math on them.
// NOTE: Since `derive` is a conditional impl on the generic parameters, we
//       can't really trust those to do the right thing -- `T` doesn't impact
//       if we can compare/copy/hash indexes.
pub struct Index<T>(u32, PhantomData<fn() -> T>);

impl<T> Index<T> {
    /// Create a new index from a u32.
    #[inline(always)]
    pub const fn new(n: u32) -> Index<T> {
        Index(n, PhantomData)
    }

    /// Create the index for the next slot of a collection currently holding
    /// `len` items, or [`None`] if that would overflow.
    pub fn for_len(len: usize) -> Option<Index<T>> {
        u32::try_from(len).ok().map(Index::new)
    }

    /// Cast the [`Index`] into a [`usize`].
    #[inline(always)]
    pub fn as_usize(self) -> usize {
        self.0 as _
    }
}

impl<T> Clone for Index<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Index<T> {}

impl<T> Eq for Index<T> {}

impl<T> PartialEq for Index<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Ord for Index<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<T> PartialOrd for Index<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for Index<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> std::fmt::Debug for Index<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl<T> Display for Index<T> {
    fn fmt(&self, f: &mut Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}
