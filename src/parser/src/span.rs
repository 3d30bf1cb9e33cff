//! Spans - the part of a [`Sequence`][crate::Sequence] a match consumed.
//!
//! These are positions into the sequence, not lines and columns. Use
//! [`Sequence::caret`][crate::Sequence::caret] to turn a position into
//! something a person can find in their editor.

use std::cmp::{max, min};
use std::fmt;

/// A half-open range `[start, end)` of positions in a sequence.
///
/// A span can be empty, which is what failures and zero-width matches (like
/// lookahead, or the end of input) have.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Span {
    start: usize,
    end: usize,
}

impl Span {
    /// A new span between two positions.
    ///
    /// The positions do not need to be sorted.
    pub fn new(p1: usize, p2: usize) -> Self {
        Span {
            start: min(p1, p2),
            end: max(p1, p2),
        }
    }

    /// An empty span sitting at `position`.
    pub fn at(position: usize) -> Self {
        Span {
            start: position,
            end: position,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// How many items the span covers.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The span from the start of this one to the end of `next`, which is
    /// what two matches in a row consumed together.
    pub fn join(self, next: Span) -> Span {
        Span::new(self.start, next.end)
    }
}

impl ::std::ops::Add for Span {
    type Output = Self;

    /// Adding spans returns a new span which covers all of each of the spans
    /// given (and anything in between.)
    fn add(self, other: Self) -> Self {
        Span::new(min(self.start, other.start), max(self.end, other.end))
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}
