//! Spans - selections in source text
//!
//! Each highlighted piece of input takes up some space, it's not just a point
//! like a [`Caret`], but a selection with a beginning and end which might span
//! across lines or even be empty.

use std::cmp::{max, min};
use std::fmt;

use crate::caret::Caret;

/// A contiguous span between two carets in a source document. The span of
/// "the" is between the `|`s in "|the|", i.e. it's between 0 and _3_, even
/// though `e` is character _2_.
#[derive(Clone, Debug, Default, Copy, Eq, Hash, PartialEq)]
pub struct Span {
    start: Caret,
    end: Caret,
}

impl Span {
    /// Return a new span over the two carets.
    ///
    /// The carets do not need to be sorted.
    pub fn new(l1: Caret, l2: Caret) -> Self {
        let start = min(l1, l2);
        let end = max(l1, l2);
        Self { start, end }
    }

    /// Where the span starts.
    pub fn start(&self) -> Caret {
        self.start
    }

    /// Where the span ends.
    pub fn end(&self) -> Caret {
        self.end
    }

    /// Is the span only a single point?
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The intersection of two spans, if they overlap, and [`None`] if they do
    /// not. An empty span touching the other counts as overlapping, so that
    /// empty highlights can still be drawn.
    pub fn intersection(&self, other: Span) -> Option<Span> {
        let lower_end = min(self.end(), other.end());
        let higher_start = max(self.start(), other.start());

        if lower_end > higher_start
            || (lower_end == higher_start && (self.is_empty() || other.is_empty()))
        {
            Some(Span::new(higher_start, lower_end))
        } else {
            None
        }
    }
}

impl ::std::ops::Add for Span {
    type Output = Self;

    /// Adding spans returns a new span which covers all of each of the spans
    /// given (and any characters in between.)
    fn add(self, other: Self) -> Self {
        let start = min(self.start, other.start);
        let end = max(self.end, other.end);
        Self::new(start, end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
