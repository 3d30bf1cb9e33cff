//! Match results.
//!
//! Attempting to match a parser at some position always produces a [`Match`],
//! and ordinary parse failures are just data. Nothing in the engine returns an
//! `Err` or panics because the input didn't fit the grammar.

use std::any::{type_name, Any};
use std::fmt;
use std::rc::Rc;

use crate::span::Span;

/// A matched value, with its type erased so parsers producing different types
/// can live in the same grammar.
///
/// The typed [`Parser`][crate::Parser] API is what guarantees the value
/// inside has the type the parser says it does.
pub type Value = Rc<dyn Any>;

/// The result of trying to match a parser at some position.
#[derive(Clone, Debug, PartialEq)]
pub enum Match<T = Value> {
    /// The parser consumed `span` and produced `value`.
    Success { span: Span, value: T },

    /// The parser failed. The span is where the failure is anchored, which is
    /// as far as the parser got before failing.
    Failure { message: Rc<str>, span: Span },
}

impl<T> Match<T> {
    pub fn success(span: Span, value: T) -> Self {
        Match::Success { span, value }
    }

    pub fn failure(message: impl Into<Rc<str>>, span: Span) -> Self {
        Match::Failure {
            message: message.into(),
            span,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Match::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn span(&self) -> Span {
        match self {
            Match::Success { span, .. } | Match::Failure { span, .. } => *span,
        }
    }

    /// The value of a successful match.
    pub fn value(&self) -> Option<&T> {
        match self {
            Match::Success { value, .. } => Some(value),
            Match::Failure { .. } => None,
        }
    }

    /// The message of a failed match.
    pub fn message(&self) -> Option<&str> {
        match self {
            Match::Success { .. } => None,
            Match::Failure { message, .. } => Some(message.as_ref()),
        }
    }

    /// Continue with `f` on a successful match. Failures are passed along
    /// unchanged.
    pub fn and_then<U>(self, f: impl FnOnce(Span, T) -> Match<U>) -> Match<U> {
        match self {
            Match::Success { span, value } => f(span, value),
            Match::Failure { message, span } => Match::Failure { message, span },
        }
    }

    /// Replace the value of a successful match, keeping its span.
    pub fn map<U>(self, f: impl FnOnce(Span, T) -> U) -> Match<U> {
        self.and_then(|span, value| Match::success(span, f(span, value)))
    }

    /// Of two failures, the one which got further into the input. Ties go to
    /// `self`, which is the one tried first.
    pub(crate) fn farther(self, other: Match<T>) -> Match<T> {
        if other.span().end() > self.span().end() {
            other
        } else {
            self
        }
    }

    pub fn into_result(self) -> Result<(Span, T), (Rc<str>, Span)> {
        match self {
            Match::Success { span, value } => Ok((span, value)),
            Match::Failure { message, span } => Err((message, span)),
        }
    }
}

impl Match<Value> {
    /// Recover the typed value of an erased match.
    pub(crate) fn typed<T: Clone + 'static>(self) -> Match<T> {
        self.map(|_, value| recover(&value))
    }
}

impl<T: fmt::Debug> fmt::Display for Match<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Match::Success { span, value } => write!(f, "success {span}: {value:?}"),
            Match::Failure { message, span } => write!(f, "failure {span}: {message}"),
        }
    }
}

/// What a transform function decides to do with a successful match.
///
/// Returning [`Verdict::Reject`] turns the match into a failure, which makes
/// the enclosing alternatives backtrack as if the input never matched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict<T> {
    Accept(T),
    Reject,
}

impl<T> Verdict<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Verdict<U> {
        match self {
            Verdict::Accept(value) => Verdict::Accept(f(value)),
            Verdict::Reject => Verdict::Reject,
        }
    }
}

impl<T> From<Option<T>> for Verdict<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Verdict::Accept(value),
            None => Verdict::Reject,
        }
    }
}

/// The failure message given to matches a transform rejected.
pub(crate) const REJECTED: &str = "rejected";

pub(crate) fn erase<T: 'static>(value: T) -> Value {
    Rc::new(value)
}

/// Get a typed copy of an erased value back out.
///
/// # Panics
///
/// If the value isn't a `T`. The typed combinators make this impossible, so
/// reaching it means the grammar graph itself is broken.
pub(crate) fn recover<T: Clone + 'static>(value: &Value) -> T {
    match value.downcast_ref::<T>() {
        Some(value) => value.clone(),
        None => panic!("matched value is not a {}", type_name::<T>()),
    }
}

/// Collect erased values into an erased `Vec<T>`.
pub(crate) fn collect<T: Clone + 'static>(values: &[Value]) -> Value {
    erase(values.iter().map(recover::<T>).collect::<Vec<T>>())
}
