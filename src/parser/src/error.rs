//! Errors
//!
//! Ordinary parse failures are [`Match`][crate::Match] values, not errors.
//! The only things here are problems with a grammar, found when it's resolved,
//! and a [`ParseError`] for callers which want a whole input to parse or an
//! error.

use diagnostic::{Caret, Diagnostic, InputId};
use thiserror::Error;

use crate::graph::NodeId;
use crate::sequence::Sequence;
use crate::span::Span;

/// Problems with a grammar.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// A literal couldn't be turned into a leaf for this kind of input.
    #[error("{0}")]
    Literal(String),

    #[error("lazy parser is defined only in terms of itself")]
    SelfReference,

    #[error("no parser node {0} in this grammar")]
    UnknownNode(NodeId),

    #[error("parser node {0} was resolved by a different grammar")]
    ForeignNode(NodeId),

    #[error("too many parser nodes")]
    TooManyNodes,

    /// Something went wrong in a child of a `name` node.
    #[error("{source} (inside {name})")]
    Inside {
        name: String,
        source: Box<ResolveError>,
    },
}

impl ResolveError {
    /// Note that this error happened inside a node called `name`.
    pub fn inside(self, name: &str) -> ResolveError {
        ResolveError::Inside {
            name: name.to_string(),
            source: Box::new(self),
        }
    }

    /// The error without any of the notes about where it was.
    pub fn innermost(&self) -> &ResolveError {
        match self {
            ResolveError::Inside { source, .. } => source.innermost(),
            other => other,
        }
    }
}

/// A failure to match a whole input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message} at {location}")]
pub struct ParseError {
    message: String,
    span: Span,
    location: Caret,
    region: diagnostic::Span,
    excerpt: String,
}

impl ParseError {
    /// An error for a failed match of `input`.
    pub fn new<S: Sequence>(message: impl Into<String>, span: Span, input: &S) -> ParseError {
        let end = if span.is_empty() {
            (span.end() + 1).min(input.len())
        } else {
            span.end()
        };

        ParseError {
            message: message.into(),
            span,
            location: input.caret(span.start()),
            region: diagnostic::Span::new(input.caret(span.start()), input.caret(span.end())),
            excerpt: input.excerpt(span.start(), end),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the failure was, as positions in the input.
    pub fn span(&self) -> Span {
        self.span
    }

    /// Where the failure was, as a line and column.
    pub fn location(&self) -> Caret {
        self.location
    }

    /// The input at the failure, or the next item if the failure consumed
    /// nothing. This is empty at the end of the input.
    pub fn excerpt(&self) -> &str {
        &self.excerpt
    }

    /// Present the error nicely, as coming from `input`.
    pub fn diagnostic(&self, input: Option<InputId>) -> Diagnostic {
        let note = if self.at_end() {
            String::from("found the end of the input")
        } else {
            format!("found {}", self.excerpt)
        };

        let d = Diagnostic::new(&self.message)
            .location(self.location)
            .highlight(self.region, note);

        match input {
            Some(id) => d.input(id),
            None => d,
        }
    }

    fn at_end(&self) -> bool {
        self.span.is_empty() && matches!(self.excerpt.as_str(), "" | "\"\"" | "[]")
    }
}

/// Why [`Engine::run`][crate::Engine::run] didn't produce a value.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Text;

    #[test]
    fn nested_resolve_errors() {
        let e = ResolveError::Literal("bad".into()).inside("pattern").inside("alt");
        assert_eq!(e.to_string(), "bad (inside pattern) (inside alt)");
        assert_eq!(e.innermost(), &ResolveError::Literal("bad".into()));
    }

    #[test]
    fn parse_error_points_at_the_next_item() {
        let input = Text::new("ab\ncd");
        let e = ParseError::new("expected end of input", Span::at(4), &input);

        assert_eq!(e.location(), Caret::new(1, 1));
        assert_eq!(e.excerpt(), "\"d\"");
        assert_eq!(e.to_string(), "expected end of input at 2:2");

        let d = e.diagnostic(None);
        assert_eq!(d.get_highlights()[0].note(), Some("found \"d\""));
    }

    #[test]
    fn parse_error_at_the_end() {
        let input = Text::new("ab");
        let e = ParseError::new("expected \"c\"", Span::at(2), &input);
        let d = e.diagnostic(None);
        assert_eq!(d.get_highlights()[0].note(), Some("found the end of the input"));
    }
}
