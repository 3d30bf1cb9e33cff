//! A packrat parser-combinator engine.
//!
//! Grammars are built out of [`Parser`] values: leaves like [`literal`] and
//! [`pattern`], put together with combinators like [`chain`], [`alt`] and
//! [`Parser::many`]. Building a parser doesn't do anything yet. A parser is a
//! lazy description of a graph of nodes, which can refer to itself through
//! [`Parser::lazy`].
//!
//! Before it's used, the graph is resolved in a [`Grammar`]. Resolving forces
//! each lazy reference once, and makes sure structurally identical nodes are
//! shared, so recursive rules end up as a finite graph with cycles in it.
//!
//! An [`Engine`] resolves parsers and matches them against some input. It
//! doesn't use the native stack to do that. Each node's matcher returns
//! [`Step`]s saying what it needs next, and a queue-driven scheduler runs
//! them, remembering every result so each node is only tried once at each
//! position.
//!
//! ```
//! use parser::{alt, chain, literal, pattern, Engine, Parser, Text};
//!
//! fn sum() -> Parser<Text, u32> {
//!     alt([
//!         chain(number().skip(literal("+")), Parser::lazy(sum), |a, b| a + b),
//!         number(),
//!     ])
//! }
//!
//! fn number() -> Parser<Text, u32> {
//!     pattern("[0-9]+").map(|digits| digits.parse().unwrap_or(0))
//! }
//!
//! let mut engine = Engine::new();
//! assert_eq!(engine.run(&sum(), &Text::new("1+2+39")).unwrap(), 42);
//! assert!(engine.run(&sum(), &Text::new("1+")).is_err());
//! ```
//!
//! Failing to match isn't an error. [`Engine::execute`] produces a [`Match`],
//! which is either a success or the failure which got furthest into the
//! input. Only [`Engine::run`], which needs the whole input to match, turns
//! failures into a [`ParseError`].

mod combinator;
mod engine;
mod matching;
mod span;

pub mod error;
pub mod graph;
pub mod leaf;
pub mod scheduler;
pub mod sequence;

#[cfg(feature = "trace")]
mod tracing;

pub use crate::{
    combinator::{alt, chain, repeat, separated, sequence, try_chain, Parser},
    engine::{Engine, EngineOptions},
    error::{Error, ParseError, ResolveError},
    graph::{
        Child, Describe, Grammar, GrammarId, Lazy, Node, NodeId, ResolvedNode, Thunk, ThunkId,
    },
    leaf::{any, end, fail, identifier, item, leaf, literal, pattern, satisfy, succeed},
    matching::{Match, Value, Verdict},
    scheduler::{matcher, Matcher, Step},
    sequence::{Literal, Sequence, Text},
    span::Span,
};
