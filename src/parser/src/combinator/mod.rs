//! Combinators, and the typed [`Parser`] handle they work with.
//!
//! Everything in the parser graph is type-erased, so that nodes producing
//! different types can be each other's children. A [`Parser<S, O>`] is a
//! lazy reference to a node which is known to produce an `O` when matching a
//! `S`, and the combinators here only ever put them together in ways which
//! keep that true.

mod choice;
mod lookahead;
mod repetition;
mod sequencing;
mod transform;

use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::engine::{Engine, EngineOptions};
use crate::error::{Error, ResolveError};
use crate::graph::{Grammar, Lazy, Node, NodeId, Thunk};
use crate::matching::Match;
use crate::sequence::Sequence;

pub use self::{
    choice::alt,
    repetition::{repeat, separated},
    sequencing::{chain, sequence, try_chain},
};

pub(crate) use self::{sequencing::consume_node, sequencing::sequence_node};

/// A parser matching `S`s, producing `O`s.
///
/// Parsers are cheap to clone, and clones refer to the same node. They also
/// share the [`Engine`] used by [`Parser::execute`] and [`Parser::run`], so
/// the grammar is only resolved the first time one of them is used.
pub struct Parser<S: Sequence, O> {
    lazy: Lazy<S>,
    engine: Rc<RefCell<Option<Engine<S>>>>,
    output: PhantomData<fn() -> O>,
}

impl<S: Sequence, O> Parser<S, O> {
    /// A parser for whatever a lazy reference turns out to be.
    ///
    /// Nothing checks that it does produce an `O`, so this is for building new
    /// kinds of parsers.
    pub fn from_lazy(lazy: Lazy<S>) -> Self {
        Parser {
            lazy,
            engine: Rc::default(),
            output: PhantomData,
        }
    }

    /// A parser for a node. Like [`Parser::from_lazy`], the node must produce
    /// an `O`.
    pub fn from_node(node: Node<S>) -> Self {
        Parser::from_lazy(Lazy::node(node))
    }

    /// A parser which isn't built until the grammar is resolved.
    ///
    /// This is how rules refer to themselves:
    ///
    /// ```
    /// # use parser::{alt, chain, literal, Parser, Text};
    /// fn parens() -> Parser<Text, usize> {
    ///     alt([
    ///         chain(literal("("), Parser::lazy(parens).skip(literal(")")), |_, n| n + 1),
    ///         literal("").to(0),
    ///     ])
    /// }
    ///
    /// assert_eq!(parens().run(&Text::new("((()))")).unwrap(), 3);
    /// ```
    ///
    /// `f` is only ever called once per grammar, no matter how often the
    /// result is used. If `f` is a function (or a closure which captures
    /// nothing), every lazy parser made from it counts as the same one.
    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn() -> Parser<S, O> + 'static,
    {
        Parser::from_lazy(Lazy::Thunk(Thunk::new(move || f().into_lazy())))
    }

    pub fn as_lazy(&self) -> &Lazy<S> {
        &self.lazy
    }

    pub fn into_lazy(self) -> Lazy<S> {
        self.lazy
    }

    /// Resolve this parser, returning a parser which refers straight to the
    /// resolved node.
    ///
    /// Resolving that parser again does nothing, and it can be run like this
    /// one.
    pub fn resolve(&self) -> Result<Parser<S, O>, ResolveError> {
        let lazy = self.with_engine(|engine| -> Result<Lazy<S>, ResolveError> {
            let id = engine.grammar_mut().resolve(&self.lazy)?;
            Ok(engine.grammar().handle(id))
        })?;

        Ok(Parser {
            lazy,
            engine: self.engine.clone(),
            output: PhantomData,
        })
    }

    /// Resolve this parser in `grammar`. The parser returned only works with
    /// that grammar.
    pub fn resolve_in(&self, grammar: &mut Grammar<S>) -> Result<Parser<S, O>, ResolveError> {
        let id = grammar.resolve(&self.lazy)?;
        Ok(Parser::from_lazy(grammar.handle(id)))
    }

    /// The resolved node this refers to, if it was returned by
    /// [`Parser::resolve`] or [`Parser::resolve_in`].
    pub fn handle(&self) -> Option<NodeId> {
        match self.lazy {
            Lazy::Handle(_, id) => Some(id),
            _ => None,
        }
    }

    fn with_engine<T>(&self, f: impl FnOnce(&mut Engine<S>) -> T) -> T {
        match self.engine.try_borrow_mut() {
            Ok(mut engine) => f(engine.get_or_insert_with(Engine::new)),
            // Used again while it's matching, from inside one of its own
            // functions.
            Err(_) => f(&mut Engine::new()),
        }
    }
}

impl<S: Sequence, O: Clone + 'static> Parser<S, O> {
    /// Match this and then the end of the input, so the whole input must
    /// match.
    pub fn consume(&self) -> Parser<S, O> {
        Parser::from_node(consume_node(self.lazy.clone()))
    }

    /// Match against the start of `input`.
    pub fn execute(&self, input: &S) -> Result<Match<O>, ResolveError> {
        self.with_engine(|engine| engine.execute(self, input))
    }

    /// Match all of `input`.
    pub fn run(&self, input: &S) -> Result<O, Error> {
        self.with_engine(|engine| engine.run(self, input))
    }

    /// Like [`Parser::execute`], with `options`.
    pub fn execute_with(
        &self,
        input: &S,
        options: &EngineOptions,
    ) -> Result<Match<O>, ResolveError> {
        self.with_engine(|engine| engine.execute_with(self, input, options))
    }

    /// Like [`Parser::run`], with `options`.
    pub fn run_with(&self, input: &S, options: &EngineOptions) -> Result<O, Error> {
        self.with_engine(|engine| engine.run_with(self, input, options))
    }
}

impl<S: Sequence, O> Clone for Parser<S, O> {
    fn clone(&self) -> Self {
        Parser {
            lazy: self.lazy.clone(),
            engine: self.engine.clone(),
            output: PhantomData,
        }
    }
}

impl<S: Sequence, O> fmt::Debug for Parser<S, O> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Parser").field(&self.lazy).finish()
    }
}

impl<S: Sequence> From<&str> for Parser<S, String> {
    fn from(text: &str) -> Self {
        crate::leaf::literal(text)
    }
}

impl<S: Sequence, O: Clone + 'static> From<Vec<Parser<S, O>>> for Parser<S, Vec<O>> {
    fn from(parts: Vec<Parser<S, O>>) -> Self {
        sequence(parts)
    }
}
