//! The engine, which is what callers use to actually parse things.
//!
//! An [`Engine`] owns a [`Grammar`], so parsers it's given are resolved once
//! and stay resolved across calls. Each call to [`Engine::execute`] or
//! [`Engine::run`] gets a fresh [`Scheduler`] and memo table.

use std::collections::HashMap;

use crate::combinator::{consume_node, Parser};
use crate::error::{Error, ParseError, ResolveError};
use crate::graph::{Grammar, Lazy, NodeId};
use crate::matching::Match;
use crate::scheduler::Scheduler;
use crate::sequence::Sequence;
use crate::span::Span;

/// Settings for a single call to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineOptions {
    /// Remember the result of every node at every position. Turning this off
    /// means repeated work when alternatives share a prefix, but less memory.
    pub memoize: bool,

    /// Where in the input to start matching.
    pub start: usize,

    /// The most scheduler steps to take before giving up. A match which runs
    /// out of steps fails.
    pub step_limit: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            memoize: true,
            start: 0,
            step_limit: None,
        }
    }
}

impl EngineOptions {
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn with_start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }
}

/// Resolves parsers and runs them against inputs.
pub struct Engine<S: Sequence> {
    grammar: Grammar<S>,
    options: EngineOptions,
    /// The whole-input version of each node [`Engine::run`] has been given.
    consuming: HashMap<NodeId, NodeId>,
}

impl<S: Sequence> Default for Engine<S> {
    fn default() -> Self {
        Engine::new()
    }
}

impl<S: Sequence> Engine<S> {
    pub fn new() -> Self {
        Engine::with_options(EngineOptions::default())
    }

    /// An engine which uses `options` unless a call says otherwise.
    pub fn with_options(options: EngineOptions) -> Self {
        Engine {
            grammar: Grammar::new(),
            options,
            consuming: HashMap::new(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn grammar(&self) -> &Grammar<S> {
        &self.grammar
    }

    pub fn grammar_mut(&mut self) -> &mut Grammar<S> {
        &mut self.grammar
    }

    /// Resolve `parser` in this engine's grammar ahead of time.
    ///
    /// The parser returned only works with this engine.
    pub fn resolve<O>(&mut self, parser: &Parser<S, O>) -> Result<Parser<S, O>, ResolveError> {
        parser.resolve_in(&mut self.grammar)
    }

    /// Match `parser` against `input`, as far as it gets.
    ///
    /// The only errors are problems with the grammar. Whether or not the input
    /// matched is in the [`Match`].
    pub fn execute<O>(&mut self, parser: &Parser<S, O>, input: &S) -> Result<Match<O>, ResolveError>
    where
        O: Clone + 'static,
    {
        let options = self.options;
        self.execute_with(parser, input, &options)
    }

    /// Like [`Engine::execute`], with different options for this call.
    pub fn execute_with<O>(
        &mut self,
        parser: &Parser<S, O>,
        input: &S,
        options: &EngineOptions,
    ) -> Result<Match<O>, ResolveError>
    where
        O: Clone + 'static,
    {
        let root = self.grammar.resolve(parser.as_lazy())?;
        Ok(self.execute_node(root, input, options).typed())
    }

    /// Match `parser` against all of `input`, producing its value.
    pub fn run<O>(&mut self, parser: &Parser<S, O>, input: &S) -> Result<O, Error>
    where
        O: Clone + 'static,
    {
        let options = self.options;
        self.run_with(parser, input, &options)
    }

    /// Like [`Engine::run`], with different options for this call.
    pub fn run_with<O>(
        &mut self,
        parser: &Parser<S, O>,
        input: &S,
        options: &EngineOptions,
    ) -> Result<O, Error>
    where
        O: Clone + 'static,
    {
        let root = self.grammar.resolve(parser.as_lazy())?;
        let root = self.consuming(root)?;

        match self.execute_node(root, input, options).typed::<O>() {
            Match::Success { value, .. } => Ok(value),
            Match::Failure { message, span } => Err(ParseError::new(message.as_ref(), span, input).into()),
        }
    }

    /// The node matching `root` and then the end of the input.
    fn consuming(&mut self, root: NodeId) -> Result<NodeId, ResolveError> {
        if let Some(id) = self.consuming.get(&root) {
            return Ok(*id);
        }

        let id = self.grammar.resolve(&Lazy::node(consume_node(self.grammar.handle(root))))?;
        self.consuming.insert(root, id);
        Ok(id)
    }

    fn execute_node(&self, root: NodeId, input: &S, options: &EngineOptions) -> Match {
        if options.start > input.len() {
            let message = format!("start position {} is past the end of the input", options.start);
            return Match::failure(message, Span::at(input.len()));
        }

        Scheduler::new(&self.grammar, input, options).run(root, options.start)
    }
}
