//! The parser graph.
//!
//! Grammars are built out of [`Node`]s, which refer to their children
//! lazily through [`Lazy`] references. Nothing is checked or compiled while a
//! grammar is being built, which is what lets a rule refer to itself (or to
//! rules defined later) through a [`Thunk`].
//!
//! A [`Grammar`] turns these into resolved nodes living in an arena, each with
//! a [`NodeId`] and a [`Matcher`][crate::scheduler::Matcher].

mod grammar;

use std::any::TypeId;
use std::fmt;
use std::mem::size_of;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::Index;

use crate::matching::Value;
use crate::scheduler::Matcher;
use crate::sequence::{Literal, Sequence};

pub use self::grammar::{Grammar, ResolvedNode};

/// Marker for the arena of resolved parser nodes.
#[derive(Debug)]
pub enum ParserSlot {}

/// The identity of a resolved parser node in a [`Grammar`].
pub type NodeId = Index<ParserSlot>;

/// Which [`Grammar`] a [`NodeId`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GrammarId(usize);

impl GrammarId {
    fn fresh() -> GrammarId {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        GrammarId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Builds the matcher for a node once its children are resolved.
pub type Generate<S> = Box<dyn Fn(&[Child]) -> Matcher<S>>;

/// A resolved child, as seen by the generator of its parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Child {
    pub id: NodeId,
    /// The child's description, or `"..."` if it's still being resolved
    /// because the grammar is recursive.
    pub description: Rc<str>,
}

/// How a node describes itself in terms of its children's descriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Describe {
    /// The name, followed by the children: `name a b`.
    Prefix,
    /// The children with a separator between them: `a | b`.
    Infix(&'static str),
    /// The only child, followed by a suffix: `a*`.
    Postfix(String),
    /// A fixed label, for leaves: `"abc"`.
    Label(String),
}

/// An unresolved node in a parser graph.
///
/// Nodes are normally made by the combinators in this crate, but anything can
/// build one to add new kinds of parsers.
pub struct Node<S: Sequence> {
    name: String,
    children: Vec<Lazy<S>>,
    cacheable: bool,
    describe: Describe,
    generate: Generate<S>,
}

impl<S: Sequence> Node<S> {
    /// A new interior node. Nodes are not cacheable unless marked with
    /// [`Node::cacheable`].
    pub fn new(
        name: impl Into<String>,
        children: Vec<Lazy<S>>,
        generate: impl Fn(&[Child]) -> Matcher<S> + 'static,
    ) -> Node<S> {
        Node {
            name: name.into(),
            children,
            cacheable: false,
            describe: Describe::Prefix,
            generate: Box::new(generate),
        }
    }

    /// Mark if structurally identical copies of this node can be shared.
    ///
    /// This must only be set on nodes which behave the same as any other node
    /// with the same name and children. Anything holding a function or value
    /// from its caller can't promise that.
    pub fn cacheable(mut self, cacheable: bool) -> Node<S> {
        self.cacheable = cacheable;
        self
    }

    pub fn describe(mut self, describe: Describe) -> Node<S> {
        self.describe = describe;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Lazy<S>] {
        &self.children
    }

    pub fn is_cacheable(&self) -> bool {
        self.cacheable
    }
}

impl<S: Sequence> fmt::Debug for Node<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("children", &self.children)
            .field("cacheable", &self.cacheable)
            .finish_non_exhaustive()
    }
}

/// A lazy reference to a parser.
///
/// These are the only things which can be children of a [`Node`]. Which
/// parser is meant isn't worked out until the grammar is resolved.
pub enum Lazy<S: Sequence> {
    /// A node.
    Node(Rc<Node<S>>),
    /// A node which has already been resolved by a grammar. Other grammars
    /// refuse it.
    Handle(GrammarId, NodeId),
    /// Some data, which the [`Sequence`] knows how to turn into a leaf.
    Literal(Literal),
    /// Parts to match one after the other.
    Sequence(Rc<Sequenced<S>>),
    /// A parser which isn't built until it's needed.
    Thunk(Thunk<S>),
}

impl<S: Sequence> Lazy<S> {
    pub fn node(node: Node<S>) -> Lazy<S> {
        Lazy::Node(Rc::new(node))
    }
}

impl<S: Sequence> Clone for Lazy<S> {
    fn clone(&self) -> Self {
        match self {
            Lazy::Node(node) => Lazy::Node(node.clone()),
            Lazy::Handle(grammar, id) => Lazy::Handle(*grammar, *id),
            Lazy::Literal(literal) => Lazy::Literal(literal.clone()),
            Lazy::Sequence(parts) => Lazy::Sequence(parts.clone()),
            Lazy::Thunk(thunk) => Lazy::Thunk(thunk.clone()),
        }
    }
}

impl<S: Sequence> fmt::Debug for Lazy<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Lazy::Node(node) => write!(f, "{}", node.name),
            Lazy::Handle(_, id) => write!(f, "{:?}", id),
            Lazy::Literal(literal) => write!(f, "{}", literal),
            Lazy::Sequence(parts) => f.debug_list().entries(&parts.parts).finish(),
            Lazy::Thunk(thunk) => write!(f, "{:?}", thunk.id),
        }
    }
}

/// An implicit sequence of parsers.
///
/// The values matched by each part are put into a list by `collect`, which
/// knows the type the parts produce.
pub struct Sequenced<S: Sequence> {
    pub(crate) parts: Vec<Lazy<S>>,
    pub(crate) collect: fn(&[Value]) -> Value,
}

/// What makes two thunks the same thunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ThunkId {
    /// Closures which capture nothing (and functions) are the same if they
    /// have the same type, since they're the same code.
    Type(TypeId),
    /// Anything else is only the same as itself.
    Address(usize),
}

/// A parser which is built on demand.
///
/// This is how a grammar refers to itself. Each thunk is only ever forced once
/// by a [`Grammar`], no matter how many times it appears.
pub struct Thunk<S: Sequence> {
    id: ThunkId,
    force: Rc<dyn Fn() -> Lazy<S>>,
}

impl<S: Sequence> Thunk<S> {
    pub fn new<F>(f: F) -> Thunk<S>
    where
        F: Fn() -> Lazy<S> + 'static,
    {
        let zero_sized = size_of::<F>() == 0;
        let force: Rc<dyn Fn() -> Lazy<S>> = Rc::new(f);

        let id = if zero_sized {
            ThunkId::Type(TypeId::of::<F>())
        } else {
            ThunkId::Address(Rc::as_ptr(&force) as *const () as usize)
        };

        Thunk { id, force }
    }

    pub fn id(&self) -> ThunkId {
        self.id
    }

    pub(crate) fn force(&self) -> Lazy<S> {
        (self.force)()
    }
}

impl<S: Sequence> Clone for Thunk<S> {
    fn clone(&self) -> Self {
        Thunk {
            id: self.id,
            force: self.force.clone(),
        }
    }
}
