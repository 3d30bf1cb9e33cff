//! The grammar registry, which resolves parser graphs.
//!
//! Resolving a [`Lazy`] reference:
//!
//! 1. forces thunks, each at most once for the life of the [`Grammar`],
//! 2. turns literals and implicit sequences into nodes,
//! 3. resolves the children of each node before the node itself,
//! 4. describes the node in terms of its children, and
//! 5. if the node is cacheable, looks for a structurally identical node
//!    which was already resolved and uses that instead.
//!
//! Every node gets a slot in the arena before its children are resolved, so
//! a node which is (indirectly) its own child finds itself in the middle of
//! being resolved and just refers to its slot. Those children are described
//! as `...`, and the nodes on the cycle are never cached.
//!
//! If anything goes wrong, all of the nodes resolved since the start of the
//! call to [`Grammar::resolve`] are thrown away.

use std::collections::HashMap;
use std::rc::Rc;

use common::Index;

use super::{Child, Describe, GrammarId, Lazy, Node, NodeId, Sequenced, Thunk, ThunkId};
use crate::combinator::sequence_node;
use crate::error::ResolveError;
use crate::scheduler::Matcher;
use crate::sequence::{Literal, Sequence};

/// How the children of a node still being resolved are described.
const IN_PROGRESS: &str = "...";

/// A resolved parser node.
pub struct ResolvedNode<S: Sequence> {
    name: String,
    children: Vec<NodeId>,
    description: Rc<str>,
    cache_key: Option<Rc<str>>,
    matcher: Matcher<S>,
}

impl<S: Sequence> ResolvedNode<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// A structural description of the node, like `"a" | "b"*`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The key this node is shared under, if it's cacheable.
    pub fn cache_key(&self) -> Option<&str> {
        self.cache_key.as_deref()
    }

    pub fn matcher(&self) -> &Matcher<S> {
        &self.matcher
    }
}

enum Entry<S: Sequence> {
    /// Being resolved.
    Reserved,
    Ready(ResolvedNode<S>),
    /// Resolved to some other node.
    Forward(NodeId),
}

/// A registry of resolved parser nodes.
///
/// Nodes are identified by their [`NodeId`], which is only meaningful for the
/// [`Grammar`] that resolved it. Handles made by [`Grammar::handle`] remember
/// which grammar that was.
pub struct Grammar<S: Sequence> {
    id: GrammarId,
    entries: Vec<Entry<S>>,
    /// Cacheable nodes, by their cache key.
    canonical: HashMap<Rc<str>, NodeId>,
    /// Every node resolved, by address. The [`Rc`] is kept so the address
    /// isn't reused while it's in the map.
    nodes: HashMap<usize, (Rc<Node<S>>, NodeId)>,
    /// Every thunk forced, and the slot its result landed in.
    thunks: HashMap<ThunkId, (Thunk<S>, NodeId)>,
    literals: HashMap<Literal, NodeId>,
    /// Implicit sequences, by address, like `nodes`.
    sequences: HashMap<usize, (Rc<Sequenced<S>>, NodeId)>,
}

impl<S: Sequence> Default for Grammar<S> {
    fn default() -> Self {
        Grammar::new()
    }
}

impl<S: Sequence> Grammar<S> {
    pub fn new() -> Self {
        Grammar {
            id: GrammarId::fresh(),
            entries: Vec::new(),
            canonical: HashMap::new(),
            nodes: HashMap::new(),
            thunks: HashMap::new(),
            literals: HashMap::new(),
            sequences: HashMap::new(),
        }
    }

    pub fn id(&self) -> GrammarId {
        self.id
    }

    /// A lazy reference to a node resolved by this grammar.
    pub fn handle(&self, id: NodeId) -> Lazy<S> {
        Lazy::Handle(self.id, self.follow(id))
    }

    /// The number of slots used in the arena, including the slots of nodes
    /// which were replaced by a shared copy.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a lazy reference to a parser.
    ///
    /// Resolving the same reference again, or a handle to the node from
    /// [`Grammar::handle`], gives back the same node. Handles from other
    /// grammars are refused.
    pub fn resolve(&mut self, lazy: &Lazy<S>) -> Result<NodeId, ResolveError> {
        let mark = self.entries.len();

        match self.resolve_lazy(lazy) {
            Ok(id) => Ok(self.follow(id)),
            Err(e) => {
                self.rollback(mark);
                Err(e)
            }
        }
    }

    /// The node a slot ended up as.
    pub fn follow(&self, mut id: NodeId) -> NodeId {
        while let Some(Entry::Forward(next)) = self.entries.get(id.as_usize()) {
            id = *next;
        }
        id
    }

    /// A resolved node.
    pub fn node(&self, id: NodeId) -> Option<&ResolvedNode<S>> {
        match self.entries.get(self.follow(id).as_usize()) {
            Some(Entry::Ready(node)) => Some(node),
            _ => None,
        }
    }

    pub fn description(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(ResolvedNode::description)
    }

    pub(crate) fn matcher(&self, id: NodeId) -> Option<&Matcher<S>> {
        self.node(id).map(ResolvedNode::matcher)
    }

    fn resolve_lazy(&mut self, lazy: &Lazy<S>) -> Result<NodeId, ResolveError> {
        match lazy {
            Lazy::Node(node) => self.resolve_node(node),

            Lazy::Handle(grammar, id) if *grammar != self.id => {
                Err(ResolveError::ForeignNode(*id))
            }

            Lazy::Handle(_, id) => match self.entries.get(id.as_usize()) {
                Some(_) => Ok(self.follow(*id)),
                None => Err(ResolveError::UnknownNode(*id)),
            },

            Lazy::Literal(literal) => {
                if let Some(&id) = self.literals.get(literal) {
                    return Ok(id);
                }

                let node = S::implicit(literal).map_err(ResolveError::Literal)?;
                let id = self.resolve_node(&Rc::new(node))?;
                let id = self.follow(id);
                self.literals.insert(literal.clone(), id);
                Ok(id)
            }

            Lazy::Sequence(sequenced) => {
                let address = Rc::as_ptr(sequenced) as *const () as usize;
                if let Some((_, id)) = self.sequences.get(&address) {
                    return Ok(*id);
                }

                let Sequenced { parts, collect } = sequenced.as_ref();
                let node = sequence_node(parts.clone(), *collect);
                let id = self.resolve_node(&Rc::new(node))?;
                self.sequences.insert(address, (sequenced.clone(), id));
                Ok(id)
            }

            Lazy::Thunk(thunk) => self.resolve_thunk(thunk),
        }
    }

    fn resolve_thunk(&mut self, thunk: &Thunk<S>) -> Result<NodeId, ResolveError> {
        if let Some((_, id)) = self.thunks.get(&thunk.id()) {
            return Ok(*id);
        }

        let slot = self.reserve()?;
        self.thunks.insert(thunk.id(), (thunk.clone(), slot));

        let target = self.resolve_lazy(&thunk.force())?;
        if self.follow(target) == slot {
            return Err(ResolveError::SelfReference);
        }

        self.entries[slot.as_usize()] = Entry::Forward(target);
        Ok(target)
    }

    fn resolve_node(&mut self, node: &Rc<Node<S>>) -> Result<NodeId, ResolveError> {
        let address = Rc::as_ptr(node) as *const () as usize;
        if let Some((_, id)) = self.nodes.get(&address) {
            return Ok(*id);
        }

        let slot = self.reserve()?;
        self.nodes.insert(address, (node.clone(), slot));

        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            let id = self
                .resolve_lazy(child)
                .map_err(|e| e.inside(&node.name))?;
            children.push(self.follow(id));
        }

        let description = self.describe(node, &children);

        let cache_key = if node.cacheable {
            self.cache_key(node, &children, &description)
        } else {
            None
        };

        if let Some(key) = &cache_key {
            if let Some(&existing) = self.canonical.get(key) {
                self.entries[slot.as_usize()] = Entry::Forward(existing);
                return Ok(existing);
            }
            self.canonical.insert(key.clone(), slot);
        }

        let resolved: Vec<Child> = children
            .iter()
            .map(|&id| Child {
                id,
                description: self.child_description(id),
            })
            .collect();

        let matcher = (node.generate)(&resolved);

        self.entries[slot.as_usize()] = Entry::Ready(ResolvedNode {
            name: node.name.clone(),
            children,
            description,
            cache_key,
            matcher,
        });

        Ok(slot)
    }

    fn reserve(&mut self) -> Result<NodeId, ResolveError> {
        let id = Index::for_len(self.entries.len()).ok_or(ResolveError::TooManyNodes)?;
        self.entries.push(Entry::Reserved);
        Ok(id)
    }

    fn rollback(&mut self, mark: usize) {
        self.entries.truncate(mark);
        self.canonical.retain(|_, id| id.as_usize() < mark);
        self.nodes.retain(|_, (_, id)| id.as_usize() < mark);
        self.thunks.retain(|_, (_, id)| id.as_usize() < mark);
        self.literals.retain(|_, id| id.as_usize() < mark);
        self.sequences.retain(|_, (_, id)| id.as_usize() < mark);
    }

    fn child_description(&self, id: NodeId) -> Rc<str> {
        match self.node(id) {
            Some(node) => node.description.clone(),
            None => IN_PROGRESS.into(),
        }
    }

    /// A child's description, in parentheses if it has more than one child
    /// of its own.
    fn part(&self, id: NodeId) -> String {
        let description = self.child_description(id);
        match self.node(id) {
            Some(node) if node.children.len() > 1 => format!("({})", description),
            _ => description.to_string(),
        }
    }

    fn describe(&self, node: &Node<S>, children: &[NodeId]) -> Rc<str> {
        let parts = || children.iter().map(|&id| self.part(id));

        let description = match &node.describe {
            Describe::Label(label) => label.clone(),
            _ if children.is_empty() => node.name.clone(),
            Describe::Prefix => std::iter::once(node.name.clone())
                .chain(parts())
                .collect::<Vec<_>>()
                .join(" "),
            Describe::Infix(separator) => parts().collect::<Vec<_>>().join(*separator),
            Describe::Postfix(suffix) => {
                format!("{}{}", parts().collect::<Vec<_>>().join(" "), suffix)
            }
        };

        description.into()
    }

    /// The key a node is shared under, which is only given if every child has
    /// one too.
    fn cache_key(&self, node: &Node<S>, children: &[NodeId], description: &str) -> Option<Rc<str>> {
        if children.is_empty() {
            return Some(format!("{}:{:?}", node.name, description).into());
        }

        let keys = children
            .iter()
            .map(|&id| self.node(id)?.cache_key().map(|key| format!("{:?}", key)))
            .collect::<Option<Vec<_>>>()?;

        Some(format!("{}({})", node.name, keys.join(",")).into())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::combinator::{alt, chain, sequence};
    use crate::leaf::{literal, pattern};
    use crate::sequence::Text;
    use crate::Parser;

    fn resolve<O>(grammar: &mut Grammar<Text>, parser: &Parser<Text, O>) -> NodeId {
        grammar.resolve(parser.as_lazy()).unwrap()
    }

    #[test]
    fn identical_cacheable_nodes_are_shared() {
        let mut grammar = Grammar::new();
        let a = resolve(&mut grammar, &alt([literal("a"), literal("b")]));
        let b = resolve(&mut grammar, &alt([literal("a"), literal("b")]));
        let c = resolve(&mut grammar, &alt([literal("b"), literal("a")]));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(grammar.description(a), Some("\"a\" | \"b\""));
    }

    #[test]
    fn nodes_with_functions_are_not_shared() {
        let mut grammar = Grammar::new();
        let f = |parser: Parser<Text, String>| parser.map(|s| s.len());
        let a = resolve(&mut grammar, &f(literal("a")));
        let b = resolve(&mut grammar, &f(literal("a")));

        assert_ne!(a, b);
        assert_eq!(grammar.node(a).unwrap().cache_key(), None);
        assert_eq!(grammar.node(a).unwrap().children(), grammar.node(b).unwrap().children());
    }

    #[test]
    fn resolving_is_idempotent() {
        let mut grammar = Grammar::new();
        let parser = chain(literal("a"), literal("b"), |a, b| a + &b);

        let first = resolve(&mut grammar, &parser);
        let second = resolve(&mut grammar, &parser);
        assert_eq!(first, second);

        let handle = parser.resolve_in(&mut grammar).unwrap();
        assert_eq!(resolve(&mut grammar, &handle), first);
    }

    #[test]
    fn thunks_are_forced_once() {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        let digit = Parser::<Text, String>::lazy(move || {
            counter.set(counter.get() + 1);
            literal("1")
        });

        let mut grammar = Grammar::new();
        resolve(&mut grammar, &alt([digit.clone(), literal("2")]));
        resolve(&mut grammar, &alt([literal("3"), digit]));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn recursive_rules_terminate() {
        fn nested() -> Parser<Text, String> {
            alt([
                chain(literal("("), Parser::lazy(nested).skip(literal(")")), |_, inner| inner),
                literal("x"),
            ])
        }

        let mut grammar = Grammar::new();
        let root = resolve(&mut grammar, &nested());
        let description = grammar.description(root).unwrap();

        assert!(description.contains("..."), "{}", description);
        assert_eq!(grammar.node(root).unwrap().cache_key(), None);
    }

    #[test]
    fn errors_say_where_they_happened() {
        let mut grammar = Grammar::<Text>::new();
        let before = grammar.len();
        let broken = alt([literal("a"), pattern("(")]);

        let error = grammar.resolve(broken.as_lazy()).unwrap_err();
        assert!(error.to_string().ends_with("(inside alt)"), "{}", error);
        assert_eq!(grammar.len(), before);
    }

    #[test]
    fn thunks_must_eventually_be_something() {
        fn forever() -> Parser<Text, String> {
            Parser::lazy(forever)
        }

        let mut grammar = Grammar::new();
        let error = grammar.resolve(forever().as_lazy()).unwrap_err();
        assert_eq!(error, ResolveError::SelfReference);
        assert!(grammar.is_empty());
    }

    #[test]
    fn unknown_handles() {
        let mut grammar = Grammar::<Text>::new();
        let error = grammar.resolve(&grammar.handle(NodeId::new(7))).unwrap_err();
        assert_eq!(error, ResolveError::UnknownNode(NodeId::new(7)));
    }

    #[test]
    fn handles_belong_to_one_grammar() {
        let mut first = Grammar::<Text>::new();
        let mut second = Grammar::<Text>::new();
        resolve(&mut second, &literal("b"));

        let id = resolve(&mut first, &literal("a"));
        let error = second.resolve(&first.handle(id)).unwrap_err();
        assert_eq!(error, ResolveError::ForeignNode(id));
        assert_eq!(second.len(), 1);
    }

    #[test]
    fn literals_and_sequences_resolve_once() {
        let mut grammar = Grammar::new();
        let word: Parser<Text, String> = literal("a");
        let parts = sequence(vec![literal("a").map(|s: String| s), pattern("b+")]);

        let a = resolve(&mut grammar, &word);
        let seq = resolve(&mut grammar, &parts);
        let size = grammar.len();

        assert_eq!(resolve(&mut grammar, &word), a);
        assert_eq!(resolve(&mut grammar, &parts), seq);
        assert_eq!(grammar.len(), size);
    }
}
