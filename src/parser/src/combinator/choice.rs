//! Choosing between parsers.

use std::rc::Rc;

use crate::combinator::Parser;
use crate::graph::{Describe, Lazy, Node, NodeId};
use crate::matching::{erase, recover, Match, Value};
use crate::scheduler::{matcher, Step};
use crate::sequence::Sequence;
use crate::span::Span;

/// Try each alternative in order, producing the first match.
///
/// If they all fail, the failure which got furthest into the input is the
/// one reported. On a tie, the earlier alternative's failure wins.
pub fn alt<S, O, I>(alternatives: I) -> Parser<S, O>
where
    S: Sequence,
    I: IntoIterator<Item = Parser<S, O>>,
{
    let alternatives: Vec<_> = alternatives.into_iter().map(Parser::into_lazy).collect();
    Parser::from_node(alt_node(alternatives))
}

fn alt_node<S: Sequence>(alternatives: Vec<Lazy<S>>) -> Node<S> {
    let cacheable = !alternatives.is_empty();

    Node::new("alt", alternatives, |children| {
        let alternatives: Rc<[NodeId]> = children.iter().map(|child| child.id).collect();
        matcher(move |_: &S, position| attempt(alternatives.clone(), 0, position, None))
    })
    .cacheable(cacheable)
    .describe(Describe::Infix(" | "))
}

fn attempt(alternatives: Rc<[NodeId]>, index: usize, position: usize, best: Option<Match>) -> Step {
    let alternative = match alternatives.get(index) {
        Some(alternative) => *alternative,
        None => {
            let failure = best.unwrap_or_else(|| Match::failure("no alternatives", Span::at(position)));
            return failure.into();
        }
    };

    Step::call(alternative, position, move |m| {
        if m.is_success() {
            return m.into();
        }

        let best = match best {
            Some(best) => best.farther(m),
            None => m,
        };

        attempt(alternatives, index + 1, position, Some(best))
    })
}

/// Match `child`. If it fails, succeed anyway without consuming anything.
///
/// Successful values go through `wrap`, and `default` is produced otherwise.
fn optional_node<S: Sequence>(name: &str, child: Lazy<S>, wrap: fn(Value) -> Value, default: Value) -> Node<S> {
    Node::new(name, vec![child], move |children| {
        let child = children[0].id;
        let default = default.clone();

        matcher(move |_: &S, position| {
            let default = default.clone();

            Step::call(child, position, move |m| {
                let m = match m {
                    Match::Success { span, value } => Match::success(span, wrap(value)),
                    Match::Failure { .. } => Match::success(Span::at(position), default),
                };
                m.into()
            })
        })
    })
}

fn some<O: Clone + 'static>(value: Value) -> Value {
    erase(Some(recover::<O>(&value)))
}

fn same(value: Value) -> Value {
    value
}

impl<S: Sequence, O: Clone + 'static> Parser<S, O> {
    /// Try this, and then `other` if this fails.
    pub fn or(self, other: Parser<S, O>) -> Parser<S, O> {
        alt([self, other])
    }

    /// Match this if possible, producing [`None`] if it doesn't match.
    pub fn optional(self) -> Parser<S, Option<O>> {
        let node = optional_node("optional", self.into_lazy(), some::<O>, erase(None::<O>));
        Parser::from_node(node.cacheable(true).describe(Describe::Postfix("?".into())))
    }

    /// Match this if possible, producing `default` if it doesn't match.
    pub fn optional_or(self, default: O) -> Parser<S, O> {
        Parser::from_node(optional_node("optional_or", self.into_lazy(), same, erase(default)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::chain;
    use crate::leaf::{fail, literal};
    use crate::sequence::Text;
    use crate::Engine;

    fn execute<O: Clone + 'static>(parser: &Parser<Text, O>, input: &str) -> Match<O> {
        Engine::new().execute(parser, &Text::new(input)).unwrap()
    }

    #[test]
    fn first_success_wins() {
        let parser = alt([literal("a").to(1), literal("ab").to(2)]);
        assert_eq!(execute(&parser, "ab"), Match::success(Span::new(0, 1), 1));
    }

    #[test]
    fn farthest_failure_is_reported() {
        let abc = chain(literal("a"), literal("bc"), |a, b| a + &b);
        let parser = alt([literal("x"), abc, literal("y")]);

        let m = execute(&parser, "abd");
        assert_eq!(m, Match::failure("expected \"bc\"", Span::at(1)));
    }

    #[test]
    fn ties_go_to_the_earlier_alternative() {
        let parser = alt([literal("x"), literal("y")]);
        assert_eq!(execute(&parser, "z").message(), Some("expected \"x\""));
    }

    #[test]
    fn empty_alternatives_fail() {
        let parser = alt(Vec::<Parser<Text, ()>>::new());
        assert_eq!(execute(&parser, "z"), Match::failure("no alternatives", Span::at(0)));
    }

    #[test]
    fn optionals() {
        let parser = literal("a").optional();
        assert_eq!(execute(&parser, "b"), Match::success(Span::at(0), None));
        assert_eq!(execute(&parser, "a").value(), Some(&Some(String::from("a"))));

        let parser = fail::<Text, u8>("no").optional_or(3);
        assert_eq!(execute(&parser, ""), Match::success(Span::at(0), 3));
    }
}
