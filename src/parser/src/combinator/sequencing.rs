//! Matching parsers one after another.

use std::rc::Rc;

use crate::combinator::Parser;
use crate::graph::{Describe, Lazy, Node, NodeId, Sequenced};
use crate::leaf::end_node;
use crate::matching::{collect, erase, recover, Match, Value, Verdict, REJECTED};
use crate::scheduler::{matcher, Step};
use crate::sequence::Sequence;
use crate::span::Span;

type Combine = Rc<dyn Fn(Value, Value) -> Verdict<Value>>;

/// Match `first` and then `second` where it left off, putting their values
/// together with `combine`.
///
/// If `combine` rejects the values, the match fails where the two matched.
fn pair_node<S: Sequence>(name: &str, first: Lazy<S>, second: Lazy<S>, combine: Combine) -> Node<S> {
    Node::new(name, vec![first, second], move |children| {
        let (first, second) = (children[0].id, children[1].id);
        let combine = combine.clone();

        matcher(move |_: &S, position| {
            let combine = combine.clone();

            Step::call(first, position, move |m| match m {
                Match::Success { span: left, value: a } => Step::call(second, left.end(), move |m| {
                    m.and_then(|right, b| {
                        let span = left.join(right);
                        match combine(a, b) {
                            Verdict::Accept(value) => Match::success(span, value),
                            Verdict::Reject => Match::failure(REJECTED, span),
                        }
                    })
                    .into()
                }),
                failure => failure.into(),
            })
        })
    })
    .describe(Describe::Infix(" "))
}

/// Match `first` and then `second`, combining what they produce.
pub fn chain<S, A, B, O, F>(first: Parser<S, A>, second: Parser<S, B>, combine: F) -> Parser<S, O>
where
    S: Sequence,
    A: Clone + 'static,
    B: Clone + 'static,
    O: 'static,
    F: Fn(A, B) -> O + 'static,
{
    try_chain(first, second, move |a, b| Verdict::Accept(combine(a, b)))
}

/// Like [`chain`], but `combine` can [reject][Verdict::Reject] the values,
/// which fails the match.
pub fn try_chain<S, A, B, O, F>(first: Parser<S, A>, second: Parser<S, B>, combine: F) -> Parser<S, O>
where
    S: Sequence,
    A: Clone + 'static,
    B: Clone + 'static,
    O: 'static,
    F: Fn(A, B) -> Verdict<O> + 'static,
{
    let combine: Combine = Rc::new(move |a: Value, b: Value| {
        combine(recover(&a), recover(&b)).map(erase)
    });
    let node = pair_node("chain", first.into_lazy(), second.into_lazy(), combine);
    Parser::from_node(node)
}

/// Match each of the parts in order, producing a list of their values.
pub fn sequence<S, O, I>(parts: I) -> Parser<S, Vec<O>>
where
    S: Sequence,
    O: Clone + 'static,
    I: IntoIterator<Item = Parser<S, O>>,
{
    let sequenced = Sequenced {
        parts: parts.into_iter().map(Parser::into_lazy).collect(),
        collect: collect::<O>,
    };

    Parser::from_lazy(Lazy::Sequence(Rc::new(sequenced)))
}

/// The node an implicit sequence turns into.
pub(crate) fn sequence_node<S: Sequence>(parts: Vec<Lazy<S>>, collect: fn(&[Value]) -> Value) -> Node<S> {
    // An empty sequence produces an empty list of whatever type, and lists of
    // different types can't be shared.
    let cacheable = !parts.is_empty();

    Node::new("sequence", parts, move |children| {
        let parts: Rc<[NodeId]> = children.iter().map(|child| child.id).collect();
        matcher(move |_: &S, position| next_part(parts.clone(), collect, Vec::new(), Span::at(position)))
    })
    .cacheable(cacheable)
    .describe(Describe::Infix(" "))
}

fn next_part(parts: Rc<[NodeId]>, collect: fn(&[Value]) -> Value, values: Vec<Value>, span: Span) -> Step {
    let part = match parts.get(values.len()) {
        Some(part) => *part,
        None => return Match::success(span, collect(&values)).into(),
    };

    Step::call(part, span.end(), move |m| match m {
        Match::Success { span: next, value } => {
            let mut values = values;
            values.push(value);
            next_part(parts, collect, values, span.join(next))
        }
        failure => failure.into(),
    })
}

/// Match `child` and then the end of the input.
pub(crate) fn consume_node<S: Sequence>(child: Lazy<S>) -> Node<S> {
    let combine: Combine = Rc::new(|value: Value, _: Value| Verdict::Accept(value));
    pair_node("consume", child, Lazy::node(end_node()), combine).cacheable(true)
}

impl<S: Sequence, O: Clone + 'static> Parser<S, O> {
    /// Match this and then `next`, keeping what `next` produces.
    pub fn then<P: Clone + 'static>(self, next: Parser<S, P>) -> Parser<S, P> {
        let combine: Combine = Rc::new(|_: Value, value: Value| Verdict::Accept(value));
        Parser::from_node(pair_node("then", self.into_lazy(), next.into_lazy(), combine).cacheable(true))
    }

    /// Match this and then `next`, keeping what this produces.
    pub fn skip<P: Clone + 'static>(self, next: Parser<S, P>) -> Parser<S, O> {
        let combine: Combine = Rc::new(|value: Value, _: Value| Verdict::Accept(value));
        Parser::from_node(pair_node("skip", self.into_lazy(), next.into_lazy(), combine).cacheable(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::alt;
    use crate::leaf::literal;
    use crate::sequence::Text;
    use crate::Engine;

    fn digit() -> Parser<Text, String> {
        alt([literal("1"), literal("2")])
    }

    #[test]
    fn chain_joins_spans() {
        let parser = chain(literal("ab"), literal("cd"), |a, b| a + &b);
        let m = parser.execute(&Text::new("abcde")).unwrap();
        assert_eq!(m, Match::success(Span::new(0, 4), String::from("abcd")));
    }

    #[test]
    fn chain_keeps_the_first_failure() {
        let parser = chain(literal("ab"), literal("cd"), |a, b| a + &b);
        let m = parser.execute(&Text::new("abce")).unwrap();
        assert_eq!(m, Match::failure("expected \"cd\"", Span::at(2)));
    }

    #[test]
    fn rejected_combinations_fail() {
        let pair = try_chain(digit(), digit(), |a, b| {
            if a == b {
                Verdict::Reject
            } else {
                Verdict::Accept(format!("{}-{}", a, b))
            }
        });

        let mut engine = Engine::new();
        assert_eq!(engine.run(&pair, &Text::new("12")).unwrap(), "1-2");

        let m = engine.execute(&pair, &Text::new("11")).unwrap();
        assert_eq!(m, Match::failure(REJECTED, Span::new(0, 2)));
    }

    #[test]
    fn sequences() {
        let parser = sequence([literal("a"), literal("b"), literal("c")]);
        let m = parser.execute(&Text::new("abc")).unwrap();
        assert_eq!(m.span(), Span::new(0, 3));
        assert_eq!(m.value().map(Vec::len), Some(3));

        let empty = sequence(Vec::<Parser<Text, String>>::new());
        assert_eq!(empty.execute(&Text::new("x")).unwrap(), Match::success(Span::at(0), vec![]));
    }

    #[test]
    fn then_and_skip() {
        let parser = literal("(").then(literal("x")).skip(literal(")"));
        let m = parser.execute(&Text::new("(x)")).unwrap();
        assert_eq!(m, Match::success(Span::new(0, 3), String::from("x")));
    }
}
