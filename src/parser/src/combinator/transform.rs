//! Changing what parsers produce.

use std::rc::Rc;

use crate::combinator::Parser;
use crate::graph::{Lazy, Node};
use crate::matching::{erase, recover, Match, Value, Verdict, REJECTED};
use crate::scheduler::{matcher, Step};
use crate::sequence::Sequence;
use crate::span::Span;

type Transform = Rc<dyn Fn(Value, Span) -> Verdict<Value>>;

/// Pass successful matches of `child` through `f`. Rejected values fail with
/// `message`, where the child matched.
fn transform_node<S: Sequence>(name: &str, child: Lazy<S>, message: Rc<str>, f: Transform) -> Node<S> {
    Node::new(name, vec![child], move |children| {
        let child = children[0].id;
        let (f, message) = (f.clone(), message.clone());

        matcher(move |_: &S, position| {
            let (f, message) = (f.clone(), message.clone());

            Step::call(child, position, move |m| {
                m.and_then(|span, value| match f(value, span) {
                    Verdict::Accept(value) => Match::success(span, value),
                    Verdict::Reject => Match::failure(message, span),
                })
                .into()
            })
        })
    })
}

impl<S: Sequence, O: Clone + 'static> Parser<S, O> {
    /// Produce `f` of the value matched.
    pub fn map<U, F>(self, f: F) -> Parser<S, U>
    where
        U: 'static,
        F: Fn(O) -> U + 'static,
    {
        self.transform("map", REJECTED, move |value, _| Verdict::Accept(f(value)))
    }

    /// Produce `f` of the value matched and where it was matched.
    pub fn map_with_span<U, F>(self, f: F) -> Parser<S, U>
    where
        U: 'static,
        F: Fn(O, Span) -> U + 'static,
    {
        self.transform("map", REJECTED, move |value, span| Verdict::Accept(f(value, span)))
    }

    /// Like [`Parser::map_with_span`], but `f` can [reject][Verdict::Reject]
    /// the value, which fails the match as if the input didn't fit.
    pub fn try_map<U, F>(self, f: F) -> Parser<S, U>
    where
        U: 'static,
        F: Fn(O, Span) -> Verdict<U> + 'static,
    {
        self.transform("try_map", REJECTED, f)
    }

    /// Produce `value` instead.
    pub fn to<U: Clone + 'static>(self, value: U) -> Parser<S, U> {
        self.transform("to", REJECTED, move |_, _| Verdict::Accept(value.clone()))
    }

    /// Fail with `message` unless `predicate` accepts the value.
    pub fn filter<F>(self, message: impl Into<String>, predicate: F) -> Parser<S, O>
    where
        F: Fn(&O) -> bool + 'static,
    {
        let message = message.into();
        self.transform("filter", &message, move |value, _| {
            if predicate(&value) {
                Verdict::Accept(value)
            } else {
                Verdict::Reject
            }
        })
    }

    /// Match this, but produce nothing.
    pub fn discard(self) -> Parser<S, ()> {
        let f: Transform = Rc::new(|_: Value, _: Span| Verdict::Accept(erase(())));
        let node = transform_node("discard", self.into_lazy(), REJECTED.into(), f);
        Parser::from_node(node.cacheable(true))
    }

    /// Replace the message of failed matches with `message`.
    pub fn on_fail(self, message: impl Into<String>) -> Parser<S, O> {
        let message: Rc<str> = message.into().into();

        let node = Node::new("on_fail", vec![self.into_lazy()], move |children| {
            let child = children[0].id;
            let message = message.clone();

            matcher(move |_: &S, position| {
                let message = message.clone();
                Step::call(child, position, move |m| {
                    let m = match m {
                        Match::Failure { span, .. } => Match::failure(message, span),
                        success => success,
                    };
                    m.into()
                })
            })
        });

        Parser::from_node(node)
    }

    fn transform<U, F>(self, name: &str, message: &str, f: F) -> Parser<S, U>
    where
        U: 'static,
        F: Fn(O, Span) -> Verdict<U> + 'static,
    {
        let f: Transform = Rc::new(move |value: Value, span: Span| f(recover(&value), span).map(erase));
        Parser::from_node(transform_node(name, self.into_lazy(), message.into(), f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinator::alt;
    use crate::leaf::{literal, pattern};
    use crate::sequence::Text;
    use crate::Engine;

    fn execute<O: Clone + 'static>(parser: &Parser<Text, O>, input: &str) -> Match<O> {
        Engine::new().execute(parser, &Text::new(input)).unwrap()
    }

    fn number() -> Parser<Text, u32> {
        pattern("[0-9]+").map(|digits| digits.parse().unwrap_or(0))
    }

    #[test]
    fn maps_keep_spans() {
        assert_eq!(execute(&number(), "42!"), Match::success(Span::new(0, 2), 42));

        let at = literal("b").map_with_span(|_, span| span.start());
        assert_eq!(execute(&alt([literal("a").to(9), at]), "b").value(), Some(&0));
    }

    #[test]
    fn rejecting_backtracks() {
        let small = number().try_map(|n, _| if n < 10 { Verdict::Accept(n) } else { Verdict::Reject });
        let parser = alt([small, literal("10").to(100)]);

        assert_eq!(execute(&parser, "7"), Match::success(Span::new(0, 1), 7));
        assert_eq!(execute(&parser, "10"), Match::success(Span::new(0, 2), 100));
        assert_eq!(execute(&parser, "11"), Match::failure(REJECTED, Span::new(0, 2)));
    }

    #[test]
    fn filters() {
        let even = number().filter("expected an even number", |n| n % 2 == 0);
        assert!(execute(&even, "4").is_success());
        assert_eq!(execute(&even, "5").message(), Some("expected an even number"));
    }

    #[test]
    fn discard_and_on_fail() {
        let parser = literal("a").discard();
        assert_eq!(execute(&parser, "a"), Match::success(Span::new(0, 1), ()));

        let parser = literal("a").on_fail("wanted an a");
        assert_eq!(execute(&parser, "b"), Match::failure("wanted an a", Span::at(0)));
        assert!(execute(&parser, "a").is_success());
    }
}
