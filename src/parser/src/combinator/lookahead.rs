//! Lookahead - looking at what's next without consuming it.

use crate::combinator::Parser;
use crate::graph::Node;
use crate::matching::{erase, Match};
use crate::scheduler::{matcher, Step};
use crate::sequence::Sequence;
use crate::span::Span;

impl<S: Sequence, O: Clone + 'static> Parser<S, O> {
    /// Succeed without consuming anything if this would match here.
    pub fn check(self) -> Parser<S, ()> {
        let node = Node::new("check", vec![self.into_lazy()], |children| {
            let child = children[0].id;
            matcher(move |_: &S, position| {
                Step::call(child, position, move |m| {
                    m.and_then(|_, _| Match::success(Span::at(position), erase(())))
                        .into()
                })
            })
        });

        Parser::from_node(node.cacheable(true))
    }

    /// Succeed without consuming anything if this would _not_ match here.
    pub fn not(self) -> Parser<S, ()> {
        let node = Node::new("not", vec![self.into_lazy()], |children| {
            let child = children[0].id;
            let message = format!("unexpected {}", children[0].description);

            matcher(move |_: &S, position| {
                let message = message.clone();
                Step::call(child, position, move |m| {
                    let m = if m.is_success() {
                        Match::failure(message, Span::at(position))
                    } else {
                        Match::success(Span::at(position), erase(()))
                    };
                    m.into()
                })
            })
        });

        Parser::from_node(node.cacheable(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::{any, literal};
    use crate::sequence::Text;
    use crate::Engine;

    fn execute<O: Clone + 'static>(parser: &Parser<Text, O>, input: &str) -> Match<O> {
        Engine::new().execute(parser, &Text::new(input)).unwrap()
    }

    #[test]
    fn check_consumes_nothing() {
        let parser = literal("ab").check();
        assert_eq!(execute(&parser, "abc"), Match::success(Span::at(0), ()));
        assert!(execute(&parser, "ac").is_failure());
    }

    #[test]
    fn not_inverts() {
        let parser = literal("*/").not().then(any());
        assert_eq!(execute(&parser, "x"), Match::success(Span::new(0, 1), 'x'));
        assert_eq!(
            execute(&parser, "*/"),
            Match::failure("unexpected \"*/\"", Span::at(0))
        );
    }
}
