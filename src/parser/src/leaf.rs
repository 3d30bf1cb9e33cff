//! Leaves - parsers which look at the input directly.
//!
//! [`literal`] and [`pattern`] are written down as data and the kind of
//! [`Sequence`] being parsed decides how to match them when the grammar is
//! resolved. For [`Text`] they match characters and regular expressions.

use std::rc::Rc;

use regex::Regex;
use unicode_xid::UnicodeXID;

use crate::graph::{Describe, Lazy, Node};
use crate::matching::{erase, Match};
use crate::scheduler::{matcher, Step};
use crate::sequence::{Literal, Sequence, Text};
use crate::span::Span;
use crate::Parser;

/// A node for a leaf which matches with `f`, and is described by `label`.
pub fn leaf<S, F>(name: &str, label: impl Into<String>, f: F) -> Node<S>
where
    S: Sequence,
    F: Fn(&S, usize) -> Match + 'static,
{
    let f = Rc::new(f);

    Node::new(name, vec![], move |_| {
        let f = f.clone();
        matcher(move |input, position| Step::Done(f(input, position)))
    })
    .describe(Describe::Label(label.into()))
}

/// Exactly `text`, producing the text matched.
pub fn literal<S: Sequence>(text: impl Into<String>) -> Parser<S, String> {
    Parser::from_lazy(Lazy::Literal(Literal::Text(text.into())))
}

/// Text matching the regular expression `regex` at the current position,
/// producing the text matched.
///
/// The expression is compiled when the grammar is resolved, and an invalid
/// one fails resolution.
pub fn pattern<S: Sequence>(regex: impl Into<String>) -> Parser<S, String> {
    Parser::from_lazy(Lazy::Literal(Literal::Pattern(regex.into())))
}

/// One item equal to `expected`.
///
/// These are never shared with other nodes, since items which look the same
/// when printed aren't always equal.
pub fn item<S: Sequence>(expected: S::Item) -> Parser<S, S::Item> {
    let label = format!("{:?}", expected);
    let message = format!("expected {}", label);

    let node = leaf("item", label, move |input: &S, position| match input.at(position) {
        Some(found) if *found == expected => {
            Match::success(Span::new(position, position + 1), erase(found.clone()))
        }
        _ => Match::failure(message.as_str(), Span::at(position)),
    });

    Parser::from_node(node)
}

/// One item which `predicate` accepts. The `name` is what's reported as
/// expected when it doesn't match.
pub fn satisfy<S, F>(name: impl Into<String>, predicate: F) -> Parser<S, S::Item>
where
    S: Sequence,
    F: Fn(&S::Item) -> bool + 'static,
{
    let name = name.into();
    let message = format!("expected {}", name);

    Parser::from_node(leaf("satisfy", name, move |input: &S, position| {
        match input.at(position) {
            Some(found) if predicate(found) => {
                Match::success(Span::new(position, position + 1), erase(found.clone()))
            }
            _ => Match::failure(message.as_str(), Span::at(position)),
        }
    }))
}

/// Any one item.
pub fn any<S: Sequence>() -> Parser<S, S::Item> {
    let node = leaf("any", "any", |input: &S, position| match input.at(position) {
        Some(found) => Match::success(Span::new(position, position + 1), erase(found.clone())),
        None => Match::failure("unexpected end of input", Span::at(position)),
    });

    Parser::from_node(node.cacheable(true))
}

/// The end of the input.
pub fn end<S: Sequence>() -> Parser<S, ()> {
    Parser::from_node(end_node())
}

pub(crate) fn end_node<S: Sequence>() -> Node<S> {
    leaf("end", "end", |input: &S, position| {
        if input.is_end(position) {
            Match::success(Span::at(position), erase(()))
        } else {
            Match::failure("expected end of input", Span::at(position))
        }
    })
    .cacheable(true)
}

/// Always matches, consuming nothing and producing `value`.
pub fn succeed<S: Sequence, O: Clone + 'static>(value: O) -> Parser<S, O> {
    Parser::from_node(leaf("succeed", "succeed", move |_: &S, position| {
        Match::success(Span::at(position), erase(value.clone()))
    }))
}

/// Never matches.
pub fn fail<S: Sequence, O>(message: impl Into<String>) -> Parser<S, O> {
    let message: Rc<str> = message.into().into();
    let label = format!("fail {:?}", message);

    Parser::from_node(leaf("fail", label, move |_: &S, position| {
        Match::failure(message.clone(), Span::at(position))
    }))
}

/// An identifier: a letter (or `_`) followed by letters, digits and `_`s, per
/// [Unicode Standard Annex #31](https://unicode.org/reports/tr31/).
pub fn identifier() -> Parser<Text, String> {
    let node = leaf("identifier", "identifier", |input: &Text, position| {
        let starts = input.at(position).copied().map_or(false, is_identifier_start);
        if !starts {
            return Match::failure("expected an identifier", Span::at(position));
        }

        let mut end = position + 1;
        while input.at(end).copied().map_or(false, is_identifier_continue) {
            end += 1;
        }

        Match::success(Span::new(position, end), erase(input.slice(position, end).to_string()))
    });

    Parser::from_node(node.cacheable(true))
}

/// Can a character start an identifier, i.e. is it `_` or
/// [`is_xid_start`][UnicodeXID::is_xid_start]?
fn is_identifier_start(c: char) -> bool {
    c == '_' || UnicodeXID::is_xid_start(c)
}

/// Is a character valid inside an identifier, i.e.
/// [`is_xid_continue`][UnicodeXID::is_xid_continue]?
fn is_identifier_continue(c: char) -> bool {
    UnicodeXID::is_xid_continue(c)
}

/// The leaf [`Text`] uses for literal text.
pub(crate) fn text(text: String) -> Node<Text> {
    let label = format!("{:?}", text);
    let message = format!("expected {}", label);
    let chars: Vec<char> = text.chars().collect();

    leaf("literal", label, move |input: &Text, position| {
        let end = position + chars.len();
        match input.chars(position, end) {
            Some(found) if found == chars.as_slice() => {
                Match::success(Span::new(position, end), erase(text.clone()))
            }
            _ => Match::failure(message.as_str(), Span::at(position)),
        }
    })
    .cacheable(true)
}

/// The leaf [`Text`] uses for regular expressions.
pub(crate) fn regex(pattern: &str) -> Result<Node<Text>, String> {
    let regex = Regex::new(&format!("^(?:{})", pattern))
        .map_err(|e| format!("invalid pattern /{}/: {}", pattern, e))?;

    let label = format!("/{}/", pattern);
    let message = format!("expected {}", label);

    let node = leaf("pattern", label, move |input: &Text, position| {
        let from = input.byte_offset(position);

        match regex.find(&input.as_str()[from..]) {
            Some(found) => {
                let end = input.position_of(from + found.end());
                Match::success(Span::new(position, end), erase(found.as_str().to_string()))
            }
            None => Match::failure(message.as_str(), Span::at(position)),
        }
    });

    Ok(node.cacheable(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Engine;

    fn execute<O: Clone + 'static>(parser: &Parser<Text, O>, input: &str) -> Match<O> {
        Engine::new().execute(parser, &Text::new(input)).unwrap()
    }

    #[test]
    fn literals() {
        let m = execute(&literal("añ"), "añb");
        assert_eq!(m, Match::success(Span::new(0, 2), String::from("añ")));

        let m = execute(&literal("ab"), "a");
        assert_eq!(m, Match::failure("expected \"ab\"", Span::at(0)));
    }

    #[test]
    fn patterns_are_anchored() {
        let digits = pattern("[0-9]+");
        assert_eq!(execute(&digits, "42x").value().map(String::as_str), Some("42"));
        assert!(execute(&digits, "x42").is_failure());
    }

    #[test]
    fn patterns_count_chars() {
        let m = execute(&pattern("ñ+"), "ññx");
        assert_eq!(m.span(), Span::new(0, 2));
    }

    #[test]
    fn identifiers() {
        assert_eq!(execute(&identifier(), "_a1 b").span(), Span::new(0, 3));
        assert_eq!(execute(&identifier(), "été").span(), Span::new(0, 3));
        assert!(execute(&identifier(), "1a").is_failure());
    }

    #[test]
    fn items() {
        let tokens = vec!["let", "x"];
        let mut engine = Engine::new();

        let m = engine.execute(&item("let"), &tokens).unwrap();
        assert_eq!(m, Match::success(Span::new(0, 1), "let"));

        let m = engine.execute(&satisfy("a name", |t: &&str| t.len() == 1), &tokens).unwrap();
        assert_eq!(m, Match::failure("expected a name", Span::at(0)));

        let e = engine.execute(&literal("let"), &tokens).unwrap_err();
        assert_eq!(e.to_string(), "\"let\" cannot be matched against this kind of input");
    }

    #[test]
    fn items_which_print_the_same_are_still_different() {
        #[derive(Clone, PartialEq)]
        struct Token(u8);

        impl std::fmt::Debug for Token {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "Token")
            }
        }

        let tokens = vec![Token(2)];
        let parser = crate::alt([item(Token(1)), item(Token(2))]);

        let m = Engine::new().execute(&parser, &tokens).unwrap();
        assert_eq!(m.value(), Some(&Token(2)));
    }

    #[test]
    fn end_and_constants() {
        assert!(execute(&end(), "").is_success());
        assert_eq!(execute(&end(), "a").message(), Some("expected end of input"));
        assert_eq!(execute(&succeed(7), "a"), Match::success(Span::at(0), 7));
        assert_eq!(execute(&fail::<_, u8>("nope"), "a"), Match::failure("nope", Span::at(0)));
    }
}
