//! Grammar tests
//!
//! These build small but complete grammars with the public API, and check
//! what they do with whole inputs.

use std::cell::Cell;
use std::rc::Rc;

use parser::{
    alt, chain, item, leaf, literal, pattern, satisfy, sequence, try_chain, Engine, Match, Parser,
    ResolveError, Sequence, Span, Text, Value, Verdict,
};

// A calculator, with the usual precedence.
//
// expr   -> term (('+' | '-') term)*
// term   -> atom (('*' | '/') atom)*
// atom   -> number | '(' expr ')' | '-' atom

fn calculator() -> Parser<Text, i64> {
    whitespace().then(expr())
}

fn whitespace() -> Parser<Text, ()> {
    pattern("[ \t\n]*").discard()
}

fn token(text: &str) -> Parser<Text, String> {
    literal(text).skip(whitespace())
}

fn number() -> Parser<Text, i64> {
    pattern("[0-9]+")
        .skip(whitespace())
        .try_map(|digits, _| Verdict::from(digits.parse::<i64>().ok()))
}

fn expr() -> Parser<Text, i64> {
    let rest = chain(alt([token("+"), token("-")]), term(), |op, n| (op, n));
    try_chain(term(), rest.many(), fold)
}

fn term() -> Parser<Text, i64> {
    let rest = chain(alt([token("*"), token("/")]), atom(), |op, n| (op, n));
    try_chain(atom(), rest.many(), fold)
}

fn atom() -> Parser<Text, i64> {
    alt([
        number(),
        token("(").then(Parser::lazy(expr)).skip(token(")")),
        token("-").then(Parser::lazy(atom)).map(|n: i64| -n),
    ])
}

/// Apply the operators left to right. Dividing by zero is rejected.
fn fold(first: i64, rest: Vec<(String, i64)>) -> Verdict<i64> {
    let mut total = first;

    for (op, n) in rest {
        total = match op.as_str() {
            "+" => total + n,
            "-" => total - n,
            "*" => total * n,
            _ => match total.checked_div(n) {
                Some(quotient) => quotient,
                None => return Verdict::Reject,
            },
        };
    }

    Verdict::Accept(total)
}

macro_rules! test_eval {
    ($name: ident, $input: expr, $expected: expr) => {
        #[test]
        fn $name() {
            let result = calculator().run(&Text::new($input));
            assert_eq!($expected, result.unwrap());
        }
    };
}

macro_rules! test_no_parse {
    ($name: ident, $input: expr, $message: expr) => {
        #[test]
        fn $name() {
            let result = calculator().run(&Text::new($input));
            assert_eq!($message, result.unwrap_err().to_string());
        }
    };
}

test_eval! { single_number, "1", 1 }
test_eval! { precedence, "1 + 2 * 3", 7 }
test_eval! { parentheses, "(1 + 2) * 3", 9 }
test_eval! { left_associative, "10 - 4 - 3", 3 }
test_eval! { negation, "-(2 * 3) + 1", -5 }
test_eval! { surrounding_whitespace, " 8 / 2 / 2 ", 2 }
test_eval! { nested_parentheses, "2 * (3 + (4 - 1))", 12 }

test_no_parse! { trailing_operator, "1 +", "expected end of input at 1:3" }
test_no_parse! { unclosed_parenthesis, "(1 + 2", "expected \")\" at 1:7" }
test_no_parse! { division_by_zero, "4 / 0", "rejected at 1:1" }
test_no_parse! { empty_input, "", "expected /[0-9]+/ at 1:1" }

#[test]
fn rejecting_combinations_backtracks() {
    fn digit() -> Parser<Text, String> {
        alt([literal("1"), literal("2")])
    }

    let pair = try_chain(digit(), digit(), |a, b| {
        if a == b {
            Verdict::Reject
        } else {
            Verdict::Accept(format!("{}-{}", a, b))
        }
    });

    let mut engine = Engine::new();
    assert_eq!(engine.run(&pair, &Text::new("12")).unwrap(), "1-2");
    assert!(engine.run(&pair, &Text::new("11")).is_err());
}

#[test]
fn thunks_are_forced_once_across_runs() {
    let count = Rc::new(Cell::new(0));
    let digit = {
        let count = count.clone();
        Parser::<Text, String>::lazy(move || {
            count.set(count.get() + 1);
            alt([literal("1"), literal("2")])
        })
    };

    let pair = chain(
        alt([digit.clone(), literal("x")]),
        alt([literal("y"), digit]),
        |a, b| a + &b,
    );

    let mut engine = Engine::new();
    for input in ["12", "x1", "2y"] {
        assert!(engine.run(&pair, &Text::new(input)).is_ok(), "{}", input);
    }

    assert_eq!(count.get(), 1);
}

#[test]
fn thunks_are_forced_once_by_parser_run() {
    let count = Rc::new(Cell::new(0));
    let digit = {
        let count = count.clone();
        Parser::<Text, String>::lazy(move || {
            count.set(count.get() + 1);
            alt([literal("1"), literal("2")])
        })
    };

    let pair = chain(
        alt([digit.clone(), literal("x")]),
        alt([literal("y"), digit]),
        |a, b| format!("{}-{}", a, b),
    );

    assert_eq!(pair.run(&Text::new("12")).unwrap(), "1-2");
    assert_eq!(pair.run(&Text::new("x1")).unwrap(), "x-1");
    assert_eq!(pair.run(&Text::new("2y")).unwrap(), "2-y");
    assert_eq!(count.get(), 1);
}

#[test]
fn repeated_runs_keep_the_grammar_the_same_size() {
    let mut engine = Engine::new();
    let word = literal("ab");
    let letters = pattern("[a-z]+");
    let parts = sequence(vec![literal("a").map(|s: String| s), literal("b")]);

    for _ in 0..3 {
        engine.run(&word, &Text::new("ab")).unwrap();
        engine.run(&letters, &Text::new("ab")).unwrap();
        engine.run(&parts, &Text::new("ab")).unwrap();
    }
    let size = engine.grammar().len();

    for _ in 0..100 {
        engine.run(&word, &Text::new("ab")).unwrap();
        engine.run(&letters, &Text::new("ab")).unwrap();
        engine.run(&parts, &Text::new("ab")).unwrap();
    }
    assert_eq!(engine.grammar().len(), size);

    let first = engine.resolve(&parts).unwrap();
    let second = engine.resolve(&parts).unwrap();
    assert_eq!(first.handle(), second.handle());
}

#[test]
fn handles_only_work_where_they_were_resolved() {
    let mut first = Engine::new();
    let mut second = Engine::new();
    second.run(&literal("a"), &Text::new("a")).unwrap();

    let length = first.resolve(&literal("a").map(|s: String| s.len())).unwrap();
    assert!(matches!(
        second.execute(&length, &Text::new("a")),
        Err(ResolveError::ForeignNode(_))
    ));
    assert_eq!(first.run(&length, &Text::new("a")).unwrap(), 1);

    let resolved = literal("a").resolve().unwrap();
    assert_eq!(resolved.run(&Text::new("a")).unwrap(), "a");
    assert!(first.execute(&resolved, &Text::new("a")).is_err());
}

#[test]
fn shared_nodes_share_memoized_results() {
    let count = Rc::new(Cell::new(0));
    let counted = || {
        let count = count.clone();
        let node = leaf("counted", "counted", move |input: &Text, position| {
            count.set(count.get() + 1);
            match input.at(position) {
                Some(&c) if c == 'a' => {
                    Match::success(Span::new(position, position + 1), Rc::new(c) as Value)
                }
                _ => Match::failure("expected a", Span::at(position)),
            }
        });
        Parser::<Text, char>::from_node(node.cacheable(true))
    };

    // Built twice, but structurally the same, so both branches use one node.
    let parser = alt([
        chain(counted(), literal("b"), |a, b| format!("{}{}", a, b)),
        chain(counted(), literal("c"), |a, c| format!("{}{}", a, c)),
    ]);

    assert_eq!(parser.run(&Text::new("ac")).unwrap(), "ac");
    assert_eq!(count.get(), 1);
}

#[test]
fn identical_structures_resolve_to_one_node() {
    let mut engine = Engine::<Text>::new();
    let build = || alt([literal("a"), literal("b")]).many();

    let first = engine.resolve(&build()).unwrap();
    let second = engine.resolve(&build()).unwrap();
    assert_eq!(first.handle(), second.handle());

    let other = engine.resolve(&alt([literal("b"), literal("a")]).many()).unwrap();
    assert_ne!(first.handle(), other.handle());
}

#[test]
fn run_needs_the_whole_input() {
    let parser = literal("ab");
    let input = Text::new("abc");

    let m = parser.execute(&input).unwrap();
    assert_eq!(m, Match::success(Span::new(0, 2), String::from("ab")));
    assert!(parser.run(&input).is_err());
    assert!(parser.consume().execute(&input).unwrap().is_failure());
}

#[test]
fn left_recursion_fails_instead_of_hanging() {
    fn only_left() -> Parser<Text, String> {
        alt([chain(Parser::lazy(only_left), literal("a"), |l, a| l + &a)])
    }

    fn with_base() -> Parser<Text, String> {
        alt([
            chain(Parser::lazy(with_base), literal("a"), |l, a| l + &a),
            literal("b"),
        ])
    }

    let mut engine = Engine::new();

    let m = engine.execute(&Parser::lazy(only_left), &Text::new("aa")).unwrap();
    assert_eq!(m, Match::failure("left recursion", Span::at(0)));

    // The recursive call fails, so the base case is all that matches.
    let m = engine.execute(&Parser::lazy(with_base), &Text::new("baa")).unwrap();
    assert_eq!(m, Match::success(Span::new(0, 1), String::from("b")));
}

#[test]
fn deep_nesting() {
    fn parens() -> Parser<Text, usize> {
        alt([
            chain(literal("("), Parser::lazy(parens).skip(literal(")")), |_, n| n + 1),
            literal("").to(0),
        ])
    }

    let depth = 10_000;
    let input = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(parens().run(&Text::new(input)).unwrap(), depth);
}

#[test]
fn token_sequences() {
    #[derive(Clone, Debug, PartialEq)]
    enum Token {
        Let,
        Name(&'static str),
        Equals,
        Number(i64),
    }

    type Tokens = Vec<Token>;

    let name = satisfy::<Tokens, _>("a name", |t| matches!(t, Token::Name(_)));
    let number = satisfy::<Tokens, _>("a number", |t| matches!(t, Token::Number(_)));

    let binding = chain(
        item::<Tokens>(Token::Let).then(name),
        item::<Tokens>(Token::Equals).then(number),
        |name, value| (name, value),
    );

    let tokens = vec![
        Token::Let,
        Token::Name("x"),
        Token::Equals,
        Token::Number(3),
    ];

    let (name, value) = binding.run(&tokens).unwrap();
    assert_eq!(name, Token::Name("x"));
    assert_eq!(value, Token::Number(3));

    let m = binding.execute(&tokens[..2].to_vec()).unwrap();
    assert_eq!(m, Match::failure("expected Equals", Span::at(2)));
}
