//! A calculator for arithmetic on decimal numbers.
//!
//! ```text
//! sum     -> product (('+' | '-') product)*
//! product -> unary (('*' | '/') unary)*
//! unary   -> power | '-' unary
//! power   -> atom ('^' unary)?
//! atom    -> number | '(' sum ')'
//! ```
//!
//! Whitespace is allowed between any two tokens.

use parser::{alt, chain, literal, pattern, try_chain, Engine, Error, Parser, Text, Verdict};

/// Evaluates expressions, keeping its grammar resolved between them.
pub struct Calculator {
    engine: Engine<Text>,
    grammar: Parser<Text, f64>,
}

impl Default for Calculator {
    fn default() -> Self {
        Calculator::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Calculator {
            engine: Engine::new(),
            grammar: calculation(),
        }
    }

    /// Evaluate all of `input` as one expression.
    pub fn evaluate(&mut self, input: &str) -> Result<f64, Error> {
        self.engine.run(&self.grammar, &Text::new(input))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Op {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Op {
    fn apply(self, left: f64, right: f64) -> Verdict<f64> {
        let value = match self {
            Op::Add => left + right,
            Op::Subtract => left - right,
            Op::Multiply => left * right,
            Op::Divide if right == 0.0 => return Verdict::Reject,
            Op::Divide => left / right,
        };

        Verdict::Accept(value)
    }
}

/// An expression, with any whitespace before it.
pub fn calculation() -> Parser<Text, f64> {
    whitespace().then(sum())
}

fn sum() -> Parser<Text, f64> {
    let operator = alt([op("+", Op::Add), op("-", Op::Subtract)]);
    let rest = chain(operator, product(), |op, n| (op, n));
    try_chain(product(), rest.many(), fold)
}

fn product() -> Parser<Text, f64> {
    let operator = alt([op("*", Op::Multiply), op("/", Op::Divide)]);
    let rest = chain(operator, unary(), |op, n| (op, n));
    try_chain(unary(), rest.many(), fold)
}

fn unary() -> Parser<Text, f64> {
    alt([power(), token("-").then(Parser::lazy(unary)).map(|n: f64| -n)])
}

fn power() -> Parser<Text, f64> {
    let exponent = token("^").then(Parser::lazy(unary)).optional();
    chain(atom(), exponent, |base, exponent| match exponent {
        Some(exponent) => base.powf(exponent),
        None => base,
    })
}

fn atom() -> Parser<Text, f64> {
    let parenthesized = token("(").then(Parser::lazy(sum)).skip(token(")"));
    alt([number(), parenthesized])
}

fn number() -> Parser<Text, f64> {
    pattern(r"[0-9]+(\.[0-9]+)?")
        .skip(whitespace())
        .try_map(|digits, _| Verdict::from(digits.parse::<f64>().ok()))
        .on_fail("expected a number")
}

fn fold(first: f64, rest: Vec<(Op, f64)>) -> Verdict<f64> {
    let mut total = first;

    for (op, n) in rest {
        total = match op.apply(total, n) {
            Verdict::Accept(value) => value,
            Verdict::Reject => return Verdict::Reject,
        };
    }

    Verdict::Accept(total)
}

fn op(symbol: &str, op: Op) -> Parser<Text, Op> {
    token(symbol).to(op)
}

fn token(text: &str) -> Parser<Text, String> {
    literal(text).skip(whitespace())
}

fn whitespace() -> Parser<Text, ()> {
    pattern(r"\s*").discard()
}
