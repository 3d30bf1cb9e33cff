//! Plait - a calculator, built on a packrat parser-combinator engine.

mod eval;
mod repl;

use std::path::PathBuf;

use clap::Parser;

const INPUT_HELP: &str =
    "The input file is evaluated as a single expression. If no file or \
     expression is provided, the REPL is started.";

const EXPRESSION_HELP: &str =
    "Evaluate EXPRESSION and print the result to standard out.";

#[derive(clap::Parser)]
#[clap(version, author, about = "a calculator, to show off the parser")]
pub struct Args {
    #[clap(value_name = "FILE", help = INPUT_HELP, parse(from_os_str))]
    input: Option<PathBuf>,

    #[clap(
        short,
        long,
        alias = "eval",
        value_name = "EXPRESSION",
        help = "Evaluate an expression",
        long_help = EXPRESSION_HELP,
        conflicts_with = "input"
    )]
    expression: Option<String>,
}

fn main() {
    let args = Args::parse();

    let succeeded = match (&args.input, &args.expression) {
        (Some(path), _) => eval::file(path),
        (None, Some(expression)) => eval::expression(expression),
        (None, None) => {
            repl::Repl::default().start();
            true
        }
    };

    if !succeeded {
        std::process::exit(1);
    }
}
