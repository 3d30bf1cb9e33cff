//! Evaluate an expression taken from the command line or a file, printing the
//! result.

use std::{fs, path::Path};

use diagnostic::{Emitter, FancyEmitter, InputCoordinator, InputId};
use plait::{calc::Calculator, Error};

/// Evaluate `expression`, returning whether it worked.
pub fn expression(expression: &str) -> bool {
    let mut inputs = InputCoordinator::default();
    let id = inputs.named_input("<expression>", expression);

    evaluate(&mut Calculator::new(), expression, id, &inputs)
}

/// Evaluate the contents of the file at `path`, returning whether it worked.
pub fn file(path: &Path) -> bool {
    let buffer = match fs::read_to_string(path) {
        Ok(buffer) => buffer,
        Err(e) => {
            eprintln!("Error: cannot read '{}': {}", path.display(), e);
            return false;
        }
    };

    let mut inputs = InputCoordinator::default();
    let id = inputs.file_input(buffer.clone(), path.to_path_buf());

    evaluate(&mut Calculator::new(), &buffer, id, &inputs)
}

fn evaluate(
    calculator: &mut Calculator,
    input: &str,
    id: InputId,
    inputs: &InputCoordinator,
) -> bool {
    match calculator.evaluate(input) {
        Ok(value) => {
            println!("{value}");
            true
        }
        Err(e) => {
            report(&e, id, inputs);
            false
        }
    }
}

/// Tell the user why the input with `id` couldn't be evaluated.
pub fn report(error: &Error, id: InputId, inputs: &InputCoordinator) {
    match error {
        Error::Parse(e) => {
            let mut emitter = FancyEmitter::stderr();
            if let Err(io) = emitter.emit(&e.diagnostic(Some(id)), inputs) {
                eprintln!("Error: {e} (and then {io} while reporting it)");
            }
        }

        // The grammar is fixed, so this is a bug in it rather than the input.
        Error::Resolve(e) => eprintln!("Error: invalid grammar: {e}"),
    }
}
