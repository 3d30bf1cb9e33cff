//! An interactive mode.

use diagnostic::InputCoordinator;
use plait::calc::Calculator;
use rustyline::{error::ReadlineError, Editor};

use crate::eval::report;

pub struct Repl {
    editor: Editor<()>,
    calculator: Calculator,
    /// Every line entered, so diagnostics can point back at them.
    inputs: InputCoordinator,
}

impl Default for Repl {
    fn default() -> Self {
        Repl {
            editor: Editor::<()>::new(),
            calculator: Calculator::new(),
            inputs: InputCoordinator::default(),
        }
    }
}

impl Repl {
    /// The prompt used to ask for more input.
    const PROMPT: &'static str = ">>> ";

    /// Lines which are the result of evaluation begin with this.
    const RESULT_PROMPT: &'static str = "//> ";

    pub fn start(mut self) {
        loop {
            match self.read() {
                Ok(line) => self.step(line),
                Err(ReplError::Clear) => continue,
                Err(ReplError::Exit) => break,
                Err(ReplError::Readline(e)) => {
                    println!("{}", e);
                    println!("  (press control-d to exit)");
                }
            }
        }
    }

    fn step(&mut self, line: String) {
        if line.trim().is_empty() {
            return;
        }

        self.editor.add_history_entry(line.as_str());
        let id = self.inputs.named_input("<repl>", line.as_str());

        match self.calculator.evaluate(&line) {
            Ok(value) => println!("{}{}", Repl::RESULT_PROMPT, value),
            Err(e) => report(&e, id, &self.inputs),
        }
    }

    fn read(&mut self) -> Result<String, ReplError> {
        match self.editor.readline(Repl::PROMPT) {
            Ok(line) => Ok(line),

            // User hit Control-C
            Err(ReadlineError::Interrupted) => Err(ReplError::Clear),

            // User hit Control-D at end of line, to exit.
            Err(ReadlineError::Eof) => Err(ReplError::Exit),

            Err(e) => Err(ReplError::Readline(e)),
        }
    }
}

#[derive(Debug)]
enum ReplError {
    Clear,
    Exit,
    Readline(ReadlineError),
}
