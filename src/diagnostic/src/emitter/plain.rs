//! A simple, safe, ascii-focused plain-text emitter.
//!
//! This should be a safe fall-back when we don't know what the output device
//! looks like. It writes one line per diagnostic.

use std::io::{self, Write};

use super::Emitter;
use crate::input_coordinator::InputCoordinator;
use crate::Diagnostic;

pub struct PlainEmitter<W> {
    out: W,
}

impl PlainEmitter<io::Stderr> {
    /// An emitter writing to standard error.
    pub fn stderr() -> Self {
        PlainEmitter::new(io::stderr())
    }
}

impl<W: Write> PlainEmitter<W> {
    pub fn new(out: W) -> Self {
        PlainEmitter { out }
    }

    /// Give back the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Emitter for PlainEmitter<W> {
    fn emit(
        &mut self,
        d: &Diagnostic,
        inputs: &InputCoordinator,
    ) -> io::Result<()> {
        write!(self.out, "{}", d.get_level())?;

        let name = d.get_input().and_then(|id| inputs.get_input_name(id));

        match (name, d.get_location()) {
            (None, None) => write!(self.out, ": ")?,
            (None, Some(l)) => write!(self.out, " {l}: ")?,
            (Some(n), None) => write!(self.out, ": {n} - ")?,
            (Some(n), Some(l)) => write!(self.out, ": {n}:{l} - ")?,
        }

        writeln!(self.out, "{}", d.get_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Caret;

    #[test]
    fn one_line_per_diagnostic() {
        let mut inputs = InputCoordinator::default();
        let id = inputs.named_input("sum", "1 +");

        let mut emitter = PlainEmitter::new(Vec::new());
        let d = Diagnostic::new("expected a digit")
            .input(id)
            .location(Caret::new(0, 3));
        emitter.emit(&d, &inputs).unwrap();
        emitter.emit(&Diagnostic::new("bare"), &inputs).unwrap();

        let out = String::from_utf8(emitter.into_inner()).unwrap();
        assert_eq!(out, "error: sum:1:4 - expected a digit\nerror: bare\n");
    }
}
