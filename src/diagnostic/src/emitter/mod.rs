mod code_window;
mod line_art;
mod plain;
mod terminal;

use std::io;

use crate::{Diagnostic, InputCoordinator};

pub use self::{line_art::LineArt, plain::PlainEmitter, terminal::FancyEmitter};

/// An [`Emitter`] wraps up the ways you can output diagnostics.
pub trait Emitter {
    /// Emits the diagnostic, presenting it to the user/consumer.
    fn emit(
        &mut self,
        diagnostic: &Diagnostic,
        inputs: &InputCoordinator,
    ) -> io::Result<()>;
}
