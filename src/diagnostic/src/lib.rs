//! Diagnostics - user-readable messages about problems in some input.

mod caret;
mod diagnostic;
mod emitter;
mod highlight;
mod input_coordinator;
mod level;
mod span;

pub use self::{
    caret::Caret,
    diagnostic::Diagnostic,
    emitter::{Emitter, FancyEmitter, LineArt, PlainEmitter},
    highlight::Highlight,
    input_coordinator::{InputCoordinator, InputId},
    level::Level,
    span::Span,
};
