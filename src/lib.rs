//! Plait - a packrat parser-combinator engine.
//!
//! Everything here comes from the `parser` crate, which is where the engine
//! lives. Diagnostics for rendering parse errors are in [`diagnostic`]. The
//! [`calc`] module is a small grammar built with the engine, and what the
//! `plait` binary runs.

pub mod calc;

pub use diagnostic;
pub use parser::*;
