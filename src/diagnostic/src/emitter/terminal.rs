//! Pretty printing of diagnostic messages.
//!
//! This module handles all the external libraries we need to do this (mostly)
//! right, and wraps them up in a single configurable printer.

use std::borrow::Cow;
use std::io::{Result, Write};

use term_size::dimensions_stderr;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use textwrap::Options;
use unicode_width::UnicodeWidthStr;

use super::code_window::CodeWindow;
use super::{Emitter, LineArt};
use crate::level::Level;
use crate::{Diagnostic, InputCoordinator};

/// A printer which draws a window into the input under the message, with the
/// highlighted regions underlined.
pub struct FancyEmitter<W> {
    /// Output stream.
    out: W,
    /// The set of line art characters to use.
    line_art: LineArt,
    /// The max width of the output
    width: usize,
}

impl FancyEmitter<StandardStream> {
    /// Prints to stderr, using all the fancy features.
    pub fn stderr() -> Self {
        let width = match dimensions_stderr() {
            Some((w, _)) if w >= Self::MIN_WIDTH => w,
            _ => Self::DEFAULT_WIDTH,
        };

        FancyEmitter::new(
            StandardStream::stderr(ColorChoice::Auto),
            LineArt::UNICODE,
            width,
        )
    }
}

impl<W> FancyEmitter<W> {
    /// The default terminal width used if the actual terminal is below
    /// `MIN_WIDTH`.
    pub const DEFAULT_WIDTH: usize = 80;

    /// The narrowest allowed terminal size that things will be wrapped to, any
    /// smaller and we use `DEFAULT_WIDTH` instead to maintain readability.
    pub const MIN_WIDTH: usize = 40;

    /// Notes in the right margin must have at least this much room.
    pub const MIN_NOTE_MARGIN: usize = 20;

    pub fn new(out: W, line_art: LineArt, width: usize) -> Self {
        FancyEmitter {
            out,
            line_art,
            width: width.max(Self::MIN_WIDTH),
        }
    }

    /// Give back the output stream.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// The width of line-wrapped output.
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    /// The line art used by the printer
    pub(crate) fn line_art(&self) -> LineArt {
        self.line_art
    }

    /// How wide is a string when printed?
    ///
    /// This isn't the same as the string's `s.len()` which counts bytes, or the
    /// `s.chars().count()` as some rendered characters are multiple code points
    /// (and some single code points may be double wide in a terminal).
    pub(crate) fn presentation_width(&self, s: &str) -> usize {
        UnicodeWidthStr::width(s)
    }

    /// Line wrapping for message text.
    pub(crate) fn wrap<'a>(&self, text: &'a str, width: usize) -> Vec<Cow<'a, str>> {
        textwrap::wrap(text, Options::new(width.max(1)))
    }
}

impl<W: WriteColor> FancyEmitter<W> {
    /// A handle on the output stream.
    pub(crate) fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Prints `len` number of the `padding` character.
    pub(crate) fn pad(&mut self, padding: char, len: usize) -> Result<()> {
        for _ in 0..len {
            write!(self.out, "{}", padding)?;
        }
        Ok(())
    }

    /// Set the output to print dimmed text.
    pub(crate) fn dim_spec(&mut self) -> Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_dimmed(true);
        self.out.set_color(&spec)
    }

    /// Set the output to highlight printed text.
    pub(crate) fn highlight_spec(&mut self) -> Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_bold(true);
        spec.set_fg(Some(Color::Yellow));
        self.out.set_color(&spec)
    }

    /// Set the output style to the style used for notes.
    pub(crate) fn note_spec(&mut self) -> Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Blue));
        self.out.set_color(&spec)
    }

    /// Reset the printed style to the default.
    pub(crate) fn reset_spec(&mut self) -> Result<()> {
        self.out.reset()
    }

    /// Set the spec of the settings for this level.
    fn set_level_spec(&mut self, level: Level) -> Result<()> {
        let mut spec = ColorSpec::new();
        spec.set_bold(true);
        let color = match level {
            Level::Error => Color::Red,
            Level::Help => Color::Green,
            Level::Info => Color::Cyan,
        };
        spec.set_fg(Some(color));
        self.out.set_color(&spec)
    }

    fn emit_message(&mut self, d: &Diagnostic, name: Option<&str>) -> Result<()> {
        // The coloured prefix also decides how much subsequent lines are
        // indented.
        let prefix_length = self.emit_message_level(d.get_level())?;
        let wrap_width = self.width().saturating_sub(prefix_length);

        let text = match (name, d.get_location()) {
            (Some(n), Some(l)) => format!("{} ({n}:{l})", d.get_text()),
            (None, Some(l)) => format!("{} ({l})", d.get_text()),
            _ => d.get_text().to_string(),
        };

        let lines = self.wrap(&text, wrap_width);
        let mut lines = lines.iter();

        // First line doesn't have a prefix, since it comes after the level.
        writeln!(self.out, "{}", lines.next().map_or("", |l| l.as_ref()))?;

        for line in lines {
            self.pad(' ', prefix_length)?;
            writeln!(self.out, "{}", line)?;
        }

        Ok(())
    }

    /// Emits the coloured prefix of the message, which is the level name with a
    /// `": "` at the end for spacing. This will set and reset the colour too.
    fn emit_message_level(&mut self, level: Level) -> Result<usize> {
        self.set_level_spec(level)?;
        write!(self.out, "{}: ", level.name())?;
        self.reset_spec()?;
        Ok(level.name().len() + ": ".len())
    }
}

impl<W: WriteColor> Emitter for FancyEmitter<W> {
    fn emit(&mut self, d: &Diagnostic, inputs: &InputCoordinator) -> Result<()> {
        let name = d.get_input().and_then(|id| inputs.get_input_name(id));
        self.emit_message(d, name.as_deref())?;

        let buffer = d.get_input().and_then(|id| inputs.get_input_buffer(id));

        if let (Some(buffer), false) = (buffer, d.get_highlights().is_empty()) {
            let window = CodeWindow::new(d.get_highlights(), buffer);
            window.print(self, name.as_deref().unwrap_or(""))?;
        }

        self.out.flush()
    }
}
