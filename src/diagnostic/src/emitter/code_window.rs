//! Code windows are previews into the input presented when displaying
//! diagnostic messages to help the user locate problems.

use std::io::Result;

use termcolor::WriteColor;

use crate::{caret::Caret, emitter::terminal::FancyEmitter, highlight::Highlight, span::Span};

/// A preview into the input with highlights and notes in the margins to help
/// the user locate what a diagnostic is referring to.
///
/// Note that the code window doesn't know the name of the input, where the
/// owning diagnostic begins, or other more general diagnostic information.
#[derive(Debug)]
pub(crate) struct CodeWindow<'i, 'd> {
    /// Any highlighted regions and margin notes to show along with the input.
    /// There's always at least one.
    highlights: &'d [Highlight],
    /// The lines of input from `starting_line` to `ending_line`.
    lines: Vec<&'i str>,
}

impl<'i, 'd> CodeWindow<'i, 'd> {
    /// Create a new code window. It automatically knows what lines to save
    /// based on what's highlighted.
    pub fn new(highlights: &'d [Highlight], input: &'i str) -> Self {
        debug_assert!(!highlights.is_empty());

        let mut window = CodeWindow {
            highlights,
            lines: Vec::new(),
        };

        // `str::lines` drops an empty last line, but a failure at the very end
        // of the input can point there.
        let mut lines = input.lines().skip(window.starting_line() as usize);
        window.lines = (0..window.line_count())
            .map(|_| lines.next().unwrap_or(""))
            .collect();

        window
    }

    /// The line number the code window starts at.
    pub fn starting_line(&self) -> u32 {
        self.highlights
            .iter()
            .map(|h| h.span().start().line())
            .min()
            .unwrap_or(0)
    }

    /// The line number the code windows ends at.
    pub fn ending_line(&self) -> u32 {
        self.highlights
            .iter()
            .map(|h| h.span().end().line())
            .max()
            .unwrap_or(0)
    }

    /// How many lines are included in the code window.
    pub fn line_count(&self) -> u32 {
        self.ending_line() - self.starting_line() + 1
    }

    /// Returns an iterator of all highlights (in order) which intersect a span.
    /// If the intersection is the end of the highlight, the highlight's note is
    /// included if any.
    fn highlights_intersecting(
        &self,
        span: Span,
    ) -> impl Iterator<Item = (Span, Option<&str>)> {
        self.highlights.iter().filter_map(move |h| {
            h.span().intersection(span).map(|s| {
                let note = if s.end() == h.span().end() { h.note() } else { None };
                (s, note)
            })
        })
    }

    /// Return an iterator over the line number and lines in the code window.
    pub fn lines(&self) -> impl Iterator<Item = (u32, &'i str)> + '_ {
        let offset = self.starting_line();

        self.lines
            .iter()
            .enumerate()
            .map(move |(i, s)| (i as u32 + offset, *s))
    }
}

// Printing
impl<'i, 'd> CodeWindow<'i, 'd> {
    pub(crate) fn print<W: WriteColor>(
        &self,
        e: &mut FancyEmitter<W>,
        label: &str,
    ) -> Result<()> {
        self.header(e, label)?;

        for (number, line) in self.lines() {
            self.line(e, number, line)?;
        }

        Ok(())
    }

    /// Print a code window header with the right line art, right aligning the
    /// label.
    fn header<W: WriteColor>(&self, e: &mut FancyEmitter<W>, label: &str) -> Result<()> {
        let label_length = e.presentation_width(label);
        let code_width = self.code_width(e.width());

        // Copy these out since we'll need the &mut for getting `out`.
        let h = e.line_art().horizontal;
        let t = e.line_art().tee;

        e.dim_spec()?;
        e.pad(h, self.gutter_width())?;
        write!(e.out(), "{}", t)?;
        e.pad(h, code_width.saturating_sub(label_length + 1))?;
        e.reset_spec()?;

        if label.is_empty() {
            writeln!(e.out())
        } else {
            writeln!(e.out(), " {}", label)
        }
    }

    /// Print the line `number` and any highlights and notes under it.
    fn line<W: WriteColor>(&self, e: &mut FancyEmitter<W>, number: u32, line: &str) -> Result<()> {
        // Gutters show line numbers 1-indexed, like carets do.
        self.gutter(e, number + 1)?;
        writeln!(e.out(), "{}", line)?;

        let len = line.chars().count() as u32;
        let span = Span::new(Caret::new(number, 0), Caret::new(number, len));

        for (sp, note) in self.highlights_intersecting(span) {
            let left = Self::columns_width(e, line, 0, sp.start().column());
            let underline = Self::columns_width(e, line, sp.start().column(), sp.end().column()).max(1);
            let right = self.code_width(e.width()).saturating_sub(left + underline);

            self.underline(e, left, underline)?;

            match note {
                Some(note) if right >= FancyEmitter::<W>::MIN_NOTE_MARGIN => {
                    self.right_margin_note(e, note, left + underline + 1)?
                }
                Some(note) => {
                    writeln!(e.out())?;
                    self.below_note(e, note)?;
                }
                None => writeln!(e.out())?,
            }
        }

        Ok(())
    }

    /// The printed width of the characters of `line` between two columns.
    /// Columns past the end of the line count as one space each.
    fn columns_width<W>(e: &FancyEmitter<W>, line: &str, from: u32, to: u32) -> usize {
        let chars = line.chars().count() as u32;
        let (from, to) = (from.min(to), to);

        let start = line.char_indices().nth(from as usize).map_or(line.len(), |(i, _)| i);
        let end = line.char_indices().nth(to as usize).map_or(line.len(), |(i, _)| i);

        let overflow = to.saturating_sub(chars.max(from)) as usize;
        e.presentation_width(&line[start..end]) + overflow
    }

    /// Write an empty gutter, pad `left` spaces, then run the line art up for
    /// `length`.
    fn underline<W: WriteColor>(&self, e: &mut FancyEmitter<W>, left: usize, length: usize) -> Result<()> {
        self.empty_gutter(e)?;
        e.pad(' ', left)?;
        e.highlight_spec()?;
        let up = e.line_art().up;
        e.pad(up, length)?;
        e.reset_spec()
    }

    /// Write a note below the highlight line, since it didn't fit in the right
    /// margin.
    fn below_note<W: WriteColor>(&self, e: &mut FancyEmitter<W>, note: &str) -> Result<()> {
        for line in e.wrap(note, self.code_width(e.width())) {
            self.empty_gutter(e)?;
            e.note_spec()?;
            write!(e.out(), "{}", line)?;
            e.reset_spec()?;
            writeln!(e.out())?;
        }
        Ok(())
    }

    /// Write a note in the right margin, continuing on the next lines at the
    /// same indentation if it's long.
    fn right_margin_note<W: WriteColor>(
        &self,
        e: &mut FancyEmitter<W>,
        note: &str,
        indent: usize,
    ) -> Result<()> {
        let lines = e.wrap(note, self.code_width(e.width()).saturating_sub(indent));

        for (n, line) in lines.iter().enumerate() {
            if n == 0 {
                write!(e.out(), " ")?;
            } else {
                self.empty_gutter(e)?;
                e.pad(' ', indent)?;
            }
            e.note_spec()?;
            write!(e.out(), "{}", line)?;
            e.reset_spec()?;
            writeln!(e.out())?;
        }

        Ok(())
    }

    /// Print the gutter for the left hand side of the window, filling it with
    /// some `Display`able content.
    fn gutter<W: WriteColor>(&self, e: &mut FancyEmitter<W>, content: impl std::fmt::Display) -> Result<()> {
        e.dim_spec()?;
        let vertical = e.line_art().vertical;
        write!(
            e.out(),
            "{: >gutter_width$}{} ",
            content,
            vertical,
            gutter_width = self.gutter_width()
        )?;
        e.reset_spec()
    }

    /// A helper for printing an empty gutter, used by highlight and note lines.
    fn empty_gutter<W: WriteColor>(&self, e: &mut FancyEmitter<W>) -> Result<()> {
        self.gutter(e, "")
    }

    /// The width of the left column in the gutter, not including the vertical
    /// line or space after it.
    fn gutter_width(&self) -> usize {
        (self.ending_line() + 1).to_string().len()
    }

    /// The width of the code window, which is the `max_width` minus the gutter
    /// and spacing needed for the border.
    fn code_width(&self, max_width: usize) -> usize {
        // The 2 is for the "| " between the code and gutter.
        max_width.saturating_sub(self.gutter_width() + 2)
    }
}
