use std::fmt;

use crate::caret::Caret;
use crate::highlight::Highlight;
use crate::input_coordinator::InputId;
use crate::level::Level;
use crate::Span;

/// Diagnostic messages, with a lot of trimmings.
///
/// The ultimate purpose of these is to be shown to the user at some point. To
/// that end, the `Display` implementation here just dumps un-wrapped plain
/// text, and the [`Emitter`][crate::Emitter]s do the nicer presentation.
///
/// They're built builder-style, with methods which consume `self` and return
/// it. Getters start with `get`.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The input the problem was found in.
    input_id: Option<InputId>,

    /// Where in the input the problem begins.
    ///
    /// Not all problems have a location, for instance "file not found" can't.
    location: Option<Caret>,

    /// The highlighted regions relevant to this diagnostic, sorted by where
    /// they start.
    highlights: Vec<Highlight>,

    level: Level,

    /// This is the primary message of the diagnostic.
    text: String,
}

impl Diagnostic {
    /// Create a new diagnostic message with only a simple description.
    ///
    /// The [`Level`]'s [`Default`] is used.
    pub fn new(text: impl Into<String>) -> Self {
        Diagnostic {
            input_id: None,
            location: None,
            highlights: Vec::new(),
            level: Level::default(),
            text: text.into(),
        }
    }

    /// Add the id of the input that caused this issue.
    ///
    /// This is just an [`InputId`] that corresponds to an
    /// [`InputCoordinator`][ic], instead of say a reference, since we don't
    /// necessarily know the lifetime of the input when the Diagnostic is made.
    ///
    /// [ic]: crate::InputCoordinator
    pub fn input(mut self, id: InputId) -> Self {
        self.input_id = Some(id);
        self
    }

    /// The id of the input that produced this issue.
    pub fn get_input(&self) -> Option<InputId> {
        self.input_id
    }

    /// The location where the issue started.
    pub fn location(mut self, location: Caret) -> Self {
        self.location = Some(location);
        self
    }

    /// Get the location where the issue arose. This may be `None` if it's not
    /// known.
    pub fn get_location(&self) -> Option<Caret> {
        self.location
    }

    /// Add a highlight with a note to this diagnostic message.
    pub fn highlight(mut self, span: Span, note: impl Into<String>) -> Self {
        self.push_highlight(Highlight::new(span, note));
        self
    }

    fn push_highlight(&mut self, highlight: Highlight) {
        let at = self
            .highlights
            .partition_point(|h| h.span().start() <= highlight.span().start());
        self.highlights.insert(at, highlight);
    }

    /// View the list of highlights, sorted by where they start.
    pub fn get_highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Get the main diagnostic message.
    pub fn get_text(&self) -> &str {
        &self.text
    }

    pub fn get_level(&self) -> Level {
        self.level
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.location {
            Some(l) => write!(f, "{} {}: {}", self.level, l, self.text),
            None => write!(f, "{}: {}", self.level, self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(from: u32, to: u32) -> Span {
        Span::new(Caret::new(0, from), Caret::new(0, to))
    }

    #[test]
    fn highlights_stay_sorted() {
        let d = Diagnostic::new("oops")
            .highlight(span(5, 6), "second")
            .highlight(span(1, 2), "first");

        let notes: Vec<_> =
            d.get_highlights().iter().filter_map(|h| h.note()).collect();
        assert_eq!(notes, ["first", "second"]);
    }

    #[test]
    fn display_with_location() {
        let d = Diagnostic::new("expected \"x\"").location(Caret::new(0, 3));
        assert_eq!(d.to_string(), "error 1:4: expected \"x\"");
    }
}
