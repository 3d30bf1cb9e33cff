//! Sequences - the input being parsed.
//!
//! The engine only ever looks at input through the [`Sequence`] trait, so the
//! items can be characters, tokens from some lexer, or anything comparable.

use std::fmt;

use diagnostic::Caret;

use crate::graph::Node;
use crate::leaf;

/// An immutable, indexable view over the input.
///
/// Positions run from `0` to `len()`, where `len()` itself is the end of
/// input.
pub trait Sequence: 'static {
    type Item: Clone + PartialEq + fmt::Debug + 'static;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The item at `position`, or [`None`] at (or past) the end.
    fn at(&self, position: usize) -> Option<&Self::Item>;

    /// Is `position` the end of input?
    fn is_end(&self, position: usize) -> bool {
        position >= self.len()
    }

    /// A human-readable rendering of the items between two positions, used in
    /// error messages.
    fn excerpt(&self, start: usize, end: usize) -> String;

    /// Where a position is, for people. Sequences without lines are treated
    /// as one long line.
    fn caret(&self, position: usize) -> Caret {
        Caret::new(0, position.min(self.len()) as u32)
    }

    /// Turn a [`Literal`] into a leaf parser which can match this kind of
    /// sequence.
    ///
    /// This is called when a grammar is resolved. The default is to refuse,
    /// since most sequences don't contain text.
    fn implicit(literal: &Literal) -> Result<Node<Self>, String>
    where
        Self: Sized,
    {
        Err(format!("{literal} cannot be matched against this kind of input"))
    }
}

/// Leaves written as plain data, which each kind of [`Sequence`] decides how
/// to match.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    /// Exactly this text.
    Text(String),
    /// Text matching this regular expression.
    Pattern(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Literal::Text(text) => write!(f, "{:?}", text),
            Literal::Pattern(pattern) => write!(f, "/{}/", pattern),
        }
    }
}

/// Text, as a sequence of [`char`]s.
///
/// Positions count characters, not bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Text {
    source: String,
    chars: Vec<char>,
    /// The byte offset of each char, plus one more for the end of input.
    offsets: Vec<usize>,
}

impl Text {
    pub fn new(source: impl Into<String>) -> Text {
        let source = source.into();

        let (offsets, chars): (Vec<usize>, Vec<char>) = source.char_indices().unzip();
        let mut offsets = offsets;
        offsets.push(source.len());

        Text {
            source,
            chars,
            offsets,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// The characters between two positions, if they're both in the text.
    pub fn chars(&self, start: usize, end: usize) -> Option<&[char]> {
        self.chars.get(start..end)
    }

    /// The byte offset of a (char) position. Positions past the end are
    /// clamped to the end.
    pub fn byte_offset(&self, position: usize) -> usize {
        self.offsets[position.min(self.chars.len())]
    }

    /// The (char) position of a byte offset at a char boundary. Offsets
    /// inside a char round up to the next one.
    pub fn position_of(&self, byte: usize) -> usize {
        match self.offsets.binary_search(&byte) {
            Ok(position) | Err(position) => position,
        }
    }

    /// The text between two positions.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        let end = self.byte_offset(end);
        let start = self.byte_offset(start).min(end);
        &self.source[start..end]
    }
}

impl From<&str> for Text {
    fn from(s: &str) -> Text {
        Text::new(s)
    }
}

impl From<String> for Text {
    fn from(s: String) -> Text {
        Text::new(s)
    }
}

impl fmt::Display for Text {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl Sequence for Text {
    type Item = char;

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn at(&self, position: usize) -> Option<&char> {
        self.chars.get(position)
    }

    fn excerpt(&self, start: usize, end: usize) -> String {
        format!("{:?}", self.slice(start, end))
    }

    fn caret(&self, position: usize) -> Caret {
        Caret::locate(&self.source, position)
    }

    fn implicit(literal: &Literal) -> Result<Node<Text>, String> {
        match literal {
            Literal::Text(text) => Ok(leaf::text(text.clone())),
            Literal::Pattern(pattern) => leaf::regex(pattern),
        }
    }
}

/// Any list of comparable tokens is a sequence.
impl<T> Sequence for Vec<T>
where
    T: Clone + PartialEq + fmt::Debug + 'static,
{
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn at(&self, position: usize) -> Option<&T> {
        self.get(position)
    }

    fn excerpt(&self, start: usize, end: usize) -> String {
        let end = end.min(Vec::len(self));
        let start = start.min(end);
        format!("{:?}", &self[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_positions_are_chars() {
        let text = Text::new("añb");
        assert_eq!(text.len(), 3);
        assert_eq!(text.at(1), Some(&'ñ'));
        assert_eq!(text.byte_offset(2), 3);
        assert_eq!(text.position_of(3), 2);
        assert_eq!(text.slice(1, 3), "ñb");
        assert!(text.is_end(3));
        assert!(!text.is_end(2));
    }

    #[test]
    fn text_carets() {
        let text = Text::new("ab\ncd");
        assert_eq!(text.caret(4), Caret::new(1, 1));
        assert_eq!(text.excerpt(3, 5), "\"cd\"");
    }

    #[test]
    fn token_sequences() {
        let tokens = vec!["let", "x", "="];
        assert_eq!(Sequence::len(&tokens), 3);
        assert_eq!(tokens.at(1), Some(&"x"));
        assert_eq!(tokens.excerpt(1, 10), "[\"x\", \"=\"]");
        assert_eq!(tokens.caret(2), Caret::new(0, 2));
    }

    #[test]
    fn tokens_refuse_literals() {
        let error = <Vec<u8> as Sequence>::implicit(&Literal::Text("a".into()))
            .err()
            .unwrap();
        assert_eq!(error, "\"a\" cannot be matched against this kind of input");
    }
}
