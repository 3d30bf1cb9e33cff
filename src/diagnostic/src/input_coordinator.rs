//! Input Manager

use std::path::PathBuf;

/// A unique ID that corresponds to a piece of input tracked by an
/// [`InputCoordinator`].
///
/// This is what lets a [`Diagnostic`][crate::Diagnostic] find the text it's
/// talking about when it's rendered.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct InputId(usize);

#[derive(Default)]
pub struct InputCoordinator {
    /// Inputs, where [`InputId`] are the corresponding indexes.
    inputs: Vec<Input>,
}

impl InputCoordinator {
    /// Track input given a name by the caller.
    pub fn named_input(
        &mut self,
        name: impl Into<String>,
        buffer: impl Into<String>,
    ) -> InputId {
        self.push(buffer.into(), Name::Named(name.into()))
    }

    /// Track input read from a file.
    pub fn file_input(&mut self, buffer: String, path: PathBuf) -> InputId {
        self.push(buffer, Name::File(path))
    }

    fn push(&mut self, buffer: String, name: Name) -> InputId {
        let id = self.inputs.len();
        self.inputs.push(Input { buffer, name });
        InputId(id)
    }

    pub fn get_input_buffer(&self, id: InputId) -> Option<&str> {
        self.inputs.get(id.0).map(|i| i.buffer.as_str())
    }

    pub fn get_input_name(&self, id: InputId) -> Option<String> {
        let name = match &self.inputs.get(id.0)?.name {
            Name::File(path) => format!("{}", path.display()),
            Name::Named(name) => name.clone(),
        };

        Some(name)
    }
}

/// A piece of input has a name, and a buffer which contains its text.
struct Input {
    name: Name,
    buffer: String,
}

/// A piece of input is named based on where it came from.
enum Name {
    Named(String),
    File(PathBuf),
}
