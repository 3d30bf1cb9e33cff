//! The severity of of some diagnostic.

use std::fmt;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    #[default]
    Error,
    Help,
    Info,
}

impl Level {
    /// The name of the level ready to be shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Help => "help",
            Level::Info => "info",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
