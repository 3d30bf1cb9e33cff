//! Common types shared by the crates in the workspace which aren't specific
//! to a single one of them.

mod index;

pub use index::Index;
