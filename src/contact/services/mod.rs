//! Contact services.

mod directory;

pub use directory::{ContactDirectory, ContactDirectoryError, DirectoryEvent};
