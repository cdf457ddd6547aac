//! Storage abstraction used by the writer to create log files.
//!
//! The writer only ever needs one operation from storage: create (or
//! truncate) a file at a path and hand back something it can `write_all` to.
//! Keeping that behind a trait lets hosts route logs to other media and lets
//! tests inject failing storage without touching the filesystem.
//!
//! ## Contracts implementors should uphold
//! - `create` must start an empty file (create-new-or-truncate); the writer
//!   counts bytes from zero after every successful open.
//! - Writes on the returned handle should be unbuffered or flushed by the
//!   handle itself; the writer does not flush between records.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

/// Minimal storage API the writer depends on.
pub trait LogStorage {
    /// Handle for an open log file.
    type File: Write;

    /// Create or truncate the file at `path`.
    ///
    /// # Errors
    /// Returns the underlying I/O error (missing directory, permissions,
    /// no space) unchanged.
    fn create(&mut self, path: &Path) -> io::Result<Self::File>;
}

/// Local filesystem storage (`std::fs::File::create`).
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl LogStorage for FsStorage {
    type File = File;

    fn create(&mut self, path: &Path) -> io::Result<File> {
        File::create(path)
    }
}
