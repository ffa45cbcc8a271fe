//! Error kinds shared by every stage of the compressor.
//!
//! Each stage either finishes completely or returns one of these. There are no partial
//! successes: a failure on any block aborts the whole file.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, ModuleError>;

#[derive(Debug, Error)]
pub enum ModuleError {
    /// An allocation could not be satisfied.
    #[error("out of memory: could not allocate {requested} bytes")]
    OutOfMemory { requested: usize },

    /// A file could not be opened or created.
    #[error("could not open {}: {source}", path.display())]
    FileInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A read or write moved the wrong number of bytes, or a field did not parse.
    #[error("file stream failed: {0}")]
    FileStreamFailed(String),

    /// The content does not follow the expected layout.
    #[error("file unrecognizable: {0}")]
    FileUnrecognizable(String),

    /// The input is too small to be worth splitting into blocks.
    #[error("file too small: {size} bytes (at least {minimum} needed)")]
    FileTooSmall { size: u64, minimum: u64 },
}

impl ModuleError {
    pub fn stream(message: impl Into<String>) -> Self {
        ModuleError::FileStreamFailed(message.into())
    }

    pub fn unrecognizable(message: impl Into<String>) -> Self {
        ModuleError::FileUnrecognizable(message.into())
    }
}

impl From<std::io::Error> for ModuleError {
    fn from(err: std::io::Error) -> Self {
        ModuleError::FileStreamFailed(err.to_string())
    }
}

/// Open a file for reading, tagging failures with the path.
pub fn open_file(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::File::open(path).map_err(|source| ModuleError::FileInaccessible {
        path: path.to_path_buf(),
        source,
    })
}

/// Create (or truncate) a file for writing, tagging failures with the path.
pub fn create_file(path: &std::path::Path) -> Result<std::fs::File> {
    std::fs::File::create(path).map_err(|source| ModuleError::FileInaccessible {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole file into memory.
pub fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    use std::io::Read;
    let mut data = Vec::new();
    open_file(path)?.read_to_end(&mut data)?;
    Ok(data)
}
