//! Error types for pagetree.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagetree.
///
/// A missing key is not an error: lookups return `Ok(None)` and deletes
/// return `Ok(false)`. Everything here means the operation could not be
/// carried out.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from disk operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page lies beyond the end of the file.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// The header page does not describe a file this build can read.
    #[error("Invalid index file header: magic {magic:#010x}, page size {page_size}")]
    InvalidHeader { magic: u32, page_size: u32 },

    /// A page decoded to something no valid tree could contain.
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// A header write failed earlier; the tree refuses further work.
    #[error("Tree is not operational after a failed header write")]
    NotOperational,
}

impl Error {
    pub(crate) fn corruption(msg: impl Into<String>) -> Self {
        Error::Corruption(msg.into())
    }
}
