use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while listing an archive or its fallback directory.
#[derive(Debug, Error)]
pub enum Error {
    /// The target exists but is not a readable ZIP container.
    #[error("{0}")]
    ArchiveFormat(String),

    /// The target exists but could not be opened or read.
    #[error("failed to read archive {}", path.display())]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The fallback directory is missing or unreadable.
    #[error("cannot list directory {}", path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The listing could not be written to the output.
    #[error("failed to write listing")]
    Output(#[source] io::Error),
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::ArchiveFormat(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
