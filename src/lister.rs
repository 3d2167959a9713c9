//! The archive lister: print a ZIP archive's entry names, or list the
//! fallback directory when the archive is missing.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::io::{LocalFileReader, ReadAt};
use crate::zip::ZipParser;

/// What a run of [`ArchiveLister::list_contents`] printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    /// The archive existed; this many entry names were printed.
    Archive { entries: usize },
    /// The archive was missing; this many fallback directory names were printed.
    Fallback { entries: usize },
}

/// Lists one archive, falling back to a fixed directory.
///
/// The fallback directory is configured independently of the archive
/// path and is never derived from it.
#[derive(Debug, Clone)]
pub struct ArchiveLister {
    archive: PathBuf,
    fallback_dir: PathBuf,
}

impl ArchiveLister {
    pub fn new(archive: impl Into<PathBuf>, fallback_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            fallback_dir: fallback_dir.into(),
        }
    }

    /// Write the archive's entry names to `out`, one per line, in stored
    /// order. If the archive does not exist, write a not-found line, a
    /// header, and the fallback directory's children instead.
    ///
    /// A missing archive is the only handled condition. A malformed
    /// archive yields [`Error::ArchiveFormat`] and an unreadable fallback
    /// directory yields [`Error::DirectoryAccess`]; in the latter case the
    /// not-found line and header have already been written.
    pub async fn list_contents<W: Write>(&self, out: &mut W) -> Result<Listing> {
        if fs::try_exists(&self.archive).await.unwrap_or(false) {
            let entries = self.list_archive(out).await?;
            Ok(Listing::Archive { entries })
        } else {
            let entries = self.list_fallback(out).await?;
            Ok(Listing::Fallback { entries })
        }
    }

    async fn list_archive<W: Write>(&self, out: &mut W) -> Result<usize> {
        // The handle lives in this scope and is closed on every return path.
        let reader = Arc::new(LocalFileReader::new(&self.archive)?);
        debug!(path = %reader.path().display(), size = reader.size(), "opened archive");

        let names = ZipParser::new(reader).entry_names().await?;
        for name in &names {
            writeln!(out, "{name}").map_err(Error::Output)?;
        }
        Ok(names.len())
    }

    async fn list_fallback<W: Write>(&self, out: &mut W) -> Result<usize> {
        warn!(
            path = %self.archive.display(),
            fallback = %self.fallback_dir.display(),
            "archive not found, listing fallback directory"
        );
        writeln!(out, "File not found: {}", self.archive.display()).map_err(Error::Output)?;
        writeln!(out, "Contents of {}:", self.fallback_dir.display()).map_err(Error::Output)?;
        out.flush().map_err(Error::Output)?;

        let dir_error = |source| Error::DirectoryAccess {
            path: self.fallback_dir.clone(),
            source,
        };
        let mut entries = fs::read_dir(&self.fallback_dir).await.map_err(dir_error)?;
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await.map_err(dir_error)? {
            writeln!(out, "{}", entry.file_name().to_string_lossy()).map_err(Error::Output)?;
            count += 1;
        }
        Ok(count)
    }
}
