//! # zipls
//!
//! List the entry names of a ZIP archive.
//!
//! The archive's central directory is read from the end of the file and
//! each entry name is printed in stored order. Entry data is never read.
//! When the archive does not exist, a fixed fallback directory is listed
//! instead.
//!
//! ## Example
//!
//! ```no_run
//! use zipls::ArchiveLister;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let lister = ArchiveLister::new("theme.zip", "wallpapers");
//!     lister.list_contents(&mut std::io::stdout().lock()).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod lister;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{LocalFileReader, ReadAt};
pub use lister::{ArchiveLister, Listing};
pub use zip::ZipParser;
