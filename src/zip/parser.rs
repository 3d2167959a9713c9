//! Low-level ZIP central directory parser.
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for large archive support
//! 3. Read the Central Directory, which names every entry in stored order
//!
//! Entry data and local file headers are never touched.

use std::io::Cursor;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::io::ReadAt;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// Location and size of the central directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CentralDirectory {
    pub offset: u64,
    pub size: u64,
    pub total_entries: u64,
}

/// Low-level ZIP file parser, generic over the data source.
pub struct ZipParser<R: ReadAt> {
    reader: Arc<R>,
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Returns the record and its offset in the file. Fails with
    /// [`Error::ArchiveFormat`] when no EOCD exists, which is how a
    /// non-ZIP file is detected.
    pub async fn find_eocd(&self) -> Result<(EndOfCentralDirectory, u64)> {
        // Common case first: no archive comment.
        if self.size >= EndOfCentralDirectory::SIZE as u64 {
            let offset = self.size - EndOfCentralDirectory::SIZE as u64;
            let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
            self.reader.read_exact_at(offset, &mut buf).await?;

            if &buf[0..4] == EndOfCentralDirectory::SIGNATURE && &buf[20..22] == b"\x00\x00" {
                let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
                return Ok((eocd, offset));
            }
        }

        let search_size = (MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE as u64).min(self.size);
        let search_start = self.size - search_size;

        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_exact_at(search_start, &mut buf).await?;

        if buf.len() >= EndOfCentralDirectory::SIZE {
            // Prefer a record whose comment runs exactly to the end of the
            // file; otherwise take the last complete record, ignoring
            // trailing padding.
            let mut last_complete = None;
            for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
                if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
                    continue;
                }
                let eocd =
                    EndOfCentralDirectory::from_bytes(&buf[i..i + EndOfCentralDirectory::SIZE])?;
                let offset = search_start + i as u64;
                if eocd.comment_len as usize == buf.len() - i - EndOfCentralDirectory::SIZE {
                    return Ok((eocd, offset));
                }
                last_complete.get_or_insert((eocd, offset));
            }
            if let Some((eocd, offset)) = last_complete {
                debug!(offset, "end of central directory followed by trailing bytes");
                return Ok((eocd, offset));
            }
        }

        Err(Error::format("Not a valid ZIP file"))
    }

    /// Read the ZIP64 End of Central Directory record.
    ///
    /// The locator sits immediately before the regular EOCD and the ZIP64
    /// record immediately before the locator. Both are found relative to
    /// the EOCD, so archives with leading bytes still resolve. Returns the
    /// record and its offset in the file.
    pub async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<(Zip64Eocd, u64)> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64EocdLocator::SIZE as u64)
            .ok_or_else(|| Error::format("Missing ZIP64 End of Central Directory Locator"))?;
        let mut locator_buf = vec![0u8; Zip64EocdLocator::SIZE];
        self.reader.read_exact_at(locator_offset, &mut locator_buf).await?;
        let locator = Zip64EocdLocator::from_bytes(&locator_buf)?;
        locator.ensure_single_disk()?;

        let eocd64_offset = locator_offset
            .checked_sub(Zip64Eocd::MIN_SIZE as u64)
            .ok_or_else(|| Error::format("Missing ZIP64 End of Central Directory"))?;
        debug!(
            eocd64_offset,
            recorded = locator.eocd64_offset,
            "reading zip64 end of central directory"
        );
        let mut eocd64_buf = vec![0u8; Zip64Eocd::MIN_SIZE];
        self.reader.read_exact_at(eocd64_offset, &mut eocd64_buf).await?;

        Ok((Zip64Eocd::from_bytes(&eocd64_buf)?, eocd64_offset))
    }

    /// Locate the central directory, following ZIP64 records when needed.
    ///
    /// Offsets stored in the archive are relative to the start of the ZIP
    /// data. When bytes precede it (a self-extractor stub, say) the
    /// directory is shifted by that prefix, measured from where the
    /// directory must end.
    pub async fn central_directory(&self) -> Result<CentralDirectory> {
        let (eocd, eocd_offset) = self.find_eocd().await?;
        debug!(eocd_offset, zip64 = eocd.is_zip64(), "found end of central directory");

        let (recorded_offset, size, total_entries, directory_end) = if eocd.is_zip64() {
            let (eocd64, eocd64_offset) = self.read_zip64_eocd(eocd_offset).await?;
            (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries, eocd64_offset)
        } else {
            (
                eocd.cd_offset as u64,
                eocd.cd_size as u64,
                eocd.total_entries as u64,
                eocd_offset,
            )
        };

        let prefix = directory_end
            .checked_sub(size)
            .and_then(|start| start.checked_sub(recorded_offset))
            .ok_or_else(|| Error::format("Central Directory lies outside the archive"))?;
        if prefix > 0 {
            debug!(prefix, "archive data starts after leading bytes");
        }

        Ok(CentralDirectory {
            offset: recorded_offset + prefix,
            size,
            total_entries,
        })
    }

    /// Names of all entries, in central directory order.
    pub async fn entry_names(&self) -> Result<Vec<String>> {
        let cd = self.central_directory().await?;

        // One read for the whole directory.
        let mut cd_data = vec![0u8; cd.size as usize];
        self.reader.read_exact_at(cd.offset, &mut cd_data).await?;

        // The directory size, not the entry count, bounds the walk: some
        // writers store the count modulo 65536.
        let mut names = Vec::new();
        let mut cursor = Cursor::new(cd_data.as_slice());
        while cursor.position() < cd.size {
            let header = CentralDirectoryHeader::read_from(&mut cursor)?;
            let name = header.name();
            trace!(%name, "central directory entry");
            names.push(name);
        }

        if names.len() as u64 != cd.total_entries {
            warn!(
                found = names.len(),
                recorded = cd.total_entries,
                "central directory entry count does not match end record"
            );
        }

        Ok(names)
    }
}
