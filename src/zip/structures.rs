use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::error::{Error, Result};

use super::cp437::FromCp437;

/// Field value marking a count or offset as stored in the ZIP64 record.
const ZIP64_U16: u16 = 0xFFFF;
const ZIP64_U32: u32 = 0xFFFF_FFFF;

/// End of Central Directory (EOCD) - 22 bytes minimum
#[derive(Debug)]
pub struct EndOfCentralDirectory {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(Error::format("Invalid End of Central Directory"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        Self::read_fields(&mut cursor).map_err(|_| Error::format("Invalid End of Central Directory"))
    }

    fn read_fields(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        // this disk, disk holding the central directory
        cursor.set_position(4);
        Ok(Self {
            disk_entries: cursor.read_u16::<LittleEndian>()?,
            total_entries: cursor.read_u16::<LittleEndian>()?,
            cd_size: cursor.read_u32::<LittleEndian>()?,
            cd_offset: cursor.read_u32::<LittleEndian>()?,
            comment_len: cursor.read_u16::<LittleEndian>()?,
        })
    }

    pub fn is_zip64(&self) -> bool {
        self.disk_entries == ZIP64_U16
            || self.total_entries == ZIP64_U16
            || self.cd_size == ZIP64_U32
            || self.cd_offset == ZIP64_U32
    }
}

/// ZIP64 End of Central Directory Locator - 20 bytes
#[derive(Debug)]
pub struct Zip64EocdLocator {
    pub disk_with_eocd64: u32,
    pub eocd64_offset: u64,
    pub total_disks: u32,
}

impl Zip64EocdLocator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(Error::format("Invalid ZIP64 End of Central Directory Locator"));
        }

        let mut cursor = Cursor::new(&data[4..]);
        let read = |cursor: &mut Cursor<&[u8]>| -> std::io::Result<Self> {
            Ok(Self {
                disk_with_eocd64: cursor.read_u32::<LittleEndian>()?,
                eocd64_offset: cursor.read_u64::<LittleEndian>()?,
                total_disks: cursor.read_u32::<LittleEndian>()?,
            })
        };
        read(&mut cursor).map_err(|_| Error::format("Invalid ZIP64 End of Central Directory Locator"))
    }

    /// Reject archives split across several disks.
    pub fn ensure_single_disk(&self) -> Result<()> {
        if self.disk_with_eocd64 != 0 || self.total_disks > 1 {
            return Err(Error::format(
                "ZIP archives that span multiple disks are not supported",
            ));
        }
        Ok(())
    }
}

/// ZIP64 End of Central Directory - 56 bytes minimum
#[derive(Debug)]
pub struct Zip64Eocd {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64Eocd {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::MIN_SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(Error::format("Invalid ZIP64 End of Central Directory"));
        }

        // Record size, versions, disk numbers and the per-disk count precede
        // the fields we need.
        let mut cursor = Cursor::new(&data[32..]);
        let read = |cursor: &mut Cursor<&[u8]>| -> std::io::Result<Self> {
            Ok(Self {
                total_entries: cursor.read_u64::<LittleEndian>()?,
                cd_size: cursor.read_u64::<LittleEndian>()?,
                cd_offset: cursor.read_u64::<LittleEndian>()?,
            })
        };
        read(&mut cursor).map_err(|_| Error::format("Invalid ZIP64 End of Central Directory"))
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// General purpose flag bit announcing UTF-8 names.
const FLAG_UTF8: u16 = 1 << 11;

/// The parts of a central directory header needed to name an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryHeader {
    pub flags: u16,
    pub file_name: Vec<u8>,
}

impl CentralDirectoryHeader {
    /// Parse one header and leave the cursor at the next one.
    pub fn read_from(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let mut sig = [0u8; 4];
        cursor
            .read_exact(&mut sig)
            .map_err(|_| Error::format("Truncated Central Directory"))?;
        if sig != CDFH_SIGNATURE {
            return Err(Error::format("Invalid Central Directory File Header"));
        }

        Self::read_body(cursor).map_err(|_| Error::format("Truncated Central Directory"))
    }

    fn read_body(cursor: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        // version made by, version needed
        cursor.set_position(cursor.position() + 4);
        let flags = cursor.read_u16::<LittleEndian>()?;
        // method, time, date, crc32, compressed and uncompressed sizes
        cursor.set_position(cursor.position() + 18);
        let file_name_length = cursor.read_u16::<LittleEndian>()?;
        let extra_field_length = cursor.read_u16::<LittleEndian>()?;
        let file_comment_length = cursor.read_u16::<LittleEndian>()?;
        // disk start, internal and external attributes, local header offset
        cursor.set_position(cursor.position() + 12);

        let mut file_name = vec![0u8; file_name_length as usize];
        cursor.read_exact(&mut file_name)?;

        let trailing = extra_field_length as u64 + file_comment_length as u64;
        let end = cursor.position() + trailing;
        if end > cursor.get_ref().len() as u64 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        cursor.set_position(end);

        Ok(Self { flags, file_name })
    }

    /// Entry name as a zip reader presents it: UTF-8 when flagged,
    /// code page 437 otherwise.
    pub fn name(&self) -> String {
        if self.flags & FLAG_UTF8 != 0 {
            String::from_utf8_lossy(&self.file_name).into_owned()
        } else {
            self.file_name.as_slice().from_cp437()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cdfh(flags: u16, name: &[u8], extra: &[u8], comment: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(CDFH_SIGNATURE);
        buf.extend_from_slice(&[20, 0, 20, 0]);
        buf.extend_from_slice(&flags.to_le_bytes());
        buf.extend_from_slice(&[0u8; 18]);
        buf.extend_from_slice(&(name.len() as u16).to_le_bytes());
        buf.extend_from_slice(&(extra.len() as u16).to_le_bytes());
        buf.extend_from_slice(&(comment.len() as u16).to_le_bytes());
        buf.extend_from_slice(&[0u8; 12]);
        buf.extend_from_slice(name);
        buf.extend_from_slice(extra);
        buf.extend_from_slice(comment);
        buf
    }

    #[test]
    fn eocd_rejects_bad_signature() {
        let mut data = [0u8; EndOfCentralDirectory::SIZE];
        data[0..4].copy_from_slice(b"PK\x03\x04");
        assert!(EndOfCentralDirectory::from_bytes(&data).is_err());
    }

    #[test]
    fn eocd_detects_zip64_markers() {
        let mut data = [0u8; EndOfCentralDirectory::SIZE];
        data[0..4].copy_from_slice(EndOfCentralDirectory::SIGNATURE);
        data[10..12].copy_from_slice(&[0xFF, 0xFF]);
        data[20..22].copy_from_slice(&7u16.to_le_bytes());
        let eocd = EndOfCentralDirectory::from_bytes(&data).unwrap();
        assert_eq!(eocd.total_entries, 0xFFFF);
        assert_eq!(eocd.comment_len, 7);
        assert!(eocd.is_zip64());
    }

    fn locator(disk_with_eocd64: u32, total_disks: u32) -> Zip64EocdLocator {
        let mut data = Vec::new();
        data.extend_from_slice(Zip64EocdLocator::SIGNATURE);
        data.extend_from_slice(&disk_with_eocd64.to_le_bytes());
        data.extend_from_slice(&1234u64.to_le_bytes());
        data.extend_from_slice(&total_disks.to_le_bytes());
        Zip64EocdLocator::from_bytes(&data).unwrap()
    }

    #[test]
    fn locator_accepts_single_disk() {
        let single = locator(0, 1);
        assert_eq!(single.eocd64_offset, 1234);
        assert!(single.ensure_single_disk().is_ok());
        // Some writers leave the disk count at zero.
        assert!(locator(0, 0).ensure_single_disk().is_ok());
    }

    #[test]
    fn locator_rejects_spanned_archives() {
        for (disk, total) in [(0, 2), (1, 2)] {
            let err = locator(disk, total).ensure_single_disk().unwrap_err();
            assert!(matches!(err, Error::ArchiveFormat(_)));
        }
    }

    #[test]
    fn header_skips_extra_and_comment() {
        let mut data = cdfh(FLAG_UTF8, b"first.txt", b"\x01\x00\x00\x00", b"note");
        data.extend(cdfh(FLAG_UTF8, b"second.txt", b"", b""));
        let mut cursor = Cursor::new(data.as_slice());

        let first = CentralDirectoryHeader::read_from(&mut cursor).unwrap();
        let second = CentralDirectoryHeader::read_from(&mut cursor).unwrap();
        assert_eq!(first.name(), "first.txt");
        assert_eq!(second.name(), "second.txt");
        assert_eq!(cursor.position() as usize, data.len());
    }

    #[test]
    fn header_decodes_legacy_names_as_cp437() {
        let data = cdfh(0, b"caf\x82.txt", b"", b"");
        let header = CentralDirectoryHeader::read_from(&mut Cursor::new(data.as_slice())).unwrap();
        assert_eq!(header.name(), "café.txt");
    }

    #[test]
    fn header_decodes_flagged_names_as_utf8() {
        let data = cdfh(FLAG_UTF8, "café.txt".as_bytes(), b"", b"");
        let header = CentralDirectoryHeader::read_from(&mut Cursor::new(data.as_slice())).unwrap();
        assert_eq!(header.name(), "café.txt");
    }

    #[test]
    fn truncated_header_is_a_format_error() {
        let mut data = cdfh(FLAG_UTF8, b"cut.txt", b"", b"");
        data.truncate(CDFH_MIN_SIZE + 2);
        let err = CentralDirectoryHeader::read_from(&mut Cursor::new(data.as_slice())).unwrap_err();
        assert!(matches!(err, Error::ArchiveFormat(_)));
    }
}
