//! ZIP central directory reading.
//!
//! Only the index of an archive is read: the End of Central Directory
//! record, its ZIP64 counterpart when present, and the Central Directory
//! headers that carry each entry's name.
//!
//! - [`structures`]: fixed-layout records (EOCD, ZIP64 EOCD, CDFH)
//! - [`parser`]: locating and walking those records through a [`ReadAt`](crate::io::ReadAt)
//! - `cp437`: decoding of names written without the UTF-8 flag
//!
//! Leading bytes before the ZIP data and padding after the end record are
//! tolerated. Archives whose ZIP64 locator reports several disks are
//! rejected.

mod cp437;
mod parser;
mod structures;

pub use parser::{CentralDirectory, ZipParser};
pub use structures::*;
