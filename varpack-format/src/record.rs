use std::io::Write;

use crate::checksum::crc32;
use crate::error::BuildError;
use crate::header::{CentralDirectoryHeader, LocalFileHeader, CENTRAL_HEADER_SIZE, LOCAL_HEADER_SIZE};
use crate::ser::Serialize;
use crate::time::DosDateTime;

/// Name used for entries that arrive without one.
pub const DEFAULT_ENTRY_NAME: &str = "FILE";

/// One entry as it is laid out in the stream. Lives for a single build.
#[derive(Debug)]
pub(crate) struct EntryRecord<'a> {
    pub(crate) name: &'a str,
    pub(crate) data: &'a [u8],
    pub(crate) header: LocalFileHeader,
    /// Offset of the local header from the start of the stream.
    pub(crate) offset: u32,
}

impl<'a> EntryRecord<'a> {
    pub(crate) fn new(
        name: &'a str,
        data: &'a [u8],
        modified: DosDateTime,
        offset: u32,
    ) -> Result<EntryRecord<'a>, BuildError> {
        let name = if name.is_empty() {
            DEFAULT_ENTRY_NAME
        } else {
            name
        };

        let name_len = u16::try_from(name.len()).map_err(|_| BuildError::NameTooLong {
            len: name.len(),
        })?;
        let size = u32::try_from(data.len()).map_err(|_| BuildError::EntryTooLarge {
            name: name.to_string(),
            len: data.len(),
        })?;

        Ok(EntryRecord {
            header: LocalFileHeader::stored(modified, crc32(data), size, name_len),
            name,
            data,
            offset,
        })
    }

    /// Bytes this entry occupies in the local section.
    #[inline]
    pub(crate) fn local_len(&self) -> u64 {
        (LOCAL_HEADER_SIZE + self.name.len() + self.data.len()) as u64
    }

    /// Bytes this entry occupies in the central directory.
    #[inline]
    pub(crate) fn central_len(&self) -> u64 {
        (CENTRAL_HEADER_SIZE + self.name.len()) as u64
    }

    pub(crate) fn write_local<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.header.write(writer)?;
        writer.write_all(self.name.as_bytes())?;
        writer.write_all(self.data)
    }

    pub(crate) fn write_central<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        CentralDirectoryHeader {
            local: self.header.clone(),
            local_header_offset: self.offset,
        }
        .write(writer)?;
        writer.write_all(self.name.as_bytes())
    }
}
