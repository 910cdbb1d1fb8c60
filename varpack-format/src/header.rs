use crate::time::DosDateTime;

pub(crate) const LOCAL_FILE_SIGNATURE: u32 = 0x0403_4b50;
pub(crate) const CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0201_4b50;
pub(crate) const END_OF_CENTRAL_DIRECTORY_SIGNATURE: u32 = 0x0605_4b50;

/// ZIP 2.0: the minimum for plain stored entries.
pub(crate) const VERSION: u16 = 20;

/// Method 0, no compression.
pub(crate) const METHOD_STORED: u16 = 0;

/// Fixed part of a local file header, before the name.
pub const LOCAL_HEADER_SIZE: usize = 30;
/// Fixed part of a central directory header, before the name.
pub const CENTRAL_HEADER_SIZE: usize = 46;
/// End of central directory record without a comment.
pub const END_OF_CENTRAL_DIRECTORY_SIZE: usize = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalFileHeader {
    pub(crate) modified: DosDateTime,
    pub(crate) crc32: u32,
    pub(crate) size: u32,
    pub(crate) name_len: u16,
}

impl LocalFileHeader {
    pub(crate) fn stored(modified: DosDateTime, crc32: u32, size: u32, name_len: u16) -> Self {
        LocalFileHeader {
            modified,
            crc32,
            size,
            name_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CentralDirectoryHeader {
    pub(crate) local: LocalFileHeader,
    /// Offset of the matching local header from the start of the stream.
    pub(crate) local_header_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EndOfCentralDirectory {
    pub(crate) entries: u16,
    pub(crate) directory_size: u32,
    pub(crate) directory_offset: u32,
}
