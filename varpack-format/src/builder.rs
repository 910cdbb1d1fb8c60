//! Single-pass writer for store-only ZIP archives.
//!
//! The builder performs no I/O of its own: it takes an ordered list of
//! `(name, bytes)` pairs and returns the complete archive as one buffer.
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │ local header │ name │ data   (×N)  │
//! ├────────────────────────────────────┤
//! │ central header │ name        (×N)  │
//! ├────────────────────────────────────┤
//! │ end of central directory           │
//! └────────────────────────────────────┘
//! ```

use crate::error::BuildError;
use crate::header::{EndOfCentralDirectory, END_OF_CENTRAL_DIRECTORY_SIZE};
use crate::record::EntryRecord;
use crate::ser::Serialize;
use crate::time::DosDateTime;

/// MIME type reported when handing an archive to a save action.
pub const MIME_TYPE: &str = "application/zip";

/// Builds classic store-only ZIP archives.
///
/// Every entry of one build shares the same modification timestamp, taken
/// when the builder is created.
#[derive(Debug, Clone, Copy)]
pub struct ZipBuilder {
    modified: DosDateTime,
}

impl Default for ZipBuilder {
    fn default() -> Self {
        ZipBuilder::new()
    }
}

impl ZipBuilder {
    /// Create a builder stamped with the current local time.
    pub fn new() -> Self {
        ZipBuilder::with_timestamp(DosDateTime::now())
    }

    /// Create a builder with a fixed timestamp. Output is then a pure
    /// function of the entries.
    pub fn with_timestamp(modified: DosDateTime) -> Self {
        ZipBuilder { modified }
    }

    pub fn modified(&self) -> DosDateTime {
        self.modified
    }

    /// Lay out `entries` in order and return the finished archive.
    pub fn build<I, N, D>(&self, entries: I) -> Result<Vec<u8>, BuildError>
    where
        I: IntoIterator<Item = (N, D)>,
        N: AsRef<str>,
        D: AsRef<[u8]>,
    {
        let entries: Vec<(N, D)> = entries.into_iter().collect();
        let count = u16::try_from(entries.len()).map_err(|_| BuildError::TooManyEntries {
            count: entries.len(),
        })?;

        let mut records = Vec::with_capacity(entries.len());
        let mut offset = 0u64;
        for (name, data) in entries.iter() {
            let local_offset = u32::try_from(offset).map_err(|_| BuildError::ArchiveTooLarge {
                name: name.as_ref().to_string(),
            })?;
            let record =
                EntryRecord::new(name.as_ref(), data.as_ref(), self.modified, local_offset)?;
            offset += record.local_len();
            records.push(record);
        }

        let directory_offset = offset;
        let directory_size: u64 = records.iter().map(EntryRecord::central_len).sum();
        let total = directory_offset + directory_size + END_OF_CENTRAL_DIRECTORY_SIZE as u64;

        let overflow = || BuildError::ArchiveTooLarge {
            name: records
                .last()
                .map(|r| r.name.to_string())
                .unwrap_or_default(),
        };
        let end = EndOfCentralDirectory {
            entries: count,
            directory_size: u32::try_from(directory_size).map_err(|_| overflow())?,
            directory_offset: u32::try_from(directory_offset).map_err(|_| overflow())?,
        };

        let mut out = Vec::with_capacity(total as usize);
        for record in records.iter() {
            record.write_local(&mut out)?;
        }
        for record in records.iter() {
            record.write_central(&mut out)?;
        }
        end.write(&mut out)?;

        tracing::debug!(
            entries = records.len(),
            bytes = out.len(),
            directory_offset,
            "Built zip archive"
        );
        debug_assert_eq!(out.len() as u64, total);

        Ok(out)
    }
}

/// Build an archive stamped with the current local time.
pub fn build<I, N, D>(entries: I) -> Result<Vec<u8>, BuildError>
where
    I: IntoIterator<Item = (N, D)>,
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    ZipBuilder::new().build(entries)
}
