//! Store-only ZIP archive writer.
//!
//! Archives are produced in one call from an ordered list of named blobs,
//! without compression and without ZIP64 extensions.

mod builder;
mod checksum;
mod error;
mod header;
mod record;
mod ser;
mod time;

pub use builder::{build, ZipBuilder, MIME_TYPE};
pub use checksum::{crc32, Crc32, POLYNOMIAL};
pub use error::BuildError;
pub use header::{CENTRAL_HEADER_SIZE, END_OF_CENTRAL_DIRECTORY_SIZE, LOCAL_HEADER_SIZE};
pub use record::DEFAULT_ENTRY_NAME;
pub use time::{DosDateTime, DOS_EPOCH_YEAR, DOS_MAX_YEAR};
