/// Reasons an archive cannot be represented in the classic (non-ZIP64) layout.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("too many entries for a classic zip archive: {count} (limit 65535)")]
    TooManyEntries { count: usize },

    #[error("entry `{name}` is too large: {len} bytes (limit 4 GiB)")]
    EntryTooLarge { name: String, len: usize },

    #[error("entry name is too long: {len} bytes (limit 65535)")]
    NameTooLong { len: usize },

    #[error("archive exceeds 4 GiB at entry `{name}`")]
    ArchiveTooLarge { name: String },

    #[error("cannot write archive")]
    Io(#[from] std::io::Error),
}
