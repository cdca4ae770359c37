use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while enumerating directories and archives.
///
/// None of these escape the public listing operations: archive-structure
/// failures collapse that archive to an empty tree, everything else is
/// scoped to the single entry or node it affects.
#[derive(Debug, Error)]
pub enum PeekError {
    /// Missing or invalid end-of-central-directory record or header signature.
    #[error("invalid archive: {0}")]
    ArchiveFormat(String),

    /// A header or payload read came up short of the bytes it needed.
    #[error("truncated read at offset {offset}: wanted {wanted} bytes, got {got}")]
    TruncatedRead { offset: u64, wanted: usize, got: usize },

    /// Unsupported method, size cap exceeded, or inflate produced the wrong byte count.
    #[error("decompression failed: {0}")]
    Decompression(String),

    /// Permission denied or an entry vanished mid-walk.
    #[error("cannot access '{}': {source}", path.display())]
    FilesystemAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Packed MS-DOS date/time fields do not form a valid calendar timestamp.
    #[error("invalid MS-DOS timestamp (date {date:#06x}, time {time:#06x})")]
    DateDecode { date: u16, time: u16 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PeekError {
    pub(crate) fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PeekError::FilesystemAccess {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = PeekError> = std::result::Result<T, E>;
