//! Error type shared by the codec, server and client.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T, E = TransferError> = std::result::Result<T, E>;

/// Everything that can go wrong while moving frames between peers.
#[derive(Debug, Error)]
pub enum TransferError {
    /// The client could not reach the server.
    #[error("cannot connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// Source file for a single-shot send does not exist.
    #[error("source file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Batch send was pointed at something that is not a directory.
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The peer closed the stream before a header or payload was complete.
    #[error("peer closed early: expected {expected} bytes, received {received}")]
    ShortRead { expected: u64, received: u64 },

    /// Declared name length is above the configured bound.
    #[error("file name length {len} exceeds limit of {max} bytes")]
    NameTooLong { len: u64, max: u32 },

    #[error("file name is not valid UTF-8")]
    InvalidName,

    /// Received name would land outside the destination directory.
    #[error("unsafe file name {name:?}: {reason}")]
    UnsafePath { name: String, reason: String },

    /// Declared payload is above the configured bound.
    #[error("payload of {size} bytes exceeds limit of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Opening, reading or writing a local file failed.
    #[error("file I/O error on {}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Socket-level failure.
    #[error("socket I/O error: {0}")]
    Io(#[source] io::Error),

    /// Cooperative shutdown interrupted the session.
    #[error("shutdown requested")]
    ShutdownRequested,
}

/// Marker carried inside an `io::Error` by readers that gave up because a
/// shutdown was requested. Converted back to `ShutdownRequested`.
#[derive(Debug)]
pub(crate) struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("shutdown requested")
    }
}

impl std::error::Error for Cancelled {}

impl Cancelled {
    pub(crate) fn io_error() -> io::Error {
        io::Error::new(io::ErrorKind::Other, Cancelled)
    }
}

impl From<io::Error> for TransferError {
    fn from(e: io::Error) -> Self {
        if e.get_ref().map_or(false, |inner| inner.is::<Cancelled>()) {
            return TransferError::ShutdownRequested;
        }
        TransferError::Io(e)
    }
}

impl TransferError {
    pub(crate) fn file_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        TransferError::FileIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsafe_path(name: &str, reason: impl Into<String>) -> Self {
        TransferError::UnsafePath {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// True for errors caused by the peer hanging up mid-frame.
    pub fn is_short_read(&self) -> bool {
        matches!(self, TransferError::ShortRead { .. })
    }
}
