//! Error types for patch application.

use std::io;
use thiserror::Error;

/// Result type alias for patch operations
pub type Result<T> = std::result::Result<T, PatchError>;

/// Everything that can abort an `apply` call.
///
/// None of these are recoverable: the target sink may already hold a partial
/// result and must be discarded by the caller.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The header named a checksum algorithm this crate does not know
    #[error("Unsupported checksum algorithm: {0:?}")]
    UnsupportedChecksumAlgorithm(String),

    /// Declared block size is not in `1..=MAX_BLOCK_SIZE`
    #[error("Invalid block size: {0}")]
    InvalidBlockSize(i32),

    /// Opcode byte outside the recognised table
    #[error("Unknown op: {0:#04x}")]
    UnknownOp(u8),

    /// Block number is negative or its byte range does not fit in an offset
    #[error("No such block: {0}")]
    NoSuchBlock(i32),

    /// Literal record length is not in `1..=block_size`
    #[error("Invalid data block length: {0}")]
    InvalidDataBlockLength(i32),

    /// The patch stream ended in the middle of a field or record
    #[error("Unexpected end of patch stream")]
    UnexpectedEndOfStream,

    /// Trailing digest does not match the digest computed over the stream
    #[error("Checksum mismatch: patch says {}, computed {}", hex::encode(.expected), hex::encode(.actual))]
    ChecksumMismatch {
        /// Digest stored in the patch trailer
        expected: Vec<u8>,
        /// Digest computed while reading
        actual: Vec<u8>,
    },

    /// The block source could not deliver the requested base-data range
    #[error("Block source failed for {length} bytes at offset {offset}: {source}")]
    BlockSourceFailure {
        /// Byte offset into the base data
        offset: u64,
        /// Requested length
        length: usize,
        /// Underlying failure
        #[source]
        source: io::Error,
    },

    /// Read error on the patch stream or write error on the target
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PatchError {
    /// Map a read failure on the patch stream, folding short reads into
    /// `UnexpectedEndOfStream`.
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            PatchError::UnexpectedEndOfStream
        } else {
            PatchError::Io(err)
        }
    }
}
