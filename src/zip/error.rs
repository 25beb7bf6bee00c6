use thiserror::Error;

/// Errors raised while reading ZIP structures or entry data.
#[derive(Debug, Error)]
pub enum ZipError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a valid ZIP file")]
    NotAZip,

    #[error("Malformed archive: {0}")]
    Malformed(&'static str),

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error("Encrypted entries are not supported")]
    Encrypted,

    #[error("Decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("CRC-32 mismatch: expected {expected:08x}, got {actual:08x}")]
    CrcMismatch { expected: u32, actual: u32 },

    #[error("Size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("Entry of {size} bytes exceeds the {limit} byte limit")]
    EntryTooLarge { size: u64, limit: u64 },
}

pub type Result<T> = std::result::Result<T, ZipError>;
