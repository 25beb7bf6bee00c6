//! Error taxonomy for package inspection.

use thiserror::Error;

use crate::nuget::ManifestError;
use crate::zip::ZipError;

/// Errors surfaced by [`parse_package`](crate::parse_package) and
/// [`get_file_content`](crate::get_file_content).
///
/// Every variant that concerns an archive names it, so callers can log
/// failures without threading the path through separately.
#[derive(Debug, Error)]
pub enum Error {
    /// The source is unreadable or not a valid ZIP archive.
    #[error("cannot open package {archive}: {source}")]
    ArchiveOpen {
        archive: String,
        #[source]
        source: ZipError,
    },

    /// One entry's data could not be read or decompressed.
    #[error("cannot read '{entry}' in {archive}: {source}")]
    Stream {
        archive: String,
        entry: String,
        #[source]
        source: ZipError,
    },

    /// The manifest is not well-formed or lacks `<package><metadata>`.
    #[error("invalid package manifest: {0}")]
    ManifestDecode(#[from] ManifestError),

    /// No manifest was found, or none could be decoded.
    #[error("no manifest found or manifest failed to decode in {archive}")]
    MissingMetadata { archive: String },

    /// The requested entry path does not exist in the archive.
    #[error("file '{entry}' not found in {archive}")]
    FileNotFound { archive: String, entry: String },

    /// The caller cancelled the operation before it finished.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
