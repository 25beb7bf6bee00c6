//! ZIP archive reading.
//!
//! A `.nupkg` is an ordinary ZIP container, so this module is the
//! package reader's only view of the bytes on disk.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, file headers, etc.)
//! - [`parser`]: Low-level parsing of ZIP structures and the lazy [`Entries`] cursor
//! - [`archive`]: [`ZipArchive`], which decompresses individual entries on request
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first, then the Central Directory. Entries are then
//! visited one at a time and the caller decides, per entry, whether to
//! read its data or move on.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - ZIP64 extensions for files > 4GB
//! - STORED and DEFLATE compression methods
//! - CRC-32 verification of decompressed data
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

pub mod archive;
mod error;
pub mod parser;
pub mod structures;

pub use archive::{DEFAULT_MAX_ENTRY_SIZE, ZipArchive};
pub use error::{Result, ZipError};
pub use parser::{Entries, ZipParser};
pub use structures::*;
