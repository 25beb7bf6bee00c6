use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::sync::Arc;

use crate::io::ReadAt;

use super::error::{Result, ZipError};
use super::parser::{Entries, ZipParser};
use super::structures::{CompressionMethod, ZipFileEntry};

/// Default cap on a single buffered entry (256 MiB).
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 256 * 1024 * 1024;

/// Open ZIP archive over a random-access source.
///
/// The archive owns its source; dropping it releases the underlying handle.
pub struct ZipArchive<R: ReadAt> {
    parser: ZipParser<R>,
    max_entry_size: u64,
}

impl<R: ReadAt> ZipArchive<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }

    /// Refuse to buffer entries larger than `limit` bytes.
    pub fn with_max_entry_size(mut self, limit: u64) -> Self {
        self.max_entry_size = limit;
        self
    }

    /// Single-pass cursor over the archive's entries in Central Directory order.
    pub async fn entries(&self) -> Result<Entries> {
        self.parser.entries().await
    }

    /// Decompress one entry fully into memory.
    ///
    /// Supports STORED and DEFLATE. The result is checked against the
    /// Central Directory's uncompressed size and CRC-32.
    pub async fn read_entry(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        if entry.is_directory {
            return Ok(Vec::new());
        }
        if entry.is_encrypted() {
            return Err(ZipError::Encrypted);
        }

        let largest = entry.uncompressed_size.max(entry.compressed_size);
        if largest > self.max_entry_size {
            return Err(ZipError::EntryTooLarge {
                size: largest,
                limit: self.max_entry_size,
            });
        }

        let data_offset = self.parser.get_data_offset(entry).await?;
        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut raw)
            .await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => {
                let mut out = Vec::with_capacity(entry.uncompressed_size as usize);
                // One byte of slack so an over-long stream is detected
                // without inflating a bomb into memory
                DeflateDecoder::new(raw.as_slice())
                    .take(entry.uncompressed_size + 1)
                    .read_to_end(&mut out)
                    .map_err(ZipError::Decompress)?;
                out
            }
            CompressionMethod::Unknown(method) => {
                return Err(ZipError::UnsupportedCompression(method));
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ZipError::SizeMismatch {
                expected: entry.uncompressed_size,
                actual: data.len() as u64,
            });
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            return Err(ZipError::CrcMismatch {
                expected: entry.crc32,
                actual: crc.sum(),
            });
        }

        Ok(data)
    }
}
