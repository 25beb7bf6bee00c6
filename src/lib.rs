//! # nupeek
//!
//! Inspect NuGet packages (`.nupkg`) without extracting them.
//!
//! A package is a ZIP archive holding a `.nuspec` manifest, binaries and
//! documentation. This library reads the archive in place and produces a
//! [`PackageContent`]: typed manifest metadata, the file tree, and the
//! contents of the files a viewer usually wants to show (icon, readme,
//! license and MCP server descriptor).
//!
//! ## Features
//!
//! - Single pass over the ZIP Central Directory; only special files are decompressed
//! - Support for ZIP64 archives and STORED/DEFLATE entries, with CRC-32 checks
//! - Namespace-tolerant `.nuspec` decoding, including grouped dependencies
//! - On-demand extraction of any single entry with a guessed MIME type
//! - Cancellation through [`tokio_util::sync::CancellationToken`]
//!
//! ## Example
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let package = nupeek::parse_package("Newtonsoft.Json.13.0.3.nupkg").await?;
//!     println!("{} {}", package.metadata.id, package.metadata.version);
//!
//!     for dependency in &package.metadata.dependencies {
//!         println!("  depends on {}", dependency.id);
//!     }
//!
//!     let readme = nupeek::get_file_content("Newtonsoft.Json.13.0.3.nupkg", "README.md").await?;
//!     println!("{} ({} bytes)", readme.mime_type, readme.content.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod nuget;
pub mod zip;

pub use cli::Cli;
pub use config::InspectOptions;
pub use error::{Error, Result};
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use nuget::{
    Dependency, FileContent, FileEntry, LicenseType, PackageContent, PackageInspector,
    PackageMetadata, PackageType, get_file_content, get_file_content_cancellable,
    get_file_content_with, parse_package, parse_package_bytes, parse_package_cancellable,
    parse_package_with,
};
pub use crate::zip::{ZipArchive, ZipError, ZipFileEntry};
