//! Package scanning: one pass over the archive, classifying as it goes.
//!
//! [`PackageInspector`] owns its archive source for the duration of a
//! call. The free functions open a fresh handle per call, so concurrent
//! inspections of the same file never share state.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::InspectOptions;
use crate::error::{Error, Result};
use crate::io::{LocalFileReader, MemoryReader, ReadAt};
use crate::zip::{ZipArchive, ZipError, ZipFileEntry};

use super::classify::{EntryKind, classify};
use super::manifest::parse_manifest;
use super::mime::mime_type_for;
use super::model::{FileContent, FileEntry, PackageContent, PackageMetadata};
use super::tree::build_tree;

/// Reads one package archive.
pub struct PackageInspector<R: ReadAt> {
    archive: ZipArchive<R>,
    label: String,
    cancel: CancellationToken,
}

impl PackageInspector<LocalFileReader> {
    /// Open a `.nupkg` on the local filesystem.
    pub fn open(path: &Path, options: InspectOptions) -> Result<Self> {
        let label = path.display().to_string();
        let reader = LocalFileReader::new(path).map_err(|e| Error::ArchiveOpen {
            archive: label.clone(),
            source: ZipError::Io(e),
        })?;
        Ok(Self::new(Arc::new(reader), label, options))
    }
}

impl<R: ReadAt> PackageInspector<R> {
    /// Wrap an arbitrary source; `label` names it in errors and logs.
    pub fn new(reader: Arc<R>, label: impl Into<String>, options: InspectOptions) -> Self {
        Self {
            archive: ZipArchive::new(reader).with_max_entry_size(options.max_entry_size),
            label: label.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Abort with [`Error::Cancelled`] once `cancel` fires.
    ///
    /// The token is checked before every entry and after every read, so a
    /// scan stops at the next entry boundary even when reads never yield.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Scan every entry and assemble the package view.
    ///
    /// Fails with [`Error::MissingMetadata`] when no manifest decodes;
    /// a manifest that fails to decode is logged and skipped.
    pub async fn parse(&self) -> Result<PackageContent> {
        self.checkpoint()?;
        let entries = self
            .archive
            .entries()
            .await
            .map_err(|source| self.open_error(source))?;

        let mut scan = Scan::default();
        for entry in entries {
            self.checkpoint()?;
            let entry = entry.map_err(|source| self.open_error(source))?;
            scan.files.push(FileEntry::from_archive_path(
                &entry.file_name,
                entry.uncompressed_size,
            ));

            let Some(kind) = classify(&entry.file_name) else {
                continue;
            };
            if scan.is_captured(kind) {
                debug!(archive = %self.label, entry = %entry.file_name, ?kind, "Skipping duplicate");
                continue;
            }

            let data = self.read(&entry).await?;
            debug!(archive = %self.label, entry = %entry.file_name, ?kind, bytes = data.len(), "Captured");
            scan.capture(kind, entry.file_name, data, &self.label);
        }

        let Some(metadata) = scan.metadata else {
            return Err(Error::MissingMetadata {
                archive: self.label.clone(),
            });
        };

        info!(
            archive = %self.label,
            id = %metadata.id,
            version = %metadata.version,
            entries = scan.files.len(),
            "Parsed package"
        );

        let (readme_path, readme_content) = scan.readme.unzip();
        let (license_path, license_content) = scan.license.unzip();
        let (mcp_server_path, mcp_server_content) = scan.mcp_server.unzip();

        Ok(PackageContent {
            metadata,
            files: build_tree(scan.files),
            nuspec_content: scan.nuspec_content,
            icon_data: scan.icon_data,
            readme_content,
            readme_path,
            license_content,
            license_path,
            mcp_server_content,
            mcp_server_path,
        })
    }

    /// Fetch the bytes of the entry whose path equals `entry_path` exactly.
    ///
    /// Only the matching entry is decompressed.
    pub async fn file_content(&self, entry_path: &str) -> Result<FileContent> {
        self.checkpoint()?;
        let entries = self
            .archive
            .entries()
            .await
            .map_err(|source| self.open_error(source))?;

        for entry in entries {
            self.checkpoint()?;
            let entry = entry.map_err(|source| self.open_error(source))?;
            if entry.file_name != entry_path {
                continue;
            }

            let content = self.read(&entry).await?;
            let mime_type = mime_type_for(&entry.file_name).to_string();
            debug!(archive = %self.label, entry = %entry.file_name, %mime_type, bytes = content.len(), "Read entry");
            return Ok(FileContent {
                path: entry.file_name,
                content,
                mime_type,
            });
        }

        Err(Error::FileNotFound {
            archive: self.label.clone(),
            entry: entry_path.to_string(),
        })
    }

    async fn read(&self, entry: &ZipFileEntry) -> Result<Vec<u8>> {
        let data = self
            .archive
            .read_entry(entry)
            .await
            .map_err(|source| Error::Stream {
                archive: self.label.clone(),
                entry: entry.file_name.clone(),
                source,
            })?;
        self.checkpoint()?;
        Ok(data)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!(archive = %self.label, "Cancelled");
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    fn open_error(&self, source: ZipError) -> Error {
        Error::ArchiveOpen {
            archive: self.label.clone(),
            source,
        }
    }
}

/// Accumulator owned by a single [`PackageInspector::parse`] call.
#[derive(Default)]
struct Scan {
    files: Vec<FileEntry>,
    metadata: Option<PackageMetadata>,
    nuspec_content: Option<String>,
    icon_data: Option<Vec<u8>>,
    readme: Option<(String, String)>,
    license: Option<(String, String)>,
    mcp_server: Option<(String, String)>,
}

impl Scan {
    /// First capture of each kind wins; a manifest counts only once it decodes.
    fn is_captured(&self, kind: EntryKind) -> bool {
        match kind {
            EntryKind::Manifest => self.metadata.is_some(),
            EntryKind::Icon => self.icon_data.is_some(),
            EntryKind::Readme => self.readme.is_some(),
            EntryKind::License => self.license.is_some(),
            EntryKind::McpServer => self.mcp_server.is_some(),
        }
    }

    fn capture(&mut self, kind: EntryKind, path: String, data: Vec<u8>, archive: &str) {
        match kind {
            EntryKind::Manifest => {
                let text = decode_text(&data);
                match parse_manifest(&text) {
                    Ok(metadata) => {
                        self.metadata = Some(metadata);
                        self.nuspec_content = Some(text);
                    }
                    Err(e) => {
                        let e = Error::from(e);
                        warn!(archive, entry = %path, error = %e, "Ignoring manifest");
                    }
                }
            }
            EntryKind::Icon => self.icon_data = Some(data),
            EntryKind::Readme => self.readme = Some((path, decode_text(&data))),
            EntryKind::License => self.license = Some((path, decode_text(&data))),
            EntryKind::McpServer => self.mcp_server = Some((path, decode_text(&data))),
        }
    }
}

fn decode_text(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

/// Parse a `.nupkg` file with default options.
pub async fn parse_package(path: impl AsRef<Path>) -> Result<PackageContent> {
    parse_package_with(path, InspectOptions::default()).await
}

pub async fn parse_package_with(
    path: impl AsRef<Path>,
    options: InspectOptions,
) -> Result<PackageContent> {
    PackageInspector::open(path.as_ref(), options)?.parse().await
}

/// Parse a package already held in memory.
pub async fn parse_package_bytes(bytes: impl Into<Vec<u8>>) -> Result<PackageContent> {
    let reader = Arc::new(MemoryReader::new(bytes));
    PackageInspector::new(reader, "<memory>", InspectOptions::default())
        .parse()
        .await
}

/// Fetch one entry's bytes from a `.nupkg` file with default options.
pub async fn get_file_content(
    path: impl AsRef<Path>,
    entry_path: &str,
) -> Result<FileContent> {
    get_file_content_with(path, entry_path, InspectOptions::default()).await
}

pub async fn get_file_content_with(
    path: impl AsRef<Path>,
    entry_path: &str,
    options: InspectOptions,
) -> Result<FileContent> {
    PackageInspector::open(path.as_ref(), options)?
        .file_content(entry_path)
        .await
}

/// [`parse_package_with`] that gives up with [`Error::Cancelled`] once
/// `cancel` fires. The archive is closed before this returns.
pub async fn parse_package_cancellable(
    path: impl AsRef<Path>,
    options: InspectOptions,
    cancel: &CancellationToken,
) -> Result<PackageContent> {
    let inspector =
        PackageInspector::open(path.as_ref(), options)?.with_cancellation(cancel.clone());
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = inspector.parse() => result,
    }
}

/// [`get_file_content_with`] that gives up with [`Error::Cancelled`] once
/// `cancel` fires.
pub async fn get_file_content_cancellable(
    path: impl AsRef<Path>,
    entry_path: &str,
    options: InspectOptions,
    cancel: &CancellationToken,
) -> Result<FileContent> {
    let inspector =
        PackageInspector::open(path.as_ref(), options)?.with_cancellation(cancel.clone());
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = inspector.file_content(entry_path) => result,
    }
}
