//! NuGet package inspection.
//!
//! ## Pipeline
//!
//! ```text
//! archive entries ──► classify ──► manifest ──► PackageMetadata
//!        │                 ├─────► icon / readme / license / .mcp/server.json
//!        └──► FileEntry list ────► tree ──────► nested FileEntry
//! ```
//!
//! - [`classify`]: name heuristics for the special files
//! - [`manifest`]: `.nuspec` XML to [`PackageMetadata`]
//! - [`tree`]: flat archive paths to a directory hierarchy
//! - [`inspector`]: drives one pass over the archive

pub mod classify;
pub mod inspector;
pub mod manifest;
pub mod mime;
pub mod model;
pub mod tree;

pub use classify::{EntryKind, classify};
pub use inspector::{
    PackageInspector, get_file_content, get_file_content_cancellable, get_file_content_with,
    parse_package, parse_package_bytes, parse_package_cancellable, parse_package_with,
};
pub use manifest::{ManifestError, parse_manifest};
pub use mime::{DEFAULT_MIME_TYPE, mime_type_for};
pub use model::{
    Dependency, FileContent, FileEntry, LicenseType, PackageContent, PackageMetadata, PackageType,
};
pub use tree::build_tree;
