//! Name-based detection of the files a package viewer cares about.

const ICON_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "ico"];

const README_NAMES: &[&str] = &["readme", "readme.md", "readme.txt", "readme.rst"];

const LICENSE_NAMES: &[&str] = &[
    "license",
    "license.md",
    "license.txt",
    "license.rst",
    "licence",
    "licence.md",
    "licence.txt",
    "licence.rst",
    "copying",
    "copying.md",
    "copying.txt",
];

const MCP_SERVER_PATH: &str = ".mcp/server.json";

/// Special role of an archive entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Manifest,
    Icon,
    Readme,
    License,
    McpServer,
}

/// Classify an archive path; first matching rule wins.
///
/// Directories never classify. Returns `None` for ordinary files.
pub fn classify(path: &str) -> Option<EntryKind> {
    if path.ends_with('/') {
        return None;
    }

    let lower = path.to_ascii_lowercase();
    let base = lower.rsplit('/').next().unwrap_or(&lower);

    if lower.ends_with(".nuspec") {
        Some(EntryKind::Manifest)
    } else if is_icon(&lower, base) {
        Some(EntryKind::Icon)
    } else if README_NAMES.contains(&base) || base.starts_with("readme.") {
        Some(EntryKind::Readme)
    } else if LICENSE_NAMES.contains(&base)
        || base.starts_with("license.")
        || base.starts_with("licence.")
    {
        Some(EntryKind::License)
    } else if lower == MCP_SERVER_PATH {
        Some(EntryKind::McpServer)
    } else {
        None
    }
}

// Heuristic: any image whose path mentions "icon"
fn is_icon(lower_path: &str, base: &str) -> bool {
    let Some((_, extension)) = base.rsplit_once('.') else {
        return false;
    };
    ICON_EXTENSIONS.contains(&extension) && lower_path.contains("icon")
}
