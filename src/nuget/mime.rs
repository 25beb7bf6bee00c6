/// Fallback for extensions with no mapping.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Guess a MIME type from a path's extension (case-insensitive).
pub fn mime_type_for(path: &str) -> &'static str {
    let base = path.rsplit('/').next().unwrap_or(path);
    let Some((_, extension)) = base.rsplit_once('.') else {
        return DEFAULT_MIME_TYPE;
    };

    match extension.to_ascii_lowercase().as_str() {
        "txt" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "xml" => "application/xml",
        "yml" | "yaml" => "text/yaml",
        "cs" => "text/x-csharp",
        "js" => "text/javascript",
        "ts" => "text/typescript",
        "html" => "text/html",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "svg" => "image/svg+xml",
        _ => DEFAULT_MIME_TYPE,
    }
}
