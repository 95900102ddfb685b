//! Hand-rolled extension-to-MIME inference for file and directory resource
//! backings. No `mime_guess`-style crate appears anywhere in the reference
//! corpus, so this stays a small match table rather than a new dependency.

use std::path::Path;

/// How a resource's content should be carried on the wire: as the `text`
/// field of a `ResourceContent::Text`, or base64-encoded in `blob`. Audio
/// has no dedicated wire variant (there is no `ResourceContent::Audio`), so
/// it always falls back to `Blob`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentClass {
    Text,
    Audio,
    Blob,
}

/// Classify a MIME type for wire shaping purposes.
pub fn classify(mime_type: &str) -> ContentClass {
    let mime_type = mime_type.split(';').next().unwrap_or(mime_type).trim();
    if mime_type.starts_with("audio/") {
        ContentClass::Audio
    } else if mime_type.starts_with("text/")
        || mime_type == "application/json"
        || mime_type == "application/xml"
        || mime_type == "application/javascript"
        || mime_type.ends_with("+json")
        || mime_type.ends_with("+xml")
    {
        ContentClass::Text
    } else {
        ContentClass::Blob
    }
}

/// Infer a MIME type from a file extension. Returns `None` for unknown or
/// absent extensions, letting the caller fall back to
/// `application/octet-stream`.
pub fn infer_from_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "txt" | "log" | "md" | "markdown" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "js" | "mjs" => "application/javascript",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "zip" => "application/zip",
        "tar" => "application/x-tar",
        "gz" => "application/gzip",
        "wasm" => "application/wasm",
        "rs" => "text/x-rust",
        "py" => "text/x-python",
        _ => return None,
    };
    Some(mime.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_mime_groups() {
        assert_eq!(classify("text/plain"), ContentClass::Text);
        assert_eq!(classify("application/json"), ContentClass::Text);
        assert_eq!(classify("audio/mpeg"), ContentClass::Audio);
        assert_eq!(classify("image/png"), ContentClass::Blob);
        assert_eq!(classify("application/octet-stream"), ContentClass::Blob);
    }

    #[test]
    fn infers_common_extensions() {
        assert_eq!(
            infer_from_path(Path::new("notes.md")),
            Some("text/plain".to_string())
        );
        assert_eq!(
            infer_from_path(Path::new("data.json")),
            Some("application/json".to_string())
        );
        assert_eq!(infer_from_path(Path::new("no_ext")), None);
    }
}
