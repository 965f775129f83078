//! URL helpers for the crawl engine
//!
//! Host extraction for the domain policy, document-extension matching for
//! the extractor, and safe filename derivation for the downloader.

use sha2::{Digest, Sha256};
use url::Url;

/// File extensions treated as downloadable documents
///
/// Applied to hyperlink targets only, never to embedded media tags.
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "zip", "rar", "7z", "tar", "gz",
    "epub",
];

/// Maximum length of a derived filename stem
const MAX_STEM_LEN: usize = 200;

/// Extracts the host from a URL, lowercased
pub fn extract_host(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_ascii_lowercase())
}

/// Returns true if the URL's path ends in a known document extension
pub fn is_document_url(url: &Url) -> bool {
    path_extension(url)
        .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Derives a filesystem-safe filename for a resource URL
///
/// Uses the last path segment when present; falls back to a truncated hash
/// of the full URL when the path yields nothing usable (e.g. `/` or empty).
/// Characters invalid on common filesystems are replaced with underscores
/// and overlong stems are truncated.
pub fn file_name_for(url: &Url) -> String {
    let raw = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("");

    let sanitized = sanitize_file_name(raw);

    if sanitized.is_empty() || sanitized == "_" {
        let mut hasher = Sha256::new();
        hasher.update(url.as_str().as_bytes());
        let digest = hex::encode(hasher.finalize());
        let ext = path_extension(url)
            .map(|e| format!(".{}", e))
            .unwrap_or_else(|| ".bin".to_string());
        return format!("{}{}", &digest[..16], ext);
    }

    truncate_stem(&sanitized)
}

/// Lowercased extension of the URL's path, if any
fn path_extension(url: &Url) -> Option<String> {
    let path = url.path();
    let segment = path.rsplit('/').next()?;
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            _ => c,
        })
        .collect()
}

fn truncate_stem(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let stem: String = stem.chars().take(MAX_STEM_LEN).collect();
            format!("{}.{}", stem, ext)
        }
        _ => name.chars().take(MAX_STEM_LEN).collect(),
    }
}
