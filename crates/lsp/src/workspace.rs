//! Workspace indexing and `file://` URI helpers.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::cache::DocumentCache;

/// Index every `.yaml` / `.yml` file under the workspace root URI.
pub fn scan_uri(root_uri: &str, cache: &DocumentCache) -> usize {
    scan(&uri_to_path(root_uri), cache)
}

/// Index every `.yaml` / `.yml` file under `root`, skipping hidden
/// directories. Unreadable entries are skipped, and documents already in
/// the cache (open in the editor) are left alone. Returns the number of
/// files inserted into the cache.
pub fn scan(root: &Path, cache: &DocumentCache) -> usize {
    let mut count = 0;

    for path in yaml_files(root) {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %path.display(), %err, "skipping unreadable file");
                continue;
            }
        };
        if cache.insert_if_absent(&path_to_uri(&path), "yaml", 0, content) {
            count += 1;
        }
    }

    info!(root = %root.display(), count, "indexed workspace");
    count
}

/// Every `.yaml` / `.yml` file under `root` outside hidden directories.
/// A `root` that is itself a file is yielded when it has a YAML extension.
pub fn yaml_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_yaml(e.path()))
        .map(DirEntry::into_path)
}

fn is_hidden_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Convert a `file://` URI to a file system path, percent-decoding it.
/// Anything without the scheme is taken as a path already.
pub fn uri_to_path(uri: &str) -> PathBuf {
    match uri.strip_prefix("file://") {
        Some(path) => {
            let decoded = percent_decode(path);
            #[cfg(windows)]
            {
                let decoded = decoded.strip_prefix('/').unwrap_or(&decoded);
                PathBuf::from(decoded)
            }
            #[cfg(not(windows))]
            {
                PathBuf::from(decoded)
            }
        }
        None => PathBuf::from(uri),
    }
}

/// Convert a path to a `file://` URI, percent-encoding bytes outside the
/// unreserved set.
pub fn path_to_uri(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    let mut uri = String::from("file://");
    if !raw.starts_with('/') {
        uri.push('/');
    }
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' | b':' => {
                uri.push(b as char)
            }
            _ => uri.push_str(&format!("%{:02X}", b)),
        }
    }
    uri
}

/// Decode percent-encoded bytes in a URI path (e.g. `%3A` -> `:`).
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(h), Some(l)) = (hex_val(bytes[i + 1]), hex_val(bytes[i + 2])) {
                out.push(h << 4 | l);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_val(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
