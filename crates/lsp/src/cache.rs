//! Shared cache of open and indexed documents.
//!
//! One readers/writer lock guards the whole map. Writes parse the new text
//! while holding the write lock, so a reader never sees content and AST from
//! different edits.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tekton_core::Document;
use tracing::debug;

/// One cached document.
#[derive(Debug, Clone)]
pub struct Entry {
    pub uri: String,
    pub language_id: String,
    /// Editor-reported version number.
    pub version: i32,
    /// Latest raw text.
    pub content: String,
    parsed: Option<Arc<Document>>,
}

impl Entry {
    /// Parsed document, absent when the last write did not parse.
    pub fn parsed(&self) -> Option<&Arc<Document>> {
        self.parsed.as_ref()
    }
}

#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: RwLock<HashMap<String, Entry>>,
    reject_stale_versions: bool,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache that ignores writes older than the stored version.
    pub fn with_stale_version_guard() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            reject_stale_versions: true,
        }
    }

    /// Add or replace a document. Returns `false` when the write was
    /// rejected as stale.
    pub fn insert(&self, uri: &str, language_id: &str, version: i32, content: String) -> bool {
        let mut entries = self.entries.write();
        if self.is_stale(entries.get(uri), version) {
            debug!(uri, version, "ignoring stale insert");
            return false;
        }

        let parsed = parse(uri, &content);
        entries.insert(
            uri.to_string(),
            Entry {
                uri: uri.to_string(),
                language_id: language_id.to_string(),
                version,
                content,
                parsed,
            },
        );
        true
    }

    /// Add a document unless the URI is already cached. Returns `false` and
    /// leaves the existing entry untouched otherwise, so indexing from disk
    /// never replaces a buffer the editor has opened.
    pub fn insert_if_absent(
        &self,
        uri: &str,
        language_id: &str,
        version: i32,
        content: String,
    ) -> bool {
        let mut entries = self.entries.write();
        if entries.contains_key(uri) {
            debug!(uri, "already cached, keeping existing entry");
            return false;
        }

        let parsed = parse(uri, &content);
        entries.insert(
            uri.to_string(),
            Entry {
                uri: uri.to_string(),
                language_id: language_id.to_string(),
                version,
                content,
                parsed,
            },
        );
        true
    }

    /// Replace the content of an existing document. Returns `false` when the
    /// document is unknown or the write was rejected as stale.
    pub fn update(&self, uri: &str, version: i32, content: String) -> bool {
        let mut entries = self.entries.write();
        let reject_stale = self.reject_stale_versions;
        let Some(entry) = entries.get_mut(uri) else {
            debug!(uri, version, "update for unknown document");
            return false;
        };
        if reject_stale && version < entry.version {
            debug!(uri, version, current = entry.version, "ignoring stale update");
            return false;
        }

        entry.parsed = parse(uri, &content);
        entry.version = version;
        entry.content = content;
        true
    }

    pub fn remove(&self, uri: &str) {
        self.entries.write().remove(uri);
    }

    pub fn get(&self, uri: &str) -> Option<Entry> {
        self.entries.read().get(uri).cloned()
    }

    pub fn get_parsed(&self, uri: &str) -> Option<Arc<Document>> {
        self.entries.read().get(uri)?.parsed.clone()
    }

    /// Snapshot of every entry, in no particular order.
    pub fn all(&self) -> Vec<Entry> {
        self.entries.read().values().cloned().collect()
    }

    /// Snapshot of every parsed document, in no particular order.
    pub fn all_parsed(&self) -> Vec<Arc<Document>> {
        self.entries
            .read()
            .values()
            .filter_map(|e| e.parsed.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn is_stale(&self, existing: Option<&Entry>, version: i32) -> bool {
        self.reject_stale_versions && existing.is_some_and(|e| version < e.version)
    }
}

fn parse(uri: &str, content: &str) -> Option<Arc<Document>> {
    match tekton_core::build_document(uri, content) {
        Ok(doc) => Some(Arc::new(doc)),
        Err(err) => {
            debug!(uri, %err, "document did not parse");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TASK: &str = "apiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: t\n";
    const PIPELINE: &str = "apiVersion: tekton.dev/v1\nkind: Pipeline\nmetadata:\n  name: p\n";

    #[test]
    fn update_replaces_content_version_and_ast() {
        let cache = DocumentCache::new();
        assert!(cache.insert("file:///a.yaml", "yaml", 1, TASK.to_string()));
        assert!(cache.update("file:///a.yaml", 2, PIPELINE.to_string()));

        assert_eq!(cache.get_parsed("file:///a.yaml").unwrap().kind, "Pipeline");
        let entry = cache.get("file:///a.yaml").unwrap();
        assert_eq!(entry.version, 2);
        assert_eq!(entry.content, PIPELINE);
        assert_eq!(entry.language_id, "yaml");
    }

    #[test]
    fn update_before_insert_is_ignored() {
        let cache = DocumentCache::new();
        assert!(!cache.update("file:///a.yaml", 1, TASK.to_string()));
        assert!(cache.get("file:///a.yaml").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn unparseable_content_keeps_the_text() {
        let cache = DocumentCache::new();
        cache.insert("file:///a.yaml", "yaml", 1, TASK.to_string());
        cache.update("file:///a.yaml", 2, String::new());

        let entry = cache.get("file:///a.yaml").unwrap();
        assert_eq!(entry.version, 2);
        assert!(entry.parsed().is_none());
        assert!(cache.get_parsed("file:///a.yaml").is_none());
        assert!(cache.all_parsed().is_empty());
        assert_eq!(cache.all().len(), 1);
    }

    #[test]
    fn insert_if_absent_keeps_the_open_buffer() {
        let cache = DocumentCache::new();
        cache.insert("file:///a.yaml", "yaml", 3, PIPELINE.to_string());
        assert!(!cache.insert_if_absent("file:///a.yaml", "yaml", 0, TASK.to_string()));

        let entry = cache.get("file:///a.yaml").unwrap();
        assert_eq!(entry.version, 3);
        assert_eq!(entry.content, PIPELINE);

        assert!(cache.insert_if_absent("file:///b.yaml", "yaml", 0, TASK.to_string()));
        assert_eq!(cache.get_parsed("file:///b.yaml").unwrap().kind, "Task");
    }

    #[test]
    fn remove_forgets_the_document() {
        let cache = DocumentCache::new();
        cache.insert("file:///a.yaml", "yaml", 1, TASK.to_string());
        cache.remove("file:///a.yaml");
        assert!(cache.get("file:///a.yaml").is_none());
        assert!(cache.get_parsed("file:///a.yaml").is_none());
    }

    #[test]
    fn parsed_documents_remember_their_uri() {
        let cache = DocumentCache::new();
        cache.insert("file:///a.yaml", "yaml", 0, TASK.to_string());
        assert_eq!(cache.get_parsed("file:///a.yaml").unwrap().uri, "file:///a.yaml");
    }

    #[test]
    fn last_write_wins_without_the_guard() {
        let cache = DocumentCache::new();
        cache.insert("file:///a.yaml", "yaml", 5, TASK.to_string());
        assert!(cache.update("file:///a.yaml", 3, PIPELINE.to_string()));
        assert_eq!(cache.get("file:///a.yaml").unwrap().version, 3);
    }

    #[test]
    fn guard_rejects_older_versions() {
        let cache = DocumentCache::with_stale_version_guard();
        cache.insert("file:///a.yaml", "yaml", 5, TASK.to_string());
        assert!(!cache.update("file:///a.yaml", 3, PIPELINE.to_string()));
        assert!(!cache.insert("file:///a.yaml", "yaml", 4, PIPELINE.to_string()));
        assert!(cache.update("file:///a.yaml", 5, PIPELINE.to_string()));

        let entry = cache.get("file:///a.yaml").unwrap();
        assert_eq!(entry.version, 5);
        assert_eq!(cache.get_parsed("file:///a.yaml").unwrap().kind, "Pipeline");
    }

    #[test]
    fn snapshots_outlive_later_writes() {
        let cache = DocumentCache::new();
        cache.insert("file:///a.yaml", "yaml", 1, TASK.to_string());
        let snapshot = cache.all_parsed();
        cache.update("file:///a.yaml", 2, PIPELINE.to_string());
        assert_eq!(snapshot[0].kind, "Task");
        assert_eq!(cache.all_parsed()[0].kind, "Pipeline");
    }

    #[test]
    fn concurrent_writers_and_readers() {
        let cache = Arc::new(DocumentCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let uri = format!("file:///doc-{}.yaml", i);
                    cache.insert(&uri, "yaml", 0, TASK.to_string());
                    for v in 1..20 {
                        cache.update(&uri, v, PIPELINE.to_string());
                        let _ = cache.all_parsed();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
        assert!(cache.all().iter().all(|e| e.version == 19));
    }
}
