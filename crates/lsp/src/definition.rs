//! Cross-document `taskRef` / `pipelineRef` resolution.

use std::sync::Arc;

use tekton_core::schema::{KIND_PIPELINE, KIND_TASK};
use tekton_core::{Document, Node, Position, Range};

use crate::cache::DocumentCache;

/// A reference to another resource by kind and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: String,
    pub name: String,
}

/// Where a referenced resource is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub uri: String,
    pub range: Range,
}

/// The first `taskRef` or `pipelineRef` on the path from `node` down to `pos`.
///
/// A ref without a `name` yields nothing and the walk continues below it.
pub fn find_reference(node: &Node, pos: Position) -> Option<Reference> {
    if !node.range.contains(pos) {
        return None;
    }

    if let Some(children) = node.as_mapping() {
        for (key, child) in children {
            if !child.range.contains(pos) {
                continue;
            }
            let name = || child.get("name").and_then(Node::as_scalar).map(str::to_string);
            match key.as_str() {
                "taskRef" => {
                    if let Some(name) = name() {
                        let kind = child
                            .get("kind")
                            .and_then(Node::as_scalar)
                            .filter(|k| !k.is_empty())
                            .unwrap_or(KIND_TASK);
                        return Some(Reference {
                            kind: kind.to_string(),
                            name,
                        });
                    }
                }
                "pipelineRef" => {
                    if let Some(name) = name() {
                        return Some(Reference {
                            kind: KIND_PIPELINE.to_string(),
                            name,
                        });
                    }
                }
                _ => {}
            }
            if let Some(found) = find_reference(child, pos) {
                return Some(found);
            }
        }
    }

    node.as_sequence()
        .iter()
        .find_map(|item| find_reference(item, pos))
}

/// Resolve the reference at `pos` against a snapshot of parsed documents.
///
/// The first document whose kind and `metadata.name` match wins; snapshot
/// order decides between resources sharing a name.
pub fn resolve(doc: &Document, pos: Position, documents: &[Arc<Document>]) -> Option<Location> {
    let reference = find_reference(&doc.root, pos)?;
    documents
        .iter()
        .find(|candidate| {
            candidate.kind == reference.kind
                && candidate.metadata_name() == Some(reference.name.as_str())
        })
        .map(|target| Location {
            uri: target.uri.clone(),
            range: target.root.range,
        })
}

/// Resolve against everything currently in the cache.
pub fn goto_definition(doc: &Document, pos: Position, cache: &DocumentCache) -> Option<Location> {
    resolve(doc, pos, &cache.all_parsed())
}
