//! Cursor context classification.
//!
//! Decides which field vocabulary applies at a position. An exact walk over
//! the node ranges runs first; when it finds nothing (blank lines are not
//! covered by any node) the nearest key above the cursor decides.

use tekton_core::schema::{self, KIND_PIPELINE};
use tekton_core::{Document, Node, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Unknown,
    Metadata,
    PipelineSpec,
    TaskSpec,
    PipelineTaskItem,
    StepItem,
}

/// Classify the cursor position. Non-Tekton documents are always `Unknown`.
pub fn classify(doc: &Document, pos: Position) -> Context {
    if !doc.is_tekton_resource() {
        return Context::Unknown;
    }

    match walk(&doc.root, pos, &doc.kind) {
        Context::Unknown => nearest_key(&doc.root, pos, &doc.kind),
        ctx => ctx,
    }
}

fn spec_context(kind: &str) -> Context {
    if kind == KIND_PIPELINE {
        Context::PipelineSpec
    } else if schema::is_task_kind(kind) {
        Context::TaskSpec
    } else {
        Context::Unknown
    }
}

fn list_context(key: &str) -> Context {
    match key {
        "tasks" | "finally" => Context::PipelineTaskItem,
        "steps" => Context::StepItem,
        _ => Context::Unknown,
    }
}

fn walk(node: &Node, pos: Position, kind: &str) -> Context {
    if !node.range.contains(pos) {
        return Context::Unknown;
    }

    if let Some(children) = node.as_mapping() {
        for (key, child) in children {
            if !child.range.contains(pos) {
                continue;
            }
            match key.as_str() {
                "metadata" => return Context::Metadata,
                "spec" => {
                    let ctx = match spec_list_at(child, pos) {
                        Context::Unknown => spec_context(kind),
                        ctx => ctx,
                    };
                    if ctx != Context::Unknown {
                        return ctx;
                    }
                }
                "tasks" | "finally" | "steps" => return list_context(key),
                _ => {}
            }
            let deeper = walk(child, pos, kind);
            if deeper != Context::Unknown {
                return deeper;
            }
        }
    }

    for item in node.as_sequence() {
        let deeper = walk(item, pos, kind);
        if deeper != Context::Unknown {
            return deeper;
        }
    }

    Context::Unknown
}

/// The list context of the `spec` child containing `pos`, one level down.
fn spec_list_at(spec: &Node, pos: Position) -> Context {
    spec.as_mapping()
        .into_iter()
        .flatten()
        .filter(|(_, child)| child.range.contains(pos))
        .map(|(key, _)| list_context(key))
        .find(|ctx| *ctx != Context::Unknown)
        .unwrap_or(Context::Unknown)
}

fn nearest_key(node: &Node, pos: Position, kind: &str) -> Context {
    let Some(children) = node.as_mapping() else {
        return Context::Unknown;
    };

    // Later-declared keys win ties on the same start line.
    let best = children
        .iter()
        .enumerate()
        .filter(|(_, (_, child))| child.range.start.line <= pos.line)
        .max_by_key(|(index, (_, child))| (child.range.start.line, *index))
        .map(|(_, entry)| entry);

    let Some((key, child)) = best else {
        return Context::Unknown;
    };

    match key.as_str() {
        "metadata" => Context::Metadata,
        "spec" => match nearest_key(child, pos, kind) {
            Context::Unknown => spec_context(kind),
            ctx => ctx,
        },
        other => list_context(other),
    }
}
