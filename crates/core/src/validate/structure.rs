//! Metadata and kind-specific structure rules.

use std::collections::HashSet;

use super::Diagnostic;
use crate::ast::{Document, Node};
use crate::schema;

pub(super) fn check_metadata(doc: &Document, diags: &mut Vec<Diagnostic>) {
    let Some(metadata) = doc.root.get("metadata") else {
        diags.push(Diagnostic::error(
            doc.root.range,
            "Required field 'metadata' is missing",
        ));
        return;
    };

    if metadata.get("name").is_none() {
        diags.push(Diagnostic::error(
            metadata.range,
            "Required field 'metadata.name' is missing",
        ));
    }
}

pub(super) fn check_pipeline(doc: &Document, diags: &mut Vec<Diagnostic>) {
    let Some(spec) = doc.spec() else {
        return;
    };

    check_unknown_fields(spec, schema::PIPELINE_SPEC_FIELDS, diags);

    match spec.get("tasks") {
        None => diags.push(Diagnostic::error(
            spec.range,
            "Required field 'tasks' is missing in Pipeline spec",
        )),
        Some(tasks) if !tasks.is_sequence() => diags.push(Diagnostic::error(
            tasks.range,
            "Field 'tasks' must be an array/sequence",
        )),
        Some(tasks) if tasks.as_sequence().is_empty() => diags.push(Diagnostic::error(
            tasks.range,
            "Pipeline must have at least one task",
        )),
        Some(_) => {}
    }

    // `tasks` and `finally` share one name space.
    let mut seen = HashSet::new();
    for key in ["tasks", "finally"] {
        if let Some(list) = spec.get(key) {
            check_pipeline_tasks(list, &mut seen, diags);
        }
    }
}

fn check_pipeline_tasks<'a>(
    tasks: &'a Node,
    seen: &mut HashSet<&'a str>,
    diags: &mut Vec<Diagnostic>,
) {
    for task in tasks.as_sequence() {
        if let Some(name_node) = task.get("name") {
            let name = name_node.as_scalar().unwrap_or_default();
            if !seen.insert(name) {
                diags.push(Diagnostic::warning(
                    name_node.range,
                    format!("Duplicate task name '{}' in pipeline", name),
                ));
            }
        }

        if let Some(task_ref) = task.get("taskRef") {
            if task_ref.get("name").is_none() {
                diags.push(Diagnostic::error(
                    task_ref.range,
                    "Field 'taskRef' requires a 'name' field",
                ));
            }
        }
    }
}

pub(super) fn check_task(doc: &Document, diags: &mut Vec<Diagnostic>) {
    let Some(spec) = doc.spec() else {
        return;
    };

    check_unknown_fields(spec, schema::TASK_SPEC_FIELDS, diags);

    let Some(steps) = spec.get("steps") else {
        diags.push(Diagnostic::error(
            spec.range,
            "Required field 'steps' is missing in Task spec",
        ));
        return;
    };

    if !steps.is_sequence() {
        diags.push(Diagnostic::error(
            steps.range,
            "Field 'steps' must be an array/sequence",
        ));
        return;
    }

    if steps.as_sequence().is_empty() {
        diags.push(Diagnostic::error(
            steps.range,
            "Task must have at least one step",
        ));
        return;
    }

    for step in steps.as_sequence() {
        if step.get("image").is_none() {
            let name = step
                .get("name")
                .and_then(Node::as_scalar)
                .unwrap_or("unnamed");
            diags.push(Diagnostic::error(
                step.range,
                format!("Step '{}' is missing required field 'image'", name),
            ));
        }
    }
}

fn check_unknown_fields(node: &Node, known: &[&str], diags: &mut Vec<Diagnostic>) {
    let Some(children) = node.as_mapping() else {
        return;
    };

    for (key, child) in children {
        if !known.contains(&key.as_str()) {
            diags.push(Diagnostic::warning(
                child.range,
                format!("Unknown field '{}' in spec", key),
            ));
        }
    }
}
