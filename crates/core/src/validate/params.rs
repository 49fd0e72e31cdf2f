//! `$(params.NAME)` reference checks.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::Diagnostic;
use crate::ast::{Document, Node, Value};

static PARAM_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\(params\.([a-zA-Z_][\w-]*)\)").expect("param reference pattern")
});

/// Keys whose mapping value declares its own `params`.
const SCOPE_KEYS: &[&str] = &["spec", "taskSpec", "pipelineSpec"];

pub(super) fn check_param_refs(doc: &Document, diags: &mut Vec<Diagnostic>) {
    let declared = declared_params(doc.spec());
    scan(&doc.root, &declared, diags);
}

/// Names declared in the `params` sequence of a spec-like mapping.
fn declared_params(spec: Option<&Node>) -> HashSet<&str> {
    spec.and_then(|s| s.get("params"))
        .map(|params| {
            params
                .as_sequence()
                .iter()
                .filter_map(|item| item.get("name").and_then(Node::as_scalar))
                .collect()
        })
        .unwrap_or_default()
}

fn scan<'a>(node: &'a Node, declared: &HashSet<&'a str>, diags: &mut Vec<Diagnostic>) {
    match &node.value {
        Value::Scalar(text) => {
            for caps in PARAM_REF.captures_iter(text) {
                let name = &caps[1];
                if !declared.contains(name) {
                    diags.push(Diagnostic::warning(
                        node.range,
                        format!("Reference to undeclared parameter '{}'", name),
                    ));
                }
            }
        }
        Value::Mapping(children) => {
            for (key, child) in children {
                if child.is_mapping() && SCOPE_KEYS.contains(&key.as_str()) {
                    let inner = declared_params(Some(child));
                    scan(child, &inner, diags);
                } else {
                    scan(child, declared, diags);
                }
            }
        }
        Value::Sequence(items) => {
            for item in items {
                scan(item, declared, diags);
            }
        }
        Value::Null => {}
    }
}
