//! Validation rules for Tekton resources.
//!
//! Rules run in a fixed order and every rule runs: metadata, then the
//! kind-specific structure checks, then the parameter reference scan.
//! Diagnostics come out in rule order, then in the order each rule meets
//! the offending nodes.

mod params;
mod structure;

use serde::{Deserialize, Serialize};

use crate::ast::{Document, Range};
use crate::schema;

/// Source tag attached to every diagnostic.
pub const SOURCE: &str = "tekton-lsp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Information => "info",
            Severity::Hint => "hint",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub range: Range,
    pub severity: Severity,
    pub source: String,
    pub message: String,
}

impl Diagnostic {
    pub fn error(range: Range, message: impl Into<String>) -> Self {
        Self::new(range, Severity::Error, message)
    }

    pub fn warning(range: Range, message: impl Into<String>) -> Self {
        Self::new(range, Severity::Warning, message)
    }

    fn new(range: Range, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            range,
            severity,
            source: SOURCE.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a parsed document. Non-Tekton documents yield no diagnostics.
pub fn validate(doc: &Document) -> Vec<Diagnostic> {
    if !doc.is_tekton_resource() {
        return Vec::new();
    }

    let mut diags = Vec::new();
    structure::check_metadata(doc, &mut diags);

    if doc.kind == schema::KIND_PIPELINE {
        structure::check_pipeline(doc, &mut diags);
    } else if schema::is_task_kind(&doc.kind) {
        structure::check_task(doc, &mut diags);
    }

    params::check_param_refs(doc, &mut diags);
    diags
}
