//! tekton-core: position-aware model of Tekton YAML resources.
//!
//! Raw YAML text goes through a [`SyntaxAdapter`] into a concrete syntax
//! tree, which the builder turns into a semantic [`Document`] whose nodes
//! all carry source ranges. Validation runs over that document.
//!
//! # Public API
//!
//! - [`build()`] / [`build_document()`] -- parse text into a [`Document`]
//! - [`validate()`] -- structural and parameter-reference diagnostics
//! - [`find_node_at_position()`] -- deepest node at a cursor
//! - [`schema`] -- Tekton API versions, kinds and spec vocabularies

pub mod ast;
pub mod builder;
pub mod error;
pub mod locate;
pub mod schema;
pub mod syntax;
pub mod validate;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::{Document, Node, Position, Range, Value};
pub use builder::{build, build_document, build_with};
pub use error::ParseError;
pub use locate::find_node_at_position;
pub use syntax::{SyntaxAdapter, SyntaxNode, TreeSitterYaml};
pub use validate::{validate, Diagnostic, Severity, SOURCE};
