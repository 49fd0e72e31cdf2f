use thiserror::Error;

/// Failure to turn raw text into a [`Document`](crate::ast::Document).
///
/// This is the only failure the semantic model knows about. Everything
/// downstream of a successful parse is total: malformed-but-parseable input
/// degrades to null nodes, empty lists or absent lookups instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input text was empty.
    #[error("empty content")]
    Empty,
    /// The syntax adapter could not produce a tree.
    #[error("syntax error: {0}")]
    Syntax(String),
}
