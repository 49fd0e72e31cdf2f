//! Boundary to the concrete syntax parser.
//!
//! The builder only ever sees an owned [`SyntaxNode`] tree, so swapping the
//! parsing technology means writing another [`SyntaxAdapter`]. The default
//! adapter is [`TreeSitterYaml`].

use tree_sitter::{Parser, TreeCursor};

use crate::ast::{Position, Range};
use crate::error::ParseError;

/// One node of a concrete syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    /// Grammar node kind, e.g. `block_mapping_pair`.
    pub kind: String,
    /// Field name this node occupies in its parent (`key`, `value`, ...).
    pub field: Option<String>,
    /// False for punctuation and other anonymous tokens.
    pub named: bool,
    pub range: Range,
    pub start_byte: usize,
    pub end_byte: usize,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// First child occupying the given field.
    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.children
            .iter()
            .find(|child| child.field.as_deref() == Some(field))
    }

    /// The slice of `source` this node spans, or `""` when the span does not
    /// fit the text.
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        source.get(self.start_byte..self.end_byte).unwrap_or("")
    }

    /// Comments, anchors and tags decorate a value without being one.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind.as_str(), "comment" | "anchor" | "tag")
    }

    /// Named, non-trivia children.
    pub fn meaningful_children(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children
            .iter()
            .filter(|child| child.named && !child.is_trivia())
    }

    /// Whether this node or any descendant has the given kind.
    pub fn contains_kind(&self, kind: &str) -> bool {
        self.kind == kind || self.children.iter().any(|child| child.contains_kind(kind))
    }
}

/// Parses raw text into a concrete syntax tree.
pub trait SyntaxAdapter {
    fn parse(&self, text: &str) -> Result<SyntaxNode, ParseError>;
}

/// [`SyntaxAdapter`] backed by tree-sitter's YAML grammar.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeSitterYaml;

impl SyntaxAdapter for TreeSitterYaml {
    fn parse(&self, text: &str) -> Result<SyntaxNode, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_yaml::LANGUAGE.into())
            .map_err(|e| ParseError::Syntax(format!("failed to load YAML grammar: {}", e)))?;
        let tree = parser
            .parse(text, None)
            .ok_or_else(|| ParseError::Syntax("failed to parse YAML".to_string()))?;
        let mut cursor = tree.walk();
        Ok(convert(&mut cursor))
    }
}

/// Copy the subtree under the cursor into owned nodes. Leaves the cursor
/// where it started.
fn convert(cursor: &mut TreeCursor<'_>) -> SyntaxNode {
    let node = cursor.node();
    let field = cursor.field_name().map(str::to_owned);

    let mut children = Vec::new();
    if cursor.goto_first_child() {
        loop {
            children.push(convert(cursor));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }

    let start = node.start_position();
    let end = node.end_position();
    SyntaxNode {
        kind: node.kind().to_string(),
        field,
        named: node.is_named(),
        range: Range::new(
            Position::new(start.row as u32, start.column as u32),
            Position::new(end.row as u32, end.column as u32),
        ),
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
        children,
    }
}
