//! Whole-document YAML formatting.
//!
//! Indentation is rebuilt from the concrete syntax tree: every mapping pair
//! and sequence item starts at `indent` spaces per nesting level, sequence
//! markers are padded to the same width and the gap after a key's colon is
//! collapsed to one space. Everything else on a line (scalar text, flow
//! collections, comments) is copied verbatim, so values never change type or
//! spelling. Block scalar bodies and multi-line values move with their
//! owner and keep their relative indentation.

use tekton_core::{ParseError, SyntaxAdapter, SyntaxNode, TreeSitterYaml};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid YAML: {0}")]
    Parse(#[source] serde_yaml::Error),
    #[error(transparent)]
    Syntax(#[from] ParseError),
}

pub const DEFAULT_INDENT: usize = 2;

/// Reformat `text` with `indent` spaces per nesting level. Widths below 2
/// use 2, the narrowest that keeps compact `- key: value` items aligned.
pub fn format(text: &str, indent: usize) -> Result<String, FormatError> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }

    // The syntax tree tolerates errors; only rewrite text a YAML loader accepts.
    serde_yaml::from_str::<serde_yaml::Value>(text).map_err(FormatError::Parse)?;
    let tree = TreeSitterYaml.parse(text)?;

    let mut layout = Layout::new(text, indent.max(DEFAULT_INDENT));
    for root in top_level(&tree) {
        layout.collection(root, 0);
    }
    Ok(layout.render())
}

/// The root node of every document in the stream.
fn top_level(stream: &SyntaxNode) -> impl Iterator<Item = &SyntaxNode> {
    stream
        .meaningful_children()
        .filter(|child| child.kind == "document")
        .filter_map(|doc| doc.meaningful_children().next())
        .map(unwrap_block)
}

/// Look through a `block_node` wrapper to the collection or scalar inside.
fn unwrap_block(node: &SyntaxNode) -> &SyntaxNode {
    if node.kind == "block_node" {
        node.meaningful_children().next().unwrap_or(node)
    } else {
        node
    }
}

/// Last row a node covers. An end at column 0 belongs to the row before.
fn last_row(node: &SyntaxNode) -> usize {
    let end = node.range.end;
    if end.character == 0 && end.line > node.range.start.line {
        end.line as usize - 1
    } else {
        end.line as usize
    }
}

fn leading_spaces(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Block scalar headers such as `|2-` pin their content to a fixed offset
/// from the parent indentation.
fn has_indentation_indicator(header: &str) -> bool {
    header
        .split('#')
        .next()
        .is_some_and(|style| style.chars().any(|c| c.is_ascii_digit()))
}

/// A row that starts a mapping pair or sequence item.
#[derive(Debug)]
struct Entry {
    column: usize,
    /// Leading `-` markers on the row, outermost first.
    markers: usize,
    /// Normalised `key: rest` text for a pair starting on the row.
    content: Option<String>,
}

#[derive(Debug)]
enum Row {
    Entry(Entry),
    /// Block scalar body or value continuation, moved to a new column.
    Shifted(usize),
}

struct Layout<'a> {
    source: &'a str,
    lines: Vec<&'a str>,
    rows: Vec<Option<Row>>,
    indent: usize,
}

impl<'a> Layout<'a> {
    fn new(source: &'a str, indent: usize) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let rows = lines.iter().map(|_| None).collect();
        Self {
            source,
            lines,
            rows,
            indent,
        }
    }

    fn collection(&mut self, node: &SyntaxNode, column: usize) {
        match node.kind.as_str() {
            "block_mapping" => {
                for pair in node
                    .meaningful_children()
                    .filter(|c| c.kind == "block_mapping_pair")
                {
                    self.pair(pair, column);
                }
            }
            "block_sequence" => {
                for item in node
                    .meaningful_children()
                    .filter(|c| c.kind == "block_sequence_item")
                {
                    self.item(item, column);
                }
            }
            _ => {}
        }
    }

    fn pair(&mut self, pair: &SyntaxNode, column: usize) {
        let content = self.pair_content(pair);
        if let Some(entry) = self.entry_at(pair.range.start.line as usize, column) {
            if content.is_some() {
                entry.content = content;
            }
        }
        if let Some(value) = pair.child_by_field("value") {
            self.value(value, pair, column);
        }
    }

    fn item(&mut self, item: &SyntaxNode, column: usize) {
        if let Some(entry) = self.entry_at(item.range.start.line as usize, column) {
            entry.markers += 1;
        }
        if let Some(value) = item.meaningful_children().next() {
            self.value(value, item, column);
        }
    }

    /// Lay out the value of a pair or item whose row starts at `column`.
    fn value(&mut self, value: &SyntaxNode, owner: &SyntaxNode, column: usize) {
        let node = unwrap_block(value);
        let owner_column = owner.range.start.character as usize;
        match node.kind.as_str() {
            "block_mapping" | "block_sequence" => {
                // A sequence may sit at its parent key's column.
                let nested = if node.range.start.character as usize > owner_column {
                    column + self.indent
                } else {
                    column
                };
                self.collection(node, nested);
            }
            "block_scalar" => self.block_scalar(node, owner_column, column),
            _ => self.shift_rows(value, owner_column, column),
        }
    }

    fn block_scalar(&mut self, node: &SyntaxNode, owner_column: usize, column: usize) {
        let header_row = node.range.start.line as usize;
        let body: Vec<(usize, usize)> = (header_row + 1..=last_row(node))
            .filter_map(|row| {
                let line = self.lines.get(row)?;
                (!line.trim().is_empty()).then(|| (row, leading_spaces(line)))
            })
            .collect();
        let Some(body_column) = body.iter().map(|(_, leading)| *leading).min() else {
            return;
        };

        let header = node.text(self.source).lines().next().unwrap_or_default();
        let new_column = if has_indentation_indicator(header) {
            (column + body_column).saturating_sub(owner_column)
        } else {
            column + self.indent
        };
        for (row, leading) in body {
            self.rows[row] = Some(Row::Shifted(new_column + leading - body_column));
        }
    }

    /// Move the rows of a multi-line value by as much as its owner moved.
    fn shift_rows(&mut self, value: &SyntaxNode, owner_column: usize, column: usize) {
        for row in value.range.start.line as usize..=last_row(value) {
            let Some(line) = self.lines.get(row) else {
                break;
            };
            if self.rows[row].is_none() {
                let shifted = (leading_spaces(line) + column).saturating_sub(owner_column);
                self.rows[row] = Some(Row::Shifted(shifted));
            }
        }
    }

    /// The entry for `row`, created at `column` unless an enclosing sequence
    /// item already owns the row.
    fn entry_at(&mut self, row: usize, column: usize) -> Option<&mut Entry> {
        let slot = self.rows.get_mut(row)?;
        if !matches!(slot, Some(Row::Entry(_))) {
            *slot = Some(Row::Entry(Entry {
                column,
                markers: 0,
                content: None,
            }));
        }
        match slot {
            Some(Row::Entry(entry)) => Some(entry),
            _ => None,
        }
    }

    /// `key: rest` with one space after the colon. `None` when the colon is
    /// not on the key's row (explicit `? key` pairs).
    fn pair_content(&self, pair: &SyntaxNode) -> Option<String> {
        let key = pair.child_by_field("key")?;
        let colon = pair.children.iter().find(|c| !c.named && c.kind == ":")?;
        if colon.range.start.line != key.range.end.line {
            return None;
        }
        let line = self.lines.get(colon.range.end.line as usize)?;
        let rest = line.get(colon.range.end.character as usize..)?.trim();
        let key = key.text(self.source);
        Some(if rest.is_empty() {
            format!("{}:", key)
        } else {
            format!("{}: {}", key, rest)
        })
    }

    /// Comments take the column of the next entry below them.
    fn comment_column(&self, row: usize) -> usize {
        let entry_column = |slot: &Option<Row>| match slot {
            Some(Row::Entry(entry)) => Some(entry.column),
            _ => None,
        };
        self.rows[row..]
            .iter()
            .find_map(entry_column)
            .or_else(|| self.rows[..row].iter().rev().find_map(entry_column))
            .unwrap_or(0)
    }

    fn render(&self) -> String {
        let marker = format!("-{}", " ".repeat(self.indent - 1));
        let mut out = String::with_capacity(self.source.len() + self.source.len() / 4);

        for (row, line) in self.lines.iter().enumerate() {
            if line.trim().is_empty() {
                out.push('\n');
                continue;
            }
            match &self.rows[row] {
                Some(Row::Entry(entry)) => {
                    let mut text = " ".repeat(entry.column);
                    let mut rest = line.trim_start();
                    for _ in 0..entry.markers {
                        text.push_str(&marker);
                        rest = rest.strip_prefix('-').unwrap_or(rest).trim_start();
                    }
                    text.push_str(entry.content.as_deref().unwrap_or(rest));
                    out.push_str(text.trim_end());
                }
                Some(Row::Shifted(column)) => {
                    out.push_str(&" ".repeat(*column));
                    out.push_str(line.trim_start_matches(' '));
                }
                None if line.trim_start().starts_with('#') => {
                    out.push_str(&" ".repeat(self.comment_column(row)));
                    out.push_str(line.trim());
                }
                None => out.push_str(line.trim_end()),
            }
            out.push('\n');
        }

        out
    }
}
