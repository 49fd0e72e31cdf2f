//! Conversions from provider results to `lsp_types`.

use std::collections::HashMap;

use lsp_types::{
    CodeActionKind, CodeActionOrCommand, CompletionItemKind, CompletionItemLabelDetails,
    DiagnosticSeverity, DocumentSymbol, HoverContents, MarkupContent, MarkupKind, TextEdit, Uri,
    WorkspaceEdit,
};
use tekton_core::{Diagnostic, Position, Range, Severity};

use crate::actions::CodeAction;
use crate::completion::{CompletionItem, FieldType};
use crate::definition::Location;
use crate::hover::HoverResult;
use crate::symbols::{Symbol, SymbolKind};

pub fn position(pos: Position) -> lsp_types::Position {
    lsp_types::Position::new(pos.line, pos.character)
}

pub fn from_lsp_position(pos: lsp_types::Position) -> Position {
    Position::new(pos.line, pos.character)
}

pub fn range(r: Range) -> lsp_types::Range {
    lsp_types::Range::new(position(r.start), position(r.end))
}

pub fn from_lsp_range(r: lsp_types::Range) -> Range {
    Range::new(from_lsp_position(r.start), from_lsp_position(r.end))
}

pub fn diagnostic(d: &Diagnostic) -> lsp_types::Diagnostic {
    let severity = match d.severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Information => DiagnosticSeverity::INFORMATION,
        Severity::Hint => DiagnosticSeverity::HINT,
    };
    lsp_types::Diagnostic {
        range: range(d.range),
        severity: Some(severity),
        source: Some(d.source.clone()),
        message: d.message.clone(),
        ..Default::default()
    }
}

pub fn completion_item(item: &CompletionItem) -> lsp_types::CompletionItem {
    let shape = match item.kind {
        FieldType::String => "string",
        FieldType::Array => "array",
        FieldType::Object => "object",
    };
    lsp_types::CompletionItem {
        label: item.label.clone(),
        kind: Some(CompletionItemKind::FIELD),
        detail: Some(item.detail.clone()),
        label_details: Some(CompletionItemLabelDetails {
            detail: None,
            description: Some(shape.to_string()),
        }),
        ..Default::default()
    }
}

pub fn hover(result: &HoverResult) -> lsp_types::Hover {
    lsp_types::Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: result.content.clone(),
        }),
        range: Some(range(result.range)),
    }
}

#[allow(deprecated)] // DocumentSymbol::deprecated must still be set
pub fn document_symbol(symbol: &Symbol) -> DocumentSymbol {
    let kind = match symbol.kind {
        SymbolKind::Object => lsp_types::SymbolKind::OBJECT,
        SymbolKind::Array => lsp_types::SymbolKind::ARRAY,
        SymbolKind::Property => lsp_types::SymbolKind::PROPERTY,
    };
    let children: Vec<DocumentSymbol> = symbol.children.iter().map(document_symbol).collect();
    DocumentSymbol {
        name: symbol.name.clone(),
        detail: None,
        kind,
        tags: None,
        deprecated: None,
        range: range(symbol.range),
        selection_range: range(symbol.range),
        children: (!children.is_empty()).then_some(children),
    }
}

/// `None` when the stored URI is not a valid URI.
pub fn location(loc: &Location) -> Option<lsp_types::Location> {
    let uri: Uri = loc.uri.parse().ok()?;
    Some(lsp_types::Location::new(uri, range(loc.range)))
}

pub fn code_action(action: &CodeAction, uri: &Uri) -> CodeActionOrCommand {
    let edit = TextEdit::new(range(action.range), action.new_text.clone());
    let changes = HashMap::from([(uri.clone(), vec![edit])]);
    CodeActionOrCommand::CodeAction(lsp_types::CodeAction {
        title: action.title.clone(),
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic(&action.diagnostic)]),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// A single edit replacing the whole of `original` with `formatted`.
pub fn full_document_edit(original: &str, formatted: String) -> TextEdit {
    let lines = original.matches('\n').count() as u32;
    TextEdit::new(
        lsp_types::Range::new(
            lsp_types::Position::new(0, 0),
            lsp_types::Position::new(lines + 1, 0),
        ),
        formatted,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_map_to_protocol_values() {
        let d = Diagnostic::warning(Range::default(), "careful");
        let converted = diagnostic(&d);
        assert_eq!(converted.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(converted.source.as_deref(), Some("tekton-lsp"));
    }

    #[test]
    fn whole_document_edit_covers_every_line() {
        let edit = full_document_edit("a: 1\nb: 2\n", "a: 1\n".to_string());
        assert_eq!(edit.range.start, lsp_types::Position::new(0, 0));
        assert_eq!(edit.range.end, lsp_types::Position::new(3, 0));
    }

    #[test]
    fn leaf_symbols_have_no_children() {
        let symbol = Symbol {
            name: "description".to_string(),
            kind: SymbolKind::Property,
            range: Range::default(),
            children: Vec::new(),
        };
        assert!(document_symbol(&symbol).children.is_none());
    }
}
