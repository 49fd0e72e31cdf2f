//! Document outline.

use tekton_core::{Document, Node, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Object,
    Array,
    Property,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub range: Range,
    pub children: Vec<Symbol>,
}

/// Outline of a Tekton resource: one root symbol for the resource, its
/// `spec` fields beneath, and named list items beneath those.
pub fn document_symbols(doc: &Document) -> Vec<Symbol> {
    if !doc.is_tekton_resource() {
        return Vec::new();
    }

    let name = doc.metadata_name().unwrap_or(doc.kind.as_str()).to_string();
    let children = doc
        .spec()
        .and_then(Node::as_mapping)
        .map(|fields| {
            fields
                .iter()
                .map(|(key, child)| field_symbol(key, child))
                .collect()
        })
        .unwrap_or_default();

    vec![Symbol {
        name,
        kind: SymbolKind::Object,
        range: doc.root.range,
        children,
    }]
}

fn field_symbol(key: &str, node: &Node) -> Symbol {
    let kind = if node.is_sequence() {
        SymbolKind::Array
    } else if node.is_mapping() {
        SymbolKind::Object
    } else {
        SymbolKind::Property
    };

    let children = node
        .as_sequence()
        .iter()
        .filter_map(|item| {
            let name = item.get("name")?.as_scalar().unwrap_or_default();
            Some(Symbol {
                name: name.to_string(),
                kind: SymbolKind::Property,
                range: item.range,
                children: Vec::new(),
            })
        })
        .collect();

    Symbol {
        name: key.to_string(),
        kind,
        range: node.range,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tekton_core::build;

    #[test]
    fn outline_follows_declaration_order() {
        let doc = build(
            r#"apiVersion: tekton.dev/v1
kind: Pipeline
metadata:
  name: release
spec:
  description: ship it
  params:
    - name: revision
  tasks:
    - name: fetch
    - name: build
  finally: []
"#,
        )
        .unwrap();
        let symbols = document_symbols(&doc);
        assert_eq!(symbols.len(), 1);
        let root = &symbols[0];
        assert_eq!(root.name, "release");
        assert_eq!(root.kind, SymbolKind::Object);

        let names: Vec<_> = root.children.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["description", "params", "tasks", "finally"]);
        assert_eq!(root.children[0].kind, SymbolKind::Property);
        assert_eq!(root.children[2].kind, SymbolKind::Array);

        let tasks: Vec<_> = root.children[2].children.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(tasks, vec!["fetch", "build"]);
        assert!(root.children[3].children.is_empty());
    }

    #[test]
    fn unnamed_resource_falls_back_to_kind() {
        let doc = build("apiVersion: tekton.dev/v1\nkind: Task\nspec:\n  stepTemplate:\n    image: alpine\n").unwrap();
        let symbols = document_symbols(&doc);
        assert_eq!(symbols[0].name, "Task");
        assert_eq!(symbols[0].children[0].kind, SymbolKind::Object);
    }

    #[test]
    fn non_tekton_documents_have_no_outline() {
        let doc = build("apiVersion: v1\nkind: Service\n").unwrap();
        assert!(document_symbols(&doc).is_empty());
    }
}
