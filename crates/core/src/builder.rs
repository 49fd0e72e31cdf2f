//! Syntax tree to semantic tree conversion.
//!
//! The builder never fails once the adapter has produced a tree: any node
//! shape it does not recognise is either looked through (one meaningful
//! child) or kept as verbatim text, and empty shapes become null nodes.

use indexmap::IndexMap;

use crate::ast::{Document, Node, Position, Range, Value};
use crate::error::ParseError;
use crate::syntax::{SyntaxAdapter, SyntaxNode, TreeSitterYaml};

/// Build a document from raw YAML text with the default adapter.
pub fn build(text: &str) -> Result<Document, ParseError> {
    build_with(&TreeSitterYaml, "", text)
}

/// Build a document that remembers the URI it was parsed for.
pub fn build_document(uri: &str, text: &str) -> Result<Document, ParseError> {
    build_with(&TreeSitterYaml, uri, text)
}

/// Build a document using a specific syntax adapter.
pub fn build_with<A>(adapter: &A, uri: &str, text: &str) -> Result<Document, ParseError>
where
    A: SyntaxAdapter + ?Sized,
{
    if text.is_empty() {
        return Err(ParseError::Empty);
    }

    let tree = adapter.parse(text)?;
    let mut root = build_node(&tree, text, String::new());
    // The root covers the whole text, including leading comments and blank
    // lines the grammar leaves outside the first document.
    root.range = Range::new(Position::default(), tree.range.end.max(root.range.end));

    let api_version = root_scalar(&root, "apiVersion");
    let kind = root_scalar(&root, "kind");

    Ok(Document {
        uri: uri.to_string(),
        root,
        api_version,
        kind,
    })
}

fn root_scalar(root: &Node, key: &str) -> String {
    root.get(key)
        .and_then(Node::as_scalar)
        .unwrap_or_default()
        .to_string()
}

fn build_node(syntax: &SyntaxNode, source: &str, key: String) -> Node {
    let range = syntax.range;

    match syntax.kind.as_str() {
        "stream" | "document" | "block_node" | "flow_node" => {
            match syntax.meaningful_children().next() {
                Some(child) => build_node(child, source, key),
                None => Node::null(key, range),
            }
        }
        "block_mapping" | "flow_mapping" => Node {
            key,
            value: Value::Mapping(build_mapping(syntax, source)),
            range,
        },
        "block_sequence" | "flow_sequence" => Node {
            key,
            value: Value::Sequence(build_sequence(syntax, source)),
            range,
        },
        "plain_scalar" | "single_quote_scalar" | "double_quote_scalar" | "block_scalar" => {
            Node::scalar(key, syntax.text(source), range)
        }
        _ => {
            let mut meaningful = syntax.meaningful_children();
            if let (Some(only), None) = (meaningful.next(), meaningful.next()) {
                return build_node(only, source, key);
            }
            let text = syntax.text(source);
            if text.is_empty() {
                Node::null(key, range)
            } else {
                Node::scalar(key, text, range)
            }
        }
    }
}

fn build_mapping(syntax: &SyntaxNode, source: &str) -> IndexMap<String, Node> {
    let mut children = IndexMap::new();

    for pair in syntax
        .meaningful_children()
        .filter(|c| matches!(c.kind.as_str(), "block_mapping_pair" | "flow_pair"))
    {
        let Some(key_node) = pair.child_by_field("key") else {
            continue;
        };
        let key = key_node.text(source).to_string();

        let child = match pair.child_by_field("value") {
            Some(value) => {
                let mut node = build_node(value, source, key.clone());
                // Widen to the pair so a cursor on the key lands on this child.
                node.range = pair.range;
                node.key = key.clone();
                node
            }
            None => Node::null(key.clone(), pair.range),
        };
        children.insert(key, child);
    }

    children
}

fn build_sequence(syntax: &SyntaxNode, source: &str) -> Vec<Node> {
    let mut items = Vec::new();

    for child in syntax.meaningful_children() {
        match child.kind.as_str() {
            "block_sequence_item" => {
                // The `-` marker is anonymous, so the first meaningful child
                // is the item's value.
                if let Some(value) = child.meaningful_children().next() {
                    items.push(build_node(value, source, String::new()));
                }
            }
            "flow_node" => items.push(build_node(child, source, String::new())),
            _ => {}
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIPELINE: &str = r#"apiVersion: tekton.dev/v1
kind: Pipeline
metadata:
  name: build-pipeline
spec:
  params:
    - name: repo-url
      type: string
  tasks:
    - name: fetch
      taskRef:
        name: git-clone
    - name: build
      runAfter: [fetch]
      taskRef:
        name: build-task
"#;

    #[test]
    fn empty_text_is_a_parse_error() {
        assert_eq!(build(""), Err(ParseError::Empty));
    }

    #[test]
    fn caches_api_version_and_kind() {
        let doc = build(PIPELINE).unwrap();
        assert_eq!(doc.api_version, "tekton.dev/v1");
        assert_eq!(doc.kind, "Pipeline");
        assert_eq!(doc.metadata_name(), Some("build-pipeline"));
        assert!(doc.uri.is_empty());
    }

    #[test]
    fn missing_api_version_and_kind_are_empty() {
        let doc = build("metadata:\n  name: x\n").unwrap();
        assert_eq!(doc.api_version, "");
        assert_eq!(doc.kind, "");
    }

    #[test]
    fn build_document_records_uri() {
        let doc = build_document("file:///w/p.yaml", PIPELINE).unwrap();
        assert_eq!(doc.uri, "file:///w/p.yaml");
    }

    #[test]
    fn mapping_children_span_the_whole_pair() {
        let doc = build(PIPELINE).unwrap();
        let metadata = doc.root.get("metadata").unwrap();
        assert_eq!(metadata.key, "metadata");
        assert_eq!(metadata.range.start, Position::new(2, 0));
        assert_eq!(metadata.range.end.line, 3);

        let kind = doc.root.get("kind").unwrap();
        assert_eq!(kind.range.start, Position::new(1, 0));
        assert_eq!(kind.as_scalar(), Some("Pipeline"));
    }

    #[test]
    fn sequences_keep_source_order_and_have_no_keys() {
        let doc = build(PIPELINE).unwrap();
        let tasks = doc.spec().unwrap().get("tasks").unwrap();
        let names: Vec<_> = tasks
            .as_sequence()
            .iter()
            .map(|t| t.get("name").and_then(Node::as_scalar).unwrap())
            .collect();
        assert_eq!(names, vec!["fetch", "build"]);
        assert!(tasks.as_sequence().iter().all(|t| t.key.is_empty()));
    }

    #[test]
    fn flow_collections_are_built() {
        let doc = build(PIPELINE).unwrap();
        let build_task = &doc.spec().unwrap().get("tasks").unwrap().as_sequence()[1];
        let run_after = build_task.get("runAfter").unwrap();
        assert!(run_after.is_sequence());
        assert_eq!(run_after.as_sequence()[0].as_scalar(), Some("fetch"));

        let doc = build("spec:\n  tasks: []\n  taskRef: {}\n").unwrap();
        let spec = doc.spec().unwrap();
        assert!(spec.get("tasks").unwrap().is_sequence());
        assert!(spec.get("tasks").unwrap().as_sequence().is_empty());
        assert!(spec.get("taskRef").unwrap().is_mapping());
    }

    #[test]
    fn key_without_value_is_null_spanning_the_pair() {
        let doc = build("kind: Task\nspec:\n").unwrap();
        let spec = doc.spec().unwrap();
        assert!(spec.is_null());
        assert_eq!(spec.key, "spec");
        assert_eq!(spec.range.start, Position::new(1, 0));
    }

    #[test]
    fn scalars_are_verbatim() {
        let doc = build("a: \"quoted\\n\"\nb: 'single'\nc: |\n  line one\n").unwrap();
        assert_eq!(doc.root.get("a").unwrap().as_scalar(), Some("\"quoted\\n\""));
        assert_eq!(doc.root.get("b").unwrap().as_scalar(), Some("'single'"));
        let block = doc.root.get("c").unwrap().as_scalar().unwrap();
        assert!(block.starts_with('|'));
        assert!(block.contains("line one"));
    }

    #[test]
    fn mapping_keys_keep_declaration_order() {
        let doc = build("zeta: 1\nalpha: 2\nmid: 3\n").unwrap();
        let keys: Vec<_> = doc.root.as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn leading_comment_does_not_hide_the_root_mapping() {
        let doc = build("# a task\n\nkind: Task\n").unwrap();
        assert_eq!(doc.kind, "Task");
        assert_eq!(doc.root.range.start, Position::new(0, 0));
    }

    #[test]
    fn anchors_are_looked_through() {
        let doc = build("base: &defaults\n  image: alpine\n").unwrap();
        let base = doc.root.get("base").unwrap();
        assert!(base.is_mapping());
        assert_eq!(base.get("image").unwrap().as_scalar(), Some("alpine"));
    }

    #[test]
    fn whitespace_only_text_builds_a_null_root() {
        let doc = build("   \n\n").unwrap();
        assert!(doc.root.is_null());
        assert_eq!(doc.root.range.start.line, 0);
    }

    #[test]
    fn building_twice_is_identical() {
        assert_eq!(build(PIPELINE).unwrap(), build(PIPELINE).unwrap());
    }

    struct FailingAdapter;

    impl SyntaxAdapter for FailingAdapter {
        fn parse(&self, _text: &str) -> Result<SyntaxNode, ParseError> {
            Err(ParseError::Syntax("no tree".to_string()))
        }
    }

    #[test]
    fn adapter_failure_is_a_parse_error() {
        let err = build_with(&FailingAdapter, "", "kind: Task\n").unwrap_err();
        assert_eq!(err, ParseError::Syntax("no tree".to_string()));
    }

    struct UnknownShapes;

    impl SyntaxAdapter for UnknownShapes {
        fn parse(&self, text: &str) -> Result<SyntaxNode, ParseError> {
            let leaf = |kind: &str, start: usize, end: usize| SyntaxNode {
                kind: kind.to_string(),
                field: None,
                named: true,
                range: Range::new(
                    Position::new(0, start as u32),
                    Position::new(0, end as u32),
                ),
                start_byte: start,
                end_byte: end,
                children: Vec::new(),
            };
            let mut mystery = leaf("mystery", 0, text.len());
            mystery.children = vec![leaf("odd_leaf", 0, 3), leaf("odd_leaf", 4, 7)];
            Ok(mystery)
        }
    }

    #[test]
    fn unknown_shapes_degrade_to_verbatim_text() {
        let doc = build_with(&UnknownShapes, "", "foo bar").unwrap();
        assert_eq!(doc.root.as_scalar(), Some("foo bar"));
    }
}
