//! Position queries over the semantic tree.

use crate::ast::{Node, Position};

/// The deepest node under `node` whose range contains `pos`.
///
/// Returns `None` when `pos` is outside `node` entirely.
pub fn find_node_at_position(node: &Node, pos: Position) -> Option<&Node> {
    if !node.range.contains(pos) {
        return None;
    }
    let deeper = node
        .children()
        .find_map(|child| find_node_at_position(child, pos));
    Some(deeper.unwrap_or(node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;

    const TASK: &str = r#"apiVersion: tekton.dev/v1
kind: Task
metadata:
  name: build-task
spec:
  steps:
    - name: compile
      image: golang:1.25
      args: ["build", "./..."]
"#;

    #[test]
    fn finds_the_deepest_node() {
        let doc = build(TASK).unwrap();
        let node = doc.find_node_at_position(Position::new(7, 15)).unwrap();
        assert_eq!(node.key, "image");
        assert_eq!(node.as_scalar(), Some("golang:1.25"));
    }

    #[test]
    fn cursor_on_a_key_resolves_to_its_child() {
        let doc = build(TASK).unwrap();
        let node = doc.find_node_at_position(Position::new(3, 3)).unwrap();
        assert_eq!(node.key, "name");
        assert_eq!(node.as_scalar(), Some("build-task"));
    }

    #[test]
    fn flow_sequence_items_are_reachable() {
        let doc = build(TASK).unwrap();
        let node = doc.find_node_at_position(Position::new(8, 14)).unwrap();
        assert_eq!(node.as_scalar(), Some("\"build\""));
    }

    #[test]
    fn outside_the_document_is_none() {
        let doc = build(TASK).unwrap();
        assert!(doc.find_node_at_position(Position::new(400, 0)).is_none());
    }

    #[test]
    fn gaps_between_children_resolve_to_the_container() {
        let doc = build(TASK).unwrap();
        // Past the end of `kind: Task` on line 1, still inside the root.
        let node = doc.find_node_at_position(Position::new(1, 40)).unwrap();
        assert!(node.key.is_empty());
        assert!(node.is_mapping());
    }
}
