//! Quick fixes derived from validation diagnostics.

use tekton_core::{Diagnostic, Position, Range};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAction {
    pub title: String,
    pub uri: String,
    /// Range replaced by `new_text`.
    pub range: Range,
    pub new_text: String,
    pub diagnostic: Diagnostic,
}

/// Quick fixes for every diagnostic that has one.
pub fn code_actions(uri: &str, diagnostics: &[Diagnostic]) -> Vec<CodeAction> {
    diagnostics
        .iter()
        .filter_map(|d| action_for(uri, d))
        .collect()
}

/// Quick fixes for the diagnostics whose lines overlap `range`.
pub fn code_actions_in_range(uri: &str, diagnostics: &[Diagnostic], range: Range) -> Vec<CodeAction> {
    diagnostics
        .iter()
        .filter(|d| d.range.start.line <= range.end.line && d.range.end.line >= range.start.line)
        .filter_map(|d| action_for(uri, d))
        .collect()
}

fn action_for(uri: &str, diag: &Diagnostic) -> Option<CodeAction> {
    let message = &diag.message;
    if message.contains("Required field") || message.contains("missing") {
        add_field(uri, diag)
    } else if message.contains("Unknown field") {
        remove_field(uri, diag)
    } else {
        None
    }
}

fn add_field(uri: &str, diag: &Diagnostic) -> Option<CodeAction> {
    let field = last_quoted(&diag.message)?;
    let name = field.rsplit('.').next().unwrap_or(field);
    let at = Position::new(diag.range.end.line + 1, 0);

    Some(CodeAction {
        title: format!("Add missing field '{}'", name),
        uri: uri.to_string(),
        range: Range::new(at, at),
        new_text: field_template(name),
        diagnostic: diag.clone(),
    })
}

fn remove_field(uri: &str, diag: &Diagnostic) -> Option<CodeAction> {
    let field = last_quoted(&diag.message)?;
    let line = diag.range.start.line;

    Some(CodeAction {
        title: format!("Remove unknown field '{}'", field),
        uri: uri.to_string(),
        range: Range::new(Position::new(line, 0), Position::new(line + 1, 0)),
        new_text: String::new(),
        diagnostic: diag.clone(),
    })
}

/// The last `'...'` span in a message.
fn last_quoted(message: &str) -> Option<&str> {
    let end = message.rfind('\'')?;
    let start = message[..end].rfind('\'')?;
    let name = &message[start + 1..end];
    (!name.is_empty()).then_some(name)
}

fn field_template(name: &str) -> String {
    match name {
        "metadata" => "metadata:\n  name: \n".to_string(),
        "name" => "  name: \n".to_string(),
        "spec" => "spec:\n  steps:\n    - name: step-1\n      image: alpine\n".to_string(),
        "steps" => "  steps:\n    - name: step-1\n      image: alpine\n".to_string(),
        "tasks" => "  tasks:\n    - name: task-1\n      taskRef:\n        name: \n".to_string(),
        other => format!("  {}: \n", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tekton_core::{build, validate};

    fn diag(message: &str, line: u32) -> Diagnostic {
        let range = Range::new(Position::new(line, 2), Position::new(line + 2, 4));
        if message.contains("Unknown") {
            Diagnostic::warning(range, message)
        } else {
            Diagnostic::error(range, message)
        }
    }

    #[test]
    fn missing_metadata_name_inserts_a_name_line() {
        let actions = code_actions("file:///p.yaml", &[diag("Required field 'metadata.name' is missing", 2)]);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Add missing field 'name'");
        assert_eq!(actions[0].new_text, "  name: \n");
        assert_eq!(actions[0].range, Range::new(Position::new(5, 0), Position::new(5, 0)));
    }

    #[test]
    fn step_without_image_offers_the_image_field() {
        let actions = code_actions("file:///t.yaml", &[diag("Step 'build' is missing required field 'image'", 6)]);
        assert_eq!(actions[0].title, "Add missing field 'image'");
        assert_eq!(actions[0].new_text, "  image: \n");
    }

    #[test]
    fn templates_for_structural_fields() {
        let actions = code_actions("file:///t.yaml", &[diag("Required field 'steps' is missing in Task spec", 4)]);
        assert!(actions[0].new_text.starts_with("  steps:\n    - name: step-1"));
    }

    #[test]
    fn unknown_field_removes_its_line() {
        let actions = code_actions("file:///t.yaml", &[diag("Unknown field 'stepz' in spec", 5)]);
        assert_eq!(actions[0].title, "Remove unknown field 'stepz'");
        assert_eq!(actions[0].new_text, "");
        assert_eq!(actions[0].range, Range::new(Position::new(5, 0), Position::new(6, 0)));
    }

    #[test]
    fn diagnostics_without_fixes_are_skipped() {
        let diags = [
            diag("Pipeline must have at least one task", 5),
            diag("Duplicate task name 'build' in pipeline", 9),
        ];
        assert!(code_actions("file:///p.yaml", &diags).is_empty());
    }

    #[test]
    fn range_filter_keeps_overlapping_lines() {
        let diags = [
            diag("Unknown field 'a' in spec", 1),
            diag("Unknown field 'b' in spec", 10),
        ];
        let range = Range::new(Position::new(9, 0), Position::new(12, 0));
        let actions = code_actions_in_range("file:///t.yaml", &diags, range);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].title, "Remove unknown field 'b'");
    }

    #[test]
    fn fixes_from_real_validation() {
        let doc = build("apiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: t\nspec:\n  stepz: []\n").unwrap();
        let titles: Vec<_> = code_actions("file:///t.yaml", &validate(&doc))
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(
            titles,
            vec!["Remove unknown field 'stepz'", "Add missing field 'steps'"]
        );
    }
}
