//! Field-name completion driven by the cursor context.

use tekton_core::{Document, Position};

use crate::context::{self, Context};

/// Value shape of a completable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Array,
    Object,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub description: &'static str,
    pub field_type: FieldType,
    pub required: bool,
}

const fn field(
    name: &'static str,
    description: &'static str,
    field_type: FieldType,
    required: bool,
) -> FieldSchema {
    FieldSchema {
        name,
        description,
        field_type,
        required,
    }
}

pub static METADATA_FIELDS: &[FieldSchema] = &[
    field("name", "Resource name (required)", FieldType::String, true),
    field("namespace", "Resource namespace", FieldType::String, false),
    field("labels", "Resource labels", FieldType::Object, false),
    field("annotations", "Resource annotations", FieldType::Object, false),
];

pub static PIPELINE_SPEC_FIELDS: &[FieldSchema] = &[
    field("tasks", "Pipeline tasks to execute", FieldType::Array, true),
    field("finally", "Tasks to run after all other tasks", FieldType::Array, false),
    field("params", "Pipeline parameters", FieldType::Array, false),
    field("workspaces", "Pipeline workspaces", FieldType::Array, false),
    field("results", "Pipeline results", FieldType::Array, false),
    field("description", "Pipeline description", FieldType::String, false),
];

pub static PIPELINE_TASK_FIELDS: &[FieldSchema] = &[
    field("name", "Task name (required)", FieldType::String, true),
    field("taskRef", "Reference to an existing Task", FieldType::Object, false),
    field("taskSpec", "Inline Task specification", FieldType::Object, false),
    field("params", "Task parameters", FieldType::Array, false),
    field("workspaces", "Workspace bindings", FieldType::Array, false),
    field("runAfter", "Tasks that must complete before this task", FieldType::Array, false),
    field("when", "Conditional execution expressions", FieldType::Array, false),
    field("matrix", "Matrix parameters for fan-out", FieldType::Object, false),
];

pub static TASK_SPEC_FIELDS: &[FieldSchema] = &[
    field("steps", "Task steps to execute", FieldType::Array, true),
    field("params", "Task parameters", FieldType::Array, false),
    field("workspaces", "Task workspaces", FieldType::Array, false),
    field("results", "Task results", FieldType::Array, false),
    field("volumes", "Kubernetes volumes", FieldType::Array, false),
    field("sidecars", "Sidecar containers", FieldType::Array, false),
    field("stepTemplate", "Template for step defaults", FieldType::Object, false),
    field("description", "Task description", FieldType::String, false),
];

pub static STEP_FIELDS: &[FieldSchema] = &[
    field("name", "Step name (required)", FieldType::String, true),
    field("image", "Container image (required)", FieldType::String, true),
    field("script", "Script to execute", FieldType::String, false),
    field("command", "Container entrypoint", FieldType::Array, false),
    field("args", "Container arguments", FieldType::Array, false),
    field("env", "Environment variables", FieldType::Array, false),
    field("workingDir", "Working directory", FieldType::String, false),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionItem {
    pub label: String,
    pub detail: String,
    pub kind: FieldType,
}

pub fn fields_for(ctx: Context) -> &'static [FieldSchema] {
    match ctx {
        Context::Metadata => METADATA_FIELDS,
        Context::PipelineSpec => PIPELINE_SPEC_FIELDS,
        Context::TaskSpec => TASK_SPEC_FIELDS,
        Context::PipelineTaskItem => PIPELINE_TASK_FIELDS,
        Context::StepItem => STEP_FIELDS,
        Context::Unknown => &[],
    }
}

/// Field completions at `pos`. Empty outside a recognised context.
pub fn complete(doc: &Document, pos: Position) -> Vec<CompletionItem> {
    fields_for(context::classify(doc, pos))
        .iter()
        .map(|f| CompletionItem {
            label: f.name.to_string(),
            detail: f.description.to_string(),
            kind: f.field_type,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tekton_core::build;

    fn labels(yaml: &str, line: u32, character: u32) -> Vec<String> {
        complete(&build(yaml).unwrap(), Position::new(line, character))
            .into_iter()
            .map(|i| i.label)
            .collect()
    }

    #[test]
    fn metadata_fields() {
        let yaml = "apiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: t\n";
        assert_eq!(labels(yaml, 3, 2), vec!["name", "namespace", "labels", "annotations"]);
    }

    #[test]
    fn task_spec_fields_on_a_blank_line() {
        let yaml = "apiVersion: tekton.dev/v1\nkind: Task\nmetadata:\n  name: t\nspec:\n  \n";
        let items = complete(&build(yaml).unwrap(), Position::new(5, 2));
        assert_eq!(items.len(), TASK_SPEC_FIELDS.len());
        assert_eq!(items[0].label, "steps");
        assert_eq!(items[0].detail, "Task steps to execute");
        assert_eq!(items[0].kind, FieldType::Array);
    }

    #[test]
    fn step_fields_include_image() {
        let yaml = r#"apiVersion: tekton.dev/v1
kind: Task
metadata:
  name: t
spec:
  steps:
    - name: build
      image: alpine
"#;
        assert!(labels(yaml, 7, 8).contains(&"image".to_string()));
    }

    #[test]
    fn nothing_outside_tekton() {
        let yaml = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: d\n";
        assert!(labels(yaml, 3, 2).is_empty());
    }

    #[test]
    fn only_identity_fields_are_required() {
        let required: Vec<_> = STEP_FIELDS.iter().filter(|f| f.required).map(|f| f.name).collect();
        assert_eq!(required, vec!["name", "image"]);
    }

    #[test]
    fn every_field_type_has_fields() {
        let tables = [
            METADATA_FIELDS,
            PIPELINE_SPEC_FIELDS,
            PIPELINE_TASK_FIELDS,
            TASK_SPEC_FIELDS,
            STEP_FIELDS,
        ];
        let used: std::collections::HashSet<FieldType> = tables
            .iter()
            .flat_map(|table| table.iter().map(|f| f.field_type))
            .collect();
        for shape in [FieldType::String, FieldType::Array, FieldType::Object] {
            assert!(used.contains(&shape), "{:?} unused", shape);
        }
        assert_eq!(used.len(), 3);
    }
}
