//! Static Tekton vocabulary shared by validation and the editor features.

/// Known Tekton API versions. A document whose `apiVersion` starts with one
/// of these is treated as a Tekton resource.
pub const TEKTON_API_VERSIONS: &[&str] = &[
    "tekton.dev/v1",
    "tekton.dev/v1beta1",
    "tekton.dev/v1alpha1",
    "triggers.tekton.dev/v1beta1",
    "triggers.tekton.dev/v1alpha1",
];

pub const KIND_PIPELINE: &str = "Pipeline";
pub const KIND_TASK: &str = "Task";
pub const KIND_CLUSTER_TASK: &str = "ClusterTask";

/// Resource kinds that get a short description on hover.
pub const KNOWN_KINDS: &[&str] = &[
    "Pipeline",
    "Task",
    "ClusterTask",
    "PipelineRun",
    "TaskRun",
    "TriggerTemplate",
    "TriggerBinding",
    "EventListener",
];

/// Fields accepted directly under a Pipeline `spec`.
pub const PIPELINE_SPEC_FIELDS: &[&str] = &[
    "tasks",
    "params",
    "workspaces",
    "results",
    "finally",
    "description",
];

/// Fields accepted directly under a Task `spec`.
pub const TASK_SPEC_FIELDS: &[&str] = &[
    "steps",
    "params",
    "workspaces",
    "results",
    "description",
    "volumes",
    "sidecars",
    "stepTemplate",
];

pub fn is_tekton_resource(api_version: &str) -> bool {
    TEKTON_API_VERSIONS
        .iter()
        .any(|prefix| api_version.starts_with(prefix))
}

/// `Task` and `ClusterTask` share the same spec shape.
pub fn is_task_kind(kind: &str) -> bool {
    kind == KIND_TASK || kind == KIND_CLUSTER_TASK
}
