//! Tekton Language Server Protocol implementation for IDE integration.
//!
//! Keeps a shared cache of open and workspace YAML documents, publishes
//! validation diagnostics as documents change, and answers completion,
//! hover, outline, formatting, go-to-definition and quick-fix requests.
//! The feature providers work on `tekton_core` types only; `convert` maps
//! their results onto `lsp_types` at the server boundary.

pub mod actions;
pub mod cache;
pub mod completion;
pub mod config;
pub mod context;
pub mod convert;
pub mod definition;
pub mod formatting;
pub mod hover;
pub mod server;
pub mod symbols;
pub mod workspace;

/// Run the LSP server over stdio. This is the public entry point
/// called by `tekton-ls lsp`.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    server::run()
}
