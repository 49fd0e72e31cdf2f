//! LSP server main loop with request/notification dispatch.
//!
//! Uses `lsp-server` (synchronous, crossbeam-based) for the transport. The
//! only background work is the workspace scan, which shares the document
//! cache with the main loop.

use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::sync::Arc;

use lsp_server::{Connection, Message, Notification, RequestId, Response};
use lsp_types::notification::{
    DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument, Notification as _,
    PublishDiagnostics,
};
use lsp_types::request::{
    CodeActionRequest, Completion, DocumentSymbolRequest, Formatting, GotoDefinition,
    HoverRequest,
};
use lsp_types::{
    CodeActionProviderCapability, CompletionOptions, CompletionResponse, DocumentSymbolResponse,
    GotoDefinitionResponse, HoverProviderCapability, InitializeResult, OneOf,
    PublishDiagnosticsParams, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, Uri,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::actions;
use crate::cache::DocumentCache;
use crate::completion;
use crate::config::ServerOptions;
use crate::convert;
use crate::definition;
use crate::formatting;
use crate::hover;
use crate::symbols;
use crate::workspace;

pub const SERVER_NAME: &str = "tekton-lsp";

/// Run the LSP server over stdio until shutdown.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (connection, io_threads) = Connection::stdio();
    serve(connection)?;
    io_threads.join()?;
    Ok(())
}

/// Accept one client on `addr` and serve it until shutdown.
pub fn run_tcp<A: ToSocketAddrs>(addr: A) -> Result<(), Box<dyn std::error::Error>> {
    let (connection, io_threads) = Connection::listen(addr)?;
    serve(connection)?;
    io_threads.join()?;
    Ok(())
}

/// Drive an established connection: initialize handshake, then the main
/// loop until the client asks to shut down.
pub fn serve(connection: Connection) -> Result<(), Box<dyn std::error::Error>> {
    // ── Initialize handshake ──────────────────────────────────────────
    let (init_id, init_value) = connection.initialize_start()?;
    let init_params: lsp_types::InitializeParams = serde_json::from_value(init_value)?;
    if let Some(client) = &init_params.client_info {
        info!(
            client = %client.name,
            version = client.version.as_deref().unwrap_or("unknown"),
            "initializing"
        );
    }

    let options = ServerOptions::from_init_options(init_params.initialization_options.as_ref());
    let cache = Arc::new(if options.reject_stale_versions {
        DocumentCache::with_stale_version_guard()
    } else {
        DocumentCache::new()
    });

    let result = InitializeResult {
        capabilities: build_capabilities(),
        server_info: Some(ServerInfo {
            name: SERVER_NAME.to_string(),
            version: Some(env!("CARGO_PKG_VERSION").to_string()),
        }),
    };
    connection.initialize_finish(init_id, serde_json::to_value(result)?)?;
    info!("server initialized");

    // ── Background workspace index ────────────────────────────────────
    if options.scan_workspace {
        if let Some(root) = extract_workspace_root(&init_params) {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || workspace::scan(&root, &cache));
        }
    }

    // ── Main loop ─────────────────────────────────────────────────────
    for msg in &connection.receiver {
        match msg {
            Message::Request(req) => {
                if connection.handle_shutdown(&req)? {
                    info!("shutting down");
                    break;
                }
                handle_request(&connection, &cache, req)?;
            }
            Message::Notification(not) => {
                handle_notification(&connection, &cache, not)?;
            }
            Message::Response(_) => {
                // We never send requests to the client.
            }
        }
    }

    Ok(())
}

/// Extract workspace root path from InitializeParams.
#[allow(deprecated)] // root_path/root_uri are deprecated but still sent by some clients
fn extract_workspace_root(params: &lsp_types::InitializeParams) -> Option<PathBuf> {
    if let Some(folder) = params.workspace_folders.as_ref().and_then(|f| f.first()) {
        return Some(workspace::uri_to_path(folder.uri.as_str()));
    }
    if let Some(root_uri) = &params.root_uri {
        return Some(workspace::uri_to_path(root_uri.as_str()));
    }
    params
        .root_path
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
}

pub fn build_capabilities() -> ServerCapabilities {
    ServerCapabilities {
        text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
        completion_provider: Some(CompletionOptions {
            trigger_characters: Some(vec![":".into(), "-".into(), " ".into()]),
            resolve_provider: Some(false),
            ..Default::default()
        }),
        hover_provider: Some(HoverProviderCapability::Simple(true)),
        document_symbol_provider: Some(OneOf::Left(true)),
        document_formatting_provider: Some(OneOf::Left(true)),
        definition_provider: Some(OneOf::Left(true)),
        code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
        ..Default::default()
    }
}

fn send_ok<T: Serialize>(
    connection: &Connection,
    id: RequestId,
    result: T,
) -> Result<(), Box<dyn std::error::Error>> {
    let resp = Response::new_ok(id, serde_json::to_value(result)?);
    connection.sender.send(Message::Response(resp))?;
    Ok(())
}

fn handle_request(
    connection: &Connection,
    cache: &DocumentCache,
    req: lsp_server::Request,
) -> Result<(), Box<dyn std::error::Error>> {
    use lsp_types::request::Request as _;

    if req.method == Completion::METHOD {
        let params: lsp_types::CompletionParams = serde_json::from_value(req.params)?;
        let position = &params.text_document_position;
        let result = cache
            .get_parsed(position.text_document.uri.as_str())
            .map(|doc| {
                let items = completion::complete(&doc, convert::from_lsp_position(position.position));
                CompletionResponse::Array(items.iter().map(convert::completion_item).collect())
            });
        send_ok(connection, req.id, result)?;
    } else if req.method == HoverRequest::METHOD {
        let params: lsp_types::HoverParams = serde_json::from_value(req.params)?;
        let position = &params.text_document_position_params;
        let result = cache
            .get_parsed(position.text_document.uri.as_str())
            .and_then(|doc| hover::hover(&doc, convert::from_lsp_position(position.position)))
            .map(|h| convert::hover(&h));
        send_ok(connection, req.id, result)?;
    } else if req.method == DocumentSymbolRequest::METHOD {
        let params: lsp_types::DocumentSymbolParams = serde_json::from_value(req.params)?;
        let syms = cache
            .get_parsed(params.text_document.uri.as_str())
            .map(|doc| symbols::document_symbols(&doc))
            .unwrap_or_default();
        let result: Option<DocumentSymbolResponse> = if syms.is_empty() {
            None
        } else {
            Some(DocumentSymbolResponse::Nested(
                syms.iter().map(convert::document_symbol).collect(),
            ))
        };
        send_ok(connection, req.id, result)?;
    } else if req.method == Formatting::METHOD {
        let params: lsp_types::DocumentFormattingParams = serde_json::from_value(req.params)?;
        let result = cache
            .get(params.text_document.uri.as_str())
            .and_then(|entry| {
                match formatting::format(&entry.content, params.options.tab_size as usize) {
                    Ok(formatted) if formatted != entry.content => {
                        Some(vec![convert::full_document_edit(&entry.content, formatted)])
                    }
                    Ok(_) => None,
                    Err(err) => {
                        debug!(uri = %entry.uri, %err, "formatting skipped");
                        None
                    }
                }
            });
        send_ok(connection, req.id, result)?;
    } else if req.method == GotoDefinition::METHOD {
        let params: lsp_types::GotoDefinitionParams = serde_json::from_value(req.params)?;
        let position = &params.text_document_position_params;
        let result = cache
            .get_parsed(position.text_document.uri.as_str())
            .and_then(|doc| {
                definition::goto_definition(&doc, convert::from_lsp_position(position.position), cache)
            })
            .and_then(|loc| convert::location(&loc))
            .map(GotoDefinitionResponse::Scalar);
        send_ok(connection, req.id, result)?;
    } else if req.method == CodeActionRequest::METHOD {
        let params: lsp_types::CodeActionParams = serde_json::from_value(req.params)?;
        let uri = &params.text_document.uri;
        let actions = cache
            .get_parsed(uri.as_str())
            .map(|doc| {
                let diags = tekton_core::validate(&doc);
                actions::code_actions_in_range(
                    uri.as_str(),
                    &diags,
                    convert::from_lsp_range(params.range),
                )
            })
            .unwrap_or_default();
        let result: Option<Vec<lsp_types::CodeActionOrCommand>> = if actions.is_empty() {
            None
        } else {
            Some(actions.iter().map(|a| convert::code_action(a, uri)).collect())
        };
        send_ok(connection, req.id, result)?;
    } else {
        let resp = Response::new_err(
            req.id,
            lsp_server::ErrorCode::MethodNotFound as i32,
            format!("method not found: {}", req.method),
        );
        connection.sender.send(Message::Response(resp))?;
    }
    Ok(())
}

fn handle_notification(
    connection: &Connection,
    cache: &DocumentCache,
    not: Notification,
) -> Result<(), Box<dyn std::error::Error>> {
    match not.method.as_str() {
        m if m == DidOpenTextDocument::METHOD => {
            let params: lsp_types::DidOpenTextDocumentParams = serde_json::from_value(not.params)?;
            let doc = params.text_document;
            info!(uri = doc.uri.as_str(), bytes = doc.text.len(), "document opened");
            cache.insert(doc.uri.as_str(), &doc.language_id, doc.version, doc.text);
            publish_diagnostics(connection, cache, doc.uri)?;
        }
        m if m == DidChangeTextDocument::METHOD => {
            let params: lsp_types::DidChangeTextDocumentParams =
                serde_json::from_value(not.params)?;
            let uri = params.text_document.uri;
            let version = params.text_document.version;
            debug!(uri = uri.as_str(), version, "document changed");
            // FULL sync: the last change carries the entire document.
            if let Some(change) = params.content_changes.into_iter().last() {
                if cache.get(uri.as_str()).is_none() {
                    cache.insert(uri.as_str(), "yaml", version, change.text);
                } else {
                    cache.update(uri.as_str(), version, change.text);
                }
            }
            publish_diagnostics(connection, cache, uri)?;
        }
        m if m == DidCloseTextDocument::METHOD => {
            let params: lsp_types::DidCloseTextDocumentParams = serde_json::from_value(not.params)?;
            info!(uri = params.text_document.uri.as_str(), "document closed");
            cache.remove(params.text_document.uri.as_str());
            send_diagnostics(connection, params.text_document.uri, Vec::new())?;
        }
        m => {
            debug!(method = m, "ignoring notification");
        }
    }
    Ok(())
}

/// Validate the cached document and publish the result. A document that
/// did not parse publishes an empty list.
fn publish_diagnostics(
    connection: &Connection,
    cache: &DocumentCache,
    uri: Uri,
) -> Result<(), Box<dyn std::error::Error>> {
    let diagnostics = cache
        .get_parsed(uri.as_str())
        .map(|doc| {
            tekton_core::validate(&doc)
                .iter()
                .map(convert::diagnostic)
                .collect()
        })
        .unwrap_or_default();
    send_diagnostics(connection, uri, diagnostics)
}

/// Send `textDocument/publishDiagnostics` notification to the client.
fn send_diagnostics(
    connection: &Connection,
    uri: Uri,
    diagnostics: Vec<lsp_types::Diagnostic>,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = PublishDiagnosticsParams {
        uri,
        diagnostics,
        version: None,
    };
    let not = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
    connection.sender.send(Message::Notification(not))?;
    Ok(())
}
