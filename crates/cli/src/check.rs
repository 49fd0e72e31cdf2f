//! `tekton-ls check`: offline validation of files and directories.

use std::path::{Path, PathBuf};
use std::process;

use serde::Serialize;
use tekton_core::{Diagnostic, Severity};
use tracing::debug;

use crate::{report_error, OutputFormat};

#[derive(Debug, Serialize)]
struct FileReport {
    path: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

pub(crate) fn cmd_check(paths: &[PathBuf], output: OutputFormat, quiet: bool) {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(tekton_lsp::workspace::yaml_files(path));
        } else {
            files.push(path.clone());
        }
    }

    let mut reports = Vec::with_capacity(files.len());
    let mut unreadable = 0;
    for file in files {
        match check_file(&file) {
            Ok(diagnostics) => reports.push(FileReport {
                path: file,
                diagnostics,
            }),
            Err(e) => {
                report_error(
                    &format!("cannot read {}: {}", file.display(), e),
                    output,
                    quiet,
                );
                unreadable += 1;
            }
        }
    }

    let count = |severity: Severity| {
        reports
            .iter()
            .flat_map(|r| &r.diagnostics)
            .filter(|d| d.severity == severity)
            .count()
    };
    let errors = count(Severity::Error);
    let warnings = count(Severity::Warning);

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&reports)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            for report in &reports {
                for d in &report.diagnostics {
                    println!(
                        "{}:{}:{}: {}: {}",
                        report.path.display(),
                        d.range.start.line + 1,
                        d.range.start.character + 1,
                        d.severity,
                        d.message
                    );
                }
            }
            if !quiet {
                println!(
                    "{} file(s) checked: {} error(s), {} warning(s)",
                    reports.len(),
                    errors,
                    warnings
                );
            }
        }
    }

    if errors > 0 || unreadable > 0 {
        process::exit(1);
    }
}

/// Diagnostics for one file. Text the parser rejects (empty files) has
/// nothing to report, as in the editor.
fn check_file(path: &Path) -> std::io::Result<Vec<Diagnostic>> {
    let text = std::fs::read_to_string(path)?;
    let uri = tekton_lsp::workspace::path_to_uri(path);
    Ok(match tekton_core::build_document(&uri, &text) {
        Ok(doc) => tekton_core::validate(&doc),
        Err(err) => {
            debug!(path = %path.display(), %err, "nothing to check");
            Vec::new()
        }
    })
}
