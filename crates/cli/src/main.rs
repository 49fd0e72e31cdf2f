mod check;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Language server and offline checker for Tekton YAML resources.
#[derive(Parser)]
#[command(
    name = "tekton-ls",
    version,
    about = "Language server for Tekton Pipelines YAML"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log verbosity on stderr: 0=error, 1=info, 2=debug, 3=trace.
    /// RUST_LOG takes precedence when set.
    #[arg(long, global = true, default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=3))]
    log_level: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Language Server Protocol server (stdio unless --tcp)
    Lsp {
        /// Listen on this address and serve the first client, e.g. 127.0.0.1:9257
        #[arg(long)]
        tcp: Option<String>,
    },

    /// Validate Tekton YAML files or directories without an editor
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    match cli.command.unwrap_or(Commands::Lsp { tcp: None }) {
        Commands::Lsp { tcp } => cmd_lsp(tcp.as_deref()),
        Commands::Check { paths } => check::cmd_check(&paths, cli.output, cli.quiet),
    }
}

/// Install the stderr subscriber. stdout is reserved for the protocol.
fn init_logging(level: u8) {
    let default = match level {
        0 => "error",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn cmd_lsp(tcp: Option<&str>) {
    let result = match tcp {
        Some(addr) => {
            info!(%addr, "waiting for client");
            tekton_lsp::server::run_tcp(addr)
        }
        None => tekton_lsp::run(),
    };
    if let Err(e) = result {
        eprintln!("LSP server error: {}", e);
        process::exit(1);
    }
}

/// Print an error message to stderr in the selected format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
