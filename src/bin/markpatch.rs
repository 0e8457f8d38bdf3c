//! markpatch -- apply marker-driven patches from the command line.
//!
//! Usage:
//!   markpatch apply <DOCUMENT> [--output <FILE>] [--diff] [--quiet]
//!   markpatch file <TARGET> --pattern <P> --patch <T> [--dry-run]
//!   markpatch serve [--workspace <DIR>]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use markpatch::document::PatchDocument;
use markpatch::report::render_report;
use markpatch::server::McpServerConfig;
use markpatch::util::atomic::atomic_write;

#[derive(Parser)]
#[command(name = "markpatch")]
#[command(about = "Insert or replace text at a position located by a match pattern", long_about = None)]
#[command(version)]
struct Cli {
    /// Log matching decisions to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a Markdown patch document and print the report
    Apply {
        /// Markdown file with `Source file`, `match:` and `patch` sections
        document: PathBuf,

        /// Write the modified source to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print a unified diff instead of the report
        #[arg(short, long)]
        diff: bool,

        /// Print only the modified source
        #[arg(short, long, conflicts_with = "diff")]
        quiet: bool,
    },

    /// Patch a file in place
    File {
        /// File to edit
        target: PathBuf,

        /// Match pattern (`...`, `>>>`, `<<<`)
        #[arg(short, long)]
        pattern: String,

        /// Text to insert or substitute
        #[arg(long)]
        patch: String,

        /// Show the diff without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Run the MCP server on stdin/stdout
    Serve {
        /// Directory that file-based tools are confined to
        #[arg(short, long, default_value = ".")]
        workspace: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Apply {
            document,
            output,
            diff,
            quiet,
        } => cmd_apply(&document, output.as_deref(), diff, quiet),

        Commands::File {
            target,
            pattern,
            patch,
            dry_run,
        } => cmd_file(&target, &pattern, &patch, dry_run),

        Commands::Serve { workspace } => {
            let workspace = workspace
                .canonicalize()
                .with_context(|| format!("invalid workspace {}", workspace.display()))?;
            markpatch::run_mcp_server(McpServerConfig { workspace })?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Tracing goes to stderr so stdout stays clean for reports and MCP.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_apply(document: &Path, output: Option<&Path>, diff: bool, quiet: bool) -> Result<ExitCode> {
    let doc = PatchDocument::load(document)?;
    let outcome = doc.apply();

    if quiet {
        println!("{}", outcome.text());
    } else if diff {
        print!("{}", outcome.diff(&document.display().to_string()));
    } else {
        println!("{}", render_report(&doc, &outcome));
    }

    if let Some(error) = outcome.error() {
        warn!(document = %document.display(), error = %error, "patch not applied");
        return Ok(ExitCode::FAILURE);
    }

    if let Some(output) = output {
        atomic_write(output, outcome.text())
            .with_context(|| format!("failed to write {}", output.display()))?;
        info!(path = %output.display(), "wrote modified source");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_file(target: &Path, pattern: &str, patch: &str, dry_run: bool) -> Result<ExitCode> {
    let original = std::fs::read_to_string(target)
        .with_context(|| format!("failed to read {}", target.display()))?;

    let outcome = markpatch::apply(&original, pattern, patch);
    if let Some(e) = outcome.error() {
        eprintln!("patch not applied to {}: {e}", target.display());
        return Ok(ExitCode::FAILURE);
    }

    print!("{}", outcome.diff(&target.display().to_string()));

    if !dry_run {
        atomic_write(target, outcome.text())?;
        info!(path = %target.display(), "patched file");
    }
    Ok(ExitCode::SUCCESS)
}
