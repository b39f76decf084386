// catcher CLI - build, check and clean catcher batch edits

mod combine;
mod common;
mod diff_cmd;
mod exit_codes;
mod ftp;
mod info;
mod progress;
mod reconcile;
mod tidy_cmd;
mod transpose;
mod util;

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use catcher_io::TableError;
use catcher_recon::{ReconError, RemoteError};

use exit_codes::{
    recon_exit_code, remote_exit_code, table_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_IO,
    EXIT_PARSE, EXIT_SUCCESS, EXIT_USAGE,
};

/// Log filter variable, e.g. `CATCHER_LOG=debug`.
const LOG_ENV: &str = "CATCHER_LOG";

#[derive(Parser)]
#[command(name = "catcher")]
#[command(about = "Turn metadata spreadsheets into catcher batch edits for a digital collection")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a metadata table against a collection and write catcher JSON
    #[command(after_help = "\
Examples:
  catcher reconcile items.csv mapping.csv --config coll.recon.toml -o edits.json
  catcher reconcile items.csv mapping.csv --cdm-url https://cdm.example.org --alias coll --identifier identi
  catcher reconcile pages.csv mapping.csv --config coll.recon.toml --mode page --page-column Page
  catcher reconcile items.csv mapping.csv          # plain transposition, no pointers")]
    Reconcile(reconcile::ReconcileArgs),

    /// Convert between metadata tables and catcher JSON without contacting a server
    #[command(subcommand)]
    Transpose(transpose::TransposeCommands),

    /// Compare catcher edits with the items' current metadata
    #[command(after_help = "\
Examples:
  catcher diff edits.json --cdm-url https://cdm.example.org --alias coll
  catcher diff edits.json --alias coll --all --format csv > review.csv")]
    Diff(diff_cmd::DiffArgs),

    /// Append edit terms to the items' current terms
    #[command(after_help = "\
Examples:
  catcher combine subjects.json --cdm-url https://cdm.example.org --alias coll -o combined.json")]
    Combine(combine::CombineArgs),

    /// Clean up values in catcher edits
    #[command(after_help = "\
Examples:
  catcher tidy edits.json --normalize-whitespace title --replace-smart-chars descri
  catcher tidy edits.json --normalize-lcsh subjec --sort-terms subjec -o tidy.json")]
    Tidy(tidy_cmd::TidyArgs),

    /// Show collections and field schemas
    #[command(subcommand)]
    Info(info::InfoCommands),

    /// Build page-level edits from a transcription platform collection
    #[command(subcommand)]
    Ftp(ftp::FtpCommands),
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PARSE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Error reading or writing `path`, prefixed with the path.
    pub fn table(path: &Path, err: TableError) -> Self {
        Self {
            code: table_exit_code(&err),
            message: format!("{}: {}", path.display(), err),
            hint: None,
        }
    }

    /// Failure that is not the user's input, e.g. serializing output.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn remote(err: RemoteError) -> Self {
        Self { code: remote_exit_code(&err), message: err.to_string(), hint: remote_hint(&err) }
    }

    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::Mismatch { .. } => {
                Some("fix the identifiers in the table or in the collection, then rerun".to_string())
            }
            ReconError::RowCollision { .. } => {
                Some("use --mode page with a page column to target individual pages".to_string())
            }
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Some("nothing was sent to the server".to_string())
            }
            ReconError::Remote(e) => remote_hint(e),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Prefix the message with what was being processed.
    pub fn context(mut self, context: impl std::fmt::Display) -> Self {
        self.message = format!("{}: {}", context, self.message);
        self
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn remote_hint(err: &RemoteError) -> Option<String> {
    match err {
        RemoteError::Transport(_) => Some("check the server URL and your network connection".to_string()),
        RemoteError::Malformed(_) => Some("is the URL the server root, without /dmwebservices?".to_string()),
        _ => None,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Reconcile(args) => reconcile::cmd_reconcile(args),
        Commands::Transpose(cmd) => transpose::cmd_transpose(cmd),
        Commands::Diff(args) => diff_cmd::cmd_diff(args),
        Commands::Combine(args) => combine::cmd_combine(args),
        Commands::Tidy(args) => tidy_cmd::cmd_tidy(args),
        Commands::Info(cmd) => info::cmd_info(cmd),
        Commands::Ftp(cmd) => ftp::cmd_ftp(cmd),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
