//! `catcher reconcile`: table rows matched to collection records by
//! identifier, written as catcher JSON with record pointers.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use catcher_api_client::CdmClient;
use catcher_config::Settings;
use catcher_io::edits_to_json_string;
use catcher_recon::{reconcile, LocalRow, MatchMode, ReconConfig};

use crate::common::{
    load_mapping, load_settings, read_mapped_table, require_column, write, DialectArgs,
};
use crate::progress::StderrProgress;
use crate::transpose::plain_edits;
use crate::CliError;

#[derive(Args)]
pub struct ReconcileArgs {
    /// Metadata table
    pub table: PathBuf,

    /// Field mapping CSV (`name`, `nick`)
    pub mapping: PathBuf,

    /// Reconciliation config (TOML); flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Server base URL
    #[arg(long, env = "CATCHER_CDM_URL")]
    pub cdm_url: Option<String>,

    /// Collection alias
    #[arg(long)]
    pub alias: Option<String>,

    /// Field nick that joins rows to records
    #[arg(long)]
    pub identifier: Option<String>,

    /// One edit per item (object) or per page of a compound item (page)
    #[arg(long)]
    pub mode: Option<MatchMode>,

    /// Table column with 1-based page positions (page mode)
    #[arg(long)]
    pub page_column: Option<String>,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub dialect: DialectArgs,

    /// Suppress progress on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl ReconcileArgs {
    /// Any reconciliation parameter given. The server URL alone does not
    /// count since it often comes from the environment.
    fn wants_reconciliation(&self) -> bool {
        self.config.is_some()
            || self.alias.is_some()
            || self.identifier.is_some()
            || self.mode.is_some()
            || self.page_column.is_some()
    }
}

pub fn cmd_reconcile(args: ReconcileArgs) -> Result<(), CliError> {
    let settings = load_settings()?;
    let options = args.dialect.options(&settings)?;
    let mapping = load_mapping(&args.mapping)?;

    // Config problems surface before any table parsing or network use.
    let config = if args.wants_reconciliation() {
        Some(build_config(&args, &settings)?)
    } else {
        None
    };

    let (headers, rows) = read_mapped_table(&args.table, &mapping, &options)?;
    let nicks = mapping.nicks();

    let edits = match &config {
        None => {
            info!(rows = rows.len(), "no reconciliation parameters, transposing");
            plain_edits(&rows, &mapping, &options.separator, None)
        }
        Some(config) => {
            if !nicks.contains(&config.identifier) {
                return Err(CliError::config(format!(
                    "identifier field '{}' is not mapped to any column",
                    config.identifier
                ))
                .with_hint(format!("add a row with nick '{}' to {}", config.identifier, args.mapping.display())));
            }
            let page_column = config
                .page_position_column
                .as_deref()
                .filter(|_| config.mode == MatchMode::Page);
            if let Some(col) = page_column {
                require_column(&args.table, &headers, col)?;
            }

            let local = rows
                .iter()
                .map(|row| {
                    LocalRow::from_fields(
                        row.row_number,
                        mapping.apply(row, &options.separator),
                        &config.identifier,
                        page_column.map(|col| row.get(col).unwrap_or("")),
                    )
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(CliError::recon)?;

            let client = CdmClient::new(&config.cdm_url).map_err(CliError::remote)?;
            let mut progress = StderrProgress::new(args.quiet);
            reconcile(&local, &client, config, &mut progress).map_err(CliError::recon)?
        }
    };

    let json = edits_to_json_string(&edits, &nicks).map_err(|e| CliError::internal(e.to_string()))?;
    write(args.output.as_ref(), json.as_bytes())
}

/// Config file values, overridden by flags (and `CATCHER_CDM_URL`); the
/// server URL falls back to the settings file.
fn build_config(args: &ReconcileArgs, settings: &Settings) -> Result<ReconConfig, CliError> {
    let mut table = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| CliError::io(format!("cannot read {}: {e}", path.display())))?;
            text.parse::<toml::Table>()
                .map_err(|e| CliError::config(format!("{}: {e}", path.display())))?
        }
        None => toml::Table::new(),
    };

    let overrides = [
        ("cdm_url", args.cdm_url.clone()),
        ("alias", args.alias.clone()),
        ("identifier", args.identifier.clone()),
        ("mode", args.mode.map(|m| m.to_string())),
        ("page_position_column", args.page_column.clone()),
    ];
    for (key, value) in overrides {
        if let Some(value) = value {
            table.insert(key.to_string(), toml::Value::String(value));
        }
    }
    if !table.contains_key("cdm_url") {
        if let Some(url) = &settings.cdm_url {
            table.insert("cdm_url".to_string(), toml::Value::String(url.clone()));
        }
    }

    let merged = toml::to_string(&table).map_err(|e| CliError::config(e.to_string()))?;
    ReconConfig::from_toml(&merged).map_err(|e| match &args.config {
        Some(path) => CliError::recon(e).context(path.display()),
        None => CliError::recon(e),
    })
}
