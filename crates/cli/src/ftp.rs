//! `catcher ftp`: page-level edits from a transcription collection.
//!
//! Each FromThePage work names the collection item it was imported from.
//! Its pages are matched to that item's child pages by position.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use tracing::warn;

use catcher_api_client::ftp::STRUCTURED_DATA_LABEL;
use catcher_api_client::{cdm_pointer_from_source, CdmClient, FtpClient, FtpPage, FtpWork};
use catcher_config::Settings;
use catcher_io::{edits_to_json_string, FieldMapping, TableRow, DEFAULT_SEPARATOR};
use catcher_recon::{resolve_page_pointer, Catalog, CatcherEdit, FieldValues, ReconError, RemoteRecord};

use crate::common::{load_mapping, load_settings, resolve_url, write, CdmArgs};
use crate::progress::StderrProgress;
use crate::CliError;

/// Rendering used for transcripts unless `--rendering` says otherwise.
pub const DEFAULT_RENDERING: &str = "Verbatim Plaintext";

#[derive(Subcommand)]
pub enum FtpCommands {
    /// Structured field data of every page, mapped to field nicks
    #[command(after_help = "\
Examples:
  catcher ftp fields libraries/letters ftp-mapping.csv --alias coll -o fields.json
  catcher ftp fields libraries/letters ftp-mapping.csv --ftp-url https://fromthepage.com --alias coll")]
    Fields {
        /// Collection slug, e.g. `owner/collection`
        collection: String,

        /// Mapping CSV from field labels (`name`) to nicks (`nick`)
        mapping: PathBuf,

        /// Joins multiple values of one field (default "; ")
        #[arg(long)]
        separator: Option<String>,

        #[command(flatten)]
        run: FtpRun,
    },

    /// Rendered transcript of every page, into one field
    #[command(after_help = "\
Examples:
  catcher ftp transcripts libraries/letters --alias coll --field transc -o transcripts.json
  catcher ftp transcripts libraries/letters --alias coll --rendering 'Searchable Plaintext'")]
    Transcripts {
        /// Collection slug, e.g. `owner/collection`
        collection: String,

        /// Field nick receiving the transcript
        #[arg(long, default_value = "transc")]
        field: String,

        /// Rendering label to download
        #[arg(long, default_value = DEFAULT_RENDERING)]
        rendering: String,

        #[command(flatten)]
        run: FtpRun,
    },
}

#[derive(Args)]
pub struct FtpRun {
    /// Transcription platform base URL
    #[arg(long, env = "CATCHER_FTP_URL")]
    pub ftp_url: Option<String>,

    #[command(flatten)]
    pub cdm: CdmArgs,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Suppress progress on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// What to take from each page.
enum PageSource<'a> {
    Fields { mapping: &'a FieldMapping, separator: &'a str },
    Transcript { field: &'a str, rendering: &'a str },
}

pub fn cmd_ftp(cmd: FtpCommands) -> Result<(), CliError> {
    let settings = load_settings()?;
    match cmd {
        FtpCommands::Fields { collection, mapping, separator, run } => {
            let mapping = load_mapping(&mapping)?;
            let separator = separator
                .or_else(|| settings.separator.clone())
                .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
            let source = PageSource::Fields { mapping: &mapping, separator: &separator };
            let edits = collect_edits(&collection, &run, &settings, &source)?;
            emit(&run, &edits, &mapping.nicks())
        }
        FtpCommands::Transcripts { collection, field, rendering, run } => {
            let source = PageSource::Transcript { field: &field, rendering: &rendering };
            let edits = collect_edits(&collection, &run, &settings, &source)?;
            emit(&run, &edits, &[field.clone()])
        }
    }
}

fn emit(run: &FtpRun, edits: &[CatcherEdit], nick_order: &[String]) -> Result<(), CliError> {
    let json = edits_to_json_string(edits, nick_order).map_err(|e| CliError::internal(e.to_string()))?;
    write(run.output.as_ref(), json.as_bytes())
}

fn collect_edits(
    collection: &str,
    run: &FtpRun,
    settings: &Settings,
    source: &PageSource<'_>,
) -> Result<Vec<CatcherEdit>, CliError> {
    let ftp_url = resolve_url(run.ftp_url.as_deref(), settings.ftp_url.as_deref(), "--ftp-url", "CATCHER_FTP_URL")?;
    let ftp = FtpClient::new(&ftp_url).map_err(CliError::remote)?;
    let cdm = run.cdm.client(settings)?;
    let progress = StderrProgress::new(run.quiet);

    let manifests = ftp
        .collection_manifests(collection)
        .map_err(|e| CliError::remote(e).context(format!("collection {collection}")))?;
    progress.note(format!("found {} works", manifests.len()));

    let mut edits = Vec::new();
    for (i, manifest) in manifests.iter().enumerate() {
        let work = ftp
            .work(&manifest.url)
            .map_err(|e| CliError::remote(e).context(&manifest.url))?;
        let Some(record) = item_record(&cdm, &run.cdm.alias, &work)? else {
            warn!(work = %work.label, "no source item, skipped");
            progress.note(format!("[{}/{}] {}: no source item, skipped", i + 1, manifests.len(), work.label));
            continue;
        };

        if work.pages.len() > record.page_pointers.len() {
            let err = ReconError::PageOutOfRange {
                identifier: record.identifier.clone(),
                position: work.pages.len(),
                page_count: record.page_pointers.len(),
            };
            return Err(CliError::recon(err).context(format!("work '{}'", work.label)));
        }

        let before = edits.len();
        for (index, page) in work.pages.iter().enumerate() {
            let pointer = resolve_page_pointer(&record, index + 1).map_err(CliError::recon)?;
            if let Some(fields) = page_fields(&ftp, page, source)? {
                edits.push(CatcherEdit::new(Some(pointer.to_string()), fields));
            }
        }
        if record.page_pointers.len() > work.pages.len() {
            warn!(
                work = %work.label,
                item_pages = record.page_pointers.len(),
                work_pages = work.pages.len(),
                "item has more pages than the work"
            );
        }
        progress.note(format!(
            "[{}/{}] {}: {} page edits",
            i + 1,
            manifests.len(),
            work.label,
            edits.len() - before
        ));
    }
    Ok(edits)
}

/// The source item of a work with its child page pointers, or `None` when
/// the work does not name one.
fn item_record(cdm: &CdmClient, alias: &str, work: &FtpWork) -> Result<Option<RemoteRecord>, CliError> {
    let Some(pointer) = work.source.as_deref().and_then(cdm_pointer_from_source) else {
        return Ok(None);
    };
    let page_pointers = cdm
        .child_pointers(alias, &pointer)
        .map_err(|e| CliError::remote(e).context(format!("item {pointer}")))?;
    let mut record = RemoteRecord::new(pointer.clone(), pointer, true);
    record.page_pointers = page_pointers;
    Ok(Some(record))
}

/// Field values for one page; `None` for pages with nothing to take.
fn page_fields(
    ftp: &FtpClient,
    page: &FtpPage,
    source: &PageSource<'_>,
) -> Result<Option<FieldValues>, CliError> {
    match source {
        PageSource::Fields { mapping, separator } => {
            let Some(url) = page.rendering(STRUCTURED_DATA_LABEL) else {
                return Ok(None);
            };
            let pairs = ftp
                .structured_data(url)
                .map_err(|e| CliError::remote(e).context(url))?;
            Ok(Some(mapping.apply(&structured_row(pairs, separator), separator)))
        }
        PageSource::Transcript { field, rendering } => {
            let Some(url) = page.rendering(rendering) else {
                let available: Vec<&str> = page.rendering_labels().collect();
                return Err(CliError::parse(format!("page '{}' has no '{rendering}' rendering", page.label))
                    .with_hint(format!("available: {}", available.join(", "))));
            };
            let text = ftp.text(url).map_err(|e| CliError::remote(e).context(url))?;
            let mut fields = FieldValues::new();
            fields.insert(field.to_string(), Some(text.trim().to_string()));
            Ok(Some(fields))
        }
    }
}

/// Label/value pairs as a table row; repeated labels are joined with `separator`.
fn structured_row(pairs: Vec<(String, String)>, separator: &str) -> TableRow {
    let mut values: HashMap<String, String> = HashMap::new();
    for (label, value) in pairs {
        match values.get_mut(&label) {
            Some(existing) if !value.is_empty() => {
                if !existing.is_empty() {
                    existing.push_str(separator);
                }
                existing.push_str(&value);
            }
            Some(_) => {}
            None => {
                values.insert(label, value);
            }
        }
    }
    TableRow { row_number: 0, values }
}
