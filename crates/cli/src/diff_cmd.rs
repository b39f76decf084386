//! `catcher diff`: what a batch of edits would change.

use std::path::PathBuf;

use clap::Args;

use catcher_cli::diff::{compare, summarize, FieldStatus};

use crate::common::{load_settings, read_edits, render, require_pointers, write, CdmArgs, OutputFormat};
use crate::progress::StderrProgress;
use crate::util::delimiter_byte;
use crate::CliError;

#[derive(Args)]
pub struct DiffArgs {
    /// Catcher JSON file
    pub edits: PathBuf,

    #[command(flatten)]
    pub cdm: CdmArgs,

    /// Include fields whose value would not change
    #[arg(long)]
    pub all: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Delimiter for csv output
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Suppress progress and the summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

const HEADERS: [&str; 5] = ["record-pointer", "field", "status", "current", "proposed"];

pub fn cmd_diff(args: DiffArgs) -> Result<(), CliError> {
    let settings = load_settings()?;
    let delimiter = delimiter_byte(args.delimiter)
        .ok_or_else(|| CliError::args("delimiter must be an ASCII character"))?;
    let (edits, _) = read_edits(&args.edits)?;
    require_pointers(&args.edits, &edits)?;

    let client = args.cdm.client(&settings)?;
    let progress = StderrProgress::new(args.quiet);

    let mut diffs = Vec::new();
    for (i, edit) in edits.iter().enumerate() {
        let Some(pointer) = edit.pointer.as_deref() else {
            continue;
        };
        let current = client
            .item_info(&args.cdm.alias, pointer)
            .map_err(|e| CliError::remote(e).context(format!("item {pointer}")))?;
        diffs.extend(compare(edit, pointer, &current));
        progress.note(format!("[{}/{}] item {pointer}", i + 1, edits.len()));
    }

    let summary = summarize(edits.len(), &diffs);
    let rows: Vec<Vec<String>> = diffs
        .iter()
        .filter(|d| args.all || d.status != FieldStatus::Same)
        .map(|d| {
            vec![
                d.pointer.clone(),
                d.field.clone(),
                d.status.as_str().to_string(),
                d.current.clone().unwrap_or_default(),
                d.proposed.clone(),
            ]
        })
        .collect();

    write(args.output.as_ref(), &render(args.format, &HEADERS, &rows, delimiter)?)?;

    if !args.quiet {
        eprintln!(
            "{} items: {} changed, {} unchanged, {} unknown fields",
            summary.items, summary.changed, summary.same, summary.unknown
        );
    }
    Ok(())
}
