//! `catcher tidy`: clean up values in catcher edits, offline.

use std::path::PathBuf;

use clap::Args;

use catcher_cli::tidy::{tidy_edits, TidyOp};
use catcher_io::{edits_to_json_string, DEFAULT_SEPARATOR};

use crate::common::{load_settings, read_edits, write};
use crate::CliError;

#[derive(Args)]
pub struct TidyArgs {
    /// Catcher JSON file
    pub edits: PathBuf,

    /// Collapse runs of whitespace in these fields (repeatable)
    #[arg(long, value_name = "NICK")]
    pub normalize_whitespace: Vec<String>,

    /// Replace curly quotes, special dashes and ellipses with ASCII
    #[arg(long, value_name = "NICK")]
    pub replace_smart_chars: Vec<String>,

    /// Write subject headings as Term--Subdivision without a final period
    #[arg(long, value_name = "NICK")]
    pub normalize_lcsh: Vec<String>,

    /// Deduplicate and sort the terms of these fields
    #[arg(long, value_name = "NICK")]
    pub sort_terms: Vec<String>,

    /// Joins multiple values of one field (default "; ")
    #[arg(long)]
    pub separator: Option<String>,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Suppress the summary on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl TidyArgs {
    fn operations(&self) -> Vec<(TidyOp, String)> {
        let groups = [
            (TidyOp::NormalizeWhitespace, &self.normalize_whitespace),
            (TidyOp::ReplaceSmartChars, &self.replace_smart_chars),
            (TidyOp::NormalizeLcsh, &self.normalize_lcsh),
            (TidyOp::SortTerms, &self.sort_terms),
        ];
        groups
            .into_iter()
            .flat_map(|(op, nicks)| nicks.iter().map(move |nick| (op, nick.clone())))
            .collect()
    }
}

pub fn cmd_tidy(args: TidyArgs) -> Result<(), CliError> {
    let ops = args.operations();
    if ops.is_empty() {
        return Err(CliError::args("no tidy operation given")
            .with_hint("e.g. --normalize-whitespace title (see catcher tidy --help)"));
    }

    let settings = load_settings()?;
    let separator = args
        .separator
        .clone()
        .or(settings.separator)
        .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());

    let (mut edits, nick_order) = read_edits(&args.edits)?;
    let changed = tidy_edits(&mut edits, &ops, &separator);

    let json = edits_to_json_string(&edits, &nick_order).map_err(|e| CliError::internal(e.to_string()))?;
    write(args.output.as_ref(), json.as_bytes())?;

    if !args.quiet {
        eprintln!("{} edits, {} values changed", edits.len(), changed);
    }
    Ok(())
}
