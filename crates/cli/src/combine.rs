//! `catcher combine`: append edit terms to the items' current terms.

use std::collections::BTreeMap;
use std::path::PathBuf;

use clap::Args;

use catcher_cli::terms::append_terms;
use catcher_io::{edits_to_json_string, DEFAULT_SEPARATOR};
use catcher_recon::CatcherEdit;

use crate::common::{load_settings, read_edits, require_pointers, write, CdmArgs};
use crate::progress::StderrProgress;
use crate::CliError;

#[derive(Args)]
pub struct CombineArgs {
    /// Catcher JSON file
    pub edits: PathBuf,

    #[command(flatten)]
    pub cdm: CdmArgs,

    /// Joins multiple values of one field (default "; ")
    #[arg(long)]
    pub separator: Option<String>,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Suppress progress on stderr
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

pub fn cmd_combine(args: CombineArgs) -> Result<(), CliError> {
    let settings = load_settings()?;
    let separator = args
        .separator
        .clone()
        .or_else(|| settings.separator.clone())
        .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string());
    let (edits, nick_order) = read_edits(&args.edits)?;
    require_pointers(&args.edits, &edits)?;

    let client = args.cdm.client(&settings)?;
    let progress = StderrProgress::new(args.quiet);

    let mut combined = Vec::with_capacity(edits.len());
    for (i, edit) in edits.iter().enumerate() {
        let Some(pointer) = edit.pointer.as_deref() else {
            continue;
        };
        let current = client
            .item_info(&args.cdm.alias, pointer)
            .map_err(|e| CliError::remote(e).context(format!("item {pointer}")))?;
        combined.push(combine_with_current(edit, &current, &separator));
        progress.note(format!("[{}/{}] item {pointer}", i + 1, edits.len()));
    }

    let json = edits_to_json_string(&combined, &nick_order).map_err(|e| CliError::internal(e.to_string()))?;
    write(args.output.as_ref(), json.as_bytes())
}

/// Each edit field becomes the current terms followed by the edit's new
/// ones. Fields with no edit value keep the current value.
pub fn combine_with_current(
    edit: &CatcherEdit,
    current: &BTreeMap<String, String>,
    separator: &str,
) -> CatcherEdit {
    let fields = edit
        .fields
        .iter()
        .map(|(nick, value)| {
            let existing = current.get(nick).map(String::as_str).unwrap_or("");
            let merged = append_terms(existing, value.as_deref().unwrap_or(""), separator);
            (nick.clone(), Some(merged))
        })
        .collect();
    CatcherEdit::new(edit.pointer.clone(), fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn appends_new_terms_after_current() {
        let mut edit = CatcherEdit::pointer_only("7");
        edit.fields.insert("subjec".into(), Some("Rivers; Lakes".into()));
        let out = combine_with_current(&edit, &current(&[("subjec", "Maps; Rivers")]), "; ");
        assert_eq!(out.pointer.as_deref(), Some("7"));
        assert_eq!(out.value("subjec"), "Maps; Rivers; Lakes");
    }

    #[test]
    fn empty_edit_value_keeps_current() {
        let mut edit = CatcherEdit::pointer_only("7");
        edit.fields.insert("subjec".into(), None);
        edit.fields.insert("creato".into(), Some("Smith, J.".into()));
        let out = combine_with_current(&edit, &current(&[("subjec", "Maps")]), "; ");
        assert_eq!(out.value("subjec"), "Maps");
        assert_eq!(out.value("creato"), "Smith, J.");
    }
}
