//! Helpers shared by the subcommands: settings, dialect flags, loading
//! tables, mappings and edits, and writing output.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};

use catcher_api_client::CdmClient;
use catcher_config::Settings;
use catcher_io::{
    read_edits_json, write_output, FieldMapping, TableOptions, TableReader, TableRow,
    DEFAULT_SEPARATOR,
};
use catcher_recon::CatcherEdit;

use crate::util::delimiter_byte;
use crate::CliError;

// ── Flags ───────────────────────────────────────────────────────────

/// Table dialect and multi-value separator.
#[derive(Args, Debug, Clone, Default)]
pub struct DialectArgs {
    /// Table delimiter (default ",")
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Table encoding label, e.g. utf-8, windows-1252 (default: UTF-8, falling back to Windows-1252)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Joins multiple values of one field (default "; ")
    #[arg(long)]
    pub separator: Option<String>,
}

impl DialectArgs {
    /// Table options from flags, falling back to the settings file.
    pub fn options(&self, settings: &Settings) -> Result<TableOptions, CliError> {
        let mut options = TableOptions::default();

        if let Some(delimiter) = self.delimiter.or(settings.delimiter) {
            options.delimiter = delimiter_byte(delimiter)
                .ok_or_else(|| CliError::args(format!("delimiter must be an ASCII character, got '{delimiter}'")))?;
        }
        if let Some(label) = self.encoding.as_deref().or(settings.encoding.as_deref()) {
            options = options.with_encoding_label(label).map_err(|e| {
                CliError::args(e.to_string()).with_hint("try utf-8, windows-1252 or latin1")
            })?;
        }
        options.separator = self.separator(settings);
        Ok(options)
    }

    pub fn separator(&self, settings: &Settings) -> String {
        self.separator
            .clone()
            .or_else(|| settings.separator.clone())
            .unwrap_or_else(|| DEFAULT_SEPARATOR.to_string())
    }
}

/// Collection management server location.
#[derive(Args, Debug, Clone)]
pub struct CdmArgs {
    /// Server base URL
    #[arg(long, env = "CATCHER_CDM_URL")]
    pub cdm_url: Option<String>,

    /// Collection alias
    #[arg(long)]
    pub alias: String,
}

impl CdmArgs {
    pub fn client(&self, settings: &Settings) -> Result<CdmClient, CliError> {
        let url = resolve_url(self.cdm_url.as_deref(), settings.cdm_url.as_deref(), "--cdm-url", "CATCHER_CDM_URL")?;
        CdmClient::new(&url).map_err(CliError::remote)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Table,
}

// ── Loading ─────────────────────────────────────────────────────────

pub fn load_settings() -> Result<Settings, CliError> {
    Settings::load().map_err(|e| {
        CliError::config(e.to_string()).with_hint(format!(
            "fix or remove the settings file (or point {} elsewhere)",
            catcher_config::SETTINGS_ENV
        ))
    })
}

/// A base URL from the flag or environment, else from settings.
pub fn resolve_url(
    flag: Option<&str>,
    setting: Option<&str>,
    flag_name: &str,
    env_name: &str,
) -> Result<String, CliError> {
    let url = flag
        .or(setting)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            CliError::args("no server URL given")
                .with_hint(format!("pass {flag_name}, set {env_name}, or add it to the settings file"))
        })?;
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(CliError::args(format!("{flag_name} must be an http(s) URL, got '{url}'")));
    }
    Ok(url.to_string())
}

pub fn load_mapping(path: &Path) -> Result<FieldMapping, CliError> {
    FieldMapping::load(path).map_err(|e| CliError::table(path, e))
}

/// Read every data row, failing on the first malformed one.
pub fn read_table(path: &Path, options: &TableOptions) -> Result<(Vec<String>, Vec<TableRow>), CliError> {
    let reader = TableReader::open(path, options).map_err(|e| CliError::table(path, e))?;
    let headers = reader.headers().to_vec();
    let rows = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::table(path, e))?;
    Ok((headers, rows))
}

/// Read a table and check that every mapped column is present.
pub fn read_mapped_table(
    path: &Path,
    mapping: &FieldMapping,
    options: &TableOptions,
) -> Result<(Vec<String>, Vec<TableRow>), CliError> {
    let (headers, rows) = read_table(path, options)?;
    mapping
        .check_columns(&headers)
        .map_err(|e| CliError::table(path, e))?;
    Ok((headers, rows))
}

/// Fail unless `column` is a header of the table at `path`.
pub fn require_column(path: &Path, headers: &[String], column: &str) -> Result<(), CliError> {
    if headers.iter().any(|h| h == column) {
        Ok(())
    } else {
        Err(CliError::parse(format!("{}: no column named '{column}'", path.display())))
    }
}

pub fn read_edits(path: &Path) -> Result<(Vec<CatcherEdit>, Vec<String>), CliError> {
    read_edits_json(path).map_err(|e| CliError::table(path, e))
}

/// Every edit must carry a pointer; report all that do not.
pub fn require_pointers(path: &Path, edits: &[CatcherEdit]) -> Result<(), CliError> {
    let missing: Vec<String> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| e.pointer.is_none())
        .map(|(i, _)| (i + 1).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CliError::parse(format!(
            "{}: edit(s) without record-pointer: {}",
            path.display(),
            missing.join(", ")
        ))
        .with_hint("run `catcher reconcile` first to attach pointers"))
    }
}

// ── Output ──────────────────────────────────────────────────────────

pub fn write(output: Option<&PathBuf>, bytes: &[u8]) -> Result<(), CliError> {
    write_output(output.map(PathBuf::as_path), bytes).map_err(|e| match output {
        Some(path) => CliError::table(path, e),
        None => CliError::io(e.to_string()),
    })
}

pub fn csv_bytes(headers: &[&str], rows: &[Vec<String>], delimiter: u8) -> Result<Vec<u8>, CliError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(headers)
        .map_err(|e| CliError::io(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row)
            .map_err(|e| CliError::io(e.to_string()))?;
    }
    writer.into_inner().map_err(|e| CliError::io(e.to_string()))
}

pub fn json_bytes(value: &serde_json::Value) -> Result<Vec<u8>, CliError> {
    let mut text = serde_json::to_string_pretty(value).map_err(|e| CliError::internal(e.to_string()))?;
    text.push('\n');
    Ok(text.into_bytes())
}

/// Render rows as JSON objects, CSV or an aligned table.
pub fn render(
    format: OutputFormat,
    headers: &[&str],
    rows: &[Vec<String>],
    delimiter: u8,
) -> Result<Vec<u8>, CliError> {
    match format {
        OutputFormat::Json => {
            let objects: Vec<serde_json::Value> = rows
                .iter()
                .map(|row| {
                    let object: serde_json::Map<String, serde_json::Value> = headers
                        .iter()
                        .zip(row)
                        .map(|(h, v)| (h.to_string(), serde_json::Value::String(v.clone())))
                        .collect();
                    serde_json::Value::Object(object)
                })
                .collect();
            json_bytes(&serde_json::Value::Array(objects))
        }
        OutputFormat::Csv => csv_bytes(headers, rows, delimiter),
        OutputFormat::Table => Ok(crate::util::render_table(headers, rows).into_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_flag_beats_setting() {
        let url = resolve_url(Some("https://a.org"), Some("https://b.org"), "--cdm-url", "X").unwrap();
        assert_eq!(url, "https://a.org");
        let url = resolve_url(None, Some("https://b.org"), "--cdm-url", "X").unwrap();
        assert_eq!(url, "https://b.org");
    }

    #[test]
    fn url_missing_or_not_http() {
        let err = resolve_url(None, None, "--cdm-url", "CATCHER_CDM_URL").unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_USAGE);
        assert!(err.hint.unwrap().contains("CATCHER_CDM_URL"));
        assert!(resolve_url(Some("cdm.example.org"), None, "--cdm-url", "X").is_err());
    }

    #[test]
    fn dialect_falls_back_to_settings() {
        let settings = Settings {
            separator: Some(" | ".into()),
            delimiter: Some('\t'),
            ..Settings::default()
        };
        let options = DialectArgs::default().options(&settings).unwrap();
        assert_eq!(options.delimiter, b'\t');
        assert_eq!(options.separator, " | ");

        let args = DialectArgs {
            separator: Some(";".into()),
            ..DialectArgs::default()
        };
        assert_eq!(args.options(&settings).unwrap().separator, ";");
    }

    #[test]
    fn pointers_required() {
        let edits = vec![CatcherEdit::pointer_only("1"), CatcherEdit::default(), CatcherEdit::default()];
        let err = require_pointers(Path::new("e.json"), &edits).unwrap_err();
        assert!(err.message.ends_with("2, 3"));
    }

    #[test]
    fn render_json_objects() {
        let bytes = render(
            OutputFormat::Json,
            &["alias", "name"],
            &[vec!["coll".into(), "Letters".into()]],
            b',',
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, serde_json::json!([{"alias": "coll", "name": "Letters"}]));
    }
}
