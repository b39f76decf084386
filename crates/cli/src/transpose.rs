//! `catcher transpose`: table ⇄ catcher JSON without contacting a server.

use std::path::PathBuf;

use clap::Subcommand;

use catcher_io::{edits_to_csv, edits_to_json_string, FieldMapping, TableRow};
use catcher_recon::CatcherEdit;

use crate::common::{
    load_mapping, load_settings, read_edits, read_mapped_table, require_column, write, DialectArgs,
};
use crate::CliError;

#[derive(Subcommand)]
pub enum TransposeCommands {
    /// Table rows to catcher JSON, one edit per row
    #[command(after_help = "\
Examples:
  catcher transpose to-json items.csv mapping.csv -o edits.json
  catcher transpose to-json items.csv mapping.csv --pointer-column dmrecord")]
    ToJson {
        /// Metadata table
        table: PathBuf,

        /// Field mapping CSV (`name`, `nick`)
        mapping: PathBuf,

        /// Table column holding record pointers
        #[arg(long)]
        pointer_column: Option<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        dialect: DialectArgs,
    },

    /// Catcher JSON back to a table, one column per mapped field
    #[command(after_help = "\
Examples:
  catcher transpose to-csv edits.json mapping.csv -o items.csv
  catcher transpose to-csv edits.json mapping.csv --pointer-column dmrecord --delimiter ';'")]
    ToCsv {
        /// Catcher JSON file
        edits: PathBuf,

        /// Field mapping CSV (`name`, `nick`)
        mapping: PathBuf,

        /// Add a leading column with record pointers
        #[arg(long)]
        pointer_column: Option<String>,

        /// Output file (omit for stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        dialect: DialectArgs,
    },
}

pub fn cmd_transpose(cmd: TransposeCommands) -> Result<(), CliError> {
    match cmd {
        TransposeCommands::ToJson { table, mapping, pointer_column, output, dialect } => {
            let settings = load_settings()?;
            let options = dialect.options(&settings)?;
            let mapping_file = load_mapping(&mapping)?;
            let (headers, rows) = read_mapped_table(&table, &mapping_file, &options)?;
            if let Some(col) = pointer_column.as_deref() {
                require_column(&table, &headers, col)?;
            }

            let edits = plain_edits(&rows, &mapping_file, &options.separator, pointer_column.as_deref());
            let json = edits_to_json_string(&edits, &mapping_file.nicks())
                .map_err(|e| CliError::internal(e.to_string()))?;
            write(output.as_ref(), json.as_bytes())
        }
        TransposeCommands::ToCsv { edits, mapping, pointer_column, output, dialect } => {
            let settings = load_settings()?;
            let options = dialect.options(&settings)?;
            let mapping_file = load_mapping(&mapping)?;
            let (edit_list, _) = read_edits(&edits)?;

            let bytes = edits_to_csv(&edit_list, &mapping_file, pointer_column.as_deref(), options.delimiter)
                .map_err(|e| CliError::internal(e.to_string()))?;
            write(output.as_ref(), &bytes)
        }
    }
}

/// One pointer-less edit per row, or with the pointer taken from
/// `pointer_column` when given.
pub fn plain_edits(
    rows: &[TableRow],
    mapping: &FieldMapping,
    separator: &str,
    pointer_column: Option<&str>,
) -> Vec<CatcherEdit> {
    rows.iter()
        .map(|row| {
            let pointer = pointer_column
                .and_then(|col| row.get(col))
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string);
            CatcherEdit::new(pointer, mapping.apply(row, separator))
        })
        .collect()
}
