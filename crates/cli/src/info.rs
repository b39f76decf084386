//! `catcher info`: collections on a server and their field schemas.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use catcher_api_client::{CdmClient, CollectionInfo, FieldInfo};

use crate::common::{load_settings, render, resolve_url, write, CdmArgs, OutputFormat};
use crate::util::delimiter_byte;
use crate::CliError;

#[derive(Subcommand)]
pub enum InfoCommands {
    /// List the collections on a server
    #[command(after_help = "\
Examples:
  catcher info collections --cdm-url https://cdm.example.org
  catcher info collections --format json")]
    Collections {
        /// Server base URL
        #[arg(long, env = "CATCHER_CDM_URL")]
        cdm_url: Option<String>,

        #[command(flatten)]
        out: InfoOutput,
    },

    /// Show the field schema (names, nicks, flags) of a collection
    #[command(after_help = "\
Examples:
  catcher info fields --alias coll
  catcher info fields --alias coll --format csv -o fields.csv")]
    Fields {
        #[command(flatten)]
        cdm: CdmArgs,

        #[command(flatten)]
        out: InfoOutput,
    },
}

#[derive(Args)]
pub struct InfoOutput {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Delimiter for csv output
    #[arg(long, default_value = ",")]
    pub delimiter: char,

    /// Output file (omit for stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

impl InfoOutput {
    fn emit(&self, headers: &[&str], rows: &[Vec<String>]) -> Result<(), CliError> {
        let delimiter = delimiter_byte(self.delimiter)
            .ok_or_else(|| CliError::args("delimiter must be an ASCII character"))?;
        write(self.output.as_ref(), &render(self.format, headers, rows, delimiter)?)
    }
}

const COLLECTION_HEADERS: [&str; 3] = ["alias", "name", "path"];

const FIELD_HEADERS: [&str; 9] = [
    "name", "nick", "type", "dc", "required", "searchable", "hidden", "vocabulary", "readonly",
];

pub fn cmd_info(cmd: InfoCommands) -> Result<(), CliError> {
    let settings = load_settings()?;
    match cmd {
        InfoCommands::Collections { cdm_url, out } => {
            let url = resolve_url(cdm_url.as_deref(), settings.cdm_url.as_deref(), "--cdm-url", "CATCHER_CDM_URL")?;
            let client = CdmClient::new(&url).map_err(CliError::remote)?;
            let collections = client.collection_list().map_err(CliError::remote)?;
            out.emit(&COLLECTION_HEADERS, &collection_rows(&collections))
        }
        InfoCommands::Fields { cdm, out } => {
            let client = cdm.client(&settings)?;
            let fields = client
                .field_info(&cdm.alias)
                .map_err(|e| CliError::remote(e).context(format!("collection {}", cdm.alias)))?;
            out.emit(&FIELD_HEADERS, &field_rows(&fields))
        }
    }
}

fn collection_rows(collections: &[CollectionInfo]) -> Vec<Vec<String>> {
    collections
        .iter()
        .map(|c| vec![c.alias.clone(), c.name.clone(), c.path.clone()])
        .collect()
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

fn field_rows(fields: &[FieldInfo]) -> Vec<Vec<String>> {
    fields
        .iter()
        .map(|f| {
            vec![
                f.name.clone(),
                f.nick.clone(),
                f.data_type.clone(),
                f.dc.clone(),
                yes_no(f.required),
                yes_no(f.searchable),
                yes_no(f.hidden),
                yes_no(f.vocabulary),
                yes_no(f.read_only),
            ]
        })
        .collect()
}
