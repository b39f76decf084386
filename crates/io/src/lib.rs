//! `catcher-io`: file formats around reconciliation: delimited tables,
//! `name,nick` field mappings, catcher JSON, and atomic output.

pub mod error;
pub mod json;
pub mod mapping;
pub mod output;
pub mod table;

pub use error::TableError;
pub use json::{
    edits_to_csv, edits_to_json, edits_to_json_string, parse_edits_json, read_edits_json,
    POINTER_KEY,
};
pub use mapping::FieldMapping;
pub use output::{write_atomic, write_output};
pub use table::{join_values, read_file_as_utf8, TableOptions, TableReader, TableRow, DEFAULT_SEPARATOR};
