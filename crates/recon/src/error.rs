use std::fmt;

use crate::catalog::RemoteError;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty alias, page mode without a position column, ...).
    ConfigValidation(String),
    /// Data rows (1-based) that carry no identifier value.
    MissingIdentifier { rows: Vec<usize> },
    /// Data rows (1-based) without a page position in page mode.
    MissingPagePosition { rows: Vec<usize> },
    /// Page position cell that is not a positive integer.
    PagePosition { row: usize, value: String },
    /// Identifiers absent from the catalog, and identifiers matching more than one record.
    Mismatch {
        unreconcilable: Vec<String>,
        confused: Vec<String>,
    },
    /// Identifiers shared by several rows in object mode.
    RowCollision { identifiers: Vec<String> },
    /// Two different non-empty values for the same field.
    CombineCollision {
        pointer: Option<String>,
        field: String,
        left: String,
        right: String,
    },
    /// Page position outside the compound object's page list.
    PageOutOfRange {
        identifier: String,
        position: usize,
        page_count: usize,
    },
    /// Catalog request failed.
    Remote(RemoteError),
}

fn quoted(items: &[String]) -> String {
    items
        .iter()
        .map(|i| format!("'{i}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn numbered(rows: &[usize]) -> String {
    rows.iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingIdentifier { rows } => {
                write!(f, "rows without an identifier: {}", numbered(rows))
            }
            Self::MissingPagePosition { rows } => {
                write!(f, "rows without a page position: {}", numbered(rows))
            }
            Self::PagePosition { row, value } => {
                write!(f, "row {row}: page position '{value}' is not a positive integer")
            }
            Self::Mismatch { unreconcilable, confused } => {
                let mut parts = Vec::new();
                if !unreconcilable.is_empty() {
                    parts.push(format!("unreconcilable identifiers: {}", quoted(unreconcilable)));
                }
                if !confused.is_empty() {
                    parts.push(format!("ambiguous identifiers: {}", quoted(confused)));
                }
                write!(f, "{}", parts.join("; "))
            }
            Self::RowCollision { identifiers } => write!(
                f,
                "identifiers shared by more than one row in object mode: {}",
                quoted(identifiers)
            ),
            Self::CombineCollision { pointer, field, left, right } => match pointer {
                Some(p) => write!(
                    f,
                    "record {p}: field '{field}' has conflicting values '{left}' and '{right}'"
                ),
                None => write!(f, "field '{field}' has conflicting values '{left}' and '{right}'"),
            },
            Self::PageOutOfRange { identifier, position, page_count } => write!(
                f,
                "identifier '{identifier}': page position {position} is out of range (object has {page_count} page(s))"
            ),
            Self::Remote(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ReconError {}

impl From<RemoteError> for ReconError {
    fn from(err: RemoteError) -> Self {
        Self::Remote(err)
    }
}
