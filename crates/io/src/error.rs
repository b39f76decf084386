use std::fmt;

#[derive(Debug)]
pub enum TableError {
    /// File could not be read or written.
    Io(String),
    /// Unknown encoding label.
    Encoding(String),
    /// Header row missing or blank.
    EmptyHeader,
    /// Data row whose cell count differs from the header's.
    RowLength {
        line: u64,
        expected: usize,
        found: usize,
    },
    /// Any other delimited-text syntax error.
    Csv(String),
    /// Mapped column names absent from the table header.
    MissingColumns(Vec<String>),
    /// Field mapping file is malformed.
    Mapping(String),
    /// Catcher JSON is malformed.
    Json(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Encoding(label) => write!(f, "unknown encoding '{label}'"),
            Self::EmptyHeader => write!(f, "table has no header row"),
            Self::RowLength { line, expected, found } => write!(
                f,
                "line {line}: expected {expected} cell(s) to match the header, found {found}"
            ),
            Self::Csv(msg) => write!(f, "{msg}"),
            Self::MissingColumns(cols) => {
                let list: Vec<String> = cols.iter().map(|c| format!("'{c}'")).collect();
                write!(f, "table is missing mapped column(s): {}", list.join(", "))
            }
            Self::Mapping(msg) => write!(f, "field mapping: {msg}"),
            Self::Json(msg) => write!(f, "catcher JSON: {msg}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        match err.kind() {
            csv::ErrorKind::UnequalLengths { pos, expected_len, len } => Self::RowLength {
                line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
                expected: *expected_len as usize,
                found: *len as usize,
            },
            csv::ErrorKind::Io(e) => Self::Io(e.to_string()),
            _ => Self::Csv(err.to_string()),
        }
    }
}
