// Delimited-text table reading with repeated-header joining

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use encoding_rs::Encoding;

use crate::error::TableError;

pub const DEFAULT_SEPARATOR: &str = "; ";

/// Dialect and decoding options for reading a table.
#[derive(Debug, Clone)]
pub struct TableOptions {
    pub delimiter: u8,
    /// `None` = UTF-8 with Windows-1252 fallback.
    pub encoding: Option<&'static Encoding>,
    /// Joins cells of repeated column names.
    pub separator: String,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            encoding: None,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl TableOptions {
    /// Resolve an encoding label such as `utf-8`, `latin1` or `windows-1252`.
    pub fn with_encoding_label(mut self, label: &str) -> Result<Self, TableError> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| TableError::Encoding(label.to_string()))?;
        self.encoding = Some(encoding);
        Ok(self)
    }
}

/// Join values in order, skipping empty ones.
pub fn join_values<'a>(values: impl IntoIterator<Item = &'a str>, separator: &str) -> String {
    values
        .into_iter()
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Read file and convert to UTF-8.
///
/// With an explicit encoding the bytes are decoded with it (a BOM wins).
/// Otherwise UTF-8 is tried first, falling back to Windows-1252, which is
/// common for Excel-exported CSVs.
pub fn read_file_as_utf8(path: &Path, encoding: Option<&'static Encoding>) -> Result<String, TableError> {
    let mut bytes = Vec::new();
    std::fs::File::open(path)?.read_to_end(&mut bytes)?;
    Ok(decode(bytes, encoding))
}

fn decode(bytes: Vec<u8>, encoding: Option<&'static Encoding>) -> String {
    let text = match encoding {
        Some(enc) => enc.decode(&bytes).0.into_owned(),
        None => match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                let bytes = e.into_bytes();
                let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
                decoded.into_owned()
            }
        },
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// One data row after header joining: column name → value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    /// 1-based data row number (the header is row 0).
    pub row_number: usize,
    pub values: HashMap<String, String>,
}

impl TableRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }
}

/// Single-pass reader over the data rows of a delimited table.
pub struct TableReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    columns: Vec<String>,
    /// Cell positions for each entry of `columns`.
    positions: Vec<Vec<usize>>,
    separator: String,
    row_number: usize,
}

impl TableReader<Cursor<Vec<u8>>> {
    /// Open and decode a table file.
    pub fn open(path: &Path, options: &TableOptions) -> Result<Self, TableError> {
        let text = read_file_as_utf8(path, options.encoding)?;
        Self::new(Cursor::new(text.into_bytes()), options)
    }

    /// Read a table held in memory.
    pub fn from_text(text: &str, options: &TableOptions) -> Result<Self, TableError> {
        let text = decode(text.as_bytes().to_vec(), None);
        Self::new(Cursor::new(text.into_bytes()), options)
    }
}

impl<R: Read> TableReader<R> {
    /// Read the header row of `reader`. Data rows are parsed lazily.
    pub fn new(reader: R, options: &TableOptions) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(TableError::EmptyHeader);
        }

        let mut columns: Vec<String> = Vec::new();
        let mut positions: Vec<Vec<usize>> = Vec::new();
        for (i, name) in headers.iter().enumerate() {
            match columns.iter().position(|c| c == name) {
                Some(existing) => positions[existing].push(i),
                None => {
                    columns.push(name.to_string());
                    positions.push(vec![i]);
                }
            }
        }

        Ok(Self {
            records: reader.into_records(),
            columns,
            positions,
            separator: options.separator.clone(),
            row_number: 0,
        })
    }

    /// Unique column names in first-appearance order.
    pub fn headers(&self) -> &[String] {
        &self.columns
    }
}

impl<R: Read> Iterator for TableReader<R> {
    type Item = Result<TableRow, TableError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };
        self.row_number += 1;

        let values = self
            .columns
            .iter()
            .zip(&self.positions)
            .map(|(name, cells)| {
                let joined = join_values(
                    cells.iter().map(|&i| record.get(i).unwrap_or("")),
                    &self.separator,
                );
                (name.clone(), joined)
            })
            .collect();

        Some(Ok(TableRow {
            row_number: self.row_number,
            values,
        }))
    }
}
