// Column name → field nick mapping, read from a two-column `name,nick` CSV

use std::path::Path;

use catcher_recon::FieldValues;

use crate::error::TableError;
use crate::table::{join_values, read_file_as_utf8, TableRow};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// `(column name, nick)` in file order. Entries with an empty nick are dropped.
    entries: Vec<(String, String)>,
}

impl FieldMapping {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .filter(|(_, nick)| !nick.trim().is_empty())
                .collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, TableError> {
        let text = read_file_as_utf8(path, None)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let idx = |name: &str| -> Result<usize, TableError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| TableError::Mapping(format!("missing '{name}' column")))
        };
        let name_idx = idx("name")?;
        let nick_idx = idx("nick")?;

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record?;
            let name = record.get(name_idx).unwrap_or("").to_string();
            let nick = record.get(nick_idx).unwrap_or("").to_string();
            if name.is_empty() && !nick.is_empty() {
                return Err(TableError::Mapping(format!("nick '{nick}' has no column name")));
            }
            entries.push((name, nick));
        }

        let mapping = Self::new(entries);
        if mapping.entries.is_empty() {
            return Err(TableError::Mapping("no column is mapped to a nick".into()));
        }
        Ok(mapping)
    }

    /// Output field order: unique nicks in first-appearance order.
    pub fn nicks(&self) -> Vec<String> {
        let mut nicks: Vec<String> = Vec::new();
        for (_, nick) in &self.entries {
            if !nicks.contains(nick) {
                nicks.push(nick.clone());
            }
        }
        nicks
    }

    /// Column names mapped to `nick`, in file order.
    pub fn names_for<'a>(&'a self, nick: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(_, n)| n == nick)
            .map(|(name, _)| name.as_str())
    }

    /// Fail unless every mapped column appears in `headers`.
    pub fn check_columns(&self, headers: &[String]) -> Result<(), TableError> {
        let mut missing: Vec<String> = Vec::new();
        for (name, _) in &self.entries {
            if !headers.contains(name) && !missing.contains(name) {
                missing.push(name.clone());
            }
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(TableError::MissingColumns(missing))
        }
    }

    /// Map a table row to field values. Several columns mapped to one nick
    /// are joined with `separator`.
    pub fn apply(&self, row: &TableRow, separator: &str) -> FieldValues {
        self.nicks()
            .into_iter()
            .map(|nick| {
                let value = join_values(
                    self.names_for(&nick).map(|name| row.get(name).unwrap_or("")),
                    separator,
                );
                (nick, Some(value))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn row(pairs: &[(&str, &str)]) -> TableRow {
        TableRow {
            row_number: 1,
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn parse_skips_unmapped_columns() {
        let mapping = FieldMapping::parse("name,nick\nTitle,title\nNotes,\nDate,date\n").unwrap();
        assert_eq!(mapping.nicks(), vec!["title", "date"]);
    }

    #[test]
    fn parse_requires_name_and_nick_headers() {
        let err = FieldMapping::parse("column,field\nTitle,title\n").unwrap_err();
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn parse_rejects_mapping_without_nicks() {
        assert!(FieldMapping::parse("name,nick\nTitle,\n").is_err());
    }

    #[test]
    fn apply_joins_columns_sharing_a_nick() {
        let mapping =
            FieldMapping::parse("name,nick\nSubject A,subjec\nSubject B,subjec\nTitle,title\n").unwrap();
        let fields = mapping.apply(
            &row(&[("Subject A", "Maps"), ("Subject B", ""), ("Title", "T")]),
            "; ",
        );
        assert_eq!(fields["subjec"].as_deref(), Some("Maps"));
        assert_eq!(fields["title"].as_deref(), Some("T"));
    }

    #[test]
    fn check_columns_lists_every_missing_name() {
        let mapping = FieldMapping::parse("name,nick\nTitle,title\nA,a\nB,b\n").unwrap();
        let err = mapping
            .check_columns(&["Title".to_string()])
            .unwrap_err();
        match err {
            TableError::MissingColumns(cols) => assert_eq!(cols, vec!["A", "B"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
