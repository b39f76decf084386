use std::collections::BTreeMap;

use crate::model::{LocalRow, RemoteRecord};

/// Identifier → entries sharing that identifier. Read-only once built.
#[derive(Debug)]
pub struct Index<'a, T> {
    entries: BTreeMap<&'a str, Vec<&'a T>>,
}

impl<'a, T> Index<'a, T> {
    /// Index `items` by `key`; items without a key are left out.
    pub fn build(items: &'a [T], key: impl Fn(&'a T) -> Option<&'a str>) -> Self {
        let mut entries: BTreeMap<&'a str, Vec<&'a T>> = BTreeMap::new();
        for item in items {
            if let Some(k) = key(item) {
                entries.entry(k).or_default().push(item);
            }
        }
        Self { entries }
    }

    pub fn get(&self, identifier: &str) -> Option<&[&'a T]> {
        self.entries.get(identifier).map(|v| v.as_slice())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    /// Identifiers in sorted order.
    pub fn identifiers(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.keys().copied()
    }

    /// Identifiers mapping to more than one entry, sorted.
    pub fn duplicated(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, v)| v.len() > 1)
            .map(|(k, _)| k.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn index_rows(rows: &[LocalRow]) -> Index<'_, LocalRow> {
    Index::build(rows, |r| r.identifier.as_deref())
}

pub fn index_records(records: &[RemoteRecord]) -> Index<'_, RemoteRecord> {
    Index::build(records, |r| Some(r.identifier.as_str()))
}

/// Join failures between the two indexes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct JoinReport {
    /// Row identifiers with no remote record.
    pub unreconcilable: Vec<String>,
    /// Identifiers matching more than one remote record.
    pub confused: Vec<String>,
}

impl JoinReport {
    pub fn is_clean(&self) -> bool {
        self.unreconcilable.is_empty() && self.confused.is_empty()
    }
}

pub fn check_join(
    rows: &Index<'_, LocalRow>,
    records: &Index<'_, RemoteRecord>,
) -> JoinReport {
    JoinReport {
        unreconcilable: rows
            .identifiers()
            .filter(|id| !records.contains(id))
            .map(str::to_string)
            .collect(),
        confused: records.duplicated(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldValues;

    fn row(n: usize, id: Option<&str>) -> LocalRow {
        LocalRow {
            row_number: n,
            identifier: id.map(str::to_string),
            page_position: None,
            fields: FieldValues::new(),
        }
    }

    #[test]
    fn index_groups_and_skips_missing_keys() {
        let rows = vec![row(1, Some("A")), row(2, Some("A")), row(3, None), row(4, Some("B"))];
        let idx = index_rows(&rows);
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.get("A").unwrap().len(), 2);
        assert_eq!(idx.duplicated(), vec!["A".to_string()]);
        assert!(idx.get("C").is_none());
    }

    #[test]
    fn join_report_lists_every_offender() {
        let rows = vec![row(1, Some("A")), row(2, Some("B")), row(3, Some("D"))];
        let records = vec![
            RemoteRecord::new("1", "A", false),
            RemoteRecord::new("2", "C", false),
            RemoteRecord::new("3", "C", false),
        ];
        let report = check_join(&index_rows(&rows), &index_records(&records));
        assert_eq!(report.unreconcilable, vec!["B".to_string(), "D".to_string()]);
        assert_eq!(report.confused, vec!["C".to_string()]);
        assert!(!report.is_clean());
    }
}
