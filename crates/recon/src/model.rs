use std::collections::BTreeMap;

use crate::error::ReconError;

/// Field nick → value. `None` means the field is known but has no value.
pub type FieldValues = BTreeMap<String, Option<String>>;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One row of the user-supplied table after header joining and field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRow {
    /// 1-based data row number, for diagnostics.
    pub row_number: usize,
    pub identifier: Option<String>,
    /// 1-based index into the matched record's page pointers.
    pub page_position: Option<usize>,
    pub fields: FieldValues,
}

impl LocalRow {
    /// Build a row from mapped fields, moving the identifier field out of
    /// `fields` and parsing the raw page position cell.
    pub fn from_fields(
        row_number: usize,
        mut fields: FieldValues,
        identifier_field: &str,
        page_position: Option<&str>,
    ) -> Result<Self, ReconError> {
        let identifier = fields
            .remove(identifier_field)
            .flatten()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let page_position = match page_position.map(str::trim) {
            None | Some("") => None,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(ReconError::PagePosition {
                        row: row_number,
                        value: raw.to_string(),
                    })
                }
            },
        };

        Ok(Self {
            row_number,
            identifier,
            page_position,
            fields,
        })
    }
}

/// One record of the remote catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRecord {
    pub pointer: String,
    /// Value of the join field as stored remotely.
    pub identifier: String,
    pub is_compound: bool,
    /// Child page pointers in canonical page order. Only populated for
    /// compound records in page mode.
    pub page_pointers: Vec<String>,
}

impl RemoteRecord {
    pub fn new(pointer: impl Into<String>, identifier: impl Into<String>, is_compound: bool) -> Self {
        Self {
            pointer: pointer.into(),
            identifier: identifier.into(),
            is_compound,
            page_pointers: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// A catcher edit: an optional record pointer plus field values.
///
/// Edits built from a table alone have no pointer; reconciled edits always do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatcherEdit {
    pub pointer: Option<String>,
    pub fields: FieldValues,
}

impl CatcherEdit {
    pub fn new(pointer: Option<String>, fields: FieldValues) -> Self {
        Self { pointer, fields }
    }

    /// An edit that only carries a pointer.
    pub fn pointer_only(pointer: impl Into<String>) -> Self {
        Self {
            pointer: Some(pointer.into()),
            fields: FieldValues::new(),
        }
    }

    /// Field value as a string slice, `""` when missing or empty.
    pub fn value(&self, nick: &str) -> &str {
        self.fields
            .get(nick)
            .and_then(|v| v.as_deref())
            .unwrap_or("")
    }
}

impl From<&LocalRow> for CatcherEdit {
    fn from(row: &LocalRow) -> Self {
        Self {
            pointer: None,
            fields: row.fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Some(v.to_string())))
            .collect()
    }

    #[test]
    fn from_fields_moves_identifier_out() {
        let row = LocalRow::from_fields(
            1,
            fields(&[("identi", " A-1 "), ("title", "T1")]),
            "identi",
            None,
        )
        .unwrap();
        assert_eq!(row.identifier.as_deref(), Some("A-1"));
        assert!(!row.fields.contains_key("identi"));
        assert_eq!(row.fields["title"].as_deref(), Some("T1"));
    }

    #[test]
    fn blank_identifier_is_none() {
        let row = LocalRow::from_fields(3, fields(&[("identi", "  ")]), "identi", None).unwrap();
        assert_eq!(row.identifier, None);
    }

    #[test]
    fn page_position_parsed() {
        let row = LocalRow::from_fields(1, fields(&[("identi", "A")]), "identi", Some("3")).unwrap();
        assert_eq!(row.page_position, Some(3));
        let row = LocalRow::from_fields(1, fields(&[("identi", "A")]), "identi", Some("")).unwrap();
        assert_eq!(row.page_position, None);
    }

    #[test]
    fn page_position_rejects_zero_and_text() {
        for bad in ["0", "-1", "two", "1.5"] {
            let err = LocalRow::from_fields(7, fields(&[]), "identi", Some(bad)).unwrap_err();
            assert!(matches!(err, ReconError::PagePosition { row: 7, .. }), "{bad}");
        }
    }

    #[test]
    fn edit_value_defaults_to_empty() {
        let mut edit = CatcherEdit::pointer_only("5");
        edit.fields.insert("title".into(), None);
        assert_eq!(edit.value("title"), "");
        assert_eq!(edit.value("absent"), "");
    }
}
