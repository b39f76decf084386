// Catcher JSON: an array of flat objects, each with an optional
// `record-pointer` key followed by field nick/value pairs.

use std::path::Path;

use serde_json::{Map, Value};

use catcher_recon::{CatcherEdit, FieldValues};

use crate::error::TableError;
use crate::mapping::FieldMapping;
use crate::table::read_file_as_utf8;

pub const POINTER_KEY: &str = "record-pointer";

/// Flatten one edit: pointer first, then `nick_order`, then remaining fields sorted.
pub fn edit_to_object(edit: &CatcherEdit, nick_order: &[String]) -> Map<String, Value> {
    let mut object = Map::new();
    if let Some(ref pointer) = edit.pointer {
        object.insert(POINTER_KEY.into(), Value::String(pointer.clone()));
    }
    for nick in nick_order {
        if let Some(value) = edit.fields.get(nick) {
            object.insert(nick.clone(), Value::String(value.clone().unwrap_or_default()));
        }
    }
    for (nick, value) in &edit.fields {
        if !object.contains_key(nick) {
            object.insert(nick.clone(), Value::String(value.clone().unwrap_or_default()));
        }
    }
    object
}

pub fn edits_to_json(edits: &[CatcherEdit], nick_order: &[String]) -> Value {
    Value::Array(
        edits
            .iter()
            .map(|e| Value::Object(edit_to_object(e, nick_order)))
            .collect(),
    )
}

/// Pretty-printed (2-space) catcher JSON with a trailing newline.
pub fn edits_to_json_string(edits: &[CatcherEdit], nick_order: &[String]) -> Result<String, TableError> {
    let mut text = serde_json::to_string_pretty(&edits_to_json(edits, nick_order))
        .map_err(|e| TableError::Json(e.to_string()))?;
    text.push('\n');
    Ok(text)
}

fn value_to_string(nick: &str, value: &Value) -> Result<Option<String>, TableError> {
    match value {
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Null => Ok(None),
        _ => Err(TableError::Json(format!("field '{nick}' must be a string"))),
    }
}

pub fn parse_edits_json(text: &str) -> Result<Vec<CatcherEdit>, TableError> {
    let value: Value = serde_json::from_str(text).map_err(|e| TableError::Json(e.to_string()))?;
    let items = value
        .as_array()
        .ok_or_else(|| TableError::Json("expected an array of objects".into()))?;

    let mut edits = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| TableError::Json(format!("item {} is not an object", i + 1)))?;
        let mut pointer = None;
        let mut fields = FieldValues::new();
        for (key, value) in object {
            let value = value_to_string(key, value)?;
            if key == POINTER_KEY {
                pointer = value.filter(|p| !p.is_empty());
            } else {
                fields.insert(key.clone(), value);
            }
        }
        edits.push(CatcherEdit { pointer, fields });
    }
    Ok(edits)
}

/// Read a catcher JSON file, keeping the key order of its first object.
pub fn read_edits_json(path: &Path) -> Result<(Vec<CatcherEdit>, Vec<String>), TableError> {
    let text = read_file_as_utf8(path, None)?;
    let edits = parse_edits_json(&text)?;
    let order = first_object_keys(&text);
    Ok((edits, order))
}

fn first_object_keys(text: &str) -> Vec<String> {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v.as_array().and_then(|a| a.first()).cloned())
        .and_then(|first| first.as_object().cloned())
        .map(|o| o.keys().filter(|k| *k != POINTER_KEY).cloned().collect())
        .unwrap_or_default()
}

/// Transpose edits back to a delimited table, one column per mapped nick
/// (headed by the first column name mapped to it).
pub fn edits_to_csv(
    edits: &[CatcherEdit],
    mapping: &FieldMapping,
    pointer_column: Option<&str>,
    delimiter: u8,
) -> Result<Vec<u8>, TableError> {
    let nicks = mapping.nicks();
    let mut header: Vec<String> = Vec::new();
    if let Some(col) = pointer_column {
        header.push(col.to_string());
    }
    for nick in &nicks {
        header.push(mapping.names_for(nick).next().unwrap_or(nick).to_string());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(&header)?;
    for edit in edits {
        let mut record: Vec<&str> = Vec::with_capacity(header.len());
        if pointer_column.is_some() {
            record.push(edit.pointer.as_deref().unwrap_or(""));
        }
        for nick in &nicks {
            record.push(edit.value(nick));
        }
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|e| TableError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(pointer: Option<&str>, pairs: &[(&str, &str)]) -> CatcherEdit {
        CatcherEdit {
            pointer: pointer.map(str::to_string),
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Some(v.to_string())))
                .collect(),
        }
    }

    #[test]
    fn pointer_first_then_mapping_order() {
        let order = vec!["title".to_string(), "date".to_string()];
        let text = edits_to_json_string(
            &[edit(Some("100"), &[("date", "1901"), ("title", "T1"), ("extra", "x")])],
            &order,
        )
        .unwrap();
        let keys: Vec<String> = serde_json::from_str::<Value>(&text).unwrap()[0]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["record-pointer", "title", "date", "extra"]);
        assert!(text.contains("\n  {\n    \"record-pointer\": \"100\""));
    }

    #[test]
    fn pointer_omitted_when_unknown() {
        let value = edits_to_json(&[edit(None, &[("title", "T")])], &["title".to_string()]);
        assert_eq!(value, serde_json::json!([{"title": "T"}]));
    }

    #[test]
    fn none_serializes_as_empty_string() {
        let mut e = edit(Some("1"), &[]);
        e.fields.insert("descri".into(), None);
        let value = edits_to_json(&[e], &[]);
        assert_eq!(value, serde_json::json!([{"record-pointer": "1", "descri": ""}]));
    }

    #[test]
    fn parse_accepts_numbers_and_null() {
        let edits = parse_edits_json(r#"[{"record-pointer": 12, "title": "T", "descri": null}]"#).unwrap();
        assert_eq!(edits[0].pointer.as_deref(), Some("12"));
        assert_eq!(edits[0].fields["descri"], None);
    }

    #[test]
    fn parse_rejects_nested_values() {
        let err = parse_edits_json(r#"[{"title": ["a"]}]"#).unwrap_err();
        assert!(err.to_string().contains("'title'"));
    }

    #[test]
    fn csv_uses_first_mapped_name() {
        let mapping = FieldMapping::parse("name,nick\nTitle,title\nAlt Title,title\nDate,date\n").unwrap();
        let bytes = edits_to_csv(
            &[edit(Some("5"), &[("title", "T, with comma"), ("date", "1901")])],
            &mapping,
            Some("dmrecord"),
            b',',
        )
        .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "dmrecord,Title,Date\n5,\"T, with comma\",1901\n"
        );
    }

    #[test]
    fn read_file_keeps_key_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edits.json");
        std::fs::write(&path, r#"[{"record-pointer":"1","zeta":"z","alpha":"a"}]"#).unwrap();
        let (edits, order) = read_edits_json(&path).unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(order, vec!["zeta", "alpha"]);
    }
}
