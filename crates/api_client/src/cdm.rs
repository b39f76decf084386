//! CONTENTdm web services client.
//!
//! Every call is a GET of `{base}/dmwebservices/index.php?q={query}`
//! where `query` is a `/`-separated function call ending in `json`.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info};

use catcher_recon::{Catalog, RemoteError, RemoteRecord};

use crate::http::{text, HttpClient};

/// Largest page the query function accepts.
pub const QUERY_PAGE_SIZE: usize = 1024;

/// Filetype of compound objects.
const COMPOUND_FILETYPE: &str = "cpd";

// ── Types ───────────────────────────────────────────────────────────

/// One record returned by `dmQuery`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdmRecord {
    pub pointer: String,
    pub filetype: String,
    /// Requested field nick → value (`""` when empty).
    pub fields: BTreeMap<String, String>,
}

impl CdmRecord {
    pub fn is_compound(&self) -> bool {
        self.filetype == COMPOUND_FILETYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionInfo {
    /// Alias without the leading slash.
    pub alias: String,
    pub name: String,
    pub path: String,
}

/// One entry of a collection's field schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub nick: String,
    pub data_type: String,
    /// Dublin Core mapping, `""` when unmapped.
    pub dc: String,
    pub required: bool,
    pub searchable: bool,
    pub hidden: bool,
    pub vocabulary: bool,
    pub read_only: bool,
}

// ── Client ──────────────────────────────────────────────────────────

/// Blocking client for one server. Holds a pooled keep-alive connection
/// for the lifetime of a run.
pub struct CdmClient {
    http: HttpClient,
    base_url: String,
}

impl CdmClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run one web-service function and return its JSON payload.
    pub fn request(&self, query: &str) -> Result<Value, RemoteError> {
        let url = format!("{}/dmwebservices/index.php?q={}", self.base_url, query);
        let body = self.http.get_json(&url)?;
        check_application_error(&body)?;
        Ok(body)
    }

    /// Every record of `alias` with the given fields, paging through the
    /// full result set.
    pub fn query(&self, alias: &str, fields: &[&str]) -> Result<Vec<CdmRecord>, RemoteError> {
        let alias = alias.trim_start_matches('/');
        let field_list = if fields.is_empty() {
            "dmrecord".to_string()
        } else {
            fields.join("!")
        };

        let mut records = Vec::new();
        let mut start = 1usize;
        loop {
            let query = format!(
                "dmQuery/{alias}/0/{field_list}/nosort/{QUERY_PAGE_SIZE}/{start}/1/0/0/0/0/0/json"
            );
            let body = self.request(&query)?;

            let total = body
                .get("pager")
                .and_then(|p| p.get("total"))
                .and_then(as_count)
                .ok_or_else(|| RemoteError::Malformed("query response has no pager.total".into()))?;
            let page = body
                .get("records")
                .and_then(Value::as_array)
                .ok_or_else(|| RemoteError::Malformed("query response has no records".into()))?;

            for item in page {
                records.push(parse_record(item, fields)?);
            }
            debug!(alias, start, total, received = page.len(), "query page");

            start += QUERY_PAGE_SIZE;
            if start > total {
                break;
            }
        }

        info!(alias, records = records.len(), "query complete");
        Ok(records)
    }

    pub fn collection_list(&self) -> Result<Vec<CollectionInfo>, RemoteError> {
        let body = self.request("dmGetCollectionList/json")?;
        let items = body
            .as_array()
            .ok_or_else(|| RemoteError::Malformed("collection list is not an array".into()))?;
        Ok(items
            .iter()
            .map(|item| CollectionInfo {
                alias: field(item, "alias").trim_start_matches('/').to_string(),
                name: field(item, "name"),
                path: field(item, "path"),
            })
            .collect())
    }

    pub fn field_info(&self, alias: &str) -> Result<Vec<FieldInfo>, RemoteError> {
        let alias = alias.trim_start_matches('/');
        let body = self.request(&format!("dmGetCollectionFieldInfo/{alias}/json"))?;
        let items = body
            .as_array()
            .ok_or_else(|| RemoteError::Malformed("field info is not an array".into()))?;
        Ok(items
            .iter()
            .map(|item| FieldInfo {
                name: field(item, "name"),
                nick: field(item, "nick"),
                data_type: field(item, "type"),
                dc: field(item, "dc"),
                required: flag(item, "req"),
                searchable: flag(item, "search"),
                hidden: flag(item, "hide"),
                vocabulary: flag(item, "vocab"),
                read_only: flag(item, "readonly"),
            })
            .collect())
    }

    /// Current metadata of one item: nick → value.
    pub fn item_info(&self, alias: &str, pointer: &str) -> Result<BTreeMap<String, String>, RemoteError> {
        let alias = alias.trim_start_matches('/');
        let body = self.request(&format!("dmGetItemInfo/{alias}/{pointer}/json"))?;
        let object = body
            .as_object()
            .ok_or_else(|| RemoteError::Malformed(format!("item {pointer} info is not an object")))?;
        Ok(object.iter().map(|(k, v)| (k.clone(), text(v))).collect())
    }

    /// Raw compound object structure. See [`flatten_page_pointers`].
    pub fn compound_object_info(&self, alias: &str, pointer: &str) -> Result<Value, RemoteError> {
        let alias = alias.trim_start_matches('/');
        self.request(&format!("dmGetCompoundObjectInfo/{alias}/{pointer}/json"))
    }
}

impl Catalog for CdmClient {
    fn list_records(
        &self,
        collection: &str,
        identifier_field: &str,
    ) -> Result<Vec<RemoteRecord>, RemoteError> {
        let records = self.query(collection, &[identifier_field])?;
        Ok(records
            .into_iter()
            .map(|r| {
                let identifier = r
                    .fields
                    .get(identifier_field)
                    .map(|v| v.trim().to_string())
                    .unwrap_or_default();
                let compound = r.is_compound();
                RemoteRecord::new(r.pointer, identifier, compound)
            })
            .collect())
    }

    fn child_pointers(&self, collection: &str, pointer: &str) -> Result<Vec<String>, RemoteError> {
        let info = self.compound_object_info(collection, pointer)?;
        Ok(flatten_page_pointers(&info))
    }
}

// ── Parsing ─────────────────────────────────────────────────────────

/// An object carrying `message` plus `code` or `restrictionCode` is a
/// service-side error, whatever the HTTP status.
fn check_application_error(body: &Value) -> Result<(), RemoteError> {
    let Some(object) = body.as_object() else {
        return Ok(());
    };
    let Some(message) = object.get("message") else {
        return Ok(());
    };
    if object.contains_key("code") || object.contains_key("restrictionCode") {
        let code = object
            .get("code")
            .or_else(|| object.get("restrictionCode"))
            .map(text)
            .unwrap_or_default();
        return Err(RemoteError::Application(format!("{} (code {code})", text(message))));
    }
    Ok(())
}

fn parse_record(item: &Value, fields: &[&str]) -> Result<CdmRecord, RemoteError> {
    let pointer = item
        .get("pointer")
        .or_else(|| item.get("dmrecord"))
        .map(text)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| RemoteError::Malformed("query record has no pointer".into()))?;
    Ok(CdmRecord {
        pointer,
        filetype: field(item, "filetype"),
        fields: fields
            .iter()
            .map(|nick| (nick.to_string(), field(item, nick)))
            .collect(),
    })
}

fn field(item: &Value, key: &str) -> String {
    item.get(key).map(text).unwrap_or_default()
}

fn flag(item: &Value, key: &str) -> bool {
    match item.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}

fn as_count(value: &Value) -> Option<usize> {
    match value {
        Value::Number(n) => n.as_u64().map(|n| n as usize),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Page pointers of a compound object in document order.
///
/// Accepts a flat `page` list or a nested `node` tree; `page` and `node`
/// children may be a single object or an array.
pub fn flatten_page_pointers(info: &Value) -> Vec<String> {
    let mut pointers = Vec::new();
    walk_node(info, &mut pointers);
    pointers
}

fn walk_node(node: &Value, out: &mut Vec<String>) {
    let Some(object) = node.as_object() else {
        return;
    };
    for (key, child) in object {
        match key.as_str() {
            "page" => {
                for page in one_or_many(child) {
                    let ptr = field(page, "pageptr");
                    if !ptr.is_empty() {
                        out.push(ptr);
                    }
                }
            }
            "node" => {
                for sub in one_or_many(child) {
                    walk_node(sub, out);
                }
            }
            _ => {}
        }
    }
}

fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flatten_flat_document() {
        let info = json!({
            "type": "Document",
            "page": [
                {"pagetitle": "1", "pageptr": "11"},
                {"pagetitle": "2", "pageptr": "12"}
            ]
        });
        assert_eq!(flatten_page_pointers(&info), vec!["11", "12"]);
    }

    #[test]
    fn flatten_nested_monograph_depth_first() {
        let info = json!({
            "type": "Monograph",
            "node": {
                "nodetitle": "root",
                "node": [
                    {"nodetitle": "Chapter 1", "page": [{"pageptr": "1"}, {"pageptr": "2"}]},
                    {"nodetitle": "Chapter 2", "page": {"pageptr": "3"},
                     "node": {"nodetitle": "2.1", "page": {"pageptr": "4"}}}
                ],
                "page": {"pageptr": "5"}
            }
        });
        assert_eq!(flatten_page_pointers(&info), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn flatten_numeric_pointers() {
        let info = json!({"page": {"pageptr": 42}});
        assert_eq!(flatten_page_pointers(&info), vec!["42"]);
    }

    #[test]
    fn application_error_detected() {
        let body = json!({"message": "Requested item not found", "code": "-2"});
        assert!(matches!(
            check_application_error(&body),
            Err(RemoteError::Application(msg)) if msg.contains("not found")
        ));
        let body = json!({"message": "Restricted", "restrictionCode": "-1"});
        assert!(check_application_error(&body).is_err());
        let body = json!({"message": "just a field"});
        assert!(check_application_error(&body).is_ok());
    }

    #[test]
    fn record_empty_objects_become_empty_strings() {
        let item = json!({"pointer": 7, "filetype": "cpd", "identi": {}});
        let record = parse_record(&item, &["identi"]).unwrap();
        assert_eq!(record.pointer, "7");
        assert!(record.is_compound());
        assert_eq!(record.fields["identi"], "");
    }

    #[test]
    fn flags_accept_numbers_and_strings() {
        let item = json!({"req": 1, "search": "0", "hide": true});
        assert!(flag(&item, "req"));
        assert!(!flag(&item, "search"));
        assert!(flag(&item, "hide"));
        assert!(!flag(&item, "vocab"));
    }
}
