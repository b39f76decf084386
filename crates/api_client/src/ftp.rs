//! FromThePage IIIF client.

use serde_json::Value;
use tracing::debug;

use catcher_recon::RemoteError;

use crate::http::{text, HttpClient};

/// Label of the per-page structured field data rendering.
pub const STRUCTURED_DATA_LABEL: &str = "Structured data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRef {
    pub url: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpWork {
    pub url: String,
    pub label: String,
    /// Item URL on the collection management server the work was imported from.
    pub source: Option<String>,
    pub pages: Vec<FtpPage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpPage {
    pub id: String,
    pub label: String,
    /// `(label, url)` for each `seeAlso` and `rendering` entry, in manifest order.
    pub renderings: Vec<(String, String)>,
}

impl FtpPage {
    pub fn rendering(&self, label: &str) -> Option<&str> {
        self.renderings
            .iter()
            .find(|(l, _)| l.eq_ignore_ascii_case(label))
            .map(|(_, url)| url.as_str())
    }

    /// Labels available on this page.
    pub fn rendering_labels(&self) -> impl Iterator<Item = &str> {
        self.renderings.iter().map(|(l, _)| l.as_str())
    }
}

pub struct FtpClient {
    http: HttpClient,
    base_url: String,
}

impl FtpClient {
    pub fn new(base_url: &str) -> Result<Self, RemoteError> {
        Ok(Self {
            http: HttpClient::new()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Works of a collection, identified by its URL slug (`owner/collection`).
    pub fn collection_manifests(&self, slug: &str) -> Result<Vec<ManifestRef>, RemoteError> {
        let url = format!("{}/iiif/collection/{}", self.base_url, slug.trim_matches('/'));
        let body = self.http.get_json(&url)?;
        let manifests = body
            .get("manifests")
            .and_then(Value::as_array)
            .ok_or_else(|| RemoteError::Malformed(format!("{url}: no manifests")))?;
        let refs: Vec<ManifestRef> = manifests
            .iter()
            .map(|m| ManifestRef {
                url: id_of(m),
                label: label_of(m),
            })
            .filter(|m| !m.url.is_empty())
            .collect();
        debug!(slug, works = refs.len(), "collection manifests");
        Ok(refs)
    }

    pub fn work(&self, manifest_url: &str) -> Result<FtpWork, RemoteError> {
        let body = self.http.get_json(manifest_url)?;
        parse_manifest(manifest_url, &body)
    }

    /// A rendered transcript, as served.
    pub fn text(&self, url: &str) -> Result<String, RemoteError> {
        self.http.get_text(url)
    }

    /// Field-based transcription of one page as `(label, value)` pairs.
    /// Array values are joined with `"; "`.
    pub fn structured_data(&self, url: &str) -> Result<Vec<(String, String)>, RemoteError> {
        let body = self.http.get_json(url)?;
        parse_structured_data(&body)
    }
}

/// Pointer `N` of an item URL containing `/id/N`.
pub fn cdm_pointer_from_source(url: &str) -> Option<String> {
    let rest = &url[url.find("/id/")? + 4..];
    let pointer: String = rest.chars().take_while(char::is_ascii_digit).collect();
    (!pointer.is_empty()).then_some(pointer)
}

fn parse_manifest(url: &str, body: &Value) -> Result<FtpWork, RemoteError> {
    let canvases = body
        .get("sequences")
        .and_then(Value::as_array)
        .and_then(|s| s.first())
        .and_then(|s| s.get("canvases"))
        .and_then(Value::as_array)
        .ok_or_else(|| RemoteError::Malformed(format!("{url}: manifest has no canvases")))?;

    let pages = canvases
        .iter()
        .map(|canvas| {
            let mut renderings = Vec::new();
            for key in ["seeAlso", "rendering"] {
                for entry in canvas.get(key).map(one_or_many).unwrap_or_default() {
                    let target = id_of(entry);
                    if !target.is_empty() {
                        renderings.push((label_of(entry), target));
                    }
                }
            }
            FtpPage {
                id: id_of(canvas),
                label: label_of(canvas),
                renderings,
            }
        })
        .collect();

    Ok(FtpWork {
        url: url.to_string(),
        label: label_of(body),
        source: source_of(body),
        pages,
    })
}

fn parse_structured_data(body: &Value) -> Result<Vec<(String, String)>, RemoteError> {
    let data = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| RemoteError::Malformed("structured data has no 'data' array".into()))?;
    Ok(data
        .iter()
        .map(|cell| {
            let label = cell.get("label").map(text).unwrap_or_default();
            let value = match cell.get("value") {
                Some(Value::Array(items)) => items
                    .iter()
                    .map(text)
                    .filter(|v| !v.is_empty())
                    .collect::<Vec<_>>()
                    .join("; "),
                Some(v) => text(v),
                None => String::new(),
            };
            (label, value)
        })
        .collect())
}

/// `dc:source` either as a top-level key or as a metadata entry.
fn source_of(manifest: &Value) -> Option<String> {
    if let Some(source) = manifest.get("dc:source").map(text).filter(|s| !s.is_empty()) {
        return Some(source);
    }
    manifest
        .get("metadata")
        .and_then(Value::as_array)?
        .iter()
        .find(|m| label_of(m).eq_ignore_ascii_case("dc:source"))
        .and_then(|m| m.get("value"))
        .map(text)
        .filter(|s| !s.is_empty())
}

fn id_of(value: &Value) -> String {
    value
        .get("@id")
        .or_else(|| value.get("id"))
        .map(text)
        .unwrap_or_default()
}

fn label_of(value: &Value) -> String {
    value.get("label").map(text).unwrap_or_default()
}

fn one_or_many(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}
