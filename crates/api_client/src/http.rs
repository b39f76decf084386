use std::time::Duration;

use catcher_recon::RemoteError;
use tracing::debug;

const USER_AGENT: &str = concat!("catcher/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Shared GET client with status and body classification. No retries.
pub(crate) struct HttpClient {
    http: reqwest::blocking::Client,
}

impl HttpClient {
    pub(crate) fn new() -> Result<Self, RemoteError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http })
    }

    pub(crate) fn get_text(&self, url: &str) -> Result<String, RemoteError> {
        debug!(%url, "GET");
        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(RemoteError::Http(status.as_u16(), snippet(&body, url)));
        }

        resp.text()
            .map_err(|e| RemoteError::Transport(format!("failed to read response body: {e}")))
    }

    pub(crate) fn get_json(&self, url: &str) -> Result<serde_json::Value, RemoteError> {
        let text = self.get_text(url)?;
        let trimmed = text.trim_start_matches('\u{feff}');
        serde_json::from_str(trimmed).map_err(|e| {
            RemoteError::Malformed(format!("{e} (body: {})", &trimmed[..floor(trimmed, 200)]))
        })
    }
}

/// Short description of a failed response for error messages.
fn snippet(body: &str, url: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        url.to_string()
    } else {
        body[..floor(body, 200)].to_string()
    }
}

fn floor(s: &str, max: usize) -> usize {
    let mut end = s.len().min(max);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    end
}

/// Scalar JSON value as text; empty objects and null become `""`.
pub(crate) fn text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}
