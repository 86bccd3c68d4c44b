use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::http_client::http_client;

pub const PAGE_SIZE: usize = 1000;
pub const MAX_PAGES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Players,
    Teams,
    Ballparks,
    Pitches,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Resource::Players => "players",
            Resource::Teams => "teams",
            Resource::Ballparks => "ballparks",
            Resource::Pitches => "pitches",
        }
    }
}

/// One page of raw rows from the upstream data source. Pages are 1-based.
pub trait PageSource: Send + Sync {
    fn fetch_page(&self, resource: Resource, date: Option<NaiveDate>, page: u32)
    -> Result<Vec<Value>>;
}

/// Walk pages until a short page or the page limit. A row that fails to decode
/// is logged and skipped; only a failed page request is an error.
pub fn fetch_all_pages<T: DeserializeOwned>(
    source: &dyn PageSource,
    resource: Resource,
    date: Option<NaiveDate>,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for page in 1..=MAX_PAGES {
        let rows = source
            .fetch_page(resource, date, page)
            .with_context(|| format!("{} page {page} failed", resource.path()))?;
        let len = rows.len();
        for (idx, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<T>(row) {
                Ok(item) => out.push(item),
                Err(err) => warn!(
                    resource = resource.path(),
                    page,
                    row = idx,
                    error = %err,
                    "skipping undecodable row"
                ),
            }
        }
        if len < PAGE_SIZE {
            break;
        }
        if page == MAX_PAGES {
            debug!(resource = resource.path(), "page limit reached; remaining rows ignored");
        }
    }
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
}

/// Unwrap a `{success, data}` envelope whose `data` is one object or an array.
pub fn parse_envelope(raw: &str) -> Result<Vec<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty upstream response"));
    }
    let parsed: Envelope = serde_json::from_str(trimmed).context("invalid envelope json")?;
    if !parsed.success {
        return Err(anyhow!(
            "upstream reported failure: {}",
            parsed.message.as_deref().unwrap_or("no message")
        ));
    }
    Ok(match parsed.data {
        Value::Array(rows) => rows,
        Value::Null => Vec::new(),
        other => vec![other],
    })
}

pub struct HttpUpstream {
    client: &'static Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpUpstream {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = http_client(timeout)?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn page_url(&self, resource: Resource) -> String {
        format!("{}/{}", self.base_url, resource.path())
    }
}

impl PageSource for HttpUpstream {
    fn fetch_page(
        &self,
        resource: Resource,
        date: Option<NaiveDate>,
        page: u32,
    ) -> Result<Vec<Value>> {
        let mut query = vec![
            ("page", page.to_string()),
            ("limit", PAGE_SIZE.to_string()),
        ];
        if let Some(date) = date {
            query.push(("date", date.format("%Y-%m-%d").to_string()));
        }

        let mut req = self
            .client
            .get(self.page_url(resource))
            .header(ACCEPT, "application/json")
            .query(&query);
        if let Some(key) = self.api_key.as_deref() {
            req = req.bearer_auth(key);
        }

        let resp = req.send().context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow!("http {}: {}", status, body));
        }
        parse_envelope(&body)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    #[test]
    fn envelope_accepts_object_or_array() {
        let rows = parse_envelope(r#"{"success":true,"data":[{"id":1},{"id":2}]}"#).expect("array");
        assert_eq!(rows.len(), 2);
        let rows = parse_envelope(r#"{"success":true,"data":{"id":1}}"#).expect("object");
        assert_eq!(rows.len(), 1);
        let rows = parse_envelope(r#"{"success":true,"data":null}"#).expect("null data");
        assert!(rows.is_empty());
    }

    #[test]
    fn envelope_failure_is_error() {
        assert!(parse_envelope(r#"{"success":false,"message":"rate limited"}"#).is_err());
        assert!(parse_envelope("null").is_err());
    }

    struct CountingSource {
        rows_per_page: usize,
        calls: Mutex<Vec<u32>>,
    }

    impl PageSource for CountingSource {
        fn fetch_page(&self, _: Resource, _: Option<NaiveDate>, page: u32) -> Result<Vec<Value>> {
            self.calls.lock().expect("calls lock").push(page);
            Ok((0..self.rows_per_page).map(|i| json!({ "n": i })).collect())
        }
    }

    #[derive(Deserialize)]
    struct Row {
        #[allow(dead_code)]
        n: usize,
    }

    #[test]
    fn pagination_stops_on_short_page() {
        let source = CountingSource {
            rows_per_page: 3,
            calls: Mutex::new(Vec::new()),
        };
        let rows: Vec<Row> = fetch_all_pages(&source, Resource::Players, None).expect("fetch");
        assert_eq!(rows.len(), 3);
        assert_eq!(*source.calls.lock().expect("calls lock"), vec![1]);
    }

    struct MixedSource;

    impl PageSource for MixedSource {
        fn fetch_page(&self, _: Resource, _: Option<NaiveDate>, _: u32) -> Result<Vec<Value>> {
            Ok(vec![json!({ "n": 1 }), json!({ "n": "x" }), json!({ "n": 2 })])
        }
    }

    #[test]
    fn undecodable_rows_are_skipped() {
        let rows: Vec<Row> = fetch_all_pages(&MixedSource, Resource::Pitches, None).expect("fetch");
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn pagination_stops_after_page_limit() {
        let source = CountingSource {
            rows_per_page: PAGE_SIZE,
            calls: Mutex::new(Vec::new()),
        };
        let rows: Vec<Row> = fetch_all_pages(&source, Resource::Pitches, None).expect("fetch");
        assert_eq!(rows.len(), PAGE_SIZE * MAX_PAGES as usize);
        assert_eq!(source.calls.lock().expect("calls lock").len(), MAX_PAGES as usize);
    }
}
