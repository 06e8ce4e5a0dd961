//! Blocking HTTP client for a Meilisearch-compatible engine.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::{Connection, Document, IndexMetadata, SearchBackend, SearchRequest};
use crate::config::HttpConfig;
use crate::error::{Result, SpError};

pub struct HttpBackend {
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend").finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct IndexList {
    results: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    uid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    field_distribution: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<Document>,
}

impl HttpBackend {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|err| SpError::Http(format!("build http client: {err}")))?;
        Ok(Self { client })
    }

    fn get(&self, url: &str, key: Option<&str>) -> Result<reqwest::blocking::Response> {
        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(key) = key {
            request = request.bearer_auth(key);
        }
        request.send().map_err(|err| transport_error(url, &err))
    }

    fn post_json(
        &self,
        url: &str,
        key: &str,
        body: &SearchRequest,
    ) -> Result<reqwest::blocking::Response> {
        self.client
            .post(url)
            .header("Accept", "application/json")
            .bearer_auth(key)
            .json(body)
            .send()
            .map_err(|err| transport_error(url, &err))
    }
}

impl SearchBackend for HttpBackend {
    fn health(&self, host: &str) -> Result<()> {
        let url = endpoint(host, "/health");
        let response = self.get(&url, None)?;
        check_status(&response, "health")?;
        debug!(host, "Health check passed");
        Ok(())
    }

    fn list_indexes(&self, conn: &Connection) -> Result<Vec<String>> {
        let url = endpoint(&conn.host, "/indexes");
        let response = self.get(&url, Some(&conn.api_key))?;
        let list: IndexList = parse_json_response(response, "indexes")?;
        Ok(list.results.into_iter().map(|entry| entry.uid).collect())
    }

    fn index_metadata(&self, conn: &Connection, index: &str) -> Result<IndexMetadata> {
        let segment = urlencoding::encode(index);

        let url = endpoint(&conn.host, &format!("/indexes/{segment}/settings/embedders"));
        let response = self.get(&url, Some(&conn.api_key))?;
        let embedders: Option<Map<String, Value>> =
            parse_json_response(response, "embedders")?;

        let url = endpoint(&conn.host, &format!("/indexes/{segment}/stats"));
        let response = self.get(&url, Some(&conn.api_key))?;
        let stats: IndexStats = parse_json_response(response, "stats")?;

        Ok(IndexMetadata {
            embedders: embedders
                .map(|map| map.into_iter().map(|(name, _)| name).collect())
                .unwrap_or_default(),
            fields: stats
                .field_distribution
                .into_iter()
                .map(|(name, _)| name)
                .collect::<BTreeSet<_>>(),
        })
    }

    fn search(
        &self,
        conn: &Connection,
        index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<Document>> {
        let url = endpoint(
            &conn.host,
            &format!("/indexes/{}/search", urlencoding::encode(index)),
        );
        let response = self.post_json(&url, &conn.api_key, request)?;
        let body: SearchResponse = parse_json_response(response, "search")?;
        debug!(index, hits = body.hits.len(), "Search completed");
        Ok(body.hits)
    }
}

/// Join `host` and `path`, ignoring trailing slashes on the host.
#[must_use]
pub fn endpoint(host: &str, path: &str) -> String {
    format!("{}{path}", host.trim().trim_end_matches('/'))
}

fn transport_error(url: &str, err: &reqwest::Error) -> SpError {
    if err.is_timeout() {
        SpError::Timeout(format!("{url}: {err}"))
    } else {
        SpError::Http(format!("{url}: {err}"))
    }
}

fn check_status(response: &reqwest::blocking::Response, label: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(SpError::Status {
            endpoint: label.to_string(),
            status: status.as_u16(),
        })
    }
}

fn parse_json_response<T: DeserializeOwned>(
    response: reqwest::blocking::Response,
    label: &str,
) -> Result<T> {
    check_status(&response, label)?;
    response.json::<T>().map_err(|err| SpError::MalformedResponse {
        endpoint: label.to_string(),
        reason: err.to_string(),
    })
}
