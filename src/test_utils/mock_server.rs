//! Mock search engine for HTTP-level tests.
//!
//! Serves the endpoints the client uses (`/health`, `/indexes`, embedders,
//! stats and search) for one index, with canned JSON bodies. Uses httpmock
//! under the hood.
//!
//! # Example
//! ```ignore
//! use searchpane::test_utils::mock_server::MockSearchEngine;
//!
//! let engine = MockSearchEngine::builder("movies", "masterKey")
//!     .hits(json!([{"id": 1, "title": "Dune"}]))
//!     .start();
//! let settings = engine.settings();
//! ```

use httpmock::prelude::*;
use serde_json::{Value, json};

use crate::settings::Settings;

pub struct MockSearchEngine {
    server: MockServer,
    index: String,
    api_key: String,
}

pub struct MockSearchEngineBuilder {
    index: String,
    api_key: String,
    healthy: bool,
    embedders: Value,
    fields: Vec<String>,
    hits: Value,
}

impl MockSearchEngine {
    pub fn builder(index: &str, api_key: &str) -> MockSearchEngineBuilder {
        MockSearchEngineBuilder {
            index: index.to_string(),
            api_key: api_key.to_string(),
            healthy: true,
            embedders: json!({}),
            fields: Vec::new(),
            hits: json!([]),
        }
    }

    pub fn base_url(&self) -> String {
        self.server.base_url()
    }

    /// Settings pointing at this server with its index selected.
    pub fn settings(&self) -> Settings {
        Settings {
            host: self.base_url(),
            api_key: self.api_key.clone(),
            index: self.index.clone(),
            ..Settings::default()
        }
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }
}

impl MockSearchEngineBuilder {
    #[must_use]
    pub const fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    /// Embedder settings object, keyed by embedder name.
    #[must_use]
    pub fn embedders(mut self, embedders: Value) -> Self {
        self.embedders = embedders;
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(ToString::to_string).collect();
        self
    }

    /// Hits returned for every search.
    #[must_use]
    pub fn hits(mut self, hits: Value) -> Self {
        self.hits = hits;
        self
    }

    pub fn start(self) -> MockSearchEngine {
        let server = MockServer::start();
        let bearer = format!("Bearer {}", self.api_key);
        let index = self.index.clone();

        let health_status = if self.healthy { 200 } else { 503 };
        server.mock(|when, then| {
            when.method(GET).path("/health");
            then.status(health_status)
                .json_body(json!({"status": "available"}));
        });

        server.mock(|when, then| {
            when.method(GET)
                .path("/indexes")
                .header("authorization", bearer.as_str());
            then.status(200)
                .json_body(json!({"results": [{"uid": index}], "total": 1}));
        });
        server.mock(|when, then| {
            when.method(GET).path("/indexes");
            then.status(401)
                .json_body(json!({"code": "invalid_api_key"}));
        });

        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/indexes/{index}/settings/embedders"))
                .header("authorization", bearer.as_str());
            then.status(200).json_body(self.embedders.clone());
        });

        let distribution: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.clone(), json!(1)))
            .collect();
        server.mock(|when, then| {
            when.method(GET)
                .path(format!("/indexes/{index}/stats"))
                .header("authorization", bearer.as_str());
            then.status(200).json_body(json!({
                "numberOfDocuments": 1,
                "fieldDistribution": distribution
            }));
        });

        server.mock(|when, then| {
            when.method(POST)
                .path(format!("/indexes/{index}/search"))
                .header("authorization", bearer.as_str());
            then.status(200).json_body(json!({"hits": self.hits.clone()}));
        });

        MockSearchEngine {
            server,
            index: self.index,
            api_key: self.api_key,
        }
    }
}
