use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::error::{Result, SpError};
use crate::remote::{Connection, Document, IndexMetadata, SearchBackend, SearchRequest};
use crate::settings::{FileBlobStore, Settings};

/// Test fixture providing an isolated storage directory.
pub struct UnitTestFixture {
    pub temp_dir: TempDir,
    pub data_path: PathBuf,
}

impl UnitTestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_path = temp_dir.path().to_path_buf();
        Self { temp_dir, data_path }
    }

    pub fn blob_store(&self) -> FileBlobStore {
        FileBlobStore::new(&self.data_path)
    }
}

/// Settings pointing at a local engine with the `movies` index selected.
pub fn configured_settings() -> Settings {
    Settings {
        host: "http://localhost:7700".to_string(),
        api_key: "masterKey".to_string(),
        index: "movies".to_string(),
        title_attr: "title".to_string(),
        desc_attr: "overview".to_string(),
        image_attr: "poster".to_string(),
        ..Settings::default()
    }
}

/// Unwrap a JSON object literal into a [`Document`].
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("document fixture must be an object, got {other}"),
    }
}

/// In-process backend with canned answers.
///
/// Browse-all returns the configured hits; any non-empty query `q` returns a
/// single document `{"id": q, "title": q}` so results can be traced back to
/// the query that produced them.
pub struct ScriptedBackend {
    healthy: bool,
    indexes: Vec<String>,
    embedders: Vec<String>,
    fields: Vec<String>,
    metadata_fails: bool,
    hits: Vec<Document>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<SearchRequest>>,
}

impl ScriptedBackend {
    pub fn movies() -> Self {
        Self {
            healthy: true,
            indexes: vec!["movies".to_string(), "books".to_string()],
            embedders: vec!["default".to_string()],
            fields: ["id", "title", "overview", "poster"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            metadata_fails: false,
            hits: vec![
                document(json!({"id": 1, "title": "Dune", "overview": "Spice.", "poster": "https://img/dune.jpg"})),
                document(json!({"id": 2, "title": "Arrival", "overview": "Heptapods."})),
                document(json!({"id": 3, "title": "Solaris"})),
            ],
            delays: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn unhealthy(mut self) -> Self {
        self.healthy = false;
        self
    }

    #[must_use]
    pub fn failing_metadata(mut self) -> Self {
        self.metadata_fails = true;
        self
    }

    #[must_use]
    pub fn with_embedders(mut self, embedders: &[&str]) -> Self {
        self.embedders = embedders.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_hits(mut self, hits: Vec<Document>) -> Self {
        self.hits = hits;
        self
    }

    /// Delay answers to query `q`.
    #[must_use]
    pub fn with_delay(mut self, q: &str, delay: Duration) -> Self {
        self.delays.insert(q.to_string(), delay);
        self
    }

    /// What a search for `q` returns.
    pub fn hits_for(&self, q: &str) -> Vec<Document> {
        if q.is_empty() {
            self.hits.clone()
        } else {
            vec![document(json!({"id": q, "title": q}))]
        }
    }

    /// Every search request received so far.
    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().clone()
    }
}

impl SearchBackend for ScriptedBackend {
    fn health(&self, _host: &str) -> Result<()> {
        if self.healthy {
            Ok(())
        } else {
            Err(SpError::Status {
                endpoint: "health".to_string(),
                status: 503,
            })
        }
    }

    fn list_indexes(&self, _conn: &Connection) -> Result<Vec<String>> {
        Ok(self.indexes.clone())
    }

    fn index_metadata(&self, _conn: &Connection, _index: &str) -> Result<IndexMetadata> {
        if self.metadata_fails {
            return Err(SpError::Http("connection reset".to_string()));
        }
        Ok(IndexMetadata {
            embedders: self.embedders.iter().cloned().collect(),
            fields: self.fields.iter().cloned().collect(),
        })
    }

    fn search(
        &self,
        _conn: &Connection,
        _index: &str,
        request: &SearchRequest,
    ) -> Result<Vec<Document>> {
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delays.get(&request.q) {
            thread::sleep(*delay);
        }
        Ok(self.hits_for(&request.q))
    }
}
