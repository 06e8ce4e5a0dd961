use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpError};

/// Application-level configuration (transport, storage, TUI, share links).
///
/// Distinct from [`crate::settings::Settings`], which is the user's search
/// connection record edited from the UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub tui: TuiConfig,
    #[serde(default)]
    pub share: ShareConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SEARCHPANE_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Path of the global config file, if a config directory exists.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("searchpane/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SpError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SpError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.http {
            self.http.merge(patch);
        }
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
        if let Some(patch) = patch.tui {
            self.tui.merge(patch);
        }
        if let Some(patch) = patch.share {
            self.share.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_u64("SEARCHPANE_HTTP_TIMEOUT_SECS")? {
            self.http.timeout_secs = value;
        }
        if let Some(value) = env_string("SEARCHPANE_HTTP_USER_AGENT") {
            self.http.user_agent = value;
        }
        if let Some(value) = env_string("SEARCHPANE_STORAGE_DIR") {
            self.storage.dir = Some(PathBuf::from(value));
        }
        if let Some(value) = env_u64("SEARCHPANE_TUI_TICK_MS")? {
            self.tui.tick_ms = value;
        }
        if let Some(value) = env_string("SEARCHPANE_SHARE_BASE_URL") {
            self.share.base_url = value;
        }
        Ok(())
    }

    /// Directory holding persisted settings and the TUI log file.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.storage.dir.as_ref() {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("searchpane"))
            .ok_or_else(|| SpError::MissingConfig("data directory not found".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default)]
    pub timeout_secs: u64,
    #[serde(default)]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: format!("searchpane/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    fn merge(&mut self, patch: HttpPatch) {
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.user_agent {
            self.user_agent = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the settings directory (default: `<data_dir>/searchpane`).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.dir {
            self.dir = Some(value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    /// Event poll interval; completions are drained once per tick.
    #[serde(default)]
    pub tick_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_ms: 50 }
    }
}

impl TuiConfig {
    fn merge(&mut self, patch: TuiPatch) {
        if let Some(value) = patch.tick_ms {
            self.tick_ms = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Address the share token is appended to.
    #[serde(default)]
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/".to_string(),
        }
    }
}

impl ShareConfig {
    fn merge(&mut self, patch: SharePatch) {
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub http: Option<HttpPatch>,
    pub storage: Option<StoragePatch>,
    pub tui: Option<TuiPatch>,
    pub share: Option<SharePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct HttpPatch {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TuiPatch {
    pub tick_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SharePatch {
    pub base_url: Option<String>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u64>().map(Some).map_err(|err| {
            SpError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}
