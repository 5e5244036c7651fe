//! Connection profiles and client options
//!
//! Profiles are read from a key-value blob store. The engine only ever reads
//! from it: the entry under [`DEFAULT_PROFILE_KEY`] wins when it is complete,
//! otherwise the first entry of [`PROFILE_LIST_KEY`] is used.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

pub const DEFAULT_PROFILE_KEY: &str = "zabbix_default_config";
pub const PROFILE_LIST_KEY: &str = "zabbix_config_list";

/// Endpoint and credentials for one Zabbix installation
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// JSON-RPC endpoint, e.g. `https://zabbix.example.com/api_jsonrpc.php`
    #[serde(alias = "apiUrl", alias = "api_url")]
    pub endpoint_url: String,

    /// API token generated in the Zabbix frontend
    pub token: String,
}

impl ConnectionProfile {
    pub fn new(endpoint_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            endpoint_url: endpoint_url.into(),
            token: token.into(),
        }
    }

    /// Both URL and token are present.
    pub fn is_complete(&self) -> bool {
        !self.endpoint_url.trim().is_empty() && !self.token.trim().is_empty()
    }
}

impl fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("endpoint_url", &self.endpoint_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Tuning knobs for a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// Per-request timeout in seconds (none by default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Maximum number of hosts enriched with metrics at once (unbounded by default)
    #[serde(default)]
    pub enrichment_concurrency: Option<usize>,
}

/// Key-value blob store holding connection profiles
pub trait ProfileStore {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> Result<()>;
}

/// Pick the profile to connect with.
pub fn resolve_profile(store: &dyn ProfileStore) -> Option<ConnectionProfile> {
    let default = store
        .get(DEFAULT_PROFILE_KEY)
        .and_then(|value| serde_json::from_value::<ConnectionProfile>(value).ok())
        .filter(ConnectionProfile::is_complete);

    if let Some(profile) = default {
        trace!("using default profile {:?}", profile.name);
        return Some(profile);
    }

    let first = store
        .get(PROFILE_LIST_KEY)
        .and_then(|value| serde_json::from_value::<Vec<ConnectionProfile>>(value).ok())
        .and_then(|profiles| profiles.into_iter().next())
        .filter(ConnectionProfile::is_complete);

    if let Some(profile) = &first {
        debug!("no usable default profile, falling back to {:?}", profile.name);
    }

    first
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryProfileStore {
    entries: serde_json::Map<String, Value>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// TOML file backed store
///
/// ```toml
/// [zabbix_default_config]
/// name = "production"
/// endpoint_url = "https://zabbix.example.com/api_jsonrpc.php"
/// token = "..."
/// ```
#[derive(Debug, Clone)]
pub struct FileProfileStore {
    path: PathBuf,
    table: toml::Table,
}

pub fn default_profile_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zabbix-overview").join("profiles.toml"))
}

impl FileProfileStore {
    /// Load the store at `path`, or the default location. A missing file is an empty store.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_profile_path().context("Unable to determine config directory")?,
        };

        let table = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read profile file: {}", path.display()))?;

            toml::from_str(&content)
                .with_context(|| format!("Failed to parse profile file: {}", path.display()))?
        } else {
            debug!("no profile file at {}", path.display());
            toml::Table::new()
        };

        Ok(Self { path, table })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProfileStore for FileProfileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.table
            .get(key)
            .and_then(|value| serde_json::to_value(value).ok())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let value = toml::Value::try_from(value)
            .with_context(|| format!("Value for {key} cannot be stored as TOML"))?;
        self.table.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string(&self.table).context("Failed to serialize profiles")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write profile file: {}", self.path.display()))
    }
}
