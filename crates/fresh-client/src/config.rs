use crate::FreshError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const ENV_ENDPOINT: &str = "FRESH_ADDRESS";
pub const ENV_API_KEY: &str = "FRESH_API_KEY";

/// Connection settings for the asset API.
///
/// Both `endpoint` and `api_key` are mandatory. The fields are private and
/// [`ClientConfig::new`] and [`ClientConfig::load`] are the only constructors,
/// so every value that exists has passed validation.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base API endpoint, e.g. `https://acme.freshservice.com/api/v2`.
    endpoint: String,
    api_key: String,
    /// Global per-request deadline in seconds. No deadline when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

/// On-disk shape of the config file, validated into a [`ClientConfig`].
#[derive(Deserialize)]
struct ConfigFile {
    #[serde(default)]
    endpoint: String,
    #[serde(default)]
    api_key: String,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, FreshError> {
        let endpoint = endpoint.trim().trim_end_matches('/');
        if endpoint.is_empty() {
            return Err(FreshError::Config("API endpoint is required".to_owned()));
        }
        if api_key.trim().is_empty() {
            return Err(FreshError::Config("API key is required".to_owned()));
        }
        Ok(Self {
            endpoint: endpoint.to_owned(),
            api_key: api_key.to_owned(),
            timeout_secs: None,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    #[must_use]
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Build from `FRESH_ADDRESS` and `FRESH_API_KEY`.
    pub fn from_env() -> Result<Self, FreshError> {
        let endpoint = std::env::var(ENV_ENDPOINT)
            .map_err(|_| FreshError::Config(format!("{ENV_ENDPOINT} not set")))?;
        let api_key = std::env::var(ENV_API_KEY)
            .map_err(|_| FreshError::Config(format!("{ENV_API_KEY} not set")))?;
        Self::new(&endpoint, &api_key)
    }

    /// Load config from `~/.config/fresh/config.json`.
    pub fn load_default() -> Result<Self, FreshError> {
        let path = default_config_path()?;
        Self::load(&path)
    }

    pub fn load(path: &Path) -> Result<Self, FreshError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FreshError::Config(format!("cannot read client config {}: {e}", path.display()))
        })?;
        let raw: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| FreshError::Config(format!("invalid client config: {e}")))?;
        let config = Self::new(&raw.endpoint, &raw.api_key)?;
        Ok(match raw.timeout_secs {
            Some(secs) => config.with_timeout(secs),
            None => config,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), FreshError> {
        let write_err = |e: std::io::Error| {
            FreshError::Config(format!("cannot write client config {}: {e}", path.display()))
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| FreshError::Config(format!("cannot encode client config: {e}")))?;
        std::fs::write(path, content).map_err(write_err)?;
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

pub fn default_config_path() -> Result<PathBuf, FreshError> {
    let home = std::env::var("HOME").map_err(|_| FreshError::Config("HOME not set".to_owned()))?;
    Ok(PathBuf::from(home).join(".config/fresh/config.json"))
}
