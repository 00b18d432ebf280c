//! Configuration loading for hausd.
//!
//! Settings are loaded from an optional TOML file with the following
//! resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `~/.hausaufgaben/config.toml` (user)
//! 3. `/etc/hausaufgaben/config.toml` (system)
//! 4. built-in defaults
//!
//! Backend credentials never live in this file; they are read from the
//! environment by [`Credentials`](crate::backend::Credentials). `PORT`
//! from the environment overrides the configured port.

use serde::Deserialize;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::{BackendKind, KeyStyle};
use crate::cache::{CacheConfig, RefreshPolicy};
use crate::types::DocumentRef;
use crate::{HausaufgabenError, Result};

/// Service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub backend: BackendSection,
}

/// Listening socket.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind (default: 0.0.0.0).
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind (default: 3000).
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Cache behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Status endpoint refresh policy (default: eager).
    #[serde(default)]
    pub policy: RefreshPolicy,
    /// Share one backend call between concurrent stale readers (default: true).
    #[serde(default = "default_coalesce")]
    pub coalesce_refreshes: bool,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            policy: RefreshPolicy::default(),
            coalesce_refreshes: default_coalesce(),
        }
    }
}

fn default_coalesce() -> bool {
    true
}

/// Which store and which record to serve.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSection {
    #[serde(default)]
    pub kind: BackendKind,
    /// Spelling of the credential environment variables (default: short).
    #[serde(default)]
    pub key_style: KeyStyle,
    /// Table (supabase) or collection (firestore). Default: "Hausaufgaben".
    #[serde(default = "default_collection")]
    pub collection: String,
    /// Document id, required for firestore.
    #[serde(default)]
    pub document: Option<String>,
    /// Per-request backend timeout in seconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            key_style: KeyStyle::default(),
            collection: default_collection(),
            document: None,
            timeout_secs: None,
        }
    }
}

fn default_collection() -> String {
    "Hausaufgaben".to_string()
}

impl BackendSection {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The record to serve.
    pub fn document_ref(&self) -> Result<DocumentRef> {
        match (self.kind, &self.document) {
            (BackendKind::Supabase, _) => Ok(DocumentRef::table(&self.collection)),
            (BackendKind::Firestore, Some(id)) => {
                Ok(DocumentRef::document(&self.collection, id))
            }
            (BackendKind::Firestore, None) => Err(HausaufgabenError::Configuration(
                "backend.document is required for firestore".to_string(),
            )),
        }
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// A missing file is only an error when `explicit_path` names it.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            HausaufgabenError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            HausaufgabenError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(HausaufgabenError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".hausaufgaben").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        let system_config = PathBuf::from("/etc/hausaufgaben/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }

    /// Apply environment overrides (`PORT`) read through `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            self.server.port = port.trim().parse().map_err(|e| {
                HausaufgabenError::Configuration(format!("Invalid PORT '{port}': {e}"))
            })?;
        }
        Ok(self)
    }

    /// Socket address to listen on.
    ///
    /// `host` must be an IP literal; IPv6 hosts are written bare (`::`).
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.server.host.parse().map_err(|e| {
            HausaufgabenError::Configuration(format!("Invalid host '{}': {e}", self.server.host))
        })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .policy(self.cache.policy)
            .coalesce_refreshes(self.cache.coalesce_refreshes)
    }
}
