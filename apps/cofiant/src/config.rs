//! # Configuration
//!
//! `AppConfig` is read from a TOML file, then overridden by environment
//! variables, then by CLI flags. Every field has a default, so an empty or
//! missing file is a valid configuration.
//!
//! ## Environment Variables
//!
//! - `COFIANT_ENDPOINT`: graph-query endpoint URL
//! - `COFIANT_LANGUAGE`: response language (`en` or `cy`)
//! - `COFIANT_INDEX`: facet list directory or packed bundle
//! - `COFIANT_RATE_LIMIT`: API requests per second (0 disables)
//! - `COFIANT_CORS_ORIGINS`: comma-separated origins, or `*`

use cofiant_core::primitives::{MAX_PAGE_SIZE, PAGE_SIZE};
use cofiant_core::{CofiantError, Language};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "cofiant.toml";

/// Largest config file accepted (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// Graph-query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Endpoint URL.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every query.
    pub user_agent: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: "https://query.wikidata.org/sparql".to_string(),
            timeout_secs: 30,
            user_agent: format!("cofiant/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Search defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Records per page.
    pub page_size: usize,
    /// Initial response language.
    pub language: Language,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            language: Language::default(),
        }
    }
}

/// Local facet lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory of `<list>.json` files, or a packed `.bin` bundle.
    pub path: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("lists"),
        }
    }
}

/// Presentation facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Whether a graph renderer is available.
    pub graph: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { graph: true }
    }
}

/// HTTP API server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins (comma-separated, or `*`). Localhost when unset.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: 100,
            cors_origins: None,
        }
    }
}

// =============================================================================
// APP CONFIG
// =============================================================================

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Endpoint section.
    pub endpoint: EndpointConfig,
    /// Search section.
    pub search: SearchConfig,
    /// Index section.
    pub index: IndexConfig,
    /// Render section.
    pub render: RenderConfig,
    /// Server section.
    pub server: ServerConfig,
}

impl AppConfig {
    /// Parse TOML text.
    pub fn from_toml(text: &str) -> Result<Self, CofiantError> {
        toml::from_str(text).map_err(|e| CofiantError::Config(format!("Invalid config: {e}")))
    }

    /// Read a config file.
    ///
    /// With an explicit path the file must exist. Without one,
    /// `cofiant.toml` in the working directory is used if present.
    pub fn load(path: Option<&Path>) -> Result<Self, CofiantError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    return Ok(Self::default());
                }
                fallback
            }
        };

        let metadata = std::fs::metadata(&path).map_err(|e| {
            CofiantError::Io(format!("Cannot read config '{}': {e}", path.display()))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(CofiantError::Config(format!(
                "Config file {} bytes exceeds maximum allowed {MAX_CONFIG_FILE_SIZE} bytes",
                metadata.len()
            )));
        }
        let text = std::fs::read_to_string(&path).map_err(|e| {
            CofiantError::Io(format!("Cannot read config '{}': {e}", path.display()))
        })?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml(&text)
    }

    /// Apply `COFIANT_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), CofiantError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `COFIANT_*` overrides from a lookup function.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), CofiantError> {
        if let Some(url) = lookup("COFIANT_ENDPOINT") {
            self.endpoint.url = url;
        }
        if let Some(lang) = lookup("COFIANT_LANGUAGE") {
            self.search.language = lang.parse()?;
        }
        if let Some(path) = lookup("COFIANT_INDEX") {
            self.index.path = PathBuf::from(path);
        }
        if let Some(limit) = lookup("COFIANT_RATE_LIMIT") {
            self.server.rate_limit = limit.trim().parse().map_err(|_| {
                CofiantError::Config(format!("COFIANT_RATE_LIMIT is not a number: {limit}"))
            })?;
        }
        if let Some(origins) = lookup("COFIANT_CORS_ORIGINS") {
            self.server.cors_origins = Some(origins);
        }
        Ok(())
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), CofiantError> {
        let url = self.endpoint.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CofiantError::Config(format!(
                "Endpoint URL must be http(s): {url:?}"
            )));
        }
        if self.endpoint.timeout_secs == 0 {
            return Err(CofiantError::Config(
                "Endpoint timeout must be at least 1 second".to_string(),
            ));
        }
        if self.search.page_size == 0 || self.search.page_size > MAX_PAGE_SIZE {
            return Err(CofiantError::Config(format!(
                "Page size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.search.page_size
            )));
        }
        Ok(())
    }

    /// Bind address of the API server.
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// =============================================================================
// TESTS
// =============================================================================
