//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRECACHE_*)
//! 2. TOML config file (if PRECACHE_CONFIG_FILE set)
//! 3. Preset defaults (if PRECACHE_PRESET set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

mod presets;
mod validation;

pub use presets::Preset;
pub use validation::ConfigError;

/// How requests to dynamic-data providers are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DynamicPolicy {
    /// The router does not intercept; the request goes out untouched.
    PassThrough,
    /// The router fetches from the network and falls back to the cache on failure.
    NetworkFirst,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRECACHE_*)
/// 2. TOML config file (if PRECACHE_CONFIG_FILE set)
/// 3. Preset defaults (if PRECACHE_PRESET set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache store.
    ///
    /// Set via PRECACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for network requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to read per response.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Network request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Base URL the router is deployed under. Relative asset paths and
    /// relative fetch targets resolve against it.
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Name of the current cache generation (the version tag).
    #[serde(default = "default_cache_name")]
    pub cache_name: String,

    /// Asset manifest: every entry is stored on install.
    ///
    /// Set via PRECACHE_ASSETS environment variable (comma-separated).
    #[serde(default = "default_assets")]
    pub assets: Vec<String>,

    /// Host substrings identifying dynamic-data providers.
    ///
    /// Set via PRECACHE_DYNAMIC_HOSTS environment variable (comma-separated).
    #[serde(default)]
    pub dynamic_hosts: Vec<String>,

    /// Handling of requests to dynamic-data providers.
    #[serde(default = "default_dynamic_policy")]
    pub dynamic_policy: DynamicPolicy,

    /// Activate a freshly installed generation without waiting for clients to close.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Take control of already-open clients on activation.
    #[serde(default = "default_true")]
    pub claim_clients: bool,

    /// Delete every non-current generation on activation.
    #[serde(default = "default_true")]
    pub prune_stale: bool,

    /// Run the install trigger when the server starts.
    #[serde(default = "default_true")]
    pub install_on_start: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./precache.sqlite")
}

fn default_user_agent() -> String {
    "precache/0.1".into()
}

fn default_max_bytes() -> usize {
    10_485_760 // 10MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_redirects() -> usize {
    5
}

fn default_scope() -> String {
    "http://localhost:8080/".into()
}

fn default_cache_name() -> String {
    "precache-v1".into()
}

fn default_assets() -> Vec<String> {
    vec!["./index.html".into(), "./manifest.json".into()]
}

fn default_dynamic_policy() -> DynamicPolicy {
    DynamicPolicy::NetworkFirst
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            scope: default_scope(),
            cache_name: default_cache_name(),
            assets: default_assets(),
            dynamic_hosts: Vec::new(),
            dynamic_policy: default_dynamic_policy(),
            skip_waiting: true,
            claim_clients: true,
            prune_stale: true,
            install_on_start: true,
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Parsed scope URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `scope` is not an absolute URL.
    pub fn scope_url(&self) -> Result<url::Url, ConfigError> {
        url::Url::parse(&self.scope)
            .map_err(|e| ConfigError::Invalid { field: "scope".into(), reason: e.to_string() })
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PRECACHE_`
    /// 2. TOML file from `PRECACHE_CONFIG_FILE` (if set)
    /// 3. Preset named by `PRECACHE_PRESET` (if set)
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The preset name is unknown
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("PRECACHE_PRESET") {
            Ok(name) => Preset::from_name(&name)
                .ok_or_else(|| ConfigError::Invalid {
                    field: "preset".into(),
                    reason: format!("unknown preset: {name}"),
                })?
                .config(),
            Err(_) => Self::default(),
        };

        let mut figment = Figment::from(Serialized::defaults(base));

        if let Ok(config_path) = std::env::var("PRECACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRECACHE_")
                .ignore(&["preset", "config_file", "assets", "dynamic_hosts"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let mut config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        if let Ok(hosts) = std::env::var("PRECACHE_DYNAMIC_HOSTS") {
            config.dynamic_hosts = split_list(&hosts);
        }
        if let Ok(assets) = std::env::var("PRECACHE_ASSETS") {
            config.assets = split_list(&assets);
        }

        config.validate()?;

        Ok(config)
    }
}

/// Split a comma-separated environment value into trimmed, non-empty entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
