//! Faucet client configuration

use crate::error::ClientResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Path suffix appended to the API origin
pub const API_PATH: &str = "/api/faucet";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "FAUCET";

/// Environment variable for a config field, e.g. `FAUCET_NETWORK_NAME`
fn env_key(field: &str) -> String {
    format!("{}_{}", ENV_PREFIX, field.to_uppercase())
}

/// Faucet client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Absolute API origin, e.g. `https://faucet.example.org`
    pub api_url: Option<String>,

    /// Origin used to resolve the relative API path when no `api_url` is set
    pub dev_proxy_url: String,

    /// Faucet-wide info refresh period (seconds)
    pub info_refresh_secs: u64,

    /// Per-address status refresh period (seconds)
    pub status_refresh_secs: u64,

    /// Countdown re-render period (milliseconds)
    pub countdown_tick_ms: u64,

    /// Optional HTTP request timeout (seconds)
    pub request_timeout_secs: Option<u64>,

    /// Network name used in claim messages
    pub network_name: String,

    /// Token symbol shown before faucet info has loaded
    pub default_token_symbol: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            dev_proxy_url: "http://localhost:3000".to_string(),
            info_refresh_secs: 30,
            status_refresh_secs: 10,
            countdown_tick_ms: 1000,
            request_timeout_secs: None,
            network_name: "X Layer Testnet".to_string(),
            default_token_symbol: "USDC".to_string(),
        }
    }
}

impl ClientConfig {
    /// Load from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply `FAUCET_<FIELD>` variables resolved by `lookup` over the defaults.
    /// Variable names match the `from_file` environment overlay.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let var = |field: &str| lookup(&env_key(field));

        if let Some(url) = var("api_url") {
            if !url.trim().is_empty() {
                config.api_url = Some(url);
            }
        }

        if let Some(url) = var("dev_proxy_url") {
            config.dev_proxy_url = url;
        }

        if let Some(secs) = var("info_refresh_secs") {
            config.info_refresh_secs = secs.parse().unwrap_or(config.info_refresh_secs);
        }

        if let Some(secs) = var("status_refresh_secs") {
            config.status_refresh_secs = secs.parse().unwrap_or(config.status_refresh_secs);
        }

        if let Some(ms) = var("countdown_tick_ms") {
            config.countdown_tick_ms = ms.parse().unwrap_or(config.countdown_tick_ms);
        }

        if let Some(secs) = var("request_timeout_secs") {
            config.request_timeout_secs = secs.parse().ok();
        }

        if let Some(name) = var("network_name") {
            config.network_name = name;
        }

        if let Some(symbol) = var("default_token_symbol") {
            config.default_token_symbol = symbol;
        }

        config
    }

    /// Load from a config file, overlaid with `FAUCET_*` environment variables
    pub fn from_file(path: &str) -> ClientResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Base of every API path: absolute when an origin is configured, relative otherwise
    pub fn api_base(&self) -> String {
        match self.api_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => {
                format!("{}{}", url.strip_suffix('/').unwrap_or(url), API_PATH)
            }
            _ => API_PATH.to_string(),
        }
    }

    /// Absolute base URL for requests; a relative base goes through the dev proxy
    pub fn request_base(&self) -> String {
        let base = self.api_base();
        if base.starts_with('/') {
            format!("{}{}", self.dev_proxy_url.trim_end_matches('/'), base)
        } else {
            base
        }
    }

    /// Get faucet info refresh period
    pub fn info_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.info_refresh_secs.max(1))
    }

    /// Get per-address status refresh period
    pub fn status_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.status_refresh_secs.max(1))
    }

    /// Get countdown tick period
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms.max(1))
    }

    /// Get request timeout, if one is configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
