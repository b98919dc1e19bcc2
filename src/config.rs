//! Configuration management for mintwatch
//!
//! Loads configuration from a settings file (JSON, YAML or TOML) and
//! environment variables. Environment variables override file values.
//! The top-level `addresses`, `delay` and `webhook` keys keep the shape of the
//! legacy `settings.json` so existing files load unchanged.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::constants::{embed, endpoints};
use crate::models::{MonitorConfig, WatchedAddress};
use crate::monitoring::{MetadataFailurePolicy, MonitorOptions};
use crate::notifications::{EmbedStyle, RetryPolicy};

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Addresses to watch
    #[serde(default)]
    pub addresses: Vec<AddressEntry>,
    /// Default poll interval in seconds, fractions allowed
    #[serde(default = "default_delay")]
    pub delay: f64,
    /// Default webhook URL shared by all addresses
    #[serde(default)]
    pub webhook: String,
    /// RPC endpoint configuration
    #[serde(default)]
    pub rpc: RpcConfig,
    /// Webhook retry policy
    #[serde(default)]
    pub retry: RetryConfig,
    /// Notification embed appearance
    #[serde(default)]
    pub embed: EmbedConfig,
    /// NFT metadata enrichment
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    /// Block explorer links
    #[serde(default)]
    pub explorer: ExplorerConfig,
    /// Health/metrics HTTP server
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_delay() -> f64 {
    10.0
}

/// One watched address, with optional per-address overrides
#[derive(Debug, Clone, Deserialize)]
pub struct AddressEntry {
    /// Chain address
    pub id: String,
    /// Display label
    pub name: String,
    /// Poll interval override in seconds
    #[serde(default)]
    pub delay: Option<f64>,
    /// Webhook override
    #[serde(default)]
    pub webhook: Option<String>,
}

/// RPC endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    /// Explorer JSON-RPC endpoint URL
    #[serde(default = "default_rpc_url")]
    pub url: String,
    /// Per-request timeout in milliseconds (RPC, metadata and webhook calls)
    #[serde(default = "default_rpc_timeout")]
    pub timeout_ms: u64,
    /// Maximum signatures requested per poll (provider default when unset)
    #[serde(default)]
    pub signature_limit: Option<usize>,
}

fn default_rpc_url() -> String {
    endpoints::EXPLORER_RPC.to_string()
}

fn default_rpc_timeout() -> u64 {
    10_000
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: default_rpc_url(),
            timeout_ms: default_rpc_timeout(),
            signature_limit: None,
        }
    }
}

/// Webhook retry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// First backoff delay in milliseconds
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
    /// Backoff growth factor
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Apply full jitter to each delay
    #[serde(default = "default_jitter")]
    pub jitter: bool,
    /// Attempt cap; unset means retry until accepted
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

fn default_initial_backoff() -> u64 {
    500
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> bool {
    true
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            max_attempts: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
            jitter: self.jitter,
            max_attempts: self.max_attempts,
        }
    }
}

/// Embed appearance
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedConfig {
    #[serde(default = "default_username")]
    pub username: String,
    #[serde(default = "default_avatar_url")]
    pub avatar_url: String,
    #[serde(default = "default_footer_text")]
    pub footer_text: String,
    #[serde(default = "default_color")]
    pub color: u32,
}

fn default_username() -> String {
    embed::USERNAME.to_string()
}

fn default_avatar_url() -> String {
    embed::AVATAR_URL.to_string()
}

fn default_footer_text() -> String {
    embed::FOOTER_TEXT.to_string()
}

fn default_color() -> u32 {
    embed::COLOR
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            avatar_url: default_avatar_url(),
            footer_text: default_footer_text(),
            color: default_color(),
        }
    }
}

impl EmbedConfig {
    pub fn to_style(&self) -> EmbedStyle {
        EmbedStyle {
            username: self.username.clone(),
            avatar_url: self.avatar_url.clone(),
            footer_text: self.footer_text.clone(),
            color: self.color,
        }
    }
}

/// NFT enrichment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    /// Resolve NFT metadata for mint transactions
    #[serde(default = "default_enrichment_enabled")]
    pub enabled: bool,
    /// Behaviour when metadata cannot be resolved
    #[serde(default)]
    pub on_failure: MetadataFailurePolicy,
}

fn default_enrichment_enabled() -> bool {
    true
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: default_enrichment_enabled(),
            on_failure: MetadataFailurePolicy::default(),
        }
    }
}

/// Block explorer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,
}

fn default_explorer_url() -> String {
    endpoints::EXPLORER_WEB.to_string()
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Serve /health and /metrics
    #[serde(default)]
    pub enabled: bool,
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9090
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_host(),
            port: default_port(),
        }
    }
}

fn environment() -> Environment {
    // MINTWATCH_DELAY=5 -> delay = 5
    // MINTWATCH_RPC__URL=... -> rpc.url = ...
    Environment::with_prefix("MINTWATCH")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl AppConfig {
    /// Load configuration from files and environment
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (MINTWATCH_*)
    /// 2. File named by MINTWATCH_CONFIG (if set)
    /// 3. config/settings.* (if exists)
    /// 4. settings.* (if exists)
    /// 5. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(File::with_name("config/settings").required(false));

        if let Ok(path) = std::env::var("MINTWATCH_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a single file, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addresses.is_empty() {
            return Err(ConfigError::Message(
                "At least one address must be configured".to_string(),
            ));
        }

        for entry in &self.addresses {
            if entry.id.trim().is_empty() || entry.name.trim().is_empty() {
                return Err(ConfigError::Message(
                    "Every address needs a non-empty id and name".to_string(),
                ));
            }

            let delay = entry.delay.unwrap_or(self.delay);
            if !delay.is_finite() || delay <= 0.0 {
                return Err(ConfigError::Message(format!(
                    "Poll delay for {} must be a positive number of seconds",
                    entry.name
                )));
            }

            let webhook = entry.webhook.as_deref().unwrap_or(&self.webhook);
            if webhook.is_empty() {
                return Err(ConfigError::Message(format!(
                    "No webhook configured for {}",
                    entry.name
                )));
            }
            if let Err(e) = reqwest::Url::parse(webhook) {
                return Err(ConfigError::Message(format!(
                    "Invalid webhook URL for {}: {}",
                    entry.name, e
                )));
            }
        }

        if self.rpc.url.is_empty() {
            return Err(ConfigError::Message("RPC URL must be set".to_string()));
        }

        if self.retry.multiplier < 1.0 {
            return Err(ConfigError::Message(
                "Retry multiplier must be at least 1.0".to_string(),
            ));
        }

        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            return Err(ConfigError::Message(
                "Retry initial backoff must not exceed max backoff".to_string(),
            ));
        }

        Ok(())
    }

    /// One monitor configuration per address; per-address overrides win
    pub fn monitor_configs(&self) -> Vec<MonitorConfig> {
        self.addresses
            .iter()
            .map(|entry| {
                MonitorConfig::new(
                    WatchedAddress::new(entry.id.clone(), entry.name.clone()),
                    Duration::from_secs_f64(entry.delay.unwrap_or(self.delay)),
                    entry.webhook.clone().unwrap_or_else(|| self.webhook.clone()),
                )
            })
            .collect()
    }

    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            enrich_metadata: self.enrichment.enabled,
            on_metadata_failure: self.enrichment.on_failure,
            explorer_base_url: self.explorer.base_url.clone(),
        }
    }
}
