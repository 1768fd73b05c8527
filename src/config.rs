//! Configuration types for the voyage assistant
//!
//! Everything is read from the environment (after loading `.env` if present)
//! into explicit values that are passed to the components that need them.

use crate::error::{Error, Result};
use crate::retry::RetryConfig;
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Model configuration for an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier as understood by the provider
    pub model: String,
    /// Temperature for sampling (0.0-2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens for completion
    pub max_tokens: Option<u32>,
}

impl ModelConfig {
    /// Create a new model configuration
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Connection settings for an OpenAI-compatible chat-completions endpoint
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: SecretString,
    /// Base URL, e.g. `https://api.openai.com/v1`
    pub base_url: Url,
    /// Model used by every agent unless overridden
    pub model: ModelConfig,
    /// Request timeout
    pub timeout: Duration,
    /// Backoff policy for transient failures
    pub retry: RetryConfig,
    /// Upper bound on model round-trips for a single agent run
    pub max_turns: u32,
}

impl ProviderConfig {
    /// Create a configuration with defaults for everything but the credentials
    pub fn new(api_key: impl Into<String>, base_url: Url, model: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url,
            model: ModelConfig::new(model),
            timeout: Duration::from_secs(120),
            retry: RetryConfig::default(),
            max_turns: 10,
        }
    }

    /// Load from `BASE_URL`, `API_KEY`, `MODEL_NAME` and optional tuning variables
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = required(&lookup, "BASE_URL")?;
        let api_key = required(&lookup, "API_KEY")?;
        let model = required(&lookup, "MODEL_NAME")?;

        let base_url = Url::parse(&base_url)
            .map_err(|e| Error::config(format!("BASE_URL is not a valid URL: {}", e)))?;

        let mut config = Self::new(api_key, base_url, model);
        config.timeout = Duration::from_secs(parse_or(&lookup, "PROVIDER_TIMEOUT_SECS", 120)?);
        config.retry.max_retries = parse_or(&lookup, "PROVIDER_MAX_RETRIES", 3)?;
        config.max_turns = parse_or(&lookup, "PROVIDER_MAX_TURNS", 10)?;
        Ok(config)
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set the maximum number of model round-trips per agent run
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Get the API key as a string
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Full URL of the chat-completions endpoint
    pub fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("max_turns", &self.max_turns)
            .finish()
    }
}

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// Multi-line human readable output
    Pretty,
    /// Newline-delimited JSON
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::config(format!("unknown LOG_FORMAT '{}'", other))),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    pub bind_address: String,
    /// TCP port
    pub port: u16,
    /// Run the input guardrail stage in front of every query
    pub guardrails_enabled: bool,
    /// Attach a permissive CORS layer
    pub cors_permissive: bool,
    /// Log output format
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
            guardrails_enabled: true,
            cors_permissive: false,
            log_format: LogFormat::Compact,
        }
    }
}

impl ServerConfig {
    /// Load from the environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            guardrails_enabled: parse_or(&lookup, "GUARDRAILS_ENABLED", defaults.guardrails_enabled)?,
            cors_permissive: parse_or(&lookup, "CORS_PERMISSIVE", defaults.cors_permissive)?,
            log_format: parse_or(&lookup, "LOG_FORMAT", defaults.log_format)?,
        })
    }

    /// `host:port` string for binding a listener
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Completion provider settings
    pub provider: ProviderConfig,
    /// HTTP server settings
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load both sections from the environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        let lookup = |key: &str| std::env::var(key).ok();
        Ok(Self {
            provider: ProviderConfig::from_source(lookup)?,
            server: ServerConfig::from_source(lookup)?,
        })
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| Error::config(format!("{} environment variable not set", key)))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::config(format!("invalid value for {}: {}", key, e))),
        _ => Ok(default),
    }
}
