//! Engine configuration.
//!
//! Provides `EngineConfig`, the settings the sync engine needs to reach the
//! remote authority and pace its periodic cycles. Built from environment
//! variables by clients, or parsed from a JSON document.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Default periodic sync interval (five minutes)
pub const DEFAULT_SYNC_INTERVAL_SECS: u64 = 5 * 60;
/// Default timeout for one remote request
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const ENV_REMOTE_URL: &str = "FIELDREP_REMOTE_URL";
const ENV_REMOTE_KEY: &str = "FIELDREP_REMOTE_KEY";
const ENV_SYNC_INTERVAL: &str = "FIELDREP_SYNC_INTERVAL_SECS";
const ENV_REQUEST_TIMEOUT: &str = "FIELDREP_REQUEST_TIMEOUT_SECS";

/// Sync engine settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Base URL of the remote authority (e.g. `https://project.supabase.co`)
    #[serde(default)]
    pub remote_url: Option<String>,
    /// API key sent with every remote request
    #[serde(default)]
    pub remote_api_key: Option<String>,
    /// Seconds between timer-triggered sync cycles
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    /// Seconds before a remote request is abandoned
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

const fn default_sync_interval_secs() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            remote_api_key: None,
            sync_interval_secs: DEFAULT_SYNC_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("EngineConfig")
            .field("remote_url", &self.remote_url)
            .field(
                "remote_api_key",
                &self.remote_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("sync_interval_secs", &self.sync_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl EngineConfig {
    /// Build from `FIELDREP_*` environment variables; unset values keep defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, profile file, tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self {
            remote_url: lookup(ENV_REMOTE_URL),
            remote_api_key: lookup(ENV_REMOTE_KEY),
            ..Self::default()
        };

        if let Some(value) = normalize_text_option(lookup(ENV_SYNC_INTERVAL)) {
            config.sync_interval_secs = parse_secs(ENV_SYNC_INTERVAL, &value)?;
        }
        if let Some(value) = normalize_text_option(lookup(ENV_REQUEST_TIMEOUT)) {
            config.request_timeout_secs = parse_secs(ENV_REQUEST_TIMEOUT, &value)?;
        }

        config.normalized()
    }

    /// Parse a JSON configuration document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|error| Error::Config(format!("invalid engine config JSON: {error}")))?;
        config.normalized()
    }

    /// Trim values, drop empties, and validate URL scheme and intervals.
    pub fn normalized(self) -> Result<Self> {
        let remote_url = match normalize_text_option(self.remote_url) {
            Some(url) if is_http_url(&url) => Some(url.trim_end_matches('/').to_string()),
            Some(_) => {
                return Err(Error::Config(
                    "remote_url must include http:// or https://".to_string(),
                ))
            }
            None => None,
        };

        if self.sync_interval_secs == 0 {
            return Err(Error::Config(
                "sync_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            remote_url,
            remote_api_key: normalize_text_option(self.remote_api_key),
            ..self
        })
    }

    /// Whether both the remote URL and API key are present.
    pub const fn is_remote_configured(&self) -> bool {
        self.remote_url.is_some() && self.remote_api_key.is_some()
    }

    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_secs)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be a whole number of seconds, got '{value}'")))
}
