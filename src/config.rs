//! Runtime settings: defaults, optionally overridden by a TOML file.
//!
//! ```toml
//! data_dir = "data"
//!
//! [dns]
//! servers = ["8.8.8.8", "1.1.1.1"]
//! timeout_ms = 5000
//!
//! [reputation]
//! base_url = "https://verifymail.io/api"
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::retry::RetryPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid settings: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub dns: DnsSettings,
    pub reputation: ReputationSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            dns: DnsSettings::default(),
            reputation: ReputationSettings::default(),
        }
    }
}

impl Settings {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            toml::from_str(input).map_err(|source| ConfigError::Parse { source })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dns.servers.is_empty() {
            return Err(ConfigError::Invalid {
                message: "dns.servers must list at least one resolver".into(),
            });
        }
        if self.dns.timeout_ms == 0 || self.reputation.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                message: "timeouts must be greater than zero".into(),
            });
        }
        if self.reputation.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "reputation.base_url is empty".into(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsSettings {
    pub servers: Vec<IpAddr>,
    pub timeout_ms: u64,
    pub retries: u32,
    pub retry_delay_ms: u64,
    pub backoff_factor: f64,
}

impl Default for DnsSettings {
    fn default() -> Self {
        Self {
            // Google and Cloudflare public resolvers
            servers: vec![
                IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
                IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
                IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
                IpAddr::V4(Ipv4Addr::new(1, 0, 0, 1)),
            ],
            timeout_ms: 5_000,
            retries: 3,
            retry_delay_ms: 1_000,
            backoff_factor: 1.5,
        }
    }
}

impl DnsSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retries,
            Duration::from_millis(self.timeout_ms),
            Duration::from_millis(self.retry_delay_ms),
        )
        .with_backoff_factor(self.backoff_factor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationSettings {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ReputationSettings {
    fn default() -> Self {
        Self {
            base_url: "https://verifymail.io/api".to_string(),
            timeout_ms: 5_000,
            user_agent: concat!("mailrisk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ReputationSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
