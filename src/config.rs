//! Runtime configuration loaded from `~/.config/anistream/config.toml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://www3.animeflv.net";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the source site (no trailing slash).
    pub base_url: String,
    /// Quality hint attached to every extracted stream.
    pub default_quality: String,
    pub relay: RelayConfig,
    pub retry: RetryConfig,
    pub validator: ValidatorConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_quality: "HD".to_string(),
            relay: RelayConfig::default(),
            retry: RetryConfig::default(),
            validator: ValidatorConfig::default(),
        }
    }
}

/// One pass-through relay. The target URL is percent-encoded and appended to `prefix`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RelayEndpoint {
    pub name: String,
    pub prefix: String,
}

impl RelayEndpoint {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
        }
    }

    /// Build the relay URL that fetches `target`.
    #[must_use]
    pub fn wrap(&self, target: &str) -> String {
        format!("{}{}", self.prefix, urlencoding::encode(target))
    }
}

/// Relay chain settings. Endpoints are tried in the listed order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub timeout_secs: u64,
    pub endpoints: Vec<RelayEndpoint>,
}

impl RelayConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            endpoints: vec![
                RelayEndpoint::new("corsproxy", "https://corsproxy.io/?"),
                RelayEndpoint::new("allorigins", "https://api.allorigins.win/raw?url="),
                RelayEndpoint::new("codetabs", "https://api.codetabs.com/v1/proxy?quest="),
            ],
        }
    }
}

/// Automatic retry for transient failures.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per resolution, the first one included.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl RetryConfig {
    /// Delay before the attempt following `attempt` (zero-based): `base × 2^attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
        }
    }
}

/// Heuristics for accepting candidate stream URLs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// URLs must be strictly longer than this.
    pub min_url_length: usize,
    /// Substrings marking placeholder or redirect URLs.
    pub denylist: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_url_length: 10,
            denylist: [
                "redirector.googlevideo.com",
                "storage.googleapis.com",
                "undefined",
                "null",
                "about:blank",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        Self::from_toml_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        self
    }
}

/// Return the path to the config file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("anistream")
        .join("config.toml")
}
