//! Client configuration for connecting to the library backend.
//!
//! Two environments are built in. Either can be overridden from
//! `client.yaml` in the config directory:
//!
//! ```yaml
//! api-version: v1
//! kind: ClientConfig
//!
//! environment: prod
//!
//! profiles:
//!   dev:
//!     base-url: http://localhost:8000/api/v1
//!     timeout-ms: 10000
//!   prod:
//!     base-url: https://library.example.com/api/v1
//!     timeout-ms: 15000
//! ```
//!
//! The environment is chosen once at startup ([`ClientConfig::select`]) and
//! frozen into a [`ResolvedEnvironment`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// API version for the client config file format.
pub const API_VERSION: &str = "v1";

/// Kind identifier for client config files.
pub const KIND: &str = "ClientConfig";

/// Environment variable selecting the environment (`dev` or `prod`).
pub const ENV_VAR: &str = "LIBRIS_ENV";

/// Default config filename.
const CLIENT_CONFIG_FILE: &str = "client.yaml";

const DEV_BASE_URL: &str = "http://localhost:8000/api/v1";
const PROD_BASE_URL: &str = "https://your-domain.com/api/v1";
const DEFAULT_TIMEOUT_MS: u64 = 10_000;

// ─────────────────────────────────────────────────────────────────────────────
// Environment
// ─────────────────────────────────────────────────────────────────────────────

/// Deployment environment the client talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Dev,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }

    /// Read the environment from [`ENV_VAR`], if set.
    pub fn from_env() -> Result<Option<Self>> {
        match std::env::var(ENV_VAR) {
            Ok(value) if !value.trim().is_empty() => value.parse().map(Some),
            _ => Ok(None),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profiles
// ─────────────────────────────────────────────────────────────────────────────

/// Connection settings for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnvironmentProfile {
    /// Base URL every request path is appended to.
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl EnvironmentProfile {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_ms,
        }
    }

    pub fn dev_default() -> Self {
        Self::new(DEV_BASE_URL, DEFAULT_TIMEOUT_MS)
    }

    pub fn prod_default() -> Self {
        Self::new(PROD_BASE_URL, DEFAULT_TIMEOUT_MS)
    }

    fn validate(&self, env: Environment) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidProfile {
                env: env.to_string(),
                field: "base-url",
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::InvalidProfile {
                env: env.to_string(),
                field: "timeout-ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// The per-environment profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profiles {
    pub dev: EnvironmentProfile,
    pub prod: EnvironmentProfile,
}

impl Default for Profiles {
    fn default() -> Self {
        Self {
            dev: EnvironmentProfile::dev_default(),
            prod: EnvironmentProfile::prod_default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root client configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// API version (always "v1" currently).
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Config kind (always "ClientConfig").
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Environment used when neither the CLI nor `LIBRIS_ENV` picks one.
    #[serde(default)]
    pub environment: Option<Environment>,

    /// Connection settings per environment.
    #[serde(default)]
    pub profiles: Profiles,
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_kind() -> String {
    KIND.to_string()
}

impl ClientConfig {
    /// Create a config holding the built-in profiles.
    pub fn new() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            ..Default::default()
        }
    }

    /// Parse from a YAML string.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Serialize to a YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::ParseYaml(e.to_string()))
    }

    /// Profile for an environment.
    pub fn profile(&self, env: Environment) -> &EnvironmentProfile {
        match env {
            Environment::Dev => &self.profiles.dev,
            Environment::Prod => &self.profiles.prod,
        }
    }

    /// Replace the profile for an environment.
    pub fn set_profile(&mut self, env: Environment, profile: EnvironmentProfile) {
        match env {
            Environment::Dev => self.profiles.dev = profile,
            Environment::Prod => self.profiles.prod = profile,
        }
    }

    /// Pick the environment for this process.
    ///
    /// Precedence: explicit override, then `LIBRIS_ENV`, then the file's
    /// `environment`, then `dev`.
    pub fn select(&self, explicit: Option<Environment>) -> Result<Environment> {
        if let Some(env) = explicit {
            return Ok(env);
        }
        if let Some(env) = Environment::from_env()? {
            return Ok(env);
        }
        Ok(self.environment.unwrap_or_default())
    }

    /// Freeze the settings for `env` into an immutable snapshot.
    pub fn resolve(&self, env: Environment) -> Result<ResolvedEnvironment> {
        let profile = self.profile(env);
        profile.validate(env)?;
        tracing::debug!(
            environment = %env,
            base_url = %profile.base_url,
            timeout_ms = profile.timeout_ms,
            "resolved client environment"
        );
        Ok(ResolvedEnvironment {
            environment: env,
            base_url: profile.base_url.trim().to_string(),
            timeout: Duration::from_millis(profile.timeout_ms),
        })
    }
}

/// Settings selected once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEnvironment {
    environment: Environment,
    base_url: String,
    timeout: Duration,
}

impl ResolvedEnvironment {
    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Loading / Saving
// ─────────────────────────────────────────────────────────────────────────────

/// Get the path to the client config file.
pub fn client_config_path() -> Option<PathBuf> {
    crate::xdg_config_dir().map(|d| d.join(CLIENT_CONFIG_FILE))
}

/// Load the client configuration.
///
/// Returns the built-in defaults if the file doesn't exist.
pub fn load_client_config() -> Result<ClientConfig> {
    load_client_config_from(client_config_path().as_deref())
}

/// Load client config from a specific path.
pub fn load_client_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let Some(path) = path else {
        return Ok(ClientConfig::new());
    };

    if !path.exists() {
        return Ok(ClientConfig::new());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.display().to_string(),
        source: e,
    })?;

    ClientConfig::from_yaml(&contents)
}

/// Save client config to a specific path.
pub fn save_client_config_to(config: &ClientConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteFile {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let contents = config.to_yaml()?;
    std::fs::write(path, contents).map_err(|e| ConfigError::WriteFile {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
