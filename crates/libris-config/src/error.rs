//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur during configuration loading and resolution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a config file.
    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to write a config file.
    #[error("failed to write config file '{path}': {source}")]
    WriteFile {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse YAML.
    #[error("failed to parse YAML config: {0}")]
    ParseYaml(String),

    /// Unknown environment name.
    #[error("unknown environment '{0}' (expected 'dev' or 'prod')")]
    UnknownEnvironment(String),

    /// A profile carries a value the client cannot use.
    #[error("invalid {field} for environment '{env}': {reason}")]
    InvalidProfile {
        env: String,
        field: &'static str,
        reason: String,
    },
}
