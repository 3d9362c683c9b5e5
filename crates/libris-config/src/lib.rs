//! Configuration for the Libris library client.
//!
//! Provides:
//! - Two named environments (`dev`, `prod`), each with a base URL and timeout
//! - Optional YAML overrides in the XDG config directory (`client.yaml`)
//! - A one-shot [`ResolvedEnvironment`] snapshot consumed at client startup
//! - Well-known directories for the persisted session and log files

pub mod client;
pub mod discovery;
pub mod error;

pub use client::{
    ClientConfig, ENV_VAR, Environment, EnvironmentProfile, Profiles, ResolvedEnvironment,
    client_config_path, load_client_config, load_client_config_from, save_client_config_to,
};
pub use discovery::{log_dir, session_dir, xdg_config_dir};
pub use error::{ConfigError, Result};
