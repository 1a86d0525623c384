// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! # mesoconnect configuration
//!
//! Type-safe configuration loader for the connectivity explorer with support for:
//! - TOML file parsing (`mesoconnect_configuration.toml`)
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mesoconnect_config::load_config;
//!
//! // Discover the config file (falls back to defaults) and apply overrides
//! let config = load_config(None, None).expect("Failed to load config");
//!
//! println!("Data dir: {}", config.data.dir.display());
//! println!("Regions listed: {}", config.report.num_regions_listed);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File name searched for during config discovery
pub const CONFIG_FILE_NAME: &str = "mesoconnect_configuration.toml";

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{apply_cli_overrides, apply_environment_overrides, find_config_file, load_config};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
