// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Ensures configuration values are present and within valid ranges before
//! any data file is touched.

use crate::{ConfigError, ConfigResult, MesoconnectConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - Required file and variable names
/// - Valid value ranges for report and session settings
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &MesoconnectConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_required_fields(config, &mut errors);
    validate_value_ranges(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

/// Validate required fields are not empty
fn validate_required_fields(config: &MesoconnectConfig, errors: &mut Vec<ConfigValidationError>) {
    let data = &config.data;
    let required = [
        ("data.structures_file", &data.structures_file),
        ("data.injection_file", &data.injection_file),
        ("data.regional_file", &data.regional_file),
        ("data.structures_var", &data.structures_var),
        ("data.connections_var", &data.connections_var),
        ("data.inputs_var", &data.inputs_var),
        ("data.outputs_var", &data.outputs_var),
        ("session.quit_sentinel", &config.session.quit_sentinel),
    ];

    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ConfigValidationError::MissingRequired {
                field: field.to_string(),
            });
        }
    }

    if !config.session.interactive && config.session.default_region.trim().is_empty() {
        errors.push(ConfigValidationError::MissingRequired {
            field: "session.default_region".to_string(),
        });
    }
}

/// Validate value ranges and constraints
fn validate_value_ranges(config: &MesoconnectConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.report.num_regions_listed == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "report.num_regions_listed".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    if config.session.wrap_width == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "session.wrap_width".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let level = config.logging.level.to_lowercase();
    if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("unknown level '{}'", config.logging.level),
        });
    }
}
