// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `mesoconnect_configuration.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MesoconnectConfig {
    pub data: DataConfig,
    pub report: ReportConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

/// Location and layout of the MATLAB data files
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the `.mat` files
    pub dir: PathBuf,
    /// Abbreviation table file
    pub structures_file: String,
    /// Injection-based (normalized) projection matrix
    pub injection_file: String,
    /// Processed regional (quantitative) projection matrix
    pub regional_file: String,
    /// Use `regional_file` instead of `injection_file`
    pub use_regional_matrix: bool,
    pub structures_var: String,
    pub connections_var: String,
    pub inputs_var: String,
    pub outputs_var: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            structures_file: "allen_structures.mat".to_string(),
            injection_file: "allen_normalized_projs.mat".to_string(),
            regional_file: "allen_quantitative_projs.mat".to_string(),
            use_regional_matrix: false,
            structures_var: "structures".to_string(),
            connections_var: "connections".to_string(),
            inputs_var: "input".to_string(),
            outputs_var: "outputs".to_string(),
        }
    }
}

impl DataConfig {
    pub fn structures_path(&self) -> PathBuf {
        self.dir.join(&self.structures_file)
    }

    /// Path of the connectivity file selected by `use_regional_matrix`
    pub fn connectivity_path(&self) -> PathBuf {
        let file = if self.use_regional_matrix {
            &self.regional_file
        } else {
            &self.injection_file
        };
        self.dir.join(file)
    }
}

/// Report formatting
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Print inputs to the region; outputs otherwise
    pub print_inputs: bool,
    pub num_regions_listed: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            print_inputs: false,
            num_regions_listed: 30,
        }
    }
}

/// Interactive session behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prompt for regions; otherwise report `default_region` once
    pub interactive: bool,
    pub default_region: String,
    /// Input that ends the loop (exact match)
    pub quit_sentinel: String,
    /// Column width for the shared-region listing
    pub wrap_width: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            default_region: "RSPd".to_string(),
            quit_sentinel: "Q".to_string(),
            wrap_width: 150,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter level (trace, debug, info, warn, error)
    pub level: String,
    /// When set, JSON logs are also written under this directory
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}
