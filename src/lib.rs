// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! # mesoconnect - mesoscale connectivity explorer
//!
//! Loads an abbreviation table and a region-to-region projection matrix from
//! MATLAB MAT-files and reports, for a chosen brain region, its strongest
//! inputs or outputs with full region names.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! mesoconnect = "0.1"
//! ```
//!
//! ```rust,no_run
//! use mesoconnect::prelude::*;
//!
//! let config = load_config(None, None)?;
//! let dataset = AtlasDataset::load(&config.data)?;
//!
//! let ranked = dataset.connectivity.region_outputs("RSPd")?;
//! print!("{}", format_report(&ranked, &dataset.abbreviations, 30)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: mesoconnect-config, -observability         │
//! │  (TOML config + overrides, tracing setup)               │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Data: mesoconnect-matfile                              │
//! │  (MATLAB Level 5 reader/writer)                         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Domain: mesoconnect-atlas                              │
//! │  (abbreviations, ranking, reports)                      │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application: mesoconnect-explorer                      │
//! │  (interactive console session, CLI binary)              │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use mesoconnect_config as config;
pub use mesoconnect_observability as observability;

// Re-export data layer
pub use mesoconnect_matfile as matfile;

// Re-export domain and application
pub use mesoconnect_atlas as atlas;
pub use mesoconnect_explorer as explorer;

/// Prelude - commonly used types and functions
pub mod prelude {
    pub use crate::atlas::{
        find_string_in_list, format_report, wrap_region_list, AbbreviationTable, AtlasDataset, AtlasError,
        ConnectivityMatrix, ProjectionDirection, RankedProjections,
    };
    pub use crate::config::{load_config, MesoconnectConfig};
    pub use crate::explorer::{Explorer, SessionSummary};
    pub use crate::matfile::{load_mat_file, MatArray, MatFile, MatFileError, MatFileWriter};
}
