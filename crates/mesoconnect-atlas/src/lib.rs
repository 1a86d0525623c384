// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! # mesoconnect atlas
//!
//! Region-level view of a mesoscale connectivity matrix.
//!
//! - [`AbbreviationTable`]: region abbreviations paired with full names
//! - [`ConnectivityMatrix`]: projection strengths, rows indexed by input
//!   regions and columns by output regions
//! - [`format_report`]: top-N ranked projections as text
//! - [`AtlasDataset`]: both of the above loaded from MAT-files
//!
//! ## Usage
//! ```no_run
//! use mesoconnect_atlas::{format_report, AtlasDataset};
//! use mesoconnect_config::DataConfig;
//!
//! let dataset = AtlasDataset::load(&DataConfig::default())?;
//! let ranked = dataset.connectivity.region_outputs("RSPd")?;
//! print!("{}", format_report(&ranked, &dataset.abbreviations, 30)?);
//! # Ok::<(), mesoconnect_atlas::AtlasError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use mesoconnect_matfile::MatFileError;
use thiserror::Error;

mod abbreviations;
mod connectivity;
mod dataset;
mod report;

pub use abbreviations::*;
pub use connectivity::*;
pub use dataset::*;
pub use report::*;

/// Atlas errors
#[derive(Error, Debug)]
pub enum AtlasError {
    #[error("Region not found: {0}")]
    RegionNotFound(String),

    #[error("Abbreviation not found: {0}")]
    AbbreviationNotFound(String),

    #[error("Full name not found: {0}")]
    NameNotFound(String),

    #[error("Connectivity matrix is {rows}x{cols} but there are {inputs} input and {outputs} output labels")]
    ShapeMismatch {
        rows: usize,
        cols: usize,
        inputs: usize,
        outputs: usize,
    },

    #[error("Invalid table: {0}")]
    InvalidTable(String),

    #[error(transparent)]
    MatFile(#[from] MatFileError),
}

impl AtlasError {
    /// Lookup failures that only abort the current query
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AtlasError::RegionNotFound(_) | AtlasError::AbbreviationNotFound(_) | AtlasError::NameNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AtlasError>;
