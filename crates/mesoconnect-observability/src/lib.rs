// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! # mesoconnect-observability
//!
//! Logging setup shared by the mesoconnect crates.
//!
//! Human-readable logs go to stderr so that reports on stdout stay clean.
//! Per-crate debug output is switched on with `--debug-<crate>` flags or the
//! `MESOCONNECT_DEBUG` environment variable.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known mesoconnect crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "mesoconnect-config",
    "mesoconnect-matfile",
    "mesoconnect-atlas",
    "mesoconnect-explorer",
];
