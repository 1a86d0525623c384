// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-mesoconnect-matfile` or `--debug-all`.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Per-crate debug flags
///
/// # Example
/// ```rust
/// use mesoconnect_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-mesoconnect-atlas".to_string()]);
/// assert!(flags.is_enabled("mesoconnect-atlas"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}`; `--debug-all`
    /// enables every known crate. Unrelated arguments are ignored.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Build an `EnvFilter` directive string
    ///
    /// Crate names are converted to their tracing targets (hyphens become
    /// underscores), e.g. `"mesoconnect_atlas=debug,info"`.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|name| format!("{}=debug", name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and `MESOCONNECT_DEBUG`
///
/// Environment variable format: comma-separated crate names, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());

    if let Ok(env_var) = env::var("MESOCONNECT_DEBUG") {
        apply_debug_env(&mut flags, &env_var);
    }

    flags
}

fn apply_debug_env(flags: &mut CrateDebugFlags, value: &str) {
    if value == "all" {
        flags.enable_all();
        return;
    }
    for crate_name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        flags.enable(crate_name);
    }
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  MESOCONNECT_DEBUG={{crate-name}}[,{{crate-name}}]
  MESOCONNECT_DEBUG=all
"#,
        KNOWN_CRATES.join(", ")
    )
}
