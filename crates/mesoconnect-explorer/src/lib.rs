// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! # mesoconnect explorer
//!
//! Console session over a loaded atlas. Each query prints the full name of
//! the selected region followed by its top-N ranked inputs or outputs.
//!
//! The session is generic over [`BufRead`] and [`Write`] so it can be driven
//! from stdin/stdout or from in-memory buffers.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

use std::io::{self, BufRead, Write};

use mesoconnect_atlas::{format_report, wrap_region_list, AtlasDataset, AtlasError, ProjectionDirection};
use mesoconnect_config::{MesoconnectConfig, ReportConfig, SessionConfig};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Prompt shown before each region is read
pub const PROMPT: &str = "Please enter a region: ";

/// Explorer errors
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

/// How an interactive session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The quit sentinel was entered
    Quit,
    /// Input was exhausted
    EndOfInput,
}

/// Counters for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Regions reported successfully
    pub queries: usize,
    /// Regions rejected as not found
    pub not_found: usize,
    pub end: SessionEnd,
}

/// Region explorer over a loaded dataset
#[derive(Debug)]
pub struct Explorer {
    dataset: AtlasDataset,
    report: ReportConfig,
    session: SessionConfig,
}

impl Explorer {
    pub fn new(dataset: AtlasDataset, config: &MesoconnectConfig) -> Self {
        Self {
            dataset,
            report: config.report.clone(),
            session: config.session.clone(),
        }
    }

    /// Load the dataset named by `config.data`
    pub fn from_config(config: &MesoconnectConfig) -> Result<Self> {
        let dataset = AtlasDataset::load(&config.data)?;
        Ok(Self::new(dataset, config))
    }

    pub fn dataset(&self) -> &AtlasDataset {
        &self.dataset
    }

    pub fn direction(&self) -> ProjectionDirection {
        ProjectionDirection::from_print_inputs(self.report.print_inputs)
    }

    /// Report text for `region` in the configured direction
    ///
    /// Both directions are ranked and translated; a region missing from
    /// either axis, or an untranslatable abbreviation on either side, fails
    /// the query.
    pub fn region_report(&self, region: &str) -> std::result::Result<String, AtlasError> {
        let connections = self.dataset.connectivity.region_connections(region)?;
        let top_n = self.report.num_regions_listed;
        debug!(
            "{} output site(s) and {} input site(s) for {}, listing {}",
            connections.outputs.sites.len(),
            connections.inputs.sites.len(),
            region,
            top_n
        );

        let outputs = format_report(&connections.outputs, &self.dataset.abbreviations, top_n)?;
        let inputs = format_report(&connections.inputs, &self.dataset.abbreviations, top_n)?;
        Ok(match self.direction() {
            ProjectionDirection::Inputs => inputs,
            ProjectionDirection::Outputs => outputs,
        })
    }

    /// Regions that can be queried, wrapped for display
    pub fn region_listing(&self) -> String {
        wrap_region_list(&self.dataset.connectivity.shared_regions(), self.session.wrap_width)
    }

    /// Echo the region's full name, then print its report
    ///
    /// Nothing is written when the region cannot be resolved.
    pub fn query<W: Write>(&self, region: &str, out: &mut W) -> Result<()> {
        let name = self.dataset.abbreviations.full_name(region)?;
        let report = self.region_report(region)?;
        writeln!(out, "you entered {}", name)?;
        writeln!(out)?;
        out.write_all(report.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Print the report for `session.default_region` without prompting
    pub fn run_once<W: Write>(&self, mut out: W) -> Result<()> {
        let region = &self.session.default_region;
        info!("Reporting {} for {}", self.direction().label(), region);
        let report = self.region_report(region)?;
        out.write_all(report.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    /// Prompt for regions until the quit sentinel or end of input
    ///
    /// A region that is not found is reported on `out` and the loop moves
    /// on to the next prompt. Any other error ends the session.
    pub fn run_interactive<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> Result<SessionSummary> {
        let listing = self.region_listing();
        let mut queries = 0;
        let mut not_found = 0;
        let mut line = String::new();

        let end = loop {
            writeln!(out)?;
            writeln!(out, "{}", listing)?;
            writeln!(out)?;
            write!(out, "{}", PROMPT)?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break SessionEnd::EndOfInput;
            }
            let region = line.trim_end_matches(['\r', '\n']);
            writeln!(out)?;

            if region == self.session.quit_sentinel {
                break SessionEnd::Quit;
            }

            match self.query(region, &mut out) {
                Ok(()) => queries += 1,
                Err(ExplorerError::Atlas(e)) if e.is_not_found() => {
                    warn!("Query for '{}' failed: {}", region, e);
                    writeln!(out, "{}", e)?;
                    not_found += 1;
                }
                Err(e) => return Err(e),
            }
        };

        info!(
            "Session ended ({:?}): {} report(s), {} region(s) not found",
            end, queries, not_found
        );
        Ok(SessionSummary {
            queries,
            not_found,
            end,
        })
    }

    /// Interactive or single-shot, per `session.interactive`
    pub fn run<R: BufRead, W: Write>(&self, input: R, out: W) -> Result<Option<SessionSummary>> {
        if self.session.interactive {
            self.run_interactive(input, out).map(Some)
        } else {
            self.run_once(out).map(|()| None)
        }
    }
}
