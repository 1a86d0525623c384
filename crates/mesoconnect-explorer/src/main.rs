// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use mesoconnect_config::load_config;
use mesoconnect_explorer::Explorer;
use mesoconnect_observability::{debug_flags_help, init_logging, parse_debug_flags};

/// Mesoconnect Explorer - ranked inputs and outputs of mesoscale brain regions
#[derive(Parser, Debug)]
#[command(name = "mesoconnect-explorer", version, author, long_about = None, after_help = debug_flags_help())]
struct Args {
    /// Configuration file (otherwise mesoconnect_configuration.toml is searched for)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the .mat data files
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Report a single region and exit instead of prompting
    #[arg(short, long)]
    region: Option<String>,

    /// Report inputs to the region
    #[arg(long, conflicts_with = "outputs")]
    inputs: bool,

    /// Report outputs of the region
    #[arg(long)]
    outputs: bool,

    /// Number of regions listed per injection site
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Use the processed regional matrix instead of the injection-based one
    #[arg(long)]
    regional: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

impl Args {
    /// Overrides in the key format understood by `apply_cli_overrides`
    fn overrides(&self) -> HashMap<String, String> {
        let mut cli = HashMap::new();
        if let Some(dir) = &self.data_dir {
            cli.insert("data_dir".to_string(), dir.display().to_string());
        }
        if let Some(region) = &self.region {
            cli.insert("region".to_string(), region.clone());
        }
        if self.inputs || self.outputs {
            cli.insert("print_inputs".to_string(), self.inputs.to_string());
        }
        if let Some(n) = self.top {
            cli.insert("num_regions".to_string(), n.to_string());
        }
        if self.regional {
            cli.insert("use_regional".to_string(), "true".to_string());
        }
        if self.verbose {
            cli.insert("log_level".to_string(), "debug".to_string());
        }
        cli
    }
}

fn main() -> Result<()> {
    // --debug-* flags belong to the logging setup, not to clap
    let debug_flags = parse_debug_flags();
    let args = Args::parse_from(std::env::args().filter(|a| !a.starts_with("--debug-")));

    let config = load_config(args.config.as_deref(), Some(&args.overrides()))
        .context("Failed to load configuration")?;

    let _logging = init_logging(&debug_flags, &config.logging.level, config.logging.log_dir.as_deref())?;
    info!("mesoconnect-explorer v{}", mesoconnect_explorer::VERSION);
    info!("Data directory: {}", config.data.dir.display());

    let explorer = Explorer::from_config(&config).with_context(|| {
        format!(
            "Failed to load atlas data from {}",
            config.data.dir.display()
        )
    })?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Some(summary) = explorer.run(stdin.lock(), stdout.lock())? {
        info!("{} region(s) reported", summary.queries);
    }

    Ok(())
}
