// Copyright 2025 Mesoconnect Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Configuration is layered:
//! 1. TOML file (or built-in defaults when no file exists)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, MesoconnectConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the configuration file
///
/// Search order:
/// 1. `MESOCONNECT_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("MESOCONNECT_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by MESOCONNECT_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        for ancestor in cwd.ancestors().skip(1).take(5) {
            search_paths.push(ancestor.join(CONFIG_FILE_NAME));
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet MESOCONNECT_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load configuration
///
/// # Arguments
///
/// * `config_path` - Explicit config file. If `None`, the file is discovered and
///   built-in defaults are used when none exists.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns an error if an explicit file is missing, contains invalid TOML, or
/// the resulting configuration fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<MesoconnectConfig> {
    let config_file = match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => match find_config_file() {
            Ok(path) => Some(path),
            // An explicitly named file that is missing is still an error
            Err(e) if env::var("MESOCONNECT_CONFIG_PATH").is_ok() => return Err(e),
            Err(_) => None,
        },
    };

    let mut config = match config_file {
        Some(path) => {
            let content = fs::read_to_string(&path)?;
            toml::from_str(&content)?
        }
        None => MesoconnectConfig::default(),
    };

    apply_environment_overrides(&mut config)?;

    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    validate_config(&config)?;
    Ok(config)
}

fn parse_bool(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

fn parse_count(source: &str, value: &str) -> ConfigResult<usize> {
    value.trim().parse::<usize>().map_err(|_| {
        ConfigError::ValidationError(format!(
            "{} must be a non-negative integer, got '{}'",
            source, value
        ))
    })
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MESOCONNECT_DATA_DIR` -> `data.dir`
/// - `MESOCONNECT_USE_REGIONAL` -> `data.use_regional_matrix`
/// - `MESOCONNECT_PRINT_INPUTS` -> `report.print_inputs`
/// - `MESOCONNECT_NUM_REGIONS` -> `report.num_regions_listed`
/// - `MESOCONNECT_QUIT_SENTINEL` -> `session.quit_sentinel`
/// - `MESOCONNECT_LOG_LEVEL` -> `logging.level`
///
/// # Errors
///
/// `ValidationError` if `MESOCONNECT_NUM_REGIONS` is not an integer
pub fn apply_environment_overrides(config: &mut MesoconnectConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("MESOCONNECT_DATA_DIR") {
        config.data.dir = PathBuf::from(value);
    }
    if let Ok(value) = env::var("MESOCONNECT_USE_REGIONAL") {
        config.data.use_regional_matrix = parse_bool(&value);
    }
    if let Ok(value) = env::var("MESOCONNECT_PRINT_INPUTS") {
        config.report.print_inputs = parse_bool(&value);
    }
    if let Ok(value) = env::var("MESOCONNECT_NUM_REGIONS") {
        config.report.num_regions_listed = parse_count("MESOCONNECT_NUM_REGIONS", &value)?;
    }
    if let Ok(value) = env::var("MESOCONNECT_QUIT_SENTINEL") {
        config.session.quit_sentinel = value;
    }
    if let Ok(value) = env::var("MESOCONNECT_LOG_LEVEL") {
        config.logging.level = value;
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"data_dir": "/data", "num_regions": "10"}`)
///
/// # Errors
///
/// `ValidationError` if `num_regions` is not an integer
pub fn apply_cli_overrides(config: &mut MesoconnectConfig, cli_args: &HashMap<String, String>) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("data_dir") {
        config.data.dir = PathBuf::from(value);
    }
    if let Some(value) = cli_args.get("use_regional") {
        config.data.use_regional_matrix = parse_bool(value);
    }
    if let Some(value) = cli_args.get("print_inputs") {
        config.report.print_inputs = parse_bool(value);
    }
    if let Some(value) = cli_args.get("num_regions") {
        config.report.num_regions_listed = parse_count("num_regions", value)?;
    }
    if let Some(value) = cli_args.get("region") {
        config.session.default_region = value.clone();
        config.session.interactive = false;
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("MESOCONNECT_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("MESOCONNECT_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_missing_env_path_is_an_error() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("MESOCONNECT_CONFIG_PATH", "/nonexistent/mesoconnect.toml");
        let result = load_config(None, None);
        env::remove_var("MESOCONNECT_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[data]").unwrap();
        writeln!(file, "dir = \"/srv/allen\"").unwrap();
        writeln!(file, "use_regional_matrix = true").unwrap();
        writeln!(file, "[report]").unwrap();
        writeln!(file, "num_regions_listed = 12").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.data.dir, PathBuf::from("/srv/allen"));
        assert!(config.data.use_regional_matrix);
        assert_eq!(config.report.num_regions_listed, 12);
        assert_eq!(config.session.default_region, "RSPd");
    }

    #[test]
    fn test_invalid_toml() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[report\nnum_regions_listed = ").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_runs_on_load() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[report]\nnum_regions_listed = 0\n").unwrap();

        let result = load_config(Some(&config_path), None);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = MesoconnectConfig::default();

        env::set_var("MESOCONNECT_PRINT_INPUTS", "yes");
        env::set_var("MESOCONNECT_NUM_REGIONS", "5");

        let result = apply_environment_overrides(&mut config);

        env::remove_var("MESOCONNECT_PRINT_INPUTS");
        env::remove_var("MESOCONNECT_NUM_REGIONS");

        assert!(result.is_ok());
        assert!(config.report.print_inputs);
        assert_eq!(config.report.num_regions_listed, 5);
    }

    #[test]
    fn test_cli_region_disables_interactive() {
        let mut config = MesoconnectConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("region".to_string(), "VISp".to_string());

        apply_cli_overrides(&mut config, &cli_args).unwrap();

        assert_eq!(config.session.default_region, "VISp");
        assert!(!config.session.interactive);
    }

    #[test]
    fn test_unparseable_region_count_rejected() {
        let _env_lock = ENV_LOCK.lock().unwrap();

        let mut config = MesoconnectConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("num_regions".to_string(), "ten".to_string());
        assert!(matches!(
            apply_cli_overrides(&mut config, &cli_args),
            Err(ConfigError::ValidationError(ref msg)) if msg.contains("num_regions") && msg.contains("'ten'")
        ));
        assert_eq!(config.report.num_regions_listed, 30);

        env::set_var("MESOCONNECT_NUM_REGIONS", "-3");
        let env_result = apply_environment_overrides(&mut config);
        env::remove_var("MESOCONNECT_NUM_REGIONS");

        assert!(matches!(
            env_result,
            Err(ConfigError::ValidationError(ref msg)) if msg.contains("MESOCONNECT_NUM_REGIONS")
        ));
    }

    #[test]
    fn test_unparseable_count_fails_load() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[report]\nnum_regions_listed = 4\n").unwrap();

        let mut cli_args = HashMap::new();
        cli_args.insert("num_regions".to_string(), "4x".to_string());

        let result = load_config(Some(&config_path), Some(&cli_args));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[data]").unwrap();
        writeln!(file, "dir = \"file-dir\"").unwrap();
        writeln!(file, "[report]").unwrap();
        writeln!(file, "num_regions_listed = 8").unwrap();

        env::set_var("MESOCONNECT_DATA_DIR", "env-dir");
        env::set_var("MESOCONNECT_NUM_REGIONS", "9");

        let mut cli_args = HashMap::new();
        cli_args.insert("data_dir".to_string(), "cli-dir".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args)).unwrap();

        env::remove_var("MESOCONNECT_DATA_DIR");
        env::remove_var("MESOCONNECT_NUM_REGIONS");

        // CLI wins for dir, env wins for count (no CLI override)
        assert_eq!(config.data.dir, PathBuf::from("cli-dir"));
        assert_eq!(config.report.num_regions_listed, 9);
    }
}
