//! Configuration file loader for the `.labflow/` directory structure.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.labflow/` directory, including:
//! - `config.toml`: Global settings
//! - `types/*.yaml`: Type catalogs with their stage templates

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::template_store::TemplateStore;
use lf_protocol::{GlobalConfig, LabType};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Name of the project directory holding configuration and case files.
pub const PROJECT_DIR: &str = ".labflow";

/// Loads all configuration from the `.labflow/` directory.
///
/// This function scans the `.labflow/` directory and loads:
/// - Global configuration from `config.toml`
/// - Type definitions from `types/*.yaml` and `types/*.yml` files
///
/// # Arguments
///
/// * `root` - Root directory containing the `.labflow/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. If directories or files
/// are missing (but the root exists), returns an empty/default configuration
/// rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML or YAML)
/// - A Type has duplicate stage keys, or two files declare the same Type id
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let lf_dir = root.join(PROJECT_DIR);

    // If .labflow doesn't exist, return default config
    if !lf_dir.exists() {
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&lf_dir)?;
    let types = load_types(&lf_dir)?;

    let types_dir = lf_dir.join("types");
    let types = TemplateStore::from_types(types).map_err(|e| ConfigError::InvalidConfig {
        path: types_dir,
        reason: e.to_string(),
    })?;

    debug!(
        types = types.list_types().len(),
        policy = %global.default_jump_policy,
        "configuration loaded"
    );

    Ok(AppConfig { global, types })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(lf_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = lf_dir.join("config.toml");

    // If config.toml doesn't exist, return default
    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path,
            source,
        })?;

    Ok(config)
}

/// Loads all Type definitions from `types/*.yaml`, sorted by file name.
fn load_types(lf_dir: &Path) -> ConfigResult<Vec<LabType>> {
    let types_dir = lf_dir.join("types");

    if !types_dir.exists() {
        return Ok(Vec::new());
    }

    let mut types = Vec::new();

    for entry in WalkDir::new(&types_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: types_dir.clone(),
            source,
        })?;

        let path = entry.path();

        let ext = path.extension().and_then(|s| s.to_str());
        if ext != Some("yaml") && ext != Some("yml") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let lab_type: LabType =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::YamlParse {
                path: path.to_path_buf(),
                source,
            })?;

        types.push(lab_type);
    }

    Ok(types)
}
