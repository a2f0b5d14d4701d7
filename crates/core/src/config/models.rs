//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines
//! global settings and the Type catalog into a single configuration object.

use crate::template_store::TemplateStore;
use lf_protocol::GlobalConfig;

/// Unified application configuration loaded from the `.labflow/` directory.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Global settings
/// - `types/*.yaml`: Type catalogs with their stage templates
///
/// # Example
///
/// ```rust,no_run
/// use lf_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} types", config.types.list_types().len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// All Types loaded from `types/*.yaml`, validated.
    pub types: TemplateStore,
}
