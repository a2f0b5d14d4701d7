//! Directory structure and file generation for .labflow initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::loader::PROJECT_DIR;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Type template written in minimal mode.
const MINIMAL_TYPE: &str = "types/crown.yaml";

/// Options for initializing a .labflow directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Target directory where .labflow will be created.
    pub target_dir: PathBuf,

    /// Overwrite existing .labflow directory if it exists.
    pub force: bool,

    /// Create minimal template (only the crown Type).
    pub minimal: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
            minimal: false,
        }
    }
}

/// Generate a complete .labflow directory structure with templates.
///
/// This function creates the following structure:
/// ```text
/// .labflow/
/// ├── config.toml
/// ├── cases/
/// └── types/
///     ├── crown.yaml
///     └── bridge.yaml (unless minimal)
/// ```
///
/// With `force`, template files are rewritten in place. Existing case files
/// are left alone.
///
/// # Errors
///
/// Returns an `InitError` if:
/// - The .labflow directory already exists (without force flag)
/// - A template file cannot be found
/// - File system operations fail
pub async fn generate_labflow_structure(options: InitOptions) -> InitResult<()> {
    let lf_dir = options.target_dir.join(PROJECT_DIR);

    if lf_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(lf_dir));
    }

    for sub in ["types", "cases"] {
        fs::create_dir_all(lf_dir.join(sub)).map_err(|source| InitError::DirectoryCreate {
            path: lf_dir.join(sub),
            source,
        })?;
    }

    write_template_file(&lf_dir, "config.toml")?;

    if options.minimal {
        write_template_file(&lf_dir, MINIMAL_TYPE)?;
    } else {
        for type_path in list_templates("types/") {
            write_template_file(&lf_dir, &type_path)?;
        }
    }

    info!(path = %lf_dir.display(), minimal = options.minimal, "project initialized");
    Ok(())
}

fn write_template_file(lf_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = lf_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })?;

    Ok(())
}
