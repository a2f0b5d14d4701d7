//! Global configuration models for `.labflow/config.toml`.
//!
//! This module defines the structure of the global configuration file that
//! controls project-wide workflow settings.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

use crate::policy_models::{InitialStage, JumpPolicy};

/// Represents global settings from `.labflow/config.toml`.
///
/// # Example
///
/// ```toml
/// # .labflow/config.toml
/// default-jump-policy = "forward-when-previous-done"
/// initial-stage = "first-in-progress"
/// superuser-roles = ["admin"]
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Policy handed to new cases when the caller does not pick one.
    ///
    /// Callers read this value and pass it explicitly when creating a case;
    /// the workflow engine never falls back to it on its own.
    #[serde(default)]
    pub default_jump_policy: JumpPolicy,

    /// How the first stage of a new case starts.
    #[serde(default)]
    pub initial_stage: InitialStage,

    /// Roles that may act on every stage regardless of its allowed roles.
    #[serde(default = "default_superuser_roles")]
    pub superuser_roles: Vec<String>,
}

fn default_superuser_roles() -> Vec<String> {
    vec!["admin".to_string()]
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_jump_policy: JumpPolicy::default(),
            initial_stage: InitialStage::default(),
            superuser_roles: default_superuser_roles(),
        }
    }
}
