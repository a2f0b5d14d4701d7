//! Type catalog models for `.labflow/types/*.yaml`.
//!
//! A manufacturing Type owns an ordered list of stage templates. Cases copy
//! that list when they are created and never look at the Type again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

/// Design-time blueprint of one pipeline step.
///
/// # Example
///
/// ```yaml
/// key: waxing
/// name: Waxing
/// order: 2
/// color: "#f5a623"
/// allowed_roles:
///   - technician
/// ```
///
/// `allowed-roles` is accepted on input as well.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct StageTemplate {
    /// Identifier unique within the owning Type, compared case-insensitively.
    pub key: String,

    /// Display label.
    pub name: String,

    /// 1-based position. Dense (1..N) after every structural edit.
    pub order: u32,

    /// Free-form display hint, never validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Roles permitted to act on this stage. Empty means unrestricted.
    #[serde(default, alias = "allowed-roles")]
    pub allowed_roles: BTreeSet<String>,
}

/// Canonical form of a stage key: trimmed and lowercased.
///
/// Every key comparison goes through this, so lookups, duplicate detection
/// and skip checks agree on which keys are equal.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

impl StageTemplate {
    /// Returns true when `other` names the same stage key, ignoring case and
    /// surrounding whitespace.
    pub fn key_matches(&self, other: &str) -> bool {
        normalize_key(&self.key) == normalize_key(other)
    }
}

/// A manufacturing/service category owning an ordered set of stage templates.
///
/// # Example
///
/// ```yaml
/// id: crown
/// name: Zirconia Crown
/// stages:
///   - key: scan
///     name: Scan
///     order: 1
///   - key: design
///     name: Design
///     order: 2
///     allowed_roles: [designer]
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct LabType {
    /// Unique identifier of the Type.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Stage templates sorted by `order`.
    #[serde(default)]
    pub stages: Vec<StageTemplate>,
}

impl LabType {
    /// Looks up a stage template by key, ignoring case.
    pub fn stage(&self, key: &str) -> Option<&StageTemplate> {
        self.stages.iter().find(|stage| stage.key_matches(key))
    }
}
