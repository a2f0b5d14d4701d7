//! Jump policy names.
//!
//! A jump policy decides which stage-index moves are legal from the current
//! stage. The policy is chosen explicitly when a case is created and stored
//! on the case.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ts_rs::TS;

/// Named rule set governing which stage moves are legal.
///
/// Serialized with the kebab-case names used in config files:
/// `none`, `next-only`, `forward-any`, `forward-when-previous-done`,
/// `both-when-previous-done`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, TS)]
#[serde(rename_all = "kebab-case")]
pub enum JumpPolicy {
    /// No move is ever allowed.
    #[serde(rename = "none")]
    Disabled,

    /// Only the immediately following stage.
    NextOnly,

    /// Any later stage.
    ForwardAny,

    /// Any later stage, provided every stage before the target is done.
    #[default]
    ForwardWhenPreviousDone,

    /// Any stage in either direction, provided every stage before the
    /// target is done.
    BothWhenPreviousDone,
}

impl JumpPolicy {
    /// All policies, in the order they appear in documentation.
    pub const ALL: [JumpPolicy; 5] = [
        JumpPolicy::Disabled,
        JumpPolicy::NextOnly,
        JumpPolicy::ForwardAny,
        JumpPolicy::ForwardWhenPreviousDone,
        JumpPolicy::BothWhenPreviousDone,
    ];

    /// The config-file name of this policy.
    pub fn as_str(self) -> &'static str {
        match self {
            JumpPolicy::Disabled => "none",
            JumpPolicy::NextOnly => "next-only",
            JumpPolicy::ForwardAny => "forward-any",
            JumpPolicy::ForwardWhenPreviousDone => "forward-when-previous-done",
            JumpPolicy::BothWhenPreviousDone => "both-when-previous-done",
        }
    }
}

impl fmt::Display for JumpPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a policy name is not one of the known names.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown jump policy: {0}")]
pub struct UnknownPolicy(pub String);

impl FromStr for JumpPolicy {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JumpPolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == s)
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

/// How the first stage of a freshly created case starts.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "kebab-case")]
pub enum InitialStage {
    /// Every stage starts pending.
    AllPending,

    /// The first stage starts in progress, the rest pending.
    #[default]
    FirstInProgress,
}
