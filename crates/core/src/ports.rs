//! Collaborator contracts consumed by the workflow.
//!
//! Authentication, role management and type authoring live outside this
//! crate. The workflow only needs a yes/no answer on stage permissions and a
//! way to resolve a Type when a case is created.

use lf_protocol::{LabType, Principal};
use std::collections::BTreeSet;

/// Decides whether a principal may act on a stage.
pub trait Authorizer: Send + Sync {
    fn may_act(&self, allowed_roles: &BTreeSet<String>, principal: &Principal) -> bool;
}

/// Role-set intersection check.
///
/// An empty allowed set is unrestricted. Superuser roles pass every check.
#[derive(Debug, Clone, Default)]
pub struct RoleAuthorizer {
    superuser_roles: BTreeSet<String>,
}

impl RoleAuthorizer {
    pub fn new<I, S>(superuser_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            superuser_roles: superuser_roles.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for RoleAuthorizer {
    fn may_act(&self, allowed_roles: &BTreeSet<String>, principal: &Principal) -> bool {
        allowed_roles.is_empty()
            || principal
                .roles
                .iter()
                .any(|role| allowed_roles.contains(role) || self.superuser_roles.contains(role))
    }
}

/// Resolves a Type identifier to its current stage templates.
///
/// Only consulted when a case is created.
pub trait TypeLookup: Send + Sync {
    fn lookup_type(&self, type_id: &str) -> Option<LabType>;
}
