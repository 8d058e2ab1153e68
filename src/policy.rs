//! Role-based visibility rules, enforced identically regardless of
//! transport. Checks run before any data is fetched so a denied caller
//! learns nothing about another user's records.

use crate::assignment::Assignment;
use crate::user::Role;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Decoded caller context, trusted as issued by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }
}

/// Why a credential was rejected, distinct from an authorization denial so
/// clients can tell "log in again" from "you don't have access".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialFault {
    Missing,
    Unknown,
    Expired,
}

impl CredentialFault {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialFault::Missing => "missing",
            CredentialFault::Unknown => "unknown",
            CredentialFault::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No valid identity: absent, unknown, or expired credential.
    Unauthenticated(CredentialFault),
    /// Valid identity, insufficient role or ownership.
    Forbidden { resource: String, reason: String },
}

impl AccessError {
    fn forbidden(identity: &Identity, resource: impl Into<String>, reason: impl Into<String>) -> Self {
        let resource = resource.into();
        let reason = reason.into();
        warn!(
            user_id = %identity.user_id,
            role = identity.role.as_str(),
            resource = %resource,
            "access denied: {reason}"
        );
        AccessError::Forbidden { resource, reason }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::Unauthenticated(fault) => {
                write!(f, "unauthorized: {} credential", fault.as_str())
            }
            AccessError::Forbidden { resource, reason } => {
                write!(f, "forbidden ({resource}): {reason}")
            }
        }
    }
}

impl std::error::Error for AccessError {}

pub type AccessResult = Result<(), AccessError>;

/// Directory-style listings (all engineers, all projects, all assignments)
/// are manager-only.
pub fn authorize_directory_read(identity: &Identity) -> AccessResult {
    if identity.role == Role::Manager {
        return Ok(());
    }
    Err(AccessError::forbidden(
        identity,
        "directory",
        "only managers can view collection listings",
    ))
}

/// An engineer may read their own record and assignments; a manager may
/// read any engineer's.
pub fn authorize_engineer_read(identity: &Identity, engineer_id: &str) -> AccessResult {
    match identity.role {
        Role::Manager => Ok(()),
        Role::Engineer if identity.user_id == engineer_id => Ok(()),
        Role::Engineer => Err(AccessError::forbidden(
            identity,
            format!("engineer/{engineer_id}"),
            "engineers can only view their own profile and assignments",
        )),
    }
}

/// An engineer may read a project only when one of their own assignments
/// references it. `own_assignments` must already be scoped to the caller.
pub fn authorize_project_read(
    identity: &Identity,
    project_id: &str,
    own_assignments: &[Assignment],
) -> AccessResult {
    if identity.role == Role::Manager {
        return Ok(());
    }
    let referenced = own_assignments
        .iter()
        .any(|a| a.engineer_id == identity.user_id && a.project_id == project_id);
    if referenced {
        Ok(())
    } else {
        Err(AccessError::forbidden(
            identity,
            format!("project/{project_id}"),
            "engineers can only view projects referenced by their own assignments",
        ))
    }
}

/// All mutation (projects, assignments, user records) is manager-only in
/// this scope.
pub fn authorize_write(identity: &Identity, resource: &str) -> AccessResult {
    if identity.role == Role::Manager {
        return Ok(());
    }
    Err(AccessError::forbidden(
        identity,
        resource,
        "only managers can create, update, or delete records",
    ))
}
