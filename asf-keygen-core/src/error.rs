//! Error types for the provisioning pipeline

use crate::distributor::DistributionError;
use crate::encoder::ArtifactWriteError;
use crate::entropy::EntropyError;
use crate::orchestrator::Stage;
use crate::registry::KeyRole;
use thiserror::Error;

/// Result type for provisioning operations
pub type ProvisioningResult<T> = Result<T, ProvisioningError>;

/// Cause of a single role's pipeline failure
#[derive(Debug, Error)]
pub enum RoleError {
    #[error(transparent)]
    Entropy(#[from] EntropyError),

    /// Rendered header did not decode back to the generated key
    #[error("EncodingError: {0}")]
    Encoding(String),

    #[error(transparent)]
    ArtifactWrite(#[from] ArtifactWriteError),

    #[error(transparent)]
    Distribution(#[from] DistributionError),
}

/// A role that ended in the failed state, with the stage it failed in
///
/// Only the role and macro names are carried, never key text.
#[derive(Debug, Error)]
#[error("role '{role}' ({macro_name}) failed while {stage}: {cause}")]
pub struct RoleFailure {
    pub role: KeyRole,
    pub macro_name: &'static str,
    pub stage: Stage,
    #[source]
    pub cause: RoleError,
}

impl RoleFailure {
    pub fn new(role: KeyRole, stage: Stage, cause: RoleError) -> Self {
        Self {
            role,
            macro_name: role.macro_name(),
            stage,
            cause,
        }
    }
}

/// Errors surfaced to the caller of the provisioning pipeline
#[derive(Debug, Error)]
pub enum ProvisioningError {
    /// A role name outside the registry, or an empty selection
    #[error("InvalidRoleSelection: {0}")]
    InvalidRoleSelection(String),

    #[error("{} of {} role(s) failed: {}", .failures.len(), .attempted, describe_failures(.failures))]
    RolesFailed {
        failures: Vec<RoleFailure>,
        attempted: usize,
    },
}

fn describe_failures(failures: &[RoleFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_role_failure_names_role_macro_and_stage() {
        let failure = RoleFailure::new(
            KeyRole::Communication,
            Stage::Generating,
            EntropyError::Unavailable("failed to spawn 'openssl'".to_string()).into(),
        );
        assert_eq!(
            failure.to_string(),
            "role 'communication' (ASF_COM_KEY) failed while generating key material: \
             EntropySourceUnavailable: failed to spawn 'openssl'"
        );
    }

    #[test]
    fn test_roles_failed_lists_every_failure() {
        let err = ProvisioningError::RolesFailed {
            failures: vec![RoleFailure::new(
                KeyRole::Injection,
                Stage::Distributing,
                DistributionError::MissingDestination(PathBuf::from("/ta")).into(),
            )],
            attempted: 2,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("1 of 2 role(s) failed: "));
        assert!(msg.contains("ASF_INJECT_KEY"));
        assert!(msg.contains("DistributionError"));
    }
}
