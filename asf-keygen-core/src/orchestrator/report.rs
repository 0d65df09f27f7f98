//! Per-role outcomes of a provisioning run

use crate::error::{ProvisioningError, RoleFailure};
use crate::registry::KeyRole;
use std::fmt;
use std::path::PathBuf;

/// Pipeline stage a role was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Generating,
    Encoding,
    WritingLocal,
    Distributing,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Generating => "generating key material",
            Stage::Encoding => "encoding artifact",
            Stage::WritingLocal => "writing local artifact",
            Stage::Distributing => "distributing artifact",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal state of one role's pipeline
#[derive(Debug)]
pub enum RoleOutcome {
    /// Written locally and copied to every distribution directory
    Done {
        local_path: PathBuf,
        distributed_to: Vec<PathBuf>,
    },
    /// Dry run: rendered, nothing touched on disk
    Rendered { local_path: PathBuf },
    Failed(RoleFailure),
}

impl RoleOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RoleOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub struct RoleReport {
    pub role: KeyRole,
    pub outcome: RoleOutcome,
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summary {
    Success,
    /// Some roles provisioned, some failed
    Partial,
    Failure,
}

/// Collected outcomes, in the order roles were processed
#[derive(Debug, Default)]
pub struct ProvisioningReport {
    entries: Vec<RoleReport>,
}

impl ProvisioningReport {
    pub fn push(&mut self, role: KeyRole, outcome: RoleOutcome) {
        self.entries.push(RoleReport { role, outcome });
    }

    pub fn entries(&self) -> &[RoleReport] {
        &self.entries
    }

    pub fn outcome(&self, role: KeyRole) -> Option<&RoleOutcome> {
        self.entries
            .iter()
            .find(|entry| entry.role == role)
            .map(|entry| &entry.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RoleFailure> {
        self.entries.iter().filter_map(|entry| match &entry.outcome {
            RoleOutcome::Failed(failure) => Some(failure),
            _ => None,
        })
    }

    pub fn succeeded(&self) -> impl Iterator<Item = KeyRole> + '_ {
        self.entries
            .iter()
            .filter(|entry| !entry.outcome.is_failed())
            .map(|entry| entry.role)
    }

    pub fn summary(&self) -> Summary {
        let failed = self.failures().count();
        if failed == 0 {
            Summary::Success
        } else if failed == self.entries.len() {
            Summary::Failure
        } else {
            Summary::Partial
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary() == Summary::Success
    }

    /// `Ok` only if every role succeeded; otherwise every failure is returned
    pub fn into_result(self) -> Result<(), ProvisioningError> {
        let attempted = self.entries.len();
        let failures: Vec<RoleFailure> = self
            .entries
            .into_iter()
            .filter_map(|entry| match entry.outcome {
                RoleOutcome::Failed(failure) => Some(failure),
                _ => None,
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ProvisioningError::RolesFailed {
                failures,
                attempted,
            })
        }
    }
}
