//! Provisioning orchestrator
//!
//! Drives each selected role through
//! `Generating → Encoding → WritingLocal → Distributing → Done`.
//! Roles run one after another and independently: a failed role is recorded
//! and the next role still runs. Failures are reported together at the end.

use crate::config::ProvisioningConfig;
use crate::distributor::distribute;
use crate::encoder::KeyEncoder;
use crate::entropy::{EntropySource, KeyMaterial};
use crate::error::{ProvisioningError, ProvisioningResult, RoleError, RoleFailure};
use crate::registry::{self, KeyRole};
use std::collections::BTreeSet;
use tracing::{debug, error, info, info_span, Instrument};

mod report;
mod selection;

pub use report::{ProvisioningReport, RoleOutcome, RoleReport, Stage, Summary};
pub use selection::{resolve_roles, RoleFlags};

/// Runs the per-role pipeline against an injected configuration
pub struct Provisioner<E> {
    config: ProvisioningConfig,
    entropy: E,
    encoder: KeyEncoder,
}

impl<E: EntropySource> Provisioner<E> {
    pub fn new(config: ProvisioningConfig, entropy: E) -> Self {
        let encoder = KeyEncoder::new(config.provenance.clone());
        Self {
            config,
            entropy,
            encoder,
        }
    }

    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Provision every role in `roles`
    ///
    /// Returns `Err` only for an empty selection. Per-role failures are
    /// carried by the report; see [`ProvisioningReport::into_result`].
    pub async fn provision(
        &self,
        roles: &BTreeSet<KeyRole>,
    ) -> ProvisioningResult<ProvisioningReport> {
        if roles.is_empty() {
            return Err(ProvisioningError::InvalidRoleSelection(
                "no role selected".to_string(),
            ));
        }

        info!(
            roles = roles.len(),
            entropy = %self.entropy.describe(),
            dry_run = self.config.dry_run,
            "starting key provisioning"
        );

        let mut report = ProvisioningReport::default();
        for &role in roles {
            let span = info_span!("provision", role = %role);
            let outcome = match self.run_pipeline(role).instrument(span).await {
                Ok(outcome) => outcome,
                Err(failure) => {
                    error!(
                        role = %failure.role,
                        macro_name = failure.macro_name,
                        stage = %failure.stage,
                        cause = %failure.cause,
                        "key provisioning failed"
                    );
                    RoleOutcome::Failed(failure)
                }
            };
            report.push(role, outcome);
        }

        Ok(report)
    }

    async fn run_pipeline(&self, role: KeyRole) -> Result<RoleOutcome, RoleFailure> {
        debug!("generating key material");
        let bytes = self
            .entropy
            .generate(self.config.entropy.key_bytes)
            .await
            .map_err(failed_at(role, Stage::Generating))?;
        let material = KeyMaterial::new(role, bytes);
        let spec = registry::spec(material.role());

        debug!(macro_name = spec.macro_name, "encoding artifact");
        let artifact = self.encoder.encode(material.bytes(), spec);
        match artifact.decode_key() {
            Ok(decoded) if decoded == *material.bytes() => {}
            _ => {
                return Err(RoleFailure::new(
                    role,
                    Stage::Encoding,
                    RoleError::Encoding(
                        "embedded key text does not decode to the generated key".to_string(),
                    ),
                ))
            }
        }
        drop(material);

        let local_path = self.config.output_dir.join(artifact.file_name());
        if self.config.dry_run {
            info!(file = %local_path.display(), "dry run, artifact not written");
            return Ok(RoleOutcome::Rendered { local_path });
        }

        let local_path = artifact
            .write_to(&self.config.output_dir)
            .await
            .map_err(failed_at(role, Stage::WritingLocal))?;
        debug!(file = %local_path.display(), "artifact written");

        let mut distributed_to = Vec::with_capacity(self.config.distribution_dirs.len());
        for dir in &self.config.distribution_dirs {
            let copied = distribute(&local_path, dir)
                .await
                .map_err(failed_at(role, Stage::Distributing))?;
            distributed_to.push(copied);
        }

        info!(
            file = %local_path.display(),
            destinations = distributed_to.len(),
            "key provisioned"
        );

        Ok(RoleOutcome::Done {
            local_path,
            distributed_to,
        })
    }
}

fn failed_at<C: Into<RoleError>>(role: KeyRole, stage: Stage) -> impl FnOnce(C) -> RoleFailure {
    move |cause| RoleFailure::new(role, stage, cause.into())
}
