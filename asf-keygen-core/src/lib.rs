//! Key generation and provisioning for the ASF trusted application.
//!
//! Generates the symmetric keys of the `communication` and `injection` flows
//! from an external CSPRNG, renders each as a C header defining a base64
//! string constant, writes it locally and copies it into the TA source tree.

pub mod config;
pub mod distributor;
pub mod encoder;
pub mod entropy;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::ProvisioningConfig;
pub use encoder::{GeneratedArtifact, KeyEncoder, Provenance};
pub use entropy::{CommandEntropySource, EntropySource, FixedEntropySource, KEY_SIZE};
pub use error::{ProvisioningError, RoleFailure};
pub use logging::{init_logging_with_config, LogConfig, LogLevel};
pub use orchestrator::{resolve_roles, ProvisioningReport, Provisioner, RoleFlags, Summary};
pub use registry::KeyRole;
