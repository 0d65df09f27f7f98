//! Entropy sources
//!
//! Key bytes always come from an external, already-audited generator. This
//! crate never runs its own PRNG to produce key material.
//!
//! [`CommandEntropySource`] spawns the host's CSPRNG binary
//! (`openssl rand -base64 N` by default). [`FixedEntropySource`] returns a
//! fixed byte pattern and exists so the pipeline can be exercised without
//! spawning anything.

use crate::registry::KeyRole;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod command;
mod fixed;

pub use command::CommandEntropySource;
pub use fixed::FixedEntropySource;

/// Key length expected by the ASF trusted application (AES-256)
pub const KEY_SIZE: u32 = 32;

/// Entropy source errors
#[derive(Debug, Error)]
pub enum EntropyError {
    /// The generator could not be started, or did not answer in time
    #[error("EntropySourceUnavailable: {0}")]
    Unavailable(String),

    /// The generator ran but failed or produced unusable output
    #[error("EntropySourceError: {0}")]
    Failed(String),
}

/// Raw key bytes, wiped from memory on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterialBytes {
    bytes: Vec<u8>,
}

impl KeyMaterialBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for KeyMaterialBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterialBytes")
            .field("len", &self.bytes.len())
            .finish_non_exhaustive()
    }
}

/// Freshly generated key bytes bound to the role they were drawn for
///
/// Never cached: every provisioning run draws a new one, even for the
/// same role.
#[derive(Debug)]
pub struct KeyMaterial {
    role: KeyRole,
    bytes: KeyMaterialBytes,
}

impl KeyMaterial {
    pub fn new(role: KeyRole, bytes: KeyMaterialBytes) -> Self {
        Self { role, bytes }
    }

    pub fn role(&self) -> KeyRole {
        self.role
    }

    pub fn bytes(&self) -> &KeyMaterialBytes {
        &self.bytes
    }
}

/// Narrow capability over an external random-byte generator
#[async_trait]
pub trait EntropySource: Send + Sync {
    /// Produce exactly `num_bytes` bytes of entropy
    async fn generate(&self, num_bytes: u32) -> Result<KeyMaterialBytes, EntropyError>;

    /// Human-readable name used in logs
    fn describe(&self) -> String;
}
