//! Deterministic stand-in for the external generator

use super::{EntropyError, EntropySource, KeyMaterialBytes};
use async_trait::async_trait;

/// Hands out the same bytes on every call
///
/// Only meant for dry runs and tests. A request for a length other than the
/// stored pattern's fails the same way a truncated generator output would.
#[derive(Clone)]
pub struct FixedEntropySource {
    bytes: KeyMaterialBytes,
}

impl FixedEntropySource {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: KeyMaterialBytes::new(bytes.into()),
        }
    }

    /// `len` zero bytes
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0u8; len])
    }
}

#[async_trait]
impl EntropySource for FixedEntropySource {
    async fn generate(&self, num_bytes: u32) -> Result<KeyMaterialBytes, EntropyError> {
        if self.bytes.len() != num_bytes as usize {
            return Err(EntropyError::Failed(format!(
                "expected {} bytes of entropy, got {}",
                num_bytes,
                self.bytes.len()
            )));
        }
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("fixed pattern ({} bytes)", self.bytes.len())
    }
}
