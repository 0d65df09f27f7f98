//! Test fixtures for the provisioning pipeline

use crate::config::ProvisioningConfig;
use crate::entropy::{EntropyError, EntropySource, KeyMaterialBytes};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// Config writing into `output_dir` and distributing to `ta_dir`
pub fn test_config(output_dir: &Path, ta_dir: &Path) -> ProvisioningConfig {
    ProvisioningConfig {
        output_dir: output_dir.to_path_buf(),
        distribution_dirs: vec![ta_dir.to_path_buf()],
        ..Default::default()
    }
}

/// Entropy source replaying a fixed script of results, one per call
///
/// Running past the end of the script yields an `Unavailable` error.
pub struct ScriptedEntropySource {
    script: Mutex<VecDeque<Result<Vec<u8>, EntropyError>>>,
}

impl ScriptedEntropySource {
    pub fn new(script: Vec<Result<Vec<u8>, EntropyError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl EntropySource for ScriptedEntropySource {
    async fn generate(&self, _num_bytes: u32) -> Result<KeyMaterialBytes, EntropyError> {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result.map(KeyMaterialBytes::new),
            None => Err(EntropyError::Unavailable("script exhausted".to_string())),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_source_replays_in_order() {
        let source = ScriptedEntropySource::new(vec![
            Ok(vec![1u8; 32]),
            Err(EntropyError::Failed("boom".to_string())),
        ]);

        assert_eq!(source.generate(32).await.unwrap().as_bytes(), &[1u8; 32]);
        assert!(matches!(source.generate(32).await, Err(EntropyError::Failed(_))));
        assert_eq!(source.remaining(), 0);
        assert!(matches!(source.generate(32).await, Err(EntropyError::Unavailable(_))));
    }
}
