//! Entropy drawn from an external CSPRNG process

use super::{EntropyError, EntropySource, KeyMaterialBytes};
use crate::config::EntropyConfig;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;
use zeroize::Zeroizing;

/// Runs `<program> <args..> <num_bytes>` and decodes its base64 stdout
///
/// With the defaults this is `openssl rand -base64 32`.
#[derive(Debug, Clone)]
pub struct CommandEntropySource {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandEntropySource {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    pub fn from_config(config: &EntropyConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone(), config.timeout)
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }
}

#[async_trait]
impl EntropySource for CommandEntropySource {
    async fn generate(&self, num_bytes: u32) -> Result<KeyMaterialBytes, EntropyError> {
        let program = self.program_name();
        debug!(program = %program, num_bytes, "spawning entropy source");

        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(num_bytes.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EntropyError::Unavailable(format!("failed to spawn '{program}': {e}")))?;

        // Dropping the future on expiry drops the child, which kills it.
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result
                .map_err(|e| EntropyError::Failed(format!("failed to wait for '{program}': {e}")))?,
            Err(_) => {
                return Err(EntropyError::Unavailable(format!(
                    "'{program}' did not finish within {}",
                    humantime::format_duration(self.timeout)
                )))
            }
        };

        let stdout = Zeroizing::new(output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EntropyError::Failed(format!(
                "'{program}' exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        decode_output(&stdout, num_bytes)
    }

    fn describe(&self) -> String {
        let mut parts = vec![self.program_name()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Decode the generator's base64 output, refusing anything short or malformed
///
/// The output itself never ends up in an error message.
fn decode_output(stdout: &[u8], num_bytes: u32) -> Result<KeyMaterialBytes, EntropyError> {
    let text = std::str::from_utf8(stdout)
        .map_err(|_| EntropyError::Failed("output is not valid UTF-8".to_string()))?;

    // openssl wraps base64 output every 64 columns
    let compact: Zeroizing<String> =
        Zeroizing::new(text.chars().filter(|c| !c.is_ascii_whitespace()).collect());
    if compact.is_empty() {
        return Err(EntropyError::Failed("empty output".to_string()));
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|_| EntropyError::Failed("output is not valid base64".to_string()))?;
    let bytes = KeyMaterialBytes::new(bytes);

    if bytes.len() != num_bytes as usize {
        return Err(EntropyError::Failed(format!(
            "expected {} bytes of entropy, got {}",
            num_bytes,
            bytes.len()
        )));
    }

    Ok(bytes)
}
