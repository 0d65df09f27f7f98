//! Configuration management for asf-keygen
//!
//! Settings come from defaults, an optional TOML file and `ASF_KEYGEN_*`
//! environment variables, in that order. The CLI applies its own flags on
//! top and validates the result.

use crate::encoder::Provenance;
use crate::entropy::KEY_SIZE;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main provisioning configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningConfig {
    /// Directory receiving the local copy of every generated header
    pub output_dir: PathBuf,

    /// TA source directories each header is copied into
    pub distribution_dirs: Vec<PathBuf>,

    /// Render artifacts without writing or copying anything
    pub dry_run: bool,

    /// External entropy source
    pub entropy: EntropyConfig,

    /// Header provenance comment
    pub provenance: Provenance,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// External entropy source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntropyConfig {
    /// Generator binary, looked up on `PATH` when relative
    pub program: PathBuf,

    /// Arguments placed before the requested byte count
    pub args: Vec<String>,

    /// Bytes of entropy per key
    pub key_bytes: u32,

    /// Upper bound on the generator's run time
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            distribution_dirs: vec![PathBuf::from("../optee_ta/asf")],
            dry_run: false,
            entropy: EntropyConfig::default(),
            provenance: Provenance::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for EntropyConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("openssl"),
            args: vec!["rand".to_string(), "-base64".to_string()],
            key_bytes: KEY_SIZE,
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

impl ProvisioningConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: ASF_KEYGEN_<KEY>
    /// Example: ASF_KEYGEN_OUTPUT_DIR=build/keys
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default().with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadError {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `ASF_KEYGEN_*` environment variables on top of `self`
    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        self.apply_overrides(|key| env::var_os(key).map(|v| v.to_string_lossy().into_owned()))?;
        Ok(self)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("ASF_KEYGEN_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(dirs) = lookup("ASF_KEYGEN_DISTRIBUTION_DIRS") {
            self.distribution_dirs = env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(dry_run) = lookup("ASF_KEYGEN_DRY_RUN") {
            self.dry_run = dry_run
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid dry run flag: {}", e)))?;
        }

        // Entropy config
        if let Some(program) = lookup("ASF_KEYGEN_ENTROPY_PROGRAM") {
            self.entropy.program = PathBuf::from(program);
        }
        if let Some(timeout) = lookup("ASF_KEYGEN_ENTROPY_TIMEOUT") {
            self.entropy.timeout = humantime::parse_duration(&timeout).map_err(|e| {
                ConfigError::InvalidValue(format!("Invalid entropy timeout: {}", e))
            })?;
        }
        if let Some(key_bytes) = lookup("ASF_KEYGEN_KEY_BYTES") {
            self.entropy.key_bytes = key_bytes
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid key size: {}", e)))?;
        }

        // Logging config
        if let Some(level) = lookup("ASF_KEYGEN_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("ASF_KEYGEN_LOG_JSON") {
            self.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The TA refuses any key that is not exactly AES-256 sized
        if self.entropy.key_bytes != KEY_SIZE {
            return Err(ConfigError::ValidationFailed(format!(
                "key_bytes must be {}, got {}",
                KEY_SIZE, self.entropy.key_bytes
            )));
        }

        if self.entropy.timeout.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "entropy timeout must be greater than 0".to_string(),
            ));
        }

        if self.entropy.program.as_os_str().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "entropy program must not be empty".to_string(),
            ));
        }

        if self.distribution_dirs.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "at least one distribution directory is required".to_string(),
            ));
        }

        if self.provenance.tool_name.trim().is_empty() || self.provenance.author.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "provenance tool_name and author must not be empty".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "warning", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        let path = path.as_ref();
        std::fs::write(path, contents).map_err(|source| ConfigError::FileWriteError {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}
