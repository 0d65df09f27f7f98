//! Rendering key material as an embeddable C header
//!
//! Generated file layout:
//! ```text
//! // SPDX-License-Identifier: BSD-2-Clause
//! /*
//!  * Copyright (C) 2020 <author>
//!  */
//!
//! /* File generated by '<tool-name>' tool */
//!
//! #define <MACRO_NAME>\t\t"<base64-key-text>"
//!
//! ```
//! The TA build includes this header verbatim, so the layout (including the
//! two tabs and the trailing blank line) must stay byte-for-byte stable.

use crate::entropy::KeyMaterialBytes;
use crate::registry::KeySpec;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use zeroize::Zeroizing;

/// SPDX tag stamped on every generated header
pub const LICENSE_TAG: &str = "BSD-2-Clause";

/// Local artifact could not be created or written
#[derive(Debug, Error)]
#[error("ArtifactWriteError: failed to write {}: {source}", .path.display())]
pub struct ArtifactWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Who generated the header and under which copyright line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provenance {
    pub tool_name: String,
    pub copyright_year: String,
    pub author: String,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            tool_name: "asf-keygen".to_string(),
            copyright_year: "2020".to_string(),
            author: "Jean-Pierre Miceli <jean-pierre.miceli@heig-vd.ch>".to_string(),
        }
    }
}

/// A rendered key header, ready to be written out
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    file_name: String,
    macro_name: String,
    key_text: Zeroizing<String>,
    provenance: Provenance,
}

impl GeneratedArtifact {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn macro_name(&self) -> &str {
        &self.macro_name
    }

    /// Base64 key text as embedded in the `#define`
    pub fn key_text(&self) -> &str {
        &self.key_text
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Full header text
    pub fn render(&self) -> Zeroizing<String> {
        let Provenance {
            tool_name,
            copyright_year,
            author,
        } = &self.provenance;

        Zeroizing::new(format!(
            "// SPDX-License-Identifier: {LICENSE_TAG}\n\
             /*\n \
             * Copyright (C) {copyright_year} {author}\n \
             */\n\
             \n\
             /* File generated by '{tool_name}' tool */\n\
             \n\
             #define {}\t\t\"{}\"\n\
             \n",
            self.macro_name,
            self.key_text.as_str(),
        ))
    }

    /// Recover the raw key bytes from the embedded text
    pub fn decode_key(&self) -> Result<KeyMaterialBytes, base64::DecodeError> {
        STANDARD
            .decode(self.key_text.as_bytes())
            .map(KeyMaterialBytes::new)
    }

    /// Write the header into `dir`, replacing any previous file
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, ArtifactWriteError> {
        let path = dir.join(&self.file_name);
        let contents = self.render();
        tokio::fs::write(&path, contents.as_bytes())
            .await
            .map_err(|source| ArtifactWriteError {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

impl fmt::Debug for GeneratedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedArtifact")
            .field("file_name", &self.file_name)
            .field("macro_name", &self.macro_name)
            .field("key_text", &"<redacted>")
            .field("provenance", &self.provenance)
            .finish()
    }
}

/// Turns key bytes into [`GeneratedArtifact`]s. Pure: no I/O, no randomness.
#[derive(Debug, Clone, Default)]
pub struct KeyEncoder {
    provenance: Provenance,
}

impl KeyEncoder {
    pub fn new(provenance: Provenance) -> Self {
        Self { provenance }
    }

    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    pub fn encode(&self, material: &KeyMaterialBytes, spec: &KeySpec) -> GeneratedArtifact {
        let mut encoded = Zeroizing::new(STANDARD.encode(material.as_bytes()));
        // no newline or padding whitespace may leak into the C string literal
        let trimmed = encoded.trim_end().len();
        encoded.truncate(trimmed);

        GeneratedArtifact {
            file_name: spec.file_name.to_string(),
            macro_name: spec.macro_name.to_string(),
            key_text: encoded,
            provenance: self.provenance.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{self, KeyRole};
    use crate::test_utils::deterministic_key_bytes;
    use tempfile::TempDir;

    const ZERO_KEY_B64: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

    fn zero_key() -> KeyMaterialBytes {
        KeyMaterialBytes::new(vec![0u8; 32])
    }

    fn encode_zero(role: KeyRole) -> GeneratedArtifact {
        KeyEncoder::default().encode(&zero_key(), registry::spec(role))
    }

    #[test]
    fn test_zero_key_renders_exact_header() {
        let artifact = encode_zero(KeyRole::Communication);

        let expected = "// SPDX-License-Identifier: BSD-2-Clause\n\
                        /*\n * Copyright (C) 2020 Jean-Pierre Miceli <jean-pierre.miceli@heig-vd.ch>\n */\n\
                        \n\
                        /* File generated by 'asf-keygen' tool */\n\
                        \n\
                        #define ASF_COM_KEY\t\t\"AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=\"\n\
                        \n";
        assert_eq!(artifact.render().as_str(), expected);
        assert_eq!(artifact.key_text(), ZERO_KEY_B64);
        assert_eq!(artifact.file_name(), "asf_communication_key.h");
        assert_eq!(artifact.macro_name(), "ASF_COM_KEY");
    }

    #[test]
    fn test_encode_is_deterministic() {
        let encoder = KeyEncoder::default();
        let key = KeyMaterialBytes::new(deterministic_key_bytes(32));
        let spec = registry::spec(KeyRole::Injection);

        let first = encoder.encode(&key, spec);
        let second = encoder.encode(&key, spec);
        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[test]
    fn test_key_text_decodes_to_original_bytes() {
        let raw = deterministic_key_bytes(32);
        let artifact = KeyEncoder::default()
            .encode(&KeyMaterialBytes::new(raw.clone()), registry::spec(KeyRole::Communication));

        assert_eq!(artifact.key_text().len(), 44);
        assert!(!artifact.key_text().ends_with('\n'));
        assert_eq!(artifact.decode_key().unwrap().as_bytes(), raw.as_slice());
    }

    #[test]
    fn test_custom_provenance_is_rendered() {
        let encoder = KeyEncoder::new(Provenance {
            tool_name: "keys_gen".to_string(),
            copyright_year: "2021".to_string(),
            author: "SOO team".to_string(),
        });
        let rendered = encoder
            .encode(&zero_key(), registry::spec(KeyRole::Injection))
            .render();

        assert!(rendered.contains(" * Copyright (C) 2021 SOO team\n"));
        assert!(rendered.contains("/* File generated by 'keys_gen' tool */\n"));
        assert!(rendered.contains("#define ASF_INJECT_KEY\t\t\""));
    }

    #[test]
    fn test_debug_redacts_key_text() {
        let artifact = encode_zero(KeyRole::Communication);
        let debug = format!("{:?}", artifact);
        assert!(debug.contains("ASF_COM_KEY"));
        assert!(!debug.contains(ZERO_KEY_B64));
    }

    #[tokio::test]
    async fn test_write_to_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("asf_communication_key.h");
        std::fs::write(&target, "stale").unwrap();

        let artifact = encode_zero(KeyRole::Communication);
        let written = artifact.write_to(dir.path()).await.unwrap();

        assert_eq!(written, target);
        let on_disk = std::fs::read_to_string(&target).unwrap();
        assert_eq!(on_disk, artifact.render().as_str());
    }

    #[tokio::test]
    async fn test_write_to_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");

        let artifact = encode_zero(KeyRole::Injection);
        let err = artifact.write_to(&missing).await.unwrap_err();

        assert_eq!(err.path, missing.join("asf_injection_key.h"));
        assert!(err.to_string().starts_with("ArtifactWriteError"));
    }
}
