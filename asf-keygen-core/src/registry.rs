//! Key roles and the static table describing their artifacts.
//!
//! Each role owns one generated header and one symbolic constant. The table
//! is fixed at compile time so two roles can never end up defining the same
//! macro in the consuming TA build.

use crate::error::ProvisioningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the independent trust domains a key is provisioned for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    /// Symmetric key for the 'Communication' flow
    Communication,
    /// Symmetric key for the 'Injection' flow
    Injection,
}

impl KeyRole {
    /// Every role, in provisioning order
    pub const ALL: [KeyRole; 2] = [KeyRole::Communication, KeyRole::Injection];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyRole::Communication => "communication",
            KeyRole::Injection => "injection",
        }
    }

    /// Registry entry for this role
    pub fn spec(&self) -> &'static KeySpec {
        spec(*self)
    }

    pub fn file_name(&self) -> &'static str {
        self.spec().file_name
    }

    pub fn macro_name(&self) -> &'static str {
        self.spec().macro_name
    }
}

impl fmt::Display for KeyRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyRole {
    type Err = ProvisioningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "communication" => Ok(KeyRole::Communication),
            "injection" => Ok(KeyRole::Injection),
            other => Err(ProvisioningError::InvalidRoleSelection(other.to_string())),
        }
    }
}

/// Static description of a role's generated artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    pub role: KeyRole,
    /// Header file written locally and copied into the TA tree
    pub file_name: &'static str,
    /// C preprocessor constant holding the base64 key
    pub macro_name: &'static str,
}

static REGISTRY: [KeySpec; 2] = [
    KeySpec {
        role: KeyRole::Communication,
        file_name: "asf_communication_key.h",
        macro_name: "ASF_COM_KEY",
    },
    KeySpec {
        role: KeyRole::Injection,
        file_name: "asf_injection_key.h",
        macro_name: "ASF_INJECT_KEY",
    },
];

/// All registry entries, in provisioning order
pub fn all() -> &'static [KeySpec] {
    &REGISTRY
}

pub fn spec(role: KeyRole) -> &'static KeySpec {
    match role {
        KeyRole::Communication => &REGISTRY[0],
        KeyRole::Injection => &REGISTRY[1],
    }
}
