//! Which roles a run provisions

use crate::registry::KeyRole;
use std::collections::BTreeSet;

/// Role flags as requested by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleFlags {
    pub communication: bool,
    pub injection: bool,
}

impl RoleFlags {
    pub fn is_empty(&self) -> bool {
        !self.communication && !self.injection
    }
}

/// Turn flags into the set of roles to provision
///
/// No flag at all means every role: running the tool bare regenerates
/// everything, it is not a no-op.
pub fn resolve_roles(flags: RoleFlags) -> BTreeSet<KeyRole> {
    if flags.is_empty() {
        return KeyRole::ALL.into_iter().collect();
    }

    let mut roles = BTreeSet::new();
    if flags.communication {
        roles.insert(KeyRole::Communication);
    }
    if flags.injection {
        roles.insert(KeyRole::Injection);
    }
    roles
}
