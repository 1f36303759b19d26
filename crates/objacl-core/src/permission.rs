//! Permission lattice for stored objects.
//!
//! Two permissions exist. `Write` implies `Read`: a grant of `Write`
//! satisfies a `Read` request, a grant of `Read` never satisfies `Write`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AclError;

/// Permission granted by a rule or requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Observe the object.
    Read,
    /// Mutate the object. Implies `Read`.
    Write,
}

impl Permission {
    /// Every permission a grant of `self` covers, itself included.
    pub fn implied(self) -> &'static [Permission] {
        match self {
            Permission::Read => &[Permission::Read],
            Permission::Write => &[Permission::Write, Permission::Read],
        }
    }

    /// Whether a grant of `self` satisfies a request for `requested`.
    #[inline]
    pub fn satisfies(self, requested: Permission) -> bool {
        self.implied().contains(&requested)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            other => Err(AclError::BadRequest(format!(
                "unknown permission: {other} (expected read|write)"
            ))),
        }
    }
}
