//! Policy document types.
//!
//! Field names follow the stored JSON format (`owner`, `visibility`,
//! `aclRules`, `group.type`, `group.id`, `permission`).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AclError, Result};
use crate::permission::Permission;

/// Who may read the object without any identity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Anyone (including anonymous callers) may read.
    Public,
    /// Only the owner and matching rules grant access.
    Private,
}

/// Reference to an access group, resolved by the embedding application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupRef {
    /// Group type tag (field name is `type` in JSON).
    #[serde(rename = "type")]
    pub group_type: String,
    /// Group identifier within that type.
    pub id: String,
}

impl GroupRef {
    pub fn new(group_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            group_type: group_type.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_type, self.id)
    }
}

/// Grants `permission` to every member of `group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessRule {
    pub group: GroupRef,
    pub permission: Permission,
}

impl AccessRule {
    pub fn new(group: GroupRef, permission: Permission) -> Self {
        Self { group, permission }
    }
}

/// Complete authorization document for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccessPolicy {
    /// Principal with full control.
    pub owner: String,
    /// `Public` grants unconditional read.
    pub visibility: Visibility,
    /// Group grants. Order does not affect the outcome.
    #[serde(default)]
    pub acl_rules: Vec<AccessRule>,
}

impl AccessPolicy {
    /// Private policy with no rules: only `owner` has access.
    pub fn private(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            visibility: Visibility::Private,
            acl_rules: Vec::new(),
        }
    }

    /// Public policy with no rules: anyone reads, only `owner` writes.
    pub fn public(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            visibility: Visibility::Public,
            acl_rules: Vec::new(),
        }
    }

    /// Append a rule (builder style).
    pub fn with_rule(mut self, group: GroupRef, permission: Permission) -> Self {
        self.acl_rules.push(AccessRule::new(group, permission));
        self
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Structural checks serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_empty() {
            return Err(AclError::BadRequest("policy owner must not be empty".into()));
        }
        for (i, rule) in self.acl_rules.iter().enumerate() {
            if rule.group.group_type.is_empty() {
                return Err(AclError::BadRequest(format!(
                    "aclRules[{i}].group.type must not be empty"
                )));
            }
        }
        Ok(())
    }
}
