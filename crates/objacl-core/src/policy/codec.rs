//! JSON codec for policies stored in object metadata.

use crate::error::{AclError, Result};

use super::model::AccessPolicy;

/// Reserved metadata key holding the serialized policy.
pub const ACL_POLICY_METADATA_KEY: &str = "custom:aclPolicy";

/// Serialize a policy for storage. Invalid policies are refused up front so
/// nothing unreadable is ever written.
pub fn encode_policy(policy: &AccessPolicy) -> Result<String> {
    policy.validate()?;
    serde_json::to_string(policy)
        .map_err(|e| AclError::Internal(format!("policy encode failed: {e}")))
}

/// Parse a stored policy value.
///
/// Any failure (bad JSON, unknown field, unknown enum value, failed
/// validation) is `PolicyDeserialization`.
pub fn decode_policy(raw: &str) -> Result<AccessPolicy> {
    let policy: AccessPolicy = serde_json::from_str(raw).map_err(|e| {
        tracing::warn!(error = %e, "stored acl policy is not valid json");
        AclError::PolicyDeserialization(e.to_string())
    })?;
    policy.validate().map_err(|e| {
        tracing::warn!(error = %e, "stored acl policy failed validation");
        AclError::PolicyDeserialization(e.to_string())
    })?;
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permission::Permission;
    use crate::policy::model::{GroupRef, Visibility};

    #[test]
    fn wire_format_field_names() {
        let p = AccessPolicy::private("u1").with_rule(GroupRef::new("team", "t1"), Permission::Write);
        let s = encode_policy(&p).unwrap();
        let v: serde_json::Value = serde_json::from_str(&s).unwrap();
        assert_eq!(v["owner"], "u1");
        assert_eq!(v["visibility"], "private");
        assert_eq!(v["aclRules"][0]["group"]["type"], "team");
        assert_eq!(v["aclRules"][0]["group"]["id"], "t1");
        assert_eq!(v["aclRules"][0]["permission"], "write");
    }

    #[test]
    fn missing_rules_default_to_empty() {
        let p = decode_policy(r#"{"owner":"u1","visibility":"public"}"#).unwrap();
        assert_eq!(p.visibility, Visibility::Public);
        assert!(p.acl_rules.is_empty());
    }

    #[test]
    fn typo_in_visibility_is_an_error() {
        let err = decode_policy(r#"{"owner":"u1","visibility":"pubic","aclRules":[]}"#).unwrap_err();
        assert_eq!(err.code().as_str(), "POLICY_CORRUPT");
    }

    #[test]
    fn not_json_is_an_error() {
        let err = decode_policy("{owner: u1").unwrap_err();
        assert!(matches!(err, AclError::PolicyDeserialization(_)));
    }

    #[test]
    fn encode_refuses_invalid_policy() {
        let err = encode_policy(&AccessPolicy::public("")).unwrap_err();
        assert_eq!(err.code().as_str(), "BAD_REQUEST");
    }
}
